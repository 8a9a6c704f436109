use crate::calculation::state::{SolutionReport, SolutionState};
use csv::Writer;
use serde::Serialize;
use std::fs;
use std::io;

#[derive(Debug, Serialize)]
struct LogEntry<'a> {
    label: &'a str,
    view: &'a str,
    table: &'a str,
    key: &'a str,
    value: f64,
    unit: &'a str,
}

/// Writes finished reports as flat `label,view,table,key,value,unit` rows.
pub struct ReportLogger {
    writer: Writer<fs::File>,
}

impl ReportLogger {
    pub fn new(path: &str) -> Result<Self, io::Error> {
        let writer = Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn log_report(&mut self, label: &str, report: &SolutionReport) -> Result<(), anyhow::Error> {
        let mut row = |view: &str, table: &str, key: &str, value: f64, unit: &str| {
            self.writer.serialize(LogEntry {
                label,
                view,
                table,
                key,
                value,
                unit,
            })
        };

        row("summary", "batch", "liters", report.liters, "L")?;
        row("summary", "batch", "osmosis_percent", report.osmosis_percent, "%")?;
        for (key, value) in report.water_canonical_mg_per_l.iter() {
            row("water", "canonical", key, value, "mg/L")?;
        }
        for dose in &report.doses {
            row("fertilizer", "dose_grams", &dose.name, dose.grams, "g")?;
        }

        for (view, state) in report.views() {
            log_state(&mut row, view, state)?;
        }

        let npk = &report.npk.values;
        for (key, value) in [
            ("n_total", npk.n_total),
            ("p2o5", npk.p2o5),
            ("k2o", npk.k2o),
            ("total_npk", npk.total_npk),
        ] {
            row("combined", "npk", key, value, "mg/L")?;
        }
        let pct = &report.npk.npk_percent;
        for (key, value) in [("n_pct", pct.n), ("p_pct", pct.p), ("k_pct", pct.k)] {
            row("combined", "npk", key, value, "%")?;
        }
        row(
            "combined",
            "sluijsmann",
            "E",
            report.sluijsmann.e_mg_caoeq_per_l,
            "mg CaO/L",
        )?;

        self.writer.flush()?;
        Ok(())
    }
}

fn log_state<F>(row: &mut F, view: &str, state: &SolutionState) -> Result<(), csv::Error>
where
    F: FnMut(&str, &str, &str, f64, &str) -> Result<(), csv::Error>,
{
    for (key, value) in state.elements_mg_per_l.iter() {
        row(view, "elements", key, value, "mg/L")?;
    }
    for (key, value) in state.oxides_mg_per_l.iter() {
        row(view, "oxides", key, value, "mg/L")?;
    }
    for ion in state.ions.ions() {
        row(view, "ions", &ion.label, ion.mmol_per_l, "mmol/L")?;
        row(view, "ions", &ion.label, ion.meq_per_l, "meq/L")?;
    }
    let balance = &state.ion_balance;
    row(view, "ion_balance", "cations", balance.cations_meq_per_l, "meq/L")?;
    row(view, "ion_balance", "anions", balance.anions_meq_per_l, "meq/L")?;
    if let Some(error) = balance.error_percent_signed {
        row(view, "ion_balance", "error_signed", error, "%")?;
    }
    for point in &state.ec.points {
        let key = format!("{}C", point.temperature_c);
        row(view, "ec", &key, point.ec_ms_per_cm, "mS/cm")?;
    }
    Ok(())
}
