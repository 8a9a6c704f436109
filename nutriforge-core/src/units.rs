//! Mass/molar unit conversion and stoichiometric form changes.
//!
//! All functions are pure. A conversion that needs reference data the
//! registry does not have returns [`Conversion::Unconvertible`] carrying the
//! untouched input, so callers decide whether to drop it or fail.

use crate::{
    diagnostics::{Degradation, Diagnostics},
    registry::MolarMassRegistry,
};

/// mg CaCO3 per liter for one degree of German carbonate hardness.
pub const KH_TO_CACO3_MG_PER_L: f64 = 17.848;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    MgPerL,
    MmolPerL,
    MolPerL,
    MeqPerL,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    Converted(f64),
    /// `raw` is the input value as given; `missing` names what was lacking.
    Unconvertible { raw: f64, missing: String },
}

impl Conversion {
    fn missing(raw: f64, missing: impl Into<String>) -> Self {
        Self::Unconvertible {
            raw,
            missing: missing.into(),
        }
    }

    /// The converted value, or the raw input when conversion was impossible.
    pub fn value(&self) -> f64 {
        match self {
            Self::Converted(v) => *v,
            Self::Unconvertible { raw, .. } => *raw,
        }
    }

    pub fn converted(&self) -> Option<f64> {
        match self {
            Self::Converted(v) => Some(*v),
            Self::Unconvertible { .. } => None,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted(_))
    }

    pub fn and_then(self, f: impl FnOnce(f64) -> Conversion) -> Self {
        match self {
            Self::Converted(v) => f(v),
            other => other,
        }
    }

    /// Converted value, or `None` after recording a degradation for `subject`.
    pub fn or_record(self, diag: &mut Diagnostics, subject: &str) -> Option<f64> {
        match self {
            Self::Converted(v) => Some(v),
            Self::Unconvertible { raw, missing } => {
                diag.push(Degradation::missing(
                    subject,
                    format!("{missing}; {raw} left unconverted and excluded"),
                ));
                None
            }
        }
    }
}

/// mmol/L represented by one unit of `unit` for `symbol`.
fn mmol_per_unit(registry: &MolarMassRegistry, symbol: &str, unit: Unit) -> Result<f64, String> {
    match unit {
        Unit::MgPerL => registry
            .molar_mass(symbol)
            .map(|mm| 1.0 / mm)
            .ok_or_else(|| format!("no molar mass for '{symbol}'")),
        Unit::MmolPerL => Ok(1.0),
        Unit::MolPerL => Ok(1000.0),
        Unit::MeqPerL => match registry.valence(symbol) {
            Some(z) if z != 0 => Ok(1.0 / f64::from(z.abs())),
            _ => Err(format!("no valence for '{symbol}'")),
        },
    }
}

/// Converts `value` of `symbol` from one concentration unit to another.
pub fn convert(
    registry: &MolarMassRegistry,
    symbol: &str,
    value: f64,
    from: Unit,
    to: Unit,
) -> Conversion {
    if from == to {
        return Conversion::Converted(value);
    }
    let scale_from = match mmol_per_unit(registry, symbol, from) {
        Ok(s) => s,
        Err(missing) => return Conversion::missing(value, missing),
    };
    let scale_to = match mmol_per_unit(registry, symbol, to) {
        Ok(s) => s,
        Err(missing) => return Conversion::missing(value, missing),
    };
    Conversion::Converted(value * scale_from / scale_to)
}

pub fn mg_to_mmol(registry: &MolarMassRegistry, symbol: &str, mg_per_l: f64) -> Conversion {
    convert(registry, symbol, mg_per_l, Unit::MgPerL, Unit::MmolPerL)
}

pub fn mmol_to_mg(registry: &MolarMassRegistry, symbol: &str, mmol_per_l: f64) -> Conversion {
    convert(registry, symbol, mmol_per_l, Unit::MmolPerL, Unit::MgPerL)
}

pub fn mg_to_mol(registry: &MolarMassRegistry, symbol: &str, mg_per_l: f64) -> Conversion {
    convert(registry, symbol, mg_per_l, Unit::MgPerL, Unit::MolPerL)
}

pub fn mol_to_mg(registry: &MolarMassRegistry, symbol: &str, mol_per_l: f64) -> Conversion {
    convert(registry, symbol, mol_per_l, Unit::MolPerL, Unit::MgPerL)
}

/// A compound and the element it is counted as: `atoms` atoms of `element`
/// per formula unit of `compound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub compound: &'static str,
    pub element: &'static str,
    pub atoms: u32,
}

const fn rel(compound: &'static str, element: &'static str, atoms: u32) -> Relation {
    Relation {
        compound,
        element,
        atoms,
    }
}

const RELATIONS: &[Relation] = &[
    rel("P2O5", "P", 2),
    rel("K2O", "K", 2),
    rel("Na2O", "Na", 2),
    rel("CaO", "Ca", 1),
    rel("MgO", "Mg", 1),
    rel("SO4", "S", 1),
    rel("SO3", "S", 1),
    rel("SiO2", "Si", 1),
    rel("CO3", "C", 1),
    rel("PO4", "P", 1),
    rel("NH4", "N", 1),
    rel("NH3", "N", 1),
    rel("NO3", "N", 1),
    rel("NO2", "N", 1),
    rel("UREA", "N", 2),
];

pub fn relation(compound: &str) -> Option<&'static Relation> {
    RELATIONS.iter().find(|r| r.compound == compound)
}

/// Element mass ratio: mg element per mg compound.
fn element_ratio(registry: &MolarMassRegistry, r: &Relation) -> Result<f64, String> {
    let mm_element = registry
        .molar_mass(r.element)
        .ok_or_else(|| format!("no molar mass for '{}'", r.element))?;
    let mm_compound = registry
        .molar_mass(r.compound)
        .ok_or_else(|| format!("no molar mass for '{}'", r.compound))?;
    Ok(f64::from(r.atoms) * mm_element / mm_compound)
}

/// mg/L of the compound's element, e.g. `to_element(reg, "P2O5", x)` gives mg/L P.
pub fn to_element(registry: &MolarMassRegistry, compound: &str, mg_per_l: f64) -> Conversion {
    if mg_per_l == 0.0 {
        return Conversion::Converted(0.0);
    }
    let Some(r) = relation(compound) else {
        return Conversion::missing(mg_per_l, format!("no stoichiometric relation for '{compound}'"));
    };
    match element_ratio(registry, r) {
        Ok(ratio) => Conversion::Converted(mg_per_l * ratio),
        Err(missing) => Conversion::missing(mg_per_l, missing),
    }
}

/// Inverse of [`to_element`]: mg/L of `compound` carrying `mg_element` of its element.
pub fn from_element(registry: &MolarMassRegistry, compound: &str, mg_element: f64) -> Conversion {
    if mg_element == 0.0 {
        return Conversion::Converted(0.0);
    }
    let Some(r) = relation(compound) else {
        return Conversion::missing(mg_element, format!("no stoichiometric relation for '{compound}'"));
    };
    match element_ratio(registry, r) {
        Ok(ratio) => Conversion::Converted(mg_element / ratio),
        Err(missing) => Conversion::missing(mg_element, missing),
    }
}

/// Re-expresses a compound mass as another compound of the same element,
/// e.g. PO4 to P2O5.
pub fn change_form(registry: &MolarMassRegistry, from: &str, to: &str, mg_per_l: f64) -> Conversion {
    if from == to {
        return Conversion::Converted(mg_per_l);
    }
    match (relation(from), relation(to)) {
        (Some(a), Some(b)) if a.element == b.element => {
            to_element(registry, from, mg_per_l).and_then(|el| from_element(registry, to, el))
        }
        _ => Conversion::missing(mg_per_l, format!("'{from}' and '{to}' share no element")),
    }
}

pub fn kh_to_caco3(dkh: f64) -> f64 {
    dkh * KH_TO_CACO3_MG_PER_L
}

/// Alkalinity as HCO3. One CaCO3 neutralises two HCO3, so the conversion
/// goes through the CaCO3 equivalent weight.
pub fn caco3_to_hco3(registry: &MolarMassRegistry, mg_caco3: f64) -> Conversion {
    if mg_caco3 == 0.0 {
        return Conversion::Converted(0.0);
    }
    match (registry.molar_mass("CaCO3"), registry.molar_mass("HCO3")) {
        (Some(mm_caco3), Some(mm_hco3)) => Conversion::Converted(mg_caco3 * mm_hco3 / (mm_caco3 / 2.0)),
        (None, _) => Conversion::missing(mg_caco3, "no molar mass for 'CaCO3'"),
        (_, None) => Conversion::missing(mg_caco3, "no molar mass for 'HCO3'"),
    }
}

pub fn kh_to_hco3(registry: &MolarMassRegistry, dkh: f64) -> Conversion {
    caco3_to_hco3(registry, kh_to_caco3(dkh))
}
