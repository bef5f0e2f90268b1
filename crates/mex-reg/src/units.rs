//! Unit registry: names, dimensions, and conversions.
//!
//! Every unit belongs to a dimension and converts through that dimension's
//! base unit with `base = value * factor + offset`. The offset is zero for
//! everything except temperatures.
//!
//! Unit-ness of an identifier is not decided at lex time; the evaluator asks
//! this registry when a name is used in unit position, so variables may
//! freely shadow unit names.

use indexmap::IndexMap;
use thiserror::Error;

/// Physical quantity class of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimension {
    Length,
    Mass,
    Time,
    Temperature,
    Data,
    Angle,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dimension::Length => "length",
            Dimension::Mass => "mass",
            Dimension::Time => "time",
            Dimension::Temperature => "temperature",
            Dimension::Data => "data",
            Dimension::Angle => "angle",
        };
        write!(f, "{}", name)
    }
}

/// Errors raised by unit resolution and conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("cannot convert {from} ({from_dimension}) to {to} ({to_dimension})")]
    IncompatibleDimensions {
        from: String,
        from_dimension: Dimension,
        to: String,
        to_dimension: Dimension,
    },
}

#[derive(Clone, Copy, Debug)]
struct UnitDef {
    dimension: Dimension,
    /// Multiplier into the dimension's base unit
    factor: f64,
    /// Additive offset into the base unit (temperatures only)
    offset: f64,
}

/// One row of the default catalog: names, dimension, factor, offset.
type Row = (&'static [&'static str], Dimension, f64, f64);

#[rustfmt::skip]
const DEFAULT_UNITS: &[Row] = &[
    // Length, base: meter. "in" for inches is deliberately absent; it is
    // taken by the conversion keyword.
    (&["m", "meter", "meters", "metre", "metres"],          Dimension::Length, 1.0, 0.0),
    (&["km", "kilometer", "kilometers", "kilometre", "kilometres"], Dimension::Length, 1000.0, 0.0),
    (&["cm", "centimeter", "centimeters"],                  Dimension::Length, 0.01, 0.0),
    (&["mm", "millimeter", "millimeters"],                  Dimension::Length, 0.001, 0.0),
    (&["mi", "mile", "miles"],                              Dimension::Length, 1609.344, 0.0),
    (&["yd", "yard", "yards"],                              Dimension::Length, 0.9144, 0.0),
    (&["ft", "foot", "feet"],                               Dimension::Length, 0.3048, 0.0),
    (&["inch", "inches"],                                   Dimension::Length, 0.0254, 0.0),

    // Mass, base: kilogram
    (&["kg", "kilogram", "kilograms"],                      Dimension::Mass, 1.0, 0.0),
    (&["g", "gram", "grams"],                               Dimension::Mass, 0.001, 0.0),
    (&["mg", "milligram", "milligrams"],                    Dimension::Mass, 1e-6, 0.0),
    (&["lb", "lbs", "pound", "pounds"],                     Dimension::Mass, 0.453_592_37, 0.0),
    (&["oz", "ounce", "ounces"],                            Dimension::Mass, 0.028_349_523_125, 0.0),
    (&["t", "tonne", "tonnes"],                             Dimension::Mass, 1000.0, 0.0),

    // Time, base: second
    (&["s", "sec", "secs", "second", "seconds"],            Dimension::Time, 1.0, 0.0),
    (&["ms", "millisecond", "milliseconds"],                Dimension::Time, 0.001, 0.0),
    (&["min", "mins", "minute", "minutes"],                 Dimension::Time, 60.0, 0.0),
    (&["h", "hr", "hrs", "hour", "hours"],                  Dimension::Time, 3600.0, 0.0),
    (&["day", "days"],                                      Dimension::Time, 86_400.0, 0.0),
    (&["week", "weeks"],                                    Dimension::Time, 604_800.0, 0.0),

    // Temperature, base: kelvin. fahrenheit: K = (F + 459.67) * 5/9.
    (&["k", "kelvin"],                                      Dimension::Temperature, 1.0, 0.0),
    (&["c", "celsius", "centigrade"],                       Dimension::Temperature, 1.0, 273.15),
    (&["f", "fahrenheit"],                                  Dimension::Temperature, 5.0 / 9.0, 459.67 * 5.0 / 9.0),

    // Data, base: byte, binary multiples
    (&["byte", "bytes"],                                    Dimension::Data, 1.0, 0.0),
    (&["kb", "kilobyte", "kilobytes"],                      Dimension::Data, 1024.0, 0.0),
    (&["mb", "megabyte", "megabytes"],                      Dimension::Data, 1024.0 * 1024.0, 0.0),
    (&["gb", "gigabyte", "gigabytes"],                      Dimension::Data, 1024.0 * 1024.0 * 1024.0, 0.0),
    (&["tb", "terabyte", "terabytes"],                      Dimension::Data, 1024.0 * 1024.0 * 1024.0 * 1024.0, 0.0),

    // Angle, base: radian
    (&["rad", "radian", "radians"],                         Dimension::Angle, 1.0, 0.0),
    (&["deg", "degree", "degrees"],                         Dimension::Angle, std::f64::consts::PI / 180.0, 0.0),
    (&["grad", "gradian", "gradians"],                      Dimension::Angle, std::f64::consts::PI / 200.0, 0.0),
];

/// Lookup and conversion over the unit catalog.
///
/// The base table is fixed; `define` adds to a per-registry overlay that is
/// consulted first, so embedders can add units without touching the
/// defaults.
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    overlay: IndexMap<String, UnitDef>,
}

impl UnitRegistry {
    pub fn is_unit(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// The dimension `name` belongs to, if it is a known unit.
    pub fn dimension_of(&self, name: &str) -> Option<Dimension> {
        self.resolve(name).map(|def| def.dimension)
    }

    /// Register a custom unit in the overlay.
    ///
    /// `factor` and `offset` are relative to the base unit of `dimension`.
    pub fn define(&mut self, name: &str, dimension: Dimension, factor: f64, offset: f64) {
        self.overlay.insert(
            name.to_string(),
            UnitDef {
                dimension,
                factor,
                offset,
            },
        );
    }

    /// Convert `value` from one unit to another of the same dimension.
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, UnitError> {
        let from_def = self
            .resolve(from)
            .ok_or_else(|| UnitError::UnknownUnit(from.to_string()))?;
        let to_def = self
            .resolve(to)
            .ok_or_else(|| UnitError::UnknownUnit(to.to_string()))?;
        if from_def.dimension != to_def.dimension {
            return Err(UnitError::IncompatibleDimensions {
                from: from.to_string(),
                from_dimension: from_def.dimension,
                to: to.to_string(),
                to_dimension: to_def.dimension,
            });
        }
        let base = value * from_def.factor + from_def.offset;
        Ok((base - to_def.offset) / to_def.factor)
    }

    fn resolve(&self, name: &str) -> Option<UnitDef> {
        if let Some(def) = self.overlay.get(name) {
            return Some(*def);
        }
        // Unit names are matched case-insensitively against the base table.
        let lowered = name.to_ascii_lowercase();
        for (names, dimension, factor, offset) in DEFAULT_UNITS {
            if names.contains(&lowered.as_str()) {
                return Some(UnitDef {
                    dimension: *dimension,
                    factor: *factor,
                    offset: *offset,
                });
            }
        }
        None
    }
}
