//! Physical units attached to labeled arrays.
//!
//! Only the units that actually occur in CMIP6 precipitation/temperature
//! output and the common observational products are modeled. Everything
//! else round-trips through [`Unit::Other`] and refuses to convert.

use std::fmt;

/// Seconds per day, used when converting between flux and accumulation units.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// A physical unit, parsed from a CF `units` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// Precipitation mass flux, `kg m-2 s-1` (CMIP6 `pr`).
    KgPerM2PerS,
    /// Precipitation accumulation rate, `mm day-1` (GPCP and friends).
    MmPerDay,
    /// Absolute temperature, `K` (CMIP6 `tas`).
    Kelvin,
    /// Temperature in `degC`.
    Celsius,
    /// Unitless quantities (fractions, counts).
    Dimensionless,
    /// Anything this crate does not model; kept verbatim for labeling.
    Other(String),
}

impl Unit {
    /// Parses a CF-style units string, tolerating the spellings seen in the wild.
    ///
    /// Unknown strings are preserved as [`Unit::Other`] rather than rejected,
    /// so unexpected metadata surfaces later as a conversion error with both
    /// names attached.
    pub fn parse(s: &str) -> Unit {
        match s.trim() {
            "kg m-2 s-1" | "kg m^-2 s^-1" | "kg/m2/s" | "kg/m^2/s" => Unit::KgPerM2PerS,
            "mm/day" | "mm day-1" | "mm d-1" | "mm/d" => Unit::MmPerDay,
            "K" | "Kelvin" | "kelvin" => Unit::Kelvin,
            "degC" | "deg_C" | "degrees_Celsius" | "celsius" | "C" => Unit::Celsius,
            "1" | "" => Unit::Dimensionless,
            other => Unit::Other(other.to_string()),
        }
    }

    /// Canonical CF spelling of this unit.
    pub fn cf_name(&self) -> &str {
        match self {
            Unit::KgPerM2PerS => "kg m-2 s-1",
            Unit::MmPerDay => "mm day-1",
            Unit::Kelvin => "K",
            Unit::Celsius => "degC",
            Unit::Dimensionless => "1",
            Unit::Other(s) => s,
        }
    }

    /// Returns the affine map taking values in `self` to values in `target`,
    /// or `None` when the two units measure different quantities.
    ///
    /// Water flux conversions assume a density of 1000 kg m-3, the usual
    /// convention that makes 1 kg m-2 of water equal 1 mm of depth.
    pub fn conversion_to(&self, target: &Unit) -> Option<LinearMap> {
        if self == target {
            return Some(LinearMap::identity());
        }
        match (self, target) {
            (Unit::KgPerM2PerS, Unit::MmPerDay) => Some(LinearMap::scale(SECONDS_PER_DAY)),
            (Unit::MmPerDay, Unit::KgPerM2PerS) => Some(LinearMap::scale(1.0 / SECONDS_PER_DAY)),
            (Unit::Kelvin, Unit::Celsius) => Some(LinearMap::new(1.0, -273.15)),
            (Unit::Celsius, Unit::Kelvin) => Some(LinearMap::new(1.0, 273.15)),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cf_name())
    }
}

/// An affine unit conversion `y = factor * x + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMap {
    factor: f64,
    offset: f64,
}

impl LinearMap {
    /// Builds the map `y = factor * x + offset`.
    pub fn new(factor: f64, offset: f64) -> Self {
        Self { factor, offset }
    }

    /// The identity conversion.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0)
    }

    /// A pure rescaling with no offset.
    pub fn scale(factor: f64) -> Self {
        Self::new(factor, 0.0)
    }

    /// Applies the conversion to a single value. NaN maps to NaN.
    pub fn apply(&self, x: f64) -> f64 {
        self.factor * x + self.offset
    }

    /// True when applying this map is a no-op.
    pub fn is_identity(&self) -> bool {
        self.factor == 1.0 && self.offset == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parses_common_spellings() {
        assert_eq!(Unit::parse("kg m-2 s-1"), Unit::KgPerM2PerS);
        assert_eq!(Unit::parse("mm/day"), Unit::MmPerDay);
        assert_eq!(Unit::parse(" K "), Unit::Kelvin);
        assert_eq!(Unit::parse("degC"), Unit::Celsius);
        assert_eq!(Unit::parse("1"), Unit::Dimensionless);
        assert_eq!(
            Unit::parse("hPa"),
            Unit::Other("hPa".to_string()),
            "unknown units must be preserved, not coerced"
        );
    }

    #[test]
    fn flux_to_accumulation_round_trip() {
        let fwd = Unit::KgPerM2PerS
            .conversion_to(&Unit::MmPerDay)
            .expect("flux to mm/day is defined");
        let back = Unit::MmPerDay
            .conversion_to(&Unit::KgPerM2PerS)
            .expect("mm/day to flux is defined");
        let x = 2.5e-5;
        assert_relative_eq!(fwd.apply(x), 2.16, epsilon = 1e-9);
        assert_relative_eq!(back.apply(fwd.apply(x)), x, epsilon = 1e-15);
    }

    #[test]
    fn kelvin_celsius_offset() {
        let to_c = Unit::Kelvin.conversion_to(&Unit::Celsius).expect("defined");
        assert_relative_eq!(to_c.apply(273.15), 0.0, epsilon = 1e-12);
        assert!(!to_c.is_identity());
    }

    #[test]
    fn incompatible_quantities_refuse() {
        assert!(Unit::Kelvin.conversion_to(&Unit::MmPerDay).is_none());
        assert!(Unit::Other("hPa".into()).conversion_to(&Unit::Kelvin).is_none());
    }

    #[test]
    fn identity_conversion_is_identity() {
        let id = Unit::Kelvin.conversion_to(&Unit::Kelvin).expect("defined");
        assert!(id.is_identity());
    }
}
