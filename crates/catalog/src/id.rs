//! Dataset identifiers.

use std::fmt;

use crate::error::CatalogError;

/// Identifies one variable of one model run, rendered
/// `source.experiment.member.variable` in manifests and logs.
///
/// The parts follow the CMIP6 vocabulary (`CMCC-CM2-SR5.historical.r1i1p1f1.pr`)
/// but observational products fit the same shape (`GPCP.obs.v1.precip`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetId {
    source: String,
    experiment: String,
    member: String,
    variable: String,
}

impl DatasetId {
    /// Builds an id from its four parts.
    pub fn new(
        source: impl Into<String>,
        experiment: impl Into<String>,
        member: impl Into<String>,
        variable: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            experiment: experiment.into(),
            member: member.into(),
            variable: variable.into(),
        }
    }

    /// Parses a dotted id string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidId`] unless the string is exactly four
    /// non-empty dot-separated parts.
    pub fn parse(value: &str) -> Result<Self, CatalogError> {
        let parts: Vec<&str> = value.trim().split('.').collect();
        if parts.len() != 4 || parts.iter().any(|p| p.is_empty()) {
            return Err(CatalogError::InvalidId {
                value: value.to_string(),
            });
        }
        Ok(Self::new(parts[0], parts[1], parts[2], parts[3]))
    }

    /// Model or product name.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Experiment name, e.g. `historical`.
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Ensemble member, e.g. `r1i1p1f1`.
    pub fn member(&self) -> &str {
        &self.member
    }

    /// Variable name, e.g. `pr` or `tas`.
    pub fn variable(&self) -> &str {
        &self.variable
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.source, self.experiment, self.member, self.variable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_through_display() {
        let id = DatasetId::parse("CMCC-CM2-SR5.historical.r1i1p1f1.pr").expect("valid id");
        assert_eq!(id.source(), "CMCC-CM2-SR5");
        assert_eq!(id.experiment(), "historical");
        assert_eq!(id.member(), "r1i1p1f1");
        assert_eq!(id.variable(), "pr");
        assert_eq!(id.to_string(), "CMCC-CM2-SR5.historical.r1i1p1f1.pr");
    }

    #[test]
    fn parse_rejects_wrong_arity() {
        for bad in ["", "a.b.c", "a.b.c.d.e", "a..c.d", "pr"] {
            let err = DatasetId::parse(bad).expect_err("malformed id");
            assert!(matches!(err, CatalogError::InvalidId { .. }), "{bad}");
        }
    }

    #[test]
    fn parse_trims_whitespace() {
        let id = DatasetId::parse(" GPCP.obs.v1.precip ").expect("valid id");
        assert_eq!(id.to_string(), "GPCP.obs.v1.precip");
    }

    #[test]
    fn ids_order_lexicographically() {
        let a = DatasetId::parse("A.x.y.pr").expect("valid id");
        let b = DatasetId::parse("B.x.y.pr").expect("valid id");
        assert!(a < b);
    }
}
