//! An in-memory catalog for tests and synthetic pipelines.

use std::collections::BTreeMap;

use crate::Catalog;
use crate::dataset::Dataset;
use crate::error::CatalogError;
use crate::id::DatasetId;

/// A [`Catalog`] backed by a map. Resolution clones the stored dataset.
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    datasets: BTreeMap<String, Dataset>,
}

impl MemoryCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `dataset` under `id`, replacing any previous entry.
    pub fn insert(&mut self, id: DatasetId, dataset: Dataset) {
        self.datasets.insert(id.to_string(), dataset);
    }

    /// Number of registered datasets.
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl Catalog for MemoryCatalog {
    fn resolve(&self, id: &DatasetId) -> Result<Dataset, CatalogError> {
        self.datasets
            .get(&id.to_string())
            .cloned()
            .ok_or_else(|| CatalogError::UnknownDataset { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyetos_grid::{LabeledArray, Unit};
    use hyetos_time::{Calendar, CivilDate, TimeAlignment, TimeGrid};
    use ndarray::{ArrayD, IxDyn};

    fn dataset() -> Dataset {
        let offsets = vec![0.5, 1.5];
        let data = ArrayD::from_shape_vec(IxDyn(&[2]), vec![1.0, 2.0]).expect("shape matches");
        let array = LabeledArray::new(
            "pr",
            Unit::KgPerM2PerS,
            vec![("time".to_string(), offsets.clone())],
            data,
        )
        .expect("valid labels");
        let grid = TimeGrid::new(
            offsets,
            CivilDate::new(2000, 1, 1).expect("valid date"),
            Calendar::NoLeap,
            TimeAlignment::Centered,
        )
        .expect("valid grid");
        Dataset::new(array, grid).expect("consistent")
    }

    #[test]
    fn insert_then_resolve() {
        let mut catalog = MemoryCatalog::new();
        assert!(catalog.is_empty());
        let id = DatasetId::parse("CMCC-CM2-SR5.historical.r1i1p1f1.pr").expect("valid id");
        catalog.insert(id.clone(), dataset());
        assert_eq!(catalog.len(), 1);

        let ds = catalog.resolve(&id).expect("registered");
        assert_eq!(ds.array().name(), "pr");
        assert_eq!(ds.time().len(), 2);
    }

    #[test]
    fn unknown_id_carries_the_id() {
        let catalog = MemoryCatalog::new();
        let id = DatasetId::parse("GPCP.obs.v1.precip").expect("valid id");
        let err = catalog.resolve(&id).expect_err("nothing registered");
        assert!(matches!(err, CatalogError::UnknownDataset { .. }));
        assert!(err.to_string().contains("GPCP.obs.v1.precip"));
    }

    #[test]
    fn insert_replaces_previous_entry() {
        let mut catalog = MemoryCatalog::new();
        let id = DatasetId::parse("a.b.c.pr").expect("valid id");
        catalog.insert(id.clone(), dataset());
        let renamed = {
            let (array, time) = dataset().into_parts();
            Dataset::new(array.with_name("pr_v2"), time).expect("consistent")
        };
        catalog.insert(id.clone(), renamed);
        assert_eq!(catalog.len(), 1);
        let ds = catalog.resolve(&id).expect("registered");
        assert_eq!(ds.array().name(), "pr_v2");
    }
}
