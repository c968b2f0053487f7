//! Manifest-backed catalog reading datasets from NetCDF files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;

use hyetos_grid::{DIM_TIME, LabeledArray, canonical_dim};
use hyetos_time::{TimeAlignment, TimeGrid};

use crate::Catalog;
use crate::dataset::Dataset;
use crate::error::CatalogError;
use crate::id::DatasetId;
use crate::manifest::{Manifest, ManifestEntry};
use crate::netcdf_read;

/// A [`Catalog`] over a TOML manifest; each resolve opens the entry's NetCDF
/// file and decodes the variable, its coordinates and its time axis.
#[derive(Debug)]
pub struct FileCatalog {
    base: PathBuf,
    entries: BTreeMap<String, ManifestEntry>,
}

impl FileCatalog {
    /// Opens the manifest at `path`. Entry paths resolve relative to the
    /// manifest's directory unless absolute.
    ///
    /// # Errors
    ///
    /// Propagates [`Manifest::load`] failures, plus
    /// [`CatalogError::InvalidId`] and duplicate-id
    /// [`CatalogError::Manifest`] errors found while indexing.
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let manifest = Manifest::load(path)?;
        let base = match path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };
        Self::index(manifest, base, path)
    }

    /// Builds a catalog from an already-parsed manifest; entry paths resolve
    /// relative to `base`.
    ///
    /// # Errors
    ///
    /// Same indexing errors as [`FileCatalog::open`].
    pub fn from_manifest(manifest: Manifest, base: &Path) -> Result<Self, CatalogError> {
        Self::index(manifest, base.to_path_buf(), base)
    }

    fn index(manifest: Manifest, base: PathBuf, context: &Path) -> Result<Self, CatalogError> {
        let mut entries = BTreeMap::new();
        for entry in manifest.datasets {
            let id = DatasetId::parse(&entry.id)?;
            if entries.insert(id.to_string(), entry).is_some() {
                return Err(CatalogError::Manifest {
                    path: context.to_path_buf(),
                    reason: format!("duplicate dataset id '{id}'"),
                });
            }
        }
        Ok(Self { base, entries })
    }

    /// Number of datasets the manifest declares.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the manifest declares no datasets.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The declared dataset ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Catalog for FileCatalog {
    fn resolve(&self, id: &DatasetId) -> Result<Dataset, CatalogError> {
        let entry = self
            .entries
            .get(&id.to_string())
            .ok_or_else(|| CatalogError::UnknownDataset { id: id.to_string() })?;
        let path = self.base.join(&entry.path);
        let file = netcdf_read::open_file(&path)?;

        let var_name = entry.variable.as_deref().unwrap_or_else(|| id.variable());
        let var = netcdf_read::lookup(&file, var_name, &path)?;
        let (data, raw_dims) = netcdf_read::variable_data(&var)?;
        let units = netcdf_read::variable_units(&var);

        // Manifest override wins over the file's cell_methods attribute.
        let alignment = match &entry.time_alignment {
            Some(name) => TimeAlignment::parse(name)?,
            None => netcdf_read::variable_alignment(&var).unwrap_or(TimeAlignment::Centered),
        };

        let renamed = |raw: &str| -> String {
            entry
                .rename
                .get(raw)
                .cloned()
                .unwrap_or_else(|| raw.to_string())
        };
        let raw_time = raw_dims
            .iter()
            .find(|raw| canonical_dim(&renamed(raw.as_str())) == DIM_TIME)
            .ok_or_else(|| CatalogError::MissingCoordinate {
                dim: DIM_TIME.to_string(),
                path: path.clone(),
            })?;

        let (offsets, epoch, calendar) = netcdf_read::read_time(&file, raw_time, &path)?;

        let mut dims = Vec::with_capacity(raw_dims.len());
        for raw in &raw_dims {
            let coord = if raw == raw_time {
                offsets.clone()
            } else {
                netcdf_read::read_coord(&file, raw, &path)?
            };
            dims.push((renamed(raw.as_str()), coord));
        }

        let array = LabeledArray::new(var_name, units, dims, data)?;
        let time = TimeGrid::new(offsets, epoch, calendar, alignment)?;
        info!(
            id = %id,
            path = %path.display(),
            variable = var_name,
            samples = time.len(),
            "resolved dataset"
        );
        Dataset::new(array, time)
    }
}
