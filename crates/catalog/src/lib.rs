//! # hyetos-catalog
//!
//! Resolve dataset ids to loaded arrays. A manifest-backed catalog reads
//! CMIP6-style NetCDF files (variable, coordinates, CF time axis, fill
//! values); an in-memory catalog serves tests. Observational references are
//! brought onto model conventions by [`normalize`].

mod dataset;
mod error;
mod file;
mod id;
mod manifest;
mod memory;
mod netcdf_read;
mod normalize;

pub use dataset::Dataset;
pub use error::CatalogError;
pub use file::FileCatalog;
pub use id::DatasetId;
pub use manifest::{Manifest, ManifestEntry};
pub use memory::MemoryCatalog;
pub use normalize::normalize;

/// Looks datasets up by id.
///
/// The analysis pipelines depend on this trait alone, so anything that can
/// produce a [`Dataset`] per id can feed them.
pub trait Catalog {
    /// Resolves `id` to a loaded dataset.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownDataset`] for ids the catalog does not
    /// know, plus implementation-specific loading errors.
    fn resolve(&self, id: &DatasetId) -> Result<Dataset, CatalogError>;
}
