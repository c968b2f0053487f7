//! TOML manifests mapping dataset ids to files on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CatalogError;

/// A catalog manifest: a list of `[[dataset]]` entries.
///
/// ```toml
/// [[dataset]]
/// id = "CMCC-CM2-SR5.historical.r1i1p1f1.pr"
/// path = "pr_3hr_CMCC-CM2-SR5_historical.nc"
///
/// [[dataset]]
/// id = "GPCP.obs.v1.precip"
/// path = "gpcp_daily.nc"
/// variable = "precip"
/// time_alignment = "end"
/// rename = { latitude = "lat", longitude = "lon" }
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Dataset entries, in file order.
    #[serde(default, rename = "dataset")]
    pub datasets: Vec<ManifestEntry>,
}

/// One dataset entry of a manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    /// Dotted dataset id the entry answers for.
    pub id: String,
    /// NetCDF file, relative to the manifest unless absolute.
    pub path: PathBuf,
    /// Variable to read; defaults to the id's variable part.
    #[serde(default)]
    pub variable: Option<String>,
    /// Overrides the file's `cell_methods`-derived timestamp alignment.
    #[serde(default)]
    pub time_alignment: Option<String>,
    /// Dimension renames applied right after reading, file name to new name.
    #[serde(default)]
    pub rename: BTreeMap<String, String>,
}

impl Manifest {
    /// Parses manifest text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Manifest`] on TOML syntax or schema problems,
    /// with `path` attached for context.
    pub fn parse(text: &str, path: &Path) -> Result<Self, CatalogError> {
        toml::from_str(text).map_err(|e| CatalogError::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Loads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::FileNotFound`] when the file does not exist and
    /// [`CatalogError::Manifest`] on read or parse failures.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|e| CatalogError::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&text, path)
    }
}
