use std::path::PathBuf;

use serde::Deserialize;

/// Top-level hyetos configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HyetosConfig {
    /// Dataset catalog settings.
    #[serde(default)]
    pub catalog: CatalogToml,

    /// Chunked execution settings.
    #[serde(default)]
    pub exec: ExecToml,

    /// Output encoding settings.
    #[serde(default)]
    pub output: OutputToml,

    /// Joint histogram pipeline settings.
    #[serde(default)]
    pub joint: JointToml,

    /// Climatology pipeline settings.
    #[serde(default)]
    pub climatology: ClimatologyToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogToml {
    /// Path to the dataset manifest, relative paths resolving against the
    /// working directory.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

impl Default for CatalogToml {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
        }
    }
}

fn default_manifest() -> PathBuf {
    PathBuf::from("catalog.toml")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecToml {
    /// Samples per chunk of the parallel histogram accumulation.
    #[serde(default = "default_chunk_len")]
    pub chunk_len: usize,
    /// Retries granted to a transiently failing chunk computation.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for ExecToml {
    fn default() -> Self {
        Self {
            chunk_len: default_chunk_len(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_chunk_len() -> usize {
    262_144
}
fn default_max_retries() -> u32 {
    4
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputToml {
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
}

impl Default for OutputToml {
    fn default() -> Self {
        Self {
            compression: default_compression(),
            row_group_size: default_row_group_size(),
        }
    }
}

fn default_compression() -> String {
    "snappy".to_string()
}
fn default_row_group_size() -> usize {
    1_000_000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JointToml {
    /// Precipitation dataset id (`source.experiment.member.variable`).
    pub precip: Option<String>,
    /// Temperature dataset id.
    pub temperature: Option<String>,
    /// Inclusive latitude range, degrees north.
    #[serde(default = "default_lat_range")]
    pub lat_range: [f64; 2],
    /// Inclusive longitude range on the 0-360 circle; lo > hi wraps.
    #[serde(default = "default_lon_range")]
    pub lon_range: [f64; 2],
    #[serde(default = "default_precip_lo")]
    pub precip_lo: f64,
    #[serde(default = "default_precip_hi")]
    pub precip_hi: f64,
    #[serde(default = "default_precip_bins")]
    pub precip_bins: usize,
    #[serde(default = "default_temp_lo")]
    pub temp_lo: f64,
    #[serde(default = "default_temp_hi")]
    pub temp_hi: f64,
    #[serde(default = "default_temp_bins")]
    pub temp_bins: usize,
    /// Probability level of the extreme-precipitation curve.
    #[serde(default = "default_quantile")]
    pub quantile: f64,
    /// Minimum samples a temperature bin needs before its quantile counts.
    #[serde(default = "default_min_samples")]
    pub min_samples: u64,
    /// Fractional precipitation increase per kelvin in the reference curve.
    #[serde(default = "default_cc_rate")]
    pub cc_rate: f64,
    /// Temperature at which the reference curve is anchored to the data.
    #[serde(default = "default_ref_temp")]
    pub ref_temp: f64,
    #[serde(default)]
    pub output: JointOutputToml,
}

impl Default for JointToml {
    fn default() -> Self {
        Self {
            precip: None,
            temperature: None,
            lat_range: default_lat_range(),
            lon_range: default_lon_range(),
            precip_lo: default_precip_lo(),
            precip_hi: default_precip_hi(),
            precip_bins: default_precip_bins(),
            temp_lo: default_temp_lo(),
            temp_hi: default_temp_hi(),
            temp_bins: default_temp_bins(),
            quantile: default_quantile(),
            min_samples: default_min_samples(),
            cc_rate: default_cc_rate(),
            ref_temp: default_ref_temp(),
            output: JointOutputToml::default(),
        }
    }
}

fn default_lat_range() -> [f64; 2] {
    [-90.0, 90.0]
}
fn default_lon_range() -> [f64; 2] {
    [0.0, 360.0]
}
fn default_precip_lo() -> f64 {
    1e-7
}
fn default_precip_hi() -> f64 {
    1e-2
}
fn default_precip_bins() -> usize {
    50
}
fn default_temp_lo() -> f64 {
    270.0
}
fn default_temp_hi() -> f64 {
    314.0
}
fn default_temp_bins() -> usize {
    22
}
fn default_quantile() -> f64 {
    0.99
}
fn default_min_samples() -> u64 {
    100
}
fn default_cc_rate() -> f64 {
    0.07
}
fn default_ref_temp() -> f64 {
    290.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JointOutputToml {
    #[serde(default = "default_out_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_joint_bins")]
    pub bins: PathBuf,
    #[serde(default = "default_joint_summary")]
    pub summary: PathBuf,
}

impl Default for JointOutputToml {
    fn default() -> Self {
        Self {
            dir: default_out_dir(),
            bins: default_joint_bins(),
            summary: default_joint_summary(),
        }
    }
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("out")
}
fn default_joint_bins() -> PathBuf {
    PathBuf::from("joint_bins.parquet")
}
fn default_joint_summary() -> PathBuf {
    PathBuf::from("joint_summary.json")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClimatologyToml {
    /// Precipitation dataset id (`source.experiment.member.variable`).
    pub precip: Option<String>,
    /// Observational reference dataset id, normalized before binning.
    #[serde(default)]
    pub reference: Option<String>,
    /// Inclusive latitude range, degrees north.
    #[serde(default = "default_lat_range")]
    pub lat_range: [f64; 2],
    /// Inclusive longitude range on the 0-360 circle; lo > hi wraps.
    #[serde(default = "default_lon_range")]
    pub lon_range: [f64; 2],
    #[serde(default = "default_precip_lo")]
    pub intensity_lo: f64,
    #[serde(default = "default_precip_hi")]
    pub intensity_hi: f64,
    #[serde(default = "default_precip_bins")]
    pub intensity_bins: usize,
    /// Factor applied to peak-hour labels (1.0 keeps plain hours).
    #[serde(default = "default_phase_scale")]
    pub phase_scale: f64,
    #[serde(default)]
    pub output: ClimatologyOutputToml,
}

impl Default for ClimatologyToml {
    fn default() -> Self {
        Self {
            precip: None,
            reference: None,
            lat_range: default_lat_range(),
            lon_range: default_lon_range(),
            intensity_lo: default_precip_lo(),
            intensity_hi: default_precip_hi(),
            intensity_bins: default_precip_bins(),
            phase_scale: default_phase_scale(),
            output: ClimatologyOutputToml::default(),
        }
    }
}

fn default_phase_scale() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClimatologyOutputToml {
    #[serde(default = "default_out_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_diurnal")]
    pub diurnal: PathBuf,
    #[serde(default = "default_phase")]
    pub phase: PathBuf,
    #[serde(default = "default_intensity")]
    pub intensity: PathBuf,
    #[serde(default = "default_climatology_summary")]
    pub summary: PathBuf,
}

impl Default for ClimatologyOutputToml {
    fn default() -> Self {
        Self {
            dir: default_out_dir(),
            diurnal: default_diurnal(),
            phase: default_phase(),
            intensity: default_intensity(),
            summary: default_climatology_summary(),
        }
    }
}

fn default_diurnal() -> PathBuf {
    PathBuf::from("diurnal.parquet")
}
fn default_phase() -> PathBuf {
    PathBuf::from("phase.parquet")
}
fn default_intensity() -> PathBuf {
    PathBuf::from("intensity.parquet")
}
fn default_climatology_summary() -> PathBuf {
    PathBuf::from("climatology_summary.json")
}
