//! Pure conversions: TOML config structs into crate API types.

use anyhow::{Result, bail};

use hyetos_catalog::DatasetId;
use hyetos_exec::RetryPolicy;
use hyetos_grid::Unit;
use hyetos_hist::BinEdges;

use crate::config::{ClimatologyToml, ExecToml, JointToml, OutputToml};
use crate::output::{Compression, WriterSettings};

/// Parses a Parquet compression codec name into the corresponding enum variant.
pub fn parse_compression(s: &str) -> Result<Compression> {
    match s.to_ascii_lowercase().as_str() {
        "none" => Ok(Compression::None),
        "snappy" => Ok(Compression::Snappy),
        "zstd" => Ok(Compression::Zstd),
        other => bail!("unknown compression codec: {other:?}"),
    }
}

/// Parses a dataset id out of an optional config field.
///
/// `key` names the TOML location for the error message, e.g. `[joint].precip`.
pub fn parse_dataset_id(field: Option<&String>, key: &str) -> Result<DatasetId> {
    let value = field.ok_or_else(|| anyhow::anyhow!("no dataset id: set {key} in config"))?;
    Ok(DatasetId::parse(value)?)
}

/// Builds a [`RetryPolicy`] from the TOML exec configuration.
pub fn build_retry_policy(exec: &ExecToml) -> RetryPolicy {
    RetryPolicy::new().with_max_retries(exec.max_retries)
}

/// Builds the log-spaced precipitation edges of the joint histogram.
pub fn build_precip_edges(joint: &JointToml) -> Result<BinEdges> {
    Ok(BinEdges::log10(
        joint.precip_lo,
        joint.precip_hi,
        joint.precip_bins,
        Unit::KgPerM2PerS,
    )?)
}

/// Builds the linear temperature edges of the joint histogram.
pub fn build_temp_edges(joint: &JointToml) -> Result<BinEdges> {
    Ok(BinEdges::linear(
        joint.temp_lo,
        joint.temp_hi,
        joint.temp_bins,
        Unit::Kelvin,
    )?)
}

/// Builds the log-spaced edges shared by every intensity spectrum.
pub fn build_intensity_edges(climatology: &ClimatologyToml) -> Result<BinEdges> {
    Ok(BinEdges::log10(
        climatology.intensity_lo,
        climatology.intensity_hi,
        climatology.intensity_bins,
        Unit::KgPerM2PerS,
    )?)
}

/// Builds a [`WriterSettings`] from the TOML output configuration.
pub fn build_writer_settings(output: &OutputToml) -> Result<WriterSettings> {
    let compression = parse_compression(&output.compression)?;
    Ok(WriterSettings::default()
        .with_compression(compression)
        .with_row_group_size(output.row_group_size))
}
