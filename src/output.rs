//! Result tables and run summaries: Parquet and JSON writers.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    ArrayRef, Float64Array, Int32Array, RecordBatch, StringArray, UInt8Array, UInt32Array,
    UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use serde::Serialize;

use hyetos_climatology::DiurnalCycle;
use hyetos_grid::{DIM_LAT, DIM_LON, LabeledArray};
use hyetos_hist::{ConditionalCdf, Hist2d, IntensitySpectrum};

/// Parquet compression codec for the output tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// Store pages uncompressed.
    None,
    /// Snappy, the fast default.
    #[default]
    Snappy,
    /// Zstd at level 3, smaller files at some CPU cost.
    Zstd,
}

/// Settings shared by every Parquet table a pipeline writes.
#[derive(Debug, Clone)]
pub struct WriterSettings {
    compression: Compression,
    /// Upper bound on rows per row group.
    row_group_size: usize,
}

impl Default for WriterSettings {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            row_group_size: 1_000_000,
        }
    }
}

impl WriterSettings {
    /// Sets the compression codec.
    pub fn with_compression(mut self, comp: Compression) -> Self {
        self.compression = comp;
        self
    }

    /// Caps the number of rows per row group.
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    fn properties(&self) -> Result<WriterProperties> {
        if self.row_group_size == 0 {
            bail!("row_group_size must be greater than 0");
        }
        let compression = match self.compression {
            Compression::None => parquet::basic::Compression::UNCOMPRESSED,
            Compression::Snappy => parquet::basic::Compression::SNAPPY,
            Compression::Zstd => {
                let level =
                    parquet::basic::ZstdLevel::try_new(3).context("invalid zstd level")?;
                parquet::basic::Compression::ZSTD(level)
            }
        };
        Ok(WriterProperties::builder()
            .set_compression(compression)
            .set_max_row_group_size(self.row_group_size)
            .build())
    }
}

/// Writes one record batch to a Parquet file at `path`.
fn write_batch(path: &Path, batch: RecordBatch, settings: &WriterSettings) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(settings.properties()?))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Writes the joint-histogram bin table: one row per (precipitation bin,
/// temperature bin) cell with its count and conditional CDF value.
pub fn write_joint_bins(
    path: &Path,
    hist: &Hist2d,
    cdf: &ConditionalCdf,
    settings: &WriterSettings,
) -> Result<()> {
    let x_centers = hist.x_edges().centers();
    let y_centers = hist.y_edges().centers();
    let n = x_centers.len() * y_centers.len();

    let mut precip_bin = Vec::with_capacity(n);
    let mut temp_bin = Vec::with_capacity(n);
    let mut precip_center = Vec::with_capacity(n);
    let mut temp_center = Vec::with_capacity(n);
    let mut count = Vec::with_capacity(n);
    let mut cdf_value = Vec::with_capacity(n);
    for i in 0..x_centers.len() {
        for j in 0..y_centers.len() {
            precip_bin.push(i as u32);
            temp_bin.push(j as u32);
            precip_center.push(x_centers[i]);
            temp_center.push(y_centers[j]);
            count.push(hist.counts()[[i, j]]);
            cdf_value.push(cdf.values()[[i, j]]);
        }
    }

    let schema = Schema::new(vec![
        Field::new("precip_bin", DataType::UInt32, false),
        Field::new("temp_bin", DataType::UInt32, false),
        Field::new("precip_center", DataType::Float64, false),
        Field::new("temp_center", DataType::Float64, false),
        Field::new("count", DataType::UInt64, false),
        Field::new("cdf", DataType::Float64, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(UInt32Array::from(precip_bin)),
        Arc::new(UInt32Array::from(temp_bin)),
        Arc::new(Float64Array::from(precip_center)),
        Arc::new(Float64Array::from(temp_center)),
        Arc::new(UInt64Array::from(count)),
        Arc::new(Float64Array::from(cdf_value)),
    ];
    let batch = RecordBatch::try_new(Arc::new(schema), columns)?;
    write_batch(path, batch, settings)
}

/// Writes the diurnal-cycle table: one row per (year, hour, lat, lon) group
/// with its mean value and the number of time samples behind it.
pub fn write_diurnal(
    path: &Path,
    cycle: &DiurnalCycle,
    settings: &WriterSettings,
) -> Result<()> {
    let means = cycle.means();
    if means.dims().len() != 4 {
        bail!(
            "diurnal table expects (year, hour, lat, lon) means, got ({})",
            means.dims().join(", ")
        );
    }
    let lat_axis = means.axis_of(DIM_LAT)?;
    let lon_axis = means.axis_of(DIM_LON)?;
    let lats = means.coord(DIM_LAT)?.to_vec();
    let lons = means.coord(DIM_LON)?.to_vec();

    let n = cycle.years().len() * cycle.hours().len() * lats.len() * lons.len();
    let mut year = Vec::with_capacity(n);
    let mut hour = Vec::with_capacity(n);
    let mut lat = Vec::with_capacity(n);
    let mut lon = Vec::with_capacity(n);
    let mut mean = Vec::with_capacity(n);
    let mut samples = Vec::with_capacity(n);
    let mut idx = vec![0usize; 4];
    for (yi, &y) in cycle.years().iter().enumerate() {
        for (hi, &h) in cycle.hours().iter().enumerate() {
            let group_samples = cycle.counts()[[yi, hi]];
            for (li, &la) in lats.iter().enumerate() {
                for (oi, &lo) in lons.iter().enumerate() {
                    idx[0] = yi;
                    idx[1] = hi;
                    idx[lat_axis] = li;
                    idx[lon_axis] = oi;
                    year.push(y);
                    hour.push(h);
                    lat.push(la);
                    lon.push(lo);
                    mean.push(means.data()[idx.as_slice()]);
                    samples.push(group_samples);
                }
            }
        }
    }

    let schema = Schema::new(vec![
        Field::new("year", DataType::Int32, false),
        Field::new("hour", DataType::UInt8, false),
        Field::new("lat", DataType::Float64, false),
        Field::new("lon", DataType::Float64, false),
        Field::new("mean", DataType::Float64, false),
        Field::new("samples", DataType::UInt64, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from(year)),
        Arc::new(UInt8Array::from(hour)),
        Arc::new(Float64Array::from(lat)),
        Arc::new(Float64Array::from(lon)),
        Arc::new(Float64Array::from(mean)),
        Arc::new(UInt64Array::from(samples)),
    ];
    let batch = RecordBatch::try_new(Arc::new(schema), columns)?;
    write_batch(path, batch, settings)
}

/// Writes the amplitude/phase table: one row per (year, lat, lon) cell.
///
/// `amplitude` and `phase` must live on the same (year, lat, lon) grid, as
/// produced from one diurnal cycle.
pub fn write_phase(
    path: &Path,
    years: &[i32],
    amplitude: &LabeledArray,
    phase: &LabeledArray,
    settings: &WriterSettings,
) -> Result<()> {
    amplitude.same_layout(phase)?;
    if amplitude.dims().len() != 3 {
        bail!(
            "amplitude/phase table expects (year, lat, lon) fields, got ({})",
            amplitude.dims().join(", ")
        );
    }
    let lat_axis = amplitude.axis_of(DIM_LAT)?;
    let lon_axis = amplitude.axis_of(DIM_LON)?;
    let lats = amplitude.coord(DIM_LAT)?.to_vec();
    let lons = amplitude.coord(DIM_LON)?.to_vec();

    let n = years.len() * lats.len() * lons.len();
    let mut year = Vec::with_capacity(n);
    let mut lat = Vec::with_capacity(n);
    let mut lon = Vec::with_capacity(n);
    let mut amp = Vec::with_capacity(n);
    let mut peak = Vec::with_capacity(n);
    let mut idx = vec![0usize; 3];
    for (yi, &y) in years.iter().enumerate() {
        for (li, &la) in lats.iter().enumerate() {
            for (oi, &lo) in lons.iter().enumerate() {
                idx[0] = yi;
                idx[lat_axis] = li;
                idx[lon_axis] = oi;
                year.push(y);
                lat.push(la);
                lon.push(lo);
                amp.push(amplitude.data()[idx.as_slice()]);
                peak.push(phase.data()[idx.as_slice()]);
            }
        }
    }

    let schema = Schema::new(vec![
        Field::new("year", DataType::Int32, false),
        Field::new("lat", DataType::Float64, false),
        Field::new("lon", DataType::Float64, false),
        Field::new("amplitude", DataType::Float64, false),
        Field::new("phase", DataType::Float64, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from(year)),
        Arc::new(Float64Array::from(lat)),
        Arc::new(Float64Array::from(lon)),
        Arc::new(Float64Array::from(amp)),
        Arc::new(Float64Array::from(peak)),
    ];
    let batch = RecordBatch::try_new(Arc::new(schema), columns)?;
    write_batch(path, batch, settings)
}

/// Writes intensity spectra as one long table: a `series` tag per spectrum
/// and one row per (year, lat, bin) with its probability mass.
///
/// All spectra must share the bin edges; rows of different series are then
/// directly comparable.
pub fn write_intensity(
    path: &Path,
    spectra: &[(&str, &IntensitySpectrum)],
    settings: &WriterSettings,
) -> Result<()> {
    let n: usize = spectra
        .iter()
        .map(|(_, s)| s.years().len() * s.lats().len() * s.edges().n_bins())
        .sum();
    let mut series: Vec<&str> = Vec::with_capacity(n);
    let mut year = Vec::with_capacity(n);
    let mut lat = Vec::with_capacity(n);
    let mut bin = Vec::with_capacity(n);
    let mut center = Vec::with_capacity(n);
    let mut pmf = Vec::with_capacity(n);
    let mut samples = Vec::with_capacity(n);
    for (name, spectrum) in spectra {
        let centers = spectrum.edges().centers();
        for (yi, &y) in spectrum.years().iter().enumerate() {
            for (li, &la) in spectrum.lats().iter().enumerate() {
                let binned = spectrum.binned()[[yi, li]];
                for (b, &c) in centers.iter().enumerate() {
                    series.push(name);
                    year.push(y);
                    lat.push(la);
                    bin.push(b as u32);
                    center.push(c);
                    pmf.push(spectrum.pmf()[[yi, li, b]]);
                    samples.push(binned);
                }
            }
        }
    }

    let schema = Schema::new(vec![
        Field::new("series", DataType::Utf8, false),
        Field::new("year", DataType::Int32, false),
        Field::new("lat", DataType::Float64, false),
        Field::new("bin", DataType::UInt32, false),
        Field::new("center", DataType::Float64, false),
        Field::new("pmf", DataType::Float64, false),
        Field::new("samples", DataType::UInt64, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(series)),
        Arc::new(Int32Array::from(year)),
        Arc::new(Float64Array::from(lat)),
        Arc::new(UInt32Array::from(bin)),
        Arc::new(Float64Array::from(center)),
        Arc::new(Float64Array::from(pmf)),
        Arc::new(UInt64Array::from(samples)),
    ];
    let batch = RecordBatch::try_new(Arc::new(schema), columns)?;
    write_batch(path, batch, settings)
}

/// Serializes `summary` as pretty JSON to `path`.
pub fn write_summary<T: Serialize>(path: &Path, summary: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("failed to serialize summary")?;
    std::fs::write(path, &json)
        .with_context(|| format!("failed to write summary: {}", path.display()))?;
    Ok(())
}

/// Top-level summary of a joint-histogram run.
#[derive(Debug, Serialize)]
pub struct JointSummary {
    /// Configuration the run used.
    pub config: JointRunConfig,
    /// Where the recorded pairs went.
    pub samples: PairTally,
    pub precip_edges: Vec<f64>,
    pub temp_edges: Vec<f64>,
    pub temp_centers: Vec<f64>,
    /// Empirical precipitation quantile per temperature bin.
    pub quantile_curve: Vec<f64>,
    /// Theoretical reference curve at the same temperature centers.
    pub scaling_curve: Vec<f64>,
    /// The data point the theoretical curve is pinned to, if any.
    pub anchor: Option<ScalingAnchor>,
}

/// Summary of the joint configuration used.
#[derive(Debug, Serialize)]
pub struct JointRunConfig {
    pub precip: String,
    pub temperature: String,
    pub lat_range: [f64; 2],
    pub lon_range: [f64; 2],
    pub quantile: f64,
    pub min_samples: u64,
    pub cc_rate: f64,
    pub ref_temp: f64,
    pub chunk_len: usize,
    pub max_retries: u32,
}

/// Sample accounting of a joint histogram.
#[derive(Debug, Serialize)]
pub struct PairTally {
    pub recorded: u64,
    pub binned: u64,
    pub precip_below: u64,
    pub precip_above: u64,
    pub temp_below: u64,
    pub temp_above: u64,
    pub non_finite: u64,
}

impl PairTally {
    /// Reads the tallies out of a finished histogram.
    pub fn from_hist(hist: &Hist2d) -> Self {
        let dropped = hist.dropped();
        Self {
            recorded: hist.recorded(),
            binned: hist.binned(),
            precip_below: dropped.x_below,
            precip_above: dropped.x_above,
            temp_below: dropped.y_below,
            temp_above: dropped.y_above,
            non_finite: dropped.non_finite,
        }
    }
}

/// The empirical point the theoretical scaling curve passes through.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScalingAnchor {
    pub temp: f64,
    pub precip: f64,
}

/// Top-level summary of a climatology run.
#[derive(Debug, Serialize)]
pub struct ClimatologySummary {
    /// Configuration the run used.
    pub config: ClimatologyRunConfig,
    pub diurnal: DiurnalSummary,
    pub native: SpectrumTally,
    pub daily: SpectrumTally,
    pub reference: Option<SpectrumTally>,
    pub intensity_edges: Vec<f64>,
}

/// Summary of the climatology configuration used.
#[derive(Debug, Serialize)]
pub struct ClimatologyRunConfig {
    pub precip: String,
    pub reference: Option<String>,
    pub lat_range: [f64; 2],
    pub lon_range: [f64; 2],
    pub phase_scale: f64,
}

/// Shape of the aggregated diurnal cycle.
#[derive(Debug, Serialize)]
pub struct DiurnalSummary {
    pub years: Vec<i32>,
    pub hours: Vec<u8>,
    pub groups: usize,
    pub samples: u64,
}

/// Sample accounting of one intensity spectrum.
#[derive(Debug, Serialize)]
pub struct SpectrumTally {
    pub years: usize,
    pub lats: usize,
    pub binned: u64,
    pub below: u64,
    pub above: u64,
    pub non_finite: u64,
}

impl SpectrumTally {
    /// Sums the per-(year, lat) tallies of a finished spectrum.
    pub fn from_spectrum(spectrum: &IntensitySpectrum) -> Self {
        Self {
            years: spectrum.years().len(),
            lats: spectrum.lats().len(),
            binned: spectrum.binned().iter().sum(),
            below: spectrum.below().iter().sum(),
            above: spectrum.above().iter().sum(),
            non_finite: spectrum.non_finite().iter().sum(),
        }
    }
}
