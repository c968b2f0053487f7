//! Joint command: joint precipitation-temperature histogram with scaling
//! curves.

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use hyetos_catalog::{Catalog, FileCatalog, normalize};
use hyetos_grid::{DIM_LAT, Unit};
use hyetos_hist::{ConditionalCdf, joint_histogram, scaling_curve};
use hyetos_time::align_to;

use crate::cli::RunArgs;
use crate::config::HyetosConfig;
use crate::convert;
use crate::output::{self, ScalingAnchor};

/// Run the joint histogram pipeline.
pub fn run(args: RunArgs) -> Result<()> {
    let _cmd = info_span!("joint").entered();
    // 1. Load project TOML
    let toml_str = std::fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read config file: {}", args.config.display()))?;
    let config: HyetosConfig = toml::from_str(&toml_str).context("failed to parse TOML config")?;
    let joint = &config.joint;

    // 2. Resolve both datasets and bring them onto canonical units
    let precip_id = convert::parse_dataset_id(joint.precip.as_ref(), "[joint].precip")?;
    let temp_id = convert::parse_dataset_id(joint.temperature.as_ref(), "[joint].temperature")?;
    let catalog = FileCatalog::open(&config.catalog.manifest).with_context(|| {
        format!(
            "failed to open catalog manifest: {}",
            config.catalog.manifest.display()
        )
    })?;

    info!(id = %precip_id, "resolving precipitation dataset");
    let precip = catalog
        .resolve(&precip_id)
        .with_context(|| format!("failed to resolve dataset '{precip_id}'"))?;
    let precip = normalize(precip, &Unit::KgPerM2PerS)
        .context("failed to normalize precipitation onto kg m-2 s-1")?;

    info!(id = %temp_id, "resolving temperature dataset");
    let temperature = catalog
        .resolve(&temp_id)
        .with_context(|| format!("failed to resolve dataset '{temp_id}'"))?;
    let temperature =
        normalize(temperature, &Unit::Kelvin).context("failed to normalize temperature onto K")?;

    // 3. Align temperature onto the precipitation time grid
    let (pr, pr_grid) = precip.into_parts();
    let (tas, tas_grid) = temperature.into_parts();
    let tas = align_to(&tas, &tas_grid, &pr_grid)
        .context("failed to align temperature onto the precipitation grid")?;
    info!(samples = pr_grid.len(), "grids aligned");

    // 4. Select the analysis region
    let [lat_lo, lat_hi] = joint.lat_range;
    let [lon_lo, lon_hi] = joint.lon_range;
    let pr = pr
        .select_range(DIM_LAT, lat_lo, lat_hi)?
        .select_lon_range(lon_lo, lon_hi)?;
    let tas = tas
        .select_range(DIM_LAT, lat_lo, lat_hi)?
        .select_lon_range(lon_lo, lon_hi)?;
    info!(shape = ?pr.shape(), "region selected");

    // 5. Accumulate the joint histogram in parallel chunks
    let precip_edges = convert::build_precip_edges(joint)?;
    let temp_edges = convert::build_temp_edges(joint)?;
    let policy = convert::build_retry_policy(&config.exec);
    let hist = joint_histogram(
        &pr,
        &tas,
        &precip_edges,
        &temp_edges,
        config.exec.chunk_len,
        &policy,
    )?;
    info!(
        binned = hist.binned(),
        dropped = hist.dropped().total(),
        "joint histogram accumulated"
    );

    // 6. Conditional CDF, empirical quantile curve, theoretical curve
    let cdf = ConditionalCdf::from_hist(&hist);
    let quantile_curve = cdf.quantile_curve(joint.quantile, joint.min_samples)?;
    let temp_centers = temp_edges.centers();
    let anchor = anchor_scaling(&temp_centers, &quantile_curve, joint.ref_temp);
    let theoretical = match anchor {
        Some(a) => scaling_curve(&temp_centers, a.temp, a.precip, joint.cc_rate),
        None => {
            warn!("no temperature bin reached min_samples; scaling curve left unanchored");
            scaling_curve(&temp_centers, joint.ref_temp, f64::NAN, joint.cc_rate)
        }
    };

    // 7. Write the bin table and the run summary
    let out_dir = args.out_dir.unwrap_or_else(|| joint.output.dir.clone());
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output directory: {}", out_dir.display()))?;
    let settings = convert::build_writer_settings(&config.output)?;

    let bins_path = out_dir.join(&joint.output.bins);
    output::write_joint_bins(&bins_path, &hist, &cdf, &settings)?;
    info!(path = %bins_path.display(), "bin table written");

    let summary = output::JointSummary {
        config: output::JointRunConfig {
            precip: precip_id.to_string(),
            temperature: temp_id.to_string(),
            lat_range: joint.lat_range,
            lon_range: joint.lon_range,
            quantile: joint.quantile,
            min_samples: joint.min_samples,
            cc_rate: joint.cc_rate,
            ref_temp: joint.ref_temp,
            chunk_len: config.exec.chunk_len,
            max_retries: config.exec.max_retries,
        },
        samples: output::PairTally::from_hist(&hist),
        precip_edges: precip_edges.edges().to_vec(),
        temp_edges: temp_edges.edges().to_vec(),
        temp_centers,
        quantile_curve,
        scaling_curve: theoretical,
        anchor,
    };
    let summary_path = out_dir.join(&joint.output.summary);
    output::write_summary(&summary_path, &summary)?;
    info!(path = %summary_path.display(), "summary written");

    Ok(())
}

/// Pins the theoretical curve to the empirical quantile nearest `ref_temp`.
///
/// Bins whose quantile is NaN (too few samples) cannot anchor; when no bin
/// can, the curve stays unanchored.
fn anchor_scaling(temp_centers: &[f64], quantile: &[f64], ref_temp: f64) -> Option<ScalingAnchor> {
    temp_centers
        .iter()
        .zip(quantile)
        .filter(|(_, q)| q.is_finite())
        .min_by(|(a, _), (b, _)| (**a - ref_temp).abs().total_cmp(&(**b - ref_temp).abs()))
        .map(|(&temp, &precip)| ScalingAnchor { temp, precip })
}
