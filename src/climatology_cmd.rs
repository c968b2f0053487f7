//! Climatology command: diurnal cycle and precipitation intensity spectra.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use hyetos_catalog::{Catalog, DatasetId, FileCatalog, normalize};
use hyetos_climatology::{daily_mean, diurnal_cycle};
use hyetos_grid::{DIM_LAT, LabeledArray, Unit};
use hyetos_hist::{IntensitySpectrum, intensity_spectrum};

use crate::cli::RunArgs;
use crate::config::{ClimatologyToml, HyetosConfig};
use crate::convert;
use crate::output;

/// Run the climatology pipeline.
pub fn run(args: RunArgs) -> Result<()> {
    let _cmd = info_span!("climatology").entered();
    // 1. Load project TOML
    let toml_str = std::fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read config file: {}", args.config.display()))?;
    let config: HyetosConfig = toml::from_str(&toml_str).context("failed to parse TOML config")?;
    let clim = &config.climatology;

    // 2. Resolve the precipitation dataset
    let precip_id = convert::parse_dataset_id(clim.precip.as_ref(), "[climatology].precip")?;
    let catalog = FileCatalog::open(&config.catalog.manifest).with_context(|| {
        format!(
            "failed to open catalog manifest: {}",
            config.catalog.manifest.display()
        )
    })?;

    info!(id = %precip_id, "resolving precipitation dataset");
    let dataset = catalog
        .resolve(&precip_id)
        .with_context(|| format!("failed to resolve dataset '{precip_id}'"))?;
    let dataset = normalize(dataset, &Unit::KgPerM2PerS)
        .context("failed to normalize precipitation onto kg m-2 s-1")?;
    let (pr, grid) = dataset.into_parts();

    // 3. Select the analysis region
    let pr = select_region(pr, clim)?;
    info!(shape = ?pr.shape(), "region selected");

    // 4. Diurnal cycle, amplitude, peak hour
    let cycle = diurnal_cycle(&pr, &grid)?;
    let amplitude = cycle.amplitude()?;
    let phase = cycle.phase(clim.phase_scale)?;
    info!(
        years = cycle.years().len(),
        hours = cycle.hours().len(),
        "diurnal cycle aggregated"
    );

    // 5. Intensity spectra at native and daily cadence
    let edges = convert::build_intensity_edges(clim)?;
    let native = intensity_spectrum(&pr, &grid, &edges)?;
    let (pr_daily, daily_grid) = daily_mean(&pr, &grid)?;
    let daily = intensity_spectrum(&pr_daily, &daily_grid, &edges)?;
    info!(
        native_samples = grid.len(),
        days = daily_grid.len(),
        "intensity spectra accumulated"
    );

    // 6. Optional observational reference through the identical binning
    let reference: Option<(DatasetId, IntensitySpectrum)> = match &clim.reference {
        Some(id_str) => {
            let ref_id = DatasetId::parse(id_str)?;
            info!(id = %ref_id, "resolving reference dataset");
            let obs = catalog
                .resolve(&ref_id)
                .with_context(|| format!("failed to resolve dataset '{ref_id}'"))?;
            let obs = normalize(obs, &Unit::KgPerM2PerS)
                .with_context(|| format!("failed to normalize reference '{ref_id}'"))?;
            let (obs_pr, obs_grid) = obs.into_parts();
            let obs_pr = select_region(obs_pr, clim)?;
            let spectrum = intensity_spectrum(&obs_pr, &obs_grid, &edges)?;
            Some((ref_id, spectrum))
        }
        None => None,
    };

    // 7. Write the tables and the run summary
    let out_dir = args.out_dir.unwrap_or_else(|| clim.output.dir.clone());
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output directory: {}", out_dir.display()))?;
    let settings = convert::build_writer_settings(&config.output)?;

    let diurnal_path = out_dir.join(&clim.output.diurnal);
    output::write_diurnal(&diurnal_path, &cycle, &settings)?;
    info!(path = %diurnal_path.display(), "diurnal table written");

    let phase_path = out_dir.join(&clim.output.phase);
    output::write_phase(&phase_path, cycle.years(), &amplitude, &phase, &settings)?;
    info!(path = %phase_path.display(), "amplitude/phase table written");

    let mut spectra: Vec<(&str, &IntensitySpectrum)> =
        vec![("native", &native), ("daily", &daily)];
    if let Some((_, spectrum)) = &reference {
        spectra.push(("reference", spectrum));
    }
    let intensity_path = out_dir.join(&clim.output.intensity);
    output::write_intensity(&intensity_path, &spectra, &settings)?;
    info!(path = %intensity_path.display(), "intensity table written");

    let summary = output::ClimatologySummary {
        config: output::ClimatologyRunConfig {
            precip: precip_id.to_string(),
            reference: reference.as_ref().map(|(id, _)| id.to_string()),
            lat_range: clim.lat_range,
            lon_range: clim.lon_range,
            phase_scale: clim.phase_scale,
        },
        diurnal: output::DiurnalSummary {
            years: cycle.years().to_vec(),
            hours: cycle.hours().to_vec(),
            groups: cycle.years().len() * cycle.hours().len(),
            samples: cycle.counts().sum(),
        },
        native: output::SpectrumTally::from_spectrum(&native),
        daily: output::SpectrumTally::from_spectrum(&daily),
        reference: reference
            .as_ref()
            .map(|(_, spectrum)| output::SpectrumTally::from_spectrum(spectrum)),
        intensity_edges: edges.edges().to_vec(),
    };
    let summary_path = out_dir.join(&clim.output.summary);
    output::write_summary(&summary_path, &summary)?;
    info!(path = %summary_path.display(), "summary written");

    Ok(())
}

/// Restricts a field to the configured latitude and longitude ranges.
fn select_region(var: LabeledArray, clim: &ClimatologyToml) -> Result<LabeledArray> {
    let [lat_lo, lat_hi] = clim.lat_range;
    let [lon_lo, lon_hi] = clim.lon_range;
    Ok(var
        .select_range(DIM_LAT, lat_lo, lat_hi)?
        .select_lon_range(lon_lo, lon_hi)?)
}
