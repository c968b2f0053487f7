//! Chunk-parallel joint histogram of two fields on a shared grid.

use hyetos_exec::{ChunkPlan, RetryPolicy, map_reduce};
use hyetos_grid::LabeledArray;
use tracing::debug;

use crate::bins::{BinEdges, check_units};
use crate::error::HistError;
use crate::hist2d::Hist2d;

/// Accumulates the joint histogram of paired `(x, y)` samples from two
/// fields that live on the same grid.
///
/// The fields are flattened in row-major order and split into chunks of
/// `chunk_len` sample pairs; each chunk counts into its own partial
/// [`Hist2d`] and the partials merge associatively, so the result is
/// identical for any chunk length and worker count. Transient chunk
/// failures are retried under `policy`.
///
/// Units are checked before any value is binned: `x` must carry the units of
/// `x_edges` and `y` those of `y_edges`.
///
/// # Errors
///
/// Returns [`HistError::UnitMismatch`] on a unit disagreement,
/// [`HistError::Grid`] when the two fields do not share a grid, and
/// [`HistError::Compute`] when a chunk fails past its retry budget.
pub fn joint_histogram(
    x: &LabeledArray,
    y: &LabeledArray,
    x_edges: &BinEdges,
    y_edges: &BinEdges,
    chunk_len: usize,
    policy: &RetryPolicy,
) -> Result<Hist2d, HistError> {
    check_units(x, x_edges)?;
    check_units(y, y_edges)?;
    x.same_layout(y)?;

    let x_vals = x.flat_values();
    let y_vals = y.flat_values();
    let plan = ChunkPlan::new(x_vals.len(), chunk_len)?;
    debug!(
        x = x.name(),
        y = y.name(),
        pairs = plan.len(),
        chunks = plan.n_chunks(),
        "accumulating joint histogram"
    );

    let hist = map_reduce(
        &plan,
        policy,
        || Hist2d::new(x_edges.clone(), y_edges.clone()),
        |chunk| {
            let mut partial = Hist2d::new(x_edges.clone(), y_edges.clone());
            for (&xv, &yv) in x_vals[chunk.start..chunk.end]
                .iter()
                .zip(&y_vals[chunk.start..chunk.end])
            {
                partial.record(xv, yv);
            }
            Ok(partial)
        },
        Hist2d::merge,
    )?;
    Ok(hist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyetos_grid::Unit;
    use ndarray::{ArrayD, IxDyn};
    use rand::prelude::*;
    use rand_distr::{Distribution, LogNormal, Normal};

    fn field(name: &str, units: Unit, values: Vec<f64>, nt: usize, nx: usize) -> LabeledArray {
        let data = ArrayD::from_shape_vec(IxDyn(&[nt, nx]), values).expect("shape matches");
        LabeledArray::new(
            name,
            units,
            vec![
                ("time".to_string(), (0..nt).map(|i| i as f64 + 0.5).collect()),
                ("lon".to_string(), (0..nx).map(|i| i as f64).collect()),
            ],
            data,
        )
        .expect("valid labels")
    }

    fn synthetic_pair(n: usize) -> (Vec<f64>, Vec<f64>) {
        let mut rng = StdRng::seed_from_u64(194);
        let pr = LogNormal::new(-11.0, 2.0).expect("valid params");
        let tas = Normal::new(288.0, 8.0).expect("valid params");
        let mut p = Vec::with_capacity(n);
        let mut t = Vec::with_capacity(n);
        for i in 0..n {
            // Sprinkle in the pathologies the tallies exist for.
            p.push(match i % 97 {
                0 => 0.0,
                1 => f64::NAN,
                _ => pr.sample(&mut rng),
            });
            t.push(tas.sample(&mut rng));
        }
        (p, t)
    }

    fn edges() -> (BinEdges, BinEdges) {
        (
            BinEdges::log10(1e-7, 1e-2, 25, Unit::KgPerM2PerS).expect("valid"),
            BinEdges::linear(270.0, 314.0, 22, Unit::Kelvin).expect("valid"),
        )
    }

    #[test]
    fn counts_do_not_depend_on_chunking() {
        let (p, t) = synthetic_pair(4 * 500);
        let pr = field("pr", Unit::KgPerM2PerS, p, 4, 500);
        let tas = field("tas", Unit::Kelvin, t, 4, 500);
        let (pe, te) = edges();
        let policy = RetryPolicy::new();
        let reference = joint_histogram(&pr, &tas, &pe, &te, 2000, &policy).expect("accumulates");
        assert_eq!(reference.recorded(), 2000, "every pair is accounted for");
        for chunk_len in [1, 7, 64, 333, 5000] {
            let h = joint_histogram(&pr, &tas, &pe, &te, chunk_len, &policy).expect("accumulates");
            assert_eq!(h, reference, "chunk_len={chunk_len}");
        }
    }

    #[test]
    fn zero_precipitation_lands_in_the_below_tally() {
        let pr = field("pr", Unit::KgPerM2PerS, vec![0.0, 1e-5, 1e-4, 0.0], 2, 2);
        let tas = field("tas", Unit::Kelvin, vec![280.0, 281.0, 282.0, 283.0], 2, 2);
        let (pe, te) = edges();
        let h = joint_histogram(&pr, &tas, &pe, &te, 16, &RetryPolicy::new()).expect("accumulates");
        assert_eq!(h.binned(), 2);
        assert_eq!(h.dropped().x_below, 2, "dry samples cannot enter log bins");
    }

    #[test]
    fn unit_mismatch_fails_before_binning() {
        let pr = field("pr", Unit::MmPerDay, vec![1.0; 4], 2, 2);
        let tas = field("tas", Unit::Kelvin, vec![280.0; 4], 2, 2);
        let (pe, te) = edges();
        let err = joint_histogram(&pr, &tas, &pe, &te, 16, &RetryPolicy::new())
            .expect_err("mm/day against flux bins");
        let msg = err.to_string();
        assert!(msg.contains("mm day-1") && msg.contains("kg m-2 s-1"), "{msg}");
    }

    #[test]
    fn mismatched_grids_are_rejected() {
        let pr = field("pr", Unit::KgPerM2PerS, vec![1e-5; 4], 2, 2);
        let tas = field("tas", Unit::Kelvin, vec![280.0; 6], 2, 3);
        let (pe, te) = edges();
        let err = joint_histogram(&pr, &tas, &pe, &te, 16, &RetryPolicy::new())
            .expect_err("different shapes");
        assert!(matches!(err, HistError::Grid { .. }));
    }
}
