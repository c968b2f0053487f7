//! Theoretical temperature scaling of precipitation extremes.

/// Fractional increase of saturation vapor pressure per kelvin of warming,
/// the Clausius-Clapeyron rate near surface temperatures.
pub const CC_RATE_PER_K: f64 = 0.07;

/// Exponential scaling curve `p_ref * (1 + rate)^(t - t_ref)` evaluated at
/// each temperature in `t_values`.
///
/// With the default [`CC_RATE_PER_K`] this is the Clausius-Clapeyron
/// expectation of roughly 7% more extreme precipitation per kelvin,
/// anchored so the curve passes through `p_ref` at `t_ref`. Non-finite
/// anchor values propagate NaN, which keeps an unanchorable curve visibly
/// absent rather than misleading.
pub fn scaling_curve(t_values: &[f64], t_ref: f64, p_ref: f64, rate: f64) -> Vec<f64> {
    t_values
        .iter()
        .map(|&t| p_ref * (1.0 + rate).powf(t - t_ref))
        .collect()
}
