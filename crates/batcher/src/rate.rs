//! Capture rate estimation from sample timestamps.

/// Estimate a sampling rate (Hz) from ordered timestamps (seconds).
///
/// Returns `None` for fewer than two timestamps. Otherwise returns the
/// reciprocal of the mean forward difference. Identical timestamps give a
/// zero mean and therefore `Some(f64::INFINITY)`; use [`rate_to_hz`] before
/// treating the estimate as a capture rate.
pub fn estimate_rate(timestamps: &[f64]) -> Option<f64> {
    if timestamps.len() < 2 {
        return None;
    }

    let total: f64 = timestamps.windows(2).map(|w| w[1] - w[0]).sum();
    let mean_interval = total / (timestamps.len() - 1) as f64;
    Some(1.0 / mean_interval)
}

/// Convert an estimate into an integer capture rate.
///
/// Truncates toward zero like the stored rate fields. Rejects non-finite,
/// non-positive and sub-1 Hz estimates.
pub fn rate_to_hz(estimate: f64) -> Option<u32> {
    if !estimate.is_finite() || estimate < 1.0 || estimate > u32::MAX as f64 {
        return None;
    }
    Some(estimate as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_rate_requires_two_samples() {
        assert_eq!(estimate_rate(&[]), None);
        assert_eq!(estimate_rate(&[1.0]), None);
    }

    #[test]
    fn test_estimate_rate_constant_spacing() {
        for &d in &[0.001, 0.02, 0.04, 0.5, 1.0] {
            let ts: Vec<f64> = (0..200).map(|i| 100.0 + i as f64 * d).collect();
            let rate = estimate_rate(&ts).unwrap();
            assert!(
                (rate - 1.0 / d).abs() < 1e-6 * (1.0 / d),
                "spacing {d}: got {rate}"
            );
        }
    }

    #[test]
    fn test_estimate_rate_two_samples() {
        let rate = estimate_rate(&[10.0, 10.25]).unwrap();
        assert!((rate - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_estimate_rate_uneven_spacing_uses_mean() {
        // intervals 0.1 and 0.3, mean 0.2
        let rate = estimate_rate(&[0.0, 0.1, 0.4]).unwrap();
        assert!((rate - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_rate_identical_timestamps_is_infinite() {
        let rate = estimate_rate(&[0.0, 0.0]).unwrap();
        assert!(rate.is_infinite());
        assert_eq!(rate_to_hz(rate), None);
    }

    #[test]
    fn test_rate_to_hz() {
        assert_eq!(rate_to_hz(99.7), Some(99));
        assert_eq!(rate_to_hz(1.0), Some(1));
        assert_eq!(rate_to_hz(0.5), None);
        assert_eq!(rate_to_hz(-20.0), None);
        assert_eq!(rate_to_hz(f64::NAN), None);
        assert_eq!(rate_to_hz(f64::INFINITY), None);
    }
}
