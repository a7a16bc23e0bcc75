/// Linear trapezoidal AUC over an ascending time series.
///
/// `times` and `concentrations` are paired index by index. Fewer than two
/// points give an AUC of zero.
pub fn trapezoidal_auc(times: &[f64], concentrations: &[f64]) -> f64 {
    debug_assert_eq!(times.len(), concentrations.len());

    let mut auc = 0.0;
    for (t, c) in times.windows(2).zip(concentrations.windows(2)) {
        let dt = t[1] - t[0];
        let avg_conc = (c[0] + c[1]) / 2.0;
        auc += dt * avg_conc;
    }

    auc
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_and_single_point() {
        assert_eq!(trapezoidal_auc(&[], &[]), 0.0);
        assert_eq!(trapezoidal_auc(&[3.0], &[42.0]), 0.0);
    }

    #[test]
    fn test_constant_series() {
        let times: Vec<f64> = (0..=50).map(|i| 2.0 + i as f64 * 0.2).collect();
        let concs = vec![7.5; times.len()];
        assert_relative_eq!(trapezoidal_auc(&times, &concs), 7.5 * 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_linear_series_is_exact() {
        // c = 2t on [0, 4] integrates to 16
        let times = [0.0, 1.0, 2.5, 4.0];
        let concs = [0.0, 2.0, 5.0, 8.0];
        assert_relative_eq!(trapezoidal_auc(&times, &concs), 16.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uneven_spacing() {
        let times = [0.0, 1.0, 3.0];
        let concs = [10.0, 8.0, 4.0];
        // 9 + 12
        assert_relative_eq!(trapezoidal_auc(&times, &concs), 21.0, epsilon = 1e-12);
    }
}
