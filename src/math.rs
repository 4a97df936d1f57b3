use num_traits::Float;

const MS_TO_KMH: f32 = 3.6;

/// Speed in km/h of an object that moved `dist_px` pixels over one frame.
#[inline]
pub fn speed_kmh(dist_px: f32, px_per_meter: f32, fps: f32) -> f32 {
    (dist_px / px_per_meter) * fps * MS_TO_KMH
}

/// Exponential moving average, `factor` is the weight of the new sample.
#[inline]
pub fn ema<F: Float>(prev: F, sample: F, factor: F) -> F {
    prev * (F::one() - factor) + sample * factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn speed_from_displacement() {
        assert_relative_eq!(speed_kmh(40.0, 40.0, 8.0), 28.8, epsilon = 1e-4);
        assert_eq!(speed_kmh(0.0, 40.0, 8.0), 0.0);
    }

    #[test]
    fn smoothing() {
        assert_relative_eq!(ema(0.0f32, 28.8, 0.4), 11.52, epsilon = 1e-4);
        assert_relative_eq!(ema(11.52f32, 28.8, 0.4), 18.432, epsilon = 1e-4);
        assert_relative_eq!(ema(3.0f64, 7.0, 1.0), 7.0);
    }
}
