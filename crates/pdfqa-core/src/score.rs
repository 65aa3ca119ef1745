//! Distance to similarity transform.
//!
//! Vector indexes report distances (smaller = more similar). The router works
//! with a bounded, higher-is-better score: `1 / (1 + distance)`. The transform
//! is total: anything that is not a usable number maps to `0.0`.

/// Score of a raw distance. `None` and NaN are malformed and score `0.0`.
///
/// Tiny negative distances show up as float noise for identical vectors, so
/// negative values are clamped to zero rather than pushing the score above 1.
pub fn normalize_distance(distance: Option<f32>) -> f32 {
    match distance {
        Some(d) if !d.is_nan() => 1.0 / (1.0 + d.max(0.0)),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_distance_scores_zero() {
        assert_eq!(normalize_distance(Some(f32::INFINITY)), 0.0);
    }

    #[test]
    fn negative_noise_is_clamped() {
        assert_eq!(normalize_distance(Some(-1e-7)), 1.0);
    }
}
