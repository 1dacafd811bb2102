//! Magnitude scale: running total to bubble radius.

/// Square-root mapping from `[0, max_total]` onto `[min_radius, max_radius]`.
///
/// The domain is fixed at construction from the largest running total in the
/// whole timeline, so the same total maps to the same radius in every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnitudeScale {
    domain_max: f64,
    min_radius: f64,
    max_radius: f64,
}

impl MagnitudeScale {
    /// A non-positive maximum falls back to a unit domain.
    pub fn new(max_total: f64, min_radius: f64, max_radius: f64) -> Self {
        let domain_max = if max_total.is_finite() && max_total > 0.0 {
            max_total
        } else {
            1.0
        };
        Self {
            domain_max,
            min_radius,
            max_radius,
        }
    }

    pub fn domain_max(&self) -> f64 {
        self.domain_max
    }

    /// Totals beyond the domain extrapolate along the same curve.
    pub fn radius(&self, total: f64) -> f64 {
        let t = (total.max(0.0) / self.domain_max).sqrt();
        self.min_radius + t * (self.max_radius - self.min_radius)
    }
}
