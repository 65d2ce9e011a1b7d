use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportLimits {
    pub min_scale: f64,
    pub max_scale: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
    /// Wheel delta to zoom factor: `exp(-delta * scroll_sensitivity)`
    pub scroll_sensitivity: f64,
}

impl Default for ViewportLimits {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 5.0,
            zoom_in_factor: 1.3,
            zoom_out_factor: 0.7,
            scroll_sensitivity: 0.1,
        }
    }
}

/// Logical zoom scale of one diagram instance.
///
/// The scale is clamped here, once, and the renderer is only ever asked for
/// the factor that takes it from the old clamped scale to the new one, so
/// the two cannot drift apart.
#[derive(Debug, Clone)]
pub struct Viewport {
    scale: f64,
    limits: ViewportLimits,
}

impl Viewport {
    pub fn new(limits: ViewportLimits) -> Self {
        Self { scale: 1.0, limits }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn limits(&self) -> &ViewportLimits {
        &self.limits
    }

    pub fn zoom_in(&mut self) -> Option<f64> {
        self.zoom_by(self.limits.zoom_in_factor)
    }

    pub fn zoom_out(&mut self) -> Option<f64> {
        self.zoom_by(self.limits.zoom_out_factor)
    }

    /// Continuous zoom from a wheel delta. Positive deltas zoom out.
    pub fn zoom_scroll(&mut self, delta: f64) -> Option<f64> {
        self.zoom_by((-delta * self.limits.scroll_sensitivity).exp())
    }

    /// Multiply the scale by `factor` and clamp it.
    ///
    /// Returns the factor to forward to the renderer, or `None` when the
    /// scale did not move (already at a limit, or a degenerate factor).
    pub fn zoom_by(&mut self, factor: f64) -> Option<f64> {
        if !factor.is_finite() || factor <= 0.0 {
            return None;
        }
        let old = self.scale;
        let new = (old * factor).clamp(self.limits.min_scale, self.limits.max_scale);
        self.scale = new;
        let applied = new / old;
        ((applied - 1.0).abs() > f64::EPSILON).then_some(applied)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ViewportLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_in_never_exceeds_max() {
        let mut viewport = Viewport::default();
        for _ in 0..50 {
            viewport.zoom_in();
            assert!(viewport.scale() <= 5.0);
        }
        assert_eq!(viewport.scale(), 5.0);
        assert_eq!(viewport.zoom_in(), None);
    }

    #[test]
    fn test_zoom_out_never_below_min() {
        let mut viewport = Viewport::default();
        for _ in 0..50 {
            viewport.zoom_out();
            assert!(viewport.scale() >= 0.1);
        }
        assert_eq!(viewport.scale(), 0.1);
        assert_eq!(viewport.zoom_out(), None);
    }

    #[test]
    fn test_fixed_steps() {
        let mut viewport = Viewport::default();
        assert_eq!(viewport.zoom_in(), Some(1.3));
        assert!((viewport.scale() - 1.3).abs() < 1e-12);

        let mut viewport = Viewport::default();
        assert_eq!(viewport.zoom_out(), Some(0.7));
    }

    #[test]
    fn test_forwarded_factor_is_clamped_at_limit() {
        let mut viewport = Viewport::default();
        viewport.zoom_by(4.0);
        let applied = viewport.zoom_by(2.0).unwrap();

        assert!((applied - 1.25).abs() < 1e-12);
        assert_eq!(viewport.scale(), 5.0);
    }

    #[test]
    fn test_scroll_is_exponential_and_never_flips_sign() {
        let mut viewport = Viewport::default();
        let small = viewport.zoom_scroll(-1.0).unwrap();
        let mut viewport = Viewport::default();
        let large = viewport.zoom_scroll(-5.0).unwrap();

        assert!(small > 1.0 && large > small);
        assert!((small - 0.1f64.exp()).abs() < 1e-12);

        let mut viewport = Viewport::default();
        let out = viewport.zoom_scroll(30.0).unwrap();
        assert!(out > 0.0);
        assert_eq!(viewport.scale(), 0.1);
    }

    #[test]
    fn test_degenerate_factors_ignored() {
        let mut viewport = Viewport::default();
        assert_eq!(viewport.zoom_by(0.0), None);
        assert_eq!(viewport.zoom_by(f64::NAN), None);
        assert_eq!(viewport.zoom_by(1.0), None);
        assert_eq!(viewport.scale(), 1.0);
    }
}
