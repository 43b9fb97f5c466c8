//! Glyph outline bounds.
//!
//! Bounds live in shape space: raw font units, y pointing up, origin at the
//! pen position. Nothing here is scaled yet.

use glam::DVec2;

/// An axis-aligned box in shape or em space (y up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl Bounds {
    /// All-zero bounds, used for glyphs without geometry.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(
            (self.left + self.right) / 2.0,
            (self.bottom + self.top) / 2.0,
        )
    }

    /// True when the box has no area (spaces, empty outlines).
    pub fn is_degenerate(&self) -> bool {
        self.right <= self.left || self.top <= self.bottom
    }

    /// Grow every side outward by `amount`.
    pub fn expand(&self, amount: f64) -> Self {
        Self::new(
            self.left - amount,
            self.bottom - amount,
            self.right + amount,
            self.top + amount,
        )
    }

    /// Multiply every coordinate by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.left * factor,
            self.bottom * factor,
            self.right * factor,
            self.top * factor,
        )
    }
}

impl From<ttf_parser::Rect> for Bounds {
    fn from(rect: ttf_parser::Rect) -> Self {
        Self::new(
            f64::from(rect.x_min),
            f64::from(rect.y_min),
            f64::from(rect.x_max),
            f64::from(rect.y_max),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_degenerate() {
        assert!(Bounds::ZERO.is_degenerate());
        assert!(Bounds::new(0.0, 0.0, 10.0, 0.0).is_degenerate());
        assert!(!Bounds::new(0.0, 0.0, 10.0, 1.0).is_degenerate());
    }

    #[test]
    fn test_expand_then_scale() {
        let b = Bounds::new(10.0, -20.0, 110.0, 700.0).expand(5.0).scaled(0.5);
        assert_eq!(b, Bounds::new(2.5, -12.5, 57.5, 352.5));
        assert!((b.center() - DVec2::new(30.0, 170.0)).length() < 1e-12);
    }

    #[test]
    fn test_from_font_rect() {
        let rect = ttf_parser::Rect {
            x_min: 6,
            y_min: 0,
            x_max: 541,
            y_max: 656,
        };
        assert_eq!(Bounds::from(rect), Bounds::new(6.0, 0.0, 541.0, 656.0));
    }
}
