//! World-space geometry.

use glam::DVec2;

/// Axis-aligned rectangle in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle spanning two corners, in any order.
    pub fn from_corners(a: DVec2, b: DVec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Bounding box of a circle.
    pub fn from_circle(center: DVec2, radius: f64) -> Self {
        Self::new(
            center.x - radius,
            center.y - radius,
            radius * 2.0,
            radius * 2.0,
        )
    }

    /// Get the right edge (x + width).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom edge (y + height).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn min(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn max(&self) -> DVec2 {
        DVec2::new(self.right(), self.bottom())
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if a point is inside the rectangle (edges inclusive).
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Check if another rectangle lies entirely inside this one, with a tolerance.
    pub fn contains_rect(&self, other: &Rect, epsilon: f64) -> bool {
        other.x >= self.x - epsilon
            && other.y >= self.y - epsilon
            && other.right() <= self.right() + epsilon
            && other.bottom() <= self.bottom() + epsilon
    }

    /// Whether the two rectangles overlap with positive area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Compute union (bounding box) with another rectangle.
    pub fn union(&self, other: &Rect) -> Rect {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Grow each dimension to at least `min_extent`, keeping the center fixed.
    pub fn with_min_extent(&self, min_extent: f64) -> Rect {
        let center = self.center();
        let width = self.width.max(min_extent);
        let height = self.height.max(min_extent);
        Rect::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }
}

/// The world plane markers are laid out on, anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutBounds {
    pub width: f64,
    pub height: f64,
}

impl Default for LayoutBounds {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
        }
    }
}

impl LayoutBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Replace non-finite or negative dimensions with zero.
    pub fn sanitized(&self) -> Self {
        let fix = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self::new(fix(self.width), fix(self.height))
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Whether a marker of diameter `size` at `position` lies fully inside.
    pub fn contains_marker(&self, position: DVec2, size: f64, epsilon: f64) -> bool {
        let r = size / 2.0;
        position.x - r >= -epsilon
            && position.y - r >= -epsilon
            && position.x + r <= self.width + epsilon
            && position.y + r <= self.height + epsilon
    }

    /// Move `position` so a marker of diameter `size` stays inside.
    ///
    /// A marker wider than the plane is centered on that axis.
    pub fn clamp_marker(&self, position: DVec2, size: f64) -> DVec2 {
        let r = size / 2.0;
        let clamp_axis = |v: f64, extent: f64| {
            if 2.0 * r >= extent {
                extent / 2.0
            } else {
                v.clamp(r, extent - r)
            }
        };
        DVec2::new(
            clamp_axis(position.x, self.width),
            clamp_axis(position.y, self.height),
        )
    }

    /// Smallest square plane, no smaller than `minimum`, whose marker
    /// coverage stays at or below `max_density`.
    ///
    /// Coverage is the total area of the marker circles divided by the plane
    /// area. The plane always fits the largest marker.
    pub fn for_sizes(sizes: &[f64], max_density: f64, minimum: LayoutBounds) -> Self {
        let minimum = minimum.sanitized();
        if sizes.is_empty() {
            return minimum;
        }

        let marker_area: f64 = sizes
            .iter()
            .map(|s| std::f64::consts::PI * (s / 2.0) * (s / 2.0))
            .sum();
        let density = if max_density.is_finite() && max_density > 0.0 {
            max_density.min(1.0)
        } else {
            1.0
        };
        let largest = sizes.iter().copied().fold(0.0_f64, f64::max);
        let side = (marker_area / density).sqrt().max(largest);

        Self::new(minimum.width.max(side), minimum.height.max(side))
    }
}
