//! Entity and viewport value types.

use glam::DVec2;

use crate::geometry::Rect;

/// Stable unique key of a visualized entity (typically an address).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EntityId(pub String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        EntityId(s)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An entity supplied by the data layer, before layout.
///
/// The payload is carried for the renderer and never inspected here.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightedEntity<P = ()> {
    /// Stable unique key
    pub id: EntityId,
    /// Scalar driving marker size (e.g. a staking power score)
    pub weight: f64,
    /// Opaque renderer data
    pub payload: P,
}

impl WeightedEntity<()> {
    /// Create an entity without payload.
    pub fn new(id: impl Into<EntityId>, weight: f64) -> Self {
        Self {
            id: id.into(),
            weight,
            payload: (),
        }
    }
}

impl<P> WeightedEntity<P> {
    /// Create an entity carrying a renderer payload.
    pub fn with_payload(id: impl Into<EntityId>, weight: f64, payload: P) -> Self {
        Self {
            id: id.into(),
            weight,
            payload,
        }
    }

    /// Weight with negative and NaN values mapped to zero.
    pub fn sanitized_weight(&self) -> f64 {
        sanitize_weight(self.weight)
    }
}

/// Map negative and NaN weights to zero. `+inf` saturates to `f64::MAX` so
/// it still ranks above every finite weight.
pub fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_nan() || weight <= 0.0 {
        0.0
    } else {
        weight.min(f64::MAX)
    }
}

/// An entity with its computed marker size and world position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionedEntity {
    pub id: EntityId,
    /// Sanitized input weight
    pub weight: f64,
    /// Marker diameter in world units
    pub size: f64,
    /// Marker center in world coordinates
    pub position: DVec2,
}

impl PositionedEntity {
    pub fn radius(&self) -> f64 {
        self.size / 2.0
    }

    /// Axis-aligned box enclosing the marker circle.
    pub fn bounding_rect(&self) -> Rect {
        Rect::from_circle(self.position, self.radius())
    }

    /// Whether a world-space point lies on the marker.
    pub fn contains(&self, point: DVec2) -> bool {
        self.position.distance_squared(point) <= self.radius() * self.radius()
    }
}

/// Pan/zoom state of the visible window.
///
/// `screen = world * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportState {
    /// Uniform zoom factor
    pub scale: f64,
    /// World-to-screen translation in screen pixels
    pub offset: DVec2,
    /// Size of the visible window in screen pixels
    pub viewport_size: DVec2,
}

impl ViewportState {
    pub fn new(scale: f64, offset: DVec2, viewport_size: DVec2) -> Self {
        Self {
            scale,
            offset,
            viewport_size,
        }
    }

    /// Convert a world point to screen space.
    pub fn world_to_screen(&self, world: DVec2) -> DVec2 {
        world * self.scale + self.offset
    }

    /// Convert a screen point to world space.
    pub fn screen_to_world(&self, screen: DVec2) -> DVec2 {
        (screen - self.offset) / self.scale
    }

    /// Center of the visible window in screen space.
    pub fn viewport_center(&self) -> DVec2 {
        self.viewport_size / 2.0
    }

    /// The world-space rectangle currently visible, for culling.
    pub fn visible_world_rect(&self) -> Rect {
        let min = self.screen_to_world(DVec2::ZERO);
        let max = self.screen_to_world(self.viewport_size);
        Rect::from_corners(min, max)
    }
}
