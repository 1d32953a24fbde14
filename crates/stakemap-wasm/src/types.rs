//! TypeScript-friendly type definitions for WASM bindings.

use serde::{Deserialize, Serialize};
use stakemap_core::{
    DVec2, LayoutBounds, PositionedEntity, Rect, ViewportState, WeightedEntity,
};
use stakemap_layout::{LayoutParams, SeedOrder, SizeCurve};
use stakemap_viewport::{Gesture, ViewportConfig};

/// Overwrite `target.field` with every `Some` value of `js.field`.
macro_rules! merge {
    ($js:expr => $target:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(v) = $js.$field {
                $target.$field = v;
            }
        )+
    };
}

/// Input entity from JavaScript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityJs {
    pub id: String,
    /// Missing or null weights count as zero.
    #[serde(default)]
    pub weight: Option<f64>,
}

impl EntityJs {
    pub fn into_core(self) -> WeightedEntity {
        WeightedEntity::new(self.id, self.weight.unwrap_or(0.0))
    }
}

/// Positioned marker for JavaScript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedEntityJs {
    pub id: String,
    pub weight: f64,
    pub size: f64,
    pub x: f64,
    pub y: f64,
}

impl From<&PositionedEntity> for PositionedEntityJs {
    fn from(entity: &PositionedEntity) -> Self {
        Self {
            id: entity.id.to_string(),
            weight: entity.weight,
            size: entity.size,
            x: entity.position.x,
            y: entity.position.y,
        }
    }
}

/// World plane dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsJs {
    pub width: f64,
    pub height: f64,
}

impl BoundsJs {
    pub fn into_core(self) -> LayoutBounds {
        LayoutBounds::new(self.width, self.height)
    }
}

impl From<LayoutBounds> for BoundsJs {
    fn from(bounds: LayoutBounds) -> Self {
        Self {
            width: bounds.width,
            height: bounds.height,
        }
    }
}

/// Layout result with the plane it was computed on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutJs {
    pub bounds: BoundsJs,
    pub entities: Vec<PositionedEntityJs>,
}

/// Rectangle in world or screen space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectJs {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<Rect> for RectJs {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointJs {
    pub x: f64,
    pub y: f64,
}

impl From<DVec2> for PointJs {
    fn from(p: DVec2) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Viewport state for JavaScript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportJs {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<&ViewportState> for ViewportJs {
    fn from(state: &ViewportState) -> Self {
        Self {
            scale: state.scale,
            offset_x: state.offset.x,
            offset_y: state.offset.y,
            width: state.viewport_size.x,
            height: state.viewport_size.y,
        }
    }
}

/// Outcome of a pointer release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GestureJs {
    Click { x: f64, y: f64 },
    Pan,
    None,
}

impl From<Gesture> for GestureJs {
    fn from(gesture: Gesture) -> Self {
        match gesture {
            Gesture::Click { screen } => GestureJs::Click {
                x: screen.x,
                y: screen.y,
            },
            Gesture::Pan => GestureJs::Pan,
            Gesture::None => GestureJs::None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SizeCurveJs {
    Log2,
    Sqrt,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SeedOrderJs {
    AsGiven,
    WeightDescending,
}

/// Layout parameters from JavaScript. Omitted fields keep their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutParamsJs {
    #[serde(default)]
    pub min_size: Option<f64>,
    #[serde(default)]
    pub max_size: Option<f64>,
    #[serde(default)]
    pub base_size: Option<f64>,
    #[serde(default)]
    pub growth: Option<f64>,
    #[serde(default)]
    pub curve: Option<SizeCurveJs>,
    #[serde(default)]
    pub spacing_factor: Option<f64>,
    #[serde(default)]
    pub order: Option<SeedOrderJs>,
    #[serde(default)]
    pub iterations: Option<usize>,
    #[serde(default)]
    pub damping: Option<f64>,
    #[serde(default)]
    pub repulsion: Option<f64>,
    #[serde(default)]
    pub centering: Option<f64>,
    #[serde(default)]
    pub margin_factor: Option<f64>,
    #[serde(default)]
    pub max_speed: Option<f64>,
    #[serde(default)]
    pub collision_passes: Option<usize>,
    #[serde(default)]
    pub grid_threshold: Option<usize>,
    #[serde(default)]
    pub max_density: Option<f64>,
}

impl LayoutParamsJs {
    /// Merge over `base`.
    pub fn into_core(self, base: &LayoutParams) -> LayoutParams {
        let mut params = base.clone();
        merge!(self => params.sizing; min_size, max_size, base_size, growth);
        merge!(self => params.seed; spacing_factor);
        merge!(self => params.relax; iterations, damping, repulsion, centering,
            margin_factor, max_speed, collision_passes, grid_threshold);
        merge!(self => params; max_density);
        if let Some(curve) = self.curve {
            params.sizing.curve = match curve {
                SizeCurveJs::Log2 => SizeCurve::Log2,
                SizeCurveJs::Sqrt => SizeCurve::Sqrt,
            };
        }
        if let Some(order) = self.order {
            params.seed.order = match order {
                SeedOrderJs::AsGiven => SeedOrder::AsGiven,
                SeedOrderJs::WeightDescending => SeedOrder::WeightDescending,
            };
        }
        params
    }
}

/// Viewport configuration from JavaScript. Omitted fields keep their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportConfigJs {
    #[serde(default)]
    pub min_scale: Option<f64>,
    #[serde(default)]
    pub max_scale: Option<f64>,
    #[serde(default)]
    pub default_scale: Option<f64>,
    #[serde(default)]
    pub zoom_step: Option<f64>,
    #[serde(default)]
    pub fit_margin: Option<f64>,
    #[serde(default)]
    pub click_threshold: Option<f64>,
    #[serde(default)]
    pub wheel_sensitivity: Option<f64>,
}

impl ViewportConfigJs {
    pub fn into_core(self, base: &ViewportConfig) -> ViewportConfig {
        let mut config = base.clone();
        merge!(self => config; min_scale, max_scale, default_scale, zoom_step,
            fit_margin, click_threshold, wheel_sensitivity);
        config
    }
}
