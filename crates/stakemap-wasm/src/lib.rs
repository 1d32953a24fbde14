//! WebAssembly bindings for the stakemap engine.
//!
//! This crate exposes layout computation and the pan/zoom viewport to a
//! JavaScript rendering layer.
//!
//! ## Example
//!
//! ```js
//! import { StakeMap } from 'stakemap';
//!
//! const map = new StakeMap(800, 600);
//! map.setParams({ iterations: 150, curve: 'sqrt' });
//!
//! const markers = map.computeLayout(
//!   [{ id: '0xabc', weight: 12 }, { id: '0xdef', weight: 4000 }],
//!   { width: 1000, height: 1000 },
//! );
//! map.fitToBounds(800, 600, 0.9);
//!
//! canvas.addEventListener('wheel', (e) => map.wheel(e.offsetX, e.offsetY, e.deltaY));
//! const { scale, offsetX, offsetY } = map.getViewport();
//! ```

use stakemap_core::{DVec2, LayoutBounds, PositionedEntity, WeightedEntity};
use stakemap_layout::{compute_auto_layout, compute_layout, compute_layout_from, LayoutParams};
use stakemap_viewport::{ViewportConfig, ViewportController, ZoomDirection};
use tracing::warn;
use wasm_bindgen::prelude::*;

mod types;

pub use types::*;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(debug_assertions)]
    console_error_panic_hook::set_once();
}

/// Layout plus viewport for one rendered map.
#[wasm_bindgen]
pub struct StakeMap {
    params: LayoutParams,
    bounds: LayoutBounds,
    entities: Vec<PositionedEntity>,
    viewport: ViewportController,
}

#[wasm_bindgen]
impl StakeMap {
    /// Create a map for a canvas of the given CSS pixel size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            params: LayoutParams::default(),
            bounds: LayoutBounds::default(),
            entities: Vec::new(),
            viewport: ViewportController::new(ViewportConfig::default(), DVec2::new(width, height)),
        }
    }

    /// Merge layout parameters over the current ones.
    #[wasm_bindgen(js_name = setParams)]
    pub fn set_params(&mut self, params: JsValue) -> Result<(), JsError> {
        let js: LayoutParamsJs = serde_wasm_bindgen::from_value(params)
            .map_err(|e| JsError::new(&format!("Invalid layout params: {}", e)))?;

        let params = js.into_core(&self.params);
        if let Err(e) = params.validate() {
            warn!(error = %e, "rejected layout params");
            return Err(JsError::new(&format!("Invalid layout params: {}", e)));
        }
        self.params = params;
        Ok(())
    }

    /// Merge viewport configuration over the current one.
    #[wasm_bindgen(js_name = setViewportConfig)]
    pub fn set_viewport_config(&mut self, config: JsValue) -> Result<(), JsError> {
        let js: ViewportConfigJs = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsError::new(&format!("Invalid viewport config: {}", e)))?;

        let config = js.into_core(self.viewport.config());
        if let Err(e) = config.validate() {
            warn!(error = %e, "rejected viewport config");
            return Err(JsError::new(&format!("Invalid viewport config: {}", e)));
        }
        self.viewport.set_config(config);
        Ok(())
    }

    /// Lay out entities on fixed bounds. Returns the positioned markers.
    ///
    /// Markers that were on screen before keep their positions as a
    /// starting point when `warmStart` is true.
    #[wasm_bindgen(js_name = computeLayout)]
    pub fn compute_layout(
        &mut self,
        entities: JsValue,
        bounds: JsValue,
        warm_start: Option<bool>,
    ) -> Result<JsValue, JsError> {
        let entities = entities_from_js(entities)?;
        let bounds: BoundsJs = serde_wasm_bindgen::from_value(bounds)
            .map_err(|e| JsError::new(&format!("Invalid bounds: {}", e)))?;

        self.layout(&entities, bounds.into_core(), warm_start.unwrap_or(false));
        to_js(&self.entities_js())
    }

    /// Lay out entities on bounds sized to their total marker area.
    #[wasm_bindgen(js_name = computeAutoLayout)]
    pub fn compute_auto_layout(&mut self, entities: JsValue) -> Result<JsValue, JsError> {
        let entities = entities_from_js(entities)?;
        self.auto_layout(&entities);
        to_js(&LayoutJs {
            bounds: self.bounds.into(),
            entities: self.entities_js(),
        })
    }

    /// Markers from the last computed layout.
    #[wasm_bindgen(js_name = getLayout)]
    pub fn get_layout(&self) -> Result<JsValue, JsError> {
        to_js(&LayoutJs {
            bounds: self.bounds.into(),
            entities: self.entities_js(),
        })
    }

    #[wasm_bindgen(js_name = setViewportSize)]
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport.set_viewport_size(DVec2::new(width, height));
    }

    #[wasm_bindgen(js_name = panBy)]
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.pan(dx, dy);
    }

    /// Zoom by `factor` keeping the world point under `(x, y)` fixed.
    #[wasm_bindgen(js_name = zoomAt)]
    pub fn zoom_at(&mut self, x: f64, y: f64, factor: f64) {
        self.viewport.zoom_at(DVec2::new(x, y), factor);
    }

    /// One zoom-button step toward (`zoomIn = true`) or away from the content.
    #[wasm_bindgen(js_name = zoomStep)]
    pub fn zoom_step(&mut self, zoom_in: bool) {
        let direction = if zoom_in {
            ZoomDirection::In
        } else {
            ZoomDirection::Out
        };
        self.viewport.zoom_step(direction);
    }

    #[wasm_bindgen]
    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
        self.viewport.wheel(DVec2::new(x, y), delta_y);
    }

    /// Fit the last layout into a viewport of the given size. `margin`
    /// defaults to the configured fit margin.
    #[wasm_bindgen(js_name = fitToBounds)]
    pub fn fit_to_bounds(&mut self, width: f64, height: f64, margin: Option<f64>) {
        let margin = margin.unwrap_or(self.viewport.config().fit_margin);
        self.viewport
            .fit_to_bounds_with_margin(&self.entities, DVec2::new(width, height), margin);
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.viewport.reset();
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.viewport.pointer_down(DVec2::new(x, y));
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.viewport.pointer_move(DVec2::new(x, y));
    }

    /// End a press. Returns `{ kind: 'click', x, y }`, `{ kind: 'pan' }` or
    /// `{ kind: 'none' }`.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Result<JsValue, JsError> {
        let gesture = GestureJs::from(self.viewport.pointer_up(DVec2::new(x, y)));
        to_js(&gesture)
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self) {
        self.viewport.pointer_leave();
    }

    #[wasm_bindgen(js_name = isDragging)]
    pub fn is_dragging(&self) -> bool {
        self.viewport.is_dragging()
    }

    /// Select the marker under a screen point. Returns its id, or
    /// `undefined` when nothing was hit or the click followed a pan.
    #[wasm_bindgen(js_name = selectAt)]
    pub fn select_at(&mut self, x: f64, y: f64) -> Option<String> {
        self.viewport
            .select_at(&self.entities, DVec2::new(x, y))
            .map(|id| id.to_string())
    }

    #[wasm_bindgen(js_name = hoverAt)]
    pub fn hover_at(&mut self, x: f64, y: f64) -> Option<String> {
        self.viewport
            .hover_at(&self.entities, DVec2::new(x, y))
            .map(|id| id.to_string())
    }

    #[wasm_bindgen(js_name = getSelected)]
    pub fn get_selected(&self) -> Option<String> {
        self.viewport.selected().map(|id| id.to_string())
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.viewport.clear_selection();
    }

    #[wasm_bindgen(js_name = worldToScreen)]
    pub fn world_to_screen(&self, x: f64, y: f64) -> Result<JsValue, JsError> {
        to_js(&PointJs::from(self.viewport.world_to_screen(DVec2::new(x, y))))
    }

    #[wasm_bindgen(js_name = screenToWorld)]
    pub fn screen_to_world(&self, x: f64, y: f64) -> Result<JsValue, JsError> {
        to_js(&PointJs::from(self.viewport.screen_to_world(DVec2::new(x, y))))
    }

    /// Current `{ scale, offsetX, offsetY, width, height }`.
    #[wasm_bindgen(js_name = getViewport)]
    pub fn get_viewport(&self) -> Result<JsValue, JsError> {
        to_js(&ViewportJs::from(self.viewport.state()))
    }

    /// World-space rectangle currently on screen, for culling.
    #[wasm_bindgen(js_name = getVisibleRect)]
    pub fn get_visible_rect(&self) -> Result<JsValue, JsError> {
        to_js(&RectJs::from(self.viewport.visible_world_rect()))
    }
}

impl StakeMap {
    fn layout(&mut self, entities: &[WeightedEntity], bounds: LayoutBounds, warm_start: bool) {
        self.entities = if warm_start {
            compute_layout_from(entities, bounds, &self.params, &self.entities)
        } else {
            compute_layout(entities, bounds, &self.params)
        };
        self.bounds = bounds.sanitized();
    }

    fn auto_layout(&mut self, entities: &[WeightedEntity]) {
        let layout = compute_auto_layout(entities, LayoutBounds::default(), &self.params);
        self.bounds = layout.bounds;
        self.entities = layout.entities;
    }

    fn entities_js(&self) -> Vec<PositionedEntityJs> {
        self.entities.iter().map(PositionedEntityJs::from).collect()
    }
}

impl Default for StakeMap {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

fn entities_from_js(value: JsValue) -> Result<Vec<WeightedEntity>, JsError> {
    let entities: Vec<EntityJs> = serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsError::new(&format!("Invalid entities: {}", e)))?;
    Ok(entities.into_iter().map(EntityJs::into_core).collect())
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Standalone layout computation with default parameters.
#[wasm_bindgen(js_name = computeLayout)]
pub fn compute_layout_standalone(entities: JsValue, bounds: JsValue) -> Result<JsValue, JsError> {
    let entities = entities_from_js(entities)?;
    let bounds: BoundsJs = serde_wasm_bindgen::from_value(bounds)
        .map_err(|e| JsError::new(&format!("Invalid bounds: {}", e)))?;

    let layout = compute_layout(&entities, bounds.into_core(), &LayoutParams::default());
    let out: Vec<PositionedEntityJs> = layout.iter().map(PositionedEntityJs::from).collect();
    to_js(&out)
}

/// Get the engine version.
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
