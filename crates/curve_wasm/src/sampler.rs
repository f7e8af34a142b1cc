//! Stepped curve sampling runner.

use crate::session::{math_context, SamplerSession};
use curve_core::render::CanvasTransform;
use curve_core::{ColorSource, SamplingConfig};
use serde_wasm_bindgen::{from_value, to_value};
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;

/// WASM-exported runner for adaptive curve sampling.
/// Allows progress reporting by pulling batches of samples at a time.
#[wasm_bindgen]
pub struct WasmCurveSampler {
    session: Option<SamplerSession>,
}

pub(crate) fn constants_from_value(value: JsValue) -> Result<Option<BTreeMap<String, f64>>, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    from_value(value)
        .map(Some)
        .map_err(|e| JsValue::from_str(&format!("Invalid constants: {}", e)))
}

/// `{ r, g, b, a? }` channel sources, or `None` for an uncoloured run.
pub(crate) fn color_from_value(value: JsValue) -> Result<Option<ColorSource>, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    from_value(value)
        .map(Some)
        .map_err(|e| JsValue::from_str(&format!("Invalid color: {}", e)))
}

#[wasm_bindgen]
impl WasmCurveSampler {
    /// Compile `x(t)`/`y(t)` and prepare a sampling run.
    ///
    /// `settings_val` uses the `MIN_STEP`/`MAX_STEP`/`TARGET_DISTANCE`/
    /// `MAX_ADAPTION_ATTEMPTS`/`MAX_SAMPLES` keys; omit it for the defaults.
    /// `scale` is pixels per curve unit, so `TARGET_DISTANCE` is in pixels.
    /// `color_val` (`{ r, g, b, a? }`, optional) colours the samples in the result.
    #[wasm_bindgen(constructor)]
    pub fn new(
        x_expr: &str,
        y_expr: &str,
        color_val: JsValue,
        constants_val: JsValue,
        settings_val: JsValue,
        scale: f64,
    ) -> Result<WasmCurveSampler, JsValue> {
        console_error_panic_hook::set_once();
        crate::init_logger();

        let math = math_context(constants_from_value(constants_val)?);
        let color = color_from_value(color_val)?;
        let settings: SamplingConfig = if settings_val.is_undefined() || settings_val.is_null() {
            SamplingConfig::default()
        } else {
            from_value(settings_val)
                .map_err(|e| JsValue::from_str(&format!("Invalid sampler settings: {}", e)))?
        };

        let session = SamplerSession::new(x_expr, y_expr, color.as_ref(), math, settings, scale)
            .map_err(|e| JsValue::from_str(&e))?;

        Ok(WasmCurveSampler {
            session: Some(session),
        })
    }

    /// Check if sampling is complete (finished, capped or failed).
    pub fn is_done(&self) -> bool {
        self.session.as_ref().map_or(true, |session| session.is_done())
    }

    /// Pull a batch of samples and return progress.
    pub fn run_steps(&mut self, batch_size: u32) -> Result<JsValue, JsValue> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        let progress = session.run_steps(batch_size as usize);
        if let Some(error) = session.error() {
            return Err(JsValue::from_str(&format!("Sampling failed: {}", error)));
        }

        to_value(&progress).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Get progress information.
    pub fn get_progress(&self) -> Result<JsValue, JsValue> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        to_value(&session.progress())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Canvas coordinates `[x0, y0, x1, y1, ...]` of the samples collected so far.
    pub fn canvas_points(&self, scale: f64, width: f64, height: f64) -> Result<Vec<f64>, JsValue> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        Ok(session.canvas_points(&CanvasTransform::for_canvas(scale, width, height)))
    }

    /// Take every sample with the termination reason or error.
    pub fn get_result(&mut self) -> Result<JsValue, JsValue> {
        let session = self
            .session
            .take()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        to_value(&session.into_result())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}
