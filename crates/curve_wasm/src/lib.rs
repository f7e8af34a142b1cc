use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

mod sampler;
mod session;

pub use sampler::WasmCurveSampler;
pub use session::{SamplerProgress, SamplerResult};

#[cfg(feature = "debug_logs")]
pub(crate) fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    // Already installed by an earlier runner.
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
pub(crate) fn init_logger() {
    // no-op fallback when debug logs are disabled
}

/// Compile a curve and evaluate it once at t = 0 without sampling it.
#[wasm_bindgen]
pub fn validate_curve(x_expr: &str, y_expr: &str, constants_val: JsValue) -> Result<(), JsValue> {
    let constants = sampler::constants_from_value(constants_val)?;
    let math = session::math_context(constants);
    session::check_curve(x_expr, y_expr, &math).map_err(|e| JsValue::from_str(&e))
}

/// Compile a colour function (`{ r, g, b, a? }`) and evaluate it once at t = 0.
#[wasm_bindgen]
pub fn validate_color(color_val: JsValue, constants_val: JsValue) -> Result<(), JsValue> {
    let color = sampler::color_from_value(color_val)?
        .ok_or_else(|| JsValue::from_str("Invalid color: missing channels"))?;
    let math = session::math_context(sampler::constants_from_value(constants_val)?);
    session::check_color(&color, &math)
        .map(|_| ())
        .map_err(|e| JsValue::from_str(&e))
}

/// Sample the curve at `steps + 1` uniformly spaced parameters in one call.
///
/// Returns the same result shape as `WasmCurveSampler::get_result`.
#[wasm_bindgen]
pub fn sample_fixed(
    x_expr: &str,
    y_expr: &str,
    color_val: JsValue,
    constants_val: JsValue,
    steps: u32,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    init_logger();

    let color = sampler::color_from_value(color_val)?;
    let math = session::math_context(sampler::constants_from_value(constants_val)?);
    let result = session::sample_fixed(x_expr, y_expr, color.as_ref(), math, steps as usize)
        .map_err(|e| JsValue::from_str(&e))?;
    to_value(&result).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Names of the built-in example curves.
#[wasm_bindgen]
pub fn preset_names() -> Vec<String> {
    curve_core::presets::PRESETS
        .iter()
        .map(|preset| preset.name.to_string())
        .collect()
}

/// `[x(t), y(t)]` source of a built-in example curve.
#[wasm_bindgen]
pub fn preset_source(name: &str) -> Result<Vec<String>, JsValue> {
    let preset = curve_core::presets::find(name)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown preset: {}", name)))?;
    Ok(vec![preset.x.to_string(), preset.y.to_string()])
}

/// `{ r, g, b }` colour source of a built-in example curve.
#[wasm_bindgen]
pub fn preset_color(name: &str) -> Result<JsValue, JsValue> {
    let preset = curve_core::presets::find(name)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown preset: {}", name)))?;
    to_value(&preset.color.source())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
