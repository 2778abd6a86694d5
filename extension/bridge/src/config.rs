use bridge::BridgeConfig;
use js_sys::Reflect;
use wasm_bindgen::JsValue;
use web_sys::Window;

/// Global the embedding page may set before the bridge loads.
const CONFIG_GLOBAL: &str = "__BRIDGE_CONFIG__";

/// Reads `window.__BRIDGE_CONFIG__`. Absent means defaults; a value that does
/// not deserialize is reported so the caller can log it and fall back.
pub fn load_config(window: &Window) -> Result<BridgeConfig, String> {
    let raw = Reflect::get(window, &JsValue::from_str(CONFIG_GLOBAL)).unwrap_or(JsValue::UNDEFINED);
    if raw.is_undefined() || raw.is_null() {
        return Ok(BridgeConfig::default());
    }
    serde_wasm_bindgen::from_value(raw).map_err(|err| format!("invalid {CONFIG_GLOBAL}: {err}"))
}
