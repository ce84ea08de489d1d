#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for [`FlowcastRunner`].
//!
//! Wraps [`super::runner_core::DiagramRunner`] with JS-friendly types.
//! Structured values cross the boundary as JSON strings; the particle
//! buffer crosses as a `Float32Array`. Only compiled on `wasm32` targets.

use js_sys::{Float32Array, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use flowcast_render::SurfaceFrame;
use flowcast_runtime::Variant;
use serde::Serialize;

use super::runner_core::{DiagramRunner, RunnerConfig, host_time};

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = match info.location() {
                Some(loc) => format!("panic at {}:{}:{}: {info}", loc.file(), loc.line(), loc.column()),
                None => format!("panic: {info}"),
            };
            console_error(&msg);
        }));
    });
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// One mounted flow diagram, driven by the host's animation callback.
#[wasm_bindgen]
pub struct FlowcastRunner {
    core: DiagramRunner,
    last: Option<SurfaceFrame>,
}

#[wasm_bindgen]
impl FlowcastRunner {
    /// Create a runner. `config_json` may be empty for defaults; `variant`
    /// is `"before"` or `"after"`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, variant: &str) -> Result<FlowcastRunner, JsValue> {
        install_panic_hook();
        let config = if config_json.trim().is_empty() {
            RunnerConfig::default()
        } else {
            RunnerConfig::from_json_str(config_json).map_err(js_err)?
        };
        for problem in config.validate() {
            console_error(&format!("flowcast config: {problem}"));
        }
        let variant: Variant = variant.parse().map_err(js_err)?;
        Ok(Self {
            core: DiagramRunner::new(config, variant),
            last: None,
        })
    }

    /// Switch lens to new diagram + script JSON.
    pub fn load(&mut self, spec_json: &str, script_json: &str, now_ms: f64) -> Result<(), JsValue> {
        self.core
            .load_json_ms(spec_json, script_json, now_ms)
            .map_err(js_err)
    }

    pub fn resize(&mut self, width: f64, height: f64, dpr: f64) -> Result<bool, JsValue> {
        self.core.resize(width, height, dpr).map_err(js_err)
    }

    #[wasm_bindgen(js_name = setActive)]
    pub fn set_active(&mut self, active: bool, now_ms: f64) {
        if let Some(now) = host_time(now_ms) {
            self.core.set_active(active, now);
        }
    }

    #[wasm_bindgen(js_name = setVariant)]
    pub fn set_variant(&mut self, variant: &str, now_ms: f64) -> Result<(), JsValue> {
        let variant: Variant = variant.parse().map_err(js_err)?;
        self.core.set_variant_ms(variant, now_ms);
        Ok(())
    }

    #[wasm_bindgen(js_name = setExternalProgress)]
    pub fn set_external_progress(&mut self, progress: f64) {
        self.core.set_external_progress(progress);
    }

    /// Returns the terminal narrative state as JSON.
    #[wasm_bindgen(js_name = skipToComplete)]
    pub fn skip_to_complete(&mut self, now_ms: f64) -> String {
        to_json(&self.core.skip_to_complete_ms(now_ms))
    }

    /// Produce a frame. Returns `false` when nothing was painted.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        match self.core.frame_ms(now_ms) {
            Some(frame) => {
                self.last = Some(frame);
                true
            }
            None => false,
        }
    }

    /// Particles of the last frame, packed `PARTICLE_STRIDE` floats each.
    #[wasm_bindgen(js_name = particleBuffer)]
    pub fn particle_buffer(&self) -> Float32Array {
        let buf = self
            .last
            .as_ref()
            .map(|f| f.raster.to_buffer())
            .unwrap_or_default();
        Float32Array::from(buf.as_slice())
    }

    #[wasm_bindgen(js_name = particleStride)]
    pub fn particle_stride() -> u32 {
        flowcast_render::PARTICLE_STRIDE as u32
    }

    #[wasm_bindgen(js_name = backingSize)]
    pub fn backing_size(&self) -> Vec<u32> {
        let (w, h) = self.core.surface().raster().backing_size();
        vec![w, h]
    }

    #[wasm_bindgen(js_name = overlaysJson)]
    pub fn overlays_json(&self) -> String {
        self.last
            .as_ref()
            .map_or_else(|| "null".to_string(), |f| to_json(&f.overlays))
    }

    #[wasm_bindgen(js_name = stateJson)]
    pub fn state_json(&self) -> String {
        to_json(self.core.narrative_state())
    }

    #[wasm_bindgen(js_name = nodePositionsJson)]
    pub fn node_positions_json(&self) -> String {
        to_json(&self.core.node_positions())
    }

    pub fn svg(&self) -> String {
        self.core.svg()
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.core.pointer_move(x, y);
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self) {
        self.core.pointer_leave();
    }

    pub fn click(&mut self, x: f64, y: f64) -> Option<String> {
        self.core.click(x, y)
    }

    /// Drain hover/leave/click events as a JSON array.
    #[wasm_bindgen(js_name = takeEventsJson)]
    pub fn take_events_json(&mut self) -> String {
        to_json(&self.core.take_events())
    }

    #[wasm_bindgen(js_name = wantsFrame)]
    pub fn wants_frame(&self) -> bool {
        self.core.wants_frame()
    }

    /// Cancel every loop. The runner is inert afterwards.
    pub fn destroy(&mut self) {
        self.core.teardown();
        self.last = None;
    }
}
