//! Browser host: requestAnimationFrame and LocalStorage

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::scheduler::{FrameCallback, FrameHost, FrameToken};

/// Frame host backed by `window.requestAnimationFrame`
pub struct RafHost {
    window: web_sys::Window,
}

impl RafHost {
    pub fn new(window: web_sys::Window) -> Self {
        Self { window }
    }
}

impl FrameHost for RafHost {
    fn schedule(&self, callback: FrameCallback) -> Option<FrameToken> {
        // Frees itself after the single call
        let closure = Closure::once_into_js(move |time: f64| callback(time));
        match self
            .window
            .request_animation_frame(closure.unchecked_ref())
        {
            Ok(handle) => Some(FrameToken(handle)),
            Err(err) => {
                log::error!("requestAnimationFrame failed: {:?}", err);
                None
            }
        }
    }

    fn cancel(&self, token: FrameToken) {
        if let Err(err) = self.window.cancel_animation_frame(token.0) {
            log::warn!("cancelAnimationFrame failed: {:?}", err);
        }
    }
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
}

/// Read a LocalStorage entry
pub fn storage_get(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok()?
}

/// Write a LocalStorage entry, returning whether it stuck
pub fn storage_set(key: &str, value: &str) -> bool {
    local_storage()
        .map(|s| s.set_item(key, value).is_ok())
        .unwrap_or(false)
}

/// Delete a LocalStorage entry
pub fn storage_remove(key: &str) {
    if let Some(storage) = local_storage()
        && let Err(err) = storage.remove_item(key)
    {
        log::warn!("Could not remove {} from LocalStorage: {:?}", key, err);
    }
}
