//=========================================================================
// C-ABI Entry Points
//=========================================================================
//
// Stable symbols loaded by the activity glue. One bridge per process,
// held in a global slot; every entry point locks the slot, forwards to
// the matching `Bridge` method and logs failures.
//
// Only `hearth_on_create` reports a result. The other entry points are
// no-ops with a diagnostic when no bridge exists.
//
// Raw Android codes (AMOTION_EVENT_ACTION_*, AKEY_EVENT_ACTION_*,
// AKEYCODE_*) are accepted as-is and converted here.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::{c_char, c_void, CStr};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, error, warn};

//=== Internal Dependencies ===============================================

use super::Bridge;
use crate::config::BridgeConfig;
use crate::core::app::TestBed;
use crate::core::event::{KeyAction, KeyCode, KeyEvent, MotionAction, MotionEvent, SurfaceHandle};
use crate::error::BridgeError;

//=== Return Codes ========================================================

pub const HEARTH_OK: i32 = 0;
/// `hearth_on_create` called while a bridge exists.
pub const HEARTH_ERR_ALREADY_CREATED: i32 = -1;
/// Config path is not UTF-8, or the file cannot be read or parsed.
pub const HEARTH_ERR_CONFIG: i32 = -2;
/// The bridge rejected the configuration.
pub const HEARTH_ERR_CREATE: i32 = -3;

//=== Global Slot =========================================================

static BRIDGE: Mutex<Option<Bridge>> = Mutex::new(None);

fn slot() -> MutexGuard<'static, Option<Bridge>> {
    BRIDGE.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with_bridge<T>(entry: &'static str, f: impl FnOnce(&mut Bridge) -> Result<T, BridgeError>) {
    let mut slot = slot();
    match slot.as_mut() {
        Some(bridge) => {
            if let Err(e) = f(bridge) {
                warn!(target: "bridge::ffi", "{} failed: {}", entry, e);
            }
        }
        None => warn!(target: "bridge::ffi", "{} called without a bridge; ignored", entry),
    }
}

fn dimension(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

//=========================================================================
// Lifecycle
//=========================================================================

/// Creates the process-wide bridge with the test-bed core.
///
/// Returns [`HEARTH_OK`] or a negative `HEARTH_ERR_*` code.
///
/// # Safety
///
/// `config_path` must be null or a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn hearth_on_create(config_path: *const c_char) -> i32 {
    let _ = env_logger::try_init();

    let mut slot = slot();
    if slot.is_some() {
        error!(target: "bridge::ffi", "hearth_on_create called twice");
        return HEARTH_ERR_ALREADY_CREATED;
    }

    let config = if config_path.is_null() {
        BridgeConfig::default()
    } else {
        // SAFETY: non-null and null-terminated per the caller contract.
        let path = match unsafe { CStr::from_ptr(config_path) }.to_str() {
            Ok(path) => path,
            Err(e) => {
                error!(target: "bridge::ffi", "Config path is not UTF-8: {}", e);
                return HEARTH_ERR_CONFIG;
            }
        };
        match BridgeConfig::load_or_default(path) {
            Ok(config) => config,
            Err(e) => {
                error!(target: "bridge::ffi", "{}", e);
                return HEARTH_ERR_CONFIG;
            }
        }
    };

    match Bridge::on_create(config, Box::new(TestBed::new())) {
        Ok(bridge) => {
            *slot = Some(bridge);
            HEARTH_OK
        }
        Err(e) => {
            error!(target: "bridge::ffi", "Bridge creation failed: {}", e);
            HEARTH_ERR_CREATE
        }
    }
}

#[no_mangle]
pub extern "C" fn hearth_on_start() {
    with_bridge("hearth_on_start", Bridge::on_start);
}

#[no_mangle]
pub extern "C" fn hearth_on_resume() {
    with_bridge("hearth_on_resume", Bridge::on_resume);
}

#[no_mangle]
pub extern "C" fn hearth_on_pause() {
    with_bridge("hearth_on_pause", Bridge::on_pause);
}

#[no_mangle]
pub extern "C" fn hearth_on_stop() {
    with_bridge("hearth_on_stop", Bridge::on_stop);
}

/// Stops the render thread, releases everything and frees the slot.
///
/// A rejected (out-of-order) destroy leaves the bridge in place.
#[no_mangle]
pub extern "C" fn hearth_on_destroy() {
    let mut slot = slot();
    let Some(bridge) = slot.as_mut() else {
        warn!(target: "bridge::ffi", "hearth_on_destroy called without a bridge; ignored");
        return;
    };

    match bridge.on_destroy() {
        Ok(report) => {
            debug!(target: "bridge::ffi", "Destroyed: {:?}", report);
            *slot = None;
        }
        Err(e) => warn!(target: "bridge::ffi", "hearth_on_destroy failed: {}", e),
    }
}

//=========================================================================
// Surface
//=========================================================================

/// `window` is the host's native window pointer; it is never dereferenced.
#[no_mangle]
pub extern "C" fn hearth_on_surface_created(window: *mut c_void, width: i32, height: i32) {
    let handle = SurfaceHandle::from_ptr(window);
    with_bridge("hearth_on_surface_created", |bridge| {
        bridge.on_surface_created(handle, dimension(width), dimension(height))
    });
}

#[no_mangle]
pub extern "C" fn hearth_on_surface_changed(width: i32, height: i32) {
    with_bridge("hearth_on_surface_changed", |bridge| {
        bridge.on_surface_changed(dimension(width), dimension(height))
    });
}

#[no_mangle]
pub extern "C" fn hearth_on_surface_destroyed() {
    with_bridge("hearth_on_surface_destroyed", Bridge::on_surface_destroyed);
}

//=========================================================================
// Input
//=========================================================================

#[no_mangle]
pub extern "C" fn hearth_on_motion_event(
    pointer_id: i32,
    x: f32,
    y: f32,
    action: i32,
    timestamp_nanos: i64,
) {
    let Some(action) = MotionAction::from_android(action) else {
        debug!(target: "bridge::ffi", "Unhandled motion action {:#x}", action);
        return;
    };

    let event = MotionEvent {
        pointer_id,
        x,
        y,
        action,
        timestamp_nanos,
    };
    with_bridge("hearth_on_motion_event", |bridge| bridge.on_motion_event(event));
}

#[no_mangle]
pub extern "C" fn hearth_on_key_event(key_code: i32, action: i32) {
    let (Ok(code), Some(action)) = (u32::try_from(key_code), KeyAction::from_android(action)) else {
        debug!(target: "bridge::ffi", "Unhandled key event {} / {}", key_code, action);
        return;
    };

    let event = KeyEvent {
        code: KeyCode::from_android(code),
        action,
    };
    with_bridge("hearth_on_key_event", |bridge| bridge.on_key_event(event));
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::surface::SurfaceState;
    use std::ffi::CString;

    fn lifecycle() -> Option<crate::bridge::HostLifecycle> {
        slot().as_ref().map(|bridge| bridge.lifecycle())
    }

    // The slot is process-wide, so the whole session runs in one test.
    #[test]
    fn full_session_through_c_symbols() {
        // Entry points without a bridge are ignored.
        hearth_on_start();
        hearth_on_key_event(111, 0);
        hearth_on_destroy();
        assert!(lifecycle().is_none());

        // A malformed config file is rejected.
        let path = std::env::temp_dir().join("hearth_ffi_malformed.toml");
        std::fs::write(&path, "queue_capacity = \"lots\"").unwrap();
        let c_path = CString::new(path.to_str().unwrap()).unwrap();
        assert_eq!(unsafe { hearth_on_create(c_path.as_ptr()) }, HEARTH_ERR_CONFIG);
        let _ = std::fs::remove_file(&path);

        // Missing config file falls back to defaults.
        let missing = CString::new("/no/such/dir/hearth.toml").unwrap();
        assert_eq!(unsafe { hearth_on_create(missing.as_ptr()) }, HEARTH_OK);
        assert_eq!(unsafe { hearth_on_create(std::ptr::null()) }, HEARTH_ERR_ALREADY_CREATED);
        hearth_on_destroy();
        assert!(lifecycle().is_none());

        // Contract slips are logged, not fatal, for the rest of the session.
        let path = std::env::temp_dir().join("hearth_ffi_log_policy.toml");
        std::fs::write(&path, "contract_policy = \"log\"\nlog_fps = false\n").unwrap();
        let c_path = CString::new(path.to_str().unwrap()).unwrap();
        assert_eq!(unsafe { hearth_on_create(c_path.as_ptr()) }, HEARTH_OK);
        let _ = std::fs::remove_file(&path);

        hearth_on_start();
        hearth_on_resume();

        // Destroy while resumed is out of order; the bridge stays.
        hearth_on_destroy();
        assert_eq!(lifecycle(), Some(crate::bridge::HostLifecycle::Resumed));
        assert_eq!(unsafe { hearth_on_create(std::ptr::null()) }, HEARTH_ERR_ALREADY_CREATED);

        let mut window = 0u8;
        hearth_on_surface_created(&mut window as *mut u8 as *mut c_void, 1080, 2400);
        hearth_on_surface_changed(2400, 1080);
        hearth_on_motion_event(0, 10.0, 20.0, 0, 1);
        hearth_on_motion_event(0, 10.0, 20.0, 0x7f, 2);
        hearth_on_key_event(62, 0);
        hearth_on_key_event(-5, 0);

        {
            let slot = slot();
            let bridge = slot.as_ref().unwrap();
            assert!(matches!(
                bridge.surface_state(),
                SurfaceState::Ready { width: 2400, height: 1080, .. }
            ));
        }

        hearth_on_surface_destroyed();
        hearth_on_pause();
        hearth_on_stop();
        assert_eq!(lifecycle(), Some(crate::bridge::HostLifecycle::Stopped));

        hearth_on_destroy();
        assert!(lifecycle().is_none());

        // The slot is free again for a new activity instance.
        assert_eq!(unsafe { hearth_on_create(std::ptr::null()) }, HEARTH_OK);
        hearth_on_destroy();
        assert!(lifecycle().is_none());
    }

    #[test]
    fn negative_dimensions_clamp_to_zero() {
        assert_eq!(dimension(-1), 0);
        assert_eq!(dimension(640), 640);
    }
}
