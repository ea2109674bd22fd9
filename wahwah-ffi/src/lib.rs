//! C ABI wrapper for the wahwah effect (offline path).
//!
//! Exposes a small set of functions to create/destroy an effect instance,
//! update the parameter record, and process f32 blocks.
//!
//! ABI notes
//! - All functions are `extern "C"` and `#[no_mangle]`.
//! - Opaque handle type: `WahwahHandle` (heap-allocated; you own/delete it).
//! - Functions returning `u32` report 1 on success, 0 on a rejected call
//!   (invalid configuration, sequencing error, null pointer).
//!
//! Threading
//! - The object is NOT thread-safe; call all functions from the same audio thread.

use wahwah_core::params::WahwahParams;
use wahwah_engine::effect::{ChannelRole, WahwahEffect};

/// Opaque effect wrapper we hand to C.
#[repr(C)]
pub struct WahwahHandle {
    inner: WahwahEffect,
}

fn role_for(right_channel: u32) -> ChannelRole {
    if right_channel != 0 { ChannelRole::Right } else { ChannelRole::Left }
}

// --- Creation / destruction -------------------------------------------------------

/// Create a new effect instance with default parameters, initialized for an
/// offline stream at `sample_rate`. Pass a non-zero `right_channel` for the
/// second member of a stereo pair (decorrelates the sweep).
/// Returns a non-null pointer on success, or null on invalid configuration.
#[no_mangle]
pub extern "C" fn wahwah_create(sample_rate: f32, right_channel: u32) -> *mut WahwahHandle {
    let mut inner = match WahwahEffect::new(WahwahParams::default()) {
        Ok(fx) => fx,
        Err(_) => return std::ptr::null_mut(),
    };
    if inner.offline_init(f64::from(sample_rate), role_for(right_channel)).is_err() {
        return std::ptr::null_mut();
    }
    Box::into_raw(Box::new(WahwahHandle { inner }))
}

/// Destroy an effect previously returned by `wahwah_create`.
#[no_mangle]
pub extern "C" fn wahwah_destroy(handle: *mut WahwahHandle) {
    if !handle.is_null() {
        unsafe { drop(Box::from_raw(handle)); }
    }
}

/// Restart the stream at a new sample rate (filter memory and the LFO clock
/// start over; the parameter record is kept).
#[no_mangle]
pub extern "C" fn wahwah_reset(
    handle: *mut WahwahHandle,
    sample_rate: f32,
    right_channel: u32,
) -> u32 {
    if handle.is_null() { return 0; }
    let h = unsafe { &mut *handle };
    match h.inner.offline_init(f64::from(sample_rate), role_for(right_channel)) {
        Ok(()) => 1,
        Err(_) => 0,
    }
}

// --- Parameters ------------------------------------------------------------------

/// Replace the whole parameter record. Every field is range-checked; an
/// out-of-range field rejects the call and keeps the previous record.
/// Takes effect at the next processed block, stream memory untouched.
#[no_mangle]
pub extern "C" fn wahwah_set_params(
    handle: *mut WahwahHandle,
    freq_hz: f64,
    phase_deg: f64,
    depth_pct: f64,
    res: f64,
    freq_ofs_pct: f64,
    out_gain_db: f64,
) -> u32 {
    if handle.is_null() { return 0; }
    let h = unsafe { &mut *handle };
    let params = WahwahParams { freq_hz, phase_deg, depth_pct, res, freq_ofs_pct, out_gain_db };
    match h.inner.set_params(params) {
        Ok(()) => 1,
        Err(_) => 0,
    }
}

// --- Rendering -------------------------------------------------------------------

/// Process `len` samples from `input` into `output`. Passing the same
/// pointer for both is supported (in-place); distinct buffers must not
/// otherwise overlap. Returns the number of samples produced (0 on error).
#[no_mangle]
pub extern "C" fn wahwah_process_f32(
    handle: *mut WahwahHandle,
    input: *const f32,
    output: *mut f32,
    len: u32,
) -> u32 {
    if handle.is_null() || input.is_null() || output.is_null() {
        return 0;
    }
    let h = unsafe { &mut *handle };
    let n = len as usize;

    let produced = if std::ptr::eq(input, output as *const f32) {
        let buf = unsafe { std::slice::from_raw_parts_mut(output, n) };
        h.inner.offline_process_in_place(buf)
    } else {
        let ibuf = unsafe { std::slice::from_raw_parts(input, n) };
        let obuf = unsafe { std::slice::from_raw_parts_mut(output, n) };
        h.inner.offline_process(ibuf, obuf)
    };

    match produced {
        Ok(count) => count as u32,
        Err(_) => 0,
    }
}
