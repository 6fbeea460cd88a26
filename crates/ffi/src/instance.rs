//! `FireGrowthInstance`: the opaque handle exposed across the C ABI.
//!
//! Wraps a [`Scenario`] configured with the reference [`UniformGridSampler`]
//! and [`RothermelStyleFuelModel`] collaborators behind an `RwLock`, the same
//! shared-read/exclusive-write discipline a host embedding this engine from
//! multiple threads (a game engine's main/render/worker threads, say) needs.
//!
//! Trait-object collaborators (`GridSampler`, `FuelModel`, `VectorEngine`,
//! terrain) cannot cross a C ABI boundary as anything but an opaque blob, so
//! this layer only exposes the flat, uniform-grid reference setup; a host
//! that needs a custom grid or fuel model links against the Rust crate
//! directly instead of through this FFI surface (noted in DESIGN.md).

use std::ptr;
use std::sync::RwLock;

use wise_fire_growth_core::{
    FrontId, GridSampler, Ignition, IgnitionGeometry, RothermelStyleFuelModel, Scenario, TerminationReason,
    UniformGridSampler, Vec2,
};

use crate::error::{DefaultFireSimError, FireSimErrorCode};
use crate::helpers::track_result;

/// The running fire scenario, reachable only through the `fire_growth_*`
/// functions below.
pub struct FireGrowthInstance {
    pub(crate) scenario: RwLock<Scenario>,
}

impl FireGrowthInstance {
    fn new(fuel_type: &str) -> Box<Self> {
        let sampler: Box<dyn GridSampler> = Box::new(UniformGridSampler::flat(fuel_type));
        let fuel = Box::new(RothermelStyleFuelModel::new().with_default_grass());
        Box::new(FireGrowthInstance {
            scenario: RwLock::new(Scenario::new(sampler, fuel)),
        })
    }
}

/// Create a new instance over a flat, uniform grid of the named fuel type
/// (e.g. `"grass"`). Returns the new instance via `out_instance`.
///
/// # Safety
/// `fuel_type` must be a valid null-terminated UTF-8 C string. `out_instance`
/// must be a valid, non-null pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn fire_growth_new(
    fuel_type: *const std::os::raw::c_char,
    out_instance: *mut *mut FireGrowthInstance,
) -> FireSimErrorCode {
    if out_instance.is_null() {
        return crate::helpers::track_error(&DefaultFireSimError::null_pointer("out_instance"));
    }
    if fuel_type.is_null() {
        unsafe {
            *out_instance = ptr::null_mut();
        }
        return crate::helpers::track_error(&DefaultFireSimError::null_pointer("fuel_type"));
    }
    let fuel_type = unsafe { std::ffi::CStr::from_ptr(fuel_type) };
    let fuel_type = match fuel_type.to_str() {
        Ok(s) => s,
        Err(_) => {
            unsafe {
                *out_instance = ptr::null_mut();
            }
            return crate::helpers::track_error(&DefaultFireSimError::null_pointer("fuel_type"));
        }
    };

    crate::helpers::clear_last_error();
    let instance = FireGrowthInstance::new(fuel_type);
    unsafe {
        *out_instance = Box::into_raw(instance);
    }
    FireSimErrorCode::Ok
}

/// Destroy an instance created by [`fire_growth_new`].
///
/// # Safety
/// `ptr` must have been returned by `fire_growth_new` and not already freed.
#[no_mangle]
pub unsafe extern "C" fn fire_growth_destroy(ptr: *mut FireGrowthInstance) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(ptr));
    }
}

/// Add a single-point ignition at `(x, y)` starting at `start_time` (seconds).
///
/// # Safety
/// `instance` must be a live pointer from `fire_growth_new`.
#[no_mangle]
pub unsafe extern "C" fn fire_growth_add_point_ignition(
    instance: *mut FireGrowthInstance,
    x: f64,
    y: f64,
    start_time: i64,
) -> FireSimErrorCode {
    with_instance_mut(instance, |scenario| {
        let ignition = Ignition::new(IgnitionGeometry::PointSet(vec![Vec2::new(x, y)]), start_time);
        scenario.add_ignition(ignition)
    })
}

/// Set the scenario's start/end time bounds, in seconds.
///
/// # Safety
/// `instance` must be a live pointer from `fire_growth_new`.
#[no_mangle]
pub unsafe extern "C" fn fire_growth_set_time_bounds(
    instance: *mut FireGrowthInstance,
    start: i64,
    end: i64,
) -> FireSimErrorCode {
    with_instance_mut(instance, |scenario| scenario.set_time_bounds(start, end))
}

/// Set the densify threshold (§4.8.2), in meters.
///
/// # Safety
/// `instance` must be a live pointer from `fire_growth_new`.
#[no_mangle]
pub unsafe extern "C" fn fire_growth_set_perimeter_resolution(
    instance: *mut FireGrowthInstance,
    value: f64,
) -> FireSimErrorCode {
    with_instance_mut(instance, |scenario| scenario.set_perimeter_resolution(value))
}

/// Set the spatial-threshold sub-step cap, in meters.
///
/// # Safety
/// `instance` must be a live pointer from `fire_growth_new`.
#[no_mangle]
pub unsafe extern "C" fn fire_growth_set_spatial_threshold(
    instance: *mut FireGrowthInstance,
    value: f64,
) -> FireSimErrorCode {
    with_instance_mut(instance, |scenario| scenario.set_spatial_threshold(value))
}

/// Build the step-0 fronts from every registered ignition and begin running.
///
/// # Safety
/// `instance` must be a live pointer from `fire_growth_new`.
#[no_mangle]
pub unsafe extern "C" fn fire_growth_reset(instance: *mut FireGrowthInstance) -> FireSimErrorCode {
    with_instance_mut(instance, Scenario::reset)
}

/// Advance the scenario by one sub-step. `out_terminated` is set to `1` if
/// this step ended the run, `0` otherwise.
///
/// # Safety
/// `instance` and `out_terminated` must be valid, non-null.
#[no_mangle]
pub unsafe extern "C" fn fire_growth_step(
    instance: *mut FireGrowthInstance,
    out_terminated: *mut i32,
) -> FireSimErrorCode {
    if out_terminated.is_null() {
        return crate::helpers::track_error(&DefaultFireSimError::null_pointer("out_terminated"));
    }
    match with_instance_mut_result(instance, Scenario::step) {
        Ok(reason) => {
            unsafe {
                *out_terminated = i32::from(reason.is_some());
            }
            FireSimErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                *out_terminated = 0;
            }
            code
        }
    }
}

/// Terminal reason the scenario stopped running, or `-1` if it hasn't.
///
/// # Safety
/// `instance` and `out_reason` must be valid, non-null.
#[no_mangle]
pub unsafe extern "C" fn fire_growth_termination_reason(
    instance: *mut FireGrowthInstance,
    out_reason: *mut i32,
) -> FireSimErrorCode {
    if out_reason.is_null() {
        return crate::helpers::track_error(&DefaultFireSimError::null_pointer("out_reason"));
    }
    with_instance(instance, |scenario| {
        use wise_fire_growth_core::ScenarioState;
        let value = match scenario.state() {
            ScenarioState::Complete(TerminationReason::Complete) => 0,
            ScenarioState::Complete(TerminationReason::CompleteExtents) => 1,
            ScenarioState::Complete(TerminationReason::CompleteAssets) => 2,
            ScenarioState::Complete(TerminationReason::CompleteStopCondition) => 3,
            ScenarioState::Cancelled => 4,
            _ => -1,
        };
        unsafe {
            *out_reason = value;
        }
        Ok(())
    })
}

/// Total burned area of the current step, in square meters.
///
/// # Safety
/// `instance` and `out_area` must be valid, non-null.
#[no_mangle]
pub unsafe extern "C" fn fire_growth_total_area(
    instance: *mut FireGrowthInstance,
    out_area: *mut f64,
) -> FireSimErrorCode {
    if out_area.is_null() {
        return crate::helpers::track_error(&DefaultFireSimError::null_pointer("out_area"));
    }
    with_instance(instance, |scenario| {
        let area = scenario.current_step().map(|step| step.total_area()).unwrap_or(0.0);
        unsafe {
            *out_area = area;
        }
        Ok(())
    })
}

/// Number of fronts (exterior rings and interior holes, flattened) in the
/// current step.
///
/// # Safety
/// `instance` and `out_count` must be valid, non-null.
#[no_mangle]
pub unsafe extern "C" fn fire_growth_front_count(
    instance: *mut FireGrowthInstance,
    out_count: *mut u32,
) -> FireSimErrorCode {
    if out_count.is_null() {
        return crate::helpers::track_error(&DefaultFireSimError::null_pointer("out_count"));
    }
    with_instance(instance, |scenario| {
        let count = scenario
            .current_step()
            .map(|step| step.fires.iter().map(|f| f.fronts.len()).sum::<usize>() as u32)
            .unwrap_or(0);
        unsafe {
            *out_count = count;
        }
        Ok(())
    })
}

/// Copy the `(x, y)` vertices of front `front_index` into `out_xy`, a caller
/// owned buffer of at least `capacity` vertex slots (2 `f64`s each). Sets
/// `out_written` to the number of vertices actually copied; returns
/// [`FireSimErrorCode::InvalidParameter`] if `capacity` is too small.
///
/// # Safety
/// `instance`, `out_xy`, and `out_written` must be valid. `out_xy` must point
/// to at least `capacity * 2` writable `f64`s.
#[no_mangle]
pub unsafe extern "C" fn fire_growth_copy_front_vertices(
    instance: *mut FireGrowthInstance,
    front_index: u32,
    out_xy: *mut f64,
    capacity: u32,
    out_written: *mut u32,
) -> FireSimErrorCode {
    if out_xy.is_null() || out_written.is_null() {
        return crate::helpers::track_error(&DefaultFireSimError::null_pointer("out_xy/out_written"));
    }
    with_instance(instance, |scenario| {
        let step = scenario.current_step().ok_or_else(DefaultFireSimError::no_current_step)?;
        let front = step
            .front(FrontId(front_index))
            .ok_or_else(|| DefaultFireSimError::index_out_of_range("front_index", front_index))?;
        let indices: Vec<usize> = front.indices().collect();
        let needed = indices.len() as u32;
        if needed > capacity {
            return Err(DefaultFireSimError::buffer_too_small(needed, capacity));
        }
        for (slot, idx) in indices.iter().enumerate() {
            let position = front.get(*idx).expect("live index").position;
            unsafe {
                *out_xy.add(slot * 2) = position.x;
                *out_xy.add(slot * 2 + 1) = position.y;
            }
        }
        unsafe {
            *out_written = needed;
        }
        Ok(())
    })
}

/// Borrow the instance read-only, mapping lock/engine errors onto a
/// [`FireSimErrorCode`] and recording the last error on failure.
fn with_instance<R>(
    instance: *mut FireGrowthInstance,
    f: impl FnOnce(&Scenario) -> Result<R, DefaultFireSimError>,
) -> FireSimErrorCode {
    if instance.is_null() {
        return crate::helpers::track_error(&DefaultFireSimError::null_pointer("instance"));
    }
    let instance = unsafe { &*instance };
    let Ok(guard) = instance.scenario.read() else {
        return crate::helpers::track_error(&DefaultFireSimError::lock_poisoned());
    };
    match track_result(f(&guard)) {
        Ok(_) => FireSimErrorCode::Ok,
        Err(code) => code,
    }
}

/// Borrow the instance mutably for a fallible [`wise_fire_growth_core::EngineError`]-returning operation.
fn with_instance_mut(
    instance: *mut FireGrowthInstance,
    f: impl FnOnce(&mut Scenario) -> Result<(), wise_fire_growth_core::EngineError>,
) -> FireSimErrorCode {
    match with_instance_mut_result(instance, f) {
        Ok(()) => FireSimErrorCode::Ok,
        Err(code) => code,
    }
}

fn with_instance_mut_result<R>(
    instance: *mut FireGrowthInstance,
    f: impl FnOnce(&mut Scenario) -> Result<R, wise_fire_growth_core::EngineError>,
) -> Result<R, FireSimErrorCode> {
    if instance.is_null() {
        return Err(crate::helpers::track_error(&DefaultFireSimError::null_pointer(
            "instance",
        )));
    }
    let instance = unsafe { &*instance };
    let Ok(mut guard) = instance.scenario.write() else {
        return Err(crate::helpers::track_error(&DefaultFireSimError::lock_poisoned()));
    };
    track_result(f(&mut guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn new_reset_step_and_query_round_trip() {
        let fuel_type = CString::new("grass").unwrap();
        let mut ptr: *mut FireGrowthInstance = std::ptr::null_mut();
        let code = unsafe { fire_growth_new(fuel_type.as_ptr(), &mut ptr) };
        assert_eq!(code, FireSimErrorCode::Ok);
        assert!(!ptr.is_null());

        assert_eq!(unsafe { fire_growth_add_point_ignition(ptr, 0.0, 0.0, 0) }, FireSimErrorCode::Ok);
        assert_eq!(unsafe { fire_growth_set_time_bounds(ptr, 0, 1800) }, FireSimErrorCode::Ok);
        assert_eq!(unsafe { fire_growth_reset(ptr) }, FireSimErrorCode::Ok);

        let mut terminated = 0;
        assert_eq!(unsafe { fire_growth_step(ptr, &mut terminated) }, FireSimErrorCode::Ok);

        let mut area = 0.0;
        assert_eq!(unsafe { fire_growth_total_area(ptr, &mut area) }, FireSimErrorCode::Ok);
        assert!(area > 0.0);

        let mut front_count = 0;
        assert_eq!(unsafe { fire_growth_front_count(ptr, &mut front_count) }, FireSimErrorCode::Ok);
        assert!(front_count >= 1);

        let mut buf = vec![0.0_f64; 256];
        let mut written = 0;
        assert_eq!(
            unsafe { fire_growth_copy_front_vertices(ptr, 0, buf.as_mut_ptr(), 128, &mut written) },
            FireSimErrorCode::Ok
        );
        assert!(written >= 3);

        unsafe { fire_growth_destroy(ptr) };
    }

    #[test]
    fn null_instance_reports_null_pointer() {
        let mut area = 0.0;
        let code = unsafe { fire_growth_total_area(std::ptr::null_mut(), &mut area) };
        assert_eq!(code, FireSimErrorCode::NullPointer);
    }
}
