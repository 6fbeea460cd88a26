//! C-ABI bindings for the fire perimeter-growth engine.
//!
//! Exposes a small, flat surface over [`wise_fire_growth_core::Scenario`]
//! wired to the reference uniform-grid/Rothermel-style collaborators, for
//! embedding in game engines and other C/C++ hosts that can't link the Rust
//! crate directly.
//!
//! # Module Organization
//! - [`error`] - error codes and the thread-local last-error mechanism
//! - [`instance`] - the opaque handle and its `fire_growth_*` functions
//! - [`helpers`] - internal helpers, not exposed in the C API
mod error;
mod helpers;
mod instance;

pub use error::{fire_sim_get_last_error, fire_sim_get_last_error_code, FireSimErrorCode};
pub use instance::{
    fire_growth_add_point_ignition, fire_growth_copy_front_vertices, fire_growth_destroy, fire_growth_front_count,
    fire_growth_new, fire_growth_reset, fire_growth_set_perimeter_resolution, fire_growth_set_spatial_threshold,
    fire_growth_set_time_bounds, fire_growth_step, fire_growth_termination_reason, fire_growth_total_area,
    FireGrowthInstance,
};
