//! Core types and utilities

pub mod attribute;
pub mod fire_front;
pub mod fire_point;
pub mod history;
pub mod ignition;
pub(crate) mod spatial;
pub mod stat;
pub mod vec2;
pub mod vec3;

pub use attribute::{AttributeSet, AttributeValue};
pub use fire_front::FireFront;
pub use fire_point::{FbpScalars, FirePoint, StopStatus, VectorScalars};
pub use history::{FrontId, HistoryRef, StepId};
pub use ignition::{Ignition, IgnitionGeometry};
pub use stat::{StatId, Unit};
pub use vec2::Vec2;
pub use vec3::Vec3;
