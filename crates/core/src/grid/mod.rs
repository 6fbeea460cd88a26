//! Grid-sampled collaborators: fuel/weather/elevation, the fuel model, and
//! vector firebreaks, plus reference implementations good enough to drive
//! an end-to-end scenario without a real GIS stack behind them.

pub mod fuel_model;
pub mod sampler;
pub mod terrain;
pub mod vector_engine;

pub use fuel_model::{FbpOutputs, FuelModel, RothermelStyleFuelModel};
pub use sampler::{GridSample, GridSampler, SampleOptions, UniformGridSampler};
pub use terrain::{TerrainCache, TerrainData};
pub use vector_engine::{Breach, FireBreak, VectorEngine};
