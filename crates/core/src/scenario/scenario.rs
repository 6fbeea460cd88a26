//! [`Scenario`]: the top-level orchestrator tying every other module in this
//! crate together into the `reset -> step* -> complete` lifecycle of §4.9 and
//! §6.4.
//!
//! A `Scenario` owns its configuration, its ignitions and collaborators
//! (the grid sampler, fuel model, and optional vector engine), and the full
//! retained [`StepArchive`]. Every public mutator goes through
//! [`ScenarioLock`] so a host embedding this engine gets the same
//! free/shared-read/shared-simulation/exclusive-write discipline described
//! in §5.

use std::f64::consts::TAU;

use crate::core_types::fire_front::{FireFront, Orientation};
use crate::core_types::fire_point::{FbpScalars, FirePoint, StopStatus, VectorScalars};
use crate::core_types::history::{FrontId, HistoryRef, StepId};
use crate::core_types::ignition::Ignition;
use crate::core_types::vec2::Vec2;
use crate::error::EngineError;
use crate::grid::fuel_model::{FuelModel, FuelOverrides};
use crate::grid::sampler::{GridSampler, SampleOptions};
use crate::grid::terrain::TerrainData;
use crate::grid::vector_engine::VectorEngine;
use crate::scenario::active_fire::ActiveFireRegistry;
use crate::scenario::asset_tracker::{any_satisfied, critical_path, scan_step, Asset};
use crate::scenario::config::ScenarioConfig;
use crate::scenario::ellipse::{EllipseInputs, EllipseModel};
use crate::scenario::gusting::GustingModel;
use crate::scenario::lock::ScenarioLock;
use crate::scenario::percentile::PercentileTable;
use crate::scenario::perimeter_maintenance::{
    coalesce, densify, merge_overlapping_fires, point_in_ring, resolve_self_intersections, rotation_fix,
    MaintenanceOptions,
};
use crate::scenario::propagator::{propagate_vertex, PropagationMode, PropagatorContext};
use crate::scenario::scenario_fire::ScenarioFire;
use crate::scenario::scheduler::{Scheduler, TerminationReason};
use crate::scenario::stop_conditions::{StepStats, StopCondition, StopConditions};
use crate::scenario::time_step::{ScenarioTimeStep, StepArchive};

/// A split-off loop below this fraction of a front's total area is clipped
/// rather than spun out as its own ring (§4.8.3). Not itself one of §6.3's
/// configuration values, so it's fixed here rather than exposed.
const SPLIT_AREA_FRACTION: f64 = 0.05;

/// Where a scenario sits in the §6.4 lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioState {
    /// Accepting ignitions, assets, stop conditions, and configuration changes.
    Configuring,
    /// [`Scenario::reset`] is building the step-0 fronts.
    Resetting,
    /// Accepting [`Scenario::step`] calls.
    Running,
    /// The run ended; the variant records why.
    Complete(TerminationReason),
    /// The run was stopped early by [`Scenario::cancel`], not by any natural
    /// termination condition.
    Cancelled,
}

/// The top-level fire growth engine, per §4.9 and §6.
pub struct Scenario {
    config: ScenarioConfig,
    ignitions: Vec<Ignition>,
    grid_sampler: Box<dyn GridSampler>,
    fuel_model: Box<dyn FuelModel>,
    vector_engine: Option<Box<dyn VectorEngine>>,
    terrain: Option<TerrainData>,
    percentile_table: PercentileTable,
    gusting: GustingModel,
    assets: Vec<Asset>,
    stop_conditions: StopConditions,
    active_fires: ActiveFireRegistry,
    archive: StepArchive,
    state: ScenarioState,
    lock: ScenarioLock,
    grid_bounds: Option<(Vec2, Vec2)>,
    fire_description: String,
    current_step: Option<StepId>,
}

impl Scenario {
    /// A scenario with default configuration and no ignitions, assets, or
    /// stop conditions. `grid_sampler`/`fuel_model` are the only collaborators
    /// that must be supplied up front; everything else is optional.
    #[must_use]
    pub fn new(grid_sampler: Box<dyn GridSampler>, fuel_model: Box<dyn FuelModel>) -> Self {
        Scenario {
            config: ScenarioConfig::new(),
            ignitions: Vec::new(),
            grid_sampler,
            fuel_model,
            vector_engine: None,
            terrain: None,
            percentile_table: PercentileTable::new(),
            gusting: GustingModel::default(),
            assets: Vec::new(),
            stop_conditions: StopConditions::new(),
            active_fires: ActiveFireRegistry::new(),
            archive: StepArchive::new(),
            state: ScenarioState::Configuring,
            lock: ScenarioLock::new(),
            grid_bounds: None,
            fire_description: "default".to_string(),
            current_step: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> ScenarioState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    #[must_use]
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// The currently-published step, or `None` before the first [`Scenario::reset`].
    #[must_use]
    pub fn current_step(&self) -> Option<&ScenarioTimeStep> {
        self.current_step.and_then(|id| self.archive.get(id))
    }

    /// Walk a vertex's critical path back through history; see
    /// [`crate::scenario::asset_tracker::critical_path`].
    #[must_use]
    pub fn critical_path(&self, start: HistoryRef) -> Vec<Vec2> {
        critical_path(&self.archive, start)
    }

    fn ensure_configuring(&self) -> Result<(), EngineError> {
        if self.state != ScenarioState::Configuring {
            return Err(EngineError::ScenarioBadState { state: "not_configuring" });
        }
        Ok(())
    }

    pub fn add_ignition(&mut self, ignition: Ignition) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        self.ensure_configuring()?;
        if !ignition.is_structurally_valid() {
            return Err(EngineError::ObjectInvalid {
                context: "ignition".into(),
            });
        }
        self.ignitions.push(ignition);
        Ok(())
    }

    pub fn add_asset(&mut self, asset: Asset) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        self.ensure_configuring()?;
        self.assets.push(asset);
        Ok(())
    }

    pub fn add_stop_condition(&mut self, condition: StopCondition) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        self.ensure_configuring()?;
        self.stop_conditions.add(condition);
        Ok(())
    }

    pub fn set_vector_engine(&mut self, engine: Box<dyn VectorEngine>) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        self.ensure_configuring()?;
        self.vector_engine = Some(engine);
        Ok(())
    }

    pub fn set_terrain(&mut self, terrain: TerrainData) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        self.ensure_configuring()?;
        self.terrain = Some(terrain);
        Ok(())
    }

    pub fn set_percentile_table(&mut self, table: PercentileTable) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        self.ensure_configuring()?;
        self.percentile_table = table;
        Ok(())
    }

    pub fn set_gusting(&mut self, gusting: GustingModel) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        self.ensure_configuring()?;
        self.gusting = gusting;
        Ok(())
    }

    /// The fire's extents (min, max) beyond which `BOUNDARY_STOP` fires a
    /// [`TerminationReason::CompleteExtents`]. Unset by default, in which
    /// case `BOUNDARY_STOP` never trips regardless of the flag.
    pub fn set_grid_bounds(&mut self, min: Vec2, max: Vec2) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        self.ensure_configuring()?;
        self.grid_bounds = Some((min, max));
        Ok(())
    }

    pub fn set_fire_description(&mut self, description: impl Into<String>) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        self.ensure_configuring()?;
        self.fire_description = description.into();
        Ok(())
    }

    pub fn set_perimeter_resolution(&mut self, value: f64) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        self.ensure_configuring()?;
        self.config.set_perimeter_resolution(value)
    }

    pub fn set_spatial_threshold(&mut self, value: f64) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        self.ensure_configuring()?;
        self.config.set_spatial_threshold(value)
    }

    pub fn set_growth_percentile(&mut self, value: f64) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        self.ensure_configuring()?;
        self.config.set_growth_percentile(value)
    }

    pub fn set_time_bounds(&mut self, start: i64, end: i64) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        self.ensure_configuring()?;
        self.config.set_time_bounds(start, end)
    }

    pub fn set_display_interval(&mut self, value: i64) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        self.ensure_configuring()?;
        self.config.set_display_interval(value)
    }

    /// Build the step-0 fronts from every registered ignition and enter
    /// `Running`. Callable again after `Complete*`/`Cancelled` (or even
    /// `Configuring`, for a first run) to (re)start the scenario from its
    /// current ignitions and configuration.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        if self.ignitions.is_empty() {
            return Err(EngineError::Uninitialized { what: "ignitions" });
        }
        let _span = tracing::info_span!("scenario_reset", ignitions = self.ignitions.len()).entered();
        self.state = ScenarioState::Resetting;

        self.archive = StepArchive::new();
        self.active_fires = ActiveFireRegistry::new();

        let start_time = self.config.values.start_time;
        let mut fires = Vec::with_capacity(self.ignitions.len());
        for index in 0..self.ignitions.len() {
            if !self.ignitions[index].is_structurally_valid() {
                return Err(EngineError::ObjectInvalid {
                    context: format!("ignitions[{index}]"),
                });
            }
            let active_id = self.active_fires.spawn(index);
            let fronts = self.build_ignition_fronts(index, start_time)?;
            fires.push(ScenarioFire::new(active_id, fronts));
        }

        let step_id = self.archive.next_step_id();
        self.archive.insert(ScenarioTimeStep::new(step_id, start_time, true, fires));
        self.current_step = Some(step_id);
        self.state = ScenarioState::Running;
        tracing::info!(step = step_id.0, t = start_time, "scenario reset");
        Ok(())
    }

    /// The fronts a single ignition becomes at reset. `PointSet` ignitions
    /// synthesize one small circular front per point (stopped immediately
    /// with [`StopStatus::NoFuel`] if the point itself sits on non-burnable
    /// fuel); `Polyline` becomes a thin closed sliver around the line so both
    /// sides can spread outward; `InteriorPolygon`/`ExteriorPolygon` become a
    /// single ring of the stated orientation, as given.
    fn build_ignition_fronts(&self, ignition_index: usize, t: i64) -> Result<Vec<FireFront>, EngineError> {
        use crate::core_types::ignition::IgnitionGeometry;
        let ignition = &self.ignitions[ignition_index];
        match &ignition.geometry {
            IgnitionGeometry::PointSet(points) => {
                let mut fronts = Vec::with_capacity(points.len());
                for &point in points {
                    fronts.push(self.ignition_circle(point, t)?);
                }
                Ok(fronts)
            }
            IgnitionGeometry::Polyline(points) => Ok(vec![self.polyline_sliver(points)]),
            IgnitionGeometry::InteriorPolygon(points) => Ok(vec![FireFront::from_vertices(
                points.iter().map(|&p| FirePoint::new(p)).collect(),
                Orientation::Interior,
            )]),
            IgnitionGeometry::ExteriorPolygon(points) => Ok(vec![FireFront::from_vertices(
                points.iter().map(|&p| FirePoint::new(p)).collect(),
                Orientation::Exterior,
            )]),
        }
    }

    /// A small regular polygon of radius `ignition_size` around `center`,
    /// stopped with `NoFuel` if the center itself isn't burnable.
    fn ignition_circle(&self, center: Vec2, t: i64) -> Result<FireFront, EngineError> {
        const SIDES: usize = 12;
        let radius = self.config.values.ignition_size.max(1e-6);
        let sample = self.grid_sampler.sample(center.x, center.y, t, &SampleOptions::default())?;
        let stopped = !sample.is_burnable();
        let points: Vec<FirePoint> = (0..SIDES)
            .map(|i| {
                let theta = TAU * (i as f64) / (SIDES as f64);
                let p = center + Vec2::new(radius * theta.cos(), radius * theta.sin());
                if stopped {
                    FirePoint::new_stopped(p, StopStatus::NoFuel)
                } else {
                    FirePoint::new(p)
                }
            })
            .collect();
        Ok(FireFront::from_vertices(points, Orientation::Exterior))
    }

    /// A degenerate ring hugging `points` on both sides, offset by a tiny
    /// fraction of the coalesce spacing so the two sides aren't perfectly
    /// collinear (a perfectly flat sliver has no well-defined outward normal
    /// at its fold points).
    fn polyline_sliver(&self, points: &[Vec2]) -> FireFront {
        let offset = (self.config.values.perimeter_spacing * 0.1).max(1e-3);
        let mut vertices: Vec<FirePoint> = points.iter().map(|&p| FirePoint::new(p)).collect();
        vertices.extend(points.iter().rev().map(|&p| FirePoint::new(p + Vec2::new(offset, offset))));
        FireFront::from_vertices(vertices, Orientation::Exterior)
    }

    /// Advance one sub-step: sample and propagate every live vertex, run
    /// perimeter maintenance, scan assets, and check every termination
    /// condition in §4.10's order. Returns `Some(reason)` once the run has
    /// ended (the scenario enters the matching `Complete*` state), or `None`
    /// while still running.
    pub fn step(&mut self) -> Result<Option<TerminationReason>, EngineError> {
        match self.state {
            ScenarioState::Configuring | ScenarioState::Resetting => return Err(EngineError::FireNotStarted),
            ScenarioState::Running => {}
            _ => return Err(EngineError::ScenarioBadState { state: "not_running" }),
        }
        let _sim = self.lock.begin_simulation();

        let cur_id = self.current_step.ok_or(EngineError::FireNotStarted)?;
        let t_cur = self.archive.get(cur_id).ok_or(EngineError::FireNotStarted)?.t;
        let _span = tracing::info_span!("scenario_step", t = t_cur).entered();

        let (max_ros, accelerating) = self.estimate_dt_inputs(cur_id, t_cur);
        let scheduler = Scheduler::new(self.config.values, self.config.flags);
        let dt_seconds = scheduler.next_dt(t_cur, accelerating, max_ros, &self.gusting);
        if dt_seconds == 0 {
            self.state = ScenarioState::Complete(TerminationReason::Complete);
            return Ok(Some(TerminationReason::Complete));
        }

        let t_new = t_cur + dt_seconds;
        let dt_minutes = (dt_seconds as f64) / 60.0;
        let mode = if self.config.flags.use_2d_growth {
            PropagationMode::TwoD
        } else {
            PropagationMode::ThreeD
        };
        let ellipse = EllipseModel::new(self.config.flags, &self.percentile_table);
        let new_step_id = self.archive.next_step_id();

        let mut new_fires = Vec::new();
        let mut breach_attempts = Vec::new();
        let mut succ_updates: Vec<(usize, usize, usize, HistoryRef)> = Vec::new();
        {
            let cur_step = self.archive.get(cur_id).ok_or(EngineError::FireNotStarted)?;
            for (fire_idx, fire) in cur_step.fires.iter().enumerate() {
                let mut new_fronts = Vec::with_capacity(fire.fronts.len());
                for (front_idx, front) in fire.fronts.iter().enumerate() {
                    let flat_id = FrontId(flat_front_id(cur_step, fire_idx, front_idx));
                    let mut new_points = Vec::with_capacity(front.len());
                    for (position_in_ring, idx) in front.indices().enumerate() {
                        let old_point = front.get(idx).expect("live index");
                        let mut new_point = if old_point.status.is_stopped() {
                            FirePoint::new_stopped(old_point.position, old_point.status)
                        } else {
                            let pred = front.get(front.prev_index(idx)).expect("live index").position;
                            let succ = front.get(front.next_index(idx)).expect("live index").position;
                            let (point, breach) = self.sample_and_propagate(
                                old_point.position,
                                pred,
                                succ,
                                t_cur,
                                dt_minutes,
                                mode,
                                front.orientation(),
                                &ellipse,
                                &cur_step.fires,
                                fire_idx,
                            );
                            if let Some(break_id) = breach {
                                breach_attempts.push(break_id);
                            }
                            point
                        };
                        new_point.prev_point = Some(HistoryRef::new(cur_id, flat_id, idx));
                        new_points.push(new_point);
                        succ_updates.push((
                            fire_idx,
                            front_idx,
                            idx,
                            HistoryRef::new(new_step_id, flat_id, position_in_ring),
                        ));
                    }
                    new_fronts.push(FireFront::from_vertices(new_points, front.orientation()));
                }
                new_fires.push(ScenarioFire::new(fire.active_fire, new_fronts));
            }
        }

        // Back-fill the symmetric succ_point links on the step we just
        // advanced from. Valid as long as perimeter maintenance below
        // doesn't renumber these slots (true except when a front actually
        // self-intersects and is rebuilt from scratch).
        if let Some(step) = self.archive.get_mut(cur_id) {
            for (fire_idx, front_idx, old_idx, reference) in succ_updates {
                if let Some(front) = step.fires.get_mut(fire_idx).and_then(|f| f.fronts.get_mut(front_idx)) {
                    if let Some(point) = front.get_mut(old_idx) {
                        point.succ_point = Some(reference);
                    }
                }
            }
        }

        if let Some(engine) = self.vector_engine.as_mut() {
            for break_id in breach_attempts {
                let _ = engine.record_attempt(break_id);
            }
        }

        let options = MaintenanceOptions {
            perimeter_spacing: self.config.values.perimeter_spacing,
            perimeter_resolution: self.config.values.perimeter_resolution,
            suppress_tight_concave_addpoint: self.config.flags.suppress_tight_concave_addpoint,
            split_area_fraction: SPLIT_AREA_FRACTION,
        };
        for (front_idx, fire) in new_fires.iter_mut().enumerate() {
            let mut rebuilt = Vec::with_capacity(fire.fronts.len());
            for front in fire.fronts.drain(..) {
                tracing::debug!(front = front_idx, vertices = front.len(), "perimeter maintenance");
                let mut front = front;
                coalesce(&mut front, &options);
                densify(&mut front, &options);
                for mut part in resolve_self_intersections(front, &options) {
                    rotation_fix(&mut part);
                    rebuilt.push(part);
                }
            }
            fire.fronts = rebuilt;
        }
        merge_overlapping_fires(&mut new_fires, &mut self.active_fires);

        let displayable = scheduler.is_displayable(t_new);
        self.archive.insert(ScenarioTimeStep::new(new_step_id, t_new, displayable, new_fires));
        self.current_step = Some(new_step_id);

        {
            let step = self.archive.get(new_step_id).expect("just inserted");
            scan_step(&mut self.assets, step);
        }

        let reason = self.check_termination(new_step_id, t_new, displayable);
        if let Some(reason) = reason {
            self.state = ScenarioState::Complete(reason);
        }

        if self.config.flags.purge_nondisplayable {
            // §4.9 step 8 / §9: rewire every live `prev_point` pointing into
            // a step about to be dropped to its nearest surviving ancestor
            // *before* the purge, so no retained history reference dangles.
            self.archive.rewire_before_purge(new_step_id);
            self.archive.purge_before(new_step_id);
        }

        tracing::debug!(step = new_step_id.0, t = t_new, displayable, "scenario step advanced");
        Ok(reason)
    }

    /// Every live, non-stopped vertex's sampled ROS/ROSeq, used to pick the
    /// next sub-step length (§4.10) before the sub-step is actually taken.
    /// A vertex whose sample fails is simply excluded from the estimate; it
    /// will be marked stopped for real when the sub-step runs.
    fn estimate_dt_inputs(&self, step_id: StepId, t: i64) -> (f64, bool) {
        let Some(step) = self.archive.get(step_id) else {
            return (0.0, false);
        };
        let moisture = self.config.values.specified_fmc.unwrap_or(10.0);
        let mut max_ros = 0.0;
        let mut accelerating = false;
        for fire in &step.fires {
            for front in &fire.fronts {
                for idx in front.indices() {
                    let Some(point) = front.get(idx) else { continue };
                    if point.status.is_stopped() {
                        continue;
                    }
                    let Ok(sample) = self.grid_sampler.sample(point.position.x, point.position.y, t, &SampleOptions::default()) else {
                        continue;
                    };
                    if !sample.is_burnable() {
                        continue;
                    }
                    let Ok(outputs) = self.fuel_model.compute(&sample.fuel_type, &sample, moisture, &FuelOverrides::new()) else {
                        continue;
                    };
                    if Scheduler::is_accelerating(outputs.ros, outputs.roseq) {
                        accelerating = true;
                    }
                    max_ros = max_ros.max(outputs.ros);
                }
            }
        }
        (max_ros, accelerating)
    }

    /// Sample, run the ellipse model, and propagate one live vertex by one
    /// sub-step. A sampling/fuel-model failure is treated as a recoverable
    /// per-vertex condition (§7): the vertex stops with `NoFuel` rather than
    /// aborting the whole step.
    #[allow(clippy::too_many_arguments)]
    fn sample_and_propagate(
        &self,
        position: Vec2,
        pred: Vec2,
        succ: Vec2,
        t: i64,
        dt_minutes: f64,
        mode: PropagationMode,
        orientation: Orientation,
        ellipse: &EllipseModel<'_>,
        all_fires: &[ScenarioFire],
        own_fire_idx: usize,
    ) -> (FirePoint, Option<u32>) {
        let Ok(sample) = self.grid_sampler.sample(position.x, position.y, t, &SampleOptions::default()) else {
            return (FirePoint::new_stopped(position, StopStatus::NoFuel), None);
        };
        if !sample.is_burnable() {
            return (FirePoint::new_stopped(position, StopStatus::NoFuel), None);
        }
        let moisture = self.config.values.specified_fmc.unwrap_or(10.0);
        let overrides = FuelOverrides::new();
        let Ok(outputs) = self.fuel_model.compute(&sample.fuel_type, &sample, moisture, &overrides) else {
            return (FirePoint::new_stopped(position, StopStatus::NoFuel), None);
        };

        let mut fbp = FbpScalars {
            rsi: outputs.rsi,
            roseq: outputs.roseq,
            ros: outputs.ros,
            bros: outputs.bros,
            fros: outputs.fros,
            raz: outputs.raz,
            sfc: outputs.sfc,
            cfb: outputs.cfb,
            cfc: outputs.cfc,
            tfc: outputs.tfc,
            fi: outputs.fi,
        };
        let ellipse_vector = ellipse.compute(
            &mut fbp,
            EllipseInputs {
                fuel_class_guid: &sample.fuel_type,
                fire_description: &self.fire_description,
                growth_percentile: self.config.values.ignitions_percentile,
            },
        );

        let ctx = PropagatorContext {
            mode,
            orientation,
            terrain: self.terrain.as_ref(),
            vector_engine: self.vector_engine.as_deref(),
            breaching_enabled: self.config.flags.breaching,
            minimum_spreading_ros: self.config.values.minimum_spreading_ros,
        };
        let is_burnable = |p: Vec2| {
            self.grid_sampler
                .sample(p.x, p.y, t, &SampleOptions::default())
                .map(|s| s.is_burnable())
                .unwrap_or(false)
        };
        let enters_other_fire = |p: Vec2| {
            all_fires
                .iter()
                .enumerate()
                .any(|(idx, fire)| idx != own_fire_idx && fire.fronts.iter().any(|front| point_in_ring(front, p)))
        };

        let result = propagate_vertex(position, pred, succ, &fbp, dt_minutes, &ctx, is_burnable, enters_other_fire);

        if result.status != StopStatus::Normal {
            return (FirePoint::new_stopped(result.position, result.status), result.breach_id);
        }

        let displacement = result.position - position;
        let azimuth = displacement.y.atan2(displacement.x);
        let vector_ros = EllipseModel::radius_at_azimuth(&fbp, azimuth);
        let ros_ratio = if fbp.roseq > 0.0 { (vector_ros / fbp.roseq).max(0.0) } else { 1.0 };
        let cfb = (fbp.cfb * ros_ratio).min(1.0);
        let fi = fbp.fi * ros_ratio;
        let tree_height = self.fuel_model.tree_height(&sample.fuel_type).unwrap_or(0.0);

        let mut point = FirePoint::new(result.position);
        point.ellipse_ros = ellipse_vector;
        point.fbp = fbp;
        point.vector = VectorScalars {
            ros: vector_ros,
            sfc: fbp.sfc * ros_ratio,
            cfb,
            cfc: fbp.cfc * ros_ratio,
            tfc: fbp.tfc * ros_ratio,
            fi,
            flame_length: self.fuel_model.flame_length(tree_height, cfb, fi),
            ros_ratio,
        };
        point.successful_breach = result.breach_id.is_some();
        (point, result.breach_id)
    }

    /// Check every §4.10 termination condition in order, without mutating
    /// `self.state` (the caller does that once it has the full reason).
    fn check_termination(&mut self, step_id: StepId, t: i64, displayable: bool) -> Option<TerminationReason> {
        if t >= self.config.values.end_time {
            return Some(TerminationReason::Complete);
        }
        if self.config.flags.boundary_stop && self.any_front_outside_bounds(step_id) {
            return Some(TerminationReason::CompleteExtents);
        }
        if any_satisfied(&self.assets) {
            return Some(TerminationReason::CompleteAssets);
        }
        if displayable && !self.stop_conditions.is_empty() {
            let step = self.archive.get(step_id)?;
            let stats = StepStats::new(t, step.total_area(), step.total_perimeter_length());
            if self.stop_conditions.evaluate(&stats) {
                return Some(TerminationReason::CompleteStopCondition);
            }
        }
        None
    }

    fn any_front_outside_bounds(&self, step_id: StepId) -> bool {
        let Some((min, max)) = self.grid_bounds else { return false };
        let Some(step) = self.archive.get(step_id) else { return false };
        step.fires.iter().flat_map(|fire| fire.fronts.iter()).any(|front| {
            front.indices().any(|idx| {
                let p = front.get(idx).expect("live index").position;
                p.x < min.x || p.x > max.x || p.y < min.y || p.y > max.y
            })
        })
    }

    /// Discard everything after the previous displayable step and resume
    /// running from there (§6.4). Errors if there is no earlier displayable
    /// step to return to.
    pub fn step_back(&mut self) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        let cur = self.current_step.ok_or(EngineError::FireNotStarted)?;
        let mut target = None;
        for candidate in 0..cur.0 {
            if let Some(step) = self.archive.get(StepId(candidate)) {
                if step.displayable {
                    target = Some(StepId(candidate));
                }
            }
        }
        let Some(target) = target else {
            return Err(EngineError::ScenarioBadState { state: "no_prior_step" });
        };
        self.archive.truncate_after(target);
        self.current_step = Some(target);
        self.state = ScenarioState::Running;
        Ok(())
    }

    /// Return to `Configuring` with an empty archive, ready for new/changed
    /// ignitions, assets, stop conditions, or configuration before the next
    /// [`Scenario::reset`]. Asset arrival bookkeeping is cleared along with
    /// everything else.
    pub fn clear(&mut self) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        self.archive = StepArchive::new();
        self.active_fires = ActiveFireRegistry::new();
        self.current_step = None;
        for asset in &mut self.assets {
            for node in &mut asset.nodes {
                node.arrived = false;
                node.arrival_time = None;
                node.closest_fire_point = None;
                node.closest_fire_front = None;
                node.closest_point_xy = None;
            }
        }
        self.state = ScenarioState::Configuring;
        Ok(())
    }

    /// End a running scenario early without any natural termination reason.
    pub fn cancel(&mut self) -> Result<(), EngineError> {
        let _w = self.lock.write()?;
        if self.state != ScenarioState::Running {
            return Err(EngineError::ScenarioBadState { state: "not_running" });
        }
        self.state = ScenarioState::Cancelled;
        Ok(())
    }
}

/// A front's position in a step's flat `fires[*].fronts` enumeration, the
/// same scheme [`crate::scenario::asset_tracker::scan_step`] uses for `FrontId`.
fn flat_front_id(step: &ScenarioTimeStep, fire_idx: usize, front_idx: usize) -> u32 {
    let preceding: usize = step.fires[..fire_idx].iter().map(|f| f.fronts.len()).sum();
    (preceding + front_idx) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::ignition::IgnitionGeometry;
    use crate::grid::fuel_model::RothermelStyleFuelModel;
    use crate::grid::sampler::UniformGridSampler;
    use crate::scenario::asset_tracker::{AssetGeometryNode, AssetOperation};

    fn test_scenario() -> Scenario {
        let sampler = Box::new(UniformGridSampler::flat("grass"));
        let fuel = Box::new(RothermelStyleFuelModel::new().with_default_grass());
        let mut scenario = Scenario::new(sampler, fuel);
        scenario
            .add_ignition(Ignition::new(IgnitionGeometry::PointSet(vec![Vec2::new(0.0, 0.0)]), 0))
            .unwrap();
        scenario
    }

    #[test]
    fn reset_requires_at_least_one_ignition() {
        let sampler = Box::new(UniformGridSampler::flat("grass"));
        let fuel = Box::new(RothermelStyleFuelModel::new().with_default_grass());
        let mut scenario = Scenario::new(sampler, fuel);
        assert!(scenario.reset().is_err());
    }

    #[test]
    fn reset_builds_one_fire_per_ignition_and_enters_running() {
        let mut scenario = test_scenario();
        scenario.reset().unwrap();
        assert_eq!(scenario.state(), ScenarioState::Running);
        assert_eq!(scenario.current_step().unwrap().fires.len(), 1);
    }

    #[test]
    fn step_before_reset_errors_with_fire_not_started() {
        let mut scenario = test_scenario();
        assert_eq!(scenario.step().unwrap_err(), EngineError::FireNotStarted);
    }

    #[test]
    fn step_grows_the_fire_area() {
        let mut scenario = test_scenario();
        scenario.reset().unwrap();
        let area0 = scenario.current_step().unwrap().total_area();
        scenario.step().unwrap();
        let area1 = scenario.current_step().unwrap().total_area();
        assert!(area1 > area0);
    }

    #[test]
    fn add_ignition_rejected_once_running() {
        let mut scenario = test_scenario();
        scenario.reset().unwrap();
        let more = Ignition::new(IgnitionGeometry::PointSet(vec![Vec2::new(50.0, 50.0)]), 0);
        assert!(scenario.add_ignition(more).is_err());
    }

    #[test]
    fn run_to_completion_reports_complete() {
        let mut scenario = test_scenario();
        scenario.set_time_bounds(0, 1200).unwrap();
        scenario.reset().unwrap();
        let mut reason = None;
        for _ in 0..200 {
            if let Some(r) = scenario.step().unwrap() {
                reason = Some(r);
                break;
            }
        }
        assert_eq!(reason, Some(TerminationReason::Complete));
    }

    #[test]
    fn step_back_restores_the_previous_displayable_step() {
        let mut scenario = test_scenario();
        scenario.set_spatial_threshold(1000.0).unwrap();
        scenario.reset().unwrap();
        scenario.step().unwrap();
        assert_eq!(scenario.current_step().unwrap().t, 600);
        scenario.step_back().unwrap();
        assert_eq!(scenario.current_step().unwrap().t, 0);
        assert_eq!(scenario.state(), ScenarioState::Running);
    }

    #[test]
    fn cancel_only_valid_while_running() {
        let mut scenario = test_scenario();
        assert!(scenario.cancel().is_err());
        scenario.reset().unwrap();
        assert!(scenario.cancel().is_ok());
        assert_eq!(scenario.state(), ScenarioState::Cancelled);
    }

    #[test]
    fn clear_returns_to_configuring_and_allows_new_ignitions() {
        let mut scenario = test_scenario();
        scenario.reset().unwrap();
        scenario.clear().unwrap();
        assert_eq!(scenario.state(), ScenarioState::Configuring);
        assert!(scenario.current_step().is_none());
        let more = Ignition::new(IgnitionGeometry::PointSet(vec![Vec2::new(50.0, 50.0)]), 0);
        assert!(scenario.add_ignition(more).is_ok());
    }

    #[test]
    fn asset_arrival_terminates_with_complete_assets() {
        let mut scenario = test_scenario();
        scenario.set_spatial_threshold(1000.0).unwrap();
        scenario
            .add_asset(Asset::new(
                AssetOperation::AllMustArrive,
                vec![AssetGeometryNode::new(vec![Vec2::new(0.0, 0.0)])],
            ))
            .unwrap();
        scenario.reset().unwrap();
        let reason = scenario.step().unwrap();
        assert_eq!(reason, Some(TerminationReason::CompleteAssets));
    }

    #[test]
    fn critical_path_from_current_step_reaches_back_to_ignition() {
        let mut scenario = test_scenario();
        scenario.set_spatial_threshold(1000.0).unwrap();
        scenario.reset().unwrap();
        scenario.step().unwrap();
        let step = scenario.current_step().unwrap();
        let reference = HistoryRef::new(step.id, FrontId(0), 0);
        let path = scenario.critical_path(reference);
        assert!(path.len() >= 2);
    }
}
