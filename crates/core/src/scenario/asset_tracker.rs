//! [`Asset`]: geometry the host wants arrival notifications for, per §4.15.
//!
//! An asset is scanned against every displayable step's fronts; once its
//! operation is satisfied the scenario's termination check can end the run
//! early (`TerminationReason::CompleteAssets`).

use crate::core_types::fire_point::StopStatus;
use crate::core_types::history::{FrontId, HistoryRef};
use crate::core_types::vec2::Vec2;
use crate::scenario::perimeter_maintenance::point_in_ring;
use crate::scenario::time_step::{ScenarioTimeStep, StepArchive};

/// How many of an asset's geometry nodes must arrive before it's satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOperation {
    /// Never satisfied; the asset is tracked for reporting only.
    Ignore,
    /// Satisfied only once every node has arrived.
    AllMustArrive,
    /// Never contributes to termination (distinct from `Ignore`: a host may
    /// still want `scan_step` to record arrivals for `NoEffect` assets, just
    /// not have them counted by `is_satisfied`).
    NoEffect,
    /// Satisfied once at least `n` nodes have arrived.
    StopAfterCount(u32),
}

impl AssetOperation {
    /// Decode the raw operation code used by host-facing APIs: `<= -2` is
    /// `Ignore`, `-1` is `AllMustArrive`, `0` is `NoEffect`, and any positive
    /// `n` is `StopAfterCount(n)`.
    #[must_use]
    pub fn from_raw(n: i32) -> Self {
        match n {
            i32::MIN..=-2 => AssetOperation::Ignore,
            -1 => AssetOperation::AllMustArrive,
            0 => AssetOperation::NoEffect,
            n => AssetOperation::StopAfterCount(n as u32),
        }
    }
}

/// One vertex (or stand-in point, for a single-point asset) of an asset's
/// geometry, with its arrival bookkeeping.
#[derive(Debug, Clone)]
pub struct AssetGeometryNode {
    pub geometry: Vec<Vec2>,
    pub arrived: bool,
    pub arrival_time: Option<i64>,
    pub closest_fire_point: Option<HistoryRef>,
    pub closest_fire_front: Option<FrontId>,
    /// Plain `(x, y)` snapshot of `closest_fire_point`'s position at the time
    /// it was recorded, kept alongside the [`HistoryRef`] so a caller can
    /// still read the location after the referenced step is purged.
    pub closest_point_xy: Option<Vec2>,
}

impl AssetGeometryNode {
    #[must_use]
    pub fn new(geometry: Vec<Vec2>) -> Self {
        AssetGeometryNode {
            geometry,
            arrived: false,
            arrival_time: None,
            closest_fire_point: None,
            closest_fire_front: None,
            closest_point_xy: None,
        }
    }
}

/// Geometry the host wants notified of when a fire's perimeter reaches it.
#[derive(Debug, Clone)]
pub struct Asset {
    pub operation: AssetOperation,
    pub nodes: Vec<AssetGeometryNode>,
}

impl Asset {
    #[must_use]
    pub fn new(operation: AssetOperation, nodes: Vec<AssetGeometryNode>) -> Self {
        Asset { operation, nodes }
    }

    /// Whether this asset's operation has been met by the nodes' current
    /// arrival state.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        match self.operation {
            AssetOperation::Ignore | AssetOperation::NoEffect => false,
            AssetOperation::AllMustArrive => !self.nodes.is_empty() && self.nodes.iter().all(|n| n.arrived),
            AssetOperation::StopAfterCount(n) => self.nodes.iter().filter(|node| node.arrived).count() as u32 >= n,
        }
    }
}

/// Whether any asset in `assets` has reached its operation's satisfaction
/// criterion, used by the scenario's termination check.
#[must_use]
pub fn any_satisfied(assets: &[Asset]) -> bool {
    assets.iter().any(Asset::is_satisfied)
}

/// Scan every asset node against `step`'s fronts, marking newly-arrived nodes.
/// A node arrives when any of its geometry points falls inside a live,
/// non-stopped front's interior. Front ids follow [`ScenarioTimeStep::front`]'s
/// flat enumeration order.
pub fn scan_step(assets: &mut [Asset], step: &ScenarioTimeStep) {
    for asset in assets.iter_mut() {
        for node in &mut asset.nodes {
            if node.arrived {
                continue;
            }
            'search: for (fire_idx, fire) in step.fires.iter().enumerate() {
                let mut front_offset = 0;
                for front in &fire.fronts {
                    for &point in &node.geometry {
                        if point_in_ring(front, point) {
                            node.arrived = true;
                            node.arrival_time = Some(step.t);
                            let front_id = FrontId(flat_front_index(step, fire_idx, front_offset) as u32);
                            node.closest_fire_front = Some(front_id);
                            node.closest_fire_point = nearest_point_ref(step, front_id, point);
                            node.closest_point_xy =
                                node.closest_fire_point.and_then(|r| step.point(r.front, r.index)).map(|p| p.position);
                            break 'search;
                        }
                    }
                    front_offset += 1;
                }
            }
        }
    }
}

fn flat_front_index(step: &ScenarioTimeStep, fire_idx: usize, front_offset_within_fire: usize) -> usize {
    let preceding: usize = step.fires[..fire_idx].iter().map(|f| f.fronts.len()).sum();
    preceding + front_offset_within_fire
}

fn nearest_point_ref(step: &ScenarioTimeStep, front_id: FrontId, target: Vec2) -> Option<HistoryRef> {
    let front = step.front(front_id)?;
    let mut best: Option<(usize, f64)> = None;
    for idx in front.indices() {
        let p = front.get(idx)?.position;
        let d2 = (p - target).norm_squared();
        let better = match best {
            None => true,
            Some((_, bd)) => d2 < bd,
        };
        if better {
            best = Some((idx, d2));
        }
    }
    best.map(|(idx, _)| HistoryRef::new(step.id, front_id, idx))
}

/// Walk the critical path of a burning vertex backward through history,
/// following `prev_point` links until no ancestor remains, returning the
/// walked positions oldest-first. Bounded by the archive's retained step
/// count so a malformed or cyclic chain can never loop forever.
#[must_use]
pub fn critical_path(archive: &StepArchive, start: HistoryRef) -> Vec<Vec2> {
    let mut path = Vec::new();
    let mut current = Some(start);
    let max_hops = archive.len() + 1;
    let mut hops = 0;

    while let Some(reference) = current {
        if hops > max_hops {
            break;
        }
        hops += 1;

        // A `prev_point` chain that was rewired by `rewire_before_purge`
        // before its ancestor was dropped should always resolve directly;
        // this fallback only matters for a reference the caller held across
        // a purge without going through that rewiring (e.g. a stale asset
        // `closest_fire_point`).
        let Some(reference) = archive.fix_closest_point(reference) else {
            break;
        };
        let Some(point) = archive.resolve(reference) else {
            break;
        };
        path.push(point.position);

        current = point.prev_point.or_else(|| find_nearest_with_history(archive, reference, point.position));
    }

    path.reverse();
    path
}

/// When a vertex has no direct `prev_point` (it was inserted by
/// densification), find the nearest vertex in the previous step that does
/// carry a history link, so the critical path can still be traced through
/// maintenance-inserted vertices. Ties prefer a still-spreading point over a
/// stopped one, then the faster of two stopped points.
fn find_nearest_with_history(archive: &StepArchive, reference: HistoryRef, position: Vec2) -> Option<HistoryRef> {
    let step = archive.get(reference.step)?;
    if reference.step.0 == 0 {
        return None;
    }
    let prev_step = archive.get(crate::core_types::history::StepId(reference.step.0 - 1))?;
    let _ = step;

    let mut best: Option<(HistoryRef, f64, bool, f64)> = None;
    let mut flat_front_id = 0u32;
    for fire in &prev_step.fires {
        for front in &fire.fronts {
            let front_id_in_prev = FrontId(flat_front_id);
            flat_front_id += 1;
            for idx in front.indices() {
                let Some(candidate) = front.get(idx) else { continue };
                let d2 = (candidate.position - position).norm_squared();
                let is_normal = candidate.status == StopStatus::Normal;
                let ros = candidate.vector.ros;
                let better = match &best {
                    None => true,
                    Some((_, bd, b_normal, b_ros)) => {
                        if (d2 - *bd).abs() > 1e-9 {
                            d2 < *bd
                        } else if is_normal != *b_normal {
                            is_normal
                        } else {
                            ros > *b_ros
                        }
                    }
                };
                if better {
                    best = Some((HistoryRef::new(prev_step.id, front_id_in_prev, idx), d2, is_normal, ros));
                }
            }
        }
    }
    best.map(|(r, ..)| r)
}
