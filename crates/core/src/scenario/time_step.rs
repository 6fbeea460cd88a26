//! [`ScenarioTimeStep`]/[`StepArchive`]: the retained history of a scenario's
//! run, per §3 and §4.9.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core_types::fire_front::FireFront;
use crate::core_types::fire_point::FirePoint;
use crate::core_types::history::{FrontId, HistoryRef, StepId};
use crate::core_types::vec2::Vec2;
use crate::scenario::scenario_fire::ScenarioFire;

/// One time step's complete fire state: every [`ScenarioFire`] alive at time
/// `t`, plus whether this step is a "displayable" step (one the host should
/// render/query, as opposed to an internal sub-step).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioTimeStep {
    pub id: StepId,
    pub t: i64,
    pub displayable: bool,
    pub fires: Vec<ScenarioFire>,
}

impl ScenarioTimeStep {
    #[must_use]
    pub fn new(id: StepId, t: i64, displayable: bool, fires: Vec<ScenarioFire>) -> Self {
        ScenarioTimeStep { id, t, displayable, fires }
    }

    /// Total vertex count across every fire, for capacity planning and
    /// growth-rate stop conditions.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.fires.iter().map(ScenarioFire::vertex_count).sum()
    }

    /// Total enclosed area across every `Exterior` front, minus any
    /// `Interior` holes (signed area already encodes the sign difference).
    #[must_use]
    pub fn total_area(&self) -> f64 {
        // Exterior fronts wind positive, Interior holes negative (see
        // `FireFront::recompute_orientation`), so a plain sum already nets
        // out holes; only the grand total needs `abs()`.
        let signed: f64 = self.fires.iter().flat_map(|fire| fire.fronts.iter()).map(FireFront::signed_area2).sum();
        signed.abs() / 2.0
    }

    /// Look up a front by its flat index within this step (front ids are
    /// assigned by enumerating `fires[*].fronts` in order).
    #[must_use]
    pub fn front(&self, front_id: FrontId) -> Option<&FireFront> {
        let mut remaining = front_id.0 as usize;
        for fire in &self.fires {
            if remaining < fire.fronts.len() {
                return Some(&fire.fronts[remaining]);
            }
            remaining -= fire.fronts.len();
        }
        None
    }

    #[must_use]
    pub fn point(&self, front_id: FrontId, index: usize) -> Option<&FirePoint> {
        self.front(front_id)?.get(index)
    }

    /// Mutable counterpart to [`ScenarioTimeStep::front`], used to rewire
    /// `prev_point` links ahead of a purge.
    pub fn front_mut(&mut self, front_id: FrontId) -> Option<&mut FireFront> {
        let mut remaining = front_id.0 as usize;
        for fire in &mut self.fires {
            if remaining < fire.fronts.len() {
                return Some(&mut fire.fronts[remaining]);
            }
            remaining -= fire.fronts.len();
        }
        None
    }

    /// Sum of every front's perimeter length, for growth-rate stop
    /// conditions (§4.13).
    #[must_use]
    pub fn total_perimeter_length(&self) -> f64 {
        self.fires.iter().flat_map(|fire| fire.fronts.iter()).map(FireFront::perimeter_length).sum()
    }
}

/// Owns every retained [`ScenarioTimeStep`], keyed by [`StepId`], and
/// resolves [`HistoryRef`]s against it.
///
/// The original engine keeps every step's vertices alive for the run's
/// lifetime via raw pointers; here old steps may be purged
/// (`PURGE_NONDISPLAYABLE`) to bound memory, so a [`HistoryRef`] naming a
/// purged step must be repaired (via [`StepArchive::fix_closest_point`])
/// before anything walks it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepArchive {
    steps: FxHashMap<u64, ScenarioTimeStep>,
    next_id: u64,
}

impl StepArchive {
    #[must_use]
    pub fn new() -> Self {
        StepArchive::default()
    }

    /// Allocate the next [`StepId`] without yet storing a step under it.
    pub fn next_step_id(&mut self) -> StepId {
        let id = StepId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, step: ScenarioTimeStep) {
        self.steps.insert(step.id.0, step);
    }

    #[must_use]
    pub fn get(&self, id: StepId) -> Option<&ScenarioTimeStep> {
        self.steps.get(&id.0)
    }

    pub fn get_mut(&mut self, id: StepId) -> Option<&mut ScenarioTimeStep> {
        self.steps.get_mut(&id.0)
    }

    /// Number of steps currently retained (post-purge), used to bound
    /// history walks that must not loop forever.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Resolve a [`HistoryRef`] to the vertex it names, or `None` if the
    /// step was purged (callers needing resolution across purges should
    /// call [`StepArchive::fix_closest_point`] first).
    #[must_use]
    pub fn resolve(&self, reference: HistoryRef) -> Option<&FirePoint> {
        self.get(reference.step)?.point(reference.front, reference.index)
    }

    /// Drop every step older than `keep_from`, except steps flagged
    /// `displayable` (purging only applies to internal sub-steps, per
    /// `PURGE_NONDISPLAYABLE`). Callers must call
    /// [`StepArchive::rewire_before_purge`] with the same `keep_from` first,
    /// or surviving vertices whose `prev_point` names a step about to be
    /// purged will dangle.
    pub fn purge_before(&mut self, keep_from: StepId) {
        self.steps.retain(|&id, step| id >= keep_from.0 || step.displayable);
    }

    /// Whether the step named `id` will still be present after
    /// `purge_before(keep_from)`.
    fn survives(&self, id: StepId, keep_from: StepId) -> bool {
        id.0 >= keep_from.0 || self.steps.get(&id.0).is_some_and(|step| step.displayable)
    }

    /// Repoint every surviving vertex's `prev_point` that currently names a
    /// step `purge_before(keep_from)` is about to drop, per §4.9 step 8 /
    /// §9: "before purging, rewire all live history references pointing
    /// into this step to their nearest surviving ancestor." Must be called
    /// with the same `keep_from` immediately before `purge_before`.
    ///
    /// For each such link the walk follows the named vertex's own
    /// `prev_point` chain (the named vertex is still resolvable at this
    /// point, since nothing has been purged yet) until it reaches a step
    /// that will survive, and repoints the link there directly — or to
    /// `None` if the chain runs out before finding one, meaning the link's
    /// origin is itself about to be purged.
    pub fn rewire_before_purge(&mut self, keep_from: StepId) {
        let retained_ids: Vec<StepId> = self.steps.values().map(|s| s.id).filter(|&id| self.survives(id, keep_from)).collect();

        let mut updates: Vec<(StepId, FrontId, usize, Option<HistoryRef>)> = Vec::new();
        for &step_id in &retained_ids {
            let step = &self.steps[&step_id.0];
            let mut flat_front = 0u32;
            for fire in &step.fires {
                for front in &fire.fronts {
                    let front_id = FrontId(flat_front);
                    flat_front += 1;
                    for idx in front.indices() {
                        let Some(point) = front.get(idx) else { continue };
                        let Some(prev) = point.prev_point else { continue };
                        if self.survives(prev.step, keep_from) {
                            continue;
                        }
                        let rewired = self.nearest_surviving_ancestor(prev, keep_from);
                        updates.push((step_id, front_id, idx, rewired));
                    }
                }
            }
        }

        for (step_id, front_id, idx, new_prev) in updates {
            if let Some(point) = self.steps.get_mut(&step_id.0).and_then(|s| s.front_mut(front_id)).and_then(|f| f.get_mut(idx)) {
                point.prev_point = new_prev;
            }
        }
    }

    /// Follow `reference`'s own `prev_point` chain, starting from
    /// `reference` itself, until landing on a step that will survive
    /// `purge_before(keep_from)`. Every step visited must still be present
    /// (called before any purge), so each hop is a plain `resolve`.
    fn nearest_surviving_ancestor(&self, mut reference: HistoryRef, keep_from: StepId) -> Option<HistoryRef> {
        let mut guard = 0;
        loop {
            if self.survives(reference.step, keep_from) {
                return Some(reference);
            }
            let point = self.resolve(reference)?;
            reference = point.prev_point?;
            guard += 1;
            if guard > self.steps.len() + 1 {
                return None;
            }
        }
    }

    /// Drop every step after `keep_up_to`, the converse of `purge_before`:
    /// removes from the future rather than the past. Used by `step_back` to
    /// discard the steps produced since the target displayable step.
    pub fn truncate_after(&mut self, keep_up_to: StepId) {
        self.steps.retain(|&id, _| id <= keep_up_to.0);
    }

    /// Reattach `reference` to a still-resolvable vertex when the step it
    /// names was purged without having been rewired first (e.g. a stale
    /// external reference, such as an [`crate::scenario::asset_tracker::Asset`]'s
    /// `closest_fire_point`, held across a purge rather than a live
    /// `prev_point` chain `rewire_before_purge` would already have fixed).
    /// Returns the reference itself if it already resolves. Otherwise walks
    /// backward over still-present step ids at or before `reference.step`,
    /// reusing the same `(front, index)` slot, until one resolves — this is
    /// a best-effort fallback, not an exact ancestor walk, since the purged
    /// step's own history chain purged with it.
    #[must_use]
    pub fn fix_closest_point(&self, reference: HistoryRef) -> Option<HistoryRef> {
        if self.resolve(reference).is_some() {
            return Some(reference);
        }
        let mut guard = 0;
        let mut probe = reference.step;
        loop {
            let mut candidate = None;
            for step in self.steps.values() {
                if step.id.0 <= probe.0 && (candidate.is_none() || step.id.0 > candidate.unwrap()) {
                    candidate = Some(step.id.0);
                }
            }
            match candidate {
                Some(id) if guard < self.steps.len() + 1 => {
                    let fixed = HistoryRef::new(StepId(id), reference.front, reference.index);
                    if self.resolve(fixed).is_some() {
                        return Some(fixed);
                    }
                    probe = StepId(id.saturating_sub(1));
                    guard += 1;
                }
                _ => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::fire_front::Orientation;
    use crate::scenario::active_fire::ActiveFireId;

    fn triangle() -> FireFront {
        FireFront::from_vertices(
            vec![
                FirePoint::new(Vec2::new(0.0, 0.0)),
                FirePoint::new(Vec2::new(1.0, 0.0)),
                FirePoint::new(Vec2::new(0.0, 1.0)),
            ],
            Orientation::Exterior,
        )
    }

    fn step(archive: &mut StepArchive, t: i64, displayable: bool) -> StepId {
        let id = archive.next_step_id();
        let fires = vec![ScenarioFire::new(ActiveFireId(0), vec![triangle()])];
        archive.insert(ScenarioTimeStep::new(id, t, displayable, fires));
        id
    }

    #[test]
    fn resolve_finds_vertex_in_retained_step() {
        let mut archive = StepArchive::new();
        let id = step(&mut archive, 0, true);
        let found = archive.resolve(HistoryRef::new(id, FrontId(0), 0));
        assert!(found.is_some());
    }

    #[test]
    fn resolve_returns_none_for_purged_step() {
        let mut archive = StepArchive::new();
        let old = step(&mut archive, 0, false);
        step(&mut archive, 600, true);
        archive.purge_before(StepId(1));
        assert!(archive.resolve(HistoryRef::new(old, FrontId(0), 0)).is_none());
    }

    #[test]
    fn displayable_steps_survive_purge() {
        let mut archive = StepArchive::new();
        let old = step(&mut archive, 0, true);
        step(&mut archive, 600, true);
        archive.purge_before(StepId(1));
        assert!(archive.resolve(HistoryRef::new(old, FrontId(0), 0)).is_some());
    }

    #[test]
    fn len_counts_retained_steps() {
        let mut archive = StepArchive::new();
        step(&mut archive, 0, true);
        step(&mut archive, 600, true);
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn get_mut_allows_in_place_backfill() {
        let mut archive = StepArchive::new();
        let id = step(&mut archive, 0, true);
        archive.get_mut(id).unwrap().fires[0].fronts[0].get_mut(0).unwrap().succ_point =
            Some(HistoryRef::new(StepId(1), FrontId(0), 0));
        assert!(archive.get(id).unwrap().fires[0].fronts[0].get(0).unwrap().succ_point.is_some());
    }

    #[test]
    fn total_perimeter_length_sums_every_front() {
        let mut archive = StepArchive::new();
        let id = step(&mut archive, 0, true);
        let expected = archive.get(id).unwrap().fires[0].fronts[0].perimeter_length();
        assert!((archive.get(id).unwrap().total_perimeter_length() - expected).abs() < 1e-9);
    }

    #[test]
    fn fix_closest_point_walks_back_to_a_surviving_step() {
        let mut archive = StepArchive::new();
        let old = step(&mut archive, 0, true);
        let newer = step(&mut archive, 600, false);
        step(&mut archive, 1200, true);
        archive.purge_before(StepId(2));
        // `newer` was purged; fix_closest_point should fall back to `old`.
        let reference = HistoryRef::new(newer, FrontId(0), 0);
        let fixed = archive.fix_closest_point(reference).unwrap();
        assert_eq!(fixed.step, old);
        assert!(archive.resolve(fixed).is_some());
    }

    #[test]
    fn rewire_before_purge_repoints_prev_point_to_nearest_surviving_ancestor() {
        let mut archive = StepArchive::new();
        let gen0 = step(&mut archive, 0, true);
        let gen1 = step(&mut archive, 600, false);
        archive.get_mut(gen1).unwrap().fires[0].fronts[0].get_mut(0).unwrap().prev_point =
            Some(HistoryRef::new(gen0, FrontId(0), 0));
        let gen2 = step(&mut archive, 1200, true);
        archive.get_mut(gen2).unwrap().fires[0].fronts[0].get_mut(0).unwrap().prev_point =
            Some(HistoryRef::new(gen1, FrontId(0), 0));

        // gen1 is about to be purged (not displayable, older than gen2); its
        // own prev_point chains back to gen0, which survives.
        archive.rewire_before_purge(gen2);
        archive.purge_before(gen2);

        assert!(archive.get(gen1).is_none());
        let rewired = archive.get(gen2).unwrap().fires[0].fronts[0].get(0).unwrap().prev_point.unwrap();
        assert_eq!(rewired.step, gen0);
        assert!(archive.resolve(rewired).is_some());
    }

    #[test]
    fn rewire_before_purge_clears_prev_point_when_chain_has_no_surviving_ancestor() {
        let mut archive = StepArchive::new();
        let gen0 = step(&mut archive, 0, false);
        let gen1 = step(&mut archive, 600, true);
        archive.get_mut(gen1).unwrap().fires[0].fronts[0].get_mut(0).unwrap().prev_point =
            Some(HistoryRef::new(gen0, FrontId(0), 0));

        archive.rewire_before_purge(gen1);
        archive.purge_before(gen1);

        assert!(archive.get(gen1).unwrap().fires[0].fronts[0].get(0).unwrap().prev_point.is_none());
    }
}
