//! [`ActiveFire`]: identity of one fire across time steps.
//!
//! A [`crate::scenario::scenario_fire::ScenarioFire`] at a given step belongs
//! to exactly one `ActiveFireId`. Merging two fires (§4.8.4) reassigns one of
//! the two ids to the combined front; the other id is retired but its value
//! is never reused, so history references that still name it resolve to "no
//! longer current" rather than silently aliasing an unrelated fire.

use serde::{Deserialize, Serialize};

/// Identity of a fire, stable across time steps. Two fires merging keeps one
/// of the two input ids (the lower-numbered one, per [`ActiveFireRegistry::merge`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActiveFireId(pub u32);

/// One fire's identity bookkeeping: which ignition it came from, and (after
/// a merge) which id it was folded into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveFire {
    pub id: ActiveFireId,
    /// Index into the scenario's ignition list this fire originated from.
    pub ignition_index: usize,
    /// `Some(surviving_id)` once this fire has been merged away.
    pub merged_into: Option<ActiveFireId>,
}

impl ActiveFire {
    #[must_use]
    pub fn new(id: ActiveFireId, ignition_index: usize) -> Self {
        ActiveFire {
            id,
            ignition_index,
            merged_into: None,
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.merged_into.is_none()
    }
}

/// Tracks every [`ActiveFire`] a scenario has ever created, including fires
/// retired by merging, so merge history stays queryable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveFireRegistry {
    fires: Vec<ActiveFire>,
    next_id: u32,
}

impl ActiveFireRegistry {
    #[must_use]
    pub fn new() -> Self {
        ActiveFireRegistry::default()
    }

    pub fn spawn(&mut self, ignition_index: usize) -> ActiveFireId {
        let id = ActiveFireId(self.next_id);
        self.next_id += 1;
        self.fires.push(ActiveFire::new(id, ignition_index));
        id
    }

    #[must_use]
    pub fn get(&self, id: ActiveFireId) -> Option<&ActiveFire> {
        self.fires.iter().find(|f| f.id == id)
    }

    /// Resolve `id` through any chain of merges to the currently-live id.
    #[must_use]
    pub fn resolve(&self, mut id: ActiveFireId) -> ActiveFireId {
        let mut guard = 0;
        while let Some(fire) = self.get(id) {
            match fire.merged_into {
                Some(next) if guard < self.fires.len() => {
                    id = next;
                    guard += 1;
                }
                _ => break,
            }
        }
        id
    }

    /// Merge `a` and `b`, which must both currently be live. The lower
    /// numeric id survives; the other is marked merged into it. Idempotent:
    /// merging the same pair (in either order, or transitively through a
    /// prior merge) again resolves to the same surviving id and is a no-op.
    pub fn merge(&mut self, a: ActiveFireId, b: ActiveFireId) -> ActiveFireId {
        let ra = self.resolve(a);
        let rb = self.resolve(b);
        if ra == rb {
            return ra;
        }
        let (surviving, retired) = if ra.0 <= rb.0 { (ra, rb) } else { (rb, ra) };
        if let Some(fire) = self.fires.iter_mut().find(|f| f.id == retired) {
            fire.merged_into = Some(surviving);
        }
        surviving
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_assigns_increasing_ids() {
        let mut reg = ActiveFireRegistry::new();
        let a = reg.spawn(0);
        let b = reg.spawn(1);
        assert_ne!(a, b);
    }

    #[test]
    fn merge_keeps_lower_id_and_retires_the_other() {
        let mut reg = ActiveFireRegistry::new();
        let a = reg.spawn(0);
        let b = reg.spawn(1);
        let surviving = reg.merge(a, b);
        assert_eq!(surviving, a);
        assert!(!reg.get(b).unwrap().is_live());
        assert_eq!(reg.resolve(b), a);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut reg = ActiveFireRegistry::new();
        let a = reg.spawn(0);
        let b = reg.spawn(1);
        let first = reg.merge(a, b);
        let second = reg.merge(a, first);
        assert_eq!(first, second);
        let third = reg.merge(b, a);
        assert_eq!(third, first);
    }
}
