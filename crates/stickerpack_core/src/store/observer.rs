//! Diff observers.

use super::diff::Diff;
use super::query::SetQuery;
use super::state::CommittedState;
use crate::entity::EntityId;
use crate::types::SequenceNumber;
use std::collections::HashSet;
use std::fmt;

/// Handle returned by [`EntityStore::observe`](crate::EntityStore::observe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Returns the raw handle value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer:{}", self.0)
    }
}

/// The ordering an observer watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveTarget {
    /// All sets, ordered by the query.
    Sets(SetQuery),
    /// The member list of one set.
    Members(EntityId),
}

type Callback = Box<dyn FnMut(&Diff) + Send>;

struct Observer {
    id: ObserverId,
    target: ObserveTarget,
    callback: Callback,
}

/// Registered observers, notified in registration order.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    observers: Vec<Observer>,
}

impl ObserverRegistry {
    pub(crate) fn register(&mut self, target: ObserveTarget, callback: Callback) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.observers.push(Observer {
            id,
            target,
            callback,
        });
        id
    }

    pub(crate) fn unregister(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.id != id);
        self.observers.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    /// Captures every observed ordering before a commit is applied.
    pub(crate) fn capture(&self, state: &CommittedState) -> Vec<Vec<EntityId>> {
        self.observers
            .iter()
            .map(|o| state.ordering(&o.target))
            .collect()
    }

    /// Delivers one diff to each observer whose ordering changed. Returns
    /// the number of callbacks made.
    pub(crate) fn notify(
        &mut self,
        before: Vec<Vec<EntityId>>,
        state: &CommittedState,
        touched: &HashSet<EntityId>,
        sequence: SequenceNumber,
    ) -> usize {
        let mut delivered = 0;
        for (observer, old) in self.observers.iter_mut().zip(before) {
            let new = state.ordering(&observer.target);
            if let Some(diff) = Diff::compute(sequence, &old, &new, touched) {
                (observer.callback)(&diff);
                delivered += 1;
            }
        }
        delivered
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_unregister_once() {
        let mut registry = ObserverRegistry::default();
        let a = registry.register(ObserveTarget::Sets(SetQuery::default()), Box::new(|_| {}));
        let b = registry.register(ObserveTarget::Sets(SetQuery::default()), Box::new(|_| {}));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        assert!(registry.unregister(a));
        assert!(!registry.unregister(a));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unchanged_ordering_is_not_delivered() {
        let mut registry = ObserverRegistry::default();
        registry.register(
            ObserveTarget::Members(EntityId::new()),
            Box::new(|_| panic!("no diff expected")),
        );
        let state = CommittedState::default();
        let before = registry.capture(&state);
        let delivered = registry.notify(before, &state, &HashSet::new(), SequenceNumber::new(1));
        assert_eq!(delivered, 0);
    }
}
