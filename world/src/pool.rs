//! Fixed-capacity agent pools with inactive-slot reuse.
//!
//! A pool never allocates past its construction capacity: acquiring from an
//! exhausted pool yields no slot. Slots are scanned linearly so activation
//! order is deterministic. Identifiers are assigned by the world and never
//! reused, which makes a released agent's id resolve to nothing rather than
//! to the record that reinitialized its slot.

use pantheon_siege_core::AgentId;

/// Record kinds stored in a pool expose the id assigned at activation.
pub(crate) trait Pooled {
    /// Identifier the record carries for its current activation.
    fn id(&self) -> AgentId;
}

#[derive(Debug)]
pub(crate) struct Pool<T> {
    slots: Vec<Option<T>>,
}

impl<T> Pool<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots }
    }

    /// First inactive slot, if the pool is not exhausted.
    pub(crate) fn vacant_slot(&mut self) -> Option<&mut Option<T>> {
        self.slots.iter_mut().find(|slot| slot.is_none())
    }

    /// Active records in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().flatten()
    }

    /// Active records in slot order, mutably.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().flatten()
    }
}

impl<T: Pooled> Pool<T> {
    /// Active record carrying the provided id, if any.
    pub(crate) fn get_mut(&mut self, id: AgentId) -> Option<&mut T> {
        self.iter_mut().find(|record| record.id() == id)
    }

    /// Releases the record carrying the provided id, returning it.
    pub(crate) fn release(&mut self, id: AgentId) -> Option<T> {
        self.slots
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|record| record.id() == id))
            .and_then(Option::take)
    }
}

#[cfg(test)]
mod tests {
    use super::{Pool, Pooled};
    use pantheon_siege_core::AgentId;

    #[derive(Debug, PartialEq)]
    struct Marker {
        id: AgentId,
    }

    impl Pooled for Marker {
        fn id(&self) -> AgentId {
            self.id
        }
    }

    fn occupy(pool: &mut Pool<Marker>, id: u32) -> bool {
        match pool.vacant_slot() {
            Some(slot) => {
                *slot = Some(Marker {
                    id: AgentId::new(id),
                });
                true
            }
            None => false,
        }
    }

    #[test]
    fn exhausted_pool_yields_no_slot() {
        let mut pool = Pool::with_capacity(2);
        assert!(occupy(&mut pool, 1));
        assert!(occupy(&mut pool, 2));
        assert!(!occupy(&mut pool, 3));
        assert_eq!(pool.iter().count(), 2);
    }

    #[test]
    fn released_slots_are_reacquired_with_fresh_ids() {
        let mut pool = Pool::with_capacity(1);
        assert!(occupy(&mut pool, 1));
        assert!(pool.release(AgentId::new(1)).is_some());
        assert!(occupy(&mut pool, 2));

        assert!(pool.get_mut(AgentId::new(1)).is_none());
        assert!(pool.get_mut(AgentId::new(2)).is_some());
    }

    #[test]
    fn release_of_unknown_id_is_a_no_op() {
        let mut pool = Pool::with_capacity(1);
        assert!(occupy(&mut pool, 1));
        assert!(pool.release(AgentId::new(9)).is_none());
        assert_eq!(pool.iter().count(), 1);
    }
}
