#![forbid(unsafe_code)]

//! Cart state and its persistence.
//!
//! [`CartState`] is a plain set of item identifiers with pure add/remove
//! operations. [`CartStore`] owns the live state for a session and keeps it
//! synchronized with a [`StorageBackend`] under [`CART_KEY`].
//!
//! # Persistence discipline
//!
//! - `initialize` reads once and never writes.
//! - `add` and `remove` write the full set after every call, including
//!   calls that leave the set unchanged.
//! - `clear` deletes the key instead of writing an empty set.
//! - A failed write or delete is logged; the in-memory set is kept.
//!
//! # Wire format
//!
//! A JSON array of integers in ascending order, e.g. `[1,3,5]`. Duplicates
//! in stored data collapse on load. Anything that is not an array of
//! integers is treated as no cart at all.

use crate::catalog::ItemId;
use bookcart_runtime::state_persistence::{SlotStats, StateSlot, StorageBackend};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Storage key holding the persisted cart.
pub const CART_KEY: &str = "bookCart";

/// A persisted cart record that could not be decoded.
#[derive(Debug)]
pub struct CartDecodeError(serde_json::Error);

impl fmt::Display for CartDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "corrupt persisted cart: {}", self.0)
    }
}

impl std::error::Error for CartDecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// The set of selected item identifiers.
///
/// Order carries no meaning; iteration is ascending by id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartState {
    ids: BTreeSet<ItemId>,
}

impl CartState {
    /// The empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A state containing `id`. Unchanged if already present.
    #[must_use]
    pub fn with_added(&self, id: ItemId) -> Self {
        let mut ids = self.ids.clone();
        ids.insert(id);
        Self { ids }
    }

    /// A state without `id`. Unchanged if absent.
    #[must_use]
    pub fn with_removed(&self, id: ItemId) -> Self {
        let mut ids = self.ids.clone();
        ids.remove(&id);
        Self { ids }
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of selected identifiers, stale ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected identifiers, ascending.
    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.ids.iter().copied()
    }

    /// Decode the wire form.
    pub fn decode(raw: &str) -> Result<Self, CartDecodeError> {
        serde_json::from_str(raw).map_err(CartDecodeError)
    }

    /// Encode to the wire form, exactly as a [`CartStore`] writes it.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl FromIterator<ItemId> for CartState {
    fn from_iter<I: IntoIterator<Item = ItemId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Owner of the session's cart.
///
/// All cart mutation goes through this type; views and the checkout flow
/// only read [`state`](Self::state).
pub struct CartStore {
    state: CartState,
    slot: StateSlot<CartState>,
}

impl CartStore {
    /// Restore the cart from `backend`.
    ///
    /// Absent, unreadable, or malformed records all yield an empty cart.
    pub fn initialize(backend: Arc<dyn StorageBackend>) -> Self {
        let mut slot = StateSlot::new(backend, CART_KEY);
        let state: CartState = slot.load().unwrap_or_default();
        tracing::debug!(
            backend = %slot.backend_name(),
            items = state.len(),
            "restored cart"
        );
        Self { state, slot }
    }

    /// Current cart contents.
    #[must_use]
    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// Select `id` and persist.
    ///
    /// Identifiers are not checked against any catalog here.
    pub fn add(&mut self, id: ItemId) -> &CartState {
        self.state = self.state.with_added(id);
        self.slot.persist(&self.state);
        &self.state
    }

    /// Deselect `id` and persist, even when it was not selected.
    pub fn remove(&mut self, id: ItemId) -> &CartState {
        self.state = self.state.with_removed(id);
        self.slot.persist(&self.state);
        &self.state
    }

    /// Empty the cart and erase the persisted record.
    pub fn clear(&mut self) -> &CartState {
        self.state = CartState::new();
        self.slot.erase();
        &self.state
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.state.contains(id)
    }

    /// Persistence counters for this session.
    #[must_use]
    pub fn persist_stats(&self) -> SlotStats {
        self.slot.stats()
    }

    /// Name of the storage backend in use.
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.slot.backend_name()
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .field("slot", &self.slot)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookcart_runtime::state_persistence::MemoryStorage;
    use proptest::prelude::*;

    fn ids(raw: &[i64]) -> CartState {
        raw.iter().copied().map(ItemId).collect()
    }

    #[test]
    fn add_is_idempotent() {
        let once = CartState::new().with_added(ItemId(3));
        let twice = once.with_added(ItemId(3));
        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn remove_absent_is_noop() {
        let state = ids(&[1, 2]);
        assert_eq!(state.with_removed(ItemId(9)), state);
    }

    #[test]
    fn encode_matches_what_the_store_writes() {
        assert_eq!(ids(&[5, 1, 3]).encode().unwrap(), "[1,3,5]");
        assert_eq!(CartState::new().encode().unwrap(), "[]");

        let backend = Arc::new(MemoryStorage::new());
        let mut store = CartStore::initialize(backend.clone());
        for id in [5, 1, 3] {
            store.add(ItemId(id));
        }
        let stored = backend.get(CART_KEY).unwrap().unwrap();
        assert_eq!(stored, store.state().encode().unwrap());
        assert_eq!(CartState::decode(&stored).unwrap(), ids(&[1, 3, 5]));
    }

    #[test]
    fn initialize_restores_typed_state() {
        let backend = Arc::new(MemoryStorage::with_entries([(CART_KEY, "[4,2]")]));
        let store = CartStore::initialize(backend);
        assert_eq!(store.state(), &ids(&[2, 4]));
        assert_eq!(store.persist_stats().loads, 1);
    }

    #[test]
    fn decode_collapses_duplicates() {
        assert_eq!(CartState::decode("[3,1,3]").unwrap(), ids(&[1, 3]));
    }

    #[test]
    fn decode_rejects_malformed_records() {
        for raw in ["not json", "{malformed", "{}", "[1.5]", "[\"1\"]", "null"] {
            assert!(CartState::decode(raw).is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn initialize_absent_is_empty_and_does_not_write() {
        let backend = Arc::new(MemoryStorage::new());
        let store = CartStore::initialize(backend.clone());
        assert!(store.state().is_empty());
        let ops = backend.op_counts();
        assert_eq!(ops.reads, 1);
        assert_eq!(ops.writes, 0);
        assert_eq!(ops.deletes, 0);
    }

    #[test]
    fn initialize_corrupt_is_empty() {
        for raw in ["not json", "{malformed"] {
            let backend = Arc::new(MemoryStorage::with_entries([(CART_KEY, raw)]));
            let store = CartStore::initialize(backend);
            assert!(store.state().is_empty());
            assert_eq!(store.persist_stats().corrupt_loads, 1);
        }
    }

    #[test]
    fn initialize_unreadable_backend_is_empty() {
        let backend = Arc::new(MemoryStorage::with_entries([(CART_KEY, "[1]")]));
        backend.fail_reads(true);
        let store = CartStore::initialize(backend);
        assert!(store.state().is_empty());
    }

    #[test]
    fn every_mutation_writes_full_state() {
        let backend = Arc::new(MemoryStorage::new());
        let mut store = CartStore::initialize(backend.clone());

        store.add(ItemId(2));
        store.add(ItemId(1));
        assert_eq!(backend.get(CART_KEY).unwrap().as_deref(), Some("[1,2]"));

        let before = store.state().clone();
        store.remove(ItemId(7));
        assert_eq!(store.state(), &before);
        assert_eq!(backend.op_counts().writes, 3);
        assert_eq!(store.persist_stats().writes, 3);
    }

    #[test]
    fn clear_erases_record() {
        let backend = Arc::new(MemoryStorage::new());
        let mut store = CartStore::initialize(backend.clone());
        store.add(ItemId(4));
        assert!(store.clear().is_empty());
        assert!(!backend.contains_key(CART_KEY));
        assert_eq!(backend.op_counts().deletes, 1);

        let fresh = CartStore::initialize(backend);
        assert!(fresh.state().is_empty());
    }

    #[test]
    fn write_failure_keeps_memory_state() {
        let backend = Arc::new(MemoryStorage::new());
        let mut store = CartStore::initialize(backend.clone());
        backend.fail_writes(true);

        store.add(ItemId(1));
        store.add(ItemId(2));
        assert_eq!(store.state(), &ids(&[1, 2]));
        assert_eq!(store.persist_stats().failures, 2);
        assert!(!backend.contains_key(CART_KEY));

        store.clear();
        assert!(store.state().is_empty());
        assert_eq!(store.persist_stats().failures, 3);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(i64),
        Remove(i64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0i64..12).prop_map(Op::Add),
            (0i64..12).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn store_has_set_semantics_and_round_trips(ops in prop::collection::vec(op(), 0..40)) {
            let backend = Arc::new(MemoryStorage::new());
            let mut store = CartStore::initialize(backend.clone());
            let mut model = std::collections::HashSet::new();

            for op in &ops {
                match *op {
                    Op::Add(id) => {
                        store.add(ItemId(id));
                        model.insert(id);
                    }
                    Op::Remove(id) => {
                        store.remove(ItemId(id));
                        model.remove(&id);
                    }
                }
            }

            let got: Vec<i64> = store.state().iter().map(|id| id.0).collect();
            let mut want: Vec<i64> = model.into_iter().collect();
            want.sort_unstable();
            prop_assert_eq!(&got, &want);
            prop_assert_eq!(backend.op_counts().writes, ops.len());

            let restored = CartStore::initialize(backend);
            prop_assert_eq!(restored.state(), store.state());
        }
    }
}
