//! In-memory, insertion-ordered collection of one entity type.

mod reorder;

pub use reorder::reorder;

use std::fmt;

use chrono::Utc;

use crate::entity::Entity;
use crate::error::{OpsdeskError, Result};

/// A partial update merged into an existing entity.
pub trait Patch<E> {
    fn apply(self, entity: &mut E);
}

/// Patch that only replaces the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange<S>(pub S);

impl<E: Entity> Patch<E> for StatusChange<E::Status> {
    fn apply(self, entity: &mut E) {
        entity.set_status(self.0);
    }
}

/// Mutation notice delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Inserted { id: String },
    Updated { id: String },
    Removed { id: String },
}

impl StoreEvent {
    pub fn id(&self) -> &str {
        match self {
            StoreEvent::Inserted { id } | StoreEvent::Updated { id } | StoreEvent::Removed { id } => id,
        }
    }
}

pub type SubscriptionId = u64;

type Subscriber = Box<dyn FnMut(&StoreEvent)>;

/// Authoritative holder of one module's records.
pub struct CollectionStore<E: Entity> {
    entities: Vec<E>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: SubscriptionId,
}

impl<E: Entity> Default for CollectionStore<E> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }
}

impl<E: Entity> fmt::Debug for CollectionStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionStore")
            .field("kind", &E::KIND)
            .field("entities", &self.entities)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<E: Entity> CollectionStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing records, keeping their order.
    pub fn from_entities(entities: Vec<E>) -> Result<Self> {
        let mut store = Self::new();
        for entity in entities {
            store.insert(entity)?;
        }
        Ok(store)
    }

    /// Records in insertion order.
    pub fn list(&self) -> &[E] {
        &self.entities
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn insert(&mut self, entity: E) -> Result<()> {
        if self.contains(entity.id()) {
            return Err(OpsdeskError::DuplicateId(entity.id().to_string()));
        }

        let id = entity.id().to_string();
        self.entities.push(entity);
        tracing::debug!(kind = %E::KIND, %id, "inserted");
        self.emit(StoreEvent::Inserted { id });
        Ok(())
    }

    /// Merge `patch` into the record with `id` and return the result.
    pub fn update_by_id<P: Patch<E>>(&mut self, id: &str, patch: P) -> Result<E> {
        let entity = self
            .entities
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| OpsdeskError::NotFound(id.to_string()))?;

        let original_id = entity.base().id.clone();
        let created_at = entity.base().created_at;
        patch.apply(entity);

        // id and created_at are fixed at creation
        let base = entity.base_mut();
        base.id = original_id;
        base.created_at = created_at;
        base.updated_at = Utc::now();

        let updated = entity.clone();
        tracing::debug!(kind = %E::KIND, %id, "updated");
        self.emit(StoreEvent::Updated { id: id.to_string() });
        Ok(updated)
    }

    /// Remove the record with `id`. Absent ids are a no-op.
    pub fn remove_by_id(&mut self, id: &str) -> Option<E> {
        let pos = self.entities.iter().position(|e| e.id() == id)?;
        let removed = self.entities.remove(pos);
        tracing::debug!(kind = %E::KIND, %id, "removed");
        self.emit(StoreEvent::Removed { id: id.to_string() });
        Some(removed)
    }

    /// Sequence number for the next record created in this collection.
    pub fn next_sequence_number(&self) -> u32 {
        self.entities
            .iter()
            .map(|e| e.base().sequence_number)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Find a record by sequence number ("3", "003") or id prefix.
    pub fn resolve(&self, reference: &str) -> Result<&E> {
        let reference = reference.trim();
        let by_sequence = reference.parse::<u32>().ok().and_then(|seq| {
            self.entities
                .iter()
                .find(|e| e.base().sequence_number == seq)
        });
        let found = if by_sequence.is_some() {
            by_sequence
        } else if reference.is_empty() {
            None
        } else {
            let mut matches = self.entities.iter().filter(|e| e.id().starts_with(reference));
            match (matches.next(), matches.next()) {
                (Some(e), None) => Some(e),
                (Some(_), Some(_)) => {
                    return Err(OpsdeskError::AmbiguousReference(reference.to_string()))
                }
                _ => None,
            }
        };
        found.ok_or_else(|| OpsdeskError::NotFound(reference.to_string()))
    }

    /// Register a callback run after every mutation.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    pub fn into_entities(self) -> Vec<E> {
        self.entities
    }

    fn emit(&mut self, event: StoreEvent) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&event);
        }
    }
}
