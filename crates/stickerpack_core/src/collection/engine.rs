//! Member list mutations.

use super::layout::SlotLayout;
use crate::config::{EmptySetPolicy, StoreConfig};
use crate::entity::{EntityId, NewSticker};
use crate::error::{CoreError, CoreResult};
use crate::store::EntityStore;
use tracing::debug;

/// Where [`CollectionEngine::insert`] places a new sticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertPosition {
    /// After the last member.
    #[default]
    End,
    /// At a display index; later members shift back by one.
    At(usize),
}

/// Result of an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Set the sticker was placed in (possibly created by the insert).
    pub set: EntityId,
    /// The new sticker.
    pub sticker: EntityId,
    /// Member position of the new sticker.
    pub index: usize,
}

/// Result of a removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    /// The removed sticker.
    pub sticker: EntityId,
    /// Whether the set was emptied and scheduled for deletion.
    pub set_deleted: bool,
}

/// Inserts, removes and reorders set members.
///
/// The engine is stateless apart from its policy and layout; every call
/// takes the store it edits. A call that fails leaves no staged change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectionEngine {
    policy: EmptySetPolicy,
    layout: SlotLayout,
}

impl CollectionEngine {
    /// Creates an engine with the default policy and plain indices.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine using the store's empty-set policy.
    #[must_use]
    pub fn for_config(config: &StoreConfig) -> Self {
        Self::new().with_policy(config.empty_set_policy)
    }

    /// Sets the empty-set policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: EmptySetPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the index layout.
    #[must_use]
    pub const fn with_layout(mut self, layout: SlotLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Returns the empty-set policy.
    #[must_use]
    pub fn policy(&self) -> EmptySetPolicy {
        self.policy
    }

    /// Returns the index layout.
    #[must_use]
    pub fn layout(&self) -> SlotLayout {
        self.layout
    }

    /// Adds a sticker to `set`, or to a new set when `set` is `None`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::EntityNotFound`] if `set` names no set in the working view
    /// - [`CoreError::IndexOutOfRange`] for a position past the end
    /// - [`CoreError::ReservedSlot`] for the add slot of
    ///   [`SlotLayout::LeadingAddSlot`]
    pub fn insert(
        &self,
        store: &mut EntityStore,
        sticker: NewSticker,
        set: Option<EntityId>,
        position: InsertPosition,
    ) -> CoreResult<Placement> {
        let len = match set {
            Some(id) => store.set(id).ok_or(CoreError::EntityNotFound(id))?.len(),
            None => 0,
        };
        let index = match position {
            InsertPosition::End => len,
            InsertPosition::At(display) => {
                let index = self.layout.member_index(display)?;
                if index > len {
                    return Err(CoreError::IndexOutOfRange {
                        index: display,
                        len,
                    });
                }
                index
            }
        };

        let set = match set {
            Some(id) => id,
            None => store.create_set(),
        };
        let sticker = store.create_sticker(set, sticker)?;

        let mut record = store.set(set).ok_or(CoreError::EntityNotFound(set))?.clone();
        record.members_mut().insert(index, sticker);
        record.touch(store.stamp());
        store.put_set(record)?;

        debug!(set = %set.short(), sticker = %sticker.short(), index, "sticker inserted");
        debug_check(store, set);
        Ok(Placement {
            set,
            sticker,
            index,
        })
    }

    /// Removes `sticker` from `set` and schedules its deletion.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotAMember`] if the sticker is not in the set.
    pub fn remove(
        &self,
        store: &mut EntityStore,
        set: EntityId,
        sticker: EntityId,
    ) -> CoreResult<Removal> {
        let index = store
            .set(set)
            .ok_or(CoreError::EntityNotFound(set))?
            .position(sticker)
            .ok_or(CoreError::NotAMember { set, sticker })?;
        self.remove_member(store, set, index)
    }

    /// Removes the member shown at display index `index`.
    pub fn remove_at(
        &self,
        store: &mut EntityStore,
        set: EntityId,
        index: usize,
    ) -> CoreResult<Removal> {
        let len = store.set(set).ok_or(CoreError::EntityNotFound(set))?.len();
        let member = self.layout.member_index(index)?;
        if member >= len {
            return Err(CoreError::IndexOutOfRange { index, len });
        }
        self.remove_member(store, set, member)
    }

    fn remove_member(
        &self,
        store: &mut EntityStore,
        set: EntityId,
        index: usize,
    ) -> CoreResult<Removal> {
        let mut record = store.set(set).ok_or(CoreError::EntityNotFound(set))?.clone();
        let sticker = record.members_mut().remove(index);
        record.touch(store.stamp());
        let emptied = record.is_empty();

        store.put_set(record)?;
        store.delete_sticker(sticker)?;

        let set_deleted = emptied && self.policy == EmptySetPolicy::DeleteSet;
        if set_deleted {
            store.delete_set(set)?;
        } else {
            debug_check(store, set);
        }

        debug!(set = %set.short(), sticker = %sticker.short(), index, set_deleted, "sticker removed");
        Ok(Removal {
            sticker,
            set_deleted,
        })
    }

    /// Moves the member at display index `from` to display index `to`.
    ///
    /// Members in between shift by one. Moving a member onto itself stages
    /// nothing.
    pub fn move_member(
        &self,
        store: &mut EntityStore,
        set: EntityId,
        from: usize,
        to: usize,
    ) -> CoreResult<()> {
        let record = store.set(set).ok_or(CoreError::EntityNotFound(set))?;
        let len = record.len();

        let source = self.layout.member_index(from)?;
        let target = self.layout.member_index(to)?;
        if source >= len {
            return Err(CoreError::IndexOutOfRange { index: from, len });
        }
        if target >= len {
            return Err(CoreError::IndexOutOfRange { index: to, len });
        }
        if source == target {
            return Ok(());
        }

        let mut record = record.clone();
        let members = record.members_mut();
        let sticker = members.remove(source);
        members.insert(target, sticker);
        record.touch(store.stamp());
        store.put_set(record)?;

        debug!(set = %set.short(), from = source, to = target, "member moved");
        debug_check(store, set);
        Ok(())
    }

    /// Replaces the emojis of a sticker and bumps its set's edit date.
    pub fn set_emojis(
        &self,
        store: &mut EntityStore,
        sticker: EntityId,
        emojis: Vec<String>,
    ) -> CoreResult<()> {
        let mut record = store
            .sticker(sticker)
            .ok_or(CoreError::EntityNotFound(sticker))?
            .clone();
        let set = record.set();
        record.set_emojis(emojis);
        store.put_sticker(record)?;

        if let Some(mut owner) = store.set(set).cloned() {
            owner.touch(store.stamp());
            store.put_set(owner)?;
        }
        Ok(())
    }

    /// Deletes a set together with its stickers.
    pub fn discard_set(&self, store: &mut EntityStore, set: EntityId) -> CoreResult<()> {
        store.delete_set(set)
    }
}

/// Checks that a member list has no duplicates and only names live stickers
/// owned by the set.
fn debug_check(store: &EntityStore, set: EntityId) {
    if cfg!(debug_assertions) {
        if let Some(record) = store.set(set) {
            let mut seen = std::collections::HashSet::new();
            for id in record.stickers() {
                debug_assert!(seen.insert(*id), "duplicate member {id}");
                debug_assert!(
                    store.sticker(*id).is_some_and(|s| s.set() == set),
                    "member {id} is not a sticker of set {set}"
                );
            }
        }
    }
}
