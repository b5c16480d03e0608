//! Entity store facade and recovery.

use super::diff::Diff;
use super::feed::{CommitEvent, CommitFeed};
use super::observer::{ObserveTarget, ObserverId, ObserverRegistry};
use super::pending::{PendingEdits, PendingWrite};
use super::query::SetQuery;
use super::state::CommittedState;
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::dir::StoreDir;
use crate::entity::{EntityId, NewSticker, Sticker, StickerSet, StickerSetSnapshot};
use crate::error::{CoreError, CoreResult};
use crate::journal::{self, Edit, FrameBody};
use crate::types::{SequenceNumber, Timestamp};
use crossbeam_channel::Receiver;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use stickerpack_storage::{FileBackend, InMemoryBackend, StorageBackend};
use tracing::{debug, info, warn};

/// The sticker set store.
///
/// `EntityStore` owns the committed records, the edits staged since the
/// last commit, and the journal they are persisted to. Reads see the staged
/// edits on top of the committed records. Mutation requires `&mut self`, so
/// there is exactly one writer at a time.
///
/// # Opening a store
///
/// ```rust
/// use stickerpack_core::{EntityStore, NewSticker};
///
/// let mut store = EntityStore::open_in_memory().unwrap();
/// let set = store.create_set();
/// let sticker = store
///     .create_sticker(set, NewSticker::new(vec![1, 2, 3], vec!["🐱".into()]))
///     .unwrap();
/// assert!(store.has_changes());
///
/// store.commit().unwrap();
/// assert!(!store.has_changes());
/// assert_eq!(store.sticker(sticker).unwrap().set(), set);
/// ```
///
/// For persistent stores use [`EntityStore::open_dir`], which takes an
/// exclusive lock on the directory for as long as the store is open.
pub struct EntityStore {
    config: StoreConfig,
    /// Store directory (holds the lock). None for stores opened on a bare backend.
    _dir: Option<StoreDir>,
    backend: Box<dyn StorageBackend>,
    clock: Box<dyn Clock>,
    committed: CommittedState,
    pending: PendingEdits,
    sequence: SequenceNumber,
    last_stamp: Timestamp,
    observers: ObserverRegistry,
    feed: CommitFeed,
}

impl EntityStore {
    /// Opens a store on `backend`, replaying its journal.
    ///
    /// A torn final frame (left by a crash mid-append) is cut off. Damage
    /// before the final frame fails with [`CoreError::Corrupted`].
    pub fn open(config: StoreConfig, mut backend: Box<dyn StorageBackend>) -> CoreResult<Self> {
        let (committed, sequence) = Self::recover(backend.as_mut())?;

        let last_stamp = committed
            .sets()
            .map(|s| s.edit_date().max(s.created()))
            .max()
            .unwrap_or_default();

        debug!(
            sets = committed.sets().count(),
            stickers = committed.stickers().count(),
            %sequence,
            "store opened"
        );

        Ok(Self {
            config,
            _dir: None,
            backend,
            clock: Box::new(SystemClock),
            committed,
            pending: PendingEdits::default(),
            sequence,
            last_stamp,
            observers: ObserverRegistry::default(),
            feed: CommitFeed::new(),
        })
    }

    /// Opens an empty store held in memory.
    pub fn open_in_memory() -> CoreResult<Self> {
        Self::open(StoreConfig::default(), Box::new(InMemoryBackend::new()))
    }

    /// Opens the store kept in directory `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StoreLocked`] if another process has the
    /// directory open.
    pub fn open_dir(path: &Path, config: StoreConfig) -> CoreResult<Self> {
        let dir = StoreDir::open(path, config.create_if_missing)?;
        let backend = FileBackend::open_with_create_dirs(&dir.journal_path())?;

        let mut store = Self::open(config, Box::new(backend))?;
        store._dir = Some(dir);
        info!(path = %path.display(), "store directory opened");
        Ok(store)
    }

    /// Replaces the time source used for edit dates.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    fn recover(backend: &mut dyn StorageBackend) -> CoreResult<(CommittedState, SequenceNumber)> {
        let bytes = backend.read_all()?;
        let replay = journal::read_frames(&bytes)?;

        if replay.torn {
            warn!(
                valid_len = replay.valid_len,
                discarded = bytes.len() as u64 - replay.valid_len,
                "discarding torn journal tail"
            );
            backend.truncate(replay.valid_len)?;
        }

        let mut state = CommittedState::default();
        let mut sequence = SequenceNumber::new(0);
        for frame in replay.frames {
            match frame {
                FrameBody::Commit {
                    sequence: seq,
                    edits,
                } => {
                    for edit in &edits {
                        state.apply(edit);
                    }
                    sequence = sequence.max(seq);
                }
                FrameBody::Snapshot {
                    sequence: seq,
                    sets,
                    stickers,
                } => {
                    state = CommittedState::from_records(sets, stickers);
                    sequence = seq;
                }
            }
        }

        Ok((state, sequence))
    }

    /// Returns the configuration the store was opened with.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the sequence number of the last successful commit.
    #[must_use]
    pub fn sequence(&self) -> SequenceNumber {
        self.sequence
    }

    /// Returns the current journal size in bytes.
    pub fn journal_size(&self) -> CoreResult<u64> {
        Ok(self.backend.size()?)
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Returns the next edit date.
    ///
    /// Dates strictly increase within a store even if the clock stalls or
    /// steps back, so "most recently edited" is always well defined.
    pub(crate) fn stamp(&mut self) -> Timestamp {
        let now = self.clock.now();
        let next = if now > self.last_stamp {
            now
        } else {
            Timestamp::from_millis(self.last_stamp.as_millis() + 1)
        };
        self.last_stamp = next;
        next
    }

    /// Stages a new empty set and returns its id.
    pub fn create_set(&mut self) -> EntityId {
        let id = EntityId::new();
        let now = self.stamp();
        self.pending.put_set(StickerSet::new(id, now));
        debug!(set = %id.short(), "set created");
        id
    }

    /// Stages a new sticker owned by `set`.
    ///
    /// The sticker is not added to the set's member list; placing it is the
    /// job of [`CollectionEngine`](crate::CollectionEngine).
    pub fn create_sticker(&mut self, set: EntityId, sticker: NewSticker) -> CoreResult<EntityId> {
        if self.set(set).is_none() {
            return Err(CoreError::EntityNotFound(set));
        }
        let id = EntityId::new();
        self.pending.put_sticker(Sticker::new(id, set, sticker));
        debug!(sticker = %id.short(), set = %set.short(), "sticker created");
        Ok(id)
    }

    /// Stages an updated set record.
    pub fn put_set(&mut self, set: StickerSet) -> CoreResult<()> {
        if self.set(set.id()).is_none() {
            return Err(CoreError::EntityNotFound(set.id()));
        }
        self.pending.put_set(set);
        Ok(())
    }

    /// Stages an updated sticker record.
    pub fn put_sticker(&mut self, sticker: Sticker) -> CoreResult<()> {
        if self.sticker(sticker.id()).is_none() {
            return Err(CoreError::EntityNotFound(sticker.id()));
        }
        if self.set(sticker.set()).is_none() {
            return Err(CoreError::EntityNotFound(sticker.set()));
        }
        self.pending.put_sticker(sticker);
        Ok(())
    }

    /// Stages removal of a set and every sticker it owns.
    pub fn delete_set(&mut self, id: EntityId) -> CoreResult<()> {
        let set = self.set(id).ok_or(CoreError::EntityNotFound(id))?;
        let members = set.stickers().to_vec();

        for sticker in &members {
            self.stage_sticker_delete(*sticker);
        }
        if self.committed.set(id).is_some() {
            self.pending.delete_set(id);
        } else {
            self.pending.unstage_set(id);
        }
        debug!(set = %id.short(), members = members.len(), "set deleted");
        Ok(())
    }

    /// Stages removal of a sticker and detaches it from its set.
    pub fn delete_sticker(&mut self, id: EntityId) -> CoreResult<()> {
        let owner = self.sticker(id).ok_or(CoreError::EntityNotFound(id))?.set();

        let detached = self.set(owner).and_then(|set| {
            set.position(id).map(|index| {
                let mut set = set.clone();
                set.members_mut().remove(index);
                set
            })
        });
        if let Some(mut set) = detached {
            let now = self.stamp();
            set.touch(now);
            self.pending.put_set(set);
        }

        self.stage_sticker_delete(id);
        debug!(sticker = %id.short(), set = %owner.short(), "sticker deleted");
        Ok(())
    }

    /// A sticker created since the last commit is simply forgotten, so the
    /// journal and the commit feed never see a delete without an insert.
    fn stage_sticker_delete(&mut self, id: EntityId) {
        if self.committed.sticker(id).is_some() {
            self.pending.delete_sticker(id);
        } else {
            self.pending.unstage_sticker(id);
        }
    }

    // ------------------------------------------------------------------
    // Reads (staged edits over committed records)
    // ------------------------------------------------------------------

    /// Returns a set from the working view.
    #[must_use]
    pub fn set(&self, id: EntityId) -> Option<&StickerSet> {
        match self.pending.set(id) {
            Some(PendingWrite::Put(set)) => Some(set),
            Some(PendingWrite::Delete) => None,
            None => self.committed.set(id),
        }
    }

    /// Returns a sticker from the working view.
    #[must_use]
    pub fn sticker(&self, id: EntityId) -> Option<&Sticker> {
        match self.pending.sticker(id) {
            Some(PendingWrite::Put(sticker)) => Some(sticker),
            Some(PendingWrite::Delete) => None,
            None => self.committed.sticker(id),
        }
    }

    /// Returns the member records of a set in order.
    pub fn members(&self, set: EntityId) -> CoreResult<Vec<&Sticker>> {
        let record = self.set(set).ok_or(CoreError::EntityNotFound(set))?;
        record
            .stickers()
            .iter()
            .map(|id| self.sticker(*id).ok_or(CoreError::EntityNotFound(*id)))
            .collect()
    }

    /// Returns an owned copy of a set and its members.
    pub fn snapshot(&self, set: EntityId) -> CoreResult<StickerSetSnapshot> {
        let record = self.set(set).ok_or(CoreError::EntityNotFound(set))?.clone();
        let stickers = self.members(set)?.into_iter().cloned().collect();
        Ok(StickerSetSnapshot {
            set: record,
            stickers,
        })
    }

    /// Lists the sets of the working view.
    #[must_use]
    pub fn query(&self, query: SetQuery) -> Vec<&StickerSet> {
        let committed = self
            .committed
            .sets()
            .filter(|s| self.pending.set(s.id()).is_none());
        let staged = self.pending.sets().filter_map(|(_, write)| match write {
            PendingWrite::Put(set) => Some(set),
            PendingWrite::Delete => None,
        });

        let mut sets: Vec<&StickerSet> = committed.chain(staged).collect();
        query.sort(&mut sets);
        sets
    }

    // ------------------------------------------------------------------
    // Commit lifecycle
    // ------------------------------------------------------------------

    /// Returns true if there are staged edits.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drops every staged edit. Returns how many records they touched.
    pub fn discard(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending = PendingEdits::default();
        if dropped > 0 {
            debug!(records = dropped, "pending edits discarded");
        }
        dropped
    }

    /// Makes the staged edits durable.
    ///
    /// Returns `Ok(None)` without touching the journal when nothing is
    /// staged.
    ///
    /// # Errors
    ///
    /// If the journal cannot be written or synced the partial frame is cut
    /// off again, every staged edit is kept and
    /// [`CoreError::Persistence`] is returned. Observers are not notified.
    pub fn commit(&mut self) -> CoreResult<Option<SequenceNumber>> {
        if self.pending.is_empty() {
            return Ok(None);
        }

        let sequence = self.sequence.next();
        let edits = self.pending.to_edits();
        let frame = journal::encode_frame(&FrameBody::Commit {
            sequence,
            edits: edits.clone(),
        })?;

        let rollback_to = self.backend.size()?;
        if let Err(err) = self.write_frame(&frame) {
            warn!(%sequence, error = %err, "commit failed; pending edits kept");
            if let Err(truncate_err) = self.backend.truncate(rollback_to) {
                warn!(error = %truncate_err, "could not cut off partial frame");
            }
            return Err(err);
        }

        let before = self.observers.capture(&self.committed);

        let mut touched = HashSet::new();
        let mut changes = Vec::with_capacity(edits.len());
        for edit in &edits {
            match edit {
                Edit::PutSet(set) => {
                    touched.insert(set.id());
                }
                Edit::PutSticker(sticker) => {
                    touched.insert(sticker.id());
                    touched.insert(sticker.set());
                }
                Edit::DeleteSticker(_) | Edit::DeleteSet(_) => {}
            }
            changes.extend(self.committed.apply(edit));
        }

        self.pending = PendingEdits::default();
        self.sequence = sequence;

        let notified = self
            .observers
            .notify(before, &self.committed, &touched, sequence);
        self.feed.emit(CommitEvent { sequence, changes });

        debug!(%sequence, records = edits.len(), notified, "commit applied");

        self.maybe_compact();
        Ok(Some(sequence))
    }

    fn write_frame(&mut self, frame: &[u8]) -> CoreResult<()> {
        self.backend.append(frame)?;
        if self.config.sync_on_commit {
            self.backend.sync()?;
        }
        Ok(())
    }

    fn maybe_compact(&mut self) {
        let threshold = self.config.compact_threshold;
        if threshold == 0 {
            return;
        }
        match self.backend.size() {
            Ok(size) if size > threshold => {
                if let Err(err) = self.compact() {
                    warn!(error = %err, "automatic compaction failed");
                }
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "could not read journal size"),
        }
    }

    /// Rewrites the journal as a single snapshot of the committed records.
    ///
    /// Staged edits are not affected.
    pub fn compact(&mut self) -> CoreResult<()> {
        let before = self.backend.size()?;
        let (sets, stickers) = self.committed.sorted_records();
        let frame = journal::encode_frame(&FrameBody::Snapshot {
            sequence: self.sequence,
            sets,
            stickers,
        })?;

        self.backend.replace(&frame)?;
        self.backend.sync()?;

        info!(
            before,
            after = frame.len(),
            sequence = %self.sequence,
            "journal compacted"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Notification
    // ------------------------------------------------------------------

    /// Registers `callback` to receive one [`Diff`] per commit that changes
    /// the ordering named by `target`.
    pub fn observe<F>(&mut self, target: ObserveTarget, callback: F) -> ObserverId
    where
        F: FnMut(&Diff) + Send + 'static,
    {
        self.observers.register(target, Box::new(callback))
    }

    /// Removes an observer. Returns false if it was not registered.
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        self.observers.unregister(id)
    }

    /// Returns a channel receiving a [`CommitEvent`] for every future commit.
    pub fn subscribe(&self) -> Receiver<CommitEvent> {
        self.feed.subscribe()
    }

    /// Returns recent commit events after `cursor`, up to `limit`.
    #[must_use]
    pub fn poll_events(&self, cursor: SequenceNumber, limit: usize) -> Vec<CommitEvent> {
        self.feed.poll(cursor, limit)
    }
}

impl fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("sequence", &self.sequence)
            .field("pending", &self.pending.len())
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}
