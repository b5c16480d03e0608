//! Store configuration.

/// What happens to a set when its last sticker is removed.
///
/// A sticker pack cannot be exported empty, so the default deletes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptySetPolicy {
    /// Schedule the set for deletion together with its last sticker.
    #[default]
    DeleteSet,
    /// Keep the set as an empty record.
    KeepEmpty,
}

/// Configuration for opening an entity store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Whether to sync the journal on every commit (safer but slower).
    pub sync_on_commit: bool,

    /// Journal size in bytes after which a commit rewrites the journal as a
    /// single snapshot (0 = never).
    pub compact_threshold: u64,

    /// Policy applied when the last member of a set is removed.
    pub empty_set_policy: EmptySetPolicy,

    /// Side length in pixels that loaded images are fitted into.
    pub canonical_size: u32,

    /// Whether to create the store directory if it doesn't exist.
    pub create_if_missing: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sync_on_commit: true,
            compact_threshold: 4 * 1024 * 1024, // 4 MB
            empty_set_policy: EmptySetPolicy::DeleteSet,
            canonical_size: 512,
            create_if_missing: true,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to sync the journal on every commit.
    #[must_use]
    pub const fn sync_on_commit(mut self, value: bool) -> Self {
        self.sync_on_commit = value;
        self
    }

    /// Sets the journal compaction threshold.
    #[must_use]
    pub const fn compact_threshold(mut self, bytes: u64) -> Self {
        self.compact_threshold = bytes;
        self
    }

    /// Sets the empty-set policy.
    #[must_use]
    pub const fn empty_set_policy(mut self, policy: EmptySetPolicy) -> Self {
        self.empty_set_policy = policy;
        self
    }

    /// Sets the canonical image size.
    #[must_use]
    pub const fn canonical_size(mut self, pixels: u32) -> Self {
        self.canonical_size = pixels;
        self
    }

    /// Sets whether to create the store directory if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }
}
