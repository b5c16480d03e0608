//! Draft state.

use super::loader::LoadResult;
use crate::entity::{parse_emojis, NewSticker};
use crate::error::{CoreError, CoreResult};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

static NEXT_DRAFT: AtomicU64 = AtomicU64::new(1);

/// Identifies one image load of one draft. Within a draft, later tickets
/// supersede earlier ones; tickets of different drafts never interfere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    draft: u64,
    seq: u64,
}

impl LoadTicket {
    /// Returns the id of the draft that issued the ticket.
    #[must_use]
    pub const fn draft(self) -> u64 {
        self.draft
    }

    /// Returns the ticket's position among its draft's loads.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.seq
    }
}

/// An image plus emojis that will become a sticker.
#[derive(Debug, Clone)]
pub struct StickerDraft {
    id: u64,
    image: Option<Vec<u8>>,
    emojis: Vec<String>,
    latest: u64,
}

impl Default for StickerDraft {
    fn default() -> Self {
        Self {
            id: NEXT_DRAFT.fetch_add(1, Ordering::Relaxed),
            image: None,
            emojis: Vec::new(),
            latest: 0,
        }
    }
}

impl StickerDraft {
    /// Creates an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current image, if one has been loaded.
    #[must_use]
    pub fn image(&self) -> Option<&[u8]> {
        self.image.as_deref()
    }

    /// Returns the emojis typed so far.
    #[must_use]
    pub fn emojis(&self) -> &[String] {
        &self.emojis
    }

    /// Starts a new image load, superseding any load still in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest += 1;
        LoadTicket {
            draft: self.id,
            seq: self.latest,
        }
    }

    /// Applies a finished load. Returns false, leaving the draft untouched,
    /// if `ticket` has been superseded.
    pub fn complete_load(&mut self, ticket: LoadTicket, image: Vec<u8>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        debug!(ticket = ticket.seq, bytes = image.len(), "draft image loaded");
        self.image = Some(image);
        true
    }

    /// Applies a result from an [`ImageLoader`](super::ImageLoader).
    ///
    /// Stale results are dropped whether they succeeded or not. A failed
    /// load for the current ticket is returned as the error.
    pub fn apply(&mut self, result: LoadResult) -> CoreResult<bool> {
        if !self.is_current(result.ticket) {
            return Ok(false);
        }
        let image = result.image?;
        Ok(self.complete_load(result.ticket, image))
    }

    fn is_current(&self, ticket: LoadTicket) -> bool {
        if ticket.draft == self.id && ticket.seq == self.latest {
            return true;
        }
        warn!(
            draft = ticket.draft,
            ticket = ticket.seq,
            latest = self.latest,
            "dropping superseded image load"
        );
        false
    }

    /// Appends the emojis found in `text`. Returns how many were added.
    pub fn push_emoji(&mut self, text: &str) -> usize {
        let parsed = parse_emojis(text);
        let added = parsed.len();
        self.emojis.extend(parsed);
        added
    }

    /// Removes the last emoji, like a backspace in the emoji field.
    pub fn pop_emoji(&mut self) -> Option<String> {
        self.emojis.pop()
    }

    /// Returns true if the draft can be finalized.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.image.is_some() && !self.emojis.is_empty()
    }

    /// Takes the image and emojis out of the draft.
    ///
    /// # Errors
    ///
    /// [`CoreError::DraftIncomplete`] without an image or without an emoji;
    /// the draft is left as it was.
    pub fn finalize(&mut self) -> CoreResult<NewSticker> {
        if self.image.is_none() {
            return Err(CoreError::DraftIncomplete { missing: "image" });
        }
        if self.emojis.is_empty() {
            return Err(CoreError::DraftIncomplete { missing: "emoji" });
        }
        let image = self.image.take().unwrap_or_default();
        let emojis = std::mem::take(&mut self.emojis);
        Ok(NewSticker::new(image, emojis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_ticket_wins() {
        let mut draft = StickerDraft::new();
        let first = draft.begin_load();
        let second = draft.begin_load();

        assert!(draft.complete_load(second, vec![2]));
        assert!(!draft.complete_load(first, vec![1]));
        assert_eq!(draft.image(), Some(&[2u8][..]));
    }

    #[test]
    fn tickets_of_another_draft_are_rejected() {
        let mut first = StickerDraft::new();
        let mut second = StickerDraft::new();
        let theirs = first.begin_load();
        let ours = second.begin_load();

        assert_eq!(theirs.as_u64(), ours.as_u64());
        assert_ne!(theirs.draft(), ours.draft());
        assert!(!second.complete_load(theirs, vec![1]));
        assert!(second.complete_load(ours, vec![2]));
    }

    #[test]
    fn stale_failure_is_ignored() {
        let mut draft = StickerDraft::new();
        let first = draft.begin_load();
        draft.begin_load();

        let stale = LoadResult {
            ticket: first,
            image: Err(CoreError::invalid_operation("decode failed")),
        };
        assert!(!draft.apply(stale).unwrap());
    }

    #[test]
    fn current_failure_is_reported() {
        let mut draft = StickerDraft::new();
        let ticket = draft.begin_load();
        let result = LoadResult {
            ticket,
            image: Err(CoreError::invalid_operation("decode failed")),
        };
        assert!(draft.apply(result).is_err());
        assert!(draft.image().is_none());
    }

    #[test]
    fn emoji_entry_and_backspace() {
        let mut draft = StickerDraft::new();
        assert_eq!(draft.push_emoji("😀 🎉"), 2);
        assert_eq!(draft.pop_emoji().as_deref(), Some("🎉"));
        assert_eq!(draft.emojis(), &["😀".to_string()]);
        assert_eq!(draft.pop_emoji().as_deref(), Some("😀"));
        assert_eq!(draft.pop_emoji(), None);
    }

    #[test]
    fn typed_letters_are_not_emojis() {
        let mut draft = StickerDraft::new();
        assert_eq!(draft.push_emoji("abc"), 0);
        assert!(draft.emojis().is_empty());
    }

    #[test]
    fn finalize_requires_image_and_emoji() {
        let mut draft = StickerDraft::new();
        draft.push_emoji("😀");
        assert!(matches!(
            draft.finalize(),
            Err(CoreError::DraftIncomplete { missing: "image" })
        ));

        let mut draft = StickerDraft::new();
        let ticket = draft.begin_load();
        draft.complete_load(ticket, vec![1, 2]);
        assert!(matches!(
            draft.finalize(),
            Err(CoreError::DraftIncomplete { missing: "emoji" })
        ));

        draft.push_emoji("🐱");
        assert!(draft.is_complete());
        let sticker = draft.finalize().unwrap();
        assert_eq!(sticker.image_data, vec![1, 2]);
        assert_eq!(sticker.emojis, vec!["🐱".to_string()]);
        assert!(!draft.is_complete());
    }
}
