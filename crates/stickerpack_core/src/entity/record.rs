//! Sticker set and sticker records.

use crate::entity::EntityId;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// An ordered collection of stickers forming one exportable pack.
///
/// Member order is significant: it is the display order and the export
/// order. A sticker id appears at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerSet {
    id: EntityId,
    created: Timestamp,
    edit_date: Timestamp,
    stickers: Vec<EntityId>,
}

impl StickerSet {
    pub(crate) fn new(id: EntityId, now: Timestamp) -> Self {
        Self {
            id,
            created: now,
            edit_date: now,
            stickers: Vec::new(),
        }
    }

    /// Returns the set id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Returns when the set was created.
    #[must_use]
    pub fn created(&self) -> Timestamp {
        self.created
    }

    /// Returns when the membership last changed.
    #[must_use]
    pub fn edit_date(&self) -> Timestamp {
        self.edit_date
    }

    /// Returns the member ids in order.
    #[must_use]
    pub fn stickers(&self) -> &[EntityId] {
        &self.stickers
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stickers.len()
    }

    /// Returns true if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stickers.is_empty()
    }

    /// Returns the position of `sticker` in the set.
    #[must_use]
    pub fn position(&self, sticker: EntityId) -> Option<usize> {
        self.stickers.iter().position(|id| *id == sticker)
    }

    /// Returns true if `sticker` is a member.
    #[must_use]
    pub fn contains(&self, sticker: EntityId) -> bool {
        self.position(sticker).is_some()
    }

    pub(crate) fn members_mut(&mut self) -> &mut Vec<EntityId> {
        &mut self.stickers
    }

    pub(crate) fn touch(&mut self, now: Timestamp) {
        self.edit_date = now;
    }
}

/// A single sticker: an image and the emojis it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sticker {
    id: EntityId,
    set: EntityId,
    #[serde(with = "serde_bytes")]
    image_data: Vec<u8>,
    emojis: Vec<String>,
}

impl Sticker {
    pub(crate) fn new(id: EntityId, set: EntityId, draft: NewSticker) -> Self {
        Self {
            id,
            set,
            image_data: draft.image_data,
            emojis: draft.emojis,
        }
    }

    /// Returns the sticker id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the id of the owning set.
    #[must_use]
    pub fn set(&self) -> EntityId {
        self.set
    }

    /// Returns the encoded image.
    #[must_use]
    pub fn image_data(&self) -> &[u8] {
        &self.image_data
    }

    /// Returns the associated emojis in order.
    #[must_use]
    pub fn emojis(&self) -> &[String] {
        &self.emojis
    }

    /// Returns the emojis joined into one tag string.
    #[must_use]
    pub fn emoji_tag(&self) -> String {
        self.emojis.concat()
    }

    pub(crate) fn set_emojis(&mut self, emojis: Vec<String>) {
        self.emojis = emojis;
    }
}

/// A finished image and emoji pair, ready to be inserted into a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSticker {
    /// Encoded image bytes.
    pub image_data: Vec<u8>,
    /// Emojis in the order they were typed.
    pub emojis: Vec<String>,
}

impl NewSticker {
    /// Creates a new sticker payload.
    #[must_use]
    pub fn new(image_data: Vec<u8>, emojis: Vec<String>) -> Self {
        Self { image_data, emojis }
    }
}

/// A set together with its member records, in member order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickerSetSnapshot {
    /// The set record.
    pub set: StickerSet,
    /// Member records in set order.
    pub stickers: Vec<Sticker>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sticker(emojis: &[&str]) -> Sticker {
        let draft = NewSticker::new(vec![1, 2, 3], emojis.iter().map(|e| e.to_string()).collect());
        Sticker::new(EntityId::new(), EntityId::new(), draft)
    }

    #[test]
    fn emoji_tag_joins_in_order() {
        assert_eq!(sticker(&["😀", "🎉"]).emoji_tag(), "😀🎉");
        assert_eq!(sticker(&[]).emoji_tag(), "");
    }

    #[test]
    fn set_position_lookup() {
        let mut set = StickerSet::new(EntityId::new(), Timestamp::from_millis(1));
        let a = EntityId::new();
        let b = EntityId::new();
        set.members_mut().extend([a, b]);

        assert_eq!(set.position(b), Some(1));
        assert!(set.contains(a));
        assert!(!set.contains(EntityId::new()));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn image_data_encodes_as_byte_string() {
        let record = sticker(&["😀"]);
        let mut encoded = Vec::new();
        ciborium::into_writer(&record, &mut encoded).unwrap();

        // 0x43 = byte string of length 3
        assert!(encoded.windows(4).any(|w| w == [0x43, 1, 2, 3]));

        let decoded: Sticker = ciborium::from_reader(encoded.as_slice()).unwrap();
        assert_eq!(decoded, record);
    }
}
