//! Display index translation.

use crate::error::{CoreError, CoreResult};

/// How caller-facing indices map onto member positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotLayout {
    /// Indices are member positions.
    #[default]
    Plain,
    /// Display slot 0 is the "add sticker" cell; member `i` is shown at
    /// slot `i + 1`.
    LeadingAddSlot,
}

impl SlotLayout {
    /// Translates a display index into a member position.
    ///
    /// # Errors
    ///
    /// [`CoreError::ReservedSlot`] for slot 0 of [`SlotLayout::LeadingAddSlot`].
    pub fn member_index(self, display: usize) -> CoreResult<usize> {
        match self {
            Self::Plain => Ok(display),
            Self::LeadingAddSlot => display.checked_sub(1).ok_or(CoreError::ReservedSlot),
        }
    }

    /// Translates a member position into its display index.
    #[must_use]
    pub fn display_index(self, member: usize) -> usize {
        match self {
            Self::Plain => member,
            Self::LeadingAddSlot => member + 1,
        }
    }

    /// Number of display slots for a set with `members` members.
    #[must_use]
    pub fn slot_count(self, members: usize) -> usize {
        self.display_index(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_is_identity() {
        assert_eq!(SlotLayout::Plain.member_index(0).unwrap(), 0);
        assert_eq!(SlotLayout::Plain.display_index(4), 4);
        assert_eq!(SlotLayout::Plain.slot_count(3), 3);
    }

    #[test]
    fn leading_slot_shifts_by_one() {
        let layout = SlotLayout::LeadingAddSlot;
        assert!(matches!(layout.member_index(0), Err(CoreError::ReservedSlot)));
        assert_eq!(layout.member_index(1).unwrap(), 0);
        assert_eq!(layout.display_index(0), 1);
        assert_eq!(layout.slot_count(0), 1);
    }
}
