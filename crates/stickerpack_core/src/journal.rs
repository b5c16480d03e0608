//! Commit journal framing.
//!
//! Each commit is appended to the storage backend as one frame:
//!
//! ```text
//! ┌──────────────┬─────────────┬────────────────┬──────────────┬──────────────┐
//! │ magic "SPJ1" │ len: u32 LE │ header_sum [4] │ body_sum [8] │ body: CBOR   │
//! └──────────────┴─────────────┴────────────────┴──────────────┴──────────────┘
//! ```
//!
//! `header_sum` covers the magic and the length, `body_sum` the body; both
//! are prefixes of a SHA-256 digest. A frame cut short at the end of the
//! journal, or whose body fails its checksum as the final frame, is a torn
//! write and is cut off during recovery. A bad magic or header checksum, or
//! a bad body followed by more data, is reported as corruption, so a damaged
//! length can never make recovery discard committed frames.

use crate::entity::{EntityId, Sticker, StickerSet};
use crate::error::{CoreError, CoreResult};
use crate::types::SequenceNumber;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const MAGIC: [u8; 4] = *b"SPJ1";
const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// One persisted mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) enum Edit {
    PutSet(StickerSet),
    PutSticker(Sticker),
    DeleteSticker(EntityId),
    DeleteSet(EntityId),
}

/// Decoded frame body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) enum FrameBody {
    /// Edits of a single commit.
    Commit {
        sequence: SequenceNumber,
        edits: Vec<Edit>,
    },
    /// Every live record as of `sequence`; replaces all earlier state.
    Snapshot {
        sequence: SequenceNumber,
        sets: Vec<StickerSet>,
        stickers: Vec<Sticker>,
    },
}

/// Result of scanning a journal.
#[derive(Debug, Default)]
pub(crate) struct Replay {
    pub frames: Vec<FrameBody>,
    /// Length of the journal prefix made of complete, valid frames.
    pub valid_len: u64,
    /// Whether bytes after `valid_len` were discarded as a torn write.
    pub torn: bool,
}

fn checksum(body: &[u8]) -> [u8; 8] {
    let digest = Sha256::digest(body);
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

fn header_checksum(magic_and_len: &[u8]) -> [u8; 4] {
    let digest = Sha256::digest(magic_and_len);
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// Encodes a frame body with its header.
pub(crate) fn encode_frame(body: &FrameBody) -> CoreResult<Vec<u8>> {
    let mut payload = Vec::new();
    ciborium::into_writer(body, &mut payload).map_err(|e| CoreError::codec(e.to_string()))?;

    let len = u32::try_from(payload.len())
        .map_err(|_| CoreError::codec(format!("frame of {} bytes is too large", payload.len())))?;

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&MAGIC);
    frame.extend_from_slice(&len.to_le_bytes());
    let header_sum = header_checksum(&frame[..8]);
    frame.extend_from_slice(&header_sum);
    frame.extend_from_slice(&checksum(&payload));
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Scans `bytes` into frame bodies.
pub(crate) fn read_frames(bytes: &[u8]) -> CoreResult<Replay> {
    let mut replay = Replay::default();
    let mut offset = 0usize;

    while offset < bytes.len() {
        let remaining = &bytes[offset..];
        if remaining.len() < HEADER_LEN {
            replay.torn = true;
            break;
        }

        if remaining[..4] != MAGIC {
            return Err(CoreError::corrupted(offset as u64, "bad frame magic"));
        }
        if header_checksum(&remaining[..8]) != remaining[8..12] {
            return Err(CoreError::corrupted(offset as u64, "header checksum mismatch"));
        }

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&remaining[4..8]);
        let len = u32::from_le_bytes(len_bytes) as usize;

        // The header is intact, so a frame running past the end was cut
        // short while being appended.
        let end = HEADER_LEN + len;
        if remaining.len() < end {
            replay.torn = true;
            break;
        }

        let body = &remaining[HEADER_LEN..end];
        if checksum(body) != remaining[12..HEADER_LEN] {
            if offset + end == bytes.len() {
                replay.torn = true;
                break;
            }
            return Err(CoreError::corrupted(offset as u64, "checksum mismatch"));
        }

        let frame: FrameBody = ciborium::from_reader(body)
            .map_err(|e| CoreError::corrupted(offset as u64, e.to_string()))?;
        replay.frames.push(frame);

        offset += end;
        replay.valid_len = offset as u64;
    }

    Ok(replay)
}
