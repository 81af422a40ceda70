// persist.rs — tagged binary encoding for the persisted `Chat` and
// `GameShipLock` blobs (spec.md §6).
//
// Converted from: myq2-common/src/qfiles.rs's fixed binary-layout
// structs (e.g. savegame records), here with an explicit presence tag
// per optional field instead of a sentinel value, since spec.md §6
// says values are "persisted only when the mask has a non-indefinite
// expiry" — the tag makes that an encoding-level fact, not a convention
// callers have to remember.

use crate::player::ChatState;
use zone_proto::ChatMask;
use zone_common::msgbuf::MsgBuf;

const TAG_PRESENT: u8 = 1;
const TAG_ABSENT: u8 = 0;

/// Encodes `{mask_bits:u32, expires?:timestamp, message_count:i32,
/// last_check:timestamp}` (spec.md §6 "Chat" persist key). Per spec,
/// callers only persist this when `chat.mask_expires` is `Some`
/// (non-indefinite); `encode_chat_state` itself is unconditional so the
/// round-trip law (spec.md §8) holds regardless of caller policy.
pub fn encode_chat_state(state: &ChatState) -> Vec<u8> {
    let mut buf = MsgBuf::new();
    buf.write_u32(state.mask.bits());
    match state.mask_expires {
        Some(expires) => {
            buf.write_u8(TAG_PRESENT);
            buf.write_u32(expires);
        }
        None => buf.write_u8(TAG_ABSENT),
    }
    buf.write_i32(state.message_count as i32);
    buf.write_u32(state.last_check);
    buf.data
}

pub fn decode_chat_state(bytes: &[u8]) -> Option<ChatState> {
    let mut buf = MsgBuf::from_bytes(bytes.to_vec());
    let mask = ChatMask::from_bits_truncate(buf.read_u32()?);
    let tag = buf.read_u8()?;
    let mask_expires = match tag {
        TAG_PRESENT => Some(buf.read_u32()?),
        _ => None,
    };
    let message_count = buf.read_i32()? as u32;
    let last_check = buf.read_u32()?;
    Some(ChatState { mask, mask_expires, message_count, last_check })
}

/// spec.md §6 "GameShipLock" holds `{expires:timestamp}`.
pub fn encode_ship_lock(expires: u32) -> Vec<u8> {
    let mut buf = MsgBuf::new();
    buf.write_u32(expires);
    buf.data
}

pub fn decode_ship_lock(bytes: &[u8]) -> Option<u32> {
    let mut buf = MsgBuf::from_bytes(bytes.to_vec());
    buf.read_u32()
}
