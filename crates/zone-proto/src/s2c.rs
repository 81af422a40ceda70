// s2c.rs — outbound (server→client) packet layouts.
// Converted from: myq2-common/src/common.rs's msg_write_* helpers,
// used here to build the four position/weapon shapes and the
// state-change/chat/file/redirect packets of spec.md §4.3/§6.

use crate::c2s::{ExtraPositionData, C2S_POSITION_EXTRA_LEN};
use crate::checksum::xor_checksum;
use zone_common::msgbuf::MsgBuf;

/// spec.md §4.3: the four outbound position/weapon shapes, chosen by
/// the packet shaper top-to-bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionShape {
    SmallBatchedSingle,
    LargeBatchedSingle,
    Weapon,
    Position,
}

/// A fully-built outbound position/weapon packet, shared byte-for-byte
/// across every recipient that resolves to the same shape (spec.md
/// §4.3: "build it once and reuse the bytes for every matching
/// recipient").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S2cPositionPacket {
    pub shape: PositionShape,
    pub bytes: Vec<u8>,
}

pub const SMALL_BATCHED_TYPE: u8 = 0x28;
pub const LARGE_BATCHED_TYPE: u8 = 0x29;
pub const WEAPON_TYPE: u8 = 0x05;
pub const POSITION_TYPE: u8 = 0x03;

pub struct PositionFields {
    pub sender_id: u16,
    pub rotation: u16,
    pub x: i16,
    pub y: i16,
    pub xspeed: i16,
    pub yspeed: i16,
    pub bounty: u16,
    pub status: u8,
    pub c2s_latency: u8,
    pub tick_low: u16,
    pub weapon: u16,
    pub energy: i16,
    pub extra: Option<ExtraPositionData>,
}

impl PositionFields {
    fn clamp_latency(&self) -> u8 {
        self.c2s_latency
    }

    /// Shape 1: small-batched-single (spec.md §4.3 item 1).
    pub fn build_small_batched(&self) -> S2cPositionPacket {
        let mut buf = MsgBuf::new();
        buf.write_u8(SMALL_BATCHED_TYPE);
        buf.write_u8(self.clamp_latency());
        buf.write_u16(self.tick_low);
        buf.write_u8(self.sender_id as u8);
        buf.write_u16(self.rotation);
        buf.write_i16(self.x);
        buf.write_i16(self.y);
        buf.write_i16(self.xspeed);
        buf.write_i16(self.yspeed);
        S2cPositionPacket { shape: PositionShape::SmallBatchedSingle, bytes: buf.data }
    }

    /// Shape 2: large-batched-single (spec.md §4.3 item 2).
    pub fn build_large_batched(&self) -> S2cPositionPacket {
        let mut buf = MsgBuf::new();
        buf.write_u8(LARGE_BATCHED_TYPE);
        buf.write_u8(self.clamp_latency());
        buf.write_u16(self.tick_low);
        buf.write_u16(self.sender_id);
        buf.write_u16(self.rotation);
        buf.write_i16(self.x);
        buf.write_i16(self.y);
        buf.write_i16(self.xspeed);
        buf.write_i16(self.yspeed);
        buf.write_u8(self.status & 0x3F);
        S2cPositionPacket { shape: PositionShape::LargeBatchedSingle, bytes: buf.data }
    }

    /// Shape 3: weapon — copies all fields, folds energy into extra,
    /// recomputes the 1-byte XOR checksum over the first 22 bytes
    /// (spec.md §4.3 item 3).
    pub fn build_weapon(&self) -> S2cPositionPacket {
        let mut buf = MsgBuf::new();
        buf.write_u8(WEAPON_TYPE);
        buf.write_u16(self.rotation);
        buf.write_u16(self.tick_low);
        buf.write_i16(self.x);
        buf.write_i16(self.yspeed);
        buf.write_u8(0); // checksum placeholder, patched below
        buf.write_u8(self.status);
        buf.write_u16(self.sender_id);
        buf.write_i16(self.y);
        buf.write_i16(self.xspeed);
        buf.write_u16(self.bounty);
        buf.write_u8(self.clamp_latency());
        buf.write_u16(self.weapon);

        let extra = self.extra.unwrap_or_default();
        let mut folded = extra;
        folded.s2c_ping = folded.s2c_ping.wrapping_add(self.energy.max(0) as u8);
        folded.encode(&mut buf);

        let checksum_idx = 9; // offset of the checksum byte within the first 22
        let fold_len = buf.data.len().min(22);
        let checksum = xor_checksum(&buf.data[..fold_len]);
        buf.data[checksum_idx] = checksum;
        S2cPositionPacket { shape: PositionShape::Weapon, bytes: buf.data }
    }

    /// Shape 4: position — 16-bit rotation/position/speed; bounty and
    /// id truncated to 8 bits (spec.md §4.3 item 4).
    pub fn build_position(&self) -> S2cPositionPacket {
        let mut buf = MsgBuf::new();
        buf.write_u8(POSITION_TYPE);
        buf.write_u16(self.rotation);
        buf.write_u16(self.tick_low);
        buf.write_i16(self.x);
        buf.write_i16(self.yspeed);
        buf.write_u8(self.status);
        buf.write_u8(self.sender_id as u8);
        buf.write_i16(self.y);
        buf.write_i16(self.xspeed);
        buf.write_u8(self.bounty.min(255) as u8);
        buf.write_u8(self.clamp_latency());
        S2cPositionPacket { shape: PositionShape::Position, bytes: buf.data }
    }

    /// spec.md §4.3: picks exactly one shape, evaluated top-to-bottom.
    /// `batched_feature` is the recipient's advertised "batched positions"
    /// client capability.
    pub fn choose_shape(
        &self,
        batched_feature: bool,
        has_weapon: bool,
        bounty_unchanged_recently: bool,
    ) -> PositionShape {
        let id = self.sender_id;
        let coords_in_batched_range =
            (0..=16383).contains(&self.x) && (0..=16383).contains(&self.y);
        let speeds_in_batched_range = self.xspeed.unsigned_abs() <= 8191 && self.yspeed.unsigned_abs() <= 8191;

        if batched_feature
            && !has_weapon
            && bounty_unchanged_recently
            && self.status == 0
            && self.extra.is_none()
            && id <= 255
            && speeds_in_batched_range
            && coords_in_batched_range
        {
            return PositionShape::SmallBatchedSingle;
        }

        if batched_feature
            && id <= 1023
            && self.status <= 0x3F
            && !has_weapon
            && self.extra.is_none()
        {
            return PositionShape::LargeBatchedSingle;
        }

        if has_weapon || self.bounty > 255 || id > 255 {
            return PositionShape::Weapon;
        }

        PositionShape::Position
    }
}

pub const EXTRA_POSITION_LEN: usize = C2S_POSITION_EXTRA_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S2cKill {
    pub green: u8,
    pub killer: i16,
    pub killed: i16,
    pub bounty: i16,
    pub flags: i16,
}

impl S2cKill {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = MsgBuf::new();
        buf.write_u8(0x06);
        buf.write_u8(self.green);
        buf.write_i16(self.killer);
        buf.write_i16(self.killed);
        buf.write_i16(self.bounty);
        buf.write_i16(self.flags);
        buf.data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S2cShipChange {
    pub ship: i8,
    pub pid: i16,
    pub freq: i16,
}

impl S2cShipChange {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = MsgBuf::new();
        buf.write_u8(0x07);
        buf.write_i8(self.ship);
        buf.write_i16(self.pid);
        buf.write_i16(self.freq);
        buf.data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S2cFreqChange {
    pub pid: i16,
    pub freq: i16,
}

impl S2cFreqChange {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = MsgBuf::new();
        buf.write_u8(0x0c);
        buf.write_i16(self.pid);
        buf.write_i16(self.freq);
        buf.data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S2cTurret {
    pub sender_pid: i16,
    pub target_pid: i16,
}

impl S2cTurret {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = MsgBuf::new();
        buf.write_u8(0x0d);
        buf.write_i16(self.sender_pid);
        buf.write_i16(self.target_pid);
        buf.data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S2cTurretKickoff {
    pub sender_pid: i16,
}

impl S2cTurretKickoff {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = MsgBuf::new();
        buf.write_u8(0x1a);
        buf.write_i16(self.sender_pid);
        buf.data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S2cWarpTo {
    pub x: i16,
    pub y: i16,
}

impl S2cWarpTo {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = MsgBuf::new();
        buf.write_u8(0x12);
        buf.write_i16(self.x);
        buf.write_i16(self.y);
        buf.data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S2cPrizeReceive {
    pub count: i16,
    pub prize: i16,
}

impl S2cPrizeReceive {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = MsgBuf::new();
        buf.write_u8(0x16);
        buf.write_i16(self.count);
        buf.write_i16(self.prize);
        buf.data
    }
}

pub fn s2c_ship_reset() -> Vec<u8> {
    vec![0x1d]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S2cSpecData {
    pub enabled: bool,
}

impl S2cSpecData {
    pub fn encode(&self) -> Vec<u8> {
        vec![0x1e, self.enabled as u8]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S2cToggleDamage {
    pub enabled: bool,
}

impl S2cToggleDamage {
    pub fn encode(&self) -> Vec<u8> {
        vec![0x26, self.enabled as u8]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S2cChat {
    pub chat_type: u8,
    pub sound: u8,
    pub sender_pid: i16,
    pub message: String,
}

impl S2cChat {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = MsgBuf::new();
        buf.write_u8(0x02);
        buf.write_u8(self.chat_type);
        buf.write_u8(self.sound);
        buf.write_i16(self.sender_pid);
        buf.write_bytes(self.message.as_bytes());
        buf.write_u8(0);
        buf.data
    }
}

pub const INCOMING_FILE_NAME_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S2cIncomingFile {
    pub name: [u8; INCOMING_FILE_NAME_LEN],
    pub content: Vec<u8>,
}

impl S2cIncomingFile {
    pub fn new(display_name: &str, content: Vec<u8>) -> S2cIncomingFile {
        let mut name = [0u8; INCOMING_FILE_NAME_LEN];
        let bytes = display_name.as_bytes();
        let n = bytes.len().min(INCOMING_FILE_NAME_LEN);
        name[..n].copy_from_slice(&bytes[..n]);
        S2cIncomingFile { name, content }
    }

    /// Total wire length: `file_size + 17` (spec.md §4.11) — a 1-byte
    /// type tag plus the 16-byte name, plus the file bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + INCOMING_FILE_NAME_LEN + self.content.len());
        out.push(0x17);
        out.extend_from_slice(&self.name);
        out.extend_from_slice(&self.content);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S2cRedirect {
    pub ip: u32,
    pub port: u16,
    pub arena_type: i16,
    pub arena_name: Option<String>,
    pub login_id: u32,
}

impl S2cRedirect {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = MsgBuf::new();
        buf.write_u8(0x08);
        buf.write_bytes(&self.ip.to_be_bytes());
        buf.write_u16(self.port);
        buf.write_i16(self.arena_type);
        if let Some(name) = &self.arena_name {
            buf.write_bytes(name.as_bytes());
        }
        buf.write_u8(0);
        buf.write_u32(self.login_id);
        buf.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_fields() -> PositionFields {
        PositionFields {
            sender_id: 5,
            rotation: 10,
            x: 100,
            y: 200,
            xspeed: 3,
            yspeed: -4,
            bounty: 10,
            status: 0,
            c2s_latency: 12,
            tick_low: 500,
            weapon: 0,
            energy: 50,
            extra: None,
        }
    }

    #[test]
    fn boundary_bounty_selects_position_then_weapon() {
        let mut f = base_fields();
        f.bounty = 255;
        assert_eq!(f.choose_shape(false, false, false), PositionShape::Position);
        f.bounty = 256;
        assert_eq!(f.choose_shape(false, false, false), PositionShape::Weapon);
    }

    #[test]
    fn boundary_id_selects_large_batched_then_weapon() {
        let mut f = base_fields();
        f.sender_id = 1023;
        assert_eq!(f.choose_shape(true, false, false), PositionShape::LargeBatchedSingle);
        f.sender_id = 1024;
        assert_eq!(f.choose_shape(true, false, false), PositionShape::Weapon);
    }

    #[test]
    fn small_batched_requires_all_boundaries() {
        let f = base_fields();
        assert_eq!(f.choose_shape(true, false, true), PositionShape::SmallBatchedSingle);

        let mut with_weapon = base_fields();
        with_weapon.weapon = 1;
        assert_ne!(with_weapon.choose_shape(true, true, true), PositionShape::SmallBatchedSingle);
    }

    #[test]
    fn weapon_shape_recomputes_checksum_over_first_22_bytes() {
        let f = base_fields();
        let pkt = f.build_weapon();
        assert!(pkt.bytes.len() >= 22);
        assert_eq!(xor_checksum(&pkt.bytes[..22]), 0);
    }

    #[test]
    fn incoming_file_header_is_17_bytes_plus_content() {
        let file = S2cIncomingFile::new("lvl1.lvl", vec![1, 2, 3]);
        let encoded = file.encode();
        assert_eq!(encoded.len(), 17 + 3);
        assert_eq!(encoded[0], 0x17);
    }

    #[test]
    fn redirect_with_arena_uses_arena_type_minus_three() {
        let r = S2cRedirect {
            ip: 0x01020304,
            port: 5000,
            arena_type: -3,
            arena_name: Some("arenaX".to_string()),
            login_id: 0,
        };
        let encoded = r.encode();
        assert_eq!(&encoded[1..5], &[0x01, 0x02, 0x03, 0x04]);
    }
}
