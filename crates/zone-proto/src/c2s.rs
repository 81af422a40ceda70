// c2s.rs — inbound (client→server) packet layouts.
// Converted from: myq2-common/src/q_shared.rs's `#[repr(C)]` wire
// structs and the msg_read_* decode helpers in myq2-common/src/common.rs,
// retargeted at the exact byte layouts in spec.md §6.

use crate::checksum::xor_checksum;
use zone_common::msgbuf::MsgBuf;

pub const C2S_POSITION_BASE_LEN: usize = 22;
pub const C2S_POSITION_EXTRA_LEN: usize = 10;

/// The 10-byte EPD suffix a Continuum client attaches to its own
/// position packets once `SpecData(1)` has told it to (spec.md §4.4,
/// glossary "EPD"). Field set approximates spec.md §6's listing,
/// packed to fit the spec's fixed 10-byte extra exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtraPositionData {
    pub s2c_ping: u8,
    pub timer: u8,
    pub shields: u8,
    pub super_: u8,
    pub bursts: u8,
    pub repels: u8,
    pub thors: u8,
    pub bricks: u8,
    pub decoys: u8,
    pub rockets_and_portals: u8,
}

impl ExtraPositionData {
    pub fn decode(buf: &mut MsgBuf) -> Option<ExtraPositionData> {
        Some(ExtraPositionData {
            s2c_ping: buf.read_u8()?,
            timer: buf.read_u8()?,
            shields: buf.read_u8()?,
            super_: buf.read_u8()?,
            bursts: buf.read_u8()?,
            repels: buf.read_u8()?,
            thors: buf.read_u8()?,
            bricks: buf.read_u8()?,
            decoys: buf.read_u8()?,
            rockets_and_portals: buf.read_u8()?,
        })
    }

    pub fn encode(&self, buf: &mut MsgBuf) {
        buf.write_u8(self.s2c_ping);
        buf.write_u8(self.timer);
        buf.write_u8(self.shields);
        buf.write_u8(self.super_);
        buf.write_u8(self.bursts);
        buf.write_u8(self.repels);
        buf.write_u8(self.thors);
        buf.write_u8(self.bricks);
        buf.write_u8(self.decoys);
        buf.write_u8(self.rockets_and_portals);
    }
}

/// C2S Position (spec.md §6). `checksum_ok` records whether the XOR
/// checksum over the first 22 bytes validated to zero; `Decode` leaves
/// the rejection decision to the caller so a "fake" (server-synthesized)
/// packet can skip it.
#[derive(Debug, Clone, PartialEq)]
pub struct C2sPosition {
    pub rotation: u8,
    pub time: u32,
    pub xspeed: i16,
    pub y: i16,
    pub checksum: u8,
    pub status: u8,
    pub x: i16,
    pub yspeed: i16,
    pub bounty: u16,
    pub energy: i16,
    pub weapon: u16,
    pub extra: Option<ExtraPositionData>,
}

impl C2sPosition {
    /// Decodes a base-length or base+extra-length packet body (the type
    /// byte has already been consumed by the caller's demultiplexer, per
    /// spec.md §4.1's "raw bytes (either base-length or base+extra-length)").
    pub fn decode(body: &[u8]) -> Option<C2sPosition> {
        if body.len() != C2S_POSITION_BASE_LEN - 1
            && body.len() != C2S_POSITION_BASE_LEN - 1 + C2S_POSITION_EXTRA_LEN
        {
            return None;
        }
        let mut buf = MsgBuf::from_bytes(body.to_vec());
        let rotation = buf.read_u8()?;
        let time = buf.read_u32()?;
        let xspeed = buf.read_i16()?;
        let y = buf.read_i16()?;
        let checksum = buf.read_u8()?;
        let status = buf.read_u8()?;
        let x = buf.read_i16()?;
        let yspeed = buf.read_i16()?;
        let bounty = buf.read_u16()?;
        let energy = buf.read_i16()?;
        let weapon = buf.read_u16()?;
        let extra = if body.len() > C2S_POSITION_BASE_LEN - 1 {
            ExtraPositionData::decode(&mut buf)
        } else {
            None
        };
        Some(C2sPosition {
            rotation,
            time,
            xspeed,
            y,
            checksum,
            status,
            x,
            yspeed,
            bounty,
            energy,
            weapon,
            extra,
        })
    }

    /// Re-encodes the first 22 bytes (type byte included via `type_byte`)
    /// so the checksum can be recomputed the way it was validated.
    pub fn checksum_bytes(&self, type_byte: u8) -> [u8; C2S_POSITION_BASE_LEN] {
        let mut buf = MsgBuf::new();
        buf.write_u8(type_byte);
        buf.write_u8(self.rotation);
        buf.write_u32(self.time);
        buf.write_i16(self.xspeed);
        buf.write_i16(self.y);
        buf.write_u8(0); // checksum field excluded from the fold
        buf.write_u8(self.status);
        buf.write_i16(self.x);
        buf.write_i16(self.yspeed);
        buf.write_u16(self.bounty);
        buf.write_i16(self.energy);
        buf.write_u16(self.weapon);
        let mut out = [0u8; C2S_POSITION_BASE_LEN];
        out.copy_from_slice(&buf.data[..C2S_POSITION_BASE_LEN]);
        out
    }

    /// Validates the inbound checksum (spec.md §4.1). Real clients set
    /// the checksum so this folds to zero; fake/server-synthesized
    /// packets bypass this check entirely (glossary "Fake player").
    pub fn checksum_is_valid(&self, type_byte: u8) -> bool {
        let mut bytes = self.checksum_bytes(type_byte);
        bytes[10] = self.checksum; // offset of the checksum byte in the 22-byte layout
        xor_checksum(&bytes) == 0
    }

    /// spec.md §4.1: "(x,y) == (-1,-1) (drop silently — it is the
    /// post-death keepalive)".
    pub fn is_keepalive(&self) -> bool {
        self.x == -1 && self.y == -1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct C2sSpecRequest {
    pub target: i16,
}

impl C2sSpecRequest {
    pub fn decode(body: &[u8]) -> Option<Self> {
        let mut buf = MsgBuf::from_bytes(body.to_vec());
        Some(Self { target: buf.read_i16()? })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct C2sSetShip {
    pub ship: u8,
}

impl C2sSetShip {
    pub fn decode(body: &[u8]) -> Option<Self> {
        let mut buf = MsgBuf::from_bytes(body.to_vec());
        Some(Self { ship: buf.read_u8()? })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct C2sSetFreq {
    pub freq: i16,
}

impl C2sSetFreq {
    pub fn decode(body: &[u8]) -> Option<Self> {
        let mut buf = MsgBuf::from_bytes(body.to_vec());
        Some(Self { freq: buf.read_i16()? })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct C2sDie {
    pub killer: i16,
    pub bounty: i16,
}

impl C2sDie {
    pub fn decode(body: &[u8]) -> Option<Self> {
        let mut buf = MsgBuf::from_bytes(body.to_vec());
        Some(Self { killer: buf.read_i16()?, bounty: buf.read_i16()? })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct C2sGreen {
    pub time: u32,
    pub x: i16,
    pub y: i16,
    pub prize: u16,
}

impl C2sGreen {
    pub fn decode(body: &[u8]) -> Option<Self> {
        let mut buf = MsgBuf::from_bytes(body.to_vec());
        Some(Self {
            time: buf.read_u32()?,
            x: buf.read_i16()?,
            y: buf.read_i16()?,
            prize: buf.read_u16()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct C2sAttachTo {
    pub target: i16,
}

impl C2sAttachTo {
    pub fn decode(body: &[u8]) -> Option<Self> {
        let mut buf = MsgBuf::from_bytes(body.to_vec());
        Some(Self { target: buf.read_i16()? })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct C2sTurretKickOff;

impl C2sTurretKickOff {
    pub fn decode(body: &[u8]) -> Option<Self> {
        if body.is_empty() {
            Some(Self)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct C2sChat {
    pub chat_type: u8,
    pub sound: u8,
    pub target_pid: i16,
    pub message: String,
}

impl C2sChat {
    pub fn decode(body: &[u8]) -> Option<Self> {
        let mut buf = MsgBuf::from_bytes(body.to_vec());
        let chat_type = buf.read_u8()?;
        let sound = buf.read_u8()?;
        let target_pid = buf.read_i16()?;
        let rest = buf.read_bytes(buf.remaining())?;
        let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
        let message = String::from_utf8_lossy(&rest[..end]).into_owned();
        Some(Self { chat_type, sound, target_pid, message })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageEntry {
    pub attacker: i16,
    pub weapon: u16,
    pub damage: u16,
    pub kind: u8,
    pub flags: u8,
    pub shots_left: u16,
}

pub const DAMAGE_ENTRY_LEN: usize = 10;

impl DamageEntry {
    pub fn decode(buf: &mut MsgBuf) -> Option<Self> {
        Some(Self {
            attacker: buf.read_i16()?,
            weapon: buf.read_u16()?,
            damage: buf.read_u16()?,
            kind: buf.read_u8()?,
            flags: buf.read_u8()?,
            shots_left: buf.read_u16()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct C2sWatchDamage {
    pub entries: Vec<DamageEntry>,
}

impl C2sWatchDamage {
    pub fn decode(body: &[u8]) -> Option<Self> {
        let mut buf = MsgBuf::from_bytes(body.to_vec());
        let mut entries = Vec::new();
        while buf.remaining() >= DAMAGE_ENTRY_LEN {
            entries.push(DamageEntry::decode(&mut buf)?);
        }
        Some(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_position_body() -> Vec<u8> {
        let mut buf = MsgBuf::new();
        buf.write_u8(10); // rotation
        buf.write_u32(1000); // time
        buf.write_i16(5); // xspeed
        buf.write_i16(200); // y
        buf.write_u8(0); // checksum (fixed up below)
        buf.write_u8(0); // status
        buf.write_i16(300); // x
        buf.write_i16(-5); // yspeed
        buf.write_u16(10); // bounty
        buf.write_i16(100); // energy
        buf.write_u16(0); // weapon
        buf.data
    }

    #[test]
    fn decodes_base_length_position() {
        let body = sample_position_body();
        let pos = C2sPosition::decode(&body).unwrap();
        assert_eq!(pos.x, 300);
        assert_eq!(pos.y, 200);
        assert!(pos.extra.is_none());
    }

    #[test]
    fn rejects_wrong_length() {
        let mut body = sample_position_body();
        body.push(0xff);
        assert!(C2sPosition::decode(&body).is_none());
    }

    #[test]
    fn checksum_validates_against_folded_bytes() {
        let body = sample_position_body();
        let mut pos = C2sPosition::decode(&body).unwrap();
        let mut bytes = pos.checksum_bytes(0);
        bytes[10] = 0;
        pos.checksum = xor_checksum(&bytes);
        assert!(pos.checksum_is_valid(0));
        pos.checksum ^= 0xff;
        assert!(!pos.checksum_is_valid(0));
    }

    #[test]
    fn keepalive_detection() {
        let mut body = sample_position_body();
        // overwrite x,y with -1,-1
        let mut buf = MsgBuf::from_bytes(body.clone());
        buf.begin_reading();
        let _ = buf.read_u8();
        let _ = buf.read_u32();
        let _ = buf.read_i16();
        let y_off = buf.readcount;
        body[y_off] = 0xff;
        body[y_off + 1] = 0xff;
        let x_off = y_off + 2 + 1 + 1; // skip the rest of y, checksum, status
        body[x_off] = 0xff;
        body[x_off + 1] = 0xff;
        let pos = C2sPosition::decode(&body).unwrap();
        assert!(pos.is_keepalive());
    }

    #[test]
    fn decodes_chat_nul_terminated() {
        let mut buf = MsgBuf::new();
        buf.write_u8(1); // chat_type
        buf.write_u8(0); // sound
        buf.write_i16(-1); // target_pid
        buf.write_bytes(b"hello");
        buf.write_u8(0);
        let chat = C2sChat::decode(&buf.data).unwrap();
        assert_eq!(chat.message, "hello");
    }
}
