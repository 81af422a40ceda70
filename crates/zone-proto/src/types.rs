// types.rs — domain enums and bit flags shared by the C2S/S2C layouts.
// Converted from: myq2-common/src/q_shared.rs's use of `#[repr(i32)]`
// enums and `bitflags::bitflags!` blocks for wire-level vocabularies,
// retargeted at the ship/chat/weapon/priority vocabulary of spec.md §3/§6.

use bitflags::bitflags;

pub type PlayerId = u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Ship {
    Warbird = 0,
    Javelin = 1,
    Spider = 2,
    Leviathan = 3,
    Terrier = 4,
    Weasel = 5,
    Lancaster = 6,
    Shark = 7,
    Spec = 8,
}

impl Ship {
    pub fn from_u8(v: u8) -> Option<Ship> {
        use Ship::*;
        match v {
            0 => Some(Warbird),
            1 => Some(Javelin),
            2 => Some(Spider),
            3 => Some(Leviathan),
            4 => Some(Terrier),
            5 => Some(Weasel),
            6 => Some(Lancaster),
            7 => Some(Shark),
            8 => Some(Spec),
            _ => None,
        }
    }

    pub fn is_spec(self) -> bool {
        matches!(self, Ship::Spec)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    Vie,
    Continuum,
    Chat,
    Fake,
}

impl ClientKind {
    pub fn is_standard(self) -> bool {
        matches!(self, ClientKind::Vie | ClientKind::Continuum)
    }
}

/// spec.md glossary: weapon codes that matter to range/fast-bomb logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponType {
    Null = 0,
    Bullet = 1,
    BouncingBullet = 2,
    Bomb = 3,
    ProxBomb = 4,
    Repel = 5,
    Decoy = 6,
    Burst = 7,
    Thor = 8,
}

impl WeaponType {
    pub fn from_u16(v: u16) -> WeaponType {
        use WeaponType::*;
        match v {
            1 => Bullet,
            2 => BouncingBullet,
            3 => Bomb,
            4 => ProxBomb,
            5 => Repel,
            6 => Decoy,
            7 => Burst,
            8 => Thor,
            _ => Null,
        }
    }

    pub fn is_bomb_like(self) -> bool {
        matches!(self, WeaponType::Bomb | WeaponType::ProxBomb | WeaponType::Thor)
    }

    pub fn is_null(self) -> bool {
        matches!(self, WeaponType::Null)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct StatusFlags: u8 {
        const STEALTH   = 0x01;
        const CLOAK     = 0x02;
        const XRADAR    = 0x04;
        const ANTIWARP  = 0x08;
        const FLASH     = 0x10;
        const SAFEZONE  = 0x20;
        const UFO       = 0x40;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct WeaponFlags: u16 {
        /// Bombs/prox-bombs with this bit set are mines (glossary "Mines").
        const ALTERNATE = 0x8000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeeEnergy {
    None,
    All,
    Team,
    Spec,
}

/// spec.md §4.2 extra-field classification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraClass {
    None,
    EnergyOnly,
    FullExtra,
}

/// spec.md §4.5 chat message types, used both as the mask bitmap index
/// and as the `chat_type` byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChatType {
    Arena = 0,
    Pub = 1,
    PubMacro = 2,
    Freq = 3,
    EnemyFreq = 4,
    Private = 5,
    RemotePrivate = 6,
    SysopWarning = 7,
    ModChat = 8,
    Chat = 9,
    BillerCommand = 10,
}

impl ChatType {
    pub fn from_u8(v: u8) -> Option<ChatType> {
        use ChatType::*;
        Some(match v {
            0 => Arena,
            1 => Pub,
            2 => PubMacro,
            3 => Freq,
            4 => EnemyFreq,
            5 => Private,
            6 => RemotePrivate,
            7 => SysopWarning,
            8 => ModChat,
            9 => Chat,
            10 => BillerCommand,
            _ => return None,
        })
    }

    pub fn bit(self) -> u32 {
        1 << (self as u8)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ChatMask: u32 {
        const ARENA           = 1 << 0;
        const PUB             = 1 << 1;
        const PUB_MACRO       = 1 << 2;
        const FREQ            = 1 << 3;
        const ENEMY_FREQ      = 1 << 4;
        const PRIVATE         = 1 << 5;
        const REMOTE_PRIVATE  = 1 << 6;
        const SYSOP_WARNING   = 1 << 7;
        const MOD_CHAT        = 1 << 8;
        const CHAT            = 1 << 9;
        const BILLER_COMMAND  = 1 << 10;
    }
}

impl ChatMask {
    pub fn restricts(self, t: ChatType) -> bool {
        self.bits() & t.bit() != 0
    }

    pub fn restrict(&mut self, t: ChatType) {
        *self |= ChatMask::from_bits_truncate(t.bit());
    }

    /// spec.md scenario #2: the flood-shutup set of publicly-visible
    /// chat types.
    pub fn flood_shutup_set() -> ChatMask {
        ChatMask::PUB
            | ChatMask::PUB_MACRO
            | ChatMask::FREQ
            | ChatMask::ENEMY_FREQ
            | ChatMask::PRIVATE
            | ChatMask::REMOTE_PRIVATE
            | ChatMask::CHAT
            | ChatMask::MOD_CHAT
            | ChatMask::BILLER_COMMAND
    }
}

/// Outbound reliability/priority classification (spec.md §4.2/§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendFlags {
    pub reliable: bool,
    pub droppable: bool,
    pub priority: i8,
}

impl SendFlags {
    pub const fn unreliable_priority(priority: i8) -> SendFlags {
        SendFlags { reliable: false, droppable: true, priority }
    }

    pub const fn reliable() -> SendFlags {
        SendFlags { reliable: true, droppable: false, priority: 0 }
    }
}

/// spec.md §1: "typed squared-pixels value to avoid latent unit bugs"
/// (Design Notes, "Open question — warp threshold units").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SquaredPixels(pub i64);

impl SquaredPixels {
    pub fn from_delta(delta: i64) -> SquaredPixels {
        SquaredPixels(delta * delta)
    }
}
