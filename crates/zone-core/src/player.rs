// player.rs — per-connected-client state (spec.md §3 "Player").
// Converted from: myq2-server/src/server.rs's `Client` struct (a plain
// field-by-field record with a hand-written `Default`), retargeted at
// the ship/freq/spec/chat fields the zone engine actually tracks.

use zone_common::rng::RAND_MAX;
use zone_proto::{ChatMask, ClientKind, Ship};

pub type PlayerId = u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerLifecycle {
    Connected,
    PreEnterArena,
    EnterArena,
    EnterGame,
    LeaveArena,
    Disconnect,
}

/// spec.md §3 "position": last C2S position snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionSnapshot {
    pub rotation: u8,
    pub time: u32,
    pub x: i16,
    pub y: i16,
    pub xspeed: i16,
    pub yspeed: i16,
    pub bounty: u16,
    pub status: u8,
    pub energy: i16,
    pub weapon: u16,
}

/// spec.md §3 "chat_mask" carrier, also the persisted `Chat` blob layout
/// named in spec.md §6.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatState {
    pub mask: ChatMask,
    pub mask_expires: Option<u32>,
    pub message_count: u32,
    pub last_check: u32,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub kind: ClientKind,
    pub home_arena: String,
    pub arena: Option<String>,
    pub xres: u16,
    pub yres: u16,

    pub ship: Ship,
    pub freq: i16,
    pub attached_to: Option<PlayerId>,

    pub is_dead: bool,
    pub sent_position: bool,
    pub sent_weapon: bool,
    pub during_change: bool,
    pub see_own_position: bool,
    pub see_all_positions: bool,
    pub obscenity_filter: bool,

    pub position: PositionSnapshot,
    pub last_position_ship: Ship,

    /// spec.md §3 "speccing": weak back-reference, never ownership.
    pub speccing: Option<PlayerId>,
    pub epd_player_watch_count: u32,
    pub epd_module_watch_count: u32,
    pub see_epd: bool,
    pub see_nrg: zone_proto::SeeEnergy,
    pub see_nrg_spec: zone_proto::SeeEnergy,

    pub ignore_weapons: u32,
    pub death_without_firing: u32,
    pub last_bomb_tick: Option<u32>,
    pub last_region_set: Vec<String>,
    pub map_region_no_anti: bool,
    pub map_region_no_weapons: bool,

    pub lock_ship: Option<Ship>,
    pub lock_expires: Option<u32>,

    pub chat: ChatState,

    pub last_death: u32,
    pub next_respawn: u32,
    pub flags_carried: u16,

    pub last_region_check: u32,
    pub lifecycle: PlayerLifecycle,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, kind: ClientKind, home_arena: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            home_arena: home_arena.into(),
            arena: None,
            xres: 1024,
            yres: 768,
            ship: Ship::Spec,
            freq: 9999,
            attached_to: None,
            is_dead: false,
            sent_position: false,
            sent_weapon: false,
            during_change: false,
            see_own_position: false,
            see_all_positions: false,
            obscenity_filter: true,
            position: PositionSnapshot::default(),
            last_position_ship: Ship::Spec,
            speccing: None,
            epd_player_watch_count: 0,
            epd_module_watch_count: 0,
            see_epd: false,
            see_nrg: zone_proto::SeeEnergy::None,
            see_nrg_spec: zone_proto::SeeEnergy::None,
            ignore_weapons: 0,
            death_without_firing: 0,
            last_bomb_tick: None,
            last_region_set: Vec::new(),
            map_region_no_anti: false,
            map_region_no_weapons: false,
            lock_ship: None,
            lock_expires: None,
            chat: ChatState::default(),
            last_death: 0,
            next_respawn: 0,
            flags_carried: 0,
            last_region_check: 0,
            lifecycle: PlayerLifecycle::Connected,
        }
    }

    /// spec.md §3: "Player state is... reset on PreEnterArena".
    pub fn reset_for_arena_entry(&mut self) {
        self.ship = Ship::Spec;
        self.freq = 9999;
        self.attached_to = None;
        self.is_dead = false;
        self.sent_position = false;
        self.sent_weapon = false;
        self.during_change = false;
        self.position = PositionSnapshot::default();
        self.last_position_ship = Ship::Spec;
        self.speccing = None;
        self.epd_player_watch_count = 0;
        self.ignore_weapons = 0;
        self.death_without_firing = 0;
        self.last_bomb_tick = None;
        self.last_region_set.clear();
        self.map_region_no_anti = false;
        self.map_region_no_weapons = false;
        self.lock_ship = None;
        self.lock_expires = None;
        self.flags_carried = 0;
    }

    pub fn is_playing(&self) -> bool {
        !self.ship.is_spec()
    }

    /// spec.md §7: "HasLock ⇒ false" as the neutral default when state
    /// can't be resolved; here the lock itself carries that default.
    pub fn has_lock(&self, now: u32) -> bool {
        match self.lock_expires {
            Some(expiry) if now >= expiry => false,
            _ => self.lock_ship.is_some(),
        }
    }

    /// spec.md §4.4 "expire the lock clock", called lazily on every
    /// relevant entry point (spec.md §5 "Cancellation / timeouts").
    pub fn expire_lock(&mut self, now: u32) {
        if let Some(expiry) = self.lock_expires {
            if now >= expiry {
                self.lock_ship = None;
                self.lock_expires = None;
            }
        }
    }

    /// spec.md §7: "GetIgnoreWeapons ⇒ 0" neutral default is simply the
    /// field's zero value; `ignore_weapons` is in `[0, RAND_MAX]`.
    pub fn ignore_weapons_clamped(&self) -> u32 {
        self.ignore_weapons.min(RAND_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_expires_lazily() {
        let mut p = Player::new(1, "p1", ClientKind::Continuum, "home");
        p.lock_ship = Some(Ship::Spec);
        p.lock_expires = Some(100);
        assert!(p.has_lock(50));
        assert!(!p.has_lock(150));
        p.expire_lock(150);
        assert!(p.lock_ship.is_none());
    }

    #[test]
    fn reset_clears_gameplay_state_but_keeps_identity() {
        let mut p = Player::new(1, "p1", ClientKind::Continuum, "home");
        p.ship = Ship::Warbird;
        p.is_dead = true;
        p.speccing = Some(2);
        p.reset_for_arena_entry();
        assert_eq!(p.ship, Ship::Spec);
        assert!(!p.is_dead);
        assert!(p.speccing.is_none());
        assert_eq!(p.name, "p1");
    }
}
