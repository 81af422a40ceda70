// dispatch.rs — Position Dispatcher (C3). spec.md §4.1.
//
// Converted from: myq2-server/src/sv_user.rs's `SV_ClientThink`-style
// per-packet gate (precondition checks, snapshot update, then event
// callbacks) combined with myq2-server/src/sv_ents.rs's per-frame state
// advance, retargeted at the position/weapon packet's derived events
// (safezone, warp, fast-bomb, region, zombie clearance) instead of
// entity-frame deltas.

use zone_common::log::zlog_malicious;
use zone_proto::c2s::C2sPosition;
use zone_proto::{StatusFlags, WeaponType};

use crate::arena::ArenaConfig;
use crate::hooks::{AdvisorChain, PositionAdvisor};
use crate::player::{Player, PositionSnapshot};
use crate::region::{diff_regions, no_anti_flag, no_weapons_flag, tile_coords, RegionLookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    WrongLength,
    BadChecksum,
    KeepAlive,
    Stale,
}

/// spec.md §4.1 "per fast_bombing_mode bitmask, do any of: sysop-alert
/// chat, null-out the weapon type (filter), kick the player."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FastBombActions {
    pub sysop_alert: bool,
    pub filter_weapon: bool,
    pub kick: bool,
}

pub const FAST_BOMB_MODE_ALERT: u32 = 0x1;
pub const FAST_BOMB_MODE_FILTER: u32 = 0x2;
pub const FAST_BOMB_MODE_KICK: u32 = 0x4;

pub fn fast_bomb_actions(mode: u32) -> FastBombActions {
    FastBombActions {
        sysop_alert: mode & FAST_BOMB_MODE_ALERT != 0,
        filter_weapon: mode & FAST_BOMB_MODE_FILTER != 0,
        kick: mode & FAST_BOMB_MODE_KICK != 0,
    }
}

/// Callbacks fired on the receiving thread (spec.md §5: "fired on the
/// receiving thread and must be treated as reentrant-safe").
pub trait PositionEventSink: Send + Sync {
    fn on_safezone_transition(&self, _player: &Player, _entered: bool) {}
    fn on_warp(&self, _player: &Player, _old: (i16, i16), _new: (i16, i16)) {}
    fn on_fast_bomb(&self, _player: &Player, _weapon: WeaponType, _actions: FastBombActions) {}
    fn on_region_enter(&self, _player: &Player, _region: &str) {}
    fn on_region_exit(&self, _player: &Player, _region: &str) {}
    fn on_enter_game(&self, _player: &Player) {}
    fn on_spawn_after_death(&self, _player: &Player) {}
}

pub struct NoOpEventSink;
impl PositionEventSink for NoOpEventSink {}

fn snapshot_from_wire(pos: &C2sPosition) -> PositionSnapshot {
    PositionSnapshot {
        rotation: pos.rotation,
        time: pos.time,
        x: pos.x,
        y: pos.y,
        xspeed: pos.xspeed,
        yspeed: pos.yspeed,
        bounty: pos.bounty,
        status: pos.status,
        energy: pos.energy,
        weapon: pos.weapon,
    }
}

pub fn is_newer(stored_time: u32, incoming_time: u32) -> bool {
    incoming_time > stored_time
}

/// spec.md §4.1: "a plain non-newer packet with no weapon is dropped."
pub fn should_dispatch(newer: bool, has_weapon: bool) -> bool {
    newer || has_weapon
}

/// spec.md §4.1 "Safe-zone transition": returns `Some(entered)` iff the
/// safezone bit differs between `old` and `incoming`.
pub fn safezone_transition(old_status: u8, incoming_status: u8) -> Option<bool> {
    let old_bit = StatusFlags::from_bits_truncate(old_status).contains(StatusFlags::SAFEZONE);
    let new_bit = StatusFlags::from_bits_truncate(incoming_status).contains(StatusFlags::SAFEZONE);
    if old_bit == new_bit {
        None
    } else {
        Some(new_bit)
    }
}

#[allow(clippy::too_many_arguments)]
pub fn warp_detected(
    flash_toggled: bool,
    is_in_ship: bool,
    ship_matches_last_position_ship: bool,
    sent_position: bool,
    is_dead: bool,
    old: (i16, i16),
    incoming: (i16, i16),
    warp_threshold_sq: i64,
) -> bool {
    if !(flash_toggled && is_in_ship && ship_matches_last_position_ship && sent_position && !is_dead) {
        return false;
    }
    let dx = (incoming.0 - old.0) as i64;
    let dy = (incoming.1 - old.1) as i64;
    dx * dx + dy * dy > warp_threshold_sq
}

/// spec.md §4.1 "Fast-bomb": the effective minimum inter-shot delay,
/// taking the smaller of the ship's delay and the flagger override.
pub fn fast_bomb_min_delta(
    ship_bomb_fire_delay: u32,
    fast_bombing_threshold: u32,
    flagger_bomb_fire_delay: u32,
    is_flagger: bool,
) -> u32 {
    let base = ship_bomb_fire_delay.saturating_sub(fast_bombing_threshold);
    if is_flagger && flagger_bomb_fire_delay > 0 {
        let alt = flagger_bomb_fire_delay.saturating_sub(fast_bombing_threshold);
        base.min(alt)
    } else {
        base
    }
}

pub fn fast_bomb_triggered(now_time: u32, last_bomb_tick: u32, min_delta: u32) -> bool {
    let dt = now_time.abs_diff(last_bomb_tick);
    dt < min_delta
}

/// spec.md §4.1 "Zombie-state clearance": accept position packets up to
/// half a second (50 ticks) before the expected respawn.
pub fn zombie_clears(is_dead: bool, now: u32, last_death: u32, next_respawn: u32) -> bool {
    is_dead && now.saturating_sub(last_death) >= 50 && next_respawn.saturating_sub(now) <= 50
}

pub struct PositionOutcome {
    pub rejected: Option<RejectReason>,
    /// The snapshot to hand to the recipient filter / packet shaper,
    /// after advisor edits. `None` when the packet was rejected, dropped
    /// as stale, or an advisor set negative coordinates.
    pub dispatch_snapshot: Option<PositionSnapshot>,
    pub has_weapon: bool,
    pub fired_enter_game: bool,
    pub fired_spawn_after_death: bool,
}

pub struct PositionDispatcher {
    pub position_advisors: AdvisorChain<dyn PositionAdvisor>,
}

impl Default for PositionDispatcher {
    fn default() -> Self {
        Self { position_advisors: AdvisorChain::new() }
    }
}

impl PositionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// spec.md §4.1 end to end: preconditions, checksum/keepalive
    /// rejection, snapshot update rule, derived events, editability,
    /// first-packet and zombie-state side effects.
    #[allow(clippy::too_many_arguments)]
    pub fn process_position(
        &self,
        sender: &mut Player,
        arena: &ArenaConfig,
        region_lookup: &dyn RegionLookup,
        body: &[u8],
        type_byte: u8,
        is_fake: bool,
        now: u32,
        events: &dyn PositionEventSink,
    ) -> PositionOutcome {
        let Some(pos) = C2sPosition::decode(body) else {
            zlog_malicious(sender.id, "position packet has invalid length");
            return PositionOutcome {
                rejected: Some(RejectReason::WrongLength),
                dispatch_snapshot: None,
                has_weapon: false,
                fired_enter_game: false,
                fired_spawn_after_death: false,
            };
        };

        if !is_fake && !pos.checksum_is_valid(type_byte) {
            zlog_malicious(sender.id, "position packet checksum invalid");
            return PositionOutcome {
                rejected: Some(RejectReason::BadChecksum),
                dispatch_snapshot: None,
                has_weapon: false,
                fired_enter_game: false,
                fired_spawn_after_death: false,
            };
        }

        if pos.is_keepalive() {
            return PositionOutcome {
                rejected: Some(RejectReason::KeepAlive),
                dispatch_snapshot: None,
                has_weapon: false,
                fired_enter_game: false,
                fired_spawn_after_death: false,
            };
        }

        let incoming = snapshot_from_wire(&pos);
        let weapon_kind = WeaponType::from_u16(incoming.weapon);
        let has_weapon = !weapon_kind.is_null();
        let newer = is_newer(sender.position.time, incoming.time);

        if !should_dispatch(newer, has_weapon) {
            return PositionOutcome {
                rejected: Some(RejectReason::Stale),
                dispatch_snapshot: None,
                has_weapon,
                fired_enter_game: false,
                fired_spawn_after_death: false,
            };
        }

        let old = sender.position;

        if let Some(entered) = safezone_transition(old.status, incoming.status) {
            events.on_safezone_transition(sender, entered);
        }

        let flash_toggled = (old.status ^ incoming.status) & StatusFlags::FLASH.bits() != 0;
        if warp_detected(
            flash_toggled,
            sender.is_playing(),
            sender.last_position_ship == sender.ship,
            sender.sent_position,
            sender.is_dead,
            (old.x, old.y),
            (incoming.x, incoming.y),
            arena.warp_threshold.0,
        ) {
            events.on_warp(sender, (old.x, old.y), (incoming.x, incoming.y));
        }

        if weapon_kind.is_bomb_like() {
            if let Some(last_tick) = sender.last_bomb_tick {
                let is_flagger = sender.flags_carried > 0;
                let min_delta = fast_bomb_min_delta(
                    arena.bomb_fire_delay_for(sender.ship),
                    arena.fast_bombing_threshold,
                    arena.flagger_bomb_fire_delay,
                    is_flagger,
                );
                if fast_bomb_triggered(incoming.time, last_tick, min_delta) {
                    events.on_fast_bomb(sender, weapon_kind, fast_bomb_actions(arena.fast_bombing_mode));
                }
            }
            if newer {
                sender.last_bomb_tick = Some(incoming.time);
            }
        }

        if newer && !is_fake && now.saturating_sub(sender.last_region_check) >= arena.region_check_interval {
            let (tx, ty) = tile_coords(incoming.x, incoming.y);
            let new_regions = region_lookup.regions_at(tx, ty);
            let diff = diff_regions(&sender.last_region_set, &new_regions);
            for region in &diff.entered {
                events.on_region_enter(sender, region);
            }
            for region in &diff.exited {
                events.on_region_exit(sender, region);
            }
            sender.map_region_no_anti = no_anti_flag(&new_regions, &region_lookup.no_anti_regions());
            sender.map_region_no_weapons = no_weapons_flag(&new_regions, &region_lookup.no_weapons_regions());
            sender.last_region_set = new_regions;
            sender.last_region_check = now;
        }

        let mut dispatch_snapshot = incoming;
        let mut continued = true;
        for advisor in self.position_advisors.iter() {
            continued = advisor.advise(sender, &mut dispatch_snapshot) && continued;
        }
        let dropped_by_advisor = !continued || dispatch_snapshot.x < 0 || dispatch_snapshot.y < 0;

        if newer || is_fake {
            sender.position = incoming;
            sender.last_position_ship = sender.ship;
        }

        let mut fired_enter_game = false;
        if !sender.sent_position && !is_fake {
            sender.sent_position = true;
            events.on_enter_game(sender);
            fired_enter_game = true;
        }

        let mut fired_spawn_after_death = false;
        if zombie_clears(sender.is_dead, now, sender.last_death, sender.next_respawn) {
            sender.is_dead = false;
            events.on_spawn_after_death(sender);
            fired_spawn_after_death = true;
        }

        PositionOutcome {
            rejected: None,
            dispatch_snapshot: if dropped_by_advisor { None } else { Some(dispatch_snapshot) },
            has_weapon,
            fired_enter_game,
            fired_spawn_after_death,
        }
    }
}
