// arena.rs — per-arena config-derived tuning (spec.md §3 "Per-arena core
// state"). Converted from: myq2-server/src/server.rs's plain
// config-derived `Server`/`Cvar`-backed fields, rebuilt here as one
// record re-derived on `ConfChanged` (spec.md "Lifecycles").

use std::collections::HashMap;
use zone_common::config::ConfigSource;
use zone_proto::{ChatMask, Ship, SquaredPixels, WeaponType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonalGreens {
    pub thor: bool,
    pub burst: bool,
    pub brick: bool,
}

#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub region_check_interval: u32,
    pub warp_threshold: SquaredPixels,
    pub no_safe_antiwarp: bool,
    pub fast_bombing_mode: u32,
    pub fast_bombing_threshold: u32,
    /// Per-ship bomb-fire-delay cache, indexed by `Ship as usize`.
    pub bomb_fire_delay: [u32; 9],
    /// Per-weapon-code send-range, indexed by weapon code.
    pub weapon_send_range: HashMap<u16, i32>,
    pub position_radar_pixels: i32,
    pub antiwarp_send_threshold: u32,
    pub antiwarp_range_sq: i64,
    pub enter_delay_ticks: u32,
    pub flagger_kill_multiplier: i32,
    pub flagger_bomb_fire_delay: u32,
    pub personal_greens: PersonalGreens,
    pub spec_see_extra: bool,
    pub spec_see_energy: zone_proto::SeeEnergy,
    pub all_see_energy: zone_proto::SeeEnergy,
    pub max_death_without_firing: u32,
    pub initial_lock_ship: bool,
    pub initial_lock_spec: bool,
    pub arena_chat_mask: ChatMask,
    pub use_teamkill_prize: bool,
    pub teamkill_prize: u16,
    pub message_reliable: bool,
    pub flood_limit: u32,
    pub flood_shutup_secs: u32,
    pub command_limit: usize,
}

impl ArenaConfig {
    /// spec.md §4.1: "enter_delay ≤ 0 clamps to 100 ticks."
    pub fn from_config(cfg: &dyn ConfigSource) -> ArenaConfig {
        let raw_enter_delay = cfg.get_int("Kill", "EnterDelay", 100);
        let enter_delay_ticks = if raw_enter_delay <= 0 { 100 } else { raw_enter_delay as u32 };

        let warp_delta = cfg.get_int("Misc", "WarpThresholdDelta", 320);
        let antiwarp_pixels = cfg.get_int("Toggle", "AntiwarpPixels", 0);

        // spec.md §3 "per-weapon-code send-range[]" / §6 `Net/BulletPixels`,
        // `Net/WeaponPixels`: bullets get their own (usually tighter) range,
        // every other weapon code shares the general weapon range.
        let bullet_pixels = cfg.get_int("Net", "BulletPixels", 0) as i32;
        let weapon_pixels = cfg.get_int("Net", "WeaponPixels", 0) as i32;
        let mut weapon_send_range = HashMap::new();
        for w in [WeaponType::Bullet, WeaponType::BouncingBullet] {
            weapon_send_range.insert(w as u16, bullet_pixels);
        }
        for w in [
            WeaponType::Bomb,
            WeaponType::ProxBomb,
            WeaponType::Repel,
            WeaponType::Decoy,
            WeaponType::Burst,
            WeaponType::Thor,
        ] {
            weapon_send_range.insert(w as u16, weapon_pixels);
        }

        let mut bomb_fire_delay = [0u32; 9];
        for (ship, key) in [
            (0, "Warbird"), (1, "Javelin"), (2, "Spider"), (3, "Leviathan"),
            (4, "Terrier"), (5, "Weasel"), (6, "Lancaster"), (7, "Shark"),
        ] {
            bomb_fire_delay[ship] = cfg.get_int(key, "BombFireDelay", 0).max(0) as u32;
        }

        ArenaConfig {
            region_check_interval: cfg.get_int("Misc", "RegionCheckInterval", 100) as u32,
            warp_threshold: SquaredPixels::from_delta(warp_delta),
            no_safe_antiwarp: cfg.get_bool("Misc", "NoSafeAntiwarp", false),
            fast_bombing_mode: cfg.get_int("Misc", "CheckFastBombing", 0) as u32,
            fast_bombing_threshold: cfg.get_int("Misc", "FastBombingThreshold", 0) as u32,
            bomb_fire_delay,
            weapon_send_range,
            position_radar_pixels: cfg.get_int("Net", "PositionExtraPixels", 0) as i32,
            antiwarp_send_threshold: cfg
                .get_int("Net", "AntiwarpSendPercent", 0)
                .clamp(0, zone_common::rng::RAND_MAX as i64) as u32,
            antiwarp_range_sq: antiwarp_pixels * antiwarp_pixels,
            enter_delay_ticks,
            flagger_kill_multiplier: cfg.get_int("Flag", "FlaggerKillMultiplier", 1) as i32,
            flagger_bomb_fire_delay: cfg.get_int("Flag", "FlaggerBombFireDelay", 0).max(0) as u32,
            personal_greens: PersonalGreens {
                thor: cfg.get_bool("Prize", "DontShareThor", false),
                burst: cfg.get_bool("Prize", "DontShareBurst", false),
                brick: cfg.get_bool("Prize", "DontShareBrick", false),
            },
            spec_see_extra: cfg.get_bool("Misc", "SpecSeeExtra", false),
            spec_see_energy: parse_see_energy(&cfg.get("Misc", "SpecSeeEnergy")),
            all_see_energy: parse_see_energy(&cfg.get("Misc", "SeeEnergy")),
            max_death_without_firing: cfg.get_int("Security", "MaxDeathWithoutFiring", 0) as u32,
            initial_lock_ship: false,
            initial_lock_spec: false,
            arena_chat_mask: ChatMask::empty(),
            use_teamkill_prize: cfg.get_bool("Prize", "UseTeamkillPrize", false),
            teamkill_prize: cfg.get_int("Prize", "TeamkillPrize", 0) as u16,
            message_reliable: cfg.get_bool("Chat", "MessageReliable", true),
            flood_limit: cfg.get_int("Chat", "FloodLimit", 0) as u32,
            flood_shutup_secs: cfg.get_int("Chat", "FloodShutup", 60) as u32,
            command_limit: cfg.get_int("Chat", "CommandLimit", 5) as usize,
        }
    }

    pub fn bomb_fire_delay_for(&self, ship: Ship) -> u32 {
        self.bomb_fire_delay.get(ship as usize).copied().unwrap_or(0)
    }

    /// spec.md §4.2 step 2: `wpn_range[weapon_type]`, the per-weapon-code
    /// send-range consulted by the recipient filter for weapon-carrying
    /// packets. A weapon code with no configured range (including
    /// `WeaponType::Null`, which never reaches this path) sends 0.
    pub fn weapon_range(&self, weapon: WeaponType) -> i32 {
        self.weapon_send_range.get(&(weapon as u16)).copied().unwrap_or(0)
    }
}

fn parse_see_energy(value: &Option<String>) -> zone_proto::SeeEnergy {
    use zone_proto::SeeEnergy::*;
    match value.as_deref() {
        Some("all") => All,
        Some("team") => Team,
        Some("spec") => Spec,
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaRunState {
    Running,
    NotRunning,
}

#[cfg(test)]
mod tests {
    use super::*;
    use zone_common::config::MapConfigSource;

    #[test]
    fn enter_delay_clamps_to_100_when_nonpositive() {
        let mut cfg = MapConfigSource::new();
        cfg.set("Kill", "EnterDelay", "0");
        let arena = ArenaConfig::from_config(&cfg);
        assert_eq!(arena.enter_delay_ticks, 100);

        let mut cfg2 = MapConfigSource::new();
        cfg2.set("Kill", "EnterDelay", "-5");
        let arena2 = ArenaConfig::from_config(&cfg2);
        assert_eq!(arena2.enter_delay_ticks, 100);
    }

    #[test]
    fn warp_threshold_is_squared() {
        let mut cfg = MapConfigSource::new();
        cfg.set("Misc", "WarpThresholdDelta", "320");
        let arena = ArenaConfig::from_config(&cfg);
        assert_eq!(arena.warp_threshold, SquaredPixels(102400));
    }

    #[test]
    fn weapon_send_range_splits_bullets_from_other_weapons() {
        let mut cfg = MapConfigSource::new();
        cfg.set("Net", "BulletPixels", "1000");
        cfg.set("Net", "WeaponPixels", "2000");
        let arena = ArenaConfig::from_config(&cfg);
        assert_eq!(arena.weapon_range(WeaponType::Bullet), 1000);
        assert_eq!(arena.weapon_range(WeaponType::BouncingBullet), 1000);
        assert_eq!(arena.weapon_range(WeaponType::Bomb), 2000);
        assert_eq!(arena.weapon_range(WeaponType::Thor), 2000);
        assert_eq!(arena.weapon_range(WeaponType::Null), 0);
    }

    #[test]
    fn fast_bombing_threshold_ge_delay_never_triggers() {
        let mut cfg = MapConfigSource::new();
        cfg.set("Misc", "FastBombingThreshold", "100");
        let arena = ArenaConfig::from_config(&cfg);
        let ship_delay: u32 = 50;
        let min_dt = ship_delay.saturating_sub(arena.fast_bombing_threshold as u32);
        assert_eq!(min_dt, 0);
    }
}
