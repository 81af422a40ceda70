// recipient_filter.rs — Recipient Filter (C1). spec.md §4.2.
//
// Converted from: myq2-server/src/sv_ents.rs's PVS-based recipient
// selection (`SV_WriteFrameToClient`'s visibility test against a BSP
// potentially-visible-set), retargeted at Euclidean distance + screen
// resolution instead of BSP leaf visibility.

use zone_common::rng::RngSource;
use zone_proto::{ExtraClass, SeeEnergy, Ship, StatusFlags, WeaponFlags, WeaponType};

use crate::arena::ArenaConfig;
use crate::hypot::int_hypot;
use crate::player::{Player, PlayerId};

/// spec.md §4.2 "Antiwarp masking": applied before recipient selection.
pub fn mask_antiwarp(status: u8, in_safe_zone: bool, no_safe_antiwarp: bool) -> u8 {
    if in_safe_zone && no_safe_antiwarp {
        status & !StatusFlags::ANTIWARP.bits()
    } else {
        status
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendFlagsDecision {
    pub send_to_all: bool,
    pub reliable: bool,
}

/// spec.md §4.2 "Send-to-all override": dropped mine, null-weapon
/// antiwarp sampling, safezone-enter, or flash. The last two force
/// reliable delivery.
pub fn compute_send_to_all(
    weapon: WeaponType,
    weapon_flags: WeaponFlags,
    status: u8,
    safezone_entered: bool,
    antiwarp_send_threshold: u32,
    rng: &mut dyn RngSource,
) -> SendFlagsDecision {
    let dropped_mine = matches!(weapon, WeaponType::Bomb | WeaponType::ProxBomb)
        && weapon_flags.contains(WeaponFlags::ALTERNATE);

    let antiwarp_sample = weapon.is_null()
        && StatusFlags::from_bits_truncate(status).contains(StatusFlags::ANTIWARP)
        && rng.next_u32() < antiwarp_send_threshold;

    let flash = StatusFlags::from_bits_truncate(status).contains(StatusFlags::FLASH);

    let send_to_all = dropped_mine || antiwarp_sample || safezone_entered || flash;
    let reliable = safezone_entered || flash;
    SendFlagsDecision { send_to_all, reliable }
}

/// spec.md §4.2 "Extra-field classification per recipient".
pub fn classify_extra(sender: &Player, recipient: &Player, source_had_extra: bool) -> ExtraClass {
    let same_freq = recipient.freq == sender.freq;
    let recipient_speccing_sender = recipient.speccing == Some(sender.id);

    if recipient.ship == Ship::Spec && recipient.see_epd && recipient_speccing_sender {
        return if source_had_extra { ExtraClass::FullExtra } else { ExtraClass::EnergyOnly };
    }

    if recipient.ship == Ship::Spec {
        let sees = matches!(recipient.see_nrg_spec, SeeEnergy::All)
            || (matches!(recipient.see_nrg_spec, SeeEnergy::Team) && same_freq)
            || (matches!(recipient.see_nrg_spec, SeeEnergy::Spec) && recipient_speccing_sender);
        if sees {
            return ExtraClass::EnergyOnly;
        }
        return ExtraClass::None;
    }

    let sees = matches!(recipient.see_nrg, SeeEnergy::All)
        || (matches!(recipient.see_nrg, SeeEnergy::Team) && same_freq);
    if sees {
        ExtraClass::EnergyOnly
    } else {
        ExtraClass::None
    }
}

/// spec.md §4.2 step 3: the distance/range/radar-sampling inclusion test.
#[allow(clippy::too_many_arguments)]
pub fn recipient_included(
    sender: &Player,
    recipient: &Player,
    has_weapon: bool,
    weapon_range: i32,
    send_to_all: bool,
    position_radar_pixels: i32,
    rng: &mut dyn RngSource,
) -> bool {
    if recipient.id == sender.id && !sender.see_own_position {
        return false;
    }

    let dist = int_hypot(
        (sender.position.x - recipient.position.x) as i64,
        (sender.position.y - recipient.position.y) as i64,
    );
    let screen_range = (recipient.xres + recipient.yres) as i64;
    let range = if has_weapon { (weapon_range as i64).max(screen_range) } else { screen_range };

    if dist <= range {
        return true;
    }
    if send_to_all {
        return true;
    }
    if recipient.speccing == Some(sender.id) {
        return true;
    }
    if recipient.attached_to == Some(sender.id) {
        return true;
    }
    if recipient.see_all_positions {
        return true;
    }

    if !has_weapon && position_radar_pixels > 0 && dist < position_radar_pixels as i64 {
        let threshold = (dist * zone_common::rng::RAND_MAX as i64) / position_radar_pixels as i64 + 1;
        let roll = rng.next_u32() as i64;
        if roll > threshold {
            return true;
        }
    }

    false
}

/// Filters `candidates` down to the set that should receive the
/// sender's position update, paired with each recipient's extra-field
/// classification (spec.md §4.2). `weapon` resolves the per-weapon-code
/// send-range from `arena` (§4.2 step 2: `wpn_range[weapon_type]`)
/// rather than taking a pre-resolved range from the caller.
#[allow(clippy::too_many_arguments)]
pub fn filter_recipients(
    sender: &Player,
    candidates: &[Player],
    weapon: WeaponType,
    arena: &ArenaConfig,
    source_had_extra: bool,
    send_to_all: bool,
    position_radar_pixels: i32,
    rng: &mut dyn RngSource,
) -> Vec<(PlayerId, ExtraClass)> {
    let has_weapon = !weapon.is_null();
    let weapon_range = arena.weapon_range(weapon);
    candidates
        .iter()
        .filter(|r| r.is_playing() && r.kind.is_standard())
        .filter(|r| {
            recipient_included(sender, r, has_weapon, weapon_range, send_to_all, position_radar_pixels, rng)
        })
        .map(|r| (r.id, classify_extra(sender, r, source_had_extra)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use zone_common::rng::FixedRng;
    use zone_proto::ClientKind;

    fn player(id: PlayerId, x: i16, y: i16) -> Player {
        let mut p = Player::new(id, format!("p{id}"), ClientKind::Continuum, "arena");
        p.ship = Ship::Warbird;
        p.position.x = x;
        p.position.y = y;
        p.lifecycle = crate::player::PlayerLifecycle::EnterGame;
        p
    }

    #[test]
    fn self_excluded_unless_see_own_position() {
        let mut sender = player(1, 0, 0);
        let mut rng = FixedRng::always(0);
        assert!(!recipient_included(&sender, &sender.clone(), false, 0, false, 0, &mut rng));
        sender.see_own_position = true;
        assert!(recipient_included(&sender, &sender.clone(), false, 0, false, 0, &mut rng));
    }

    #[test]
    fn within_screen_range_is_included() {
        let sender = player(1, 0, 0);
        let recipient = player(2, 100, 0);
        let mut rng = FixedRng::always(0);
        assert!(recipient_included(&sender, &recipient, false, 0, false, 0, &mut rng));
    }

    #[test]
    fn far_away_excluded_without_override() {
        let sender = player(1, 0, 0);
        let mut recipient = player(2, 5000, 0);
        recipient.xres = 100;
        recipient.yres = 100;
        let mut rng = FixedRng::always(0);
        assert!(!recipient_included(&sender, &recipient, false, 0, false, 0, &mut rng));
    }

    #[test]
    fn spectating_recipient_always_included() {
        let sender = player(1, 0, 0);
        let mut recipient = player(2, 9000, 9000);
        recipient.xres = 10;
        recipient.yres = 10;
        recipient.speccing = Some(1);
        let mut rng = FixedRng::always(0);
        assert!(recipient_included(&sender, &recipient, false, 0, false, 0, &mut rng));
    }

    #[test]
    fn classify_full_extra_for_epd_spectator() {
        let sender = player(1, 0, 0);
        let mut recipient = player(2, 0, 0);
        recipient.ship = Ship::Spec;
        recipient.see_epd = true;
        recipient.speccing = Some(1);
        assert_eq!(classify_extra(&sender, &recipient, true), ExtraClass::FullExtra);
        assert_eq!(classify_extra(&sender, &recipient, false), ExtraClass::EnergyOnly);
    }

    #[test]
    fn classify_none_when_no_visibility_grant() {
        let sender = player(1, 0, 0);
        let recipient = player(2, 0, 0);
        assert_eq!(classify_extra(&sender, &recipient, false), ExtraClass::None);
    }

    #[test]
    fn antiwarp_masked_in_safezone_with_arena_flag() {
        let status = StatusFlags::ANTIWARP.bits();
        assert_eq!(mask_antiwarp(status, true, true), 0);
        assert_eq!(mask_antiwarp(status, true, false), status);
        assert_eq!(mask_antiwarp(status, false, true), status);
    }

    #[test]
    fn flash_and_safezone_force_reliable_send_to_all() {
        let mut rng = FixedRng::always(zone_common::rng::RAND_MAX);
        let decision = compute_send_to_all(
            WeaponType::Null,
            WeaponFlags::empty(),
            StatusFlags::FLASH.bits(),
            false,
            0,
            &mut rng,
        );
        assert!(decision.send_to_all);
        assert!(decision.reliable);
    }

    #[test]
    fn filter_recipients_uses_arena_weapon_range_for_weapon_packets() {
        use zone_common::config::MapConfigSource;

        let mut cfg = MapConfigSource::new();
        cfg.set("Net", "WeaponPixels", "6000");
        let arena = ArenaConfig::from_config(&cfg);

        let sender = player(1, 0, 0);
        let mut far_recipient = player(2, 5000, 0);
        far_recipient.xres = 100;
        far_recipient.yres = 100;
        let candidates = vec![far_recipient];
        let mut rng = FixedRng::always(0);

        // Bomb's configured range (6000) covers the 5000-pixel distance
        // even though the recipient's screen range (200) does not.
        let included = filter_recipients(&sender, &candidates, WeaponType::Bomb, &arena, false, false, 0, &mut rng);
        assert_eq!(included.len(), 1);

        // With no weapon, only the (much smaller) screen range applies.
        let excluded = filter_recipients(&sender, &candidates, WeaponType::Null, &arena, false, false, 0, &mut rng);
        assert!(excluded.is_empty());
    }

    #[test]
    fn dropped_mine_sends_to_all_but_not_reliable() {
        let mut rng = FixedRng::always(zone_common::rng::RAND_MAX);
        let decision = compute_send_to_all(
            WeaponType::Bomb,
            WeaponFlags::ALTERNATE,
            0,
            false,
            0,
            &mut rng,
        );
        assert!(decision.send_to_all);
        assert!(!decision.reliable);
    }
}
