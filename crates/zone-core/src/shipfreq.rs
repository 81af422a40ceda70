// shipfreq.rs — Ship/Freq State Machine (C4). spec.md §4.4.
//
// Converted from: myq2-server/src/sv_user.rs's `SV_BeginDemoServer`-style
// connect/state-transition gate (validate, consult a callback, commit,
// fire the settled-state callback) combined with myq2-game's damage/
// death handling in `g_combat.rs` for the kill-advisor chain and prize
// selection, retargeted at ship/freq transitions and spectating.

use zone_common::rng::RngSource;
use zone_proto::Ship;

use crate::hooks::{AdvisorChain, FreqManagerAdvisor, KillAdvisor, KillEvent, KillGreenAdvisor};
use crate::player::{Player, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleEpd {
    None,
    Enable,
    Disable,
}

/// spec.md §4.4 "Clear spec".
pub fn clear_spec(spectator: &mut Player, target: &mut Player) -> ToggleEpd {
    if spectator.speccing.is_none() {
        return ToggleEpd::None;
    }
    let mut effect = ToggleEpd::None;
    if spectator.see_epd {
        target.epd_player_watch_count = target.epd_player_watch_count.saturating_sub(1);
        if target.epd_player_watch_count == 0 {
            effect = ToggleEpd::Disable;
        }
    }
    spectator.speccing = None;
    effect
}

/// spec.md §4.4 "Install spec".
pub fn install_spec(spectator: &mut Player, target: &Player) -> ToggleEpd {
    spectator.speccing = Some(target.id);
    ToggleEpd::None
}

/// Mirrors `install_spec` but additionally owns the target's refcount,
/// which requires mutable access to a second player. Split from
/// `install_spec` so callers with only a read-only target (no EPD
/// interest) can skip the refcount entirely.
pub fn install_spec_with_epd(spectator: &mut Player, target: &mut Player) -> ToggleEpd {
    spectator.speccing = Some(target.id);
    if !spectator.see_epd {
        return ToggleEpd::None;
    }
    let was_zero = target.epd_player_watch_count == 0;
    target.epd_player_watch_count += 1;
    if was_zero {
        ToggleEpd::Enable
    } else {
        ToggleEpd::None
    }
}

/// spec.md §4.4 "Spec-request": is `target` eligible to be spectated by
/// `spectator` in the same arena.
pub fn spec_target_valid(target: &Player, same_arena: bool) -> bool {
    same_arena && target.is_playing()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipChangeRejection {
    DuringChange,
    SameShip,
    Locked,
}

/// spec.md §4.4 "Ship-change request" gate, pre freq-manager consult.
pub fn ship_change_allowed(
    during_change: bool,
    current_ship: Ship,
    requested_ship: Ship,
    locked: bool,
    bypass_lock: bool,
) -> Result<(), ShipChangeRejection> {
    if during_change {
        return Err(ShipChangeRejection::DuringChange);
    }
    if current_ship == requested_ship {
        return Err(ShipChangeRejection::SameShip);
    }
    if locked && !bypass_lock && requested_ship != Ship::Spec {
        return Err(ShipChangeRejection::Locked);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnReason {
    Initial,
    AfterDeath,
    None,
}

/// Callbacks fired from the main work queue (spec.md §4.4 "Fire
/// PreShipFreqChange then ShipFreqChange via the main-thread work
/// queue"). Kept separate from `PositionEventSink` since these run on a
/// different thread discipline (spec.md §5).
pub trait ShipFreqEventSink: Send + Sync {
    fn on_before_ship_freq_change(&self, _player: &Player, _new_ship: Ship, _new_freq: i16) {}
    fn on_pre_ship_freq_change(&self, _player: &Player) {}
    fn on_ship_freq_change(&self, _player: &Player) {}
    fn on_spawn(&self, _player: &Player, _reason: SpawnReason) {}
    fn on_spectate_changed(&self, _spectator: &Player) {}
    fn on_kill(&self, _event: &KillEvent) {}
}

pub struct NoOpShipFreqEventSink;
impl ShipFreqEventSink for NoOpShipFreqEventSink {}

/// spec.md §4.4 "Commit ship/freq change". Caller has already decided
/// the final (ship, freq) via the freq-manager; this applies the
/// transition and fires the ordered callback sequence.
pub fn commit_ship_freq_change(
    player: &mut Player,
    new_ship: Ship,
    new_freq: i16,
    events: &dyn ShipFreqEventSink,
) {
    events.on_before_ship_freq_change(player, new_ship, new_freq);

    player.during_change = true;
    let was_spec = player.ship == Ship::Spec;
    player.ship = new_ship;
    player.freq = new_freq;
    if was_spec && new_ship != Ship::Spec {
        player.speccing = None;
    }

    events.on_pre_ship_freq_change(player);
    events.on_ship_freq_change(player);

    let mut reason = SpawnReason::None;
    if player.is_dead {
        player.is_dead = false;
        reason = SpawnReason::AfterDeath;
    }
    if was_spec && new_ship != Ship::Spec {
        reason = if reason == SpawnReason::AfterDeath { SpawnReason::AfterDeath } else { SpawnReason::Initial };
    }
    events.on_spawn(player, reason);
}

/// Called once the transport has acknowledged the reliable `ShipChange`
/// send to the acting player (spec.md §5 ordering guarantee).
pub fn clear_during_change(player: &mut Player) {
    player.during_change = false;
}

/// spec.md §4.4 "Death": picks the green prize. Team-kill prize wins
/// when configured and killer/victim share a freq; otherwise a uniform
/// draw against `RandMax` picks among the supplied prize table.
pub fn pick_green(
    killer_freq: i16,
    victim_freq: i16,
    use_teamkill_prize: bool,
    teamkill_prize: u16,
    prize_table: &[u16],
    rng: &mut dyn RngSource,
) -> u16 {
    if use_teamkill_prize && killer_freq == victim_freq {
        return teamkill_prize;
    }
    if prize_table.is_empty() {
        return 0;
    }
    let idx = (rng.next_u32() as usize) % prize_table.len();
    prize_table[idx]
}

pub struct DeathOutcome {
    pub event: KillEvent,
    pub green: u16,
    pub flags_transferred: u16,
    pub total_points: i32,
}

/// spec.md §4.4 "Death" end to end, except the actual `S2C_Kill` send
/// and stat recording (transport/storage concerns out of scope here).
///
/// `killer_is_flagger`/`flagger_kill_multiplier` implement "Apply
/// `flagger_kill_multiplier` locally after sending (because clients
/// apply it themselves on receipt)": the multiplier only scales the
/// locally-recorded point total, never the wire `S2C_Kill.bounty` the
/// client independently multiplies on its own.
#[allow(clippy::too_many_arguments)]
pub fn apply_death(
    victim: &mut Player,
    now: u32,
    enter_delay: u32,
    mut event: KillEvent,
    kill_advisors: &AdvisorChain<dyn KillAdvisor>,
    kill_green_advisors: &AdvisorChain<dyn KillGreenAdvisor>,
    green_if_dropped: u16,
    flags_to_transfer: u16,
    max_death_without_firing: u32,
    killer_is_flagger: bool,
    flagger_kill_multiplier: i32,
) -> DeathOutcome {
    victim.is_dead = true;
    victim.last_death = now;
    victim.next_respawn = now + enter_delay;

    for advisor in kill_advisors.iter() {
        advisor.advise(&mut event);
    }

    let mut green = green_if_dropped;
    for advisor in kill_green_advisors.iter() {
        green = advisor.rewrite_green(&event, green);
    }
    // Each kill-advisor mutates event.points in place, so the chain
    // already accumulates the total (spec.md §4.4 "sum points across
    // advisors") before the flagger multiplier is applied on top.
    let mut total_points = event.points;
    if killer_is_flagger {
        total_points *= flagger_kill_multiplier;
    }

    if !victim.sent_weapon {
        victim.death_without_firing += 1;
        if victim.death_without_firing >= max_death_without_firing && max_death_without_firing > 0 {
            victim.ship = Ship::Spec;
        }
    }
    victim.sent_weapon = false;

    DeathOutcome { event, green, flags_transferred: flags_to_transfer, total_points }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockUpdate {
    pub force_spec: bool,
    pub lock_ship: Option<Ship>,
    pub lock_expires: Option<u32>,
}

/// spec.md §4.4 "Lock/Unlock".
pub fn apply_lock(player: &mut Player, update: LockUpdate) {
    if update.force_spec {
        player.ship = Ship::Spec;
    }
    player.lock_ship = update.lock_ship;
    player.lock_expires = update.lock_expires;
}

pub fn unlock(player: &mut Player) {
    player.lock_ship = None;
    player.lock_expires = None;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachRejection {
    DifferentArena,
    DifferentFreq,
    SelfAttach,
    TargetNotPlaying,
}

/// spec.md §4.4 "Attach/turret-kickoff" validation. `target` is `None`
/// for detach (`-1` on the wire).
pub fn validate_attach(
    same_arena: bool,
    same_freq: bool,
    self_id: PlayerId,
    target: Option<(PlayerId, bool)>,
) -> Result<(), AttachRejection> {
    if !same_arena {
        return Err(AttachRejection::DifferentArena);
    }
    if !same_freq {
        return Err(AttachRejection::DifferentFreq);
    }
    if let Some((target_id, target_playing)) = target {
        if target_id == self_id {
            return Err(AttachRejection::SelfAttach);
        }
        if !target_playing {
            return Err(AttachRejection::TargetNotPlaying);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zone_common::rng::FixedRng;
    use zone_proto::ClientKind;

    fn player(id: PlayerId) -> Player {
        Player::new(id, format!("p{id}"), ClientKind::Continuum, "arena")
    }

    #[test]
    fn install_then_clear_spec_toggles_epd_at_transitions() {
        let mut spectator = player(1);
        spectator.see_epd = true;
        let mut target = player(2);

        let enable = install_spec_with_epd(&mut spectator, &mut target);
        assert_eq!(enable, ToggleEpd::Enable);
        assert_eq!(target.epd_player_watch_count, 1);

        let disable = clear_spec(&mut spectator, &mut target);
        assert_eq!(disable, ToggleEpd::Disable);
        assert_eq!(target.epd_player_watch_count, 0);
        assert!(spectator.speccing.is_none());
    }

    #[test]
    fn second_spectator_does_not_retoggle() {
        let mut s1 = player(1);
        s1.see_epd = true;
        let mut s2 = player(2);
        s2.see_epd = true;
        let mut target = player(3);

        assert_eq!(install_spec_with_epd(&mut s1, &mut target), ToggleEpd::Enable);
        assert_eq!(install_spec_with_epd(&mut s2, &mut target), ToggleEpd::None);
    }

    #[test]
    fn ship_change_rejects_during_change_and_same_ship() {
        assert_eq!(
            ship_change_allowed(true, Ship::Warbird, Ship::Javelin, false, false),
            Err(ShipChangeRejection::DuringChange)
        );
        assert_eq!(
            ship_change_allowed(false, Ship::Warbird, Ship::Warbird, false, false),
            Err(ShipChangeRejection::SameShip)
        );
        assert_eq!(
            ship_change_allowed(false, Ship::Spec, Ship::Javelin, true, false),
            Err(ShipChangeRejection::Locked)
        );
        assert_eq!(ship_change_allowed(false, Ship::Spec, Ship::Javelin, true, true), Ok(()));
    }

    #[test]
    fn commit_clears_own_speccing_when_leaving_spec() {
        let mut p = player(1);
        p.ship = Ship::Spec;
        p.speccing = Some(2);
        commit_ship_freq_change(&mut p, Ship::Warbird, 5, &NoOpShipFreqEventSink);
        assert_eq!(p.ship, Ship::Warbird);
        assert_eq!(p.freq, 5);
        assert!(p.speccing.is_none());
    }

    #[test]
    fn commit_clears_dead_flag_with_after_death_reason() {
        struct Spy(std::sync::Mutex<Vec<SpawnReason>>);
        impl ShipFreqEventSink for Spy {
            fn on_spawn(&self, _player: &Player, reason: SpawnReason) {
                self.0.lock().unwrap().push(reason);
            }
        }
        let spy = Spy(std::sync::Mutex::new(Vec::new()));
        let mut p = player(1);
        p.is_dead = true;
        commit_ship_freq_change(&mut p, Ship::Warbird, 0, &spy);
        assert!(!p.is_dead);
        assert_eq!(spy.0.lock().unwrap()[0], SpawnReason::AfterDeath);
    }

    #[test]
    fn teamkill_prize_wins_over_random_draw() {
        let mut rng = FixedRng::always(0);
        let prize = pick_green(5, 5, true, 99, &[1, 2, 3], &mut rng);
        assert_eq!(prize, 99);
    }

    #[test]
    fn death_without_firing_threshold_forces_spec() {
        let mut victim = player(1);
        victim.ship = Ship::Warbird;
        victim.sent_weapon = false;
        victim.death_without_firing = 2;
        let kill_advisors = AdvisorChain::new();
        let green_advisors = AdvisorChain::new();
        let event = KillEvent { killer: Some(2), victim: Some(1), bounty: 10, points: 1 };
        let _ = apply_death(
            &mut victim, 100, 300, event, &kill_advisors, &green_advisors, 0, 0, 3, false, 1,
        );
        assert_eq!(victim.ship, Ship::Spec);
    }

    #[test]
    fn flagger_kill_multiplier_scales_points_locally_only() {
        let mut victim = player(1);
        victim.ship = Ship::Warbird;
        victim.sent_weapon = true;
        let kill_advisors = AdvisorChain::new();
        let green_advisors = AdvisorChain::new();
        let event = KillEvent { killer: Some(2), victim: Some(1), bounty: 10, points: 3 };
        let outcome = apply_death(
            &mut victim, 100, 300, event, &kill_advisors, &green_advisors, 0, 0, 3, true, 5,
        );
        assert_eq!(outcome.total_points, 15);
        assert_eq!(outcome.event.bounty, 10); // wire-facing event is untouched by the local multiplier

        let mut victim2 = player(1);
        victim2.sent_weapon = true;
        let event2 = KillEvent { killer: Some(2), victim: Some(1), bounty: 10, points: 3 };
        let outcome2 = apply_death(
            &mut victim2, 100, 300, event2, &kill_advisors, &green_advisors, 0, 0, 3, false, 5,
        );
        assert_eq!(outcome2.total_points, 3);
    }

    #[test]
    fn attach_rejects_cross_arena_and_self() {
        assert_eq!(validate_attach(false, true, 1, Some((2, true))), Err(AttachRejection::DifferentArena));
        assert_eq!(validate_attach(true, true, 1, Some((1, true))), Err(AttachRejection::SelfAttach));
        assert_eq!(validate_attach(true, true, 1, None), Ok(()));
    }
}
