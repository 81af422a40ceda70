// commands.rs — the CLI/command surface named in spec.md §6:
// `?spec`, `?energy`, `?watchdamage`, `?redirect`, `?obscene`.
//
// Converted from: myq2-server/src/sv_ccmds.rs's flag-parsing console
// commands (`SV_SetMaster_f`-style: tokenize argv, branch on presence of
// `-`-prefixed switches, mutate server/context state directly) combined
// with myq2-game/src/g_cmds.rs's per-client toggle commands; the
// command *parser* itself is spec.md §1's out-of-scope collaborator
// (`CommandDispatcher` in `collab.rs` is the seam it plugs into), so
// this module only supplies the handler-side behavior each command
// performs once the parser has already tokenized its arguments.

use crate::collab::CapabilityChecker;
use crate::player::{Player, PlayerId};
use crate::watchdamage::{ToggleDamageEffect, WatchDamageRelay};
use zone_proto::{ClientKind, SeeEnergy};

/// Capability gating `?spec`'s listing (spec.md §6 "respecting
/// InvisibleSpectator capability"): a spectator holding it is omitted
/// from the list unless the requester holds it too.
pub const CAP_INVISIBLE_SPECTATOR: &str = "InvisibleSpectator";

/// spec.md §6 "`?spec [priv=player]` — list spectators of self or
/// target". `candidates` is every player in the target's arena;
/// `requester` is who ran the command.
pub fn list_spectators(
    requester: PlayerId,
    target: PlayerId,
    candidates: &[Player],
    capabilities: &dyn CapabilityChecker,
) -> Vec<PlayerId> {
    let requester_sees_invisible = capabilities.has_capability(requester, CAP_INVISIBLE_SPECTATOR);
    candidates
        .iter()
        .filter(|p| p.speccing == Some(target))
        .filter(|p| requester_sees_invisible || !capabilities.has_capability(p.id, CAP_INVISIBLE_SPECTATOR))
        .map(|p| p.id)
        .collect()
}

/// spec.md §6 "`?energy [-t] [-n] [-s]` — toggle energy-view; default
/// `all`, `-t` team, `-n` none, `-s` affects spec mode."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnergyCommandArgs {
    pub team: bool,
    pub none: bool,
    pub spec_mode: bool,
}

/// Parses the already-tokenized argument list following `?energy`
/// (the command parser hands us tokens, not a raw string).
pub fn parse_energy_args<'a>(tokens: impl IntoIterator<Item = &'a str>) -> EnergyCommandArgs {
    let mut args = EnergyCommandArgs::default();
    for token in tokens {
        match token {
            "-t" => args.team = true,
            "-n" => args.none = true,
            "-s" => args.spec_mode = true,
            _ => {}
        }
    }
    args
}

fn resolved_see_energy(args: EnergyCommandArgs) -> SeeEnergy {
    if args.none {
        SeeEnergy::None
    } else if args.team {
        SeeEnergy::Team
    } else {
        SeeEnergy::All
    }
}

/// Applies the parsed `?energy` flags to the invoking player, writing
/// `see_nrg_spec` instead of `see_nrg` when `-s` is present.
pub fn apply_energy_command(player: &mut Player, args: EnergyCommandArgs) {
    let level = resolved_see_energy(args);
    if args.spec_mode {
        player.see_nrg_spec = level;
    } else {
        player.see_nrg = level;
    }
}

/// spec.md §6 "`?obscene` — toggle this player's obscenity filter."
/// Returns the new state.
pub fn toggle_obscenity_filter(player: &mut Player) -> bool {
    player.obscenity_filter = !player.obscenity_filter;
    player.obscenity_filter
}

/// spec.md §6 "`?watchdamage [0|1]` — subscribe/unsubscribe damage
/// watching (arg `0` on arena target clears all)."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchDamageCommandTarget {
    /// Run with no explicit player target: apply to every subject the
    /// invoker currently watches.
    Arena,
    Player(PlayerId),
}

/// `arg` is the optional trailing `0`/`1` token; `None` means "no
/// argument supplied", which behaves like `Some(true)` (subscribe) for
/// a player target and is a no-op for an arena target.
pub fn apply_watchdamage_command(
    relay: &mut WatchDamageRelay,
    invoker: PlayerId,
    target: WatchDamageCommandTarget,
    arg: Option<bool>,
    subject_kind: impl Fn(PlayerId) -> ClientKind,
) -> Vec<(PlayerId, ToggleDamageEffect)> {
    match target {
        WatchDamageCommandTarget::Arena => {
            if arg == Some(false) {
                relay
                    .subjects_watched_by(invoker)
                    .into_iter()
                    .map(|subject| (subject, relay.unsubscribe(subject, invoker)))
                    .filter(|(_, effect)| *effect != ToggleDamageEffect::None)
                    .collect()
            } else {
                Vec::new()
            }
        }
        WatchDamageCommandTarget::Player(subject) => {
            let effect = if arg == Some(false) {
                relay.unsubscribe(subject, invoker)
            } else {
                relay.subscribe(subject, invoker, subject_kind(subject))
            };
            if effect == ToggleDamageEffect::None {
                Vec::new()
            } else {
                vec![(subject, effect)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zone_proto::ClientKind as CK;

    struct CapSet(Vec<(PlayerId, &'static str)>);
    impl CapabilityChecker for CapSet {
        fn has_capability(&self, player: PlayerId, capability: &str) -> bool {
            self.0.iter().any(|&(p, c)| p == player && c == capability)
        }
    }

    fn player(id: PlayerId) -> Player {
        Player::new(id, format!("p{id}"), CK::Continuum, "arena")
    }

    #[test]
    fn spec_list_hides_invisible_spectators_from_ordinary_requester() {
        let mut s1 = player(1);
        s1.speccing = Some(9);
        let mut s2 = player(2);
        s2.speccing = Some(9);
        let candidates = vec![s1, s2];
        let caps = CapSet(vec![(2, CAP_INVISIBLE_SPECTATOR)]);

        let seen_by_plain = list_spectators(3, 9, &candidates, &caps);
        assert_eq!(seen_by_plain, vec![1]);

        let seen_by_privileged = list_spectators(4, 9, &candidates, &CapSet(vec![(4, CAP_INVISIBLE_SPECTATOR)]));
        assert_eq!(seen_by_privileged, vec![1, 2]);
    }

    #[test]
    fn energy_args_default_to_all_and_target_self() {
        let mut p = player(1);
        apply_energy_command(&mut p, parse_energy_args([]));
        assert_eq!(p.see_nrg, SeeEnergy::All);
        assert_eq!(p.see_nrg_spec, SeeEnergy::None);
    }

    #[test]
    fn energy_dash_s_targets_spec_mode_instead() {
        let mut p = player(1);
        apply_energy_command(&mut p, parse_energy_args(["-t", "-s"]));
        assert_eq!(p.see_nrg, SeeEnergy::All);
        assert_eq!(p.see_nrg_spec, SeeEnergy::Team);
    }

    #[test]
    fn energy_dash_n_means_none() {
        let mut p = player(1);
        apply_energy_command(&mut p, parse_energy_args(["-n"]));
        assert_eq!(p.see_nrg, SeeEnergy::None);
    }

    #[test]
    fn obscene_toggle_flips_each_call() {
        let mut p = player(1);
        let initial = p.obscenity_filter;
        assert_eq!(toggle_obscenity_filter(&mut p), !initial);
        assert_eq!(toggle_obscenity_filter(&mut p), initial);
    }

    #[test]
    fn watchdamage_player_target_subscribes_then_unsubscribes() {
        let mut relay = WatchDamageRelay::new();
        let effects = apply_watchdamage_command(
            &mut relay,
            1,
            WatchDamageCommandTarget::Player(9),
            None,
            |_| CK::Continuum,
        );
        assert_eq!(effects, vec![(9, ToggleDamageEffect::Enable)]);

        let effects = apply_watchdamage_command(
            &mut relay,
            1,
            WatchDamageCommandTarget::Player(9),
            Some(false),
            |_| CK::Continuum,
        );
        assert_eq!(effects, vec![(9, ToggleDamageEffect::Disable)]);
    }

    #[test]
    fn watchdamage_arena_target_with_zero_clears_every_subscription() {
        let mut relay = WatchDamageRelay::new();
        relay.subscribe(10, 1, CK::Continuum);
        relay.subscribe(20, 1, CK::Continuum);

        let mut effects = apply_watchdamage_command(
            &mut relay,
            1,
            WatchDamageCommandTarget::Arena,
            Some(false),
            |_| CK::Continuum,
        );
        effects.sort_by_key(|(subject, _)| *subject);
        assert_eq!(effects, vec![(10, ToggleDamageEffect::Disable), (20, ToggleDamageEffect::Disable)]);
        assert!(relay.subjects_watched_by(1).is_empty());
    }

    #[test]
    fn watchdamage_arena_target_without_zero_is_a_no_op() {
        let mut relay = WatchDamageRelay::new();
        relay.subscribe(10, 1, CK::Continuum);
        let effects = apply_watchdamage_command(
            &mut relay,
            1,
            WatchDamageCommandTarget::Arena,
            None,
            |_| CK::Continuum,
        );
        assert!(effects.is_empty());
        assert_eq!(relay.subjects_watched_by(1), vec![10]);
    }
}
