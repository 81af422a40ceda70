// watchdamage.rs — Watch-Damage Relay (C9). spec.md §4.9.
//
// Converted from: myq2-server/src/sv_lag_compensation.rs's per-subject
// subscriber-set bookkeeping pattern (track who is watching whom, fire
// a toggle on the first/last subscriber), retargeted at damage-report
// relaying instead of lag-compensation replay.

use std::collections::{HashMap, HashSet};
use zone_proto::c2s::DamageEntry;
use zone_proto::ClientKind;

use crate::player::PlayerId;

#[derive(Default)]
struct Subscription {
    subscribers: HashSet<PlayerId>,
    callback_count: u32,
}

impl Subscription {
    fn watch_count(&self) -> usize {
        self.subscribers.len() + self.callback_count as usize
    }
}

/// spec.md §4.9: "Subscription: a per-subject set of subscriber players
/// plus a callback-watch refcount."
#[derive(Default)]
pub struct WatchDamageRelay {
    by_subject: HashMap<PlayerId, Subscription>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleDamageEffect {
    None,
    Enable,
    Disable,
}

impl WatchDamageRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// spec.md §4.9: "Adding the first subscription (refcount
    /// transitioning 0->1) and only when the subject is Continuum-
    /// protocol, send S2C_ToggleDamage(1) to the subject."
    pub fn subscribe(
        &mut self,
        subject: PlayerId,
        subscriber: PlayerId,
        subject_kind: ClientKind,
    ) -> ToggleDamageEffect {
        let entry = self.by_subject.entry(subject).or_default();
        let was_zero = entry.watch_count() == 0;
        entry.subscribers.insert(subscriber);
        if was_zero && entry.watch_count() == 1 && subject_kind == ClientKind::Continuum {
            ToggleDamageEffect::Enable
        } else {
            ToggleDamageEffect::None
        }
    }

    pub fn subscribe_callback(&mut self, subject: PlayerId, subject_kind: ClientKind) -> ToggleDamageEffect {
        let entry = self.by_subject.entry(subject).or_default();
        let was_zero = entry.watch_count() == 0;
        entry.callback_count += 1;
        if was_zero && subject_kind == ClientKind::Continuum {
            ToggleDamageEffect::Enable
        } else {
            ToggleDamageEffect::None
        }
    }

    /// spec.md §4.9: "removing the last sends (0)."
    pub fn unsubscribe(&mut self, subject: PlayerId, subscriber: PlayerId) -> ToggleDamageEffect {
        let Some(entry) = self.by_subject.get_mut(&subject) else { return ToggleDamageEffect::None };
        if !entry.subscribers.remove(&subscriber) {
            return ToggleDamageEffect::None;
        }
        if entry.watch_count() == 0 {
            self.by_subject.remove(&subject);
            ToggleDamageEffect::Disable
        } else {
            ToggleDamageEffect::None
        }
    }

    pub fn unsubscribe_callback(&mut self, subject: PlayerId) -> ToggleDamageEffect {
        let Some(entry) = self.by_subject.get_mut(&subject) else { return ToggleDamageEffect::None };
        if entry.callback_count == 0 {
            return ToggleDamageEffect::None;
        }
        entry.callback_count -= 1;
        if entry.watch_count() == 0 {
            self.by_subject.remove(&subject);
            ToggleDamageEffect::Disable
        } else {
            ToggleDamageEffect::None
        }
    }

    pub fn subscribers_of(&self, subject: PlayerId) -> Vec<PlayerId> {
        self.by_subject
            .get(&subject)
            .map(|s| s.subscribers.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Subjects `subscriber` currently watches, used by the `?watchdamage
    /// 0` arena-wide clear (spec.md §6).
    pub fn subjects_watched_by(&self, subscriber: PlayerId) -> Vec<PlayerId> {
        self.by_subject
            .iter()
            .filter(|(_, sub)| sub.subscribers.contains(&subscriber))
            .map(|(&subject, _)| subject)
            .collect()
    }

    pub fn has_callback_watchers(&self, subject: PlayerId) -> bool {
        self.by_subject.get(&subject).map(|s| s.callback_count > 0).unwrap_or(false)
    }

    /// spec.md §4.9 "On LeaveArena, unsubscribe the departing player
    /// from others and purge others from the departing player."
    pub fn purge_player(&mut self, player: PlayerId) -> Vec<(PlayerId, ToggleDamageEffect)> {
        let mut effects = Vec::new();
        if self.by_subject.remove(&player).is_some() {
            effects.push((player, ToggleDamageEffect::Disable));
        }
        let subjects: Vec<PlayerId> = self.by_subject.keys().copied().collect();
        for subject in subjects {
            let effect = self.unsubscribe(subject, player);
            if effect != ToggleDamageEffect::None {
                effects.push((subject, effect));
            }
        }
        effects
    }
}

/// spec.md §4.9: "relay the original damage entries inside an
/// S2C_WatchDamage envelope (sender id + timestamp + array) to all
/// subscribers reliably with priority-1-negative."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchDamageEnvelope {
    pub sender: PlayerId,
    pub timestamp: u32,
    pub entries: Vec<DamageEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_subscriber_toggles_on_only_for_continuum() {
        let mut relay = WatchDamageRelay::new();
        let effect = relay.subscribe(100, 1, ClientKind::Continuum);
        assert_eq!(effect, ToggleDamageEffect::Enable);

        let mut relay_vie = WatchDamageRelay::new();
        let effect_vie = relay_vie.subscribe(100, 1, ClientKind::Vie);
        assert_eq!(effect_vie, ToggleDamageEffect::None);
    }

    #[test]
    fn second_subscriber_does_not_retoggle() {
        let mut relay = WatchDamageRelay::new();
        relay.subscribe(100, 1, ClientKind::Continuum);
        let effect = relay.subscribe(100, 2, ClientKind::Continuum);
        assert_eq!(effect, ToggleDamageEffect::None);
    }

    #[test]
    fn last_unsubscribe_toggles_off() {
        let mut relay = WatchDamageRelay::new();
        relay.subscribe(100, 1, ClientKind::Continuum);
        relay.subscribe(100, 2, ClientKind::Continuum);
        assert_eq!(relay.unsubscribe(100, 1), ToggleDamageEffect::None);
        assert_eq!(relay.unsubscribe(100, 2), ToggleDamageEffect::Disable);
    }

    #[test]
    fn purge_clears_both_directions() {
        let mut relay = WatchDamageRelay::new();
        relay.subscribe(100, 1, ClientKind::Continuum);
        relay.subscribe(200, 1, ClientKind::Continuum);
        let effects = relay.purge_player(1);
        assert!(effects.iter().any(|(s, e)| *s == 100 && *e == ToggleDamageEffect::Disable));
        assert!(effects.iter().any(|(s, e)| *s == 200 && *e == ToggleDamageEffect::Disable));
        assert!(relay.subscribers_of(100).is_empty());
    }

    #[test]
    fn subjects_watched_by_lists_every_subscription_of_one_watcher() {
        let mut relay = WatchDamageRelay::new();
        relay.subscribe(100, 1, ClientKind::Continuum);
        relay.subscribe(200, 1, ClientKind::Continuum);
        relay.subscribe(200, 2, ClientKind::Continuum);
        let mut watched = relay.subjects_watched_by(1);
        watched.sort();
        assert_eq!(watched, vec![100, 200]);
        assert_eq!(relay.subjects_watched_by(2), vec![200]);
    }
}
