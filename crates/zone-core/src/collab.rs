// collab.rs — supplemented collaborator interfaces (SPEC_FULL.md §10).
// spec.md §1 lists arena/player lifecycle, config, logging, capability
// manager, RNG, persistence, map data, command parser, and transport as
// out-of-scope collaborators. These traits are the minimal seams
// `zone-core` needs against them to be exercised by tests; concrete
// production backends for any of them are out of scope here.

use crate::player::{Player, PlayerId};

/// Lists players in an arena, looks up a player by id, reports arena
/// running/not-running state. Grounded on the player/arena registry
/// access patterns in myq2-server's `sv_main`/`sv_ents` (iterate
/// `svs.clients`, filter by `state`).
pub trait ArenaDirectory: Send + Sync {
    fn players_in_arena(&self, arena: &str) -> Vec<PlayerId>;
    fn player(&self, id: PlayerId) -> Option<Player>;
    fn is_running(&self, arena: &str) -> bool;
}

/// `has_capability(player, cap_name) -> bool`, used by mod-chat routing,
/// the `RemotePrivate` all-cmd gate (spec.md §4.5), and `?spec`'s
/// `InvisibleSpectator` check (spec.md §6).
pub trait CapabilityChecker: Send + Sync {
    fn has_capability(&self, player: PlayerId, capability: &str) -> bool;
}

/// The command multiplexing sink (spec.md §4.5 "Commands"), also the
/// CLI surface of spec.md §6.
pub trait CommandDispatcher: Send + Sync {
    fn run_command(&self, line: &str, from: PlayerId, target: CommandTarget);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTarget {
    Arena,
    Team(i16),
    Player(PlayerId),
}

/// spec.md §6 persisted-state layout: `Chat` and `GameShipLock` blobs,
/// addressed by a per-player, per-arena key.
pub trait PersistStore: Send + Sync {
    fn save(&self, player: PlayerId, arena: &str, key: &str, bytes: Vec<u8>);
    fn load(&self, player: PlayerId, arena: &str, key: &str) -> Option<Vec<u8>>;
}

/// Consulted by the death handler (spec.md §4.4) for how many flags
/// transfer from victim to killer.
pub trait FlagGame: Send + Sync {
    fn flags_to_transfer(&self, killer: PlayerId, victim: PlayerId) -> u16;
}

/// An in-memory `PersistStore` double, used by tests exercising the
/// chat-mask / ship-lock round-trip laws (spec.md §8).
#[derive(Default)]
pub struct MemoryPersistStore {
    values: parking_lot::Mutex<std::collections::HashMap<(PlayerId, String, String), Vec<u8>>>,
}

impl MemoryPersistStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistStore for MemoryPersistStore {
    fn save(&self, player: PlayerId, arena: &str, key: &str, bytes: Vec<u8>) {
        self.values
            .lock()
            .insert((player, arena.to_string(), key.to_string()), bytes);
    }

    fn load(&self, player: PlayerId, arena: &str, key: &str) -> Option<Vec<u8>> {
        self.values
            .lock()
            .get(&(player, arena.to_string(), key.to_string()))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_persist_round_trips() {
        let store = MemoryPersistStore::new();
        store.save(1, "arena1", "Chat", vec![1, 2, 3]);
        assert_eq!(store.load(1, "arena1", "Chat"), Some(vec![1, 2, 3]));
        assert_eq!(store.load(1, "arena2", "Chat"), None);
    }
}
