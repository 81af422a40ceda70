// runtime.rs — shared-resource locking and the main-thread callback
// queue (spec.md §5 "Concurrency & Resource Model").
//
// Converted from: myq2-server/src/sv_main.rs's `svs.clients` table
// (a fixed array iterated under a single implicit single-threaded
// assumption) and `sv_init.rs`'s per-level cvar state, made explicit
// with `parking_lot` RW-locks/mutexes now that recipient filtering and
// network I/O happen from more than one thread; the FIFO callback
// queue is `crossbeam::channel`, named as the concurrency primitive in
// spec.md §5's "main thread drains a work queue" rule.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};

use crate::player::{Player, PlayerId};

/// spec.md §5 "Player registry is behind a single global
/// reader-writer lock. Any iteration over all players ... holds the
/// read lock. State mutations that must be linearizable with
/// iteration ... take it."
#[derive(Default)]
pub struct PlayerRegistry {
    players: RwLock<HashMap<PlayerId, Player>>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, player: Player) {
        self.players.write().insert(player.id, player);
    }

    pub fn remove(&self, id: PlayerId) -> Option<Player> {
        self.players.write().remove(&id)
    }

    pub fn get(&self, id: PlayerId) -> Option<Player> {
        self.players.read().get(&id).cloned()
    }

    /// Runs `f` under the read lock, observing a consistent snapshot of
    /// every player — the lock recipient filtering, broadcast-set
    /// building, and spec-purge all rely on per spec.md §5.
    pub fn with_all<R>(&self, f: impl FnOnce(&HashMap<PlayerId, Player>) -> R) -> R {
        f(&self.players.read())
    }

    /// Runs `f` under the write lock for mutations that must be
    /// linearizable with a concurrent iteration (clearing dead,
    /// snapshotting).
    pub fn with_mut(&self, id: PlayerId, f: impl FnOnce(&mut Player)) -> bool {
        match self.players.write().get_mut(&id) {
            Some(player) => {
                f(player);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.players.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// spec.md §5 "Arena state uses a per-arena reader-writer lock (read
/// for chat-mask, write for reset on config change)."
#[derive(Default)]
pub struct ArenaLocks<T> {
    arenas: RwLock<HashMap<String, RwLock<T>>>,
}

impl<T: Clone + Default> ArenaLocks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure(&self, arena: &str) {
        if !self.arenas.read().contains_key(arena) {
            self.arenas.write().entry(arena.to_string()).or_insert_with(|| RwLock::new(T::default()));
        }
    }

    pub fn read<R>(&self, arena: &str, f: impl FnOnce(&T) -> R) -> R {
        self.ensure(arena);
        let arenas = self.arenas.read();
        f(&arenas.get(arena).expect("ensure inserted the arena").read())
    }

    pub fn write<R>(&self, arena: &str, f: impl FnOnce(&mut T) -> R) -> R {
        self.ensure(arena);
        let arenas = self.arenas.read();
        f(&mut arenas.get(arena).expect("ensure inserted the arena").write())
    }

    pub fn reset(&self, arena: &str) {
        self.arenas.write().insert(arena.to_string(), RwLock::new(T::default()));
    }
}

/// spec.md §5 "Spec relationships use one global mutex. All `speccing`
/// set/clear and all EPD refcount updates occur under it." Zero-sized
/// marker held around `shipfreq::{install_spec, clear_spec, ...}`
/// calls by the caller; the lock itself carries no state beyond
/// mutual exclusion.
#[derive(Default)]
pub struct SpecMutex(Mutex<()>);

impl SpecMutex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.0.lock();
        f()
    }
}

/// spec.md §5 "Ship/freq use one global mutex. Lock-expiry, state
/// transitions, and `during_change` flag toggles occur under it."
#[derive(Default)]
pub struct ShipFreqMutex(Mutex<()>);

impl ShipFreqMutex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.0.lock();
        f()
    }
}

/// spec.md §5 "Per-player chat state is under a per-player mutex" and
/// "Chat-mask reads that join with arena-mask reads acquire the
/// chat-mask mutex first, then the arena RW-read; never in the
/// opposite order." Callers must follow that ordering themselves;
/// this type only owns the per-player half.
#[derive(Default)]
pub struct ChatMutexes {
    locks: RwLock<HashMap<PlayerId, Mutex<()>>>,
}

impl ChatMutexes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lock<R>(&self, player: PlayerId, f: impl FnOnce() -> R) -> R {
        if !self.locks.read().contains_key(&player) {
            self.locks.write().entry(player).or_insert_with(|| Mutex::new(()));
        }
        let locks = self.locks.read();
        let _guard = locks.get(&player).expect("lock inserted above").lock();
        f()
    }

    pub fn remove(&self, player: PlayerId) {
        self.locks.write().remove(&player);
    }
}

/// spec.md §5 "Callbacks queued to the main work queue fire in FIFO
/// order and observe the player's then-current arena; the handler
/// itself re-checks `dto.arena == player.arena`." A network I/O thread
/// pushes; the single main thread drains.
pub struct WorkQueue<T> {
    sender: crossbeam::channel::Sender<T>,
    receiver: crossbeam::channel::Receiver<T>,
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam::channel::unbounded();
        Self { sender, receiver }
    }

    pub fn push(&self, item: T) {
        // An unbounded channel only errs when every receiver is
        // dropped; the main thread owns one for the process lifetime.
        let _ = self.sender.send(item);
    }

    /// Drains everything currently queued, in FIFO order, without
    /// blocking for more. Intended to be called once per main-thread
    /// tick.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
