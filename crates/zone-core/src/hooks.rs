// hooks.rs — pluggable advisor/callback chains.
// Design notes §9: "Advisors and hooks (position, kill, kill-green,
// player-position, freq-manager, flag-game) are pluggable chains.
// Abstract them as one trait/interface per chain; iteration order is
// registration order; any member may short-circuit via the documented
// 'drop' signal (negative coordinates, nulled pointers, etc.)."
//
// Converted from: myq2-game's dispatch table pattern in `dispatch.rs`/
// `game_import.rs` (a fixed set of named callback slots invoked in a
// known order), adapted to Rust trait objects held in registration-order
// vectors instead of C function pointers.

use crate::player::{Player, PlayerId, PositionSnapshot};
use zone_proto::ExtraClass;

/// spec.md §4.1 "Editability": a shared-copy position advisor. Returning
/// `false` means the advisor dropped the packet (it is also free to
/// signal the drop by setting `pos.x`/`pos.y` negative, per spec).
pub trait PositionAdvisor: Send + Sync {
    fn advise(&self, sender: &Player, pos: &mut PositionSnapshot) -> bool;
}

/// spec.md §4.1: "Individual advisors can further edit the per-recipient
/// copy and set an extended extra_length override."
pub trait PerRecipientPositionAdvisor: Send + Sync {
    fn advise_recipient(
        &self,
        sender: &Player,
        recipient: &Player,
        pos: &mut PositionSnapshot,
        extra_override: &mut Option<ExtraClass>,
    );
}

/// spec.md §4.4 "Death": advisors may rewrite killer/victim/bounty, or
/// drop the kill by nulling either id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KillEvent {
    pub killer: Option<PlayerId>,
    pub victim: Option<PlayerId>,
    pub bounty: u16,
    pub points: i32,
}

pub trait KillAdvisor: Send + Sync {
    fn advise(&self, event: &mut KillEvent);
}

/// spec.md §4.4: "Let a kill-green hook optionally rewrite the green."
pub trait KillGreenAdvisor: Send + Sync {
    fn rewrite_green(&self, event: &KillEvent, green: u16) -> u16;
}

/// spec.md §4.4 "consult the freq-manager (if provided) to possibly
/// rewrite (ship, freq, rejection reason)".
#[derive(Debug, Clone)]
pub struct FreqManagerDecision {
    pub ship: zone_proto::Ship,
    pub freq: i16,
    pub rejection_reason: Option<String>,
}

pub trait FreqManagerAdvisor: Send + Sync {
    fn decide(&self, player_id: PlayerId, requested_ship: zone_proto::Ship, requested_freq: i16) -> FreqManagerDecision;
}

/// Open question (spec.md §9, "command rewrites"): a hook point that is
/// present and callable but a no-op by default, rather than guessed
/// semantics.
pub trait CommandRewriteAdvisor: Send + Sync {
    fn rewrite(&self, command_line: &str) -> String {
        command_line.to_string()
    }
}

pub struct NoOpCommandRewrite;
impl CommandRewriteAdvisor for NoOpCommandRewrite {
    fn rewrite(&self, command_line: &str) -> String {
        command_line.to_string()
    }
}

/// A registration-order chain of advisors of one kind.
pub struct AdvisorChain<T: ?Sized> {
    advisors: Vec<Box<T>>,
}

impl<T: ?Sized> AdvisorChain<T> {
    pub fn new() -> Self {
        Self { advisors: Vec::new() }
    }

    pub fn register(&mut self, advisor: Box<T>) {
        self.advisors.push(advisor);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Box<T>> {
        self.advisors.iter()
    }
}

impl<T: ?Sized> Default for AdvisorChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zone_proto::ClientKind;

    struct DropOnFastSpeed;
    impl PositionAdvisor for DropOnFastSpeed {
        fn advise(&self, _sender: &Player, pos: &mut PositionSnapshot) -> bool {
            if pos.xspeed.unsigned_abs() > 5000 {
                pos.x = -1;
                pos.y = -1;
                return false;
            }
            true
        }
    }

    #[test]
    fn chain_runs_in_registration_order_and_can_drop() {
        let mut chain: AdvisorChain<dyn PositionAdvisor> = AdvisorChain::new();
        chain.register(Box::new(DropOnFastSpeed));

        let sender = Player::new(1, "p", ClientKind::Continuum, "arena");
        let mut pos = PositionSnapshot { xspeed: 9000, ..Default::default() };
        let mut continued = true;
        for advisor in chain.iter() {
            continued = advisor.advise(&sender, &mut pos) && continued;
        }
        assert!(!continued);
        assert!(pos.x < 0 && pos.y < 0);
    }
}
