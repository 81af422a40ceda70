// chat.rs — Chat Core (C5). spec.md §4.5.
//
// Converted from: myq2-game's `SV_ClientCommand`-style chat/command
// dispatch in concert with myq2-server/src/sv_send.rs's multicast
// send-set building, retargeted at the chat-type/mask/flood rules of
// spec.md §4.5 rather than Quake2's print/stuff-text channels.

use zone_common::log::zlog_malicious;
use zone_common::tokenize::{split_commands, wrap_text};
use zone_proto::{ChatMask, ChatType, SendFlags};

use crate::collab::{CapabilityChecker, CommandDispatcher, CommandTarget};
use crate::player::{ChatState, Player, PlayerId};

pub const COMMAND_CHARS: [char; 2] = ['?', '*'];
pub const COMMAND_SEPARATOR: char = '|';
pub const MOD_CHAT_PREFIX: char = '\\';
pub const WRAP_WIDTH: usize = 78;

/// spec.md §4.5 "Mask check": `expire_mask` runs first, then the mask is
/// tested against `type`.
pub fn expire_mask(chat: &mut ChatState, now: u32) {
    if let Some(expires) = chat.mask_expires {
        if now >= expires {
            chat.mask = ChatMask::empty();
            chat.mask_expires = None;
        }
    }
    let elapsed = now.saturating_sub(chat.last_check).min(31);
    chat.message_count >>= elapsed;
    chat.last_check = now;
}

pub fn mask_allows(chat: &ChatState, arena_mask: ChatMask, chat_type: ChatType) -> bool {
    !(chat.mask | arena_mask).restricts(chat_type)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloodEscalation {
    pub triggered: bool,
    pub new_mask_expires: Option<u32>,
}

/// spec.md §4.5 "Flood escalation (post-dispatch)".
pub fn apply_flood_escalation(
    chat: &mut ChatState,
    now: u32,
    flood_limit: u32,
    flood_shutup_secs: u32,
    can_spam: bool,
) -> FloodEscalation {
    chat.message_count += 1;
    if flood_limit == 0 || can_spam || chat.message_count < flood_limit {
        return FloodEscalation { triggered: false, new_mask_expires: None };
    }

    chat.message_count /= 2;
    let expires = chat.mask_expires.unwrap_or(now) + flood_shutup_secs;
    chat.mask_expires = Some(expires);
    chat.mask |= ChatMask::flood_shutup_set();

    FloodEscalation { triggered: true, new_mask_expires: Some(expires) }
}

/// spec.md §4.5 "Outbound send primitive `send`". `ModChat` rewrites to
/// `SysopWarning` before the packet is built.
pub fn effective_send_type(requested: ChatType) -> ChatType {
    if requested == ChatType::ModChat {
        ChatType::SysopWarning
    } else {
        requested
    }
}

pub fn send_flags_for(chat_type: ChatType, message_reliable: bool) -> SendFlags {
    match chat_type {
        ChatType::ModChat | ChatType::PubMacro => SendFlags::unreliable_priority(-1),
        _ if message_reliable => SendFlags::reliable(),
        _ => SendFlags::unreliable_priority(0),
    }
}

/// spec.md §4.5 "If an obscenity filter is installed, partition `set`
/// into filter-off and filter-on subsets". Pure partitioning; filtering
/// itself is `obscene::ObsceneFilter::filter`.
pub fn partition_by_filter(recipients: &[PlayerId], filter_state: &dyn Fn(PlayerId) -> bool) -> (Vec<PlayerId>, Vec<PlayerId>) {
    recipients.iter().partition(|&&id| !filter_state(id))
}

/// spec.md §4.5 "RemotePrivate — parse `:destname:body`".
pub fn parse_remote_private(message: &str) -> Option<(&str, &str)> {
    let rest = message.strip_prefix(':')?;
    let (destname, body) = rest.split_once(':')?;
    Some((destname, body))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundRoute {
    Dropped,
    ModChat,
    ArenaBroadcast,
    Freq,
    EnemyFreq(PlayerId),
    Private(PlayerId),
    RemotePrivateCommand(PlayerId),
    RemotePrivateMessage(PlayerId),
    ChatChannel,
}

/// spec.md §4.5 "Inbound dispatch by type". Does not resolve targets
/// (that needs the arena directory); returns which branch applies.
pub fn classify_inbound(
    chat_type: ChatType,
    message: &str,
    mod_chat_capability: bool,
    remote_private_all_cmd: bool,
    remote_private_capability: bool,
    resolved_target: Option<PlayerId>,
) -> InboundRoute {
    match chat_type {
        ChatType::Arena | ChatType::SysopWarning => InboundRoute::Dropped,
        ChatType::Pub | ChatType::PubMacro => {
            if message.starts_with(MOD_CHAT_PREFIX) && mod_chat_capability {
                InboundRoute::ModChat
            } else {
                InboundRoute::ArenaBroadcast
            }
        }
        ChatType::Freq => InboundRoute::Freq,
        ChatType::EnemyFreq => match resolved_target {
            Some(pid) => InboundRoute::EnemyFreq(pid),
            None => InboundRoute::Dropped,
        },
        ChatType::Private => match resolved_target {
            Some(pid) => InboundRoute::Private(pid),
            None => InboundRoute::Dropped,
        },
        ChatType::RemotePrivate => {
            let Some(pid) = resolved_target else { return InboundRoute::Dropped };
            let Some((_, body)) = parse_remote_private(message) else { return InboundRoute::Dropped };
            let is_command = body.starts_with(|c: char| COMMAND_CHARS.contains(&c));
            if is_command || (remote_private_all_cmd && remote_private_capability) {
                InboundRoute::RemotePrivateCommand(pid)
            } else {
                InboundRoute::RemotePrivateMessage(pid)
            }
        }
        ChatType::Chat => InboundRoute::ChatChannel,
        ChatType::ModChat | ChatType::BillerCommand => InboundRoute::Dropped,
    }
}

/// spec.md §4.5 "Commands": strip the command char, split on `|`, dispatch
/// each non-empty token.
pub fn dispatch_commands(
    line: &str,
    from: PlayerId,
    target: CommandTarget,
    command_limit: usize,
    dispatcher: &dyn CommandDispatcher,
) {
    let Some(stripped) = line.strip_prefix(|c: char| COMMAND_CHARS.contains(&c)) else { return };
    for token in split_commands(stripped, COMMAND_SEPARATOR, command_limit) {
        dispatcher.run_command(&token, from, target);
    }
}

/// spec.md §4.5 "Line wrapping".
pub fn send_wrapped_text(text: &str) -> Vec<String> {
    wrap_text(text, WRAP_WIDTH)
}

/// Handles the arena/sysop "log as malicious, drop" branch explicitly,
/// since it is the one inbound path with an observable side effect
/// beyond routing.
pub fn reject_client_originated_system_chat(player: &Player, chat_type: ChatType) -> bool {
    if matches!(chat_type, ChatType::Arena | ChatType::SysopWarning) {
        zlog_malicious(player.id, &format!("client sent disallowed chat type {chat_type:?}"));
        true
    } else {
        false
    }
}

/// Gate used ahead of `CapabilityChecker` lookups that the spec keys off
/// capability names (`CanSpam`, `RemotePrivate` all-cmd, mod-chat).
pub fn has_capability(checker: &dyn CapabilityChecker, player: PlayerId, capability: &str) -> bool {
    checker.has_capability(player, capability)
}

/// spec.md §9 "Open question — chat-channel semantics": the source's
/// chat-network branch is a documented-not-wired placeholder. Kept
/// symmetric with the UDP path: every chat type this module routes gets
/// a `MSG:<TYPE>:<sender>:<text>` rendering, gated behind a flag that
/// defaults off since no transport consumes it yet.
pub fn chat_net_line(chat_type: ChatType, sender_name: &str, text: &str) -> String {
    format!("MSG:{:?}:{}:{}", chat_type, sender_name, text)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChatNetFormatter {
    pub enabled: bool,
}

impl ChatNetFormatter {
    pub fn render(&self, chat_type: ChatType, sender_name: &str, text: &str) -> Option<String> {
        self.enabled.then(|| chat_net_line(chat_type, sender_name, text))
    }
}
