// auth.rs — Auth Gate (C7): name -> allowed-IP-prefix check for VIE
// bot clients. spec.md §4.7.
//
// Converted from: myq2-server/src/sv_user.rs's challenge/connect
// handling style (validate against a config-sourced value, log and
// reject on mismatch, fall through on success) combined with
// myq2-common/src/cvar.rs's get-or-default lookup pattern for reading
// the `[VIEnames]` section.

use zone_common::config::ConfigSource;
use zone_common::log::zlog_malicious;
use zone_proto::ClientKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    Allow,
    /// spec.md §4.7: "deny with NoPermission2".
    DenyNoPermission2,
}

/// Decodes a NUL-terminated login-packet name field (spec.md §4.7
/// "Decode the login packet's name (null-terminated)").
pub fn decode_login_name(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// spec.md §4.7: applies only to VIE-kind clients; Continuum/chat/fake
/// clients always pass through (there is nothing for this gate to check).
pub fn check_auth(
    cfg: &dyn ConfigSource,
    client_kind: ClientKind,
    player_id: u16,
    name: &str,
    remote_addr_text: &str,
) -> AuthDecision {
    if client_kind != ClientKind::Vie {
        return AuthDecision::Allow;
    }

    let configured = cfg.get("VIEnames", name);
    let value = match configured {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
            zlog_malicious(player_id, &format!("VIE login '{name}' has no VIEnames entry"));
            return AuthDecision::DenyNoPermission2;
        }
    };

    if value.trim().eq_ignore_ascii_case("any") {
        return AuthDecision::Allow;
    }

    if remote_addr_text.starts_with(value.trim()) {
        AuthDecision::Allow
    } else {
        zlog_malicious(
            player_id,
            &format!("VIE login '{name}' from {remote_addr_text} does not match prefix '{value}'"),
        );
        AuthDecision::DenyNoPermission2
    }
}
