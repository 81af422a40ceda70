// redirect.rs — Redirect Resolver (C8): alias/literal -> zone endpoint
// + arena, with caching. spec.md §4.8.
//
// Converted from: myq2-common/src/net.rs's address-parsing helpers
// (`net_string_to_adr`-style strict parsing) combined with the
// teacher's cvar-style "look up a config value, else treat the input
// literally" flow.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use zone_common::config::ConfigSource;
use zone_proto::s2c::S2cRedirect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    pub ip: Ipv4Addr,
    pub port: u16,
    pub arena: Option<String>,
}

/// Parses `ip:port[:arena]` strictly: dotted-quad IPv4, numeric port,
/// optional arena name (spec.md §4.8 "Parse strictly").
pub fn parse_literal(input: &str) -> Option<RedirectTarget> {
    let mut parts = input.splitn(3, ':');
    let ip_str = parts.next()?;
    let port_str = parts.next()?;
    let arena = parts.next().map(|s| s.to_string());

    let ip: Ipv4Addr = ip_str.parse().ok()?;
    let port: u16 = port_str.parse().ok()?;
    Some(RedirectTarget { ip, port, arena })
}

/// In-memory alias cache plus the config-backed lookup chain: cache ->
/// `Redirects/<name>` config -> literal parse (spec.md §4.8 "Lookup
/// order").
pub struct RedirectResolver {
    cache: Mutex<HashMap<String, RedirectTarget>>,
}

impl RedirectResolver {
    pub fn new() -> Self {
        Self { cache: Mutex::new(HashMap::new()) }
    }

    pub fn resolve(&self, cfg: &dyn ConfigSource, destination: &str) -> Option<RedirectTarget> {
        if let Some(cached) = self.cache.lock().get(destination).cloned() {
            return Some(cached);
        }

        if let Some(alias_value) = cfg.get("Redirects", destination) {
            if let Some(target) = parse_literal(&alias_value) {
                self.cache.lock().insert(destination.to_string(), target.clone());
                return Some(target);
            }
            return None;
        }

        parse_literal(destination)
    }
}

impl Default for RedirectResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// spec.md §4.8: "arenaType is -1 when no arena is specified, -3
/// otherwise."
pub fn build_redirect_packet(target: &RedirectTarget, login_id: u32) -> S2cRedirect {
    let ip_u32 = u32::from(target.ip);
    S2cRedirect {
        ip: ip_u32,
        port: target.port,
        arena_type: if target.arena.is_some() { -3 } else { -1 },
        arena_name: target.arena.clone(),
        login_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zone_common::config::MapConfigSource;

    #[test]
    fn scenario_alpha_alias_resolves_and_caches() {
        let mut cfg = MapConfigSource::new();
        cfg.set("Redirects", "alpha", "1.2.3.4:5000:arenaX");
        let resolver = RedirectResolver::new();

        let first = resolver.resolve(&cfg, "alpha").unwrap();
        assert_eq!(first.ip, Ipv4Addr::new(1, 2, 3, 4));
        assert_eq!(first.port, 5000);
        assert_eq!(first.arena.as_deref(), Some("arenaX"));

        let packet = build_redirect_packet(&first, 0);
        assert_eq!(packet.ip, 0x01020304);
        assert_eq!(packet.arena_type, -3);

        // Second call must resolve purely from cache: remove the config
        // entry and confirm resolution is still idempotent.
        let empty_cfg = MapConfigSource::new();
        let second = resolver.resolve(&empty_cfg, "alpha").unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn literal_without_arena_is_arena_type_minus_one() {
        let resolver = RedirectResolver::new();
        let cfg = MapConfigSource::new();
        let target = resolver.resolve(&cfg, "5.6.7.8:7000").unwrap();
        assert!(target.arena.is_none());
        let packet = build_redirect_packet(&target, 0);
        assert_eq!(packet.arena_type, -1);
    }

    #[test]
    fn malformed_literal_fails_to_parse() {
        assert_eq!(parse_literal("not-an-ip:abc"), None);
    }
}
