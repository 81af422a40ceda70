//! zone-core — the zone-server game-state engine described in spec.md:
//! position dispatch, ship/freq state, chat, watch-damage relay, region
//! tracking/auto-warp, auth, redirects, file send, and the shared-lock
//! runtime they run under. Converted in spirit from myq2-server's
//! per-subsystem module layout (`sv_user`/`sv_ents`/`sv_send`/
//! `sv_world`), one file per component.

pub mod arena;
pub mod auth;
pub mod chat;
pub mod collab;
pub mod commands;
pub mod dispatch;
pub mod filesend;
pub mod hooks;
pub mod hypot;
pub mod obscene;
pub mod packet_shaper;
pub mod persist;
pub mod player;
pub mod recipient_filter;
pub mod redirect;
pub mod region;
pub mod runtime;
pub mod shipfreq;
pub mod watchdamage;
