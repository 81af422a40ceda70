// config.rs — configuration-store collaborator interface.
// Converted from: myq2-common/src/cvar.rs (CvarContext::variable_string /
// variable_value), generalized into a section/key lookup matching the
// `Section/Key` naming used throughout spec.md §6 (e.g. `Net/BulletPixels`,
// `[VIEnames]/<name>`).
//
// The concrete configuration file format is out of scope (spec.md §1
// lists "configuration store" among the external collaborators); this
// crate only depends on the lookup contract.

use std::collections::HashMap;

/// A read-only key/value configuration source, addressed the way the
/// engine's canonical config keys are written: `section:key`.
pub trait ConfigSource: Send + Sync {
    fn get(&self, section: &str, key: &str) -> Option<String>;

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.get(section, key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn get_float(&self, section: &str, key: &str, default: f64) -> f64 {
        self.get(section, key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        match self.get(section, key).as_deref() {
            Some("1") | Some("true") | Some("yes") => true,
            Some("0") | Some("false") | Some("no") => false,
            _ => default,
        }
    }
}

/// An in-memory config source, used by the production default wiring and
/// by every test in this workspace in place of a real config-file backend.
#[derive(Default, Clone)]
pub struct MapConfigSource {
    values: HashMap<(String, String), String>,
}

impl MapConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) -> &mut Self {
        self.values
            .insert((section.to_string(), key.to_string()), value.into());
        self
    }
}

impl ConfigSource for MapConfigSource {
    fn get(&self, section: &str, key: &str) -> Option<String> {
        self.values
            .get(&(section.to_string(), key.to_string()))
            .cloned()
    }
}
