// region.rs — Region Tracker (C10) and Auto-Warp (C11).
// spec.md §4.10: "Region tracker keeps an immutable set per player; on
// position updates it diffs set-wise and invokes enter/exit callbacks.
// Auto-Warp listens for enter callbacks: when the entered region
// carries an auto-warp spec (arena?, x, y), either warp the player to
// (x,y) if arena is empty, else request a cross-arena move to
// arena@(x,y)."
//
// Converted from: myq2-server/src/sv_world.rs's area/region linkage
// pattern (tracking which spatial areas an entity currently touches and
// diffing against the previous frame), retargeted at named map regions
// instead of BSP areas.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDiff {
    pub entered: Vec<String>,
    pub exited: Vec<String>,
}

/// Looks up which named regions cover a tile coordinate. The concrete
/// map-data backend is out of scope (spec.md §1); this is the seam
/// `zone-core` depends on.
pub trait RegionLookup: Send + Sync {
    fn regions_at(&self, tile_x: i32, tile_y: i32) -> Vec<String>;
    fn no_anti_regions(&self) -> HashSet<String>;
    fn no_weapons_regions(&self) -> HashSet<String>;
    fn auto_warp_spec(&self, region: &str) -> Option<AutoWarpTarget>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoWarpTarget {
    pub arena: Option<String>,
    pub x: i16,
    pub y: i16,
}

/// spec.md §4.1 "Region update": `(x>>4, y>>4)` tile coordinates.
pub fn tile_coords(x: i16, y: i16) -> (i32, i32) {
    (x as i32 >> 4, y as i32 >> 4)
}

/// Diffs `old` against `new` region sets (spec.md §4.10: "diffs set-wise").
pub fn diff_regions(old: &[String], new: &[String]) -> RegionDiff {
    let old_set: HashSet<&String> = old.iter().collect();
    let new_set: HashSet<&String> = new.iter().collect();
    RegionDiff {
        entered: new_set.difference(&old_set).map(|s| s.to_string()).collect(),
        exited: old_set.difference(&new_set).map(|s| s.to_string()).collect(),
    }
}

pub fn no_anti_flag(regions: &[String], no_anti: &HashSet<String>) -> bool {
    regions.iter().any(|r| no_anti.contains(r))
}

pub fn no_weapons_flag(regions: &[String], no_weapons: &HashSet<String>) -> bool {
    regions.iter().any(|r| no_weapons.contains(r))
}

/// An in-memory `RegionLookup` used for tests and as a minimal default.
#[derive(Default)]
pub struct StaticRegionMap {
    pub regions: HashMap<(i32, i32), Vec<String>>,
    pub no_anti: HashSet<String>,
    pub no_weapons: HashSet<String>,
    pub auto_warp: HashMap<String, AutoWarpTarget>,
}

impl RegionLookup for StaticRegionMap {
    fn regions_at(&self, tile_x: i32, tile_y: i32) -> Vec<String> {
        self.regions.get(&(tile_x, tile_y)).cloned().unwrap_or_default()
    }

    fn no_anti_regions(&self) -> HashSet<String> {
        self.no_anti.clone()
    }

    fn no_weapons_regions(&self) -> HashSet<String> {
        self.no_weapons.clone()
    }

    fn auto_warp_spec(&self, region: &str) -> Option<AutoWarpTarget> {
        self.auto_warp.get(region).cloned()
    }
}

/// spec.md §4.11: the action to take on an auto-warp region enter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoWarpAction {
    WarpInPlace { x: i16, y: i16 },
    CrossArenaMove { arena: String, x: i16, y: i16 },
}

pub fn auto_warp_action(target: &AutoWarpTarget) -> AutoWarpAction {
    match &target.arena {
        None => AutoWarpAction::WarpInPlace { x: target.x, y: target.y },
        Some(arena) => AutoWarpAction::CrossArenaMove { arena: arena.clone(), x: target.x, y: target.y },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_coords_shift_by_four() {
        assert_eq!(tile_coords(16, 32), (1, 2));
        assert_eq!(tile_coords(15, 0), (0, 0));
    }

    #[test]
    fn diff_finds_enter_and_exit_sets() {
        let old = vec!["safe".to_string(), "spawn".to_string()];
        let new = vec!["spawn".to_string(), "warp-zone".to_string()];
        let diff = diff_regions(&old, &new);
        assert_eq!(diff.entered, vec!["warp-zone".to_string()]);
        assert_eq!(diff.exited, vec!["safe".to_string()]);
    }

    #[test]
    fn auto_warp_in_place_when_no_arena() {
        let target = AutoWarpTarget { arena: None, x: 100, y: 200 };
        assert_eq!(auto_warp_action(&target), AutoWarpAction::WarpInPlace { x: 100, y: 200 });
    }

    #[test]
    fn auto_warp_cross_arena_when_arena_set() {
        let target = AutoWarpTarget { arena: Some("duel1".to_string()), x: 1, y: 2 };
        assert_eq!(
            auto_warp_action(&target),
            AutoWarpAction::CrossArenaMove { arena: "duel1".to_string(), x: 1, y: 2 }
        );
    }
}
