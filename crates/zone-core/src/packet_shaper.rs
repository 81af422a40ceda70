// packet_shaper.rs — Packet Shaper (C2). spec.md §4.3.
//
// Converted from: myq2-server/src/sv_ents.rs's per-client delta/baseline
// packing (building one wire representation and reusing it across
// clients that share the same baseline), retargeted at the four
// position/weapon shapes instead of entity deltas.

use zone_proto::s2c::{PositionShape, S2cPositionPacket};
use zone_proto::s2c::PositionFields;

/// Builds and caches the one packet shared across every recipient that
/// resolves to the same outbound shape (spec.md §4.3: "build it once and
/// reuse the bytes for every matching recipient, invalidating ('dirty')
/// only when an individual advisor edited the per-recipient copy").
#[derive(Default)]
pub struct PacketShaperCache {
    built: Option<(PositionShape, S2cPositionPacket)>,
}

impl PacketShaperCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the cache stale; the next `get_or_build` call rebuilds from
    /// scratch. Called when a per-recipient advisor edits `fields`.
    pub fn invalidate(&mut self) {
        self.built = None;
    }

    pub fn get_or_build(
        &mut self,
        fields: &PositionFields,
        batched_feature: bool,
        has_weapon: bool,
        bounty_unchanged_recently: bool,
    ) -> &S2cPositionPacket {
        let shape = fields.choose_shape(batched_feature, has_weapon, bounty_unchanged_recently);
        let needs_rebuild = match &self.built {
            Some((cached_shape, _)) => *cached_shape != shape,
            None => true,
        };
        if needs_rebuild {
            let packet = build_shape(fields, shape);
            self.built = Some((shape, packet));
        }
        &self.built.as_ref().unwrap().1
    }
}

fn build_shape(fields: &PositionFields, shape: PositionShape) -> S2cPositionPacket {
    match shape {
        PositionShape::SmallBatchedSingle => fields.build_small_batched(),
        PositionShape::LargeBatchedSingle => fields.build_large_batched(),
        PositionShape::Weapon => fields.build_weapon(),
        PositionShape::Position => fields.build_position(),
    }
}

/// spec.md §4.3: "Increment sender's per-arena 'weapon sent' lag counter
/// once per recipient that received a weapon shape carrying weapon fire."
#[derive(Default)]
pub struct WeaponLagCounter {
    pub sent: u64,
}

impl WeaponLagCounter {
    pub fn record_recipient(&mut self, shape: PositionShape, has_weapon: bool) {
        if shape == PositionShape::Weapon && has_weapon {
            self.sent += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_fields() -> PositionFields {
        PositionFields {
            sender_id: 5,
            rotation: 10,
            x: 100,
            y: 200,
            xspeed: 3,
            yspeed: -4,
            bounty: 10,
            status: 0,
            c2s_latency: 12,
            tick_low: 500,
            weapon: 0,
            energy: 50,
            extra: None,
        }
    }

    #[test]
    fn cache_reuses_until_shape_changes() {
        let mut cache = PacketShaperCache::new();
        let fields = base_fields();
        let first = cache.get_or_build(&fields, true, false, true).bytes.clone();
        let second = cache.get_or_build(&fields, true, false, true).bytes.clone();
        assert_eq!(first, second);

        let mut weapon_fields = base_fields();
        weapon_fields.weapon = 3;
        let third = cache.get_or_build(&weapon_fields, true, true, true);
        assert_eq!(third.shape, PositionShape::Weapon);
    }

    #[test]
    fn invalidate_forces_rebuild() {
        let mut cache = PacketShaperCache::new();
        let fields = base_fields();
        let _ = cache.get_or_build(&fields, true, false, true);
        cache.invalidate();
        assert!(cache.built.is_none());
    }

    #[test]
    fn weapon_lag_counter_only_counts_weapon_shape_with_fire() {
        let mut counter = WeaponLagCounter::default();
        counter.record_recipient(PositionShape::Weapon, true);
        counter.record_recipient(PositionShape::Weapon, false);
        counter.record_recipient(PositionShape::Position, true);
        assert_eq!(counter.sent, 1);
    }
}
