//! Orchestrierung der Spielstand-Persistenz.
//!
//! Der Host verwaltet benannte Datenblöcke; [`SnapshotStore`] abstrahiert
//! diesen Zugriff. Beim Laden hat der aktuelle XML-Block Vorrang, danach
//! werden die drei Alt-Generationen von jung nach alt probiert. Ein
//! migrierter Zustand wird sofort unter der aktuellen ID neu gespeichert
//! und die Alt-Blöcke werden gelöscht.

use crate::core::{ControlMap, ScalarControl};
use crate::legacy::{migrate_legacy, LEGACY_BLOCK_GEN0, LEGACY_BLOCK_GEN1, LEGACY_BLOCK_GEN2};
use crate::ops;
use crate::topology::{NodeFlags, NodeId, TopologyProvider};
use crate::xml::{parse_snapshot, write_snapshot, EndSnapshot, Snapshot, SNAPSHOT_VERSION};
use anyhow::{Context, Result};
use indexmap::IndexMap;

/// Name des aktuellen Datenblocks.
pub const DATA_ID: &str = "JunctionControl";

/// Zugriff auf die benannten Datenblöcke des Hosts.
pub trait SnapshotStore {
    /// Liest einen Block, `None` wenn er nicht existiert.
    fn read_block(&self, name: &str) -> Option<Vec<u8>>;

    /// Schreibt einen Block (überschreibt einen vorhandenen).
    fn write_block(&mut self, name: &str, data: &[u8]);

    /// Löscht einen Block, falls vorhanden.
    fn erase_block(&mut self, name: &str);
}

/// Ergebnis eines Ladevorgangs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Der aktuelle XML-Block wurde geladen.
    Current,
    /// Ein Alt-Format wurde migriert und neu gespeichert.
    Migrated,
    /// Kein Spielstand vorhanden.
    Empty,
}

/// Speicher-Implementierung des [`SnapshotStore`] für Tests und Hosts
/// ohne eigene Datenblock-Verwaltung.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blocks: IndexMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Erstellt einen leeren Store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Anzahl vorhandener Blöcke.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

impl SnapshotStore for MemoryStore {
    fn read_block(&self, name: &str) -> Option<Vec<u8>> {
        self.blocks.get(name).cloned()
    }

    fn write_block(&mut self, name: &str, data: &[u8]) {
        self.blocks.insert(name.to_string(), data.to_vec());
    }

    fn erase_block(&mut self, name: &str) {
        self.blocks.shift_remove(name);
    }
}

/// Speichert die Registry als aktuellen XML-Block und löscht die Alt-Blöcke.
pub fn save_state(
    store: &mut dyn SnapshotStore,
    map: &ControlMap,
    net: &dyn TopologyProvider,
) -> Result<()> {
    let xml = write_snapshot(map, net)?;
    store.write_block(DATA_ID, xml.as_bytes());
    for block in [LEGACY_BLOCK_GEN0, LEGACY_BLOCK_GEN1, LEGACY_BLOCK_GEN2] {
        store.erase_block(block);
    }
    log::info!(
        "Zustand gespeichert: {} Knoten, {} Enden",
        map.node_count(),
        map.segment_end_count()
    );
    Ok(())
}

/// Lädt den Zustand aus dem Store und wendet ihn auf die Registry an.
///
/// Reihenfolge: aktueller Block, dann Generation 2, 1, 0. Ein vorhandener,
/// aber unlesbarer Block ist ein Fehler; ältere Generationen werden dann
/// nicht mehr probiert.
pub fn load_state(
    store: &mut dyn SnapshotStore,
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
) -> Result<LoadOutcome> {
    if let Some(data) = store.read_block(DATA_ID) {
        let text = String::from_utf8(data).context("Snapshot-Block ist kein UTF-8")?;
        let snapshot = parse_snapshot(&text)?;
        if snapshot.version != SNAPSHOT_VERSION {
            log::warn!(
                "Snapshot-Version {} statt {}, Laden wird versucht",
                snapshot.version,
                SNAPSHOT_VERSION
            );
        }
        apply_snapshot(map, net, &snapshot);
        return Ok(LoadOutcome::Current);
    }

    for block in [LEGACY_BLOCK_GEN2, LEGACY_BLOCK_GEN1, LEGACY_BLOCK_GEN0] {
        let Some(data) = store.read_block(block) else {
            continue;
        };
        let (snapshot, _) = migrate_legacy(block, &data)?;
        apply_snapshot(map, net, &snapshot);
        // Migrierten Zustand sofort unter der aktuellen ID sichern
        save_state(store, map, net)?;
        return Ok(LoadOutcome::Migrated);
    }

    Ok(LoadOutcome::Empty)
}

/// Wendet einen Snapshot auf die Registry an und liefert die Anzahl der
/// übernommenen Knoten.
///
/// Jeder Knoten läuft durch den normalen Anlage-Pfad und wird dabei gegen
/// die live Topologie abgeglichen; nicht mehr unterstützte Knoten werden
/// mit Warnung übersprungen.
pub fn apply_snapshot(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    snapshot: &Snapshot,
) -> usize {
    let mut applied = 0;
    for node in &snapshot.nodes {
        if let Err(err) = ops::ensure_node(map, net, node.id, Some(node.style)) {
            log::warn!("Node #{} aus dem Snapshot übersprungen: {:#}", node.id, err);
            continue;
        }

        for end in &node.ends {
            apply_end(map, net, node.id, end);
        }
        ops::refresh_node_geometry(map, net, node.id);
        applied += 1;
    }

    log::info!(
        "Snapshot angewendet: {} von {} Knoten",
        applied,
        snapshot.nodes.len()
    );
    applied
}

/// Überträgt ein Snapshot-Ende auf den live Eintrag.
fn apply_end(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    node_id: NodeId,
    end: &EndSnapshot,
) {
    let Some(road) = net.road_info(end.segment_id) else {
        log::debug!(
            "Segment #{} existiert nicht mehr, Ende verworfen",
            end.segment_id
        );
        return;
    };
    let untouchable = net.node_flags(node_id).contains(NodeFlags::UNTOUCHABLE);
    let Some(entry) = map.segment_end_mut(end.segment_id, node_id) else {
        log::debug!(
            "Segment #{} liegt nicht mehr an Node #{}, Ende verworfen",
            end.segment_id,
            node_id
        );
        return;
    };

    // Offset und Rotation aus den Ecken-Offsets rekonstruieren
    let offset = (end.left_offset + end.right_offset) / 2.0;
    let rotate = if road.half_width > f32::EPSILON {
        ((end.left_offset - end.right_offset) / (2.0 * road.half_width))
            .atan()
            .to_degrees()
    } else {
        0.0
    };

    entry.offset = ScalarControl::Offset.clamp(offset);
    entry.shift = ScalarControl::Shift.clamp(end.shift);
    entry.rotate_angle = ScalarControl::Rotate.clamp(rotate);
    entry.slope_angle = ScalarControl::Slope.clamp(end.slope_angle);
    entry.twist_angle = ScalarControl::Twist.clamp(end.twist_angle);
    entry.no_markings = end.no_markings;
    entry.is_slope = end.is_slope;
    // Das Format kennt kein eigenes Twist-Flag; flache, antastbare Enden
    // drehen wie bei den Defaults mit
    entry.is_twist = !end.is_slope && !untouchable;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NodeStyle;
    use crate::legacy::{write_objects, LegacyObject, LegacyValue};
    use crate::topology::{NetworkModel, RoadInfo};
    use glam::Vec3;

    fn strecke() -> NetworkModel {
        let mut net = NetworkModel::new();
        net.add_node(1, Vec3::ZERO);
        net.add_node(2, Vec3::new(100.0, 0.0, 0.0));
        net.add_node(3, Vec3::new(200.0, 0.0, 0.0));
        net.add_segment(10, 1, 2, RoadInfo::default());
        net.add_segment(11, 2, 3, RoadInfo::default());
        net
    }

    #[test]
    fn test_save_loescht_alt_bloecke() {
        let net = strecke();
        let map = ControlMap::new();
        let mut store = MemoryStore::new();
        store.write_block(LEGACY_BLOCK_GEN1, &[0, 0]);

        save_state(&mut store, &map, &net).unwrap();
        assert!(store.read_block(DATA_ID).is_some());
        assert!(store.read_block(LEGACY_BLOCK_GEN1).is_none());
        assert_eq!(store.block_count(), 1);
    }

    #[test]
    fn test_load_ohne_spielstand() {
        let net = strecke();
        let mut map = ControlMap::new();
        let mut store = MemoryStore::new();

        let outcome = load_state(&mut store, &mut map, &net).unwrap();
        assert_eq!(outcome, LoadOutcome::Empty);
        assert_eq!(map.node_count(), 0);
    }

    #[test]
    fn test_roundtrip_ueber_live_netzwerk() {
        let net = strecke();
        let mut map = ControlMap::new();
        ops::ensure_node(&mut map, &net, 2, Some(NodeStyle::Custom)).unwrap();
        ops::set_end_scalar(&mut map, &net, 10, 2, ScalarControl::Offset, 6.0);
        ops::set_end_scalar(&mut map, &net, 10, 2, ScalarControl::Rotate, 20.0);
        ops::set_end_flag(
            &mut map,
            &net,
            10,
            2,
            crate::core::EndFlag::NoMarkings,
            true,
        );

        let mut store = MemoryStore::new();
        save_state(&mut store, &map, &net).unwrap();

        let mut geladen = ControlMap::new();
        let outcome = load_state(&mut store, &mut geladen, &net).unwrap();
        assert_eq!(outcome, LoadOutcome::Current);

        let node = geladen.node(2).expect("Node 2 erwartet");
        assert_eq!(node.style, NodeStyle::Custom);

        let end = geladen.segment_end(10, 2).expect("Ende erwartet");
        assert!((end.offset - 6.0).abs() < 0.01);
        assert!((end.rotate_angle - 20.0).abs() < 0.1);
        assert!(end.no_markings);
    }

    #[test]
    fn test_legacy_block_wird_migriert_und_neu_gespeichert() {
        let net = strecke();
        let mut map = ControlMap::new();

        let record = LegacyObject::new("JunctionControl.NodeRecord")
            .with_field("NodeID", LegacyValue::U16(2))
            .with_field(
                "NodeType",
                LegacyValue::Object(
                    LegacyObject::new("NodeKindT").with_field("Value", LegacyValue::I32(5)),
                ),
            );
        let mut store = MemoryStore::new();
        store.write_block(LEGACY_BLOCK_GEN1, &write_objects(&[record]));

        let outcome = load_state(&mut store, &mut map, &net).unwrap();
        assert_eq!(outcome, LoadOutcome::Migrated);
        assert_eq!(map.node(2).map(|n| n.style), Some(NodeStyle::Custom));

        // Neu gespeichert unter der aktuellen ID, Alt-Block gelöscht
        assert!(store.read_block(DATA_ID).is_some());
        assert!(store.read_block(LEGACY_BLOCK_GEN1).is_none());
    }

    #[test]
    fn test_snapshot_ueberspringt_unbekannte_knoten() {
        let net = strecke();
        let mut map = ControlMap::new();

        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION.to_string(),
            nodes: vec![crate::xml::NodeSnapshot {
                id: 99,
                style: NodeStyle::Custom,
                ends: Vec::new(),
            }],
        };
        let applied = apply_snapshot(&mut map, &net, &snapshot);
        assert_eq!(applied, 0);
        assert_eq!(map.node_count(), 0);
    }
}
