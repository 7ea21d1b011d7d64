//! Migration der drei binären Alt-Generationen in den aktuellen Snapshot.
//!
//! Die Generationen werden am Namen ihres Datenblocks erkannt. Eine
//! explizite Bindungs-Tabelle ordnet serialisierte Typnamen den heutigen
//! Konstruktoren zu; unbekannte Typnamen überspringen nur den einzelnen
//! Eintrag, nie den ganzen Ladevorgang. Feld-Umbenennungen
//! (`DeltaSlopeAngleDeg` → Längsneigung, `EmbankmentAngleDeg` →
//! Querneigung, invertiertes `FlatJunctions`) passieren beim Zusammenbau.

use super::stream::{read_objects, LegacyObject, LegacyValue};
use crate::core::NodeStyle;
use crate::topology::NodeId;
use crate::xml::{EndSnapshot, NodeSnapshot, Snapshot, SNAPSHOT_VERSION};
use anyhow::{bail, Context, Result};
use glam::Vec3;
use indexmap::IndexMap;

/// Datenblock der ältesten Generation: flache Liste von Übergangs-Einträgen.
pub const LEGACY_BLOCK_GEN0: &str = "RoadTransitionTuner_V1.0";
/// Datenblock der mittleren Generation: getrennte Knoten- und Enden-Listen.
pub const LEGACY_BLOCK_GEN1: &str = "JunctionControl_V1.0";
/// Datenblock der jüngsten Binär-Generation: Zustands-Hülle mit Version.
pub const LEGACY_BLOCK_GEN2: &str = "JunctionControl_V1.2";

// Bindungs-Tabelle: serialisierte Typnamen der Alt-Formate
const TYPE_TRANSITION: &str = "RoadTransitionTuner.TransitionData";
const TYPE_CORNER_GEN0: &str = "RoadTransitionTuner.CornerData";
const TYPE_NODE_RECORD: &str = "JunctionControl.NodeRecord";
const TYPE_END_RECORD: &str = "JunctionControl.EndRecord";
const TYPE_CORNER: &str = "JunctionControl.CornerData";
const TYPE_SAVED_STATE: &str = "JunctionControl.SavedState";
/// Name des alten Style-Enums (heute [`NodeStyle`]).
const TYPE_STYLE_ENUM: &str = "NodeKindT";

/// Zähler eines Migrations-Laufs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MigrationStats {
    /// Übernommene Knoten.
    pub nodes: usize,
    /// Übernommene Segmentenden.
    pub ends: usize,
    /// Übersprungene Einträge (unbekannte Typen, fehlende Pflichtfelder).
    pub skipped: usize,
}

/// Migriert einen Legacy-Block in einen Snapshot der aktuellen Generation.
///
/// Offset und Shift entstehen aus der Ecken-Verschmelzung; die Rotation
/// kannten die Alt-Formate nicht, beide Ecken-Offsets des Snapshots
/// tragen deshalb denselben Wert.
pub fn migrate_legacy(block_name: &str, data: &[u8]) -> Result<(Snapshot, MigrationStats)> {
    let records = read_objects(data)
        .with_context(|| format!("Legacy-Block '{}' unlesbar", block_name))?;

    let mut collector = Collector::default();
    match block_name {
        LEGACY_BLOCK_GEN0 | LEGACY_BLOCK_GEN1 => {
            for record in &records {
                collector.add_record(record);
            }
        }
        LEGACY_BLOCK_GEN2 => collect_saved_state(&records, &mut collector)?,
        other => bail!("Unbekannter Legacy-Block '{}'", other),
    }

    let (snapshot, stats) = collector.into_snapshot();
    log::info!(
        "Migration von '{}': {} Knoten, {} Enden, {} Einträge übersprungen",
        block_name,
        stats.nodes,
        stats.ends,
        stats.skipped
    );
    Ok((snapshot, stats))
}

/// Entpackt die Zustands-Hülle der Generation 2 und sammelt ihre Listen ein.
fn collect_saved_state(records: &[LegacyObject], collector: &mut Collector) -> Result<()> {
    let envelope = records
        .iter()
        .find(|record| record.type_name == TYPE_SAVED_STATE)
        .context("Kein SavedState-Objekt im Legacy-Block")?;

    if let Some(version) = envelope.field("Version").and_then(LegacyValue::as_str) {
        log::debug!("SavedState mit Version {}", version);
    }

    for name in ["Nodes", "SegmentEnds"] {
        let Some(values) = envelope.field(name).and_then(LegacyValue::as_array) else {
            continue;
        };
        for value in values {
            match value.as_object() {
                Some(record) => collector.add_record(record),
                None => {
                    log::warn!("Nicht-Objekt in '{}' wird übersprungen", name);
                    collector.skipped += 1;
                }
            }
        }
    }

    Ok(())
}

/// Sammelt Styles und Enden über alle Record-Formen hinweg.
#[derive(Default)]
struct Collector {
    styles: IndexMap<NodeId, NodeStyle>,
    ends: IndexMap<NodeId, Vec<EndSnapshot>>,
    skipped: usize,
}

impl Collector {
    fn add_record(&mut self, record: &LegacyObject) {
        match record.type_name.as_str() {
            TYPE_NODE_RECORD => self.add_node_record(record),
            TYPE_END_RECORD | TYPE_TRANSITION => self.add_end_record(record),
            other => {
                log::warn!("Unbekannter Legacy-Typ '{}' wird übersprungen", other);
                self.skipped += 1;
            }
        }
    }

    fn add_node_record(&mut self, record: &LegacyObject) {
        let Some(node_id) = record.field("NodeID").and_then(LegacyValue::as_u16) else {
            log::warn!("NodeRecord ohne NodeID wird übersprungen");
            self.skipped += 1;
            return;
        };
        let Some(style) = style_from_value(record.field("NodeType")) else {
            log::warn!("Node #{}: unbekannter Style wird übersprungen", node_id);
            self.skipped += 1;
            return;
        };
        self.styles.insert(node_id, style);
    }

    fn add_end_record(&mut self, record: &LegacyObject) {
        match end_from_record(record) {
            Ok((node_id, end)) => {
                // Generation 0 trägt den Style am Ende; der erste Treffer gewinnt
                if record.type_name == TYPE_TRANSITION {
                    if let Some(style) = style_from_value(record.field("NodeKind")) {
                        self.styles.entry(node_id).or_insert(style);
                    }
                }
                self.ends.entry(node_id).or_default().push(end);
            }
            Err(err) => {
                log::warn!("Segmentende übersprungen: {:#}", err);
                self.skipped += 1;
            }
        }
    }

    fn into_snapshot(mut self) -> (Snapshot, MigrationStats) {
        let mut nodes = Vec::new();
        for (node_id, style) in &self.styles {
            let ends = self.ends.shift_remove(node_id).unwrap_or_default();
            nodes.push(NodeSnapshot {
                id: *node_id,
                style: *style,
                ends,
            });
        }
        // Enden ohne Knoten-Eintrag: Style fällt auf Custom zurück
        for (node_id, ends) in self.ends {
            nodes.push(NodeSnapshot {
                id: node_id,
                style: NodeStyle::Custom,
                ends,
            });
        }

        let stats = MigrationStats {
            nodes: nodes.len(),
            ends: nodes.iter().map(|node| node.ends.len()).sum(),
            skipped: self.skipped,
        };
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION.to_string(),
            nodes,
        };
        (snapshot, stats)
    }
}

/// Baut ein Segmentende aus einem End- oder Übergangs-Record zusammen.
fn end_from_record(record: &LegacyObject) -> Result<(NodeId, EndSnapshot)> {
    let segment_id = record
        .field("SegmentID")
        .and_then(LegacyValue::as_u16)
        .context("SegmentID fehlt")?;
    let node_id = record
        .field("NodeID")
        .and_then(LegacyValue::as_u16)
        .context("NodeID fehlt")?;

    let (left_offset, left_delta) = corner_values(record, "LeftCorner")?;
    let (right_offset, right_delta) = corner_values(record, "RightCorner")?;

    // Ecken-Verschmelzung: Offset aus den Längsanteilen, Shift aus den Queranteilen
    let offset = (left_offset + left_delta.z + right_offset + right_delta.z) / 2.0;
    let shift = (left_delta.x - right_delta.x) / 2.0;

    let slope_angle = record
        .field("DeltaSlopeAngleDeg")
        .and_then(LegacyValue::as_f32)
        .unwrap_or(0.0);
    let twist_angle = record
        .field("EmbankmentAngleDeg")
        .and_then(LegacyValue::as_f32)
        .unwrap_or(0.0);
    // Fehlendes FlatJunctions bedeutet in den Alt-Formaten "flach"
    let flat_junctions = record
        .field("FlatJunctions")
        .and_then(LegacyValue::as_bool)
        .unwrap_or(true);
    let no_markings = record
        .field("NoMarkings")
        .and_then(LegacyValue::as_bool)
        .unwrap_or(false);

    Ok((
        node_id,
        EndSnapshot {
            segment_id,
            left_offset: offset,
            right_offset: offset,
            slope_angle,
            twist_angle,
            shift,
            no_markings,
            is_slope: !flat_junctions,
        },
    ))
}

/// Liest Offset und Delta-Position eines Ecken-Objekts.
fn corner_values(record: &LegacyObject, name: &str) -> Result<(f32, Vec3)> {
    let corner = record
        .field(name)
        .and_then(LegacyValue::as_object)
        .with_context(|| format!("{} fehlt oder ist kein Objekt", name))?;
    if !is_corner_type(&corner.type_name) {
        bail!("Unbekannter Ecken-Typ '{}'", corner.type_name);
    }

    let offset = corner
        .field("Offset")
        .and_then(LegacyValue::as_f32)
        .unwrap_or(0.0);
    let delta = corner
        .field("DeltaPos")
        .and_then(LegacyValue::as_vec3)
        .unwrap_or(Vec3::ZERO);
    Ok((offset, delta))
}

fn is_corner_type(name: &str) -> bool {
    matches!(name, TYPE_CORNER_GEN0 | TYPE_CORNER)
}

/// Übersetzt das alte Style-Enum in den heutigen [`NodeStyle`].
fn style_from_value(value: Option<&LegacyValue>) -> Option<NodeStyle> {
    let object = value?.as_object()?;
    if object.type_name != TYPE_STYLE_ENUM {
        return None;
    }
    let raw = object.field("Value").and_then(LegacyValue::as_i32)?;
    u8::try_from(raw).ok().and_then(NodeStyle::from_tag)
}
