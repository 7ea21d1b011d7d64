//! In-Memory-Abbild der Netzwerk-Topologie.
//!
//! Referenz-Implementierung des [`TopologyProvider`] für Hosts, die ihr
//! Netzwerk spiegeln, und für alle Tests. Die Klassifikations-Flags
//! (END/MIDDLE/BEND/JUNCTION) werden wie in der Host-Engine aus der
//! Segment-Anzahl und den Richtungen abgeleitet.

use super::{NodeFlags, NodeId, RoadInfo, SegmentAnchors, SegmentId, TopologyProvider};
use glam::Vec3;
use indexmap::{IndexMap, IndexSet};

/// Flags, die bei der Neuberechnung der Klassifikation erhalten bleiben.
const STICKY_FLAGS: NodeFlags = NodeFlags::from_bits(
    NodeFlags::UNTOUCHABLE.bits()
        | NodeFlags::OUTSIDE.bits()
        | NodeFlags::LEVEL_CROSSING.bits()
        | NodeFlags::TRANSITION.bits()
        | NodeFlags::MOVEABLE.bits()
        | NodeFlags::DELETED.bits(),
);

/// Ein Knoten des gespiegelten Netzwerks.
#[derive(Debug, Clone)]
struct NetNode {
    position: Vec3,
    flags: NodeFlags,
    /// Anliegende Segmente in Einfüge-Reihenfolge.
    segments: IndexSet<SegmentId>,
}

/// Ein Segment des gespiegelten Netzwerks.
#[derive(Debug, Clone)]
struct NetSegment {
    start: NodeId,
    end: NodeId,
    info: RoadInfo,
    /// Richtung am Start-Knoten, ins Segment zeigend.
    start_dir: Vec3,
    /// Richtung am End-Knoten, ins Segment zeigend.
    end_dir: Vec3,
}

/// In-Memory-Netzwerk mit automatischer Flag-Ableitung.
#[derive(Debug, Clone, Default)]
pub struct NetworkModel {
    nodes: IndexMap<NodeId, NetNode>,
    segments: IndexMap<SegmentId, NetSegment>,
}

impl NetworkModel {
    /// Erstellt ein leeres Netzwerk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fügt einen Knoten hinzu.
    pub fn add_node(&mut self, id: NodeId, position: Vec3) {
        self.nodes.insert(
            id,
            NetNode {
                position,
                flags: NodeFlags::CREATED,
                segments: IndexSet::new(),
            },
        );
        self.reclassify(id);
    }

    /// Fügt ein gerades Segment zwischen zwei Knoten hinzu.
    /// Die Richtungen folgen der Verbindungsgeraden.
    pub fn add_segment(&mut self, id: SegmentId, start: NodeId, end: NodeId, info: RoadInfo) -> bool {
        let (Some(start_pos), Some(end_pos)) = (self.node_position(start), self.node_position(end))
        else {
            log::warn!("Segment #{}: Endknoten fehlen im Netzwerk", id);
            return false;
        };
        let chord = (end_pos - start_pos).normalize_or_zero();
        self.insert_segment(id, start, end, info, chord, -chord)
    }

    /// Fügt ein gekrümmtes Segment mit expliziten Anker-Richtungen hinzu.
    /// Beide Richtungen zeigen vom jeweiligen Knoten ins Segment.
    pub fn add_segment_curved(
        &mut self,
        id: SegmentId,
        start: NodeId,
        end: NodeId,
        info: RoadInfo,
        start_dir: Vec3,
        end_dir: Vec3,
    ) -> bool {
        if self.node_position(start).is_none() || self.node_position(end).is_none() {
            log::warn!("Segment #{}: Endknoten fehlen im Netzwerk", id);
            return false;
        }
        self.insert_segment(id, start, end, info, start_dir.normalize_or_zero(), end_dir.normalize_or_zero())
    }

    fn insert_segment(
        &mut self,
        id: SegmentId,
        start: NodeId,
        end: NodeId,
        info: RoadInfo,
        start_dir: Vec3,
        end_dir: Vec3,
    ) -> bool {
        self.segments.insert(
            id,
            NetSegment {
                start,
                end,
                info,
                start_dir,
                end_dir,
            },
        );
        if let Some(node) = self.nodes.get_mut(&start) {
            node.segments.insert(id);
        }
        if let Some(node) = self.nodes.get_mut(&end) {
            node.segments.insert(id);
        }
        self.reclassify(start);
        self.reclassify(end);
        true
    }

    /// Entfernt ein Segment und klassifiziert die Endknoten neu.
    pub fn remove_segment(&mut self, id: SegmentId) -> bool {
        let Some(segment) = self.segments.shift_remove(&id) else {
            return false;
        };
        if let Some(node) = self.nodes.get_mut(&segment.start) {
            node.segments.shift_remove(&id);
        }
        if let Some(node) = self.nodes.get_mut(&segment.end) {
            node.segments.shift_remove(&id);
        }
        self.reclassify(segment.start);
        self.reclassify(segment.end);
        true
    }

    /// Entfernt einen Knoten inklusive aller anliegenden Segmente.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.shift_remove(&id) else {
            return false;
        };
        for segment_id in node.segments {
            self.remove_segment(segment_id);
        }
        true
    }

    /// Position eines Knotens.
    pub fn node_position(&self, id: NodeId) -> Option<Vec3> {
        self.nodes.get(&id).map(|n| n.position)
    }

    /// Setzt die Flags eines Knotens direkt (Host-Rückschreibung, Tests).
    pub fn set_node_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.flags = flags;
        }
    }

    /// Setzt oder löscht ein persistentes Zusatz-Flag (UNTOUCHABLE, OUTSIDE, ...).
    pub fn mark(&mut self, id: NodeId, flag: NodeFlags, on: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.flags.set(flag, on);
        }
    }

    /// Ersetzt die Straßen-Beschreibung eines Segments (z.B. nach Upgrade).
    pub fn set_road_info(&mut self, id: SegmentId, info: RoadInfo) -> bool {
        let Some(segment) = self.segments.get_mut(&id) else {
            return false;
        };
        segment.info = info;
        let (start, end) = (segment.start, segment.end);
        self.reclassify(start);
        self.reclassify(end);
        true
    }

    /// Anzahl der Knoten.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Anzahl der Segmente.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Leitet die Klassifikations-Flags eines Knotens neu ab.
    ///
    /// Logik wie in der Host-Engine:
    /// - 0 Segmente → nur CREATED
    /// - 1 Segment → END
    /// - 2 Segmente, entgegengesetzte Richtungen und gleiche Breite → MIDDLE
    /// - 2 Segmente sonst → BEND
    /// - ab 3 Segmenten → JUNCTION
    fn reclassify(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let sticky = NodeFlags::from_bits(node.flags.bits() & STICKY_FLAGS.bits());
        let segment_ids: Vec<SegmentId> = node.segments.iter().copied().collect();

        let class = match segment_ids.len() {
            0 => NodeFlags::NONE,
            1 => NodeFlags::END,
            2 => {
                let a = segment_ids[0];
                let b = segment_ids[1];
                if self.is_straight_pair(a, b, id) {
                    NodeFlags::MIDDLE
                } else {
                    NodeFlags::BEND
                }
            }
            _ => NodeFlags::JUNCTION,
        };

        if let Some(node) = self.nodes.get_mut(&id) {
            node.flags = NodeFlags::CREATED | class | sticky;
        }
    }

    /// Zwei Segmente bilden eine gerade Durchfahrt: entgegengesetzte
    /// Richtungen am Knoten und gleiche Fahrbahnbreite.
    fn is_straight_pair(&self, a: SegmentId, b: SegmentId, node: NodeId) -> bool {
        let (Some(dir_a), Some(dir_b)) = (
            self.segment_direction(a, node),
            self.segment_direction(b, node),
        ) else {
            return false;
        };
        let (Some(info_a), Some(info_b)) = (self.road_info(a), self.road_info(b)) else {
            return false;
        };
        dir_a.dot(dir_b) < -0.99
            && (info_a.half_width - info_b.half_width).abs() < 0.01
            && info_a.class == info_b.class
    }
}

impl TopologyProvider for NetworkModel {
    fn node_exists(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn segment_exists(&self, segment: SegmentId) -> bool {
        self.segments.contains_key(&segment)
    }

    fn node_flags(&self, node: NodeId) -> NodeFlags {
        self.nodes.get(&node).map(|n| n.flags).unwrap_or_default()
    }

    fn node_segments(&self, node: NodeId) -> Vec<SegmentId> {
        self.nodes
            .get(&node)
            .map(|n| n.segments.iter().copied().collect())
            .unwrap_or_default()
    }

    fn segment_nodes(&self, segment: SegmentId) -> Option<(NodeId, NodeId)> {
        self.segments.get(&segment).map(|s| (s.start, s.end))
    }

    fn road_info(&self, segment: SegmentId) -> Option<RoadInfo> {
        self.segments.get(&segment).map(|s| s.info.clone())
    }

    fn segment_anchors(&self, segment: SegmentId) -> Option<SegmentAnchors> {
        let s = self.segments.get(&segment)?;
        Some(SegmentAnchors {
            start_pos: self.node_position(s.start)?,
            start_dir: s.start_dir,
            end_pos: self.node_position(s.end)?,
            end_dir: s.end_dir,
        })
    }

    fn segment_ids(&self) -> Vec<SegmentId> {
        self.segments.keys().copied().collect()
    }
}
