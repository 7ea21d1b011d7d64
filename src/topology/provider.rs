//! Abfrage-Schnittstelle zur Netzwerk-Topologie des Hosts.

use super::{NodeFlags, NodeId, RoadInfo, SegmentId};
use glam::Vec3;

/// Kurven-Anker eines Segments: Position und Richtung an beiden Enden.
///
/// Die Richtungen zeigen jeweils vom Knoten in das Segment hinein
/// (Host-Konvention) und sind normalisiert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentAnchors {
    /// Position am Start-Knoten.
    pub start_pos: Vec3,
    /// Richtung am Start-Knoten, ins Segment zeigend.
    pub start_dir: Vec3,
    /// Position am End-Knoten.
    pub end_pos: Vec3,
    /// Richtung am End-Knoten, ins Segment zeigend.
    pub end_dir: Vec3,
}

impl SegmentAnchors {
    /// Anker aus Sicht des angegebenen Knotens: (Position, Richtung ins Segment).
    pub fn at_node(&self, node: NodeId, start_node: NodeId) -> (Vec3, Vec3) {
        if node == start_node {
            (self.start_pos, self.start_dir)
        } else {
            (self.end_pos, self.end_dir)
        }
    }
}

/// Lesender Zugriff auf die live Netzwerk-Topologie.
///
/// Alle Antworten gelten nur für den Moment der Abfrage; der Kern cacht
/// keine Host-Referenzen, nur IDs.
pub trait TopologyProvider {
    /// Prüft ob der Knoten existiert und nutzbar ist.
    fn node_exists(&self, node: NodeId) -> bool;

    /// Prüft ob das Segment existiert und nutzbar ist.
    fn segment_exists(&self, segment: SegmentId) -> bool;

    /// Aktuelle Flags des Knotens (NONE wenn unbekannt).
    fn node_flags(&self, node: NodeId) -> NodeFlags;

    /// IDs aller am Knoten anliegenden Segmente, in Host-Reihenfolge.
    fn node_segments(&self, node: NodeId) -> Vec<SegmentId>;

    /// Start- und End-Knoten des Segments.
    fn segment_nodes(&self, segment: SegmentId) -> Option<(NodeId, NodeId)>;

    /// Straßen-Beschreibung des Segments.
    fn road_info(&self, segment: SegmentId) -> Option<RoadInfo>;

    /// Kurven-Anker des Segments (unverschobene Basis-Geometrie).
    fn segment_anchors(&self, segment: SegmentId) -> Option<SegmentAnchors>;

    /// IDs aller Segmente im Netzwerk (für Wartungs-Durchläufe).
    fn segment_ids(&self) -> Vec<SegmentId>;

    /// Der dem Knoten gegenüberliegende Knoten des Segments.
    fn other_node(&self, segment: SegmentId, node: NodeId) -> Option<NodeId> {
        let (start, end) = self.segment_nodes(segment)?;
        if node == start {
            Some(end)
        } else if node == end {
            Some(start)
        } else {
            None
        }
    }

    /// Richtung vom Knoten ins Segment (normalisiert), falls bekannt.
    fn segment_direction(&self, segment: SegmentId, node: NodeId) -> Option<Vec3> {
        let (start, _) = self.segment_nodes(segment)?;
        let anchors = self.segment_anchors(segment)?;
        let (_, dir) = anchors.at_node(node, start);
        Some(dir)
    }
}
