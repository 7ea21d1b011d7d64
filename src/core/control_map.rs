//! Die zentrale Registry für Knoten-Einträge und Segmentenden.

use super::{NodeControl, SegmentEnd};
use crate::topology::{NodeId, SegmentId};
use indexmap::IndexMap;

#[cfg(test)]
mod tests;

/// Container für alle Kontroll-Daten des Netzwerks.
///
/// Wird beim Aktivieren erstellt, lazy befüllt und beim Deaktivieren
/// vollständig geleert. Knoten-Einträge und Segmentenden werden hier
/// gemeinsam besessen; Querbezüge laufen ausschließlich über IDs.
#[derive(Debug, Clone, Default)]
pub struct ControlMap {
    /// Alle Knoten-Einträge, indexiert nach Knoten-ID.
    nodes: IndexMap<NodeId, NodeControl>,
    /// Alle Segmentenden, indexiert nach (Segment-ID, Knoten-ID).
    segment_ends: IndexMap<(SegmentId, NodeId), SegmentEnd>,
}

impl ControlMap {
    /// Erstellt eine leere Registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Leert die Registry vollständig (Deaktivierung).
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.segment_ends.clear();
    }

    /// Prüft ob ein Knoten-Eintrag existiert.
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Knoten-Eintrag (read-only).
    pub fn node(&self, node: NodeId) -> Option<&NodeControl> {
        self.nodes.get(&node)
    }

    /// Knoten-Eintrag (mutierbar).
    pub fn node_mut(&mut self, node: NodeId) -> Option<&mut NodeControl> {
        self.nodes.get_mut(&node)
    }

    /// Fügt einen Knoten-Eintrag ein.
    pub fn insert_node(&mut self, node: NodeControl) {
        self.nodes.insert(node.id, node);
    }

    /// Entfernt einen Knoten-Eintrag inklusive aller seiner Segmentenden.
    pub fn remove_node(&mut self, node: NodeId) -> Option<NodeControl> {
        let removed = self.nodes.shift_remove(&node);
        if removed.is_some() {
            self.segment_ends.retain(|(_, n), _| *n != node);
        }
        removed
    }

    /// Segmentende (read-only).
    pub fn segment_end(&self, segment: SegmentId, node: NodeId) -> Option<&SegmentEnd> {
        self.segment_ends.get(&(segment, node))
    }

    /// Segmentende (mutierbar).
    pub fn segment_end_mut(&mut self, segment: SegmentId, node: NodeId) -> Option<&mut SegmentEnd> {
        self.segment_ends.get_mut(&(segment, node))
    }

    /// Fügt ein Segmentende ein.
    pub fn insert_segment_end(&mut self, end: SegmentEnd) {
        self.segment_ends.insert((end.segment_id, end.node_id), end);
    }

    /// Entfernt ein Segmentende.
    pub fn remove_segment_end(&mut self, segment: SegmentId, node: NodeId) -> Option<SegmentEnd> {
        self.segment_ends.shift_remove(&(segment, node))
    }

    /// Das gegenüberliegende Ende desselben Segments am anderen Knoten.
    /// Lineare Suche; die Registry enthält nur angefasste Knoten.
    pub fn other_end(&self, segment: SegmentId, node: NodeId) -> Option<&SegmentEnd> {
        self.segment_ends
            .iter()
            .find(|((s, n), _)| *s == segment && *n != node)
            .map(|(_, end)| end)
    }

    /// Alle Segmentenden eines Knotens in Eintrag-Reihenfolge.
    pub fn ends_of_node(&self, node: NodeId) -> Vec<&SegmentEnd> {
        let Some(entry) = self.nodes.get(&node) else {
            return Vec::new();
        };
        entry
            .segment_ends
            .iter()
            .filter_map(|&segment| self.segment_ends.get(&(segment, node)))
            .collect()
    }

    /// Anzahl der Knoten-Einträge.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Anzahl der Segmentenden.
    pub fn segment_end_count(&self) -> usize {
        self.segment_ends.len()
    }

    /// Iterator über alle Knoten-Einträge.
    pub fn nodes_iter(&self) -> impl Iterator<Item = &NodeControl> {
        self.nodes.values()
    }

    /// Alle Knoten-IDs in Eintrag-Reihenfolge.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    /// Iterator über alle Segmentenden.
    pub fn segment_ends_iter(&self) -> impl Iterator<Item = &SegmentEnd> {
        self.segment_ends.values()
    }
}
