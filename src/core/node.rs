//! Ein Knoten-Eintrag: Style, Default-Klassifikation und Segmentenden.

use super::{MainRoad, NodeStyle};
use crate::topology::{NodeFlags, NodeId, SegmentId};
use anyhow::{bail, Result};
use indexmap::IndexSet;
use std::fmt;

/// Der Kontroll-Eintrag eines Knotens.
///
/// Hält nur IDs: die Segmentenden-Einträge selbst gehören der
/// [`ControlMap`](super::ControlMap). Die Reihenfolge in `segment_ends`
/// ist vertraglich: Überlebende behalten beim Abgleich ihre Position,
/// neue IDs werden angehängt.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeControl {
    /// Netzwerk-ID des Knotens.
    pub id: NodeId,
    /// Aktiver Style.
    pub style: NodeStyle,
    /// Netzwerk-Flags zum Zeitpunkt des letzten Abgleichs.
    pub default_flags: NodeFlags,
    /// Aus den Flags abgeleiteter Default-Style.
    pub default_style: NodeStyle,
    /// Anliegende Segmente in Einfüge-Reihenfolge.
    pub segment_ends: IndexSet<SegmentId>,
    /// Das priorisierte Hauptstraßen-Paar.
    pub main_road: MainRoad,
}

impl NodeControl {
    /// Erstellt einen Eintrag mit Default-Style.
    pub fn new(id: NodeId) -> Self {
        Self::with_style(id, NodeStyle::default())
    }

    /// Erstellt einen Eintrag mit explizitem Style (Persistenz, Migration).
    pub fn with_style(id: NodeId, style: NodeStyle) -> Self {
        Self {
            id,
            style,
            default_flags: NodeFlags::NONE,
            default_style: NodeStyle::default(),
            segment_ends: IndexSet::new(),
            main_road: MainRoad::default(),
        }
    }

    /// Anzahl der Segmentenden.
    pub fn segment_count(&self) -> usize {
        self.segment_ends.len()
    }

    /// Endknoten: genau ein Segment.
    pub fn is_end(&self) -> bool {
        self.segment_count() == 1
    }

    /// Durchgangsknoten: genau zwei Segmente.
    pub fn is_main(&self) -> bool {
        self.segment_count() == 2
    }

    /// Kreuzungsknoten: drei oder mehr Segmente.
    pub fn is_junction(&self) -> bool {
        self.segment_count() > 2
    }

    /// Prüft ob das Segment an diesem Knoten anliegt.
    pub fn contains_segment(&self, segment: SegmentId) -> bool {
        self.segment_ends.contains(&segment)
    }

    /// Leitet den Default-Style aus den Netzwerk-Flags ab.
    ///
    /// Prüf-Reihenfolge: MIDDLE, BEND, JUNCTION, END. Ein Flag-Muster ohne
    /// Treffer ist eine Invarianten-Verletzung und wird nie geraten.
    pub fn default_style_from_flags(flags: NodeFlags) -> Result<NodeStyle> {
        if flags.contains(NodeFlags::MIDDLE) {
            Ok(NodeStyle::Middle)
        } else if flags.contains(NodeFlags::BEND) {
            Ok(NodeStyle::Bend)
        } else if flags.contains(NodeFlags::JUNCTION) {
            Ok(NodeStyle::Custom)
        } else if flags.contains(NodeFlags::END) {
            Ok(NodeStyle::End)
        } else {
            bail!("Kein Default-Style für Flags {} ableitbar", flags);
        }
    }
}

impl fmt::Display for NodeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node #{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_ableitung() {
        let middle = NodeFlags::CREATED | NodeFlags::MIDDLE;
        let bend = NodeFlags::CREATED | NodeFlags::BEND;
        let junction = NodeFlags::CREATED | NodeFlags::JUNCTION;
        let end = NodeFlags::CREATED | NodeFlags::END;

        assert_eq!(
            NodeControl::default_style_from_flags(middle).ok(),
            Some(NodeStyle::Middle)
        );
        assert_eq!(
            NodeControl::default_style_from_flags(bend).ok(),
            Some(NodeStyle::Bend)
        );
        assert_eq!(
            NodeControl::default_style_from_flags(junction).ok(),
            Some(NodeStyle::Custom)
        );
        assert_eq!(
            NodeControl::default_style_from_flags(end).ok(),
            Some(NodeStyle::End)
        );
    }

    #[test]
    fn test_default_style_middle_schlaegt_junction() {
        // MIDDLE hat Vorrang, falls der Host beide Bits führt
        let flags = NodeFlags::CREATED | NodeFlags::MIDDLE | NodeFlags::JUNCTION;
        assert_eq!(
            NodeControl::default_style_from_flags(flags).ok(),
            Some(NodeStyle::Middle)
        );
    }

    #[test]
    fn test_default_style_ohne_klassifikation_schlaegt_fehl() {
        let result = NodeControl::default_style_from_flags(NodeFlags::CREATED);
        assert!(result.is_err());
    }

    #[test]
    fn test_topologie_klasse() {
        let mut node = NodeControl::new(1);
        node.segment_ends.insert(10);
        assert!(node.is_end());
        node.segment_ends.insert(11);
        assert!(node.is_main());
        node.segment_ends.insert(12);
        assert!(node.is_junction());
        assert!(node.contains_segment(11));
        assert!(!node.contains_segment(99));
    }
}
