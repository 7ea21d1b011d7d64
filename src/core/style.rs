//! Die Knoten-Styles und ihre Daten-Tabellen.
//!
//! Ein Style ist eine geschlossene Variante ohne virtuellen Dispatch:
//! Defaults und unterstützte Regler stehen in `match`-Tabellen.

use crate::options::{
    OFFSET_MAX, OFFSET_MIN, ROTATE_MAX, SHIFT_MAX, SLOPE_MAX, TWIST_MAX, UTURN_CLEARANCE,
};
use crate::topology::RoadInfo;
use std::fmt;

/// Die fünf skalaren Regler eines Segmentendes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarControl {
    /// Längs-Offset entlang der Kurve.
    Offset,
    /// Seitliche Verschiebung.
    Shift,
    /// Drehung der Schnittlinie.
    Rotate,
    /// Längsneigung.
    Slope,
    /// Querneigung.
    Twist,
}

impl ScalarControl {
    /// Alle Regler in fester Reihenfolge.
    pub const ALL: [ScalarControl; 5] = [
        ScalarControl::Offset,
        ScalarControl::Shift,
        ScalarControl::Rotate,
        ScalarControl::Slope,
        ScalarControl::Twist,
    ];

    /// Begrenzt einen Wert auf den zulässigen Bereich des Reglers.
    pub fn clamp(self, value: f32) -> f32 {
        match self {
            ScalarControl::Offset => value.clamp(OFFSET_MIN, OFFSET_MAX),
            ScalarControl::Shift => value.clamp(-SHIFT_MAX, SHIFT_MAX),
            ScalarControl::Rotate => value.clamp(-ROTATE_MAX, ROTATE_MAX),
            ScalarControl::Slope => value.clamp(-SLOPE_MAX, SLOPE_MAX),
            ScalarControl::Twist => value.clamp(-TWIST_MAX, TWIST_MAX),
        }
    }
}

/// Verhaltens-Klassifikation eines Knotens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeStyle {
    /// Unsichtbarer Durchgangsknoten auf gerader Strecke.
    Middle,
    /// Durchgangsknoten mit Richtungswechsel.
    Bend,
    /// Durchgangsknoten mit gestreckter Fahrbahn-Textur.
    Stretch,
    /// Fußgängerüberweg.
    Crossing,
    /// Wendeknoten.
    UTurn,
    /// Frei konfigurierbare Kreuzung.
    #[default]
    Custom,
    /// Endknoten.
    End,
}

impl NodeStyle {
    /// Alle Styles in Tag-Reihenfolge.
    pub const ALL: [NodeStyle; 7] = [
        NodeStyle::Middle,
        NodeStyle::Bend,
        NodeStyle::Stretch,
        NodeStyle::Crossing,
        NodeStyle::UTurn,
        NodeStyle::Custom,
        NodeStyle::End,
    ];

    /// Stabiler numerischer Tag für die Persistenz.
    pub fn tag(self) -> u8 {
        match self {
            NodeStyle::Middle => 0,
            NodeStyle::Bend => 1,
            NodeStyle::Stretch => 2,
            NodeStyle::Crossing => 3,
            NodeStyle::UTurn => 4,
            NodeStyle::Custom => 5,
            NodeStyle::End => 6,
        }
    }

    /// Style aus dem Persistenz-Tag, `None` für unbekannte Werte.
    pub fn from_tag(tag: u8) -> Option<NodeStyle> {
        match tag {
            0 => Some(NodeStyle::Middle),
            1 => Some(NodeStyle::Bend),
            2 => Some(NodeStyle::Stretch),
            3 => Some(NodeStyle::Crossing),
            4 => Some(NodeStyle::UTurn),
            5 => Some(NodeStyle::Custom),
            6 => Some(NodeStyle::End),
            _ => None,
        }
    }

    /// Default-Offset des Styles für die gegebene Straße.
    pub fn default_offset(self, road: &RoadInfo) -> f32 {
        match self {
            NodeStyle::UTurn => UTURN_CLEARANCE,
            _ => road.min_corner_offset,
        }
    }

    /// Prüft ob der Style den Regler freigibt.
    ///
    /// Nicht freigegebene Regler fallen beim Style-Wechsel auf ihren
    /// Default zurück.
    pub fn supports(self, control: ScalarControl) -> bool {
        use ScalarControl::*;
        match self {
            NodeStyle::Middle => matches!(control, Shift | Slope | Twist),
            NodeStyle::Bend => matches!(control, Offset | Shift | Rotate | Twist),
            NodeStyle::Stretch => matches!(control, Offset | Shift | Rotate),
            NodeStyle::Crossing => matches!(control, Shift),
            NodeStyle::UTurn => matches!(control, Shift),
            NodeStyle::Custom => true,
            NodeStyle::End => true,
        }
    }

    /// Styles, die am Knoten eine Fahrbahn-Transition erzwingen.
    pub fn needs_transition(self) -> bool {
        matches!(
            self,
            NodeStyle::Custom | NodeStyle::Crossing | NodeStyle::UTurn
        )
    }
}

impl fmt::Display for NodeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeStyle::Middle => "Middle",
            NodeStyle::Bend => "Bend",
            NodeStyle::Stretch => "Stretch",
            NodeStyle::Crossing => "Crossing",
            NodeStyle::UTurn => "UTurn",
            NodeStyle::Custom => "Custom",
            NodeStyle::End => "End",
        };
        write!(f, "{}", name)
    }
}
