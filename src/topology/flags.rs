//! Knoten-Flags der Host-Engine als Bitmaske.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bitmaske der Netzwerk-Flags eines Knotens, wie der Host sie führt.
///
/// Die Klassifikations-Bits (END/MIDDLE/BEND/JUNCTION) bestimmen den
/// Default-Style, die übrigen Bits steuern Eignung und Geometrie-Defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeFlags(u32);

impl NodeFlags {
    /// Keine Flags gesetzt.
    pub const NONE: NodeFlags = NodeFlags(0);
    /// Knoten existiert im Netzwerk.
    pub const CREATED: NodeFlags = NodeFlags(1);
    /// Knoten ist zum Löschen markiert.
    pub const DELETED: NodeFlags = NodeFlags(1 << 1);
    /// Endknoten (genau ein Segment).
    pub const END: NodeFlags = NodeFlags(1 << 2);
    /// Durchgangsknoten auf gerader Strecke (unsichtbarer Knoten).
    pub const MIDDLE: NodeFlags = NodeFlags(1 << 3);
    /// Durchgangsknoten mit Richtungswechsel.
    pub const BEND: NodeFlags = NodeFlags(1 << 4);
    /// Kreuzungsknoten (drei oder mehr Segmente).
    pub const JUNCTION: NodeFlags = NodeFlags(1 << 5);
    /// Knoten darf vom Simulationsschritt verschoben werden.
    pub const MOVEABLE: NodeFlags = NodeFlags(1 << 6);
    /// Teil eines Gebäude-Anschlusses, Geometrie darf nicht verändert werden.
    pub const UNTOUCHABLE: NodeFlags = NodeFlags(1 << 7);
    /// Knoten liegt außerhalb der bespielbaren Fläche.
    pub const OUTSIDE: NodeFlags = NodeFlags(1 << 8);
    /// Bahnübergang.
    pub const LEVEL_CROSSING: NodeFlags = NodeFlags(1 << 9);
    /// Übergangs-Knoten (Fahrbahn-Transition zwischen zwei Segmenten).
    pub const TRANSITION: NodeFlags = NodeFlags(1 << 10);

    /// Erstellt Flags aus dem rohen Bitwert.
    pub const fn from_bits(bits: u32) -> Self {
        NodeFlags(bits)
    }

    /// Roher Bitwert.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Prüft ob alle Bits von `other` gesetzt sind.
    pub const fn contains(self, other: NodeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Prüft ob mindestens ein Bit von `other` gesetzt ist.
    pub const fn intersects(self, other: NodeFlags) -> bool {
        self.0 & other.0 != 0
    }

    /// Kopie mit zusätzlich gesetzten Bits.
    pub const fn with(self, other: NodeFlags) -> NodeFlags {
        NodeFlags(self.0 | other.0)
    }

    /// Kopie mit gelöschten Bits.
    pub const fn without(self, other: NodeFlags) -> NodeFlags {
        NodeFlags(self.0 & !other.0)
    }

    /// Setzt oder löscht die Bits von `other`.
    pub fn set(&mut self, other: NodeFlags, on: bool) {
        if on {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }
}

impl BitOr for NodeFlags {
    type Output = NodeFlags;

    fn bitor(self, rhs: NodeFlags) -> NodeFlags {
        NodeFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for NodeFlags {
    fn bitor_assign(&mut self, rhs: NodeFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for NodeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(NodeFlags, &str); 11] = [
            (NodeFlags::CREATED, "Created"),
            (NodeFlags::DELETED, "Deleted"),
            (NodeFlags::END, "End"),
            (NodeFlags::MIDDLE, "Middle"),
            (NodeFlags::BEND, "Bend"),
            (NodeFlags::JUNCTION, "Junction"),
            (NodeFlags::MOVEABLE, "Moveable"),
            (NodeFlags::UNTOUCHABLE, "Untouchable"),
            (NodeFlags::OUTSIDE, "Outside"),
            (NodeFlags::LEVEL_CROSSING, "LevelCrossing"),
            (NodeFlags::TRANSITION, "Transition"),
        ];

        if self.0 == 0 {
            return write!(f, "None");
        }
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}
