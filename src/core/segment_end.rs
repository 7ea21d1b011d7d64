//! Ein Segmentende: die Geometrie-Einstellungen eines Segments an einem Knoten.

use super::{NodeStyle, ScalarControl};
use crate::geometry::BezierTrajectory;
use crate::topology::{NodeFlags, NodeId, RoadInfo, SegmentId};
use glam::Vec3;
use std::fmt;

/// Toleranz für den Default-Vergleich der Skalare.
const DEFAULT_EPSILON: f32 = 0.001;

/// Eine Mesh-Ecke des Segmentendes: Position und Richtung ins Segment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Corner {
    /// Welt-Position der Ecke.
    pub position: Vec3,
    /// Normalisierte Richtung vom Knoten ins Segment.
    pub direction: Vec3,
}

/// Die booleschen Schalter eines Segmentendes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndFlag {
    /// Fahrbahn-Markierungen unterdrücken.
    NoMarkings,
    /// Ende folgt dem Höhenverlauf der Kurve.
    IsSlope,
    /// Querneigung anwenden.
    IsTwist,
    /// Fußgängerüberwege unterdrücken.
    NoCrossings,
    /// Kreuzungs-Textur unterdrücken.
    NoJunctionTexture,
    /// Kreuzungs-Props unterdrücken.
    NoJunctionProps,
    /// Ampel-Props unterdrücken.
    NoTlProps,
}

/// Geometrie-Einstellungen eines Segments an genau einem Knoten.
///
/// Die fünf Skalare steuern die Schnitt-Geometrie, die Flags das
/// Vertikal-Verhalten und die Textur-Unterdrückung. Die gecachten Felder
/// werden von `ops::geometry` nach jeder Änderung neu berechnet.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentEnd {
    /// Segment, zu dem dieses Ende gehört.
    pub segment_id: SegmentId,
    /// Knoten, an dem dieses Ende liegt.
    pub node_id: NodeId,

    // ── Skalare Regler ──────────────────────────────────────────
    /// Längs-Offset der Schnittlinie entlang der Kurve (Meter).
    pub offset: f32,
    /// Seitliche Verschiebung des Segments (Meter, positiv = links).
    pub shift: f32,
    /// Drehung der Schnittlinie (Grad).
    pub rotate_angle: f32,
    /// Zusätzliche Längsneigung der Schnittebene (Grad).
    pub slope_angle: f32,
    /// Querneigung der Schnittebene (Grad, positiv hebt die rechte Ecke).
    pub twist_angle: f32,

    // ── Flags ───────────────────────────────────────────────────
    /// Fahrbahn-Markierungen am Ende unterdrücken.
    pub no_markings: bool,
    /// Ende folgt dem Höhenverlauf der Kurve (false = flache Kreuzungsebene).
    pub is_slope: bool,
    /// Querneigung wird auf die Ecken angewendet.
    pub is_twist: bool,
    /// Fußgängerüberwege unterdrücken.
    pub no_crossings: bool,
    /// Kreuzungs-Textur unterdrücken.
    pub no_junction_texture: bool,
    /// Kreuzungs-Props unterdrücken.
    pub no_junction_props: bool,
    /// Ampel-Props unterdrücken.
    pub no_tl_props: bool,

    // ── Gecachte Geometrie ──────────────────────────────────────
    /// Linke Mesh-Ecke.
    pub left_corner: Corner,
    /// Rechte Mesh-Ecke.
    pub right_corner: Corner,
    /// Referenzpunkt des Endes (Schnitt der Ecken-Sehne mit der Kurve).
    pub position: Vec3,
    /// Querneigung der Ecken-Sehne in Grad (aus den Ecken abgeleitet).
    pub cached_super_elevation_deg: f32,
    /// Segment-Kurve, vom eigenen Knoten weg orientiert (inkl. Shift).
    pub trajectory: BezierTrajectory,
}

impl SegmentEnd {
    /// Erstellt ein neutrales Segmentende ohne berechnete Geometrie.
    pub fn new(segment_id: SegmentId, node_id: NodeId) -> Self {
        Self {
            segment_id,
            node_id,
            offset: 0.0,
            shift: 0.0,
            rotate_angle: 0.0,
            slope_angle: 0.0,
            twist_angle: 0.0,
            no_markings: false,
            is_slope: true,
            is_twist: false,
            no_crossings: false,
            no_junction_texture: false,
            no_junction_props: false,
            no_tl_props: false,
            left_corner: Corner::default(),
            right_corner: Corner::default(),
            position: Vec3::ZERO,
            cached_super_elevation_deg: 0.0,
            trajectory: BezierTrajectory::default(),
        }
    }

    /// Default für `is_slope` invertiert: flache Kreuzungsebene wenn die
    /// Straße es erzwingt oder der Knoten unantastbar ist.
    pub fn default_is_flat(road: &RoadInfo, node_flags: NodeFlags) -> bool {
        road.flat_junctions || node_flags.contains(NodeFlags::UNTOUCHABLE)
    }

    /// Default für `is_twist`: nur flache, antastbare Enden drehen mit.
    pub fn default_is_twist(road: &RoadInfo, node_flags: NodeFlags) -> bool {
        Self::default_is_flat(road, node_flags) && !node_flags.contains(NodeFlags::UNTOUCHABLE)
    }

    /// Wert eines Reglers.
    pub fn scalar(&self, control: ScalarControl) -> f32 {
        match control {
            ScalarControl::Offset => self.offset,
            ScalarControl::Shift => self.shift,
            ScalarControl::Rotate => self.rotate_angle,
            ScalarControl::Slope => self.slope_angle,
            ScalarControl::Twist => self.twist_angle,
        }
    }

    /// Setzt einen Regler ohne Clamping.
    pub fn set_scalar(&mut self, control: ScalarControl, value: f32) {
        match control {
            ScalarControl::Offset => self.offset = value,
            ScalarControl::Shift => self.shift = value,
            ScalarControl::Rotate => self.rotate_angle = value,
            ScalarControl::Slope => self.slope_angle = value,
            ScalarControl::Twist => self.twist_angle = value,
        }
    }

    /// Default-Wert eines Reglers für den gegebenen Style.
    pub fn default_scalar(control: ScalarControl, style: NodeStyle, road: &RoadInfo) -> f32 {
        match control {
            ScalarControl::Offset => style.default_offset(road),
            _ => 0.0,
        }
    }

    /// Liest einen booleschen Schalter.
    pub fn flag(&self, flag: EndFlag) -> bool {
        match flag {
            EndFlag::NoMarkings => self.no_markings,
            EndFlag::IsSlope => self.is_slope,
            EndFlag::IsTwist => self.is_twist,
            EndFlag::NoCrossings => self.no_crossings,
            EndFlag::NoJunctionTexture => self.no_junction_texture,
            EndFlag::NoJunctionProps => self.no_junction_props,
            EndFlag::NoTlProps => self.no_tl_props,
        }
    }

    /// Setzt einen booleschen Schalter.
    pub fn set_flag(&mut self, flag: EndFlag, on: bool) {
        match flag {
            EndFlag::NoMarkings => self.no_markings = on,
            EndFlag::IsSlope => self.is_slope = on,
            EndFlag::IsTwist => self.is_twist = on,
            EndFlag::NoCrossings => self.no_crossings = on,
            EndFlag::NoJunctionTexture => self.no_junction_texture = on,
            EndFlag::NoJunctionProps => self.no_junction_props = on,
            EndFlag::NoTlProps => self.no_tl_props = on,
        }
    }

    /// Setzt das Ende auf die Defaults des Styles zurück.
    ///
    /// Flags werden immer zurückgesetzt. Skalare: mit `force` alle, ohne
    /// `force` behalten vom Style freigegebene Regler ihren (begrenzten)
    /// Wert, nicht freigegebene fallen auf den Default zurück.
    pub fn reset_to_default(
        &mut self,
        style: NodeStyle,
        road: &RoadInfo,
        node_flags: NodeFlags,
        force: bool,
    ) {
        for control in ScalarControl::ALL {
            if force || !style.supports(control) {
                self.set_scalar(control, Self::default_scalar(control, style, road));
            } else {
                self.set_scalar(control, control.clamp(self.scalar(control)));
            }
        }

        self.no_markings = false;
        self.no_crossings = false;
        self.no_junction_texture = false;
        self.no_junction_props = false;
        self.no_tl_props = false;
        self.is_slope = !Self::default_is_flat(road, node_flags);
        self.is_twist = Self::default_is_twist(road, node_flags);
    }

    /// Prüft ob das Ende vollständig auf seinen Defaults steht.
    pub fn is_default(&self, style: NodeStyle, road: &RoadInfo, node_flags: NodeFlags) -> bool {
        for control in ScalarControl::ALL {
            let default = Self::default_scalar(control, style, road);
            if (self.scalar(control) - default).abs() > DEFAULT_EPSILON {
                return false;
            }
        }
        !self.no_markings
            && !self.no_crossings
            && !self.no_junction_texture
            && !self.no_junction_props
            && !self.no_tl_props
            && self.is_slope == !Self::default_is_flat(road, node_flags)
            && self.is_twist == Self::default_is_twist(road, node_flags)
    }

    /// Kopie des Endes unter neuer Segment-ID (Rename-Migration).
    /// Alle Einstellungen und Caches bleiben erhalten.
    pub fn renamed(&self, new_segment: SegmentId) -> Self {
        Self {
            segment_id: new_segment,
            ..self.clone()
        }
    }
}

impl fmt::Display for SegmentEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Segment #{} @ Node #{}", self.segment_id, self.node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn road() -> RoadInfo {
        RoadInfo::default()
    }

    #[test]
    fn test_reset_force_setzt_alles_zurueck() {
        let mut end = SegmentEnd::new(10, 1);
        end.offset = 5.0;
        end.shift = 2.0;
        end.slope_angle = 12.0;
        end.no_markings = true;

        end.reset_to_default(NodeStyle::Custom, &road(), NodeFlags::CREATED, true);
        assert_eq!(end.offset, 0.0);
        assert_eq!(end.shift, 0.0);
        assert_eq!(end.slope_angle, 0.0);
        assert!(!end.no_markings);
        assert!(end.is_slope);
        assert!(!end.is_twist);
    }

    #[test]
    fn test_reset_ohne_force_behaelt_freigegebene_regler() {
        let mut end = SegmentEnd::new(10, 1);
        end.offset = 5.0;
        end.shift = 2.0;
        end.rotate_angle = 15.0;

        // Middle gibt Shift frei, aber weder Offset noch Rotate
        end.reset_to_default(NodeStyle::Middle, &road(), NodeFlags::CREATED, false);
        assert_eq!(end.offset, 0.0);
        assert_eq!(end.shift, 2.0);
        assert_eq!(end.rotate_angle, 0.0);
    }

    #[test]
    fn test_reset_ist_idempotent() {
        let mut end = SegmentEnd::new(10, 1);
        end.offset = 30.0;
        end.twist_angle = 8.0;

        end.reset_to_default(NodeStyle::Custom, &road(), NodeFlags::CREATED, true);
        let nach_erstem = end.clone();
        end.reset_to_default(NodeStyle::Custom, &road(), NodeFlags::CREATED, true);
        assert_eq!(end, nach_erstem);
        assert!(end.is_default(NodeStyle::Custom, &road(), NodeFlags::CREATED));
    }

    #[test]
    fn test_uturn_default_offset() {
        let mut end = SegmentEnd::new(10, 1);
        end.reset_to_default(NodeStyle::UTurn, &road(), NodeFlags::CREATED, true);
        assert_eq!(end.offset, crate::options::UTURN_CLEARANCE);
        assert!(end.is_default(NodeStyle::UTurn, &road(), NodeFlags::CREATED));
        assert!(!end.is_default(NodeStyle::Custom, &road(), NodeFlags::CREATED));
    }

    #[test]
    fn test_flat_defaults_bei_untouchable() {
        let flags = NodeFlags::CREATED | NodeFlags::UNTOUCHABLE;
        assert!(SegmentEnd::default_is_flat(&road(), flags));
        assert!(!SegmentEnd::default_is_twist(&road(), flags));

        let flache_strasse = RoadInfo {
            flat_junctions: true,
            ..road()
        };
        assert!(SegmentEnd::default_is_flat(&flache_strasse, NodeFlags::CREATED));
        assert!(SegmentEnd::default_is_twist(&flache_strasse, NodeFlags::CREATED));
    }

    #[test]
    fn test_renamed_uebernimmt_einstellungen() {
        let mut end = SegmentEnd::new(10, 1);
        end.offset = 4.5;
        end.no_markings = true;

        let renamed = end.renamed(99);
        assert_eq!(renamed.segment_id, 99);
        assert_eq!(renamed.node_id, 1);
        assert_eq!(renamed.offset, 4.5);
        assert!(renamed.no_markings);
    }
}
