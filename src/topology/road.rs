//! Straßen-Beschreibung eines Segments (vom Host geliefert).

/// Grobe Klasse des Netz-Typs eines Segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoadClass {
    /// Normale Straße mit Standard-Texturen.
    #[default]
    Road,
    /// Fußweg.
    Path,
    /// Gleis.
    Rail,
    /// Prozedural generiertes Netz ohne Standard-Texturen.
    Procedural,
}

/// Eigenschaften der Straße eines Segments.
///
/// Wird pro Abfrage frisch vom [`TopologyProvider`](super::TopologyProvider)
/// geholt und nie über mehrere Topologie-Änderungen hinweg gecacht.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadInfo {
    /// Halbe Fahrbahnbreite in Metern.
    pub half_width: f32,
    /// Anzahl Fahrspuren in Segment-Richtung.
    pub forward_lanes: u32,
    /// Anzahl Fahrspuren entgegen der Segment-Richtung.
    pub backward_lanes: u32,
    /// Anzahl Fußgängerspuren.
    pub pedestrian_lanes: u32,
    /// Die Straße erzwingt flache Kreuzungsflächen.
    pub flat_junctions: bool,
    /// Autobahn-Regeln (kein Fußverkehr, eigene Vorfahrtslogik).
    pub highway_rules: bool,
    /// Netz-Klasse.
    pub class: RoadClass,
    /// Minimaler Korner-Offset der Straße in Metern (meist 0).
    pub min_corner_offset: f32,
}

impl RoadInfo {
    /// Prüft ob das Segment eine Straße ist (keine Gleise, keine Wege).
    pub fn is_road(&self) -> bool {
        self.class == RoadClass::Road
    }

    /// Prüft ob die Kreuzungs-Texturen der Straße veränderbar sind.
    /// Prozedurale Netze bringen ihre eigene Geometrie mit.
    pub fn can_modify_textures(&self) -> bool {
        self.class == RoadClass::Road
    }

    /// Prüft ob das Segment ein prozedural generiertes Netz ist.
    pub fn is_procedural(&self) -> bool {
        self.class == RoadClass::Procedural
    }
}

impl Default for RoadInfo {
    fn default() -> Self {
        Self {
            half_width: 8.0,
            forward_lanes: 2,
            backward_lanes: 2,
            pedestrian_lanes: 2,
            flat_junctions: false,
            highway_rules: false,
            class: RoadClass::Road,
            min_corner_offset: 0.0,
        }
    }
}
