//! Die Hauptstraße eines Knotens und ihre Auswahl-Logik.
//!
//! Aus allen anliegenden Segmenten wird das Paar mit der höchsten
//! Straßen-Priorität bestimmt. Der Vergleich ist ein lexikografischer
//! Vier-Schlüssel-Vergleich; bei vollständigem Gleichstand gewinnt das
//! zuerst eingefügte Segment (deterministische Reihenfolge).

use crate::topology::{RoadInfo, SegmentId, TopologyProvider};
use indexmap::IndexSet;
use std::cmp::Ordering;

/// Das priorisierte Segment-Paar eines Knotens.
///
/// Beide Mitglieder müssen anliegende Segmente des Knotens sein oder leer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MainRoad {
    /// Segment mit der höchsten Priorität.
    pub first: Option<SegmentId>,
    /// Segment mit der zweithöchsten Priorität.
    pub second: Option<SegmentId>,
}

impl MainRoad {
    /// Prüft ob beide Mitglieder besetzt sind.
    pub fn is_complete(&self) -> bool {
        self.first.is_some() && self.second.is_some()
    }

    /// Prüft ob das Segment Teil der Hauptstraße ist.
    pub fn is_main(&self, segment: SegmentId) -> bool {
        self.first == Some(segment) || self.second == Some(segment)
    }

    /// Beide Mitglieder als Liste.
    pub fn segments(&self) -> Vec<SegmentId> {
        self.first.into_iter().chain(self.second).collect()
    }

    /// Ersetzt ein Mitglied durch eine neue Segment-ID (Rename-Migration).
    pub fn replace(&mut self, from: SegmentId, to: SegmentId) {
        if self.first == Some(from) {
            self.first = Some(to);
        }
        if self.second == Some(from) {
            self.second = Some(to);
        }
    }

    /// Leert beide Mitglieder.
    pub fn clear(&mut self) {
        self.first = None;
        self.second = None;
    }

    /// Revalidiert die Mitglieder gegen die aktuelle Segment-Menge.
    ///
    /// Noch vorhandene Mitglieder bleiben erhalten; fehlende werden über
    /// den Prioritäts-Vergleich neu gewählt.
    pub fn update(&mut self, net: &dyn TopologyProvider, ends: &IndexSet<SegmentId>) {
        if let Some(first) = self.first {
            if !ends.contains(&first) {
                self.first = None;
            }
        }
        if let Some(second) = self.second {
            if !ends.contains(&second) {
                self.second = None;
            }
        }
        if self.first == self.second {
            // Beide leer oder (nach Replace) identisch: sauber neu wählen
            self.second = None;
        }
        if self.first.is_none() {
            self.first = select_main(net, ends, self.second);
        }
        if self.second.is_none() {
            self.second = select_main(net, ends, self.first);
        }
    }
}

/// Lexikografischer Prioritäts-Vergleich zweier Straßen.
///
/// Schlüssel in dieser Reihenfolge: flache Kreuzungsflächen, Anzahl
/// Vorwärts-Fahrspuren, halbe Breite, Autobahn-Regeln. Größer = wichtiger.
pub fn compare_roads(a: &RoadInfo, b: &RoadInfo) -> Ordering {
    a.flat_junctions
        .cmp(&b.flat_junctions)
        .then_with(|| a.forward_lanes.cmp(&b.forward_lanes))
        .then_with(|| a.half_width.total_cmp(&b.half_width))
        .then_with(|| a.highway_rules.cmp(&b.highway_rules))
}

/// Wählt das Segment mit der höchsten Priorität aus `ends`.
///
/// `exclude` wird übersprungen; bei Gleichstand bleibt das zuerst
/// eingefügte Segment. Segmente ohne Straßen-Beschreibung werden ignoriert.
pub fn select_main(
    net: &dyn TopologyProvider,
    ends: &IndexSet<SegmentId>,
    exclude: Option<SegmentId>,
) -> Option<SegmentId> {
    let mut best: Option<(SegmentId, RoadInfo)> = None;
    for &segment in ends {
        if Some(segment) == exclude {
            continue;
        }
        let Some(info) = net.road_info(segment) else {
            continue;
        };
        match &best {
            Some((_, best_info)) if compare_roads(&info, best_info) != Ordering::Greater => {}
            _ => best = Some((segment, info)),
        }
    }
    best.map(|(segment, _)| segment)
}

/// Vollständige Prioritäts-Rangfolge aller Segmente (absteigend).
///
/// Rang 0 und 1 bilden die Hauptstraße, ab Rang 2 gelten Segmente als
/// Seitenstraßen. Die Sortierung ist stabil: Gleichstand behält die
/// Einfüge-Reihenfolge.
pub fn rank_segments(net: &dyn TopologyProvider, ends: &IndexSet<SegmentId>) -> Vec<SegmentId> {
    let fallback = RoadInfo {
        half_width: 0.0,
        forward_lanes: 0,
        backward_lanes: 0,
        pedestrian_lanes: 0,
        flat_junctions: false,
        highway_rules: false,
        ..RoadInfo::default()
    };
    let mut ranked: Vec<(SegmentId, RoadInfo)> = ends
        .iter()
        .map(|&segment| {
            let info = net.road_info(segment).unwrap_or_else(|| fallback.clone());
            (segment, info)
        })
        .collect();
    ranked.sort_by(|(_, a), (_, b)| compare_roads(b, a));
    ranked.into_iter().map(|(segment, _)| segment).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vergleich_schluessel_reihenfolge() {
        let basis = RoadInfo::default();

        // Flache Kreuzungsflächen schlagen alles andere
        let flach = RoadInfo {
            flat_junctions: true,
            forward_lanes: 1,
            half_width: 2.0,
            ..basis.clone()
        };
        let breit = RoadInfo {
            forward_lanes: 6,
            half_width: 16.0,
            highway_rules: true,
            ..basis.clone()
        };
        assert_eq!(compare_roads(&flach, &breit), Ordering::Greater);

        // Bei gleichen Flat-Junctions entscheiden die Vorwärts-Spuren
        let mehr_spuren = RoadInfo {
            forward_lanes: 3,
            ..basis.clone()
        };
        assert_eq!(compare_roads(&mehr_spuren, &basis), Ordering::Greater);

        // Danach die Breite
        let breiter = RoadInfo {
            half_width: 12.0,
            ..basis.clone()
        };
        assert_eq!(compare_roads(&breiter, &basis), Ordering::Greater);

        // Zuletzt Autobahn-Regeln
        let autobahn = RoadInfo {
            highway_rules: true,
            ..basis.clone()
        };
        assert_eq!(compare_roads(&autobahn, &basis), Ordering::Greater);

        assert_eq!(compare_roads(&basis, &basis.clone()), Ordering::Equal);
    }

    #[test]
    fn test_replace_und_is_main() {
        let mut main = MainRoad {
            first: Some(10),
            second: Some(11),
        };
        assert!(main.is_main(10));
        assert!(!main.is_main(12));

        main.replace(10, 12);
        assert_eq!(main.first, Some(12));
        assert!(main.is_main(12));
        assert!(!main.is_main(10));
    }

    #[test]
    fn test_segments_liste() {
        let main = MainRoad {
            first: Some(5),
            second: None,
        };
        assert_eq!(main.segments(), vec![5]);
        assert!(!main.is_complete());
    }
}
