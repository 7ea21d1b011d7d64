//! Eignungs-Checks: welche Knoten steuerbar sind und welche Schalter die
//! aktuelle Topologie zulässt.

use crate::core::{ControlMap, NodeStyle};
use crate::topology::{NodeFlags, NodeId, SegmentId, TopologyProvider};

/// Prüft, ob ein Knoten unter Kontrolle genommen werden kann.
///
/// Ausgeschlossen sind Knoten, die nicht (mehr) existieren oder deren
/// Segmente teilweise fehlen, Knoten ohne `CREATED` bzw. mit `DELETED`,
/// `OUTSIDE` oder `LEVEL_CROSSING`, sowie Durchgangsknoten prozeduraler
/// Netze (die bringen ihre eigene Durchgangs-Geometrie mit).
pub fn is_supported(net: &dyn TopologyProvider, node_id: NodeId) -> bool {
    if !net.node_exists(node_id) {
        return false;
    }
    let flags = net.node_flags(node_id);
    if !flags.contains(NodeFlags::CREATED) {
        return false;
    }
    if flags.intersects(NodeFlags::DELETED | NodeFlags::OUTSIDE | NodeFlags::LEVEL_CROSSING) {
        return false;
    }
    let segments = net.node_segments(node_id);
    if segments.is_empty() {
        return false;
    }
    if segments.iter().any(|&s| !net.segment_exists(s)) {
        return false;
    }
    if segments.len() == 2 {
        let procedural = segments.iter().any(|&s| {
            net.road_info(s)
                .map(|info| info.is_procedural())
                .unwrap_or(false)
        });
        if procedural {
            return false;
        }
    }
    true
}

/// Segmente am Knoten, nach XZ-Winkel ihrer Richtung sortiert.
fn segments_by_angle(net: &dyn TopologyProvider, node_id: NodeId) -> Vec<SegmentId> {
    let mut entries: Vec<(SegmentId, f32)> = net
        .node_segments(node_id)
        .into_iter()
        .filter_map(|segment| {
            let dir = net.segment_direction(segment, node_id)?;
            Some((segment, dir.z.atan2(dir.x)))
        })
        .collect();
    entries.sort_by(|a, b| a.1.total_cmp(&b.1));
    entries.into_iter().map(|(segment, _)| segment).collect()
}

/// Die beiden Winkel-Nachbarn eines Segments am Knoten.
fn neighbor_segments(
    net: &dyn TopologyProvider,
    segment_id: SegmentId,
    node_id: NodeId,
) -> Option<(SegmentId, SegmentId)> {
    let ordered = segments_by_angle(net, node_id);
    if ordered.len() < 2 {
        return None;
    }
    let index = ordered.iter().position(|&s| s == segment_id)?;
    let count = ordered.len();
    let left = ordered[(index + 1) % count];
    let right = ordered[(index + count - 1) % count];
    Some((left, right))
}

/// Prüft, ob das Segmentende am Knoten eine Querneigung erhalten darf.
///
/// Die Querneigung braucht eine Referenzkante an den Winkel-Nachbarn:
/// sind beide Nachbarn flach (laut Eintrag bzw. `flat_junctions` der
/// Straße), gibt es keine. Ein fehlender Nachbar-Eintrag ist keine
/// Einschränkung, dann zählt der Straßen-Default. Durchgangsknoten mit
/// kollinearen Segmenten scheiden ebenfalls aus.
pub fn can_twist(
    map: &ControlMap,
    net: &dyn TopologyProvider,
    segment_id: SegmentId,
    node_id: NodeId,
) -> bool {
    let segments = net.node_segments(node_id);
    if segments.len() < 2 {
        return false;
    }
    let Some((left, right)) = neighbor_segments(net, segment_id, node_id) else {
        return false;
    };
    let is_flat = |candidate: SegmentId| -> bool {
        if let Some(end) = map.segment_end(candidate, node_id) {
            !end.is_slope
        } else {
            net.road_info(candidate)
                .map(|info| info.flat_junctions)
                .unwrap_or(false)
        }
    };
    if is_flat(left) && is_flat(right) {
        return false;
    }
    if segments.len() == 2 {
        let flat_dir = |segment: SegmentId| {
            net.segment_direction(segment, node_id)
                .map(|d| glam::Vec3::new(d.x, 0.0, d.z).normalize_or_zero())
        };
        if let (Some(d0), Some(d1)) = (flat_dir(segments[0]), flat_dir(segments[1])) {
            if d0.dot(d1).abs() > 0.999 {
                return false;
            }
        }
    }
    true
}

/// Abflachungs-Entscheid für ein Segmentende, wie ihn der Renderer abfragt.
///
/// `Some(true)` erzwingt flach, `Some(false)` erzwingt Kurvenfolge,
/// `None` überlässt die Wahl dem Straßen-Default des Hosts.
pub fn flatten_override(
    map: &ControlMap,
    segment_id: SegmentId,
    node_id: NodeId,
) -> Option<bool> {
    map.segment_end(segment_id, node_id)
        .map(|end| !end.is_slope)
}

/// Überweg-Markierungen am Segmentende ausblenden?
///
/// `Stretch`-Knoten antworten immer `Some(false)`; sonst entscheidet der
/// `no_markings`-Schalter (`Some(true)`), ohne Eintrag bleibt es beim
/// Host-Default (`None`).
pub fn hide_crossing_markings(
    map: &ControlMap,
    segment_id: SegmentId,
    node_id: NodeId,
) -> Option<bool> {
    let node = map.node(node_id)?;
    if node.style == NodeStyle::Stretch {
        return Some(false);
    }
    let end = map.segment_end(segment_id, node_id)?;
    if end.no_markings {
        Some(true)
    } else {
        None
    }
}

/// Segmente, deren Geometrie beim Umschalten der globalen Gefälle-Fixes
/// neu aufgebaut werden muss.
///
/// Kandidaten sind geneigte Straßen-Segmente ohne Kontroll-Eintrag an
/// beiden Enden, deren Endknoten keine Durchgangsknoten sind, sowie
/// Segmente mit extremen vertikalen Tangenten.
pub fn slope_fix_candidates(map: &ControlMap, net: &dyn TopologyProvider) -> Vec<SegmentId> {
    net.segment_ids()
        .into_iter()
        .filter(|&segment| {
            let Some((start, end)) = net.segment_nodes(segment) else {
                return false;
            };
            if map.segment_end(segment, start).is_some() || map.segment_end(segment, end).is_some()
            {
                return false;
            }
            if net.node_flags(start).contains(NodeFlags::MIDDLE)
                || net.node_flags(end).contains(NodeFlags::MIDDLE)
            {
                return false;
            }
            let Some(info) = net.road_info(segment) else {
                return false;
            };
            if !info.is_road() {
                return false;
            }
            let Some(anchors) = net.segment_anchors(segment) else {
                return false;
            };
            let rise = (anchors.start_pos.y - anchors.end_pos.y).abs();
            rise > 0.01 || anchors.start_dir.y.abs() > 2.0 || anchors.end_dir.y.abs() > 2.0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SegmentEnd;
    use crate::topology::{NetworkModel, RoadInfo};
    use glam::Vec3;

    /// Kreuz aus vier Segmenten um Knoten 1.
    fn kreuzung() -> NetworkModel {
        let mut net = NetworkModel::new();
        net.add_node(1, Vec3::ZERO);
        net.add_node(2, Vec3::new(0.0, 0.0, 40.0));
        net.add_node(3, Vec3::new(0.0, 0.0, -40.0));
        net.add_node(4, Vec3::new(40.0, 0.0, 0.0));
        net.add_node(5, Vec3::new(-40.0, 0.0, 0.0));
        net.add_segment(10, 1, 2, RoadInfo::default());
        net.add_segment(11, 1, 3, RoadInfo::default());
        net.add_segment(12, 1, 4, RoadInfo::default());
        net.add_segment(13, 1, 5, RoadInfo::default());
        net
    }

    #[test]
    fn test_is_supported_filtert_flags() {
        let mut net = kreuzung();
        assert!(is_supported(&net, 1));

        net.mark(1, NodeFlags::LEVEL_CROSSING, true);
        assert!(!is_supported(&net, 1));
        net.mark(1, NodeFlags::LEVEL_CROSSING, false);

        net.mark(1, NodeFlags::OUTSIDE, true);
        assert!(!is_supported(&net, 1));
    }

    #[test]
    fn test_is_supported_unbekannter_knoten() {
        let net = NetworkModel::new();
        assert!(!is_supported(&net, 99));
    }

    #[test]
    fn test_can_twist_braucht_nicht_flache_nachbarn() {
        let net = kreuzung();
        let map = ControlMap::new();
        // Default-Straßen sind nicht flat → Querneigung erlaubt
        assert!(can_twist(&map, &net, 10, 1));
    }

    #[test]
    fn test_can_twist_kollineares_paar() {
        let mut net = NetworkModel::new();
        net.add_node(1, Vec3::new(-50.0, 0.0, 0.0));
        net.add_node(2, Vec3::ZERO);
        net.add_node(3, Vec3::new(50.0, 0.0, 0.0));
        net.add_segment(10, 1, 2, RoadInfo::default());
        net.add_segment(11, 2, 3, RoadInfo::default());
        let map = ControlMap::new();
        assert!(!can_twist(&map, &net, 10, 2));
    }

    #[test]
    fn test_can_twist_flache_nachbarn_sperren() {
        let net = kreuzung();
        let mut map = ControlMap::new();
        // Beide Winkel-Nachbarn von Segment 10 (Nord) sind Ost und West
        for nachbar in [12, 13] {
            let mut end = SegmentEnd::new(nachbar, 1);
            end.is_slope = false;
            map.insert_segment_end(end);
        }
        assert!(!can_twist(&map, &net, 10, 1));
    }

    #[test]
    fn test_flatten_override_folgt_eintrag() {
        let mut map = ControlMap::new();
        assert_eq!(flatten_override(&map, 7, 3), None);

        let mut end = SegmentEnd::new(7, 3);
        end.is_slope = false;
        map.insert_segment_end(end);
        assert_eq!(flatten_override(&map, 7, 3), Some(true));
    }

    #[test]
    fn test_slope_fix_kandidaten() {
        let mut net = NetworkModel::new();
        net.add_node(1, Vec3::ZERO);
        net.add_node(2, Vec3::new(60.0, 5.0, 0.0));
        net.add_node(3, Vec3::new(0.0, 0.0, 50.0));
        net.add_node(4, Vec3::new(60.0, 0.0, 50.0));
        net.add_segment(10, 1, 2, RoadInfo::default());
        net.add_segment(11, 3, 4, RoadInfo::default());

        let map = ControlMap::new();
        let kandidaten = slope_fix_candidates(&map, &net);
        assert!(kandidaten.contains(&10));
        assert!(!kandidaten.contains(&11));
    }
}
