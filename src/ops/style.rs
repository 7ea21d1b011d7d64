//! Style-Wechsel und Machbarkeits-Prüfung.
//!
//! Welche Styles ein Knoten annehmen darf, hängt allein von der lebenden
//! Topologie ab: Segment-Anzahl, Klassifikations-Flags, Richtungen und
//! Straßen-Beschreibungen. Kreuzungen mit mehr als zwei Segmenten und
//! prozedurale Netze lassen nur noch `Custom` zu.

use crate::core::{ControlMap, NodeStyle};
use crate::ops::geometry;
use crate::topology::{NodeFlags, NodeId, SegmentId, TopologyProvider};

/// Breiten-Toleranz für den Crossing-Check (1 mm).
const WIDTH_EPSILON: f32 = 0.001;

/// Beide Richtungs-Kennwerte eines Segment-Paars am Knoten:
/// gerade Durchfahrt (entgegengesetzt) und exakte Kehre (gleichgerichtet).
fn pair_alignment(
    net: &dyn TopologyProvider,
    segments: &[SegmentId],
    node_id: NodeId,
) -> (bool, bool) {
    let (Some(d0), Some(d1)) = (
        net.segment_direction(segments[0], node_id),
        net.segment_direction(segments[1], node_id),
    ) else {
        return (false, false);
    };
    let dot = d0.dot(d1);
    (dot < -0.99, dot > 0.99)
}

/// Prüft, ob der Style unter der aktuellen Topologie des Knotens möglich ist.
pub fn possible_style(net: &dyn TopologyProvider, node_id: NodeId, style: NodeStyle) -> bool {
    let segments = net.node_segments(node_id);
    let count = segments.len();
    if count == 0 {
        return false;
    }

    let procedural = segments.iter().any(|&s| {
        net.road_info(s)
            .map(|info| info.is_procedural())
            .unwrap_or(false)
    });
    if count > 2 || procedural {
        return style == NodeStyle::Custom;
    }

    let middle = net.node_flags(node_id).contains(NodeFlags::MIDDLE);
    let two = count == 2;
    let (straight, reversed) = if two {
        pair_alignment(net, &segments, node_id)
    } else {
        (false, false)
    };

    match style {
        NodeStyle::Middle => middle && (straight || reversed),
        NodeStyle::Bend => !middle,
        NodeStyle::Stretch => {
            let textures = segments.iter().all(|&s| {
                net.road_info(s)
                    .map(|info| info.can_modify_textures())
                    .unwrap_or(false)
            });
            two && !middle && straight && textures
        }
        NodeStyle::Crossing => {
            if !two || !straight {
                return false;
            }
            let (Some(a), Some(b)) = (net.road_info(segments[0]), net.road_info(segments[1]))
            else {
                return false;
            };
            let equal_width = (a.half_width - b.half_width).abs() < WIDTH_EPSILON;
            let ped_max = a.pedestrian_lanes.max(b.pedestrian_lanes);
            equal_width && ped_max >= 2
        }
        NodeStyle::UTurn => {
            two && segments.iter().all(|&s| {
                net.road_info(s)
                    .map(|info| info.is_road() && info.forward_lanes > 0 && info.backward_lanes > 0)
                    .unwrap_or(false)
            })
        }
        NodeStyle::Custom => true,
        NodeStyle::End => count == 1,
    }
}

/// Alle aktuell möglichen Styles des Knotens.
pub fn possible_styles(net: &dyn TopologyProvider, node_id: NodeId) -> Vec<NodeStyle> {
    NodeStyle::ALL
        .into_iter()
        .filter(|&style| possible_style(net, node_id, style))
        .collect()
}

/// Wechselt den Style eines Knotens.
///
/// Nicht mögliche Styles werden abgelehnt, ohne etwas zu verändern. Beim
/// Wechsel werden alle Enden ohne `force` zurückgesetzt: Regler, die der
/// neue Style unterstützt, behalten ihren (begrenzten) Wert.
pub fn set_style(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    node_id: NodeId,
    style: NodeStyle,
) -> bool {
    let Some(node) = map.node(node_id) else {
        log::warn!("Node #{}: kein Eintrag für Style-Wechsel", node_id);
        return false;
    };
    if node.style == style {
        return true;
    }
    if !possible_style(net, node_id, style) {
        log::warn!("Style {} ist an {} nicht möglich", style, node);
        return false;
    }

    if let Some(node) = map.node_mut(node_id) {
        node.style = style;
    }
    reset_ends(map, net, node_id, false);
    geometry::refresh_node_geometry(map, net, node_id);
    log::info!("Node #{}: Style gewechselt auf {}", node_id, style);
    true
}

/// Setzt alle Enden des Knotens auf die Defaults seines aktiven Styles.
pub(crate) fn reset_ends(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    node_id: NodeId,
    force: bool,
) {
    let Some(node) = map.node(node_id) else {
        return;
    };
    let style = node.style;
    let ends: Vec<SegmentId> = node.segment_ends.iter().copied().collect();
    let flags = net.node_flags(node_id);

    for segment in ends {
        let Some(road) = net.road_info(segment) else {
            continue;
        };
        if let Some(end) = map.segment_end_mut(segment, node_id) {
            end.reset_to_default(style, &road, flags, force);
        }
    }
}

/// Setzt den Knoten vollständig auf seine Topologie-Defaults zurück:
/// Style zurück auf den Default, alle Enden zurückgesetzt.
pub fn reset_node_to_default(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    node_id: NodeId,
    force: bool,
) -> bool {
    match map.node_mut(node_id) {
        Some(node) => node.style = node.default_style,
        None => {
            log::warn!("Node #{}: kein Eintrag zum Zurücksetzen", node_id);
            return false;
        }
    }
    reset_ends(map, net, node_id, force);
    geometry::refresh_node_geometry(map, net, node_id);
    log::info!("Node #{} auf Defaults zurückgesetzt", node_id);
    true
}

/// Stehen Knoten und alle Enden auf ihren Topologie-Defaults?
pub fn node_is_default(map: &ControlMap, net: &dyn TopologyProvider, node_id: NodeId) -> bool {
    let Some(node) = map.node(node_id) else {
        return false;
    };
    if node.style != node.default_style {
        return false;
    }
    let flags = net.node_flags(node_id);
    node.segment_ends.iter().all(|&segment| {
        let Some(road) = net.road_info(segment) else {
            return true;
        };
        map.segment_end(segment, node_id)
            .map(|end| end.is_default(node.style, &road, flags))
            .unwrap_or(true)
    })
}
