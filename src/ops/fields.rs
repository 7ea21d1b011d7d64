//! Regler und Schalter: pro Segmentende und als Knoten-Aggregate.
//!
//! Die Knoten-Aggregate entsprechen den Slidern des Eigenschafts-Panels:
//! Offset/Versatz/Rotation wirken auf alle Enden gleichzeitig, Gefälle
//! und Querneigung werden spiegelbildlich auf das Hauptstraßen-Paar
//! verteilt (erste Seite positiv, zweite negativ).

use crate::core::{rank_segments, ControlMap, EndFlag, ScalarControl};
use crate::ops::geometry;
use crate::topology::{NodeId, SegmentId, TopologyProvider};

/// Setzt einen Regler eines Segmentendes (mit Clamping) und berechnet
/// die Segment-Geometrie neu.
pub fn set_end_scalar(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    segment_id: SegmentId,
    node_id: NodeId,
    control: ScalarControl,
    value: f32,
) -> bool {
    let Some(end) = map.segment_end_mut(segment_id, node_id) else {
        log::warn!(
            "Segment #{} @ Node #{}: kein Eintrag für Regler {:?}",
            segment_id,
            node_id,
            control
        );
        return false;
    };
    end.set_scalar(control, control.clamp(value));
    geometry::refresh_segment(map, net, segment_id);
    true
}

/// Setzt einen booleschen Schalter eines Segmentendes und berechnet die
/// Segment-Geometrie neu.
pub fn set_end_flag(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    segment_id: SegmentId,
    node_id: NodeId,
    flag: EndFlag,
    on: bool,
) -> bool {
    let Some(end) = map.segment_end_mut(segment_id, node_id) else {
        log::warn!(
            "Segment #{} @ Node #{}: kein Eintrag für Schalter {:?}",
            segment_id,
            node_id,
            flag
        );
        return false;
    };
    end.set_flag(flag, on);
    geometry::refresh_segment(map, net, segment_id);
    true
}

/// Mittelwert eines Reglers über alle Enden des Knotens.
fn scalar_mean(map: &ControlMap, node_id: NodeId, control: ScalarControl) -> f32 {
    let Some(node) = map.node(node_id) else {
        return 0.0;
    };
    if node.segment_ends.is_empty() {
        return 0.0;
    }
    let sum: f32 = node
        .segment_ends
        .iter()
        .filter_map(|&segment| {
            map.segment_end(segment, node_id)
                .map(|end| end.scalar(control))
        })
        .sum();
    sum / node.segment_ends.len() as f32
}

/// Weist allen Enden des Knotens denselben (begrenzten) Regler-Wert zu.
fn scalar_assign(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    node_id: NodeId,
    control: ScalarControl,
    value: f32,
) -> bool {
    let Some(node) = map.node(node_id) else {
        log::warn!("Node #{}: kein Eintrag für Regler {:?}", node_id, control);
        return false;
    };
    let ends: Vec<SegmentId> = node.segment_ends.iter().copied().collect();
    let clamped = control.clamp(value);
    for segment in ends {
        if let Some(end) = map.segment_end_mut(segment, node_id) {
            end.set_scalar(control, clamped);
        }
    }
    geometry::refresh_node_geometry(map, net, node_id);
    true
}

/// Halbe Differenz eines Spiegel-Reglers über das Hauptstraßen-Paar.
/// 0 wenn der Knoten nicht genau zwei Enden hat.
fn mirrored_value(map: &ControlMap, node_id: NodeId, control: ScalarControl) -> f32 {
    let Some(node) = map.node(node_id) else {
        return 0.0;
    };
    if node.segment_count() != 2 {
        return 0.0;
    }
    let (Some(first), Some(second)) = (node.main_road.first, node.main_road.second) else {
        return 0.0;
    };
    let a = map
        .segment_end(first, node_id)
        .map(|end| end.scalar(control))
        .unwrap_or(0.0);
    let b = map
        .segment_end(second, node_id)
        .map(|end| end.scalar(control))
        .unwrap_or(0.0);
    (a - b) / 2.0
}

/// Verteilt einen Spiegel-Regler auf das Hauptstraßen-Paar: erste Seite
/// `+value`, zweite `-value`. Außerhalb von Zwei-End-Knoten passiert nichts.
fn mirrored_assign(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    node_id: NodeId,
    control: ScalarControl,
    value: f32,
) -> bool {
    let Some(node) = map.node(node_id) else {
        log::warn!("Node #{}: kein Eintrag für Regler {:?}", node_id, control);
        return false;
    };
    if node.segment_count() != 2 {
        log::debug!(
            "Node #{}: Spiegel-Regler {:?} nur bei genau zwei Enden",
            node_id,
            control
        );
        return false;
    }
    let (Some(first), Some(second)) = (node.main_road.first, node.main_road.second) else {
        return false;
    };

    let clamped = control.clamp(value);
    if let Some(end) = map.segment_end_mut(first, node_id) {
        end.set_scalar(control, clamped);
    }
    if let Some(end) = map.segment_end_mut(second, node_id) {
        end.set_scalar(control, -clamped);
    }
    geometry::refresh_node_geometry(map, net, node_id);
    true
}

/// Mittlerer Ecken-Abstand des Knotens.
pub fn node_offset(map: &ControlMap, node_id: NodeId) -> f32 {
    scalar_mean(map, node_id, ScalarControl::Offset)
}

/// Setzt den Ecken-Abstand aller Enden.
pub fn set_node_offset(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    node_id: NodeId,
    value: f32,
) -> bool {
    scalar_assign(map, net, node_id, ScalarControl::Offset, value)
}

/// Mittlerer Quer-Versatz des Knotens.
pub fn node_shift(map: &ControlMap, node_id: NodeId) -> f32 {
    scalar_mean(map, node_id, ScalarControl::Shift)
}

/// Setzt den Quer-Versatz aller Enden.
pub fn set_node_shift(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    node_id: NodeId,
    value: f32,
) -> bool {
    scalar_assign(map, net, node_id, ScalarControl::Shift, value)
}

/// Mittlerer Drehwinkel des Knotens.
pub fn node_rotate_angle(map: &ControlMap, node_id: NodeId) -> f32 {
    scalar_mean(map, node_id, ScalarControl::Rotate)
}

/// Setzt den Drehwinkel aller Enden.
pub fn set_node_rotate_angle(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    node_id: NodeId,
    value: f32,
) -> bool {
    scalar_assign(map, net, node_id, ScalarControl::Rotate, value)
}

/// Gefälle-Winkel des Knotens (halbe Differenz des Hauptstraßen-Paars).
pub fn node_slope_angle(map: &ControlMap, node_id: NodeId) -> f32 {
    mirrored_value(map, node_id, ScalarControl::Slope)
}

/// Setzt den Gefälle-Winkel spiegelbildlich auf das Hauptstraßen-Paar.
pub fn set_node_slope_angle(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    node_id: NodeId,
    value: f32,
) -> bool {
    mirrored_assign(map, net, node_id, ScalarControl::Slope, value)
}

/// Querneigungs-Winkel des Knotens (halbe Differenz des Paars).
pub fn node_twist_angle(map: &ControlMap, node_id: NodeId) -> f32 {
    mirrored_value(map, node_id, ScalarControl::Twist)
}

/// Setzt die Querneigung spiegelbildlich auf das Hauptstraßen-Paar.
pub fn set_node_twist_angle(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    node_id: NodeId,
    value: f32,
) -> bool {
    mirrored_assign(map, net, node_id, ScalarControl::Twist, value)
}

/// Sind an irgendeinem Ende die Markierungen unterdrückt?
pub fn node_no_markings(map: &ControlMap, node_id: NodeId) -> bool {
    let Some(node) = map.node(node_id) else {
        return false;
    };
    node.segment_ends.iter().any(|&segment| {
        map.segment_end(segment, node_id)
            .map(|end| end.no_markings)
            .unwrap_or(false)
    })
}

/// Unterdrückt die Markierungen an allen Enden oder gibt sie frei.
pub fn set_node_no_markings(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    node_id: NodeId,
    on: bool,
) -> bool {
    let Some(node) = map.node(node_id) else {
        log::warn!("Node #{}: kein Eintrag für Markierungs-Schalter", node_id);
        return false;
    };
    let ends: Vec<SegmentId> = node.segment_ends.iter().copied().collect();
    for segment in ends {
        if let Some(end) = map.segment_end_mut(segment, node_id) {
            end.no_markings = on;
        }
    }
    geometry::refresh_node_geometry(map, net, node_id);
    true
}

/// Folgt die Kreuzungsfläche dem Gefälle der Hauptstraße?
pub fn slope_junctions(map: &ControlMap, node_id: NodeId) -> bool {
    let Some(node) = map.node(node_id) else {
        return false;
    };
    node.main_road.segments().iter().any(|&segment| {
        map.segment_end(segment, node_id)
            .map(|end| end.is_slope)
            .unwrap_or(false)
    })
}

/// Schaltet die Kreuzung zwischen geneigter und flacher Ebene um.
///
/// Die Hauptstraßen-Enden (Rang 0 und 1) folgen dem Schalter,
/// Seitenstraßen ab Rang 2 bleiben flach und ohne Querneigung.
pub fn set_slope_junctions(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    node_id: NodeId,
    value: bool,
) -> bool {
    let Some(node) = map.node(node_id) else {
        log::warn!("Node #{}: kein Eintrag für Gefälle-Schalter", node_id);
        return false;
    };
    let ranked = rank_segments(net, &node.segment_ends);

    for (rank, segment) in ranked.into_iter().enumerate() {
        if let Some(end) = map.segment_end_mut(segment, node_id) {
            if rank < 2 {
                end.is_slope = value;
                end.is_twist = false;
            } else {
                end.is_slope = false;
                end.is_twist = false;
            }
        }
    }
    geometry::refresh_node_geometry(map, net, node_id);
    true
}
