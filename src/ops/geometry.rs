//! Geometrie-Neuberechnung: Segment-Kurven, Mesh-Ecken, Knoten-Position
//! und Überhöhung.
//!
//! Wird nach jeder Regler-Änderung und jedem Topologie-Abgleich für die
//! betroffenen Segmente aufgerufen. Alle Ergebnisse landen als Cache in
//! den [`SegmentEnd`](crate::core::SegmentEnd)-Einträgen, der Renderer
//! liest sie über [`corner`] ab.

use crate::core::{ControlMap, Corner};
use crate::geometry::{
    chord_curve_intersection_xz, length_xz, turn_xz, BezierTrajectory, StraightTrajectory,
};
use crate::topology::{NodeFlags, NodeId, SegmentAnchors, SegmentId, TopologyProvider};
use glam::Vec3;
use std::f32::consts::FRAC_PI_2;

/// Numerische Untergrenze für Sehnenlängen.
const MIN_CHORD_LEN: f32 = 1e-4;

/// Berechnet die Geometrie aller Segmentenden eines Knotens neu.
pub fn refresh_node_geometry(map: &mut ControlMap, net: &dyn TopologyProvider, node_id: NodeId) {
    let segments: Vec<SegmentId> = map
        .node(node_id)
        .map(|node| node.segment_ends.iter().copied().collect())
        .unwrap_or_default();
    for segment in segments {
        refresh_segment(map, net, segment);
    }
}

/// Baut die (ggf. quer versetzte) Segment-Kurve neu auf und berechnet
/// anschließend beide Enden des Segments.
///
/// Das Start-Ende speichert die Kurve wie aufgebaut, das Gegen-Ende ihre
/// Umkehrung, sodass `t = 0` immer am eigenen Knoten liegt.
pub fn refresh_segment(map: &mut ControlMap, net: &dyn TopologyProvider, segment_id: SegmentId) {
    let Some((start_node, end_node)) = net.segment_nodes(segment_id) else {
        log::warn!("Segment #{}: Knoten unbekannt, Geometrie übersprungen", segment_id);
        return;
    };
    let Some(anchors) = net.segment_anchors(segment_id) else {
        log::warn!("Segment #{}: Anker unbekannt, Geometrie übersprungen", segment_id);
        return;
    };

    let start_shift = map
        .segment_end(segment_id, start_node)
        .map(|end| end.shift)
        .unwrap_or(0.0);
    let end_shift = map
        .segment_end(segment_id, end_node)
        .map(|end| end.shift)
        .unwrap_or(0.0);

    // Versatzfreie Segmente nehmen den schnellen Pfad ohne Umrechnung
    let curve = if start_shift == 0.0 && end_shift == 0.0 {
        BezierTrajectory::from_ends(
            anchors.start_pos,
            anchors.start_dir,
            anchors.end_pos,
            anchors.end_dir,
        )
    } else {
        shifted_curve(&anchors, start_shift, end_shift)
    };

    if let Some(end) = map.segment_end_mut(segment_id, start_node) {
        end.trajectory = curve;
    }
    if let Some(end) = map.segment_end_mut(segment_id, end_node) {
        end.trajectory = curve.inverted();
    }

    recompute_end(map, net, segment_id, start_node);
    recompute_end(map, net, segment_id, end_node);
}

/// Versetzt beide Anker quer zur Sehne und dreht die Tangenten mit.
///
/// Der Drehwinkel folgt aus dem mittleren Versatz relativ zur
/// XZ-Sehnenlänge (`delta = asin(avg / länge)`); jeder Anker wandert um
/// seinen eigenen Versatz entlang der gedrehten Normalen. Start und Ende
/// wandern in entgegengesetzter Normalen-Richtung, weil "rechts" aus
/// Sicht des jeweiligen Knotens gemeint ist.
fn shifted_curve(anchors: &SegmentAnchors, start_shift: f32, end_shift: f32) -> BezierTrajectory {
    let chord = anchors.end_pos - anchors.start_pos;
    let chord_len = length_xz(chord);
    if chord_len < MIN_CHORD_LEN {
        return BezierTrajectory::from_ends(
            anchors.start_pos,
            anchors.start_dir,
            anchors.end_pos,
            anchors.end_dir,
        );
    }

    let avg = (start_shift + end_shift) / 2.0;
    let delta = (avg / chord_len).clamp(-1.0, 1.0).asin();
    let chord_dir = Vec3::new(chord.x / chord_len, 0.0, chord.z / chord_len);
    let normal = turn_xz(chord_dir, FRAC_PI_2 + delta);

    BezierTrajectory::from_ends(
        anchors.start_pos - normal * start_shift,
        turn_xz(anchors.start_dir, delta),
        anchors.end_pos + normal * end_shift,
        turn_xz(anchors.end_dir, delta),
    )
}

/// Berechnet Ecken, Knoten-Position und Überhöhung eines Segmentendes
/// aus seiner gespeicherten Trajektorie.
fn recompute_end(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    segment_id: SegmentId,
    node_id: NodeId,
) {
    let Some(road) = net.road_info(segment_id) else {
        return;
    };
    let Some(end) = map.segment_end(segment_id, node_id) else {
        return;
    };

    let trajectory = end.trajectory;
    let half_width = road.half_width;
    let offset = end.offset;
    let rotate = end.rotate_angle.to_radians();
    let slope = end.slope_angle.to_radians();
    let twist = end.twist_angle.to_radians();
    let is_slope = end.is_slope;
    let is_twist = end.is_twist;
    let base_y = trajectory.position(0.0).y;

    // Links = +1, rechts = -1, vom Knoten ins Segment geschaut
    let corner_for = |side: f32| -> Corner {
        let cut = (offset + side * half_width * rotate.tan()).max(0.0);
        let t = trajectory.travel(cut);
        let mut position = trajectory.position(t);
        let mut direction = trajectory.tangent(t);

        let lateral = turn_xz(
            Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero(),
            FRAC_PI_2,
        );
        position += lateral * (half_width * side);

        if is_slope {
            position.y += cut * slope.tan();
            direction = (direction + Vec3::Y * slope.tan()).normalize_or_zero();
        } else {
            position.y = base_y;
            direction = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
        }
        if is_twist {
            // Positive Querneigung hebt die rechte Ecke
            position.y -= side * half_width * twist.tan();
        }
        Corner {
            position,
            direction,
        }
    };
    let left = corner_for(1.0);
    let right = corner_for(-1.0);

    // Knoten-Seite: Schnitt der Eckensehne mit der Kurve, sonst Sehnenmitte
    let chord = StraightTrajectory::new(left.position, right.position);
    let position = match chord_curve_intersection_xz(&chord, &trajectory) {
        Some(hit) => chord.position(hit.chord_t),
        None => chord.position(0.5),
    };

    let diff = right.position - left.position;
    let super_elevation = diff.y.atan2(length_xz(diff)).to_degrees();

    if let Some(end) = map.segment_end_mut(segment_id, node_id) {
        end.left_corner = left;
        end.right_corner = right;
        end.position = position;
        end.cached_super_elevation_deg = super_elevation;
    }
}

/// Liefert die zwischengespeicherte Mesh-Ecke eines Segmentendes.
pub fn corner(
    map: &ControlMap,
    segment_id: SegmentId,
    node_id: NodeId,
    left: bool,
) -> Option<Corner> {
    map.segment_end(segment_id, node_id)
        .map(|end| if left { end.left_corner } else { end.right_corner })
}

/// Weiche Durchfahrt? Der Renderer zieht das Knoten-Mesh dann glatt über
/// den Knoten statt Kanten anzusetzen.
pub fn is_smooth(net: &dyn TopologyProvider, node_id: NodeId) -> bool {
    net.node_flags(node_id).contains(NodeFlags::MIDDLE)
}
