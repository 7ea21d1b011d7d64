//! Integrationstests für die Style-Logik:
//! - Style-Angebot je nach Topologie (Durchfahrt, Kreuzung, Endknoten)
//! - Style-Wechsel mit Regler-Reset
//! - Zurücksetzen auf die Topologie-Defaults

use junction_control::ops::{
    ensure_node, node_is_default, node_offset, node_slope_angle, possible_styles,
    reset_node_to_default, set_node_offset, set_node_rotate_angle, set_node_shift,
    set_node_slope_angle, set_style,
};
use junction_control::{ControlMap, NetworkModel, NodeStyle, RoadClass, RoadInfo};
use approx::assert_relative_eq;
use glam::Vec3;

/// Gerade Durchfahrt 1 ──10── 2 ──11── 3 entlang der X-Achse.
fn durchfahrt() -> NetworkModel {
    let mut net = NetworkModel::new();
    // Knoten 1 bei x=0, Knoten 2 bei x=100, Knoten 3 bei x=200
    net.add_node(1, Vec3::ZERO);
    net.add_node(2, Vec3::new(100.0, 0.0, 0.0));
    net.add_node(3, Vec3::new(200.0, 0.0, 0.0));
    net.add_segment(10, 1, 2, RoadInfo::default());
    net.add_segment(11, 2, 3, RoadInfo::default());
    net
}

/// Vier-Arm-Kreuzung um Knoten 1.
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

// ─── Style-Angebot ───────────────────────────────────────────────────────────

#[test]
fn test_durchfahrt_bietet_middle_crossing_uturn_custom() {
    let net = durchfahrt();
    // Default-Straße: gleiche Breite, beide Richtungen, zwei Fußgängerspuren
    assert_eq!(
        possible_styles(&net, 2),
        vec![
            NodeStyle::Middle,
            NodeStyle::Crossing,
            NodeStyle::UTurn,
            NodeStyle::Custom
        ],
        "Eine gerade Durchfahrt muss genau diese vier Styles anbieten"
    );
}

#[test]
fn test_kreuzung_laesst_nur_custom_zu() {
    let net = kreuzung();
    assert_eq!(
        possible_styles(&net, 1),
        vec![NodeStyle::Custom],
        "Ab drei Segmenten darf nur noch Custom angeboten werden"
    );
}

#[test]
fn test_endknoten_bietet_bend_custom_end() {
    let net = durchfahrt();
    let mut map = ControlMap::new();

    let refresh = ensure_node(&mut map, &net, 1, None).expect("Endknoten muss steuerbar sein");
    assert_eq!(refresh.segments, vec![10]);
    assert_eq!(
        map.node(1).unwrap().default_style,
        NodeStyle::End,
        "Ein Knoten mit genau einem Segment startet als End"
    );
    assert_eq!(
        possible_styles(&net, 1),
        vec![NodeStyle::Bend, NodeStyle::Custom, NodeStyle::End]
    );
}

#[test]
fn test_stretch_braucht_gerade_nicht_mittige_durchfahrt() {
    // Unterschiedliche Breiten: Knoten 2 wird BEND statt MIDDLE klassifiziert,
    // die Richtungen bleiben aber entgegengesetzt
    let mut net = NetworkModel::new();
    net.add_node(1, Vec3::ZERO);
    net.add_node(2, Vec3::new(100.0, 0.0, 0.0));
    net.add_node(3, Vec3::new(200.0, 0.0, 0.0));
    net.add_segment(10, 1, 2, RoadInfo::default());
    let schmal = RoadInfo {
        half_width: 6.0,
        ..RoadInfo::default()
    };
    net.add_segment(11, 2, 3, schmal);

    let styles = possible_styles(&net, 2);
    assert!(styles.contains(&NodeStyle::Stretch));
    assert!(styles.contains(&NodeStyle::Bend));
    assert!(!styles.contains(&NodeStyle::Middle));
    assert!(
        !styles.contains(&NodeStyle::Crossing),
        "Ungleiche Breiten dürfen keinen Überweg zulassen"
    );
}

#[test]
fn test_stretch_scheitert_an_gleisen() {
    let mut net = NetworkModel::new();
    net.add_node(1, Vec3::ZERO);
    net.add_node(2, Vec3::new(100.0, 0.0, 0.0));
    net.add_node(3, Vec3::new(200.0, 0.0, 0.0));
    net.add_segment(10, 1, 2, RoadInfo::default());
    let gleis = RoadInfo {
        half_width: 6.0,
        class: RoadClass::Rail,
        ..RoadInfo::default()
    };
    net.add_segment(11, 2, 3, gleis);

    let styles = possible_styles(&net, 2);
    assert!(
        !styles.contains(&NodeStyle::Stretch),
        "Gleise haben keine streckbare Fahrbahn-Textur"
    );
    assert!(!styles.contains(&NodeStyle::UTurn));
}

// ─── Style-Wechsel ───────────────────────────────────────────────────────────

#[test]
fn test_style_wechsel_setzt_nicht_freigegebene_regler_zurueck() {
    let net = durchfahrt();
    let mut map = ControlMap::new();
    ensure_node(&mut map, &net, 2, None).expect("ensure_node darf nicht fehlschlagen");
    assert_eq!(map.node(2).unwrap().style, NodeStyle::Middle);

    // Middle gibt Shift und Slope frei
    assert!(set_node_shift(&mut map, &net, 2, 3.0));
    assert!(set_node_slope_angle(&mut map, &net, 2, 10.0));
    assert_relative_eq!(map.segment_end(10, 2).unwrap().slope_angle, 10.0);

    // Crossing gibt nur noch Shift frei: Slope fällt zurück, Shift bleibt
    assert!(set_style(&mut map, &net, 2, NodeStyle::Crossing));
    assert_eq!(map.node(2).unwrap().style, NodeStyle::Crossing);
    assert_relative_eq!(map.segment_end(10, 2).unwrap().shift, 3.0);
    assert_relative_eq!(map.segment_end(10, 2).unwrap().slope_angle, 0.0);
    assert_relative_eq!(map.segment_end(11, 2).unwrap().slope_angle, 0.0);
    assert_relative_eq!(node_slope_angle(&map, 2), 0.0);
}

#[test]
fn test_unmoeglicher_style_wird_abgelehnt() {
    let net = kreuzung();
    let mut map = ControlMap::new();
    ensure_node(&mut map, &net, 1, None).expect("Kreuzung muss steuerbar sein");
    assert_eq!(map.node(1).unwrap().style, NodeStyle::Custom);

    assert!(
        !set_style(&mut map, &net, 1, NodeStyle::Crossing),
        "Crossing darf an einer Vier-Arm-Kreuzung nicht angenommen werden"
    );
    assert_eq!(
        map.node(1).unwrap().style,
        NodeStyle::Custom,
        "Ein abgelehnter Wechsel darf den Style nicht verändern"
    );
}

// ─── Zurücksetzen ────────────────────────────────────────────────────────────

#[test]
fn test_reset_stellt_defaults_wieder_her() {
    let net = durchfahrt();
    let mut map = ControlMap::new();
    ensure_node(&mut map, &net, 2, None).expect("ensure_node darf nicht fehlschlagen");
    assert!(node_is_default(&map, &net, 2));

    assert!(set_style(&mut map, &net, 2, NodeStyle::Custom));
    assert!(set_node_offset(&mut map, &net, 2, 10.0));
    assert!(set_node_rotate_angle(&mut map, &net, 2, 20.0));
    assert!(!node_is_default(&map, &net, 2));

    assert!(reset_node_to_default(&mut map, &net, 2, true));
    let node = map.node(2).unwrap();
    assert_eq!(node.style, NodeStyle::Middle, "Reset kehrt zum Default-Style zurück");
    assert_relative_eq!(node_offset(&map, 2), 0.0);
    assert_relative_eq!(map.segment_end(10, 2).unwrap().rotate_angle, 0.0);
    assert!(node_is_default(&map, &net, 2));

    // Zweiter Reset ändert nichts mehr
    assert!(reset_node_to_default(&mut map, &net, 2, true));
    assert!(node_is_default(&map, &net, 2));
}
