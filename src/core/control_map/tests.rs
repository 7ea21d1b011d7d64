//! Unit-Tests für die ControlMap-Registry.

use super::*;
use crate::core::{NodeStyle, SegmentEnd};

fn map_mit_node(node: NodeId, segments: &[SegmentId]) -> ControlMap {
    let mut map = ControlMap::new();
    let mut entry = NodeControl::new(node);
    for &segment in segments {
        entry.segment_ends.insert(segment);
        map.insert_segment_end(SegmentEnd::new(segment, node));
    }
    map.insert_node(entry);
    map
}

#[test]
fn test_insert_und_lookup() {
    let map = map_mit_node(1, &[10, 11]);

    assert!(map.contains_node(1));
    assert_eq!(map.node_count(), 1);
    assert_eq!(map.segment_end_count(), 2);
    assert!(map.segment_end(10, 1).is_some());
    assert!(map.segment_end(10, 2).is_none());
}

#[test]
fn test_remove_node_entfernt_auch_enden() {
    let mut map = map_mit_node(1, &[10, 11]);
    map.insert_segment_end(SegmentEnd::new(20, 2));

    let removed = map.remove_node(1);
    assert!(removed.is_some());
    assert_eq!(map.segment_end_count(), 1, "fremde Enden bleiben erhalten");
    assert!(map.segment_end(20, 2).is_some());
}

#[test]
fn test_other_end() {
    let mut map = map_mit_node(1, &[10]);
    map.insert_segment_end(SegmentEnd::new(10, 2));

    let other = map.other_end(10, 1).expect("Gegenstück erwartet");
    assert_eq!(other.node_id, 2);
    assert!(map.other_end(99, 1).is_none());
}

#[test]
fn test_ends_of_node_in_eintrag_reihenfolge() {
    let map = map_mit_node(1, &[12, 10, 11]);
    let ids: Vec<SegmentId> = map.ends_of_node(1).iter().map(|e| e.segment_id).collect();
    assert_eq!(ids, vec![12, 10, 11]);
}

#[test]
fn test_clear() {
    let mut map = map_mit_node(1, &[10]);
    map.insert_node(NodeControl::with_style(2, NodeStyle::Bend));
    map.clear();
    assert_eq!(map.node_count(), 0);
    assert_eq!(map.segment_end_count(), 0);
}
