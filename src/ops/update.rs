//! Lebenszyklus und Topologie-Abgleich der Kontroll-Einträge.
//!
//! Der Host ruft [`update_node`] aus seinem Topologie-Callback, sobald
//! sich die Segment-Menge eines kontrollierten Knotens geändert haben
//! kann. Der Abgleich vergleicht die Segment-Mengen, behandelt genau ein
//! Entfernt + ein Neu als Umbenennung (volle Feld-Migration), repariert
//! die Hauptstraße, leitet die Default-Klassifikation neu ab und fällt
//! bei unmöglich gewordenem Style auf den Default zurück.

use crate::core::{ControlMap, NodeControl, NodeStyle, SegmentEnd};
use crate::ops::{geometry, style, support};
use crate::topology::{NodeFlags, NodeId, SegmentId, TopologyProvider};
use anyhow::{bail, Context, Result};
use indexmap::IndexSet;

/// Auffrisch-Signal an den Host nach einem Abgleich.
///
/// Der Host schreibt die gewünschten Flags in sein Netzwerk zurück und
/// stößt für die genannten Segmente die Mesh-Neuberechnung an.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRefresh {
    /// Betroffener Knoten.
    pub node_id: NodeId,
    /// Gewünschte Knoten-Flags nach dem Abgleich.
    pub flags: NodeFlags,
    /// Segmente, deren Mesh-Ecken neu aufgebaut werden müssen.
    pub segments: Vec<SegmentId>,
}

impl NodeRefresh {
    /// Leeres Signal: kein Eintrag (mehr) vorhanden.
    fn released(node_id: NodeId, flags: NodeFlags) -> Self {
        Self {
            node_id,
            flags,
            segments: Vec::new(),
        }
    }
}

/// Holt oder erstellt den Kontroll-Eintrag eines Knotens und gleicht ihn
/// sofort ab.
///
/// `style` gibt neuen Einträgen einen Start-Style mit (Persistenz);
/// `None` startet mit dem Default. Nicht unterstützte Knoten werden
/// abgelehnt.
pub fn ensure_node(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    node_id: NodeId,
    style: Option<NodeStyle>,
) -> Result<NodeRefresh> {
    if !map.contains_node(node_id) {
        if !support::is_supported(net, node_id) {
            bail!("Node #{} wird nicht unterstützt", node_id);
        }
        let start_style = match style {
            Some(style) => style,
            None => NodeControl::default_style_from_flags(net.node_flags(node_id))
                .with_context(|| format!("Anlage von Node #{}", node_id))?,
        };
        map.insert_node(NodeControl::with_style(node_id, start_style));
        log::debug!("Node #{} unter Kontrolle genommen", node_id);
    }
    update_node(map, net, node_id)
}

/// Gibt den Kontroll-Eintrag eines Knotens samt Segmentenden frei.
pub fn release_node(map: &mut ControlMap, node_id: NodeId) -> bool {
    if map.remove_node(node_id).is_some() {
        log::info!("Node #{} freigegeben", node_id);
        true
    } else {
        false
    }
}

/// Gleicht den Kontroll-Eintrag eines Knotens mit der lebenden Topologie
/// ab und liefert das Auffrisch-Signal für den Host.
pub fn update_node(
    map: &mut ControlMap,
    net: &dyn TopologyProvider,
    node_id: NodeId,
) -> Result<NodeRefresh> {
    if !map.contains_node(node_id) {
        log::warn!("Node #{}: kein Eintrag zum Abgleichen", node_id);
        return Ok(NodeRefresh::released(node_id, net.node_flags(node_id)));
    }
    // Knoten weg oder nicht mehr geeignet: Eintrag fallen lassen
    if !support::is_supported(net, node_id) {
        release_node(map, node_id);
        return Ok(NodeRefresh::released(node_id, net.node_flags(node_id)));
    }

    let live: Vec<SegmentId> = net.node_segments(node_id);
    let live_set: IndexSet<SegmentId> = live.iter().copied().collect();
    let before: IndexSet<SegmentId> = map
        .node(node_id)
        .map(|node| node.segment_ends.clone())
        .unwrap_or_default();

    let removed: Vec<SegmentId> = before
        .iter()
        .copied()
        .filter(|s| !live_set.contains(s))
        .collect();
    let added: Vec<SegmentId> = live
        .iter()
        .copied()
        .filter(|s| !before.contains(s))
        .collect();

    // Überlebende behalten ihre Reihenfolge, Neue kommen hinten dran
    let mut next_ends: IndexSet<SegmentId> = before
        .iter()
        .copied()
        .filter(|s| live_set.contains(s))
        .collect();
    let mut fresh: Vec<SegmentId> = Vec::new();

    if removed.len() == 1 && added.len() == 1 {
        let (old, new) = (removed[0], added[0]);
        match map.remove_segment_end(old, node_id) {
            Some(entity) => {
                map.insert_segment_end(entity.renamed(new));
                log::info!("Segment #{} → #{} an Node #{} migriert", old, new, node_id);
            }
            None => fresh.push(new),
        }
        if let Some(node) = map.node_mut(node_id) {
            node.main_road.replace(old, new);
        }
        next_ends.insert(new);
    } else {
        for old in removed {
            map.remove_segment_end(old, node_id);
        }
        for new in added {
            fresh.push(new);
            next_ends.insert(new);
        }
    }

    // Neue Enden als Platzhalter anlegen, der Reset folgt nach der Style-Wahl
    for &segment in &fresh {
        map.insert_segment_end(SegmentEnd::new(segment, node_id));
    }

    let flags = net.node_flags(node_id);
    let default_style = NodeControl::default_style_from_flags(flags)
        .with_context(|| format!("Abgleich von Node #{}", node_id))?;

    let style_now = match map.node_mut(node_id) {
        Some(node) => {
            node.segment_ends = next_ends;
            node.default_flags = flags;
            node.default_style = default_style;
            node.main_road.update(net, &node.segment_ends);
            node.style
        }
        None => default_style,
    };

    if !style::possible_style(net, node_id, style_now) {
        log::info!(
            "Node #{}: Style {} nicht mehr möglich, zurück auf {}",
            node_id,
            style_now,
            default_style
        );
        if let Some(node) = map.node_mut(node_id) {
            node.style = default_style;
        }
        style::reset_ends(map, net, node_id, true);
    } else {
        for &segment in &fresh {
            let Some(road) = net.road_info(segment) else {
                continue;
            };
            if let Some(end) = map.segment_end_mut(segment, node_id) {
                end.reset_to_default(style_now, &road, flags, true);
            }
        }
    }

    geometry::refresh_node_geometry(map, net, node_id);

    let segments: Vec<SegmentId> = map
        .node(node_id)
        .map(|node| node.segment_ends.iter().copied().collect())
        .unwrap_or_default();
    Ok(NodeRefresh {
        node_id,
        flags: desired_flags(map, net, node_id),
        segments,
    })
}

/// Gewünschte Knoten-Flags nach Style und Default-Zustand.
///
/// TRANSITION nur für Zwei-End-Knoten mit Übergangs-Style; die
/// Klassifikations-Flags folgen dem aktiven Style, MOVEABLE bleibt nur
/// unveränderten Durchfahrts-Knoten erhalten.
fn desired_flags(map: &ControlMap, net: &dyn TopologyProvider, node_id: NodeId) -> NodeFlags {
    let mut flags = net.node_flags(node_id);
    let Some(node) = map.node(node_id) else {
        return flags;
    };

    let two = node.segment_count() == 2;
    flags.set(NodeFlags::TRANSITION, two && node.style.needs_transition());

    match node.style {
        NodeStyle::Middle => {
            flags.set(NodeFlags::MIDDLE, true);
            flags.set(NodeFlags::BEND, false);
            flags.set(NodeFlags::JUNCTION, false);
            flags.set(
                NodeFlags::MOVEABLE,
                style::node_is_default(map, net, node_id),
            );
        }
        NodeStyle::Bend | NodeStyle::Stretch => {
            flags.set(NodeFlags::BEND, true);
            flags.set(NodeFlags::MIDDLE, false);
            flags.set(NodeFlags::JUNCTION, false);
            flags.set(NodeFlags::MOVEABLE, false);
        }
        NodeStyle::End => {
            flags.set(NodeFlags::MOVEABLE, false);
        }
        NodeStyle::Crossing | NodeStyle::UTurn | NodeStyle::Custom => {
            flags.set(NodeFlags::JUNCTION, true);
            flags.set(NodeFlags::MIDDLE, false);
            flags.set(NodeFlags::BEND, false);
            flags.set(NodeFlags::MOVEABLE, false);
        }
    }
    flags
}
