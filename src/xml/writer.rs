//! Writer für Kontroll-Snapshots.

use crate::core::ControlMap;
use crate::topology::TopologyProvider;
use anyhow::Result;

/// Schreibt die Registry als Snapshot-XML.
///
/// Die Ecken-Offsets `LO`/`RO` werden aus Offset und Rotation über die
/// live Fahrbahnbreite kodiert; der Loader rekonstruiert beide Werte aus
/// Summe und Differenz. Enden, deren Segment im Netzwerk nicht mehr
/// auflösbar ist, werden mit Warnung übersprungen.
pub fn write_snapshot(map: &ControlMap, net: &dyn TopologyProvider) -> Result<String> {
    let mut output = String::new();
    output.push_str("<?xml version=\"1.0\" encoding=\"utf-8\" standalone=\"no\"?>\n");
    output.push_str(&format!(
        "<JunctionControl V=\"{}\">\n",
        super::SNAPSHOT_VERSION
    ));

    // Knoten aufsteigend nach ID, damit der Snapshot deterministisch ist
    let mut node_ids = map.node_ids();
    node_ids.sort_unstable();

    for node_id in node_ids {
        let Some(node) = map.node(node_id) else {
            continue;
        };
        output.push_str(&format!(
            "    <Node Id=\"{}\" T=\"{}\">\n",
            node.id,
            node.style.tag()
        ));

        for end in map.ends_of_node(node_id) {
            let Some(road) = net.road_info(end.segment_id) else {
                log::warn!(
                    "Segment #{} ohne Straßen-Info, Ende wird nicht gespeichert",
                    end.segment_id
                );
                continue;
            };

            let spread = road.half_width * end.rotate_angle.to_radians().tan();
            output.push_str(&format!(
                "        <SE Id=\"{}\" LO=\"{}\" RO=\"{}\" SA=\"{}\" TA=\"{}\" S=\"{}\" NM=\"{}\" IS=\"{}\"/>\n",
                end.segment_id,
                format_float(end.offset + spread),
                format_float(end.offset - spread),
                format_float(end.slope_angle),
                format_float(end.twist_angle),
                format_float(end.shift),
                u8::from(end.no_markings),
                u8::from(end.is_slope),
            ));
        }

        output.push_str("    </Node>\n");
    }

    output.push_str("</JunctionControl>\n");

    Ok(output)
}

fn format_float(value: f32) -> String {
    format!("{:.3}", value)
}
