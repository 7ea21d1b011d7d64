//! Parser für Kontroll-Snapshots.

use crate::core::NodeStyle;
use crate::topology::{NodeId, SegmentId};
use anyhow::{bail, Context, Result};
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Ein geladener Snapshot vor dem Abgleich mit der live Topologie.
///
/// Der Parser arbeitet rein auf dem XML; Offset und Rotation entstehen
/// erst beim Anwenden aus den Ecken-Offsets und der live Fahrbahnbreite.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    /// Format-Version aus dem Wurzelelement.
    pub version: String,
    /// Knoten in Datei-Reihenfolge.
    pub nodes: Vec<NodeSnapshot>,
}

/// Ein Knoten-Eintrag des Snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSnapshot {
    /// Netzwerk-ID des Knotens.
    pub id: NodeId,
    /// Gespeicherter Style.
    pub style: NodeStyle,
    /// Segmentenden in Datei-Reihenfolge.
    pub ends: Vec<EndSnapshot>,
}

/// Ein Segmentende des Snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct EndSnapshot {
    /// Netzwerk-ID des Segments.
    pub segment_id: SegmentId,
    /// Kodierter Offset der linken Ecke.
    pub left_offset: f32,
    /// Kodierter Offset der rechten Ecke.
    pub right_offset: f32,
    /// Längsneigung in Grad.
    pub slope_angle: f32,
    /// Querneigung in Grad.
    pub twist_angle: f32,
    /// Seitliche Verschiebung in Metern.
    pub shift: f32,
    /// Markierungen unterdrücken.
    pub no_markings: bool,
    /// Ende folgt dem Höhenverlauf.
    pub is_slope: bool,
}

/// Parsed einen Snapshot aus einem XML-String.
///
/// Fehlerhafte Knoten- und Enden-Einträge (ungültige IDs, unbekannte
/// Style-Tags) werden mit Warnung übersprungen; nur ein fehlendes
/// Wurzelelement oder eine fehlende Version sind fatal.
pub fn parse_snapshot(xml_content: &str) -> Result<Snapshot> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(true);
    reader.config_mut().expand_empty_elements = true;

    let mut buffer = Vec::new();

    let mut root_seen = false;
    let mut root_version: Option<String> = None;
    let mut nodes: Vec<NodeSnapshot> = Vec::new();
    let mut current_node: Option<NodeSnapshot> = None;

    loop {
        match reader.read_event_into(&mut buffer) {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                let tag = reader.decoder().decode(name.as_ref())?;

                match tag.as_ref() {
                    "JunctionControl" => {
                        root_seen = true;
                        for attr in e.attributes().with_checks(false) {
                            let attr = attr?;
                            let key = reader.decoder().decode(attr.key.as_ref())?;
                            if key == "V" {
                                root_version = Some(attr.unescape_value()?.into_owned());
                            }
                        }
                    }
                    "Node" => match parse_node_attrs(&reader, e) {
                        Ok((id, style)) => {
                            current_node = Some(NodeSnapshot {
                                id,
                                style,
                                ends: Vec::new(),
                            });
                        }
                        Err(err) => {
                            log::warn!("Node-Eintrag übersprungen: {:#}", err);
                            current_node = None;
                        }
                    },
                    "SE" => match current_node.as_mut() {
                        Some(node) => match parse_end_attrs(&reader, e) {
                            Ok(end) => node.ends.push(end),
                            Err(err) => {
                                log::warn!("Segmentende übersprungen: {:#}", err);
                            }
                        },
                        None => {
                            log::warn!("<SE> außerhalb eines <Node>-Elements wird ignoriert");
                        }
                    },
                    other => {
                        log::warn!("Unbekanntes Element <{}> wird ignoriert", other);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                let tag = reader.decoder().decode(name.as_ref())?;
                if tag == "Node" {
                    if let Some(node) = current_node.take() {
                        nodes.push(node);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(err).context("Fehler beim Parsen des XML"),
            _ => {}
        }

        buffer.clear();
    }

    if !root_seen {
        bail!("Kein <JunctionControl>-Wurzelelement gefunden");
    }
    let version = root_version.context("Keine Version im Snapshot gefunden")?;

    Ok(Snapshot { version, nodes })
}

/// Liest `Id` und `T` eines `<Node>`-Elements.
fn parse_node_attrs(reader: &Reader<&[u8]>, e: &BytesStart) -> Result<(NodeId, NodeStyle)> {
    let mut id: Option<NodeId> = None;
    let mut tag: Option<u8> = None;

    for attr in e.attributes().with_checks(false) {
        let attr = attr?;
        let key = reader.decoder().decode(attr.key.as_ref())?;
        let value = attr.unescape_value()?;
        match key.as_ref() {
            "Id" => {
                id = Some(
                    value
                        .trim()
                        .parse()
                        .context("Knoten-ID ist keine gültige Zahl")?,
                );
            }
            "T" => {
                tag = Some(
                    value
                        .trim()
                        .parse()
                        .context("Style-Tag ist keine gültige Zahl")?,
                );
            }
            _ => {}
        }
    }

    let id = id.context("Attribut Id fehlt am <Node>-Element")?;
    let tag = tag.context("Attribut T fehlt am <Node>-Element")?;
    let style = NodeStyle::from_tag(tag)
        .with_context(|| format!("Unbekannter Style-Tag {} an Node #{}", tag, id))?;

    Ok((id, style))
}

/// Liest die Attribute eines `<SE>`-Elements. Fehlende Werte fallen auf
/// die Entitäts-Defaults zurück, nur die Segment-ID ist Pflicht.
fn parse_end_attrs(reader: &Reader<&[u8]>, e: &BytesStart) -> Result<EndSnapshot> {
    let mut segment_id: Option<SegmentId> = None;
    let mut left_offset = 0.0f32;
    let mut right_offset = 0.0f32;
    let mut slope_angle = 0.0f32;
    let mut twist_angle = 0.0f32;
    let mut shift = 0.0f32;
    let mut no_markings = false;
    let mut is_slope = true;

    for attr in e.attributes().with_checks(false) {
        let attr = attr?;
        let key = reader.decoder().decode(attr.key.as_ref())?;
        let value = attr.unescape_value()?;
        match key.as_ref() {
            "Id" => {
                segment_id = Some(
                    value
                        .trim()
                        .parse()
                        .context("Segment-ID ist keine gültige Zahl")?,
                );
            }
            "LO" => left_offset = parse_float(&value)?,
            "RO" => right_offset = parse_float(&value)?,
            "SA" => slope_angle = parse_float(&value)?,
            "TA" => twist_angle = parse_float(&value)?,
            "S" => shift = parse_float(&value)?,
            "NM" => no_markings = parse_bool(&value)?,
            "IS" => is_slope = parse_bool(&value)?,
            _ => {}
        }
    }

    Ok(EndSnapshot {
        segment_id: segment_id.context("Attribut Id fehlt am <SE>-Element")?,
        left_offset,
        right_offset,
        slope_angle,
        twist_angle,
        shift,
        no_markings,
        is_slope,
    })
}

fn parse_float(text: &str) -> Result<f32> {
    let trimmed = text.trim();
    trimmed
        .parse::<f32>()
        .with_context(|| format!("Wert '{}' konnte nicht geparst werden", trimmed))
}

/// Boolesche Attribute sind als 0/1 kodiert; jeder Wert ungleich 0 gilt als wahr.
fn parse_bool(text: &str) -> Result<bool> {
    let raw = text
        .trim()
        .parse::<i32>()
        .with_context(|| format!("Wert '{}' ist kein boolescher 0/1-Wert", text.trim()))?;
    Ok(raw != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot_mit_enden() {
        let xml = r#"
        <JunctionControl V="2.0">
            <Node Id="42" T="5">
                <SE Id="7" LO="1.500" RO="0.500" SA="3.000" TA="-2.000" S="1.250" NM="1" IS="0"/>
                <SE Id="8" LO="0.000" RO="0.000" SA="0.000" TA="0.000" S="0.000" NM="0" IS="1"/>
            </Node>
        </JunctionControl>
        "#;

        let snapshot = parse_snapshot(xml).expect("Parsing fehlgeschlagen");
        assert_eq!(snapshot.version, "2.0");
        assert_eq!(snapshot.nodes.len(), 1);

        let node = &snapshot.nodes[0];
        assert_eq!(node.id, 42);
        assert_eq!(node.style, NodeStyle::Custom);
        assert_eq!(node.ends.len(), 2);

        let erstes = &node.ends[0];
        assert_eq!(erstes.segment_id, 7);
        assert_eq!(erstes.left_offset, 1.5);
        assert_eq!(erstes.right_offset, 0.5);
        assert_eq!(erstes.slope_angle, 3.0);
        assert_eq!(erstes.twist_angle, -2.0);
        assert_eq!(erstes.shift, 1.25);
        assert!(erstes.no_markings);
        assert!(!erstes.is_slope);
    }

    #[test]
    fn test_parse_ueberspringt_unbekannten_style_tag() {
        // Tag 9 existiert nicht; der Knoten samt Enden fällt weg
        let xml = r#"
        <JunctionControl V="2.0">
            <Node Id="1" T="9">
                <SE Id="10" LO="0" RO="0"/>
            </Node>
            <Node Id="2" T="0"/>
        </JunctionControl>
        "#;

        let snapshot = parse_snapshot(xml).expect("Parsing fehlgeschlagen");
        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(snapshot.nodes[0].id, 2);
        assert_eq!(snapshot.nodes[0].style, NodeStyle::Middle);
    }

    #[test]
    fn test_parse_se_defaults() {
        let xml = r#"
        <JunctionControl V="2.0">
            <Node Id="1" T="5">
                <SE Id="10"/>
            </Node>
        </JunctionControl>
        "#;

        let snapshot = parse_snapshot(xml).expect("Parsing fehlgeschlagen");
        let end = &snapshot.nodes[0].ends[0];
        assert_eq!(end.segment_id, 10);
        assert_eq!(end.left_offset, 0.0);
        assert_eq!(end.shift, 0.0);
        assert!(!end.no_markings);
        assert!(end.is_slope, "IS fehlt: Entitäts-Default ist geneigt");
    }

    #[test]
    fn test_parse_ohne_wurzelelement_schlaegt_fehl() {
        let err = parse_snapshot("<Irgendwas/>").expect_err("Parser sollte fehlschlagen");
        let msg = format!("{err:#}");
        assert!(msg.contains("Wurzelelement"));
    }

    #[test]
    fn test_parse_ohne_version_schlaegt_fehl() {
        let err = parse_snapshot("<JunctionControl></JunctionControl>")
            .expect_err("Parser sollte fehlschlagen");
        let msg = format!("{err:#}");
        assert!(msg.contains("Version"));
    }

    #[test]
    fn test_roundtrip_mit_writer() {
        use crate::core::{ControlMap, NodeControl, SegmentEnd};
        use crate::topology::{NetworkModel, RoadInfo};
        use crate::xml::writer::write_snapshot;
        use glam::Vec3;

        let mut net = NetworkModel::new();
        net.add_node(1, Vec3::ZERO);
        net.add_node(2, Vec3::new(100.0, 0.0, 0.0));
        net.add_segment(10, 1, 2, RoadInfo::default());

        let mut map = ControlMap::new();
        let mut node = NodeControl::with_style(1, NodeStyle::Custom);
        node.segment_ends.insert(10);
        map.insert_node(node);
        let mut end = SegmentEnd::new(10, 1);
        end.offset = 4.0;
        end.rotate_angle = 30.0;
        end.shift = -2.0;
        end.no_markings = true;
        map.insert_segment_end(end);

        let xml = write_snapshot(&map, &net).expect("Export fehlgeschlagen");
        let snapshot = parse_snapshot(&xml).expect("Re-Parsing fehlgeschlagen");

        assert_eq!(snapshot.nodes.len(), 1);
        let node = &snapshot.nodes[0];
        assert_eq!(node.id, 1);
        assert_eq!(node.style, NodeStyle::Custom);
        assert_eq!(node.ends.len(), 1);

        // Offset und Rotation aus den Ecken-Offsets rekonstruieren
        let se = &node.ends[0];
        let half_width = 8.0f32;
        let offset = (se.left_offset + se.right_offset) / 2.0;
        let rotate = ((se.left_offset - se.right_offset) / (2.0 * half_width))
            .atan()
            .to_degrees();
        assert!((offset - 4.0).abs() < 0.01);
        assert!((rotate - 30.0).abs() < 0.1);
        assert_eq!(se.shift, -2.0);
        assert!(se.no_markings);
    }
}
