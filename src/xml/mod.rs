//! XML-Persistenz für den Kontroll-Zustand.
//!
//! Dieses Modul implementiert das Parsen und Schreiben des Snapshot-Formats:
//! ein `<JunctionControl>`-Wurzelelement mit einem `<Node>`-Element pro
//! Knoten-Eintrag und einem `<SE>`-Element pro Segmentende.

pub mod parser;
pub mod writer;

pub use parser::{parse_snapshot, EndSnapshot, NodeSnapshot, Snapshot};
pub use writer::write_snapshot;

/// Format-Version des aktuellen Snapshot-Schemas.
pub const SNAPSHOT_VERSION: &str = "2.0";
