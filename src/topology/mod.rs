//! Anbindung an die Netzwerk-Topologie des Hosts.
//!
//! Der Kern besitzt das Straßennetz nicht selbst: Knoten und Segmente gehören
//! dem Host-Spiel und werden ausschließlich über IDs referenziert, die bei
//! jeder Verwendung über den [`TopologyProvider`] aufgelöst werden.

pub mod flags;
pub mod network;
pub mod provider;
pub mod road;

pub use flags::NodeFlags;
pub use network::NetworkModel;
pub use provider::{SegmentAnchors, TopologyProvider};
pub use road::{RoadClass, RoadInfo};

/// ID eines Netzwerk-Knotens (Host-Engine verwendet 16-Bit-IDs, 0 ist nie gültig).
pub type NodeId = u16;
/// ID eines Netzwerk-Segments.
pub type SegmentId = u16;
