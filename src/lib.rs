//! Junction-Control Library.
//! Klassifiziert Netzwerk-Knoten in Styles und berechnet die
//! Schnitt-Geometrie der anliegenden Segmentenden.

pub mod core;
pub mod geometry;
pub mod legacy;
pub mod ops;
pub mod options;
pub mod persist;
pub mod topology;
pub mod xml;

pub use crate::core::{
    compare_roads, rank_segments, select_main, ControlMap, Corner, EndFlag, MainRoad, NodeControl,
    NodeStyle, ScalarControl, SegmentEnd,
};
pub use geometry::BezierTrajectory;
pub use legacy::{migrate_legacy, MigrationStats};
pub use options::ControlOptions;
pub use persist::{
    apply_snapshot, load_state, save_state, LoadOutcome, MemoryStore, SnapshotStore,
};
pub use topology::{
    NetworkModel, NodeFlags, NodeId, RoadClass, RoadInfo, SegmentAnchors, SegmentId,
    TopologyProvider,
};
pub use xml::{parse_snapshot, write_snapshot, Snapshot};
