//! Kern-Datenmodell: Knoten-Einträge, Segmentenden, Styles und Hauptstraße.

pub mod control_map;
pub mod main_road;
pub mod node;
pub mod segment_end;
pub mod style;

pub use control_map::ControlMap;
pub use main_road::{compare_roads, rank_segments, select_main, MainRoad};
pub use node::NodeControl;
pub use segment_end::{Corner, EndFlag, SegmentEnd};
pub use style::{NodeStyle, ScalarControl};
