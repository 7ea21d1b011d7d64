//! Operationen auf der Kontroll-Registry.
//!
//! Alle Funktionen arbeiten auf einer [`ControlMap`](crate::core::ControlMap)
//! plus einem [`TopologyProvider`](crate::topology::TopologyProvider) und
//! sind die einzige Schreib-Schnittstelle für Hosts: Lebenszyklus und
//! Topologie-Abgleich (`update`), Style-Wechsel (`style`), Regler und
//! Aggregate (`fields`), Eignungs-Checks (`support`) sowie die
//! Geometrie-Neuberechnung (`geometry`).

pub mod fields;
pub mod geometry;
pub mod style;
pub mod support;
pub mod update;

pub use fields::{
    node_no_markings, node_offset, node_rotate_angle, node_shift, node_slope_angle,
    node_twist_angle, set_end_flag, set_end_scalar, set_node_no_markings, set_node_offset,
    set_node_rotate_angle, set_node_shift, set_node_slope_angle, set_node_twist_angle,
    set_slope_junctions, slope_junctions,
};
pub use geometry::{corner, is_smooth, refresh_node_geometry, refresh_segment};
pub use style::{node_is_default, possible_style, possible_styles, reset_node_to_default, set_style};
pub use support::{
    can_twist, flatten_override, hide_crossing_markings, is_supported, slope_fix_candidates,
};
pub use update::{ensure_node, release_node, update_node, NodeRefresh};
