//! Laden der binären Alt-Formate.
//!
//! Drei Snapshot-Generationen existierten vor dem heutigen XML-Format;
//! [`stream`] liest ihren gemeinsamen Objekt-Strom, [`migrate`] setzt die
//! Records über eine Bindungs-Tabelle in den aktuellen Snapshot um.

pub mod migrate;
pub mod stream;

pub use migrate::{
    migrate_legacy, MigrationStats, LEGACY_BLOCK_GEN0, LEGACY_BLOCK_GEN1, LEGACY_BLOCK_GEN2,
};
pub use stream::{read_objects, write_objects, LegacyObject, LegacyValue};
