//! Zentrale Konfiguration des Berechnungskerns.
//!
//! `ControlOptions` enthält die zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als feste Grenzen erhalten.

use serde::{Deserialize, Serialize};

// ── Wertebereiche der Regler ────────────────────────────────────────

/// Minimaler Längs-Offset in Metern.
pub const OFFSET_MIN: f32 = 0.0;
/// Maximaler Längs-Offset in Metern.
pub const OFFSET_MAX: f32 = 100.0;
/// Maximale seitliche Verschiebung in Metern (symmetrisch um 0).
pub const SHIFT_MAX: f32 = 32.0;
/// Maximale Drehung der Schnittlinie in Grad (symmetrisch um 0).
pub const ROTATE_MAX: f32 = 60.0;
/// Maximale Längsneigung in Grad (symmetrisch um 0).
pub const SLOPE_MAX: f32 = 60.0;
/// Maximale Querneigung in Grad (symmetrisch um 0).
pub const TWIST_MAX: f32 = 60.0;

// ── Style-Defaults ──────────────────────────────────────────────────

/// Default-Offset für Wendeknoten: Platz für den Wendekreis.
pub const UTURN_CLEARANCE: f32 = 8.0;

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Zur Laufzeit änderbare Optionen des Kerns.
/// Wird als `junction_control.toml` neben der Host-Binary gespeichert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlOptions {
    /// Vertikal-Korrekturen auch auf Segmente ohne eigene Einträge anwenden.
    #[serde(default = "default_universal_slope_fixes")]
    pub universal_slope_fixes: bool,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self::new_game()
    }
}

/// Serde-Default für `universal_slope_fixes` (Abwärtskompatibilität).
fn default_universal_slope_fixes() -> bool {
    true
}

impl ControlOptions {
    /// Defaults für ein neues Spiel: Korrekturen aktiv.
    pub fn new_game() -> Self {
        Self {
            universal_slope_fixes: true,
        }
    }

    /// Defaults beim Laden eines alten Spielstands: Korrekturen aus,
    /// damit bestehende Geometrie nicht ungefragt verändert wird.
    pub fn load_game() -> Self {
        Self {
            universal_slope_fixes: false,
        }
    }

    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Host-Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("junction_control"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("junction_control.toml")
    }
}
