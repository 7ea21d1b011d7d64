//! Schnittpunkt zwischen Korner-Sehne und Segment-Kurve.
//!
//! Der Schnitt wird in der XZ-Projektion gesucht; die Kurve wird dafür in
//! Sehnen-Abschnitte zerlegt.

use super::{BezierTrajectory, StraightTrajectory};
use glam::Vec2;

/// Anzahl der Kurven-Abschnitte für die Schnittsuche.
const SAMPLE_STEPS: usize = 64;

/// Gefundener Schnittpunkt: Parameter auf Sehne und Kurve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordHit {
    /// Parameter auf der Sehne (0..1).
    pub chord_t: f32,
    /// Parameter auf der Kurve (0..1).
    pub curve_t: f32,
}

/// Schneidet die Sehne mit der Kurve in der XZ-Ebene.
///
/// Liefert den Schnitt mit dem kleinsten Kurven-Parameter, oder `None`
/// wenn sich Sehne und Kurve nicht kreuzen (degenerierte Geometrie).
pub fn chord_curve_intersection_xz(
    chord: &StraightTrajectory,
    curve: &BezierTrajectory,
) -> Option<ChordHit> {
    let chord_start = xz(chord.start.x, chord.start.z);
    let chord_end = xz(chord.end.x, chord.end.z);

    let mut prev_t = 0.0;
    let mut prev = curve.position(0.0);
    for i in 1..=SAMPLE_STEPS {
        let t = i as f32 / SAMPLE_STEPS as f32;
        let point = curve.position(t);
        let hit = segment_segment_xz(
            chord_start,
            chord_end,
            xz(prev.x, prev.z),
            xz(point.x, point.z),
        );
        if let Some((chord_t, section_t)) = hit {
            let curve_t = prev_t + section_t * (t - prev_t);
            return Some(ChordHit { chord_t, curve_t });
        }
        prev_t = t;
        prev = point;
    }
    None
}

fn xz(x: f32, z: f32) -> Vec2 {
    Vec2::new(x, z)
}

/// Schnitt zweier 2D-Strecken. Liefert die Parameter (t, u) auf beiden
/// Strecken, jeweils in [0, 1], oder `None` bei Parallelität.
fn segment_segment_xz(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> Option<(f32, f32)> {
    let d1 = p2 - p1;
    let d2 = p4 - p3;
    let denom = d1.perp_dot(d2);
    if denom.abs() < 1e-9 {
        return None;
    }
    let offset = p3 - p1;
    let t = offset.perp_dot(d2) / denom;
    let u = offset.perp_dot(d1) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some((t, u))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec3;

    #[test]
    fn test_sehne_kreuzt_gerade_kurve() {
        let curve = BezierTrajectory::from_ends(
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(100.0, 0.0, 0.0),
            -Vec3::X,
        );
        // Senkrechte Sehne bei x = 30
        let chord = StraightTrajectory::new(
            Vec3::new(30.0, 0.0, -10.0),
            Vec3::new(30.0, 0.0, 10.0),
        );
        let hit = chord_curve_intersection_xz(&chord, &curve).expect("Schnitt erwartet");
        assert_relative_eq!(hit.chord_t, 0.5, epsilon = 1e-3);
        assert_relative_eq!(curve.position(hit.curve_t).x, 30.0, epsilon = 0.2);
    }

    #[test]
    fn test_parallele_sehne_ohne_schnitt() {
        let curve = BezierTrajectory::from_ends(
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(100.0, 0.0, 0.0),
            -Vec3::X,
        );
        // Parallel zur Kurve, seitlich versetzt
        let chord = StraightTrajectory::new(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(100.0, 0.0, 5.0),
        );
        assert!(chord_curve_intersection_xz(&chord, &curve).is_none());
    }

    #[test]
    fn test_segment_segment_parameter() {
        let hit = segment_segment_xz(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(2.5, -5.0),
            Vec2::new(2.5, 5.0),
        )
        .expect("Schnitt erwartet");
        assert_relative_eq!(hit.0, 0.25, epsilon = 1e-6);
        assert_relative_eq!(hit.1, 0.5, epsilon = 1e-6);
    }
}
