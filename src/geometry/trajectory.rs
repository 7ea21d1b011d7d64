//! Trajektorien für Segment-Kurven: Gerade und kubische Bezier.
//!
//! Koordinaten-Konvention des Hosts: XZ ist die Bodenebene, Y zeigt nach
//! oben. Positive Drehung in `turn_xz` dreht +X nach +Z.

use glam::Vec3;

/// Anzahl der Sehnen-Schritte für Bogenlängen-Näherung.
const LENGTH_STEPS: usize = 32;

/// Länge der XZ-Projektion eines Vektors.
pub fn length_xz(v: Vec3) -> f32 {
    (v.x * v.x + v.z * v.z).sqrt()
}

/// Dreht einen Vektor in der XZ-Ebene um `angle` Radiant (Y bleibt erhalten).
pub fn turn_xz(v: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x * cos - v.z * sin, v.y, v.x * sin + v.z * cos)
}

/// Gerade zwischen zwei Punkten, parametrisiert über t ∈ [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StraightTrajectory {
    /// Startpunkt.
    pub start: Vec3,
    /// Endpunkt.
    pub end: Vec3,
}

impl StraightTrajectory {
    /// Erstellt eine Gerade.
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// Punkt bei Parameter t (0 = Start, 1 = Ende).
    pub fn position(&self, t: f32) -> Vec3 {
        self.start.lerp(self.end, t)
    }

    /// Normalisierte Richtung Start → Ende.
    pub fn direction(&self) -> Vec3 {
        (self.end - self.start).normalize_or_zero()
    }

    /// Länge der Geraden.
    pub fn length(&self) -> f32 {
        (self.end - self.start).length()
    }
}

/// Kubische Bezier-Kurve mit vier Kontrollpunkten.
///
/// Segment-Kurven werden aus den Host-Ankern aufgebaut: Endpunkte plus
/// Tangenten-Richtungen, Kontrollpunkte bei einem Drittel der Distanz.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BezierTrajectory {
    /// Startpunkt.
    pub a: Vec3,
    /// Erster Kontrollpunkt.
    pub b: Vec3,
    /// Zweiter Kontrollpunkt.
    pub c: Vec3,
    /// Endpunkt.
    pub d: Vec3,
}

impl BezierTrajectory {
    /// Baut die Kurve aus Endpunkten und Anker-Richtungen auf.
    /// Beide Richtungen zeigen vom jeweiligen Ende in die Kurve hinein.
    pub fn from_ends(start_pos: Vec3, start_dir: Vec3, end_pos: Vec3, end_dir: Vec3) -> Self {
        let control = (end_pos - start_pos).length() / 3.0;
        Self {
            a: start_pos,
            b: start_pos + start_dir * control,
            c: end_pos + end_dir * control,
            d: end_pos,
        }
    }

    /// Punkt auf der Kurve bei Parameter t ∈ [0, 1].
    pub fn position(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        self.a * (u * u * u)
            + self.b * (3.0 * u * u * t)
            + self.c * (3.0 * u * t * t)
            + self.d * (t * t * t)
    }

    /// Normalisierte Tangente bei Parameter t.
    pub fn tangent(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let derivative = (self.b - self.a) * (3.0 * u * u)
            + (self.c - self.b) * (6.0 * u * t)
            + (self.d - self.c) * (3.0 * t * t);
        let dir = derivative.normalize_or_zero();
        if dir == Vec3::ZERO {
            // Degenerierte Kurve (z.B. a == b): Sehnen-Richtung als Ersatz
            (self.d - self.a).normalize_or_zero()
        } else {
            dir
        }
    }

    /// Bogenlänge über Sehnen-Näherung.
    pub fn length(&self) -> f32 {
        let mut total = 0.0;
        let mut prev = self.a;
        for i in 1..=LENGTH_STEPS {
            let t = i as f32 / LENGTH_STEPS as f32;
            let point = self.position(t);
            total += (point - prev).length();
            prev = point;
        }
        total
    }

    /// Parameter t, bei dem die zurückgelegte Bogenlänge `distance` erreicht.
    /// Ergebnis ist auf [0, 1] begrenzt.
    pub fn travel(&self, distance: f32) -> f32 {
        if distance <= 0.0 {
            return 0.0;
        }
        let mut walked = 0.0;
        let mut prev = self.a;
        for i in 1..=LENGTH_STEPS {
            let t = i as f32 / LENGTH_STEPS as f32;
            let point = self.position(t);
            let step = (point - prev).length();
            if walked + step >= distance && step > 0.0 {
                let within = (distance - walked) / step;
                return (i as f32 - 1.0 + within) / LENGTH_STEPS as f32;
            }
            walked += step;
            prev = point;
        }
        1.0
    }

    /// Kurve in Gegenrichtung (Ende wird Start).
    pub fn inverted(&self) -> Self {
        Self {
            a: self.d,
            b: self.c,
            c: self.b,
            d: self.a,
        }
    }
}
