//! Room descriptors and geometry generators
//!
//! Two families of 2D rooms are supported, both bounded by a 4-vertex
//! polygon with exactly two reflective walls:
//! - parallel: a corridor between two hard walls at `x = 0` and
//!   `x = distance`, open (anechoic) at `y = -10` and `y = 10`.
//! - angled: a wedge between two hard walls meeting at the origin with a
//!   configurable opening angle, closed off by two anechoic edges.
//!
//! The generators are pure: all randomness lives in [`crate::sampling`].
//! They do not validate their inputs; [`RoomDescriptor::validate`] is the
//! defensive boundary the workflow runs before assembling experiments.

use crate::error::{Result, RirgenError};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 2D point in room coordinates (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Polar to Cartesian, with the angle in radians.
    pub fn from_polar(amp: f64, angle: f64) -> Self {
        Self {
            x: amp * angle.cos(),
            y: amp * angle.sin(),
        }
    }

    pub fn distance_to(&self, other: &Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Dimensionality tag of a room descriptor.
///
/// Only 2D rooms are simulated today; the 3D tag exists so that future
/// descriptors survive the pipeline (they are skipped, not rejected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomKind {
    #[serde(rename = "2D")]
    TwoD,
    #[serde(rename = "3D")]
    ThreeD,
}

/// Wall material tag, resolved to acoustic properties by the engine layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    /// Fully reflective wall.
    HardSurface,
    /// Open boundary that absorbs everything that reaches it.
    Anechoic,
}

impl Material {
    /// Energy absorption coefficient used when building the engine room.
    pub fn absorption(&self) -> f64 {
        match self {
            // Painted concrete-like surface
            Material::HardSurface => 0.02,
            Material::Anechoic => 1.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Material::HardSurface => "hard_surface",
            Material::Anechoic => "anechoic",
        }
    }
}

/// One geometric scenario: polygon, wall materials, a source and at least
/// one microphone.
///
/// `room_id` is descriptive, derived from the generating parameters; it is
/// not unique on its own (identical parameters produce identical ids);
/// global uniqueness is added by the experiment assembler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDescriptor {
    pub room_id: String,
    #[serde(rename = "type")]
    pub kind: RoomKind,
    pub source: Point2,
    pub mics: Vec<Point2>,
    pub polygon: Vec<Point2>,
    pub materials: Vec<Material>,
}

/// Generate a corridor room bounded by two parallel hard walls.
///
/// The polygon is the rectangle `[0, distance] x [-10, 10]`; it depends
/// only on `distance`, never on the source or mic placement. The source
/// sits on the corridor axis at `(source_x, 0)`.
pub fn parallel_room(distance: f64, source_x: f64, mic_x: f64, mic_y: f64) -> RoomDescriptor {
    RoomDescriptor {
        // Debug-format the floats so whole numbers keep their decimal
        // point ("10.0", not "10"), matching the reference dataset ids.
        room_id: format!("2wall_parallel_{:?}_{:?}", distance, source_x),
        kind: RoomKind::TwoD,
        source: Point2::new(source_x, 0.0),
        mics: vec![Point2::new(mic_x, mic_y)],
        polygon: vec![
            Point2::new(0.0, 10.0),
            Point2::new(0.0, -10.0),
            Point2::new(distance, -10.0),
            Point2::new(distance, 10.0),
        ],
        materials: vec![
            Material::HardSurface,
            Material::Anechoic,
            Material::HardSurface,
            Material::Anechoic,
        ],
    }
}

/// Generate a wedge room bounded by two hard walls meeting at the origin.
///
/// All angle arguments are fractions of a half turn and are scaled by pi
/// here. The wedge spans `[0, angle]`; source and mic are placed from
/// their polar parameters. The caller must keep `0 < angle < 2/3` for the
/// polygon to stay simple, and amplitudes below 10 for interior points.
pub fn angle_room(
    angle: f64,
    source_angle: f64,
    source_amp: f64,
    mic_angle: f64,
    mic_amp: f64,
) -> RoomDescriptor {
    let angle = angle * PI;
    let source_angle = source_angle * PI;
    let mic_angle = mic_angle * PI;
    RoomDescriptor {
        room_id: format!("2wall_angled_{:?}_{:?}_{:?}", angle, source_angle, source_amp),
        kind: RoomKind::TwoD,
        source: Point2::from_polar(source_amp, source_angle),
        mics: vec![Point2::from_polar(mic_amp, mic_angle)],
        polygon: vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(20.0 * (angle / 2.0).cos(), 20.0 * (angle / 2.0).sin()),
            Point2::new(10.0 * angle.cos(), 10.0 * angle.sin()),
        ],
        materials: vec![
            Material::HardSurface,
            Material::Anechoic,
            Material::Anechoic,
            Material::HardSurface,
        ],
    }
}

impl RoomDescriptor {
    /// Defensive geometric validation.
    ///
    /// The samplers produce valid rooms by construction; this check is the
    /// explicit boundary that catches bad hand-built descriptors or a
    /// broken sampling policy. Verifies that the polygon is a simple
    /// quadrilateral, that materials and edges line up, and that the
    /// source and every mic are strictly interior.
    pub fn validate(&self) -> Result<()> {
        if self.polygon.len() != 4 {
            return self.invalid(format!("expected 4 vertices, got {}", self.polygon.len()));
        }
        if self.materials.len() != self.polygon.len() {
            return self.invalid(format!(
                "{} materials for {} edges",
                self.materials.len(),
                self.polygon.len()
            ));
        }
        if self.mics.is_empty() {
            return self.invalid("no microphones".to_string());
        }
        if !is_simple_polygon(&self.polygon) {
            return self.invalid("polygon is self-intersecting".to_string());
        }
        if !point_in_polygon(&self.source, &self.polygon) {
            return self.invalid(format!(
                "source ({}, {}) is not interior",
                self.source.x, self.source.y
            ));
        }
        for (i, mic) in self.mics.iter().enumerate() {
            if !point_in_polygon(mic, &self.polygon) {
                return self.invalid(format!("mic {} ({}, {}) is not interior", i, mic.x, mic.y));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> Result<()> {
        Err(RirgenError::GeometryInvalid {
            room_id: self.room_id.clone(),
            reason,
        })
    }
}

/// Strict interior test via ray casting.
///
/// Points on the boundary are reported as outside; the samplers hit exact
/// boundaries with probability zero, so the open/closed distinction does
/// not matter for generated rooms.
pub fn point_in_polygon(p: &Point2, polygon: &[Point2]) -> bool {
    let n = polygon.len();
    let mut inside = false;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        if on_segment(p, &a, &b) {
            return false;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

/// Check that no two non-adjacent edges of the polygon intersect.
pub fn is_simple_polygon(polygon: &[Point2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let (a1, a2) = (polygon[i], polygon[(i + 1) % n]);
        for j in i + 1..n {
            // Skip edges sharing a vertex
            if j == i || (j + 1) % n == i || (i + 1) % n == j {
                continue;
            }
            let (b1, b2) = (polygon[j], polygon[(j + 1) % n]);
            if segments_intersect(&a1, &a2, &b1, &b2) {
                return false;
            }
        }
    }
    true
}

fn cross(o: &Point2, a: &Point2, b: &Point2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn on_segment(p: &Point2, a: &Point2, b: &Point2) -> bool {
    const EPS: f64 = 1e-12;
    cross(a, b, p).abs() < EPS
        && p.x >= a.x.min(b.x) - EPS
        && p.x <= a.x.max(b.x) + EPS
        && p.y >= a.y.min(b.y) - EPS
        && p.y <= a.y.max(b.y) + EPS
}

fn segments_intersect(a1: &Point2, a2: &Point2, b1: &Point2, b2: &Point2) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    // Collinear overlaps
    (d1 == 0.0 && on_segment(a1, b1, b2))
        || (d2 == 0.0 && on_segment(a2, b1, b2))
        || (d3 == 0.0 && on_segment(b1, a1, a2))
        || (d4 == 0.0 && on_segment(b2, a1, a2))
}
