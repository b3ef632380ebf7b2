//! Loop geometry reconstruction.
//!
//! Outline sections store their boundaries as a flat list of loop points:
//!
//! ```text
//! loop_id  x  y  sweep_angle
//! ```
//!
//! The sweep angle describes the segment that *ends* at the point:
//!
//! - `0`: straight edge, the point is a polygon vertex
//! - `±360`: full circle centred on the previous point, passing through this one
//! - anything else: circular arc from the previous point, sweeping that many
//!   degrees (positive = counter-clockwise)
//!
//! Loop id `0` is the outer boundary; every other id is a cutout in the same
//! section. Cutouts are traced in the opposite sense, so their primitive order
//! is reversed after reconstruction.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Distance under which a straight vertex is considered to coincide with an
/// arc end point or a circle centre.
pub const POINT_TOLERANCE: f64 = 0.001;

/// A 2D point in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn near(self, other: Self) -> bool {
        self.distance(other) <= POINT_TOLERANCE
    }
}

/// A circular arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    /// Centre point.
    pub center: Point,
    /// Radius in mm.
    pub radius: f64,
    /// Start angle in degrees, in `[0, 360)`, measured counter-clockwise from +X.
    pub start_angle: f64,
    /// Signed sweep in degrees (positive = counter-clockwise).
    pub sweep: f64,
}

impl Arc {
    /// Builds the arc that runs from `from` to `to` sweeping `sweep` degrees.
    ///
    /// The centre lies on the chord's perpendicular bisector. Which side it
    /// lies on depends on whether the arc is the minor or major one and on the
    /// direction of travel.
    ///
    /// Returns `None` for a zero-length chord or a sweep whose half-angle has
    /// no usable sine (multiples of 360).
    #[must_use]
    pub fn from_chord(from: Point, to: Point, sweep: f64) -> Option<Self> {
        let chord = from.distance(to);
        if chord <= f64::EPSILON {
            return None;
        }

        let half_sweep = (sweep / 2.0).to_radians();
        let sin_half = half_sweep.sin();
        if sin_half.abs() < 1e-10 {
            return None;
        }

        let half_chord = chord / 2.0;
        let radius = (half_chord / sin_half).abs();

        let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
        let dir_x = (to.x - from.x) / chord;
        let dir_y = (to.y - from.y) / chord;

        let major = if sweep.abs() > 180.0 { -1.0 } else { 1.0 };
        let clockwise = if sweep < 0.0 { -1.0 } else { 1.0 };
        let offset = radius.mul_add(radius, -(half_chord * half_chord)).max(0.0).sqrt()
            * major
            * clockwise;

        let center = Point::new(dir_y.mul_add(-offset, mid.x), dir_x.mul_add(offset, mid.y));
        let start_angle =
            normalize_degrees((from.y - center.y).atan2(from.x - center.x).to_degrees());

        Some(Self {
            center,
            radius,
            start_angle,
            sweep,
        })
    }

    /// End angle in degrees, in `[0, 360)`.
    #[must_use]
    pub fn end_angle(&self) -> f64 {
        normalize_degrees(self.start_angle + self.sweep)
    }

    /// The point on the arc's circle at `angle` degrees.
    #[must_use]
    pub fn point_at(&self, angle: f64) -> Point {
        let (sin, cos) = angle.to_radians().sin_cos();
        Point::new(
            self.radius.mul_add(cos, self.center.x),
            self.radius.mul_add(sin, self.center.y),
        )
    }

    /// First point of the arc.
    #[must_use]
    pub fn start_point(&self) -> Point {
        self.point_at(self.start_angle)
    }

    /// Last point of the arc.
    #[must_use]
    pub fn end_point(&self) -> Point {
        self.point_at(self.start_angle + self.sweep)
    }

    /// The same arc traversed backwards: end → mid → start.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            center: self.center,
            radius: self.radius,
            start_angle: self.end_angle(),
            sweep: -self.sweep,
        }
    }
}

/// A full circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Centre point.
    pub center: Point,
    /// Radius in mm.
    pub radius: f64,
}

impl Circle {
    /// Creates a new circle.
    #[must_use]
    pub const fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// One element of a reconstructed loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    /// Straight-edge vertex.
    Point(Point),
    /// Arc segment, carrying its own end points.
    Arc(Arc),
    /// Full circle.
    Circle(Circle),
}

/// A closed shape: an outline or a cutout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Polygon of straight vertices and arcs, in traversal order.
    Polygon {
        /// Ordered polygon elements.
        elements: Vec<Primitive>,
    },
    /// A circle on its own.
    Circle(Circle),
}

impl Shape {
    /// Returns the circle if this shape is one.
    #[must_use]
    pub const fn as_circle(&self) -> Option<&Circle> {
        match self {
            Self::Circle(c) => Some(c),
            Self::Polygon { .. } => None,
        }
    }

    /// Returns the polygon elements if this shape is a polygon.
    #[must_use]
    pub fn elements(&self) -> Option<&[Primitive]> {
        match self {
            Self::Polygon { elements } => Some(elements),
            Self::Circle(_) => None,
        }
    }

    /// Straight vertices of a polygon, in order. Empty for a circle.
    #[must_use]
    pub fn vertices(&self) -> Vec<Point> {
        self.elements()
            .unwrap_or_default()
            .iter()
            .filter_map(|p| match p {
                Primitive::Point(pt) => Some(*pt),
                _ => None,
            })
            .collect()
    }

    /// Arc segments of a polygon, in order. Empty for a circle.
    #[must_use]
    pub fn arcs(&self) -> Vec<Arc> {
        self.elements()
            .unwrap_or_default()
            .iter()
            .filter_map(|p| match p {
                Primitive::Arc(arc) => Some(*arc),
                _ => None,
            })
            .collect()
    }
}

/// A decoded loop-point record, used only while reconstructing geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopPoint {
    /// Position of the record within its section.
    pub sequence: usize,
    /// Loop id: `0` for the outer boundary, anything else for a cutout.
    pub loop_id: i64,
    /// Point, already scaled to millimetres.
    pub point: Point,
    /// Sweep angle in degrees.
    pub angle: f64,
}

/// Normalises an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Reconstructs every loop of a section.
///
/// Loops are grouped by loop id in order of first appearance; each group is
/// traversed in sequence order. Loops that do not form a closed shape are
/// skipped.
#[must_use]
pub fn reconstruct_shapes(points: &[LoopPoint]) -> Vec<Shape> {
    let mut loops: IndexMap<i64, Vec<LoopPoint>> = IndexMap::new();
    for point in points {
        loops.entry(point.loop_id).or_default().push(*point);
    }

    loops
        .into_iter()
        .filter_map(|(loop_id, mut group)| {
            group.sort_by_key(|p| p.sequence);
            reconstruct_loop(loop_id, &group)
        })
        .collect()
}

/// Reconstructs a single loop whose points are already in sequence order.
#[must_use]
pub fn reconstruct_loop(loop_id: i64, points: &[LoopPoint]) -> Option<Shape> {
    let mut primitives = sanitize(trace(points));

    if loop_id != 0 {
        primitives = reverse_winding(primitives);
        primitives = collapse_circles(primitives);
    }

    let shape = build_shape(primitives);
    if shape.is_none() {
        tracing::warn!(
            loop_id,
            records = points.len(),
            "Loop does not form a closed shape, skipping"
        );
    }
    shape
}

/// Walks the records, turning each into a primitive relative to the
/// current point.
#[allow(clippy::float_cmp)] // 0 and ±360 are exact sentinels in the file format
pub(crate) fn trace(points: &[LoopPoint]) -> Vec<Primitive> {
    let Some(first) = points.first() else {
        return Vec::new();
    };

    let mut current = first.point;
    let mut primitives = Vec::with_capacity(points.len());

    for record in points {
        let next = record.point;

        if record.angle == 0.0 {
            primitives.push(Primitive::Point(next));
        } else if record.angle.abs() == 360.0 {
            let radius = current.distance(next);
            if radius <= f64::EPSILON {
                tracing::debug!(sequence = record.sequence, "Skipping zero-radius circle");
                continue;
            }
            primitives.push(Primitive::Circle(Circle::new(current, radius)));
        } else if let Some(arc) = Arc::from_chord(current, next, record.angle) {
            primitives.push(Primitive::Arc(arc));
        } else {
            tracing::debug!(
                sequence = record.sequence,
                angle = record.angle,
                "Skipping degenerate arc"
            );
            continue;
        }

        current = next;
    }

    primitives
}

/// Drops straight vertices that duplicate an arc end point or name a circle
/// centre, then removes exact duplicates.
pub(crate) fn sanitize(primitives: Vec<Primitive>) -> Vec<Primitive> {
    let mut anchors = AnchorGrid::default();
    for primitive in &primitives {
        match primitive {
            Primitive::Arc(arc) => {
                anchors.insert(arc.start_point());
                anchors.insert(arc.end_point());
            }
            Primitive::Circle(circle) => anchors.insert(circle.center),
            Primitive::Point(_) => {}
        }
    }

    let mut seen = HashSet::with_capacity(primitives.len());
    primitives
        .into_iter()
        .filter(|primitive| match primitive {
            Primitive::Point(pt) => !anchors.is_near(*pt),
            _ => true,
        })
        .filter(|primitive| seen.insert(PrimitiveKey::of(primitive)))
        .collect()
}

/// Arc end points and circle centres, bucketed into square cells one
/// tolerance wide so a lookup only visits the 3×3 cells around a vertex.
#[derive(Debug, Default)]
struct AnchorGrid {
    cells: HashMap<(i64, i64), Vec<Point>>,
}

impl AnchorGrid {
    #[allow(clippy::cast_possible_truncation)] // saturating cast
    fn cell(point: Point) -> (i64, i64) {
        (
            (point.x / POINT_TOLERANCE).floor() as i64,
            (point.y / POINT_TOLERANCE).floor() as i64,
        )
    }

    fn insert(&mut self, point: Point) {
        self.cells.entry(Self::cell(point)).or_default().push(point);
    }

    fn is_near(&self, point: Point) -> bool {
        let (cx, cy) = Self::cell(point);
        (cx.saturating_sub(1)..=cx.saturating_add(1)).any(|x| {
            (cy.saturating_sub(1)..=cy.saturating_add(1)).any(|y| {
                self.cells
                    .get(&(x, y))
                    .is_some_and(|cell| cell.iter().any(|a| a.near(point)))
            })
        })
    }
}

/// Bit-exact identity of a primitive, for duplicate removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PrimitiveKey {
    Point([u64; 2]),
    Arc([u64; 5]),
    Circle([u64; 3]),
}

impl PrimitiveKey {
    fn of(primitive: &Primitive) -> Self {
        // +0.0 folds -0.0 into 0.0 so the key agrees with `==`
        let bits = |v: f64| (v + 0.0).to_bits();
        match primitive {
            Primitive::Point(p) => Self::Point([bits(p.x), bits(p.y)]),
            Primitive::Arc(a) => Self::Arc([
                bits(a.center.x),
                bits(a.center.y),
                bits(a.radius),
                bits(a.start_angle),
                bits(a.sweep),
            ]),
            Primitive::Circle(c) => {
                Self::Circle([bits(c.center.x), bits(c.center.y), bits(c.radius)])
            }
        }
    }
}

/// Reverses a cutout's traversal: primitive order and arc direction.
pub(crate) fn reverse_winding(primitives: Vec<Primitive>) -> Vec<Primitive> {
    primitives
        .into_iter()
        .rev()
        .map(|primitive| match primitive {
            Primitive::Arc(arc) => Primitive::Arc(arc.reversed()),
            other => other,
        })
        .collect()
}

/// A cutout containing a circle is that circle alone.
///
/// This drops any other geometry recorded in the same loop.
pub(crate) fn collapse_circles(primitives: Vec<Primitive>) -> Vec<Primitive> {
    let circle = primitives
        .iter()
        .find(|p| matches!(p, Primitive::Circle(_)))
        .copied();

    match circle {
        Some(circle) => {
            if primitives.len() > 1 {
                tracing::debug!(
                    dropped = primitives.len() - 1,
                    "Cutout collapsed to its circle"
                );
            }
            vec![circle]
        }
        None => primitives,
    }
}

fn build_shape(primitives: Vec<Primitive>) -> Option<Shape> {
    if let [Primitive::Circle(circle)] = primitives.as_slice() {
        return Some(Shape::Circle(*circle));
    }

    let curved = primitives
        .iter()
        .any(|p| !matches!(p, Primitive::Point(_)));
    if primitives.is_empty() || (!curved && primitives.len() < 3) {
        return None;
    }

    Some(Shape::Polygon {
        elements: primitives,
    })
}
