//! Affine transform engine.
//!
//! Builds 3×3 homogeneous matrices from vector pairs and applies them to path
//! control points and circular markers.
//!
//! ## Alignment
//!
//! [`Transform::compose_trs`] fits a reference path (a stroke trace) onto a
//! target start position and target vector. The path start is moved to the
//! origin, scaled and rotated so that its start→end vector matches the target,
//! then moved to the target start:
//!
//! ```text
//! final = T_out · R · S · T_in
//! ```
//!
//! Matrices are applied right to left to a column point `[x, y, 1]ᵀ`.
//!
//! ## Bound zones
//!
//! Points inside a [`BoundZone`] are not scaled with the rest of the path.
//! [`transform_point`] keeps such a point at its original distance from the
//! zone center, in the direction the transform sends it. Label anchors near the
//! trace ends stay attached to their markers whatever the overall scale factor.

use std::{fmt, ops::Mul};

use thiserror::Error;

use crate::{
    geometry::{Circle, Point},
    path::{Path, Segment},
};

/// Errors raised while building transforms.
#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    /// A scale was requested from a vector of zero length.
    #[error("cannot scale from a zero-length vector")]
    DegenerateVector,

    /// The reference path has no segment to align.
    #[error("reference path is empty")]
    EmptyPath,

    /// A `transform` attribute could not be read.
    #[error("invalid transform `{0}`")]
    Syntax(String),
}

/// A 2D affine transform stored as a 3×3 homogeneous matrix.
///
/// Transforms are immutable values. Composition is plain matrix
/// multiplication: `a * b` applies `b` first, then `a`.
///
/// # Examples
///
/// ```
/// # use mgrep_core::{geometry::Point, transform::Transform};
/// let move_right = Transform::translation(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
/// let double = Transform::uniform_scale(2.0);
///
/// // Scale first, then translate
/// let combined = move_right * double;
/// assert_eq!(combined.apply(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    m: [[f32; 3]; 3],
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Builds the transform of the SVG `matrix(a, b, c, d, e, f)` form.
    pub fn from_svg_matrix(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self {
            m: [[a, c, e], [b, d, f], [0.0, 0.0, 1.0]],
        }
    }

    /// Translation moving `from` onto `to`.
    pub fn translation(from: Point, to: Point) -> Self {
        Self::translation_by(from.vector_to(to))
    }

    /// Translation by `offset`.
    pub fn translation_by(offset: Point) -> Self {
        Self::from_svg_matrix(1.0, 0.0, 0.0, 1.0, offset.x(), offset.y())
    }

    /// Rotation turning the direction of `from_vec` onto the direction of
    /// `to_vec`, by the signed angle `atan2(to) - atan2(from)`.
    pub fn rotation(from_vec: Point, to_vec: Point) -> Self {
        Self::rotation_by(to_vec.angle() - from_vec.angle())
    }

    /// Rotation around the origin by `theta` radians.
    pub fn rotation_by(theta: f32) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self::from_svg_matrix(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Uniform scale around the origin.
    pub fn uniform_scale(factor: f32) -> Self {
        Self::from_svg_matrix(factor, 0.0, 0.0, factor, 0.0, 0.0)
    }

    /// Uniform scale taking the length of `from_vec` to the length of `to_vec`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::DegenerateVector`] when `from_vec` has zero
    /// length, instead of producing an infinite factor.
    pub fn scale(from_vec: Point, to_vec: Point) -> Result<Self, TransformError> {
        let from_length = from_vec.hypot();
        if from_length == 0.0 || !from_length.is_finite() {
            return Err(TransformError::DegenerateVector);
        }
        Ok(Self::uniform_scale(to_vec.hypot() / from_length))
    }

    /// Same as [`Transform::scale`], falling back to the identity when
    /// `from_vec` has zero length.
    pub fn scale_or_identity(from_vec: Point, to_vec: Point) -> Self {
        Self::scale(from_vec, to_vec).unwrap_or(Self::IDENTITY)
    }

    /// Computes the single transform aligning `reference` onto a target.
    ///
    /// The start of `reference` lands on `target_start` and its start→end
    /// vector becomes `target_vector`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::EmptyPath`] for a path without segments and
    /// [`TransformError::DegenerateVector`] when the path starts and ends at
    /// the same point.
    pub fn compose_trs(
        reference: &Path,
        target_vector: Point,
        target_start: Point,
    ) -> Result<Self, TransformError> {
        let (Some(start), Some(end)) = (reference.start_point(), reference.end_point()) else {
            return Err(TransformError::EmptyPath);
        };

        let to_origin = Self::translation(start, Point::ORIGIN);
        let initial_vector = start.vector_to(end);
        let scale = Self::scale(initial_vector, target_vector)?;
        let rotation = Self::rotation(initial_vector, target_vector);

        // The start sits on the origin after T_in, and R·S keep it there.
        let to_target = Self::translation(Point::ORIGIN, target_start);

        Ok(to_target * rotation * scale * to_origin)
    }

    /// Returns the transform applying `self` first, then `next`.
    pub fn then(self, next: Self) -> Self {
        next * self
    }

    /// Maps a point through the transform.
    pub fn apply(&self, point: Point) -> Point {
        let m = &self.m;
        Point::new(
            m[0][0] * point.x() + m[0][1] * point.y() + m[0][2],
            m[1][0] * point.x() + m[1][1] * point.y() + m[1][2],
        )
    }

    /// Uniform scale factor of the linear part, `sqrt(|det|)`.
    pub fn scale_factor(&self) -> f32 {
        let m = &self.m;
        (m[0][0] * m[1][1] - m[0][1] * m[1][0]).abs().sqrt()
    }

    /// Rotation angle of the linear part, in degrees.
    pub fn rotation_degrees(&self) -> f32 {
        self.m[1][0].atan2(self.m[0][0]).to_degrees()
    }

    /// Translation part of the matrix.
    pub fn translation_component(&self) -> Point {
        Point::new(self.m[0][2], self.m[1][2])
    }

    /// Returns a copy with the translation part replaced, keeping the linear
    /// part (scale, rotation, skew) as is.
    pub fn with_translation(mut self, translation: Point) -> Self {
        self.m[0][2] = translation.x();
        self.m[1][2] = translation.y();
        self
    }

    /// Parses the value of an SVG `transform` attribute.
    ///
    /// Supports `matrix`, `translate`, `scale`, `rotate` (with optional
    /// center), `skewX` and `skewY`, composed left to right as SVG does.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Syntax`] for an unknown function or a wrong
    /// argument count.
    pub fn parse_svg(value: &str) -> Result<Self, TransformError> {
        let mut result = Self::IDENTITY;
        let mut rest = value.trim();

        while !rest.is_empty() {
            let syntax_error = || TransformError::Syntax(value.to_string());
            let open = rest.find('(').ok_or_else(syntax_error)?;
            let close = rest.find(')').ok_or_else(syntax_error)?;
            if close < open {
                return Err(syntax_error());
            }

            let name = rest[..open].trim().trim_start_matches(',').trim();
            let args = rest[open + 1..close]
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|token| !token.is_empty())
                .map(str::parse::<f32>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| syntax_error())?;

            let step = match (name, args.as_slice()) {
                ("matrix", &[a, b, c, d, e, f]) => Self::from_svg_matrix(a, b, c, d, e, f),
                ("translate", &[tx]) => Self::translation_by(Point::new(tx, 0.0)),
                ("translate", &[tx, ty]) => Self::translation_by(Point::new(tx, ty)),
                ("scale", &[s]) => Self::uniform_scale(s),
                ("scale", &[sx, sy]) => Self::from_svg_matrix(sx, 0.0, 0.0, sy, 0.0, 0.0),
                ("rotate", &[angle]) => Self::rotation_by(angle.to_radians()),
                ("rotate", &[angle, cx, cy]) => {
                    let center = Point::new(cx, cy);
                    Self::translation_by(center)
                        * Self::rotation_by(angle.to_radians())
                        * Self::translation_by(center.scale(-1.0))
                }
                ("skewX", &[angle]) => {
                    Self::from_svg_matrix(1.0, 0.0, angle.to_radians().tan(), 1.0, 0.0, 0.0)
                }
                ("skewY", &[angle]) => {
                    Self::from_svg_matrix(1.0, angle.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
                }
                _ => return Err(syntax_error()),
            };

            result = result * step;
            rest = rest[close + 1..].trim_start();
        }

        Ok(result)
    }

    /// Formats the transform as an SVG `matrix(a,b,c,d,e,f)` value.
    pub fn to_svg_matrix(&self) -> String {
        let m = &self.m;
        format!(
            "matrix({},{},{},{},{},{})",
            m[0][0], m[1][0], m[0][1], m[1][1], m[0][2], m[1][2]
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut m = [[0.0f32; 3]; 3];
        for (row, out_row) in m.iter_mut().enumerate() {
            for (col, out) in out_row.iter_mut().enumerate() {
                *out = (0..3).map(|k| self.m[row][k] * rhs.m[k][col]).sum();
            }
        }
        Self { m }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_svg_matrix())
    }
}

/// A circular region whose points keep their distance to the center when
/// transformed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundZone {
    center: Point,
    radius: f32,
}

impl BoundZone {
    /// Creates a bound zone.
    pub fn new(center: Point, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Returns the zone center.
    pub fn center(&self) -> Point {
        self.center
    }

    /// Returns the zone radius.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Returns `true` if `point` is within `radius` of the center.
    pub fn contains(&self, point: Point) -> bool {
        self.center.distance(point) <= self.radius
    }
}

impl From<Circle> for BoundZone {
    fn from(circle: Circle) -> Self {
        Self::new(circle.center(), circle.radius())
    }
}

/// Maps `point` through `transform`, honoring bound zones.
///
/// Outside every zone this is `transform.apply(point)`. Inside a zone the point
/// is re-projected around the transformed zone center, at its original
/// distance from the center. Overlapping zones resolve to the first one in
/// `bound_zones` that contains the point.
pub fn transform_point(point: Point, bound_zones: &[BoundZone], transform: &Transform) -> Point {
    let moved = transform.apply(point);
    let Some(zone) = bound_zones.iter().find(|zone| zone.contains(point)) else {
        return moved;
    };

    let fixed_distance = point.distance(zone.center());
    let moved_center = transform.apply(zone.center());
    let offset = moved_center.vector_to(moved);
    let distance = offset.hypot();
    if distance == 0.0 {
        return moved;
    }

    moved_center.add_point(offset.scale(fixed_distance / distance))
}

/// Maps every anchor and control point of `path` through [`transform_point`].
///
/// Returns a new path; the input is never modified. Arc radii follow the
/// scale factor of the transform and the arc rotation follows its rotation.
pub fn apply_to_path(path: &Path, bound_zones: &[BoundZone], transform: &Transform) -> Path {
    let map = |point: Point| transform_point(point, bound_zones, transform);
    path.map_segments(|segment| match segment.map_points(map) {
        Segment::Arc {
            from,
            radii,
            rotation,
            large_arc,
            sweep,
            to,
        } => Segment::Arc {
            from,
            radii: radii.scale(transform.scale_factor()),
            rotation: rotation + transform.rotation_degrees(),
            large_arc,
            sweep,
            to,
        },
        other => other,
    })
}

/// Maps the center of `circle` through [`transform_point`]. The radius is kept.
pub fn apply_to_circle(circle: Circle, bound_zones: &[BoundZone], transform: &Transform) -> Circle {
    circle.with_center(transform_point(circle.center(), bound_zones, transform))
}
