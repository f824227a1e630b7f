//! Geometric primitives for chart markers and path control points.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate, also used as a displacement vector
//! - [`Circle`] - A circular marker (center and radius) as found in the drawings
//!
//! # Coordinate System
//!
//! Coordinates follow the SVG user space of the source drawing:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Angles are measured with `atan2(y, x)`, so with Y pointing down a positive
//! angle turns clockwise on screen.

/// A 2D point in drawing coordinate space.
///
/// Points double as vectors: the difference of two points is the
/// displacement between them, and [`Point::hypot`] is its length.
///
/// # Examples
///
/// ```
/// # use mgrep_core::geometry::Point;
/// let start = Point::new(10.0, 20.0);
/// let end = Point::new(13.0, 24.0);
///
/// let vector = start.vector_to(end);
/// assert_eq!(vector, Point::new(3.0, 4.0));
/// assert_eq!(vector.hypot(), 5.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// The origin `(0, 0)`.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Checks if both coordinates are finite (neither NaN nor infinite)
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Returns the vector going from this point to `other`.
    pub fn vector_to(self, other: Point) -> Self {
        other.sub_point(self)
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Calculates the hypotenuse (Euclidean distance from origin)
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance between two points.
    pub fn distance(self, other: Point) -> f32 {
        self.sub_point(other).hypot()
    }

    /// Angle of this vector in radians, as given by `atan2(y, x)`.
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Multiplies both coordinates by the given factor.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mgrep_core::geometry::Point;
    /// let point = Point::new(10.0, 20.0);
    ///
    /// let halved = point.scale(0.5);
    /// assert_eq!(halved.x(), 5.0);
    /// assert_eq!(halved.y(), 10.0);
    /// ```
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// A circular marker.
///
/// Circles mark anchors in the drawings: where a command icon goes, where a
/// label attaches, or the zone around a trace end that must not be scaled.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Circle {
    center: Point,
    radius: f32,
}

impl Circle {
    /// Creates a circle from its center and radius.
    pub fn new(center: Point, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Returns the center of the circle.
    pub fn center(self) -> Point {
        self.center
    }

    /// Returns the radius of the circle.
    pub fn radius(self) -> f32 {
        self.radius
    }

    /// Returns a copy of the circle moved to `center`.
    pub fn with_center(mut self, center: Point) -> Self {
        self.center = center;
        self
    }

    /// Returns `true` if `point` lies inside the circle or on its boundary.
    pub fn contains(self, point: Point) -> bool {
        self.center.distance(point) <= self.radius
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_point_accessors() {
        let p = Point::new(3.0, -4.0);
        assert_eq!(p.x(), 3.0);
        assert_eq!(p.y(), -4.0);
        assert_eq!(p.with_x(1.0), Point::new(1.0, -4.0));
        assert_eq!(p.with_y(1.0), Point::new(3.0, 1.0));
    }

    #[test]
    fn test_point_is_zero() {
        assert!(Point::ORIGIN.is_zero());
        assert!(Point::default().is_zero());
        assert!(!Point::new(0.0, 0.1).is_zero());
    }

    #[test]
    fn test_vector_to() {
        let a = Point::new(1.0, 1.0);
        let b = Point::new(4.0, 5.0);
        assert_eq!(a.vector_to(b), Point::new(3.0, 4.0));
        assert_eq!(b.vector_to(a), Point::new(-3.0, -4.0));
    }

    #[test]
    fn test_distance() {
        let a = Point::new(1.0, 1.0);
        let b = Point::new(4.0, 5.0);
        assert_approx_eq!(f32, a.distance(b), 5.0);
        assert_approx_eq!(f32, b.distance(a), 5.0);
    }

    #[test]
    fn test_angle() {
        assert_approx_eq!(f32, Point::new(1.0, 0.0).angle(), 0.0);
        assert_approx_eq!(
            f32,
            Point::new(0.0, 1.0).angle(),
            std::f32::consts::FRAC_PI_2
        );
        assert_approx_eq!(f32, Point::new(-1.0, 0.0).angle(), std::f32::consts::PI);
    }

    #[test]
    fn test_is_finite() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f32::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f32::INFINITY).is_finite());
    }

    #[test]
    fn test_circle_contains() {
        let circle = Circle::new(Point::new(10.0, 10.0), 2.0);
        assert!(circle.contains(Point::new(10.0, 10.0)));
        assert!(circle.contains(Point::new(12.0, 10.0)));
        assert!(!circle.contains(Point::new(12.1, 10.0)));
    }

    #[test]
    fn test_circle_with_center() {
        let circle = Circle::new(Point::new(10.0, 10.0), 2.0).with_center(Point::ORIGIN);
        assert_eq!(circle.center(), Point::ORIGIN);
        assert_eq!(circle.radius(), 2.0);
    }
}
