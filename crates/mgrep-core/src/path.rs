//! SVG path data as absolute segments.
//!
//! Path data read from a drawing may mix relative commands, horizontal and
//! vertical shorthands and smooth curves. [`Path::parse`] normalizes all of
//! them into absolute [`Segment`]s where every segment knows its start point,
//! so every anchor and control point can be mapped through a transform one by
//! one and written back with [`Path::to_data_string`].
//!
//! Parsing the raw `d` attribute is delegated to [`svg::node::element::path::Data`].

use std::fmt;

use svg::node::{
    Value,
    element::path::{Command, Data, Position},
};
use thiserror::Error;

use crate::geometry::Point;

/// Errors raised while reading path data.
#[derive(Debug, Error, PartialEq)]
pub enum PathError {
    #[error("invalid path data: {0}")]
    Syntax(String),

    #[error("path command `{command}` takes parameters in groups of {group}, got {count}")]
    ParameterCount {
        command: char,
        group: usize,
        count: usize,
    },
}

/// One absolute path segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Move {
        to: Point,
    },
    Line {
        from: Point,
        to: Point,
    },
    Cubic {
        from: Point,
        control1: Point,
        control2: Point,
        to: Point,
    },
    Quadratic {
        from: Point,
        control: Point,
        to: Point,
    },
    Arc {
        from: Point,
        radii: Point,
        rotation: f32,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    Close {
        from: Point,
        to: Point,
    },
}

impl Segment {
    /// Start point of the segment. A move starts where it lands.
    pub fn start(&self) -> Point {
        match *self {
            Self::Move { to } => to,
            Self::Line { from, .. }
            | Self::Cubic { from, .. }
            | Self::Quadratic { from, .. }
            | Self::Arc { from, .. }
            | Self::Close { from, .. } => from,
        }
    }

    /// End point of the segment.
    pub fn end(&self) -> Point {
        match *self {
            Self::Move { to }
            | Self::Line { to, .. }
            | Self::Cubic { to, .. }
            | Self::Quadratic { to, .. }
            | Self::Arc { to, .. }
            | Self::Close { to, .. } => to,
        }
    }

    /// Returns a copy of the segment with every anchor and control point
    /// passed through `map`.
    ///
    /// Arc radii and rotation are left untouched; they are not points.
    pub fn map_points(&self, mut map: impl FnMut(Point) -> Point) -> Self {
        match *self {
            Self::Move { to } => Self::Move { to: map(to) },
            Self::Line { from, to } => Self::Line {
                from: map(from),
                to: map(to),
            },
            Self::Cubic {
                from,
                control1,
                control2,
                to,
            } => Self::Cubic {
                from: map(from),
                control1: map(control1),
                control2: map(control2),
                to: map(to),
            },
            Self::Quadratic { from, control, to } => Self::Quadratic {
                from: map(from),
                control: map(control),
                to: map(to),
            },
            Self::Arc {
                from,
                radii,
                rotation,
                large_arc,
                sweep,
                to,
            } => Self::Arc {
                from: map(from),
                radii,
                rotation,
                large_arc,
                sweep,
                to: map(to),
            },
            Self::Close { from, to } => Self::Close {
                from: map(from),
                to: map(to),
            },
        }
    }
}

/// A parsed path: an ordered list of absolute segments.
///
/// # Examples
///
/// ```
/// # use mgrep_core::{geometry::Point, path::Path};
/// let path = Path::parse("m 10,10 h 20 v 20 z").unwrap();
///
/// assert_eq!(path.segments().len(), 4);
/// assert_eq!(path.start_point(), Some(Point::new(10.0, 10.0)));
/// assert_eq!(path.end_point(), Some(Point::new(10.0, 10.0)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Creates a path from already absolute segments.
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Parses the content of an SVG `d` attribute.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::Syntax`] when the data cannot be tokenized and
    /// [`PathError::ParameterCount`] when a command has a dangling parameter.
    pub fn parse(d: &str) -> Result<Self, PathError> {
        let data = Data::parse(d).map_err(|err| PathError::Syntax(err.to_string()))?;
        let mut builder = SegmentBuilder::default();

        for command in data.iter() {
            match command {
                Command::Move(position, params) => builder.move_to(position, params)?,
                Command::Line(position, params) => {
                    for pair in chunks(params, 2, 'L')? {
                        let to = builder.resolve(position, pair[0], pair[1]);
                        builder.line_to(to);
                    }
                }
                Command::HorizontalLine(position, params) => {
                    for value in params.iter() {
                        let x = match position {
                            Position::Absolute => *value,
                            Position::Relative => builder.current.x() + value,
                        };
                        builder.line_to(builder.current.with_x(x));
                    }
                }
                Command::VerticalLine(position, params) => {
                    for value in params.iter() {
                        let y = match position {
                            Position::Absolute => *value,
                            Position::Relative => builder.current.y() + value,
                        };
                        builder.line_to(builder.current.with_y(y));
                    }
                }
                Command::CubicCurve(position, params) => {
                    for group in chunks(params, 6, 'C')? {
                        let control1 = builder.resolve(position, group[0], group[1]);
                        let control2 = builder.resolve(position, group[2], group[3]);
                        let to = builder.resolve(position, group[4], group[5]);
                        builder.cubic_to(control1, control2, to);
                    }
                }
                Command::SmoothCubicCurve(position, params) => {
                    for group in chunks(params, 4, 'S')? {
                        let control1 = builder.reflected_cubic_control();
                        let control2 = builder.resolve(position, group[0], group[1]);
                        let to = builder.resolve(position, group[2], group[3]);
                        builder.cubic_to(control1, control2, to);
                    }
                }
                Command::QuadraticCurve(position, params) => {
                    for group in chunks(params, 4, 'Q')? {
                        let control = builder.resolve(position, group[0], group[1]);
                        let to = builder.resolve(position, group[2], group[3]);
                        builder.quadratic_to(control, to);
                    }
                }
                Command::SmoothQuadraticCurve(position, params) => {
                    for pair in chunks(params, 2, 'T')? {
                        let control = builder.reflected_quadratic_control();
                        let to = builder.resolve(position, pair[0], pair[1]);
                        builder.quadratic_to(control, to);
                    }
                }
                Command::EllipticalArc(position, params) => {
                    for group in chunks(params, 7, 'A')? {
                        let to = builder.resolve(position, group[5], group[6]);
                        builder.push(Segment::Arc {
                            from: builder.current,
                            radii: Point::new(group[0], group[1]),
                            rotation: group[2],
                            large_arc: group[3] != 0.0,
                            sweep: group[4] != 0.0,
                            to,
                        });
                    }
                }
                Command::Close => builder.close(),
            }
        }

        Ok(Self {
            segments: builder.segments,
        })
    }

    /// Returns the segments of the path.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns `true` if the path has no segment.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Start point of the first segment.
    pub fn start_point(&self) -> Option<Point> {
        self.segments.first().map(Segment::start)
    }

    /// End point of the last segment.
    pub fn end_point(&self) -> Option<Point> {
        self.segments.last().map(Segment::end)
    }

    /// Iterates over the end point of every segment, in order.
    pub fn end_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.segments.iter().map(Segment::end)
    }

    /// Returns a new path with every segment passed through `map`.
    pub fn map_segments(&self, map: impl FnMut(&Segment) -> Segment) -> Self {
        Self {
            segments: self.segments.iter().map(map).collect(),
        }
    }

    /// Approximates the path as a polygon over its segment end points and
    /// returns the polygon centroid.
    ///
    /// A path with a single end point returns that point. A polygon with no
    /// area (all points on a line) falls back to the mean of its vertices.
    /// Returns `None` for an empty path.
    pub fn centroid(&self) -> Option<Point> {
        let points: Vec<Point> = self.end_points().collect();
        match points.len() {
            0 => None,
            1 => Some(points[0]),
            _ => Some(polygon_centroid(&points)),
        }
    }

    /// Serializes the path as absolute SVG path data.
    pub fn to_data(&self) -> Data {
        self.segments
            .iter()
            .fold(Data::new(), |data, segment| match *segment {
                Segment::Move { to } => data.move_to(vec![to.x(), to.y()]),
                Segment::Line { to, .. } => data.line_to(vec![to.x(), to.y()]),
                Segment::Cubic {
                    control1,
                    control2,
                    to,
                    ..
                } => data.cubic_curve_to(vec![
                    control1.x(),
                    control1.y(),
                    control2.x(),
                    control2.y(),
                    to.x(),
                    to.y(),
                ]),
                Segment::Quadratic { control, to, .. } => {
                    data.quadratic_curve_to(vec![control.x(), control.y(), to.x(), to.y()])
                }
                Segment::Arc {
                    radii,
                    rotation,
                    large_arc,
                    sweep,
                    to,
                    ..
                } => data.elliptical_arc_to(vec![
                    radii.x(),
                    radii.y(),
                    rotation,
                    f32::from(u8::from(large_arc)),
                    f32::from(u8::from(sweep)),
                    to.x(),
                    to.y(),
                ]),
                Segment::Close { .. } => data.close(),
            })
    }

    /// Serializes the path as the content of a `d` attribute.
    pub fn to_data_string(&self) -> String {
        Value::from(self.to_data()).to_string()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_data_string())
    }
}

/// Free-function form of [`Path::centroid`].
pub fn path_centroid(path: &Path) -> Option<Point> {
    path.centroid()
}

/// Shoelace centroid of a closed polygon.
fn polygon_centroid(points: &[Point]) -> Point {
    let mut doubled_area = 0.0f64;
    let mut cx = 0.0f64;
    let mut cy = 0.0f64;

    for (index, current) in points.iter().enumerate() {
        let next = points[(index + 1) % points.len()];
        let (x0, y0) = (f64::from(current.x()), f64::from(current.y()));
        let (x1, y1) = (f64::from(next.x()), f64::from(next.y()));
        let cross = x0 * y1 - x1 * y0;
        doubled_area += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }

    if doubled_area.abs() < 1e-9 {
        let count = points.len() as f32;
        let sum = points
            .iter()
            .fold(Point::ORIGIN, |acc, point| acc.add_point(*point));
        return sum.scale(1.0 / count);
    }

    let factor = 1.0 / (3.0 * doubled_area);
    Point::new((cx * factor) as f32, (cy * factor) as f32)
}

/// Splits `params` into groups of `group` values.
fn chunks(params: &[f32], group: usize, command: char) -> Result<std::slice::Chunks<'_, f32>, PathError> {
    if params.is_empty() || params.len() % group != 0 {
        return Err(PathError::ParameterCount {
            command,
            group,
            count: params.len(),
        });
    }
    Ok(params.chunks(group))
}

/// Tracks the pen state while converting commands to absolute segments.
#[derive(Debug, Default)]
struct SegmentBuilder {
    segments: Vec<Segment>,
    current: Point,
    subpath_start: Point,
}

impl SegmentBuilder {
    fn resolve(&self, position: &Position, x: f32, y: f32) -> Point {
        match position {
            Position::Absolute => Point::new(x, y),
            Position::Relative => self.current.add_point(Point::new(x, y)),
        }
    }

    fn push(&mut self, segment: Segment) {
        self.current = segment.end();
        self.segments.push(segment);
    }

    fn move_to(&mut self, position: &Position, params: &[f32]) -> Result<(), PathError> {
        let mut pairs = chunks(params, 2, 'M')?;
        if let Some(pair) = pairs.next() {
            let to = self.resolve(position, pair[0], pair[1]);
            self.subpath_start = to;
            self.push(Segment::Move { to });
        }
        // Extra pairs after a moveto are implicit linetos.
        for pair in pairs {
            let to = self.resolve(position, pair[0], pair[1]);
            self.line_to(to);
        }
        Ok(())
    }

    fn line_to(&mut self, to: Point) {
        self.push(Segment::Line {
            from: self.current,
            to,
        });
    }

    fn cubic_to(&mut self, control1: Point, control2: Point, to: Point) {
        self.push(Segment::Cubic {
            from: self.current,
            control1,
            control2,
            to,
        });
    }

    fn quadratic_to(&mut self, control: Point, to: Point) {
        self.push(Segment::Quadratic {
            from: self.current,
            control,
            to,
        });
    }

    fn close(&mut self) {
        let to = self.subpath_start;
        self.push(Segment::Close {
            from: self.current,
            to,
        });
    }

    fn reflected_cubic_control(&self) -> Point {
        match self.segments.last() {
            Some(Segment::Cubic { control2, .. }) => reflect(*control2, self.current),
            _ => self.current,
        }
    }

    fn reflected_quadratic_control(&self) -> Point {
        match self.segments.last() {
            Some(Segment::Quadratic { control, .. }) => reflect(*control, self.current),
            _ => self.current,
        }
    }
}

/// Reflects `control` about `center`.
fn reflect(control: Point, center: Point) -> Point {
    center.add_point(control.vector_to(center))
}
