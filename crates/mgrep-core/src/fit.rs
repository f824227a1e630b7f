//! Fitting a drawn figure onto a trace.
//!
//! A [`Figure`] is a named set of paths and circles read from one drawing. The
//! functions here move a whole figure so that its reference stroke matches a
//! target vector, or so that one path is centered on a position.

use std::collections::BTreeMap;

use log::debug;

use crate::{
    geometry::{Circle, Point},
    path::Path,
    transform::{BoundZone, Transform, TransformError, apply_to_circle, apply_to_path},
};

/// Name of the path used as the reference stroke when no trace is given.
pub const DESIGN: &str = "design";
/// Name of the circle bounding the start of the trace.
pub const TRACE_START_BOUND: &str = "trace-start-bound";
/// Name of the circle bounding the end of the trace.
pub const TRACE_END_BOUND: &str = "trace-end-bound";

/// Named paths and circles of one drawing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Figure {
    paths: BTreeMap<String, Path>,
    circles: BTreeMap<String, Circle>,
}

impl Figure {
    /// Creates an empty figure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named path, replacing any path with the same name.
    pub fn with_path(mut self, name: impl Into<String>, path: Path) -> Self {
        self.paths.insert(name.into(), path);
        self
    }

    /// Adds a named circle, replacing any circle with the same name.
    pub fn with_circle(mut self, name: impl Into<String>, circle: Circle) -> Self {
        self.circles.insert(name.into(), circle);
        self
    }

    pub fn path(&self, name: &str) -> Option<&Path> {
        self.paths.get(name)
    }

    pub fn circle(&self, name: &str) -> Option<Circle> {
        self.circles.get(name).copied()
    }

    pub fn paths(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.paths.iter().map(|(name, path)| (name.as_str(), path))
    }

    pub fn circles(&self) -> impl Iterator<Item = (&str, Circle)> {
        self.circles
            .iter()
            .map(|(name, circle)| (name.as_str(), *circle))
    }

    /// Bound zones of the figure, start bound first.
    pub fn bound_zones(&self) -> Vec<BoundZone> {
        [TRACE_START_BOUND, TRACE_END_BOUND]
            .into_iter()
            .filter_map(|name| self.circle(name))
            .map(BoundZone::from)
            .collect()
    }

    /// Returns a new figure with every path and circle moved by `transform`.
    pub fn transformed(&self, bound_zones: &[BoundZone], transform: &Transform) -> Self {
        Self {
            paths: self
                .paths
                .iter()
                .map(|(name, path)| (name.clone(), apply_to_path(path, bound_zones, transform)))
                .collect(),
            circles: self
                .circles
                .iter()
                .map(|(name, circle)| {
                    (
                        name.clone(),
                        apply_to_circle(*circle, bound_zones, transform),
                    )
                })
                .collect(),
        }
    }
}

/// Moves `figure` so that its reference stroke runs along `reference_vector`
/// from `start_position`.
///
/// The reference stroke is `trace` when given, otherwise the figure's
/// [`DESIGN`] path. Points inside the figure's bound zones keep their distance
/// to the zone center.
///
/// # Errors
///
/// Returns [`TransformError::EmptyPath`] when there is no reference stroke and
/// [`TransformError::DegenerateVector`] when the stroke is closed on itself.
pub fn compute_transformation(
    figure: &Figure,
    reference_vector: Point,
    start_position: Point,
    trace: Option<&Path>,
) -> Result<Figure, TransformError> {
    let reference = trace
        .or_else(|| figure.path(DESIGN))
        .ok_or(TransformError::EmptyPath)?;

    let transform = Transform::compose_trs(reference, reference_vector, start_position)?;
    let bound_zones = figure.bound_zones();
    debug!(
        transform:% = transform,
        bound_zones = bound_zones.len();
        "Fitting figure onto trace"
    );

    Ok(figure.transformed(&bound_zones, &transform))
}

/// Moves `path` so that its centroid lands on `new_position`.
///
/// An empty path is returned unchanged.
pub fn compute_translation(path: &Path, new_position: Point) -> Path {
    match path.centroid() {
        Some(centroid) => apply_to_path(path, &[], &Transform::translation(centroid, new_position)),
        None => path.clone(),
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn assert_point_eq(actual: Point, expected: Point) {
        assert!(
            approx_eq!(f32, actual.x(), expected.x(), epsilon = 0.001)
                && approx_eq!(f32, actual.y(), expected.y(), epsilon = 0.001),
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn sample_figure() -> Figure {
        Figure::new()
            .with_path(DESIGN, Path::parse("M 0,0 L 10,0").unwrap())
            .with_path("arrow", Path::parse("M 10,0 L 11,1").unwrap())
            .with_circle(TRACE_END_BOUND, Circle::new(Point::new(10.0, 0.0), 2.0))
            .with_circle(TRACE_START_BOUND, Circle::new(Point::new(0.0, 0.0), 2.0))
    }

    #[test]
    fn test_bound_zones_start_first() {
        let zones = sample_figure().bound_zones();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].center(), Point::new(0.0, 0.0));
        assert_eq!(zones[1].center(), Point::new(10.0, 0.0));
    }

    #[test]
    fn test_compute_transformation_uses_design() {
        let moved =
            compute_transformation(&sample_figure(), Point::new(0.0, 40.0), Point::new(5.0, 5.0), None)
                .unwrap();

        let design = moved.path(DESIGN).unwrap();
        assert_point_eq(design.start_point().unwrap(), Point::new(5.0, 5.0));
        assert_point_eq(design.end_point().unwrap(), Point::new(5.0, 45.0));
    }

    #[test]
    fn test_compute_transformation_keeps_arrow_size_in_bound() {
        let moved =
            compute_transformation(&sample_figure(), Point::new(40.0, 0.0), Point::ORIGIN, None)
                .unwrap();

        // The arrow tip sits in the end bound zone: it follows the zone
        // center but keeps its original distance of sqrt(2).
        let arrow = moved.path("arrow").unwrap();
        let tip = arrow.end_point().unwrap();
        let end_center = moved.circle(TRACE_END_BOUND).unwrap().center();
        assert_point_eq(end_center, Point::new(40.0, 0.0));
        assert!(approx_eq!(
            f32,
            tip.distance(end_center),
            2.0f32.sqrt(),
            epsilon = 0.001
        ));
    }

    #[test]
    fn test_compute_transformation_with_explicit_trace() {
        let trace = Path::parse("M 0,0 L 0,10").unwrap();
        let figure = Figure::new().with_path("mark", Path::parse("M 0,10 L 0,10").unwrap());

        let moved =
            compute_transformation(&figure, Point::new(0.0, 20.0), Point::ORIGIN, Some(&trace))
                .unwrap();
        assert_point_eq(
            moved.path("mark").unwrap().start_point().unwrap(),
            Point::new(0.0, 20.0),
        );
    }

    #[test]
    fn test_compute_transformation_without_reference() {
        let figure = Figure::new().with_circle("dot", Circle::new(Point::ORIGIN, 1.0));
        assert_eq!(
            compute_transformation(&figure, Point::new(1.0, 0.0), Point::ORIGIN, None),
            Err(TransformError::EmptyPath)
        );
    }

    #[test]
    fn test_compute_translation_moves_centroid() {
        let square = Path::parse("M 0,0 L 2,0 L 2,2 L 0,2 Z").unwrap();
        let moved = compute_translation(&square, Point::new(10.0, 10.0));
        assert_point_eq(moved.centroid().unwrap(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_compute_translation_empty_path() {
        let empty = Path::default();
        assert_eq!(compute_translation(&empty, Point::new(1.0, 1.0)), empty);
    }
}
