use crate::geometry;
use crate::geometry::Point2D;

/// A location to group, along with the identifier of its input record.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    pub position: Point2D,
    pub label: Option<String>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point2D::new(x, y),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite())
    }
}

/// An ordered set of points, all of which have finite coordinates.
///
/// Positions and labels are stored apart so that algorithms can borrow the
/// coordinates as one contiguous slice.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointSet {
    positions: Vec<Point2D>,
    labels: Vec<Option<String>>,
    dropped: usize,
}

impl PointSet {
    /// Builds a point set from the given points, in order, leaving out those
    /// with a NaN or infinite coordinate.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        let mut set = Self::default();
        for point in points {
            if !point.is_finite() {
                set.dropped += 1;
                continue;
            }
            set.positions.push(point.position);
            set.labels.push(point.label);
        }
        if set.dropped != 0 {
            tracing::info!(dropped = set.dropped, "left out non-finite points");
        }
        set
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of input points that were left out.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn positions(&self) -> &[Point2D] {
        &self.positions
    }

    pub fn labels(&self) -> impl ExactSizeIterator<Item = Option<&str>> + '_ {
        self.labels.iter().map(Option::as_deref)
    }

    pub fn has_labels(&self) -> bool {
        self.labels.iter().any(Option::is_some)
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        Some(Point {
            position: *self.positions.get(index)?,
            label: self.labels[index].clone(),
        })
    }

    /// The mean position of the set, or `None` if it is empty.
    pub fn mean(&self) -> Option<Point2D> {
        geometry::mean(&self.positions)
    }

    pub fn bounding_box(&self) -> Option<geometry::BoundingBox> {
        geometry::BoundingBox::from_points(self.positions.iter().copied())
    }
}

impl FromIterator<Point> for PointSet {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::from_points(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_points_are_dropped() {
        let set: PointSet = [
            Point::new(1., 2.).with_label("a"),
            Point::new(f64::NAN, 2.).with_label("b"),
            Point::new(3., f64::INFINITY),
            Point::new(4., 5.).with_label("d"),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 2);
        assert_eq!(set.dropped(), 2);
        assert_eq!(
            set.positions(),
            &[Point2D::new(1., 2.), Point2D::new(4., 5.)]
        );
        assert_eq!(set.labels().collect::<Vec<_>>(), [Some("a"), Some("d")]);
        assert_eq!(set.get(1), Some(Point::new(4., 5.).with_label("d")));
        assert_eq!(set.get(2), None);
    }

    #[test]
    fn test_empty() {
        let set = PointSet::from_points([Point::new(f64::NAN, f64::NAN)]);
        assert!(set.is_empty());
        assert!(!set.has_labels());
        assert_eq!(set.mean(), None);
        assert_eq!(set.bounding_box(), None);
    }

    #[test]
    fn test_mean() {
        let set = PointSet::from_points([Point::new(0., 0.), Point::new(2., 4.)]);
        assert_eq!(set.mean(), Some(Point2D::new(1., 2.)));
    }
}
