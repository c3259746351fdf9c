//! A few useful geometric types

use itertools::Itertools as _;
use itertools::MinMaxResult;
use nalgebra::Vector2;

/// A pair of coordinates.
///
/// The first component holds the first coordinate column of the input (the
/// latitude for delivery tables), the second one holds the second column.
pub type Point2D = Vector2<f64>;

/// The axis-aligned box that contains a set of points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub p_min: Point2D,
    pub p_max: Point2D,
}

impl BoundingBox {
    /// Returns `None` when `points` is empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point2D>,
    {
        let (xs, ys): (Vec<f64>, Vec<f64>) = points.into_iter().map(|p| (p.x, p.y)).unzip();
        let (x_min, x_max) = minmax(&xs)?;
        let (y_min, y_max) = minmax(&ys)?;
        Some(Self {
            p_min: Point2D::new(x_min, y_min),
            p_max: Point2D::new(x_max, y_max),
        })
    }

    pub fn width(&self) -> f64 {
        self.p_max.x - self.p_min.x
    }

    pub fn height(&self) -> f64 {
        self.p_max.y - self.p_min.y
    }

    pub fn center(&self) -> Point2D {
        (self.p_min + self.p_max) / 2.0
    }
}

fn minmax(values: &[f64]) -> Option<(f64, f64)> {
    match values
        .iter()
        .minmax_by(|a, b| crate::partial_cmp(*a, *b))
    {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(v) => Some((*v, *v)),
        MinMaxResult::MinMax(min, max) => Some((*min, *max)),
    }
}

/// The arithmetic mean of the given points, or `None` if there are none.
///
/// Points are divided by their count before being summed, in order, so the
/// mean of finite points is finite and does not depend on how the caller's
/// thread pool is configured.
pub fn mean<'a, I>(points: I) -> Option<Point2D>
where
    I: IntoIterator<Item = &'a Point2D>,
    I::IntoIter: Clone,
{
    let points = points.into_iter();
    let count = points.clone().count();
    if count == 0 {
        return None;
    }
    Some(points.fold(Point2D::zeros(), |sum, p| sum + p / count as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use approx::assert_ulps_eq;

    #[test]
    fn test_bounding_box() {
        let points = [
            Point2D::new(-1., 2.),
            Point2D::new(0., 3.),
            Point2D::new(1., 1.),
            Point2D::new(3., 2.),
        ];
        let bb = BoundingBox::from_points(points).unwrap();

        assert_eq!(bb.p_min, Point2D::new(-1., 1.));
        assert_eq!(bb.p_max, Point2D::new(3., 3.));
        assert_ulps_eq!(bb.width(), 4.);
        assert_ulps_eq!(bb.height(), 2.);
        assert_eq!(bb.center(), Point2D::new(1., 2.));
    }

    #[test]
    fn test_bounding_box_degenerate() {
        assert_eq!(BoundingBox::from_points(Vec::<Point2D>::new()), None);

        let bb = BoundingBox::from_points([Point2D::new(5., 6.)]).unwrap();
        assert_eq!(bb.p_min, bb.p_max);
        assert_eq!(bb.width(), 0.);
    }

    #[test]
    fn test_mean() {
        let points = [
            Point2D::new(0., 0.),
            Point2D::new(0., 1.),
            Point2D::new(10., 0.),
            Point2D::new(10., 1.),
        ];
        let m = mean(&points).unwrap();
        assert_ulps_eq!(m.x, 5.);
        assert_ulps_eq!(m.y, 0.5);

        assert_eq!(mean(&[] as &[Point2D]), None);
    }

    #[test]
    fn test_mean_of_large_coordinates() {
        let points = [
            Point2D::new(1e308, 0.),
            Point2D::new(1.5e308, 1.),
            Point2D::new(-1e308, 0.),
        ];
        let m = mean(&points).unwrap();
        assert!(m.iter().all(|c| c.is_finite()));
        assert_relative_eq!(m.x, 0.5e308, max_relative = 1e-12);
        assert_relative_eq!(m.y, 1. / 3., max_relative = 1e-12);
    }
}
