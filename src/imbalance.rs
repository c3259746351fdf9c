//! Functions to measure how good a grouping is.

use crate::Point2D;
use itertools::Itertools as _;

/// Number of members of each group.
///
/// IDs greater or equal to `group_count` are ignored.
pub fn group_sizes(assignment: &[usize], group_count: usize) -> Vec<usize> {
    assignment
        .iter()
        .fold(vec![0; group_count], |mut sizes, &group| {
            if let Some(size) = sizes.get_mut(group) {
                *size += 1;
            }
            sizes
        })
}

/// IDs of the groups that have no member.
pub fn empty_groups(assignment: &[usize], group_count: usize) -> Vec<usize> {
    group_sizes(assignment, group_count)
        .into_iter()
        .positions(|size| size == 0)
        .collect()
}

/// Compute the imbalance of the given grouping.
///
/// This is the largest relative difference between the size of a group and
/// the ideal size `assignment.len() / group_count`.
pub fn imbalance(assignment: &[usize], group_count: usize) -> f64 {
    if assignment.is_empty() || group_count == 0 {
        return 0.0;
    }
    let ideal_size = assignment.len() as f64 / group_count as f64;
    group_sizes(assignment, group_count)
        .into_iter()
        .map(|size| (size as f64 - ideal_size) / ideal_size)
        .minmax_by(crate::partial_cmp)
        .into_option()
        .map_or(0.0, |(_min, max)| max)
}

/// Sum of the squared distances between each point and the center of its
/// group.
pub fn inertia(points: &[Point2D], assignment: &[usize], centers: &[Point2D]) -> f64 {
    debug_assert_eq!(points.len(), assignment.len());
    points
        .iter()
        .zip(assignment)
        .map(|(point, &group)| (point - centers[group]).norm_squared())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_ulps_eq;

    #[test]
    fn test_group_sizes() {
        let assignment = [0, 2, 2, 0, 2];
        assert_eq!(group_sizes(&assignment, 4), [2, 0, 3, 0]);
        assert_eq!(empty_groups(&assignment, 4), [1, 3]);
        assert_eq!(empty_groups(&assignment, 3), [1]);
    }

    #[test]
    fn test_imbalance() {
        assert_ulps_eq!(imbalance(&[0, 1, 0, 1], 2), 0.0);
        assert_ulps_eq!(imbalance(&[0, 0, 0, 1], 2), 0.5);
        assert_ulps_eq!(imbalance(&[], 3), 0.0);
    }

    #[test]
    fn test_inertia() {
        let points = [
            Point2D::new(0., 0.),
            Point2D::new(0., 2.),
            Point2D::new(5., 5.),
        ];
        let centers = [Point2D::new(0., 1.), Point2D::new(5., 5.)];
        assert_ulps_eq!(inertia(&points, &[0, 0, 1], &centers), 2.0);
    }
}
