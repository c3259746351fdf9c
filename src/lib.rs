//! A point grouping library for delivery locations.
//!
//! # Crate Layout
//!
//! Geogroup exposes a [`Partition`] trait, which is in turn implemented by
//! algorithms.  See its documentation for more details.  The trait is generic
//! around its input, so the same calling convention works for a plain slice
//! of coordinates or any other collection an algorithm knows how to read.
//!
//! The input of algorithms is usually built with a [`PointSet`], which
//! filters out records with missing or non-finite coordinates.
//!
//! # Available algorithms
//!
//! - [K-means][KMeans], with [k-means++][Init::KMeansPlusPlus] or
//!   [random][Init::Random] seeding.
//!
//! The [`group`] function is a shortcut for the common case.
//!
//! # Example
//!
//! ```rust
//! # fn main() -> Result<(), geogroup::Error> {
//! use geogroup::Point2D;
//!
//! let points = [
//!     Point2D::new(0.0, 0.0),
//!     Point2D::new(0.0, 1.0),
//!     Point2D::new(10.0, 0.0),
//!     Point2D::new(10.0, 1.0),
//! ];
//! let grouping = geogroup::group(&points, 2, 42)?;
//!
//! assert_eq!(grouping.assignment[0], grouping.assignment[1]);
//! assert_eq!(grouping.assignment[2], grouping.assignment[3]);
//! assert_ne!(grouping.assignment[0], grouping.assignment[2]);
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    rust_2018_idioms
)]

mod algorithms;
mod geometry;
pub mod imbalance;
mod point_set;

pub use crate::algorithms::*;
pub use crate::geometry::{mean, BoundingBox, Point2D};
pub use crate::point_set::{Point, PointSet};

pub use nalgebra;
pub use rayon;

use std::cmp::Ordering;

/// The `Partition` trait allows for partitioning data.
///
/// Partitioning algorithms implement this trait.
///
/// The generic argument `M` defines the input of the algorithms (e.g. a
/// slice of 2D points).
///
/// The input partition must be of the correct size and its contents may or may
/// not be used by the algorithms.
pub trait Partition<M> {
    /// Diagnostic data returned for a specific run of the algorithm.
    type Metadata;

    /// Error details, should the algorithm fail to run.
    type Error;

    /// Partition the given data and output the group ID of each element in
    /// `part_ids`.
    ///
    /// Group IDs must be contiguous and start from zero.  If a lower ID does
    /// not appear in the array, the group is assumed to be empty.
    fn partition(&mut self, part_ids: &mut [usize], data: M)
        -> Result<Self::Metadata, Self::Error>;
}

fn partial_cmp<W>(a: &W, b: &W) -> Ordering
where
    W: PartialOrd,
{
    if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// The outcome of [`group`]: one group index per point and one center per
/// group, in group-index order.
#[derive(Clone, Debug, PartialEq)]
pub struct Grouping {
    pub assignment: Vec<usize>,
    pub centers: Vec<Point2D>,
}

/// Groups `points` into `group_count` spatial clusters with [`KMeans`] and
/// its default settings, seeded with `seed`.
///
/// The same points, group count and seed always yield the same grouping.
pub fn group(points: &[Point2D], group_count: usize, seed: u64) -> Result<Grouping, Error> {
    let mut assignment = vec![0; points.len()];
    let metadata = KMeans {
        group_count,
        seed,
        ..KMeans::default()
    }
    .partition(&mut assignment, points)?;
    Ok(Grouping {
        assignment,
        centers: metadata.centers,
    })
}
