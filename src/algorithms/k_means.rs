//! Lloyd's k-means over 2D points, with the k-means++ seeding from
//! "k-means++: The Advantages of Careful Seeding" by David Arthur and Sergei
//! Vassilvitskii (2007), in its greedy variant.

use super::Error;
use crate::geometry;
use crate::geometry::Point2D;
use crate::imbalance;
use crate::PointSet;
use rand::Rng;
use rand::SeedableRng as _;
use rayon::prelude::*;

/// How the first centers of a run are chosen.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Init {
    /// Greedy k-means++: centers are drawn one after the other, far from the
    /// ones already drawn.
    #[default]
    KMeansPlusPlus,

    /// Centers are distinct points drawn uniformly.
    Random,

    /// Centers are given by the caller.  There must be exactly as many as
    /// requested groups.
    Given(Vec<Point2D>),
}

/// Diagnostic data of a k-means run.
#[derive(Clone, Debug, PartialEq)]
pub struct Metadata {
    /// Center of each group, in group order.  The center of an empty group is
    /// the last center it had.
    pub centers: Vec<Point2D>,

    /// Number of Lloyd iterations of the kept run.
    pub iterations: usize,

    /// Whether the kept run stopped before reaching `max_iter`.
    pub converged: bool,

    /// Sum of the squared distances between points and their center.
    pub inertia: f64,

    /// Which of the runs was kept.
    pub run: usize,
}

struct Run {
    assignment: Vec<usize>,
    centers: Vec<Point2D>,
    iterations: usize,
    converged: bool,
    inertia: f64,
}

/// Returns the index of the center closest to `point`, along with the
/// squared distance between the two.
///
/// Ties are broken in favor of the lowest index.
fn nearest(point: &Point2D, centers: &[Point2D]) -> (usize, f64) {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, center) in centers.iter().enumerate() {
        let distance = (center - point).norm_squared();
        if distance < best_distance {
            best = i;
            best_distance = distance;
        }
    }
    (best, best_distance)
}

/// Assigns each point to its closest center and returns how many points
/// changed group.
fn assign(points: &[Point2D], centers: &[Point2D], assignment: &mut [usize]) -> usize {
    points
        .par_iter()
        .zip(assignment.par_iter_mut())
        .map(|(point, group)| {
            let (closest, _) = nearest(point, centers);
            let moved = *group != closest;
            *group = closest;
            moved
        })
        .filter(|moved| *moved)
        .count()
}

/// Moves each center to the mean of its members and returns the sum of the
/// squared distances the centers moved by.
///
/// Centers of empty groups are left where they are.  Members are divided by
/// the group size before being summed, so that means of large but finite
/// coordinates stay finite.
fn update_centers(points: &[Point2D], assignment: &[usize], centers: &mut [Point2D]) -> f64 {
    let mut counts = vec![0_usize; centers.len()];
    for &group in assignment {
        counts[group] += 1;
    }
    let mut means = vec![Point2D::zeros(); centers.len()];
    for (point, &group) in points.iter().zip(assignment) {
        means[group] += point / counts[group] as f64;
    }

    let mut shift = 0.0;
    for ((center, new_center), count) in centers.iter_mut().zip(means).zip(counts) {
        if count == 0 {
            continue;
        }
        shift += (new_center - *center).norm_squared();
        *center = new_center;
    }
    shift
}

/// Turns the relative tolerance into an absolute bound on the squared center
/// shift, by scaling it with the mean per-axis variance of the points.
fn scaled_tolerance(points: &[Point2D], tolerance: f64) -> f64 {
    let mean = match geometry::mean(points) {
        Some(mean) => mean,
        None => return 0.0,
    };
    let total_variance: f64 = points
        .iter()
        .map(|point| (point - mean).norm_squared())
        .sum::<f64>()
        / points.len() as f64;
    tolerance * total_variance / 2.0
}

/// Picks an index with a probability proportional to its distance.
fn sample_by_distance(rng: &mut impl Rng, min_distances: &[f64], sum: f64) -> usize {
    let threshold = rng.gen::<f64>() * sum;
    let mut cumsum = 0.0;
    for (i, &distance) in min_distances.iter().enumerate() {
        cumsum += distance;
        if cumsum > threshold {
            return i;
        }
    }

    // Rounding errors may keep `cumsum` under `threshold`.  Avoid points that
    // are already centers in that case.
    min_distances
        .iter()
        .rposition(|&distance| distance > 0.0)
        .unwrap_or(min_distances.len() - 1)
}

fn plus_plus_init(rng: &mut impl Rng, points: &[Point2D], group_count: usize) -> Vec<Point2D> {
    // Same as scikit-learn.
    let candidate_count = 2 + (group_count as f64).ln() as usize;

    let mut centers = Vec::with_capacity(group_count);
    let first = points[rng.gen_range(0..points.len())];
    centers.push(first);

    let mut min_distances: Vec<f64> = points
        .par_iter()
        .map(|point| (point - first).norm_squared())
        .collect();
    let mut potential: f64 = min_distances.iter().sum();

    for _ in 1..group_count {
        let mut best: Option<(usize, Vec<f64>, f64)> = None;
        for _ in 0..candidate_count {
            let candidate = sample_by_distance(rng, &min_distances, potential);
            let candidate_point = points[candidate];
            let distances: Vec<f64> = points
                .par_iter()
                .zip(&min_distances)
                .map(|(point, min_distance)| {
                    f64::min((point - candidate_point).norm_squared(), *min_distance)
                })
                .collect();
            let candidate_potential: f64 = distances.iter().sum();
            let is_better = match &best {
                Some((_, _, best_potential)) => candidate_potential < *best_potential,
                None => true,
            };
            if is_better {
                best = Some((candidate, distances, candidate_potential));
            }
        }
        let Some((candidate, distances, candidate_potential)) = best else {
            break;
        };
        centers.push(points[candidate]);
        min_distances = distances;
        potential = candidate_potential;
    }

    centers
}

fn random_init(rng: &mut impl Rng, points: &[Point2D], group_count: usize) -> Vec<Point2D> {
    rand::seq::index::sample(rng, points.len(), group_count)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

fn lloyd(points: &[Point2D], mut centers: Vec<Point2D>, max_iter: usize, threshold: f64) -> Run {
    // Out-of-range IDs so that every point counts as moved on the first pass.
    let mut assignment = vec![usize::MAX; points.len()];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iter {
        iterations += 1;

        let moved = assign(points, &centers, &mut assignment);
        if moved == 0 {
            converged = true;
            break;
        }

        let shift = update_centers(points, &assignment, &mut centers);
        tracing::debug!(iterations, moved, shift, "k-means iteration");
        if shift <= threshold {
            converged = true;
            break;
        }
    }

    let inertia = imbalance::inertia(points, &assignment, &centers);
    Run {
        assignment,
        centers,
        iterations,
        converged,
        inertia,
    }
}

fn check_input(part_ids: &[usize], points: &[Point2D], settings: &KMeans) -> Result<(), Error> {
    if points.is_empty() {
        return Err(Error::EmptyInput);
    }
    if settings.group_count == 0 {
        return Err(Error::InvalidParameter {
            name: "group_count",
            reason: "must be at least 1",
        });
    }
    if points.len() < settings.group_count {
        return Err(Error::InvalidParameter {
            name: "group_count",
            reason: "cannot exceed the number of points",
        });
    }
    if let Some(index) = points
        .iter()
        .position(|point| !point.iter().all(|c| c.is_finite()))
    {
        return Err(Error::InvalidPoint { index });
    }
    if part_ids.len() != points.len() {
        return Err(Error::InputLenMismatch {
            expected: part_ids.len(),
            actual: points.len(),
        });
    }
    if settings.max_iter == 0 {
        return Err(Error::InvalidParameter {
            name: "max_iter",
            reason: "must be at least 1",
        });
    }
    if settings.runs == 0 {
        return Err(Error::InvalidParameter {
            name: "runs",
            reason: "must be at least 1",
        });
    }
    if !settings.tolerance.is_finite() || settings.tolerance < 0.0 {
        return Err(Error::InvalidParameter {
            name: "tolerance",
            reason: "must be a finite, non-negative number",
        });
    }
    if let Init::Given(centers) = &settings.init {
        if centers.len() != settings.group_count {
            return Err(Error::InvalidParameter {
                name: "init",
                reason: "must hold one center per group",
            });
        }
        if !centers.iter().flat_map(|c| c.iter()).all(|c| c.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "init",
                reason: "centers must have finite coordinates",
            });
        }
    }
    Ok(())
}

fn k_means(
    part_ids: &mut [usize],
    points: &[Point2D],
    settings: &KMeans,
) -> Result<Metadata, Error> {
    check_input(part_ids, points, settings)?;

    let span = tracing::info_span!(
        "k_means",
        group_count = settings.group_count,
        point_count = points.len(),
        seed = settings.seed,
    );
    let _enter = span.enter();

    let threshold = scaled_tolerance(points, settings.tolerance);
    let mut rng = rand_pcg::Pcg64::seed_from_u64(settings.seed);

    let mut run_once = |run_idx: usize| {
        let centers = match &settings.init {
            Init::KMeansPlusPlus => plus_plus_init(&mut rng, points, settings.group_count),
            Init::Random => random_init(&mut rng, points, settings.group_count),
            Init::Given(centers) => centers.clone(),
        };
        let run = lloyd(points, centers, settings.max_iter, threshold);
        tracing::info!(
            run = run_idx,
            iterations = run.iterations,
            converged = run.converged,
            inertia = run.inertia,
        );
        (run_idx, run)
    };

    // First run wins ties.
    let first = run_once(0);
    let (run_idx, run) = (1..settings.runs).map(&mut run_once).fold(first, |best, run| {
        if run.1.inertia < best.1.inertia {
            run
        } else {
            best
        }
    });

    let empty_groups = imbalance::empty_groups(&run.assignment, settings.group_count);
    if !empty_groups.is_empty() {
        tracing::warn!(?empty_groups, "some groups have no member");
    }

    part_ids.copy_from_slice(&run.assignment);
    Ok(Metadata {
        centers: run.centers,
        iterations: run.iterations,
        converged: run.converged,
        inertia: run.inertia,
        run: run_idx,
    })
}

/// # K-means
///
/// Groups points around `group_count` centers, so that each point is in the
/// group of its closest center and each center is the mean of its group.
///
/// Runs are reproducible: the same points and settings always yield the same
/// partition, whatever the size of the rayon thread pool.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), geogroup::Error> {
/// use geogroup::Partition as _;
/// use geogroup::Point2D;
///
/// let points = [
///     Point2D::new(48.85, 2.35),
///     Point2D::new(48.86, 2.34),
///     Point2D::new(45.76, 4.83),
///     Point2D::new(45.75, 4.84),
///     Point2D::new(43.30, 5.37),
/// ];
/// let mut partition = [0; 5];
///
/// let metadata = geogroup::KMeans { group_count: 3, ..Default::default() }
///     .partition(&mut partition, &points[..])?;
///
/// assert_eq!(partition[0], partition[1]);
/// assert_eq!(partition[2], partition[3]);
/// assert_eq!(metadata.centers.len(), 3);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct KMeans {
    /// Number of groups to make.
    pub group_count: usize,

    /// Seed of the random number generator used to pick initial centers.
    pub seed: u64,

    /// Maximum number of Lloyd iterations per run.
    pub max_iter: usize,

    /// A run stops when the centers moved by less than this, relative to the
    /// variance of the points.
    pub tolerance: f64,

    /// How the first centers of each run are chosen.
    pub init: Init,

    /// Number of runs with different initial centers.  The run with the
    /// lowest inertia is kept.
    pub runs: usize,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            group_count: 5,
            seed: 42,
            max_iter: 300,
            tolerance: 1e-4,
            init: Init::KMeansPlusPlus,
            runs: 1,
        }
    }
}

impl<'a> crate::Partition<&'a [Point2D]> for KMeans {
    type Metadata = Metadata;
    type Error = Error;

    fn partition(
        &mut self,
        part_ids: &mut [usize],
        points: &'a [Point2D],
    ) -> Result<Self::Metadata, Self::Error> {
        k_means(part_ids, points, self)
    }
}

impl<'a> crate::Partition<&'a PointSet> for KMeans {
    type Metadata = Metadata;
    type Error = Error;

    fn partition(
        &mut self,
        part_ids: &mut [usize],
        points: &'a PointSet,
    ) -> Result<Self::Metadata, Self::Error> {
        k_means(part_ids, points.positions(), self)
    }
}
