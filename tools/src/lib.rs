//! Shared plumbing of the `geogroup-tools` binaries: argument parsing,
//! logging, loading a location table and grouping it.

use anyhow::Context as _;
use anyhow::Result;
use geogroup::Partition as _;
use point_io::Columns;
use point_io::Table;
use std::fs;
use std::io;
use std::process;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::Registry;
use tracing_tree::HierarchicalLayer;

pub mod map;
pub mod palette;
pub mod svg;

/// Group counts accepted without `--any-k`.
pub const GROUP_COUNT_RANGE: std::ops::RangeInclusive<usize> = 2..=10;

/// Parses the command-line arguments, prints the help and exits on `-h`.
///
/// At most `max_free` positional arguments are accepted.
pub fn parse_args(
    mut options: getopts::Options,
    usage: &str,
    max_free: usize,
) -> Result<getopts::Matches> {
    options.optflag("h", "help", "print this help menu");

    let matches = options.parse(std::env::args().skip(1))?;

    if matches.opt_present("h") {
        eprintln!("{}", options.usage(usage));
        eprint!(include_str!("help_after.txt"));
        process::exit(0);
    }
    if matches.free.len() > max_free {
        anyhow::bail!("too many arguments\n\n{}", options.usage(usage));
    }

    Ok(matches)
}

/// Registers the options shared by all tools that group points.
pub fn grouping_options(options: &mut getopts::Options) {
    options.optopt("k", "groups", "number of groups (default: 5)", "COUNT");
    options.optflag("", "any-k", "accept any number of groups, not only 2 to 10");
    options.optopt("s", "seed", "seed of the initial centers (default: 42)", "SEED");
    options.optopt("i", "init", "kmeans++ (default) or random", "INIT");
    options.optopt("r", "runs", "keep the best of COUNT runs (default: 1)", "COUNT");
    options.optopt("", "max-iter", "iterations per run (default: 300)", "COUNT");
    options.optopt("x", "x-column", "first coordinate (default: Latitude)", "NAME");
    options.optopt("y", "y-column", "second coordinate (default: Longitude)", "NAME");
    options.optopt("l", "label-column", "record identifiers", "NAME");
    options.optopt("d", "delimiter", "field separator (default: ',')", "CHAR");
    options.optopt("t", "trace", "emit a chrome trace", "FILE");
    options.optflag("v", "verbose", "print diagnostic data");
}

/// Settings given on the command line.
#[derive(Debug)]
pub struct Settings {
    pub columns: Columns,
    pub separator: char,
    pub k_means: geogroup::KMeans,
    pub verbose: bool,
}

impl Settings {
    pub fn from_matches(matches: &getopts::Matches) -> Result<Settings> {
        let defaults = geogroup::KMeans::default();

        let group_count = matches
            .opt_get_default("k", defaults.group_count)
            .context("invalid value for option 'groups'")?;
        if !matches.opt_present("any-k") && !GROUP_COUNT_RANGE.contains(&group_count) {
            anyhow::bail!(
                "expected {} to {} groups, got {} (see --any-k)",
                GROUP_COUNT_RANGE.start(),
                GROUP_COUNT_RANGE.end(),
                group_count,
            );
        }

        let init = match matches.opt_str("i").as_deref() {
            None | Some("kmeans++") | Some("k-means++") => geogroup::Init::KMeansPlusPlus,
            Some("random") => geogroup::Init::Random,
            Some(other) => anyhow::bail!("unknown initialization {other:?}"),
        };

        let separator = match matches.opt_str("d") {
            None => ',',
            Some(s) if s == "\\t" || s == "tab" => '\t',
            Some(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c != '"' => c,
                    _ => anyhow::bail!("expected a single character delimiter, got {s:?}"),
                }
            }
        };

        let default_columns = Columns::default();
        Ok(Settings {
            columns: Columns {
                x: matches.opt_str("x").unwrap_or(default_columns.x),
                y: matches.opt_str("y").unwrap_or(default_columns.y),
                label: matches.opt_str("l"),
            },
            separator,
            k_means: geogroup::KMeans {
                group_count,
                seed: matches
                    .opt_get_default("s", defaults.seed)
                    .context("invalid value for option 'seed'")?,
                runs: matches
                    .opt_get_default("r", defaults.runs)
                    .context("invalid value for option 'runs'")?,
                max_iter: matches
                    .opt_get_default("max-iter", defaults.max_iter)
                    .context("invalid value for option 'max-iter'")?,
                init,
                ..defaults
            },
            verbose: matches.opt_present("v"),
        })
    }
}

/// Sets up logging, filtered by the `LOG` environment variable.
///
/// When `trace_file` is given, a chrome trace is also written there until
/// the returned guard is dropped.
pub fn init_tracing(trace_file: Option<String>) -> Option<tracing_chrome::FlushGuard> {
    let registry = Registry::default().with(EnvFilter::from_env("LOG")).with(
        HierarchicalLayer::new(4)
            .with_thread_ids(true)
            .with_targets(true)
            .with_bracketed_fields(true),
    );
    match trace_file {
        Some(filename) => {
            let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
                .file(filename)
                .build();
            registry.with(chrome_layer).init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

/// Returns a buffered reader on the given file, or on standard input.
pub fn reader(filename: Option<&String>) -> Result<Box<dyn io::BufRead>> {
    let stream: Box<dyn io::BufRead> = match filename.map(String::as_str) {
        None | Some("-") => Box::new(io::BufReader::new(io::stdin())),
        Some(filename) => {
            let file = fs::File::open(filename)
                .with_context(|| format!("failed to open {filename:?}"))?;
            Box::new(io::BufReader::new(file))
        }
    };
    Ok(stream)
}

/// Returns a buffered writer on the given file, or on standard output.
pub fn writer(filename: Option<&String>) -> Result<Box<dyn io::Write>> {
    let stream: Box<dyn io::Write> = match filename.map(String::as_str) {
        None | Some("-") => Box::new(io::BufWriter::new(io::stdout())),
        Some(filename) => {
            let file = fs::File::create(filename)
                .with_context(|| format!("failed to create {filename:?}"))?;
            Box::new(io::BufWriter::new(file))
        }
    };
    Ok(stream)
}

/// A location table, and the points to group.
#[derive(Debug)]
pub struct Problem {
    pub table: Table,
    pub points: geogroup::PointSet,
}

impl Problem {
    pub fn from_table(table: Table) -> Result<Problem> {
        let points: geogroup::PointSet = table
            .records
            .iter()
            .map(|record| {
                let point = geogroup::Point::new(record.x, record.y);
                match &record.label {
                    Some(label) => point.with_label(label.as_str()),
                    None => point,
                }
            })
            .collect();
        if points.is_empty() {
            anyhow::bail!("no valid location in the input table");
        }
        Ok(Problem { table, points })
    }
}

/// Reads the location table from `filename` (standard input by default).
pub fn load(filename: Option<&String>, settings: &Settings) -> Result<Problem> {
    let input = reader(filename)?;
    let table = point_io::csv::read(input, &settings.columns, settings.separator)
        .context("failed to read location table")?;
    if table.dropped() != 0 {
        tracing::warn!(
            missing = table.missing,
            invalid = table.invalid,
            "left out rows without a valid location",
        );
    }
    Problem::from_table(table)
}

/// The outcome of a grouping.
#[derive(Debug)]
pub struct Outcome {
    pub assignment: Vec<usize>,
    pub metadata: geogroup::KMeansMetadata,
}

impl Outcome {
    pub fn group_sizes(&self) -> Vec<usize> {
        geogroup::imbalance::group_sizes(&self.assignment, self.metadata.centers.len())
    }
}

/// Groups the points of `problem`.
pub fn run(problem: &Problem, settings: &Settings) -> Result<Outcome> {
    let mut k_means = settings.k_means.clone();
    let mut assignment = vec![0; problem.points.len()];
    let metadata = k_means
        .partition(&mut assignment, &problem.points)
        .context("failed to group points")?;
    let outcome = Outcome {
        assignment,
        metadata,
    };

    if settings.verbose {
        eprintln!("{:?}", outcome.metadata);
        eprintln!("group sizes: {:?}", outcome.group_sizes());
        eprintln!(
            "imbalance: {}",
            geogroup::imbalance::imbalance(&outcome.assignment, k_means.group_count),
        );
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(args: &[&str]) -> getopts::Matches {
        let mut options = getopts::Options::new();
        grouping_options(&mut options);
        options.parse(args).unwrap()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::from_matches(&matches(&[])).unwrap();
        assert_eq!(settings.k_means, geogroup::KMeans::default());
        assert_eq!(settings.columns, Columns::default());
        assert_eq!(settings.separator, ',');
        assert!(!settings.verbose);
    }

    #[test]
    fn test_settings() {
        let settings = Settings::from_matches(&matches(&[
            "-k", "3", "-s", "7", "-i", "random", "-l", "Order", "-d", ";", "-r", "4",
        ]))
        .unwrap();
        assert_eq!(settings.k_means.group_count, 3);
        assert_eq!(settings.k_means.seed, 7);
        assert_eq!(settings.k_means.runs, 4);
        assert_eq!(settings.k_means.init, geogroup::Init::Random);
        assert_eq!(settings.columns.label.as_deref(), Some("Order"));
        assert_eq!(settings.separator, ';');
    }

    #[test]
    fn test_group_count_range() {
        assert!(Settings::from_matches(&matches(&["-k", "1"])).is_err());
        assert!(Settings::from_matches(&matches(&["-k", "11"])).is_err());
        assert!(Settings::from_matches(&matches(&["-k", "x"])).is_err());
        let settings = Settings::from_matches(&matches(&["-k", "12", "--any-k"])).unwrap();
        assert_eq!(settings.k_means.group_count, 12);
    }

    #[test]
    fn test_load_and_run() {
        let input = "\
Latitude,Longitude,Order
0,0,a
0,1,b
,5,c
10,0,d
10,1,e
";
        let table = point_io::csv::read(input.as_bytes(), &Columns::default(), ',').unwrap();
        let problem = Problem::from_table(table).unwrap();
        assert_eq!(problem.points.len(), 4);
        assert_eq!(problem.table.missing, 1);

        let settings = Settings::from_matches(&matches(&["-k", "2"])).unwrap();
        let outcome = run(&problem, &settings).unwrap();
        assert_eq!(outcome.assignment[0], outcome.assignment[1]);
        assert_eq!(outcome.assignment[2], outcome.assignment[3]);
        assert_ne!(outcome.assignment[0], outcome.assignment[2]);
        assert_eq!(outcome.group_sizes(), [2, 2]);
    }

    #[test]
    fn test_no_valid_location() {
        let input = "Latitude,Longitude\nNaN,1\n";
        let table = point_io::csv::read(input.as_bytes(), &Columns::default(), ',').unwrap();
        assert!(Problem::from_table(table).is_err());
    }
}
