use anyhow::Context as _;
use anyhow::Result;
use std::io::Write as _;

const USAGE: &str = "Usage: point-group [options] [in.csv [out.csv]] <in.csv >out.csv";

fn main() -> Result<()> {
    let mut options = getopts::Options::new();
    geogroup_tools::grouping_options(&mut options);
    options.optopt("c", "centers", "also write group centers to FILE", "FILE");

    let matches = geogroup_tools::parse_args(options, USAGE, 2)?;
    let _trace_guard = geogroup_tools::init_tracing(matches.opt_str("t"));
    let settings = geogroup_tools::Settings::from_matches(&matches)?;

    let problem = geogroup_tools::load(matches.free.get(0), &settings)?;
    let outcome = geogroup_tools::run(&problem, &settings)?;

    let mut output = geogroup_tools::writer(matches.free.get(1))?;
    point_io::grouping::write_assignment(&mut output, &problem.table, &outcome.assignment)
        .context("failed to write grouping")?;
    output.flush().context("failed to write grouping")?;

    if let Some(centers_file) = matches.opt_str("c") {
        let mut output = geogroup_tools::writer(Some(&centers_file))?;
        point_io::grouping::write_centers(
            &mut output,
            &problem.table,
            outcome.metadata.centers.iter().map(|c| [c.x, c.y]),
            &outcome.group_sizes(),
        )
        .context("failed to write centers")?;
        output.flush().context("failed to write centers")?;
    }

    Ok(())
}
