use anyhow::Context as _;
use anyhow::Result;
use std::io::Write as _;

const USAGE: &str = "Usage: point-svg [options] [in.csv [out.svg]] <in.csv >out.svg";

fn main() -> Result<()> {
    let mut options = getopts::Options::new();
    geogroup_tools::grouping_options(&mut options);

    let matches = geogroup_tools::parse_args(options, USAGE, 2)?;
    let _trace_guard = geogroup_tools::init_tracing(matches.opt_str("t"));
    let settings = geogroup_tools::Settings::from_matches(&matches)?;

    let problem = geogroup_tools::load(matches.free.get(0), &settings)?;
    let outcome = geogroup_tools::run(&problem, &settings)?;

    let mut output = geogroup_tools::writer(matches.free.get(1))?;
    geogroup_tools::svg::write(
        &mut output,
        &problem.points,
        &outcome.assignment,
        &outcome.metadata.centers,
    )
    .context("failed to write svg")?;
    output.flush().context("failed to write svg")?;

    Ok(())
}
