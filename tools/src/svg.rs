//! Scatter plot of a grouping, as SVG.
//!
//! The second coordinate goes along the horizontal axis and the first one
//! along the vertical axis, upwards, so that latitude/longitude pairs are
//! drawn north up.

use crate::palette::group_color;
use geogroup::Point2D;
use geogroup::PointSet;
use std::io;

/// Space left around the points, relative to the size of the plot.
const MARGIN: f64 = 0.05;

/// Screen position of `point`, in the SVG's coordinate system.
fn project(point: Point2D, y_max: f64) -> (f64, f64) {
    (point.y, y_max - point.x)
}

/// Writes the points of `points`, colored after their group, and the centers
/// of the groups.
///
/// Wrapping `w` in a [`std::io::BufWriter`] is recommended.
pub fn write<W>(
    mut w: W,
    points: &PointSet,
    assignment: &[usize],
    centers: &[Point2D],
) -> io::Result<()>
where
    W: io::Write,
{
    let bb = match geogroup::BoundingBox::from_points(
        points.positions().iter().chain(centers).copied(),
    ) {
        Some(v) => v,
        None => return Ok(()),
    };

    // Axes are swapped: the plot's width spans the second coordinate.
    let span = f64::max(bb.width(), bb.height());
    let span = if span > 0.0 { span } else { 1.0 };
    let margin = span * MARGIN;
    let radius = span / 200.0;

    let min_x = bb.p_min.y - margin;
    let min_y = -margin;
    let width = bb.height() + 2.0 * margin;
    let height = bb.width() + 2.0 * margin;
    let x_max = bb.p_max.x;

    writeln!(
        w,
        r#"<svg viewBox="{min_x} {min_y} {width} {height}" xmlns="http://www.w3.org/2000/svg">"#,
    )?;

    let points = points.positions().iter().zip(points.labels());
    for ((position, label), &group) in points.zip(assignment) {
        let (cx, cy) = project(*position, x_max);
        let color = group_color(group);
        write!(
            w,
            r#"<circle cx="{cx}" cy="{cy}" r="{radius}" fill="{}">"#,
            color.hex,
        )?;
        write!(w, "<title>Cluster: {group}")?;
        if let Some(label) = label {
            write!(w, " ({})", html_escape::encode_text(label))?;
        }
        writeln!(w, "</title></circle>")?;
    }

    for (group, center) in centers.iter().enumerate() {
        let (cx, cy) = project(*center, x_max);
        writeln!(
            w,
            r#"<circle cx="{cx}" cy="{cy}" r="{}" fill="{}" fill-opacity="0.7" stroke="black" stroke-width="{}"><title>Center {group}</title></circle>"#,
            2.5 * radius,
            group_color(group).hex,
            radius / 2.0,
        )?;
    }

    writeln!(w, "</svg>")?;

    Ok(())
}
