//! Grouping encoder.
//!
//! Groupings are written as comma-separated tables: one file maps each
//! record to its group, another one lists the center of each group.

use crate::csv::Table;
use itertools::Itertools as _;
use std::borrow::Cow;
use std::io;

/// Quotes a field if it holds a comma, a quote or a line break.
fn quote(field: &str) -> Cow<'_, str> {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Writes the group of each record of `table`.
///
/// The output has the columns `index,<label>,<x>,<y>,group`, where `index` is
/// the row of the record in the input file.  The label column is left out if
/// the table has none.
///
/// Wrapping `w` in a [`std::io::BufWriter`] is recommended.
///
/// # Panics
///
/// Panics if `assignment` and the records of `table` differ in length.
pub fn write_assignment<W>(mut w: W, table: &Table, assignment: &[usize]) -> io::Result<()>
where
    W: io::Write,
{
    assert_eq!(table.records.len(), assignment.len());

    let header = std::iter::once("index")
        .chain(table.label_column.as_deref())
        .chain([table.x_column.as_str(), table.y_column.as_str(), "group"])
        .map(quote)
        .join(",");
    writeln!(w, "{header}")?;

    for (record, group) in table.records.iter().zip(assignment) {
        write!(w, "{}", record.row)?;
        if table.label_column.is_some() {
            write!(w, ",{}", quote(record.label.as_deref().unwrap_or("")))?;
        }
        writeln!(w, ",{},{},{}", record.x, record.y, group)?;
    }

    Ok(())
}

/// Writes the center and member count of each group.
///
/// The output has the columns `group,<x>,<y>,members`.
pub fn write_centers<W, I>(
    mut w: W,
    table: &Table,
    centers: I,
    sizes: &[usize],
) -> io::Result<()>
where
    W: io::Write,
    I: IntoIterator<Item = [f64; 2]>,
{
    writeln!(
        w,
        "group,{},{},members",
        quote(&table.x_column),
        quote(&table.y_column),
    )?;
    for (group, ([x, y], size)) in centers.into_iter().zip(sizes).enumerate() {
        writeln!(w, "{group},{x},{y},{size}")?;
    }
    Ok(())
}
