//! Location table decoder.
//!
//! Tables are delimited text files whose first record names the columns.
//! Fields may be enclosed in double quotes, in which case they may contain
//! the separator, line breaks and escaped quotes (`""`).
//!
//! Two columns hold the coordinates of each location, and an optional third
//! one holds an identifier that is carried through unchanged.  Records whose
//! coordinates are missing or not finite numbers are left out and counted.

use std::error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum ErrorKind {
    Io(io::Error),
    MissingHeader,
    MissingColumn(String),
    FieldCount { expected: usize, found: usize },
    UnterminatedQuote,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    lineno: usize,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn lineno(&self) -> usize {
        self.lineno
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Io(err) => write!(f, "io error: {}", err),
            ErrorKind::MissingHeader => write!(f, "expected a header row, found nothing"),
            ErrorKind::MissingColumn(name) => write!(f, "no column named {:?}", name),
            ErrorKind::FieldCount { expected, found } => {
                write!(f, "expected {} fields, found {}", expected, found)
            }
            ErrorKind::UnterminatedQuote => write!(f, "quoted field is never closed"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at line {}: {}", self.lineno, self.kind)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error {
            kind: ErrorKind::Io(err),
            lineno: 0,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Names of the columns to read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Columns {
    /// Column of the first coordinate.
    pub x: String,

    /// Column of the second coordinate.
    pub y: String,

    /// Column of the record identifiers, if any.
    pub label: Option<String>,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            x: String::from("Latitude"),
            y: String::from("Longitude"),
            label: None,
        }
    }
}

/// A location read from a table.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Zero-based position of the record among the data rows of the file,
    /// counting the rows that were left out.
    pub row: usize,
    pub x: f64,
    pub y: f64,
    pub label: Option<String>,
}

/// The valid records of a table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    /// Column names, as found in the header.
    pub x_column: String,
    pub y_column: String,
    pub label_column: Option<String>,

    pub records: Vec<Record>,

    /// Number of rows with an empty or "NaN"-like coordinate.
    pub missing: usize,

    /// Number of rows with a coordinate that is not a finite number.
    pub invalid: usize,
}

impl Table {
    /// Number of rows that were left out.
    pub fn dropped(&self) -> usize {
        self.missing + self.invalid
    }
}

fn with_lineno(lineno: usize) -> impl Fn(ErrorKind) -> Error {
    move |kind| Error { kind, lineno }
}

/// Reads one record, which may span several lines when a quoted field holds
/// a line break.
///
/// Returns `false` on end of input.  Blank lines are skipped.
fn read_record<R: io::BufRead>(lineno: &mut usize, buf: &mut String, mut r: R) -> Result<bool> {
    buf.clear();
    loop {
        let start = buf.len();
        let n = r.read_line(buf).map_err(|err| Error {
            kind: ErrorKind::Io(err),
            lineno: *lineno + 1,
        })?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(false);
            }
            return Err(Error {
                kind: ErrorKind::UnterminatedQuote,
                lineno: *lineno,
            });
        }
        *lineno += 1;

        let quote_count = buf.bytes().filter(|&b| b == b'"').count();
        if quote_count % 2 == 1 {
            // Inside a quoted field, the line break is part of the field.
            continue;
        }
        if buf[start..].trim().is_empty() && start == 0 {
            buf.clear();
            continue;
        }

        let trimmed_len = buf.trim_end_matches(&['\r', '\n'][..]).len();
        buf.truncate(trimmed_len);
        return Ok(true);
    }
}

/// Splits a record into its fields, unquoting them.
fn split_fields(record: &str, separator: char, fields: &mut Vec<String>) {
    fields.clear();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = record.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            c if c == separator && !in_quotes => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
}

/// Returns the index of the column named `name`.
///
/// An exact match is preferred over a case-insensitive one.
fn find_column(header: &[String], name: &str) -> Option<usize> {
    header
        .iter()
        .position(|column| column.trim() == name)
        .or_else(|| {
            header
                .iter()
                .position(|column| column.trim().eq_ignore_ascii_case(name))
        })
}

enum Cell {
    Missing,
    Invalid,
    Value(f64),
}

fn parse_coordinate(field: &str) -> Cell {
    let field = field.trim();
    if field.is_empty() || ["nan", "na", "n/a", "null", "none"]
        .iter()
        .any(|missing| field.eq_ignore_ascii_case(missing))
    {
        return Cell::Missing;
    }
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => Cell::Value(value),
        _ => Cell::Invalid,
    }
}

/// Reads a table of locations.
///
/// Wrapping `r` in a [`std::io::BufReader`] is recommended.
pub fn read<R>(mut r: R, columns: &Columns, separator: char) -> Result<Table>
where
    R: io::BufRead,
{
    let mut lineno = 0;
    let mut buf = String::new();
    let mut fields = Vec::new();

    if !read_record(&mut lineno, &mut buf, &mut r)? {
        return Err(Error {
            kind: ErrorKind::MissingHeader,
            lineno,
        });
    }
    let header_line = buf.strip_prefix('\u{feff}').unwrap_or(&buf);
    split_fields(header_line, separator, &mut fields);
    let header: Vec<String> = fields.drain(..).map(|f| f.trim().to_owned()).collect();

    let column_idx = |name: &str| {
        find_column(&header, name)
            .ok_or_else(|| ErrorKind::MissingColumn(name.to_owned()))
            .map_err(with_lineno(lineno))
    };
    let x_idx = column_idx(columns.x.as_str())?;
    let y_idx = column_idx(columns.y.as_str())?;
    let label_idx = match &columns.label {
        Some(label) => Some(column_idx(label.as_str())?),
        None => None,
    };

    let mut table = Table {
        x_column: header[x_idx].clone(),
        y_column: header[y_idx].clone(),
        label_column: label_idx.map(|idx| header[idx].clone()),
        ..Table::default()
    };

    let mut row = 0;
    while read_record(&mut lineno, &mut buf, &mut r)? {
        split_fields(&buf, separator, &mut fields);
        if fields.len() != header.len() {
            return Err(Error {
                kind: ErrorKind::FieldCount {
                    expected: header.len(),
                    found: fields.len(),
                },
                lineno,
            });
        }

        match (parse_coordinate(&fields[x_idx]), parse_coordinate(&fields[y_idx])) {
            (Cell::Value(x), Cell::Value(y)) => {
                let label = label_idx
                    .map(|idx| fields[idx].trim())
                    .filter(|label| !label.is_empty())
                    .map(String::from);
                table.records.push(Record { row, x, y, label });
            }
            (Cell::Missing, _) | (_, Cell::Missing) => table.missing += 1,
            _ => table.invalid += 1,
        }
        row += 1;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_str(input: &str, columns: &Columns) -> Result<Table> {
        read(input.as_bytes(), columns, ',')
    }

    #[test]
    fn test_basic() {
        let input = "\
Order,Latitude,Longitude
A1,37.51,127.02
A2,37.55,126.99
";
        let table = read_str(input, &Columns::default()).unwrap();
        assert_eq!(table.x_column, "Latitude");
        assert_eq!(table.y_column, "Longitude");
        assert_eq!(
            table.records,
            [
                Record {
                    row: 0,
                    x: 37.51,
                    y: 127.02,
                    label: None
                },
                Record {
                    row: 1,
                    x: 37.55,
                    y: 126.99,
                    label: None
                },
            ]
        );
        assert_eq!(table.dropped(), 0);
    }

    #[test]
    fn test_missing_values_are_dropped() {
        let input = "\
Latitude,Longitude,Order
37.51,127.02,A1
,126.99,A2
37.60,NaN,A3
37.61,abc,A4
37.62,inf,A5
37.70,127.10,A6
";
        let columns = Columns {
            label: Some(String::from("Order")),
            ..Columns::default()
        };
        let table = read_str(input, &columns).unwrap();
        assert_eq!(table.missing, 2);
        assert_eq!(table.invalid, 2);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[1].row, 5);
        assert_eq!(table.records[1].label.as_deref(), Some("A6"));
    }

    #[test]
    fn test_quotes_bom_and_case() {
        let input = "\u{feff}\"name\",\"LATITUDE\",longitude\r\n\
\"Shop, \"\"north\"\"\",1.5,2.5\r\n\
\r\n\
\"multi\nline\",3,4\r\n";
        let columns = Columns {
            label: Some(String::from("Name")),
            ..Columns::default()
        };
        let table = read_str(input, &columns).unwrap();
        assert_eq!(table.x_column, "LATITUDE");
        assert_eq!(table.label_column.as_deref(), Some("name"));
        assert_eq!(table.records.len(), 2);
        assert_eq!(
            table.records[0].label.as_deref(),
            Some("Shop, \"north\"")
        );
        assert_eq!(table.records[1].label.as_deref(), Some("multi\nline"));
        assert_eq!((table.records[1].x, table.records[1].y), (3., 4.));
    }

    #[test]
    fn test_separator() {
        let input = "Latitude;Longitude\n1,5;2\n";
        let table = read(input.as_bytes(), &Columns::default(), ';');
        // The decimal comma is not supported, the row is left out.
        assert_eq!(table.unwrap().invalid, 1);

        let input = "Latitude\tLongitude\n1.5\t2\n";
        let table = read(input.as_bytes(), &Columns::default(), '\t').unwrap();
        assert_eq!(table.records[0].x, 1.5);
    }

    #[test]
    fn test_errors() {
        let err = read_str("", &Columns::default()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MissingHeader));

        let err = read_str("lat,Longitude\n1,2\n", &Columns::default()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MissingColumn(name) if name == "Latitude"));
        assert_eq!(err.lineno(), 1);

        let err = read_str("Latitude,Longitude\n1,2\n3,4,5\n", &Columns::default()).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::FieldCount {
                expected: 2,
                found: 3
            }
        ));
        assert_eq!(err.lineno(), 3);

        let err = read_str("Latitude,Longitude\n\"1,2\n", &Columns::default()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnterminatedQuote));
    }

    #[test]
    fn test_header_only() {
        let table = read_str("Latitude,Longitude\n", &Columns::default()).unwrap();
        assert!(table.records.is_empty());
    }
}
