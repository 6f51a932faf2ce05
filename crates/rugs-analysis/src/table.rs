//! Flat CSV tables.
//!
//! Every output row type implements [`TableRow`]; [`write_table`] renders a header and
//! the rows in order. Values are rounded by the row builders, never here.

use std::{borrow::Cow, fmt};

/// One CSV cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    Text(Cow<'a, str>),
    Int(i64),
    Count(usize),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => write_text(f, text),
            Cell::Int(value) => write!(f, "{value}"),
            Cell::Count(value) => write!(f, "{value}"),
            Cell::Float(value) => write!(f, "{value}"),
            Cell::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl<'a> From<&'a str> for Cell<'a> {
    fn from(value: &'a str) -> Self {
        Cell::Text(Cow::Borrowed(value))
    }
}

impl From<i64> for Cell<'_> {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<usize> for Cell<'_> {
    fn from(value: usize) -> Self {
        Cell::Count(value)
    }
}

impl From<f64> for Cell<'_> {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<bool> for Cell<'_> {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

fn write_text(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    if !text.contains([',', '"', '\n', '\r']) {
        return f.write_str(text);
    }
    f.write_str("\"")?;
    for (i, part) in text.split('"').enumerate() {
        if i > 0 {
            f.write_str("\"\"")?;
        }
        f.write_str(part)?;
    }
    f.write_str("\"")
}

/// A row of a fixed-schema output table.
pub trait TableRow {
    /// Column names, in output order.
    const COLUMNS: &'static [&'static str];

    /// Cell values, one per entry of [`Self::COLUMNS`].
    fn cells(&self) -> Vec<Cell<'_>>;
}

/// Writes the header followed by every row.
///
/// The header is written even when `rows` is empty.
pub fn write_table<'a, W, R, I>(out: &mut W, rows: I) -> fmt::Result
where
    W: fmt::Write,
    R: TableRow + 'a,
    I: IntoIterator<Item = &'a R>,
{
    writeln!(out, "{}", R::COLUMNS.join(","))?;
    for row in rows {
        let cells = row.cells();
        debug_assert_eq!(cells.len(), R::COLUMNS.len());
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                out.write_char(',')?;
            }
            write!(out, "{cell}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Renders a whole table into a string.
pub fn render_table<'a, R, I>(rows: I) -> String
where
    R: TableRow + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_table(&mut out, rows);
    out
}
