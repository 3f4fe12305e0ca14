//! Aligned plain-text tables for listing commands.
//!
//! Columns are left-aligned and separated by two spaces. Widths are measured
//! in terminal cells so descriptions containing wide characters stay aligned.

use std::io::{self, Write};

use unicode_width::UnicodeWidthStr;

/// Spaces between adjacent columns.
const COLUMN_GAP: usize = 2;

/// A table with a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    pub(crate) fn new<const N: usize>(headers: [&str; N]) -> Self {
        Self {
            rows: vec![headers.iter().map(|header| (*header).to_owned()).collect()],
        }
    }

    pub(crate) fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Writes every row; the last column is never padded.
    pub(crate) fn write_to(&self, out: &mut dyn Write) -> io::Result<()> {
        let widths = self.column_widths();
        for row in &self.rows {
            let mut line = String::new();
            let last = row.len().saturating_sub(1);
            for (index, cell) in row.iter().enumerate() {
                line.push_str(cell);
                if index < last {
                    let width = widths.get(index).copied().unwrap_or_default();
                    let padding = width.saturating_sub(cell.width()) + COLUMN_GAP;
                    line.extend(std::iter::repeat_n(' ', padding));
                }
            }
            writeln!(out, "{}", line.trim_end())?;
        }
        Ok(())
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = Vec::new();
        for row in &self.rows {
            for (index, cell) in row.iter().enumerate() {
                match widths.get_mut(index) {
                    Some(width) => *width = (*width).max(cell.width()),
                    None => widths.push(cell.width()),
                }
            }
        }
        widths
    }
}
