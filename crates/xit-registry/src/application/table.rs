//! Printable tables produced by the registry commands.

/// Highlight of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Red,
    Green,
    Blue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<String>,
    pub color: Color,
}

impl Row {
    pub fn new(cells: Vec<String>, color: Color) -> Self {
        Self { cells, color }
    }
}

/// A titled table; rows have as many cells as there are headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub section: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(section: Option<String>, headers: &[&str]) -> Self {
        Self {
            section,
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, cells: Vec<String>, color: Color) {
        self.rows.push(Row::new(cells, color));
    }

    /// Rows with the given code in their first cell.
    pub fn rows_with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Row> + 'a {
        self.rows
            .iter()
            .filter(move |row| row.cells.first().is_some_and(|c| c == code))
    }
}
