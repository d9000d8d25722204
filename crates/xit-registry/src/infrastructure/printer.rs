//! Plain-text table output.
//!
//! ```text
//! :::::::::::::::::::: fedora-18                      ::::::::::::::::::::::::::::::::::::::::::::::::::::::::::
//! Code TestSuite             TestCase          Result Expected
//! ---- ---------             --------          ------ --------
//! ++   EvdevDriverMouseTest  ScrollWheel       true   true
//! XX   LegacyInputDriverTest DriverDevice/fpit false  true
//! ```
//!
//! Rows are coloured with ANSI escapes only when colours are enabled, which
//! the binary does only when stdout is a terminal.

use std::io::{self, Write};

use crate::application::table::{Color, Table};

const RESET: &str = "\x1b[0m";

fn escape(color: Color) -> &'static str {
    match color {
        Color::Default => "",
        Color::Red => "\x1b[1;31m",
        Color::Green => "\x1b[1;32m",
        Color::Blue => "\x1b[1;34m",
    }
}

/// Writes tables as aligned text columns.
pub struct TextPrinter<W> {
    out: W,
    colors: bool,
}

impl<W: Write> TextPrinter<W> {
    pub fn new(out: W, colors: bool) -> Self {
        Self { out, colors }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn separator(&mut self, section: &str) -> io::Result<()> {
        writeln!(self.out, "{} {section:<30} {}", ":".repeat(20), ":".repeat(58))
    }

    fn line(&mut self, widths: &[usize], cells: &[String], color: Color) -> io::Result<()> {
        let text: String = cells
            .iter()
            .zip(widths)
            .map(|(cell, &width)| format!("{cell:<width$} "))
            .collect();
        let text = text.trim_end();
        if self.colors && color != Color::Default {
            writeln!(self.out, "{}{text}{RESET}", escape(color))
        } else {
            writeln!(self.out, "{text}")
        }
    }

    /// Prints the section banner (if any), the headers, a dashed underline
    /// and every row.
    pub fn print(&mut self, table: &Table) -> io::Result<()> {
        if let Some(section) = &table.section {
            self.separator(section)?;
        }

        let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
        for row in &table.rows {
            for (width, cell) in widths.iter_mut().zip(&row.cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let underline: Vec<String> = table
            .headers
            .iter()
            .map(|h| "-".repeat(h.chars().count()))
            .collect();
        self.line(&widths, &table.headers, Color::Default)?;
        self.line(&widths, &underline, Color::Default)?;
        for row in &table.rows {
            self.line(&widths, &row.cells, row.color)?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(None, &["Code", "TestCase"]);
        table.push(vec!["++".into(), "ScrollWheel".into()], Color::Default);
        table.push(vec!["XX".into(), "DriverDevice/fpit".into()], Color::Red);
        table
    }

    fn render(table: &Table, colors: bool) -> String {
        let mut printer = TextPrinter::new(Vec::new(), colors);
        printer.print(table).expect("print");
        String::from_utf8(printer.into_inner()).expect("utf-8")
    }

    #[test]
    fn test_columns_are_aligned_to_widest_cell() {
        // Arrange / Act
        let text = render(&sample(), false);

        // Assert
        assert_eq!(
            text,
            "Code TestCase\n\
             ---- --------\n\
             ++   ScrollWheel\n\
             XX   DriverDevice/fpit\n"
        );
    }

    #[test]
    fn test_colours_wrap_highlighted_rows_only_when_enabled() {
        let coloured = render(&sample(), true);
        let plain = render(&sample(), false);

        assert!(coloured.contains("\x1b[1;31mXX   DriverDevice/fpit\x1b[0m"));
        assert!(!coloured.contains("\x1b[1;31m++"));
        assert!(!plain.contains('\x1b'));
    }

    #[test]
    fn test_section_banner_precedes_table() {
        let mut table = sample();
        table.section = Some("fedora-18".to_string());

        let text = render(&table, false);

        assert!(text.starts_with(&format!("{} fedora-18 ", ":".repeat(20))));
        assert_eq!(text.lines().nth(1), Some("Code TestCase"));
    }
}
