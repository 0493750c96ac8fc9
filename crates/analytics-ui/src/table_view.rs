//! Plain-text tables for dashboard sections.
//!
//! Column widths are measured in terminal cells with `unicode-width`, so
//! country or page names with wide characters still line up.

use unicode_width::UnicodeWidthStr;

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A titled table of string cells.
#[derive(Debug, Clone)]
pub struct TextTable {
    title: String,
    headers: Vec<String>,
    aligns: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    /// First column left-aligned, the rest right-aligned.
    pub fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        let aligns = (0..headers.len())
            .map(|i| if i == 0 { Align::Left } else { Align::Right })
            .collect();
        Self {
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            aligns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Render the title, a header row, a rule and the data rows.
    pub fn render(&self) -> String {
        let widths = self.column_widths();
        let mut out = String::new();

        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&self.render_row(&self.headers, &widths));
        let rule_len = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(rule_len));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&self.render_row(row, &widths));
        }
        out
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.width());
                }
            }
        }
        widths
    }

    fn render_row(&self, cells: &[String], widths: &[usize]) -> String {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                let pad = " ".repeat(width.saturating_sub(cell.width()));
                match self.aligns[i] {
                    Align::Left => format!("{cell}{pad}"),
                    Align::Right => format!("{pad}{cell}"),
                }
            })
            .collect();
        let mut line = padded.join("  ");
        line.truncate(line.trim_end().len());
        line.push('\n');
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_aligns_columns() {
        let mut table = TextTable::new("Users by Country", &["Country", "Users"]);
        table.push_row(vec!["United States".to_string(), "1,204".to_string()]);
        table.push_row(vec!["India".to_string(), "87".to_string()]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Users by Country");
        assert_eq!(lines[1], "Country        Users");
        assert_eq!(lines[2], "-".repeat(20));
        assert_eq!(lines[3], "United States  1,204");
        assert_eq!(lines[4], "India             87");
    }

    #[test]
    fn test_wide_characters_measured_by_cells() {
        let mut table = TextTable::new("Pages", &["Page", "Views"]);
        table.push_row(vec!["/日本".to_string(), "3".to_string()]);
        table.push_row(vec!["/home".to_string(), "12".to_string()]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        // "/日本" is five cells wide, same as "/home".
        assert_eq!(lines[3], "/日本      3");
        assert_eq!(lines[4], "/home     12");
    }

    #[test]
    fn test_empty_table_renders_header_only() {
        let table = TextTable::new("Empty", &["Key", "Count"]);
        assert_eq!(table.render().lines().count(), 3);
    }
}
