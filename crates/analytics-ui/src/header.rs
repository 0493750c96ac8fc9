use analytics_data::filter::SessionFilter;

/// Width of the `=` rule under the title.
pub const SEPARATOR_WIDTH: usize = 60;

/// Dashboard header rendering four lines:
///
/// 1. `WEB ANALYTICS DASHBOARD`
/// 2. A 60-column `=` separator.
/// 3. The active filter as `[ start → end | N sources ]`.
/// 4. An empty line.
pub struct Header<'a> {
    pub filter: &'a SessionFilter,
}

impl<'a> Header<'a> {
    pub fn new(filter: &'a SessionFilter) -> Self {
        Self { filter }
    }

    pub fn to_lines(&self) -> Vec<String> {
        let sources = match self.filter.sources.len() {
            1 => self.filter.sources[0].clone(),
            n => format!("{n} sources"),
        };
        vec![
            "WEB ANALYTICS DASHBOARD".to_string(),
            "=".repeat(SEPARATOR_WIDTH),
            format!(
                "[ {} → {} | {} ]",
                self.filter.start, self.filter.end, sources
            ),
            String::new(),
        ]
    }
}

/// Section heading for one dashboard tab.
pub fn tab_heading(name: &str) -> String {
    format!("── {name} {}\n", "─".repeat(SEPARATOR_WIDTH.saturating_sub(name.len() + 4)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn filter(sources: &[&str]) -> SessionFilter {
        SessionFilter::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            sources.iter().map(|s| s.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_header_has_four_lines() {
        let f = filter(&["google / organic", "google / cpc"]);
        let lines = Header::new(&f).to_lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "WEB ANALYTICS DASHBOARD");
        assert_eq!(lines[1].len(), SEPARATOR_WIDTH);
        assert_eq!(lines[2], "[ 2024-01-01 → 2024-03-31 | 2 sources ]");
        assert!(lines[3].is_empty());
    }

    #[test]
    fn test_header_names_single_source() {
        let f = filter(&["email / newsletter"]);
        let lines = Header::new(&f).to_lines();
        assert_eq!(lines[2], "[ 2024-01-01 → 2024-03-31 | email / newsletter ]");
    }

    #[test]
    fn test_tab_heading() {
        let heading = tab_heading("Overview");
        assert!(heading.starts_with("── Overview ─"));
        assert!(heading.ends_with('\n'));
    }
}
