//! Sidebar filters: inclusive date range plus a set of traffic sources.

use std::collections::HashSet;

use analytics_core::error::{AnalyticsError, Result};
use analytics_core::models::SessionRecord;
use chrono::NaiveDate;
use serde::Serialize;

/// Selection applied to a session table before aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionFilter {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub sources: Vec<String>,
}

impl SessionFilter {
    /// Build a filter, rejecting a start date after the end date.
    pub fn new(start: NaiveDate, end: NaiveDate, sources: Vec<String>) -> Result<Self> {
        if start > end {
            return Err(AnalyticsError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self {
            start,
            end,
            sources,
        })
    }

    /// Every day and every source present in `records`, or `None` for an
    /// empty table.
    pub fn full_span(records: &[SessionRecord]) -> Option<Self> {
        let (start, end) = date_span(records)?;
        Some(Self {
            start,
            end,
            sources: source_options(records),
        })
    }

    /// Fill unset selections from the table itself: bounds default to the
    /// table's span and an empty source list selects every source.
    ///
    /// A single explicit bound that lies past the opposite end of the span
    /// collapses the range onto that bound, so it selects no rows instead of
    /// failing. Two explicit bounds out of order are still rejected. An empty
    /// table with no bounds spans today only.
    pub fn resolve(
        records: &[SessionRecord],
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        sources: Vec<String>,
    ) -> Result<Self> {
        let (first, last) = date_span(records).unwrap_or_else(|| {
            let day = start
                .or(end)
                .unwrap_or_else(|| chrono::Local::now().date_naive());
            (day, day)
        });

        let (start, end) = match (start, end) {
            (Some(s), Some(e)) => (s, e),
            (Some(s), None) => (s, last.max(s)),
            (None, Some(e)) => (first.min(e), e),
            (None, None) => (first, last),
        };
        let sources = if sources.is_empty() {
            source_options(records)
        } else {
            sources
        };
        Self::new(start, end, sources)
    }

    pub fn matches(&self, record: &SessionRecord) -> bool {
        record.date >= self.start
            && record.date <= self.end
            && self.sources.iter().any(|s| *s == record.source_medium)
    }

    /// Rows that pass the filter, in table order.
    pub fn apply<'a>(&self, records: &'a [SessionRecord]) -> Vec<&'a SessionRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Earliest and latest day in the table.
pub fn date_span(records: &[SessionRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let min = records.iter().map(|r| r.date).min()?;
    let max = records.iter().map(|r| r.date).max()?;
    Some((min, max))
}

/// Distinct `Source_Medium` values in order of first appearance.
pub fn source_options(records: &[SessionRecord]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.source_medium.as_str()))
        .map(|r| r.source_medium.clone())
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
