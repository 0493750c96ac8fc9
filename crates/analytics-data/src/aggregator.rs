//! Dashboard aggregates over a filtered session table.
//!
//! One struct per dashboard tab. [`DashboardAggregator::build`] applies a
//! [`SessionFilter`] and either reports [`DashboardOutcome::NoData`] or
//! computes all four tabs.

use std::collections::{BTreeMap, HashSet};

use analytics_core::formatting::rate_percent;
use analytics_core::models::SessionRecord;
use chrono::NaiveDate;
use serde::Serialize;

use crate::filter::SessionFilter;

// ── Result types ──────────────────────────────────────────────────────────────

/// A group key with its count (distinct users, sessions, or a sum).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: String,
    pub count: u64,
}

impl GroupCount {
    fn new(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySessions {
    pub date: NaiveDate,
    pub sessions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewMetrics {
    pub total_users: u64,
    pub total_sessions: u64,
    pub conversions: u64,
    /// Engaged sessions over distinct sessions, 0-100.
    pub engagement_rate: f64,
    pub total_revenue: f64,
    /// Distinct sessions per day, ascending by date.
    pub daily_sessions: Vec<DailySessions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrafficMetrics {
    /// Distinct users per source, ascending by count.
    pub users_by_source: Vec<GroupCount>,
    /// Distinct users per user type, in key order.
    pub users_by_user_type: Vec<GroupCount>,
    /// Distinct users per country, descending by count.
    pub users_by_country: Vec<GroupCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DevicePerformance {
    pub device: String,
    pub sessions: u64,
    pub avg_duration_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BehaviourMetrics {
    /// `Top_Page` frequencies, descending.
    pub top_pages: Vec<GroupCount>,
    pub device_performance: Vec<DevicePerformance>,
    /// Full journey frequencies, descending.
    pub journeys: Vec<GroupCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyConversion {
    pub date: NaiveDate,
    pub sessions: u64,
    pub conversions: u64,
    /// Conversions over sessions, 0-100; 0 when there were no sessions.
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionMetrics {
    /// Conversions per source, ascending by count.
    pub conversions_by_source: Vec<GroupCount>,
    /// Conversions per device, in key order.
    pub conversions_by_device: Vec<GroupCount>,
    pub daily_conversion: Vec<DailyConversion>,
}

/// All four tabs computed for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub filter: SessionFilter,
    /// Rows that passed the filter.
    pub rows: usize,
    pub overview: OverviewMetrics,
    pub traffic: TrafficMetrics,
    pub behaviour: BehaviourMetrics,
    pub conversion: ConversionMetrics,
}

/// Result of one render cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardOutcome {
    /// The filter matched no rows; nothing was aggregated.
    NoData { filter: SessionFilter },
    Ready(Box<Dashboard>),
}

impl DashboardOutcome {
    pub fn is_no_data(&self) -> bool {
        matches!(self, DashboardOutcome::NoData { .. })
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        match self {
            DashboardOutcome::Ready(d) => Some(d),
            DashboardOutcome::NoData { .. } => None,
        }
    }
}

// ── DashboardAggregator ───────────────────────────────────────────────────────

/// Stateless helper computing per-tab aggregates.
pub struct DashboardAggregator;

impl DashboardAggregator {
    /// Filter `records` and compute every tab, or report no data.
    pub fn build(records: &[SessionRecord], filter: &SessionFilter) -> DashboardOutcome {
        let rows = filter.apply(records);
        if rows.is_empty() {
            tracing::info!(
                start = %filter.start,
                end = %filter.end,
                sources = filter.sources.len(),
                "no rows match the selected filters"
            );
            return DashboardOutcome::NoData {
                filter: filter.clone(),
            };
        }

        tracing::debug!(rows = rows.len(), total = records.len(), "filter applied");

        DashboardOutcome::Ready(Box::new(Dashboard {
            filter: filter.clone(),
            rows: rows.len(),
            overview: Self::overview(&rows),
            traffic: Self::traffic(&rows),
            behaviour: Self::behaviour(&rows),
            conversion: Self::conversion(&rows),
        }))
    }

    pub fn overview(rows: &[&SessionRecord]) -> OverviewMetrics {
        let users: HashSet<&str> = rows.iter().map(|r| r.user_id.as_str()).collect();
        let sessions: HashSet<&str> = rows.iter().map(|r| r.session_id.as_str()).collect();
        let conversions = rows.iter().filter(|r| r.converted).count() as u64;
        let engaged = rows.iter().filter(|r| r.is_engaged).count() as u64;
        let total_revenue: f64 = rows.iter().map(|r| r.revenue).sum();

        let daily_sessions = Self::per_day(rows)
            .into_iter()
            .map(|(date, day)| DailySessions {
                date,
                sessions: day.sessions.len() as u64,
            })
            .collect();

        OverviewMetrics {
            total_users: users.len() as u64,
            total_sessions: sessions.len() as u64,
            conversions,
            engagement_rate: rate_percent(engaged, sessions.len() as u64),
            total_revenue,
            daily_sessions,
        }
    }

    pub fn traffic(rows: &[&SessionRecord]) -> TrafficMetrics {
        let mut users_by_source = distinct_users_by(rows, |r| r.source_medium.clone());
        users_by_source.sort_by_key(|g| g.count);

        let users_by_user_type = distinct_users_by(rows, |r| r.user_type.to_string());

        let mut users_by_country = distinct_users_by(rows, |r| r.country.clone());
        users_by_country.sort_by(|a, b| b.count.cmp(&a.count));

        TrafficMetrics {
            users_by_source,
            users_by_user_type,
            users_by_country,
        }
    }

    pub fn behaviour(rows: &[&SessionRecord]) -> BehaviourMetrics {
        let mut devices: BTreeMap<String, (HashSet<&str>, u64, u64)> = BTreeMap::new();
        for r in rows {
            let slot = devices.entry(r.device_category.to_string()).or_default();
            slot.0.insert(r.session_id.as_str());
            slot.1 += u64::from(r.session_duration_seconds);
            slot.2 += 1;
        }

        let device_performance = devices
            .into_iter()
            .map(|(device, (sessions, duration_sum, rows))| DevicePerformance {
                device,
                sessions: sessions.len() as u64,
                avg_duration_seconds: duration_sum as f64 / rows as f64,
            })
            .collect();

        BehaviourMetrics {
            top_pages: value_counts(rows, |r| r.top_page.as_str()),
            device_performance,
            journeys: value_counts(rows, |r| r.user_journey.as_str()),
        }
    }

    pub fn conversion(rows: &[&SessionRecord]) -> ConversionMetrics {
        let mut conversions_by_source = conversions_by(rows, |r| r.source_medium.clone());
        conversions_by_source.sort_by_key(|g| g.count);

        let conversions_by_device = conversions_by(rows, |r| r.device_category.to_string());

        let daily_conversion = Self::per_day(rows)
            .into_iter()
            .map(|(date, day)| {
                let sessions = day.sessions.len() as u64;
                DailyConversion {
                    date,
                    sessions,
                    conversions: day.conversions,
                    conversion_rate: rate_percent(day.conversions, sessions),
                }
            })
            .collect();

        ConversionMetrics {
            conversions_by_source,
            conversions_by_device,
            daily_conversion,
        }
    }

    fn per_day<'a>(rows: &[&'a SessionRecord]) -> BTreeMap<NaiveDate, DayBucket<'a>> {
        let mut days: BTreeMap<NaiveDate, DayBucket<'a>> = BTreeMap::new();
        for &r in rows {
            let day = days.entry(r.date).or_default();
            day.sessions.insert(r.session_id.as_str());
            day.conversions += u64::from(r.converted);
        }
        days
    }
}

#[derive(Default)]
struct DayBucket<'a> {
    sessions: HashSet<&'a str>,
    conversions: u64,
}

// ── Grouping helpers ──────────────────────────────────────────────────────────

/// Distinct `User_ID`s per key, in ascending key order.
fn distinct_users_by<F>(rows: &[&SessionRecord], key_fn: F) -> Vec<GroupCount>
where
    F: Fn(&SessionRecord) -> String,
{
    let mut groups: BTreeMap<String, HashSet<&str>> = BTreeMap::new();
    for r in rows {
        groups.entry(key_fn(r)).or_default().insert(r.user_id.as_str());
    }
    groups
        .into_iter()
        .map(|(key, users)| GroupCount::new(key, users.len() as u64))
        .collect()
}

/// Sum of `Converted` per key, in ascending key order.
fn conversions_by<F>(rows: &[&SessionRecord], key_fn: F) -> Vec<GroupCount>
where
    F: Fn(&SessionRecord) -> String,
{
    let mut groups: BTreeMap<String, u64> = BTreeMap::new();
    for r in rows {
        *groups.entry(key_fn(r)).or_default() += u64::from(r.converted);
    }
    groups
        .into_iter()
        .map(|(key, count)| GroupCount::new(key, count))
        .collect()
}

/// Frequency of each value, descending; ties keep ascending key order.
fn value_counts<'a, F>(rows: &[&'a SessionRecord], key_fn: F) -> Vec<GroupCount>
where
    F: Fn(&'a SessionRecord) -> &'a str,
{
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for &r in rows {
        *counts.entry(key_fn(r)).or_default() += 1;
    }
    let mut out: Vec<GroupCount> = counts
        .into_iter()
        .map(|(key, count)| GroupCount::new(key, count))
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
