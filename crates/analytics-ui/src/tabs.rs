//! Text renderers for the four dashboard tabs.

use analytics_core::formatting::{
    format_count, format_currency, format_rate, format_seconds, rate_percent,
};
use analytics_data::aggregator::{
    BehaviourMetrics, ConversionMetrics, GroupCount, OverviewMetrics, TrafficMetrics,
};

use crate::header::tab_heading;
use crate::table_view::TextTable;

pub fn render_overview(m: &OverviewMetrics) -> String {
    let mut metrics = TextTable::new("Key Metrics", &["Metric", "Value"]);
    metrics.push_row(vec!["Total Users".into(), format_count(m.total_users)]);
    metrics.push_row(vec!["Sessions".into(), format_count(m.total_sessions)]);
    metrics.push_row(vec!["Conversions".into(), format_count(m.conversions)]);
    metrics.push_row(vec!["Engagement Rate".into(), format_rate(m.engagement_rate)]);
    metrics.push_row(vec!["Revenue".into(), format_currency(m.total_revenue)]);

    let mut daily = TextTable::new("Daily Sessions Trend", &["Date", "Sessions"]);
    for day in &m.daily_sessions {
        daily.push_row(vec![day.date.to_string(), format_count(day.sessions)]);
    }

    section("Overview", &[metrics, daily])
}

pub fn render_traffic(m: &TrafficMetrics) -> String {
    let sources = counts_table("Users by Source/Medium", "Source/Medium", "Users", &m.users_by_source);
    let user_types = share_table("New vs Returning Users", "User Type", "Users", &m.users_by_user_type);
    let countries = counts_table("Top Countries by Users", "Country", "Users", &m.users_by_country);

    section("Traffic Analysis", &[sources, user_types, countries])
}

pub fn render_behaviour(m: &BehaviourMetrics) -> String {
    let pages = counts_table("Top Pages", "Page", "Pageviews", &m.top_pages);

    let mut devices = TextTable::new(
        "Device Category Performance",
        &["Device", "Sessions", "Avg Duration"],
    );
    for d in &m.device_performance {
        devices.push_row(vec![
            d.device.clone(),
            format_count(d.sessions),
            format_seconds(d.avg_duration_seconds),
        ]);
    }

    let journeys = counts_table("User Journey (Path)", "Path", "Frequency", &m.journeys);

    section("Behaviour Analysis", &[pages, devices, journeys])
}

pub fn render_conversion(m: &ConversionMetrics) -> String {
    let channels = counts_table(
        "Conversions by Channel",
        "Source/Medium",
        "Conversions",
        &m.conversions_by_source,
    );
    let devices = share_table(
        "Conversions by Device",
        "Device",
        "Conversions",
        &m.conversions_by_device,
    );

    let mut trend = TextTable::new(
        "Conversion Rate Trend",
        &["Date", "Sessions", "Conversions", "Conversion Rate (%)"],
    );
    for day in &m.daily_conversion {
        trend.push_row(vec![
            day.date.to_string(),
            format_count(day.sessions),
            format_count(day.conversions),
            format_rate(day.conversion_rate),
        ]);
    }

    section("Conversion Analysis", &[channels, devices, trend])
}

fn counts_table(title: &str, key: &str, value: &str, groups: &[GroupCount]) -> TextTable {
    let mut table = TextTable::new(title, &[key, value]);
    for g in groups {
        table.push_row(vec![g.key.clone(), format_count(g.count)]);
    }
    table
}

/// Counts plus each group's share of the total, as a pie chart would show.
fn share_table(title: &str, key: &str, value: &str, groups: &[GroupCount]) -> TextTable {
    let total: u64 = groups.iter().map(|g| g.count).sum();
    let mut table = TextTable::new(title, &[key, value, "Share"]);
    for g in groups {
        table.push_row(vec![
            g.key.clone(),
            format_count(g.count),
            format_rate(rate_percent(g.count, total)),
        ]);
    }
    table
}

fn section(name: &str, tables: &[TextTable]) -> String {
    let mut out = tab_heading(name);
    for table in tables {
        out.push('\n');
        out.push_str(&table.render());
    }
    out
}
