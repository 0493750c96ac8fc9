//! Data layer for the web analytics dashboard.
//!
//! Generates synthetic session tables, loads them from CSV (memoised per
//! file), applies the date/source filter and computes the per-tab
//! aggregates.

pub mod aggregator;
pub mod cache;
pub mod filter;
pub mod generator;
pub mod reader;

pub use analytics_core as core;

#[cfg(test)]
pub(crate) mod test_support {
    use analytics_core::models::{DeviceCategory, SessionRecord, UserType};
    use chrono::NaiveDate;

    /// An engaged mobile visit from the United States on `/home`.
    pub fn record(
        date: NaiveDate,
        user_id: &str,
        session_id: &str,
        source: &str,
        converted: bool,
    ) -> SessionRecord {
        SessionRecord {
            date,
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            user_type: UserType::New,
            source_medium: source.to_string(),
            country: "United States".to_string(),
            device_category: DeviceCategory::Mobile,
            is_engaged: true,
            converted,
            revenue: if converted { 50.0 } else { 0.0 },
            session_duration_seconds: 60,
            user_journey: "/home".to_string(),
            top_page: "/home".to_string(),
        }
    }
}
