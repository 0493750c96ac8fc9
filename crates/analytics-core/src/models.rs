use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Separator placed between page tokens in a `User_Journey` string.
pub const JOURNEY_SEPARATOR: &str = " > ";

/// CSV header, in the order every session table is written.
pub const COLUMNS: [&str; 13] = [
    "Date",
    "User_ID",
    "Session_ID",
    "User_Type",
    "Source_Medium",
    "Country",
    "Device_Category",
    "Is_Engaged",
    "Converted",
    "Revenue",
    "Session_Duration_Seconds",
    "User_Journey",
    "Top_Page",
];

/// Whether the visitor had been seen before this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UserType {
    New,
    Returning,
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserType::New => f.write_str("New"),
            UserType::Returning => f.write_str("Returning"),
        }
    }
}

/// Device class the session was recorded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeviceCategory {
    Mobile,
    Desktop,
    Tablet,
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceCategory::Mobile => f.write_str("Mobile"),
            DeviceCategory::Desktop => f.write_str("Desktop"),
            DeviceCategory::Tablet => f.write_str("Tablet"),
        }
    }
}

/// One simulated user visit: a single row of the session table.
///
/// Field names map onto the CSV header listed in [`COLUMNS`]; booleans are
/// written as `0`/`1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "Date", deserialize_with = "deserialize_day")]
    pub date: NaiveDate,
    #[serde(rename = "User_ID")]
    pub user_id: String,
    #[serde(rename = "Session_ID")]
    pub session_id: String,
    #[serde(rename = "User_Type")]
    pub user_type: UserType,
    #[serde(rename = "Source_Medium")]
    pub source_medium: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Device_Category")]
    pub device_category: DeviceCategory,
    #[serde(
        rename = "Is_Engaged",
        serialize_with = "serialize_flag",
        deserialize_with = "deserialize_flag"
    )]
    pub is_engaged: bool,
    #[serde(
        rename = "Converted",
        serialize_with = "serialize_flag",
        deserialize_with = "deserialize_flag"
    )]
    pub converted: bool,
    #[serde(rename = "Revenue")]
    pub revenue: f64,
    #[serde(rename = "Session_Duration_Seconds")]
    pub session_duration_seconds: u32,
    #[serde(rename = "User_Journey")]
    pub user_journey: String,
    #[serde(rename = "Top_Page")]
    pub top_page: String,
}

/// Derive the `Top_Page` token from a journey string.
///
/// Non-converted sessions use the last step. Converted sessions use the
/// second-to-last step so the checkout terminal is excluded; single-step
/// journeys fall back to their only step.
pub fn top_page_for(journey: &str, converted: bool) -> String {
    let steps: Vec<&str> = journey.split(JOURNEY_SEPARATOR).collect();
    let idx = if converted && steps.len() >= 2 {
        steps.len() - 2
    } else {
        steps.len() - 1
    };
    steps[idx].to_string()
}

/// Parse a calendar day, ignoring any time-of-day suffix.
///
/// Accepts `2024-01-15`, `2024-01-15 08:30:00` and `2024-01-15T08:30:00`.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn deserialize_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_day(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
}

fn serialize_flag<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid flag: {other}"))),
    }
}
