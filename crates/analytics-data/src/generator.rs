//! Synthetic e-commerce session generator.
//!
//! Produces one [`SessionRecord`] per simulated visit over a window of
//! calendar days and writes the table as CSV with the fixed 13-column header.

use std::collections::HashSet;
use std::path::Path;

use analytics_core::error::{AnalyticsError, Result};
use analytics_core::models::{top_page_for, DeviceCategory, SessionRecord, UserType, COLUMNS};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

// ── Category tables ───────────────────────────────────────────────────────────

pub const SOURCE_WEIGHTS: [(&str, f64); 5] = [
    ("google / organic", 0.40),
    ("google / cpc", 0.25),
    ("direct / none", 0.15),
    ("facebook / referral", 0.10),
    ("email / newsletter", 0.10),
];

pub const COUNTRY_WEIGHTS: [(&str, f64); 6] = [
    ("United States", 0.40),
    ("India", 0.20),
    ("United Kingdom", 0.15),
    ("Canada", 0.10),
    ("Australia", 0.05),
    ("Germany", 0.10),
];

pub const DEVICE_WEIGHTS: [(DeviceCategory, f64); 3] = [
    (DeviceCategory::Mobile, 0.55),
    (DeviceCategory::Desktop, 0.40),
    (DeviceCategory::Tablet, 0.05),
];

const ORGANIC_SOURCE: &str = "google / organic";
const NEWSLETTER_SOURCE: &str = "email / newsletter";

pub const JOURNEYS_CONVERTED: [&str; 3] = [
    "/home > /shop > /product/shoes > /cart > /checkout",
    "/home > /product/tshirt > /cart > /checkout",
    "/google / cpc > /product/shoes > /cart > /checkout",
];

pub const JOURNEYS_ENGAGED: [&str; 4] = [
    "/home > /shop > /product/shoes",
    "/home > /blog > /shop",
    "/shop > /product/tshirt > /cart",
    "/home > /shop > /product/shoes > /product/tshirt",
];

pub const JOURNEYS_BOUNCED: [&str; 4] = ["/home", "/blog", "/product/shoes", "/shop"];

// ── Behaviour constants ───────────────────────────────────────────────────────

const RETURNING_PROBABILITY: f64 = 0.3;
const ENGAGED_PROBABILITY: f64 = 0.4;
const WEEKEND_FACTOR: f64 = 0.8;
const DAILY_STD_DEV_RATIO: f64 = 0.2;

const BASE_CONVERSION: f64 = 0.03;
const DESKTOP_BONUS: f64 = 0.02;
const NEWSLETTER_BONUS: f64 = 0.03;
const ORGANIC_BONUS: f64 = 0.01;
const RETURNING_BONUS: f64 = 0.02;

/// First user number handed out is `FIRST_USER_NUMBER + 1`.
const FIRST_USER_NUMBER: u64 = 1000;
const SESSION_ID_MIN: u32 = 100_000;
const SESSION_ID_MAX: u32 = 999_999;

// ── GeneratorConfig ───────────────────────────────────────────────────────────

/// Parameters for one generator run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Lookback window length; the run covers `days + 1` calendar days.
    pub days: u32,
    /// Mean of the daily session-count distribution.
    pub sessions_per_day_avg: f64,
    pub seed: u64,
    /// Last day of the window (inclusive).
    pub end_date: NaiveDate,
}

impl GeneratorConfig {
    pub const DEFAULT_DAYS: u32 = 90;
    pub const DEFAULT_SESSIONS_PER_DAY: f64 = 200.0;
    pub const DEFAULT_SEED: u64 = 42;

    /// Config ending today with the default seed.
    pub fn new(days: u32, sessions_per_day_avg: f64) -> Self {
        Self {
            days,
            sessions_per_day_avg,
            seed: Self::DEFAULT_SEED,
            end_date: chrono::Local::now().date_naive(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = end_date;
        self
    }

    /// First day of the window, or an error when it falls before the
    /// earliest representable date.
    pub fn start_date(&self) -> Result<NaiveDate> {
        self.end_date
            .checked_sub_signed(Duration::days(i64::from(self.days)))
            .ok_or_else(|| {
                AnalyticsError::InvalidGeneratorConfig(format!(
                    "{} days before {} is out of range",
                    self.days, self.end_date
                ))
            })
    }

    fn validate(&self) -> Result<()> {
        self.start_date()?;
        if !self.sessions_per_day_avg.is_finite() || self.sessions_per_day_avg < 0.0 {
            return Err(AnalyticsError::InvalidGeneratorConfig(format!(
                "sessions_per_day_avg must be a non-negative number, got {}",
                self.sessions_per_day_avg
            )));
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DAYS, Self::DEFAULT_SESSIONS_PER_DAY)
    }
}

// ── UserPool ──────────────────────────────────────────────────────────────────

/// Issued user identifiers; returning visitors are sampled from here.
#[derive(Debug)]
pub struct UserPool {
    issued: Vec<String>,
    last_number: u64,
}

impl UserPool {
    pub fn new() -> Self {
        Self {
            issued: Vec::new(),
            last_number: FIRST_USER_NUMBER,
        }
    }

    /// Mint a fresh identifier and remember it.
    pub fn issue(&mut self) -> String {
        self.last_number += 1;
        let id = format!("U_{}", self.last_number);
        self.issued.push(id.clone());
        id
    }

    /// Uniformly pick a previously issued identifier.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        self.issued.choose(rng).cloned()
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }
}

impl Default for UserPool {
    fn default() -> Self {
        Self::new()
    }
}

// ── SessionGenerator ──────────────────────────────────────────────────────────

/// Stateful generator; one instance per run.
pub struct SessionGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    users: UserPool,
    session_ids: HashSet<u32>,
}

impl SessionGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            rng,
            users: UserPool::new(),
            session_ids: HashSet::new(),
        })
    }

    /// Generate the full table, day by day in ascending date order.
    pub fn generate(mut self) -> Result<Vec<SessionRecord>> {
        let start = self.config.start_date()?;
        let mut records = Vec::new();

        for offset in 0..=i64::from(self.config.days) {
            let day = start + Duration::days(offset);
            let count = self.daily_session_count(day);
            debug!(%day, count, "generating sessions for day");

            for _ in 0..count {
                let record = self.generate_session(day)?;
                records.push(record);
            }
        }

        info!(
            rows = records.len(),
            users = self.users.len(),
            start = %start,
            end = %self.config.end_date,
            "session table generated"
        );
        Ok(records)
    }

    /// Normal draw around the configured mean, damped on weekends.
    fn daily_session_count(&mut self, day: NaiveDate) -> usize {
        let mean = self.config.sessions_per_day_avg;
        let sample = mean + mean * DAILY_STD_DEV_RATIO * self.standard_normal();
        let weekend = matches!(day.weekday(), Weekday::Sat | Weekday::Sun);

        let count = session_count_from_draw(sample, weekend);
        if count == 0 && sample < 0.0 {
            debug!(%day, sample, "negative daily session draw clamped to zero");
        }
        count
    }

    /// Box-Muller transform.
    fn standard_normal(&mut self) -> f64 {
        // Shift into (0, 1] so the logarithm stays finite.
        let u1: f64 = 1.0 - self.rng.random::<f64>();
        let u2: f64 = self.rng.random();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    fn generate_session(&mut self, day: NaiveDate) -> Result<SessionRecord> {
        let session_id = self.next_session_id()?;

        let returning = if self.rng.random_bool(RETURNING_PROBABILITY) {
            self.users.sample(&mut self.rng)
        } else {
            None
        };
        let (user_id, user_type) = match returning {
            Some(id) => (id, UserType::Returning),
            None => (self.users.issue(), UserType::New),
        };

        let source_medium = weighted_pick(&SOURCE_WEIGHTS, &mut self.rng)?.to_string();
        let country = weighted_pick(&COUNTRY_WEIGHTS, &mut self.rng)?.to_string();
        let device_category = weighted_pick(&DEVICE_WEIGHTS, &mut self.rng)?;

        let probability = conversion_probability(device_category, &source_medium, user_type);
        let converted = self.rng.random_bool(probability);

        let (is_engaged, journey, duration, revenue) = if converted {
            let journey = pick_journey(&JOURNEYS_CONVERTED, &mut self.rng)?;
            let duration = self.rng.random_range(120..=600);
            let revenue = (self.rng.random_range(20.0..=150.0_f64) * 100.0).round() / 100.0;
            (true, journey, duration, revenue)
        } else if self.rng.random_bool(ENGAGED_PROBABILITY) {
            let journey = pick_journey(&JOURNEYS_ENGAGED, &mut self.rng)?;
            (true, journey, self.rng.random_range(30..=300), 0.0)
        } else {
            let journey = pick_journey(&JOURNEYS_BOUNCED, &mut self.rng)?;
            (false, journey, self.rng.random_range(0..=10), 0.0)
        };

        Ok(SessionRecord {
            date: day,
            user_id,
            session_id,
            user_type,
            source_medium,
            country,
            device_category,
            is_engaged,
            converted,
            revenue,
            session_duration_seconds: duration,
            top_page: top_page_for(journey, converted),
            user_journey: journey.to_string(),
        })
    }

    /// Random six-digit session id, redrawn until unused.
    fn next_session_id(&mut self) -> Result<String> {
        let capacity = (SESSION_ID_MAX - SESSION_ID_MIN + 1) as usize;
        if self.session_ids.len() >= capacity {
            return Err(AnalyticsError::InvalidGeneratorConfig(format!(
                "more than {capacity} sessions requested; session ids exhausted"
            )));
        }
        loop {
            let n = self.rng.random_range(SESSION_ID_MIN..=SESSION_ID_MAX);
            if self.session_ids.insert(n) {
                return Ok(format!("S_{n}"));
            }
        }
    }
}

/// Truncate a daily draw to a session count, applying the weekend factor.
///
/// Negative draws clamp to zero.
pub fn session_count_from_draw(sample: f64, weekend: bool) -> usize {
    let mut count = sample.trunc() as i64;
    if weekend {
        count = (count as f64 * WEEKEND_FACTOR) as i64;
    }
    count.max(0) as usize
}

/// Conversion probability for a visit with the given attributes.
pub fn conversion_probability(device: DeviceCategory, source: &str, user_type: UserType) -> f64 {
    let mut p = BASE_CONVERSION;
    if device == DeviceCategory::Desktop {
        p += DESKTOP_BONUS;
    }
    if source == NEWSLETTER_SOURCE {
        p += NEWSLETTER_BONUS;
    }
    if source == ORGANIC_SOURCE {
        p += ORGANIC_BONUS;
    }
    if user_type == UserType::Returning {
        p += RETURNING_BONUS;
    }
    p
}

fn weighted_pick<T: Copy, R: Rng + ?Sized>(table: &[(T, f64)], rng: &mut R) -> Result<T> {
    table
        .choose_weighted(rng, |(_, weight)| *weight)
        .map(|(value, _)| *value)
        .map_err(|e| AnalyticsError::InvalidGeneratorConfig(format!("bad weight table: {e}")))
}

fn pick_journey<R: Rng + ?Sized>(templates: &[&'static str], rng: &mut R) -> Result<&'static str> {
    templates
        .choose(rng)
        .copied()
        .ok_or_else(|| AnalyticsError::InvalidGeneratorConfig("empty journey table".to_string()))
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Generate a session table in memory.
pub fn generate_sessions(config: GeneratorConfig) -> Result<Vec<SessionRecord>> {
    SessionGenerator::new(config)?.generate()
}

/// Write `records` to `path` as CSV, overwriting any existing file.
///
/// The header row is always written, even for an empty table.
pub fn write_sessions(path: &Path, records: &[SessionRecord]) -> Result<()> {
    let csv_err = |source| AnalyticsError::CsvWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;
    writer.write_record(COLUMNS).map_err(csv_err)?;
    for record in records {
        writer.serialize(record).map_err(csv_err)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = records.len(), "session table written");
    Ok(())
}

/// Generate a table and persist it to `path`. Returns the row count.
pub fn generate_to_file(config: GeneratorConfig, path: &Path) -> Result<usize> {
    let records = generate_sessions(config)?;
    write_sessions(path, &records)?;
    info!(path = %path.display(), rows = records.len(), "session table saved");
    Ok(records.len())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
