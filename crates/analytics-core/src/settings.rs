use chrono::NaiveDate;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AnalyticsError, Result};
use crate::models::parse_day;

/// File the generator writes and the dashboard reads by default.
pub const DEFAULT_DATA_FILE: &str = "web_analytics_data.csv";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Synthetic e-commerce session data and dashboard aggregates
#[derive(Parser, Debug, Clone)]
#[command(
    name = "web-analytics",
    about = "Synthetic e-commerce session data and dashboard aggregates",
    version
)]
pub struct Settings {
    #[command(subcommand)]
    pub command: Command,

    /// Logging level
    #[arg(long, global = true, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Clear saved dashboard parameters
    #[arg(long, global = true)]
    pub clear: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate a synthetic session table
    Generate(GenerateArgs),
    /// Filter the session table and print dashboard aggregates
    Dashboard(DashboardArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Lookback window in days
    #[arg(long, default_value = "90", value_parser = clap::value_parser!(u32).range(0..=3650))]
    pub days: u32,

    /// Baseline number of sessions per day
    #[arg(long = "sessions-per-day", default_value = "200")]
    pub sessions_per_day_avg: f64,

    /// Random seed
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Last day of the window (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Destination CSV file
    #[arg(long, default_value = DEFAULT_DATA_FILE)]
    pub output: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DashboardArgs {
    /// Session table to load
    #[arg(long, default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// First day to include (YYYY-MM-DD, defaults to the earliest day in the table)
    #[arg(long)]
    pub start: Option<String>,

    /// Last day to include (YYYY-MM-DD, defaults to the latest day in the table)
    #[arg(long)]
    pub end: Option<String>,

    /// Traffic source to include; repeat for several (defaults to all)
    #[arg(long = "source")]
    pub sources: Vec<String>,

    /// Dashboard tab to print
    #[arg(long, default_value = "all", value_parser = ["overview", "traffic", "behaviour", "conversion", "all"])]
    pub tab: String,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,
}

impl GenerateArgs {
    /// The explicit `--end-date`, if one was given.
    pub fn end_date(&self) -> Result<Option<NaiveDate>> {
        parse_optional_day(self.end_date.as_deref())
    }
}

impl DashboardArgs {
    pub fn start_date(&self) -> Result<Option<NaiveDate>> {
        parse_optional_day(self.start.as_deref())
    }

    pub fn end_date(&self) -> Result<Option<NaiveDate>> {
        parse_optional_day(self.end.as_deref())
    }

    pub fn tab(&self) -> Result<Tab> {
        self.tab.parse()
    }
}

fn parse_optional_day(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|v| parse_day(v).ok_or_else(|| AnalyticsError::InvalidDate(v.to_string())))
        .transpose()
}

// ── Tab ────────────────────────────────────────────────────────────────────────

/// Dashboard tab selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Traffic,
    Behaviour,
    Conversion,
    All,
}

impl Tab {
    /// Whether `other` should be printed under this selection.
    pub fn includes(self, other: Tab) -> bool {
        self == Tab::All || self == other
    }
}

impl FromStr for Tab {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "overview" => Ok(Tab::Overview),
            "traffic" => Ok(Tab::Traffic),
            "behaviour" | "behavior" => Ok(Tab::Behaviour),
            "conversion" => Ok(Tab::Conversion),
            "all" => Ok(Tab::All),
            _ => Err(AnalyticsError::UnknownTab(s.to_string())),
        }
    }
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Dashboard parameters saved to `~/.web-analytics/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab: Option<String>,
}

impl LastUsedParams {
    /// `~/.web-analytics/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// The config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".web-analytics").join("last_used.json")
    }

    /// Load persisted params; `Default` when the file is absent or unreadable.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable last-used params");
            Self::default()
        })
    }

    /// Write params via a temp file and rename, creating parent directories.
    pub fn save_to(&self, path: &Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

impl From<&DashboardArgs> for LastUsedParams {
    fn from(args: &DashboardArgs) -> Self {
        LastUsedParams {
            data_file: Some(args.data_file.clone()),
            tab: Some(args.tab.clone()),
        }
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse process arguments and merge saved dashboard parameters.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Parse `args`, fill dashboard values not given on the command line from
    /// the file at `config_path`, and persist the result. The CLI always wins.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args);
        let mut settings = Settings::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "failed to clear last-used params");
            }
            return settings;
        }

        let Command::Dashboard(args) = &mut settings.command else {
            return settings;
        };
        let Some(sub) = matches.subcommand_matches("dashboard") else {
            return settings;
        };

        let last = LastUsedParams::load_from(config_path);
        if !is_arg_explicitly_set(sub, "data_file") {
            if let Some(v) = last.data_file {
                args.data_file = v;
            }
        }
        if !is_arg_explicitly_set(sub, "tab") {
            if let Some(v) = last.tab {
                args.tab = v;
            }
        }

        if let Err(e) = LastUsedParams::from(&*args).save_to(config_path) {
            tracing::warn!(error = %e, "failed to persist last-used params");
        }

        settings
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line.
///
/// clap keys args by field name (underscores), not by the flag spelling.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn dashboard(settings: &Settings) -> &DashboardArgs {
        match &settings.command {
            Command::Dashboard(args) => args,
            other => panic!("expected dashboard command, got {other:?}"),
        }
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            data_file: Some(PathBuf::from("/data/sessions.csv")),
            tab: Some("traffic".to_string()),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.data_file, Some(PathBuf::from("/data/sessions.csv")));
        assert_eq!(loaded.tab, Some("traffic".to_string()));
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert!(LastUsedParams::load_from(&path).tab.is_none());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert!(LastUsedParams::load_from(&path).data_file.is_none());
    }

    #[test]
    fn test_generate_defaults() {
        let settings = Settings::parse_from(["web-analytics", "generate"]);
        match settings.command {
            Command::Generate(args) => {
                assert_eq!(args.days, 90);
                assert!((args.sessions_per_day_avg - 200.0).abs() < f64::EPSILON);
                assert_eq!(args.seed, 42);
                assert_eq!(args.output, PathBuf::from(DEFAULT_DATA_FILE));
                assert_eq!(args.end_date().unwrap(), None);
            }
            other => panic!("expected generate, got {other:?}"),
        }
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
    }

    #[test]
    fn test_dashboard_flags() {
        let settings = Settings::parse_from([
            "web-analytics",
            "dashboard",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-31",
            "--source",
            "google / organic",
            "--source",
            "email / newsletter",
            "--tab",
            "conversion",
        ]);
        let args = dashboard(&settings);
        assert_eq!(
            args.start_date().unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(args.end_date().unwrap(), NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(args.sources, vec!["google / organic", "email / newsletter"]);
        assert_eq!(args.tab().unwrap(), Tab::Conversion);
        assert_eq!(args.format, "text");
    }

    #[test]
    fn test_dashboard_bad_date() {
        let settings = Settings::parse_from(["web-analytics", "dashboard", "--start", "soon"]);
        let err = dashboard(&settings).start_date().unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidDate(ref s) if s == "soon"));
    }

    #[test]
    fn test_tab_parse() {
        assert_eq!("Behavior".parse::<Tab>().unwrap(), Tab::Behaviour);
        assert!(matches!(
            "funnels".parse::<Tab>(),
            Err(AnalyticsError::UnknownTab(_))
        ));
        assert!(Tab::All.includes(Tab::Traffic));
        assert!(!Tab::Overview.includes(Tab::Traffic));
    }

    #[test]
    fn test_load_with_last_used_merges_persisted_tab() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            data_file: Some(PathBuf::from("saved.csv")),
            tab: Some("behaviour".to_string()),
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["web-analytics".into(), "dashboard".into()],
            &config_path,
        );
        let args = dashboard(&settings);
        assert_eq!(args.tab, "behaviour");
        assert_eq!(args.data_file, PathBuf::from("saved.csv"));
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            data_file: None,
            tab: Some("behaviour".to_string()),
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec![
                "web-analytics".into(),
                "dashboard".into(),
                "--tab".into(),
                "traffic".into(),
            ],
            &config_path,
        );
        assert_eq!(dashboard(&settings).tab, "traffic");
        assert_eq!(
            LastUsedParams::load_from(&config_path).tab,
            Some("traffic".to_string())
        );
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            data_file: None,
            tab: Some("overview".to_string()),
        }
        .save_to(&config_path)
        .expect("save");

        Settings::load_with_last_used_impl(
            vec!["web-analytics".into(), "dashboard".into(), "--clear".into()],
            &config_path,
        );
        assert!(!config_path.exists());
    }

    #[test]
    fn test_generate_does_not_persist() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        Settings::load_with_last_used_impl(
            vec!["web-analytics".into(), "generate".into()],
            &config_path,
        );
        assert!(!config_path.exists());
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            vec!["web-analytics".into(), "generate".into(), "--debug".into()],
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.log_level, "DEBUG");
    }
}
