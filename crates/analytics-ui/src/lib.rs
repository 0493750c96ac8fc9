//! Text presentation layer for the web analytics dashboard.
//!
//! Turns a [`DashboardOutcome`] into either aligned text tables, one section
//! per tab, or a JSON document for downstream tooling.

pub mod header;
pub mod table_view;
pub mod tabs;

use analytics_core::error::Result;
use analytics_core::settings::Tab;
use analytics_data::aggregator::DashboardOutcome;

pub use analytics_core as core;

use crate::header::Header;

/// Shown instead of any tab when the filter matched nothing.
pub const NO_DATA_MESSAGE: &str = "No data available for the selected filters.";

/// Render the header and the selected tab(s) as text.
pub fn render_text(outcome: &DashboardOutcome, tab: Tab) -> String {
    let (filter, dashboard) = match outcome {
        DashboardOutcome::NoData { filter } => (filter, None),
        DashboardOutcome::Ready(d) => (&d.filter, Some(d)),
    };

    let mut out = Header::new(filter).to_lines().join("\n");
    out.push('\n');

    let Some(d) = dashboard else {
        out.push_str("WARNING: ");
        out.push_str(NO_DATA_MESSAGE);
        out.push('\n');
        return out;
    };

    let sections = [
        (Tab::Overview, tabs::render_overview(&d.overview)),
        (Tab::Traffic, tabs::render_traffic(&d.traffic)),
        (Tab::Behaviour, tabs::render_behaviour(&d.behaviour)),
        (Tab::Conversion, tabs::render_conversion(&d.conversion)),
    ];
    let rendered: Vec<String> = sections
        .into_iter()
        .filter(|(t, _)| tab.includes(*t))
        .map(|(_, text)| text)
        .collect();
    out.push_str(&rendered.join("\n"));
    out
}

/// Render the outcome as pretty JSON, keeping only the selected tab's
/// aggregates unless `tab` is [`Tab::All`].
pub fn render_json(outcome: &DashboardOutcome, tab: Tab) -> Result<String> {
    let mut value = serde_json::to_value(outcome)?;

    if let (Some(obj), Some(keep)) = (value.as_object_mut(), tab_key(tab)) {
        for key in ["overview", "traffic", "behaviour", "conversion"] {
            if key != keep {
                obj.remove(key);
            }
        }
    }

    Ok(serde_json::to_string_pretty(&value)?)
}

fn tab_key(tab: Tab) -> Option<&'static str> {
    match tab {
        Tab::Overview => Some("overview"),
        Tab::Traffic => Some("traffic"),
        Tab::Behaviour => Some("behaviour"),
        Tab::Conversion => Some("conversion"),
        Tab::All => None,
    }
}
