//! Chart specifications derived from filtered launch rows.
//!
//! These are plain data: a title plus the series a plotting front end needs.
//! Both builders are total over their inputs; an empty selection yields an
//! empty series with the usual title.

use crate::data::{Dataset, LaunchRecord};
use crate::filter::{pie_rows, scatter_rows, PayloadRange, SiteSelector};
use serde::{Deserialize, Serialize};

pub const SCATTER_X_AXIS_TITLE: &str = "Payload Mass (kg)";
pub const SCATTER_Y_AXIS_TITLE: &str = "Outcome Class";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub title: String,
    /// Column the slices were grouped by (`Launch Site` or `class`).
    pub grouped_by: String,
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    pub fn total(&self) -> u64 {
        self.slices.iter().map(|s| s.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverFields {
    pub payload_mass_kg: f64,
    pub booster_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: u8,
    pub color: String,
    pub size: f64,
    pub hover: HoverFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterChart {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    /// Distinct colour categories in first-appearance order.
    pub legend: Vec<String>,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Pie(PieChart),
    Scatter(ScatterChart),
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Pie(p) => &p.title,
            ChartSpec::Scatter(s) => &s.title,
        }
    }

    /// Slices for a pie, points for a scatter.
    pub fn len(&self) -> usize {
        match self {
            ChartSpec::Pie(p) => p.slices.len(),
            ChartSpec::Scatter(s) => s.points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn pie_title(selector: &SiteSelector) -> String {
    match selector {
        SiteSelector::AllSites => "Total Success Launches By all sites".to_string(),
        SiteSelector::Site(site) => format!("Total Success Launches for site {}", site),
    }
}

pub fn scatter_title(selector: &SiteSelector) -> String {
    match selector {
        SiteSelector::AllSites => "Payload and Outcome for all Sites".to_string(),
        SiteSelector::Site(site) => format!("Payload and Outcome for {}", site),
    }
}

/// Count rows per key, keeping keys in first-appearance order.
fn count_by<'a, F>(rows: &[&'a LaunchRecord], key: F) -> Vec<PieSlice>
where
    F: Fn(&'a LaunchRecord) -> String,
{
    let mut slices: Vec<PieSlice> = Vec::new();
    for r in rows {
        let label = key(*r);
        match slices.iter_mut().find(|s| s.label == label) {
            Some(slice) => slice.count += 1,
            None => slices.push(PieSlice { label, count: 1 }),
        }
    }
    slices
}

/// Build the pie from rows already restricted to successes (and to the site,
/// when one is selected).
///
/// For a single site the grouping is by outcome class. Since the rows are
/// already successes only, that is always one `1` slice.
pub fn build_pie(rows: &[&LaunchRecord], selector: &SiteSelector) -> PieChart {
    let (grouped_by, slices) = match selector {
        SiteSelector::AllSites => (
            crate::data::COL_LAUNCH_SITE,
            count_by(rows, |r| r.launch_site.clone()),
        ),
        SiteSelector::Site(_) => (crate::data::COL_CLASS, count_by(rows, |r| r.outcome.label())),
    };
    PieChart {
        title: pie_title(selector),
        grouped_by: grouped_by.to_string(),
        slices,
    }
}

pub fn build_scatter(rows: &[&LaunchRecord], selector: &SiteSelector) -> ScatterChart {
    let mut legend: Vec<String> = Vec::new();
    let points = rows
        .iter()
        .map(|r| {
            if !legend.iter().any(|c| c == &r.booster_version) {
                legend.push(r.booster_version.clone());
            }
            ScatterPoint {
                x: r.payload_mass_kg,
                y: r.outcome.as_u8(),
                color: r.booster_version.clone(),
                size: r.payload_mass_kg,
                hover: HoverFields {
                    payload_mass_kg: r.payload_mass_kg,
                    booster_version: r.booster_version.clone(),
                },
            }
        })
        .collect();
    ScatterChart {
        title: scatter_title(selector),
        x_axis_title: SCATTER_X_AXIS_TITLE.to_string(),
        y_axis_title: SCATTER_Y_AXIS_TITLE.to_string(),
        legend,
        points,
    }
}

/// Pie output: success launches, by site or for one site.
pub fn compute_pie_chart(dataset: &Dataset, selector: &SiteSelector) -> ChartSpec {
    let rows = dataset.rows();
    let selected = pie_rows(&rows, selector);
    ChartSpec::Pie(build_pie(&selected, selector))
}

/// Scatter output: payload against outcome within the payload window.
pub fn compute_scatter_chart(dataset: &Dataset, selector: &SiteSelector, range: &PayloadRange) -> ChartSpec {
    let rows = dataset.rows();
    let selected = scatter_rows(&rows, selector, range);
    ChartSpec::Scatter(build_scatter(&selected, selector))
}
