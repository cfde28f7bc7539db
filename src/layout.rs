//! Description of the dashboard page: heading, controls and chart slots.
//!
//! The server hands this to the browser; the page builds its widgets from it.

use crate::data::Dataset;
use crate::filter::ALL_SITES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DASHBOARD_TITLE: &str = "SpaceX Launch Records Dashboard";
pub const SITE_DROPDOWN_ID: &str = "site_dropdown";
pub const PAYLOAD_SLIDER_ID: &str = "payload_slider";
pub const PIE_CHART_ID: &str = "success-pie-chart";
pub const SCATTER_CHART_ID: &str = "success-payload-scatter-chart";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

/// Ordered dropdown entries: "All Sites" first, then each site.
pub fn site_options(dataset: &Dataset) -> Vec<DropdownOption> {
    std::iter::once(ALL_SITES.to_string())
        .chain(dataset.sites().iter().cloned())
        .map(|s| DropdownOption {
            label: s.clone(),
            value: s,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropdownSpec {
    pub id: String,
    pub options: Vec<DropdownOption>,
    pub value: String,
    pub placeholder: String,
    pub searchable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSliderSpec {
    pub id: String,
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Tick position (kg) to label.
    pub marks: BTreeMap<u64, String>,
    pub value: [f64; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardLayout {
    pub title: String,
    pub site_dropdown: DropdownSpec,
    pub pie_chart_id: String,
    pub payload_slider: RangeSliderSpec,
    pub scatter_chart_id: String,
}

impl DashboardLayout {
    pub fn build(dataset: &Dataset, step_kg: f64, mark_kg: f64) -> Self {
        let (min, max) = dataset.payload_bounds();
        Self {
            title: DASHBOARD_TITLE.to_string(),
            site_dropdown: DropdownSpec {
                id: SITE_DROPDOWN_ID.to_string(),
                options: site_options(dataset),
                value: ALL_SITES.to_string(),
                placeholder: "Select a Launch Site here".to_string(),
                searchable: true,
            },
            pie_chart_id: PIE_CHART_ID.to_string(),
            payload_slider: RangeSliderSpec {
                id: PAYLOAD_SLIDER_ID.to_string(),
                label: "Payload range (Kg):".to_string(),
                min,
                max,
                step: step_kg,
                marks: slider_marks(min, max, mark_kg),
                value: [min, max],
            },
            scatter_chart_id: SCATTER_CHART_ID.to_string(),
        }
    }
}

pub const MAX_SLIDER_MARKS: usize = 200;

/// Labels at every multiple of `every_kg` inside `[min, max]`, at most
/// [`MAX_SLIDER_MARKS`] of them. Spacing must be a whole number of kilograms.
pub fn slider_marks(min: f64, max: f64, every_kg: f64) -> BTreeMap<u64, String> {
    if !is_whole_kg(every_kg) || !min.is_finite() || !max.is_finite() || max < min || max < 0.0 {
        return BTreeMap::new();
    }
    let every = every_kg as u64;
    let first = (min.max(0.0).ceil() as u64).div_ceil(every) * every;
    let last = max.floor() as u64;
    if first > last {
        return BTreeMap::new();
    }
    (first..=last)
        .step_by(every as usize)
        .take(MAX_SLIDER_MARKS)
        .map(|kg| (kg, format!("{} kg", kg)))
        .collect()
}

/// Finite, at least 1 and without a fractional part.
pub fn is_whole_kg(kg: f64) -> bool {
    kg.is_finite() && kg >= 1.0 && kg.fract() == 0.0
}
