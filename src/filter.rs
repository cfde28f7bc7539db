//! Row selection over borrowed launch records.
//!
//! Every function takes a slice of references and returns a new vector of
//! references; the dataset itself is never touched.

use crate::data::LaunchRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const ALL_SITES: &str = "All Sites";

/// Dropdown value: the "All Sites" sentinel or one launch site label.
///
/// A site that is not in the catalog is still a valid selector; it simply
/// matches no rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SiteSelector {
    #[default]
    AllSites,
    Site(String),
}

impl SiteSelector {
    pub fn parse(raw: &str) -> Self {
        if raw == ALL_SITES {
            SiteSelector::AllSites
        } else {
            SiteSelector::Site(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SiteSelector::AllSites => ALL_SITES,
            SiteSelector::Site(site) => site,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, SiteSelector::AllSites)
    }
}

impl From<String> for SiteSelector {
    fn from(raw: String) -> Self {
        if raw == ALL_SITES {
            SiteSelector::AllSites
        } else {
            SiteSelector::Site(raw)
        }
    }
}

impl From<SiteSelector> for String {
    fn from(sel: SiteSelector) -> String {
        match sel {
            SiteSelector::AllSites => ALL_SITES.to_string(),
            SiteSelector::Site(site) => site,
        }
    }
}

impl fmt::Display for SiteSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive payload window `[low, high]` in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct PayloadRange {
    low: f64,
    high: f64,
}

impl PayloadRange {
    pub fn new(low: f64, high: f64) -> Result<Self, String> {
        if !low.is_finite() || !high.is_finite() {
            return Err(format!("payload range must be finite, got [{}, {}]", low, high));
        }
        if low < 0.0 {
            return Err(format!("payload range low must be >= 0, got {}", low));
        }
        if low > high {
            return Err(format!("payload range low {} exceeds high {}", low, high));
        }
        Ok(Self { low, high })
    }

    /// Like [`PayloadRange::new`] but forces the bounds into shape instead of failing.
    pub fn clamped(low: f64, high: f64) -> Self {
        let low = if low.is_finite() { low.max(0.0) } else { 0.0 };
        let high = if high.is_finite() { high.max(low) } else { low };
        Self { low, high }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn contains(&self, payload_kg: f64) -> bool {
        self.low <= payload_kg && payload_kg <= self.high
    }
}

impl TryFrom<[f64; 2]> for PayloadRange {
    type Error = String;

    fn try_from(pair: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(pair[0], pair[1])
    }
}

impl From<PayloadRange> for [f64; 2] {
    fn from(range: PayloadRange) -> [f64; 2] {
        [range.low, range.high]
    }
}

pub fn filter_by_site<'a>(rows: &[&'a LaunchRecord], selector: &SiteSelector) -> Vec<&'a LaunchRecord> {
    match selector {
        SiteSelector::AllSites => rows.to_vec(),
        SiteSelector::Site(site) => rows
            .iter()
            .copied()
            .filter(|r| &r.launch_site == site)
            .collect(),
    }
}

pub fn filter_by_payload_range<'a>(rows: &[&'a LaunchRecord], range: &PayloadRange) -> Vec<&'a LaunchRecord> {
    rows.iter()
        .copied()
        .filter(|r| range.contains(r.payload_mass_kg))
        .collect()
}

pub fn filter_by_success<'a>(rows: &[&'a LaunchRecord]) -> Vec<&'a LaunchRecord> {
    rows.iter().copied().filter(|r| r.is_success()).collect()
}

/// Rows feeding the pie chart: successes first, then the site.
pub fn pie_rows<'a>(rows: &[&'a LaunchRecord], selector: &SiteSelector) -> Vec<&'a LaunchRecord> {
    let successes = filter_by_success(rows);
    filter_by_site(&successes, selector)
}

/// Rows feeding the scatter chart: payload window first, then the site.
pub fn scatter_rows<'a>(
    rows: &[&'a LaunchRecord],
    selector: &SiteSelector,
    range: &PayloadRange,
) -> Vec<&'a LaunchRecord> {
    let in_range = filter_by_payload_range(rows, range);
    filter_by_site(&in_range, selector)
}
