//! Launch dataset: CSV loading, schema checks and the derived site catalog.
//!
//! The dataset is loaded once and shared read-only for the lifetime of the
//! process. Every consumer borrows it; nothing mutates a row after load.

use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const COL_LAUNCH_SITE: &str = "Launch Site";
pub const COL_PAYLOAD_MASS: &str = "Payload Mass (kg)";
pub const COL_BOOSTER_VERSION: &str = "Booster Version";
pub const COL_CLASS: &str = "class";

pub const REQUIRED_COLUMNS: [&str; 4] = [
    COL_LAUNCH_SITE,
    COL_PAYLOAD_MASS,
    COL_BOOSTER_VERSION,
    COL_CLASS,
];

/// Binary launch outcome, serialized as `0` / `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OutcomeClass {
    Failure = 0,
    Success = 1,
}

impl OutcomeClass {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> String {
        self.as_u8().to_string()
    }

    /// Accepts the integral forms a spreadsheet export produces (`1`, `1.0`).
    pub fn from_value(raw: f64) -> Result<Self, String> {
        if raw == 0.0 {
            Ok(OutcomeClass::Failure)
        } else if raw == 1.0 {
            Ok(OutcomeClass::Success)
        } else {
            Err(format!("class must be 0 or 1, got {}", raw))
        }
    }
}

impl From<OutcomeClass> for u8 {
    fn from(class: OutcomeClass) -> u8 {
        class.as_u8()
    }
}

impl TryFrom<u8> for OutcomeClass {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::from_value(raw as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchRecord {
    pub launch_site: String,
    pub payload_mass_kg: f64,
    pub booster_version: String,
    pub outcome: OutcomeClass,
}

impl LaunchRecord {
    pub fn is_success(&self) -> bool {
        self.outcome == OutcomeClass::Success
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Launch Site")]
    launch_site: String,
    #[serde(rename = "Payload Mass (kg)")]
    payload_mass_kg: f64,
    #[serde(rename = "Booster Version")]
    booster_version: String,
    #[serde(rename = "class")]
    class: f64,
}

impl CsvRow {
    fn into_record(self) -> Result<LaunchRecord, String> {
        if !self.payload_mass_kg.is_finite() || self.payload_mass_kg < 0.0 {
            return Err(format!(
                "payload mass must be a non-negative number, got {}",
                self.payload_mass_kg
            ));
        }
        Ok(LaunchRecord {
            launch_site: self.launch_site,
            payload_mass_kg: self.payload_mass_kg,
            booster_version: self.booster_version,
            outcome: OutcomeClass::from_value(self.class)?,
        })
    }
}

/// Immutable in-memory launch table plus the catalogs derived from it.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: String,
    hash_sha256: Option<String>,
    columns: Vec<String>,
    records: Vec<LaunchRecord>,
    sites: Vec<String>,
    payload_min: f64,
    payload_max: f64,
}

impl Dataset {
    pub fn from_records(source: impl Into<String>, records: Vec<LaunchRecord>) -> Self {
        let mut sites: Vec<String> = Vec::new();
        for r in &records {
            if !sites.iter().any(|s| s == &r.launch_site) {
                sites.push(r.launch_site.clone());
            }
        }
        let (payload_min, payload_max) = if records.is_empty() {
            (0.0, 0.0)
        } else {
            records.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                (lo.min(r.payload_mass_kg), hi.max(r.payload_mass_kg))
            })
        };
        Self {
            source: source.into(),
            hash_sha256: None,
            columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            records,
            sites,
            payload_min,
            payload_max,
        }
    }

    /// Load the launch table from a CSV file. Any failure here is fatal for startup.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("cannot open dataset {}", path.display()))?;

        let columns: Vec<String> = reader
            .headers()
            .with_context(|| format!("cannot read header of {}", path.display()))?
            .iter()
            .map(|h| h.to_string())
            .collect();
        let missing = missing_columns(&columns);
        if !missing.is_empty() {
            bail!(
                "dataset {} is missing required columns: {}",
                path.display(),
                missing.join(", ")
            );
        }

        let mut records = Vec::new();
        for (idx, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row_no = idx + 1;
            let row = row.with_context(|| format!("{}: bad data row {}", path.display(), row_no))?;
            let record = row
                .into_record()
                .map_err(|e| anyhow!("{}: bad data row {}: {}", path.display(), row_no, e))?;
            records.push(record);
        }

        let hash = file_sha256(path).map_err(|e| anyhow!("cannot hash {}: {}", path.display(), e))?;
        let mut dataset = Self::from_records(path.display().to_string(), records);
        dataset.hash_sha256 = Some(hash);
        dataset.columns = columns;
        Ok(dataset)
    }

    pub fn records(&self) -> &[LaunchRecord] {
        &self.records
    }

    /// Borrowed view of every row, the starting point for the filter functions.
    pub fn rows(&self) -> Vec<&LaunchRecord> {
        self.records.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct launch sites in order of first appearance.
    pub fn sites(&self) -> &[String] {
        &self.sites
    }

    /// Observed `(min, max)` payload mass; `(0, 0)` for an empty table.
    pub fn payload_bounds(&self) -> (f64, f64) {
        (self.payload_min, self.payload_max)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn manifest(&self) -> DatasetManifest {
        DatasetManifest {
            path: self.source.clone(),
            hash_sha256: self.hash_sha256.clone(),
            row_count: self.records.len() as u64,
            success_count: self.records.iter().filter(|r| r.is_success()).count() as u64,
            columns: self.columns.clone(),
            sites: self.sites.clone(),
            payload_min: self.payload_min,
            payload_max: self.payload_max,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub path: String,
    pub hash_sha256: Option<String>,
    pub row_count: u64,
    pub success_count: u64,
    pub columns: Vec<String>,
    pub sites: Vec<String>,
    pub payload_min: f64,
    pub payload_max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaReport {
    pub columns: Vec<String>,
    pub required: Vec<String>,
    pub missing: Vec<String>,
    pub ok: bool,
    pub message: String,
}

pub fn missing_columns(columns: &[String]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|req| !columns.iter().any(|c| c == *req))
        .map(|req| req.to_string())
        .collect()
}

pub fn validate_schema(path: &Path) -> Result<SchemaReport, String> {
    let columns = read_header(path)?;
    let missing = missing_columns(&columns);
    let ok = missing.is_empty();
    let message = if ok {
        "schema ok".to_string()
    } else {
        format!("missing required columns: {:?}", missing)
    };
    Ok(SchemaReport {
        columns,
        required: REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect(),
        missing,
        ok,
        message,
    })
}

pub fn read_header(path: &Path) -> Result<Vec<String>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| e.to_string())?;
    let header = reader.headers().map_err(|e| e.to_string())?;
    Ok(header.iter().map(|h| h.to_string()).collect())
}

pub fn file_sha256(path: &Path) -> Result<String, String> {
    let mut file = File::open(path).map_err(|e| e.to_string())?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(|e| e.to_string())?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
