mod site;

pub use site::{LaunchSite, SiteSelection, UnknownSite, ALL_SITES};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const REQUIRED_COLUMNS: [&str; 5] = [
    "Flight Number",
    "Launch Site",
    "Payload Mass (kg)",
    "class",
    "Booster Version Category",
];

/// Binary launch outcome, stored as `class` in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Outcome {
    Failure = 0,
    Success = 1,
}

impl Outcome {
    pub fn from_class(class: u8) -> Option<Self> {
        match class {
            0 => Some(Outcome::Failure),
            1 => Some(Outcome::Success),
            _ => None,
        }
    }

    pub fn class(&self) -> u8 {
        *self as u8
    }

    /// Slice label, matching the raw column value.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Failure => "0",
            Outcome::Success => "1",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRecord {
    pub flight_number: u32,
    pub launch_site: LaunchSite,
    pub payload_mass_kg: f64,
    pub outcome: Outcome,
    pub booster_version_category: String,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Flight Number")]
    flight_number: u32,
    #[serde(rename = "Launch Site")]
    launch_site: String,
    #[serde(rename = "Payload Mass (kg)")]
    payload_mass_kg: f64,
    #[serde(rename = "class")]
    class: u8,
    #[serde(rename = "Booster Version Category")]
    booster_version_category: String,
}

impl TryFrom<CsvRow> for LaunchRecord {
    type Error = anyhow::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let launch_site = row.launch_site.parse::<LaunchSite>()?;
        let outcome = Outcome::from_class(row.class)
            .ok_or_else(|| anyhow!("class must be 0 or 1, got {}", row.class))?;
        if !row.payload_mass_kg.is_finite() || row.payload_mass_kg < 0.0 {
            bail!("payload mass must be a non-negative number, got {}", row.payload_mass_kg);
        }
        Ok(LaunchRecord {
            flight_number: row.flight_number,
            launch_site,
            payload_mass_kg: row.payload_mass_kg,
            outcome,
            booster_version_category: row.booster_version_category.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaReport {
    pub columns: Vec<String>,
    pub missing: Vec<String>,
    pub ok: bool,
    pub message: String,
}

impl SchemaReport {
    pub fn from_header(columns: Vec<String>) -> Self {
        let missing = REQUIRED_COLUMNS
            .iter()
            .filter(|req| !columns.iter().any(|c| c == *req))
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        let ok = missing.is_empty();
        let message = if ok {
            "schema ok".to_string()
        } else {
            format!("schema mismatch: missing {:?} in {:?}", missing, columns)
        };
        SchemaReport { columns, missing, ok, message }
    }
}

pub fn validate_schema(path: &Path) -> Result<SchemaReport> {
    Ok(SchemaReport::from_header(read_header(path)?))
}

pub fn read_header(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open dataset {}", path.display()))?;
    let header = reader
        .headers()
        .with_context(|| format!("cannot read header of {}", path.display()))?;
    Ok(header.iter().map(|s| s.trim().to_string()).collect())
}

/// The launch table. Read-only once loaded.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: String,
    columns: Vec<String>,
    records: Vec<LaunchRecord>,
    payload_bounds: Option<(f64, f64)>,
}

impl Dataset {
    pub fn new(source: impl Into<String>, records: Vec<LaunchRecord>) -> Self {
        let payload_bounds = records.iter().fold(None, |acc: Option<(f64, f64)>, r| {
            let m = r.payload_mass_kg;
            Some(acc.map(|(lo, hi)| (lo.min(m), hi.max(m))).unwrap_or((m, m)))
        });
        Self {
            source: source.into(),
            columns: REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect(),
            records,
            payload_bounds,
        }
    }

    /// Load the table from a CSV file. Any schema or cell error is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("cannot open dataset {}", path.display()))?;
        let columns: Vec<String> = reader
            .headers()
            .with_context(|| format!("cannot read header of {}", path.display()))?
            .iter()
            .map(|s| s.to_string())
            .collect();
        let schema = SchemaReport::from_header(columns.clone());
        if !schema.ok {
            bail!("{}: {}", path.display(), schema.message);
        }

        let mut records = Vec::new();
        for (idx, row) in reader.deserialize::<CsvRow>().enumerate() {
            // header is line 1
            let line = idx + 2;
            let row = row.with_context(|| format!("{}: bad row at line {}", path.display(), line))?;
            let record = LaunchRecord::try_from(row)
                .with_context(|| format!("{}: bad row at line {}", path.display(), line))?;
            records.push(record);
        }

        let mut dataset = Self::new(path.display().to_string(), records);
        dataset.columns = columns;
        Ok(dataset)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[LaunchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Observed (min, max) payload mass; `None` for an empty table.
    pub fn payload_bounds(&self) -> Option<(f64, f64)> {
        self.payload_bounds
    }

    pub fn filter_site(&self, selection: SiteSelection) -> impl Iterator<Item = &LaunchRecord> + '_ {
        self.records
            .iter()
            .filter(move |r| selection.matches(r.launch_site))
    }

    /// Distinct sites in first-appearance order.
    pub fn sites(&self) -> Vec<LaunchSite> {
        let mut out = Vec::new();
        for r in &self.records {
            if !out.contains(&r.launch_site) {
                out.push(r.launch_site);
            }
        }
        out
    }

    /// Distinct booster categories in first-appearance order.
    pub fn booster_categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for r in &self.records {
            if !out.contains(&r.booster_version_category.as_str()) {
                out.push(&r.booster_version_category);
            }
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSummary {
    pub site: LaunchSite,
    pub launches: u64,
    pub successes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub path: String,
    pub hash_sha256: String,
    pub row_count: u64,
    pub columns: Vec<String>,
    pub sites: Vec<SiteSummary>,
    pub payload_min: Option<f64>,
    pub payload_max: Option<f64>,
    pub booster_categories: Vec<String>,
    pub generated_at: String,
}

impl DatasetManifest {
    pub fn build(path: &Path, dataset: &Dataset, generated_at: String) -> Result<Self> {
        let hash_sha256 = file_sha256(path)?;
        let sites = dataset
            .sites()
            .into_iter()
            .map(|site| {
                let rows = dataset.filter_site(SiteSelection::Site(site));
                let (launches, successes) = rows.fold((0u64, 0u64), |(n, ok), r| {
                    (n + 1, ok + u64::from(r.outcome == Outcome::Success))
                });
                SiteSummary { site, launches, successes }
            })
            .collect();
        Ok(Self {
            path: path.display().to_string(),
            hash_sha256,
            row_count: dataset.len() as u64,
            columns: dataset.columns().to_vec(),
            sites,
            payload_min: dataset.payload_bounds().map(|(lo, _)| lo),
            payload_max: dataset.payload_bounds().map(|(_, hi)| hi),
            booster_categories: dataset.booster_categories().into_iter().map(String::from).collect(),
            generated_at,
        })
    }
}

pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn default_manifest_path(dataset_path: &Path) -> PathBuf {
    let mut p = dataset_path.to_path_buf();
    let fname = dataset_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset.csv");
    p.set_file_name(format!("{}.manifest.json", fname));
    p
}
