use launchdash::data::{
    default_manifest_path, file_sha256, validate_schema, Dataset, DatasetManifest, LaunchSite,
    Outcome, REQUIRED_COLUMNS,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str = ",Flight Number,Launch Site,class,Payload Mass (kg),Booster Version,Booster Version Category";

fn write_csv(path: &Path, header: &str, rows: &[&str]) {
    let mut out = String::new();
    out.push_str(header);
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    fs::write(path, out).unwrap();
}

#[test]
fn schema_accepts_dashboard_export() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("good.csv");
    write_csv(&path, HEADER, &["0,1,CCAFS LC-40,0,0.0,F9 v1.0  B0003,v1.0"]);
    let report = validate_schema(&path).unwrap();
    assert!(report.ok, "{}", report.message);
    assert_eq!(report.columns.len(), 7);
}

#[test]
fn schema_rejects_missing_columns() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    write_csv(&path, "Flight Number,Launch Site", &["1,CCAFS LC-40"]);
    let report = validate_schema(&path).unwrap();
    assert!(!report.ok);
    assert_eq!(report.missing.len(), REQUIRED_COLUMNS.len() - 2);

    let err = Dataset::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("schema mismatch"));
}

#[test]
fn loads_rows_and_ignores_extra_columns() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("launches.csv");
    write_csv(
        &path,
        HEADER,
        &[
            "0,1,CCAFS LC-40,0,0.0,F9 v1.0  B0003,v1.0",
            "1,2,VAFB SLC-4E,1,9600.0,F9 FT B1029.1,FT",
            "2,3,KSC LC-39A,1,2490.0,F9 FT B1031.1,FT",
        ],
    );
    let ds = Dataset::load(&path).unwrap();
    assert_eq!(ds.len(), 3);
    assert_eq!(ds.source(), path.display().to_string());
    assert_eq!(ds.rows()[1].launch_site, LaunchSite::VafbSlc4e);
    assert_eq!(ds.rows()[1].outcome, Outcome::Success);
    assert_eq!(ds.rows()[2].booster_version_category, "FT");
    assert_eq!(ds.payload_bounds(), Some((0.0, 9600.0)));
}

#[test]
fn unknown_site_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("site.csv");
    write_csv(&path, HEADER, &["0,1,Boca Chica,1,100.0,Starship,S"]);
    let err = Dataset::load(&path).unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("line 2"), "{}", msg);
    assert!(msg.contains("Boca Chica"), "{}", msg);
}

#[test]
fn non_binary_class_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("class.csv");
    write_csv(&path, HEADER, &["0,1,KSC LC-39A,2,100.0,F9,FT"]);
    assert!(Dataset::load(&path).is_err());
}

#[test]
fn negative_or_unparsable_payload_is_fatal() {
    let dir = TempDir::new().unwrap();
    let neg = dir.path().join("neg.csv");
    write_csv(&neg, HEADER, &["0,1,KSC LC-39A,1,-5.0,F9,FT"]);
    assert!(Dataset::load(&neg).is_err());

    let junk = dir.path().join("junk.csv");
    write_csv(&junk, HEADER, &["0,1,KSC LC-39A,1,heavy,F9,FT"]);
    assert!(Dataset::load(&junk).is_err());
}

#[test]
fn missing_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    assert!(Dataset::load(&dir.path().join("absent.csv")).is_err());
}

#[test]
fn header_only_table_loads_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.csv");
    write_csv(&path, HEADER, &[]);
    let ds = Dataset::load(&path).unwrap();
    assert!(ds.is_empty());
    assert!(ds.payload_bounds().is_none());
}

#[test]
fn manifest_summarizes_sites_and_hash() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("launches.csv");
    write_csv(
        &path,
        HEADER,
        &[
            "0,1,CCAFS SLC-40,1,500.0,F9,v1.1",
            "1,2,CCAFS SLC-40,0,9000.0,F9,FT",
            "2,3,KSC LC-39A,1,3000.0,F9,FT",
        ],
    );
    let ds = Dataset::load(&path).unwrap();
    let manifest = DatasetManifest::build(&path, &ds, "now".to_string()).unwrap();
    assert_eq!(manifest.row_count, 3);
    assert_eq!(manifest.hash_sha256, file_sha256(&path).unwrap());
    assert_eq!(manifest.hash_sha256.len(), 64);
    assert_eq!(manifest.sites.len(), 2);
    assert_eq!(manifest.sites[0].site, LaunchSite::CcafsSlc40);
    assert_eq!(manifest.sites[0].launches, 2);
    assert_eq!(manifest.sites[0].successes, 1);
    assert_eq!(manifest.booster_categories, vec!["v1.1", "FT"]);
    assert_eq!(manifest.payload_max, Some(9000.0));
}

#[test]
fn manifest_path_sits_next_to_dataset() {
    let p = default_manifest_path(Path::new("data/spacex_launch_dash.csv"));
    assert_eq!(p, Path::new("data/spacex_launch_dash.csv.manifest.json"));
}
