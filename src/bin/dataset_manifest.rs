//! Check a launch CSV before serving it.
//!
//! Usage: dataset_manifest [path]

use launchdash::data::{validate_schema, Dataset, REQUIRED_COLUMNS};
use serde_json::json;
use std::env;
use std::path::PathBuf;

fn main() {
    let path = PathBuf::from(
        env::args()
            .nth(1)
            .unwrap_or_else(|| "spacex_launch_dash.csv".to_string()),
    );

    let schema = match validate_schema(&path) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("cannot read {}: {}", path.display(), err);
            std::process::exit(1);
        }
    };
    if !schema.ok {
        eprintln!("schema mismatch: {}", schema.message);
        eprintln!("required columns: {:?}", REQUIRED_COLUMNS);
        std::process::exit(2);
    }

    let dataset = match Dataset::load(&path) {
        Ok(ds) => ds,
        Err(err) => {
            eprintln!("load failed: {:#}", err);
            std::process::exit(3);
        }
    };

    let payload = json!({
        "manifest": dataset.manifest(),
        "schema": schema,
    });
    match serde_json::to_string_pretty(&payload) {
        Ok(text) => println!("{}", text),
        Err(err) => {
            eprintln!("cannot encode manifest: {}", err);
            std::process::exit(4);
        }
    }
}
