use anyhow::Result;
use launchdash::config::Config;
use launchdash::data::Dataset;
use launchdash::logging::{self, log, log_dataset_loaded, obj, v_str, Domain, Level};
use launchdash::server::{self, AppState};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env_and_args(std::env::args());
    let run_id = logging::init(cfg.log_level(), cfg.log_dir.as_deref());
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("run_id", v_str(&run_id)),
            ("data_path", v_str(&cfg.data_path.display().to_string())),
            ("bind_addr", v_str(&cfg.bind_addr)),
            ("debug", json!(cfg.debug)),
        ]),
    );

    let dataset = match Dataset::load(&cfg.data_path) {
        Ok(ds) => ds,
        Err(err) => {
            log(
                Level::Fatal,
                Domain::Data,
                "dataset_load_failed",
                obj(&[("error", v_str(&format!("{:#}", err)))]),
            );
            logging::flush();
            return Err(err);
        }
    };
    let (payload_min, payload_max) = dataset.payload_bounds();
    log_dataset_loaded(
        dataset.source(),
        dataset.len(),
        dataset.sites().len(),
        payload_min,
        payload_max,
    );
    if let Some(hash) = dataset.manifest().hash_sha256 {
        log(Level::Debug, Domain::Data, "dataset_hash", obj(&[("sha256", v_str(&hash))]));
    }

    let state = AppState::new(dataset, &cfg);
    let result = server::serve(state, &cfg.bind_addr).await;
    logging::flush();
    result
}
