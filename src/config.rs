use crate::layout::is_whole_kg;
use crate::logging::Level;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub bind_addr: String,
    pub debug: bool,
    pub log_dir: Option<PathBuf>,
    pub session_ttl_secs: u64,
    pub max_sessions: usize,
    pub slider_step_kg: f64,
    pub slider_mark_kg: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("spacex_launch_dash.csv"),
            bind_addr: "127.0.0.1:8050".to_string(),
            debug: false,
            log_dir: None,
            session_ttl_secs: 1800,
            max_sessions: 1024,
            slider_step_kg: 1000.0,
            slider_mark_kg: 1000.0,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            data_path: std::env::var("DATA_PATH").map(PathBuf::from).unwrap_or(d.data_path),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(d.bind_addr),
            debug: std::env::var("DEBUG").map(|v| parse_flag(&v)).unwrap_or(d.debug),
            log_dir: std::env::var("LOG_DIR").ok().map(PathBuf::from),
            session_ttl_secs: std::env::var("SESSION_TTL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.session_ttl_secs),
            max_sessions: std::env::var("MAX_SESSIONS").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(d.max_sessions),
            slider_step_kg: std::env::var("SLIDER_STEP_KG").ok().and_then(|v| v.parse().ok()).filter(|s: &f64| *s > 0.0).unwrap_or(d.slider_step_kg),
            slider_mark_kg: std::env::var("SLIDER_MARK_KG").ok().and_then(|v| parse_mark_kg(&v)).unwrap_or(d.slider_mark_kg),
        }
    }

    /// Environment config with the first positional argument, if any, as the data path.
    pub fn from_env_and_args<I: IntoIterator<Item = String>>(args: I) -> Self {
        let mut cfg = Self::from_env();
        if let Some(path) = args.into_iter().nth(1) {
            cfg.data_path = PathBuf::from(path);
        }
        cfg
    }

    /// The debug toggle lowers logging to debug; otherwise `LOG_LEVEL` applies.
    pub fn log_level(&self) -> Level {
        if self.debug {
            Level::Debug.min(Level::from_env())
        } else {
            Level::from_env()
        }
    }
}

/// Mark spacing in whole kilograms; anything else falls back to the default.
fn parse_mark_kg(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|kg| is_whole_kg(*kg))
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
