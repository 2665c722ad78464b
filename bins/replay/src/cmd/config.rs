use serde::Deserialize;

use replay_core::{Protocol, StreamJob};

use super::error::ReplayCliError;

// ═══════════════════════════════════════════════════════════════
//  Config file (TOML)
// ═══════════════════════════════════════════════════════════════

// Built-in fallbacks when neither the stream nor [defaults] set a field.
const DEFAULT_PROTOCOL: Protocol = Protocol::UdpBroadcast;
const DEFAULT_UPDATE_TIMESTAMP: bool = true;
const DEFAULT_RAW_DATA_ONLY: bool = false;
const DEFAULT_INTERVAL: f64 = 1.0;

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub streams: Vec<StreamEntry>,
}

/// Общие значения для всех стримов; любое поле стрима их перекрывает.
#[derive(Debug, Default, Deserialize)]
pub struct Defaults {
    pub protocol: Option<Protocol>,
    pub host: Option<String>,
    pub broadcast_addr: Option<String>,
    pub unicast_addr: Option<String>,
    pub sensor_id: Option<String>,
    pub update_timestamp: Option<bool>,
    pub raw_data_only: Option<bool>,
    pub interval: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct StreamEntry {
    pub name: String,
    pub file: String,
    pub port: u16,
    pub protocol: Option<Protocol>,
    pub host: Option<String>,
    pub broadcast_addr: Option<String>,
    pub unicast_addr: Option<String>,
    pub sensor_id: Option<String>,
    pub update_timestamp: Option<bool>,
    pub raw_data_only: Option<bool>,
    pub interval: Option<f64>,
}

pub fn load_config(path: &str) -> Result<ConfigFile, ReplayCliError> {
    if !std::path::Path::new(path).exists() {
        return Err(ReplayCliError::Config(format!(
            "configuration file not found: {path}"
        )));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ReplayCliError::Config(format!("cannot read config {path}: {e}")))?;
    let cfg: ConfigFile = toml::from_str(&content)
        .map_err(|e| ReplayCliError::Config(format!("bad config {path}: {e}")))?;

    if cfg.streams.is_empty() {
        return Err(ReplayCliError::Config(
            "no [[streams]] defined in configuration".into(),
        ));
    }
    Ok(cfg)
}

// ═══════════════════════════════════════════════════════════════
//  Resolution — stream field wins, then [defaults], then built-ins
// ═══════════════════════════════════════════════════════════════

/// Разрешить каждый стрим против [defaults] и провалидировать его до
/// запуска чего-либо.
pub fn resolve_jobs(cfg: ConfigFile) -> Result<Vec<StreamJob>, ReplayCliError> {
    let d = cfg.defaults;
    let mut jobs = Vec::with_capacity(cfg.streams.len());

    for s in cfg.streams {
        let job = StreamJob {
            name: s.name,
            file: s.file.into(),
            protocol: s.protocol.or(d.protocol).unwrap_or(DEFAULT_PROTOCOL),
            port: s.port,
            host: s.host.or_else(|| d.host.clone()),
            broadcast_addr: s.broadcast_addr.or_else(|| d.broadcast_addr.clone()),
            unicast_addr: s.unicast_addr.or_else(|| d.unicast_addr.clone()),
            sensor_id: s.sensor_id.or_else(|| d.sensor_id.clone()),
            update_timestamp: s
                .update_timestamp
                .or(d.update_timestamp)
                .unwrap_or(DEFAULT_UPDATE_TIMESTAMP),
            raw_data_only: s
                .raw_data_only
                .or(d.raw_data_only)
                .unwrap_or(DEFAULT_RAW_DATA_ONLY),
            interval: s.interval.or(d.interval).unwrap_or(DEFAULT_INTERVAL),
        };
        job.validate()?;
        jobs.push(job);
    }

    Ok(jobs)
}
