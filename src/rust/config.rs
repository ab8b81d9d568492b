use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use clap::Parser;

use crate::runtime::{optimization_level_from_u8, RuntimeConfig};

pub const DEFAULT_MODEL_PATH: &str = "models/traffic_sign_model.onnx";
pub const DEFAULT_PORT: u16 = 7001;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Traffic sign classification HTTP service
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Path to the ONNX model file
    #[arg(long, env = "MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,

    /// Download the model from this URL into the local cache instead of using --model-path
    #[arg(long, env = "MODEL_URL")]
    pub model_url: Option<String>,

    /// Expected SHA-256 of the downloaded model
    #[arg(long, env = "MODEL_SHA256", requires = "model_url")]
    pub model_sha256: Option<String>,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Maximum accepted request body size
    #[arg(long, env = "BODY_LIMIT_BYTES", default_value_t = DEFAULT_BODY_LIMIT_BYTES)]
    pub body_limit_bytes: usize,

    /// ONNX Runtime intra-op threads (0 lets the runtime decide)
    #[arg(long, default_value_t = 0)]
    pub intra_threads: usize,

    /// ONNX Runtime inter-op threads (0 lets the runtime decide)
    #[arg(long, default_value_t = 0)]
    pub inter_threads: usize,

    /// Graph optimization level, 0 disables optimization
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub optimization_level: u8,

    /// Keep serving (health reports 503) when the model fails to load
    #[arg(long, env = "ALLOW_MISSING_MODEL")]
    pub allow_missing_model: bool,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            inter_threads: self.inter_threads,
            intra_threads: self.intra_threads,
            optimization_level: optimization_level_from_u8(self.optimization_level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    const ENV_VARS: [&str; 7] = [
        "MODEL_PATH", "MODEL_URL", "MODEL_SHA256", "HOST", "PORT", "BODY_LIMIT_BYTES", "ALLOW_MISSING_MODEL",
    ];

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Holds the env lock with every fallback variable unset, so parsing sees only argv.
    fn clean_env() -> MutexGuard<'static, ()> {
        let guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
        guard
    }

    #[test]
    fn test_defaults() {
        let _env = clean_env();
        let config = ServerConfig::try_parse_from(["signsight"]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.body_limit_bytes, DEFAULT_BODY_LIMIT_BYTES);
        assert_eq!(config.optimization_level, 3);
        assert!(config.model_url.is_none());
        assert_eq!(config.socket_addr().port(), DEFAULT_PORT);
    }

    #[test]
    fn test_overrides() {
        let _env = clean_env();
        let config = ServerConfig::try_parse_from([
            "signsight",
            "--model-path", "/srv/models/gtsrb.onnx",
            "--host", "127.0.0.1",
            "--port", "8080",
            "--intra-threads", "4",
            "--optimization-level", "1",
            "--allow-missing-model",
        ]).unwrap();

        assert_eq!(config.model_path, PathBuf::from("/srv/models/gtsrb.onnx"));
        assert_eq!(config.socket_addr(), "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert!(config.allow_missing_model);

        let runtime = config.runtime_config();
        assert_eq!(runtime.intra_threads, 4);
        assert_eq!(runtime.inter_threads, 0);
    }

    #[test]
    fn test_invalid_values() {
        let _env = clean_env();
        assert!(ServerConfig::try_parse_from(["signsight", "--optimization-level", "7"]).is_err());
        assert!(ServerConfig::try_parse_from(["signsight", "--port", "not-a-port"]).is_err());
        assert!(ServerConfig::try_parse_from(["signsight", "--model-sha256", "abc"]).is_err());
    }

    #[test]
    fn test_env_fallback() {
        let _env = clean_env();
        std::env::set_var("PORT", "9090");
        std::env::set_var("MODEL_PATH", "/opt/signs.onnx");
        let config = ServerConfig::try_parse_from(["signsight"]).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.model_path, PathBuf::from("/opt/signs.onnx"));

        let config = ServerConfig::try_parse_from(["signsight", "--port", "8080"]).unwrap();
        assert_eq!(config.port, 8080);

        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }
}
