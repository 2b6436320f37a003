// src/config/app.rs
//! Service configuration.
//!
//! Sources, later wins:
//! 1) built-in defaults
//! 2) TOML file at `$APP_CONFIG_PATH`, else `config/app.toml` if present
//! 3) env overrides: ANALYZER_BACKEND, RECOMMENDER_TABLES_PATH, UPLOAD_DIR,
//!    SENTIMENT_HINT_POLICY
//!
//! `hf.api_token = "ENV"` is resolved from `HF_API_TOKEN`.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::analyze::classifier::DEFAULT_ZERO_SHOT_MODEL;
use crate::analyze::entities::EntityType;
use crate::analyze::huggingface::DEFAULT_BASE_URL;
use crate::analyze::sentiment::DEFAULT_SENTIMENT_MODEL;
use crate::recommend::SentimentHintPolicy;

pub const ENV_CONFIG_PATH: &str = "APP_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";

/// Which classifier/sentiment implementations to wire up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Offline lexical classifier + lexicon sentiment.
    #[default]
    Local,
    /// Hugging Face Inference API.
    HuggingFace,
}

impl std::str::FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Backend::Local),
            "huggingface" | "hf" => Ok(Backend::HuggingFace),
            other => Err(anyhow!("unsupported analyzer backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HfConfig {
    pub base_url: String,
    /// "ENV" means: read from HF_API_TOKEN.
    pub api_token: String,
    pub classifier_model: String,
    pub sentiment_model: String,
    pub timeout_secs: u64,
}

impl Default for HfConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: "ENV".to_string(),
            classifier_model: DEFAULT_ZERO_SHOT_MODEL.to_string(),
            sentiment_model: DEFAULT_SENTIMENT_MODEL.to_string(),
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: Backend,
    pub hf: HfConfig,
    /// JSON override for the recommendation tables; built-ins when unset.
    pub tables_path: Option<PathBuf>,
    pub upload_dir: PathBuf,
    pub sentiment_hint_policy: SentimentHintPolicy,
    /// Entity types kept in the analysis response.
    pub entity_types: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            hf: HfConfig::default(),
            tables_path: None,
            upload_dir: PathBuf::from("temp_uploads"),
            sentiment_hint_policy: SentimentHintPolicy::Ignore,
            entity_types: vec!["Tracking ID".to_string(), "Product".to_string()],
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&data).with_context(|| format!("parsing config in {}", path.display()))
    }

    /// Defaults → file → env overrides, then token resolution and sanity checks.
    pub fn from_env() -> Result<Self> {
        let mut cfg = match env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
                }
                Self::load_from_file(&pb)?
            }
            Err(_) => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::load_from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env_overrides()?;
        cfg.finalize()
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(v) = env::var("ANALYZER_BACKEND") {
            self.backend = v.parse()?;
        }
        if let Ok(v) = env::var("RECOMMENDER_TABLES_PATH") {
            if !v.trim().is_empty() {
                self.tables_path = Some(PathBuf::from(v));
            }
        }
        if let Ok(v) = env::var("UPLOAD_DIR") {
            if !v.trim().is_empty() {
                self.upload_dir = PathBuf::from(v);
            }
        }
        if let Ok(v) = env::var("SENTIMENT_HINT_POLICY") {
            self.sentiment_hint_policy = v.parse().map_err(|e: String| anyhow!(e))?;
        }
        Ok(())
    }

    fn finalize(mut self) -> Result<Self> {
        if self.hf.api_token.trim().eq_ignore_ascii_case("env") {
            self.hf.api_token = match env::var("HF_API_TOKEN") {
                Ok(t) => t,
                Err(_) if self.backend == Backend::HuggingFace => {
                    return Err(anyhow!("Missing HF_API_TOKEN env var"));
                }
                // Local backend never calls out; leave the token empty.
                Err(_) => String::new(),
            };
        }
        if self.hf.timeout_secs == 0 {
            self.hf.timeout_secs = HfConfig::default().timeout_secs;
        }
        for t in &self.entity_types {
            t.parse::<EntityType>().map_err(|e| anyhow!(e))?;
        }
        Ok(self)
    }

    /// Parsed `entity_types` (validated in `finalize`).
    pub fn entity_filter(&self) -> Vec<EntityType> {
        self.entity_types
            .iter()
            .filter_map(|t| t.parse().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const VARS: [&str; 6] = [
        ENV_CONFIG_PATH,
        "ANALYZER_BACKEND",
        "RECOMMENDER_TABLES_PATH",
        "UPLOAD_DIR",
        "SENTIMENT_HINT_POLICY",
        "HF_API_TOKEN",
    ];

    fn clear_env() {
        for v in VARS {
            env::remove_var(v);
        }
    }

    fn unique_tmp_file(name: &str) -> PathBuf {
        let mut dir = env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        dir.push(format!("app_config_test_{}", nanos));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    #[serial]
    fn defaults_without_file_or_env() {
        clear_env();
        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg.backend, Backend::Local);
        assert_eq!(cfg.sentiment_hint_policy, SentimentHintPolicy::Ignore);
        assert_eq!(cfg.entity_filter(), vec![EntityType::TrackingId, EntityType::Product]);
        assert!(cfg.hf.api_token.is_empty());
    }

    #[test]
    #[serial]
    fn file_then_env_overrides() {
        clear_env();
        let path = unique_tmp_file("app.toml");
        {
            let mut f = fs::File::create(&path).unwrap();
            writeln!(
                f,
                r#"
upload_dir = "/tmp/from_file"
sentiment_hint_policy = "escalate"
entity_types = ["Tracking ID", "Document"]

[hf]
api_token = "inline-token"
timeout_secs = 0
"#
            )
            .unwrap();
        }
        env::set_var(ENV_CONFIG_PATH, &path);
        env::set_var("UPLOAD_DIR", "/tmp/from_env");

        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg.upload_dir, PathBuf::from("/tmp/from_env"));
        assert_eq!(cfg.sentiment_hint_policy, SentimentHintPolicy::Escalate);
        assert_eq!(cfg.entity_filter(), vec![EntityType::TrackingId, EntityType::Document]);
        assert_eq!(cfg.hf.api_token, "inline-token");
        assert_eq!(cfg.hf.timeout_secs, 20);
        assert_eq!(cfg.hf.classifier_model, DEFAULT_ZERO_SHOT_MODEL);

        clear_env();
        let _ = fs::remove_file(&path);
    }

    #[test]
    #[serial]
    fn huggingface_backend_requires_token() {
        clear_env();
        env::set_var("ANALYZER_BACKEND", "huggingface");
        assert!(AppConfig::from_env().is_err());

        env::set_var("HF_API_TOKEN", "hf_abc");
        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg.backend, Backend::HuggingFace);
        assert_eq!(cfg.hf.api_token, "hf_abc");
        clear_env();
    }

    #[test]
    #[serial]
    fn bad_values_are_rejected() {
        clear_env();
        env::set_var("SENTIMENT_HINT_POLICY", "blend");
        assert!(AppConfig::from_env().is_err());
        clear_env();

        env::set_var(ENV_CONFIG_PATH, "__missing_app_config__.toml");
        assert!(AppConfig::from_env().is_err());
        clear_env();
    }
}
