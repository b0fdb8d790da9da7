//! Layered configuration for headless-pdf.
//!
//! Sources are merged lowest to highest priority:
//!
//! 1. built-in defaults,
//! 2. `config.toml` / `config.yaml` in the platform configuration directory,
//! 3. an explicit file (TOML, YAML or JSON, chosen by extension),
//! 4. `HEADLESS_PDF_*` environment variables, with `__` separating nested
//!    keys (e.g. `HEADLESS_PDF_POLL__TIMEOUT_MS=500`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use headless_pdf_render::{ConverterOptions, PollPolicy};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "HEADLESS_PDF_";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the Chrome/Chromium executable. Discovered from `PATH` when unset.
    pub chrome: Option<PathBuf>,
    /// Directory for intermediate files. Falls back to the system temp dir.
    pub output_dir: Option<PathBuf>,
    pub keep_artifacts: bool,
    pub extra_args: Vec<String>,
    pub poll: PollConfig,
    pub process_timeout_secs: Option<u64>,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            chrome: None,
            output_dir: None,
            keep_artifacts: false,
            extra_args: Vec::new(),
            poll: PollConfig::default(),
            process_timeout_secs: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
    pub timeout_ms: u64,
}
impl Default for PollConfig {
    fn default() -> Self {
        let policy = PollPolicy::default();
        Self { interval_ms: policy.interval.as_millis() as u64, timeout_ms: policy.timeout.as_millis() as u64 }
    }
}

impl Config {
    /// Loads configuration from every source, including the user's config directory.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(file)?)
    }

    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        Self::layered(Self::user_config_dir().as_deref(), file)
    }

    /// Builds the provider stack with an explicit configuration directory.
    pub fn layered(config_dir: Option<&Path>, file: Option<&Path>) -> Result<Figment> {
        let mut figment = Self::defaults();
        if let Some(dir) = config_dir {
            tracing::trace!(dir = %dir.display(), "Looking for configuration files");
            figment = figment.merge(Toml::file(dir.join("config.toml"))).merge(Yaml::file(dir.join("config.yaml")));
        }
        if let Some(path) = file {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
            }
            figment = match path.extension().and_then(OsStr::to_str) {
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn defaults() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().map_err(|e| ErrorKind::Extract(e.to_string()))?;
        config.validate()?;
        tracing::debug!(?config, "Configuration loaded");
        Ok(config)
    }

    fn user_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "headless-pdf").map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn validate(&self) -> Result<()> {
        if self.poll.interval_ms == 0 {
            exn::bail!(ErrorKind::Invalid("poll.interval_ms must be greater than zero".into()));
        }
        if self.poll.timeout_ms < self.poll.interval_ms {
            exn::bail!(ErrorKind::Invalid(format!(
                "poll.timeout_ms ({}) must not be shorter than poll.interval_ms ({})",
                self.poll.timeout_ms, self.poll.interval_ms
            )));
        }
        if self.process_timeout_secs == Some(0) {
            exn::bail!(ErrorKind::Invalid("process_timeout_secs must be greater than zero".into()));
        }
        Ok(())
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(Duration::from_millis(self.poll.interval_ms), Duration::from_millis(self.poll.timeout_ms))
    }

    pub fn converter_options(&self) -> ConverterOptions {
        ConverterOptions {
            poll: self.poll_policy(),
            process_timeout: self.process_timeout_secs.map(Duration::from_secs),
            keep_artifacts: self.keep_artifacts,
            extra_args: self.extra_args.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn defaults_match_converter_defaults() {
        let config = Config::from_figment(Config::defaults()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.converter_options(), ConverterOptions::default());
    }

    #[test]
    fn explicit_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                chrome = "/opt/chromium/chrome"
                keep_artifacts = true
                extra_args = ["--no-sandbox"]
                process_timeout_secs = 30

                [poll]
                interval_ms = 50
                "#,
            )?;
            let figment = Config::layered(None, Some(Path::new("custom.toml"))).unwrap();
            let config = Config::from_figment(figment).unwrap();
            assert_eq!(config.chrome.as_deref(), Some(Path::new("/opt/chromium/chrome")));
            assert!(config.keep_artifacts);
            assert_eq!(config.poll, PollConfig { interval_ms: 50, timeout_ms: 300 });
            let options = config.converter_options();
            assert_eq!(options.extra_args, ["--no-sandbox"]);
            assert_eq!(options.process_timeout, Some(Duration::from_secs(30)));
            assert_eq!(options.poll.interval, Duration::from_millis(50));
            Ok(())
        });
    }

    #[test]
    fn config_dir_yaml_is_overridden_by_environment() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "output_dir: /srv/pdf\npoll:\n  timeout_ms: 1000\n")?;
            jail.set_env("HEADLESS_PDF_OUTPUT_DIR", "/var/tmp/pdf");
            jail.set_env("HEADLESS_PDF_POLL__INTERVAL_MS", "250");
            let figment = Config::layered(Some(jail.directory()), None).unwrap();
            let config = Config::from_figment(figment).unwrap();
            assert_eq!(config.output_dir.as_deref(), Some(Path::new("/var/tmp/pdf")));
            assert_eq!(config.poll, PollConfig { interval_ms: 250, timeout_ms: 1000 });
            Ok(())
        });
    }

    #[test]
    fn explicit_file_beats_config_dir() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "keep_artifacts = true\nchrome = \"/usr/bin/chromium\"\n")?;
            jail.create_file("override.json", r#"{ "keep_artifacts": false }"#)?;
            let figment = Config::layered(Some(jail.directory()), Some(Path::new("override.json"))).unwrap();
            let config = Config::from_figment(figment).unwrap();
            assert!(!config.keep_artifacts);
            assert_eq!(config.chrome.as_deref(), Some(Path::new("/usr/bin/chromium")));
            Ok(())
        });
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::layered(None, Some(&missing)).unwrap_err();
        assert_eq!(*err, ErrorKind::NotFound(missing));
    }

    #[test]
    fn wrong_type_is_an_extract_error() {
        Jail::expect_with(|jail| {
            jail.set_env("HEADLESS_PDF_POLL__INTERVAL_MS", "soon");
            let err = Config::from_figment(Config::layered(None, None).unwrap()).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Extract(_)));
            Ok(())
        });
    }

    #[rstest]
    #[case(0, 300, None)]
    #[case(200, 100, None)]
    #[case(100, 300, Some(0))]
    fn invalid_values_are_rejected(#[case] interval_ms: u64, #[case] timeout_ms: u64, #[case] process: Option<u64>) {
        let config = Config {
            poll: PollConfig { interval_ms, timeout_ms },
            process_timeout_secs: process,
            ..Default::default()
        };
        let err = Config::from_figment(Figment::from(Serialized::defaults(config))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }
}
