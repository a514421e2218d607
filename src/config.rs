mod types;

use std::fs::File;
use std::io::{self, Read};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use take_mut::take;
use tracing::{debug, info};
use url::Url;

use crate::rating::RatingScale;

pub use self::types::*;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

fn default_api_url() -> Url {
    Config::default().api_url
}

fn default_bind_addr() -> String {
    Config::default().bind_addr
}

fn default_news_limit() -> NonZeroUsize {
    Config::default().news_limit
}

fn default_fetch_timeout() -> Duration {
    Config::default().fetch_timeout
}

fn default_health_timeout() -> Duration {
    Config::default().health_timeout
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_news_limit")]
    pub news_limit: NonZeroUsize,

    pub cache_dir: Option<PathBuf>,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: Duration,

    #[serde(default = "default_health_timeout")]
    pub health_timeout: Duration,

    #[serde(default)]
    pub modal: ModalConfig,

    #[serde(default)]
    pub rating: RatingScale,
}

impl Config {
    pub fn update(&mut self, args: &crate::cli::Args) {
        fn set_if_some<T: Clone>(dst: &mut T, v: &Option<T>) {
            if let Some(v) = v {
                *dst = v.clone();
            }
        }

        set_if_some(&mut self.api_url, &args.api_url);
        set_if_some(&mut self.bind_addr, &args.bind_addr);
        set_if_some(&mut self.news_limit, &args.limit);
        set_if_some(&mut self.cache_dir, &args.cache_dir.clone().map(Some));
    }

    pub fn resolve_relative_paths(&mut self, config_dir: impl AsRef<Path>) {
        let config_dir = config_dir.as_ref();

        // do the dance for safety (so that I don't forget to update this after adding new fields).
        take(self, |this| Self {
            api_url: this.api_url,
            bind_addr: this.bind_addr,
            news_limit: this.news_limit,
            cache_dir: this.cache_dir.map(|cache_dir| config_dir.join(cache_dir)),
            fetch_timeout: this.fetch_timeout,
            health_timeout: this.health_timeout,
            modal: this.modal,
            rating: this.rating,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: Url::parse(DEFAULT_API_URL).unwrap(),
            bind_addr: "127.0.0.1:20655".into(),
            news_limit: NonZeroUsize::new(15).unwrap(),
            cache_dir: None,
            fetch_timeout: Duration::from_secs(10),
            health_timeout: Duration::from_secs(3),
            modal: Default::default(),
            rating: Default::default(),
        }
    }
}

fn default_enter_delay() -> Duration {
    ModalConfig::default().enter_delay
}

fn default_exit_delay() -> Duration {
    ModalConfig::default().exit_delay
}

/// Delays between the phases of the detail overlay.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ModalConfig {
    /// Time between showing the overlay and starting its enter transition.
    #[serde(default = "default_enter_delay")]
    pub enter_delay: Duration,

    /// Length of the exit transition; the overlay is removed afterwards.
    #[serde(default = "default_exit_delay")]
    pub exit_delay: Duration,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            enter_delay: Duration::from_millis(10),
            exit_delay: Duration::from_millis(300),
        }
    }
}

pub fn load(search_paths: &[PathBuf]) -> Result<Config> {
    for path in search_paths {
        debug!("Trying to load {}", path.display());
        let mut contents = String::new();

        {
            let mut f = match File::open(path) {
                Ok(f) => f,

                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(file = %path.display(), "File not found, skipping");
                    continue;
                }

                Err(e) => {
                    return Err(e)
                        .context(anyhow!("could not load a config file `{}`", path.display()));
                }
            };

            f.read_to_string(&mut contents).with_context(|| {
                anyhow!(
                    "could not read the contents of a config file `{}`",
                    path.display()
                )
            })?;
        }

        let mut cfg = parse(&contents)
            .with_context(|| anyhow!("could not load the config file `{}`", path.display()))?;

        if let Some(parent) = path.parent() {
            cfg.resolve_relative_paths(parent);
        }

        info!("Loaded a config file `{}`", path.display());

        return Ok(cfg);
    }

    info!("Using the default config");

    Ok(Default::default())
}

fn parse(contents: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(contents)?;

    if cfg.rating.max_score <= 0.0 || cfg.rating.max_score.is_nan() {
        return Err(anyhow!("rating.max-score must be positive"));
    }

    if cfg.rating.max_stars == 0 {
        return Err(anyhow!("rating.max-stars must be at least 1"));
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = parse("").unwrap();

        assert_eq!(cfg.api_url.as_str(), "http://localhost:8000/api/v1");
        assert_eq!(cfg.news_limit.get(), 15);
        assert_eq!(StdDuration::from(cfg.fetch_timeout), StdDuration::from_secs(10));
        assert_eq!(StdDuration::from(cfg.health_timeout), StdDuration::from_secs(3));
        assert_eq!(StdDuration::from(cfg.modal.enter_delay), StdDuration::from_millis(10));
        assert_eq!(StdDuration::from(cfg.modal.exit_delay), StdDuration::from_millis(300));
        assert_eq!(cfg.rating, RatingScale::default());
    }

    #[test]
    fn durations() {
        let cfg = parse(
            r#"
            fetch-timeout = 7
            health-timeout = "1m 30s"

            [modal]
            enter-delay = "25ms"
            exit-delay = "1s 250ms"
            "#,
        )
        .unwrap();

        assert_eq!(StdDuration::from(cfg.fetch_timeout), StdDuration::from_secs(7));
        assert_eq!(StdDuration::from(cfg.health_timeout), StdDuration::from_secs(90));
        assert_eq!(StdDuration::from(cfg.modal.enter_delay), StdDuration::from_millis(25));
        assert_eq!(StdDuration::from(cfg.modal.exit_delay), StdDuration::from_millis(1250));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(r#"fetch-timeout = "soon""#).is_err());
        assert!(parse("news-limit = 0").is_err());
        assert!(parse("unknown-key = 1").is_err());
        assert!(parse("[rating]\nmax-stars = 0").is_err());
        assert!(parse("[rating]\nmax-score = 0.0").is_err());
    }

    #[test]
    fn rating_scale_override() {
        let cfg = parse("[rating]\nmax-score = 5.0").unwrap();

        assert_eq!(cfg.rating.max_score, 5.0);
        assert_eq!(cfg.rating.max_stars, 5);
    }

    #[test]
    fn cache_dir_is_relative_to_the_config_file() {
        let mut cfg = parse(r#"cache-dir = "cache""#).unwrap();
        cfg.resolve_relative_paths("/etc/newsgrid");

        assert_eq!(cfg.cache_dir.unwrap(), PathBuf::from("/etc/newsgrid/cache"));
    }
}
