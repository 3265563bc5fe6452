//! Runtime settings from environment variables.
//!
//! Every value has a default and bad values fall back to it with a warning,
//! so configuration never stops the window from opening.

use std::time::Duration;

use reqwest::Url;
use tracing::warn;

use crate::models::LayoutMode;
use crate::nav::RowAlignment;

pub const ENV_CATALOG_URL: &str = "SHELF_CATALOG_URL";
pub const ENV_IMAGE_BASE: &str = "SHELF_IMAGE_BASE";
pub const ENV_LAYOUT: &str = "SHELF_LAYOUT";
pub const ENV_ALIGNMENT: &str = "SHELF_ALIGNMENT";
/// Per-request timeout in seconds. Unset means requests never time out.
pub const ENV_REQUEST_TIMEOUT: &str = "SHELF_REQUEST_TIMEOUT_SECS";

pub const DEFAULT_CATALOG_URL: &str = "http://localhost:8080/api/collections";

#[derive(Debug, Clone)]
pub struct Settings {
    pub catalog_url: Url,
    pub image_base: String,
    pub layout: LayoutMode,
    pub alignment: RowAlignment,
    pub request_timeout: Option<Duration>,
}

impl Settings {
    /// Reads the process environment. `catalog_arg` (the first command-line
    /// argument) takes precedence over `SHELF_CATALOG_URL`.
    pub fn from_env(catalog_arg: Option<String>) -> Self {
        Self::from_env_with(|key| std::env::var(key).ok(), catalog_arg)
    }

    /// Same as `from_env` with a custom lookup (for tests).
    pub fn from_env_with<F>(get_env: F, catalog_arg: Option<String>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let catalog_url = catalog_arg
            .or_else(|| get_env(ENV_CATALOG_URL))
            .and_then(|raw| match Url::parse(raw.trim()) {
                Ok(url) => Some(url),
                Err(err) => {
                    warn!("Invalid catalog URL {:?} ({}), using default", raw, err);
                    None
                }
            })
            .unwrap_or_else(default_catalog_url);

        let image_base = get_env(ENV_IMAGE_BASE)
            .map(|base| base.trim().trim_end_matches('/').to_string())
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| origin(&catalog_url));

        let layout = parse_or_default(&get_env, ENV_LAYOUT, LayoutMode::parse);
        let alignment = parse_or_default(&get_env, ENV_ALIGNMENT, RowAlignment::parse);

        let request_timeout = get_env(ENV_REQUEST_TIMEOUT).and_then(|raw| {
            match raw.trim().parse::<u64>() {
                Ok(0) | Err(_) => {
                    warn!("Ignoring {}={:?}", ENV_REQUEST_TIMEOUT, raw);
                    None
                }
                Ok(secs) => Some(Duration::from_secs(secs)),
            }
        });

        Self {
            catalog_url,
            image_base,
            layout,
            alignment,
            request_timeout,
        }
    }
}

fn default_catalog_url() -> Url {
    Url::parse(DEFAULT_CATALOG_URL).expect("default catalog URL is valid")
}

fn parse_or_default<T, F, P>(get_env: &F, key: &str, parse: P) -> T
where
    T: Default,
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    let Some(raw) = get_env(key) else {
        return T::default();
    };
    parse(&raw).unwrap_or_else(|| {
        warn!("Unknown value {:?} for {}, using default", raw, key);
        T::default()
    })
}

/// `scheme://host[:port]` of a URL, without a trailing slash.
fn origin(url: &Url) -> String {
    url.origin().ascii_serialization()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn map_env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn get_env(map: &HashMap<String, String>) -> impl Fn(&str) -> Option<String> + '_ {
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let env = map_env(&[]);
        let settings = Settings::from_env_with(get_env(&env), None);

        assert_eq!(settings.catalog_url.as_str(), DEFAULT_CATALOG_URL);
        assert_eq!(settings.image_base, "http://localhost:8080");
        assert_eq!(settings.layout, LayoutMode::Horizontal);
        assert_eq!(settings.alignment, RowAlignment::IndexPreserving);
        assert_eq!(settings.request_timeout, None);
    }

    #[test]
    fn environment_overrides() {
        let env = map_env(&[
            (ENV_CATALOG_URL, "https://catalog.test/v2/collections"),
            (ENV_IMAGE_BASE, "https://images.test/"),
            (ENV_LAYOUT, "vertical"),
            (ENV_ALIGNMENT, "position"),
            (ENV_REQUEST_TIMEOUT, "15"),
        ]);
        let settings = Settings::from_env_with(get_env(&env), None);

        assert_eq!(
            settings.catalog_url.as_str(),
            "https://catalog.test/v2/collections"
        );
        assert_eq!(settings.image_base, "https://images.test");
        assert_eq!(settings.layout, LayoutMode::Vertical);
        assert_eq!(settings.alignment, RowAlignment::PositionPreserving);
        assert_eq!(settings.request_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn argument_wins_over_environment() {
        let env = map_env(&[(ENV_CATALOG_URL, "https://env.test/collections")]);
        let settings = Settings::from_env_with(
            get_env(&env),
            Some("http://127.0.0.1:9000/collections".to_string()),
        );

        assert_eq!(
            settings.catalog_url.as_str(),
            "http://127.0.0.1:9000/collections"
        );
        assert_eq!(settings.image_base, "http://127.0.0.1:9000");
    }

    #[test]
    fn invalid_values_fall_back() {
        let env = map_env(&[
            (ENV_CATALOG_URL, "not a url"),
            (ENV_LAYOUT, "diagonal"),
            (ENV_ALIGNMENT, "nearest"),
            (ENV_REQUEST_TIMEOUT, "soon"),
        ]);
        let settings = Settings::from_env_with(get_env(&env), None);

        assert_eq!(settings.catalog_url.as_str(), DEFAULT_CATALOG_URL);
        assert_eq!(settings.layout, LayoutMode::Horizontal);
        assert_eq!(settings.alignment, RowAlignment::IndexPreserving);
        assert_eq!(settings.request_timeout, None);

        let env = map_env(&[(ENV_REQUEST_TIMEOUT, "0")]);
        assert_eq!(
            Settings::from_env_with(get_env(&env), None).request_timeout,
            None
        );
    }
}
