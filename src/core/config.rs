use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{env, fmt, fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";

pub const ENV_BASE_URL: &str = "GHOSTFOLIO_URL";
pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_CA_CERT: &str = "GHOSTFOLIO_CA_CERT";

/// Target weights keyed by ticker, kept in the order they appear in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Holdings(Vec<(String, f64)>);

impl Holdings {
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(ticker, weight)| (ticker.as_str(), *weight))
    }

    pub fn tickers(&self) -> Vec<String> {
        self.0.iter().map(|(ticker, _)| ticker.clone()).collect()
    }

    pub fn total_weight(&self) -> f64 {
        self.0.iter().map(|(_, weight)| weight).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Holdings {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Holdings(iter.into_iter().map(|(t, w)| (t.into(), w)).collect())
    }
}

impl Serialize for Holdings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (ticker, weight) in &self.0 {
            map.serialize_entry(ticker, weight)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Holdings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HoldingsVisitor;

        impl<'de> Visitor<'de> for HoldingsVisitor {
            type Value = Holdings;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of ticker to weight")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Holdings, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((ticker, weight)) = access.next_entry::<String, f64>()? {
                    entries.push((ticker, weight));
                }
                Ok(Holdings(entries))
            }
        }

        deserializer.deserialize_map(HoldingsVisitor)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Contribution {
    pub date: NaiveDate,
    pub amount: f64,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Account {
    pub name: String,
    pub account_id: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub holdings: Holdings,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: DEFAULT_YAHOO_URL.to_string(),
            }),
        }
    }
}

impl ProvidersConfig {
    pub fn yahoo_base_url(&self) -> &str {
        self.yahoo.as_ref().map_or(DEFAULT_YAHOO_URL, |p| &p.base_url)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "contrib-import", "contrib-import")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("allocations.yml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!(accounts = config.accounts.len(), "Successfully loaded config");
        Ok(config)
    }

    pub fn find_account(&self, name: &str) -> Result<&Account> {
        self.accounts
            .iter()
            .find(|a| a.name == name || a.account_id == name)
            .ok_or_else(|| anyhow!("No account named '{}' in config", name))
    }
}

/// Credentials and endpoint of the import service, read once at startup.
#[derive(Clone)]
pub struct ImportSettings {
    pub base_url: String,
    pub api_key: String,
    pub ca_cert: Option<PathBuf>,
}

impl fmt::Debug for ImportSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("ca_cert", &self.ca_cert)
            .finish()
    }
}

impl ImportSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("Missing required environment variable {}", key))
        };

        let base_url = required(ENV_BASE_URL)?.trim_end_matches('/').to_string();
        let api_key = required(ENV_API_KEY)?;
        let ca_cert = lookup(ENV_CA_CERT)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(ImportSettings {
            base_url,
            api_key,
            ca_cert,
        })
    }
}
