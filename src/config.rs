//! Configuration for export runs
//!
//! A run is described by one YAML file naming the destination project and
//! dataset, the credentials used to reach the warehouse, and where the
//! datastore statistics are read from.
//!
//! ```yaml
//! project: my-project
//! dataset: datastore_export
//! exclude: "^_"
//! auth:
//!   type: service_account
//!   key_file: /secrets/key.json
//! stats:
//!   type: duckdb
//!   path: /data/stats.duckdb
//! ```

use crate::auth::{AuthConfig, ServiceAccountKey};
use crate::error::{Error, Result};
use crate::http::{ClientProvider, HttpClientConfig, LazyClientProvider};
use crate::stats::{DuckDbStats, MemoryStats, StatsSource};
use crate::types::OptionStringExt;
use crate::warehouse::{WarehouseTarget, DEFAULT_ENDPOINT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Export run configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Destination project
    #[serde(default)]
    pub project: String,

    /// Destination dataset
    #[serde(default)]
    pub dataset: String,

    /// Regular expression of property names left out of every row
    #[serde(default)]
    pub exclude: String,

    /// REST root of the warehouse API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Client-side request deadline; absent means none
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Warehouse credentials
    #[serde(default)]
    pub auth: AuthConfigDef,

    /// Statistics source used for schema inference
    #[serde(default)]
    pub stats: Option<StatsSourceDef>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            dataset: String::new(),
            exclude: String::new(),
            endpoint: default_endpoint(),
            timeout_seconds: None,
            auth: AuthConfigDef::default(),
            stats: None,
        }
    }
}

impl FromStr for SyncConfig {
    type Err = Error;

    fn from_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

impl SyncConfig {
    /// Load a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        contents.parse()
    }

    /// Override file values with command line or request values
    pub fn apply_overrides(
        &mut self,
        project: Option<String>,
        dataset: Option<String>,
        exclude: Option<String>,
    ) {
        if let Some(project) = project.none_if_blank() {
            self.project = project;
        }
        if let Some(dataset) = dataset.none_if_blank() {
            self.dataset = dataset;
        }
        if let Some(exclude) = exclude {
            self.exclude = exclude;
        }
    }

    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        if self.project.trim().is_empty() {
            return Err(Error::missing_field("project"));
        }
        if self.dataset.trim().is_empty() {
            return Err(Error::missing_field("dataset"));
        }
        Url::parse(&self.endpoint)
            .map_err(|e| Error::config(format!("Invalid endpoint '{}': {e}", self.endpoint)))?;
        if self.timeout_seconds == Some(0) {
            return Err(Error::config("timeout_seconds must be greater than 0"));
        }
        Ok(())
    }

    /// Destination of tables and inserts
    pub fn target(&self) -> WarehouseTarget {
        WarehouseTarget::new(&self.project, &self.dataset).with_endpoint(&self.endpoint)
    }

    /// HTTP client settings
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder();
        if let Some(secs) = self.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build()
    }

    /// Resolve credentials, reading key files as needed
    pub fn auth_config(&self) -> Result<AuthConfig> {
        self.auth.resolve()
    }

    /// Client provider building the authenticated client on first use
    pub fn client_provider(&self) -> Result<Arc<dyn ClientProvider>> {
        Ok(Arc::new(LazyClientProvider::new(
            self.http_config(),
            self.auth_config()?,
        )))
    }

    /// Open the configured statistics source
    pub fn stats_source(&self) -> Result<Arc<dyn StatsSource>> {
        self.stats
            .as_ref()
            .ok_or_else(|| Error::missing_field("stats"))?
            .open()
    }
}

// ============================================================================
// Auth
// ============================================================================

/// Credential definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfigDef {
    /// No credentials (emulators, tests)
    #[default]
    None,

    /// Pre-issued access token
    Bearer { token: String },

    /// Service account key, from a file or inline
    ServiceAccount {
        #[serde(default)]
        key_file: Option<String>,
        #[serde(default)]
        key_json: Option<String>,
    },

    /// OAuth2 refresh token flow
    Oauth2Refresh {
        token_url: String,
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

impl AuthConfigDef {
    /// Turn the definition into runtime credentials
    pub fn resolve(&self) -> Result<AuthConfig> {
        match self {
            AuthConfigDef::None => Ok(AuthConfig::None),

            AuthConfigDef::Bearer { token } => Ok(AuthConfig::Bearer {
                token: token.clone(),
            }),

            AuthConfigDef::ServiceAccount { key_file, key_json } => {
                let key = match (key_json, key_file) {
                    (Some(json), _) => ServiceAccountKey::from_json(json)?,
                    (None, Some(path)) => ServiceAccountKey::from_file(path)?,
                    (None, None) => return Err(Error::missing_field("auth.key_file")),
                };
                Ok(AuthConfig::service_account(key))
            }

            AuthConfigDef::Oauth2Refresh {
                token_url,
                client_id,
                client_secret,
                refresh_token,
            } => Ok(AuthConfig::Oauth2Refresh {
                token_url: token_url.clone(),
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                refresh_token: refresh_token.clone(),
            }),
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Where statistics are read from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatsSourceDef {
    /// JSON dump of the statistic entities
    Json { path: String },
    /// DuckDB database holding the statistic tables
    Duckdb { path: String },
}

impl StatsSourceDef {
    pub fn open(&self) -> Result<Arc<dyn StatsSource>> {
        let source: Arc<dyn StatsSource> = match self {
            StatsSourceDef::Json { path } => Arc::new(MemoryStats::from_file(path)?),
            StatsSourceDef::Duckdb { path } => Arc::new(DuckDbStats::open(path)?),
        };
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TEST_PRIVATE_KEY: &str = include_str!("../tests/fixtures/test_service_account.pem");

    #[test]
    fn test_parse_minimal_config() {
        let config: SyncConfig = "project: p\ndataset: d\n".parse().unwrap();

        assert_eq!(config.project, "p");
        assert_eq!(config.dataset, "d");
        assert_eq!(config.exclude, "");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.timeout_seconds.is_none());
        assert!(matches!(config.auth, AuthConfigDef::None));
        assert!(config.stats.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
project: my-project
dataset: exports
exclude: "^_|password"
endpoint: http://localhost:9050
timeout_seconds: 30
auth:
  type: oauth2_refresh
  token_url: https://oauth2.example.com/token
  client_id: id
  client_secret: secret
  refresh_token: refresh
stats:
  type: duckdb
  path: /data/stats.duckdb
"#;
        let config: SyncConfig = yaml.parse().unwrap();

        assert_eq!(config.exclude, "^_|password");
        assert_eq!(config.timeout_seconds, Some(30));
        assert!(matches!(
            config.stats,
            Some(StatsSourceDef::Duckdb { ref path }) if path == "/data/stats.duckdb"
        ));
        assert_eq!(config.http_config().timeout, Some(Duration::from_secs(30)));
        assert_eq!(
            config.target().insert_all_url("Person").unwrap(),
            "http://localhost:9050/projects/my-project/datasets/exports/tables/Person/insertAll"
        );
        assert!(matches!(
            config.auth_config().unwrap(),
            AuthConfig::Oauth2Refresh { ref client_id, .. } if client_id == "id"
        ));
    }

    #[test]
    fn test_validate_missing_fields() {
        let err = SyncConfig::default().validate().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "project"));

        let config: SyncConfig = "project: p\ndataset: '  '\n".parse().unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "dataset"));
    }

    #[test]
    fn test_validate_bad_endpoint_and_timeout() {
        let config: SyncConfig = "project: p\ndataset: d\nendpoint: nope\n".parse().unwrap();
        assert!(matches!(config.validate().unwrap_err(), Error::Config { .. }));

        let config: SyncConfig = "project: p\ndataset: d\ntimeout_seconds: 0\n"
            .parse()
            .unwrap();
        assert!(matches!(config.validate().unwrap_err(), Error::Config { .. }));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = "project: [unclosed".parse::<SyncConfig>().unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test]
    fn test_overrides() {
        let mut config: SyncConfig = "project: p\ndataset: d\nexclude: x\n".parse().unwrap();
        config.apply_overrides(Some("other".to_string()), Some(" ".to_string()), None);

        assert_eq!(config.project, "other");
        assert_eq!(config.dataset, "d");
        assert_eq!(config.exclude, "x");

        config.apply_overrides(None, None, Some(String::new()));
        assert_eq!(config.exclude, "");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "project: p\ndataset: d\nauth:\n  type: bearer\n  token: abc").unwrap();

        let config = SyncConfig::from_file(file.path()).unwrap();
        assert!(matches!(
            config.auth_config().unwrap(),
            AuthConfig::Bearer { ref token } if token == "abc"
        ));
    }

    #[test]
    fn test_from_missing_file() {
        let err = SyncConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_service_account_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let key_path = dir.path().join("key.json");
        std::fs::write(
            &key_path,
            serde_json::json!({
                "type": "service_account",
                "private_key": TEST_PRIVATE_KEY,
                "client_email": "svc@p.iam.gserviceaccount.com"
            })
            .to_string(),
        )
        .unwrap();

        let def = AuthConfigDef::ServiceAccount {
            key_file: Some(key_path.display().to_string()),
            key_json: None,
        };
        match def.resolve().unwrap() {
            AuthConfig::ServiceAccount {
                client_email,
                token_uri,
                scopes,
                ..
            } => {
                assert_eq!(client_email, "svc@p.iam.gserviceaccount.com");
                assert_eq!(token_uri, crate::auth::DEFAULT_TOKEN_URI);
                assert_eq!(scopes, vec![crate::auth::BIGQUERY_SCOPE.to_string()]);
            }
            other => panic!("unexpected auth config: {other:?}"),
        }
    }

    #[test]
    fn test_service_account_without_key() {
        let def = AuthConfigDef::ServiceAccount {
            key_file: None,
            key_json: None,
        };
        assert!(matches!(
            def.resolve().unwrap_err(),
            Error::MissingConfigField { .. }
        ));
    }

    #[tokio::test]
    async fn test_json_stats_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"kinds": [{{"kind_name": "Person", "count": 2}}], "properties": []}}"#
        )
        .unwrap();

        let config = SyncConfig {
            stats: Some(StatsSourceDef::Json {
                path: file.path().display().to_string(),
            }),
            ..SyncConfig::default()
        };
        let source = config.stats_source().unwrap();
        assert_eq!(source.kind_stat("Person").await.unwrap().unwrap().count, 2);
    }

    #[test]
    fn test_missing_stats_source() {
        let err = SyncConfig::default().stats_source().err().unwrap();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "stats"));
    }
}
