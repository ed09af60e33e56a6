use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::collections::HashMap;

use crate::schema::Canonicalizer;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub rpc: RpcConfig,
    pub canonicalization: CanonicalizationConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub packages: HashMap<String, PackageConfig>,
    /// Well-known shared objects by name, e.g. `genesis_shop`, `access_control`.
    #[serde(default)]
    pub objects: HashMap<String, String>,
    pub shop: ShopConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RpcConfig {
    pub url: String,
    pub timeout_seconds: u64,
}

/// Deployment-specific address table used to canonicalize type strings.
#[derive(Debug, Deserialize, Clone)]
pub struct CanonicalizationConfig {
    /// Full address -> short form.
    #[serde(default)]
    pub address_aliases: HashMap<String, String>,
    #[serde(default = "default_true")]
    pub strip_leading_zeros: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SchemaConfig {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PackageConfig {
    /// Id the package was first published at; types are named after it.
    pub original_id: String,
    /// Id of the latest upgrade; calls target it.
    pub published_at: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShopConfig {
    /// Key into `packages`.
    pub package: String,
    /// Equipment slot whose `add_<slot>` call creates the builder.
    pub slot: String,
    pub items_total: u64,
    pub items_per_transaction: u64,
    pub gas_budget: u64,
    /// Resume with an existing builder instead of creating one.
    pub builder_id: Option<String>,
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        tracing::info!("Loading configuration...");

        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("REIFIED").separator("__"))
            .build()?;

        let mut config: AppConfig = match settings.try_deserialize() {
            Ok(config) => {
                tracing::info!("Configuration loaded from file/environment");
                config
            }
            Err(e) => {
                tracing::warn!("Could not load configuration from file/environment ({}), using defaults", e);
                AppConfig::default()
            }
        };

        // Override with environment variables if present
        if let Ok(url) = std::env::var("SUI_RPC_URL") {
            config.rpc.url = url;
        }

        if let Ok(path) = std::env::var("REIFIED_SCHEMA_PATH") {
            config.schema.path = Some(path);
        }

        tracing::info!("Final configuration:");
        tracing::info!("  RPC: {}", config.rpc.url);
        tracing::info!("  Schema: {}", config.schema.path.as_deref().unwrap_or("<framework only>"));
        tracing::info!("  Address aliases: {}", config.canonicalization.address_aliases.len());
        tracing::info!("  Packages: {:?}", config.packages.keys().collect::<Vec<_>>());

        Ok(config)
    }

    pub fn canonicalizer(&self) -> Result<Canonicalizer> {
        Canonicalizer::from_config(&self.canonicalization).map_err(|e| anyhow!("invalid canonicalization config: {}", e))
    }

    pub fn package(&self, name: &str) -> Result<&PackageConfig> {
        self.packages
            .get(name)
            .ok_or_else(|| anyhow!("package `{}` is not configured", name))
    }

    /// Id of a configured shared object.
    pub fn object_id(&self, name: &str) -> Result<&str> {
        self.objects
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("object `{}` is not configured", name))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut packages = HashMap::new();
        packages.insert(
            "act".to_string(),
            PackageConfig {
                original_id: "0x0000000000000000000000000000000000000000000000000000000000000000".to_string(),
                published_at: "0x0000000000000000000000000000000000000000000000000000000000000000".to_string(),
            },
        );

        Self {
            rpc: RpcConfig {
                url: "http://127.0.0.1:9000".to_string(),
                timeout_seconds: 30,
            },
            canonicalization: CanonicalizationConfig {
                address_aliases: Canonicalizer::framework_aliases(),
                strip_leading_zeros: true,
            },
            schema: SchemaConfig {
                path: Some("schema/anima.json".to_string()),
            },
            packages,
            objects: HashMap::new(),
            shop: ShopConfig {
                package: "act".to_string(),
                slot: "left_arm".to_string(),
                items_total: 3000,
                items_per_transaction: 500,
                gas_budget: 10_000_000_000,
                builder_id: None,
            },
        }
    }
}
