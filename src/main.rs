use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sui_reified::calls::{CreatedObject, DryRunExecutor};
use sui_reified::config::AppConfig;
use sui_reified::decoder::{to_json, FieldsWithTypes};
use sui_reified::rpc::SuiRpcClient;
use sui_reified::scripts::{prepare_shop, MintPlan, ShopTargets};
use sui_reified::{DescriptorRegistry, RegistryBuilder, SourceEncoding, StructDecoder};

#[derive(Debug, Parser)]
#[command(name = "reified", version, about = "Decode and canonicalize Sui Move structs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the canonical form of a type string
    Canonicalize { type_string: String },
    /// Instantiate a registered struct and print its resolved field types
    Reify { type_string: String },
    /// Fetch an object from the fullnode and print it as canonical JSON
    Fetch {
        #[arg(long = "type")]
        type_string: String,
        object_id: String,
    },
    /// Decode a local value and print it as canonical JSON
    Decode {
        #[arg(long = "type")]
        type_string: String,
        /// Canonical JSON file
        #[arg(long, conflicts_with_all = ["bcs_hex", "fields"])]
        json: Option<PathBuf>,
        /// BCS bytes as hex
        #[arg(long, conflicts_with = "fields")]
        bcs_hex: Option<String>,
        /// Fullnode `{ type, fields }` file
        #[arg(long)]
        fields: Option<PathBuf>,
    },
    /// Dry-run the shop minting plan from config
    PrepareShop {
        /// Equipment slot, overriding `shop.slot`
        #[arg(long)]
        slot: Option<String>,
        /// Existing builder id, overriding `shop.builder_id`
        #[arg(long)]
        builder: Option<String>,
    },
}

fn build_registry(config: &AppConfig) -> Result<DescriptorRegistry> {
    let mut builder = RegistryBuilder::new(config.canonicalizer()?);
    if let Some(path) = &config.schema.path {
        builder = builder.load_schema_file(path)?;
    }
    let registry = builder.build()?;
    info!("Registry ready with {} structs", registry.len());
    Ok(registry)
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only command output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().await?;

    match cli.command {
        Command::Canonicalize { type_string } => {
            println!("{}", config.canonicalizer()?.canonicalize(&type_string)?);
        }
        Command::Reify { type_string } => {
            let registry = build_registry(&config)?;
            let ty = registry.reify_str(&type_string)?;
            println!("{}", ty.full_type_name());
            for (field, tag) in ty.fields() {
                println!("  {}: {}", field.name, registry.canonicalizer().render(tag));
            }
        }
        Command::Fetch { type_string, object_id } => {
            let registry = Arc::new(build_registry(&config)?);
            let client = Arc::new(SuiRpcClient::new(&config.rpc)?);
            let decoder = StructDecoder::new(registry.clone()).with_client(client);
            let ty = registry.reify_str(&type_string)?;
            let instance = decoder
                .decode(&ty, &SourceEncoding::RemoteReference(object_id))
                .await?;
            print_json(&to_json(&instance))?;
        }
        Command::Decode {
            type_string,
            json,
            bcs_hex,
            fields,
        } => {
            let source = match (json, bcs_hex, fields) {
                (Some(path), None, None) => SourceEncoding::Json(read_json(&path)?),
                (None, Some(hex_bytes), None) => {
                    let bytes = hex::decode(hex_bytes.trim_start_matches("0x")).context("--bcs-hex is not valid hex")?;
                    SourceEncoding::Binary(bytes)
                }
                (None, None, Some(path)) => {
                    let item: FieldsWithTypes = serde_json::from_value(read_json(&path)?)
                        .map_err(|e| anyhow!("{} is not a typed-fields object: {}", path.display(), e))?;
                    SourceEncoding::TypedFields(item)
                }
                _ => bail!("pass exactly one of --json, --bcs-hex or --fields"),
            };

            let registry = Arc::new(build_registry(&config)?);
            let decoder = StructDecoder::new(registry.clone());
            let ty = registry.reify_str(&type_string)?;
            let instance = decoder.decode(&ty, &source).await?;
            print_json(&to_json(&instance))?;
        }
        Command::PrepareShop { slot, builder } => {
            let mut targets = ShopTargets::from_config(&config)?;
            if let Some(slot) = slot {
                targets.slot = slot;
            }
            let builder_id = builder.or_else(|| config.shop.builder_id.clone());
            let plan = MintPlan::new(config.shop.items_total, config.shop.items_per_transaction, builder_id)?;

            // Without a real chain nothing is created; report a placeholder builder.
            let mut executor = DryRunExecutor::new();
            if plan.builder_id().is_none() {
                let package = config.package(&config.shop.package)?;
                executor = executor.creating(CreatedObject {
                    object_id: format!("0x{:064x}", 0xb),
                    object_type: format!("{}::genesis_shop::Builder", package.original_id),
                });
            }

            let report = prepare_shop::run(&executor, &targets, &plan).await?;
            info!("🏁 {} items in {} transactions", report.items_created, report.digests.len());
            if let Some(id) = report.builder_id {
                println!("builder: {}", id);
            }
            println!("items created: {}", report.items_created);
        }
    }

    Ok(())
}
