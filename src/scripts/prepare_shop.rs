//! Stock the genesis shop: create a builder for one equipment slot and mint
//! items from it across several transactions.

use anyhow::{anyhow, bail, Result};
use tracing::{error, info};

use crate::calls::genesis_shop::{self, AddSlotArgs};
use crate::calls::{Argument, TransactionBuilder, TransactionExecutor};
use crate::config::AppConfig;

/// One transaction of a [`MintPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    pub index: usize,
    pub items: u64,
    /// The last batch destroys the builder, earlier ones keep it.
    pub last: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintPlan {
    items_total: u64,
    items_per_transaction: u64,
    builder_id: Option<String>,
}

impl MintPlan {
    pub fn new(items_total: u64, items_per_transaction: u64, builder_id: Option<String>) -> Result<Self> {
        if items_total == 0 {
            bail!("nothing to mint: items_total is 0");
        }
        if items_per_transaction == 0 {
            bail!("items_per_transaction must be at least 1");
        }
        Ok(Self {
            items_total,
            items_per_transaction,
            builder_id,
        })
    }

    pub fn builder_id(&self) -> Option<&str> {
        self.builder_id.as_deref()
    }

    pub fn transactions(&self) -> u64 {
        self.items_total.div_ceil(self.items_per_transaction)
    }

    pub fn batches(&self) -> Vec<Batch> {
        let count = self.transactions();
        (0..count)
            .map(|i| {
                let minted = i * self.items_per_transaction;
                Batch {
                    index: i as usize,
                    items: self.items_per_transaction.min(self.items_total - minted),
                    last: i + 1 == count,
                }
            })
            .collect()
    }
}

/// Ids and settings the script calls into.
#[derive(Debug, Clone)]
pub struct ShopTargets {
    /// Package id calls are made against (latest upgrade).
    pub package: String,
    pub slot: String,
    pub genesis_shop: String,
    pub access_control: String,
    pub admin: String,
    pub gas_budget: u64,
}

impl ShopTargets {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let package = config.package(&config.shop.package)?;
        Ok(Self {
            package: package.published_at.clone(),
            slot: config.shop.slot.clone(),
            genesis_shop: config.object_id("genesis_shop")?.to_string(),
            access_control: config.object_id("access_control")?.to_string(),
            admin: config.object_id("admin")?.to_string(),
            gas_budget: config.shop.gas_budget,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReport {
    /// `None` only when the builder was created and destroyed in one transaction.
    pub builder_id: Option<String>,
    pub items_created: u64,
    pub digests: Vec<String>,
}

/// Build the transaction for `batch`, creating the builder when no id is known.
pub fn build_batch(targets: &ShopTargets, builder_id: Option<&str>, batch: &Batch) -> Result<TransactionBuilder> {
    let mut tx = TransactionBuilder::new();
    tx.set_gas_budget(targets.gas_budget);

    let builder: Argument = match builder_id {
        Some(id) => tx.object(id)?,
        None => genesis_shop::add_slot(
            &mut tx,
            &targets.package,
            &targets.slot,
            AddSlotArgs {
                genesis_shop: targets.genesis_shop.as_str().into(),
                access_control: targets.access_control.as_str().into(),
                admin: targets.admin.as_str().into(),
            },
        )?,
    };

    for _ in 0..batch.items {
        genesis_shop::new_item(&mut tx, &targets.package, targets.genesis_shop.as_str(), builder)?;
    }

    if batch.last {
        genesis_shop::destroy_builder(&mut tx, &targets.package, builder)?;
    } else {
        genesis_shop::keep(&mut tx, &targets.package, builder)?;
    }
    Ok(tx)
}

/// Execute `plan`, stopping at the first failed transaction.
pub async fn run(executor: &dyn TransactionExecutor, targets: &ShopTargets, plan: &MintPlan) -> Result<MintReport> {
    info!("🏪 Preparing shop: slot {} via {}", targets.slot, executor.description());
    info!(
        "  {} items in {} transactions",
        plan.items_total,
        plan.transactions()
    );

    let mut builder_id = plan.builder_id().map(str::to_string);
    let mut report = MintReport {
        builder_id: None,
        items_created: 0,
        digests: Vec::new(),
    };

    for batch in plan.batches() {
        let tx = build_batch(targets, builder_id.as_deref(), &batch)?;
        let outcome = executor.execute(&tx.finish()).await?;

        if !outcome.success {
            let reason = outcome.error.unwrap_or_else(|| "unknown error".to_string());
            error!("❌ Transaction {} ({}) failed: {}", batch.index + 1, outcome.digest, reason);
            bail!(
                "transaction {} failed after {} items were created: {}",
                batch.index + 1,
                report.items_created,
                reason
            );
        }

        report.items_created += batch.items;
        report.digests.push(outcome.digest.clone());
        info!("✅ Items created: {}", report.items_created);

        if builder_id.is_none() && !batch.last {
            let created = outcome
                .created_with_type_suffix("::Builder")
                .ok_or_else(|| anyhow!("transaction {} did not create a builder", outcome.digest))?;
            info!("Builder: {}", created.object_id);
            builder_id = Some(created.object_id.clone());
        }
    }

    report.builder_id = builder_id;
    Ok(report)
}
