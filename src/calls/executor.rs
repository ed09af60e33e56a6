use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::info;

use crate::calls::transaction::{CallArg, ProgrammableTransaction};
use crate::models::long_address;

/// Object created by an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedObject {
    pub object_id: String,
    pub object_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub digest: String,
    pub success: bool,
    /// Abort or execution error when `success` is false.
    pub error: Option<String>,
    pub created: Vec<CreatedObject>,
}

impl ExecutionOutcome {
    /// First created object whose type ends with `suffix`, e.g. `::Builder`.
    pub fn created_with_type_suffix(&self, suffix: &str) -> Option<&CreatedObject> {
        self.created.iter().find(|object| object.object_type.ends_with(suffix))
    }
}

/// Submits programmable transactions.
///
/// `Err` means the transaction could not be submitted at all; a transaction
/// that ran and aborted comes back as `Ok` with `success == false`.
#[async_trait]
pub trait TransactionExecutor: Send + Sync {
    async fn execute(&self, transaction: &ProgrammableTransaction) -> Result<ExecutionOutcome>;

    /// Get a human-readable description of this executor
    fn description(&self) -> &str;
}

/// Logs each transaction instead of signing it and reports success.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    executed: AtomicU64,
    pending_created: Mutex<Vec<CreatedObject>>,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        info!("🔧 Initializing DryRunExecutor (transactions are logged, never signed)");
        Self::default()
    }

    /// Report `object` as created by the next executed transaction.
    pub fn creating(self, object: CreatedObject) -> Self {
        if let Ok(mut pending) = self.pending_created.lock() {
            pending.push(object);
        }
        self
    }

    pub fn executed(&self) -> u64 {
        self.executed.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TransactionExecutor for DryRunExecutor {
    async fn execute(&self, transaction: &ProgrammableTransaction) -> Result<ExecutionOutcome> {
        if transaction.commands.is_empty() {
            bail!("transaction has no commands");
        }

        let n = self.executed.fetch_add(1, Ordering::Relaxed) + 1;
        let digest = format!("dry-run-{}", n);

        info!(
            "🧪 Dry run {}: {} commands, {} inputs, gas budget {:?}",
            digest,
            transaction.commands.len(),
            transaction.inputs.len(),
            transaction.gas_budget
        );
        for (idx, input) in transaction.inputs.iter().enumerate() {
            match input {
                CallArg::Object(id) => tracing::debug!("  input {}: object {}", idx, long_address(id)),
                CallArg::Pure(bytes) => tracing::debug!("  input {}: pure 0x{}", idx, hex::encode(bytes)),
            }
        }
        for (idx, command) in transaction.commands.iter().enumerate() {
            tracing::debug!("  command {}: {}", idx, command);
        }

        let created = match self.pending_created.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => bail!("dry-run executor state is poisoned"),
        };

        Ok(ExecutionOutcome {
            digest,
            success: true,
            error: None,
            created,
        })
    }

    fn description(&self) -> &str {
        "DryRunExecutor"
    }
}
