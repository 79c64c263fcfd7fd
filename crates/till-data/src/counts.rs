//! Stock counts: reconcile shelf counts against the inventory.
//!
//! The operator keys in what was physically counted per model; the home
//! outlet's column is overwritten with those counts and each line's
//! variance against the stored figure is reported. Unknown models are
//! skipped, and a count where nothing applied saves nothing.

use std::path::{Path, PathBuf};

use till_core::error::{Result, TillError};
use tracing::{info, warn};

use crate::inventory::InventoryStore;
use crate::movement::SkippedItem;

/// One counted line with the figure it replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountVariance {
    pub model_id: String,
    /// Units the store said the outlet held.
    pub expected: u32,
    /// Units the operator counted.
    pub counted: u32,
}

impl CountVariance {
    /// Counted minus expected: negative when stock is missing.
    pub fn delta(&self) -> i64 {
        i64::from(self.counted) - i64::from(self.expected)
    }

    /// Whether the count disagreed with the store.
    pub fn is_discrepant(&self) -> bool {
        self.counted != self.expected
    }
}

/// What a processed count did.
#[derive(Debug, Clone)]
pub struct CountOutcome {
    /// Every applied line, discrepant or not, in request order.
    pub variances: Vec<CountVariance>,
    /// Lines naming models the store does not hold.
    pub skipped: Vec<SkippedItem>,
}

impl CountOutcome {
    /// Lines where the shelf disagreed with the store.
    pub fn discrepancies(&self) -> Vec<&CountVariance> {
        self.variances.iter().filter(|v| v.is_discrepant()).collect()
    }
}

/// Stock counting for one outlet.
#[derive(Debug, Clone)]
pub struct StockCount {
    data_dir: PathBuf,
    outlet_code: String,
}

impl StockCount {
    /// Counts overwriting `outlet_code`'s column of the inventory.
    pub fn new(data_dir: &Path, outlet_code: &str) -> Self {
        StockCount {
            data_dir: data_dir.to_path_buf(),
            outlet_code: outlet_code.to_string(),
        }
    }

    /// Expected units per model at the home outlet, the sheet a count
    /// starts from.
    pub fn sheet(&self) -> Result<Vec<(String, u32)>> {
        let inventory = InventoryStore::new(&self.data_dir).load()?;
        inventory.count_sheet(&self.outlet_code)
    }

    /// Apply counted figures and report the variances.
    pub fn process(&self, items: &[(String, u32)]) -> Result<CountOutcome> {
        let inventory_store = InventoryStore::new(&self.data_dir);
        let mut inventory = inventory_store.load()?;

        let mut variances = Vec::new();
        let mut skipped = Vec::new();

        for (model_id, counted) in items {
            match inventory.set_quantity(model_id, &self.outlet_code, *counted) {
                Ok(expected) => {
                    let stored_id = inventory
                        .find(model_id)
                        .map(|item| item.model_id.clone())
                        .unwrap_or_else(|| model_id.clone());
                    variances.push(CountVariance {
                        model_id: stored_id,
                        expected,
                        counted: *counted,
                    });
                }
                Err(TillError::UnknownModel(model)) => {
                    warn!("Skipping count line for unknown model {}", model);
                    skipped.push(SkippedItem {
                        model_id: model,
                        reason: "unknown model".to_string(),
                    });
                }
                Err(other) => return Err(other),
            }
        }

        if variances.is_empty() {
            info!("Stock count applied nothing, store left untouched");
            return Ok(CountOutcome { variances, skipped });
        }

        inventory_store.save(&inventory)?;
        info!(
            "Stock count applied {} line(s), {} discrepant",
            variances.len(),
            variances.iter().filter(|v| v.is_discrepant()).count()
        );
        Ok(CountOutcome { variances, skipped })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
