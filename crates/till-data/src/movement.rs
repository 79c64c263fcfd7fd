//! Batch stock movements: deliveries in, transfers and returns out.
//!
//! A movement names a counterparty and a list of model/quantity pairs.
//! The inventory loads once, every applicable line adjusts the home
//! outlet's column, and one save plus one movement entry record the
//! batch. Lines that cannot apply are reported back instead of aborting
//! the batch; a batch where nothing applied saves nothing and writes no
//! entry.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use till_core::error::{Result, TillError};
use till_core::models::MovementDirection;
use tracing::{info, warn};

use crate::inventory::InventoryStore;
use crate::outlets::OutletDirectory;
use crate::receipts::{self, MovementLine, MovementReceipt};

/// A line the batch could not apply, with the reason shown to the
/// operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub model_id: String,
    pub reason: String,
}

/// One requested stock movement batch.
#[derive(Debug, Clone)]
pub struct MovementRequest {
    pub direction: MovementDirection,
    pub counterparty: String,
    /// Model and unit count per line.
    pub items: Vec<(String, u32)>,
    pub staff: String,
}

/// What a processed batch did.
#[derive(Debug, Clone)]
pub struct MovementOutcome {
    /// Lines that adjusted the inventory, with the new balances.
    pub applied: Vec<MovementLine>,
    /// Lines that did not.
    pub skipped: Vec<SkippedItem>,
    /// Day file the entry went to, when anything applied.
    pub receipt_path: Option<PathBuf>,
}

/// Stock movement processing for one outlet.
#[derive(Debug, Clone)]
pub struct StockMovement {
    data_dir: PathBuf,
    outlet_code: String,
}

impl StockMovement {
    /// Movements adjusting `outlet_code`'s column of the inventory.
    pub fn new(data_dir: &Path, outlet_code: &str) -> Self {
        StockMovement {
            data_dir: data_dir.to_path_buf(),
            outlet_code: outlet_code.to_string(),
        }
    }

    /// Apply a batch at `now`.
    ///
    /// Stock in creates models the store has never seen; stock out skips
    /// unknown models and floors existing ones at zero. Zero-quantity
    /// lines are skipped. The inventory is saved and the movement entry
    /// appended only when at least one line applied.
    pub fn process(&self, request: &MovementRequest, now: NaiveDateTime) -> Result<MovementOutcome> {
        let inventory_store = InventoryStore::new(&self.data_dir);
        let mut inventory = inventory_store.load()?;

        let mut applied = Vec::new();
        let mut skipped = Vec::new();

        for (model_id, quantity) in &request.items {
            if *quantity == 0 {
                skipped.push(SkippedItem {
                    model_id: model_id.clone(),
                    reason: "quantity must be at least 1".to_string(),
                });
                continue;
            }

            let adjusted = match request.direction {
                MovementDirection::In => {
                    inventory.receive(model_id, *quantity, &self.outlet_code)
                }
                MovementDirection::Out => {
                    inventory.dispatch(model_id, *quantity, &self.outlet_code)
                }
            };

            match adjusted {
                Ok(balance) => {
                    // receive() may have normalised the stored id.
                    let stored_id = inventory
                        .find(model_id)
                        .map(|item| item.model_id.clone())
                        .unwrap_or_else(|| model_id.clone());
                    applied.push(MovementLine {
                        model_id: stored_id,
                        quantity: *quantity,
                        balance,
                    });
                }
                Err(TillError::UnknownModel(model)) => {
                    warn!("Skipping movement line for unknown model {}", model);
                    skipped.push(SkippedItem {
                        model_id: model,
                        reason: "unknown model".to_string(),
                    });
                }
                Err(other) => return Err(other),
            }
        }

        if applied.is_empty() {
            info!("Movement batch applied nothing, stores left untouched");
            return Ok(MovementOutcome {
                applied,
                skipped,
                receipt_path: None,
            });
        }

        inventory_store.save(&inventory)?;

        let outlet_label = OutletDirectory::new(&self.data_dir).label_for(&self.outlet_code)?;
        let receipt = MovementReceipt {
            direction: request.direction,
            outlet_label,
            counterparty: request.counterparty.clone(),
            timestamp: now,
            staff: request.staff.clone(),
            lines: applied.clone(),
        };
        let receipt_path = receipts::append_movement_receipt(&self.data_dir, &receipt)?;

        info!(
            "{} with {}: {} line(s) applied, {} skipped",
            request.direction,
            request.counterparty,
            applied.len(),
            skipped.len()
        );
        Ok(MovementOutcome {
            applied,
            skipped,
            receipt_path: Some(receipt_path),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::MODEL_FILE;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::TempDir;

    fn seed_inventory(dir: &TempDir) {
        let mut model = std::fs::File::create(dir.path().join(MODEL_FILE)).unwrap();
        writeln!(model, "Model,Price,C60,C61").unwrap();
        writeln!(model, "A55,1199.00,12,5").unwrap();
        writeln!(model, "S24,5099.00,3,0").unwrap();
    }

    fn request(direction: MovementDirection, items: &[(&str, u32)]) -> MovementRequest {
        MovementRequest {
            direction,
            counterparty: "MAIN WAREHOUSE".to_string(),
            items: items
                .iter()
                .map(|(model, quantity)| (model.to_string(), *quantity))
                .collect(),
            staff: "E001".to_string(),
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_stock_in_applies_batch_and_writes_entry() {
        let dir = TempDir::new().unwrap();
        seed_inventory(&dir);

        let outcome = StockMovement::new(dir.path(), "C60")
            .process(&request(MovementDirection::In, &[("A55", 5), ("X70", 3)]), now())
            .unwrap();

        assert_eq!(outcome.applied.len(), 2);
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.applied[0].balance, 17);
        assert_eq!(outcome.applied[1].model_id, "X70");
        assert_eq!(outcome.applied[1].balance, 3);

        let inventory = InventoryStore::new(dir.path()).load().unwrap();
        assert_eq!(inventory.quantity("A55", "C60").unwrap(), 17);
        assert_eq!(inventory.quantity("X70", "C60").unwrap(), 3);
        assert_eq!(inventory.find("X70").unwrap().price, 0.0);

        let path = outcome.receipt_path.unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("Stock In at C60"));
        assert!(text.contains("MAIN WAREHOUSE"));
    }

    #[test]
    fn test_stock_out_skips_unknown_and_clamps() {
        let dir = TempDir::new().unwrap();
        seed_inventory(&dir);

        let outcome = StockMovement::new(dir.path(), "C60")
            .process(
                &request(MovementDirection::Out, &[("S24", 10), ("X99", 1), ("A55", 2)]),
                now(),
            )
            .unwrap();

        assert_eq!(outcome.applied.len(), 2);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].model_id, "X99");
        assert_eq!(outcome.skipped[0].reason, "unknown model");

        let inventory = InventoryStore::new(dir.path()).load().unwrap();
        // Floored at zero, not negative.
        assert_eq!(inventory.quantity("S24", "C60").unwrap(), 0);
        assert_eq!(inventory.quantity("A55", "C60").unwrap(), 10);
    }

    #[test]
    fn test_all_skipped_batch_saves_nothing() {
        let dir = TempDir::new().unwrap();
        seed_inventory(&dir);
        let before = std::fs::read_to_string(dir.path().join(MODEL_FILE)).unwrap();

        let outcome = StockMovement::new(dir.path(), "C60")
            .process(
                &request(MovementDirection::Out, &[("X99", 1), ("A55", 0)]),
                now(),
            )
            .unwrap();

        assert!(outcome.applied.is_empty());
        assert_eq!(outcome.skipped.len(), 2);
        assert!(outcome.receipt_path.is_none());
        assert_eq!(
            std::fs::read_to_string(dir.path().join(MODEL_FILE)).unwrap(),
            before
        );
        assert!(!dir.path().join("StockMovements_2024-03-15.txt").exists());
    }

    #[test]
    fn test_zero_quantity_line_is_skipped() {
        let dir = TempDir::new().unwrap();
        seed_inventory(&dir);

        let outcome = StockMovement::new(dir.path(), "C60")
            .process(&request(MovementDirection::In, &[("A55", 0), ("S24", 1)]), now())
            .unwrap();

        assert_eq!(outcome.applied.len(), 1);
        assert_eq!(outcome.skipped[0].reason, "quantity must be at least 1");
    }

    #[test]
    fn test_batch_preserves_other_outlet_columns() {
        let dir = TempDir::new().unwrap();
        seed_inventory(&dir);

        StockMovement::new(dir.path(), "C60")
            .process(&request(MovementDirection::In, &[("A55", 1)]), now())
            .unwrap();

        let inventory = InventoryStore::new(dir.path()).load().unwrap();
        assert_eq!(inventory.outlets(), ["C60", "C61"]);
        assert_eq!(inventory.quantity("A55", "C61").unwrap(), 5);
        assert_eq!(inventory.quantity("S24", "C61").unwrap(), 0);
    }

    #[test]
    fn test_single_batch_writes_single_save() {
        let dir = TempDir::new().unwrap();
        seed_inventory(&dir);

        let outcome = StockMovement::new(dir.path(), "C60")
            .process(
                &request(MovementDirection::In, &[("A55", 1), ("A55", 1), ("A55", 1)]),
                now(),
            )
            .unwrap();

        assert_eq!(outcome.applied.last().unwrap().balance, 15);
        let inventory = InventoryStore::new(dir.path()).load().unwrap();
        assert_eq!(inventory.quantity("A55", "C60").unwrap(), 15);
    }
}
