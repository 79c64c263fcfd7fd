//! Point-of-sale flow: check stock, deduct, log the sale, print the
//! receipt.
//!
//! A sale only persists once every check has passed, so a rejected sale
//! leaves all three stores exactly as they were.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use till_core::error::{Result, TillError};
use till_core::models::{PaymentMethod, SaleRecord};
use tracing::info;

use crate::inventory::InventoryStore;
use crate::outlets::OutletDirectory;
use crate::receipts::{self, SaleReceipt};
use crate::sales::SalesLog;

/// What the till operator keyed in for one sale.
#[derive(Debug, Clone)]
pub struct SaleRequest {
    pub model_id: String,
    pub quantity: u32,
    pub customer: String,
    pub method: PaymentMethod,
    pub staff: String,
}

/// Everything a completed sale produced.
#[derive(Debug, Clone)]
pub struct SaleOutcome {
    /// The row appended to the sales store.
    pub sale: SaleRecord,
    /// Units of the model left at the home outlet.
    pub remaining: u32,
    /// Day file the receipt went to.
    pub receipt_path: PathBuf,
}

/// The till of one outlet.
#[derive(Debug, Clone)]
pub struct Register {
    data_dir: PathBuf,
    outlet_code: String,
}

impl Register {
    /// Register selling from `outlet_code`'s column of the inventory.
    pub fn new(data_dir: &Path, outlet_code: &str) -> Self {
        Register {
            data_dir: data_dir.to_path_buf(),
            outlet_code: outlet_code.to_string(),
        }
    }

    /// Run one sale at `now`.
    ///
    /// The home outlet's column is checked and deducted first; only then
    /// is the sale logged and its receipt appended. Unknown models,
    /// insufficient stock and a zero quantity all fail before anything is
    /// written.
    pub fn process_sale(&self, request: &SaleRequest, now: NaiveDateTime) -> Result<SaleOutcome> {
        if request.quantity == 0 {
            return Err(TillError::Config("Quantity must be at least 1".to_string()));
        }

        let inventory_store = InventoryStore::new(&self.data_dir);
        let mut inventory = inventory_store.load()?;

        let item = inventory
            .find(&request.model_id)
            .ok_or_else(|| TillError::UnknownModel(request.model_id.clone()))?;
        let model_id = item.model_id.clone();
        let unit_price = item.price;

        let remaining = inventory.record_sale(&model_id, request.quantity, &self.outlet_code)?;
        inventory_store.save(&inventory)?;

        let sale = SaleRecord {
            timestamp: now,
            customer: request.customer.clone(),
            model_id,
            quantity: request.quantity,
            total: unit_price * f64::from(request.quantity),
            method: request.method,
            staff: request.staff.clone(),
        };
        SalesLog::new(&self.data_dir).append(&sale)?;

        let outlet_label = OutletDirectory::new(&self.data_dir).label_for(&self.outlet_code)?;
        let receipt = SaleReceipt {
            outlet_label,
            timestamp: sale.timestamp,
            customer: sale.customer.clone(),
            model_id: sale.model_id.clone(),
            quantity: sale.quantity,
            unit_price,
            total: sale.total,
            method: sale.method,
            staff: sale.staff.clone(),
        };
        let receipt_path = receipts::append_sale_receipt(&self.data_dir, &receipt)?;

        info!(
            "Sale {} completed: {} x{} ({} left at {})",
            sale.reference(),
            sale.model_id,
            sale.quantity,
            remaining,
            self.outlet_code
        );
        Ok(SaleOutcome {
            sale,
            remaining,
            receipt_path,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
