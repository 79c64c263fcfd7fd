//! Inventory matrix over `model.csv`.
//!
//! The store is a matrix: one row per phone model, one quantity column per
//! outlet, with the outlet codes taken from the header. Reads are tolerant
//! (short rows are zero-padded, unparsable numbers count as zero) and every
//! write rebuilds the full matrix so no outlet's column is ever dropped.
//!
//! [`Inventory`] is the in-memory snapshot with the stock operations;
//! [`InventoryStore`] moves snapshots to and from disk. Callers that batch
//! several adjustments load once, mutate, then save once.

use std::path::{Path, PathBuf};

use csv::StringRecord;
use till_core::error::{Result, TillError};
use till_core::models::{normalize_model_id, StockItem};
use tracing::{debug, info};

use crate::store::{self, field};

/// Store file name inside the data directory.
pub const MODEL_FILE: &str = "model.csv";

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// In-memory snapshot of the model store.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    outlets: Vec<String>,
    items: Vec<StockItem>,
}

impl Inventory {
    /// Empty snapshot carrying the given outlet columns.
    pub fn with_outlets(outlets: Vec<String>) -> Self {
        Inventory {
            outlets,
            items: Vec::new(),
        }
    }

    /// Outlet codes in header order.
    pub fn outlets(&self) -> &[String] {
        &self.outlets
    }

    /// Every stock row in file order.
    pub fn items(&self) -> &[StockItem] {
        &self.items
    }

    /// Column index of an outlet code, matched case-insensitively.
    pub fn outlet_index(&self, outlet_code: &str) -> Result<usize> {
        self.outlets
            .iter()
            .position(|code| code.eq_ignore_ascii_case(outlet_code))
            .ok_or_else(|| TillError::UnknownOutlet(outlet_code.to_string()))
    }

    /// The stock row for a model, matched case-insensitively.
    pub fn find(&self, model_id: &str) -> Option<&StockItem> {
        let wanted = normalize_model_id(model_id);
        self.items
            .iter()
            .find(|item| normalize_model_id(&item.model_id) == wanted)
    }

    /// Unit price of a model.
    pub fn price(&self, model_id: &str) -> Result<f64> {
        self.find(model_id)
            .map(|item| item.price)
            .ok_or_else(|| TillError::UnknownModel(model_id.to_string()))
    }

    /// Units of a model held at an outlet.
    pub fn quantity(&self, model_id: &str, outlet_code: &str) -> Result<u32> {
        let column = self.outlet_index(outlet_code)?;
        let item = self
            .find(model_id)
            .ok_or_else(|| TillError::UnknownModel(model_id.to_string()))?;
        Ok(item.quantities.get(column).copied().unwrap_or(0))
    }

    // ── Stock operations ──────────────────────────────────────────────────

    /// Deduct a sale from an outlet's column and return the remaining
    /// units.
    ///
    /// Fails without touching the snapshot when the model is unknown or
    /// the outlet holds fewer units than requested.
    pub fn record_sale(&mut self, model_id: &str, quantity: u32, outlet_code: &str) -> Result<u32> {
        let column = self.outlet_index(outlet_code)?;
        let index = self
            .position(model_id)
            .ok_or_else(|| TillError::UnknownModel(model_id.to_string()))?;

        let available = self.items[index].quantities.get(column).copied().unwrap_or(0);
        if available < quantity {
            return Err(TillError::InsufficientStock {
                model: self.items[index].model_id.clone(),
                requested: quantity,
                available,
            });
        }

        let remaining = available - quantity;
        self.items[index].quantities[column] = remaining;
        Ok(remaining)
    }

    /// Add received units to an outlet's column and return the new count.
    ///
    /// An unknown model is created first, priced at zero with empty
    /// columns, so a delivery can introduce stock the store has never
    /// seen.
    pub fn receive(&mut self, model_id: &str, quantity: u32, outlet_code: &str) -> Result<u32> {
        let column = self.outlet_index(outlet_code)?;
        let index = match self.position(model_id) {
            Some(index) => index,
            None => {
                let created = normalize_model_id(model_id);
                debug!("Creating inventory row for new model {}", created);
                self.items.push(StockItem {
                    model_id: created,
                    price: 0.0,
                    quantities: vec![0; self.outlets.len()],
                });
                self.items.len() - 1
            }
        };

        let current = self.items[index].quantities.get(column).copied().unwrap_or(0);
        let updated = current.saturating_add(quantity);
        self.items[index].quantities[column] = updated;
        Ok(updated)
    }

    /// Remove dispatched units from an outlet's column and return the new
    /// count. The column floors at zero when more is dispatched than held.
    pub fn dispatch(&mut self, model_id: &str, quantity: u32, outlet_code: &str) -> Result<u32> {
        let column = self.outlet_index(outlet_code)?;
        let index = self
            .position(model_id)
            .ok_or_else(|| TillError::UnknownModel(model_id.to_string()))?;

        let current = self.items[index].quantities.get(column).copied().unwrap_or(0);
        let updated = current.saturating_sub(quantity);
        self.items[index].quantities[column] = updated;
        Ok(updated)
    }

    /// Set the unit price of a model.
    pub fn set_price(&mut self, model_id: &str, price: f64) -> Result<()> {
        let index = self
            .position(model_id)
            .ok_or_else(|| TillError::UnknownModel(model_id.to_string()))?;
        self.items[index].price = price;
        Ok(())
    }

    /// Overwrite an outlet's column for a model and return the previous
    /// count. Used by stock counts to reconcile shelf reality with the
    /// store.
    pub fn set_quantity(
        &mut self,
        model_id: &str,
        outlet_code: &str,
        quantity: u32,
    ) -> Result<u32> {
        let column = self.outlet_index(outlet_code)?;
        let index = self
            .position(model_id)
            .ok_or_else(|| TillError::UnknownModel(model_id.to_string()))?;

        let previous = self.items[index].quantities.get(column).copied().unwrap_or(0);
        self.items[index].quantities[column] = quantity;
        Ok(previous)
    }

    /// Expected units per model at an outlet, in file order. The starting
    /// point of a stock count.
    pub fn count_sheet(&self, outlet_code: &str) -> Result<Vec<(String, u32)>> {
        let column = self.outlet_index(outlet_code)?;
        Ok(self
            .items
            .iter()
            .map(|item| {
                (
                    item.model_id.clone(),
                    item.quantities.get(column).copied().unwrap_or(0),
                )
            })
            .collect())
    }

    fn position(&self, model_id: &str) -> Option<usize> {
        let wanted = normalize_model_id(model_id);
        self.items
            .iter()
            .position(|item| normalize_model_id(&item.model_id) == wanted)
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// Disk access for [`Inventory`] snapshots.
#[derive(Debug, Clone)]
pub struct InventoryStore {
    path: PathBuf,
}

impl InventoryStore {
    /// Store over `model.csv` inside `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        InventoryStore {
            path: data_dir.join(MODEL_FILE),
        }
    }

    /// Path of the backing store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full matrix. A missing store loads as an empty snapshot
    /// with no outlet columns.
    ///
    /// Rows shorter than the header are padded with zero quantities and
    /// longer rows lose their extra cells, so the snapshot always matches
    /// the header's width. A quantity or price that does not parse counts
    /// as zero.
    pub fn load(&self) -> Result<Inventory> {
        let contents = store::read_store(&self.path)?;
        let Some(header) = contents.header else {
            return Ok(Inventory::default());
        };

        let outlets: Vec<String> = header.iter().skip(2).map(str::to_string).collect();
        let mut items = Vec::new();

        for row in &contents.rows {
            let model_id = field(row, 0);
            if model_id.is_empty() {
                debug!("Skipping inventory row without a model id");
                continue;
            }

            let price: f64 = field(row, 1).parse().unwrap_or(0.0);
            // Missing cells read as "" and parse to zero, which pads short
            // rows to the header's width.
            let quantities: Vec<u32> = (0..outlets.len())
                .map(|i| field(row, 2 + i).parse().unwrap_or(0))
                .collect();

            if row.len() > 2 + outlets.len() {
                debug!(
                    "Inventory row for {} wider than header, dropping extra cells",
                    model_id
                );
            }

            items.push(StockItem {
                model_id: model_id.to_string(),
                price,
                quantities,
            });
        }

        Ok(Inventory { outlets, items })
    }

    /// Write the full matrix back, rebuilding the header from the
    /// snapshot's outlet columns. Prices are stored with two decimals.
    pub fn save(&self, inventory: &Inventory) -> Result<()> {
        let mut header = vec!["Model".to_string(), "Price".to_string()];
        header.extend(inventory.outlets.iter().cloned());
        let header = StringRecord::from(header);

        let rows: Vec<StringRecord> = inventory
            .items
            .iter()
            .map(|item| {
                let mut fields = vec![item.model_id.clone(), format!("{:.2}", item.price)];
                fields.extend(item.quantities.iter().map(u32::to_string));
                StringRecord::from(fields)
            })
            .collect();

        store::write_store(&self.path, &header, &rows)?;
        info!(
            "Saved inventory: {} model(s) across {} outlet column(s)",
            inventory.items.len(),
            inventory.outlets.len()
        );
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
