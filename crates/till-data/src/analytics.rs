//! Sales aggregation pipeline.
//!
//! Folds the raw sales rows into calendar-keyed revenue buckets and
//! per-model unit counts, returning a [`SalesAnalysis`] ready for the
//! report layer. Every call recomputes from the full row set; nothing is
//! cached between runs.

use std::collections::BTreeMap;

use csv::StringRecord;
use tracing::debug;

use crate::store::field;

// ── Public types ──────────────────────────────────────────────────────────────

/// Aggregated view over the whole sales store.
///
/// Bucket keys are derived from the leading characters of the row's
/// timestamp text: ten for a day (`2024-03-15`), seven for a month
/// (`2024-03`), four for a year (`2024`). A timestamp too short for the
/// bucket lands under `"Unknown"`. `BTreeMap` keeps every view sorted and
/// makes the best-seller tie-break deterministic.
#[derive(Debug, Clone, Default)]
pub struct SalesAnalysis {
    /// Revenue per day key.
    pub daily_revenue: BTreeMap<String, f64>,
    /// Revenue per month key.
    pub monthly_revenue: BTreeMap<String, f64>,
    /// Revenue per year key.
    pub yearly_revenue: BTreeMap<String, f64>,
    /// Units sold per model, per month key.
    pub monthly_units: BTreeMap<String, BTreeMap<String, u32>>,
    /// Units sold per model, per year key.
    pub yearly_units: BTreeMap<String, BTreeMap<String, u32>>,
    /// Units sold per model over the whole store.
    pub lifetime_units: BTreeMap<String, u32>,
    /// Number of rows that contributed to the totals.
    pub rows_processed: usize,
    /// Number of rows skipped as malformed.
    pub rows_skipped: usize,
}

impl SalesAnalysis {
    /// Lifetime revenue: the sum of every yearly bucket.
    pub fn grand_total(&self) -> f64 {
        self.yearly_revenue.values().sum()
    }

    /// Best-selling model for a month key, with its unit count.
    pub fn best_seller_for_month(&self, month: &str) -> Option<(&str, u32)> {
        self.monthly_units.get(month).and_then(best_of)
    }

    /// Best-selling model for a year key, with its unit count.
    pub fn best_seller_for_year(&self, year: &str) -> Option<(&str, u32)> {
        self.yearly_units.get(year).and_then(best_of)
    }

    /// Best-selling model over the whole store, with its unit count.
    pub fn best_seller_overall(&self) -> Option<(&str, u32)> {
        best_of(&self.lifetime_units)
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Fold raw sales rows into a [`SalesAnalysis`].
///
/// Two row shapes are recognised by field count:
///
/// * 8 fields: timestamp at 1, model at 3, quantity at 4, total at 5
/// * 7 fields: timestamp at 0, model at 2, quantity at 3, total at 4
///
/// Any other width, or a row whose quantity or total does not parse, is
/// skipped without touching the totals.
pub fn aggregate_sales(rows: &[StringRecord]) -> SalesAnalysis {
    let mut analysis = SalesAnalysis::default();

    for row in rows {
        let Some(sale) = parse_row(row) else {
            analysis.rows_skipped += 1;
            continue;
        };

        let day = bucket_key(sale.timestamp, 10);
        let month = bucket_key(sale.timestamp, 7);
        let year = bucket_key(sale.timestamp, 4);

        *analysis.daily_revenue.entry(day).or_insert(0.0) += sale.total;
        *analysis.monthly_revenue.entry(month.clone()).or_insert(0.0) += sale.total;
        *analysis.yearly_revenue.entry(year.clone()).or_insert(0.0) += sale.total;

        *analysis
            .monthly_units
            .entry(month)
            .or_default()
            .entry(sale.model.to_string())
            .or_insert(0) += sale.quantity;
        *analysis
            .yearly_units
            .entry(year)
            .or_default()
            .entry(sale.model.to_string())
            .or_insert(0) += sale.quantity;
        *analysis
            .lifetime_units
            .entry(sale.model.to_string())
            .or_insert(0) += sale.quantity;

        analysis.rows_processed += 1;
    }

    if analysis.rows_skipped > 0 {
        debug!(
            "Sales aggregation skipped {} malformed row(s)",
            analysis.rows_skipped
        );
    }
    analysis
}

// ── Private helpers ───────────────────────────────────────────────────────────

struct ParsedSale<'a> {
    timestamp: &'a str,
    model: &'a str,
    quantity: u32,
    total: f64,
}

/// Recognise a sales row by its width and pull out the aggregation fields.
fn parse_row(row: &StringRecord) -> Option<ParsedSale<'_>> {
    let (ts_idx, model_idx, qty_idx, total_idx) = match row.len() {
        8 => (1, 3, 4, 5),
        7 => (0, 2, 3, 4),
        _ => return None,
    };

    let quantity: u32 = field(row, qty_idx).parse().ok()?;
    let total: f64 = field(row, total_idx).parse().ok()?;

    Some(ParsedSale {
        timestamp: field(row, ts_idx),
        model: field(row, model_idx),
        quantity,
        total,
    })
}

/// First `len` characters of the timestamp, or `"Unknown"` when it is too
/// short to carry that bucket.
fn bucket_key(timestamp: &str, len: usize) -> String {
    match timestamp.get(..len) {
        Some(prefix) => prefix.to_string(),
        None => "Unknown".to_string(),
    }
}

/// Highest unit count in a bucket; on a tie the model that sorts first
/// wins, because the map iterates in key order and only a strictly
/// greater count displaces the current best.
fn best_of(units: &BTreeMap<String, u32>) -> Option<(&str, u32)> {
    let mut best: Option<(&str, u32)> = None;
    for (model, &count) in units {
        match best {
            Some((_, top)) if count <= top => {}
            _ => best = Some((model.as_str(), count)),
        }
    }
    best
}

// ── Tests ─────────────────────────────────────────────────────────────────────
