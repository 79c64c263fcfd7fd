use std::collections::BTreeMap;

use till_core::formatting::{format_currency, format_units};
use till_data::analytics::SalesAnalysis;

const RULE_WIDTH: usize = 40;

// ── Entry point ────────────────────────────────────────────────────────────────

/// Render the requested analytics view as a text block.
///
/// Knows `daily`, `monthly`, `yearly` and `best-sellers`; anything else
/// renders the summary.
pub fn render(view: &str, analysis: &SalesAnalysis) -> String {
    match view {
        "daily" => daily(analysis),
        "monthly" => monthly(analysis),
        "yearly" => yearly(analysis),
        "best-sellers" => best_sellers(analysis),
        _ => summary(analysis),
    }
}

// ── Views ──────────────────────────────────────────────────────────────────────

/// Lifetime headline figures.
fn summary(analysis: &SalesAnalysis) -> String {
    let mut lines = title_lines("SALES SUMMARY");
    lines.push(format!(
        "Total lifetime revenue : {}",
        format_currency(analysis.grand_total())
    ));
    lines.push(format!(
        "Active sales days      : {}",
        analysis.daily_revenue.len()
    ));
    lines.push(format!(
        "Active sales months    : {}",
        analysis.monthly_revenue.len()
    ));
    lines.push(format!(
        "Active sales years     : {}",
        analysis.yearly_revenue.len()
    ));
    lines.push(format!(
        "Best-selling product   : {}",
        best_label(analysis.best_seller_overall())
    ));
    lines.join("\n")
}

fn daily(analysis: &SalesAnalysis) -> String {
    bucket_table("DAILY SALES", &analysis.daily_revenue, |_| None)
}

fn monthly(analysis: &SalesAnalysis) -> String {
    bucket_table("MONTHLY SALES", &analysis.monthly_revenue, |month| {
        analysis
            .best_seller_for_month(month)
            .map(|best| format!("best: {}", seller_label(best)))
    })
}

fn yearly(analysis: &SalesAnalysis) -> String {
    bucket_table("YEARLY SALES", &analysis.yearly_revenue, |year| {
        analysis
            .best_seller_for_year(year)
            .map(|best| format!("best: {}", seller_label(best)))
    })
}

/// Best-selling model per month, per year and overall.
fn best_sellers(analysis: &SalesAnalysis) -> String {
    let mut lines = title_lines("BEST SELLERS");
    if analysis.lifetime_units.is_empty() {
        lines.push("No sales recorded.".to_string());
        return lines.join("\n");
    }

    lines.push("By month:".to_string());
    for month in analysis.monthly_units.keys() {
        if let Some(best) = analysis.best_seller_for_month(month) {
            lines.push(format!("  {:<10} {}", month, seller_label(best)));
        }
    }
    lines.push("By year:".to_string());
    for year in analysis.yearly_units.keys() {
        if let Some(best) = analysis.best_seller_for_year(year) {
            lines.push(format!("  {:<10} {}", year, seller_label(best)));
        }
    }
    lines.push(format!(
        "Overall:     {}",
        best_label(analysis.best_seller_overall())
    ));
    lines.join("\n")
}

// ── Helpers ────────────────────────────────────────────────────────────────────

/// A revenue table over one bucket map, with an optional per-row note.
fn bucket_table(
    title: &str,
    buckets: &BTreeMap<String, f64>,
    note: impl Fn(&str) -> Option<String>,
) -> String {
    let mut lines = title_lines(title);
    if buckets.is_empty() {
        lines.push("No sales recorded.".to_string());
        return lines.join("\n");
    }

    for (key, revenue) in buckets {
        let mut line = format!("{:<12} {:>14}", key, format_currency(*revenue));
        if let Some(note) = note(key) {
            line.push_str("   ");
            line.push_str(&note);
        }
        lines.push(line);
    }

    let total: f64 = buckets.values().sum();
    lines.push("-".repeat(RULE_WIDTH));
    lines.push(format!("{:<12} {:>14}", "Total", format_currency(total)));
    lines.join("\n")
}

fn title_lines(title: &str) -> Vec<String> {
    vec![title.to_string(), "-".repeat(RULE_WIDTH)]
}

fn seller_label((model, units): (&str, u32)) -> String {
    format!("{} ({})", model, format_units(units))
}

fn best_label(best: Option<(&str, u32)>) -> String {
    match best {
        Some(best) => seller_label(best),
        None => "None".to_string(),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use csv::StringRecord;
    use till_data::analytics::aggregate_sales;

    fn sale(ts: &str, model: &str, qty: &str, total: &str) -> StringRecord {
        StringRecord::from(vec![ts, "Walk-in", model, qty, total, "Cash", "E001"])
    }

    fn sample_analysis() -> SalesAnalysis {
        aggregate_sales(&[
            sale("2024-03-14 10:00", "A55", "1", "1199.00"),
            sale("2024-03-15 11:00", "A55", "4", "4796.00"),
            sale("2024-03-15 12:00", "S24", "1", "5099.00"),
            sale("2023-12-01 09:00", "S24", "2", "10198.00"),
        ])
    }

    #[test]
    fn test_summary_headline_figures() {
        let text = render("summary", &sample_analysis());
        assert!(text.starts_with("SALES SUMMARY"));
        assert!(text.contains("Total lifetime revenue : RM21,292.00"));
        assert!(text.contains("Active sales days      : 3"));
        assert!(text.contains("Active sales months    : 2"));
        assert!(text.contains("Active sales years     : 2"));
        assert!(text.contains("Best-selling product   : A55 (5 units)"));
    }

    #[test]
    fn test_summary_of_empty_analysis() {
        let text = render("summary", &SalesAnalysis::default());
        assert!(text.contains("Total lifetime revenue : RM0.00"));
        assert!(text.contains("Best-selling product   : None"));
    }

    #[test]
    fn test_daily_lists_days_and_total() {
        let text = render("daily", &sample_analysis());
        assert!(text.starts_with("DAILY SALES"));
        assert!(text.contains("2024-03-14"));
        assert!(text.contains("RM1,199.00"));
        assert!(text.contains("2024-03-15"));
        assert!(text.contains("RM9,895.00"));
        assert!(text.contains("Total"));
        assert!(text.contains("RM21,292.00"));
    }

    #[test]
    fn test_daily_empty_analysis() {
        let text = render("daily", &SalesAnalysis::default());
        assert!(text.contains("No sales recorded."));
    }

    #[test]
    fn test_monthly_carries_best_seller_note() {
        let text = render("monthly", &sample_analysis());
        assert!(text.contains("2024-03"));
        assert!(text.contains("best: A55 (5 units)"));
        assert!(text.contains("2023-12"));
        assert!(text.contains("best: S24 (2 units)"));
    }

    #[test]
    fn test_yearly_carries_best_seller_note() {
        let text = render("yearly", &sample_analysis());
        assert!(text.contains("2024"));
        assert!(text.contains("best: A55 (5 units)"));
        assert!(text.contains("2023"));
        assert!(text.contains("best: S24 (2 units)"));
    }

    #[test]
    fn test_best_sellers_view_sections() {
        let text = render("best-sellers", &sample_analysis());
        assert!(text.contains("By month:"));
        assert!(text.contains("By year:"));
        assert!(text.contains("Overall:     A55 (5 units)"));
    }

    #[test]
    fn test_unknown_view_falls_back_to_summary() {
        let text = render("weekly", &sample_analysis());
        assert!(text.starts_with("SALES SUMMARY"));
    }
}
