//! Currency columns are rounded to whole units and percentages to two
//! decimals, half away from zero (`f64::round`). Negative zero prints as `0`.

use crate::core::{LedgerRow, LedgerSummary};

pub const CSV_COLUMNS: [&str; 11] = [
    "month",
    "collected",
    "withdrawn",
    "cumulative_withdrawn",
    "reinvested",
    "active_capital",
    "pending_capital",
    "active_contracts",
    "pending_contracts",
    "total_profit",
    "roi_pct",
];

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvOptions {
    pub byte_order_mark: bool,
}

pub fn round_currency(value: f64) -> f64 {
    normalize_zero(value.round())
}

pub fn round_percent(value: f64) -> f64 {
    normalize_zero((value * 100.0).round() / 100.0)
}

fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

pub fn ledger_to_csv(rows: &[LedgerRow], options: CsvOptions) -> String {
    let mut out = String::with_capacity(64 * (rows.len() + 1));
    if options.byte_order_mark {
        out.push(BYTE_ORDER_MARK);
    }
    out.push_str(&CSV_COLUMNS.join(","));
    out.push('\n');

    for row in rows {
        out.push_str(&format!(
            "{},{:.0},{:.0},{:.0},{:.0},{:.0},{:.0},{},{},{:.0},{:.2}\n",
            row.month,
            round_currency(row.collected),
            round_currency(row.withdrawn),
            round_currency(row.cumulative_withdrawn),
            round_currency(row.reinvested),
            round_currency(row.active_capital),
            round_currency(row.pending_capital),
            row.active_contract_count,
            row.pending_contract_count,
            round_currency(row.total_profit),
            round_percent(row.roi_pct),
        ));
    }
    out
}

pub fn format_thousands(value: f64) -> String {
    let rounded = round_currency(value);
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

const TABLE_HEADERS: [&str; 8] = [
    "Month",
    "Collected",
    "Withdrawn",
    "Total withdrawn",
    "Reinvested",
    "Active capital",
    "Total profit",
    "ROI %",
];

pub fn render_table(rows: &[LedgerRow], summary: Option<&LedgerSummary>) -> String {
    let cells: Vec<[String; 8]> = rows
        .iter()
        .map(|row| {
            [
                row.month.to_string(),
                format_thousands(row.collected),
                format_thousands(row.withdrawn),
                format_thousands(row.cumulative_withdrawn),
                format_thousands(row.reinvested),
                format_thousands(row.active_capital),
                format_thousands(row.total_profit),
                format!("{:.2}", round_percent(row.roi_pct)),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(str::len);
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    push_table_line(&mut out, &TABLE_HEADERS.map(str::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for line in &cells {
        push_table_line(&mut out, line, &widths);
    }

    if let Some(summary) = summary {
        out.push('\n');
        out.push_str(&format!(
            "Final active capital:   {}\n",
            format_thousands(summary.final_active_capital)
        ));
        out.push_str(&format!(
            "Total cash withdrawn:   {}\n",
            format_thousands(summary.final_cumulative_withdrawn)
        ));
        out.push_str(&format!(
            "Total profit:           {}\n",
            format_thousands(summary.final_total_profit)
        ));
        out.push_str(&format!(
            "ROI:                    {:.2}%\n",
            round_percent(summary.final_roi_pct)
        ));
    }
    out
}

fn push_table_line(out: &mut String, cells: &[String; 8], widths: &[usize; 8]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:>width$}"))
        .collect();
    out.push_str(&padded.join("  "));
    out.push('\n');
}
