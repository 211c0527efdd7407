use super::types::{LedgerRow, LedgerSummary};

/// Return on investment in percent. A zero principal yields the sentinel
/// `0.0`; any other non-finite result is passed through unchanged.
pub fn roi_pct(total_profit: f64, principal: f64) -> f64 {
    if principal == 0.0 {
        return 0.0;
    }
    100.0 * total_profit / principal
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    principal: f64,
    rows: Vec<LedgerRow>,
}

impl Ledger {
    pub(crate) fn with_capacity(principal: f64, months: usize) -> Self {
        Self {
            principal,
            rows: Vec::with_capacity(months),
        }
    }

    pub(crate) fn append(&mut self, row: LedgerRow) -> &LedgerRow {
        debug_assert_eq!(row.month as usize, self.rows.len() + 1);
        self.rows.push(row);
        &self.rows[self.rows.len() - 1]
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&LedgerRow> {
        self.rows.last()
    }

    pub fn final_active_capital(&self) -> Option<f64> {
        self.last().map(|row| row.active_capital)
    }

    pub fn final_cumulative_withdrawn(&self) -> Option<f64> {
        self.last().map(|row| row.cumulative_withdrawn)
    }

    pub fn final_roi_pct(&self) -> Option<f64> {
        self.last().map(|row| row.roi_pct)
    }

    pub fn summary(&self) -> Option<LedgerSummary> {
        self.last().map(|row| LedgerSummary {
            months: row.month,
            final_active_capital: row.active_capital,
            final_cumulative_withdrawn: row.cumulative_withdrawn,
            final_total_profit: row.total_profit,
            final_roi_pct: row.roi_pct,
        })
    }

    pub fn into_rows(self) -> Vec<LedgerRow> {
        self.rows
    }
}
