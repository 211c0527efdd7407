use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use super::error::SimError;
use super::ledger::{Ledger, roi_pct};
use super::pool::ContractPool;
use super::splitter::split_cash;
use super::types::{ActivationDelay, ActivationOrder, Inputs, LedgerRow, RunConfig};

#[derive(Debug, Clone)]
pub struct SimulationEngine {
    config: RunConfig,
    pool: ContractPool,
    ledger: Ledger,
    month: u32,
    cumulative_withdrawn: f64,
}

impl SimulationEngine {
    pub fn new(inputs: &Inputs) -> Result<Self, SimError> {
        RunConfig::from_inputs(inputs).and_then(Self::from_config)
    }

    pub fn from_config(config: RunConfig) -> Result<Self, SimError> {
        let mut pool = ContractPool::new(
            config.contract_length,
            config.installment_ratio,
            config.activation_delay,
        )?;
        pool.open_principal(config.principal);
        let ledger = Ledger::with_capacity(config.principal, config.total_months as usize);

        Ok(Self {
            config,
            pool,
            ledger,
            month: 0,
            cumulative_withdrawn: 0.0,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn pool(&self) -> &ContractPool {
        &self.pool
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn months_completed(&self) -> u32 {
        self.month
    }

    pub fn is_finished(&self) -> bool {
        self.month >= self.config.total_months
    }

    pub fn step_month(&mut self) -> Option<&LedgerRow> {
        if self.is_finished() {
            return None;
        }

        let month = self.month + 1;
        let delayed = self.config.activation_delay == ActivationDelay::OneMonth;
        let order = self.config.activation_order;

        if delayed && order == ActivationOrder::BeforeCollection {
            self.pool.promote_pending();
        }

        let step = self.pool.step();

        // Promote before admitting so this month's reinvestment stays pending.
        if delayed && order == ActivationOrder::AfterCollection {
            self.pool.promote_pending();
        }

        let split = split_cash(step.collected, self.config.withdraw_ratio);
        self.pool.admit(split.reinvested);
        self.cumulative_withdrawn += split.withdrawn;

        let active_capital = self.pool.reported_capital(self.config.capital_policy);
        let total_profit = active_capital + self.cumulative_withdrawn - self.config.principal;
        let row = LedgerRow {
            month,
            collected: step.collected,
            withdrawn: split.withdrawn,
            cumulative_withdrawn: self.cumulative_withdrawn,
            reinvested: split.reinvested,
            active_capital,
            pending_capital: self.pool.pending_capital(),
            active_contract_count: self.pool.active_count(),
            pending_contract_count: self.pool.pending_count(),
            total_profit,
            roi_pct: roi_pct(total_profit, self.config.principal),
        };
        trace!(
            month,
            collected = row.collected,
            retired = step.retired,
            active = row.active_contract_count,
            pending = row.pending_contract_count,
            "month stepped"
        );

        self.month = month;
        Some(self.ledger.append(row))
    }

    pub fn run(mut self) -> Ledger {
        while self.step_month().is_some() {}
        self.ledger
    }

    // A cancelled run yields no partial ledger.
    pub fn run_with_cancel(mut self, cancel: &AtomicBool) -> Result<Ledger, SimError> {
        while !self.is_finished() {
            if cancel.load(Ordering::Relaxed) {
                return Err(SimError::Cancelled {
                    completed_months: self.month,
                });
            }
            self.step_month();
        }
        Ok(self.ledger)
    }
}

pub fn run_simulation(inputs: &Inputs) -> Result<Ledger, SimError> {
    let ledger = SimulationEngine::new(inputs)?.run();
    log_finished(&ledger);
    Ok(ledger)
}

pub fn run_simulation_with_cancel(
    inputs: &Inputs,
    cancel: &AtomicBool,
) -> Result<Ledger, SimError> {
    let ledger = SimulationEngine::new(inputs)?.run_with_cancel(cancel)?;
    log_finished(&ledger);
    Ok(ledger)
}

fn log_finished(ledger: &Ledger) {
    if let Some(summary) = ledger.summary() {
        debug!(
            months = summary.months,
            final_active_capital = summary.final_active_capital,
            final_cumulative_withdrawn = summary.final_cumulative_withdrawn,
            final_roi_pct = summary.final_roi_pct,
            "simulation finished"
        );
    }
}
