//! Aggregate-income recurrence for pure compounding. It only holds without
//! withdrawals and without activation delay; other policies are rejected.

use serde::Serialize;

use super::error::SimError;
use super::types::{ActivationDelay, Inputs, RunConfig};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedFormMonth {
    pub month: u32,
    pub collected: f64,
    pub active_capital: f64,
}

pub fn closed_form_schedule(inputs: &Inputs) -> Result<Vec<ClosedFormMonth>, SimError> {
    let config = RunConfig::from_inputs(inputs)?;
    if config.withdraw_ratio != 0.0 {
        return Err(SimError::UnsupportedPolicy("withdrawals"));
    }
    if config.activation_delay != ActivationDelay::Immediate {
        return Err(SimError::UnsupportedPolicy("activation delay"));
    }

    let length = config.contract_length as usize;
    let months = config.total_months as usize;
    let ratio = config.installment_ratio;
    let mut incomes: Vec<f64> = Vec::with_capacity(months);
    let mut schedule = Vec::with_capacity(months);

    for m in 1..=months {
        // The principal pays in months 1..=L; income from month k pays in k+1..=k+L.
        let principal_paying = if m <= length { config.principal } else { 0.0 };
        let window = &incomes[(m - 1).saturating_sub(length)..m - 1];
        let collected = ratio * (principal_paying + window.iter().sum::<f64>());
        incomes.push(collected);

        // After month m the principal survives only if m < L, and a contract
        // created in month k survives if k > m - L.
        let principal_left = if m < length { config.principal } else { 0.0 };
        let live = &incomes[m.saturating_sub(length)..m];
        schedule.push(ClosedFormMonth {
            month: m as u32,
            collected,
            active_capital: principal_left + live.iter().sum::<f64>(),
        });
    }

    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::run_simulation;
    use crate::core::types::{ActivationOrder, CapitalPolicy};
    use proptest::prelude::{prop_assert, proptest};

    fn relative_error(a: f64, b: f64) -> f64 {
        let scale = a.abs().max(b.abs());
        if scale == 0.0 { 0.0 } else { (a - b).abs() / scale }
    }

    fn compounding_inputs(contract_length: u32, profit_pct: f64, total_months: u32) -> Inputs {
        Inputs {
            principal: 100_000_000.0,
            contract_length,
            monthly_rate: None,
            contract_profit_pct: Some(profit_pct),
            withdraw_ratio: 0.0,
            total_months,
            activation_delay: ActivationDelay::Immediate,
            activation_order: ActivationOrder::BeforeCollection,
            capital_policy: CapitalPolicy::ActiveOnly,
        }
    }

    fn assert_matches_iterative(inputs: &Inputs) {
        let closed = closed_form_schedule(inputs).expect("supported policy");
        let ledger = run_simulation(inputs).expect("valid inputs");
        assert_eq!(closed.len(), ledger.len());
        for (c, row) in closed.iter().zip(ledger.rows()) {
            assert_eq!(c.month, row.month);
            let income_err = relative_error(c.collected, row.collected);
            let capital_err = relative_error(c.active_capital, row.active_capital);
            assert!(income_err < 1e-9, "month {} collected: {income_err}", c.month);
            assert!(capital_err < 1e-9, "month {} capital: {capital_err}", c.month);
        }
    }

    #[test]
    fn first_month_matches_principal_installment() {
        let schedule = closed_form_schedule(&compounding_inputs(6, 36.0, 1)).expect("supported");
        assert!((schedule[0].collected - 22_666_666.666_666_66).abs() < 1e-3);
        assert!((schedule[0].active_capital - (100_000_000.0 + schedule[0].collected)).abs() < 1e-3);
    }

    #[test]
    fn agrees_with_iterative_engine_through_and_past_contract_length() {
        assert_matches_iterative(&compounding_inputs(6, 36.0, 36));
        assert_matches_iterative(&compounding_inputs(1, 10.0, 12));
        assert_matches_iterative(&compounding_inputs(12, 0.0, 40));
    }

    #[test]
    fn capital_drops_principal_once_it_retires() {
        let schedule = closed_form_schedule(&compounding_inputs(2, 0.0, 3)).expect("supported");
        let capital: Vec<f64> = schedule.iter().map(|m| m.active_capital).collect();
        assert_eq!(capital, vec![150.0 * 1_000_000.0, 125.0 * 1_000_000.0, 137.5 * 1_000_000.0]);
    }

    #[test]
    fn rejects_withdrawal_and_delay_policies() {
        let mut inputs = compounding_inputs(6, 36.0, 6);
        inputs.withdraw_ratio = 0.1;
        assert_eq!(
            closed_form_schedule(&inputs),
            Err(SimError::UnsupportedPolicy("withdrawals"))
        );

        let mut inputs = compounding_inputs(6, 36.0, 6);
        inputs.activation_delay = ActivationDelay::OneMonth;
        assert_eq!(
            closed_form_schedule(&inputs),
            Err(SimError::UnsupportedPolicy("activation delay"))
        );
    }

    #[test]
    fn invalid_inputs_are_reported_before_policy_checks() {
        let mut inputs = compounding_inputs(6, 36.0, 6);
        inputs.total_months = 0;
        inputs.withdraw_ratio = 0.5;
        assert!(matches!(
            closed_form_schedule(&inputs),
            Err(SimError::InvalidConfiguration(_))
        ));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_closed_form_matches_iterative(
            contract_length in 1u32..13,
            profit_bp in 0u32..8_000,
            total_months in 1u32..48
        ) {
            let inputs = compounding_inputs(contract_length, profit_bp as f64 / 100.0, total_months);
            let closed = closed_form_schedule(&inputs).expect("supported policy");
            let ledger = run_simulation(&inputs).expect("valid inputs");
            for (c, row) in closed.iter().zip(ledger.rows()) {
                prop_assert!(relative_error(c.collected, row.collected) < 1e-9);
                prop_assert!(relative_error(c.active_capital, row.active_capital) < 1e-9);
            }
        }
    }
}
