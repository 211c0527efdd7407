use serde::Serialize;

use super::error::SimError;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActivationDelay {
    Immediate,
    OneMonth,
}

impl ActivationDelay {
    pub fn months(self) -> u8 {
        match self {
            ActivationDelay::Immediate => 0,
            ActivationDelay::OneMonth => 1,
        }
    }

    pub fn from_months(months: u8) -> Option<Self> {
        match months {
            0 => Some(ActivationDelay::Immediate),
            1 => Some(ActivationDelay::OneMonth),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActivationOrder {
    BeforeCollection,
    AfterCollection,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CapitalPolicy {
    ActiveOnly,
    ActivePlusPending,
}

// Rates are fractions (`0.06` is 6% per month) except `contract_profit_pct`,
// which is a percentage earned over the contract's whole lifetime.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub principal: f64,
    pub contract_length: u32,
    pub monthly_rate: Option<f64>,
    pub contract_profit_pct: Option<f64>,
    pub withdraw_ratio: f64,
    pub total_months: u32,
    pub activation_delay: ActivationDelay,
    pub activation_order: ActivationOrder,
    pub capital_policy: CapitalPolicy,
}

impl Default for Inputs {
    fn default() -> Self {
        Self {
            principal: 100_000_000.0,
            contract_length: 6,
            monthly_rate: Some(0.06),
            contract_profit_pct: None,
            withdraw_ratio: 0.20,
            total_months: 24,
            activation_delay: ActivationDelay::Immediate,
            activation_order: ActivationOrder::BeforeCollection,
            capital_policy: CapitalPolicy::ActiveOnly,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RateSpec {
    MonthlyRate(f64),
    ContractProfitPct(f64),
}

impl RateSpec {
    pub fn installment_ratio(self, contract_length: u32) -> f64 {
        let length = contract_length as f64;
        match self {
            RateSpec::MonthlyRate(r) => (1.0 + length * r) / length,
            RateSpec::ContractProfitPct(p) => (1.0 + p / 100.0) / length,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub principal: f64,
    pub contract_length: u32,
    pub rate: RateSpec,
    pub installment_ratio: f64,
    pub withdraw_ratio: f64,
    pub total_months: u32,
    pub activation_delay: ActivationDelay,
    pub activation_order: ActivationOrder,
    pub capital_policy: CapitalPolicy,
}

impl RunConfig {
    pub fn from_inputs(inputs: &Inputs) -> Result<Self, SimError> {
        if !inputs.principal.is_finite() || inputs.principal <= 0.0 {
            return Err(invalid("principal must be > 0"));
        }

        if inputs.contract_length == 0 {
            return Err(invalid("contract_length must be > 0"));
        }

        if inputs.total_months == 0 {
            return Err(invalid("total_months must be > 0"));
        }

        if !inputs.withdraw_ratio.is_finite() || !(0.0..=1.0).contains(&inputs.withdraw_ratio) {
            return Err(invalid("withdraw_ratio must be between 0 and 1"));
        }

        let rate = match (inputs.monthly_rate, inputs.contract_profit_pct) {
            (Some(r), None) => RateSpec::MonthlyRate(r),
            (None, Some(p)) => RateSpec::ContractProfitPct(p),
            (Some(_), Some(_)) => {
                return Err(invalid(
                    "monthly_rate and contract_profit_pct are mutually exclusive",
                ));
            }
            (None, None) => {
                return Err(invalid(
                    "one of monthly_rate or contract_profit_pct is required",
                ));
            }
        };

        let installment_ratio = rate.installment_ratio(inputs.contract_length);
        if !installment_ratio.is_finite() {
            return Err(invalid("rate must be a finite number"));
        }
        if installment_ratio <= 0.0 {
            return Err(invalid("contract profit must be greater than -100%"));
        }

        Ok(Self {
            principal: inputs.principal,
            contract_length: inputs.contract_length,
            rate,
            installment_ratio,
            withdraw_ratio: inputs.withdraw_ratio,
            total_months: inputs.total_months,
            activation_delay: inputs.activation_delay,
            activation_order: inputs.activation_order,
            capital_policy: inputs.capital_policy,
        })
    }
}

fn invalid(msg: &str) -> SimError {
    SimError::InvalidConfiguration(msg.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    pub month: u32,
    pub collected: f64,
    pub withdrawn: f64,
    pub cumulative_withdrawn: f64,
    pub reinvested: f64,
    pub active_capital: f64,
    pub pending_capital: f64,
    pub active_contract_count: usize,
    pub pending_contract_count: usize,
    pub total_profit: f64,
    pub roi_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub months: u32,
    pub final_active_capital: f64,
    pub final_cumulative_withdrawn: f64,
    pub final_total_profit: f64,
    pub final_roi_pct: f64,
}
