use rayon::prelude::*;

use super::engine::run_simulation;
use super::error::SimError;
use super::ledger::Ledger;
use super::types::{ActivationDelay, ActivationOrder, CapitalPolicy, Inputs, LedgerSummary};

pub fn run_batch(inputs: &[Inputs]) -> Vec<Result<Ledger, SimError>> {
    inputs.par_iter().map(run_simulation).collect()
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PolicyVariant {
    pub activation_delay: ActivationDelay,
    pub activation_order: ActivationOrder,
    pub capital_policy: CapitalPolicy,
}

impl PolicyVariant {
    // With no delay nothing is ever pending, so order and capital policy collapse.
    pub fn all() -> Vec<Self> {
        let mut variants = vec![Self {
            activation_delay: ActivationDelay::Immediate,
            activation_order: ActivationOrder::BeforeCollection,
            capital_policy: CapitalPolicy::ActiveOnly,
        }];
        let orders = [
            ActivationOrder::BeforeCollection,
            ActivationOrder::AfterCollection,
        ];
        let policies = [CapitalPolicy::ActiveOnly, CapitalPolicy::ActivePlusPending];
        for activation_order in orders {
            for capital_policy in policies {
                variants.push(Self {
                    activation_delay: ActivationDelay::OneMonth,
                    activation_order,
                    capital_policy,
                });
            }
        }
        variants
    }

    pub fn apply(self, base: &Inputs) -> Inputs {
        Inputs {
            activation_delay: self.activation_delay,
            activation_order: self.activation_order,
            capital_policy: self.capital_policy,
            ..base.clone()
        }
    }

    pub fn name(self) -> &'static str {
        use ActivationOrder::{AfterCollection, BeforeCollection};
        use CapitalPolicy::{ActiveOnly, ActivePlusPending};

        match self.activation_delay {
            ActivationDelay::Immediate => "immediate",
            ActivationDelay::OneMonth => match (self.activation_order, self.capital_policy) {
                (BeforeCollection, ActiveOnly) => "delayed-before-active-only",
                (BeforeCollection, ActivePlusPending) => "delayed-before-with-pending",
                (AfterCollection, ActiveOnly) => "delayed-after-active-only",
                (AfterCollection, ActivePlusPending) => "delayed-after-with-pending",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyComparison {
    pub variant: PolicyVariant,
    pub summary: LedgerSummary,
}

// The base's own policy fields are overridden by each variant.
pub fn compare_policies(base: &Inputs) -> Result<Vec<PolicyComparison>, SimError> {
    let variants = PolicyVariant::all();
    let inputs: Vec<Inputs> = variants.iter().map(|v| v.apply(base)).collect();

    run_batch(&inputs)
        .into_iter()
        .zip(variants)
        .map(|(result, variant)| {
            let ledger = result?;
            let summary = ledger
                .summary()
                .ok_or_else(|| SimError::InvalidConfiguration("total_months must be > 0".into()))?;
            Ok(PolicyComparison { variant, summary })
        })
        .collect()
}
