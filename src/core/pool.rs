use super::error::SimError;
use super::types::{ActivationDelay, CapitalPolicy};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ContractId(usize);

impl ContractId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ContractState {
    Pending,
    Active,
    Retired,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contract {
    pub amount: f64,
    pub months_remaining: u32,
    pub state: ContractState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStep {
    pub collected: f64,
    pub retired: usize,
}

// Every live contract is referenced from exactly one of `active` or `pending`
// and has `months_remaining > 0`.
#[derive(Debug, Clone)]
pub struct ContractPool {
    contracts: Vec<Contract>,
    active: Vec<ContractId>,
    pending: Vec<ContractId>,
    contract_length: u32,
    installment_ratio: f64,
    activation_delay: ActivationDelay,
}

impl ContractPool {
    pub fn new(
        contract_length: u32,
        installment_ratio: f64,
        activation_delay: ActivationDelay,
    ) -> Result<Self, SimError> {
        if contract_length == 0 {
            return Err(SimError::InvalidConfiguration(
                "contract_length must be > 0".to_string(),
            ));
        }

        Ok(Self {
            contracts: Vec::new(),
            active: Vec::new(),
            pending: Vec::new(),
            contract_length,
            installment_ratio,
            activation_delay,
        })
    }

    // The principal pays from month 1 whatever the activation delay.
    pub fn open_principal(&mut self, amount: f64) -> Option<ContractId> {
        self.insert(amount, ContractState::Active)
    }

    pub fn admit(&mut self, amount: f64) -> Option<ContractId> {
        let state = match self.activation_delay {
            ActivationDelay::Immediate => ContractState::Active,
            ActivationDelay::OneMonth => ContractState::Pending,
        };
        self.insert(amount, state)
    }

    fn insert(&mut self, amount: f64, state: ContractState) -> Option<ContractId> {
        if amount <= 0.0 {
            return None;
        }
        let id = ContractId(self.contracts.len());
        self.contracts.push(Contract {
            amount,
            months_remaining: self.contract_length,
            state,
        });
        match state {
            ContractState::Active => self.active.push(id),
            ContractState::Pending => self.pending.push(id),
            ContractState::Retired => {}
        }
        Some(id)
    }

    pub fn step(&mut self) -> PoolStep {
        let mut collected = 0.0;
        let mut retired = 0;
        let contracts = &mut self.contracts;
        let ratio = self.installment_ratio;

        self.active.retain(|id| {
            let contract = &mut contracts[id.0];
            collected += contract.amount * ratio;
            contract.months_remaining -= 1;
            if contract.months_remaining == 0 {
                contract.state = ContractState::Retired;
                retired += 1;
                false
            } else {
                true
            }
        });

        PoolStep { collected, retired }
    }

    pub fn promote_pending(&mut self) -> usize {
        let promoted = self.pending.len();
        for id in self.pending.drain(..) {
            self.contracts[id.0].state = ContractState::Active;
            self.active.push(id);
        }
        promoted
    }

    pub fn get(&self, id: ContractId) -> Option<&Contract> {
        self.contracts.get(id.0)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn active_capital(&self) -> f64 {
        self.active.iter().map(|id| self.contracts[id.0].amount).sum()
    }

    pub fn pending_capital(&self) -> f64 {
        self.pending.iter().map(|id| self.contracts[id.0].amount).sum()
    }

    pub fn reported_capital(&self, policy: CapitalPolicy) -> f64 {
        match policy {
            CapitalPolicy::ActiveOnly => self.active_capital(),
            CapitalPolicy::ActivePlusPending => self.active_capital() + self.pending_capital(),
        }
    }
}
