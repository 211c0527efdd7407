#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashSplit {
    pub withdrawn: f64,
    pub reinvested: f64,
}

pub fn split_cash(collected: f64, withdraw_ratio: f64) -> CashSplit {
    CashSplit {
        withdrawn: collected * withdraw_ratio,
        reinvested: collected * (1.0 - withdraw_ratio),
    }
}
