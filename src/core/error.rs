#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("closed-form schedule does not support {0}")]
    UnsupportedPolicy(&'static str),

    #[error("simulation cancelled after {completed_months} months")]
    Cancelled { completed_months: u32 },
}
