use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a payment event
pub type PaymentId = Uuid;

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    /// originated, awaiting approval; no schedule yet
    Pending,
    /// schedule generated, accepting payments and accruing mora
    Approved,
    /// every installment paid; installments retired
    Closed,
}

/// installment frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentFrequency {
    Monthly,
    Biweekly,
    Weekly,
}

impl PaymentFrequency {
    /// number of periods in a year, used to turn an annual rate into a periodic one
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Biweekly => 26,
            PaymentFrequency::Weekly => 52,
        }
    }
}

/// installment state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentState {
    /// nothing paid, not overdue
    Pendiente,
    /// partially paid, balance remains
    Parcial,
    /// overdue with balance remaining
    Vencida,
    /// balance zero; terminal
    Pagada,
}

/// whether an allocation writes back into the installments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationMode {
    /// mutate installments with the computed deltas
    Apply,
    /// compute deltas only (what-if preview)
    Project,
}
