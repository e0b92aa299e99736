pub mod amortization;
pub mod waterfall;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::types::PaymentId;

pub use amortization::{level_payment, AmortizationSchedule, ScheduleGenerator};
pub use waterfall::{AllocationResult, InstallmentDelta, PaymentAllocator, PaymentComponent};

/// payment event received from the capture flow; immutable once recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub amount: Money,
    pub effective_date: NaiveDate,
    pub reference: Option<String>,
}

impl Payment {
    pub fn new(amount: Money, effective_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            effective_date,
            reference: None,
        }
    }

    /// attach an external reference (bank receipt, transfer id)
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(EngineError::InvalidPaymentAmount { amount: self.amount });
        }
        Ok(())
    }
}

/// a payment together with the allocation it produced; persisted by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment: Payment,
    pub allocation: AllocationResult,
}

impl PaymentRecord {
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
