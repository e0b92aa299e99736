use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::LoanStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid loan terms: {message}")]
    InvalidLoanTerms {
        message: String,
    },

    #[error("invalid as-of date: {as_of} precedes loan start {start_date}")]
    InvalidAsOfDate {
        as_of: NaiveDate,
        start_date: NaiveDate,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("loan not active: current status is {status:?}")]
    LoanNotActive {
        status: LoanStatus,
    },

    #[error("payment already allocated: {payment_id}")]
    PaymentAlreadyAllocated {
        payment_id: Uuid,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
