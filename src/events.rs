use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{InstallmentState, LoanId, LoanStatus, PaymentId};

/// all events that can be emitted by a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    LoanOriginated {
        loan_id: LoanId,
        principal: Money,
        num_installments: u32,
        timestamp: DateTime<Utc>,
    },
    ScheduleGenerated {
        loan_id: LoanId,
        installments: u32,
        level_payment: Money,
        total_interest: Money,
        maturity_date: NaiveDate,
    },
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    // delinquency events
    MoraRecomputed {
        loan_id: LoanId,
        as_of: NaiveDate,
        total_mora: Money,
        overdue_installments: u32,
    },
    InstallmentStateChanged {
        loan_id: LoanId,
        installment_number: u32,
        old_state: InstallmentState,
        new_state: InstallmentState,
    },

    // payment events
    PaymentAllocated {
        loan_id: LoanId,
        payment_id: PaymentId,
        amount: Money,
        applied_to_mora: Money,
        applied_to_interest: Money,
        applied_to_principal: Money,
        effective_date: NaiveDate,
    },
    OverpaymentReceived {
        loan_id: LoanId,
        payment_id: PaymentId,
        amount: Money,
        credit_balance: Money,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
