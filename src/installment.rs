use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::state::{StateInputs, StateTransition};
use crate::types::InstallmentState;

/// one scheduled payment ("cuota") within a loan's amortization table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    /// 1-based, unique within the loan
    pub number: u32,
    pub due_date: NaiveDate,

    // scheduled amounts
    pub principal_due: Money,
    pub interest_due: Money,

    // cumulative amounts received
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub mora_paid: Money,

    // delinquency
    pub mora_amount: Money,
    pub days_overdue: u32,

    pub state: InstallmentState,
}

impl Installment {
    /// new unpaid installment
    pub fn new(number: u32, due_date: NaiveDate, principal_due: Money, interest_due: Money) -> Self {
        Self {
            number,
            due_date,
            principal_due,
            interest_due,
            principal_paid: Money::ZERO,
            interest_paid: Money::ZERO,
            mora_paid: Money::ZERO,
            mora_amount: Money::ZERO,
            days_overdue: 0,
            state: InstallmentState::Pendiente,
        }
    }

    /// scheduled payment (principal + interest)
    pub fn scheduled_amount(&self) -> Money {
        self.principal_due + self.interest_due
    }

    pub fn outstanding_principal(&self) -> Money {
        self.principal_due.saturating_sub(self.principal_paid)
    }

    pub fn outstanding_interest(&self) -> Money {
        self.interest_due.saturating_sub(self.interest_paid)
    }

    pub fn outstanding_mora(&self) -> Money {
        self.mora_amount.saturating_sub(self.mora_paid)
    }

    /// principal + interest still owed; mora is not part of the balance
    pub fn outstanding_balance(&self) -> Money {
        self.outstanding_principal() + self.outstanding_interest()
    }

    /// everything still owed including mora
    pub fn amount_owed(&self) -> Money {
        self.outstanding_balance() + self.outstanding_mora()
    }

    pub fn total_paid(&self) -> Money {
        self.principal_paid + self.interest_paid + self.mora_paid
    }

    pub fn has_payments(&self) -> bool {
        self.total_paid().is_positive()
    }

    pub fn is_paid(&self) -> bool {
        self.state == InstallmentState::Pagada
    }

    /// inputs for state resolution given whether the installment is overdue
    pub fn state_inputs(&self, is_overdue: bool) -> StateInputs {
        StateInputs {
            balance_is_zero: self.outstanding_balance().is_zero(),
            is_overdue,
            has_payments: self.has_payments(),
        }
    }

    /// move to `next`, reporting the change if the state differs
    pub(crate) fn transition(&mut self, next: InstallmentState) -> Option<StateTransition> {
        if self.state == next || !self.state.can_transition_to(next) {
            return None;
        }
        let change = StateTransition {
            installment_number: self.number,
            from: self.state,
            to: next,
        };
        self.state = next;
        Some(change)
    }
}
