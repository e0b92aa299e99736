use serde::{Deserialize, Serialize};

use crate::types::InstallmentState;

/// facts about an installment that decide its state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateInputs {
    pub balance_is_zero: bool,
    pub is_overdue: bool,
    pub has_payments: bool,
}

impl InstallmentState {
    /// resolve exactly one state for a recomputation pass.
    ///
    /// precedence: zero balance, then overdue, then any payment received.
    pub fn resolve(inputs: StateInputs) -> Self {
        if inputs.balance_is_zero {
            InstallmentState::Pagada
        } else if inputs.is_overdue {
            InstallmentState::Vencida
        } else if inputs.has_payments {
            InstallmentState::Parcial
        } else {
            InstallmentState::Pendiente
        }
    }

    /// state after a payment touched the installment (no date is known here)
    pub fn after_payment(balance_is_zero: bool) -> Self {
        if balance_is_zero {
            InstallmentState::Pagada
        } else {
            InstallmentState::Parcial
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InstallmentState::Pagada)
    }

    /// eligible to receive funds from a payment
    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }

    /// allocation priority group; lower is serviced first
    pub fn allocation_rank(&self) -> u8 {
        match self {
            InstallmentState::Vencida => 0,
            _ => 1,
        }
    }

    pub fn can_transition_to(&self, next: InstallmentState) -> bool {
        !self.is_terminal() || next == InstallmentState::Pagada
    }
}

/// a recorded state change of one installment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub installment_number: u32,
    pub from: InstallmentState,
    pub to: InstallmentState,
}
