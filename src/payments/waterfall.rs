use log::debug;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::installment::Installment;
use crate::types::{AllocationMode, InstallmentState};

/// bucket within an installment, in the order it is serviced
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PaymentComponent {
    Mora,
    Interest,
    Principal,
}

impl PaymentComponent {
    /// servicing order inside one installment
    pub const WATERFALL: [PaymentComponent; 3] = [
        PaymentComponent::Mora,
        PaymentComponent::Interest,
        PaymentComponent::Principal,
    ];
}

/// what a payment did to one installment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentDelta {
    pub installment_number: u32,
    pub to_mora: Money,
    pub to_interest: Money,
    pub to_principal: Money,
    pub state_before: InstallmentState,
    pub state_after: InstallmentState,
}

impl InstallmentDelta {
    fn new(inst: &Installment) -> Self {
        Self {
            installment_number: inst.number,
            to_mora: Money::ZERO,
            to_interest: Money::ZERO,
            to_principal: Money::ZERO,
            state_before: inst.state,
            state_after: inst.state,
        }
    }

    pub fn total(&self) -> Money {
        self.to_mora + self.to_interest + self.to_principal
    }

    fn applied(&mut self, component: PaymentComponent) -> &mut Money {
        match component {
            PaymentComponent::Mora => &mut self.to_mora,
            PaymentComponent::Interest => &mut self.to_interest,
            PaymentComponent::Principal => &mut self.to_principal,
        }
    }
}

/// allocation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub mode: AllocationMode,
    pub amount: Money,
    /// one entry per touched installment, in servicing order
    pub per_installment_deltas: Vec<InstallmentDelta>,
    /// over-payment left after every candidate was satisfied
    pub remaining_unallocated: Money,
    /// principal + interest + mora still owed after the allocation
    pub new_loan_balance: Money,
}

impl AllocationResult {
    pub fn total_to_mora(&self) -> Money {
        self.per_installment_deltas.iter().map(|d| d.to_mora).sum()
    }

    pub fn total_to_interest(&self) -> Money {
        self.per_installment_deltas.iter().map(|d| d.to_interest).sum()
    }

    pub fn total_to_principal(&self) -> Money {
        self.per_installment_deltas.iter().map(|d| d.to_principal).sum()
    }

    pub fn total_applied(&self) -> Money {
        self.amount - self.remaining_unallocated
    }

    pub fn delta_for(&self, installment_number: u32) -> Option<&InstallmentDelta> {
        self.per_installment_deltas
            .iter()
            .find(|d| d.installment_number == installment_number)
    }
}

/// distributes payments across installments.
///
/// overdue (`VENCIDA`) installments are serviced before all others, each group
/// by ascending installment number; inside an installment the waterfall is
/// mora, then interest, then principal.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentAllocator;

impl PaymentAllocator {
    pub fn new() -> Self {
        Self
    }

    /// allocate `amount`; installments are written back only in `Apply` mode
    pub fn allocate(
        &self,
        installments: &mut [Installment],
        amount: Money,
        mode: AllocationMode,
    ) -> Result<AllocationResult> {
        let (working, result) = self.compute(installments, amount, mode)?;

        if mode == AllocationMode::Apply {
            installments.clone_from_slice(&working);
        }

        Ok(result)
    }

    /// side-effect-free preview of what `amount` would settle
    pub fn project(&self, installments: &[Installment], amount: Money) -> Result<AllocationResult> {
        self.compute(installments, amount, AllocationMode::Project)
            .map(|(_, result)| result)
    }

    /// visiting order of candidate installments, as indices into `installments`
    pub fn candidate_order(installments: &[Installment]) -> Vec<usize> {
        let mut order: Vec<usize> = installments
            .iter()
            .enumerate()
            .filter(|(_, inst)| inst.state.is_open())
            .map(|(idx, _)| idx)
            .collect();
        order.sort_by_key(|&idx| {
            let inst = &installments[idx];
            (inst.state.allocation_rank(), inst.number)
        });
        order
    }

    fn compute(
        &self,
        installments: &[Installment],
        amount: Money,
        mode: AllocationMode,
    ) -> Result<(Vec<Installment>, AllocationResult)> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidPaymentAmount { amount });
        }

        let mut working = installments.to_vec();
        let mut remaining = amount;
        let mut deltas = Vec::new();

        for idx in Self::candidate_order(&working) {
            if remaining.is_zero() {
                break;
            }

            let inst = &mut working[idx];
            let mut delta = InstallmentDelta::new(inst);

            for component in PaymentComponent::WATERFALL {
                remaining = apply_to_component(component, remaining, inst, &mut delta);
                if remaining.is_zero() {
                    break;
                }
            }

            if delta.total().is_zero() {
                continue;
            }

            let next = InstallmentState::after_payment(inst.outstanding_balance().is_zero());
            inst.transition(next);
            delta.state_after = inst.state;
            deltas.push(delta);
        }

        let new_loan_balance = working.iter().map(|i| i.amount_owed()).sum();

        debug!(
            "{:?} allocation of {}: {} installments touched, {} unallocated",
            mode,
            amount,
            deltas.len(),
            remaining
        );

        let result = AllocationResult {
            mode,
            amount,
            per_installment_deltas: deltas,
            remaining_unallocated: remaining,
            new_loan_balance,
        };

        Ok((working, result))
    }
}

/// consume `min(available, outstanding)` from one bucket, returning what is left
fn apply_to_component(
    component: PaymentComponent,
    available: Money,
    inst: &mut Installment,
    delta: &mut InstallmentDelta,
) -> Money {
    let outstanding = match component {
        PaymentComponent::Mora => inst.outstanding_mora(),
        PaymentComponent::Interest => inst.outstanding_interest(),
        PaymentComponent::Principal => inst.outstanding_principal(),
    };

    let payment = available.min(outstanding);
    if payment.is_zero() {
        return available;
    }

    let paid_field = match component {
        PaymentComponent::Mora => &mut inst.mora_paid,
        PaymentComponent::Interest => &mut inst.interest_paid,
        PaymentComponent::Principal => &mut inst.principal_paid,
    };
    *paid_field += payment;
    *delta.applied(component) += payment;

    available - payment
}
