use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::{SafeTimeProvider, TimeSource};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::LoanConfig;
use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::events::{Event, EventStore};
use crate::installment::Installment;
use crate::interest::{MoraCalculator, RecomputeResult};
use crate::payments::{AllocationResult, AmortizationSchedule, Payment, PaymentAllocator, PaymentRecord};
use crate::serialization::LoanView;
use crate::state::StateTransition;
use crate::types::{AllocationMode, InstallmentState, LoanId, LoanStatus, PaymentId};

/// a loan and the installment schedule it owns
pub struct Loan {
    pub id: LoanId,
    pub config: LoanConfig,
    pub events: EventStore,
    status: LoanStatus,
    installments: Vec<Installment>,
    payments: Vec<PaymentRecord>,
    credit_balance: Money,
    last_mora_run: Option<NaiveDate>,
    originated_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
}

impl Loan {
    /// originate a pending loan
    pub fn originate(config: LoanConfig, time_provider: &SafeTimeProvider) -> Result<Self> {
        config.validate()?;

        let id = Uuid::new_v4();
        let now = time_provider.now();

        let mut loan = Self {
            id,
            config,
            events: EventStore::new(),
            status: LoanStatus::Pending,
            installments: Vec::new(),
            payments: Vec::new(),
            credit_balance: Money::ZERO,
            last_mora_run: None,
            originated_at: now,
            approved_at: None,
            closed_at: None,
        };

        loan.events.emit(Event::LoanOriginated {
            loan_id: id,
            principal: loan.config.terms.principal,
            num_installments: loan.config.terms.num_installments,
            timestamp: now,
        });

        Ok(loan)
    }

    /// capture everything needed to rebuild this loan later
    pub fn snapshot(&self) -> LoanSnapshot {
        LoanSnapshot {
            id: self.id,
            config: self.config.clone(),
            status: self.status,
            installments: self.installments.clone(),
            payments: self.payments.clone(),
            credit_balance: self.credit_balance,
            last_mora_run: self.last_mora_run,
            originated_at: self.originated_at,
            approved_at: self.approved_at,
            closed_at: self.closed_at,
        }
    }

    /// rebuild a loan from persisted state
    pub fn restore(snapshot: LoanSnapshot) -> Result<Self> {
        snapshot.validate()?;

        let LoanSnapshot {
            id,
            config,
            status,
            mut installments,
            payments,
            credit_balance,
            last_mora_run,
            originated_at,
            approved_at,
            closed_at,
        } = snapshot;
        installments.sort_by_key(|i| i.number);

        debug!(
            "restored loan {} ({:?}) with {} installments and {} payments",
            id,
            status,
            installments.len(),
            payments.len()
        );

        Ok(Self {
            id,
            config,
            events: EventStore::new(),
            status,
            installments,
            payments,
            credit_balance,
            last_mora_run,
            originated_at,
            approved_at,
            closed_at,
        })
    }

    /// approve the loan and generate its schedule; runs once
    pub fn approve(&mut self, time_provider: &SafeTimeProvider) -> Result<&[Installment]> {
        if self.status != LoanStatus::Pending {
            return Err(EngineError::LoanNotActive { status: self.status });
        }

        let schedule = AmortizationSchedule::generate(&self.config.terms)?;
        let now = time_provider.now();

        self.events.emit(Event::ScheduleGenerated {
            loan_id: self.id,
            installments: schedule.installments.len() as u32,
            level_payment: schedule.level_payment,
            total_interest: schedule.total_interest,
            maturity_date: schedule.maturity_date,
        });

        self.installments = schedule.installments;
        self.approved_at = Some(now);
        self.change_status(LoanStatus::Approved, "loan approved", now);

        info!(
            "loan {} approved: {} installments of {}",
            self.id,
            self.installments.len(),
            schedule.level_payment
        );

        Ok(&self.installments)
    }

    /// recompute mora for every unpaid installment as of `as_of`
    pub fn recompute_mora(&mut self, as_of: NaiveDate) -> Result<RecomputeResult> {
        match self.status {
            LoanStatus::Pending => return Err(EngineError::LoanNotActive { status: self.status }),
            LoanStatus::Closed => {
                debug!("loan {} is closed, skipping mora recompute", self.id);
                return Ok(RecomputeResult::default());
            }
            LoanStatus::Approved => {}
        }

        let calculator = MoraCalculator::from_config(&self.config.mora)?;
        let (result, transitions) = calculator.recompute_with_transitions(
            &mut self.installments,
            self.config.terms.start_date,
            as_of,
        )?;

        self.emit_transitions(&transitions);
        self.events.emit(Event::MoraRecomputed {
            loan_id: self.id,
            as_of,
            total_mora: result.total_mora,
            overdue_installments: result.overdue_count,
        });
        self.last_mora_run = Some(as_of);

        Ok(result)
    }

    /// recompute mora as of today's date from the time provider
    pub fn recompute_mora_now(&mut self, time_provider: &SafeTimeProvider) -> Result<RecomputeResult> {
        self.recompute_mora(time_provider.now().date_naive())
    }

    /// preview what `amount` would settle if paid on `as_of`; nothing is mutated
    pub fn project_payment(&self, amount: Money, as_of: NaiveDate) -> Result<AllocationResult> {
        if self.status == LoanStatus::Pending {
            return Err(EngineError::LoanNotActive { status: self.status });
        }
        if !amount.is_positive() {
            return Err(EngineError::InvalidPaymentAmount { amount });
        }

        let mut preview = self.installments.clone();
        if self.status == LoanStatus::Approved {
            MoraCalculator::from_config(&self.config.mora)?.recompute(
                &mut preview,
                self.config.terms.start_date,
                as_of,
            )?;
        }

        PaymentAllocator::new().project(&preview, amount)
    }

    /// apply a confirmed payment with system time
    pub fn apply_payment_now(&mut self, payment: Payment) -> Result<PaymentRecord> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.apply_payment(payment, &time)
    }

    /// apply a confirmed payment.
    ///
    /// mora is brought up to the payment's effective date first. the returned
    /// record is what the caller persists next to the payment.
    pub fn apply_payment(&mut self, payment: Payment, time_provider: &SafeTimeProvider) -> Result<PaymentRecord> {
        if self.status != LoanStatus::Approved {
            return Err(EngineError::LoanNotActive { status: self.status });
        }
        payment.validate()?;
        if self.payments.iter().any(|r| r.payment.id == payment.id) {
            return Err(EngineError::PaymentAlreadyAllocated { payment_id: payment.id });
        }

        self.recompute_mora(payment.effective_date)?;

        let allocation = PaymentAllocator::new().allocate(
            &mut self.installments,
            payment.amount,
            AllocationMode::Apply,
        )?;

        let transitions: Vec<StateTransition> = allocation
            .per_installment_deltas
            .iter()
            .filter(|d| d.state_before != d.state_after)
            .map(|d| StateTransition {
                installment_number: d.installment_number,
                from: d.state_before,
                to: d.state_after,
            })
            .collect();
        self.emit_transitions(&transitions);

        self.events.emit(Event::PaymentAllocated {
            loan_id: self.id,
            payment_id: payment.id,
            amount: payment.amount,
            applied_to_mora: allocation.total_to_mora(),
            applied_to_interest: allocation.total_to_interest(),
            applied_to_principal: allocation.total_to_principal(),
            effective_date: payment.effective_date,
        });

        if allocation.remaining_unallocated.is_positive() {
            self.credit_balance += allocation.remaining_unallocated;
            self.events.emit(Event::OverpaymentReceived {
                loan_id: self.id,
                payment_id: payment.id,
                amount: allocation.remaining_unallocated,
                credit_balance: self.credit_balance,
            });
        }

        info!(
            "loan {} payment {} of {} applied, balance now {}",
            self.id, payment.id, payment.amount, allocation.new_loan_balance
        );

        let record = PaymentRecord { payment, allocation };
        self.payments.push(record.clone());

        if self.installments.iter().all(Installment::is_paid) {
            self.change_status(LoanStatus::Closed, "all installments paid", time_provider.now());
            self.closed_at = Some(time_provider.now());
        }

        Ok(record)
    }

    fn change_status(&mut self, new_status: LoanStatus, reason: &str, now: DateTime<Utc>) {
        let old_status = self.status;
        self.status = new_status;
        self.events.emit(Event::StatusChanged {
            loan_id: self.id,
            old_status,
            new_status,
            reason: reason.to_string(),
            timestamp: now,
        });
    }

    fn emit_transitions(&mut self, transitions: &[StateTransition]) {
        for change in transitions {
            self.events.emit(Event::InstallmentStateChanged {
                loan_id: self.id,
                installment_number: change.installment_number,
                old_state: change.from,
                new_state: change.to,
            });
        }
    }

    pub fn status(&self) -> LoanStatus {
        self.status
    }

    pub fn installments(&self) -> &[Installment] {
        &self.installments
    }

    pub fn installment(&self, number: u32) -> Option<&Installment> {
        self.installments.iter().find(|i| i.number == number)
    }

    pub fn payments(&self) -> &[PaymentRecord] {
        &self.payments
    }

    pub fn credit_balance(&self) -> Money {
        self.credit_balance
    }

    pub fn last_mora_run(&self) -> Option<NaiveDate> {
        self.last_mora_run
    }

    pub fn originated_at(&self) -> DateTime<Utc> {
        self.originated_at
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    /// principal + interest still owed
    pub fn outstanding_balance(&self) -> Money {
        self.installments.iter().map(|i| i.outstanding_balance()).sum()
    }

    pub fn total_mora(&self) -> Money {
        self.installments.iter().map(|i| i.outstanding_mora()).sum()
    }

    /// principal + interest + mora still owed
    pub fn total_owed(&self) -> Money {
        self.installments.iter().map(|i| i.amount_owed()).sum()
    }

    pub fn overdue_installments(&self) -> impl Iterator<Item = &Installment> {
        self.installments
            .iter()
            .filter(|i| i.state == InstallmentState::Vencida)
    }

    /// earliest installment still open
    pub fn next_due_installment(&self) -> Option<&Installment> {
        self.installments.iter().find(|i| i.state.is_open())
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    pub fn view(&self) -> LoanView {
        LoanView::from_loan(self)
    }

    pub fn json(&self) -> serde_json::Result<String> {
        self.view().to_json_pretty()
    }
}

/// persisted form of a loan: the schedule, the payments already allocated and the lifecycle timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSnapshot {
    pub id: LoanId,
    pub config: LoanConfig,
    pub status: LoanStatus,
    pub installments: Vec<Installment>,
    pub payments: Vec<PaymentRecord>,
    pub credit_balance: Money,
    pub last_mora_run: Option<NaiveDate>,
    pub originated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl LoanSnapshot {
    /// checks the invariants `Loan::restore` relies on
    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;

        let invalid = |message: String| EngineError::InvalidConfiguration { message };

        if self.status == LoanStatus::Pending {
            if !self.installments.is_empty() {
                return Err(invalid(format!("pending loan {} already has installments", self.id)));
            }
            if !self.payments.is_empty() {
                return Err(invalid(format!("pending loan {} already has payments", self.id)));
            }
            return Ok(());
        }

        let expected = self.config.terms.num_installments;
        if self.installments.len() != expected as usize {
            return Err(invalid(format!(
                "loan {} has {} installments, terms call for {}",
                self.id,
                self.installments.len(),
                expected
            )));
        }

        let mut numbers: Vec<u32> = self.installments.iter().map(|i| i.number).collect();
        numbers.sort_unstable();
        if numbers.iter().zip(1..=expected).any(|(number, want)| *number != want) {
            return Err(invalid(format!(
                "loan {} installment numbers must run 1..={} without gaps or repeats",
                self.id, expected
            )));
        }

        let mut payment_ids: Vec<PaymentId> = self.payments.iter().map(|r| r.payment.id).collect();
        payment_ids.sort_unstable();
        if let Some(pair) = payment_ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(invalid(format!("loan {} records payment {} twice", self.id, pair[0])));
        }

        if self.credit_balance.is_negative() {
            return Err(invalid(format!("loan {} has a negative credit balance", self.id)));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::InvalidConfiguration {
            message: format!("invalid loan snapshot: {}", e),
        })
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
