use chrono::{Duration, Months, NaiveDate};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LoanTerms;
use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::installment::Installment;
use crate::types::PaymentFrequency;

/// amortization schedule summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub periodic_rate: Rate,
    pub frequency: PaymentFrequency,
    pub start_date: NaiveDate,
    /// payment of every installment but possibly the last
    pub level_payment: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    pub maturity_date: NaiveDate,
    pub installments: Vec<Installment>,
}

impl AmortizationSchedule {
    /// generate the schedule for validated terms
    pub fn generate(terms: &LoanTerms) -> Result<Self> {
        let installments = ScheduleGenerator::generate(
            terms.principal,
            terms.periodic_rate,
            terms.num_installments,
            terms.start_date,
            terms.frequency,
        )?;
        Ok(Self::from_installments(terms, installments))
    }

    /// summarize an already generated installment sequence
    pub fn from_installments(terms: &LoanTerms, installments: Vec<Installment>) -> Self {
        let total_interest = installments.iter().map(|i| i.interest_due).sum();
        let total_payment = installments.iter().map(|i| i.scheduled_amount()).sum();
        let level_payment = installments
            .first()
            .map(|i| i.scheduled_amount())
            .unwrap_or(Money::ZERO);
        let maturity_date = installments
            .last()
            .map(|i| i.due_date)
            .unwrap_or(terms.start_date);

        Self {
            principal: terms.principal,
            periodic_rate: terms.periodic_rate,
            frequency: terms.frequency,
            start_date: terms.start_date,
            level_payment,
            total_interest,
            total_payment,
            maturity_date,
            installments,
        }
    }

    /// get installment by its 1-based number
    pub fn get_installment(&self, number: u32) -> Option<&Installment> {
        number
            .checked_sub(1)
            .and_then(|idx| self.installments.get(idx as usize))
    }

    /// principal still scheduled after installment `number` is paid
    pub fn balance_after(&self, number: u32) -> Money {
        let repaid: Money = self
            .installments
            .iter()
            .take(number as usize)
            .map(|i| i.principal_due)
            .sum();
        self.principal.saturating_sub(repaid)
    }
}

/// fixed-installment (french / annuity) schedule generator
pub struct ScheduleGenerator;

impl ScheduleGenerator {
    /// build the ordered installment sequence for a loan.
    ///
    /// the final installment's principal portion always closes the balance
    /// exactly, so the principal portions sum to `principal`.
    pub fn generate(
        principal: Money,
        periodic_rate: Rate,
        num_installments: u32,
        start_date: NaiveDate,
        frequency: PaymentFrequency,
    ) -> Result<Vec<Installment>> {
        LoanTerms::new(principal, periodic_rate, num_installments, start_date, frequency).validate()?;

        let due_dates = (1..=num_installments)
            .map(|k| due_date(start_date, frequency, k))
            .collect::<Result<Vec<_>>>()?;

        let installments = if periodic_rate.is_zero() {
            Self::interest_free(principal, &due_dates)
        } else {
            Self::annuity(principal, periodic_rate, &due_dates)?
        };

        debug!(
            "generated {} installments for principal {} at periodic rate {}",
            installments.len(),
            principal,
            periodic_rate
        );

        Ok(installments)
    }

    /// equal principal portions truncated to the cent, remainder on the last installment
    fn interest_free(principal: Money, due_dates: &[NaiveDate]) -> Vec<Installment> {
        let n = due_dates.len();
        let portion = Money::from_decimal_truncated(principal.as_decimal() / Decimal::from(n as u64));

        let mut allocated = Money::ZERO;
        let mut installments = Vec::with_capacity(n);

        for (idx, due) in due_dates.iter().enumerate() {
            let principal_due = if idx + 1 == n {
                principal - allocated
            } else {
                portion
            };
            allocated += principal_due;
            installments.push(Installment::new((idx + 1) as u32, *due, principal_due, Money::ZERO));
        }

        installments
    }

    fn annuity(principal: Money, periodic_rate: Rate, due_dates: &[NaiveDate]) -> Result<Vec<Installment>> {
        let r = periodic_rate.as_decimal();
        let n = due_dates.len();
        let payment = level_payment(principal, periodic_rate, n as u32)?;

        let mut balance = principal;
        let mut installments = Vec::with_capacity(n);

        for (idx, due) in due_dates.iter().enumerate() {
            let interest_due = balance * r;
            let principal_due = if idx + 1 == n {
                balance
            } else {
                (payment - interest_due).max(Money::ZERO).min(balance)
            };

            installments.push(Installment::new((idx + 1) as u32, *due, principal_due, interest_due));
            balance -= principal_due;
        }

        Ok(installments)
    }
}

/// level payment `A = P·r / (1 − (1+r)^-n)`, rounded to cents
pub fn level_payment(principal: Money, periodic_rate: Rate, num_installments: u32) -> Result<Money> {
    if num_installments == 0 {
        return Err(EngineError::InvalidLoanTerms {
            message: "number of installments must be at least 1".to_string(),
        });
    }

    let r = periodic_rate.as_decimal();
    if r.is_zero() {
        return Ok(Money::from_decimal(principal.as_decimal() / Decimal::from(num_installments)));
    }

    // (1+r)^n; equivalent form P·r·(1+r)^n / ((1+r)^n − 1)
    let base = Decimal::ONE + r;
    let mut compound = Decimal::ONE;
    for _ in 0..num_installments {
        compound = compound.checked_mul(base).ok_or_else(|| EngineError::CalculationError {
            message: format!("annuity factor overflow for rate {} over {} periods", periodic_rate, num_installments),
        })?;
    }

    let numerator = principal
        .as_decimal()
        .checked_mul(r)
        .and_then(|v| v.checked_mul(compound))
        .ok_or_else(|| EngineError::CalculationError {
            message: "level payment numerator overflow".to_string(),
        })?;
    let denominator = compound - Decimal::ONE;

    Ok(Money::from_decimal(numerator / denominator))
}

/// due date of installment `k` (1-based)
fn due_date(start: NaiveDate, frequency: PaymentFrequency, k: u32) -> Result<NaiveDate> {
    let date = match frequency {
        PaymentFrequency::Monthly => start.checked_add_months(Months::new(k)),
        PaymentFrequency::Biweekly => start.checked_add_signed(Duration::days(14 * k as i64)),
        PaymentFrequency::Weekly => start.checked_add_signed(Duration::days(7 * k as i64)),
    };
    date.ok_or_else(|| EngineError::InvalidLoanTerms {
        message: format!("due date of installment {} is out of range", k),
    })
}
