use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::MoraConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::installment::Installment;
use crate::state::StateTransition;
use crate::types::InstallmentState;

use super::days_overdue;

/// outcome of one recomputation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecomputeResult {
    /// installments evaluated (every installment not already paid)
    pub updated_count: u32,
    /// outstanding mora across evaluated installments
    pub total_mora: Money,
    pub overdue_count: u32,
}

/// recomputes per-installment arrears from scratch.
///
/// mora is simple interest on the overdue principal + interest balance; it
/// never accrues on itself.
#[derive(Debug, Clone)]
pub struct MoraCalculator {
    daily_mora_rate: Rate,
}

impl MoraCalculator {
    pub fn new(daily_mora_rate: Rate) -> Result<Self> {
        MoraConfig::new(daily_mora_rate).validate()?;
        Ok(Self { daily_mora_rate })
    }

    pub fn from_config(config: &MoraConfig) -> Result<Self> {
        Self::new(config.daily_mora_rate)
    }

    pub fn daily_mora_rate(&self) -> Rate {
        self.daily_mora_rate
    }

    /// mora owed for `balance` overdue by `days`
    pub fn mora_for(&self, balance: Money, days: u32) -> Money {
        balance * (self.daily_mora_rate.as_decimal() * Decimal::from(days))
    }

    /// recompute mora, days overdue and state of every unpaid installment as of `as_of`
    pub fn recompute(
        &self,
        installments: &mut [Installment],
        start_date: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<RecomputeResult> {
        self.recompute_with_transitions(installments, start_date, as_of)
            .map(|(result, _)| result)
    }

    /// as [`recompute`](Self::recompute), also reporting the state changes made
    pub fn recompute_with_transitions(
        &self,
        installments: &mut [Installment],
        start_date: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<(RecomputeResult, Vec<StateTransition>)> {
        if as_of < start_date {
            return Err(EngineError::InvalidAsOfDate { as_of, start_date });
        }

        let mut result = RecomputeResult::default();
        let mut transitions = Vec::new();

        for inst in installments.iter_mut().filter(|i| !i.is_paid()) {
            let balance = inst.outstanding_balance();
            let days = if balance.is_zero() {
                0
            } else {
                days_overdue(inst.due_date, as_of)
            };

            inst.days_overdue = days;
            inst.mora_amount = if days > 0 {
                // mora already collected is never clawed back
                self.mora_for(balance, days).max(inst.mora_paid)
            } else {
                inst.mora_paid
            };

            let next = InstallmentState::resolve(inst.state_inputs(days > 0));
            if let Some(change) = inst.transition(next) {
                debug!(
                    "installment {} moved {:?} -> {:?} as of {}",
                    change.installment_number, change.from, change.to, as_of
                );
                transitions.push(change);
            }

            result.updated_count += 1;
            result.total_mora += inst.outstanding_mora();
            if inst.state == InstallmentState::Vencida {
                result.overdue_count += 1;
            }
        }

        if result.overdue_count > 0 {
            warn!(
                "{} installments overdue as of {}, outstanding mora {}",
                result.overdue_count, as_of, result.total_mora
            );
        }

        Ok((result, transitions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use test_log::test;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calculator() -> MoraCalculator {
        MoraCalculator::new(Rate::from_decimal(dec!(0.001))).unwrap()
    }

    fn start() -> NaiveDate {
        date(2024, 1, 1)
    }

    #[test]
    fn test_overdue_installment_accrues_mora() {
        let as_of = date(2024, 3, 11);
        let mut installments = vec![Installment::new(1, as_of - Duration::days(10), Money::from_major(500), Money::ZERO)];

        let result = calculator().recompute(&mut installments, start(), as_of).unwrap();

        assert_eq!(installments[0].mora_amount, Money::from_decimal(dec!(5.00)));
        assert_eq!(installments[0].days_overdue, 10);
        assert_eq!(installments[0].state, InstallmentState::Vencida);
        assert_eq!(result.updated_count, 1);
        assert_eq!(result.overdue_count, 1);
        assert_eq!(result.total_mora, Money::from_major(5));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let as_of = date(2024, 4, 20);
        let mut installments = vec![
            Installment::new(1, date(2024, 2, 1), Money::from_major(300), Money::from_decimal(dec!(12.34))),
            Installment::new(2, date(2024, 3, 1), Money::from_major(310), Money::from_decimal(dec!(9.10))),
            Installment::new(3, date(2024, 5, 1), Money::from_major(320), Money::from_decimal(dec!(6.00))),
        ];
        installments[1].interest_paid = Money::from_decimal(dec!(9.10));

        let calc = calculator();
        let first = calc.recompute(&mut installments, start(), as_of).unwrap();
        let snapshot = installments.clone();
        let (second, transitions) = calc.recompute_with_transitions(&mut installments, start(), as_of).unwrap();

        assert_eq!(installments, snapshot);
        assert_eq!(first, second);
        assert!(transitions.is_empty());
    }

    #[test]
    fn test_not_yet_due_has_no_mora() {
        let mut installments = vec![Installment::new(1, date(2024, 2, 1), Money::from_major(500), Money::from_major(5))];

        // due date itself is not overdue
        calculator().recompute(&mut installments, start(), date(2024, 2, 1)).unwrap();
        assert_eq!(installments[0].mora_amount, Money::ZERO);
        assert_eq!(installments[0].days_overdue, 0);
        assert_eq!(installments[0].state, InstallmentState::Pendiente);
    }

    #[test]
    fn test_partial_payment_before_due_is_parcial() {
        let mut installments = vec![Installment::new(1, date(2024, 2, 1), Money::from_major(500), Money::from_major(5))];
        installments[0].interest_paid = Money::from_major(5);

        calculator().recompute(&mut installments, start(), date(2024, 1, 20)).unwrap();
        assert_eq!(installments[0].state, InstallmentState::Parcial);
    }

    #[test]
    fn test_mora_uses_remaining_balance() {
        let mut installments = vec![Installment::new(1, date(2024, 2, 1), Money::from_major(1_000), Money::from_major(50))];
        installments[0].interest_paid = Money::from_major(50);
        installments[0].principal_paid = Money::from_major(400);

        // 600.00 * 0.001 * 20 = 12.00
        calculator().recompute(&mut installments, start(), date(2024, 2, 21)).unwrap();
        assert_eq!(installments[0].mora_amount, Money::from_major(12));
        assert_eq!(installments[0].state, InstallmentState::Vencida);
    }

    #[test]
    fn test_zero_balance_becomes_pagada_regardless_of_date() {
        let mut installments = vec![Installment::new(1, date(2024, 2, 1), Money::from_major(100), Money::from_major(1))];
        installments[0].principal_paid = Money::from_major(100);
        installments[0].interest_paid = Money::from_major(1);
        installments[0].state = InstallmentState::Parcial;

        let (result, transitions) = calculator()
            .recompute_with_transitions(&mut installments, start(), date(2024, 6, 1))
            .unwrap();

        assert_eq!(installments[0].state, InstallmentState::Pagada);
        assert_eq!(installments[0].mora_amount, Money::ZERO);
        assert_eq!(result.overdue_count, 0);
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].to, InstallmentState::Pagada);
    }

    #[test]
    fn test_paid_installments_are_skipped() {
        let mut paid = Installment::new(1, date(2024, 2, 1), Money::from_major(100), Money::ZERO);
        paid.principal_paid = Money::from_major(100);
        paid.state = InstallmentState::Pagada;
        let mut installments = vec![paid.clone()];

        let result = calculator().recompute(&mut installments, start(), date(2024, 12, 1)).unwrap();
        assert_eq!(installments[0], paid);
        assert_eq!(result.updated_count, 0);
    }

    #[test]
    fn test_mora_not_compounded() {
        let mut installments = vec![Installment::new(1, date(2024, 2, 1), Money::from_major(1_000), Money::ZERO)];
        let calc = calculator();

        calc.recompute(&mut installments, start(), date(2024, 3, 2)).unwrap();
        assert_eq!(installments[0].mora_amount, Money::from_major(30));

        // linear in days: 60 days -> 60.00, not 30 + interest on 30
        calc.recompute(&mut installments, start(), date(2024, 4, 1)).unwrap();
        assert_eq!(installments[0].mora_amount, Money::from_major(60));
    }

    #[test]
    fn test_collected_mora_is_kept() {
        let mut installments = vec![Installment::new(1, date(2024, 2, 1), Money::from_major(1_000), Money::ZERO)];
        installments[0].mora_paid = Money::from_major(10);
        installments[0].principal_paid = Money::from_major(900);

        // 100.00 * 0.001 * 5 = 0.50 < 10.00 already collected
        calculator().recompute(&mut installments, start(), date(2024, 2, 6)).unwrap();
        assert_eq!(installments[0].mora_amount, Money::from_major(10));
        assert_eq!(installments[0].outstanding_mora(), Money::ZERO);
    }

    #[test]
    fn test_as_of_before_start_rejected_without_mutation() {
        let mut installments = vec![Installment::new(1, date(2024, 2, 1), Money::from_major(100), Money::ZERO)];
        installments[0].mora_amount = Money::from_major(3);
        let before = installments.clone();

        let err = calculator().recompute(&mut installments, start(), date(2023, 12, 31)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAsOfDate { .. }));
        assert_eq!(installments, before);
    }

    #[test]
    fn test_negative_rate_rejected() {
        assert!(matches!(
            MoraCalculator::new(Rate::from_decimal(dec!(-0.01))),
            Err(EngineError::InvalidConfiguration { .. })
        ));
    }
}
