use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::EngineError;
use crate::loan::Loan;
use crate::types::{LoanId, LoanStatus};

/// a loan the batch could not recompute
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub loan_id: LoanId,
    pub error: EngineError,
}

/// summary of one mora batch run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub as_of: Option<NaiveDate>,
    pub processed: u32,
    pub skipped: u32,
    pub overdue_installments: u32,
    pub total_mora: Money,
    #[serde(skip)]
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn failed(&self) -> u32 {
        self.failures.len() as u32
    }
}

/// daily mora recomputation over a portfolio of loans.
///
/// loans are independent; a failing loan is reported and the run continues.
#[derive(Debug, Default)]
pub struct MoraBatch;

impl MoraBatch {
    pub fn run(loans: &mut [Loan], as_of: NaiveDate) -> BatchReport {
        let mut report = BatchReport {
            as_of: Some(as_of),
            ..BatchReport::default()
        };

        for loan in loans.iter_mut() {
            if loan.status() != LoanStatus::Approved {
                report.skipped += 1;
                continue;
            }

            match loan.recompute_mora(as_of) {
                Ok(result) => {
                    report.processed += 1;
                    report.overdue_installments += result.overdue_count;
                    report.total_mora += result.total_mora;
                }
                Err(error) => {
                    warn!("mora recompute failed for loan {}: {}", loan.id, error);
                    report.failures.push(BatchFailure {
                        loan_id: loan.id,
                        error,
                    });
                }
            }
        }

        info!(
            "mora batch as of {}: {} processed, {} skipped, {} failed, total mora {}",
            as_of,
            report.processed,
            report.skipped,
            report.failed(),
            report.total_mora
        );

        report
    }

    /// run as of today's date from the time provider
    pub fn run_now(loans: &mut [Loan], time_provider: &SafeTimeProvider) -> BatchReport {
        Self::run(loans, time_provider.now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoanConfig, LoanTerms, MoraConfig};
    use crate::decimal::Rate;
    use crate::types::PaymentFrequency;
    use chrono::{Duration, TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;
    use test_log::test;

    fn loan(start: NaiveDate, time: &SafeTimeProvider, approve: bool) -> Loan {
        let config = LoanConfig::new(
            LoanTerms::new(Money::from_major(1_000), Rate::ZERO, 2, start, PaymentFrequency::Monthly),
            MoraConfig::new(Rate::from_decimal(dec!(0.001))),
        );
        let mut loan = Loan::originate(config, time).unwrap();
        if approve {
            loan.approve(time).unwrap();
        }
        loan
    }

    #[test]
    fn test_batch_processes_open_loans_and_reports_failures() {
        let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 2, 20, 6, 0, 0).unwrap()));
        let early = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let late = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let mut loans = vec![
            loan(early, &time, true),
            loan(early, &time, false),
            loan(late, &time, true),
        ];

        let report = MoraBatch::run_now(&mut loans, &time);

        assert_eq!(report.as_of, NaiveDate::from_ymd_opt(2024, 2, 20));
        assert_eq!(report.processed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].loan_id, loans[2].id);
        assert!(matches!(report.failures[0].error, EngineError::InvalidAsOfDate { .. }));

        // installment 1 (500.00, due 2024-02-01) is 19 days late: 9.50
        assert_eq!(report.overdue_installments, 1);
        assert_eq!(report.total_mora, Money::from_decimal(dec!(9.50)));
    }

    #[test]
    fn test_rerun_same_day_is_stable() {
        let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut loans = vec![loan(start, &time, true)];
        let as_of = start + Duration::days(75);

        let first = MoraBatch::run(&mut loans, as_of);
        let snapshot = loans[0].installments().to_vec();
        let second = MoraBatch::run(&mut loans, as_of);

        assert_eq!(first, second);
        assert_eq!(loans[0].installments(), snapshot.as_slice());
    }
}
