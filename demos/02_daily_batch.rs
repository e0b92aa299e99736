/// daily batch - recompute mora across a small portfolio
use loan_mora_engine::chrono::{Duration, NaiveDate, TimeZone, Utc};
use loan_mora_engine::{Loan, LoanConfig, MoraBatch, Money, Rate, SafeTimeProvider, TimeSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap()));
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;

    let mut loans = Vec::new();
    for (amount, months) in [(8_000, 24), (15_000, 48), (22_500, 60)] {
        let config = LoanConfig::vehicle_loan(Money::from_major(amount), Rate::from_percentage(16), months, start);
        let mut loan = Loan::originate(config, &time)?;
        loan.approve(&time)?;
        loans.push(loan);
    }

    // advance the clock through a quarter and run the batch each month end
    let control = time.test_control().unwrap();
    for _ in 0..3 {
        control.advance(Duration::days(30));
        let report = MoraBatch::run_now(&mut loans, &time);
        println!(
            "{:?}: processed {}, overdue installments {}, total mora {}",
            report.as_of, report.processed, report.overdue_installments, report.total_mora
        );
    }

    Ok(())
}
