/// quick start - originate a vehicle loan, approve it and take a payment
use loan_mora_engine::chrono::NaiveDate;
use loan_mora_engine::{Loan, LoanConfig, Money, Payment, Rate, SafeTimeProvider, TimeSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);
    let start = NaiveDate::from_ymd_opt(2024, 1, 15).ok_or("bad date")?;

    // 18,000 over 36 months at 18% nominal
    let config = LoanConfig::vehicle_loan(Money::from_major(18_000), Rate::from_percentage(18), 36, start);

    let mut loan = Loan::originate(config, &time)?;
    loan.approve(&time)?;

    // first installment paid on time
    let first = loan.installments()[0].clone();
    loan.apply_payment(Payment::new(first.scheduled_amount(), first.due_date), &time)?;

    println!("{}", loan.json()?);

    Ok(())
}
