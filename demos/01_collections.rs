/// collections - arrears build up, a preview is shown, then a partial payment lands
use loan_mora_engine::chrono::{NaiveDate, TimeZone, Utc};
use loan_mora_engine::{Loan, LoanConfig, Money, Payment, Rate, SafeTimeProvider, TimeSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== collections example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()));
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;

    let config = LoanConfig::vehicle_loan(Money::from_major(12_000), Rate::from_percentage(12), 12, start);
    let mut loan = Loan::originate(config, &time)?;
    loan.approve(&time)?;

    // two months without payment
    let as_of = NaiveDate::from_ymd_opt(2024, 3, 20).ok_or("bad date")?;
    let result = loan.recompute_mora(as_of)?;
    println!(
        "as of {}: {} installments overdue, mora {}",
        as_of, result.overdue_count, result.total_mora
    );

    // what would 1,500.00 settle?
    let preview = loan.project_payment(Money::from_major(1_500), as_of)?;
    for delta in &preview.per_installment_deltas {
        println!(
            "  #{}: mora {} interest {} principal {} -> {:?}",
            delta.installment_number, delta.to_mora, delta.to_interest, delta.to_principal, delta.state_after
        );
    }

    // client pays it
    let record = loan.apply_payment(Payment::new(Money::from_major(1_500), as_of).with_reference("DEP-7781"), &time)?;
    println!("\nallocation record:\n{}", record.to_json_pretty()?);

    for event in loan.take_events() {
        println!("{:?}", event);
    }

    Ok(())
}
