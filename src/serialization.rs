//! serialization support for loans
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::installment::Installment;
use crate::loan::Loan;
use crate::types::{InstallmentState, LoanId, LoanStatus, PaymentFrequency};

/// serializable view of a loan's state
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanView {
    pub id: LoanId,
    pub status: LoanStatus,
    pub originated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub terms: TermsView,
    pub balances: BalanceView,
    pub installments: Vec<InstallmentView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TermsView {
    pub principal: Money,
    pub periodic_rate: Rate,
    pub num_installments: u32,
    pub frequency: PaymentFrequency,
    pub start_date: NaiveDate,
    pub daily_mora_rate: Rate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceView {
    pub outstanding_balance: Money,
    pub outstanding_mora: Money,
    pub total_owed: Money,
    pub credit_balance: Money,
    pub overdue_installments: u32,
    pub paid_installments: u32,
    pub payments_recorded: u32,
    pub last_mora_run: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InstallmentView {
    pub number: u32,
    pub due_date: NaiveDate,
    pub scheduled_amount: Money,
    pub principal_due: Money,
    pub interest_due: Money,
    pub paid: Money,
    pub mora: Money,
    pub outstanding: Money,
    pub days_overdue: u32,
    pub state: InstallmentState,
}

impl InstallmentView {
    pub fn from_installment(inst: &Installment) -> Self {
        InstallmentView {
            number: inst.number,
            due_date: inst.due_date,
            scheduled_amount: inst.scheduled_amount(),
            principal_due: inst.principal_due,
            interest_due: inst.interest_due,
            paid: inst.total_paid(),
            mora: inst.outstanding_mora(),
            outstanding: inst.amount_owed(),
            days_overdue: inst.days_overdue,
            state: inst.state,
        }
    }
}

impl LoanView {
    pub fn from_loan(loan: &Loan) -> Self {
        let installments = loan.installments();
        let terms = &loan.config.terms;

        LoanView {
            id: loan.id,
            status: loan.status(),
            originated_at: loan.originated_at(),
            approved_at: loan.approved_at(),
            closed_at: loan.closed_at(),
            terms: TermsView {
                principal: terms.principal,
                periodic_rate: terms.periodic_rate,
                num_installments: terms.num_installments,
                frequency: terms.frequency,
                start_date: terms.start_date,
                daily_mora_rate: loan.config.mora.daily_mora_rate,
            },
            balances: BalanceView {
                outstanding_balance: loan.outstanding_balance(),
                outstanding_mora: loan.total_mora(),
                total_owed: loan.total_owed(),
                credit_balance: loan.credit_balance(),
                overdue_installments: loan.overdue_installments().count() as u32,
                paid_installments: installments.iter().filter(|i| i.is_paid()).count() as u32,
                payments_recorded: loan.payments().len() as u32,
                last_mora_run: loan.last_mora_run(),
            },
            installments: installments.iter().map(InstallmentView::from_installment).collect(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
