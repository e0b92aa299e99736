pub mod batch;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod installment;
pub mod interest;
pub mod loan;
pub mod payments;
pub mod serialization;
pub mod state;
pub mod types;

// re-export key types
pub use batch::{BatchFailure, BatchReport, MoraBatch};
pub use config::{LoanConfig, LoanTerms, MoraConfig};
pub use decimal::{Money, Rate};
pub use errors::{EngineError, Result};
pub use events::{Event, EventStore};
pub use installment::Installment;
pub use interest::{MoraCalculator, RecomputeResult};
pub use loan::{Loan, LoanSnapshot};
pub use payments::{
    AllocationResult, AmortizationSchedule, InstallmentDelta, Payment, PaymentAllocator,
    PaymentRecord, ScheduleGenerator,
};
pub use serialization::{InstallmentView, LoanView};
pub use state::StateTransition;
pub use types::{AllocationMode, InstallmentState, LoanId, LoanStatus, PaymentFrequency, PaymentId};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
