use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::types::PaymentFrequency;

/// loan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanConfig {
    pub terms: LoanTerms,
    pub mora: MoraConfig,
}

/// financial terms of a fixed-rate equal-installment loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// rate charged per installment period
    pub periodic_rate: Rate,
    pub num_installments: u32,
    pub start_date: NaiveDate,
    pub frequency: PaymentFrequency,
}

/// delinquency configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoraConfig {
    /// penalty rate charged per day on the overdue balance
    pub daily_mora_rate: Rate,
}

impl LoanTerms {
    pub fn new(
        principal: Money,
        periodic_rate: Rate,
        num_installments: u32,
        start_date: NaiveDate,
        frequency: PaymentFrequency,
    ) -> Self {
        Self {
            principal,
            periodic_rate,
            num_installments,
            start_date,
            frequency,
        }
    }

    /// build terms from a nominal annual rate, split evenly across the year's periods
    pub fn from_annual_rate(
        principal: Money,
        annual_rate: Rate,
        num_installments: u32,
        start_date: NaiveDate,
        frequency: PaymentFrequency,
    ) -> Self {
        let periodic_rate = annual_rate.periodic(frequency.periods_per_year());
        Self::new(principal, periodic_rate, num_installments, start_date, frequency)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(EngineError::InvalidLoanTerms {
                message: format!("principal must be positive, got {}", self.principal),
            });
        }
        if self.num_installments == 0 {
            return Err(EngineError::InvalidLoanTerms {
                message: "number of installments must be at least 1".to_string(),
            });
        }
        if self.periodic_rate.is_negative() {
            return Err(EngineError::InvalidLoanTerms {
                message: format!("periodic rate must not be negative, got {}", self.periodic_rate),
            });
        }
        Ok(())
    }
}

impl MoraConfig {
    pub fn new(daily_mora_rate: Rate) -> Self {
        Self { daily_mora_rate }
    }

    pub fn validate(&self) -> Result<()> {
        if self.daily_mora_rate.is_negative() {
            return Err(EngineError::InvalidConfiguration {
                message: format!("daily mora rate must not be negative, got {}", self.daily_mora_rate),
            });
        }
        Ok(())
    }
}

impl Default for MoraConfig {
    /// 0.1% of the overdue balance per day
    fn default() -> Self {
        Self {
            daily_mora_rate: Rate::from_decimal(dec!(0.001)),
        }
    }
}

impl LoanConfig {
    pub fn new(terms: LoanTerms, mora: MoraConfig) -> Self {
        Self { terms, mora }
    }

    /// monthly vehicle loan quoted at a nominal annual rate with the default mora rate
    pub fn vehicle_loan(
        amount: Money,
        annual_rate: Rate,
        term_months: u32,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            terms: LoanTerms::from_annual_rate(
                amount,
                annual_rate,
                term_months,
                start_date,
                PaymentFrequency::Monthly,
            ),
            mora: MoraConfig::default(),
        }
    }

    /// replace the daily mora rate
    pub fn with_daily_mora_rate(mut self, rate: Rate) -> Self {
        self.mora.daily_mora_rate = rate;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.terms.validate()?;
        self.mora.validate()
    }

    /// parse and validate a json configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LoanConfig =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::InvalidConfiguration {
            message: e.to_string(),
        })
    }
}
