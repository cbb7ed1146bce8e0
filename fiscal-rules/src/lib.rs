//! Fiscal Rules Crate
//!
//! Pure, side-effect free rules used by the API and the agents:
//!
//! - `due_date`: turns a binding's due day and weekend policy into concrete
//!   due dates for a competence period
//! - `ncm`: validates an NCM code and product description against a static catalog
//! - `message`: pulls the JSON object out of an LLM reply and normalises the
//!   expense fields it carries
//!
//! # Example
//!
//! ```rust,ignore
//! use fiscal_rules::due_date::{due_date, Competence, DueDay};
//! use shared_types::AdjustPolicy;
//!
//! let competence = Competence::new(3, 2024)?;
//! let date = due_date(DueDay::new(20)?, AdjustPolicy::Postpone, competence);
//! assert_eq!(date.to_string(), "2024-04-22");
//! ```

pub mod due_date;
pub mod message;
pub mod ncm;

pub use due_date::{annual_schedule, due_date, unadjusted_due_date, Competence, DueDay};
pub use message::{extract_json_block, parse_amount, InterpretedExpense};
pub use ncm::{validate_ncm, NcmCatalog, NcmEntry};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),
    #[error("year {0} is out of the supported range")]
    InvalidYear(i32),
    #[error("due day must be between 1 and 31, got {0}")]
    InvalidDueDay(u32),
    #[error("no JSON object found in text")]
    NoJsonBlock,
    #[error("malformed JSON object: {0}")]
    MalformedJson(String),
}
