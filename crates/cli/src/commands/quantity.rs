//! Quantity policy evaluation.
//!
//! # Usage
//!
//! ```bash
//! # Pack of 10, no free stock: 15 snaps to 20
//! od-cli quantity blur --pack 10 --indicator 0 --value 15
//!
//! # 5 in stock, packs of 3: "+" from 5 jumps to 8
//! od-cli quantity increment --stock 5 --pack 3 --indicator 0 --current 5
//! ```

use orderdesk_core::{
    Packaging, QuantityField, QuantityPolicy, RestrictionIndicator, parse_quantity,
};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when evaluating a quantity operation.
#[derive(Debug, Error)]
pub enum QuantityCommandError {
    #[error("--current is required for {0}")]
    MissingCurrent(&'static str),

    #[error("--value is required for {0}")]
    MissingValue(&'static str),

    #[error("not a number: {0}")]
    NotANumber(String),
}

/// A policy operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Initial,
    Increment,
    Decrement,
    Typed,
    Blur,
}

/// Build packaging attributes from command-line arguments.
///
/// The indicator is read as JSON when it parses (`0`, `"0"`, `null`) and as a
/// plain string otherwise.
pub fn packaging(stock: i64, pack: Option<i64>, indicator: Option<&str>) -> Packaging {
    let restricted = indicator.is_some_and(|raw| {
        let value = serde_json::from_str::<Value>(raw)
            .unwrap_or_else(|_| Value::String(raw.to_owned()));
        RestrictionIndicator::from_value(&value).is_restricted()
    });
    Packaging::new(stock, pack, restricted)
}

/// Evaluate one operation.
///
/// A typed value with no number in it leaves the current quantity unchanged.
///
/// # Errors
///
/// Returns an error if a required argument is missing or a blur value is not
/// a number.
pub fn evaluate(
    packaging: Packaging,
    operation: Operation,
    current: Option<i64>,
    value: Option<&str>,
) -> Result<i64, QuantityCommandError> {
    let policy = QuantityPolicy::new(packaging);

    let result = match operation {
        Operation::Initial => policy.initial(),
        Operation::Increment => {
            policy.increment(current.ok_or(QuantityCommandError::MissingCurrent("increment"))?)
        }
        Operation::Decrement => {
            policy.decrement(current.ok_or(QuantityCommandError::MissingCurrent("decrement"))?)
        }
        Operation::Typed => {
            let current = current.ok_or(QuantityCommandError::MissingCurrent("typed"))?;
            let raw = value.ok_or(QuantityCommandError::MissingValue("typed"))?;
            let mut field = QuantityField::new(policy, current);
            field.input(raw);
            field.value()
        }
        Operation::Blur => {
            let raw = value.ok_or(QuantityCommandError::MissingValue("blur"))?;
            let quantity = parse_quantity(raw)
                .ok_or_else(|| QuantityCommandError::NotANumber(raw.to_owned()))?;
            policy.normalize_on_blur(quantity)
        }
    };

    Ok(result)
}

/// Evaluate and print the resulting quantity.
///
/// # Errors
///
/// See [`evaluate`].
pub fn run(
    packaging: Packaging,
    operation: Operation,
    current: Option<i64>,
    value: Option<&str>,
) -> Result<(), QuantityCommandError> {
    let result = evaluate(packaging, operation, current, value)?;
    tracing::debug!(?packaging, ?operation, result, "quantity evaluated");

    #[allow(clippy::print_stdout)]
    {
        println!("{result}");
    }
    Ok(())
}
