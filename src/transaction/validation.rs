//! Validation of the fields submitted in the transaction forms.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transaction::TransactionKind;

/// The maximum number of characters in a transaction description.
pub const DESCRIPTION_MAX_LENGTH: usize = 255;
/// The maximum number of digits in an amount, on both sides of the decimal point.
pub const AMOUNT_MAX_DIGITS: u32 = 10;
/// The maximum number of digits after the decimal point in an amount.
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;

const REQUIRED_MSG: &str = "This field is required.";

/// The fields of a transaction form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionField {
    /// What the transaction was for.
    Description,
    /// How much money changed hands.
    Amount,
    /// Income or expense.
    Kind,
}

impl TransactionField {
    /// The name of the form input for this field.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionField::Description => "description",
            TransactionField::Amount => "amount",
            TransactionField::Kind => "kind",
        }
    }
}

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The field that was rejected.
    pub field: TransactionField,
    /// A message for the user explaining what is wrong.
    pub message: String,
}

impl FieldError {
    /// Create an error for `field`.
    pub fn new(field: TransactionField, message: &str) -> Self {
        Self {
            field,
            message: message.to_owned(),
        }
    }
}

/// Every problem found in a submitted form, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Record a problem with `field`.
    pub fn push(&mut self, field: TransactionField, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Whether no problems were found.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the problems in the order they were found.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// The messages for `field`, in the order they were found.
    pub fn messages_for(&self, field: TransactionField) -> Vec<&str> {
        self.0
            .iter()
            .filter(|error| error.field == field)
            .map(|error| error.message.as_str())
            .collect()
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field.as_str(), error.message)?;
        }

        Ok(())
    }
}

/// The raw values submitted in the add and edit forms.
///
/// Missing inputs deserialize to empty strings so that they are reported
/// as field errors instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    /// What the transaction was for.
    #[serde(default)]
    pub description: String,
    /// The amount as typed, e.g. "4.50".
    #[serde(default)]
    pub amount: String,
    /// Only sent by the edit form.
    #[serde(default)]
    pub kind: Option<String>,
}

/// The fields of a [TransactionForm] that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTransactionFields {
    pub description: String,
    pub amount: Decimal,
    pub kind: Option<TransactionKind>,
}

impl TransactionForm {
    /// Check every field and convert them to their domain types.
    ///
    /// # Errors
    ///
    /// Returns all of the problems found, not just the first.
    pub fn validate(&self) -> Result<ValidTransactionFields, FieldErrors> {
        let mut errors = FieldErrors::default();

        let description = self.description.trim();
        let description_length = description.chars().count();
        if description.is_empty() {
            errors.push(TransactionField::Description, REQUIRED_MSG);
        } else if description_length > DESCRIPTION_MAX_LENGTH {
            errors.push(
                TransactionField::Description,
                format!(
                    "Ensure this value has at most {DESCRIPTION_MAX_LENGTH} characters \
                    (it has {description_length})."
                ),
            );
        }

        let amount = match parse_amount(&self.amount) {
            Ok(amount) => Some(amount),
            Err(message) => {
                errors.push(TransactionField::Amount, message);
                None
            }
        };

        let kind = match self.kind.as_deref() {
            None => None,
            Some(raw_kind) => match TransactionKind::from_str(raw_kind) {
                Ok(kind) => Some(kind),
                Err(_) => {
                    errors.push(
                        TransactionField::Kind,
                        format!(
                            "Select a valid choice. {raw_kind} is not one of the available choices."
                        ),
                    );
                    None
                }
            },
        };

        match amount {
            Some(amount) if errors.is_empty() => Ok(ValidTransactionFields {
                description: description.to_owned(),
                amount,
                kind,
            }),
            _ => Err(errors),
        }
    }
}

const NOT_A_NUMBER_MSG: &str = "Enter a number.";

/// A decimal number split into its significant digits and a power of ten.
struct DecimalParts {
    is_negative: bool,
    /// The digits without leading zeros, or "0" for zero.
    coefficient: String,
    exponent: i64,
}

impl DecimalParts {
    /// Split a plain or scientific notation number, e.g. "-12.50" or "1e3".
    ///
    /// Digit separators, infinities and NaN are not numbers here.
    fn parse(raw_number: &str) -> Option<Self> {
        let (is_negative, unsigned) = match raw_number.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw_number.strip_prefix('+').unwrap_or(raw_number)),
        };

        let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());

        let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
            Some((mantissa, raw_exponent)) => {
                let exponent_digits = raw_exponent.strip_prefix(['-', '+']).unwrap_or(raw_exponent);
                if exponent_digits.is_empty() || !is_digits(exponent_digits) {
                    return None;
                }
                (mantissa, raw_exponent.parse::<i64>().ok()?)
            }
            None => (unsigned, 0),
        };

        let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction)
        {
            return None;
        }

        let coefficient = match format!("{whole}{fraction}").trim_start_matches('0') {
            "" => "0".to_owned(),
            significant => significant.to_owned(),
        };

        Some(Self {
            is_negative,
            coefficient,
            exponent: exponent.checked_sub(fraction.len() as i64)?,
        })
    }

    /// The number of digits in total and after the decimal point.
    ///
    /// Trailing zeros count, so "4.50" has three digits and two decimal places.
    fn digit_counts(&self) -> (i64, i64) {
        let coefficient_digits = self.coefficient.len() as i64;

        if self.exponent >= 0 {
            let digits = if self.coefficient == "0" {
                1
            } else {
                coefficient_digits.saturating_add(self.exponent)
            };
            (digits, 0)
        } else if -self.exponent > coefficient_digits {
            // Zeros between the decimal point and the first significant digit.
            (-self.exponent, -self.exponent)
        } else {
            (coefficient_digits, -self.exponent)
        }
    }
}

fn parse_amount(raw_amount: &str) -> Result<Decimal, String> {
    let raw_amount = raw_amount.trim();
    if raw_amount.is_empty() {
        return Err(REQUIRED_MSG.to_owned());
    }

    let parts = DecimalParts::parse(raw_amount).ok_or_else(|| NOT_A_NUMBER_MSG.to_owned())?;
    let (digits, decimals) = parts.digit_counts();
    let max_whole_digits = AMOUNT_MAX_DIGITS - AMOUNT_DECIMAL_PLACES;

    if digits > i64::from(AMOUNT_MAX_DIGITS) {
        return Err(format!(
            "Ensure that there are no more than {AMOUNT_MAX_DIGITS} digits in total."
        ));
    }
    if decimals > i64::from(AMOUNT_DECIMAL_PLACES) {
        return Err(format!(
            "Ensure that there are no more than {AMOUNT_DECIMAL_PLACES} decimal places."
        ));
    }
    if digits - decimals > i64::from(max_whole_digits) {
        return Err(format!(
            "Ensure that there are no more than {max_whole_digits} digits before the decimal point."
        ));
    }

    // At most ten significant digits are left, which fits in an i64.
    let coefficient: i64 = parts
        .coefficient
        .parse()
        .map_err(|_| NOT_A_NUMBER_MSG.to_owned())?;
    let (mantissa, scale) = if parts.exponent >= 0 {
        // Zero may carry any exponent, everything else has at most nine.
        (coefficient * 10_i64.pow(parts.exponent.min(9) as u32), 0)
    } else {
        (coefficient, (-parts.exponent) as u32)
    };
    let mantissa = if parts.is_negative { -mantissa } else { mantissa };

    Ok(Decimal::new(mantissa, scale))
}
