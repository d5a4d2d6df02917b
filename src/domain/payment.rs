use super::pool::{Participant, PoolId, PoolStatus};
use crate::error::{PoolError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum length of a mobile money phone number.
pub const MIN_PHONE_LEN: usize = 7;

/// Units committed by a payment when none are specified.
pub const DEFAULT_PAYMENT_QUANTITY: f64 = 1.0;

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Mobile network operator money transfer.
    Mno,
    Card,
    /// Off-band payment against a generated reference.
    Control,
}

/// Out-of-band payment reference: `{POOLID}-{6 digits}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlNumber(String);

impl ControlNumber {
    /// Builds the reference from the pool id and the last six digits of an
    /// epoch-millisecond timestamp.
    pub fn generate(pool: &PoolId, epoch_millis: i64) -> Self {
        let tail = epoch_millis.rem_euclid(1_000_000);
        Self(format!("{}-{:06}", pool.as_str().to_uppercase(), tail))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this reference carries the `{POOLID}-` prefix of `pool`.
    pub fn belongs_to(&self, pool: &PoolId) -> bool {
        self.0
            .strip_prefix(&pool.as_str().to_uppercase())
            .is_some_and(|rest| rest.starts_with('-') && rest.len() > 1)
    }
}

impl fmt::Display for ControlNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ControlNumber {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Payment form contents, fixed at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentDetails {
    MobileMoney {
        phone: String,
    },
    Card {
        holder: String,
        number: String,
        expiry: String,
        cvv: String,
    },
    Control {
        control_number: Option<ControlNumber>,
    },
}

impl PaymentDetails {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentDetails::MobileMoney { .. } => PaymentMethod::Mno,
            PaymentDetails::Card { .. } => PaymentMethod::Card,
            PaymentDetails::Control { .. } => PaymentMethod::Control,
        }
    }

    /// Presence checks only: no Luhn check and no expiry parsing.
    pub fn validate(&self) -> Result<()> {
        match self {
            PaymentDetails::MobileMoney { phone } => {
                if phone.trim().len() < MIN_PHONE_LEN {
                    return Err(PoolError::ValidationError("invalid phone".to_string()));
                }
            }
            PaymentDetails::Card {
                holder,
                number,
                expiry,
                cvv,
            } => {
                if [holder, number, expiry, cvv]
                    .iter()
                    .any(|field| field.trim().is_empty())
                {
                    return Err(PoolError::ValidationError(
                        "incomplete card details".to_string(),
                    ));
                }
            }
            PaymentDetails::Control { control_number } => {
                if control_number
                    .as_ref()
                    .is_none_or(|number| number.as_str().trim().is_empty())
                {
                    return Err(PoolError::ValidationError(
                        "no control number generated".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Whether a successful payment commits units immediately.
    pub fn commits_immediately(&self) -> bool {
        self.method() != PaymentMethod::Control
    }
}

/// Result of an accepted payment.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    /// Units were committed to the pool.
    Joined {
        participant: Participant,
        status: PoolStatus,
    },
    /// Awaiting external reconciliation; nothing was committed.
    PendingConfirmation { control_number: ControlNumber },
}
