use crate::error::{PoolError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Company recorded for members who join without an affiliation.
pub const DEFAULT_COMPANY: &str = "Individual";

/// Unique identifier of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(String);

impl PoolId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PoolId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Price of a single unit in a pool.
///
/// Wraps `rust_decimal::Decimal` so that currency amounts never go through
/// floating point.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PoolError::ValidationError(
                "Price must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Total cost of `quantity` units at this price.
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }
}

/// A validated unit count for a join: always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quantity(u32);

impl Quantity {
    /// Validates a raw requested quantity and floors it to whole units.
    ///
    /// NaN, infinities and anything below one are rejected. Values beyond
    /// `u32::MAX` saturate; callers bound them by the remaining capacity.
    pub fn from_requested(requested: f64) -> Result<Self> {
        if !requested.is_finite() || requested < 1.0 {
            return Err(PoolError::InvalidQuantity);
        }
        Ok(Self(requested.floor() as u32))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<f64> for Quantity {
    type Error = PoolError;

    fn try_from(value: f64) -> Result<Self> {
        Self::from_requested(value)
    }
}

/// Who is joining a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub company: Option<String>,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            company: None,
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        let company = company.into();
        self.company = if company.trim().is_empty() {
            None
        } else {
            Some(company)
        };
        self
    }
}

/// One commitment appended to a pool. Never modified once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub company: String,
    pub quantity: u32,
    pub joined_date: NaiveDate,
}

/// Derived state of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolStatus {
    #[serde(rename = "active")]
    Open,
    #[serde(rename = "closed")]
    Closed,
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolStatus::Open => f.write_str("active"),
            PoolStatus::Closed => f.write_str("closed"),
        }
    }
}

/// A group-buy pool collecting unit commitments towards a target quantity.
///
/// The status is never stored: it is always derived from the participant
/// list, so it cannot drift from the quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    pub title: String,
    #[serde(default)]
    pub organizer: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub supplier_location: String,
    #[serde(default)]
    pub organizer_location: String,
    pub target_quantity: u32,
    pub price_per_unit: Price,
    #[serde(default)]
    pub participants: Vec<Participant>,
    /// Bumped on every append; stores use it for compare-and-swap.
    #[serde(default)]
    pub version: u64,
}

impl Pool {
    pub fn new(
        id: impl Into<PoolId>,
        title: impl Into<String>,
        target_quantity: u32,
        price_per_unit: Price,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            organizer: String::new(),
            manufacturer: String::new(),
            description: String::new(),
            supplier_location: String::new(),
            organizer_location: String::new(),
            target_quantity,
            price_per_unit,
            participants: Vec::new(),
            version: 0,
        }
    }

    /// Units already committed by participants.
    pub fn committed(&self) -> u32 {
        self.committed_wide().min(u64::from(u32::MAX)) as u32
    }

    fn committed_wide(&self) -> u64 {
        self.participants.iter().map(|p| u64::from(p.quantity)).sum()
    }

    /// Checks a pool built outside the join path, e.g. from seed data.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(PoolError::ValidationError(msg));

        if self.id.as_str().trim().is_empty() {
            return invalid("pool id must not be empty".to_string());
        }
        if self.price_per_unit.value() < Decimal::ZERO {
            return invalid(format!("pool {}: price must not be negative", self.id));
        }
        if self.participants.iter().any(|p| p.quantity == 0) {
            return invalid(format!("pool {}: participant quantity must be positive", self.id));
        }
        if self.committed_wide() > u64::from(self.target_quantity) {
            return invalid(format!(
                "pool {}: committed quantity exceeds target {}",
                self.id, self.target_quantity
            ));
        }
        Ok(())
    }

    /// Units still available before the pool closes.
    pub fn remaining(&self) -> u32 {
        self.target_quantity.saturating_sub(self.committed())
    }

    pub fn status(&self) -> PoolStatus {
        if self.committed() < self.target_quantity {
            PoolStatus::Open
        } else {
            PoolStatus::Closed
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status() == PoolStatus::Closed
    }

    /// Whole-number completion percentage, capped at 100.
    pub fn progress_percent(&self) -> u32 {
        if self.target_quantity == 0 {
            return 100;
        }
        let pct = u64::from(self.committed()) * 100 / u64::from(self.target_quantity);
        pct.min(100) as u32
    }

    /// Value of all committed units at the pool price.
    pub fn committed_value(&self) -> Decimal {
        self.price_per_unit.times(self.committed())
    }

    /// Checks whether `requested` units may be added right now.
    ///
    /// The closed check runs first so a full pool reports `PoolClosed`
    /// whatever quantity was asked for.
    pub fn check_join(&self, requested: f64) -> Result<Quantity> {
        let committed = self.committed();
        if committed >= self.target_quantity {
            return Err(PoolError::PoolClosed {
                pool: self.id.clone(),
            });
        }

        if !requested.is_finite() || requested < 1.0 {
            return Err(PoolError::InvalidQuantity);
        }

        let remaining = self.target_quantity - committed;
        if requested > f64::from(remaining) {
            return Err(PoolError::CapacityExceeded {
                remaining,
                requested,
            });
        }

        Quantity::from_requested(requested)
    }

    /// Validates and records a join, returning the appended participant.
    ///
    /// Repeating the same join appends another record; the ledger does not
    /// deduplicate.
    pub fn join(
        &mut self,
        member: &Member,
        requested: f64,
        joined_date: NaiveDate,
    ) -> Result<Participant> {
        let quantity = self.check_join(requested)?;
        let participant = Participant {
            name: member.name.clone(),
            company: member
                .company
                .clone()
                .unwrap_or_else(|| DEFAULT_COMPANY.to_string()),
            quantity: quantity.value(),
            joined_date,
        };
        self.append(participant.clone());
        Ok(participant)
    }

    /// Appends an already validated participant and bumps the version.
    pub(crate) fn append(&mut self, participant: Participant) {
        self.participants.push(participant);
        self.version += 1;
    }
}
