use crate::domain::payment::{ControlNumber, DEFAULT_PAYMENT_QUANTITY, PaymentDetails, PaymentOutcome};
use crate::domain::pool::{Member, Participant, Pool, PoolId};
use crate::domain::ports::{ClockBox, PoolStoreBox};
use crate::domain::search::filter_pools;
use crate::error::{PoolError, Result};
use tracing::{debug, info, warn};

/// How many times a join is re-validated after losing a version race.
pub const MAX_JOIN_ATTEMPTS: usize = 8;

/// A payment submitted from the checkout form.
#[derive(Debug, Clone)]
pub struct PaymentSubmission {
    pub pool: PoolId,
    pub member: Member,
    /// Requested units; `None` means one.
    pub quantity: Option<f64>,
    pub details: PaymentDetails,
}

/// Entry point for pool operations.
///
/// `PoolEngine` owns the pool store and the clock. Joins are validated
/// against a snapshot of the pool and committed with a version
/// compare-and-swap, so concurrent joins through a shared engine can never
/// push a pool past its target.
pub struct PoolEngine {
    store: PoolStoreBox,
    clock: ClockBox,
}

impl PoolEngine {
    /// Creates a new `PoolEngine`.
    ///
    /// # Arguments
    ///
    /// * `store` - The store holding pools and their participants.
    /// * `clock` - Source of join dates and control number timestamps.
    pub fn new(store: PoolStoreBox, clock: ClockBox) -> Self {
        Self { store, clock }
    }

    pub async fn pool(&self, id: &PoolId) -> Result<Pool> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| PoolError::PoolNotFound(id.clone()))
    }

    /// Joins `member` into a pool with `requested` units.
    ///
    /// Closed pools, invalid quantities and requests above the remaining
    /// capacity are rejected without touching the store.
    pub async fn join(&self, id: &PoolId, member: &Member, requested: f64) -> Result<Participant> {
        let (participant, _) = self.commit_join(id, member, requested).await?;
        Ok(participant)
    }

    /// Runs a join and returns the participant with the pool state that
    /// the append produced.
    async fn commit_join(
        &self,
        id: &PoolId,
        member: &Member,
        requested: f64,
    ) -> Result<(Participant, Pool)> {
        for attempt in 1..=MAX_JOIN_ATTEMPTS {
            let mut pool = self.pool(id).await?;
            let expected_version = pool.version;

            let participant = match pool.join(member, requested, self.clock.today()) {
                Ok(participant) => participant,
                Err(e) => {
                    warn!(pool = %id, member = %member.name, requested, error = %e, "join rejected");
                    return Err(e);
                }
            };

            match self
                .store
                .append(id, expected_version, participant.clone())
                .await
            {
                Ok(updated) => {
                    info!(
                        pool = %id,
                        member = %participant.name,
                        quantity = participant.quantity,
                        committed = updated.committed(),
                        target = updated.target_quantity,
                        status = %updated.status(),
                        "participant joined"
                    );
                    return Ok((participant, updated));
                }
                Err(PoolError::Conflict { .. }) => {
                    debug!(pool = %id, attempt, "version conflict, retrying join");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(pool = %id, member = %member.name, "join abandoned after repeated conflicts");
        Err(PoolError::Conflict { pool: id.clone() })
    }

    /// Generates a control number for an off-band payment into `id`.
    pub async fn generate_control_number(&self, id: &PoolId) -> Result<ControlNumber> {
        let pool = self.pool(id).await?;
        let number = ControlNumber::generate(&pool.id, self.clock.epoch_millis());
        debug!(pool = %id, control_number = %number, "control number generated");
        Ok(number)
    }

    /// Validates a payment and, for mobile money and card, joins the pool.
    ///
    /// Control-number payments never join: they only report that the
    /// reference awaits reconciliation.
    pub async fn submit_payment(&self, submission: PaymentSubmission) -> Result<PaymentOutcome> {
        let PaymentSubmission {
            pool,
            member,
            quantity,
            details,
        } = submission;

        if let Err(e) = details.validate() {
            warn!(pool = %pool, method = ?details.method(), error = %e, "payment rejected");
            return Err(e);
        }

        match details {
            PaymentDetails::Control { control_number } => {
                let target = self.pool(&pool).await?;
                let control_number = control_number
                    .filter(|number| number.belongs_to(&target.id))
                    .ok_or_else(|| {
                        warn!(pool = %pool, "control number not generated for this pool");
                        PoolError::ValidationError("no control number generated".to_string())
                    })?;
                info!(pool = %pool, control_number = %control_number, "payment pending confirmation");
                Ok(PaymentOutcome::PendingConfirmation { control_number })
            }
            PaymentDetails::MobileMoney { .. } | PaymentDetails::Card { .. } => {
                let requested = quantity.unwrap_or(DEFAULT_PAYMENT_QUANTITY);
                let (participant, updated) = self.commit_join(&pool, &member, requested).await?;
                Ok(PaymentOutcome::Joined {
                    participant,
                    status: updated.status(),
                })
            }
        }
    }

    /// Pools matching the free-text query and optional country token, in
    /// store order.
    pub async fn search(&self, query: &str, country: Option<&str>) -> Result<Vec<Pool>> {
        let pools = self.store.all().await?;
        Ok(filter_pools(&pools, query, country)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Consumes the engine and returns the final state of all pools.
    pub async fn into_results(self) -> Result<Vec<Pool>> {
        self.store.all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::{PoolStatus, Price};
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::in_memory::InMemoryPoolStore;
    use crate::infrastructure::seed::default_pools;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    const NOW_MILLIS: i64 = 1_792_108_800_123;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn engine_with(pools: Vec<Pool>) -> PoolEngine {
        PoolEngine::new(
            Box::new(InMemoryPoolStore::with_pools(pools)),
            Box::new(FixedClock::new(today(), NOW_MILLIS)),
        )
    }

    fn card_submission(pool: &str, holder: &str, number: &str) -> PaymentSubmission {
        PaymentSubmission {
            pool: PoolId::new(pool),
            member: Member::new(holder),
            quantity: None,
            details: PaymentDetails::Card {
                holder: holder.to_string(),
                number: number.to_string(),
                expiry: if number.is_empty() { String::new() } else { "12/29".to_string() },
                cvv: if number.is_empty() { String::new() } else { "123".to_string() },
            },
        }
    }

    #[tokio::test]
    async fn test_join_uses_clock_date() {
        let engine = engine_with(default_pools());
        let id = PoolId::new("pool-002");
        let participant = engine
            .join(&id, &Member::new("Neema").with_company("Upendo Traders"), 3.0)
            .await
            .unwrap();
        assert_eq!(participant.joined_date, today());
        assert_eq!(engine.pool(&id).await.unwrap().committed(), 15);
    }

    #[tokio::test]
    async fn test_join_boundary_sequence() {
        let engine = engine_with(default_pools());
        let id = PoolId::new("pool-001");
        let member = Member::new("Neema");

        let err = engine.join(&id, &member, 10.0).await.unwrap_err();
        assert!(matches!(err, PoolError::CapacityExceeded { remaining: 5, .. }));

        engine.join(&id, &member, 5.0).await.unwrap();
        let pool = engine.pool(&id).await.unwrap();
        assert_eq!(pool.committed(), 100);
        assert_eq!(pool.status(), PoolStatus::Closed);

        assert!(matches!(
            engine.join(&id, &member, 1.0).await,
            Err(PoolError::PoolClosed { .. })
        ));
    }

    #[tokio::test]
    async fn test_join_unknown_pool() {
        let engine = engine_with(vec![]);
        assert!(matches!(
            engine.join(&PoolId::new("nope"), &Member::new("x"), 1.0).await,
            Err(PoolError::PoolNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_mobile_money_payment_joins_one_unit() {
        let engine = engine_with(default_pools());
        let outcome = engine
            .submit_payment(PaymentSubmission {
                pool: PoolId::new("pool-002"),
                member: Member::new("Neema"),
                quantity: None,
                details: PaymentDetails::MobileMoney {
                    phone: "0754123456".to_string(),
                },
            })
            .await
            .unwrap();

        match outcome {
            PaymentOutcome::Joined {
                participant,
                status,
            } => {
                assert_eq!(participant.quantity, 1);
                assert_eq!(status, PoolStatus::Open);
            }
            other => panic!("expected join, got {other:?}"),
        }
        let pool = engine.pool(&PoolId::new("pool-002")).await.unwrap();
        assert_eq!(pool.participants.len(), 2);
    }

    #[tokio::test]
    async fn test_incomplete_card_does_not_join() {
        let engine = engine_with(default_pools());
        let err = engine
            .submit_payment(card_submission("pool-002", "Neema", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, PoolError::ValidationError(msg) if msg == "incomplete card details"));

        let pool = engine.pool(&PoolId::new("pool-002")).await.unwrap();
        assert_eq!(pool.participants.len(), 1);
    }

    #[tokio::test]
    async fn test_card_payment_into_closed_pool() {
        let engine = engine_with(default_pools());
        assert!(matches!(
            engine
                .submit_payment(card_submission("pool-003", "Neema", "4111111111111111"))
                .await,
            Err(PoolError::PoolClosed { .. })
        ));
    }

    #[tokio::test]
    async fn test_control_payment_is_deferred() {
        let engine = engine_with(default_pools());
        let id = PoolId::new("pool-002");

        let number = engine.generate_control_number(&id).await.unwrap();
        assert_eq!(number.as_str(), "POOL-002-800123");

        let outcome = engine
            .submit_payment(PaymentSubmission {
                pool: id.clone(),
                member: Member::new("Neema"),
                quantity: Some(5.0),
                details: PaymentDetails::Control {
                    control_number: Some(number.clone()),
                },
            })
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PaymentOutcome::PendingConfirmation {
                control_number: number
            }
        );
        let pool = engine.pool(&id).await.unwrap();
        assert_eq!(pool.participants.len(), 1);
        assert_eq!(pool.version, 0);
    }

    #[tokio::test]
    async fn test_control_payment_without_number() {
        let engine = engine_with(default_pools());
        let err = engine
            .submit_payment(PaymentSubmission {
                pool: PoolId::new("pool-002"),
                member: Member::new("Neema"),
                quantity: None,
                details: PaymentDetails::Control {
                    control_number: None,
                },
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PoolError::ValidationError(msg) if msg == "no control number generated"));
    }

    #[tokio::test]
    async fn test_control_payment_requires_known_pool() {
        let engine = engine_with(default_pools());
        let err = engine
            .submit_payment(PaymentSubmission {
                pool: PoolId::new("nope"),
                member: Member::new("Neema"),
                quantity: None,
                details: PaymentDetails::Control {
                    control_number: Some("NOPE-123456".into()),
                },
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PoolError::PoolNotFound(_)));
    }

    #[tokio::test]
    async fn test_control_payment_rejects_foreign_number() {
        let engine = engine_with(default_pools());
        let other = engine
            .generate_control_number(&PoolId::new("pool-001"))
            .await
            .unwrap();

        for number in [other, ControlNumber::from("X-1")] {
            let err = engine
                .submit_payment(PaymentSubmission {
                    pool: PoolId::new("pool-002"),
                    member: Member::new("Neema"),
                    quantity: None,
                    details: PaymentDetails::Control {
                        control_number: Some(number),
                    },
                })
                .await
                .unwrap_err();
            assert!(
                matches!(err, PoolError::ValidationError(msg) if msg == "no control number generated")
            );
        }
    }

    #[tokio::test]
    async fn test_joined_status_reflects_own_append() {
        let engine = engine_with(default_pools());
        let outcome = engine
            .submit_payment(PaymentSubmission {
                pool: PoolId::new("pool-001"),
                member: Member::new("Neema"),
                quantity: Some(5.0),
                details: PaymentDetails::MobileMoney {
                    phone: "0754123456".to_string(),
                },
            })
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            PaymentOutcome::Joined {
                status: PoolStatus::Closed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_generate_control_number_unknown_pool() {
        let engine = engine_with(vec![]);
        assert!(matches!(
            engine.generate_control_number(&PoolId::new("x")).await,
            Err(PoolError::PoolNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_search_through_engine() {
        let engine = engine_with(default_pools());
        let found = engine.search("laptop", None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, PoolId::new("pool-002"));

        assert_eq!(engine.search("", None).await.unwrap().len(), 3);
        assert_eq!(engine.search("", Some("uganda")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_into_results_returns_all_pools() {
        let engine = engine_with(vec![Pool::new("a", "A", 1, Price(dec!(1)))]);
        engine.join(&PoolId::new("a"), &Member::new("x"), 1.0).await.unwrap();
        let results = engine.into_results().await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_closed());
    }
}
