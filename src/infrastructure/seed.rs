use crate::domain::pool::{Participant, Pool, Price};
use crate::domain::ports::PoolStore;
use crate::error::Result;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::io::Read;

/// Reads a JSON array of pools, rejecting any pool that breaks the pool
/// invariants.
pub fn load_pools<R: Read>(source: R) -> Result<Vec<Pool>> {
    let pools: Vec<Pool> = serde_json::from_reader(source)?;
    for pool in &pools {
        pool.validate()?;
    }
    Ok(pools)
}

/// Inserts every pool the store does not already hold. Returns how many
/// were inserted.
pub async fn seed_store(store: &dyn PoolStore, pools: Vec<Pool>) -> Result<usize> {
    let mut inserted = 0;
    for pool in pools {
        if store.insert_if_absent(pool).await? {
            inserted += 1;
        }
    }
    Ok(inserted)
}

fn participant(name: &str, company: &str, quantity: u32, date: (i32, u32, u32)) -> Participant {
    Participant {
        name: name.to_string(),
        company: company.to_string(),
        quantity,
        joined_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap_or_default(),
    }
}

/// The demo pools used when no seed file is supplied.
pub fn default_pools() -> Vec<Pool> {
    let mut chairs = Pool::new(
        "pool-001",
        "Office Chairs Bulk Order",
        100,
        Price(dec!(85.00)),
    );
    chairs.organizer = "TechHub Ltd".to_string();
    chairs.manufacturer = "ErgoSeat Manufacturing".to_string();
    chairs.description = "Ergonomic mesh office chairs with lumbar support".to_string();
    chairs.supplier_location = "Guangzhou, China".to_string();
    chairs.organizer_location = "Nairobi, Kenya".to_string();
    chairs.participants = vec![
        participant("Grace Wanjiru", "TechHub Ltd", 40, (2026, 9, 2)),
        participant("Peter Otieno", "Savannah Offices", 35, (2026, 9, 10)),
        participant("Amina Hassan", "Coastline Co-working", 20, (2026, 9, 21)),
    ];

    let mut laptops = Pool::new("pool-002", "Laptop Bulk Purchase", 50, Price(dec!(640.00)));
    laptops.organizer = "SoundMax".to_string();
    laptops.manufacturer = "Lenovo".to_string();
    laptops.description = "14-inch business laptops, 16GB RAM, 512GB SSD".to_string();
    laptops.supplier_location = "Dubai, UAE".to_string();
    laptops.organizer_location = "Dar es Salaam, Tanzania".to_string();
    laptops.participants = vec![participant("Joseph Mrema", "SoundMax", 12, (2026, 8, 30))];

    let mut solar = Pool::new("pool-003", "Solar Panel Group Buy", 200, Price(dec!(129.99)));
    solar.organizer = "GreenGrid Cooperative".to_string();
    solar.manufacturer = "SunPeak Energy".to_string();
    solar.description = "400W monocrystalline panels for rooftop installations".to_string();
    solar.supplier_location = "Ningbo, China".to_string();
    solar.organizer_location = "Kampala, Uganda".to_string();
    solar.participants = vec![
        participant("Ruth Nakato", "GreenGrid Cooperative", 120, (2026, 7, 14)),
        participant("Daniel Okello", "Individual", 80, (2026, 8, 3)),
    ];

    vec![chairs, laptops, solar]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::PoolStatus;
    use crate::error::PoolError;
    use crate::infrastructure::in_memory::InMemoryPoolStore;

    #[test]
    fn test_default_pools_hold_invariant() {
        for pool in default_pools() {
            assert!(pool.committed() <= pool.target_quantity, "{}", pool.id);
        }
        let pools = default_pools();
        assert_eq!(pools[0].remaining(), 5);
        assert_eq!(pools[2].status(), PoolStatus::Closed);
    }

    #[test]
    fn test_load_pools_from_json() {
        let json = r#"[
            {"id": "p1", "title": "Desks", "target_quantity": 20, "price_per_unit": "45.5",
             "participants": [{"name": "Asha", "company": "Individual", "quantity": 4, "joined_date": "2026-05-01"}]}
        ]"#;
        let pools = load_pools(json.as_bytes()).unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].committed(), 4);
    }

    #[test]
    fn test_load_pools_rejects_invalid_pools() {
        let cases = [
            r#"[{"id": "", "title": "Desks", "target_quantity": 10, "price_per_unit": "5"}]"#,
            r#"[{"id": "p1", "title": "Desks", "target_quantity": 10, "price_per_unit": "-5"}]"#,
            r#"[{"id": "p1", "title": "Desks", "target_quantity": 10, "price_per_unit": "5",
                 "participants": [{"name": "A", "company": "B", "quantity": 15, "joined_date": "2026-05-01"}]}]"#,
            r#"[{"id": "p1", "title": "Desks", "target_quantity": 10, "price_per_unit": "5",
                 "participants": [{"name": "A", "company": "B", "quantity": 0, "joined_date": "2026-05-01"}]}]"#,
            r#"[{"id": "p1", "title": "Desks", "target_quantity": 10, "price_per_unit": "5",
                 "participants": [
                    {"name": "A", "company": "B", "quantity": 4000000000, "joined_date": "2026-05-01"},
                    {"name": "C", "company": "D", "quantity": 4000000000, "joined_date": "2026-05-01"}]}]"#,
        ];
        for json in cases {
            assert!(
                matches!(load_pools(json.as_bytes()), Err(PoolError::ValidationError(_))),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn test_load_pools_malformed() {
        assert!(load_pools("[{\"id\": 1}]".as_bytes()).is_err());
    }

    #[tokio::test]
    async fn test_seed_store_skips_existing() {
        let store = InMemoryPoolStore::new();
        assert_eq!(seed_store(&store, default_pools()).await.unwrap(), 3);
        assert_eq!(seed_store(&store, default_pools()).await.unwrap(), 0);
        assert_eq!(store.all().await.unwrap().len(), 3);
    }
}
