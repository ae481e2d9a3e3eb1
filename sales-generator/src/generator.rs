use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::instrument;
use uuid::Uuid;

use sales_common::records::RawSale;
use sales_common::store::RecordStore;
use sales_common::time::TimeSource;

use crate::error::GenerateError;

struct CatalogItem {
    name: &'static str,
    price: f64,
}

const PRODUCT_CATALOG: [CatalogItem; 6] = [
    CatalogItem {
        name: "Laptop",
        price: 999.99,
    },
    CatalogItem {
        name: "Monitor",
        price: 249.99,
    },
    CatalogItem {
        name: "Keyboard",
        price: 79.99,
    },
    CatalogItem {
        name: "Mouse",
        price: 49.99,
    },
    CatalogItem {
        name: "Webcam",
        price: 89.99,
    },
    CatalogItem {
        name: "Headphones",
        price: 199.99,
    },
];

/// One synthetic transaction ready to be written to the record store.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub sort_key: String,
    pub raw: RawSale,
}

impl Transaction {
    /// Flattened record fields: `raw_data` stays a JSON-encoded string so
    /// downstream stages see it exactly as the landing blob will carry it.
    pub fn fields(&self) -> Result<HashMap<String, String>, serde_json::Error> {
        Ok(HashMap::from([
            ("id".to_string(), self.id.to_string()),
            ("sort_key".to_string(), self.sort_key.clone()),
            ("raw_data".to_string(), serde_json::to_string(&self.raw)?),
        ]))
    }
}

/// Build one random transaction: 1-3 distinct products sampled without
/// replacement from the catalog, `total_amount` the exact sum of their
/// prices rounded to 2 decimal places.
pub fn random_transaction(rng: &mut impl Rng, now: DateTime<Utc>) -> Transaction {
    let product_count = rng.gen_range(1..=3);
    let chosen: Vec<&CatalogItem> = PRODUCT_CATALOG.choose_multiple(rng, product_count).collect();
    let total: f64 = chosen.iter().map(|item| item.price).sum();

    Transaction {
        id: Uuid::now_v7(),
        sort_key: now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        raw: RawSale {
            customer_id: Uuid::now_v7().to_string(),
            products: chosen.iter().map(|item| item.name.to_string()).collect(),
            total_amount: (total * 100.0).round() / 100.0,
            timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        },
    }
}

/// Write 3-5 synthetic transactions to the record store. Any store failure
/// is fatal for the invocation.
#[instrument(skip_all)]
pub async fn generate_batch(
    store: Arc<dyn RecordStore + Send + Sync>,
    timesource: &(dyn TimeSource + Send + Sync),
) -> Result<usize, GenerateError> {
    let transaction_count = rand::thread_rng().gen_range(3..=5);
    tracing::info!("generating {} sales transactions", transaction_count);

    for _ in 0..transaction_count {
        let transaction = random_transaction(&mut rand::thread_rng(), timesource.now());
        let fields = transaction.fields()?;

        store
            .put_item(&transaction.id.to_string(), &transaction.sort_key, fields)
            .await?;
        counter!("generator_transactions_written_total").increment(1);
        tracing::debug!(id = %transaction.id, "inserted sale");
    }

    Ok(transaction_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sales_common::memory::MemoryRecordStore;
    use sales_common::time::FixedTime;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn transaction_products_are_distinct_and_bounded() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let transaction = random_transaction(&mut rng, fixed_now());
            let products = &transaction.raw.products;

            assert!((1..=3).contains(&products.len()));
            let mut deduped = products.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(deduped.len(), products.len());
        }
    }

    #[test]
    fn total_amount_is_the_rounded_catalog_sum() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let transaction = random_transaction(&mut rng, fixed_now());
            let expected: f64 = transaction
                .raw
                .products
                .iter()
                .map(|name| {
                    PRODUCT_CATALOG
                        .iter()
                        .find(|item| item.name == name.as_str())
                        .expect("product not in catalog")
                        .price
                })
                .sum();

            let expected = (expected * 100.0).round() / 100.0;
            assert_eq!(transaction.raw.total_amount, expected);
        }
    }

    #[test]
    fn raw_data_field_is_strict_json() {
        let mut rng = StdRng::seed_from_u64(1);
        let transaction = random_transaction(&mut rng, fixed_now());

        let fields = transaction.fields().unwrap();
        let decoded: RawSale = serde_json::from_str(&fields["raw_data"]).unwrap();
        assert_eq!(decoded, transaction.raw);
        assert_eq!(fields["id"], transaction.id.to_string());
        assert_eq!(decoded.timestamp, "2024-05-01 12:30:00");
    }

    #[tokio::test]
    async fn generate_batch_writes_three_to_five_items() {
        let store = Arc::new(MemoryRecordStore::new());
        let timesource = FixedTime { time: fixed_now() };

        let written = generate_batch(store.clone(), &timesource).await.unwrap();

        assert!((3..=5).contains(&written));
        assert_eq!(store.item_count(), written);
        assert_eq!(store.take_change_events().len(), written);
    }
}
