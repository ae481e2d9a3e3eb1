//! Wire types shared across pipeline stages.

use serde::{Deserialize, Serialize};

/// The raw payload a generated transaction carries, stored JSON-serialized
/// in the record's `raw_data` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSale {
    pub customer_id: String,
    pub products: Vec<String>,
    pub total_amount: f64,
    pub timestamp: String,
}

/// The cleansed projection: exactly these four fields, nothing else.
/// Fields absent in the source payload stay `None` and serialize as
/// explicit nulls; there is no defaulting and no validation here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleansedRecord {
    pub customer_id: Option<String>,
    pub products: Option<Vec<String>>,
    pub total_amount: Option<f64>,
    pub ingested_at: Option<String>,
}

/// Per-customer summary written to the golden store. Reflects only the
/// records present in the triggering batch; each aggregation overwrites
/// the customer's previous summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldenSummary {
    pub customer_id: String,
    pub total_transactions: u64,
    pub total_spent: f64,
    pub products_bought: Vec<String>,
    pub timestamps: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleansed_record_serializes_absent_fields_as_null() {
        let record = CleansedRecord {
            customer_id: Some("c1".to_string()),
            products: None,
            total_amount: None,
            ingested_at: None,
        };

        let serialized_json = serde_json::to_string(&record).unwrap();

        assert_eq!(
            serialized_json,
            r#"{"customer_id":"c1","products":null,"total_amount":null,"ingested_at":null}"#
        );
    }

    #[test]
    fn cleansed_record_tolerates_missing_fields_on_decode() {
        let record: CleansedRecord = serde_json::from_str(r#"{"total_amount":9.5}"#).unwrap();
        assert_eq!(record.customer_id, None);
        assert_eq!(record.total_amount, Some(9.5));
    }
}
