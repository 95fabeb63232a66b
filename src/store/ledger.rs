//! Durable order ledger writing one JSON document per line.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};
use tracing::info;

use super::OrderLedger;
use crate::cart::models::Order;
use crate::error::StoreError;

pub struct JsonlOrderLedger {
    path: PathBuf,
    // Serialises appends so lines from concurrent checkouts never interleave.
    write_lock: Mutex<()>,
}

impl JsonlOrderLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("Order ledger at {:?}", path);
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl OrderLedger for JsonlOrderLedger {
    async fn append(&self, order: &Order) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(order)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::models::{CartLine, OrderStatus};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn order(id: &str) -> Order {
        Order {
            order_id: id.to_string(),
            user_id: "carol".to_string(),
            items: vec![CartLine {
                id: "item-1".to_string(),
                product_id: "2".to_string(),
                quantity: 2,
                price: dec!(29.99),
            }],
            total: dec!(59.98),
            status: OrderStatus::Completed,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn appends_one_line_per_order() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = JsonlOrderLedger::new(dir.path().join("orders.jsonl"));

        ledger.append(&order("order-1")).await.unwrap();
        ledger.append(&order("order-2")).await.unwrap();

        let contents = tokio::fs::read_to_string(ledger.path()).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["orderId"], "order-1");
        assert_eq!(first["status"], "completed");
        assert_eq!(first["total"], 59.98);
    }

    #[tokio::test]
    async fn unwritable_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = JsonlOrderLedger::new(dir.path().join("missing").join("orders.jsonl"));

        let err = ledger.append(&order("order-1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
