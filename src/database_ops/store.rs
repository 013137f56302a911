//! The product store seam: one store value represents one transaction against
//! the `products` table. The synchronizer is written against [`ProductStore`];
//! production code uses the Postgres-backed implementation, tests use an
//! in-memory double.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{Postgres, Transaction};

use crate::normalization::item::{self, CoercionError};

/// Persisted catalog entry. `sku` is the natural key: the store never holds
/// two records with the same SKU, and a SKU is immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductRecord {
    pub sku: String,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub description: String,
    pub image_url: String,
}

impl ProductRecord {
    /// Resolve one raw sync item into a record.
    ///
    /// `Ok(None)` means the item carries no usable SKU and is skipped without
    /// counting as an error. A malformed numeric field is a [`CoercionError`],
    /// which fails the whole batch.
    pub fn from_raw(raw: &Value) -> Result<Option<Self>, CoercionError> {
        let Some(sku) = item::resolve_sku(raw) else {
            return Ok(None);
        };
        Ok(Some(Self {
            sku,
            name: item::resolve_name(raw),
            price: item::resolve_price(raw)?,
            stock: item::resolve_stock(raw)?,
            description: item::resolve_text(raw, "description"),
            image_url: item::resolve_text(raw, "image"),
        }))
    }
}

#[async_trait]
pub trait ProductStore {
    async fn fetch_by_sku(&mut self, sku: &str) -> Result<Option<ProductRecord>>;
    async fn insert(&mut self, record: &ProductRecord) -> Result<()>;
    async fn update(&mut self, record: &ProductRecord) -> Result<()>;
    async fn commit(&mut self) -> Result<()>;
    async fn rollback(&mut self) -> Result<()>;
}

/// Postgres-backed store over a single sqlx transaction.
pub struct PgProductStore {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgProductStore {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx: Some(tx) }
    }

    fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>> {
        self.tx
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("transaction already closed"))
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    // Row-locked so concurrent upserts of the same SKU serialize instead of
    // silently losing an update.
    async fn fetch_by_sku(&mut self, sku: &str) -> Result<Option<ProductRecord>> {
        let tx = self.tx()?;
        let record = sqlx::query_as::<_, ProductRecord>(
            "SELECT sku, name, price, stock, description, image_url \
             FROM products WHERE sku = $1 FOR UPDATE",
        )
        .bind(sku)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(record)
    }

    async fn insert(&mut self, record: &ProductRecord) -> Result<()> {
        let tx = self.tx()?;
        sqlx::query(
            "INSERT INTO products (sku, name, price, stock, description, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&record.sku)
        .bind(&record.name)
        .bind(record.price)
        .bind(record.stock)
        .bind(&record.description)
        .bind(&record.image_url)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn update(&mut self, record: &ProductRecord) -> Result<()> {
        let tx = self.tx()?;
        sqlx::query(
            "UPDATE products SET name = $2, price = $3, stock = $4, \
             description = $5, image_url = $6 \
             WHERE sku = $1",
        )
        .bind(&record.sku)
        .bind(&record.name)
        .bind(record.price)
        .bind(record.stock)
        .bind(&record.description)
        .bind(&record.image_url)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| anyhow::anyhow!("transaction already closed"))?;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| anyhow::anyhow!("transaction already closed"))?;
        tx.rollback().await?;
        Ok(())
    }
}
