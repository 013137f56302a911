//! Pool-level catalog reads backing the public product API.

use anyhow::Result;

use crate::database_ops::db::Db;
use crate::database_ops::store::ProductRecord;

pub async fn list_products(db: &Db) -> Result<Vec<ProductRecord>> {
    let rows = sqlx::query_as::<_, ProductRecord>(
        "SELECT sku, name, price, stock, description, image_url \
         FROM products ORDER BY sku",
    )
    .fetch_all(&db.pool)
    .await?;
    Ok(rows)
}

pub async fn fetch_product(db: &Db, sku: &str) -> Result<Option<ProductRecord>> {
    let row = sqlx::query_as::<_, ProductRecord>(
        "SELECT sku, name, price, stock, description, image_url \
         FROM products WHERE sku = $1",
    )
    .bind(sku)
    .fetch_optional(&db.pool)
    .await?;
    Ok(row)
}
