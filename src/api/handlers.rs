// HTTP request handlers for API endpoints

use actix_web::{web, HttpResponse, Result};
use serde_json::Value;
use std::time::SystemTime;

use crate::api::models::{ApiResponse, HealthResponse};
use crate::database_ops::db::Db;
use crate::database_ops::products;
use crate::database_ops::store::PgProductStore;
use crate::database_ops::sync::synchronize;

/// Health check endpoint
pub async fn health_check(db: web::Data<Db>) -> Result<HttpResponse> {
    // Quick database connectivity check
    let db_status = match sqlx::query_scalar::<_, bool>("SELECT true")
        .fetch_one(&db.pool)
        .await
    {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    let uptime = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let response = ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        database: db_status.to_string(),
        uptime_seconds: uptime,
    });

    Ok(HttpResponse::Ok().json(response))
}

/// Reconcile a pushed batch of raw product items against the catalog.
///
/// The envelope is validated before a transaction is opened, so malformed
/// requests never touch the store. A failed batch is rolled back and surfaced
/// as 500 with the cause text; success returns the flat `{created, updated}`
/// counters.
pub async fn sync_catalog(body: web::Bytes, db: web::Data<Db>) -> Result<HttpResponse> {
    let items = match parse_sync_envelope(&body) {
        Ok(items) => items,
        Err(reason) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::<Value>::error(reason)));
        }
    };

    tracing::info!(items = items.len(), "catalog sync requested");

    let tx = match db.pool.begin().await {
        Ok(tx) => tx,
        Err(e) => {
            tracing::error!(error = %e, "failed to open sync transaction");
            return Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<Value>::error(format!("store failure: {e}"))));
        }
    };
    let mut store = PgProductStore::new(tx);

    match synchronize(&items, &mut store).await {
        Ok(outcome) => {
            tracing::info!(
                created = outcome.created,
                updated = outcome.updated,
                "catalog sync committed"
            );
            Ok(HttpResponse::Ok().json(outcome))
        }
        Err(err) => {
            tracing::error!(error = %err, "catalog sync failed; batch rolled back");
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<Value>::error(err.to_string())))
        }
    }
}

/// Full catalog as JSON (the storefront's public data surface)
pub async fn list_products(db: web::Data<Db>) -> Result<HttpResponse> {
    match products::list_products(&db).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(items))),
        Err(e) => {
            tracing::error!(error = %e, "failed to list products");
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<Value>::error("failed to list products")))
        }
    }
}

/// Single product by SKU
pub async fn get_product(path: web::Path<String>, db: web::Data<Db>) -> Result<HttpResponse> {
    let sku = path.into_inner();
    match products::fetch_product(&db, &sku).await {
        Ok(Some(product)) => Ok(HttpResponse::Ok().json(ApiResponse::success(product))),
        Ok(None) => {
            Ok(HttpResponse::NotFound().json(ApiResponse::<Value>::error("product not found")))
        }
        Err(e) => {
            tracing::error!(error = %e, sku = %sku, "failed to fetch product");
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<Value>::error("failed to fetch product")))
        }
    }
}

/// Validate the sync request envelope: a JSON object carrying an `items` array.
fn parse_sync_envelope(body: &[u8]) -> std::result::Result<Vec<Value>, &'static str> {
    let parsed: Value =
        serde_json::from_slice(body).map_err(|_| "request body must be valid JSON")?;
    let Value::Object(mut map) = parsed else {
        return Err("request body must be a JSON object");
    };
    match map.remove("items") {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err("'items' must be an array"),
        None => Err("request body is missing 'items'"),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_sync_envelope;
    use serde_json::json;

    #[test]
    fn accepts_an_items_array() {
        let body = serde_json::to_vec(&json!({"items": [{"sku": "A1"}, {"sku": "A2"}]})).unwrap();
        let items = parse_sync_envelope(&body).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn empty_items_is_a_valid_envelope() {
        let body = serde_json::to_vec(&json!({"items": []})).unwrap();
        assert!(parse_sync_envelope(&body).unwrap().is_empty());
    }

    #[test]
    fn rejects_missing_body_and_missing_items() {
        assert!(parse_sync_envelope(b"").is_err());
        assert!(parse_sync_envelope(b"not json").is_err());

        let body = serde_json::to_vec(&json!({"products": []})).unwrap();
        assert_eq!(
            parse_sync_envelope(&body).unwrap_err(),
            "request body is missing 'items'"
        );
    }

    #[test]
    fn rejects_non_object_and_non_array_shapes() {
        let body = serde_json::to_vec(&json!([1, 2, 3])).unwrap();
        assert_eq!(
            parse_sync_envelope(&body).unwrap_err(),
            "request body must be a JSON object"
        );

        let body = serde_json::to_vec(&json!({"items": "A1"})).unwrap();
        assert_eq!(parse_sync_envelope(&body).unwrap_err(), "'items' must be an array");
    }
}
