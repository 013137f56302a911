// API route configuration

use actix_web::web;

use crate::api::{auth, handlers};

pub fn configure_routes(cfg: &mut web::ServiceConfig, api_secret: &str) {
    cfg
        // Health check (no auth required)
        .route("/health", web::get().to(handlers::health_check))
        .route("/", web::get().to(handlers::health_check))
        .service(
            web::scope("/api/v1")
                // Public catalog reads (storefront data)
                .route("/products", web::get().to(handlers::list_products))
                .route("/products/{sku}", web::get().to(handlers::get_product))
                // Sync push from the spreadsheet automation (shared secret required)
                .service(
                    web::scope("/catalog")
                        .wrap(auth::Auth::new(api_secret.to_string()))
                        .route("/sync", web::post().to(handlers::sync_catalog)),
                ),
        );
}
