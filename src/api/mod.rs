// API module for the vitrina HTTP server
// Serves the public catalog reads and the shared-secret catalog sync endpoint

pub mod auth;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::ApiServer;
