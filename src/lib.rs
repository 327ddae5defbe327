pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod payment;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
pub mod ws;
