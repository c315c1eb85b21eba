//! HTTP API for the watched list.

mod activity;
mod games;
mod handlers;
mod middleware;
mod routes;
mod watched;

pub use routes::create_router;
