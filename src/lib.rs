//! Carros Portugal frontend
//!
//! Server-rendered frontend for the car comparison/recommendation service:
//! it renders the forms, calls the service and turns its answers into a
//! comparison table or a grid of scored cards.
//!
//! # Modules
//!
//! - `api_client`: Car service client.
//! - `app`: Route table.
//! - `circuit_breaker`: Circuit breaker around service calls.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `fallback`: Example data used when the service is down.
//! - `filters`: Recommendation filters and their local predicate.
//! - `format`: pt-PT number formatting and lenient parsing.
//! - `handlers`: HTTP request handlers.
//! - `models`: Car records and service payloads.
//! - `pages`: HTML rendering.
//! - `renderer`: Comparison table and recommendation card view models.
//! - `search`: Compare/recommend workflow shared by the handlers.
//! - `session`: Session cookie extractor.
//! - `view`: Per-session view state and request tokens.

pub mod api_client;
pub mod app;
pub mod circuit_breaker;
pub mod config;
pub mod errors;
pub mod fallback;
pub mod filters;
pub mod format;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod renderer;
pub mod search;
pub mod session;
pub mod view;
