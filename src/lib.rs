//! # cachesession
//!
//! Cache-backed session storage for Rust web applications, with sliding
//! expiration and an axum integration.
//!
//! ## Features
//!
//! - **Pluggable cache**: any [`Cache`] implementation; an in-process
//!   [`MemoryCache`] is built in and Redis is available behind a feature
//! - **Sliding expiration**: sessions read while close to expiry get their
//!   full lifetime back, without rewriting every session on every request
//! - **Typed session data**: serde-based get/set with optional per-key expiry
//! - **Session ID Generation**: UUID v4, UUID v7, Random, and Random SHA256 options
//!
//! ### Feature Flags
//!
//! ```toml
//! [dependencies.cachesession]
//! version = "0.1.0"
//! features = [
//!     "redis", # Redis cache backend
//!     "tower", # Axum framework integration (default)
//! ]
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use axum::routing::get;
//! use axum::Router;
//! use cachesession::framework::axum::SessionLayer;
//! use cachesession::{CacheSessionHandler, MemoryCache, Session, SessionConfig};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = SessionConfig::default()
//!         .max_lifetime(time::Duration::days(30))
//!         .secure(false);
//!     let store = CacheSessionHandler::new(MemoryCache::new(), config.clone());
//!
//!     let app = Router::new()
//!         .route("/", get(index))
//!         .layer(SessionLayer::new(config, store));
//!
//!     let listener = TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//!
//! async fn index(session: Session) -> String {
//!     let count = session.get::<i32>("count").unwrap_or(0) + 1;
//!     session.set("count", count).unwrap();
//!     format!("Current count: {count}")
//! }
//! ```
//!
//! ## Storage layout
//!
//! Each session is one cache entry under `"session/" + id` holding the JSON
//! encoding of the session variables. Entries are written with the
//! configured lifetime (30 days by default). A read that finds less than
//! the refresh threshold (7 days by default) left rewrites the entry with the
//! full lifetime.

pub mod error;
#[cfg(feature = "tower")]
pub mod framework;
pub mod handler;
pub mod inner;
pub mod storage;

pub use error::{Error, Result};
pub use handler::{CacheSessionHandler, SessionStore};
pub use inner::*;
pub use storage::Cache;
pub use storage::memory::MemoryCache;
#[cfg(feature = "redis")]
pub use storage::redis::RedisCache;
