//! Bookstore Server - HTTP REST API over a book collection
//!
//! This crate exposes CRUD operations on a single `Book` resource backed by a
//! document store (MongoDB in production, an in-memory store for tests).
//!
//! # API Endpoints
//!
//! - `GET /books` - List all books
//! - `POST /books` - Create a book (201, `Location` header)
//! - `GET /books/{isbn}` - Fetch a book
//! - `PUT /books/{isbn}` - Update a book's fields
//! - `DELETE /books/{isbn}` - Delete a book (204)
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe (pings the store)
//!
//! Errors are returned as `{"message": "..."}`; backend detail only goes to
//! the server log.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bookstore::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     bookstore::start_server(config).await?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod middleware;
pub mod model;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use model::{Book, BookDocument};
pub use server::{build_router, start_server};
pub use state::ServerState;
pub use store::{BookFilter, BookStore, StoreConfig, StoreError};
