//! # kirana-db: Database Layer for Kirana Ledger
//!
//! This crate provides database access for the Kirana Ledger system.
//! It uses SQLite for durable storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Kirana Ledger Data Flow                            │
//! │                                                                         │
//! │  Boundary collaborator (HTTP handler, owner id attached)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kirana-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │  item  stock  │    │  (embedded)  │   │   │
//! │  │   │               │    │  bill  seq    │    │              │   │   │
//! │  │   │ SqlitePool    │◄───│               │    │ 001_init.sql │   │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘   │   │
//! │  │                                │                               │   │
//! │  │                    ┌───────────▼───────────┐                   │   │
//! │  │                    │ BillingService        │                   │   │
//! │  │                    │ (one tx per commit)   │                   │   │
//! │  │                    └───────────────────────┘                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (single source of truth, no cache layer)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repositories (item, stock ledger, bill, invoice sequence)
//! - [`billing`] - The bill transaction manager
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kirana_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/kirana.db")).await?;
//!
//! let inventory = db.items().list_with_stock(owner_id).await?;
//! let committed = db.billing().commit(owner_id, draft).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use billing::{BillingError, BillingService, DeletePolicy};
pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::bill::BillRepository;
pub use repository::item::ItemRepository;
pub use repository::stock::StockLedger;
