//! # kirana-core: Pure Business Logic for Kirana Ledger
//!
//! This crate is the **heart** of Kirana Ledger. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Kirana Ledger Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              External collaborators (out of scope)              │   │
//! │  │    HTTP routing ── auth/session ── templates ── media storage   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ typed requests, owner id attached      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kirana-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│   │   │
//! │  │   │   Item    │  │   Money   │  │ GST math  │  │   rules   │   │   │
//! │  │   │   Bill    │  │  GstRate  │  │ avg cost  │  │  checks   │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   kirana-db (Database Layer)                    │   │
//! │  │       SQLite: stock ledger, bills, invoice sequence, billing    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, StockBatch, Bill, BillLine, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - GST pricing engine shared by every call site
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paisa (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use kirana_core::money::Money;
//! use kirana_core::pricing::{price_line, PriceSnapshot};
//! use kirana_core::types::GstRate;
//!
//! // MRP ₹100.00, GST 18%, average purchase cost ₹60.00
//! let snapshot = PriceSnapshot {
//!     mrp: Money::from_paisa(10_000),
//!     gst_rate: GstRate::from_bps(1800),
//!     unit_cost: Money::from_paisa(6_000),
//! };
//!
//! // Two units at 10% discount
//! let line = price_line(&snapshot, 2, 1000);
//!
//! // base 200.00, discount 20.00, taxable 180.00, gst 32.40, total 212.40
//! assert_eq!(line.total.paisa(), 21_240);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use kirana_core::Money` instead of
// `use kirana_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed on a single bill
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable invoice sizes.
/// Can be made configurable per-owner in future versions.
pub const MAX_BILL_LINES: usize = 100;

/// Maximum quantity of a single item on a bill line
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Zero-padded width of the sequential part of an invoice number.
///
/// `INV-2026-0042` — the counter keeps growing past 9999, the padding
/// just stops mattering at that point.
pub const INVOICE_SEQ_WIDTH: usize = 4;
