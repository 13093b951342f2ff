//! # Repository Layer
//!
//! Data access repositories for Kirana Ledger entities.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Repository Organization                             │
//! │                                                                         │
//! │  ┌──────────────────┐  CRUD + lookup for the item master               │
//! │  │  ItemRepository  │  (inventory list, catalog list, SKU lookup)      │
//! │  └──────────────────┘                                                  │
//! │  ┌──────────────────┐  Append-only signed quantity ledger              │
//! │  │   StockLedger    │  (receipts, consumption, derived on-hand)        │
//! │  └──────────────────┘                                                  │
//! │  ┌──────────────────┐  Committed bills: headers, lines, reports        │
//! │  │  BillRepository  │                                                  │
//! │  └──────────────────┘                                                  │
//! │  ┌──────────────────┐  Gapless per-year invoice numbers                │
//! │  │     sequence     │  (tx-only; never called outside a transaction)   │
//! │  └──────────────────┘                                                  │
//! │                                                                         │
//! │  Each repository holds a pool clone for standalone reads. Writes that  │
//! │  must be atomic across repositories go through `_on` helpers that      │
//! │  borrow the billing transaction's connection instead.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod bill;
pub mod item;
pub mod sequence;
pub mod stock;
