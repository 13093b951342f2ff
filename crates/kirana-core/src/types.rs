//! # Domain Types
//!
//! Core domain types used throughout Kirana Ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │   StockBatch    │   │      Bill       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  quantity_delta │   │  invoice_no     │       │
//! │  │  mrp_paisa      │   │  unit_cost_paisa│   │  total_paisa    │       │
//! │  │  gst_rate_bps   │   │  (append-only)  │   │  customer_*     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    GstRate      │   │    BillLine     │   │    BillDraft    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  price snapshot │   │  typed request  │       │
//! │  │  1800 = 18.00%  │   │  at bill time   │   │  from boundary  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, invoice_no) - human-readable, potentially mutable
//!
//! ## Ownership
//! Items and bills carry an `owner_id` issued by the auth collaborator.
//! Cross-owner access is rejected at every repository boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::pricing;

// =============================================================================
// GST Rate
// =============================================================================

/// GST rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1800 bps = 18.00% (a common GST slab)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstRate(u32);

impl GstRate {
    /// Creates a GST rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        GstRate(bps)
    }

    /// Creates a GST rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        GstRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero GST rate (exempt goods).
    #[inline]
    pub const fn zero() -> Self {
        GstRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for GstRate {
    fn default() -> Self {
        GstRate::zero()
    }
}

// =============================================================================
// Item
// =============================================================================

/// A sellable product registered by an owner.
///
/// Items are never hard-deleted while bills may reference them;
/// `is_active` is the soft delete flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owner this item belongs to.
    pub owner_id: String,

    /// Stock Keeping Unit - business identifier, unique per owner.
    pub sku: String,

    /// Display name shown in inventory, catalog and on invoices.
    pub name: String,

    /// Free-form category label.
    pub category: String,

    /// Maximum retail price in paisa.
    pub mrp_paisa: i64,

    /// GST rate in basis points (1800 = 18%).
    pub gst_rate_bps: u32,

    /// Opaque reference to a catalog image held by the media collaborator.
    pub image_ref: Option<String>,

    /// Whether the item appears in the public-style catalog.
    pub visible_in_catalog: bool,

    /// Whether the item is active (soft delete).
    pub is_active: bool,

    /// When the item was registered.
    pub created_at: DateTime<Utc>,

    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Returns the MRP as a Money type.
    #[inline]
    pub fn mrp(&self) -> Money {
        Money::from_paisa(self.mrp_paisa)
    }

    /// Returns the GST rate.
    #[inline]
    pub fn gst_rate(&self) -> GstRate {
        GstRate::from_bps(self.gst_rate_bps)
    }
}

// =============================================================================
// Stock Batch
// =============================================================================

/// One entry in the append-only stock ledger.
///
/// ```text
/// quantity_delta > 0   purchase / receipt / compensating restock
/// quantity_delta < 0   consumption from a bill
/// ```
///
/// On-hand quantity for an item is always the sum of its deltas.
/// Rows are never updated; corrections are new entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockBatch {
    pub id: String,
    pub item_id: String,
    /// Signed quantity change.
    pub quantity_delta: i64,
    /// Unit cost in paisa. For consumption entries this is the cost
    /// snapshotted on the bill line, not a recomputed average.
    pub unit_cost_paisa: i64,
    pub created_at: DateTime<Utc>,
}

impl StockBatch {
    /// Returns the unit cost as Money.
    #[inline]
    pub fn unit_cost(&self) -> Money {
        Money::from_paisa(self.unit_cost_paisa)
    }

    /// Is this a receipt (positive) entry?
    #[inline]
    pub fn is_receipt(&self) -> bool {
        self.quantity_delta > 0
    }
}

// =============================================================================
// Bill
// =============================================================================

/// A committed invoice header.
///
/// Immutable once created except for a full-replace edit, which keeps
/// the invoice number and rewrites the line set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Bill {
    pub id: String,
    pub owner_id: String,
    /// Human-readable invoice number, format `INV-<year>-<seq>`.
    pub invoice_no: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_gst: Option<String>,
    pub customer_address: Option<String>,
    pub subtotal_paisa: i64,
    pub discount_paisa: i64,
    pub gst_paisa: i64,
    pub total_paisa: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paisa(self.total_paisa)
    }

    /// Returns the GST total split into CGST and SGST halves.
    #[inline]
    pub fn gst_split(&self) -> (Money, Money) {
        pricing::split_gst(Money::from_paisa(self.gst_paisa))
    }
}

// =============================================================================
// Bill Line
// =============================================================================

/// A line item on a bill.
/// Uses the snapshot pattern to freeze pricing data at billing time:
/// later item or cost changes never alter a committed bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BillLine {
    pub id: String,
    pub bill_id: String,
    pub item_id: String,
    /// Quantity sold.
    pub quantity: i64,
    /// MRP per unit at billing time (frozen).
    pub unit_mrp_paisa: i64,
    /// GST rate at billing time (frozen).
    pub gst_rate_bps: u32,
    /// Weighted-average purchase cost per unit at billing time (frozen).
    pub unit_cost_paisa: i64,
    /// Line discount in basis points (1000 = 10%).
    pub discount_bps: u32,
    pub created_at: DateTime<Utc>,
}

impl BillLine {
    /// Returns the frozen unit MRP as Money.
    #[inline]
    pub fn unit_mrp(&self) -> Money {
        Money::from_paisa(self.unit_mrp_paisa)
    }

    /// Recomputes this line's pricing from its frozen snapshot.
    pub fn pricing(&self) -> pricing::LinePricing {
        let snapshot = pricing::PriceSnapshot {
            mrp: Money::from_paisa(self.unit_mrp_paisa),
            gst_rate: GstRate::from_bps(self.gst_rate_bps),
            unit_cost: Money::from_paisa(self.unit_cost_paisa),
        };
        pricing::price_line(&snapshot, self.quantity, self.discount_bps)
    }
}

// =============================================================================
// Typed Request Structs
// =============================================================================
// The boundary hands the core explicit typed requests; nothing duck-typed
// reaches the billing transaction.

/// Customer fields on a bill. Only the name is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: Option<String>,
    pub gst_number: Option<String>,
    pub address: Option<String>,
}

/// One requested line in a draft cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftLine {
    pub item_id: String,
    pub quantity: i64,
    /// Discount in basis points (1000 = 10%). Zero for none.
    pub discount_bps: u32,
}

/// A cart ready to be committed as a bill.
///
/// `bill_id = None` creates a new bill (a fresh invoice number is minted);
/// `bill_id = Some(..)` is a full-replace edit that keeps the existing
/// invoice number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillDraft {
    pub bill_id: Option<String>,
    pub customer: CustomerDetails,
    pub lines: Vec<DraftLine>,
}

/// Fields for registering a new item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub mrp_paisa: i64,
    pub gst_rate_bps: u32,
    pub visible_in_catalog: bool,
}

/// Fields for an item info edit. Catalog visibility and image reference
/// have their own dedicated operations and are not part of an info edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub mrp_paisa: i64,
    pub gst_rate_bps: u32,
}

// =============================================================================
// Derived Views
// =============================================================================

/// An item joined with its derived stock figures.
///
/// `on_hand` and the receipt aggregates come from the stock ledger on
/// every read; there is no cached quantity column to drift out of sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ItemWithStock {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub item: Item,

    /// Sum of all batch deltas.
    pub on_hand: i64,

    /// Sum of quantities over positive (receipt) batches only.
    pub receipt_qty: i64,

    /// Sum of qty × unit cost over positive (receipt) batches only.
    pub receipt_cost_paisa: i64,
}

impl ItemWithStock {
    /// Weighted-average purchase cost over receipt batches.
    /// Zero when the item has never been received.
    #[inline]
    pub fn average_cost(&self) -> Money {
        pricing::weighted_average_cost(self.receipt_cost_paisa, self.receipt_qty)
    }

    /// Canonical GST-inclusive selling price for display surfaces.
    #[inline]
    pub fn selling_price(&self) -> Money {
        pricing::cost_plus_gst_price(self.average_cost(), self.item.gst_rate())
    }
}

/// A bill line joined with the current item name/SKU for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BillLineView {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub line: BillLine,
    pub item_name: String,
    pub item_sku: String,
}

/// A committed bill with its joined line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillDetail {
    pub bill: Bill,
    pub lines: Vec<BillLineView>,
}

/// The result handed back to the caller after a successful commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommittedBill {
    pub bill_id: String,
    pub invoice_no: String,
    pub grand_total_paisa: i64,
}

// =============================================================================
// Reporting Types
// =============================================================================

/// One aggregate row in the sales report, grouped per bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SalesRow {
    pub bill_id: String,
    pub invoice_no: String,
    pub customer_name: String,
    pub created_at: DateTime<Utc>,
    /// Total units across all lines of the bill.
    pub units: i64,
    /// Gross MRP value (qty × unit MRP summed, before discount/GST).
    pub gross_paisa: i64,
    /// The bill's committed grand total.
    pub bill_total_paisa: i64,
}

/// Sort order for the sales report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesSort {
    /// Most recent bills first (default).
    NewestFirst,
    /// Alphabetical by customer name.
    CustomerName,
}

impl Default for SalesSort {
    fn default() -> Self {
        SalesSort::NewestFirst
    }
}

/// Filters for the sales report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesFilter {
    /// Restrict to bills created on this calendar date (UTC).
    pub on_date: Option<chrono::NaiveDate>,
    /// Case-insensitive customer-name substring.
    pub customer_contains: Option<String>,
    pub sort: Option<SalesSort>,
}

// =============================================================================
// Unit Tests
// =============================================================================
