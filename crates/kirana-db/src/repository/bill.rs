//! # Bill Repository
//!
//! Data access for committed bills: headers, lines, detail views and the
//! per-bill sales report.
//!
//! ## Write Path vs Read Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Writes (insert/update/delete) happen ONLY inside the billing           │
//! │  transaction, through the `_on` helpers at the bottom of this file.     │
//! │  The pool-based methods on BillRepository are read-only.                │
//! │                                                                         │
//! │  billing.rs ──── tx ───► insert_header_on / insert_line_on / ...        │
//! │  handlers   ── pool ───► get_by_id / detail / list / sales_report       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use kirana_core::pricing::BillTotals;
use kirana_core::types::{
    Bill, BillDetail, BillLine, BillLineView, CustomerDetails, SalesFilter, SalesRow, SalesSort,
};

use crate::error::DbResult;

// =============================================================================
// Bill Repository
// =============================================================================

/// Repository for committed bills (read side).
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new bill repository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Fetches a bill header by UUID, scoped to the owner.
    pub async fn get_by_id(&self, owner_id: &str, id: &str) -> DbResult<Option<Bill>> {
        let bill = sqlx::query_as::<_, Bill>(
            "SELECT * FROM bills WHERE id = ?1 AND owner_id = ?2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(bill)
    }

    /// All bills for the owner, newest first.
    pub async fn list_for_owner(&self, owner_id: &str) -> DbResult<Vec<Bill>> {
        let bills = sqlx::query_as::<_, Bill>(
            "SELECT * FROM bills WHERE owner_id = ?1 ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bills)
    }

    /// Full bill detail: header plus lines joined with current item
    /// name/SKU for display. Amounts come from the frozen line snapshots,
    /// so the print view of an old bill never changes.
    pub async fn detail(&self, owner_id: &str, id: &str) -> DbResult<Option<BillDetail>> {
        let Some(bill) = self.get_by_id(owner_id, id).await? else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, BillLineView>(
            r#"
            SELECT
                bl.id, bl.bill_id, bl.item_id, bl.quantity, bl.unit_mrp_paisa,
                bl.gst_rate_bps, bl.unit_cost_paisa, bl.discount_bps, bl.created_at,
                i.name AS item_name,
                i.sku  AS item_sku
            FROM bill_lines bl
            JOIN items i ON i.id = bl.item_id
            WHERE bl.bill_id = ?1
            ORDER BY bl.created_at ASC, bl.id ASC
            "#,
        )
        .bind(&bill.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(BillDetail { bill, lines }))
    }

    /// Per-bill sales report.
    ///
    /// One row per bill with unit and value aggregates over its lines.
    /// Filters compose: date restricts to one UTC calendar day, customer is
    /// a case-insensitive substring match.
    pub async fn sales_report(
        &self,
        owner_id: &str,
        filter: &SalesFilter,
    ) -> DbResult<Vec<SalesRow>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT
                b.id AS bill_id,
                b.invoice_no,
                b.customer_name,
                b.created_at,
                SUM(bl.quantity) AS units,
                SUM(bl.quantity * bl.unit_mrp_paisa) AS gross_paisa,
                b.total_paisa AS bill_total_paisa
            FROM bills b
            JOIN bill_lines bl ON bl.bill_id = b.id
            WHERE b.owner_id = "#,
        );
        qb.push_bind(owner_id);

        if let Some(on_date) = filter.on_date {
            qb.push(" AND DATE(b.created_at) = ");
            qb.push_bind(on_date.format("%Y-%m-%d").to_string());
        }

        if let Some(customer) = filter
            .customer_contains
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            qb.push(" AND LOWER(b.customer_name) LIKE ");
            qb.push_bind(format!("%{}%", customer.to_lowercase()));
        }

        qb.push(" GROUP BY b.id");
        match filter.sort.unwrap_or_default() {
            SalesSort::NewestFirst => qb.push(" ORDER BY b.created_at DESC, b.id DESC"),
            SalesSort::CustomerName => qb.push(" ORDER BY b.customer_name ASC, b.created_at DESC"),
        };

        let rows = qb
            .build_query_as::<SalesRow>()
            .fetch_all(&self.pool)
            .await?;

        debug!(rows = rows.len(), "Sales report generated");
        Ok(rows)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================
// All bill writes go through these on the billing transaction's connection.

/// Fetches an owner-scoped bill header on the caller's transaction.
pub(crate) async fn get_for_owner_on(
    conn: &mut SqliteConnection,
    owner_id: &str,
    id: &str,
) -> DbResult<Option<Bill>> {
    let bill = sqlx::query_as::<_, Bill>(
        "SELECT * FROM bills WHERE id = ?1 AND owner_id = ?2",
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(bill)
}

/// Lines for a bill on the caller's transaction (edit/delete reversal path).
pub(crate) async fn lines_for_bill_on(
    conn: &mut SqliteConnection,
    bill_id: &str,
) -> DbResult<Vec<BillLine>> {
    let lines = sqlx::query_as::<_, BillLine>(
        r#"
        SELECT id, bill_id, item_id, quantity, unit_mrp_paisa, gst_rate_bps,
               unit_cost_paisa, discount_bps, created_at
        FROM bill_lines
        WHERE bill_id = ?1
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(bill_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(lines)
}

/// Inserts a new bill header.
pub(crate) async fn insert_header_on(
    conn: &mut SqliteConnection,
    bill_id: &str,
    owner_id: &str,
    invoice_no: &str,
    customer: &CustomerDetails,
    totals: &BillTotals,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO bills
            (id, owner_id, invoice_no, customer_name, customer_phone,
             customer_gst, customer_address, subtotal_paisa, discount_paisa,
             gst_paisa, total_paisa, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(bill_id)
    .bind(owner_id)
    .bind(invoice_no)
    .bind(&customer.name)
    .bind(&customer.phone)
    .bind(&customer.gst_number)
    .bind(&customer.address)
    .bind(totals.subtotal.paisa())
    .bind(totals.discount_total.paisa())
    .bind(totals.gst_total.paisa())
    .bind(totals.grand_total.paisa())
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Rewrites header customer fields and totals on a full-replace edit.
/// The invoice number and created_at are deliberately untouched.
pub(crate) async fn update_header_on(
    conn: &mut SqliteConnection,
    bill_id: &str,
    customer: &CustomerDetails,
    totals: &BillTotals,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE bills
        SET customer_name = ?1, customer_phone = ?2, customer_gst = ?3,
            customer_address = ?4, subtotal_paisa = ?5, discount_paisa = ?6,
            gst_paisa = ?7, total_paisa = ?8, updated_at = ?9
        WHERE id = ?10
        "#,
    )
    .bind(&customer.name)
    .bind(&customer.phone)
    .bind(&customer.gst_number)
    .bind(&customer.address)
    .bind(totals.subtotal.paisa())
    .bind(totals.discount_total.paisa())
    .bind(totals.gst_total.paisa())
    .bind(totals.grand_total.paisa())
    .bind(now)
    .bind(bill_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Inserts one bill line carrying its frozen price snapshot.
pub(crate) async fn insert_line_on(
    conn: &mut SqliteConnection,
    bill_id: &str,
    item_id: &str,
    quantity: i64,
    unit_mrp_paisa: i64,
    gst_rate_bps: u32,
    unit_cost_paisa: i64,
    discount_bps: u32,
    now: DateTime<Utc>,
) -> DbResult<String> {
    let line_id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO bill_lines
            (id, bill_id, item_id, quantity, unit_mrp_paisa, gst_rate_bps,
             unit_cost_paisa, discount_bps, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&line_id)
    .bind(bill_id)
    .bind(item_id)
    .bind(quantity)
    .bind(unit_mrp_paisa)
    .bind(gst_rate_bps)
    .bind(unit_cost_paisa)
    .bind(discount_bps)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(line_id)
}

/// Removes every line of a bill (full-replace edit, after reversal).
pub(crate) async fn delete_lines_on(conn: &mut SqliteConnection, bill_id: &str) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM bill_lines WHERE bill_id = ?1")
        .bind(bill_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Deletes a bill header; lines cascade via the FK.
pub(crate) async fn delete_bill_on(conn: &mut SqliteConnection, bill_id: &str) -> DbResult<()> {
    sqlx::query("DELETE FROM bills WHERE id = ?1")
        .bind(bill_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
