//! # Invoice Sequence
//!
//! Gapless, per-year invoice numbering.
//!
//! ## Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              One statement, one row, no read-then-write                 │
//! │                                                                         │
//! │  INSERT INTO invoice_sequences (year, last_number) VALUES (?, 1)        │
//! │  ON CONFLICT (year) DO UPDATE SET last_number = last_number + 1         │
//! │  RETURNING last_number                                                  │
//! │                                                                         │
//! │  The increment and the read happen in a single statement inside the     │
//! │  billing transaction. SQLite admits one writer at a time, so two        │
//! │  concurrent commits can never observe the same number, and a rolled-    │
//! │  back commit rolls the increment back with it: numbers stay gapless.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is deliberately no pool-based entry point here. Minting a number
//! outside the billing transaction would leak it if the commit then failed.

use sqlx::SqliteConnection;
use tracing::debug;

use kirana_core::INVOICE_SEQ_WIDTH;

use crate::error::DbResult;

/// Formats an invoice number: `INV-<year>-<zero-padded sequence>`.
///
/// The pad is a minimum width; the number keeps growing past 9999
/// without truncation (INV-2026-10000).
pub fn format_invoice_no(year: i32, seq: i64) -> String {
    format!("INV-{year}-{seq:0width$}", width = INVOICE_SEQ_WIDTH)
}

/// Mints the next invoice number for `year` on the caller's transaction.
pub(crate) async fn next_invoice_number_on(
    conn: &mut SqliteConnection,
    year: i32,
) -> DbResult<String> {
    let seq: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO invoice_sequences (year, last_number)
        VALUES (?1, 1)
        ON CONFLICT (year) DO UPDATE SET last_number = last_number + 1
        RETURNING last_number
        "#,
    )
    .bind(year)
    .fetch_one(&mut *conn)
    .await?;

    let invoice_no = format_invoice_no(year, seq);
    debug!(%invoice_no, "Invoice number minted");

    Ok(invoice_no)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_to_four_digits() {
        assert_eq!(format_invoice_no(2026, 1), "INV-2026-0001");
        assert_eq!(format_invoice_no(2026, 42), "INV-2026-0042");
        assert_eq!(format_invoice_no(2026, 9999), "INV-2026-9999");
    }

    #[test]
    fn test_format_grows_past_the_pad() {
        assert_eq!(format_invoice_no(2026, 10_000), "INV-2026-10000");
    }
}
