//! Invoice metadata and numbering, kept in SQLite.

pub mod archive;

use std::path::Path;

use rusqlite::functions::FunctionFlags;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};

use crate::error::{InvoiceError, Result};
use crate::model::{LineItem, PaymentMode};

pub use archive::{DocumentArchive, FsArchive};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS counters (
    name TEXT PRIMARY KEY,
    seq  INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS invoices (
    invoice_number   TEXT PRIMARY KEY,
    customer_name    TEXT NOT NULL,
    customer_address TEXT NOT NULL,
    items_json       TEXT NOT NULL,
    payment_mode     TEXT NOT NULL,
    date             TEXT NOT NULL,
    created_at       TEXT NOT NULL,
    pdf_url          TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_invoices_created_at ON invoices(created_at);
";

const INVOICE_COUNTER: &str = "invoice";
/// SQL function folding text with Unicode lowercase rules. SQLite's own
/// `lower()` only folds ASCII.
const FOLD_CASE_FN: &str = "fold_case";
const SELECT_COLUMNS: &str = "invoice_number, customer_name, customer_address, items_json, \
     payment_mode, date, created_at, pdf_url";

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 50;

/// Metadata stored for every created invoice. The PDF itself lives in a
/// [`DocumentArchive`]; only its URL is kept here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredInvoice {
    pub invoice_number: String,
    pub customer_name: String,
    pub customer_address: String,
    pub items: Vec<LineItem>,
    pub payment_mode: PaymentMode,
    /// Display date, `DD-MM-YYYY`.
    pub date: String,
    /// UTC RFC 3339 timestamp with fixed precision, so it sorts as text.
    pub created_at: String,
    pub pdf_url: String,
}

/// One page of a listing. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Result<Self> {
        if page < 1 || !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(InvoiceError::InvalidPage { page, limit });
        }
        Ok(PageRequest { page, limit })
    }

    fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoicePage {
    pub invoices: Vec<StoredInvoice>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl InvoicePage {
    fn new(invoices: Vec<StoredInvoice>, total: u64, req: PageRequest) -> Self {
        let limit = req.limit as u64;
        let total_pages = if total == 0 { 1 } else { total.div_ceil(limit) };
        InvoicePage {
            invoices,
            total,
            page: req.page,
            limit: req.limit,
            total_pages,
        }
    }
}

pub struct InvoiceStore {
    conn: Connection,
}

impl InvoiceStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        log::debug!("opened invoice store at {}", path.as_ref().display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        conn.create_scalar_function(
            FOLD_CASE_FN,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| Ok(ctx.get::<String>(0)?.to_lowercase()),
        )?;
        Ok(InvoiceStore { conn })
    }

    /// Allocate the next invoice number: `0000001`, `0000002`, ...
    pub fn next_invoice_number(&mut self) -> Result<String> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let seq: i64 = tx.query_row(
            "INSERT INTO counters (name, seq) VALUES (?1, 1)
             ON CONFLICT(name) DO UPDATE SET seq = seq + 1
             RETURNING seq",
            params![INVOICE_COUNTER],
            |r| r.get(0),
        )?;
        tx.commit()?;

        let number = format!("{seq:07}");
        log::debug!("allocated invoice number {number}");
        Ok(number)
    }

    /// Fails with a database error if the invoice number already exists.
    pub fn insert(&self, invoice: &StoredInvoice) -> Result<()> {
        let items_json = serde_json::to_string(&invoice.items)?;
        self.conn.execute(
            "INSERT INTO invoices (invoice_number, customer_name, customer_address, items_json,
                                   payment_mode, date, created_at, pdf_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                invoice.invoice_number,
                invoice.customer_name,
                invoice.customer_address,
                items_json,
                invoice.payment_mode.as_str(),
                invoice.date,
                invoice.created_at,
                invoice.pdf_url,
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, invoice_number: &str) -> Result<Option<StoredInvoice>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM invoices WHERE invoice_number = ?1");
        let found = self
            .conn
            .query_row(&sql, params![invoice_number], read_invoice)
            .optional()?;
        Ok(found)
    }

    /// All invoices, newest first.
    pub fn list(&self, req: PageRequest) -> Result<InvoicePage> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM invoices", [], |r| r.get(0))?;

        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM invoices
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?1 OFFSET ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let invoices = stmt
            .query_map(params![req.limit, req.offset()], read_invoice)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(InvoicePage::new(invoices, total as u64, req))
    }

    /// Invoices whose number or customer name contains `query`, ignoring
    /// case. Newest first.
    pub fn search(&self, query: &str, req: PageRequest) -> Result<InvoicePage> {
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        let filter = format!(
            "{FOLD_CASE_FN}(invoice_number) LIKE ?1 ESCAPE '\\' \
             OR {FOLD_CASE_FN}(customer_name) LIKE ?1 ESCAPE '\\'"
        );

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM invoices WHERE {filter}"),
            params![pattern],
            |r| r.get(0),
        )?;

        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM invoices WHERE {filter}
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let invoices = stmt
            .query_map(params![pattern, req.limit, req.offset()], read_invoice)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        log::debug!("search {:?} matched {} invoices", query, total);
        Ok(InvoicePage::new(invoices, total as u64, req))
    }
}

fn read_invoice(row: &Row<'_>) -> rusqlite::Result<StoredInvoice> {
    let items_json: String = row.get(3)?;
    let items = serde_json::from_str(&items_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    let mode: String = row.get(4)?;
    let payment_mode = PaymentMode::from_name(&mode).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("unknown payment mode {mode:?}").into(),
        )
    })?;

    Ok(StoredInvoice {
        invoice_number: row.get(0)?,
        customer_name: row.get(1)?,
        customer_address: row.get(2)?,
        items,
        payment_mode,
        date: row.get(5)?,
        created_at: row.get(6)?,
        pdf_url: row.get(7)?,
    })
}

/// Escape LIKE wildcards so the query matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
