//! The invoice workflow: validate, number, lay out, render, archive, record.

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::error::{InvoiceError, Result};
use crate::layout::{layout_invoice, LayoutOptions};
use crate::model::InvoiceRecord;
use crate::pdf::{PdfRenderer, RenderBackend};
use crate::request::InvoiceRequest;
use crate::store::{DocumentArchive, FsArchive, InvoicePage, InvoiceStore, PageRequest, StoredInvoice};

/// Display format of the invoice date.
pub const DATE_FORMAT: &str = "%d-%m-%Y";
pub const CREATED_MESSAGE: &str = "Invoice created successfully";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedInvoice {
    pub invoice_number: String,
    pub pdf_url: String,
    pub message: String,
}

pub struct InvoiceService<A: DocumentArchive, R: RenderBackend> {
    store: InvoiceStore,
    archive: A,
    renderer: R,
    layout: LayoutOptions,
}

impl InvoiceService<FsArchive, PdfRenderer> {
    /// Wire up the SQLite store, filesystem archive and PDF renderer.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = InvoiceStore::open(&config.database_path)?;
        let archive = FsArchive::new(&config.archive_dir, config.public_base_url.clone());
        let renderer = PdfRenderer::new(config.compress_pdf);
        Ok(InvoiceService::new(store, archive, renderer, config.layout_options()))
    }
}

impl<A: DocumentArchive, R: RenderBackend> InvoiceService<A, R> {
    pub fn new(store: InvoiceStore, archive: A, renderer: R, layout: LayoutOptions) -> Self {
        InvoiceService {
            store,
            archive,
            renderer,
            layout,
        }
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    pub fn create_invoice(&mut self, request: InvoiceRequest) -> Result<CreatedInvoice> {
        self.create_invoice_at(request, Local::now())
    }

    /// Create an invoice as if at `now`. A request that fails validation
    /// does not consume an invoice number.
    pub fn create_invoice_at(
        &mut self,
        request: InvoiceRequest,
        now: DateTime<Local>,
    ) -> Result<CreatedInvoice> {
        request.validate()?;

        let invoice_number = self.store.next_invoice_number()?;
        let date = now.format(DATE_FORMAT).to_string();
        let payment_mode = request.payment_mode;
        let record = request.into_record(invoice_number.clone(), date.clone());

        let bytes = self.render_record(&record)?;
        let pdf_url = self.archive.put(&invoice_number, &bytes)?;

        let stored = StoredInvoice {
            invoice_number: invoice_number.clone(),
            customer_name: record.customer.name,
            customer_address: record.customer.address,
            items: record.items,
            payment_mode,
            date,
            created_at: now
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Micros, true),
            pdf_url: pdf_url.clone(),
        };
        if let Err(e) = self.store.insert(&stored) {
            if let Err(cleanup) = self.archive.remove(&invoice_number) {
                log::warn!("could not remove archived invoice {invoice_number}: {cleanup}");
            }
            return Err(e);
        }

        log::info!(
            "created invoice {} for {} ({} bytes)",
            invoice_number,
            stored.customer_name,
            bytes.len()
        );
        Ok(CreatedInvoice {
            invoice_number,
            pdf_url,
            message: CREATED_MESSAGE.to_string(),
        })
    }

    pub fn list_invoices(&self, page: PageRequest) -> Result<InvoicePage> {
        self.store.list(page)
    }

    pub fn search_invoices(&self, query: &str, page: PageRequest) -> Result<InvoicePage> {
        self.store.search(query, page)
    }

    pub fn get_invoice(&self, invoice_number: &str) -> Result<StoredInvoice> {
        self.store
            .get(invoice_number)?
            .ok_or_else(|| InvoiceError::NotFound(invoice_number.to_string()))
    }

    /// Lay out and render without storing anything.
    pub fn render_record(&self, record: &InvoiceRecord) -> Result<Vec<u8>> {
        render_invoice(record, &self.layout, &self.renderer)
    }
}

/// Lay out `record` and hand the result to `renderer`.
pub fn render_invoice<R: RenderBackend>(
    record: &InvoiceRecord,
    layout: &LayoutOptions,
    renderer: &R,
) -> Result<Vec<u8>> {
    let doc = layout_invoice(record, layout)?;
    renderer.render(&doc)
}
