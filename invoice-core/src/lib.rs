pub mod config;
pub mod error;
pub mod fonts;
pub mod graphics;
pub mod image;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod request;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::{InvoiceError, Result, ValidationErrors};
pub use layout::{layout_invoice, layout_with_logo, DrawOp, InvoiceDocument, LayoutOptions, PageSize};
pub use model::{Category, ChargerInfo, Customer, InvoiceRecord, LineItem, Payment, PaymentMode};
pub use pdf::{PdfRenderer, RenderBackend};
pub use request::{InvoiceItem, InvoiceRequest, ItemCategory};
pub use service::{render_invoice, CreatedInvoice, InvoiceService};
pub use store::{DocumentArchive, FsArchive, InvoicePage, InvoiceStore, PageRequest, StoredInvoice};
