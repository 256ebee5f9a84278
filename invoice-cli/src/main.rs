//! pos-invoice - Create, render and look up shop invoices
//!
//! Reads configuration from the environment (see `invoice_core::config`),
//! prints results as JSON on stdout and logs to stderr.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;

use invoice_core::{
    render_invoice, Config, FsArchive, InvoiceRecord, InvoiceRequest, InvoiceService, PageRequest,
    PdfRenderer,
};

#[derive(Parser, Debug)]
#[command(name = "pos-invoice")]
#[command(about = "Point-of-sale invoice generator")]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a normalized invoice record to PDF without storing it
    Render {
        /// JSON invoice record
        record: PathBuf,
        /// Output file
        #[arg(short, long, default_value = "invoice.pdf")]
        output: PathBuf,
    },
    /// Validate a request, then create, archive and record the invoice
    Create {
        /// JSON invoice request
        request: PathBuf,
    },
    /// List invoices, newest first
    List(PageArgs),
    /// Find invoices by number or customer name
    Search {
        query: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show one invoice's stored metadata
    Show { invoice_number: String },
    /// Print a sample invoice request
    Example,
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 10)]
    limit: u32,
}

impl PageArgs {
    fn to_request(&self) -> Result<PageRequest> {
        Ok(PageRequest::new(self.page, self.limit)?)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn open_service(config: &Config) -> Result<InvoiceService<FsArchive, PdfRenderer>> {
    InvoiceService::from_config(config)
        .with_context(|| format!("opening invoice store {}", config.database_path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::from_env();
    log::debug!("configuration: {config:?}");

    match cli.command {
        Command::Example => print_json(&InvoiceRequest::example()),
        Command::Render { record, output } => render(&config, &record, &output),
        Command::Create { request } => {
            let request: InvoiceRequest = read_json(&request)?;
            print_json(&open_service(&config)?.create_invoice(request)?)
        }
        Command::List(page) => {
            print_json(&open_service(&config)?.list_invoices(page.to_request()?)?)
        }
        Command::Search { query, page } => {
            print_json(&open_service(&config)?.search_invoices(&query, page.to_request()?)?)
        }
        Command::Show { invoice_number } => {
            print_json(&open_service(&config)?.get_invoice(&invoice_number)?)
        }
    }
}

/// Render only; no store or archive is touched.
fn render(config: &Config, record: &Path, output: &Path) -> Result<()> {
    let record: InvoiceRecord = read_json(record)?;
    let renderer = PdfRenderer::new(config.compress_pdf);
    let bytes = render_invoice(&record, &config.layout_options(), &renderer)?;
    fs::write(output, &bytes).with_context(|| format!("writing {}", output.display()))?;
    log::info!("wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}
