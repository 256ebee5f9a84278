//! Normalized invoice data consumed by the layout engine.
//!
//! Field defaults follow what a partially filled record should render as:
//! a nameless item is shown as "Item", a missing quantity counts as 1 and a
//! missing price as 0.

use serde::{Deserialize, Serialize};

use crate::error::{InvoiceError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub customer: Customer,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default)]
    pub mode: Option<PaymentMode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    Cash,
    Online,
    #[serde(rename = "EMI")]
    Emi,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Online => "Online",
            PaymentMode::Emi => "EMI",
        }
    }

    pub fn from_name(name: &str) -> Option<PaymentMode> {
        match name {
            "Cash" => Some(PaymentMode::Cash),
            "Online" => Some(PaymentMode::Online),
            "EMI" => Some(PaymentMode::Emi),
            _ => None,
        }
    }
}

/// Item category. Selects the sub-layout drawn under the main row.
/// Unrecognized names deserialize to `Unknown`, which has no sub-layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Phone,
    Charger,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub category: Category,
    #[serde(default = "default_item_name")]
    pub name: String,
    #[serde(default = "default_qty")]
    pub qty: u32,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imei: Vec<String>,
    #[serde(default)]
    pub charger_included: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charger: Option<ChargerInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub serial: String,
}

impl ChargerInfo {
    /// True when neither the name nor the serial has any text.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.serial.trim().is_empty()
    }
}

fn default_item_name() -> String {
    "Item".to_string()
}

fn default_qty() -> u32 {
    1
}

impl LineItem {
    /// A main-row-only item with the given category.
    pub fn new(category: Category, name: &str, qty: u32, price: f64) -> Self {
        LineItem {
            category,
            name: name.to_string(),
            qty,
            price,
            imei: Vec::new(),
            charger_included: false,
            charger: None,
            serial: None,
        }
    }

    /// `qty * price`.
    pub fn total(&self) -> f64 {
        self.qty as f64 * self.price
    }
}

impl InvoiceRecord {
    /// Sum of line totals, accumulated in item order.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().fold(0.0, |acc, item| acc + item.total())
    }

    /// Display form of the payment mode; "N/A" when absent.
    pub fn payment_mode_label(&self) -> &'static str {
        self.payment
            .as_ref()
            .and_then(|p| p.mode)
            .map(|m| m.as_str())
            .unwrap_or("N/A")
    }

    /// Checks the fields the layout engine refuses to draw without.
    pub fn check_required(&self) -> Result<()> {
        if self.customer.name.trim().is_empty() {
            return Err(InvoiceError::MissingRequiredField {
                field: "customer.name",
            });
        }
        if self.customer.address.trim().is_empty() {
            return Err(InvoiceError::MissingRequiredField {
                field: "customer.address",
            });
        }
        Ok(())
    }
}
