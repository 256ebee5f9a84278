//! Incoming invoice requests: the flat shape a point-of-sale client submits,
//! the business rules it must satisfy, and its conversion into an
//! [`InvoiceRecord`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationErrors};
use crate::model::{Category, ChargerInfo, Customer, InvoiceRecord, LineItem, Payment, PaymentMode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRequest {
    pub customer_name: String,
    pub customer_address: String,
    pub items: Vec<InvoiceItem>,
    pub payment_mode: PaymentMode,
}

/// Item categories a request may carry. Unlike [`Category`], unknown
/// categories are rejected at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemCategory {
    Phone,
    Charger,
}

impl From<ItemCategory> for Category {
    fn from(c: ItemCategory) -> Self {
        match c {
            ItemCategory::Phone => Category::Phone,
            ItemCategory::Charger => Category::Charger,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub category: ItemCategory,
    pub item_name: String,
    /// Signed so that a negative count reaches validation with its field
    /// name instead of failing deserialization.
    pub quantity: i64,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imei_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imei_2: Option<String>,
    #[serde(default)]
    pub charger_included: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charger_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charger_serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl InvoiceItem {
    fn validate(&self, index: usize, errors: &mut ValidationErrors) {
        let field = |name: &str| format!("items[{index}].{name}");

        if self.item_name.trim().is_empty() {
            errors.add(field("item_name"), "Item name is required");
        }
        if self.quantity < 1 {
            errors.add(field("quantity"), "Quantity must be at least 1");
        } else if u32::try_from(self.quantity).is_err() {
            errors.add(field("quantity"), "Quantity is too large");
        }
        if !self.price.is_finite() || self.price < 0.0 {
            errors.add(field("price"), "Price must be a non-negative number");
        }

        match self.category {
            ItemCategory::Phone => {
                if !present(&self.imei_1) {
                    errors.add(field("imei_1"), "Phone requires IMEI 1");
                }
                if self.charger_included
                    && !(present(&self.charger_name) && present(&self.charger_serial_number))
                {
                    errors.add(
                        field("charger_name"),
                        "Charger details required if charger included",
                    );
                }
            }
            ItemCategory::Charger => {
                if !present(&self.serial_number) {
                    errors.add(field("serial_number"), "Charger requires serial number");
                }
            }
        }
    }

    fn into_line_item(self) -> LineItem {
        let imei = [self.imei_1, self.imei_2]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect();
        let charger = match (self.charger_name, self.charger_serial_number) {
            (Some(name), Some(serial)) => Some(ChargerInfo { name, serial }),
            _ => None,
        };
        LineItem {
            category: self.category.into(),
            name: self.item_name,
            qty: u32::try_from(self.quantity.max(0)).unwrap_or(u32::MAX),
            price: self.price,
            imei,
            charger_included: self.charger_included,
            charger,
            serial: self.serial_number,
        }
    }
}

impl InvoiceRequest {
    /// Check every rule and report all violations together.
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();

        if self.customer_name.trim().is_empty() {
            errors.add("customer_name", "Customer name is required");
        }
        if self.customer_address.trim().is_empty() {
            errors.add("customer_address", "Customer address is required");
        }
        if self.items.is_empty() {
            errors.add("items", "At least one item is required");
        }
        for (i, item) in self.items.iter().enumerate() {
            item.validate(i, &mut errors);
        }

        errors.into_result()
    }

    /// Build the record the layout engine draws. Does not validate.
    pub fn into_record(self, invoice_no: String, date: String) -> InvoiceRecord {
        InvoiceRecord {
            invoice_no: Some(invoice_no),
            date: Some(date),
            customer: Customer {
                name: self.customer_name,
                address: self.customer_address,
            },
            items: self
                .items
                .into_iter()
                .map(InvoiceItem::into_line_item)
                .collect(),
            payment: Some(Payment {
                mode: Some(self.payment_mode),
            }),
        }
    }

    /// A filled-in request, useful as a template.
    pub fn example() -> Self {
        InvoiceRequest {
            customer_name: "Ravi Kumar".to_string(),
            customer_address: "Station Road, Maudaha".to_string(),
            items: vec![
                InvoiceItem {
                    category: ItemCategory::Phone,
                    item_name: "Samsung Galaxy M14".to_string(),
                    quantity: 1,
                    price: 15000.0,
                    imei_1: Some("356789104512345".to_string()),
                    imei_2: None,
                    charger_included: true,
                    charger_name: Some("Fast Charger".to_string()),
                    charger_serial_number: Some("CHG001".to_string()),
                    serial_number: None,
                },
                InvoiceItem {
                    category: ItemCategory::Charger,
                    item_name: "20W USB-C Adapter".to_string(),
                    quantity: 2,
                    price: 499.0,
                    imei_1: None,
                    imei_2: None,
                    charger_included: false,
                    charger_name: None,
                    charger_serial_number: None,
                    serial_number: Some("ADP-2291".to_string()),
                },
            ],
            payment_mode: PaymentMode::Cash,
        }
    }
}
