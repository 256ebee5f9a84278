use invoice_core::model::Category;
use invoice_core::{InvoiceError, InvoiceItem, InvoiceRequest, ItemCategory, PaymentMode};

fn phone() -> InvoiceItem {
    InvoiceItem {
        category: ItemCategory::Phone,
        item_name: "Vivo Y28".to_string(),
        quantity: 1,
        price: 13999.0,
        imei_1: Some("111111111111111".to_string()),
        imei_2: Some("222222222222222".to_string()),
        charger_included: false,
        charger_name: None,
        charger_serial_number: None,
        serial_number: None,
    }
}

fn charger() -> InvoiceItem {
    InvoiceItem {
        category: ItemCategory::Charger,
        item_name: "33W Charger".to_string(),
        quantity: 1,
        price: 799.0,
        imei_1: None,
        imei_2: None,
        charger_included: false,
        charger_name: None,
        charger_serial_number: None,
        serial_number: Some("SN-33W-01".to_string()),
    }
}

fn request(items: Vec<InvoiceItem>) -> InvoiceRequest {
    InvoiceRequest {
        customer_name: "Meena Devi".to_string(),
        customer_address: "Ward 5, Maudaha".to_string(),
        items,
        payment_mode: PaymentMode::Online,
    }
}

fn violations(req: &InvoiceRequest) -> Vec<(String, String)> {
    match req.validate() {
        Err(InvoiceError::Validation(errors)) => errors
            .errors()
            .iter()
            .map(|e| (e.field.clone(), e.message.clone()))
            .collect(),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn valid_request_passes() {
    request(vec![phone(), charger()]).validate().unwrap();
}

#[test]
fn phone_requires_first_imei() {
    let mut item = phone();
    item.imei_1 = None;
    assert_eq!(
        violations(&request(vec![charger(), item])),
        vec![("items[1].imei_1".to_string(), "Phone requires IMEI 1".to_string())]
    );
}

#[test]
fn included_charger_needs_name_and_serial() {
    let mut item = phone();
    item.charger_included = true;
    item.charger_name = Some("Fast Charger".to_string());
    assert_eq!(
        violations(&request(vec![item])),
        vec![(
            "items[0].charger_name".to_string(),
            "Charger details required if charger included".to_string()
        )]
    );
}

#[test]
fn charger_requires_serial() {
    let mut item = charger();
    item.serial_number = Some(String::new());
    let errors = violations(&request(vec![item]));
    assert_eq!(errors[0].1, "Charger requires serial number");
}

#[test]
fn all_violations_are_reported_together() {
    let mut bad_phone = phone();
    bad_phone.imei_1 = None;
    bad_phone.quantity = 0;
    bad_phone.price = -1.0;
    let mut req = request(vec![bad_phone]);
    req.customer_name = " ".to_string();

    let fields: Vec<String> = violations(&req).into_iter().map(|(f, _)| f).collect();
    assert_eq!(
        fields,
        vec![
            "customer_name",
            "items[0].quantity",
            "items[0].price",
            "items[0].imei_1"
        ]
    );
}

#[test]
fn empty_items_rejected() {
    let fields: Vec<String> = violations(&request(vec![]))
        .into_iter()
        .map(|(f, _)| f)
        .collect();
    assert_eq!(fields, vec!["items"]);
}

#[test]
fn error_message_names_field_and_rule() {
    let mut item = phone();
    item.imei_1 = None;
    let err = request(vec![item]).validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid invoice request: items[0].imei_1: Phone requires IMEI 1"
    );
}

#[test]
fn into_record_maps_flat_fields() {
    let mut with_charger = phone();
    with_charger.charger_included = true;
    with_charger.charger_name = Some("Fast Charger".to_string());
    with_charger.charger_serial_number = Some("CHG001".to_string());

    let record = request(vec![with_charger, charger()])
        .into_record("0000003".to_string(), "18-10-2026".to_string());

    assert_eq!(record.invoice_no.as_deref(), Some("0000003"));
    assert_eq!(record.date.as_deref(), Some("18-10-2026"));
    assert_eq!(record.customer.name, "Meena Devi");
    assert_eq!(record.payment_mode_label(), "Online");

    let phone = &record.items[0];
    assert_eq!(phone.category, Category::Phone);
    assert_eq!(phone.name, "Vivo Y28");
    assert_eq!(phone.imei, vec!["111111111111111", "222222222222222"]);
    let charger_info = phone.charger.as_ref().unwrap();
    assert_eq!((charger_info.name.as_str(), charger_info.serial.as_str()), ("Fast Charger", "CHG001"));

    let charger = &record.items[1];
    assert_eq!(charger.category, Category::Charger);
    assert_eq!(charger.serial.as_deref(), Some("SN-33W-01"));
    assert!(charger.imei.is_empty());
}

#[test]
fn request_json_uses_flat_field_names() {
    let json = r#"{
        "customer_name": "Meena Devi",
        "customer_address": "Ward 5",
        "payment_mode": "EMI",
        "items": [
            {"category": "Charger", "item_name": "Cable", "quantity": 2, "price": 149.5,
             "serial_number": "C-1"}
        ]
    }"#;
    let req: InvoiceRequest = serde_json::from_str(json).unwrap();
    assert_eq!(req.payment_mode, PaymentMode::Emi);
    assert!(!req.items[0].charger_included);
    req.validate().unwrap();

    let unknown = json.replace("\"Charger\"", "\"Laptop\"");
    assert!(serde_json::from_str::<InvoiceRequest>(&unknown).is_err());
}

#[test]
fn negative_quantity_is_a_field_error() {
    let json = r#"{
        "customer_name": "Meena Devi",
        "customer_address": "Ward 5",
        "payment_mode": "Cash",
        "items": [
            {"category": "Charger", "item_name": "Cable", "quantity": -1, "price": 149.0,
             "serial_number": "C-1"}
        ]
    }"#;
    let req: InvoiceRequest = serde_json::from_str(json).unwrap();
    assert_eq!(
        violations(&req),
        vec![("items[0].quantity".to_string(), "Quantity must be at least 1".to_string())]
    );
}

#[test]
fn oversized_quantity_is_rejected() {
    let mut item = charger();
    item.quantity = u32::MAX as i64 + 1;
    assert_eq!(
        violations(&request(vec![item])),
        vec![("items[0].quantity".to_string(), "Quantity is too large".to_string())]
    );
}
