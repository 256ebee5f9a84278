//! Per-category detail lines drawn under an item's main row.

use crate::model::{Category, LineItem};

/// Only this many IMEIs are printed for a phone.
pub const MAX_IMEIS: usize = 2;

/// Indentation level of a detail line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    /// First level under the item name.
    Detail,
    /// Bullet under a detail label.
    Bullet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubLine {
    pub indent: Indent,
    pub text: String,
}

impl SubLine {
    fn detail(text: String) -> Self {
        SubLine {
            indent: Indent::Detail,
            text,
        }
    }

    fn bullet(text: String) -> Self {
        SubLine {
            indent: Indent::Bullet,
            text,
        }
    }
}

type SubLayout = fn(&LineItem) -> Vec<SubLine>;

/// Sub-layout for each category, in one table.
const SUB_LAYOUTS: [(Category, SubLayout); 3] = [
    (Category::Phone, phone_lines),
    (Category::Charger, charger_lines),
    (Category::Unknown, no_lines),
];

pub fn sub_layout_for(category: Category) -> SubLayout {
    SUB_LAYOUTS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, f)| *f)
        .unwrap_or(no_lines)
}

/// Detail lines for `item`, in drawing order.
pub fn sub_lines(item: &LineItem) -> Vec<SubLine> {
    sub_layout_for(item.category)(item)
}

fn phone_lines(item: &LineItem) -> Vec<SubLine> {
    let mut lines: Vec<SubLine> = item
        .imei
        .iter()
        .take(MAX_IMEIS)
        .enumerate()
        .map(|(i, imei)| SubLine::detail(format!("IMEI {}: {}", i + 1, imei)))
        .collect();

    if item.charger_included {
        if let Some(charger) = item.charger.as_ref().filter(|c| !c.is_blank()) {
            lines.push(SubLine::detail("Charger Included:".to_string()));
            lines.push(SubLine::bullet(format!("• {}", charger.name)));
            lines.push(SubLine::bullet(format!("• Serial: {}", charger.serial)));
        }
    }
    lines
}

fn charger_lines(item: &LineItem) -> Vec<SubLine> {
    item.serial
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| SubLine::detail(format!("Serial No: {s}")))
        .collect()
}

fn no_lines(_item: &LineItem) -> Vec<SubLine> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChargerInfo;

    fn phone(imeis: &[&str]) -> LineItem {
        let mut item = LineItem::new(Category::Phone, "Galaxy", 1, 100.0);
        item.imei = imeis.iter().map(|s| s.to_string()).collect();
        item
    }

    fn texts(lines: &[SubLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn phone_truncates_imeis() {
        let lines = sub_lines(&phone(&["111", "222", "333"]));
        assert_eq!(texts(&lines), vec!["IMEI 1: 111", "IMEI 2: 222"]);
    }

    #[test]
    fn phone_with_charger_adds_bullets() {
        let mut item = phone(&["111"]);
        item.charger_included = true;
        item.charger = Some(ChargerInfo {
            name: "Fast Charger".to_string(),
            serial: "CHG001".to_string(),
        });
        let lines = sub_lines(&item);
        assert_eq!(
            texts(&lines),
            vec![
                "IMEI 1: 111",
                "Charger Included:",
                "• Fast Charger",
                "• Serial: CHG001"
            ]
        );
        assert_eq!(lines[1].indent, Indent::Detail);
        assert_eq!(lines[2].indent, Indent::Bullet);
        assert_eq!(lines[3].indent, Indent::Bullet);
    }

    #[test]
    fn charger_flag_without_details_is_skipped() {
        let mut item = phone(&["111"]);
        item.charger_included = true;
        assert_eq!(texts(&sub_lines(&item)), vec!["IMEI 1: 111"]);
    }

    #[test]
    fn blank_charger_details_are_skipped() {
        let mut item = phone(&["111"]);
        item.charger_included = true;
        item.charger = Some(ChargerInfo {
            name: " ".to_string(),
            serial: String::new(),
        });
        assert_eq!(texts(&sub_lines(&item)), vec!["IMEI 1: 111"]);
    }

    #[test]
    fn partial_charger_details_still_print() {
        let mut item = phone(&[]);
        item.charger_included = true;
        item.charger = Some(ChargerInfo {
            name: "Fast Charger".to_string(),
            serial: String::new(),
        });
        assert_eq!(
            texts(&sub_lines(&item)),
            vec!["Charger Included:", "• Fast Charger", "• Serial: "]
        );
    }

    #[test]
    fn charger_details_ignored_when_not_included() {
        let mut item = phone(&[]);
        item.charger = Some(ChargerInfo::default());
        assert!(sub_lines(&item).is_empty());
    }

    #[test]
    fn charger_serial_line() {
        let mut item = LineItem::new(Category::Charger, "20W", 1, 999.0);
        assert!(sub_lines(&item).is_empty());
        item.serial = Some("SN-9".to_string());
        assert_eq!(texts(&sub_lines(&item)), vec!["Serial No: SN-9"]);
    }

    #[test]
    fn unknown_category_has_no_lines() {
        let mut item = LineItem::new(Category::Unknown, "Case", 1, 50.0);
        item.imei = vec!["111".to_string()];
        item.serial = Some("S".to_string());
        assert!(sub_lines(&item).is_empty());
    }

    #[test]
    fn every_category_has_an_entry() {
        for category in [Category::Phone, Category::Charger, Category::Unknown] {
            assert!(SUB_LAYOUTS.iter().any(|(c, _)| *c == category));
        }
    }
}
