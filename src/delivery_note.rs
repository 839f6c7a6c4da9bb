//! Delivery notes ("surat jalan") printed for approved pre-orders.
//!
//! Rendering is read-only: nothing here writes back to the collections.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use crate::domain::PreOrder;

/// Sender details printed at the top of every note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryNoteHeader {
    pub issuer: String,
    pub city: String,
}

impl DeliveryNoteHeader {
    pub fn new(issuer: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            city: city.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryNoteLine {
    pub item_name: String,
    pub quantity: u32,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryNote {
    pub header: DeliveryNoteHeader,
    pub issued_on: NaiveDate,
    pub lines: Vec<DeliveryNoteLine>,
}

impl DeliveryNote {
    pub fn new(header: DeliveryNoteHeader, issued_on: NaiveDate, orders: &[PreOrder]) -> Self {
        let lines = orders
            .iter()
            .map(|order| DeliveryNoteLine {
                item_name: order.item_name.clone(),
                quantity: order.quantity,
                unit: order.unit.clone(),
            })
            .collect();
        Self {
            header,
            issued_on,
            lines,
        }
    }
}

pub trait DeliveryNoteRenderer {
    fn render(&self, note: &DeliveryNote) -> String;
}

/// Fixed-width text layout suitable for a receipt printer or a terminal.
#[derive(Debug, Clone)]
pub struct PlainTextRenderer {
    pub width: usize,
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self { width: 64 }
    }
}

impl PlainTextRenderer {
    fn two_columns(&self, out: &mut String, left: &str, right: &str) {
        let gap = self.width.saturating_sub(left.chars().count() + right.chars().count()).max(1);
        let _ = writeln!(out, "{}{}{}", left, " ".repeat(gap), right);
    }
}

impl DeliveryNoteRenderer for PlainTextRenderer {
    fn render(&self, note: &DeliveryNote) -> String {
        let mut out = String::new();
        let rule = "=".repeat(self.width);
        let dated = format!("{}, {}", note.header.city, note.issued_on.format("%-d %B %Y"));

        let _ = writeln!(out, "{}", rule);
        self.two_columns(&mut out, "SURAT JALAN", &note.header.issuer);
        self.two_columns(&mut out, "Delivery Order", &dated);
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out);
        let _ = writeln!(out, "Kepada Yth,");
        let _ = writeln!(out, "{}", "_".repeat(self.width / 2));
        let _ = writeln!(out);
        let _ = writeln!(out, "Dengan hormat,");
        let _ = writeln!(out, "Bersama ini kami kirimkan barang-barang sebagai berikut:");
        let _ = writeln!(out);

        let name_width = self.width.saturating_sub(22).max(12);
        let _ = writeln!(out, "{:<4}{:<name_width$}{:>8}  {}", "No", "Nama Barang", "Jumlah", "Satuan");
        let _ = writeln!(out, "{}", "-".repeat(self.width));
        for (index, line) in note.lines.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:<4}{:<name_width$}{:>8}  {}",
                index + 1,
                line.item_name,
                line.quantity,
                line.unit
            );
        }
        let _ = writeln!(out, "{}", "-".repeat(self.width));
        let _ = writeln!(out);
        let _ = writeln!(out, "Harap diterima dengan baik. Atas perhatiannya, kami ucapkan terima kasih.");
        let _ = writeln!(out);
        self.two_columns(&mut out, "Penerima,", "Hormat Kami,");
        let _ = writeln!(out);
        let _ = writeln!(out);
        self.two_columns(&mut out, "(.....................)", "(.....................)");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PreOrderStatus;
    use chrono::{TimeZone, Utc};

    fn approved(item_name: &str, quantity: u32, unit: &str) -> PreOrder {
        let at = Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap();
        PreOrder {
            id: format!("po_{}", quantity),
            item_id: "item_1".into(),
            item_name: item_name.into(),
            unit: unit.into(),
            quantity,
            order_date: at,
            expected_date: at,
            status: PreOrderStatus::Approved,
        }
    }

    #[test]
    fn test_note_lists_each_order_with_its_unit() {
        let orders = vec![approved("Ballpoint Pen", 12, "Box"), approved("A4 Paper", 5, "Ream")];
        let note = DeliveryNote::new(
            DeliveryNoteHeader::new("Stationery Inventory", "Jakarta"),
            NaiveDate::from_ymd_opt(2024, 5, 21).unwrap(),
            &orders,
        );
        assert_eq!(note.lines.len(), 2);
        assert_eq!(note.lines[1], DeliveryNoteLine { item_name: "A4 Paper".into(), quantity: 5, unit: "Ream".into() });

        let text = PlainTextRenderer::default().render(&note);
        assert!(text.contains("SURAT JALAN"));
        assert!(text.contains("Stationery Inventory"));
        assert!(text.contains("Jakarta, 21 May 2024"));
        assert!(text.lines().any(|l| l.starts_with("1") && l.contains("Ballpoint Pen") && l.contains("12") && l.ends_with("Box")));
        assert!(text.lines().any(|l| l.starts_with("2") && l.contains("A4 Paper") && l.ends_with("Ream")));
        assert!(text.contains("Hormat Kami,"));
    }
}
