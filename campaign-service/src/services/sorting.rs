//! Ordering of invoice collections by a single column.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{FieldKind, FieldValue, Invoice, InvoiceField};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: InvoiceField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: InvoiceField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    pub fn new(field: InvoiceField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Selecting the current field flips direction; any other field starts ascending.
    pub fn toggle(self, field: InvoiceField) -> Self {
        if self.field == field {
            Self::new(field, self.direction.flipped())
        } else {
            Self::new(field, SortDirection::Asc)
        }
    }
}

/// A sorted copy of `records`. The input is left untouched and ties keep
/// their input order.
pub fn sort_invoices(records: &[Invoice], spec: SortSpec) -> Vec<Invoice> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| compare_invoices(a, b, spec));
    sorted
}

pub fn compare_invoices(a: &Invoice, b: &Invoice, spec: SortSpec) -> Ordering {
    let ordering = compare_values(
        spec.field.kind(),
        a.field_value(spec.field),
        b.field_value(spec.field),
    );
    match spec.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Ascending comparison; absent values sort before present ones.
fn compare_values(kind: FieldKind, a: Option<FieldValue<'_>>, b: Option<FieldValue<'_>>) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(_), None) => return Ordering::Greater,
        (Some(a), Some(b)) => (a, b),
    };

    match (kind, &a, &b) {
        (_, FieldValue::Number(x), FieldValue::Number(y)) => x.cmp(y),
        (FieldKind::Date | FieldKind::Timestamp, FieldValue::Text(x), FieldValue::Text(y)) => {
            // Parseable values sort before unparseable ones; only the latter compare as text.
            match (parse_instant(x), parse_instant(y)) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => locale_cmp(x, y),
            }
        }
        _ => locale_cmp(&a.to_text(), &b.to_text()),
    }
}

/// Case-insensitive comparison, with lowercase ahead of uppercase on ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Seconds since the epoch for an RFC 3339 timestamp or a `YYYY-MM-DD` date.
fn parse_instant(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.timestamp());
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn invoice(id: &str) -> Invoice {
        let mut invoice = Invoice::draft(None);
        invoice.id = id.to_string();
        invoice
    }

    fn ids(records: &[Invoice]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn absent_values_lead_ascending_and_trail_descending() {
        let mut a = invoice("a");
        a.profit = None;
        let mut b = invoice("b");
        b.profit = Some(dec!(5));
        let mut c = invoice("c");
        c.profit = Some(dec!(2));
        let records = vec![a, b, c];

        let asc = sort_invoices(&records, SortSpec::new(InvoiceField::Profit, SortDirection::Asc));
        assert_eq!(ids(&asc), vec!["a", "c", "b"]);

        let desc = sort_invoices(&records, SortSpec::new(InvoiceField::Profit, SortDirection::Desc));
        assert_eq!(ids(&desc), vec!["b", "c", "a"]);

        // input untouched
        assert_eq!(ids(&records), vec!["a", "b", "c"]);
    }

    #[test]
    fn dates_compare_chronologically() {
        let mut a = invoice("a");
        a.date_from = "2024-10-01".to_string();
        let mut b = invoice("b");
        b.date_from = "2024-02-15".to_string();
        let mut c = invoice("c");
        c.date_from = "2023-12-31".to_string();

        let sorted = sort_invoices(
            &[a, b, c],
            SortSpec::new(InvoiceField::DateFrom, SortDirection::Asc),
        );
        assert_eq!(ids(&sorted), vec!["c", "b", "a"]);
    }

    #[test]
    fn timestamps_with_offsets_compare_as_instants() {
        let mut a = invoice("a");
        a.created_at = Some("2024-03-01T10:00:00+05:30".to_string());
        let mut b = invoice("b");
        b.created_at = Some("2024-03-01T05:00:00Z".to_string());

        let sorted = sort_invoices(&[a, b], SortSpec::default());
        // 10:00+05:30 is 04:30Z, so b is newer
        assert_eq!(ids(&sorted), vec!["b", "a"]);
    }

    #[test]
    fn unparseable_dates_sort_after_real_ones() {
        let mut a = invoice("a");
        a.date_to = "soon".to_string();
        let mut b = invoice("b");
        b.date_to = "2024-01-01".to_string();

        let sorted = sort_invoices(
            &[a, b],
            SortSpec::new(InvoiceField::DateTo, SortDirection::Asc),
        );
        assert_eq!(ids(&sorted), vec!["b", "a"]);
    }

    #[test]
    fn mixed_date_values_order_transitively() {
        let values = ["2024-10-01", "2024-9-30", "2024-9", "later", "2023-01-05"];
        let records: Vec<Invoice> = values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let mut record = invoice(&i.to_string());
                record.date_from = value.to_string();
                record
            })
            .collect();
        let spec = SortSpec::new(InvoiceField::DateFrom, SortDirection::Asc);

        for a in &records {
            for b in &records {
                for c in &records {
                    let ab = compare_invoices(a, b, spec);
                    let bc = compare_invoices(b, c, spec);
                    if ab != Ordering::Greater && bc != Ordering::Greater {
                        assert_ne!(compare_invoices(a, c, spec), Ordering::Greater);
                    }
                }
                assert_eq!(
                    compare_invoices(a, b, spec),
                    compare_invoices(b, a, spec).reverse()
                );
            }
        }

        let sorted = sort_invoices(&records, spec);
        let dates: Vec<&str> = sorted.iter().map(|r| r.date_from.as_str()).collect();
        assert_eq!(
            dates,
            vec!["2023-01-05", "2024-9-30", "2024-10-01", "2024-9", "later"]
        );
    }

    #[test]
    fn equal_timestamps_end_up_adjacent() {
        let stamps = [
            "2024-03-01T10:00:00+05:30",
            "not a timestamp",
            "2024-03-01T05:00:00Z",
        ];
        let records: Vec<Invoice> = (0..60)
            .map(|i| {
                let mut record = invoice(&i.to_string());
                record.created_at = Some(stamps[i % stamps.len()].to_string());
                record
            })
            .collect();

        let sorted = sort_invoices(&records, SortSpec::default());
        let mut runs: Vec<&str> = sorted
            .iter()
            .filter_map(|r| r.created_at.as_deref())
            .collect();
        runs.dedup();
        assert_eq!(
            runs,
            vec![
                "not a timestamp",
                "2024-03-01T05:00:00Z",
                "2024-03-01T10:00:00+05:30"
            ]
        );
    }

    #[test]
    fn text_ignores_case_first() {
        let mut a = invoice("a");
        a.company = "beta".to_string();
        let mut b = invoice("b");
        b.company = "Alpha".to_string();
        let mut c = invoice("c");
        c.company = "alpha".to_string();

        let sorted = sort_invoices(
            &[a, b, c],
            SortSpec::new(InvoiceField::Company, SortDirection::Asc),
        );
        assert_eq!(ids(&sorted), vec!["c", "b", "a"]);
    }

    #[test]
    fn numbers_compare_numerically() {
        let mut a = invoice("a");
        a.customer_amount_without_tax = dec!(900);
        let mut b = invoice("b");
        b.customer_amount_without_tax = dec!(10000);

        let sorted = sort_invoices(
            &[b, a],
            SortSpec::new(InvoiceField::CustomerAmountWithoutTax, SortDirection::Asc),
        );
        assert_eq!(ids(&sorted), vec!["a", "b"]);
    }

    #[test]
    fn toggle_flips_or_switches() {
        let spec = SortSpec::default();
        assert_eq!(spec.toggle(InvoiceField::CreatedAt).direction, SortDirection::Asc);

        let switched = spec.toggle(InvoiceField::Company);
        assert_eq!(switched, SortSpec::new(InvoiceField::Company, SortDirection::Asc));
        assert_eq!(switched.toggle(InvoiceField::Company).direction, SortDirection::Desc);
    }
}
