//! Campaign grouping and financial roll-ups.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::summary::PaymentSummary;
use super::tax;
use crate::models::{CampaignSeed, Invoice};

/// Identity of a campaign: the (company, campaign name) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CampaignKey {
    pub company: String,
    pub campaign_name: String,
}

impl CampaignKey {
    pub fn new(company: impl Into<String>, campaign_name: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            campaign_name: campaign_name.into(),
        }
    }

    pub fn of(invoice: &Invoice) -> Self {
        Self::new(invoice.company.clone(), invoice.campaign_name.clone())
    }
}

/// Revenue, expense, profit and margin over a set of invoices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub customer_revenue: Decimal,
    pub vendor_expense: Decimal,
    pub profit: Decimal,
    pub margin: Decimal,
}

impl Totals {
    pub fn add(&mut self, invoice: &Invoice) {
        self.customer_revenue += invoice.customer_received_amount_without_tax;
        self.vendor_expense += invoice.vendor_paid_amount_without_tax;
        self.profit = tax::profit(self.customer_revenue, self.vendor_expense);
        self.margin = tax::margin(self.profit, self.customer_revenue);
    }

    pub fn from_invoices<'a>(invoices: impl IntoIterator<Item = &'a Invoice>) -> Self {
        let mut totals = Self::default();
        for invoice in invoices {
            totals.add(invoice);
        }
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignGroup {
    #[serde(flatten)]
    pub key: CampaignKey,
    /// Date range of the first invoice seen for this campaign.
    pub date_from: String,
    pub date_to: String,
    pub invoices: Vec<Invoice>,
    pub totals: Totals,
}

impl CampaignGroup {
    fn start(invoice: &Invoice) -> Self {
        Self {
            key: CampaignKey::of(invoice),
            date_from: invoice.date_from.clone(),
            date_to: invoice.date_to.clone(),
            invoices: Vec::new(),
            totals: Totals::default(),
        }
    }

    fn push(&mut self, invoice: &Invoice) {
        self.totals.add(invoice);
        self.invoices.push(invoice.clone());
    }

    pub fn payment_summary(&self) -> PaymentSummary {
        PaymentSummary::from_invoices(&self.invoices)
    }

    /// Pre-fill values for a new invoice added to this campaign.
    pub fn seed(&self) -> CampaignSeed {
        CampaignSeed {
            company: self.key.company.clone(),
            campaign_name: self.key.campaign_name.clone(),
            date_from: self.date_from.clone(),
            date_to: self.date_to.clone(),
        }
    }
}

/// Partition `records` by campaign. Groups appear in first-occurrence order and
/// invoices keep their input order, so feed this sorted records to get a
/// sorted view.
pub fn group_by_campaign(records: &[Invoice]) -> Vec<CampaignGroup> {
    let mut groups: Vec<CampaignGroup> = Vec::new();
    let mut index: HashMap<CampaignKey, usize> = HashMap::new();

    for invoice in records {
        let key = CampaignKey::of(invoice);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(CampaignGroup::start(invoice));
            groups.len() - 1
        });
        groups[slot].push(invoice);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn invoice(company: &str, campaign: &str, received: Decimal, paid: Decimal) -> Invoice {
        let mut invoice = Invoice::draft(None);
        invoice.company = company.to_string();
        invoice.campaign_name = campaign.to_string();
        invoice.customer_received_amount_without_tax = received;
        invoice.vendor_paid_amount_without_tax = paid;
        invoice
    }

    #[test]
    fn totals_roll_up_revenue_and_expense() {
        let records = vec![
            invoice("Acme", "Spring", dec!(1000), dec!(600)),
            invoice("Acme", "Spring", dec!(2000), dec!(1000)),
        ];
        let groups = group_by_campaign(&records);
        assert_eq!(groups.len(), 1);

        let totals = groups[0].totals;
        assert_eq!(totals.customer_revenue, dec!(3000));
        assert_eq!(totals.vendor_expense, dec!(1600));
        assert_eq!(totals.profit, dec!(1400));
        assert_eq!(totals.margin.round_dp(1), dec!(46.7));
        assert_eq!(Totals::from_invoices(&records), totals);
    }

    #[test]
    fn zero_revenue_has_zero_margin() {
        let records = vec![invoice("Acme", "Spring", Decimal::ZERO, dec!(500))];
        let totals = Totals::from_invoices(&records);
        assert_eq!(totals.profit, dec!(-500));
        assert_eq!(totals.margin, Decimal::ZERO);
    }

    #[test]
    fn groups_keep_first_occurrence_order() {
        let records = vec![
            invoice("Beta", "Launch", dec!(1), dec!(0)),
            invoice("Acme", "Spring", dec!(2), dec!(0)),
            invoice("Beta", "Launch", dec!(3), dec!(0)),
        ];
        let groups = group_by_campaign(&records);
        let keys: Vec<_> = groups.iter().map(|g| g.key.company.as_str()).collect();
        assert_eq!(keys, vec!["Beta", "Acme"]);
        assert_eq!(groups[0].invoices.len(), 2);
        assert_eq!(groups[0].invoices[1].customer_received_amount_without_tax, dec!(3));
    }

    #[test]
    fn composite_key_does_not_collide() {
        // "A-B" + "C" and "A" + "B-C" would collide under naive concatenation
        let records = vec![
            invoice("A-B", "C", dec!(1), dec!(0)),
            invoice("A", "B-C", dec!(1), dec!(0)),
        ];
        assert_eq!(group_by_campaign(&records).len(), 2);
    }

    #[test]
    fn seed_carries_first_date_range() {
        let mut first = invoice("Acme", "Spring", dec!(1), dec!(0));
        first.date_from = "2024-03-01".to_string();
        first.date_to = "2024-03-31".to_string();
        let mut second = first.clone();
        second.date_from = "2024-04-01".to_string();

        let groups = group_by_campaign(&[first, second]);
        let seed = groups[0].seed();
        assert_eq!(seed.company, "Acme");
        assert_eq!(seed.date_from, "2024-03-01");
        assert_eq!(seed.date_to, "2024-03-31");
    }
}
