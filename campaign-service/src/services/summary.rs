//! Customer payment status counts and the settlement state they imply.

use serde::Serialize;

use crate::models::{Invoice, PaymentStatus};

/// Customer-side payment status counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PaymentSummary {
    pub clear: usize,
    pub partial: usize,
    pub pending: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Settlement {
    NoData,
    AllClear,
    AllPending,
    Mixed { clear_percentage: u32 },
}

impl PaymentSummary {
    pub fn from_invoices<'a>(invoices: impl IntoIterator<Item = &'a Invoice>) -> Self {
        invoices
            .into_iter()
            .fold(Self::default(), |mut summary, invoice| {
                match invoice.customer_payment_status {
                    PaymentStatus::Clear => summary.clear += 1,
                    PaymentStatus::Partial => summary.partial += 1,
                    PaymentStatus::Pending => summary.pending += 1,
                }
                summary.total += 1;
                summary
            })
    }

    pub fn settlement(&self) -> Settlement {
        if self.total == 0 {
            Settlement::NoData
        } else if self.clear == self.total {
            Settlement::AllClear
        } else if self.pending == self.total {
            Settlement::AllPending
        } else {
            Settlement::Mixed {
                clear_percentage: self.clear_percentage(),
            }
        }
    }

    /// `round(clear / total × 100)`, halves rounded up.
    pub fn clear_percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let (clear, total) = (self.clear as u64, self.total as u64);
        ((clear * 200 + total) / (2 * total)) as u32
    }
}
