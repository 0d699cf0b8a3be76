use serde::Serialize;

use super::state::EditSession;
use crate::services::{CampaignGroup, PaymentSummary, Settlement, SortSpec, Totals};

/// Everything the dashboard renders, computed from one state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub totals: Totals,
    pub payment_summary: PaymentSummary,
    pub settlement: Settlement,
    pub sort: SortSpec,
    pub editing: Option<EditSession>,
    pub campaigns: Vec<CampaignView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignView {
    #[serde(flatten)]
    pub group: CampaignGroup,
    pub payment_summary: PaymentSummary,
    pub settlement: Settlement,
    pub expanded: bool,
}
