use serde::{Deserialize, Serialize};

use crate::models::InvoiceField;
use crate::services::{ImportReport, SortDirection, SortSpec};

/// `GET /dashboard` query. Without `sort` the default order applies.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub sort: Option<InvoiceField>,
    pub direction: Option<SortDirection>,
    #[serde(default)]
    pub expand_all: bool,
}

impl DashboardQuery {
    pub fn sort_spec(&self) -> SortSpec {
        match self.sort {
            Some(field) => SortSpec::new(field, self.direction.unwrap_or(SortDirection::Asc)),
            None => SortSpec {
                direction: self.direction.unwrap_or_default(),
                ..SortSpec::default()
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: ImportReport,
}

impl From<ImportReport> for ImportResponse {
    fn from(report: ImportReport) -> Self {
        Self {
            message: report.message(),
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_field_defaults_to_ascending() {
        let query = DashboardQuery {
            sort: Some(InvoiceField::Company),
            ..Default::default()
        };
        assert_eq!(
            query.sort_spec(),
            SortSpec::new(InvoiceField::Company, SortDirection::Asc)
        );
    }

    #[test]
    fn no_field_means_newest_first() {
        assert_eq!(DashboardQuery::default().sort_spec(), SortSpec::default());
    }
}
