//! CloudWatch Contributor Insights settings.

use serde::{Deserialize, Serialize};

wire_enum! {
    /// Requested change.
    ContributorInsightsAction {
        Enable => "ENABLE",
        Disable => "DISABLE",
    }
}

wire_enum! {
    /// Current state of contributor insights for a table or index.
    ContributorInsightsStatus {
        Enabling => "ENABLING",
        Enabled => "ENABLED",
        Disabling => "DISABLING",
        Disabled => "DISABLED",
        Failed => "FAILED",
    }
}

/// One entry of `ListContributorInsights`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContributorInsightsSummary {
    pub table_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    pub contributor_insights_status: ContributorInsightsStatus,
}
