//! Global tables (version 2017.11.29).
//!
//! Replicas are metadata only; nothing is replicated.

use serde::{Deserialize, Serialize};

wire_enum! {
    /// Status of a global table.
    GlobalTableStatus {
        Creating => "CREATING",
        Active => "ACTIVE",
        Deleting => "DELETING",
        Updating => "UPDATING",
    }
}

wire_enum! {
    /// Status of one replica.
    ReplicaStatus {
        Creating => "CREATING",
        Updating => "UPDATING",
        Deleting => "DELETING",
        Active => "ACTIVE",
    }
}

/// A replica region (input and `ListGlobalTables` output).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Replica {
    pub region_name: String,
}

/// A replica region with its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplicaDescription {
    pub region_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replica_status: Option<ReplicaStatus>,
}

/// Full description of a global table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalTableDescription {
    pub global_table_name: String,
    pub global_table_arn: String,
    pub global_table_status: GlobalTableStatus,
    pub creation_date_time: f64,
    pub replication_group: Vec<ReplicaDescription>,
}

/// One entry of `ListGlobalTables`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalTable {
    pub global_table_name: String,
    pub replication_group: Vec<Replica>,
}

impl GlobalTable {
    /// List entry for a stored description.
    #[must_use]
    pub fn from_description(desc: &GlobalTableDescription) -> Self {
        Self {
            global_table_name: desc.global_table_name.clone(),
            replication_group: desc
                .replication_group
                .iter()
                .map(|r| Replica {
                    region_name: r.region_name.clone(),
                })
                .collect(),
        }
    }
}

/// One replica change of `UpdateGlobalTable`: exactly one of `Create` / `Delete`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplicaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create: Option<Replica>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Replica>,
}
