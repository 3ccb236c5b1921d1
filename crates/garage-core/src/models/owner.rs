use serde::{Deserialize, Serialize};

use super::car::Car;
use super::common::SortOrder;

/// An owner with the cars the backend has attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub ownerid: i64,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub cars: Vec<Car>,
}

impl Owner {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }

    pub fn car_count(&self) -> usize {
        self.cars.len()
    }

    /// Deleting this owner also removes its cars on the backend.
    pub fn has_cars(&self) -> bool {
        !self.cars.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerCreate {
    pub firstname: String,
    pub lastname: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
}

impl From<OwnerCreate> for OwnerUpdate {
    fn from(owner: OwnerCreate) -> Self {
        Self {
            firstname: Some(owner.firstname),
            lastname: Some(owner.lastname),
        }
    }
}

/// Body for `POST /owners/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    /// Matches either name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub limit: u32,
    pub offset: u32,
}

impl Default for OwnerQuery {
    fn default() -> Self {
        Self {
            firstname: None,
            lastname: None,
            search: None,
            sort_by: "ownerid".to_string(),
            sort_order: SortOrder::Asc,
            limit: 100,
            offset: 0,
        }
    }
}

/// One row of `GET /owners/statistics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerStatistics {
    pub ownerid: i64,
    pub firstname: String,
    pub lastname: String,
    pub car_count: i64,
}

impl OwnerStatistics {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}
