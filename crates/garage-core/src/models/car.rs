use serde::{Deserialize, Serialize};

use super::common::SortOrder;

/// A car as returned by create/update endpoints and embedded in owners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub brand: String,
    pub model: String,
    pub color: String,
    #[serde(rename = "registrationNumber")]
    pub registration_number: String,
    #[serde(rename = "modelYear")]
    pub model_year: i32,
    pub price: i64,
    pub owner_id: i64,
}

impl Car {
    pub fn title(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}

/// A car as returned by list, get, and search endpoints.
///
/// The backend denormalizes the owner's display name into `owner`; it is
/// `None` when the car has no owner loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarWithOwner {
    pub id: i64,
    pub brand: String,
    pub model: String,
    pub color: String,
    #[serde(rename = "registrationNumber")]
    pub registration_number: String,
    #[serde(rename = "modelYear")]
    pub model_year: i32,
    pub price: i64,
    pub owner_id: i64,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub owner_firstname: Option<String>,
    #[serde(default)]
    pub owner_lastname: Option<String>,
}

impl CarWithOwner {
    pub fn title(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }

    /// Owner display name, preferring the denormalized full name.
    pub fn owner_name(&self) -> Option<String> {
        if let Some(ref name) = self.owner {
            if !name.trim().is_empty() {
                return Some(name.clone());
            }
        }
        match (&self.owner_firstname, &self.owner_lastname) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => None,
        }
    }
}

/// Body for `POST /cars`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarCreate {
    pub brand: String,
    pub model: String,
    pub color: String,
    #[serde(rename = "registrationNumber")]
    pub registration_number: String,
    #[serde(rename = "modelYear")]
    pub model_year: i32,
    pub price: i64,
    pub owner_id: i64,
}

/// Body for `PUT /cars/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "registrationNumber", skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(rename = "modelYear", skip_serializing_if = "Option::is_none")]
    pub model_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
}

impl From<CarCreate> for CarUpdate {
    fn from(car: CarCreate) -> Self {
        Self {
            brand: Some(car.brand),
            model: Some(car.model),
            color: Some(car.color),
            registration_number: Some(car.registration_number),
            model_year: Some(car.model_year),
            price: Some(car.price),
            owner_id: Some(car.owner_id),
        }
    }
}

/// Body for `POST /cars/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "modelYear", skip_serializing_if = "Option::is_none")]
    pub model_year: Option<i32>,
    #[serde(rename = "minPrice", skip_serializing_if = "Option::is_none")]
    pub min_price: Option<i64>,
    #[serde(rename = "maxPrice", skip_serializing_if = "Option::is_none")]
    pub max_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub limit: u32,
    pub offset: u32,
}

impl Default for CarQuery {
    fn default() -> Self {
        Self {
            brand: None,
            color: None,
            model_year: None,
            min_price: None,
            max_price: None,
            owner_id: None,
            sort_by: "id".to_string(),
            sort_order: SortOrder::Asc,
            limit: 100,
            offset: 0,
        }
    }
}

/// Minimal car description used by statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarSummary {
    pub id: i64,
    pub brand: String,
    pub model: String,
    pub price: i64,
}

/// Response of `GET /cars/statistics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarStatistics {
    pub total_cars: i64,
    pub total_owners: i64,
    pub average_price: f64,
    #[serde(default)]
    pub most_expensive: Option<CarSummary>,
    #[serde(default)]
    pub cheapest: Option<CarSummary>,
}
