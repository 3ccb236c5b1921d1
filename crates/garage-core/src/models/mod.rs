//! Data models for backend entities.
//!
//! - `Car`, `CarWithOwner`: car records, the latter with the denormalized
//!   owner name that list and search endpoints return
//! - `Owner`: owner records with their car collection
//! - Payloads: `CarCreate`, `CarUpdate`, `OwnerCreate`, `OwnerUpdate`
//! - Structured searches: `CarQuery`, `OwnerQuery`
//! - Statistics and service responses

pub mod car;
pub mod common;
pub mod owner;

pub use car::{Car, CarCreate, CarQuery, CarStatistics, CarSummary, CarUpdate, CarWithOwner};
pub use common::{MessageResponse, SortOrder, StatusResponse};
pub use owner::{Owner, OwnerCreate, OwnerQuery, OwnerStatistics, OwnerUpdate};

/// The two entity types the backend manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Cars,
    Owners,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Cars => "cars",
            EntityKind::Owners => "owners",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
