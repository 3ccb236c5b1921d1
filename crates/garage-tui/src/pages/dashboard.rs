use garage_core::cache::{QueryCache, QueryKey, QueryStatus};
use garage_core::models::{CarStatistics, EntityKind, OwnerStatistics};

/// Statistics overview: car totals and owners ranked by car count.
#[derive(Debug, Default)]
pub struct DashboardPage {
    pub selection: usize,
}

#[derive(Debug, PartialEq)]
pub enum DashboardView<'a> {
    Loading,
    Error(&'a str),
    Ready {
        cars: &'a CarStatistics,
        owners: Vec<&'a OwnerStatistics>,
        refreshing: bool,
    },
}

impl DashboardPage {
    pub fn car_key() -> QueryKey {
        QueryKey::statistics(EntityKind::Cars)
    }

    pub fn owner_key() -> QueryKey {
        QueryKey::statistics(EntityKind::Owners)
    }

    /// Both statistics must be present; owners are sorted by car count,
    /// then by name.
    pub fn view<'a>(
        &self,
        car_stats: &'a QueryCache<CarStatistics>,
        owner_stats: &'a QueryCache<Vec<OwnerStatistics>>,
    ) -> DashboardView<'a> {
        let car_key = Self::car_key();
        let owner_key = Self::owner_key();

        if let (Some(cars), Some(owners)) = (car_stats.data(&car_key), owner_stats.data(&owner_key)) {
            let mut owners: Vec<&OwnerStatistics> = owners.iter().collect();
            owners.sort_by(|a, b| {
                b.car_count
                    .cmp(&a.car_count)
                    .then_with(|| a.lastname.cmp(&b.lastname))
                    .then_with(|| a.firstname.cmp(&b.firstname))
            });
            return DashboardView::Ready {
                cars,
                owners,
                refreshing: car_stats.is_fetching(&car_key) || owner_stats.is_fetching(&owner_key),
            };
        }

        if car_stats.status(&car_key) == QueryStatus::Error {
            return DashboardView::Error(car_stats.error(&car_key).unwrap_or_default());
        }
        if owner_stats.status(&owner_key) == QueryStatus::Error {
            return DashboardView::Error(owner_stats.error(&owner_key).unwrap_or_default());
        }
        DashboardView::Loading
    }

    pub fn select_next(&mut self, len: usize) {
        if len > 0 {
            self.selection = (self.selection + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selection = self.selection.saturating_sub(1);
    }
}
