//! Application-wide services.
//!
//! These are plain structs created once at startup and passed by reference
//! to whatever needs them. `Services::dispose` writes back the pieces that
//! outlive the process.

pub mod auth;
pub mod notifications;
pub mod theme;

pub use auth::AuthContext;
pub use notifications::{Notification, NotificationLevel, Notifications, NOTIFICATION_TTL};
pub use theme::Theme;

use crate::cache::PersistedStore;
use crate::config::Config;

#[derive(Debug)]
pub struct Services {
    pub notifications: Notifications,
    pub theme: Theme,
    pub auth: AuthContext,
    pub store: PersistedStore,
}

impl Services {
    pub fn init(config: &Config, auth: AuthContext, store: PersistedStore) -> Self {
        Self {
            notifications: Notifications::new(),
            theme: config.theme,
            auth,
            store,
        }
    }

    /// Copy service state that belongs in the config file back into it.
    pub fn dispose(&mut self, config: &mut Config) {
        config.theme = self.theme;
        self.notifications.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_and_dispose_round_trip_theme() {
        let dir = TempDir::new().unwrap();
        let mut config = Config {
            theme: Theme::Dark,
            ..Default::default()
        };
        let mut services = Services::init(
            &config,
            AuthContext::default(),
            PersistedStore::in_dir(dir.path()),
        );
        assert_eq!(services.theme, Theme::Dark);

        services.theme = services.theme.toggle();
        services.dispose(&mut config);
        assert_eq!(config.theme, Theme::Light);
    }
}
