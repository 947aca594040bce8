use std::sync::Arc;

use crate::auth::notifier::{LogNotifier, ResetNotifier};
use crate::auth::repo_types::User;
use crate::config::AppConfig;
use crate::items::repo_types::Item;
use crate::restaurants::repo_types::Restaurant;
use crate::storage::{Collection, JsonFileStore, RecordStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<Collection<User>>,
    pub restaurants: Arc<Collection<Restaurant>>,
    pub items: Arc<Collection<Item>>,
    pub notifier: Arc<dyn ResetNotifier>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let users: Arc<dyn RecordStore<User>> = Arc::new(JsonFileStore::new(config.users_path()));
        let restaurants: Arc<dyn RecordStore<Restaurant>> =
            Arc::new(JsonFileStore::new(config.restaurants_path()));
        let items: Arc<dyn RecordStore<Item>> = Arc::new(JsonFileStore::new(config.items_path()));
        let notifier: Arc<dyn ResetNotifier> =
            Arc::new(LogNotifier::new(config.public_base_url.clone()));

        tracing::info!(data_dir = %config.data_dir.display(), "json record stores ready");
        Ok(Self::from_parts(config, users, restaurants, items, notifier))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn RecordStore<User>>,
        restaurants: Arc<dyn RecordStore<Restaurant>>,
        items: Arc<dyn RecordStore<Item>>,
        notifier: Arc<dyn ResetNotifier>,
    ) -> Self {
        Self {
            config,
            users: Arc::new(Collection::new("users", users)),
            restaurants: Arc::new(Collection::new("restaurants", restaurants)),
            items: Arc::new(Collection::new("items", items)),
            notifier,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let notifier = Arc::new(LogNotifier::new("https://fake.local")) as Arc<dyn ResetNotifier>;
        Self::fake_with_notifier(notifier)
    }

    #[cfg(test)]
    pub fn fake_with_notifier(notifier: Arc<dyn ResetNotifier>) -> Self {
        use crate::config::TokenConfig;
        use crate::storage::MemoryStore;

        let config = Arc::new(AppConfig {
            data_dir: "fake".into(),
            public_base_url: "https://fake.local".into(),
            tokens: TokenConfig::default(),
        });
        Self::from_parts(
            config,
            Arc::new(MemoryStore::<User>::default()),
            Arc::new(MemoryStore::<Restaurant>::default()),
            Arc::new(MemoryStore::<Item>::default()),
            notifier,
        )
    }
}
