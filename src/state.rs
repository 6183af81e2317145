//! Shared state handed to every handler.

use std::sync::Arc;

use crate::config::Config;
use crate::features::FeatureFlags;
use crate::services::instamojo::PaymentGateway;
use crate::store::IncubatorStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn IncubatorStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub config: Arc<Config>,
    pub features: Arc<FeatureFlags>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn IncubatorStore>,
        gateway: Arc<dyn PaymentGateway>,
        config: Config,
    ) -> Self {
        let features = FeatureFlags::parse(&config.feature_flags);
        Self {
            store,
            gateway,
            config: Arc::new(config),
            features: Arc::new(features),
        }
    }
}
