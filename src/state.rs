use std::sync::Arc;

use reqwest::Client;

use crate::config::Config;
use crate::dashboard::labels::UiLabels;
use crate::dashboard::session::SessionStore;
use crate::diagnosis::DiagnosisService;
use crate::error::Result;
use crate::gemini::{GeminiClient, GenerativeModel};
use crate::mandi::PriceLookupService;
use crate::translate::TranslationService;

/// Everything both presentations share. Services are stateless; the session
/// store is the only mutable part.
pub struct AppState {
    pub config: Config,
    pub diagnosis: DiagnosisService,
    pub translation: TranslationService,
    pub prices: PriceLookupService,
    pub sessions: SessionStore,
    pub labels: UiLabels,
}

impl AppState {
    pub fn new(config: Config, client: Client) -> Result<Self> {
        let model = Arc::new(GeminiClient::new(client.clone(), &config));
        Self::with_model(config, client, model)
    }

    /// Same as `new`, with the hosted model swapped for any implementation.
    pub fn with_model(
        config: Config,
        client: Client,
        model: Arc<dyn GenerativeModel>,
    ) -> Result<Self> {
        Ok(Self {
            diagnosis: DiagnosisService::new(model.clone()),
            translation: TranslationService::new(model),
            prices: PriceLookupService::new(client, &config),
            sessions: SessionStore::new(),
            labels: UiLabels::builtin()?,
            config,
        })
    }
}
