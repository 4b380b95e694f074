use axum::extract::FromRef;
use std::sync::Arc;

use crate::config::Settings;
use crate::services::QaService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub qa_service: Arc<QaService>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(qa_service: Arc<QaService>, settings: Settings) -> Self {
        Self {
            qa_service,
            settings: Arc::new(settings),
        }
    }
}

impl FromRef<AppState> for Arc<QaService> {
    fn from_ref(state: &AppState) -> Self {
        state.qa_service.clone()
    }
}
