use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::engine::resolver::ClinicalMappingResolver;
use crate::llm::factory::CompletionClientFactory;
use crate::store::TranslationStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub resolver: Arc<ClinicalMappingResolver>,
    pub store: TranslationStore,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let timeout = Duration::from_millis(config.engine_config.llm_timeout_ms);
        let client = CompletionClientFactory::create(&config.llm_config, timeout)?;
        let resolver = Arc::new(ClinicalMappingResolver::new(
            client,
            config.engine_config.clone(),
        ));

        Ok(Self {
            config,
            resolver,
            store: TranslationStore::new(),
        })
    }
}
