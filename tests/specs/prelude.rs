//! Shared helpers for specs

use rx_reindex::{
    FakeIdSource, FakeReindexService, FakeTransactionManager, ReindexConfig, ReindexError,
    ReindexManager,
};

pub type FakeManager = ReindexManager<FakeReindexService, FakeTransactionManager>;

/// A run over `source` with its fakes, ready to start
pub struct Run {
    pub manager: FakeManager,
    pub service: FakeReindexService,
    pub tx_manager: FakeTransactionManager,
}

impl Run {
    pub fn build(source: FakeIdSource, config: ReindexConfig) -> Result<Self, ReindexError> {
        let service = FakeReindexService::new();
        let tx_manager = FakeTransactionManager::new();
        let manager = ReindexManager::new(source, service.clone(), tx_manager.clone(), config)?;
        Ok(Self {
            manager,
            service,
            tx_manager,
        })
    }
}

pub fn config(workers: usize, batch_size: usize, fail_on_error: bool) -> ReindexConfig {
    ReindexConfig::new()
        .with_workers(workers)
        .with_batch_size(batch_size)
        .with_fail_on_error(fail_on_error)
}
