use std::collections::HashMap;
use std::sync::RwLock;

use stockbook_core::{CloseRequestId, DomainError, DomainResult, PeriodId};

use crate::request::CloseRequest;

/// Storage for close requests.
pub trait CloseRequestStore: Send + Sync {
    fn insert(&self, request: CloseRequest) -> DomainResult<()>;
    fn update(&self, request: CloseRequest) -> DomainResult<()>;
    fn get(&self, id: CloseRequestId) -> Option<CloseRequest>;
    fn for_period(&self, period_id: PeriodId) -> Vec<CloseRequest>;
}

/// In-memory close-request store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCloseRequestStore {
    requests: RwLock<HashMap<CloseRequestId, CloseRequest>>,
}

impl InMemoryCloseRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CloseRequestStore for InMemoryCloseRequestStore {
    fn insert(&self, request: CloseRequest) -> DomainResult<()> {
        let mut requests = self.requests.write().unwrap_or_else(|e| e.into_inner());
        if requests.contains_key(&request.id) {
            return Err(DomainError::conflict("close request id already exists"));
        }
        requests.insert(request.id, request);
        Ok(())
    }

    fn update(&self, request: CloseRequest) -> DomainResult<()> {
        let mut requests = self.requests.write().unwrap_or_else(|e| e.into_inner());
        if !requests.contains_key(&request.id) {
            return Err(DomainError::not_found());
        }
        requests.insert(request.id, request);
        Ok(())
    }

    fn get(&self, id: CloseRequestId) -> Option<CloseRequest> {
        let requests = self.requests.read().unwrap_or_else(|e| e.into_inner());
        requests.get(&id).cloned()
    }

    fn for_period(&self, period_id: PeriodId) -> Vec<CloseRequest> {
        let requests = self.requests.read().unwrap_or_else(|e| e.into_inner());
        let mut out: Vec<_> = requests
            .values()
            .filter(|r| r.period_id == period_id)
            .cloned()
            .collect();
        out.sort_by_key(|r| r.created_at);
        out
    }
}
