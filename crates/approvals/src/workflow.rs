use thiserror::Error;
use tracing::info;

use stockbook_core::{
    Actor, ActorId, CloseRequestId, DomainError, DomainResult, PeriodId, PrivilegeLevel,
    validate_reason,
};

use crate::request::{CloseRequest, CloseRequestStatus};
use crate::store::CloseRequestStore;

/// Why a close attempt was not authorized.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApprovalError {
    /// No approved request exists and no valid force-close was supplied.
    /// Recoverable: submit and approve a request, or force-close with the
    /// required privilege.
    #[error("approval required: {0}")]
    Required(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Proof that a close attempt passed the approval gate.
///
/// Force-close is deliberately a distinct variant, not a flag: the two paths
/// have different audit semantics and the period manager records them
/// differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseAuthorization {
    /// An APPROVED close request exists for the period.
    Approved { request_id: CloseRequestId },
    /// A privileged actor bypassed the workflow with a recorded reason.
    ForceClose { actor: Actor, reason: String },
}

/// The approval workflow service.
pub struct ApprovalWorkflow<S: CloseRequestStore> {
    store: S,
}

impl<S: CloseRequestStore> ApprovalWorkflow<S> {
    /// Privilege tier allowed to decide (approve/reject) a close request.
    pub const DECIDER_LEVEL: PrivilegeLevel = PrivilegeLevel::Manager;
    /// Privilege tier allowed to bypass the workflow. The highest tier.
    pub const FORCE_CLOSE_LEVEL: PrivilegeLevel = PrivilegeLevel::Admin;

    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Open a DRAFT request. A period may have at most one non-terminal
    /// request at a time.
    pub fn create_draft(
        &self,
        period_id: PeriodId,
        requested_by: ActorId,
    ) -> DomainResult<CloseRequest> {
        let open = self
            .store
            .for_period(period_id)
            .into_iter()
            .find(|r| !r.status.is_terminal());
        if let Some(existing) = open {
            return Err(DomainError::conflict(format!(
                "period already has a {:?} close request {}",
                existing.status, existing.id
            )));
        }

        let request = CloseRequest::draft(period_id, requested_by);
        self.store.insert(request.clone())?;
        info!(request_id = %request.id, period_id = %period_id, "close request drafted");
        Ok(request)
    }

    pub fn submit(&self, request_id: CloseRequestId) -> DomainResult<CloseRequest> {
        let mut request = self.store.get(request_id).ok_or(DomainError::NotFound)?;
        request.submit()?;
        self.store.update(request.clone())?;
        info!(request_id = %request.id, "close request submitted");
        Ok(request)
    }

    pub fn approve(&self, request_id: CloseRequestId, decider: &Actor) -> DomainResult<CloseRequest> {
        self.decide(request_id, decider, CloseRequestStatus::Approved)
    }

    pub fn reject(&self, request_id: CloseRequestId, decider: &Actor) -> DomainResult<CloseRequest> {
        self.decide(request_id, decider, CloseRequestStatus::Rejected)
    }

    fn decide(
        &self,
        request_id: CloseRequestId,
        decider: &Actor,
        to: CloseRequestStatus,
    ) -> DomainResult<CloseRequest> {
        if !decider.level.is_at_least(Self::DECIDER_LEVEL) {
            return Err(DomainError::Unauthorized);
        }
        let mut request = self.store.get(request_id).ok_or(DomainError::NotFound)?;
        match to {
            CloseRequestStatus::Approved => request.approve(decider.id)?,
            CloseRequestStatus::Rejected => request.reject(decider.id)?,
            _ => return Err(DomainError::invariant("not a decision status")),
        }
        self.store.update(request.clone())?;
        info!(request_id = %request.id, status = ?request.status, decider = %decider.id, "close request decided");
        Ok(request)
    }

    /// Authorize an ordinary close: an APPROVED request must exist.
    pub fn authorize_close(&self, period_id: PeriodId) -> Result<CloseAuthorization, ApprovalError> {
        let approved = self
            .store
            .for_period(period_id)
            .into_iter()
            .find(|r| r.status == CloseRequestStatus::Approved);
        match approved {
            Some(request) => Ok(CloseAuthorization::Approved {
                request_id: request.id,
            }),
            None => Err(ApprovalError::Required(
                "no approved close request for this period".to_string(),
            )),
        }
    }

    /// Authorize a force-close: highest privilege tier plus a non-trivial
    /// reason. The caller must audit the bypass as an override event.
    pub fn authorize_force_close(
        &self,
        period_id: PeriodId,
        actor: &Actor,
        reason: &str,
    ) -> Result<CloseAuthorization, ApprovalError> {
        validate_reason(reason)
            .map_err(|e| ApprovalError::Required(format!("force-close rejected: {e}")))?;
        if !actor.level.is_at_least(Self::FORCE_CLOSE_LEVEL) {
            return Err(ApprovalError::Required(format!(
                "force-close requires {:?} privilege",
                Self::FORCE_CLOSE_LEVEL
            )));
        }
        info!(period_id = %period_id, actor = %actor.id, "force-close authorized, bypassing approval workflow");
        Ok(CloseAuthorization::ForceClose {
            actor: actor.clone(),
            reason: reason.to_string(),
        })
    }

    pub fn requests_for(&self, period_id: PeriodId) -> Vec<CloseRequest> {
        self.store.for_period(period_id)
    }
}
