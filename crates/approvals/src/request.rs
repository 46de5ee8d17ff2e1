use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{ActorId, CloseRequestId, DomainError, DomainResult, PeriodId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseRequestStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl CloseRequestStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// Approval record for closing one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseRequest {
    pub id: CloseRequestId,
    pub period_id: PeriodId,
    pub status: CloseRequestStatus,
    pub requested_by: ActorId,
    pub created_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub decided_by: Option<ActorId>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl CloseRequest {
    pub fn draft(period_id: PeriodId, requested_by: ActorId) -> Self {
        Self {
            id: CloseRequestId::new(),
            period_id,
            status: CloseRequestStatus::Draft,
            requested_by,
            created_at: Utc::now(),
            submitted_at: None,
            decided_by: None,
            decided_at: None,
        }
    }

    pub fn submit(&mut self) -> DomainResult<()> {
        if self.status != CloseRequestStatus::Draft {
            return Err(DomainError::invariant(format!(
                "cannot submit a {:?} close request",
                self.status
            )));
        }
        self.status = CloseRequestStatus::Submitted;
        self.submitted_at = Some(Utc::now());
        Ok(())
    }

    pub fn approve(&mut self, decided_by: ActorId) -> DomainResult<()> {
        self.decide(CloseRequestStatus::Approved, decided_by)
    }

    pub fn reject(&mut self, decided_by: ActorId) -> DomainResult<()> {
        self.decide(CloseRequestStatus::Rejected, decided_by)
    }

    fn decide(&mut self, to: CloseRequestStatus, decided_by: ActorId) -> DomainResult<()> {
        if self.status != CloseRequestStatus::Submitted {
            return Err(DomainError::invariant(format!(
                "cannot decide a {:?} close request",
                self.status
            )));
        }
        self.status = to;
        self.decided_by = Some(decided_by);
        self.decided_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_draft_submit_approve() {
        let mut req = CloseRequest::draft(PeriodId::new(), ActorId::new());
        assert_eq!(req.status, CloseRequestStatus::Draft);

        req.submit().unwrap();
        assert_eq!(req.status, CloseRequestStatus::Submitted);

        let approver = ActorId::new();
        req.approve(approver).unwrap();
        assert_eq!(req.status, CloseRequestStatus::Approved);
        assert_eq!(req.decided_by, Some(approver));
        assert!(req.status.is_terminal());
    }

    #[test]
    fn cannot_approve_a_draft() {
        let mut req = CloseRequest::draft(PeriodId::new(), ActorId::new());
        assert!(matches!(
            req.approve(ActorId::new()).unwrap_err(),
            DomainError::InvariantViolation(_)
        ));
    }

    #[test]
    fn cannot_submit_twice() {
        let mut req = CloseRequest::draft(PeriodId::new(), ActorId::new());
        req.submit().unwrap();
        assert!(req.submit().is_err());
    }

    #[test]
    fn rejected_is_terminal() {
        let mut req = CloseRequest::draft(PeriodId::new(), ActorId::new());
        req.submit().unwrap();
        req.reject(ActorId::new()).unwrap();
        assert!(req.status.is_terminal());
        assert!(req.approve(ActorId::new()).is_err());
    }
}
