//! `stockbook-blockers` — blocking-state validation for period close.
//!
//! A pure read-only scan over collaborating subsystems (stocktakes,
//! production, transfers, adjustments, GL postings) classifying a candidate
//! period as READY, WARNING or BLOCKED. Rules are declarative and
//! independent: each yields at most one report item, and adding a rule never
//! touches the others.

pub mod report;
pub mod rules;
pub mod sources;
pub mod validator;

pub use report::{BlockerItem, BlockerSeverity, BlockingState, BlockingStateReport, SAMPLE_LIMIT};
pub use rules::{standard_rules, BlockerRule};
pub use sources::{
    AdjustmentDoc, AdjustmentSource, AdjustmentStatus, GlDoc, GlDocKind, GlPostingSource,
    GlPostingStatus, InMemorySources, ProductionDoc, ProductionSource, ProductionStatus, Sources,
    StocktakeDoc, StocktakeSource, StocktakeStatus, TransferDoc, TransferSource, TransferStatus,
};
pub use validator::BlockingStateValidator;
