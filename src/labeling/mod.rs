//! Label ingestion and consensus

mod consensus;
mod ingest;

pub use consensus::{AuthorPolicy, Consensus, ConsensusEngine, ConsensusResult};
pub use ingest::{ReviewOutcome, SubmissionOutcome};
