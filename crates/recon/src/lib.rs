//! `nftcheck-recon`: cross-provider NFT sale reconciliation engine.
//!
//! Pure engine crate: receives raw vendor payloads, returns typed
//! reconciliation results. No network, CLI or configuration dependencies.

pub mod decimal;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod raw;
pub mod reconcile;
pub mod report;
pub mod sort;
pub mod window;

pub use error::ReconError;
pub use model::{IdentityKey, Mismatch, MismatchField, Reconciliation, Sale, Source, TokenId};
pub use pipeline::{RawInputs, RunReport, SourceSet};
pub use reconcile::reconcile;
pub use report::{PairReport, ReportSummary};
pub use window::TimeWindow;
