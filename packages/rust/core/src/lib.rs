//! Pipeline orchestration for Postforge.
//!
//! One article per [`pipeline::Pipeline::run_one`] call: topic research →
//! drafting → fact-check → quality gate → monetization → image acquisition
//! → page assembly → link validation → persistence → index rebuild →
//! publish → notify. The [`runner`] repeats this N times per invocation
//! with a cooldown, isolating per-article failures.

pub mod assemble;
pub mod draft;
pub mod factcheck;
pub mod images;
pub mod monetize;
pub mod notify;
pub mod pipeline;
pub mod publish;
pub mod quality;
pub mod research;
pub mod runner;

#[cfg(test)]
pub(crate) mod testutil;

pub use notify::{LogNotifier, Notifier};
pub use pipeline::{Collaborators, Pipeline};
pub use publish::{GitPublisher, NoopPublisher, Publisher};
pub use runner::{RunSummary, run_many};
