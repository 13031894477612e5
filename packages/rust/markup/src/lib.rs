//! HTML-fragment passes over generated article bodies.
//!
//! Everything here is a pure transformation on the body fragment (plus the
//! probe-backed link validator): TOC building with heading id rewriting,
//! widget token substitution, FAQ and sources blocks, the monetization
//! callout, and outbound link sanitization.

pub mod blocks;
pub mod callout;
pub mod links;
pub mod toc;
pub mod widgets;

pub use blocks::{faq_blocks, sources_block};
pub use callout::{ProductRecommendation, insert_product_callout};
pub use links::{collect_external_links, validate_links};
pub use toc::{TocEntry, TocResult, build_toc};
pub use widgets::{BEAUFORT_TOKEN, CALCULATOR_TOKEN, embed_widgets};
