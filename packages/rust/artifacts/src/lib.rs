//! Templated output generation for Postforge.
//!
//! Pure renderers only: post pages, home/category feeds, the about page,
//! cards, and the sitemap, all produced by exact placeholder-token
//! replacement over fixed-format templates. Filesystem writes live in the
//! pipeline, not here.

pub mod cards;
pub mod post;
pub mod site;
pub mod templates;

pub use cards::{article_card, category_card};
pub use post::{PostTokens, related_posts_block, render_post};
pub use site::{render_about, render_category, render_index, render_sitemap};
pub use templates::{
    ABOUT_TEMPLATE, CATEGORY_TEMPLATE, INDEX_TEMPLATE, POST_TEMPLATE, POST_TOKENS, load_template,
    render, unresolved_tokens,
};
