//! Monetization callout insertion.
//!
//! The callout lands immediately after the paragraph that follows the
//! second `<h2>`. With fewer than two headings it is appended at the end;
//! with no paragraph after the second heading it goes right after the
//! heading itself.

use std::sync::LazyLock;

use regex::Regex;

/// A vetted product recommendation (URL already domain-checked and probed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecommendation {
    pub name: String,
    pub url: String,
    /// Display price, e.g. `"ca. 25 Euro"`.
    pub price: String,
    /// One-sentence reason the product fits the article.
    pub reason: String,
}

static H2_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h2[^>]*>").expect("valid regex"));

/// Render the fixed-format callout block.
fn callout_html(product: &ProductRecommendation) -> String {
    format!(
        r#"<div class="product-callout"><div class="product-callout-label">Empfehlung aus der Praxis</div><div class="product-callout-body"><a href="{}" rel="sponsored nofollow noopener" target="_blank">{}</a> ({}) &mdash; {}</div></div>"#,
        product.url, product.name, product.price, product.reason
    )
}

/// Insert the callout into the article body.
pub fn insert_product_callout(content: &str, product: &ProductRecommendation) -> String {
    let callout = callout_html(product);

    let mut h2_iter = H2_OPEN_RE.find_iter(content);
    let second_h2 = h2_iter.nth(1);

    let Some(second_h2) = second_h2 else {
        // Fewer than two structural headings: append.
        return format!("{content}\n{callout}");
    };

    let after_heading = &content[second_h2.end()..];
    let insert_at = match after_heading.find("</p>") {
        Some(p_end) => second_h2.end() + p_end + "</p>".len(),
        // No paragraph after the second heading: insert after its close tag.
        None => match after_heading.find("</h2>") {
            Some(h_end) => second_h2.end() + h_end + "</h2>".len(),
            None => content.len(),
        },
    };

    let mut out = String::with_capacity(content.len() + callout.len() + 1);
    out.push_str(&content[..insert_at]);
    out.push('\n');
    out.push_str(&callout);
    out.push_str(&content[insert_at..]);
    out
}
