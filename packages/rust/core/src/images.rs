//! Hero image acquisition: ordered fallback chain, first success wins.
//!
//! The primary generator is retried once with a simplified prompt; the
//! remaining generators get one attempt each; the deterministic SVG
//! placeholder closes the chain unconditionally. Every attempt is wrapped,
//! so this stage always yields bytes.

use tracing::{debug, info, instrument, warn};

use postforge_adapters::{ImageGenerator, placeholder_svg};
use postforge_shared::TopicRecord;

/// The acquired image and the adapter that produced it.
#[derive(Debug, Clone)]
pub struct AcquiredImage {
    pub bytes: Vec<u8>,
    /// Adapter name, `"placeholder"` when the chain was exhausted.
    pub source: &'static str,
}

/// Run the fallback chain for `topic`.
#[instrument(skip_all, fields(slug = %topic.slug, chain_len = chain.len()))]
pub async fn acquire(chain: &[&dyn ImageGenerator], topic: &TopicRecord) -> AcquiredImage {
    let full_prompt = photo_prompt(topic);
    let simple_prompt = simplified_prompt(topic);

    for (i, generator) in chain.iter().enumerate() {
        match attempt(*generator, &full_prompt).await {
            Some(bytes) => {
                info!(source = generator.name(), "hero image generated");
                return AcquiredImage {
                    bytes,
                    source: generator.name(),
                };
            }
            None if i == 0 => {
                // Primary gets a second try with the simplified prompt.
                debug!(source = generator.name(), "retrying primary with simplified prompt");
                if let Some(bytes) = attempt(*generator, &simple_prompt).await {
                    info!(source = generator.name(), "hero image generated on retry");
                    return AcquiredImage {
                        bytes,
                        source: generator.name(),
                    };
                }
            }
            None => {}
        }
    }

    warn!("image chain exhausted, writing placeholder");
    AcquiredImage {
        bytes: placeholder_svg(&topic.title),
        source: "placeholder",
    }
}

/// One wrapped attempt: errors and empty replies advance the chain.
async fn attempt(generator: &dyn ImageGenerator, prompt: &str) -> Option<Vec<u8>> {
    match generator.generate(prompt).await {
        Ok(Some(bytes)) if !bytes.is_empty() => Some(bytes),
        Ok(_) => {
            debug!(source = generator.name(), "no image in reply");
            None
        }
        Err(e) => {
            debug!(source = generator.name(), error = %e, "image attempt failed");
            None
        }
    }
}

/// The full editorial prompt.
fn photo_prompt(topic: &TopicRecord) -> String {
    format!(
        "Generate a beautiful, photorealistic image for a sailing blog article. The image should be:\n\
         - Wide format (16:9 aspect ratio)\n\
         - {}\n\
         - Bright, coastal colors (ocean blue, white, golden hour light)\n\
         - Professional quality, magazine-style photography\n\
         - No text overlays",
        topic.image_prompt
    )
}

/// The stripped-down retry prompt.
fn simplified_prompt(topic: &TopicRecord) -> String {
    format!(
        "Photorealistic sailing photograph, 16:9, no text: {}",
        topic.image_prompt
    )
}
