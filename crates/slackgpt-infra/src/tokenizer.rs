//! Tiktoken-backed [`Tokenizer`].
//!
//! Encodings are loaded once per model name and cached; `preload` lets the
//! binary pay the load cost at startup instead of on the first prompt.

use std::sync::Arc;

use dashmap::DashMap;
use tiktoken_rs::CoreBPE;

use slackgpt_core::llm::token_accountant::Tokenizer;
use slackgpt_types::error::TokenizerError;

/// Counts tokens with the BPE encoding OpenAI uses for each model.
#[derive(Default)]
pub struct TiktokenTokenizer {
    encodings: DashMap<String, Arc<CoreBPE>>,
}

impl TiktokenTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and cache the encoding for `model`.
    pub fn preload(&self, model: &str) -> Result<(), TokenizerError> {
        self.encoding(model).map(|_| ())
    }

    fn encoding(&self, model: &str) -> Result<Arc<CoreBPE>, TokenizerError> {
        if let Some(bpe) = self.encodings.get(model) {
            return Ok(Arc::clone(bpe.value()));
        }

        let bpe = tiktoken_rs::get_bpe_from_model(model)
            .map_err(|_| TokenizerError::UnsupportedModel(model.to_string()))?;
        let bpe = Arc::new(bpe);
        self.encodings
            .entry(model.to_string())
            .or_insert_with(|| Arc::clone(&bpe));
        tracing::debug!(model, "tokenizer encoding loaded");
        Ok(bpe)
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn count(&self, model: &str, text: &str) -> Result<usize, TokenizerError> {
        Ok(self.encoding(model)?.encode_with_special_tokens(text).len())
    }
}
