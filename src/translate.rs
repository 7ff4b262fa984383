use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::gemini::{GenerativeModel, Part};
use crate::prompts::translation_prompt;

pub struct TranslationService {
    model: Arc<dyn GenerativeModel>,
}

impl TranslationService {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Returns the model's reply verbatim. Blank input short-circuits to "".
    pub async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        info!("Translating {} chars to {}", text.chars().count(), target_language);

        self.model
            .generate(vec![Part::Text(translation_prompt(target_language, text))])
            .await
    }
}
