use std::sync::Arc;

use tracing::{error, info};

use crate::error::{Error, Result};
use crate::gemini::{GenerativeModel, Part};
use crate::models::DiagnosisRecord;
use crate::prompts::DIAGNOSIS_INSTRUCTION;
use crate::reply::parse_structured_reply;

pub struct DiagnosisService {
    model: Arc<dyn GenerativeModel>,
}

impl DiagnosisService {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Single attempt: one model call, then fence cleanup and JSON parse.
    pub async fn diagnose(&self, image_bytes: &[u8], mime_type: &str) -> Result<DiagnosisRecord> {
        if image_bytes.is_empty() {
            return Err(Error::InvalidInput("Empty image".to_string()));
        }

        info!(
            "Diagnosing image: {} bytes, type: {}",
            image_bytes.len(),
            mime_type
        );

        let reply = self
            .model
            .generate(vec![
                Part::Image {
                    mime_type: mime_type.to_string(),
                    data: image_bytes.to_vec(),
                },
                Part::Text(DIAGNOSIS_INSTRUCTION.to_string()),
            ])
            .await?;

        let fields = parse_structured_reply(&reply).map_err(|e| {
            error!("Could not parse diagnosis reply: {}", e);
            e
        })?;
        let record = DiagnosisRecord::from_fields(&fields);

        info!(
            "Diagnosis: crop={}, disease/pest={}",
            record.crop_name.as_deref().unwrap_or("N/A"),
            record.disease_pest.as_deref().unwrap_or("N/A")
        );

        Ok(record)
    }
}
