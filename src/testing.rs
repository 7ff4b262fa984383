use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::gemini::{GenerativeModel, Part};

/// Replays canned replies in order and records every prompt it was given.
pub struct ScriptedModel {
    replies: Mutex<Vec<Result<String>>>,
    pub calls: Mutex<Vec<Vec<Part>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        let mut replies = replies;
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, parts: Vec<Part>) -> Result<String> {
        self.calls.lock().unwrap().push(parts);
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(Error::Upstream("no scripted reply left".to_string())))
    }
}
