//! Per-browser dashboard state.
//!
//! Each session owns the current diagnosis, the uploaded image and a
//! translation cache. Sessions live in process memory only.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap, HeaderValue};
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use super::labels::Language;
use crate::error::Result;
use crate::models::{DiagnosisRecord, TranslationRecord};
use crate::translate::TranslationService;
use crate::upload::UploadedImage;

pub const SESSION_COOKIE: &str = "agrosnap_session";

/// Translations of the current diagnosis, keyed by target language.
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: HashMap<Language, TranslationRecord>,
}

impl TranslationCache {
    pub fn get(&self, language: Language) -> Option<&TranslationRecord> {
        self.entries.get(&language)
    }

    pub fn insert(&mut self, language: Language, record: TranslationRecord) {
        self.entries.insert(language, record);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// One-shot message shown on the next render.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct DashboardSession {
    pub diagnosis: Option<DiagnosisRecord>,
    pub image: Option<UploadedImage>,
    pub translations: TranslationCache,
    pub notice: Option<Notice>,
}

impl DashboardSession {
    /// Replaces the current diagnosis. Cached translations belong to the old
    /// one, so they go too.
    pub fn set_diagnosis(&mut self, diagnosis: DiagnosisRecord, image: UploadedImage) {
        self.diagnosis = Some(diagnosis);
        self.image = Some(image);
        self.translations.clear();
    }
}

pub struct SessionHandle {
    pub id: Uuid,
    pub session: Arc<Mutex<DashboardSession>>,
    pub created: bool,
}

impl SessionHandle {
    pub fn set_cookie(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, self.id
        ))
        .ok()
    }
}

/// Sessions idle longer than this are dropped.
pub const SESSION_IDLE_TTL: Duration = Duration::from_secs(60 * 60);
pub const MAX_SESSIONS: usize = 1024;

struct SessionEntry {
    session: Arc<Mutex<DashboardSession>>,
    last_seen: Instant,
}

/// In-memory sessions, pruned by idle time and capped in count.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(SESSION_IDLE_TTL, MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Looks up a live session without creating one.
    pub async fn get(&self, id: Option<Uuid>) -> Option<SessionHandle> {
        let id = id?;
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let expired = sessions
            .get(&id)
            .is_some_and(|entry| now.duration_since(entry.last_seen) >= self.idle_ttl);
        if expired {
            sessions.remove(&id);
            return None;
        }

        let entry = sessions.get_mut(&id)?;
        entry.last_seen = now;
        Some(SessionHandle {
            id,
            session: entry.session.clone(),
            created: false,
        })
    }

    /// Looks up the session for `id`, or starts a fresh one.
    pub async fn open(&self, id: Option<Uuid>) -> SessionHandle {
        if let Some(handle) = self.get(id).await {
            return handle;
        }

        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(DashboardSession::default()));
        let now = Instant::now();

        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions, now);
        sessions.insert(
            id,
            SessionEntry {
                session: session.clone(),
                last_seen: now,
            },
        );
        info!("Started dashboard session {} ({} live)", id, sessions.len());

        SessionHandle {
            id,
            session,
            created: true,
        }
    }

    /// Drops idle sessions, then the least recently seen ones until a new
    /// session fits under the cap.
    fn prune(&self, sessions: &mut HashMap<Uuid, SessionEntry>, now: Instant) {
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_ttl);

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                }
                None => break,
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

/// Returns the diagnosis as it should be shown in `language`.
///
/// Non-English languages translate `disease_pest` and `treatment` once and
/// reuse the cached result afterwards. `crop_name` is never translated.
/// Nothing is cached when a translation fails.
pub async fn localize(
    diagnosis: &DiagnosisRecord,
    language: Language,
    cache: &mut TranslationCache,
    translator: &TranslationService,
) -> Result<DiagnosisRecord> {
    if !language.needs_translation() {
        return Ok(diagnosis.clone());
    }

    if cache.get(language).is_none() {
        let disease_pest = translate_field(&diagnosis.disease_pest, language, translator).await?;
        let treatment = translate_field(&diagnosis.treatment, language, translator).await?;

        cache.insert(
            language,
            TranslationRecord {
                language: language.name().to_string(),
                disease_pest,
                treatment,
            },
        );
    }

    let translated = cache.get(language);
    Ok(DiagnosisRecord {
        crop_name: diagnosis.crop_name.clone(),
        disease_pest: translated.and_then(|t| t.disease_pest.clone()),
        treatment: translated.and_then(|t| t.treatment.clone()),
    })
}

// Absent fields stay absent so every language shows them as N/A.
async fn translate_field(
    field: &Option<String>,
    language: Language,
    translator: &TranslationService,
) -> Result<Option<String>> {
    match field {
        Some(text) => Ok(Some(translator.translate(text, language.name()).await?)),
        None => Ok(None),
    }
}
