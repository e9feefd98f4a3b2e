//! In-memory clinic backend standing in for the remote repository.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use pagelist_engine::{FetchError, Page, PageFetcher, PageRequest};
use serde::{Deserialize, Serialize};

pub type PatientId = u64;
pub type FolderId = u64;
pub type ChatId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRow {
    pub id: PatientId,
    pub full_name: String,
    pub folder_id: FolderId,
    pub last_exam_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub author: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Clinic {
    patients: Vec<PatientRow>,
    /// Oldest first; offsets are counted from the end.
    messages: Vec<(ChatId, ChatMessage)>,
}

#[derive(Debug, Clone, Default)]
pub struct ClinicRepository {
    inner: Arc<Mutex<Clinic>>,
}

const FOLDERS: [&str; 3] = ["Cardiology", "Nutrition", "Physiotherapy"];

impl ClinicRepository {
    /// A repository pre-filled with deterministic demo data.
    pub fn seeded(patient_count: u64, messages_per_chat: u64) -> Self {
        let epoch = Utc
            .with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
            .single()
            .unwrap_or_default();
        let mut clinic = Clinic::default();
        for id in 1..=patient_count {
            clinic.patients.push(PatientRow {
                id,
                full_name: format!("Patient {id:03}"),
                folder_id: id % FOLDERS.len() as u64,
                last_exam_at: (id % 4 != 0).then(|| epoch + Duration::days(id as i64)),
            });
        }
        for chat_id in 1..=patient_count.min(3) {
            for n in 0..messages_per_chat {
                let author = if n % 2 == 0 { "doctor" } else { "patient" };
                clinic.messages.push((
                    chat_id,
                    ChatMessage {
                        id: chat_id * 10_000 + n,
                        author: author.to_string(),
                        body: format!("message #{n}"),
                        sent_at: epoch + Duration::minutes(n as i64),
                    },
                ));
            }
        }
        Self {
            inner: Arc::new(Mutex::new(clinic)),
        }
    }

    pub fn folders(&self) -> Vec<(FolderId, String)> {
        FOLDERS
            .iter()
            .enumerate()
            .map(|(id, title)| (id as FolderId, title.to_string()))
            .collect()
    }

    pub fn patient(&self, id: PatientId) -> Option<PatientRow> {
        let clinic = self.inner.lock().ok()?;
        clinic.patients.iter().find(|p| p.id == id).cloned()
    }

    pub fn patients(
        &self,
        folder_id: Option<FolderId>,
        request: PageRequest,
    ) -> Result<Vec<PatientRow>, FetchError> {
        let clinic = self.lock()?;
        Ok(clinic
            .patients
            .iter()
            .filter(|p| folder_id.map_or(true, |folder| p.folder_id == folder))
            .skip(request.offset)
            .take(request.limit)
            .cloned()
            .collect())
    }

    /// Messages newest first, as the message window expects.
    pub fn messages(
        &self,
        chat_id: ChatId,
        request: PageRequest,
    ) -> Result<Page<ChatMessage>, FetchError> {
        let clinic = self.lock()?;
        let transcript: Vec<&ChatMessage> = clinic
            .messages
            .iter()
            .rev()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, message)| message)
            .collect();
        let items = transcript
            .iter()
            .skip(request.offset)
            .take(request.limit)
            .map(|message| (*message).clone())
            .collect();
        Ok(Page::with_total(items, transcript.len()))
    }

    /// Appends a message and returns the new transcript length.
    pub fn send_message(
        &self,
        chat_id: ChatId,
        author: &str,
        body: &str,
    ) -> Result<usize, FetchError> {
        let mut clinic = self.lock()?;
        let next_id = clinic
            .messages
            .iter()
            .map(|(_, message)| message.id)
            .max()
            .unwrap_or(0)
            + 1;
        clinic.messages.push((
            chat_id,
            ChatMessage {
                id: next_id,
                author: author.to_string(),
                body: body.to_string(),
                sent_at: Utc::now(),
            },
        ));
        Ok(clinic.messages.iter().filter(|(id, _)| *id == chat_id).count())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Clinic>, FetchError> {
        self.inner
            .lock()
            .map_err(|_| FetchError::remote("repository lock poisoned"))
    }
}

pub struct PatientFetcher {
    repository: ClinicRepository,
}

impl PatientFetcher {
    pub fn new(repository: ClinicRepository) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl PageFetcher for PatientFetcher {
    type Query = Option<FolderId>;
    type Item = PatientRow;

    async fn fetch(
        &self,
        folder_id: &Option<FolderId>,
        request: PageRequest,
    ) -> Result<Page<PatientRow>, FetchError> {
        self.repository
            .patients(*folder_id, request)
            .map(Page::new)
    }
}

pub struct MessageFetcher {
    repository: ClinicRepository,
}

impl MessageFetcher {
    pub fn new(repository: ClinicRepository) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl PageFetcher for MessageFetcher {
    type Query = ChatId;
    type Item = ChatMessage;

    async fn fetch(
        &self,
        chat_id: &ChatId,
        request: PageRequest,
    ) -> Result<Page<ChatMessage>, FetchError> {
        // Every patient has a chat, possibly empty.
        if self.repository.patient(*chat_id).is_none() {
            return Err(FetchError::NotFound);
        }
        self.repository.messages(*chat_id, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_served_newest_first() {
        let repository = ClinicRepository::seeded(3, 5);
        let page = repository
            .messages(1, PageRequest::portion(0, 2))
            .unwrap();

        assert_eq!(page.total_count, Some(5));
        let bodies: Vec<_> = page.items.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["message #4", "message #3"]);
    }

    #[test]
    fn folder_filter_applies_before_paging() {
        let repository = ClinicRepository::seeded(9, 0);
        let rows = repository
            .patients(Some(1), PageRequest::page(0, 10))
            .unwrap();

        assert!(rows.iter().all(|p| p.folder_id == 1));
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn sending_grows_the_transcript() {
        let repository = ClinicRepository::seeded(1, 2);
        assert_eq!(repository.send_message(1, "doctor", "hello").unwrap(), 3);

        let page = repository.messages(1, PageRequest::portion(0, 1)).unwrap();
        assert_eq!(page.items[0].body, "hello");
    }
}
