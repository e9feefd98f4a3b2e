use pagelist_engine::{LoadEvent, PageLoader, PageRequest, PagingSettings};
use pagelist_logging::{pagelist_info, pagelist_warn};

use crate::repository::{ChatId, ClinicRepository, MessageFetcher, PatientFetcher};
use crate::screens::chat::{ChatEffect, ChatEvent};
use crate::screens::patient_list::{PatientListEffect, PatientListEvent};

/// What the app loop has to do after an effect ran.
#[derive(Debug)]
pub enum Followup {
    None,
    Chat(ChatEvent),
    OpenChat { chat_id: ChatId, title: String },
    Notify(String),
}

/// Executes screen effects against the repository through page loaders.
pub struct EffectRunner {
    repository: ClinicRepository,
    patients: PageLoader<PatientFetcher>,
    messages: PageLoader<MessageFetcher>,
    page_size: usize,
}

impl EffectRunner {
    pub fn new(repository: ClinicRepository, settings: &PagingSettings) -> Self {
        Self {
            patients: PageLoader::new(PatientFetcher::new(repository.clone()), settings),
            messages: PageLoader::new(MessageFetcher::new(repository.clone()), settings),
            repository,
            page_size: settings.page_size.max(1),
        }
    }

    pub fn run_patient_effect(&self, effect: PatientListEffect) -> Followup {
        match effect {
            PatientListEffect::LoadPatients { folder_id, page } => {
                pagelist_info!("LoadPatients folder={:?} page={}", folder_id, page);
                self.patients
                    .load(folder_id, PageRequest::page(page, self.page_size));
                Followup::None
            }
            PatientListEffect::ShowError(error) => Followup::Notify(format!("error: {error}")),
            PatientListEffect::OpenChat(row) => Followup::OpenChat {
                chat_id: row.id,
                title: row.full_name,
            },
        }
    }

    pub fn run_chat_effect(&self, effect: ChatEffect) -> Followup {
        match effect {
            ChatEffect::LoadMessages {
                chat_id,
                offset,
                count,
            } => {
                pagelist_info!("LoadMessages chat={} offset={} count={}", chat_id, offset, count);
                self.messages.load(chat_id, PageRequest::portion(offset, count));
                Followup::None
            }
            ChatEffect::ShowError(error) => Followup::Notify(format!("error: {error}")),
            ChatEffect::SendMessage { chat_id, body } => {
                match self.repository.send_message(chat_id, "doctor", &body) {
                    Ok(total) => Followup::Chat(ChatEvent::TotalCountChanged(total)),
                    Err(error) => {
                        pagelist_warn!("Send to chat {} failed: {}", chat_id, error);
                        Followup::Notify(format!("message not sent: {error}"))
                    }
                }
            }
        }
    }

    /// Forgets in-flight fetches when their screen goes away.
    pub fn cancel_chat(&self) {
        self.messages.cancel();
    }

    pub fn cancel_patients(&self) {
        self.patients.cancel();
    }

    pub fn poll_patients(&self) -> Option<PatientListEvent> {
        self.patients.try_recv().map(|event| match event {
            LoadEvent::Loaded { page, .. } => PatientListEvent::PageLoaded(page.items),
            LoadEvent::Failed { error, .. } => PatientListEvent::LoadFailed(error),
        })
    }

    pub fn poll_chat(&self) -> Option<ChatEvent> {
        self.messages.try_recv().map(|event| match event {
            LoadEvent::Loaded { request, page } => ChatEvent::MessagesLoaded {
                total_count: page
                    .total_count
                    .unwrap_or(request.offset + page.items.len()),
                items: page.items,
            },
            LoadEvent::Failed { error, .. } => ChatEvent::LoadFailed(error),
        })
    }
}
