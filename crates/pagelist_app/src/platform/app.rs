use std::io::{self, BufRead};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use pagelist_core::Next;
use pagelist_engine::SnapshotStore;
use pagelist_logging::pagelist_info;

use super::commands::{help, Command};
use super::config::AppConfig;
use super::effects::{EffectRunner, Followup};
use super::persistence::{chat_key, persist, restore, PATIENTS_KEY};
use crate::repository::{ChatId, ClinicRepository, FolderId};
use crate::screens::chat::{self, ChatEvent, ChatModel};
use crate::screens::patient_list::{self, PatientListEvent, PatientListModel};

const INPUT_POLL: Duration = Duration::from_millis(50);

pub fn run_app(config: AppConfig) {
    let repository = ClinicRepository::seeded(45, 57);
    let mut app = App::new(&config, repository);

    let (line_tx, line_rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    println!("{}", help());
    app.start();
    loop {
        app.pump();
        for line in app.take_output() {
            println!("{line}");
        }

        match line_rx.recv_timeout(INPUT_POLL) {
            Ok(line) if line.trim().is_empty() => {}
            Ok(line) => match Command::parse(&line) {
                Ok(command) => {
                    if !app.handle_command(command) {
                        break;
                    }
                }
                Err(message) => println!("{message}"),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    app.shutdown();
    for line in app.take_output() {
        println!("{line}");
    }
}

/// Owns both screen models and routes events, effects and fetch results
/// between them.
pub struct App {
    runner: EffectRunner,
    store: SnapshotStore,
    folders: Vec<(FolderId, String)>,
    portion_size: usize,
    patients: PatientListModel,
    chat: Option<ChatModel>,
    dirty: bool,
    notices: Vec<String>,
}

impl App {
    pub fn new(config: &AppConfig, repository: ClinicRepository) -> Self {
        Self {
            folders: repository.folders(),
            runner: EffectRunner::new(repository, &config.paging),
            store: SnapshotStore::new(config.snapshot_dir.clone()),
            portion_size: config.paging.portion_size,
            patients: PatientListModel::default(),
            chat: None,
            dirty: true,
            notices: Vec::new(),
        }
    }

    /// Restores the patient list from its snapshot and kicks off loading.
    pub fn start(&mut self) {
        let restored: Option<PatientListModel> = restore(&self.store, PATIENTS_KEY);
        let next = patient_list::init(restored.unwrap_or_default());
        self.apply_patients(next);
        self.dirty = true;
    }

    /// Feeds finished fetches back into their screens.
    pub fn pump(&mut self) {
        while let Some(event) = self.runner.poll_patients() {
            self.dispatch_patients(event);
        }
        while let Some(event) = self.runner.poll_chat() {
            if self.chat.is_some() {
                self.dispatch_chat(event);
            }
        }
    }

    /// Returns false when the app should exit.
    pub fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => return false,
            Command::Help => self.notices.push(help()),
            Command::Back => {
                if self.chat.is_some() {
                    self.close_chat();
                }
            }
            Command::Folder { folder } => {
                self.dispatch_patients(PatientListEvent::PickFolder(folder.0))
            }
            Command::Pick { id } => self.dispatch_patients(PatientListEvent::PickPatient(id)),
            Command::Refresh => self.route(PatientListEvent::Refresh, ChatEvent::Refresh),
            Command::Restart => self.route(PatientListEvent::Restart, ChatEvent::Restart),
            Command::Stop => self.route(PatientListEvent::StopLoading, ChatEvent::StopLoading),
            Command::More => self.route(PatientListEvent::LoadMore, ChatEvent::LoadOlder),
            Command::Older => self.dispatch_chat(ChatEvent::LoadOlder),
            Command::Newer => self.dispatch_chat(ChatEvent::LoadNewer),
            Command::Send { text } => self.dispatch_chat(ChatEvent::Send(text.join(" "))),
        }
        true
    }

    /// Stops pending loads and saves both screens.
    pub fn shutdown(&mut self) {
        if self.chat.is_some() {
            self.close_chat();
        }
        self.runner.cancel_patients();
        let next = patient_list::update(
            std::mem::take(&mut self.patients),
            PatientListEvent::StopLoading,
        );
        self.patients = next.model;
        persist(&self.store, PATIENTS_KEY, &self.patients);
        pagelist_info!("Saved state to {:?}", self.store.dir());
    }

    /// Pending screen text, re-rendered only after a model change.
    pub fn take_output(&mut self) -> Vec<String> {
        let mut lines = std::mem::take(&mut self.notices);
        if std::mem::take(&mut self.dirty) {
            lines.extend(self.render());
        }
        lines
    }

    pub fn patients(&self) -> &PatientListModel {
        &self.patients
    }

    pub fn chat(&self) -> Option<&ChatModel> {
        self.chat.as_ref()
    }

    fn render(&self) -> Vec<String> {
        match self.chat() {
            Some(model) => chat::render(model),
            None => patient_list::render(self.patients(), &self.folders),
        }
    }

    fn route(&mut self, patients: PatientListEvent, chat: ChatEvent) {
        if self.chat.is_some() {
            self.dispatch_chat(chat);
        } else {
            self.dispatch_patients(patients);
        }
    }

    fn dispatch_patients(&mut self, event: PatientListEvent) {
        let model = std::mem::take(&mut self.patients);
        let next = patient_list::update(model, event);
        self.apply_patients(next);
    }

    fn apply_patients(&mut self, next: Next<PatientListModel, patient_list::PatientListEffect>) {
        self.patients = next.model;
        if next.model_changed && self.chat.is_none() {
            self.dirty = true;
        }
        for effect in next.effects {
            let followup = self.runner.run_patient_effect(effect);
            self.follow(followup);
        }
    }

    fn dispatch_chat(&mut self, event: ChatEvent) {
        let Some(model) = self.chat.take() else {
            self.notices.push("No chat is open; 'pick <id>' opens one.".to_string());
            return;
        };
        let next = chat::update(model, event);
        self.apply_chat(next);
    }

    fn apply_chat(&mut self, next: Next<ChatModel, chat::ChatEffect>) {
        self.chat = Some(next.model);
        if next.model_changed {
            self.dirty = true;
        }
        for effect in next.effects {
            let followup = self.runner.run_chat_effect(effect);
            self.follow(followup);
        }
    }

    fn follow(&mut self, followup: Followup) {
        match followup {
            Followup::None => {}
            Followup::Chat(event) => self.dispatch_chat(event),
            Followup::OpenChat { chat_id, title } => self.open_chat(chat_id, title),
            Followup::Notify(message) => self.notices.push(message),
        }
    }

    fn open_chat(&mut self, chat_id: ChatId, title: String) {
        if self.chat.is_some() {
            self.close_chat();
        }
        let restored: Option<ChatModel> = restore(&self.store, &chat_key(chat_id));
        let model = match restored {
            Some(model) => ChatModel {
                portion_size: self.portion_size.max(1),
                ..model
            },
            None => ChatModel::new(chat_id, title, self.portion_size),
        };
        let next = chat::init(model);
        self.apply_chat(next);
        self.dirty = true;
    }

    fn close_chat(&mut self) {
        self.runner.cancel_chat();
        if let Some(model) = self.chat.take() {
            let next = chat::update(model, ChatEvent::StopLoading);
            persist(&self.store, &chat_key(next.model.chat_id), &next.model);
        }
        self.dirty = true;
    }
}
