use pagelist_core::{
    ListUpdater, MessageWindowAction, MessageWindowSideEffect, MessageWindowState, Next,
};
use pagelist_engine::FetchError;
use serde::{Deserialize, Serialize};

use crate::repository::{ChatId, ChatMessage};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatModel {
    pub chat_id: ChatId,
    pub title: String,
    pub portion_size: usize,
    pub window: MessageWindowState<ChatMessage>,
}

impl ChatModel {
    pub fn new(chat_id: ChatId, title: impl Into<String>, portion_size: usize) -> Self {
        Self {
            chat_id,
            title: title.into(),
            portion_size: portion_size.max(1),
            window: MessageWindowState::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Refresh,
    Restart,
    LoadOlder,
    LoadNewer,
    StopLoading,
    MessagesLoaded {
        total_count: usize,
        items: Vec<ChatMessage>,
    },
    LoadFailed(FetchError),
    TotalCountChanged(usize),
    Send(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEffect {
    LoadMessages {
        chat_id: ChatId,
        offset: usize,
        count: usize,
    },
    ShowError(FetchError),
    SendMessage {
        chat_id: ChatId,
        body: String,
    },
}

type ChatUpdater = ListUpdater<
    ChatModel,
    ChatEvent,
    ChatEffect,
    MessageWindowState<ChatMessage>,
    MessageWindowAction<ChatMessage, FetchError>,
>;

const UPDATER: ChatUpdater = ListUpdater::new(
    |model| &model.window,
    |event| match event {
        ChatEvent::Refresh => Ok(MessageWindowAction::Refresh),
        ChatEvent::Restart => Ok(MessageWindowAction::Restart),
        ChatEvent::LoadOlder => Ok(MessageWindowAction::LoadOldMessages),
        ChatEvent::LoadNewer => Ok(MessageWindowAction::LoadNewMessages),
        ChatEvent::StopLoading => Ok(MessageWindowAction::StopLoading),
        ChatEvent::MessagesLoaded { total_count, items } => {
            Ok(MessageWindowAction::PageLoaded { total_count, items })
        }
        ChatEvent::LoadFailed(error) => Ok(MessageWindowAction::PageLoadFailed(error)),
        ChatEvent::TotalCountChanged(count) => Ok(MessageWindowAction::TotalCountChanged(count)),
        other => Err(other),
    },
    |model, window| ChatModel { window, ..model },
    |model, effect| match effect {
        MessageWindowSideEffect::LoadPage { offset, count } => ChatEffect::LoadMessages {
            chat_id: model.chat_id,
            offset,
            count,
        },
        MessageWindowSideEffect::EmitError(error) => ChatEffect::ShowError(error),
    },
);

pub fn init(model: ChatModel) -> Next<ChatModel, ChatEffect> {
    match model.window {
        MessageWindowState::NotInitialized => update(model, ChatEvent::Refresh),
        MessageWindowState::OldMessagesLoading { .. }
        | MessageWindowState::NewMessagesLoading { .. } => update(model, ChatEvent::StopLoading),
        _ => Next::unchanged(model),
    }
}

pub fn update(model: ChatModel, event: ChatEvent) -> Next<ChatModel, ChatEffect> {
    match event {
        ChatEvent::Send(body) => {
            let body = body.trim();
            if body.is_empty() {
                return Next::unchanged(model);
            }
            let effect = ChatEffect::SendMessage {
                chat_id: model.chat_id,
                body: body.to_string(),
            };
            Next {
                model,
                model_changed: false,
                effects: vec![effect],
            }
        }
        other => {
            let portion = model.portion_size;
            UPDATER.update_with(model, other, |window, action| {
                window.reduce_with_portion(action, portion)
            })
        }
    }
}

/// Oldest message at the top, like a chat transcript.
pub fn render(model: &ChatModel) -> Vec<String> {
    let mut lines = vec![format!("== Chat: {} ==", model.title)];
    let window = model.window.map(|message, index, all| {
        // Items are newest first; the next index is the older neighbour.
        let same_day = all
            .get(index + 1)
            .is_some_and(|older| older.sent_at.date_naive() == message.sent_at.date_naive());
        let mut text = String::new();
        if !same_day {
            text.push_str(&format!("-- {} --\n", message.sent_at.format("%Y-%m-%d")));
        }
        text.push_str(&format!(
            "  {} {}: {}",
            message.sent_at.format("%H:%M"),
            message.author,
            message.body
        ));
        text
    });

    match &window {
        MessageWindowState::NotInitialized => {}
        MessageWindowState::Empty => lines.push("No messages yet.".to_string()),
        MessageWindowState::EmptyProgress => lines.push("Loading...".to_string()),
        MessageWindowState::EmptyError => {
            lines.push("Could not load messages. Try 'refresh'.".to_string())
        }
        MessageWindowState::Data {
            total_count,
            current_offset,
            items,
        }
        | MessageWindowState::OldMessagesLoading {
            total_count,
            current_offset,
            items,
        }
        | MessageWindowState::NewMessagesLoading {
            total_count,
            current_offset,
            items,
        } => {
            let start = (*current_offset).max(0) as usize;
            if matches!(window, MessageWindowState::OldMessagesLoading { .. }) {
                lines.push("(loading older)".to_string());
            } else if start + items.len() < *total_count {
                lines.push("-- 'older' loads earlier messages --".to_string());
            }
            lines.extend(items.iter().rev().cloned());
            if matches!(window, MessageWindowState::NewMessagesLoading { .. }) {
                lines.push("(loading newer)".to_string());
            } else if *current_offset > 0 {
                lines.push("-- 'newer' loads later messages --".to_string());
            }
            lines.push(format!(
                "-- showing {} of {} --",
                items.len(),
                total_count
            ));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn message(id: u64) -> ChatMessage {
        let base = Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap();
        ChatMessage {
            id,
            author: "doctor".to_string(),
            body: format!("m{id}"),
            sent_at: base + Duration::minutes(id as i64),
        }
    }

    fn with_window(window: MessageWindowState<ChatMessage>) -> ChatModel {
        ChatModel {
            window,
            ..ChatModel::new(7, "Patient 007", 5)
        }
    }

    #[test]
    fn init_loads_first_portion() {
        let next = init(ChatModel::new(7, "Patient 007", 5));

        assert_eq!(next.model.window, MessageWindowState::EmptyProgress);
        assert_eq!(
            next.effects,
            vec![ChatEffect::LoadMessages {
                chat_id: 7,
                offset: 0,
                count: 5
            }]
        );
    }

    #[test]
    fn older_messages_use_configured_portion() {
        let model = with_window(MessageWindowState::Data {
            total_count: 12,
            current_offset: 0,
            items: vec![message(12), message(11)],
        });

        let next = update(model, ChatEvent::LoadOlder);

        assert_eq!(
            next.effects,
            vec![ChatEffect::LoadMessages {
                chat_id: 7,
                offset: 2,
                count: 5
            }]
        );
    }

    #[test]
    fn sending_emits_effect_without_touching_window() {
        let model = with_window(MessageWindowState::Empty);
        let next = update(model.clone(), ChatEvent::Send("  hello  ".to_string()));

        assert_eq!(next.model, model);
        assert_eq!(
            next.effects,
            vec![ChatEffect::SendMessage {
                chat_id: 7,
                body: "hello".to_string()
            }]
        );
    }

    #[test]
    fn blank_message_is_not_sent() {
        let next = update(with_window(MessageWindowState::Empty), ChatEvent::Send("  ".into()));
        assert!(next.effects.is_empty());
    }

    #[test]
    fn sent_message_pulls_in_the_new_head() {
        let model = with_window(MessageWindowState::Data {
            total_count: 2,
            current_offset: 0,
            items: vec![message(2), message(1)],
        });

        let next = update(model, ChatEvent::TotalCountChanged(3));

        assert_eq!(
            next.effects,
            vec![ChatEffect::LoadMessages {
                chat_id: 7,
                offset: 0,
                count: 1
            }]
        );
        let next = update(
            next.model,
            ChatEvent::MessagesLoaded {
                total_count: 3,
                items: vec![message(3)],
            },
        );
        assert_eq!(
            next.model.window,
            MessageWindowState::Data {
                total_count: 3,
                current_offset: 0,
                items: vec![message(3), message(2), message(1)],
            }
        );
    }

    #[test]
    fn render_lists_oldest_first() {
        let model = with_window(MessageWindowState::Data {
            total_count: 2,
            current_offset: 0,
            items: vec![message(2), message(1)],
        });

        let lines = render(&model);

        assert_eq!(lines[0], "== Chat: Patient 007 ==");
        assert_eq!(lines[1], "-- 2024-05-02 --\n  08:01 doctor: m1");
        assert_eq!(lines[2], "  08:02 doctor: m2");
        assert_eq!(lines[3], "-- showing 2 of 2 --");
    }
}
