use pagelist_core::{ListAction, ListSideEffect, ListState, ListUpdater, Next};
use pagelist_engine::FetchError;
use serde::{Deserialize, Serialize};

use crate::repository::{FolderId, PatientId, PatientRow};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatientListModel {
    /// `None` shows every folder.
    pub folder_id: Option<FolderId>,
    pub list: ListState<PatientRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientListEvent {
    Refresh,
    Restart,
    LoadMore,
    StopLoading,
    PickFolder(Option<FolderId>),
    PickPatient(PatientId),
    PageLoaded(Vec<PatientRow>),
    LoadFailed(FetchError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientListEffect {
    LoadPatients {
        folder_id: Option<FolderId>,
        page: usize,
    },
    ShowError(FetchError),
    OpenChat(PatientRow),
}

type PatientUpdater = ListUpdater<
    PatientListModel,
    PatientListEvent,
    PatientListEffect,
    ListState<PatientRow>,
    ListAction<PatientRow, FetchError>,
>;

const UPDATER: PatientUpdater = ListUpdater::new(
    |model| &model.list,
    |event| match event {
        PatientListEvent::Refresh => Ok(ListAction::Refresh),
        PatientListEvent::Restart => Ok(ListAction::Restart),
        PatientListEvent::LoadMore => Ok(ListAction::LoadMore),
        PatientListEvent::StopLoading => Ok(ListAction::StopLoading),
        PatientListEvent::PageLoaded(rows) => Ok(ListAction::from_page(rows)),
        PatientListEvent::LoadFailed(error) => Ok(ListAction::PageLoadFailed(error)),
        other => Err(other),
    },
    |model, list| PatientListModel { list, ..model },
    |model, effect| match effect {
        ListSideEffect::LoadPage(page) => PatientListEffect::LoadPatients {
            folder_id: model.folder_id,
            page,
        },
        ListSideEffect::EmitError(error) => PatientListEffect::ShowError(error),
    },
);

/// First event for a fresh or restored model.
///
/// A restored snapshot may have been taken mid-fetch; that fetch is gone, so
/// the list settles instead of waiting forever.
pub fn init(model: PatientListModel) -> Next<PatientListModel, PatientListEffect> {
    if model.list.is_not_initialized() {
        update(model, PatientListEvent::Refresh)
    } else if model.list.is_loading() {
        update(model, PatientListEvent::StopLoading)
    } else {
        Next::unchanged(model)
    }
}

pub fn update(
    model: PatientListModel,
    event: PatientListEvent,
) -> Next<PatientListModel, PatientListEffect> {
    match event {
        PatientListEvent::PickFolder(folder_id) if folder_id == model.folder_id => {
            Next::unchanged(model)
        }
        PatientListEvent::PickFolder(folder_id) => {
            let model = PatientListModel { folder_id, ..model };
            let mut next = UPDATER.update(model, PatientListEvent::Restart);
            next.model_changed = true;
            next
        }
        PatientListEvent::PickPatient(id) => {
            let picked = model.list.loaded_items().iter().find(|row| row.id == id).cloned();
            match picked {
                Some(row) => Next {
                    model,
                    model_changed: false,
                    effects: vec![PatientListEffect::OpenChat(row)],
                },
                None => Next::unchanged(model),
            }
        }
        other => UPDATER.update(model, other),
    }
}

pub fn render(model: &PatientListModel, folders: &[(FolderId, String)]) -> Vec<String> {
    let folder = model
        .folder_id
        .and_then(|id| folders.iter().find(|(folder, _)| *folder == id))
        .map_or("All folders", |(_, title)| title.as_str());
    let mut lines = vec![format!("== Patients: {folder} ==")];

    let rows = model.list.map(|row, index, all| {
        let year = exam_year(row);
        let mut text = String::new();
        if index == 0 || exam_year(&all[index - 1]) != year {
            text.push_str(&match year {
                Some(year) => format!("-- examined {year} --\n"),
                None => "-- never examined --\n".to_string(),
            });
        }
        text.push_str(&format!("  [{}] {}", row.id, row.full_name));
        text
    });

    match &rows {
        ListState::NotInitialized => {}
        ListState::Empty => lines.push("No patients in this folder.".to_string()),
        ListState::EmptyProgress => lines.push("Loading...".to_string()),
        ListState::EmptyError => lines.push("Could not load patients. Try 'refresh'.".to_string()),
        _ => {
            lines.extend(rows.loaded_items().iter().cloned());
            if rows.is_refreshing() {
                lines.push("(refreshing)".to_string());
            } else if rows.is_loading() {
                lines.push("(loading more)".to_string());
            } else if matches!(rows, ListState::AllData { .. }) {
                lines.push(format!("-- {} patients, end of list --", rows.loaded_items().len()));
            } else {
                lines.push("-- 'more' loads the next page --".to_string());
            }
        }
    }
    lines
}

fn exam_year(row: &PatientRow) -> Option<String> {
    row.last_exam_at.map(|at| at.format("%Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(id: PatientId) -> PatientRow {
        PatientRow {
            id,
            full_name: format!("Patient {id}"),
            folder_id: 0,
            last_exam_at: None,
        }
    }

    fn loaded(rows: Vec<PatientRow>) -> PatientListModel {
        PatientListModel {
            folder_id: Some(0),
            list: ListState::Data {
                page_count: 1,
                items: rows,
            },
        }
    }

    #[test]
    fn init_refreshes_fresh_model() {
        let next = init(PatientListModel::default());

        assert_eq!(next.model.list, ListState::EmptyProgress);
        assert_eq!(
            next.effects,
            vec![PatientListEffect::LoadPatients {
                folder_id: None,
                page: 0
            }]
        );
    }

    #[test]
    fn init_settles_snapshot_taken_mid_fetch() {
        let model = PatientListModel {
            folder_id: None,
            list: ListState::NextPageLoading {
                page_count: 2,
                items: vec![row(1)],
            },
        };

        let next = init(model);

        assert_eq!(
            next.model.list,
            ListState::Data {
                page_count: 2,
                items: vec![row(1)]
            }
        );
        assert!(next.effects.is_empty());
    }

    #[test]
    fn picking_a_folder_restarts_the_list() {
        let next = update(loaded(vec![row(1)]), PatientListEvent::PickFolder(Some(2)));

        assert!(next.model_changed);
        assert_eq!(next.model.folder_id, Some(2));
        assert_eq!(next.model.list, ListState::EmptyProgress);
        assert_eq!(
            next.effects,
            vec![PatientListEffect::LoadPatients {
                folder_id: Some(2),
                page: 0
            }]
        );
    }

    #[test]
    fn picking_the_same_folder_does_nothing() {
        let model = loaded(vec![row(1)]);
        let next = update(model.clone(), PatientListEvent::PickFolder(Some(0)));

        assert_eq!(next, Next::unchanged(model));
    }

    #[test]
    fn picking_a_loaded_patient_opens_chat() {
        let next = update(loaded(vec![row(1), row(2)]), PatientListEvent::PickPatient(2));

        assert!(!next.model_changed);
        assert_eq!(next.effects, vec![PatientListEffect::OpenChat(row(2))]);
    }

    #[test]
    fn picking_an_unknown_patient_is_ignored() {
        let next = update(loaded(vec![row(1)]), PatientListEvent::PickPatient(9));
        assert!(next.effects.is_empty());
    }

    #[test]
    fn load_more_requests_next_page_of_current_folder() {
        let next = update(loaded(vec![row(1)]), PatientListEvent::LoadMore);

        assert_eq!(
            next.effects,
            vec![PatientListEffect::LoadPatients {
                folder_id: Some(0),
                page: 1
            }]
        );
    }

    #[test]
    fn render_groups_rows_by_exam_year() {
        let mut examined = row(2);
        examined.last_exam_at = chrono::DateTime::from_timestamp(1_700_000_000, 0);
        let model = loaded(vec![row(1), examined]);
        let folders = vec![(0, "Cardiology".to_string())];

        let lines = render(&model, &folders);

        assert_eq!(lines[0], "== Patients: Cardiology ==");
        assert_eq!(lines[1], "-- never examined --\n  [1] Patient 1");
        assert_eq!(lines[2], "-- examined 2023 --\n  [2] Patient 2");
    }
}
