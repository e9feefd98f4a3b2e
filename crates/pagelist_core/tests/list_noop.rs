use pagelist_core::{ListAction, ListState};

type Action = ListAction<u8, &'static str>;

fn sample_states() -> Vec<ListState<u8>> {
    vec![
        ListState::NotInitialized,
        ListState::Empty,
        ListState::EmptyProgress,
        ListState::EmptyError,
        ListState::Data {
            page_count: 2,
            items: vec![1, 2],
        },
        ListState::Refreshing {
            page_count: 2,
            items: vec![1, 2],
        },
        ListState::NextPageLoading {
            page_count: 2,
            items: vec![1, 2],
        },
        ListState::AllData {
            page_count: 2,
            items: vec![1, 2],
        },
    ]
}

fn sample_actions() -> Vec<Action> {
    vec![
        ListAction::Refresh,
        ListAction::Restart,
        ListAction::LoadMore,
        ListAction::PageLoaded(vec![9]),
        ListAction::EmptyPageLoaded,
        ListAction::PageLoadFailed("e"),
        ListAction::StopLoading,
        ListAction::ContentRefreshed(vec![7]),
    ]
}

/// Whether the transition table has an entry for this pair.
fn handled(state: &ListState<u8>, action: &Action) -> bool {
    use ListAction as A;
    use ListState as S;
    match state {
        S::NotInitialized => matches!(action, A::Refresh),
        S::Empty | S::EmptyError => matches!(action, A::Refresh | A::Restart),
        S::EmptyProgress => matches!(
            action,
            A::Restart | A::PageLoaded(_) | A::EmptyPageLoaded | A::PageLoadFailed(_) | A::StopLoading
        ),
        S::Data { .. } => matches!(
            action,
            A::Restart | A::Refresh | A::LoadMore | A::ContentRefreshed(_)
        ),
        S::AllData { .. } => matches!(action, A::Restart | A::Refresh | A::ContentRefreshed(_)),
        S::Refreshing { .. } => matches!(
            action,
            A::Restart | A::PageLoaded(_) | A::EmptyPageLoaded | A::PageLoadFailed(_) | A::StopLoading
        ),
        S::NextPageLoading { .. } => matches!(
            action,
            A::Restart
                | A::Refresh
                | A::PageLoaded(_)
                | A::EmptyPageLoaded
                | A::PageLoadFailed(_)
                | A::StopLoading
        ),
    }
}

#[test]
fn unlisted_pairs_are_noops() {
    let mut checked = 0;
    for state in sample_states() {
        for action in sample_actions() {
            if handled(&state, &action) {
                continue;
            }
            let (next, effects) = state.clone().reduce(action.clone());
            assert_eq!(next, state, "{state:?} + {action:?} changed state");
            assert!(effects.is_empty(), "{state:?} + {action:?} produced effects");
            checked += 1;
        }
    }
    assert!(checked > 30);
}

#[test]
fn listed_pairs_always_act() {
    for state in sample_states() {
        for action in sample_actions() {
            if !handled(&state, &action) {
                continue;
            }
            let (next, effects) = state.clone().reduce(action.clone());
            assert!(
                next != state || !effects.is_empty(),
                "{state:?} + {action:?} was ignored"
            );
        }
    }
}

#[test]
fn double_refresh_does_not_reset_again() {
    let (refreshing, _) = ListState::Data {
        page_count: 4,
        items: vec![1, 2, 3],
    }
    .reduce::<&str>(ListAction::Refresh);

    let (again, effects) = refreshing.clone().reduce::<&str>(ListAction::Refresh);

    assert_eq!(again, refreshing);
    assert!(effects.is_empty());
}

#[test]
fn reduce_is_deterministic() {
    for state in sample_states() {
        for action in sample_actions() {
            let first = state.clone().reduce(action.clone());
            let second = state.clone().reduce(action);
            assert_eq!(first, second);
        }
    }
}
