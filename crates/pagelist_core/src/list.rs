use serde::{Deserialize, Serialize};

/// State of a page-by-page loaded list.
///
/// `page_count` is the number of non-empty pages folded into `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListState<T> {
    NotInitialized,
    Empty,
    EmptyProgress,
    EmptyError,
    Data { page_count: usize, items: Vec<T> },
    Refreshing { page_count: usize, items: Vec<T> },
    NextPageLoading { page_count: usize, items: Vec<T> },
    AllData { page_count: usize, items: Vec<T> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction<T, E> {
    /// Pull-to-refresh: reload page 0 while keeping the loaded items.
    Refresh,
    /// Drop everything and reload page 0 (filter or scope change).
    Restart,
    LoadMore,
    PageLoaded(Vec<T>),
    EmptyPageLoaded,
    PageLoadFailed(E),
    /// Forget the in-flight request and settle on the last stable state.
    StopLoading,
    /// Replace the loaded items in place after a background reload.
    ContentRefreshed(Vec<T>),
}

impl<T, E> ListAction<T, E> {
    /// Wraps a fetched page, mapping an empty page to `EmptyPageLoaded`.
    pub fn from_page(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::EmptyPageLoaded
        } else {
            Self::PageLoaded(items)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSideEffect<E> {
    /// Fetch the page with this zero-based index.
    LoadPage(usize),
    EmitError(E),
}

impl<T> ListState<T> {
    pub fn new() -> Self {
        Self::NotInitialized
    }

    /// Applies an action and returns the next state plus the effects to run.
    pub fn reduce<E>(self, action: ListAction<T, E>) -> (Self, Vec<ListSideEffect<E>>) {
        use ListAction as A;
        use ListState as S;

        let action = match action {
            A::PageLoaded(items) if items.is_empty() => A::EmptyPageLoaded,
            other => other,
        };

        match (self, action) {
            (state, A::Restart) if !state.is_not_initialized() => first_page(),
            (S::NotInitialized | S::Empty | S::EmptyError, A::Refresh) => first_page(),

            (S::EmptyProgress, A::PageLoaded(items)) => (
                S::Data {
                    page_count: 1,
                    items,
                },
                Vec::new(),
            ),
            (S::EmptyProgress, A::EmptyPageLoaded | A::StopLoading) => (S::Empty, Vec::new()),
            (S::EmptyProgress, A::PageLoadFailed(error)) => {
                (S::EmptyError, vec![ListSideEffect::EmitError(error)])
            }

            (
                S::Data { page_count, items }
                | S::AllData { page_count, items }
                | S::NextPageLoading { page_count, items },
                A::Refresh,
            ) => (
                S::Refreshing { page_count, items },
                vec![ListSideEffect::LoadPage(0)],
            ),
            (S::Data { page_count, items }, A::LoadMore) => (
                S::NextPageLoading { page_count, items },
                vec![ListSideEffect::LoadPage(page_count)],
            ),
            (S::Data { page_count, .. }, A::ContentRefreshed(items)) => {
                (S::Data { page_count, items }, Vec::new())
            }
            (S::AllData { page_count, .. }, A::ContentRefreshed(items)) => {
                (S::AllData { page_count, items }, Vec::new())
            }

            (S::Refreshing { .. }, A::PageLoaded(items)) => (
                S::Data {
                    page_count: 1,
                    items,
                },
                Vec::new(),
            ),
            (S::Refreshing { .. }, A::EmptyPageLoaded) => (S::Empty, Vec::new()),

            (S::NextPageLoading { page_count, mut items }, A::PageLoaded(page)) => {
                items.extend(page);
                (
                    S::Data {
                        page_count: page_count + 1,
                        items,
                    },
                    Vec::new(),
                )
            }
            (S::NextPageLoading { page_count, items }, A::EmptyPageLoaded) => {
                (S::AllData { page_count, items }, Vec::new())
            }

            (
                S::Refreshing { page_count, items } | S::NextPageLoading { page_count, items },
                A::PageLoadFailed(error),
            ) => (
                S::Data { page_count, items },
                vec![ListSideEffect::EmitError(error)],
            ),
            (
                S::Refreshing { page_count, items } | S::NextPageLoading { page_count, items },
                A::StopLoading,
            ) => (S::Data { page_count, items }, Vec::new()),

            (state, _) => (state, Vec::new()),
        }
    }

    /// Items visible to the user; empty for the item-less variants.
    pub fn loaded_items(&self) -> &[T] {
        match self {
            Self::Data { items, .. }
            | Self::Refreshing { items, .. }
            | Self::NextPageLoading { items, .. }
            | Self::AllData { items, .. } => items,
            Self::NotInitialized | Self::Empty | Self::EmptyProgress | Self::EmptyError => &[],
        }
    }

    pub fn page_count(&self) -> usize {
        match self {
            Self::Data { page_count, .. }
            | Self::Refreshing { page_count, .. }
            | Self::NextPageLoading { page_count, .. }
            | Self::AllData { page_count, .. } => *page_count,
            Self::NotInitialized | Self::Empty | Self::EmptyProgress | Self::EmptyError => 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            Self::EmptyProgress | Self::Refreshing { .. } | Self::NextPageLoading { .. }
        )
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(self, Self::Refreshing { .. })
    }

    pub fn is_not_initialized(&self) -> bool {
        matches!(self, Self::NotInitialized)
    }

    /// Projects every item, keeping the variant and page counter.
    ///
    /// The mapper receives the item, its index and the whole item slice, so
    /// neighbours can be inspected (e.g. to draw date separators).
    pub fn map<R>(&self, mut mapper: impl FnMut(&T, usize, &[T]) -> R) -> ListState<R> {
        let mut project = |items: &[T]| -> Vec<R> {
            items
                .iter()
                .enumerate()
                .map(|(index, item)| mapper(item, index, items))
                .collect()
        };
        match self {
            Self::NotInitialized => ListState::NotInitialized,
            Self::Empty => ListState::Empty,
            Self::EmptyProgress => ListState::EmptyProgress,
            Self::EmptyError => ListState::EmptyError,
            Self::Data { page_count, items } => ListState::Data {
                page_count: *page_count,
                items: project(items),
            },
            Self::Refreshing { page_count, items } => ListState::Refreshing {
                page_count: *page_count,
                items: project(items),
            },
            Self::NextPageLoading { page_count, items } => ListState::NextPageLoading {
                page_count: *page_count,
                items: project(items),
            },
            Self::AllData { page_count, items } => ListState::AllData {
                page_count: *page_count,
                items: project(items),
            },
        }
    }
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self::NotInitialized
    }
}

fn first_page<T, E>() -> (ListState<T>, Vec<ListSideEffect<E>>) {
    (ListState::EmptyProgress, vec![ListSideEffect::LoadPage(0)])
}
