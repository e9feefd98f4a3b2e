//! Bidirectional window over a reverse-chronological message transcript.
//!
//! Offset 0 is the newest message. The window grows at the tail when older
//! messages are requested and at the head when the remote total count grows.
//! `current_offset` is the offset of `items[0]`, except in
//! `NewMessagesLoading` after a head-growth notification, where it is
//! negative: the window still starts at the old head and `-current_offset`
//! newer messages are being fetched.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PORTION_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageWindowState<T> {
    NotInitialized,
    Empty,
    EmptyProgress,
    EmptyError,
    Data {
        total_count: usize,
        current_offset: i64,
        items: Vec<T>,
    },
    OldMessagesLoading {
        total_count: usize,
        current_offset: i64,
        items: Vec<T>,
    },
    NewMessagesLoading {
        total_count: usize,
        current_offset: i64,
        items: Vec<T>,
    },
}

impl<T> Default for MessageWindowState<T> {
    fn default() -> Self {
        Self::NotInitialized
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageWindowAction<T, E> {
    Refresh,
    Restart,
    LoadOldMessages,
    LoadNewMessages,
    PageLoaded { total_count: usize, items: Vec<T> },
    PageLoadFailed(E),
    /// The authoritative remote message count changed (send, poll, push).
    TotalCountChanged(usize),
    StopLoading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageWindowSideEffect<E> {
    LoadPage { offset: usize, count: usize },
    EmitError(E),
}

type Transition<T, E> = (MessageWindowState<T>, Vec<MessageWindowSideEffect<E>>);

impl<T> MessageWindowState<T> {
    pub fn new() -> Self {
        Self::NotInitialized
    }

    pub fn reduce<E>(self, action: MessageWindowAction<T, E>) -> Transition<T, E> {
        self.reduce_with_portion(action, DEFAULT_PORTION_SIZE)
    }

    /// Same as [`reduce`](Self::reduce) with an explicit fetch portion size.
    ///
    /// A `TotalCountChanged` growth only fetches the new head when the window
    /// sits at offset 0. A scrolled window is re-anchored by the growth with
    /// no fetch, unlike an unconditional `LoadPage(0, growth)`, which would
    /// leave a gap between the new head and the loaded items. Newer messages
    /// then arrive through `LoadNewMessages`.
    pub fn reduce_with_portion<E>(
        self,
        action: MessageWindowAction<T, E>,
        portion: usize,
    ) -> Transition<T, E> {
        use MessageWindowAction as A;
        use MessageWindowState as S;

        match (self, action) {
            (state, A::Restart) if !matches!(state, S::NotInitialized) => reset(portion),
            (S::NotInitialized | S::Empty | S::EmptyError, A::Refresh) => reset(portion),
            (S::Empty, A::TotalCountChanged(total)) if total > 0 => reset(portion),

            (S::EmptyProgress, A::PageLoaded { total_count, items }) => {
                if items.is_empty() {
                    (S::Empty, Vec::new())
                } else {
                    (
                        S::Data {
                            total_count,
                            current_offset: 0,
                            items,
                        },
                        Vec::new(),
                    )
                }
            }
            (S::EmptyProgress, A::PageLoadFailed(error)) => (
                S::EmptyError,
                vec![MessageWindowSideEffect::EmitError(error)],
            ),
            (S::EmptyProgress, A::StopLoading) => (S::Empty, Vec::new()),

            (
                S::Data {
                    total_count,
                    current_offset,
                    items,
                },
                action,
            ) => reduce_data(total_count, current_offset, items, action, portion),

            (
                S::OldMessagesLoading {
                    total_count,
                    current_offset,
                    items,
                },
                A::PageLoaded {
                    total_count: new_total,
                    items: page,
                },
            ) => {
                if new_total < total_count {
                    return reset(portion);
                }
                if new_total > total_count {
                    // The head grew while we were paging back, so the page we
                    // got overlaps the window. Shift and ask again.
                    let shifted = current_offset + (new_total - total_count) as i64;
                    let next = to_index(shifted + items.len() as i64);
                    return (
                        S::OldMessagesLoading {
                            total_count: new_total,
                            current_offset: shifted,
                            items,
                        },
                        vec![MessageWindowSideEffect::LoadPage {
                            offset: next,
                            count: portion,
                        }],
                    );
                }
                let mut items = items;
                items.extend(page);
                (
                    S::Data {
                        total_count,
                        current_offset,
                        items,
                    },
                    Vec::new(),
                )
            }

            (
                S::NewMessagesLoading {
                    total_count,
                    current_offset,
                    items,
                },
                A::PageLoaded {
                    total_count: new_total,
                    items: page,
                },
            ) => {
                if new_total < total_count {
                    return reset(portion);
                }
                let base = if current_offset < 0 {
                    0
                } else {
                    (current_offset - page.len() as i64).max(0)
                };
                let mut merged = page;
                merged.extend(items);
                (
                    S::Data {
                        total_count: new_total,
                        current_offset: base + (new_total - total_count) as i64,
                        items: merged,
                    },
                    Vec::new(),
                )
            }

            (
                S::OldMessagesLoading {
                    total_count,
                    current_offset,
                    items,
                },
                A::PageLoadFailed(error),
            ) => (
                S::Data {
                    total_count,
                    current_offset,
                    items,
                },
                vec![MessageWindowSideEffect::EmitError(error)],
            ),
            (
                S::OldMessagesLoading {
                    total_count,
                    current_offset,
                    items,
                },
                A::StopLoading,
            ) => (
                S::Data {
                    total_count,
                    current_offset,
                    items,
                },
                Vec::new(),
            ),

            (
                S::NewMessagesLoading {
                    total_count,
                    current_offset,
                    items,
                },
                A::PageLoadFailed(error),
            ) => (
                S::Data {
                    total_count,
                    current_offset: current_offset.abs(),
                    items,
                },
                vec![MessageWindowSideEffect::EmitError(error)],
            ),
            (
                S::NewMessagesLoading {
                    total_count,
                    current_offset,
                    items,
                },
                A::StopLoading,
            ) => (
                S::Data {
                    total_count,
                    current_offset: current_offset.abs(),
                    items,
                },
                Vec::new(),
            ),

            (state, _) => (state, Vec::new()),
        }
    }

    pub fn loaded_items(&self) -> &[T] {
        match self {
            Self::Data { items, .. }
            | Self::OldMessagesLoading { items, .. }
            | Self::NewMessagesLoading { items, .. } => items,
            Self::NotInitialized | Self::Empty | Self::EmptyProgress | Self::EmptyError => &[],
        }
    }

    pub fn total_count(&self) -> usize {
        match self {
            Self::Data { total_count, .. }
            | Self::OldMessagesLoading { total_count, .. }
            | Self::NewMessagesLoading { total_count, .. } => *total_count,
            Self::NotInitialized | Self::Empty | Self::EmptyProgress | Self::EmptyError => 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            Self::EmptyProgress | Self::OldMessagesLoading { .. } | Self::NewMessagesLoading { .. }
        )
    }

    pub fn map<R>(&self, mut mapper: impl FnMut(&T, usize, &[T]) -> R) -> MessageWindowState<R> {
        let mut project = |items: &[T]| -> Vec<R> {
            items
                .iter()
                .enumerate()
                .map(|(index, item)| mapper(item, index, items))
                .collect()
        };
        match self {
            Self::NotInitialized => MessageWindowState::NotInitialized,
            Self::Empty => MessageWindowState::Empty,
            Self::EmptyProgress => MessageWindowState::EmptyProgress,
            Self::EmptyError => MessageWindowState::EmptyError,
            Self::Data {
                total_count,
                current_offset,
                items,
            } => MessageWindowState::Data {
                total_count: *total_count,
                current_offset: *current_offset,
                items: project(items),
            },
            Self::OldMessagesLoading {
                total_count,
                current_offset,
                items,
            } => MessageWindowState::OldMessagesLoading {
                total_count: *total_count,
                current_offset: *current_offset,
                items: project(items),
            },
            Self::NewMessagesLoading {
                total_count,
                current_offset,
                items,
            } => MessageWindowState::NewMessagesLoading {
                total_count: *total_count,
                current_offset: *current_offset,
                items: project(items),
            },
        }
    }
}

fn reduce_data<T, E>(
    total_count: usize,
    current_offset: i64,
    items: Vec<T>,
    action: MessageWindowAction<T, E>,
    portion: usize,
) -> Transition<T, E> {
    use MessageWindowAction as A;
    use MessageWindowState as S;

    match action {
        A::LoadOldMessages => {
            let loaded_end = current_offset + items.len() as i64;
            if loaded_end >= total_count as i64 {
                return (
                    S::Data {
                        total_count,
                        current_offset,
                        items,
                    },
                    Vec::new(),
                );
            }
            (
                S::OldMessagesLoading {
                    total_count,
                    current_offset,
                    items,
                },
                vec![MessageWindowSideEffect::LoadPage {
                    offset: to_index(loaded_end),
                    count: portion,
                }],
            )
        }
        A::LoadNewMessages if current_offset > 0 => {
            let start = (current_offset - portion as i64).max(0);
            (
                S::NewMessagesLoading {
                    total_count,
                    current_offset,
                    items,
                },
                vec![MessageWindowSideEffect::LoadPage {
                    offset: to_index(start),
                    count: to_index(current_offset - start),
                }],
            )
        }
        A::TotalCountChanged(new_total) if new_total > total_count => {
            let growth = new_total - total_count;
            if current_offset == 0 {
                (
                    S::NewMessagesLoading {
                        total_count: new_total,
                        current_offset: -(growth as i64),
                        items,
                    },
                    vec![MessageWindowSideEffect::LoadPage {
                        offset: 0,
                        count: growth,
                    }],
                )
            } else {
                // Not at the head: the new messages are not adjacent to the
                // window, so only re-anchor it.
                (
                    S::Data {
                        total_count: new_total,
                        current_offset: current_offset + growth as i64,
                        items,
                    },
                    Vec::new(),
                )
            }
        }
        A::TotalCountChanged(new_total) if new_total < total_count => reset(portion),
        _ => (
            S::Data {
                total_count,
                current_offset,
                items,
            },
            Vec::new(),
        ),
    }
}

fn reset<T, E>(portion: usize) -> Transition<T, E> {
    (
        MessageWindowState::EmptyProgress,
        vec![MessageWindowSideEffect::LoadPage {
            offset: 0,
            count: portion,
        }],
    )
}

fn to_index(offset: i64) -> usize {
    usize::try_from(offset).unwrap_or(0)
}
