use crate::{
    ListAction, ListSideEffect, ListState, MessageWindowAction, MessageWindowSideEffect,
    MessageWindowState,
};

/// A pure state machine driven by actions of type `A`.
pub trait Reducer<A>: Sized {
    type SideEffect;

    fn reduce(self, action: A) -> (Self, Vec<Self::SideEffect>);
}

impl<T, E> Reducer<ListAction<T, E>> for ListState<T> {
    type SideEffect = ListSideEffect<E>;

    fn reduce(self, action: ListAction<T, E>) -> (Self, Vec<Self::SideEffect>) {
        ListState::reduce(self, action)
    }
}

impl<T, E> Reducer<MessageWindowAction<T, E>> for MessageWindowState<T> {
    type SideEffect = MessageWindowSideEffect<E>;

    fn reduce(self, action: MessageWindowAction<T, E>) -> (Self, Vec<Self::SideEffect>) {
        MessageWindowState::reduce(self, action)
    }
}

/// Result of feeding one screen event through a [`ListUpdater`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Next<M, F> {
    pub model: M,
    /// False when the embedded list state came out unchanged; callers skip
    /// the re-render but must still run `effects`.
    pub model_changed: bool,
    pub effects: Vec<F>,
}

impl<M, F> Next<M, F> {
    pub fn unchanged(model: M) -> Self {
        Self {
            model,
            model_changed: false,
            effects: Vec::new(),
        }
    }
}

/// Embeds a list state machine into a screen model.
///
/// `M` is the screen model, `Ev` the screen event, `F` the screen effect,
/// `S` the embedded state and `A` its action type.
pub struct ListUpdater<M, Ev, F, S, A>
where
    S: Reducer<A>,
{
    extract: fn(&M) -> &S,
    map_event: fn(Ev) -> Result<A, Ev>,
    update_model: fn(M, S) -> M,
    map_effect: fn(&M, S::SideEffect) -> F,
}

impl<M, Ev, F, S, A> ListUpdater<M, Ev, F, S, A>
where
    S: Reducer<A> + Clone + PartialEq,
{
    pub const fn new(
        extract: fn(&M) -> &S,
        map_event: fn(Ev) -> Result<A, Ev>,
        update_model: fn(M, S) -> M,
        map_effect: fn(&M, S::SideEffect) -> F,
    ) -> Self {
        Self {
            extract,
            map_event,
            update_model,
            map_effect,
        }
    }

    /// Routes `event` into the embedded state machine.
    ///
    /// Events the mapper rejects leave the model untouched and produce no
    /// effects.
    pub fn update(&self, model: M, event: Ev) -> Next<M, F> {
        self.update_with(model, event, <S as Reducer<A>>::reduce)
    }

    /// Like [`update`](Self::update), with a caller-supplied transition in
    /// place of [`Reducer::reduce`], e.g. to pass a configured portion size.
    pub fn update_with(
        &self,
        model: M,
        event: Ev,
        reduce: impl FnOnce(S, A) -> (S, Vec<S::SideEffect>),
    ) -> Next<M, F> {
        let Ok(action) = (self.map_event)(event) else {
            return Next::unchanged(model);
        };

        let current = (self.extract)(&model).clone();
        let (next_state, side_effects) = reduce(current.clone(), action);

        let model_changed = next_state != current;
        let model = if model_changed {
            (self.update_model)(model, next_state)
        } else {
            model
        };
        let effects = side_effects
            .into_iter()
            .map(|effect| (self.map_effect)(&model, effect))
            .collect();

        Next {
            model,
            model_changed,
            effects,
        }
    }
}
