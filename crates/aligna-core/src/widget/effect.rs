//! View effects emitted by widget transitions.

/// A side effect the rendering layer should apply after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEffect {
    /// The message list changed; scroll to the latest message.
    ScrollToLatest,
    /// The widget became open and expanded; focus the input field.
    FocusInput,
}

/// The effects produced by a single transition.
///
/// An empty transition means nothing observable changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    effects: Vec<ViewEffect>,
}

impl Transition {
    pub fn none() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, effect: ViewEffect) {
        if !self.effects.contains(&effect) {
            self.effects.push(effect);
        }
    }

    pub(crate) fn with(mut self, effect: ViewEffect) -> Self {
        self.push(effect);
        self
    }

    /// Folds the effects of a later transition into this one.
    pub fn merge(mut self, other: Transition) -> Self {
        for effect in other.effects {
            self.push(effect);
        }
        self
    }

    pub fn effects(&self) -> &[ViewEffect] {
        &self.effects
    }

    pub fn contains(&self, effect: ViewEffect) -> bool {
        self.effects.contains(&effect)
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
