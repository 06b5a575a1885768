//! Widget domain module.
//!
//! The widget is modelled as a single state holder (`WidgetState`) that is
//! only mutated through its transition methods. Each transition reports the
//! view effects a rendering layer should apply.
//!
//! # Module Structure
//!
//! - `state`: `WidgetState`, `PendingSend`, `ReplyOutcome`
//! - `effect`: `ViewEffect`, `Transition`
//! - `texts`: `WidgetTexts`, the canned strings the widget shows

mod effect;
mod state;
mod texts;

pub use effect::{Transition, ViewEffect};
pub use state::{PendingSend, ReplyOutcome, WidgetState};
pub use texts::{
    DEFAULT_CONNECTIVITY_ERROR, DEFAULT_FALLBACK_REPLY, DEFAULT_GREETING, WidgetTexts,
};
