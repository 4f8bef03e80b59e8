//! Alchemy Brush Application
//!
//! The native shell: a window presenting the drawing surface, pointer and
//! keyboard wiring, file dialogs and drag-and-drop shape import.

mod app;
mod shortcuts;

pub use app::{App, AppConfig};
pub use shortcuts::{Shortcut, ShortcutAction, ShortcutRegistry};
