//! Core interfaces and types.

pub mod autocomplete;
pub mod callbacks;
pub mod clipboard;
pub mod highlight;
pub mod input;
pub mod input_event;
pub mod keybindings;
pub mod output;
pub mod terminal;
pub mod text;
