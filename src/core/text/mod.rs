//! Text helpers (ANSI codec and width calculations).
//!
//! These helpers are pure (string in/string out) and live under `core` so the document model
//! and the renderer can share them.

pub mod ansi;
pub mod width;
