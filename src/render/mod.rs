//! Rendering pipeline: code rows and overlay rows are assembled into a [`Frame`], which the
//! [`DiffRenderer`] turns into terminal commands.

pub mod code_view;
pub mod frame;
pub mod overlay;
pub mod renderer;

pub use code_view::{render_code_rows, CodeStyle, CodeView};
pub use frame::{Frame, Line, ScreenPosition, Span};
pub use overlay::{completion_overlay, OverlayStyle};
pub use renderer::{DiffRenderer, Viewport};
