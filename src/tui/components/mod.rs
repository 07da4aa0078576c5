//! # TUI Components
//!
//! This module contains all UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: step, model, engine readiness and status
//! - `BigText`: slide text laid out at a fitted scale
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `TextEditor`: multi-line editor for the free text and the outline
//! - `ReasoningPane` / `TransformView`: scrollable reasoning, live draft
//!
//! ### Presenter-Backed Components
//!
//! `SlidePreview` and `Presentation` borrow the core `Presenter` mutably for
//! the render pass, because the font size depends on the area they are given.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs             (this file)
//! ├── title_bar.rs       (Top status bar)
//! ├── text_editor/       (Editor with cursor and wrapping)
//! ├── transform_view.rs  (Reasoning + streaming outline)
//! ├── big_text.rs        (Scaled slide text and its measurer)
//! ├── slide_preview.rs   (Deck preview card)
//! └── presentation.rs    (Full-screen slide show)
//! ```

pub mod big_text;
pub mod presentation;
pub mod slide_preview;
pub mod text_editor;
mod title_bar;
pub mod transform_view;

pub use presentation::Presentation;
pub use slide_preview::SlidePreview;
pub use text_editor::{EditorEvent, TextEditor};
pub use title_bar::{EngineTone, TitleBar};
pub use transform_view::{ReasoningPane, ReasoningState, TransformView};
