//! # Core Application Logic
//!
//! This module contains Takahashi's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────────┐
//!                    │            CORE             │
//!                    │                             │
//!                    │  • outline / tags (parse)   │
//!                    │  • navigation / fit         │
//!                    │  • presenter (composition)  │
//!                    │  • engine (readiness)       │
//!                    │  • state + action (reducer) │
//!                    │                             │
//!                    │  No UI. I/O only in config  │
//!                    │  and document.              │
//!                    └──────────────┬──────────────┘
//!                                   │
//!                                   ▼
//!                            ┌────────────┐
//!                            │    TUI     │
//!                            │  Adapter   │
//!                            │ (ratatui)  │
//!                            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`outline`]: dash-marker outline → `Deck`
//! - [`tags`]: `<reasoning>` / `<answer>` extraction
//! - [`navigation`]: bounds-checked slide index
//! - [`fit`]: largest font size that fits a container
//! - [`presenter`]: deck + navigation + fit behind one surface
//! - [`engine`]: model readiness session
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and `update()` reducer

pub mod action;
pub mod config;
pub mod document;
pub mod engine;
pub mod fit;
pub mod navigation;
pub mod outline;
pub mod presenter;
pub mod state;
pub mod tags;
