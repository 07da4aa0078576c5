//! Streaming providers that speak the Responses API.

mod lmstudio;
mod openrouter;
mod responses;

pub use lmstudio::LmStudioProvider;
pub use openrouter::OpenRouterProvider;
