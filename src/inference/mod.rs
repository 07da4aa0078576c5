pub mod provider;
pub mod providers;
pub mod transformer;
pub mod types;

pub use provider::{CompletionProvider, CompletionRequest, PrepareProgress, ProviderError};
pub use providers::{LmStudioProvider, OpenRouterProvider};
pub use transformer::{TransformError, TransformSettings, Transformer};
pub use types::{Context, ContextSegment, Effort, Source, StreamChunk};
