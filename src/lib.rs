//! Takahashi library exports: outline parsing, slide fitting, model-backed
//! text transformation and the terminal front end.

use clap::ValueEnum;

pub mod core;
pub mod inference;
pub mod tui;

#[cfg(test)]
pub mod test_support;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    #[default]
    OpenRouter,
    LmStudio,
}

impl Provider {
    /// Name used in config files and `TAKAHASHI_PROVIDER`.
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::OpenRouter => "openrouter",
            Provider::LmStudio => "lmstudio",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names_match_config_values() {
        assert_eq!(Provider::OpenRouter.as_str(), "openrouter");
        assert_eq!(Provider::LmStudio.as_str(), "lmstudio");
        assert_eq!(Provider::default(), Provider::OpenRouter);
    }
}
