use serde::{Deserialize, Serialize};

/// Who a prompt segment speaks for. Providers map these to wire roles.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// The rules the model follows (system role)
    Directive,
    User,
    Model,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContextSegment {
    pub source: Source,
    pub content: String,
}

/// The messages sent to the model for one request: a directive followed by
/// whatever user and model turns the caller adds.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Context {
    pub items: Vec<ContextSegment>,
}

impl Context {
    /// Creates a Context whose first item is the given system directive.
    pub fn with_directive(directive: impl Into<String>) -> Self {
        Context {
            items: vec![ContextSegment {
                source: Source::Directive,
                content: directive.into(),
            }],
        }
    }

    pub fn add(&mut self, segment: ContextSegment) -> &ContextSegment {
        self.items.push(segment);
        &self.items[self.items.len() - 1]
    }

    pub fn add_user_message(&mut self, content: String) -> &ContextSegment {
        self.add(ContextSegment {
            source: Source::User,
            content,
        })
    }
}

/// How much the model may think before writing the outline.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    High,
    Medium,
    Low,
    /// Leave it to the model
    #[default]
    Auto,
    /// No reasoning at all; fastest
    None,
}

impl Effort {
    /// Ctrl+R order, wrapping from High back to None.
    pub fn next(self) -> Effort {
        match self {
            Effort::None => Effort::Auto,
            Effort::Auto => Effort::Low,
            Effort::Low => Effort::Medium,
            Effort::Medium => Effort::High,
            Effort::High => Effort::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Effort::High => "High",
            Effort::Medium => "Medium",
            Effort::Low => "Low",
            Effort::Auto => "Auto",
            Effort::None => "Off",
        }
    }
}

/// A piece of a streamed response.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    Content(String),
    /// Reasoning the provider reports out of band (not via `<reasoning>` tags).
    Thinking(String),
}
