use crate::stage::StageContext;
use std::{fmt, sync::Arc};

/// How a stage builds its prompt.
///
/// Dynamic instructions are pure functions of the stage's context view
/// (shared state plus the artifact store); they hold no other state, so they
/// can be unit tested without any capability call.
#[derive(Clone)]
pub enum InstructionSource {
    Static(String),
    Dynamic(Arc<dyn for<'a> Fn(&StageContext<'a>) -> String + Send + Sync>),
}

impl InstructionSource {
    /// Wrap a render function.
    pub fn dynamic<F>(f: F) -> Self
    where
        F: for<'a> Fn(&StageContext<'a>) -> String + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(f))
    }

    /// Render the instruction against the current context.
    #[must_use]
    pub fn render(&self, ctx: &StageContext<'_>) -> String {
        match self {
            Self::Static(text) => text.clone(),
            Self::Dynamic(f) => f(ctx),
        }
    }
}

impl fmt::Debug for InstructionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Self::Dynamic(_) => f.debug_tuple("Dynamic").field(&"Function").finish(),
        }
    }
}

impl From<&str> for InstructionSource {
    fn from(text: &str) -> Self {
        Self::Static(text.to_string())
    }
}

impl From<String> for InstructionSource {
    fn from(text: String) -> Self {
        Self::Static(text)
    }
}
