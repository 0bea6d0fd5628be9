// Generation module
// Capability interface for the language model that writes answers

use crate::Result;

/// Text generation model, one synchronous call per prompt
pub trait Generator: Send + Sync {
    /// Generate a completion for `prompt`, returned verbatim
    fn generate(&self, prompt: &str) -> Result<String>;

    /// Name of the underlying model, for logs and status output
    fn model_name(&self) -> &str;
}
