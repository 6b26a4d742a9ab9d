//! Built-in merge strategies, one per known subdirectory category.

pub mod identifiers;
pub mod models;
pub mod scripts;
pub mod texts;
pub mod textures;

pub use identifiers::{IDENTIFIER_CATEGORIES, IdentifierStrategy, content_identifier};
pub use models::ModelStrategy;
pub use scripts::ScriptStrategy;
pub use texts::{TranslationStrategy, parse_lang};
pub use textures::TextureStrategy;

use crate::hooks::MergeHook;
use std::sync::Arc;

/// Fresh instances of every built-in strategy, in registration order.
///
/// Each call returns new, empty registries, so every run starts clean.
pub fn builtin_hooks() -> Vec<Arc<dyn MergeHook>> {
    let mut hooks: Vec<Arc<dyn MergeHook>> = IDENTIFIER_CATEGORIES
        .iter()
        .map(|&category| Arc::new(IdentifierStrategy::new(category)) as Arc<dyn MergeHook>)
        .collect();
    hooks.push(Arc::new(ModelStrategy::new()));
    hooks.push(Arc::new(TextureStrategy::new()));
    hooks.push(Arc::new(TranslationStrategy::new()));
    hooks.push(Arc::new(ScriptStrategy::new()));
    hooks
}
