//! Verbatim script tree copy to `BP/scripts/<package>/`.

use crate::error::{MergeError, MergeResult};
use crate::fsutil::copy_tree;
use crate::hooks::{HookContext, MergeHook, SubDirectory};
use crate::types::ModuleKind;
use async_trait::async_trait;
use tracing::debug;

#[derive(Default)]
pub struct ScriptStrategy;

impl ScriptStrategy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MergeHook for ScriptStrategy {
    fn name(&self) -> &str {
        "scripts"
    }

    fn accepts(&self, kind: ModuleKind, name: &str) -> bool {
        kind == ModuleKind::Behavior && name == "scripts"
    }

    async fn merge_subdirectory(&self, ctx: &HookContext, sub: &SubDirectory) -> MergeResult<bool> {
        if !self.accepts(sub.module_kind, &sub.name) {
            return Ok(false);
        }

        let dest = ctx.behavior_root().join("scripts").join(&sub.package);
        if dest.exists() {
            return Err(MergeError::DestinationExists(dest));
        }
        let copied = copy_tree(&sub.path, &dest).await?;
        debug!(subdirectory = %sub.display_name, copied, "Copied scripts");
        Ok(true)
    }
}
