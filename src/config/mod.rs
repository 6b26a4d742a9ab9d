//! Layered configuration for merge runs.
//!
//! Configuration is assembled from several tiers with field-by-field merging,
//! lowest priority first:
//! 1. **Defaults** - built in
//! 2. **User** - `$PACK_MERGER_USER_DIR/config.yaml` (default: the platform
//!    config dir, e.g. `~/.config/pack-merger/`)
//! 3. **Project** - `./pack-merger.yaml`, `./pack-merger.yml` or `./pack-merger.json`
//! 4. **Explicit** - a file passed with `--config` (replaces the project tier)
//! 5. **Environment** - variables listed below
//! 6. **CLI** - flags applied by the binary
//!
//! ## Environment Variables
//! - `PACK_MERGER_USER_DIR` - User config dir
//! - `PACK_MERGER_INPUT_DIR` - Directory of input archives
//! - `PACK_MERGER_OUT_DIR` - Output directory
//! - `PACK_MERGER_DUPLICATE_WARNINGS` - `true`/`false` toggle for duplicate warnings

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
