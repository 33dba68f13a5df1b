//! Terminal output with CI fallback
//!
//! Uses `cliclack` for styled output when attached to an interactive
//! terminal and plain `[OK]` / `[WARN]` prefixed lines everywhere else, so
//! scripted runs and tests see stable text.

mod context;
mod output;
mod progress;
mod theme;

pub use context::UiContext;
pub use output::{
    human_bytes, key_value, list_item, outro_success, outro_warn, remark, section, step_info,
    step_ok, step_ok_detail, step_warn_hint,
};
pub use progress::TaskSpinner;
pub use theme::{init_theme, PruneTheme};
