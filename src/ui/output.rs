//! Output functions for consistent CLI formatting

use super::context::UiContext;
use console::style;
use indicatif::HumanBytes;

/// Display success outro
pub fn outro_success(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).green().bold()).ok();
    } else {
        println!();
        println!("{}", plain_line("OK", message).trim_start());
    }
}

/// Display warning outro
pub fn outro_warn(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).yellow().bold()).ok();
    } else {
        println!();
        println!("{}", plain_line("WARN", message).trim_start());
    }
}

/// Display a section header
pub fn section(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::info(style(title).bold()).ok();
    } else {
        println!();
        println!("{}", style(title).bold());
    }
}

/// Display one entry of a listing (a file name, usually)
pub fn list_item(ctx: &UiContext, item: &str) {
    if ctx.use_fancy_output() {
        println!("{}  {}", style("│").cyan(), item);
    } else {
        println!("  {}", item);
    }
}

/// Display a success step
pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(message).ok();
    } else {
        println!("{}", plain_line("OK", message));
    }
}

/// Display a success step with detail
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(format!("{} ({})", message, style(detail).dim())).ok();
    } else {
        println!("{}", plain_line("OK", &format!("{} ({})", message, detail)));
    }
}

/// Display a warning step with hint
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::warning(format!("{} - {}", message, style(hint).dim())).ok();
    } else {
        println!("{}", plain_line("WARN", &format!("{} - {}", message, hint)));
    }
}

/// Display an info step
pub fn step_info(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::info(message).ok();
    } else {
        println!("{}", plain_line("INFO", message));
    }
}

/// Display a remark/hint
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::remark(message).ok();
    } else {
        println!("  {}", style(message).dim());
    }
}

/// Print styled key-value pair
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Indented `[TAG] message` line used when not on a terminal
fn plain_line(tag: &str, message: &str) -> String {
    let label = format!("[{}]", tag);
    let label = match tag {
        "OK" => style(label).green(),
        "WARN" => style(label).yellow(),
        "FAIL" => style(label).red(),
        _ => style(label).cyan(),
    };
    format!("  {} {}", label, message)
}

/// Format a byte count with binary units (`1.50 MiB`)
pub fn human_bytes(bytes: u64) -> String {
    HumanBytes(bytes).to_string()
}
