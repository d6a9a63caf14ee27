//
// debug.rs
//
// Opt-in diagnostic logging, active only when `debug` is set in the config
//

/// Severity of a diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugKind {
    #[default]
    Info,
    Err,
}

pub const LOG_TARGET: &str = "scope_trimmer";

/// Format a diagnostic line the way it appears in the host log.
pub fn format_debug_line(source: &str, message: &str) -> String {
    format!("[scope-trimmer debug: {source}] {message}")
}

/// Emit a diagnostic line when `enabled` is true; otherwise do nothing.
pub fn debug(enabled: bool, source: &str, message: &str, kind: DebugKind) {
    if !enabled {
        return;
    }

    let line = format_debug_line(source, message);
    match kind {
        DebugKind::Info => log::info!(target: LOG_TARGET, "{}", line),
        DebugKind::Err => log::error!(target: LOG_TARGET, "{}", line),
    }
}
