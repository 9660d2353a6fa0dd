/// Tag put in front of every line so the output lines up with the host console.
pub const LOG_TAG: &str = "[MDL]";

/// Prefixes `message` with [`LOG_TAG`].
pub fn format_log(message: impl std::fmt::Display) -> String {
    format!("{LOG_TAG} {message}")
}
