//! Command classification for inbound direct-message text.
//!
//! Commands start with a backslash marker. Classification is pure: prefix
//! and equality checks in a fixed priority order, first match wins.
//! Numeric arguments are parsed later by the conversation.

/// Starts a fresh conversation (exact match).
pub const START_MARKER: &str = "\\start";
/// Ends the current conversation (exact match).
pub const END_MARKER: &str = "\\end";
/// Prepends system-role content (prefix).
pub const SYSTEM_ROLE_MARKER: &str = "\\sys_role";
/// Sets the sampling temperature (prefix).
pub const TEMPERATURE_MARKER: &str = "\\temp_set";
/// Sets the completion token limit (prefix).
pub const MAX_TOKENS_MARKER: &str = "\\max_tokens_set";
/// Reports the current settings (exact match).
pub const SETTINGS_MARKER: &str = "\\settings_get";

/// A classified inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    End,
    /// Argument is the text after the marker, trimmed.
    SetSystemRole(String),
    /// Raw, unparsed temperature argument.
    SetTemperature(String),
    /// Raw, unparsed max-tokens argument.
    SetMaxTokens(String),
    GetSettings,
    /// Anything else; the full text verbatim.
    Prompt(String),
}

impl Command {
    /// Classify raw message text.
    pub fn parse(text: &str) -> Self {
        if text == START_MARKER {
            return Command::Start;
        }
        if text == END_MARKER {
            return Command::End;
        }
        if let Some(arg) = text.strip_prefix(SYSTEM_ROLE_MARKER) {
            return Command::SetSystemRole(arg.trim().to_string());
        }
        if let Some(arg) = text.strip_prefix(TEMPERATURE_MARKER) {
            return Command::SetTemperature(arg.trim().to_string());
        }
        if let Some(arg) = text.strip_prefix(MAX_TOKENS_MARKER) {
            return Command::SetMaxTokens(arg.trim().to_string());
        }
        if text == SETTINGS_MARKER {
            return Command::GetSettings;
        }
        Command::Prompt(text.to_string())
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::End => "end",
            Command::SetSystemRole(_) => "sys_role",
            Command::SetTemperature(_) => "temp_set",
            Command::SetMaxTokens(_) => "max_tokens_set",
            Command::GetSettings => "settings_get",
            Command::Prompt(_) => "prompt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_and_end() {
        assert_eq!(Command::parse("\\start"), Command::Start);
        assert_eq!(Command::parse("\\end"), Command::End);
    }

    #[test]
    fn test_start_and_end_require_exact_match() {
        assert_eq!(
            Command::parse("\\start now"),
            Command::Prompt("\\start now".to_string())
        );
        assert_eq!(
            Command::parse(" \\end"),
            Command::Prompt(" \\end".to_string())
        );
    }

    #[test]
    fn test_parse_system_role_trims_argument() {
        assert_eq!(
            Command::parse("\\sys_role   be concise  "),
            Command::SetSystemRole("be concise".to_string())
        );
        assert_eq!(
            Command::parse("\\sys_role"),
            Command::SetSystemRole(String::new())
        );
    }

    #[test]
    fn test_parse_numeric_setters_keep_raw_text() {
        assert_eq!(
            Command::parse("\\temp_set 1.5"),
            Command::SetTemperature("1.5".to_string())
        );
        assert_eq!(
            Command::parse("\\max_tokens_set abc"),
            Command::SetMaxTokens("abc".to_string())
        );
    }

    #[test]
    fn test_parse_settings() {
        assert_eq!(Command::parse("\\settings_get"), Command::GetSettings);
        assert_eq!(
            Command::parse("\\settings_get please"),
            Command::Prompt("\\settings_get please".to_string())
        );
    }

    #[test]
    fn test_prompt_is_verbatim() {
        assert_eq!(
            Command::parse("  hello, world  "),
            Command::Prompt("  hello, world  ".to_string())
        );
        assert_eq!(Command::parse(""), Command::Prompt(String::new()));
    }

    #[test]
    fn test_prefix_match_is_greedy_on_marker_only() {
        // Anything after the marker counts as the argument, even without a space.
        assert_eq!(
            Command::parse("\\sys_rolex"),
            Command::SetSystemRole("x".to_string())
        );
    }

    #[test]
    fn test_label() {
        assert_eq!(Command::parse("hi").label(), "prompt");
        assert_eq!(Command::GetSettings.label(), "settings_get");
    }
}
