//! Environment and prompt configuration.

use std::env;

use once_cell::sync::Lazy;

use crate::core::keybindings::KeyBindings;
use crate::core::text::ansi::ConsoleFormat;

pub const MIN_COMPLETION_ITEMS: usize = 3;
pub const MAX_COMPLETION_ITEMS: usize = 20;

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub tui_debug: bool,
    pub debug_redraw: bool,
    pub write_log: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            tui_debug: env_flag("TAPE_PROMPT_DEBUG"),
            debug_redraw: env_flag("TAPE_PROMPT_DEBUG_REDRAW"),
            write_log: env_string_opt("TAPE_PROMPT_WRITE_LOG"),
        }
    }
}

static ENV_CONFIG: Lazy<EnvConfig> = Lazy::new(EnvConfig::from_env);

/// Process-wide environment configuration, read once.
pub fn env_config() -> &'static EnvConfig {
    &ENV_CONFIG
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

/// Per-session prompt options.
#[derive(Debug, Clone)]
pub struct PromptConfig {
    /// Drawn before the first row; continuation rows are indented by its width.
    pub prompt: String,
    /// Inserted by Tab and substituted for tabs in pasted text.
    pub indent: String,
    pub max_completion_items: usize,
    pub completion_description_lines: usize,
    pub selection_format: ConsoleFormat,
    pub selected_completion_format: ConsoleFormat,
    pub key_bindings: KeyBindings,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            indent: "    ".to_string(),
            max_completion_items: 8,
            completion_description_lines: 3,
            selection_format: ConsoleFormat::inverted(),
            selected_completion_format: ConsoleFormat::inverted(),
            key_bindings: KeyBindings::default(),
        }
    }
}

impl PromptConfig {
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Visible completion rows, clamped to a usable range.
    pub fn completion_rows(&self) -> usize {
        self.max_completion_items
            .clamp(MIN_COMPLETION_ITEMS, MAX_COMPLETION_ITEMS)
    }
}

#[cfg(test)]
mod tests {
    use super::{EnvConfig, PromptConfig};
    use std::env;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn env_defaults_are_false() {
        let _lock = env_lock();
        let _g1 = set_env_guard("TAPE_PROMPT_DEBUG", None);
        let _g2 = set_env_guard("TAPE_PROMPT_DEBUG_REDRAW", None);
        let _g3 = set_env_guard("TAPE_PROMPT_WRITE_LOG", None);

        let config = EnvConfig::from_env();
        assert!(!config.tui_debug);
        assert!(!config.debug_redraw);
        assert!(config.write_log.is_none());
    }

    #[test]
    fn env_flags_set_to_one_enable() {
        let _lock = env_lock();
        let _g1 = set_env_guard("TAPE_PROMPT_DEBUG", Some("1"));
        let _g2 = set_env_guard("TAPE_PROMPT_DEBUG_REDRAW", Some("1"));
        let _g3 = set_env_guard("TAPE_PROMPT_WRITE_LOG", Some("/tmp/prompt.log"));

        let config = EnvConfig::from_env();
        assert!(config.tui_debug);
        assert!(config.debug_redraw);
        assert_eq!(config.write_log.as_deref(), Some("/tmp/prompt.log"));
    }

    #[test]
    fn other_flag_values_disable() {
        let _lock = env_lock();
        let _g1 = set_env_guard("TAPE_PROMPT_DEBUG", Some("true"));
        let _g2 = set_env_guard("TAPE_PROMPT_WRITE_LOG", Some("  "));
        let config = EnvConfig::from_env();
        assert!(!config.tui_debug);
        assert!(config.write_log.is_none());
    }

    #[test]
    fn completion_rows_are_clamped() {
        let mut config = PromptConfig::default();
        assert_eq!(config.completion_rows(), 8);
        config.max_completion_items = 1;
        assert_eq!(config.completion_rows(), 3);
        config.max_completion_items = 99;
        assert_eq!(config.completion_rows(), 20);
    }
}
