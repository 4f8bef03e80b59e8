//! Keyboard shortcut registry and documentation.

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Clear,
    Export,
    Import,
    ToggleMirror,
    NextColor,
    SizeDown,
    SizeUp,
    OpacityDown,
    OpacityUp,
    /// Toggle the shape group at this display index.
    ToggleGroup(usize),
    ShowHelp,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        action: ShortcutAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+S").
    pub fn format(&self) -> String {
        if self.ctrl {
            format!("Ctrl+{}", self.key)
        } else {
            self.key.to_string()
        }
    }
}

const GROUP_KEYS: [&str; 9] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        use ShortcutAction::*;

        let mut shortcuts = vec![
            Shortcut::new("C", false, Clear, "Clear the drawing"),
            Shortcut::new("Delete", false, Clear, "Clear the drawing"),
            Shortcut::new("S", true, Export, "Export to PNG"),
            Shortcut::new("E", true, Export, "Export to PNG"),
            Shortcut::new("O", true, Import, "Import SVG shapes..."),
            Shortcut::new("M", false, ToggleMirror, "Toggle mirror symmetry"),
            Shortcut::new("P", false, NextColor, "Next brush color"),
            Shortcut::new("[", false, SizeDown, "Smaller brush"),
            Shortcut::new("]", false, SizeUp, "Larger brush"),
            Shortcut::new(",", false, OpacityDown, "Lower opacity"),
            Shortcut::new(".", false, OpacityUp, "Higher opacity"),
            Shortcut::new("H", false, ShowHelp, "List shortcuts"),
        ];
        shortcuts.extend(
            GROUP_KEYS
                .into_iter()
                .enumerate()
                .map(|(index, key)| Shortcut::new(key, false, ToggleGroup(index), "Toggle shape group")),
        );
        shortcuts
    }

    /// Find the action bound to a key. `key` is matched case-insensitively.
    pub fn lookup(key: &str, ctrl: bool) -> Option<ShortcutAction> {
        Self::all()
            .into_iter()
            .find(|s| s.ctrl == ctrl && s.key.eq_ignore_ascii_case(key))
            .map(|s| s.action)
    }

    /// Log all shortcuts.
    pub fn log_all() {
        log::info!("=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            log::info!("  {:10} {}", shortcut.format(), shortcut.description);
        }
    }
}
