//! Keyboard shortcut handling
//!
//! Maps key presses from the host text input to authoring commands. A bound
//! key must suppress the widget's native behaviour before the command runs,
//! which is what [`KeyOutcome::prevent_default`] tells the host.

use crate::editor::commands::EditCommand;
use std::collections::HashMap;

/// Modifier keys that participate in a binding
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Modifier {
    /// Ctrl on Linux/Windows, Cmd on macOS
    Primary,
    Shift,
    Alt,
}

/// Logical key, as reported by the host
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Key {
    Character(String),
    Tab,
    Enter,
    Escape,
    Other(String),
}

impl Key {
    /// Character key, normalised to lowercase
    pub fn character(c: &str) -> Self {
        Key::Character(c.to_lowercase())
    }
}

/// A key combination
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct KeyBind {
    pub modifiers: Vec<Modifier>,
    pub key: Key,
}

impl KeyBind {
    pub fn new(modifiers: &[Modifier], key: Key) -> Self {
        let mut modifiers = modifiers.to_vec();
        modifiers.sort_by_key(|m| *m as u8);
        modifiers.dedup();
        Self { modifiers, key }
    }
}

/// A key press event from the host text input
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyPress {
    /// Key value, e.g. `"b"`, `"B"`, `"Tab"`
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Resolve into a binding; Ctrl and Meta both count as the primary modifier
    pub fn to_bind(&self) -> KeyBind {
        let mut modifiers = Vec::new();
        if self.ctrl || self.meta {
            modifiers.push(Modifier::Primary);
        }
        if self.shift {
            modifiers.push(Modifier::Shift);
        }
        if self.alt {
            modifiers.push(Modifier::Alt);
        }

        let key = match self.key.as_str() {
            "Tab" => Key::Tab,
            "Enter" => Key::Enter,
            "Escape" => Key::Escape,
            k if k.chars().count() == 1 => Key::character(k),
            k => Key::Other(k.to_string()),
        };

        KeyBind::new(&modifiers, key)
    }
}

/// Result of dispatching a key press
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Suppress the native behaviour and run the command
    Command(EditCommand),
    /// Not ours; let the host widget handle it (undo/redo included)
    Ignored,
}

impl KeyOutcome {
    pub fn prevent_default(&self) -> bool {
        matches!(self, KeyOutcome::Command(_))
    }
}

/// Shortcut table
#[derive(Clone, Debug)]
pub struct Keymap {
    binds: HashMap<KeyBind, EditCommand>,
}

impl Keymap {
    /// Default bindings: Ctrl/Cmd+B, Ctrl/Cmd+I, Ctrl/Cmd+K and Tab
    pub fn new() -> Self {
        let mut binds = HashMap::new();

        binds.insert(
            KeyBind::new(&[Modifier::Primary], Key::character("b")),
            EditCommand::Bold,
        );
        binds.insert(
            KeyBind::new(&[Modifier::Primary], Key::character("i")),
            EditCommand::Italic,
        );
        binds.insert(
            KeyBind::new(&[Modifier::Primary], Key::character("k")),
            EditCommand::Link,
        );
        binds.insert(KeyBind::new(&[], Key::Tab), EditCommand::Indent);

        Self { binds }
    }

    pub fn bind(&mut self, bind: KeyBind, command: EditCommand) {
        self.binds.insert(bind, command);
    }

    /// Look up a key press.
    ///
    /// An exact binding wins. Otherwise Shift and Alt are ignored, and Tab
    /// matches whatever modifiers are held.
    pub fn dispatch(&self, press: &KeyPress) -> KeyOutcome {
        let bind = press.to_bind();
        let primary_only: Vec<Modifier> = bind
            .modifiers
            .iter()
            .copied()
            .filter(|m| *m == Modifier::Primary)
            .collect();
        let relaxed = KeyBind::new(&primary_only, bind.key.clone());

        let command = self
            .binds
            .get(&bind)
            .or_else(|| self.binds.get(&relaxed))
            .or_else(|| match bind.key {
                Key::Tab => self.binds.get(&KeyBind::new(&[], Key::Tab)),
                _ => None,
            });

        match command {
            Some(&command) => KeyOutcome::Command(command),
            None => KeyOutcome::Ignored,
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_shortcuts() {
        let keymap = Keymap::new();
        assert_eq!(
            keymap.dispatch(&KeyPress::new("b").with_ctrl()),
            KeyOutcome::Command(EditCommand::Bold)
        );
        assert_eq!(
            keymap.dispatch(&KeyPress::new("i").with_meta()),
            KeyOutcome::Command(EditCommand::Italic)
        );
        assert_eq!(
            keymap.dispatch(&KeyPress::new("K").with_ctrl()),
            KeyOutcome::Command(EditCommand::Link)
        );
    }

    #[test]
    fn test_tab_inserts_indent() {
        let keymap = Keymap::new();
        for press in [
            KeyPress::new("Tab"),
            KeyPress::new("Tab").with_shift(),
            KeyPress::new("Tab").with_ctrl(),
            KeyPress::new("Tab").with_alt(),
        ] {
            let outcome = keymap.dispatch(&press);
            assert_eq!(outcome, KeyOutcome::Command(EditCommand::Indent), "{press:?}");
            assert!(outcome.prevent_default());
        }
    }

    #[test]
    fn test_shift_and_alt_do_not_block_shortcuts() {
        let keymap = Keymap::new();
        assert_eq!(
            keymap.dispatch(&KeyPress::new("B").with_ctrl().with_shift()),
            KeyOutcome::Command(EditCommand::Bold)
        );
        assert_eq!(
            keymap.dispatch(&KeyPress::new("k").with_meta().with_alt()),
            KeyOutcome::Command(EditCommand::Link)
        );
    }

    #[test]
    fn test_unbound_keys_are_left_to_host() {
        let keymap = Keymap::new();
        for press in [
            KeyPress::new("z").with_ctrl(),
            KeyPress::new("y").with_ctrl(),
            KeyPress::new("b"),
            KeyPress::new("b").with_shift(),
            KeyPress::new("i").with_alt(),
            KeyPress::new("Enter").with_shift(),
        ] {
            let outcome = keymap.dispatch(&press);
            assert_eq!(outcome, KeyOutcome::Ignored, "{press:?}");
            assert!(!outcome.prevent_default());
        }
    }

    #[test]
    fn test_custom_binding() {
        let mut keymap = Keymap::new();
        keymap.bind(
            KeyBind::new(&[Modifier::Shift, Modifier::Primary], Key::character("c")),
            EditCommand::CodeBlock,
        );
        assert_eq!(
            keymap.dispatch(&KeyPress::new("c").with_shift().with_ctrl()),
            KeyOutcome::Command(EditCommand::CodeBlock)
        );
    }
}
