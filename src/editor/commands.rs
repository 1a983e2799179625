//! Authoring commands
//!
//! Every command is a pure function from one [`EditorView`] to the next.
//! Toolbar buttons and keyboard shortcuts both resolve to an [`EditCommand`]
//! and go through the same three primitives below.

use crate::config::DEFAULT_INDENT;
use crate::editor::view::EditorView;

/// Wrap the selection in `before`/`after`, or `placeholder` if nothing is selected.
///
/// The new selection covers exactly the wrapped operand. Applying the same
/// command again wraps again; markup is never toggled off.
pub fn wrap_selection(view: &EditorView, before: &str, after: &str, placeholder: &str) -> EditorView {
    let selected = view.selected_text();
    let operand = if selected.is_empty() {
        placeholder
    } else {
        selected.as_str()
    };

    let before_len = before.chars().count();
    let operand_len = operand.chars().count();
    let replacement = format!("{before}{operand}{after}");

    view.replace_selection(&replacement, before_len..before_len + operand_len)
}

/// Insert `text` at the start of the line holding the selection start.
///
/// The line's existing content moves after the inserted text; the caret
/// lands right after the insertion.
pub fn insert_at_line_start(view: &EditorView, text: &str) -> EditorView {
    let line_start = view.buffer().line_start(view.selection().start);
    let text_len = text.chars().count();
    view.replace(line_start..line_start, text, text_len..text_len)
}

/// Replace the selection with `literal` and put the caret after it
pub fn insert_literal(view: &EditorView, literal: &str) -> EditorView {
    let len = literal.chars().count();
    view.replace_selection(literal, len..len)
}

/// What a command does to the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction<'a> {
    Wrap {
        before: &'a str,
        after: &'a str,
        placeholder: &'a str,
    },
    LineStart(&'a str),
}

/// Commands reachable from the toolbar and keyboard shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditCommand {
    Bold,
    Italic,
    InlineCode,
    Heading1,
    Heading2,
    Heading3,
    Link,
    Image,
    BulletList,
    NumberedList,
    Quote,
    HorizontalRule,
    CodeBlock,
    Indent,
}

impl EditCommand {
    /// Buffer action for this command; `indent` is the text Tab inserts
    pub fn action<'a>(self, indent: &'a str) -> CommandAction<'a> {
        use CommandAction::{LineStart, Wrap};

        match self {
            EditCommand::Bold => Wrap {
                before: "**",
                after: "**",
                placeholder: "bold text",
            },
            EditCommand::Italic => Wrap {
                before: "*",
                after: "*",
                placeholder: "italic text",
            },
            EditCommand::InlineCode => Wrap {
                before: "`",
                after: "`",
                placeholder: "code",
            },
            EditCommand::Heading1 => LineStart("# Heading 1\n"),
            EditCommand::Heading2 => LineStart("## Heading 2\n"),
            EditCommand::Heading3 => LineStart("### Heading 3\n"),
            EditCommand::Link => Wrap {
                before: "[",
                after: "](url)",
                placeholder: "link text",
            },
            EditCommand::Image => Wrap {
                before: "![",
                after: "](image-url)",
                placeholder: "alt text",
            },
            EditCommand::BulletList => LineStart("- List item\n"),
            EditCommand::NumberedList => LineStart("1. List item\n"),
            EditCommand::Quote => LineStart("> Quote\n"),
            EditCommand::HorizontalRule => Wrap {
                before: "\n---\n",
                after: "",
                placeholder: "",
            },
            EditCommand::CodeBlock => Wrap {
                before: "\n```javascript\n",
                after: "\n```\n",
                placeholder: "// code here",
            },
            EditCommand::Indent => Wrap {
                before: indent,
                after: "",
                placeholder: "",
            },
        }
    }

    /// Apply the command with the default two-space indent
    pub fn apply(self, view: &EditorView) -> EditorView {
        self.apply_with_indent(view, DEFAULT_INDENT)
    }

    pub fn apply_with_indent(self, view: &EditorView, indent: &str) -> EditorView {
        match self.action(indent) {
            CommandAction::Wrap {
                before,
                after,
                placeholder,
            } => wrap_selection(view, before, after, placeholder),
            CommandAction::LineStart(text) => insert_at_line_start(view, text),
        }
    }

    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            EditCommand::Bold => "Bold",
            EditCommand::Italic => "Italic",
            EditCommand::InlineCode => "Inline Code",
            EditCommand::Heading1 => "Heading 1",
            EditCommand::Heading2 => "Heading 2",
            EditCommand::Heading3 => "Heading 3",
            EditCommand::Link => "Link",
            EditCommand::Image => "Image",
            EditCommand::BulletList => "Bullet List",
            EditCommand::NumberedList => "Numbered List",
            EditCommand::Quote => "Quote",
            EditCommand::HorizontalRule => "Horizontal Rule",
            EditCommand::CodeBlock => "Code Block",
            EditCommand::Indent => "Indent",
        }
    }
}

/// A toolbar button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarButton {
    pub command: EditCommand,
    pub label: &'static str,
    pub shortcut: Option<&'static str>,
}

impl ToolbarButton {
    /// Tooltip text, e.g. `Bold (Ctrl+B)`
    pub fn title(&self) -> String {
        match self.shortcut {
            Some(shortcut) => format!("{} ({})", self.label, shortcut),
            None => self.label.to_string(),
        }
    }
}

/// Toolbar buttons in display order
pub fn toolbar() -> Vec<ToolbarButton> {
    const BUTTONS: [(EditCommand, Option<&str>); 13] = [
        (EditCommand::Bold, Some("Ctrl+B")),
        (EditCommand::Italic, Some("Ctrl+I")),
        (EditCommand::InlineCode, None),
        (EditCommand::Heading1, None),
        (EditCommand::Heading2, None),
        (EditCommand::Heading3, None),
        (EditCommand::Link, Some("Ctrl+K")),
        (EditCommand::Image, None),
        (EditCommand::BulletList, None),
        (EditCommand::NumberedList, None),
        (EditCommand::Quote, None),
        (EditCommand::HorizontalRule, None),
        (EditCommand::CodeBlock, None),
    ];

    BUTTONS
        .iter()
        .map(|&(command, shortcut)| ToolbarButton {
            command,
            label: command.label(),
            shortcut,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::view::Selection;

    fn view(text: &str, start: usize, end: usize) -> EditorView {
        EditorView::from_parts(text, start, end).unwrap()
    }

    #[test]
    fn test_wrap_empty_selection_uses_placeholder() {
        let next = wrap_selection(&view("Hello world", 5, 5), "**", "**", "bold text");
        assert_eq!(next.text(), "Hello**bold text** world");
        assert_eq!(next.selection(), Selection { start: 7, end: 16 });
        assert_eq!(next.selected_text(), "bold text");
    }

    #[test]
    fn test_wrap_twice_double_wraps() {
        let once = EditCommand::Bold.apply(&view("Hello world", 5, 5));
        let twice = EditCommand::Bold.apply(&once);
        assert_eq!(twice.text(), "Hello****bold text**** world");
        assert_eq!(twice.selected_text(), "bold text");
        assert_eq!(twice.selection(), Selection { start: 9, end: 18 });
    }

    #[test]
    fn test_wrap_existing_selection() {
        let next = EditCommand::Link.apply(&view("see docs here", 4, 8));
        assert_eq!(next.text(), "see [docs](url) here");
        assert_eq!(next.selected_text(), "docs");
    }

    #[test]
    fn test_wrap_counts_chars_not_bytes() {
        let next = EditCommand::Italic.apply(&view("ça 🦀 va", 3, 4));
        assert_eq!(next.text(), "ça *🦀* va");
        assert_eq!(next.selection(), Selection { start: 4, end: 5 });
        assert_eq!(next.selected_text(), "🦀");
    }

    #[test]
    fn test_insert_at_line_start() {
        let next = EditCommand::Heading2.apply(&view("first\nsecond line", 10, 12));
        assert_eq!(next.text(), "first\n## Heading 2\nsecond line");
        assert_eq!(next.selection(), Selection::collapsed(19));
    }

    #[test]
    fn test_insert_at_line_start_first_line() {
        let next = EditCommand::Quote.apply(&view("hello", 3, 3));
        assert_eq!(next.text(), "> Quote\nhello");
        assert_eq!(next.selection(), Selection::collapsed(8));
    }

    #[test]
    fn test_insert_at_line_start_after_trailing_newline() {
        let next = EditCommand::BulletList.apply(&view("a\n", 2, 2));
        assert_eq!(next.text(), "a\n- List item\n");
        assert_eq!(next.selection(), Selection::collapsed(14));
    }

    #[test]
    fn test_block_commands() {
        let code = EditCommand::CodeBlock.apply(&view("x", 1, 1));
        assert_eq!(code.text(), "x\n```javascript\n// code here\n```\n");
        assert_eq!(code.selected_text(), "// code here");

        let rule = EditCommand::HorizontalRule.apply(&view("ab", 1, 1));
        assert_eq!(rule.text(), "a\n---\nb");
        assert_eq!(rule.selection(), Selection::collapsed(6));
    }

    #[test]
    fn test_indent_keeps_selection() {
        let next = EditCommand::Indent.apply(&view("item", 0, 4));
        assert_eq!(next.text(), "  item");
        assert_eq!(next.selected_text(), "item");

        let tabbed = EditCommand::Indent.apply_with_indent(&view("x", 0, 0), "\t");
        assert_eq!(tabbed.text(), "\tx");
        assert_eq!(tabbed.selection(), Selection::collapsed(1));
    }

    #[test]
    fn test_insert_literal_replaces_selection() {
        let next = insert_literal(&view("a SEL b", 2, 5), "![x](y)");
        assert_eq!(next.text(), "a ![x](y) b");
        assert_eq!(next.selection(), Selection::collapsed(9));
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let commands = [
            EditCommand::Bold,
            EditCommand::Heading1,
            EditCommand::Image,
            EditCommand::NumberedList,
            EditCommand::HorizontalRule,
            EditCommand::Indent,
        ];
        let mut current = view("", 0, 0);
        for command in commands {
            current = command.apply(&current);
            let sel = current.selection();
            assert!(sel.start <= sel.end);
            assert!(sel.end <= current.buffer().len_chars());
        }
    }

    #[test]
    fn test_toolbar_titles() {
        let buttons = toolbar();
        assert_eq!(buttons.len(), 13);
        assert_eq!(buttons[0].title(), "Bold (Ctrl+B)");
        assert_eq!(buttons[2].title(), "Inline Code");
        assert!(buttons.iter().all(|b| b.command != EditCommand::Indent));
    }
}
