//! Outline panel state
//!
//! Holds the heading forest shown in the navigation panel, which nodes are
//! expanded, and which heading is active. The forest is replaced wholesale
//! on every content change and expansion goes back to its default then:
//! top-level headings open, everything below closed. Toggles made by the
//! user do not survive an edit.

use crate::markdown::OutlineNode;
use serde::Serialize;
use std::collections::HashSet;

/// The heading currently considered in view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveHeading(Option<String>);

impl ActiveHeading {
    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn set(&mut self, id: impl Into<String>) {
        self.0 = Some(id.into());
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn is(&self, id: &str) -> bool {
        self.0.as_deref() == Some(id)
    }
}

/// Request for the preview to scroll a heading anchor into view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub anchor_id: String,
}

/// One visible line of the outline panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineRow {
    pub id: String,
    pub label: String,
    pub level: u8,
    /// Nesting depth from the root (0-based)
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
    pub active: bool,
}

/// Outline panel state
#[derive(Debug, Clone, Default)]
pub struct OutlineTreeState {
    /// Current heading forest
    forest: Vec<OutlineNode>,

    /// Ids of expanded nodes
    expanded: HashSet<String>,

    /// Heading in view
    active: ActiveHeading,

    /// Whether the whole panel is folded away
    pub panel_collapsed: bool,
}

impl OutlineTreeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the forest and reset expansion to the default.
    ///
    /// The active heading is dropped when it no longer exists.
    pub fn set_forest(&mut self, forest: Vec<OutlineNode>) {
        self.expanded = forest.iter().map(|root| root.id().to_string()).collect();
        self.forest = forest;

        let stale = self.active.id().is_some_and(|id| !self.contains(id));
        if stale {
            self.active.clear();
        }
    }

    pub fn forest(&self) -> &[OutlineNode] {
        &self.forest
    }

    /// Nothing to render when the document has no headings
    pub fn is_empty(&self) -> bool {
        self.forest.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.forest.iter().any(|root| root.find(id).is_some())
    }

    /// Check if a node is expanded
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Toggle one node's disclosure state; the active heading is untouched
    pub fn toggle(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    pub fn expand(&mut self, id: &str) {
        self.expanded.insert(id.to_string());
    }

    pub fn collapse(&mut self, id: &str) {
        self.expanded.remove(id);
    }

    pub fn active(&self) -> &ActiveHeading {
        &self.active
    }

    pub fn set_active(&mut self, id: impl Into<String>) {
        self.active.set(id);
    }

    /// Label click: mark the heading active right away and ask the preview
    /// to scroll to it
    pub fn click(&mut self, id: &str) -> Option<ScrollRequest> {
        if !self.contains(id) {
            log::debug!("Ignoring click on unknown heading {}", id);
            return None;
        }
        self.active.set(id);
        Some(ScrollRequest {
            anchor_id: id.to_string(),
        })
    }

    /// Toggle visibility of the whole panel
    pub fn toggle_panel(&mut self) {
        self.panel_collapsed = !self.panel_collapsed;
    }

    /// Rows to draw, depth first, skipping children of collapsed nodes
    pub fn visible_rows(&self) -> Vec<OutlineRow> {
        let mut rows = Vec::new();
        for root in &self.forest {
            self.push_rows(root, 0, &mut rows);
        }
        rows
    }

    fn push_rows(&self, node: &OutlineNode, depth: usize, rows: &mut Vec<OutlineRow>) {
        let expanded = self.is_expanded(node.id());
        rows.push(OutlineRow {
            id: node.id().to_string(),
            label: node.heading.clean_text.clone(),
            level: node.level(),
            depth,
            has_children: node.has_children(),
            expanded,
            active: self.active.is(node.id()),
        });

        if expanded {
            for child in &node.children {
                self.push_rows(child, depth + 1, rows);
            }
        }
    }
}
