//! Heading outline extraction
//!
//! Scans raw markdown into a flat list of [`HeadingRecord`]s and folds that
//! list into a forest of [`OutlineNode`]s by heading level. Parsing is total:
//! text without headings simply produces an empty outline.

use crate::markdown::slug::HeadingIdSequence;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// ATX heading line: 1-6 `#`, whitespace, then trailing text
fn heading_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid heading regex"))
}

/// Inline syntax stripped from heading text, applied in this order
fn inline_syntax() -> &'static [(Regex, &'static str); 4] {
    static RES: OnceLock<[(Regex, &'static str); 4]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            (Regex::new(r"\*\*([^*]+)\*\*").expect("valid bold regex"), "$1"),
            (Regex::new(r"\*([^*]+)\*").expect("valid italic regex"), "$1"),
            (Regex::new(r"`([^`]+)`").expect("valid code regex"), "$1"),
            (
                Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid link regex"),
                "$1",
            ),
        ]
    })
}

/// A single heading line found in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingRecord {
    /// Zero-based line the heading was found on
    pub line_index: usize,

    /// Heading level (1-6)
    pub level: u8,

    /// Heading text as written, trimmed
    pub raw_text: String,

    /// Heading text with inline emphasis, code and link syntax removed
    pub clean_text: String,

    /// Anchor identifier shared with the preview renderer
    pub id: String,
}

/// A heading together with the headings nested below it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineNode {
    pub heading: HeadingRecord,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn new(heading: HeadingRecord) -> Self {
        Self {
            heading,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.heading.id
    }

    pub fn level(&self) -> u8 {
        self.heading.level
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes in this subtree, including this one
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(OutlineNode::len).sum::<usize>()
    }

    /// Find a node by id in this subtree
    pub fn find(&self, id: &str) -> Option<&OutlineNode> {
        if self.heading.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// Match a single line against the heading syntax.
///
/// Returns the level and the trimmed raw text.
pub fn match_heading_line(line: &str) -> Option<(u8, &str)> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let caps = heading_line().captures(line)?;
    let level = caps.get(1)?.as_str().len() as u8;
    let text = caps.get(2)?.as_str().trim();
    Some((level, text))
}

/// Strip bold, italic, inline code and link syntax from heading text.
///
/// Each rule is applied once; emphasis nested inside a link label is not
/// cleaned again.
pub fn clean_heading_text(text: &str) -> String {
    inline_syntax()
        .iter()
        .fold(text.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        })
}

/// Scan the document for headings, numbering them from zero
pub fn parse_headings(text: &str) -> Vec<HeadingRecord> {
    let mut ids = HeadingIdSequence::new();

    text.split('\n')
        .enumerate()
        .filter_map(|(line_index, line)| {
            let (level, raw) = match_heading_line(line)?;
            let clean_text = clean_heading_text(raw);
            Some(HeadingRecord {
                line_index,
                level,
                raw_text: raw.to_string(),
                id: ids.next_id(&clean_text),
                clean_text,
            })
        })
        .collect()
}

/// Fold headings into a forest using the heading-stack rule.
///
/// Open entries whose level is at least the current level are closed before
/// the current heading is attached to the remaining top (or becomes a root).
pub fn build_outline(headings: Vec<HeadingRecord>) -> Vec<OutlineNode> {
    let mut roots: Vec<OutlineNode> = Vec::new();
    let mut stack: Vec<OutlineNode> = Vec::new();

    for heading in headings {
        while stack
            .last()
            .is_some_and(|open| open.level() >= heading.level)
        {
            close_top(&mut stack, &mut roots);
        }
        stack.push(OutlineNode::new(heading));
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }

    roots
}

/// Pop the innermost open node and attach it to its parent or the roots
fn close_top(stack: &mut Vec<OutlineNode>, roots: &mut Vec<OutlineNode>) {
    if let Some(node) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}

/// Parse headings and fold them into the outline forest
pub fn parse_outline(text: &str) -> Vec<OutlineNode> {
    let headings = parse_headings(text);
    log::debug!("Parsed {} headings", headings.len());
    build_outline(headings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(nodes: &[OutlineNode]) -> String {
        nodes
            .iter()
            .map(|n| {
                if n.children.is_empty() {
                    n.heading.clean_text.clone()
                } else {
                    format!("{}[{}]", n.heading.clean_text, shape(&n.children))
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_heading_line_matching() {
        assert_eq!(match_heading_line("# Title"), Some((1, "Title")));
        assert_eq!(match_heading_line("###   Spaced  "), Some((3, "Spaced")));
        assert_eq!(match_heading_line("###### Six"), Some((6, "Six")));
        assert_eq!(match_heading_line("####### Seven"), None);
        assert_eq!(match_heading_line("#NoSpace"), None);
        assert_eq!(match_heading_line("# "), None);
        assert_eq!(match_heading_line(" # Indented"), None);
        assert_eq!(match_heading_line("## Windows\r"), Some((2, "Windows")));
    }

    #[test]
    fn test_clean_heading_text() {
        assert_eq!(clean_heading_text("**Bold** title"), "Bold title");
        assert_eq!(clean_heading_text("*Italic* and `code`"), "Italic and code");
        assert_eq!(clean_heading_text("See [the docs](http://x.y)"), "See the docs");
        assert_eq!(clean_heading_text("Plain"), "Plain");
    }

    #[test]
    fn test_clean_is_not_recursive() {
        assert_eq!(clean_heading_text("[**x**](u)"), "x");
        assert_eq!(clean_heading_text("[*a*`b`](u)"), "ab");
        // A link exposed by stripping an outer one stays as written
        assert_eq!(clean_heading_text("[[a](b)](c)"), "[a](c)");
        assert_eq!(clean_heading_text("`**x**`"), "x");
    }

    #[test]
    fn test_parse_assigns_sequential_ids() {
        let doc = "# Intro\ntext\n## Setup\n## Setup\n### **Deep** dive";
        let headings = parse_headings(doc);
        let ids: Vec<&str> = headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "heading-0-intro",
                "heading-1-setup",
                "heading-2-setup",
                "heading-3-deep-dive",
            ]
        );
        assert_eq!(headings[1].line_index, 2);
        assert_eq!(headings[3].raw_text, "**Deep** dive");
        assert_eq!(headings[3].clean_text, "Deep dive");
    }

    #[test]
    fn test_parse_twice_is_identical() {
        let doc = "# A\n## B\n# A\n";
        assert_eq!(parse_headings(doc), parse_headings(doc));
    }

    #[test]
    fn test_build_outline_nesting() {
        let forest = parse_outline("# A\n## B\n# C\n### D");
        assert_eq!(shape(&forest), "A[B],C[D]");
    }

    #[test]
    fn test_build_outline_siblings_and_dedent() {
        let forest = parse_outline("## A\n### B\n### C\n# D\n## E\n#### F\n### G");
        assert_eq!(shape(&forest), "A[B,C],D[E[F,G]]");
        assert_eq!(forest.iter().map(OutlineNode::len).sum::<usize>(), 7);
    }

    #[test]
    fn test_build_outline_starting_deep() {
        let forest = parse_outline("### Deep\n# Top\n");
        assert_eq!(shape(&forest), "Deep,Top");
    }

    #[test]
    fn test_no_headings_is_empty() {
        assert!(parse_outline("").is_empty());
        assert!(parse_outline("just text\n####### nope\n#nope").is_empty());
    }

    #[test]
    fn test_find_node() {
        let forest = parse_outline("# A\n## B\n### C");
        let found = forest[0].find("heading-2-c").unwrap();
        assert_eq!(found.level(), 3);
        assert!(forest[0].find("heading-9-x").is_none());
    }
}
