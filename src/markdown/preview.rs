//! Markdown preview rendering
//!
//! Renders the buffer to HTML with pulldown-cmark and attaches an `id` to
//! every heading so the outline panel can scroll to it and the viewport
//! tracker can observe it. Anchors come from this renderer's own walk over
//! the source, numbered with a fresh [`HeadingIdSequence`], which yields the
//! same ids as [`parse_headings`](crate::markdown::parse_headings).

use crate::markdown::outline::{clean_heading_text, match_heading_line};
use crate::markdown::slug::HeadingIdSequence;
use pulldown_cmark::{html, Event, Options, Parser, Tag};
use std::collections::HashMap;

/// Preview renderer for markdown content
pub struct PreviewRenderer {
    options: Options,
}

impl PreviewRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);

        Self { options }
    }

    /// Render markdown to an HTML fragment with heading anchors
    pub fn render_html(&self, markdown: &str) -> String {
        let anchors = self.heading_anchors(markdown);
        let mut next_anchor = anchors.iter();

        let events = Parser::new_ext(markdown, self.options).map(|event| match event {
            Event::Start(Tag::Heading(level, _, classes)) => {
                let id = next_anchor.next().and_then(|anchor| anchor.as_deref());
                Event::Start(Tag::Heading(level, id, classes))
            }
            other => other,
        });

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, events);
        output
    }

    /// Anchor ids of the rendered headings, in document order
    pub fn heading_ids(&self, markdown: &str) -> Vec<String> {
        self.heading_anchors(markdown).into_iter().flatten().collect()
    }

    /// One entry per heading pulldown-cmark renders.
    ///
    /// Headings are numbered by walking source lines, so a `#` line the
    /// renderer shows as code still consumes its number. Rendered headings
    /// that do not start a `#` line (setext, quoted) get no anchor.
    fn heading_anchors(&self, markdown: &str) -> Vec<Option<String>> {
        let mut ids = HeadingIdSequence::new();
        let mut line_starts = Vec::new();
        let mut ids_by_line = HashMap::new();

        let mut offset = 0;
        for (line_index, line) in markdown.split('\n').enumerate() {
            line_starts.push(offset);
            offset += line.len() + 1;

            if let Some((_, raw)) = match_heading_line(line) {
                ids_by_line.insert(line_index, ids.next_id(&clean_heading_text(raw)));
            }
        }

        Parser::new_ext(markdown, self.options)
            .into_offset_iter()
            .filter_map(|(event, range)| match event {
                Event::Start(Tag::Heading(..)) => {
                    let line_index = line_starts.partition_point(|&start| start <= range.start) - 1;
                    Some(ids_by_line.get(&line_index).cloned())
                }
                _ => None,
            })
            .collect()
    }
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self::new()
    }
}
