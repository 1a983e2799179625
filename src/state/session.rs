//! Authoring session for one document
//!
//! Ties the pieces together the way the editor screen uses them: the host
//! text input reports edits, the toolbar and shortcuts run commands, pasted
//! images are inlined, the preview reports scrolling. Every change to the
//! text rebuilds the outline, re-subscribes the viewport tracker to the new
//! heading anchors and restarts the autosave timer.
//!
//! The autosave timer is a tokio task, so a session must live inside a
//! tokio runtime.

use crate::config::Config;
use crate::document::{validate_draft, DocumentFields, DocumentStatus, Tags};
use crate::editor::{
    insert_literal, EditCommand, EditorView, ImageIngestor, KeyOutcome, KeyPress, Keymap,
    PasteEvent, Selection,
};
use crate::error::{AppResult, EditorResult, ImageResult};
use crate::markdown::{parse_outline, PreviewRenderer};
use crate::persistence::{AutosaveScheduler, AutosaveState, Persistence};
use crate::state::outline_state::{OutlineRow, OutlineTreeState, ScrollRequest};
use crate::state::viewport::{
    sync_scroll, HeadingGeometry, IntersectionEntry, ScrollMetrics, ViewportBand, ViewportTracker,
};
use std::sync::Arc;
use uuid::Uuid;

/// Editing state of one open document
pub struct AuthoringSession<P: Persistence> {
    /// Random id used to correlate log lines
    session_id: Uuid,
    document_id: String,
    config: Config,

    view: EditorView,
    title: String,
    tags: Tags,

    outline: OutlineTreeState,
    tracker: ViewportTracker,
    keymap: Keymap,
    ingestor: ImageIngestor,
    preview: PreviewRenderer,

    persistence: Arc<P>,
    autosave: AutosaveScheduler<P>,
}

impl<P: Persistence> AuthoringSession<P> {
    pub fn new(persistence: P, document_id: impl Into<String>, config: Config) -> Self {
        let document_id = document_id.into();
        let persistence = Arc::new(persistence);
        let autosave = AutosaveScheduler::new(Arc::clone(&persistence), document_id.clone(), &config.autosave);
        let session_id = Uuid::new_v4();

        log::debug!("Session {} opened for document {}", session_id, document_id);

        Self {
            session_id,
            document_id,
            tracker: ViewportTracker::new(ViewportBand::from_config(&config.outline)),
            ingestor: ImageIngestor::new(config.images.clone()),
            config,
            view: EditorView::default(),
            title: String::new(),
            tags: Tags::new(),
            outline: OutlineTreeState::new(),
            keymap: Keymap::new(),
            preview: PreviewRenderer::new(),
            persistence,
            autosave,
        }
    }

    /// Load stored values without counting them as an edit
    pub fn load(&mut self, title: &str, content: &str, tags: Tags) {
        self.title = title.to_string();
        self.tags = tags;
        self.view = EditorView::at_end(content);
        self.rebuild_navigation(content);
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn view(&self) -> &EditorView {
        &self.view
    }

    pub fn text(&self) -> String {
        self.view.text()
    }

    pub fn selection(&self) -> Selection {
        self.view.selection()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn outline(&self) -> &OutlineTreeState {
        &self.outline
    }

    pub fn outline_rows(&self) -> Vec<OutlineRow> {
        self.outline.visible_rows()
    }

    pub fn tracker(&self) -> &ViewportTracker {
        &self.tracker
    }

    pub fn autosave_state(&self) -> AutosaveState {
        self.autosave.state()
    }

    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    /// HTML for the preview pane, with heading anchors
    pub fn preview_html(&self) -> String {
        self.preview.render_html(&self.text())
    }

    /// Run a toolbar or shortcut command against the current view
    pub fn apply(&mut self, command: EditCommand) -> &EditorView {
        log::debug!("[{}] Applying {}", self.session_id, command.label());
        let next = command.apply_with_indent(&self.view, &self.config.editor.indent);
        self.commit(next);
        &self.view
    }

    /// Dispatch a key press; the host suppresses its default when a command ran
    pub fn handle_key(&mut self, press: &KeyPress) -> KeyOutcome {
        let outcome = self.keymap.dispatch(press);
        if let KeyOutcome::Command(command) = outcome {
            self.apply(command);
        }
        outcome
    }

    /// Text typed into the host widget, with the selection it reports
    pub fn replace_text(&mut self, text: &str, start: usize, end: usize) -> EditorResult<()> {
        let next = EditorView::from_parts(text, start, end)?;
        self.commit(next);
        Ok(())
    }

    /// Selection moved without a text change
    pub fn select(&mut self, start: usize, end: usize) -> EditorResult<()> {
        self.view = EditorView::new(self.view.buffer().clone(), Selection { start, end })?;
        Ok(())
    }

    /// Handle a paste event.
    ///
    /// Returns `Ok(false)` when the event has no image and the host should
    /// paste normally. On error the buffer is left untouched.
    pub async fn handle_paste(&mut self, event: PasteEvent) -> ImageResult<bool> {
        if !event.has_image() {
            return Ok(false);
        }

        match self.ingestor.prepare(event).await {
            Ok(Some(literal)) => {
                self.insert_image_literal(&literal);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                log::warn!("[{}] Pasted image rejected: {}", self.session_id, e);
                Err(e)
            }
        }
    }

    /// Insert an already prepared image literal at the current selection
    pub fn insert_image_literal(&mut self, literal: &str) {
        let next = insert_literal(&self.view, literal);
        self.commit(next);
    }

    pub fn ingestor(&self) -> &ImageIngestor {
        &self.ingestor
    }

    /// Batch of visibility changes from the preview
    pub fn on_intersections(&mut self, batch: &[IntersectionEntry]) -> Option<String> {
        let active = self.tracker.on_intersections(batch)?;
        self.outline.set_active(active.clone());
        Some(active)
    }

    /// Heading geometry measured by the preview after a scroll
    pub fn measure(&mut self, geometry: &[HeadingGeometry], viewport_height: f32) -> Option<String> {
        let active = self.tracker.measure(geometry, viewport_height)?;
        self.outline.set_active(active.clone());
        Some(active)
    }

    /// Editor pane scrolled; returns the scroll offset for the preview pane
    pub fn on_editor_scroll(&self, editor: &ScrollMetrics, preview: &ScrollMetrics) -> Option<f32> {
        sync_scroll(editor, preview)
    }

    pub fn click_heading(&mut self, id: &str) -> Option<ScrollRequest> {
        self.outline.click(id)
    }

    pub fn toggle_heading(&mut self, id: &str) {
        self.outline.toggle(id);
    }

    pub fn toggle_outline_panel(&mut self) {
        self.outline.toggle_panel();
    }

    pub fn set_title(&mut self, title: &str) {
        if self.title == title {
            return;
        }
        self.title = title.to_string();
        let text = self.text();
        self.schedule_autosave(&text);
    }

    pub fn add_tag(&mut self, input: &str) -> bool {
        self.tags.add(input)
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Explicit save. Validates first and supersedes any pending autosave.
    pub async fn save(&mut self, status: DocumentStatus) -> AppResult<()> {
        let content = self.text();
        validate_draft(&self.title, &content, &self.tags)?;

        self.autosave.cancel();
        let fields = DocumentFields::for_save(&self.title, &content, &self.tags, status);
        self.persistence.save(&self.document_id, fields).await?;

        log::info!("[{}] Saved document {} as {:?}", self.session_id, self.document_id, status);
        Ok(())
    }

    /// Stop background work when the editor closes
    pub fn teardown(&mut self) {
        self.autosave.cancel();
        self.tracker.disconnect();
        log::debug!("Session {} closed", self.session_id);
    }

    fn commit(&mut self, next: EditorView) {
        self.view = next;
        log::debug!("[{}] Buffer now at version {}", self.session_id, self.view.buffer().version());
        let text = self.view.text();
        self.rebuild_navigation(&text);
        self.schedule_autosave(&text);
    }

    fn rebuild_navigation(&mut self, text: &str) {
        self.outline.set_forest(parse_outline(text));
        self.tracker.observe(self.preview.heading_ids(text));
    }

    fn schedule_autosave(&mut self, text: &str) {
        let fields = DocumentFields::for_autosave(&self.title, text, &self.tags);
        self.autosave.notify_change(fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::ClipboardPayload;
    use crate::error::{AppError, ImageError, ValidationError};
    use crate::persistence::MemoryStore;
    use std::time::Duration;
    use tokio::time::sleep;

    fn session(store: &MemoryStore) -> AuthoringSession<MemoryStore> {
        AuthoringSession::new(store.clone(), "doc-1", Config::default())
    }

    #[tokio::test]
    async fn test_apply_bold_placeholder() {
        let store = MemoryStore::new();
        let mut session = session(&store);
        session.replace_text("Hello world", 5, 5).unwrap();

        session.apply(EditCommand::Bold);
        assert_eq!(session.text(), "Hello**bold text** world");
        assert_eq!(session.selection(), Selection { start: 7, end: 16 });
        assert_eq!(session.view().selected_text(), "bold text");
    }

    #[tokio::test]
    async fn test_edits_rebuild_outline_and_subscriptions() {
        let store = MemoryStore::new();
        let mut session = session(&store);
        session.replace_text("# A\n## B", 8, 8).unwrap();

        let rows = session.outline_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, "heading-1-b");
        assert!(session.tracker().is_observing("heading-1-b"));

        session.replace_text("# A", 3, 3).unwrap();
        assert_eq!(session.outline_rows().len(), 1);
        assert!(!session.tracker().is_observing("heading-1-b"));
    }

    #[tokio::test]
    async fn test_scrolling_and_clicking_set_active() {
        let store = MemoryStore::new();
        let mut session = session(&store);
        session.load("T", "# Intro\ntext\n# Setup", Tags::new());

        let entered = session.on_intersections(&[IntersectionEntry {
            id: "heading-1-setup".to_string(),
            is_intersecting: true,
            top: 200.0,
        }]);
        assert_eq!(entered.as_deref(), Some("heading-1-setup"));
        assert!(session.outline().active().is("heading-1-setup"));

        let request = session.click_heading("heading-0-intro").unwrap();
        assert_eq!(request.anchor_id, "heading-0-intro");
        assert!(session.outline_rows()[0].active);
    }

    #[tokio::test]
    async fn test_handle_key() {
        let store = MemoryStore::new();
        let mut session = session(&store);
        session.replace_text("word", 0, 4).unwrap();

        let outcome = session.handle_key(&KeyPress::new("i").with_ctrl());
        assert!(outcome.prevent_default());
        assert_eq!(session.text(), "*word*");

        let outcome = session.handle_key(&KeyPress::new("z").with_ctrl());
        assert_eq!(outcome, KeyOutcome::Ignored);
        assert_eq!(session.text(), "*word*");
    }

    #[tokio::test]
    async fn test_invalid_host_selection_rejected() {
        let store = MemoryStore::new();
        let mut session = session(&store);
        assert!(session.replace_text("abc", 2, 9).is_err());
        assert_eq!(session.text(), "");
        assert!(session.select(1, 1).is_err());
        assert!(session.select(0, 0).is_ok());
    }

    #[tokio::test]
    async fn test_paste_inserts_image_at_caret() {
        let store = MemoryStore::new();
        let mut session = session(&store);
        session.replace_text("ab", 1, 1).unwrap();

        let event = PasteEvent::new(vec![ClipboardPayload::new("image/gif", b"GIF89a".to_vec())]);
        assert_eq!(session.handle_paste(event).await, Ok(true));

        let text = session.text();
        assert!(text.starts_with("a![image-"));
        assert!(text.ends_with("](data:image/gif;base64,R0lGODlh)b"));
        let caret = session.selection();
        assert!(caret.is_collapsed());
        assert_eq!(caret.start, text.chars().count() - 1);
    }

    #[tokio::test]
    async fn test_oversized_paste_leaves_buffer_alone() {
        let store = MemoryStore::new();
        let mut session = session(&store);
        session.replace_text("keep me", 4, 4).unwrap();

        let event = PasteEvent::new(vec![ClipboardPayload::new("image/png", vec![0; 3 * 1024 * 1024])]);
        let err = session.handle_paste(event).await.unwrap_err();
        assert!(matches!(err, ImageError::TooLarge { .. }));
        assert_eq!(session.text(), "keep me");
        assert_eq!(session.selection(), Selection::collapsed(4));
    }

    #[tokio::test]
    async fn test_text_paste_is_left_to_host() {
        let store = MemoryStore::new();
        let mut session = session(&store);
        let event = PasteEvent::new(vec![ClipboardPayload::new("text/plain", b"hi".to_vec())]);
        assert_eq!(session.handle_paste(event).await, Ok(false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_autosaves_once() {
        let store = MemoryStore::new();
        let mut session = session(&store);
        session.set_title("Notes");
        session.replace_text("a", 1, 1).unwrap();
        sleep(Duration::from_secs(5)).await;
        session.replace_text("ab", 2, 2).unwrap();

        sleep(Duration::from_secs(31)).await;
        let saves = store.saves();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].1.content, "ab");
        assert_eq!(saves[0].1.title, "Notes");
        assert!(saves[0].1.status.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_autosave() {
        let store = MemoryStore::new();
        let mut session = session(&store);
        session.set_title("Notes");
        session.replace_text("draft", 5, 5).unwrap();
        assert_eq!(session.autosave_state(), AutosaveState::Pending);

        session.teardown();
        assert_eq!(session.tracker().observed_count(), 0);
        sleep(Duration::from_secs(60)).await;
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_explicit_save_validates() {
        let store = MemoryStore::new();
        let mut session = session(&store);
        session.replace_text("body", 4, 4).unwrap();

        let err = session.save(DocumentStatus::Draft).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::EmptyTitle)));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_explicit_save_publishes() {
        let store = MemoryStore::new();
        let mut session = session(&store);
        session.load("Heap Exploitation", "# Intro\nbody", Tags::new());
        assert!(session.add_tag("Pwn"));

        session.save(DocumentStatus::Published).await.unwrap();
        assert_eq!(session.autosave_state(), AutosaveState::Idle);

        let record = store.record("doc-1").unwrap();
        assert_eq!(record["slug"], "heap-exploitation");
        assert_eq!(record["status"], "published");
        assert_eq!(record["tags"][0], "pwn");
        assert_eq!(record["excerpt"], "Intro body");
    }

    #[tokio::test]
    async fn test_editor_scroll_moves_preview() {
        let store = MemoryStore::new();
        let session = session(&store);
        let offset = session.on_editor_scroll(
            &ScrollMetrics::new(100.0, 600.0, 400.0),
            &ScrollMetrics::new(0.0, 1400.0, 400.0),
        );
        assert_eq!(offset, Some(500.0));
    }

    #[tokio::test]
    async fn test_edit_removing_active_heading_clears_it() {
        let store = MemoryStore::new();
        let mut session = session(&store);
        session.replace_text("# A\n## B", 8, 8).unwrap();
        session.click_heading("heading-1-b");

        session.replace_text("# A\n", 4, 4).unwrap();
        assert_eq!(session.outline().active().id(), None);
    }
}
