//! Surface orchestrator for mdpane
//!
//! This module wires the document, renderer, scroll synchronizer and split
//! controller together. A [`Surface`] is driven by its host: text edits,
//! scroll events, pointer events and [`SurfaceCommand`]s all go in, and
//! rendered output, scroll targets and pane widths come out. Nothing here
//! touches a real window; panes and the resize affordance are injected as
//! capabilities so the whole surface runs headless in tests.

use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};

use crate::config::{PresentationSettings, Settings, ViewMode};
use crate::files::DocumentSource;
use crate::markdown::{RenderedOutput, Renderer};
use crate::preview::{
    LineAwareMapping, ProportionalMapping, ScrollExtent, ScrollOrigin, ScrollSynchronizer,
};
use crate::state::Document;
use crate::subscription::{SubscriptionId, Subscribers};
use crate::ui::{ContainerBounds, DragHost, PaneWidths, SplitLayoutController, SplitRatio};

/// Name shown in window titles.
pub const APP_NAME: &str = "mdpane";

/// Scroll changes smaller than this are not applied, so no echo is expected.
const MIN_SCROLL_DELTA: f32 = 0.5;

// ─────────────────────────────────────────────────────────────────────────────
// Commands & Capabilities
// ─────────────────────────────────────────────────────────────────────────────

/// Discrete commands from menus, shortcuts, and the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    /// Ask the document source for a document to open
    Open,
    /// Save to the current path, or fall through to Save As
    Save,
    /// Save to a newly chosen path
    SaveAs,
    /// Switch between Preview and Edit
    ToggleMode,
    /// A document was opened outside the surface (file association, drop)
    FileOpened { path: PathBuf, content: String },
    /// Presentation fonts changed in the settings store
    PresentationChanged(PresentationSettings),
}

/// A scrollable pane owned by the host.
pub trait ScrollPane {
    /// Current measurements.
    fn extent(&self) -> ScrollExtent;
    /// Scroll programmatically.
    fn set_scroll_top(&mut self, scroll_top: f32);
}

// ─────────────────────────────────────────────────────────────────────────────
// Surface
// ─────────────────────────────────────────────────────────────────────────────

/// The dual-pane markdown surface.
pub struct Surface<S> {
    source: S,
    document: Document,
    output: RenderedOutput,
    renderer: Renderer,
    mode: ViewMode,
    sync: ScrollSynchronizer,
    line_aware_scroll: bool,
    split: SplitLayoutController,
    presentation: PresentationSettings,
    current_path: Option<PathBuf>,
    dirty: bool,
    render_subscribers: Subscribers<RenderedOutput>,
}

impl<S> std::fmt::Debug for Surface<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("mode", &self.mode)
            .field("current_path", &self.current_path)
            .field("dirty", &self.dirty)
            .field("lines", &self.document.line_count())
            .field("split", &self.split)
            .finish()
    }
}

impl<S: DocumentSource> Surface<S> {
    /// Create an empty surface configured from `settings`.
    pub fn new(source: S, settings: &Settings) -> Self {
        let renderer = Renderer::new();
        let output = renderer.render("");
        let mut sync = ScrollSynchronizer::new();
        sync.set_enabled(settings.sync_scroll_enabled);

        Self {
            source,
            document: Document::default(),
            output,
            renderer,
            mode: settings.view_mode,
            sync,
            line_aware_scroll: false,
            split: SplitLayoutController::new(settings.split()),
            presentation: settings.presentation.clone(),
            current_path: None,
            dirty: false,
            render_subscribers: Subscribers::new(),
        }
    }

    /// Builder method to drive `host` during divider drags.
    pub fn with_drag_host(mut self, host: Box<dyn DragHost>) -> Self {
        let ratio = self.split.ratio();
        self.split = SplitLayoutController::with_host(ratio, host);
        self
    }

    /// Builder method to render with a custom renderer.
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self.output = self.renderer.render(self.document.text());
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Current document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Output of the last render.
    pub fn rendered(&self) -> &RenderedOutput {
        &self.output
    }

    /// HTML of the last render.
    pub fn html(&self) -> &str {
        &self.output.html
    }

    /// Current view mode.
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Whether there are unsaved edits.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Path of the current document, if it has one.
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// Whether the welcome screen should be shown.
    pub fn is_welcome(&self) -> bool {
        self.document.is_empty() && self.mode == ViewMode::Preview
    }

    /// Window title, e.g. `mdpane - notes.md*`.
    pub fn title(&self) -> String {
        let Some(name) = self
            .current_path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
        else {
            return APP_NAME.to_string();
        };

        if self.dirty {
            format!("{} - {}*", APP_NAME, name)
        } else {
            format!("{} - {}", APP_NAME, name)
        }
    }

    /// `(line, total)` for the editor header's "Line X of Y".
    pub fn line_info(&self, caret_byte_offset: usize) -> (usize, usize) {
        (
            self.document.line_at(caret_byte_offset),
            self.document.line_count(),
        )
    }

    /// The document source collaborator.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the document source collaborator.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the document with edited text and re-render.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.replace_document(Document::new(text));
        self.dirty = true;
    }

    /// Replace the document with freshly loaded text. Not marked dirty.
    ///
    /// The source adopts `path`, so a later [`save`](Self::save) writes in place.
    pub fn load(&mut self, text: impl Into<String>, path: Option<PathBuf>) {
        self.replace_document(Document::new(text));
        self.source.set_current_path(path.clone());
        self.current_path = path;
        self.dirty = false;
        self.sync.clear_echoes();
        info!("Loaded document ({} lines)", self.document.line_count());
    }

    fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.output = self.renderer.render(self.document.text());
        if self.line_aware_scroll {
            self.sync.set_mapping(Box::new(LineAwareMapping::new(
                self.output.line_heights.clone(),
            )));
        }
        self.render_subscribers.notify(&self.output);
    }

    /// Open a document through the source collaborator.
    pub fn open(&mut self) -> bool {
        match self.source.open() {
            Some(doc) => {
                self.load(doc.content, Some(doc.path));
                true
            }
            None => {
                debug!("Open cancelled or failed");
                false
            }
        }
    }

    /// Save the document. Without a current path this is Save As.
    ///
    /// Empty documents are never saved.
    pub fn save(&mut self) -> bool {
        if self.document.is_empty() {
            debug!("Nothing to save");
            return false;
        }
        if self.source.current_path().is_none() {
            return self.save_as();
        }
        let saved = self.source.save(self.document.text());
        if saved {
            self.dirty = false;
            self.current_path = self.source.current_path();
        }
        saved
    }

    /// Save the document to a newly chosen path.
    pub fn save_as(&mut self) -> bool {
        if self.document.is_empty() {
            debug!("Nothing to save");
            return false;
        }
        let saved = self.source.save_as(self.document.text());
        if saved {
            self.dirty = false;
            self.current_path = self.source.current_path();
        }
        saved
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mode & Presentation
    // ─────────────────────────────────────────────────────────────────────────

    /// Set the view mode. Leaving Edit ends any divider drag.
    pub fn set_mode(&mut self, mode: ViewMode) {
        if mode == self.mode {
            return;
        }
        if !mode.shows_source() {
            self.split.teardown();
        }
        self.sync.clear_echoes();
        self.mode = mode;
        debug!("View mode set to {:?}", mode);
    }

    /// Toggle between Preview and Edit.
    pub fn toggle_mode(&mut self) -> ViewMode {
        self.set_mode(self.mode.toggle());
        self.mode
    }

    /// Current presentation settings.
    pub fn presentation(&self) -> &PresentationSettings {
        &self.presentation
    }

    /// Adopt new presentation settings.
    pub fn apply_presentation(&mut self, presentation: PresentationSettings) {
        self.presentation = presentation;
    }

    /// Inline CSS for the preview pane.
    pub fn preview_style(&self) -> String {
        self.presentation.preview_style()
    }

    /// Inline CSS for the source editor.
    pub fn editor_style(&self) -> String {
        self.presentation.editor_style()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Render Subscriptions
    // ─────────────────────────────────────────────────────────────────────────

    /// Be notified after every render.
    pub fn subscribe_render(
        &mut self,
        callback: impl FnMut(&RenderedOutput) + 'static,
    ) -> SubscriptionId {
        self.render_subscribers.subscribe(callback)
    }

    /// Stop a render subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.render_subscribers.unsubscribe(id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sync Scrolling
    // ─────────────────────────────────────────────────────────────────────────

    /// Enable or disable sync scrolling.
    pub fn set_sync_enabled(&mut self, enabled: bool) {
        self.sync.set_enabled(enabled);
    }

    /// Toggle sync scrolling, returning the new state.
    pub fn toggle_sync(&mut self) -> bool {
        self.sync.toggle()
    }

    /// Whether sync scrolling is enabled.
    pub fn is_sync_enabled(&self) -> bool {
        self.sync.is_enabled()
    }

    /// Use estimated line heights instead of plain proportions.
    pub fn set_line_aware_scroll(&mut self, enabled: bool) {
        self.line_aware_scroll = enabled;
        if enabled {
            self.sync.set_mapping(Box::new(LineAwareMapping::new(
                self.output.line_heights.clone(),
            )));
        } else {
            self.sync.set_mapping(Box::new(ProportionalMapping));
        }
    }

    /// The source pane scrolled; returns the preview fraction to apply.
    pub fn on_source_scroll(&mut self, extent: &ScrollExtent) -> Option<f32> {
        self.on_scroll(ScrollOrigin::Source, extent)
    }

    /// The preview pane scrolled; returns the source fraction to apply.
    pub fn on_preview_scroll(&mut self, extent: &ScrollExtent) -> Option<f32> {
        self.on_scroll(ScrollOrigin::Preview, extent)
    }

    fn on_scroll(&mut self, origin: ScrollOrigin, extent: &ScrollExtent) -> Option<f32> {
        // Only one pane is visible outside Edit mode
        if !self.mode.shows_source() {
            return None;
        }
        self.sync.on_scroll(origin, extent)
    }

    /// Move the preview pane to `fraction`. Returns whether it moved.
    pub fn apply_preview_scroll(&mut self, pane: &mut dyn ScrollPane, fraction: f32) -> bool {
        self.apply_scroll(ScrollOrigin::Preview, pane, fraction)
    }

    /// Move the source pane to `fraction`. Returns whether it moved.
    pub fn apply_source_scroll(&mut self, pane: &mut dyn ScrollPane, fraction: f32) -> bool {
        self.apply_scroll(ScrollOrigin::Source, pane, fraction)
    }

    fn apply_scroll(
        &mut self,
        target: ScrollOrigin,
        pane: &mut dyn ScrollPane,
        fraction: f32,
    ) -> bool {
        let extent = pane.extent();
        let offset = extent.offset_for(fraction);
        // An unchanged position produces no scroll event to swallow
        if (offset - extent.scroll_top).abs() < MIN_SCROLL_DELTA {
            return false;
        }
        self.sync.expect_echo(target);
        pane.set_scroll_top(offset);
        true
    }

    /// Handle a scroll on `from` and move `to` to match.
    ///
    /// Returns whether `to` was moved.
    pub fn sync_panes(
        &mut self,
        origin: ScrollOrigin,
        from: &dyn ScrollPane,
        to: &mut dyn ScrollPane,
    ) -> bool {
        let Some(fraction) = self.on_scroll(origin, &from.extent()) else {
            return false;
        };
        self.apply_scroll(origin.opposite(), to, fraction)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Split Layout
    // ─────────────────────────────────────────────────────────────────────────

    /// Pointer pressed; starts a divider drag if it hits the divider.
    pub fn on_divider_down(&mut self, pointer_x: f32, bounds: ContainerBounds) -> bool {
        if !self.mode.shows_source() {
            return false;
        }
        self.split.pointer_down(pointer_x, bounds)
    }

    /// Pointer moved; returns the new ratio while dragging.
    pub fn on_pointer_move(&mut self, pointer_x: f32) -> Option<SplitRatio> {
        self.split.pointer_move(pointer_x)
    }

    /// Pointer released anywhere.
    pub fn on_pointer_up(&mut self) {
        self.split.pointer_up();
    }

    /// Current split ratio.
    pub fn split_ratio(&self) -> SplitRatio {
        self.split.ratio()
    }

    /// Whether the divider is being dragged.
    pub fn is_dragging(&self) -> bool {
        self.split.is_dragging()
    }

    /// Pane widths for the container; the preview takes everything outside Edit.
    pub fn layout(&self, container_width: f32) -> PaneWidths {
        if self.mode.shows_source() {
            self.split.layout(container_width)
        } else {
            PaneWidths {
                left: 0.0,
                divider: 0.0,
                right: container_width.max(0.0),
            }
        }
    }

    /// Release any resources held for in-progress interactions.
    pub fn teardown(&mut self) {
        self.split.teardown();
        self.sync.clear_echoes();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Execute one command.
    pub fn handle_command(&mut self, command: SurfaceCommand) {
        debug!("Handling command: {:?}", command);
        match command {
            SurfaceCommand::Open => {
                self.open();
            }
            SurfaceCommand::Save => {
                self.save();
            }
            SurfaceCommand::SaveAs => {
                self.save_as();
            }
            SurfaceCommand::ToggleMode => {
                self.toggle_mode();
            }
            SurfaceCommand::FileOpened { path, content } => {
                self.load(content, Some(path));
            }
            SurfaceCommand::PresentationChanged(presentation) => {
                self.apply_presentation(presentation);
            }
        }
    }

    /// Drain every pending command from `commands`. Returns how many ran.
    pub fn pump(&mut self, commands: &Receiver<SurfaceCommand>) -> usize {
        let mut handled = 0;
        loop {
            match commands.try_recv() {
                Ok(command) => {
                    self.handle_command(command);
                    handled += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        handled
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings
    // ─────────────────────────────────────────────────────────────────────────

    /// Copy the surface's persistent state into `settings`.
    pub fn write_settings(&self, settings: &mut Settings) {
        settings.view_mode = self.mode;
        settings.split_ratio = self.split.ratio().value();
        settings.sync_scroll_enabled = self.sync.is_enabled();
        settings.presentation = self.presentation.clone();
        if let Some(path) = &self.current_path {
            settings.add_recent_file(path.clone());
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
