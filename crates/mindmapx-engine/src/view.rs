//! One diagram instance wired to its document, and the host-facing entry point.

use std::time::Instant;

use crate::diagram::{Diagram, Node, RenderOptions, Renderer, Transformer};
use crate::edit::{Anchor, CommitOutcome, EditKey, EditOverlay, EditSession};
use crate::error::{EditError, SyncError};
use crate::index::NodeLineIndex;
use crate::models::DocumentHandle;
use crate::store::{DocumentEvent, DocumentStore};
use crate::sync::{SyncEngine, SyncOutcome, SyncSettings, SyncTrigger};
use crate::viewport::{Viewport, ViewportLimits};

/// Everything one diagram needs to build itself, bundled for [`MindMapView::new`].
#[derive(Debug, Clone, Default)]
pub struct ViewSettings {
    pub render: RenderOptions,
    pub sync: SyncSettings,
    pub viewport: ViewportLimits,
}

/// A mind map bound to (at most) one document.
///
/// Owns the sync engine, the rendered diagram, the edit overlay and the
/// viewport. All entry points are plain method calls made by the host's
/// event loop, one at a time.
pub struct MindMapView<S: DocumentStore, T: Transformer, R: Renderer> {
    store: S,
    sync: SyncEngine<T>,
    diagram: Diagram<R>,
    overlay: EditOverlay,
    viewport: Viewport,
}

impl<S: DocumentStore, T: Transformer, R: Renderer> MindMapView<S, T, R> {
    pub fn new(store: S, transformer: T, renderer: R, settings: ViewSettings) -> Self {
        Self {
            store,
            sync: SyncEngine::new(transformer, &settings.sync),
            diagram: Diagram::new(renderer, settings.render),
            overlay: EditOverlay::new(),
            viewport: Viewport::new(settings.viewport),
        }
    }

    /// Bind to `handle` and synchronize immediately. Any open edit is cancelled.
    pub fn set_file(&mut self, handle: DocumentHandle) -> Result<SyncOutcome, SyncError> {
        if self.overlay.cancel().is_some() {
            log::debug!("cancelled edit on rebind");
        }
        self.sync.bind(handle);
        self.sync
            .run(SyncTrigger::Bind, &self.store, &mut self.diagram)
    }

    /// Route an external change notification through the debounced path
    pub fn handle_event(
        &mut self,
        event: &DocumentEvent,
        now: Instant,
    ) -> Result<Option<SyncOutcome>, SyncError> {
        match self.sync.notify(event, now) {
            Some(trigger) => self.run(trigger).map(Some),
            None => Ok(None),
        }
    }

    /// Timer hook for trailing and coalesced passes
    pub fn tick(&mut self, now: Instant) -> Result<Option<SyncOutcome>, SyncError> {
        match self.sync.poll(now) {
            Some(trigger) => self.run(trigger).map(Some),
            None => Ok(None),
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.sync.next_deadline()
    }

    /// Explicit refresh: synchronize, then fit the diagram to the view
    pub fn refresh(&mut self) -> Result<SyncOutcome, SyncError> {
        let outcome = self.run(SyncTrigger::Refresh)?;
        self.fit();
        Ok(outcome)
    }

    fn run(&mut self, trigger: SyncTrigger) -> Result<SyncOutcome, SyncError> {
        self.sync.run(trigger, &self.store, &mut self.diagram)
    }

    pub fn zoom_in(&mut self) {
        self.zoom(Viewport::zoom_in);
    }

    pub fn zoom_out(&mut self) {
        self.zoom(Viewport::zoom_out);
    }

    /// Modifier-held wheel input
    pub fn zoom_scroll(&mut self, delta: f64) {
        self.zoom(|viewport| viewport.zoom_scroll(delta));
    }

    /// Zoom is ignored until something is rendered, so the tracked scale
    /// always equals the scale the renderer was given.
    fn zoom(&mut self, step: impl FnOnce(&mut Viewport) -> Option<f64>) {
        if !self.diagram.is_rendered() {
            log::debug!("zoom ignored, nothing rendered yet");
            return;
        }
        if let Some(factor) = step(&mut self.viewport) {
            self.diagram.rescale(factor);
        }
    }

    pub fn fit(&mut self) {
        self.diagram.fit();
    }

    /// Double-click on a rendered node. False when an edit is already open.
    pub fn start_edit(&mut self, display_text: &str, anchor: Anchor) -> bool {
        self.overlay.start(display_text, anchor)
    }

    /// Confirm and blur commit, cancel closes. Either way the editor closes.
    pub fn edit_key(&mut self, key: EditKey) -> Result<CommitOutcome, EditError> {
        match key {
            EditKey::Confirm | EditKey::Blur => self.commit_edit(),
            EditKey::Cancel => {
                self.cancel_edit();
                Ok(CommitOutcome::Unchanged)
            }
        }
    }

    pub fn commit_edit(&mut self) -> Result<CommitOutcome, EditError> {
        self.overlay
            .commit(&mut self.store, self.sync.binding(), self.sync.index())
    }

    pub fn cancel_edit(&mut self) {
        self.overlay.cancel();
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.overlay.session()
    }

    pub fn edit_session_mut(&mut self) -> Option<&mut EditSession> {
        self.overlay.session_mut()
    }

    /// Title shown for the view
    pub fn display_text(&self) -> String {
        match self.sync.binding() {
            Some(handle) => format!("Mind map: {}", handle.basename()),
            None => "Mind map".to_string(),
        }
    }

    pub fn binding(&self) -> Option<&DocumentHandle> {
        self.sync.binding()
    }

    pub fn tree(&self) -> Option<&Node> {
        self.sync.tree()
    }

    pub fn index(&self) -> &NodeLineIndex {
        self.sync.index()
    }

    pub fn scale(&self) -> f64 {
        self.viewport.scale()
    }

    pub fn diagram(&self) -> &Diagram<R> {
        &self.diagram
    }

    pub fn diagram_mut(&mut self) -> &mut Diagram<R> {
        &mut self.diagram
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

/// Host entry point: at most one diagram, reused across documents.
pub struct Workspace<S, T, R, F>
where
    S: DocumentStore,
    T: Transformer,
    R: Renderer,
    F: FnMut() -> MindMapView<S, T, R>,
{
    factory: F,
    view: Option<MindMapView<S, T, R>>,
}

impl<S, T, R, F> Workspace<S, T, R, F>
where
    S: DocumentStore,
    T: Transformer,
    R: Renderer,
    F: FnMut() -> MindMapView<S, T, R>,
{
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            view: None,
        }
    }

    /// Show the diagram for `handle`, creating the view on first use and
    /// rebinding the existing one afterwards.
    ///
    /// The view is available through [`Workspace::view`] even when the first
    /// synchronization fails.
    pub fn open_diagram(&mut self, handle: DocumentHandle) -> Result<SyncOutcome, SyncError> {
        let factory = &mut self.factory;
        let view = self.view.get_or_insert_with(|| {
            log::info!("creating mind map view");
            factory()
        });
        view.set_file(handle)
    }

    pub fn view(&self) -> Option<&MindMapView<S, T, R>> {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> Option<&mut MindMapView<S, T, R>> {
        self.view.as_mut()
    }

    /// Drop the view and its diagram
    pub fn close(&mut self) {
        self.view = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{HeadlessRenderer, MarkdownTransformer, RenderCall};
    use crate::store::MemoryDocumentStore;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    type TestView = MindMapView<MemoryDocumentStore, MarkdownTransformer, HeadlessRenderer>;

    fn view(store: MemoryDocumentStore) -> TestView {
        MindMapView::new(
            store,
            MarkdownTransformer::new(),
            HeadlessRenderer::new(),
            ViewSettings::default(),
        )
    }

    fn anchor() -> Anchor {
        Anchor {
            x: 0.0,
            y: 0.0,
            width: 80.0,
            height: 10.0,
        }
    }

    #[test]
    fn test_edit_writes_back_and_resyncs() {
        let t0 = Instant::now();
        let mut view = view(MemoryDocumentStore::new().with_document("a.md", "# Plan\n- old\n"));
        view.set_file("a.md".into()).unwrap();

        assert!(view.start_edit("old", anchor()));
        view.edit_session_mut().unwrap().set_draft("new");
        let outcome = view.edit_key(EditKey::Confirm).unwrap();
        assert_eq!(outcome, CommitOutcome::Written { line: 1 });
        assert!(view.edit_session().is_none());

        let handle = DocumentHandle::from("a.md");
        assert_eq!(view.store().text(&handle), Some("# Plan\n- new\n"));

        // The store reports its own write; feeding it back re-renders
        for event in view.store_mut().take_events() {
            view.handle_event(&event, t0).unwrap();
        }
        assert_eq!(view.tree().unwrap().children[0].content, "new");
        assert!(view.index().get("new").is_some());
        assert!(view.index().get("old").is_none());
    }

    #[test]
    fn test_cancel_key_closes_without_writing() {
        let mut view = view(MemoryDocumentStore::new().with_document("a.md", "- a\n"));
        view.set_file("a.md".into()).unwrap();
        view.start_edit("a", anchor());
        view.edit_session_mut().unwrap().set_draft("b");

        view.edit_key(EditKey::Cancel).unwrap();

        assert!(view.edit_session().is_none());
        assert_eq!(view.store().write_count(), 0);
    }

    #[test]
    fn test_blur_commits() {
        let mut view = view(MemoryDocumentStore::new().with_document("a.md", "- a\n"));
        view.set_file("a.md".into()).unwrap();
        view.start_edit("a", anchor());
        view.edit_session_mut().unwrap().set_draft("b");

        let outcome = view.edit_key(EditKey::Blur).unwrap();
        assert_eq!(outcome, CommitOutcome::Written { line: 0 });
    }

    #[test]
    fn test_rebind_cancels_open_edit() {
        let store = MemoryDocumentStore::new()
            .with_document("a.md", "- a\n")
            .with_document("b.md", "- b\n");
        let mut view = view(store);
        view.set_file("a.md".into()).unwrap();
        view.start_edit("a", anchor());

        view.set_file("b.md".into()).unwrap();

        assert!(view.edit_session().is_none());
        assert_eq!(view.display_text(), "Mind map: b");
    }

    #[test]
    fn test_zoom_forwards_clamped_factor() {
        let mut view = view(MemoryDocumentStore::new().with_document("a.md", "- a\n"));
        view.set_file("a.md".into()).unwrap();

        for _ in 0..20 {
            view.zoom_in();
        }
        view.zoom_out();
        view.fit();

        let handle_scale_before_fit: f64 = view
            .diagram()
            .renderer()
            .calls
            .iter()
            .filter_map(|c| match c {
                RenderCall::Rescale { factor } => Some(*factor),
                _ => None,
            })
            .product();
        assert!((handle_scale_before_fit - 3.5).abs() < 1e-9);
        assert!((view.scale() - 3.5).abs() < 1e-9);
        assert_eq!(
            view.diagram().renderer().calls.last(),
            Some(&RenderCall::FitToView)
        );
    }

    #[test]
    fn test_zoom_before_first_render_is_ignored() {
        let mut view = view(MemoryDocumentStore::new().with_document("a.md", "- a\n"));
        view.zoom_in();
        view.zoom_scroll(-3.0);
        assert_eq!(view.scale(), 1.0);
        assert!(view.diagram().renderer().calls.is_empty());

        view.set_file("a.md".into()).unwrap();
        for _ in 0..30 {
            view.zoom_in();
        }
        let handle_scale = view.diagram().handle().unwrap().scale;
        assert!((view.scale() - 5.0).abs() < 1e-9);
        assert!((handle_scale - view.scale()).abs() < 1e-9);
    }

    #[test]
    fn test_refresh_syncs_then_fits() {
        let mut view = view(MemoryDocumentStore::new().with_document("a.md", "- a\n"));
        view.set_file("a.md".into()).unwrap();
        view.refresh().unwrap();

        assert_eq!(
            view.diagram().renderer().calls,
            vec![
                RenderCall::Render { root: "a".into() },
                RenderCall::Update { root: "a".into() },
                RenderCall::FitToView,
            ]
        );
    }

    #[test]
    fn test_burst_ticked_through_window_renders_once() {
        let t0 = Instant::now();
        let handle = DocumentHandle::from("a.md");
        let mut view = view(MemoryDocumentStore::new().with_document("a.md", "- one\n"));
        view.set_file(handle.clone()).unwrap();

        let mut passes = 0;
        for i in 0..5u64 {
            let event = DocumentEvent::Modified(handle.clone());
            if view
                .handle_event(&event, t0 + Duration::from_millis(i * 50))
                .unwrap()
                .is_some()
            {
                passes += 1;
            }
        }
        for i in 0..20u64 {
            if view.tick(t0 + Duration::from_millis(i * 100)).unwrap().is_some() {
                passes += 1;
            }
        }

        assert_eq!(passes, 1);
        assert_eq!(view.diagram().renderer().render_count(), 2);
    }

    #[test]
    fn test_trailing_tick_picks_up_last_change() {
        let t0 = Instant::now();
        let handle = DocumentHandle::from("a.md");
        let settings = ViewSettings {
            sync: SyncSettings {
                trailing: true,
                ..SyncSettings::default()
            },
            ..ViewSettings::default()
        };
        let mut view = MindMapView::new(
            MemoryDocumentStore::new().with_document("a.md", "- one\n"),
            MarkdownTransformer::new(),
            HeadlessRenderer::new(),
            settings,
        );
        view.set_file(handle.clone()).unwrap();

        view.store_mut().modify_externally(&handle, "- two\n");
        let first = view
            .handle_event(&DocumentEvent::Modified(handle.clone()), t0)
            .unwrap();
        view.store_mut().modify_externally(&handle, "- three\n");
        let second = view
            .handle_event(
                &DocumentEvent::EditorChanged(handle.clone()),
                t0 + Duration::from_millis(100),
            )
            .unwrap();

        assert_eq!(first, Some(SyncOutcome::Rendered { nodes: 1 }));
        assert_eq!(second, None);
        assert_eq!(view.tree().unwrap().content, "two");

        assert_eq!(view.tick(t0 + Duration::from_millis(200)).unwrap(), None);
        let trailing = view.tick(t0 + Duration::from_millis(300)).unwrap();
        assert_eq!(trailing, Some(SyncOutcome::Rendered { nodes: 1 }));
        assert_eq!(view.tree().unwrap().content, "three");
    }

    #[test]
    fn test_display_text_unbound() {
        let view = view(MemoryDocumentStore::new());
        assert_eq!(view.display_text(), "Mind map");
    }

    #[test]
    fn test_open_diagram_reuses_view() {
        let mut created = 0;
        let mut workspace = Workspace::new(|| {
            created += 1;
            view(
                MemoryDocumentStore::new()
                    .with_document("a.md", "- a\n")
                    .with_document("b.md", "- b\n"),
            )
        });

        workspace.open_diagram("a.md".into()).unwrap();
        workspace.view_mut().unwrap().zoom_in();
        workspace.open_diagram("b.md".into()).unwrap();

        let view = workspace.view().unwrap();
        assert_eq!(view.binding(), Some(&DocumentHandle::from("b.md")));
        // Same instance: zoom state and render handle survive the rebind
        assert!((view.scale() - 1.3).abs() < 1e-12);
        assert_eq!(view.diagram().renderer().render_count(), 2);
        assert_eq!(
            view.diagram().renderer().calls.last(),
            Some(&RenderCall::Update { root: "b".into() })
        );

        workspace.close();
        assert!(workspace.view().is_none());
        drop(workspace);
        assert_eq!(created, 1);
    }
}
