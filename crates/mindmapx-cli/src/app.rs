use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use mindmapx_engine::{
    Anchor, CommitOutcome, DocumentEvent, DocumentHandle, EditError, EditKey, FsDocumentStore,
    MarkdownTransformer, MindMapView, SyncError, SyncOutcome, ViewSettings, Workspace,
};

use crate::canvas::{CELL_HEIGHT, CELL_WIDTH, Canvas, TerminalRenderer};

pub type View = MindMapView<FsDocumentStore, MarkdownTransformer, TerminalRenderer>;
type ViewFactory = Box<dyn FnMut() -> View>;

const DOUBLE_CLICK: Duration = Duration::from_millis(400);
const TICK: Duration = Duration::from_millis(100);

pub enum Flow {
    Continue,
    Quit,
}

/// A screen line showing part of a row, recorded while drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub row: usize,
}

pub struct App {
    workspace: Workspace<FsDocumentStore, MarkdownTransformer, TerminalRenderer, ViewFactory>,
    pub selected: usize,
    pub status: String,
    pub hits: Vec<Hit>,
    pub body_height: usize,
    last_click: Option<(Instant, usize)>,
}

impl App {
    pub fn new(store: FsDocumentStore, settings: ViewSettings) -> Self {
        let factory: ViewFactory = Box::new(move || {
            MindMapView::new(
                store.clone(),
                MarkdownTransformer::new(),
                TerminalRenderer::new(),
                settings.clone(),
            )
        });
        Self {
            workspace: Workspace::new(factory),
            selected: 0,
            status: String::new(),
            hits: Vec::new(),
            body_height: 0,
            last_click: None,
        }
    }

    pub fn open(&mut self, handle: DocumentHandle) {
        let result = self.workspace.open_diagram(handle);
        self.report_sync(result.map(Some));
    }

    pub fn view(&self) -> Option<&View> {
        self.workspace.view()
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.view()?.diagram().handle()
    }

    pub fn title(&self) -> String {
        match self.view() {
            Some(view) => format!("{} ({:.0}%)", view.display_text(), view.scale() * 100.0),
            None => "Mind map".to_string(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.view().and_then(View::edit_session).is_some()
    }

    pub fn on_document_event(&mut self, event: DocumentEvent) {
        let Some(view) = self.workspace.view_mut() else {
            return;
        };
        let result = view.handle_event(&event, Instant::now());
        self.report_sync(result);
    }

    /// Drives trailing and coalesced passes
    pub fn tick(&mut self) {
        let Some(view) = self.workspace.view_mut() else {
            return;
        };
        let result = view.tick(Instant::now());
        self.report_sync(result);
    }

    /// How long the event loop may block before the next tick is due
    pub fn poll_timeout(&self) -> Duration {
        let now = Instant::now();
        self.view()
            .and_then(View::next_deadline)
            .map(|deadline| deadline.saturating_duration_since(now).min(TICK))
            .unwrap_or(TICK)
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Flow {
        if self.is_editing() {
            self.on_edit_key(key);
            return Flow::Continue;
        }

        match key.code {
            KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Char('+') | KeyCode::Char('=') => self.with_view(View::zoom_in),
            KeyCode::Char('-') => self.with_view(View::zoom_out),
            KeyCode::Char('f') => self.with_view(View::fit),
            KeyCode::Char('r') => {
                if let Some(view) = self.workspace.view_mut() {
                    let result = view.refresh();
                    self.report_sync(result.map(Some));
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Enter => self.start_edit_on(self.selected),
            _ => {}
        }
        Flow::Continue
    }

    fn on_edit_key(&mut self, key: KeyEvent) {
        let Some(view) = self.workspace.view_mut() else {
            return;
        };
        let edit_key = match key.code {
            KeyCode::Enter => EditKey::Confirm,
            KeyCode::Esc => EditKey::Cancel,
            KeyCode::Tab => EditKey::Blur,
            KeyCode::Backspace => {
                if let Some(session) = view.edit_session_mut() {
                    session.backspace();
                }
                return;
            }
            KeyCode::Char(c) => {
                if let Some(session) = view.edit_session_mut() {
                    session.push_char(c);
                }
                return;
            }
            _ => return,
        };
        let result = view.edit_key(edit_key);
        self.report_commit(result);
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        let zoom_modifier = mouse.modifiers.contains(KeyModifiers::CONTROL);
        match mouse.kind {
            MouseEventKind::ScrollUp if zoom_modifier => self.with_view(|v| v.zoom_scroll(-1.0)),
            MouseEventKind::ScrollDown if zoom_modifier => self.with_view(|v| v.zoom_scroll(1.0)),
            MouseEventKind::ScrollUp => self.select_previous(),
            MouseEventKind::ScrollDown => self.select_next(),
            MouseEventKind::Down(MouseButton::Left) => self.on_click(mouse.row, Instant::now()),
            _ => {}
        }
    }

    fn on_click(&mut self, y: u16, now: Instant) {
        if self.is_editing() {
            // Clicking away from the editor is a focus loss
            if let Some(view) = self.workspace.view_mut() {
                let result = view.edit_key(EditKey::Blur);
                self.report_commit(result);
            }
            return;
        }

        let Some(row) = self.hits.iter().find(|h| h.y == y).map(|h| h.row) else {
            return;
        };
        let double = matches!(
            self.last_click,
            Some((at, last)) if last == row && now.duration_since(at) <= DOUBLE_CLICK
        );
        self.select(row);
        if double {
            self.last_click = None;
            self.start_edit_on(row);
        } else {
            self.last_click = Some((now, row));
        }
    }

    fn start_edit_on(&mut self, row: usize) {
        let Some(text) = self
            .canvas()
            .and_then(|c| c.rows().get(row))
            .map(|r| r.text.clone())
        else {
            return;
        };
        let Some(hit) = self.hits.iter().find(|h| h.row == row).copied() else {
            return;
        };
        let anchor = Anchor {
            x: f64::from(hit.x) * CELL_WIDTH,
            y: f64::from(hit.y) * CELL_HEIGHT,
            width: f64::from(hit.width) * CELL_WIDTH,
            height: CELL_HEIGHT,
        };
        if let Some(view) = self.workspace.view_mut()
            && view.start_edit(&text, anchor)
        {
            self.status = "Editing: Enter saves, Esc cancels".to_string();
        }
    }

    fn with_view(&mut self, f: impl FnOnce(&mut View)) {
        if let Some(view) = self.workspace.view_mut() {
            f(view);
        }
    }

    fn row_count(&self) -> usize {
        self.canvas().map_or(0, |c| c.rows().len())
    }

    fn select_next(&mut self) {
        let count = self.row_count();
        if count > 0 {
            self.select((self.selected + 1).min(count - 1));
        }
    }

    fn select_previous(&mut self) {
        self.select(self.selected.saturating_sub(1));
    }

    fn select(&mut self, row: usize) {
        self.selected = row;
        let height = self.body_height;
        if let Some(canvas) = self
            .workspace
            .view_mut()
            .and_then(|v| v.diagram_mut().handle_mut())
        {
            canvas.reveal(row, height);
        }
    }

    fn report_sync(&mut self, result: Result<Option<SyncOutcome>, SyncError>) {
        match result {
            Ok(Some(SyncOutcome::Rendered { nodes })) => {
                self.status = format!("{nodes} nodes");
                let count = self.row_count();
                if self.selected >= count {
                    self.selected = count.saturating_sub(1);
                }
            }
            Ok(Some(SyncOutcome::Unbound)) => self.status = "No document".to_string(),
            Ok(_) => {}
            Err(e) => {
                log::warn!("sync failed: {e}");
                self.status = format!("Showing last diagram: {e}");
            }
        }
    }

    fn report_commit(&mut self, result: Result<CommitOutcome, EditError>) {
        self.status = match result {
            Ok(CommitOutcome::Written { line }) => format!("Saved line {}", line + 1),
            Ok(CommitOutcome::Discarded(miss)) => {
                format!("Edit dropped, the document changed underneath ({miss:?})")
            }
            Ok(_) => String::new(),
            Err(e) => {
                log::error!("could not save edit: {e}");
                format!("Could not save: {e}")
            }
        };
    }
}
