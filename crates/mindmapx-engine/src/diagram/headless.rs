use super::{Node, RenderOptions, Renderer};

/// Everything a [`HeadlessRenderer`] was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Render { root: String },
    Update { root: String },
    Rescale { factor: f64 },
    FitToView,
}

/// Camera state of a headless render.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessHandle {
    pub scale: f64,
    pub tree: Node,
}

/// Most recent calls kept in [`HeadlessRenderer::calls`].
pub const CALL_LOG_LIMIT: usize = 256;

/// Renderer without a drawing surface. Keeps the last tree, for hosts that
/// only need the synchronized model, and a bounded log of recent calls.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    /// The last [`CALL_LOG_LIMIT`] calls, oldest first
    pub calls: Vec<RenderCall>,
    renders: usize,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render and update calls over the renderer's lifetime
    pub fn render_count(&self) -> usize {
        self.renders
    }

    fn record(&mut self, call: RenderCall) {
        if matches!(call, RenderCall::Render { .. } | RenderCall::Update { .. }) {
            self.renders += 1;
        }
        self.calls.push(call);
        if self.calls.len() > CALL_LOG_LIMIT {
            let excess = self.calls.len() - CALL_LOG_LIMIT;
            self.calls.drain(..excess);
        }
    }
}

impl Renderer for HeadlessRenderer {
    type Handle = HeadlessHandle;

    fn render(&mut self, tree: &Node, _options: &RenderOptions) -> HeadlessHandle {
        self.record(RenderCall::Render {
            root: tree.content.clone(),
        });
        HeadlessHandle {
            scale: 1.0,
            tree: tree.clone(),
        }
    }

    fn update(&mut self, handle: &mut HeadlessHandle, tree: &Node, _options: &RenderOptions) {
        self.record(RenderCall::Update {
            root: tree.content.clone(),
        });
        handle.tree = tree.clone();
    }

    fn rescale(&mut self, handle: &mut HeadlessHandle, factor: f64) {
        self.record(RenderCall::Rescale { factor });
        handle.scale *= factor;
    }

    fn fit_to_view(&mut self, _handle: &mut HeadlessHandle) {
        self.record(RenderCall::FitToView);
    }
}
