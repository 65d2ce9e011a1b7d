use serde::{Deserialize, Serialize};

use super::Node;

/// Rendering configuration passed to every render and update call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Branch colours stop varying below this tree depth
    pub color_freeze_level: usize,
    /// Transition animation time in milliseconds
    pub duration_ms: u64,
    /// Horizontal wrap width per node
    pub max_width: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color_freeze_level: 2,
            duration_ms: 300,
            max_width: 300,
        }
    }
}

/// Drawing side of the diagram adapter.
///
/// The handle returned by `render` carries the camera state, so `update`
/// redraws in place without resetting pan or zoom.
pub trait Renderer {
    type Handle;

    fn render(&mut self, tree: &Node, options: &RenderOptions) -> Self::Handle;
    fn update(&mut self, handle: &mut Self::Handle, tree: &Node, options: &RenderOptions);
    fn rescale(&mut self, handle: &mut Self::Handle, factor: f64);
    fn fit_to_view(&mut self, handle: &mut Self::Handle);
}

/// One diagram instance: a renderer plus the handle of its first render.
pub struct Diagram<R: Renderer> {
    renderer: R,
    handle: Option<R::Handle>,
    options: RenderOptions,
}

impl<R: Renderer> Diagram<R> {
    pub fn new(renderer: R, options: RenderOptions) -> Self {
        Self {
            renderer,
            handle: None,
            options,
        }
    }

    /// Create the render on first use, update it in place afterwards
    pub fn show(&mut self, tree: &Node) {
        match self.handle.as_mut() {
            Some(handle) => self.renderer.update(handle, tree, &self.options),
            None => self.handle = Some(self.renderer.render(tree, &self.options)),
        }
    }

    /// Returns false when nothing has been rendered yet
    pub fn rescale(&mut self, factor: f64) -> bool {
        match self.handle.as_mut() {
            Some(handle) => {
                self.renderer.rescale(handle, factor);
                true
            }
            None => false,
        }
    }

    pub fn fit(&mut self) -> bool {
        match self.handle.as_mut() {
            Some(handle) => {
                self.renderer.fit_to_view(handle);
                true
            }
            None => false,
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&R::Handle> {
        self.handle.as_ref()
    }

    /// Host-side camera access, e.g. scrolling a terminal surface
    pub fn handle_mut(&mut self) -> Option<&mut R::Handle> {
        self.handle.as_mut()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}
