//! Sync engine: document read -> transform -> index rebuild -> diagram update.
//!
//! A pass is split into [`SyncEngine::begin_pass`] and [`SyncEngine::complete_pass`]
//! so a host that reads documents asynchronously can run other events in
//! between. Anything that happens to the binding in that gap is caught by the
//! generation check in `complete_pass`.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::diagram::{Diagram, Node, Renderer, Transformer};
use crate::error::{StoreError, SyncError};
use crate::index::{NodeLineIndex, build_index};
use crate::models::DocumentHandle;
use crate::schedule::{Debouncer, SyncGate, SyncState};
use crate::store::{DocumentEvent, DocumentStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Change notifications inside this window collapse into one pass
    pub debounce_ms: u64,
    /// Run one catch-up pass after the window when notifications were
    /// suppressed. Off by default: a burst inside one window is one pass.
    pub trailing: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            trailing: false,
        }
    }
}

/// Why a pass was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Bind,
    Modified,
    EditorChanged,
    Refresh,
    /// Catch-up for notifications suppressed by the debouncer
    Trailing,
    /// Rerun owed to triggers that arrived during an earlier pass
    Coalesced,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Diagram updated from the current text
    Rendered { nodes: usize },
    /// Another pass is in flight; this trigger will run after it
    Coalesced,
    /// Result belonged to a document that is no longer bound
    Stale,
    /// No document is bound
    Unbound,
}

/// A started pass. Holds the handle and generation it was started for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPass {
    handle: DocumentHandle,
    generation: u64,
    trigger: SyncTrigger,
}

impl PendingPass {
    pub fn handle(&self) -> &DocumentHandle {
        &self.handle
    }

    pub fn trigger(&self) -> SyncTrigger {
        self.trigger
    }
}

#[derive(Debug, Clone)]
struct Binding {
    handle: DocumentHandle,
    generation: u64,
}

pub struct SyncEngine<T: Transformer> {
    transformer: T,
    binding: Option<Binding>,
    generation: u64,
    index: NodeLineIndex,
    tree: Option<Node>,
    gate: SyncGate,
    debouncer: Debouncer,
}

impl<T: Transformer> SyncEngine<T> {
    pub fn new(transformer: T, settings: &SyncSettings) -> Self {
        Self {
            transformer,
            binding: None,
            generation: 0,
            index: NodeLineIndex::new(),
            tree: None,
            gate: SyncGate::new(),
            debouncer: Debouncer::new(
                Duration::from_millis(settings.debounce_ms),
                settings.trailing,
            ),
        }
    }

    /// Attach to `handle`, detaching from any previous document.
    ///
    /// The index of the old document is dropped so no edit can land in the
    /// wrong file. Passes started before this call complete as stale.
    pub fn bind(&mut self, handle: DocumentHandle) {
        self.generation += 1;
        log::info!("binding diagram to {handle} (generation {})", self.generation);
        self.binding = Some(Binding {
            handle,
            generation: self.generation,
        });
        self.index = NodeLineIndex::new();
        self.debouncer.reset();
    }

    pub fn unbind(&mut self) {
        if let Some(binding) = self.binding.take() {
            log::info!("unbinding diagram from {}", binding.handle);
        }
        self.generation += 1;
        self.index = NodeLineIndex::new();
        self.debouncer.reset();
    }

    pub fn binding(&self) -> Option<&DocumentHandle> {
        self.binding.as_ref().map(|b| &b.handle)
    }

    /// Index snapshot from the last successful pass
    pub fn index(&self) -> &NodeLineIndex {
        &self.index
    }

    /// Tree from the last successful pass
    pub fn tree(&self) -> Option<&Node> {
        self.tree.as_ref()
    }

    pub fn state(&self) -> SyncState {
        self.gate.state()
    }

    /// Filter and debounce a change notification.
    ///
    /// Returns the trigger to run now, or `None` when the event is for another
    /// document or falls inside the debounce window.
    pub fn notify(&mut self, event: &DocumentEvent, now: Instant) -> Option<SyncTrigger> {
        let bound = &self.binding.as_ref()?.handle;
        if bound != event.handle() {
            return None;
        }
        if !self.debouncer.notify(now) {
            log::debug!("debounced change notification for {bound}");
            return None;
        }
        Some(match event {
            DocumentEvent::Modified(_) => SyncTrigger::Modified,
            DocumentEvent::EditorChanged(_) => SyncTrigger::EditorChanged,
        })
    }

    /// Timer hook: returns a trigger when a coalesced rerun or a trailing
    /// debounced pass is due.
    pub fn poll(&mut self, now: Instant) -> Option<SyncTrigger> {
        self.binding.as_ref()?;
        if self.gate.state() == SyncState::Idle && self.gate.is_pending() {
            return Some(SyncTrigger::Coalesced);
        }
        self.debouncer.poll(now).then_some(SyncTrigger::Trailing)
    }

    /// When the host should next call [`SyncEngine::poll`]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    /// Start a pass. Returns `None` when unbound or when a pass is already
    /// running, in which case the trigger is kept as the single pending rerun.
    pub fn begin_pass(&mut self, trigger: SyncTrigger) -> Option<PendingPass> {
        let binding = self.binding.as_ref()?;
        if !self.gate.try_begin() {
            log::debug!("{trigger:?} coalesced into running pass");
            return None;
        }
        log::debug!("sync pass for {} ({trigger:?})", binding.handle);
        Some(PendingPass {
            handle: binding.handle.clone(),
            generation: binding.generation,
            trigger,
        })
    }

    /// Apply the text read for `pass`. On any failure the previous index and
    /// diagram are left untouched.
    pub fn complete_pass<R: Renderer>(
        &mut self,
        pass: PendingPass,
        text: Result<String, StoreError>,
        diagram: &mut Diagram<R>,
    ) -> Result<SyncOutcome, SyncError> {
        let result = self.apply(pass, text, diagram);
        self.gate.finish();
        result
    }

    fn apply<R: Renderer>(
        &mut self,
        pass: PendingPass,
        text: Result<String, StoreError>,
        diagram: &mut Diagram<R>,
    ) -> Result<SyncOutcome, SyncError> {
        if self.binding.as_ref().map(|b| b.generation) != Some(pass.generation) {
            log::debug!("discarding stale pass for {}", pass.handle);
            return Ok(SyncOutcome::Stale);
        }

        let text = text?;
        let transformed = self.transformer.transform(&text).inspect_err(|e| {
            log::warn!("transform of {} failed, keeping last diagram: {e}", pass.handle);
        })?;
        let index = build_index(&text);

        diagram.show(&transformed.root);
        let nodes = transformed.root.count();
        self.index = index;
        self.tree = Some(transformed.root);
        Ok(SyncOutcome::Rendered { nodes })
    }

    /// Run a full pass against `store`, then any rerun owed to triggers that
    /// arrived meanwhile.
    pub fn run<S: DocumentStore, R: Renderer>(
        &mut self,
        trigger: SyncTrigger,
        store: &S,
        diagram: &mut Diagram<R>,
    ) -> Result<SyncOutcome, SyncError> {
        if self.binding.is_none() {
            return Ok(SyncOutcome::Unbound);
        }
        let mut trigger = trigger;
        loop {
            let Some(pass) = self.begin_pass(trigger) else {
                return Ok(SyncOutcome::Coalesced);
            };
            let text = store.read(pass.handle());
            let outcome = self.complete_pass(pass, text, diagram)?;
            if !self.gate.is_pending() {
                return Ok(outcome);
            }
            trigger = SyncTrigger::Coalesced;
        }
    }
}
