use mindmapx_engine::{DocumentEvent, DocumentHandle};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, channel};

/// Watches the directory holding one document and reports changes to it.
///
/// The parent is watched rather than the file so that editors which save by
/// rename are still seen.
pub struct DocumentWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<Event>>,
    path: PathBuf,
    handle: DocumentHandle,
}

impl DocumentWatcher {
    pub fn new(path: PathBuf, handle: DocumentHandle) -> notify::Result<Self> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        let dir = path.parent().unwrap_or(Path::new("."));
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            path,
            handle,
        })
    }

    /// Everything reported since the last call, without blocking
    pub fn drain(&self) -> Vec<DocumentEvent> {
        let mut events = Vec::new();
        while let Ok(res) = self.receiver.try_recv() {
            match res {
                Ok(event) if touches(&event, &self.path) => {
                    events.push(DocumentEvent::Modified(self.handle.clone()));
                }
                Ok(_) => {}
                Err(e) => log::warn!("file watcher error: {e}"),
            }
        }
        events
    }
}

fn touches(event: &Event, path: &Path) -> bool {
    !matches!(event.kind, EventKind::Access(_)) && event.paths.iter().any(|p| p == path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_only_changes_to_the_bound_file_count() {
        let path = Path::new("/notes/plan.md");

        assert!(touches(
            &event(EventKind::Modify(ModifyKind::Any), "/notes/plan.md"),
            path
        ));
        assert!(touches(
            &event(EventKind::Create(CreateKind::File), "/notes/plan.md"),
            path
        ));
        assert!(!touches(
            &event(EventKind::Modify(ModifyKind::Any), "/notes/other.md"),
            path
        ));
        assert!(!touches(
            &event(EventKind::Access(AccessKind::Any), "/notes/plan.md"),
            path
        ));
    }
}
