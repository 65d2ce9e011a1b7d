mod app;
mod canvas;
mod ui;
mod watch;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use mindmapx_config::Config;
use mindmapx_engine::{DocumentHandle, FsDocumentStore};
use ratatui::{Terminal, backend::CrosstermBackend};
use relative_path::RelativePathBuf;
use std::{
    env, fs,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
};

use app::{App, Flow};
use watch::DocumentWatcher;

type Tui = Terminal<CrosstermBackend<Stdout>>;

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    if args.len() != 2 {
        eprintln!("Usage: {} <markdown-file>", args[0]);
        eprintln!(
            "Relative paths resolve against notes_path in {}",
            config_path.display()
        );
        process::exit(1);
    }

    let (notes_root, handle, absolute) =
        match resolve_document(Path::new(&args[1]), config.notes_path.as_deref()) {
            Ok(resolved) => resolved,
            Err(e) => {
                eprintln!("Error: {e:#}");
                process::exit(1);
            }
        };
    log::info!("opening {} below {}", handle, notes_root.display());

    let store = FsDocumentStore::new(&notes_root)?;
    let watcher = DocumentWatcher::new(absolute, handle.clone())
        .context("Failed to watch the document for changes")?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, config.view_settings());
    app.open(handle);

    let res = run_app(&mut terminal, &mut app, &watcher);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Tui, app: &mut App, watcher: &DocumentWatcher) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        for change in watcher.drain() {
            app.on_document_event(change);
        }
        app.tick();

        if event::poll(app.poll_timeout())? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Flow::Quit = app.on_key(key) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }
    }
}

/// Work out the notes root, the document handle below it and the file's absolute path.
///
/// Relative arguments resolve against `notes_path` when configured, else the
/// working directory. A file outside the notes root is opened with its own
/// directory as the root.
fn resolve_document(
    file: &Path,
    notes_path: Option<&Path>,
) -> Result<(PathBuf, DocumentHandle, PathBuf)> {
    let candidate = if file.is_absolute() {
        file.to_path_buf()
    } else if let Some(root) = notes_path {
        root.join(file)
    } else {
        env::current_dir()?.join(file)
    };
    let absolute = candidate
        .canonicalize()
        .with_context(|| format!("Cannot open '{}'", candidate.display()))?;

    let root = match notes_path.and_then(|r| r.canonicalize().ok()) {
        Some(root) if absolute.starts_with(&root) => root,
        _ => absolute
            .parent()
            .context("Document has no parent directory")?
            .to_path_buf(),
    };
    let relative = RelativePathBuf::from_path(absolute.strip_prefix(&root)?)?;

    Ok((root, DocumentHandle::new(relative), absolute))
}

fn init_logging() {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(log::LevelFilter::Info);
    // The terminal belongs to the UI, so log lines go to a file
    let log_path = env::temp_dir().join("mindmapx.log");
    match fs::OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => builder.target(env_logger::Target::Pipe(Box::new(file))),
        Err(_) => builder.target(env_logger::Target::Pipe(Box::new(std::io::sink()))),
    };
    builder.init();
}
