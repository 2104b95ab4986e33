// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard, mouse and focus input, timer ticks)
// - Rendering the UI
// - Running the commands App asks for and feeding results back

pub mod app;
pub mod clipboard;
pub mod components;
pub mod modal;
pub mod theme;
pub mod views;

use crate::api::{Backend, HttpBackend};
use crate::bulk;
use crate::certificate::{
    download_filename, save_certificate, CertificateData, CertificateView, JpegRasterizer,
    Rasterizer,
};
use crate::config::Config;
use crate::error::UiError;
use crate::events::{AppEvent, Command};
use crate::logging::LogBuffer;
use crate::session::RefreshStamp;
use anyhow::{Context, Result};
use app::App;
use chrono::Local;
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Redraw and timer resolution
const TICK: Duration = Duration::from_millis(100);

/// Capacity of the result channel back to the UI loop
const EVENT_CHANNEL: usize = 256;

/// Everything a spawned command needs besides the backend
#[derive(Debug, Clone)]
pub struct Runtime {
    pub download_dir: PathBuf,
    pub state_file: PathBuf,
    pub bulk_stagger: Duration,
    pub rasterizer: JpegRasterizer,
}

impl Runtime {
    pub fn from_config(config: &Config) -> Self {
        Self {
            download_dir: config.download_dir.clone(),
            state_file: config.state_file(),
            bulk_stagger: config.bulk_stagger,
            rasterizer: JpegRasterizer {
                scale: config.certificate.scale,
                quality: config.certificate.quality,
            },
        }
    }
}

/// Run the TUI
///
/// This function sets up the terminal, runs the event loop, and cleans up
/// when done.
pub async fn run(config: Config, log_buffer: LogBuffer) -> Result<()> {
    let backend = Arc::new(
        HttpBackend::new(&config.base_url, config.session_cookie.clone())
            .context("Failed to create HTTP client")?,
    );
    let runtime = Runtime::from_config(&config);
    let mut app = App::new(&config, log_buffer, Instant::now());

    // Set up terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )
    .context("Failed to setup terminal")?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend).context("Failed to create terminal")?;

    tracing::info!(mode = config.mode.as_str(), base_url = %config.base_url, "starting UI");

    // Run the event loop
    let result = run_event_loop(&mut terminal, &mut app, backend, &runtime).await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on terminal input, the tick timer and command results. Every
/// branch hands its input to App and runs whatever commands come back.
async fn run_event_loop<B: Backend>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    backend: Arc<B>,
    runtime: &Runtime,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<AppEvent>(EVENT_CHANNEL);
    let mut tick_interval = tokio::time::interval(TICK);

    for command in app.startup(Instant::now()) {
        execute_command(command, &backend, &tx, runtime);
    }

    loop {
        terminal
            .draw(|f| views::draw(f, app))
            .context("Failed to draw terminal")?;

        let commands = tokio::select! {
            // Keyboard, mouse and focus input
            commands = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    handle_terminal_event(app, event::read())
                } else {
                    Vec::new()
                }
            } => commands,

            // Timers: toasts, modal transitions, debounce, session
            _ = tick_interval.tick() => app.tick(Instant::now()),

            // Results from spawned commands
            Some(event) = rx.recv() => app.handle_event(event, Instant::now()),
        };

        for command in commands {
            execute_command(command, &backend, &tx, runtime);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_terminal_event(app: &mut App, event: io::Result<Event>) -> Vec<Command> {
    let now = Instant::now();
    match event {
        Ok(Event::Key(key)) => app.handle_key(key, now),
        Ok(Event::Mouse(mouse)) => {
            if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                app.click(mouse.column, mouse.row, now);
            }
            Vec::new()
        }
        Ok(Event::FocusGained) => app.focus_changed(true, now),
        Ok(Event::FocusLost) => app.focus_changed(false, now),
        Ok(_) => Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "terminal read failed");
            Vec::new()
        }
    }
}

/// Spawn the work for one command. Results come back on `tx`.
pub fn execute_command<B: Backend>(
    command: Command,
    backend: &Arc<B>,
    tx: &mpsc::Sender<AppEvent>,
    runtime: &Runtime,
) {
    tracing::debug!(?command, "executing");
    let backend = backend.clone();
    let tx = tx.clone();

    match command {
        Command::LoadEvents => {
            tokio::spawn(async move {
                let result = backend.list_events().await;
                let _ = tx.send(AppEvent::EventsLoaded(result)).await;
            });
        }
        Command::Register(request) => {
            tokio::spawn(async move {
                let result = backend.register(request).await;
                let _ = tx.send(AppEvent::Registered(result)).await;
            });
        }
        Command::LoadParticipants { page, filters } => {
            tokio::spawn(async move {
                let result = backend.participants(page, filters).await;
                let _ = tx.send(AppEvent::ParticipantsLoaded(result)).await;
            });
        }
        Command::LoadStatistics => {
            tokio::spawn(async move {
                let result = backend.statistics().await;
                let _ = tx.send(AppEvent::StatisticsLoaded(result)).await;
            });
        }
        Command::CheckSession => {
            tokio::spawn(async move {
                let result = backend.check_session().await;
                let _ = tx.send(AppEvent::SessionChecked(result)).await;
            });
        }
        Command::SelectWinner(id) => {
            tokio::spawn(async move {
                let result = backend.select_winner(id).await;
                let _ = tx.send(AppEvent::WinnerSelected { id, result }).await;
            });
        }
        Command::BulkSelect { job, ids } => {
            bulk::dispatch(backend, job, ids, runtime.bulk_stagger, tx);
        }
        Command::RevokeWinner(id) => {
            tokio::spawn(async move {
                let result = backend.revoke_winner(id).await;
                let _ = tx.send(AppEvent::WinnerRevoked { id, result }).await;
            });
        }
        Command::LoadWinnerCertificate(id) => {
            tokio::spawn(async move {
                let result = backend.winner_certificate(id).await;
                let _ = tx.send(AppEvent::WinnerCertificateLoaded(result)).await;
            });
        }
        Command::DeleteParticipant(id) => {
            tokio::spawn(async move {
                let result = backend.delete_participant(id).await;
                let _ = tx.send(AppEvent::ParticipantDeleted { id, result }).await;
            });
        }
        Command::AddEvent { name, description } => {
            tokio::spawn(async move {
                let result = backend.add_event(name, description).await;
                let _ = tx.send(AppEvent::EventAdded(result)).await;
            });
        }
        Command::UpdateEvent {
            id,
            name,
            description,
        } => {
            tokio::spawn(async move {
                let result = backend.update_event(id, name, description).await;
                let _ = tx.send(AppEvent::EventUpdated(result)).await;
            });
        }
        Command::DeleteEvent(id) => {
            tokio::spawn(async move {
                let result = backend.delete_event(id).await;
                let _ = tx.send(AppEvent::EventDeleted { id, result }).await;
            });
        }
        Command::Export { format, filters } => {
            let dir = runtime.download_dir.clone();
            tokio::spawn(async move {
                let result = match backend.export(format, filters).await {
                    Ok(file) => file.save_to(&dir),
                    Err(e) => Err(e),
                };
                let _ = tx.send(AppEvent::Exported(result)).await;
            });
        }
        Command::DownloadCertificate(data) => {
            let dir = runtime.download_dir.clone();
            let rasterizer = runtime.rasterizer;
            tokio::spawn(async move {
                let result = tokio::task::spawn_blocking(move || {
                    render_certificate(&rasterizer, &data, &dir)
                })
                .await
                .unwrap_or_else(|e| Err(UiError::Io(io::Error::other(e))));
                let _ = tx.send(AppEvent::CertificateSaved(result)).await;
            });
        }
        Command::ShowCertificateAfter { delay, data } => {
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(AppEvent::ShowCertificate(data)).await;
            });
        }
        Command::Copy(text) => {
            tokio::spawn(async move {
                let result = tokio::task::spawn_blocking(move || {
                    clipboard::copy_to_clipboard(&text).map_err(|e| e.to_string())
                })
                .await
                .unwrap_or_else(|e| Err(e.to_string()));
                let _ = tx.send(AppEvent::Copied(result)).await;
            });
        }
        Command::SaveRefreshStamp(millis) => {
            let stamp = RefreshStamp::new(runtime.state_file.clone());
            tokio::task::spawn_blocking(move || {
                if let Err(e) = stamp.save(millis) {
                    tracing::warn!(
                        path = %stamp.path().display(),
                        error = %e,
                        "could not save refresh stamp"
                    );
                }
            });
        }
    }
}

/// Rasterize a certificate and save it under its download name
fn render_certificate<R: Rasterizer>(
    rasterizer: &R,
    data: &CertificateData,
    dir: &std::path::Path,
) -> Result<PathBuf, UiError> {
    let now = Local::now();
    let view = CertificateView::build(data, now);
    let bytes = rasterizer.rasterize(&view)?;
    let filename = download_filename(data, now.date_naive());
    save_certificate(dir, &filename, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        EventSummary, ExportFile, ExportFormat, ParticipantPage, RegistrationOutcome,
        RegistrationRequest, Statistics, WinnerOutcome,
    };
    use crate::filters::FilterState;

    /// Answers every call with canned data
    struct Canned;

    impl Backend for Canned {
        async fn list_events(&self) -> Result<Vec<EventSummary>, UiError> {
            Ok(vec![EventSummary {
                id: Some(1),
                event_name: "Hack Night".to_string(),
                description: None,
                registration_count: Some(3),
            }])
        }

        async fn register(&self, _: RegistrationRequest) -> Result<RegistrationOutcome, UiError> {
            Err(UiError::Backend("Email already registered for this event".to_string()))
        }

        async fn select_winner(&self, id: u64) -> Result<WinnerOutcome, UiError> {
            self.winner_certificate(id).await
        }

        async fn revoke_winner(&self, _: u64) -> Result<String, UiError> {
            Ok("Winner status revoked successfully".to_string())
        }

        async fn winner_certificate(&self, id: u64) -> Result<WinnerOutcome, UiError> {
            Ok(WinnerOutcome {
                message: "Winner certificate generated successfully".to_string(),
                certificate: Some(CertificateData {
                    certificate_type: Some("winner".to_string()),
                    certificate_id: Some(format!("WIN-{id}-1")),
                    ..Default::default()
                }),
            })
        }

        async fn check_session(&self) -> Result<(), UiError> {
            Err(UiError::from_backend_message("Unauthorized access. Please login first."))
        }

        async fn participants(&self, _: u32, _: FilterState) -> Result<ParticipantPage, UiError> {
            Ok(ParticipantPage::default())
        }

        async fn statistics(&self) -> Result<Statistics, UiError> {
            Ok(Statistics::default())
        }

        async fn delete_participant(&self, _: u64) -> Result<String, UiError> {
            Ok("Participant deleted successfully".to_string())
        }

        async fn add_event(&self, _: String, _: String) -> Result<String, UiError> {
            Ok("Event added".to_string())
        }

        async fn update_event(&self, _: u64, _: String, _: String) -> Result<String, UiError> {
            Ok("Event updated successfully".to_string())
        }

        async fn delete_event(&self, _: u64) -> Result<String, UiError> {
            Err(UiError::Backend(
                "Failed to delete event. Event may have registrations.".to_string(),
            ))
        }

        async fn export(&self, format: ExportFormat, _: FilterState) -> Result<ExportFile, UiError> {
            Ok(ExportFile {
                filename: format!("participants.{}", format.as_str()),
                bytes: b"name,email\n".to_vec(),
            })
        }
    }

    fn runtime(tag: &str) -> Runtime {
        let dir = std::env::temp_dir().join(format!("eventdesk-rt-{}-{}", std::process::id(), tag));
        Runtime {
            download_dir: dir.clone(),
            state_file: dir.join("state.json"),
            bulk_stagger: Duration::from_millis(1),
            rasterizer: JpegRasterizer {
                scale: 1,
                quality: 80,
            },
        }
    }

    #[tokio::test]
    async fn test_load_events_reports_back() {
        let (tx, mut rx) = mpsc::channel(8);
        execute_command(Command::LoadEvents, &Arc::new(Canned), &tx, &runtime("events"));
        match rx.recv().await {
            Some(AppEvent::EventsLoaded(Ok(events))) => assert_eq!(events.len(), 1),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_session_check_surfaces_unauthorized() {
        let (tx, mut rx) = mpsc::channel(8);
        execute_command(Command::CheckSession, &Arc::new(Canned), &tx, &runtime("session"));
        match rx.recv().await {
            Some(AppEvent::SessionChecked(Err(UiError::Unauthorized(_)))) => {}
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_winner_certificate_reports_server_id() {
        let (tx, mut rx) = mpsc::channel(8);
        execute_command(
            Command::LoadWinnerCertificate(4),
            &Arc::new(Canned),
            &tx,
            &runtime("winner-cert"),
        );
        match rx.recv().await {
            Some(AppEvent::WinnerCertificateLoaded(Ok(outcome))) => {
                let cert = outcome.certificate.unwrap();
                assert_eq!(cert.certificate_id.as_deref(), Some("WIN-4-1"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_event_failure_reported_with_id() {
        let (tx, mut rx) = mpsc::channel(8);
        execute_command(Command::DeleteEvent(3), &Arc::new(Canned), &tx, &runtime("del-event"));
        match rx.recv().await {
            Some(AppEvent::EventDeleted {
                id: 3,
                result: Err(UiError::Backend(_)),
            }) => {}
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_export_is_saved_to_download_dir() {
        let rt = runtime("export");
        let (tx, mut rx) = mpsc::channel(8);
        execute_command(
            Command::Export {
                format: ExportFormat::Csv,
                filters: FilterState::default(),
            },
            &Arc::new(Canned),
            &tx,
            &rt,
        );
        match rx.recv().await {
            Some(AppEvent::Exported(Ok(path))) => {
                assert_eq!(path, rt.download_dir.join("participants.csv"));
                assert_eq!(std::fs::read(&path).unwrap(), b"name,email\n");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        let _ = std::fs::remove_dir_all(&rt.download_dir);
    }

    #[tokio::test]
    async fn test_certificate_download_writes_jpeg() {
        let rt = runtime("cert");
        let (tx, mut rx) = mpsc::channel(8);
        let data = CertificateData {
            name: Some("Jane Doe".to_string()),
            event: Some("AI/ML Workshop".to_string()),
            ..Default::default()
        };
        execute_command(Command::DownloadCertificate(data), &Arc::new(Canned), &tx, &rt);
        match rx.recv().await {
            Some(AppEvent::CertificateSaved(Ok(path))) => {
                assert_eq!(path.parent(), Some(rt.download_dir.as_path()));
                let name = path.file_name().unwrap().to_string_lossy().to_string();
                assert!(name.contains("-ai-ml-workshop-"), "{name}");
                assert!(name.ends_with(".jpg"), "{name}");
                let bytes = std::fs::read(&path).unwrap();
                assert_eq!(&bytes[..2], &[0xff, 0xd8]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        let _ = std::fs::remove_dir_all(&rt.download_dir);
    }

    #[tokio::test(start_paused = true)]
    async fn test_certificate_shown_after_delay() {
        let (tx, mut rx) = mpsc::channel(8);
        let start = tokio::time::Instant::now();
        execute_command(
            Command::ShowCertificateAfter {
                delay: Duration::from_secs(1),
                data: CertificateData::default(),
            },
            &Arc::new(Canned),
            &tx,
            &runtime("delay"),
        );
        assert!(matches!(rx.recv().await, Some(AppEvent::ShowCertificate(_))));
        assert!(start.elapsed() >= Duration::from_secs(1));
    }
}
