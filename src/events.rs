// Messages between the UI loop and background tasks
//
// The UI never awaits the backend. Key handling produces `Command`s, the
// runtime spawns a task per command, and each task reports back with an
// `AppEvent` on the shared mpsc channel. Every result arm carries a
// `Result` so the app handles success and failure in one place.

use crate::api::{
    EventSummary, ExportFormat, ParticipantPage, RegistrationOutcome, RegistrationRequest,
    Statistics, WinnerOutcome,
};
use crate::bulk::{BulkResolution, JobId};
use crate::certificate::CertificateData;
use crate::error::UiError;
use crate::filters::FilterState;
use std::path::PathBuf;
use std::time::Duration;

/// Work the app asks the runtime to perform
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Load the event list for the registration form
    LoadEvents,
    /// Submit a validated registration
    Register(RegistrationRequest),
    /// Reload one page of the participants table
    LoadParticipants { page: u32, filters: FilterState },
    /// Reload the dashboard statistics
    LoadStatistics,
    /// Check the admin session
    CheckSession,
    /// Mark one participant as winner
    SelectWinner(u64),
    /// Mark many participants as winners, staggered
    BulkSelect { job: JobId, ids: Vec<u64> },
    /// Take the winner mark off a participant
    RevokeWinner(u64),
    /// Fetch the server-issued certificate of an existing winner
    LoadWinnerCertificate(u64),
    /// Remove a registration
    DeleteParticipant(u64),
    /// Create an event from the admin settings form
    AddEvent { name: String, description: String },
    /// Rename or re-describe an existing event
    UpdateEvent {
        id: u64,
        name: String,
        description: String,
    },
    /// Remove an event without registrations
    DeleteEvent(u64),
    /// Download an export of the filtered participants
    Export {
        format: ExportFormat,
        filters: FilterState,
    },
    /// Rasterize and save a certificate
    DownloadCertificate(CertificateData),
    /// Open the certificate modal after a delay
    ShowCertificateAfter {
        delay: Duration,
        data: CertificateData,
    },
    /// Put text on the system clipboard
    Copy(String),
    /// Persist the last admin refresh stamp (epoch millis)
    SaveRefreshStamp(i64),
}

/// Results delivered back to the UI loop
#[derive(Debug)]
pub enum AppEvent {
    EventsLoaded(Result<Vec<EventSummary>, UiError>),
    Registered(Result<RegistrationOutcome, UiError>),
    ParticipantsLoaded(Result<ParticipantPage, UiError>),
    StatisticsLoaded(Result<Statistics, UiError>),
    SessionChecked(Result<(), UiError>),
    WinnerSelected {
        id: u64,
        result: Result<WinnerOutcome, UiError>,
    },
    WinnerRevoked {
        id: u64,
        result: Result<String, UiError>,
    },
    WinnerCertificateLoaded(Result<WinnerOutcome, UiError>),
    ParticipantDeleted {
        id: u64,
        result: Result<String, UiError>,
    },
    Bulk(BulkResolution),
    EventAdded(Result<String, UiError>),
    EventUpdated(Result<String, UiError>),
    EventDeleted {
        id: u64,
        result: Result<String, UiError>,
    },
    Exported(Result<PathBuf, UiError>),
    CertificateSaved(Result<PathBuf, UiError>),
    ShowCertificate(CertificateData),
    Copied(Result<(), String>),
}
