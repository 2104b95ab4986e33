//! Backend client
//!
//! `Backend` is the seam between the UI and the registration server. The TUI
//! runtime and the bulk dispatcher only see the trait; `HttpBackend` is the
//! reqwest implementation, tests substitute their own.

mod http;
pub mod models;

pub use http::HttpBackend;
pub use models::{
    EventSummary, ExportFile, ExportFormat, Participant, ParticipantPage, RegistrationOutcome,
    RegistrationRequest, Statistics, WinnerOutcome,
};

use crate::error::UiError;
use crate::filters::FilterState;
use std::future::Future;

/// Page size requested for the participants table
pub const PAGE_SIZE: u32 = 10;

/// Operations the client needs from the backend
pub trait Backend: Send + Sync + 'static {
    /// `GET event-settings?action=get_events`
    fn list_events(&self) -> impl Future<Output = Result<Vec<EventSummary>, UiError>> + Send;

    /// `POST register`
    fn register(
        &self,
        request: RegistrationRequest,
    ) -> impl Future<Output = Result<RegistrationOutcome, UiError>> + Send;

    /// `POST winner` with `action=select_winner`
    fn select_winner(&self, id: u64) -> impl Future<Output = Result<WinnerOutcome, UiError>> + Send;

    /// `POST winner` with `action=revoke_winner`; returns the server message
    fn revoke_winner(&self, id: u64) -> impl Future<Output = Result<String, UiError>> + Send;

    /// `POST winner` with `action=generate_winner_certificate`
    fn winner_certificate(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<WinnerOutcome, UiError>> + Send;

    /// `GET admin-dashboard?action=check_session`
    fn check_session(&self) -> impl Future<Output = Result<(), UiError>> + Send;

    /// `GET admin-dashboard?action=get_participants`
    fn participants(
        &self,
        page: u32,
        filters: FilterState,
    ) -> impl Future<Output = Result<ParticipantPage, UiError>> + Send;

    /// `GET admin-dashboard?action=get_statistics`
    fn statistics(&self) -> impl Future<Output = Result<Statistics, UiError>> + Send;

    /// `POST admin-dashboard` with `action=delete_participant`
    fn delete_participant(&self, id: u64) -> impl Future<Output = Result<String, UiError>> + Send;

    /// `POST event-settings` with `action=add_event`; returns the server message
    fn add_event(
        &self,
        name: String,
        description: String,
    ) -> impl Future<Output = Result<String, UiError>> + Send;

    /// `POST event-settings` with `action=update_event`
    fn update_event(
        &self,
        id: u64,
        name: String,
        description: String,
    ) -> impl Future<Output = Result<String, UiError>> + Send;

    /// `POST event-settings` with `action=delete_event`. The backend refuses
    /// events that still have registrations.
    fn delete_event(&self, id: u64) -> impl Future<Output = Result<String, UiError>> + Send;

    /// `GET export?format=...` plus the active filters
    fn export(
        &self,
        format: ExportFormat,
        filters: FilterState,
    ) -> impl Future<Output = Result<ExportFile, UiError>> + Send;
}
