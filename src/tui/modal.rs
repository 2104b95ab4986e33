// Modal system for TUI overlays
//
// Each modal moves through closed → opening → open → closing → closed.
// Opening schedules the fade-in, closing fades out and only hides the modal
// after a fixed settle delay; the caller resets any form attached to a modal
// once `tick` reports it closed. Input handling maps keys to ModalAction so
// App decides what to do with them.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use std::time::{Duration, Instant};

/// Delay before an opening modal is shown at full intensity
pub const FADE_IN: Duration = Duration::from_millis(10);

/// Delay between starting to close and hiding the modal
pub const SETTLE: Duration = Duration::from_millis(300);

/// Available modal types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalKind {
    Registration,
    Certificate,
    Confirmation,
    EventForm,
    Help,
}

/// Lifecycle phase of a visible modal; closed modals have no slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Opening { since: Instant },
    Open,
    Closing { since: Instant },
}

#[derive(Debug, Clone)]
struct ModalSlot {
    kind: ModalKind,
    phase: ModalPhase,
    /// Last rendered rectangle, used for backdrop clicks
    area: Option<Rect>,
}

/// Tracks every modal that is not fully closed, in opening order
#[derive(Debug, Default)]
pub struct ModalController {
    slots: Vec<ModalSlot>,
}

impl ModalController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a modal. Re-opening a closing modal cancels its close.
    pub fn open(&mut self, kind: ModalKind, now: Instant) -> bool {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.kind == kind) {
            return match slot.phase {
                ModalPhase::Closing { .. } => {
                    slot.phase = ModalPhase::Opening { since: now };
                    true
                }
                _ => false,
            };
        }
        tracing::debug!(?kind, "modal opening");
        self.slots.push(ModalSlot {
            kind,
            phase: ModalPhase::Opening { since: now },
            area: None,
        });
        true
    }

    /// Start fading a modal out. No-op if it is closed or already closing.
    pub fn close(&mut self, kind: ModalKind, now: Instant) -> bool {
        match self.slots.iter_mut().find(|s| s.kind == kind) {
            Some(slot) if !matches!(slot.phase, ModalPhase::Closing { .. }) => {
                tracing::debug!(?kind, "modal closing");
                slot.phase = ModalPhase::Closing { since: now };
                true
            }
            _ => false,
        }
    }

    /// Escape: close every open modal, no precedence between them
    pub fn close_all(&mut self, now: Instant) -> usize {
        let kinds: Vec<_> = self.slots.iter().map(|s| s.kind).collect();
        kinds.into_iter().filter(|k| self.close(*k, now)).count()
    }

    /// Advance transitions. Returns the modals that finished closing.
    pub fn tick(&mut self, now: Instant) -> Vec<ModalKind> {
        let mut closed = Vec::new();
        self.slots.retain_mut(|slot| match slot.phase {
            ModalPhase::Opening { since } => {
                if now.duration_since(since) >= FADE_IN {
                    slot.phase = ModalPhase::Open;
                }
                true
            }
            ModalPhase::Open => true,
            ModalPhase::Closing { since } => {
                if now.duration_since(since) >= SETTLE {
                    closed.push(slot.kind);
                    false
                } else {
                    true
                }
            }
        });
        closed
    }

    /// Phase of a modal, None when closed
    #[cfg(test)]
    pub fn phase(&self, kind: ModalKind) -> Option<ModalPhase> {
        self.slots.iter().find(|s| s.kind == kind).map(|s| s.phase)
    }

    /// Open or opening (i.e. accepting input)
    #[cfg(test)]
    pub fn is_active(&self, kind: ModalKind) -> bool {
        matches!(
            self.phase(kind),
            Some(ModalPhase::Opening { .. }) | Some(ModalPhase::Open)
        )
    }

    /// Topmost modal that still accepts input
    pub fn top(&self) -> Option<ModalKind> {
        self.slots
            .iter()
            .rev()
            .find(|s| !matches!(s.phase, ModalPhase::Closing { .. }))
            .map(|s| s.kind)
    }

    /// Every modal still on screen (including fading ones), bottom first
    pub fn visible(&self) -> impl Iterator<Item = (ModalKind, ModalPhase)> + '_ {
        self.slots.iter().map(|s| (s.kind, s.phase))
    }

    pub fn any_active(&self) -> bool {
        self.top().is_some()
    }

    pub fn set_area(&mut self, kind: ModalKind, area: Rect) {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.kind == kind) {
            slot.area = Some(area);
        }
    }

    /// Backdrop click: a click outside the topmost modal's rectangle closes it.
    /// Clicks inside the modal (its children) are ignored.
    pub fn click(&mut self, column: u16, row: u16, now: Instant) -> Option<ModalKind> {
        let slot = self
            .slots
            .iter()
            .rev()
            .find(|s| !matches!(s.phase, ModalPhase::Closing { .. }))?;
        let area = slot.area?;
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        if inside {
            return None;
        }
        let kind = slot.kind;
        self.close(kind, now);
        Some(kind)
    }
}

/// Actions returned by modal key handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    /// Input consumed, no state change needed
    None,
    Close,
    Submit,
    NextField,
    PrevField,
    Input(char),
    Backspace,
    /// Cycle a select-style field (true = forward)
    Cycle(bool),
    Confirm,
    Download,
    CopyId,
}

/// Map a key to an action for the given modal
pub fn key_action(kind: ModalKind, key: &KeyEvent) -> ModalAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match kind {
        ModalKind::Registration | ModalKind::EventForm => match key.code {
            KeyCode::Enter => ModalAction::Submit,
            KeyCode::Tab | KeyCode::Down => ModalAction::NextField,
            KeyCode::BackTab | KeyCode::Up => ModalAction::PrevField,
            KeyCode::Left => ModalAction::Cycle(false),
            KeyCode::Right => ModalAction::Cycle(true),
            KeyCode::Backspace => ModalAction::Backspace,
            KeyCode::Char(c) if !ctrl => ModalAction::Input(c),
            _ => ModalAction::None,
        },
        ModalKind::Certificate => match key.code {
            KeyCode::Char('d') | KeyCode::Enter => ModalAction::Download,
            KeyCode::Char('y') => ModalAction::CopyId,
            KeyCode::Char('q') => ModalAction::Close,
            _ => ModalAction::None,
        },
        ModalKind::Confirmation => match key.code {
            KeyCode::Enter | KeyCode::Char('y') => ModalAction::Confirm,
            KeyCode::Char('n') | KeyCode::Char('q') => ModalAction::Close,
            _ => ModalAction::None,
        },
        ModalKind::Help => match key.code {
            KeyCode::Char('?') | KeyCode::Char('q') => ModalAction::Close,
            _ => ModalAction::None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut modals = ModalController::new();
        let t0 = Instant::now();

        assert!(modals.open(ModalKind::Registration, t0));
        assert!(matches!(
            modals.phase(ModalKind::Registration),
            Some(ModalPhase::Opening { .. })
        ));

        assert!(modals.tick(t0 + FADE_IN).is_empty());
        assert_eq!(modals.phase(ModalKind::Registration), Some(ModalPhase::Open));

        let t1 = t0 + Duration::from_secs(1);
        assert!(modals.close(ModalKind::Registration, t1));
        // Still visible while settling
        assert!(modals.tick(t1 + Duration::from_millis(299)).is_empty());
        assert!(modals.phase(ModalKind::Registration).is_some());

        assert_eq!(modals.tick(t1 + SETTLE), vec![ModalKind::Registration]);
        assert_eq!(modals.phase(ModalKind::Registration), None);
    }

    #[test]
    fn test_close_twice_is_noop() {
        let mut modals = ModalController::new();
        let t0 = Instant::now();
        modals.open(ModalKind::Help, t0);
        assert!(modals.close(ModalKind::Help, t0));
        assert!(!modals.close(ModalKind::Help, t0));
        assert!(!modals.close(ModalKind::Certificate, t0));
    }

    #[test]
    fn test_escape_closes_every_open_modal() {
        let mut modals = ModalController::new();
        let t0 = Instant::now();
        modals.open(ModalKind::Registration, t0);
        modals.open(ModalKind::Certificate, t0);

        assert_eq!(modals.close_all(t0), 2);
        assert!(!modals.any_active());
        let mut closed = modals.tick(t0 + SETTLE);
        closed.sort_by_key(|k| format!("{k:?}"));
        assert_eq!(closed, vec![ModalKind::Certificate, ModalKind::Registration]);
    }

    #[test]
    fn test_reopen_while_closing() {
        let mut modals = ModalController::new();
        let t0 = Instant::now();
        modals.open(ModalKind::Certificate, t0);
        modals.close(ModalKind::Certificate, t0);
        assert!(modals.open(ModalKind::Certificate, t0 + Duration::from_millis(100)));
        assert!(modals.tick(t0 + Duration::from_secs(1)).is_empty());
        assert!(modals.is_active(ModalKind::Certificate));
    }

    #[test]
    fn test_backdrop_click_closes_only_outside() {
        let mut modals = ModalController::new();
        let t0 = Instant::now();
        modals.open(ModalKind::Confirmation, t0);
        modals.set_area(ModalKind::Confirmation, Rect::new(10, 10, 20, 5));

        assert_eq!(modals.click(15, 12, t0), None);
        assert!(modals.is_active(ModalKind::Confirmation));

        assert_eq!(modals.click(0, 0, t0), Some(ModalKind::Confirmation));
        assert!(!modals.is_active(ModalKind::Confirmation));
    }

    #[test]
    fn test_form_keys() {
        let key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(key_action(ModalKind::Registration, &key), ModalAction::Input('a'));
        let ctrl = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert_eq!(key_action(ModalKind::Registration, &ctrl), ModalAction::None);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(key_action(ModalKind::Confirmation, &enter), ModalAction::Confirm);
    }
}
