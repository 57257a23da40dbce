//! Per-session view state: active mode, results region, notifications and
//! the request tokens that keep a late response from overwriting a view
//! the user has already left.

use crate::renderer::{RecommendationGrid, TableModel};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Which form is on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Comparar,
    Encontrar,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Comparar => "comparar",
            Mode::Encontrar => "encontrar",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comparar" => Ok(Mode::Comparar),
            "encontrar" => Ok(Mode::Encontrar),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl NoticeLevel {
    pub fn css_class(self) -> &'static str {
        match self {
            NoticeLevel::Info => "alert-info",
            NoticeLevel::Success => "alert-success",
            NoticeLevel::Error => "alert-error",
        }
    }

    /// Errors stay until dismissed or cleared by navigation.
    pub fn auto_dismisses(self) -> bool {
        self != NoticeLevel::Error
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Rendered results for the active mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Results {
    Comparison {
        table: TableModel,
        example_data: bool,
    },
    Recommendations {
        grid: RecommendationGrid,
        example_data: bool,
    },
}

impl Results {
    pub fn mode(&self) -> Mode {
        match self {
            Results::Comparison { .. } => Mode::Comparar,
            Results::Recommendations { .. } => Mode::Encontrar,
        }
    }

    pub fn is_example_data(&self) -> bool {
        match self {
            Results::Comparison { example_data, .. }
            | Results::Recommendations { example_data, .. } => *example_data,
        }
    }
}

/// What a finished search wants to show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    pub results: Option<Results>,
    pub notices: Vec<(NoticeLevel, String)>,
}

impl SearchOutcome {
    pub fn results(results: Results) -> Self {
        Self {
            results: Some(results),
            notices: Vec::new(),
        }
    }

    pub fn notice(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            results: None,
            notices: vec![(level, message.into())],
        }
    }

    pub fn with_notice(mut self, level: NoticeLevel, message: impl Into<String>) -> Self {
        self.notices.push((level, message.into()));
        self
    }
}

/// Handle for an in-flight search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    generation: u64,
    mode: Mode,
}

impl RequestToken {
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

#[derive(Debug, Clone)]
pub struct ViewState {
    mode: Mode,
    results: Option<Results>,
    pending: bool,
    notices: Vec<Notification>,
    generation: u64,
    notice_ttl: chrono::Duration,
}

impl ViewState {
    pub fn new(notice_ttl: std::time::Duration) -> Self {
        Self {
            mode: Mode::default(),
            results: None,
            pending: false,
            notices: Vec::new(),
            generation: 0,
            notice_ttl: chrono::Duration::from_std(notice_ttl)
                .unwrap_or_else(|_| chrono::Duration::seconds(5)),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn results(&self) -> Option<&Results> {
        self.results.as_ref()
    }

    /// A search was started and has not completed yet.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Navigates to `mode`: clears results and persistent errors, and
    /// invalidates every in-flight request.
    pub fn switch_mode(&mut self, mode: Mode) {
        tracing::debug!("Switching mode {} -> {}", self.mode, mode);
        self.mode = mode;
        self.generation += 1;
        self.pending = false;
        self.clear_results();
    }

    /// Starts a search in `mode`. Clears the results region and any older
    /// token stops being current.
    pub fn begin(&mut self, mode: Mode) -> RequestToken {
        if self.mode != mode {
            self.switch_mode(mode);
        }
        self.generation += 1;
        self.pending = true;
        self.clear_results();
        RequestToken {
            generation: self.generation,
            mode,
        }
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.generation == self.generation && token.mode == self.mode
    }

    /// Applies a finished search if its token is still current.
    ///
    /// Returns `false` and leaves the view untouched for stale tokens.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: SearchOutcome,
        now: DateTime<Utc>,
    ) -> bool {
        if !self.is_current(token) {
            tracing::debug!(
                "Discarding stale {} response (generation {} < {})",
                token.mode,
                token.generation,
                self.generation
            );
            return false;
        }
        self.pending = false;
        self.results = outcome.results;
        for (level, message) in outcome.notices {
            self.notify(level, message, now);
        }
        true
    }

    pub fn notify(
        &mut self,
        level: NoticeLevel,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.notices.push(Notification {
            id,
            level,
            message: message.into(),
            created_at: now,
        });
        id
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Notifications still on screen at `now`; expired ones are dropped.
    pub fn active_notices(&mut self, now: DateTime<Utc>) -> &[Notification] {
        let ttl = self.notice_ttl;
        self.notices
            .retain(|n| !n.level.auto_dismisses() || now - n.created_at < ttl);
        &self.notices
    }

    fn clear_results(&mut self) {
        self.results = None;
        self.notices.retain(|n| n.level.auto_dismisses());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn grid() -> Results {
        Results::Recommendations {
            grid: RecommendationGrid {
                total: 0,
                cards: vec![],
            },
            example_data: false,
        }
    }

    #[test]
    fn test_fresh_token_applies() {
        let mut view = ViewState::new(Duration::from_secs(5));
        let token = view.begin(Mode::Encontrar);
        assert!(view.is_pending());
        assert!(view.complete(token, SearchOutcome::results(grid()), Utc::now()));
        assert!(!view.is_pending());
        assert_eq!(view.results().map(Results::mode), Some(Mode::Encontrar));
    }

    #[test]
    fn test_mode_switch_discards_late_response() {
        let mut view = ViewState::new(Duration::from_secs(5));
        let token = view.begin(Mode::Encontrar);
        view.switch_mode(Mode::Comparar);
        view.switch_mode(Mode::Encontrar);

        let applied = view.complete(
            token,
            SearchOutcome::results(grid()).with_notice(NoticeLevel::Info, "late"),
            Utc::now(),
        );
        assert!(!applied);
        assert!(view.results().is_none());
        assert!(view.active_notices(Utc::now()).is_empty());
    }

    #[test]
    fn test_newer_search_supersedes_older() {
        let mut view = ViewState::new(Duration::from_secs(5));
        let first = view.begin(Mode::Comparar);
        let second = view.begin(Mode::Comparar);
        assert!(!view.complete(first, SearchOutcome::results(grid()), Utc::now()));
        assert!(view.is_pending());
        assert!(view.complete(second, SearchOutcome::default(), Utc::now()));
        assert!(!view.is_pending());
    }

    #[test]
    fn test_begin_in_other_mode_switches() {
        let mut view = ViewState::new(Duration::from_secs(5));
        let token = view.begin(Mode::Encontrar);
        assert_eq!(view.mode(), Mode::Encontrar);
        assert_eq!(token.mode(), Mode::Encontrar);
    }

    #[test]
    fn test_info_expires_error_persists() {
        let mut view = ViewState::new(Duration::from_secs(5));
        let start = Utc::now();
        view.notify(NoticeLevel::Info, "info", start);
        view.notify(NoticeLevel::Error, "error", start);

        assert_eq!(view.active_notices(start + chrono::Duration::seconds(4)).len(), 2);
        let later = view.active_notices(start + chrono::Duration::seconds(6));
        assert_eq!(later.len(), 1);
        assert_eq!(later[0].level, NoticeLevel::Error);
    }

    #[test]
    fn test_new_action_clears_errors() {
        let mut view = ViewState::new(Duration::from_secs(5));
        let now = Utc::now();
        view.notify(NoticeLevel::Error, "Erro ao comparar modelos", now);
        view.notify(NoticeLevel::Info, "still here", now);
        view.begin(Mode::Comparar);
        let notices = view.active_notices(now);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "still here");
    }

    #[test]
    fn test_dismiss() {
        let mut view = ViewState::new(Duration::from_secs(5));
        let id = view.notify(NoticeLevel::Error, "x", Utc::now());
        assert!(view.dismiss(id));
        assert!(!view.dismiss(id));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("encontrar".parse::<Mode>(), Ok(Mode::Encontrar));
        assert!("outro".parse::<Mode>().is_err());
    }
}
