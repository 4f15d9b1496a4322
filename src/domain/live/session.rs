//! The live session record.

use crate::domain::foundation::Timestamp;

use super::{LiveEvent, SessionToken};

/// Persisted state of one live session.
///
/// The token never changes after creation, and `updated_at` never moves
/// backwards: every mutation goes through [`LiveSession::touch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveSession {
    url: String,
    current_page: u32,
    token: SessionToken,
    file_name: String,
    updated_at: Timestamp,
}

impl LiveSession {
    /// Creates the record for a freshly rendered deck.
    pub fn new(
        url: impl Into<String>,
        file_name: impl Into<String>,
        current_page: u32,
        token: SessionToken,
        now: Timestamp,
    ) -> Self {
        Self {
            url: url.into(),
            current_page,
            token,
            file_name: file_name.into(),
            updated_at: now,
        }
    }

    /// Rebuilds a record from its stored fields.
    pub fn reconstitute(
        url: String,
        current_page: u32,
        token: SessionToken,
        file_name: String,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            url,
            current_page,
            token,
            file_name,
            updated_at,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Refreshes the idle clock without letting it run backwards.
    pub fn touch(&mut self, now: Timestamp) {
        if now.is_after(&self.updated_at) {
            self.updated_at = now;
        }
    }

    /// Moves to another page.
    pub fn set_page(&mut self, page: u32, now: Timestamp) {
        self.current_page = page;
        self.touch(now);
    }

    /// Points the session at a newly rendered deck.
    ///
    /// Returns the previous artifact's file name so it can be released.
    pub fn replace_deck(
        &mut self,
        url: impl Into<String>,
        file_name: impl Into<String>,
        current_page: u32,
        now: Timestamp,
    ) -> String {
        self.url = url.into();
        self.current_page = current_page;
        self.touch(now);
        std::mem::replace(&mut self.file_name, file_name.into())
    }

    /// True when the session was last touched strictly before `cutoff`.
    pub fn is_idle_since(&self, cutoff: Timestamp) -> bool {
        self.updated_at.is_before(&cutoff)
    }

    /// Snapshot event describing what followers should display right now.
    pub fn start_event(&self) -> LiveEvent {
        LiveEvent::Start {
            url: self.url.clone(),
            current_page: self.current_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_unix_secs(secs).unwrap()
    }

    fn session() -> LiveSession {
        LiveSession::new(
            "http://files/a.pdf",
            "a.pdf",
            0,
            SessionToken::from_stored("tok"),
            at(1_000),
        )
    }

    #[test]
    fn set_page_updates_page_and_clock() {
        let mut s = session();
        s.set_page(4, at(1_500));
        assert_eq!(s.current_page(), 4);
        assert_eq!(s.updated_at(), at(1_500));
    }

    #[test]
    fn touch_never_moves_backwards() {
        let mut s = session();
        s.touch(at(500));
        assert_eq!(s.updated_at(), at(1_000));
    }

    #[test]
    fn replace_deck_returns_previous_file_and_keeps_token() {
        let mut s = session();
        let previous = s.replace_deck("http://files/b.pdf", "b.pdf", 2, at(2_000));

        assert_eq!(previous, "a.pdf");
        assert_eq!(s.file_name(), "b.pdf");
        assert_eq!(s.url(), "http://files/b.pdf");
        assert_eq!(s.current_page(), 2);
        assert!(s.token().verify("tok"));
    }

    #[test]
    fn idle_check_is_strict() {
        let s = session();
        assert!(s.is_idle_since(at(1_001)));
        assert!(!s.is_idle_since(at(1_000)));
    }

    #[test]
    fn start_event_reflects_current_state() {
        let mut s = session();
        s.set_page(3, at(1_100));
        assert_eq!(
            s.start_event(),
            LiveEvent::Start {
                url: "http://files/a.pdf".to_string(),
                current_page: 3
            }
        );
    }
}
