//! Long-lived owner of the query context, the current result page, and
//! display flags across one interactive run.

use crate::client::{SearchClient, SearchError};
use crate::query::{
    Category, PageDirection, PagingUnavailableError, QueryContext, SafeSearch, SetEdit, TimeRange,
    ValidationError,
};
use crate::results::{ResultPage, SearchResult};

const HISTORY_CAP: usize = 500;

/// Session-wide display switches. These never trigger a re-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFlags {
    /// Show the full URL under each result.
    pub expand: bool,
    /// ANSI colors on or off.
    pub color: bool,
    /// Show a request summary line after each search.
    pub debug: bool,
}

impl Default for DisplayFlags {
    fn default() -> Self {
        Self {
            expand: false,
            color: true,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayToggle {
    Expand,
    Color,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No context fixed yet.
    Idle,
    /// Context set, nothing fetched.
    Ready,
    /// A result page is current.
    Displaying,
    /// Exited; nothing else is valid.
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Paging(#[from] PagingUnavailableError),

    #[error("result index {index} is out of range (current page has {len} results)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no results to act on")]
    NoResults,

    #[error("{0}")]
    InvalidState(&'static str),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// The session owns exactly one `QueryContext` and at most one current
/// `ResultPage`, swapped atomically on each successful search. Only the
/// command layer and the bootstrap mutate it.
pub struct Session {
    client: Box<dyn SearchClient>,
    state: SessionState,
    context: Option<QueryContext>,
    page: Option<ResultPage>,
    flags: DisplayFlags,
    history: Vec<String>,
    known_engines: Option<Vec<String>>,
}

impl Session {
    pub fn new(client: Box<dyn SearchClient>) -> Self {
        Self {
            client,
            state: SessionState::Idle,
            context: None,
            page: None,
            flags: DisplayFlags::default(),
            history: Vec::new(),
            known_engines: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn context(&self) -> Option<&QueryContext> {
        self.context.as_ref()
    }

    pub fn page(&self) -> Option<&ResultPage> {
        self.page.as_ref()
    }

    pub fn flags(&self) -> DisplayFlags {
        self.flags
    }

    /// Fix the initial context and display flags. Valid exactly once,
    /// from `Idle`.
    pub fn bootstrap(
        &mut self,
        context: QueryContext,
        flags: DisplayFlags,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::InvalidState("session is already bootstrapped"));
        }
        self.context = Some(context);
        self.flags = flags;
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Engine roster fetched from the instance, used only to warn about
    /// unknown engine names.
    pub fn set_known_engines(&mut self, engines: Vec<String>) {
        self.known_engines = Some(engines);
    }

    pub fn known_engines(&self) -> Option<&[String]> {
        self.known_engines.as_deref()
    }

    fn require_context(&self) -> Result<&QueryContext, SessionError> {
        if self.state == SessionState::Closed {
            return Err(SessionError::InvalidState("session is closed"));
        }
        self.context
            .as_ref()
            .ok_or(SessionError::InvalidState("no search context yet"))
    }

    fn require_context_mut(&mut self) -> Result<&mut QueryContext, SessionError> {
        if self.state == SessionState::Closed {
            return Err(SessionError::InvalidState("session is closed"));
        }
        self.context
            .as_mut()
            .ok_or(SessionError::InvalidState("no search context yet"))
    }

    /// Run the current context against the backend. On success the
    /// current page is replaced atomically; on failure nothing changes
    /// and the error is surfaced, never retried.
    pub async fn search(&mut self) -> Result<(), SessionError> {
        let context = self.require_context()?.clone();
        let page = self.client.execute(&context).await?;
        self.page = Some(page);
        self.state = SessionState::Displaying;
        Ok(())
    }

    /// Move to an adjacent page and fetch it. Offset and page commit
    /// together, only when the fetch succeeds.
    pub async fn turn_page(&mut self, direction: PageDirection) -> Result<(), SessionError> {
        if self.state != SessionState::Displaying {
            return Err(SessionError::InvalidState("nothing is displayed yet"));
        }
        let context = self.require_context()?;
        let offset = context.paged_offset(direction)?;
        let candidate = context.at_offset(offset);

        let page = self.client.execute(&candidate).await?;
        self.context = Some(candidate);
        self.page = Some(page);
        Ok(())
    }

    pub fn set_query(&mut self, query: &str) -> Result<(), SessionError> {
        self.require_context_mut()?.set_query(query)?;
        Ok(())
    }

    pub fn set_safe_search(&mut self, level: SafeSearch) -> Result<(), SessionError> {
        self.require_context_mut()?.set_safe_search(level);
        Ok(())
    }

    pub fn set_time_range(&mut self, range: Option<TimeRange>) -> Result<(), SessionError> {
        self.require_context_mut()?.set_time_range(range);
        Ok(())
    }

    pub fn set_site(&mut self, site: Option<String>) -> Result<(), SessionError> {
        self.require_context_mut()?.set_site(site)?;
        Ok(())
    }

    /// Returns engine names not present in the fetched roster, for an
    /// advisory warning. Unknown names are applied regardless.
    pub fn edit_engines(&mut self, edit: &SetEdit<String>) -> Result<Vec<String>, SessionError> {
        let context = self.require_context_mut()?;
        context.apply_engines(edit);
        let selected: Vec<String> = context.engines().iter().cloned().collect();
        let unknown = match &self.known_engines {
            Some(known) => selected
                .into_iter()
                .filter(|name| !known.contains(name))
                .collect(),
            None => Vec::new(),
        };
        Ok(unknown)
    }

    pub fn edit_categories(&mut self, edit: &SetEdit<Category>) -> Result<(), SessionError> {
        self.require_context_mut()?.apply_categories(edit);
        Ok(())
    }

    pub fn toggle(&mut self, toggle: DisplayToggle) -> bool {
        let flag = match toggle {
            DisplayToggle::Expand => &mut self.flags.expand,
            DisplayToggle::Color => &mut self.flags.color,
            DisplayToggle::Debug => &mut self.flags.debug,
        };
        *flag = !*flag;
        *flag
    }

    /// Zero-based lookup into the current page.
    pub fn result_at(&self, index: usize) -> Result<&SearchResult, SessionError> {
        let page = self.page.as_ref().ok_or(SessionError::NoResults)?;
        page.get(index).ok_or(SessionError::IndexOutOfRange {
            index: index + 1,
            len: page.len(),
        })
    }

    /// The current page, required non-empty (for first/random actions).
    pub fn displayed_results(&self) -> Result<&[SearchResult], SessionError> {
        let page = self.page.as_ref().ok_or(SessionError::NoResults)?;
        if page.is_empty() {
            return Err(SessionError::NoResults);
        }
        Ok(page.results())
    }

    pub fn push_history(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        if self.history.len() == HISTORY_CAP {
            self.history.remove(0);
        }
        self.history.push(line.to_string());
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Terminal state; idempotent.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }
}
