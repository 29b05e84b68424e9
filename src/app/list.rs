//! Paginated list state shared by the list screens
//!
//! A [`PagedList`] owns the screen's [`ListState`] and hands out a
//! [`Fetch`] for every request it starts. Each fetch carries a ticket; only
//! the result for the most recently issued ticket is applied, so a slow
//! response that arrives after a newer request started is dropped instead
//! of overwriting fresher data.

/// How many items from the end a view may be before it asks for more
pub const LOAD_MORE_THRESHOLD: usize = 3;

/// Scroll trigger for pagination
///
/// True when the last visible item is within [`LOAD_MORE_THRESHOLD`] of the
/// end, more pages exist, and nothing is being fetched.
pub const fn should_load_more(
    last_visible: usize,
    total: usize,
    has_more: bool,
    is_loading: bool,
) -> bool {
    has_more && !is_loading && last_visible + LOAD_MORE_THRESHOLD >= total
}

/// Why a page is being fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// First page, replacing the list (load, tab or filter change)
    Initial,
    /// Next page, appended
    More,
    /// First page again, replacing the list, with a confirmation toast
    Refresh,
}

/// One issued page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fetch {
    /// Monotonic request number
    pub ticket: u64,
    /// 1-based page to request
    pub page: u32,
    /// Page size to request
    pub page_size: u32,
    /// Why it was issued
    pub mode: FetchMode,
}

/// Items fetched so far plus pagination bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in server order
    pub items: Vec<T>,
    /// Last page successfully fetched
    pub current_page: u32,
    /// Requested page size
    pub page_size: u32,
    /// Whether the last fetch filled a whole page
    pub has_more: bool,
}

/// Screen state of a paginated list
///
/// Pages survive every in-flight and error state, so a failed fetch keeps
/// showing what was there before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState<T> {
    /// Nothing requested yet
    Idle,
    /// Fetching page 1; `stale` is what was shown before
    Loading {
        /// Previously shown page
        stale: Option<Page<T>>,
    },
    /// Re-fetching page 1; `stale` stays visible
    Refreshing {
        /// Previously shown page
        stale: Option<Page<T>>,
    },
    /// Fetching the page after this one
    LoadingMore(Page<T>),
    /// Settled
    Loaded(Page<T>),
    /// Last fetch failed
    Error {
        /// User-facing failure text
        message: String,
        /// Page shown before the failure
        page: Option<Page<T>>,
    },
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> ListState<T> {
    /// The page currently on screen, if any
    pub const fn page(&self) -> Option<&Page<T>> {
        match self {
            Self::Idle => None,
            Self::Loading { stale } | Self::Refreshing { stale } => stale.as_ref(),
            Self::LoadingMore(page) | Self::Loaded(page) => Some(page),
            Self::Error { page, .. } => page.as_ref(),
        }
    }

    /// Items currently on screen
    pub fn items(&self) -> &[T] {
        self.page().map_or(&[], |p| p.items.as_slice())
    }

    /// Initial load or load-more in flight
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. } | Self::LoadingMore(_))
    }

    /// Refresh in flight
    pub const fn is_refreshing(&self) -> bool {
        matches!(self, Self::Refreshing { .. })
    }

    /// Any fetch in flight
    pub const fn is_busy(&self) -> bool {
        self.is_loading() || self.is_refreshing()
    }

    /// Failure text of the last fetch
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Whether another page may exist
    pub fn has_more(&self) -> bool {
        self.page().is_some_and(|p| p.has_more)
    }

    /// Last page successfully fetched (1 before anything loads)
    pub fn current_page(&self) -> u32 {
        self.page().map_or(1, |p| p.current_page)
    }

    fn take_page(&mut self) -> Option<Page<T>> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Loading { stale } | Self::Refreshing { stale } => stale,
            Self::LoadingMore(page) | Self::Loaded(page) => Some(page),
            Self::Error { page, .. } => page,
        }
    }
}

/// A list screen's state plus its request bookkeeping
#[derive(Debug)]
pub struct PagedList<T> {
    state: ListState<T>,
    page_size: u32,
    last_ticket: u64,
    pending: Option<Fetch>,
}

impl<T> PagedList<T> {
    /// Create an idle list fetching `page_size` items per page
    pub fn new(page_size: u32) -> Self {
        Self {
            state: ListState::Idle,
            page_size: page_size.max(1),
            last_ticket: 0,
            pending: None,
        }
    }

    /// Current state
    pub const fn state(&self) -> &ListState<T> {
        &self.state
    }

    /// Items currently on screen
    pub fn items(&self) -> &[T] {
        self.state.items()
    }

    /// Page size used for requests
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The fetch whose result will be applied, if one is outstanding
    pub const fn pending(&self) -> Option<Fetch> {
        self.pending
    }

    /// Start fetching page 1, replacing the list on success
    pub fn begin_load(&mut self) -> Fetch {
        let stale = self.state.take_page();
        self.state = ListState::Loading { stale };
        self.issue(1, FetchMode::Initial)
    }

    /// Start re-fetching page 1
    pub fn begin_refresh(&mut self) -> Fetch {
        let stale = self.state.take_page();
        self.state = ListState::Refreshing { stale };
        self.issue(1, FetchMode::Refresh)
    }

    /// Start fetching the next page
    ///
    /// Returns `None` and changes nothing while a fetch is in flight or
    /// when the last page came back short.
    pub fn begin_load_more(&mut self) -> Option<Fetch> {
        let ready = match &self.state {
            ListState::Loaded(page)
            | ListState::Error {
                page: Some(page), ..
            } => page.has_more,
            _ => false,
        };
        if !ready {
            return None;
        }
        let page = self.state.take_page()?;
        let next = page.current_page + 1;
        self.state = ListState::LoadingMore(page);
        Some(self.issue(next, FetchMode::More))
    }

    /// Apply fetched items; returns false if `fetch` was superseded
    pub fn succeed(&mut self, fetch: &Fetch, items: Vec<T>) -> bool {
        if !self.accept(fetch) {
            return false;
        }
        let has_more = items.len() >= fetch.page_size as usize;
        let page = match (fetch.mode, self.state.take_page()) {
            (FetchMode::More, Some(mut page)) => {
                page.items.extend(items);
                page.current_page = fetch.page;
                page.has_more = has_more;
                page
            }
            _ => Page {
                items,
                current_page: fetch.page,
                page_size: fetch.page_size,
                has_more,
            },
        };
        self.state = ListState::Loaded(page);
        true
    }

    /// Record a failure; returns false if `fetch` was superseded
    pub fn fail(&mut self, fetch: &Fetch, message: String) -> bool {
        if !self.accept(fetch) {
            return false;
        }
        let page = self.state.take_page();
        self.state = ListState::Error { message, page };
        true
    }

    /// Leave the error state, keeping whatever page was shown
    pub fn clear_error(&mut self) {
        if matches!(self.state, ListState::Error { .. }) {
            self.state = match self.state.take_page() {
                Some(page) => ListState::Loaded(page),
                None => ListState::Idle,
            };
        }
    }

    fn issue(&mut self, page: u32, mode: FetchMode) -> Fetch {
        self.last_ticket += 1;
        let fetch = Fetch {
            ticket: self.last_ticket,
            page,
            page_size: self.page_size,
            mode,
        };
        if let Some(previous) = self.pending.replace(fetch) {
            tracing::debug!(
                superseded = previous.ticket,
                ticket = fetch.ticket,
                "Fetch superseded"
            );
        }
        fetch
    }

    fn accept(&mut self, fetch: &Fetch) -> bool {
        if self.pending.as_ref() == Some(fetch) {
            self.pending = None;
            true
        } else {
            tracing::warn!(ticket = fetch.ticket, page = fetch.page, "Dropping stale fetch result");
            false
        }
    }
}
