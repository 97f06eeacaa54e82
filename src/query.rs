//! Async fetch state for UI panes, with selection-keyed cancellation.
//!
//! Each pane that loads data owns a `Query<T>`: a fetcher closure plus an
//! idle/loading/success/error state polled from the event-loop tick. A fetch
//! is started *for* a selection key (the username, the date, ...). Starting
//! a fetch for a different key drops the pending channel, so a late result
//! from a superseded selection is discarded instead of being applied to the
//! wrong UI state.
//!
//! # Example
//!
//! ```ignore
//! let client = client.clone();
//! let mut query = Query::new(move |date| {
//!     let client = client.clone();
//!     async move {
//!         client
//!             .fetch_sheet_data("1abc", "Sheet1", &date)
//!             .await
//!             .map_err(|e| e.to_string())
//!     }
//! });
//!
//! query.fetch_for("2024-05-01");
//!
//! // In the event loop tick:
//! if query.poll() {
//!     // State changed, re-render
//! }
//! ```

use futures::future::BoxFuture;

use tokio::sync::mpsc;

/// The state of a query.
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Nothing fetched and nothing in flight.
  Idle,
  /// A fetch is in flight.
  Loading,
  /// The last fetch resolved.
  Success(T),
  /// The last fetch failed.
  Error(String),
}

/// A factory producing one fetch future per selection key.
type FetcherFn<T> = Box<dyn Fn(String) -> BoxFuture<'static, Result<T, String>> + Send + Sync>;

pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
  /// The selection key the current state belongs to.
  key: Option<String>,
}

impl<T: Send + 'static> Query<T> {
  /// Create a query around a fetcher. The fetcher receives the selection
  /// key it is fetching for and is called once per started fetch.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move |key| Box::pin(fetcher(key))),
      receiver: None,
      key: None,
    }
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    match &self.state {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match &self.state {
      QueryState::Error(message) => Some(message),
      _ => None,
    }
  }

  pub fn is_loading(&self) -> bool {
    matches!(self.state, QueryState::Loading)
  }

  pub fn is_error(&self) -> bool {
    matches!(self.state, QueryState::Error(_))
  }

  /// Start a fetch for `key`.
  ///
  /// A no-op if the query already holds state for the same key (pending or
  /// resolved). A different key cancels whatever was in flight by dropping
  /// its receiver and starts over, so the superseded result can never land.
  pub fn fetch_for(&mut self, key: impl Into<String>) {
    let key = key.into();
    if self.key.as_deref() == Some(key.as_str()) {
      return;
    }
    self.start(key);
  }

  /// Force a fresh fetch for the current key, discarding any pending one.
  pub fn refetch(&mut self) {
    if let Some(key) = self.key.clone() {
      self.start(key);
    }
  }

  /// Back to idle: drop any pending fetch and forget the key.
  pub fn reset(&mut self) {
    self.receiver = None;
    self.key = None;
    self.state = QueryState::Idle;
  }

  /// Poll for a resolved fetch. Returns `true` if the state changed.
  /// Call this from the event loop tick.
  pub fn poll(&mut self) -> bool {
    let Some(receiver) = &mut self.receiver else {
      return false;
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.receiver = None;
        true
      }
      Ok(Err(message)) => {
        self.state = QueryState::Error(message);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending.
        self.state = QueryState::Error("fetch was cancelled".to_string());
        self.receiver = None;
        true
      }
    }
  }

  fn start(&mut self, key: String) {
    let (tx, rx) = mpsc::unbounded_channel();
    // Dropping the previous receiver is the cancellation: the old task's
    // send fails and its result goes nowhere.
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.fetcher)(key.clone());
    self.key = Some(key);

    tokio::spawn(async move {
      let result = future.await;
      let _ = tx.send(result);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("key", &self.key)
      .finish_non_exhaustive()
  }
}
