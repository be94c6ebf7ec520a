//! Fluent request builder for the PostgREST-style plans API.
//!
//! # Overview
//! A [`QueryBuilder`] accumulates filter, ordering, and pagination state
//! through chained calls, then renders one [`HttpRequest`] when consumed by
//! [`build`](QueryBuilder::build) or [`execute`](QueryBuilder::execute).
//! Each logical request gets its own builder; a builder cannot be reused
//! after it has been consumed.
//!
//! # Design
//! Fragments are kept as typed values in call order instead of a free-form
//! query string. Rendering is the single place that decides which fragments
//! survive: mutation requests drop ordering and pagination fragments (the
//! backend rejects them on non-read endpoints), and read requests get a
//! `select=` fragment appended when none is present.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::QueryError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, TransportError};
use crate::response::{interpret, Outcome};

/// Characters escaped inside filter values. Conservative set: enough to
/// keep a value from terminating the fragment or the query string early,
/// while leaving PostgREST operator syntax readable.
const VALUE_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'?');

/// Sort direction for [`QueryBuilder::order`]. Defaults to descending,
/// matching the most common "newest first" listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    Ascending,
    #[default]
    Descending,
}

impl Order {
    fn suffix(self) -> &'static str {
        match self {
            Order::Ascending => "asc",
            Order::Descending => "desc",
        }
    }
}

/// Verb the builder will use, decided by the terminal configuration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Read,
    Insert,
    Update,
    Delete,
}

impl Method {
    fn is_read(self) -> bool {
        matches!(self, Method::Read)
    }

    fn http(self) -> HttpMethod {
        match self {
            Method::Read => HttpMethod::Get,
            Method::Insert => HttpMethod::Post,
            Method::Update => HttpMethod::Patch,
            Method::Delete => HttpMethod::Delete,
        }
    }
}

/// One rendered query-string fragment, tagged by kind so rendering can
/// drop the ones that are meaningless for mutations.
#[derive(Debug, Clone)]
enum Fragment {
    Filter(String),
    Order(String),
    Limit(String),
}

impl Fragment {
    fn rendered(&self) -> &str {
        match self {
            Fragment::Filter(s) | Fragment::Order(s) | Fragment::Limit(s) => s,
        }
    }
}

/// Accumulates one request's configuration and renders it exactly once.
///
/// Created through [`Client::from`](crate::Client::from). All configuration
/// methods consume and return the builder, so a request reads as a single
/// chain:
///
/// ```
/// use trip_core::{Client, ClientConfig, Order};
///
/// let client = Client::new(ClientConfig::new("https://example.supabase.co", "key", "token"));
/// let request = client
///     .from("plans")
///     .eq("destination", "Tokyo")
///     .order("start_date", Order::Ascending)
///     .limit(5)
///     .build()
///     .unwrap();
/// assert_eq!(
///     request.url,
///     "https://example.supabase.co/rest/v1/plans?destination=eq.Tokyo&order=start_date.asc&limit=5&select=*"
/// );
/// ```
#[derive(Debug)]
pub struct QueryBuilder<'a> {
    config: &'a ClientConfig,
    table: String,
    columns: String,
    fragments: Vec<Fragment>,
    method: Method,
    merge_duplicates: bool,
    body: Option<serde_json::Value>,
    body_error: Option<serde_json::Error>,
    use_proxy: bool,
}

impl<'a> QueryBuilder<'a> {
    pub(crate) fn new(config: &'a ClientConfig, table: &str) -> Self {
        Self {
            config,
            table: table.to_string(),
            columns: "*".to_string(),
            fragments: Vec::new(),
            method: Method::Read,
            merge_duplicates: false,
            body: None,
            body_error: None,
            use_proxy: false,
        }
    }

    /// Set the column projection for read requests. Defaults to `*`.
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    /// Append an equality filter: `column=eq.value`.
    pub fn eq(mut self, column: &str, value: &str) -> Self {
        let value = utf8_percent_encode(value, VALUE_ESCAPE);
        self.fragments
            .push(Fragment::Filter(format!("{column}=eq.{value}")));
        self
    }

    /// Append a raw disjunctive filter. The expression is passed through
    /// untouched and wrapped as `or=(expr)`, so the caller writes PostgREST
    /// syntax directly: `or("status.eq.planned,status.eq.booked")`.
    pub fn or(mut self, expr: &str) -> Self {
        self.fragments.push(Fragment::Filter(format!("or=({expr})")));
        self
    }

    /// Append an ordering fragment: `order=column.asc|desc`. Dropped from
    /// the URL if the request turns out to be a mutation.
    pub fn order(mut self, column: &str, direction: Order) -> Self {
        self.fragments.push(Fragment::Order(format!(
            "order={column}.{}",
            direction.suffix()
        )));
        self
    }

    /// Append a row-limit fragment. Dropped from the URL if the request
    /// turns out to be a mutation.
    pub fn limit(mut self, count: u32) -> Self {
        self.fragments.push(Fragment::Limit(format!("limit={count}")));
        self
    }

    /// Shortcut for `limit(1)`. The backend may still return zero rows;
    /// no row-count validation is performed.
    pub fn single(self) -> Self {
        self.limit(1)
    }

    /// POST the given record, or array of records, as new rows.
    pub fn insert<T: Serialize + ?Sized>(mut self, records: &T) -> Self {
        self.method = Method::Insert;
        self.set_body(records);
        self
    }

    /// PATCH rows matched by the accumulated filters with the given
    /// partial record.
    pub fn update<T: Serialize + ?Sized>(mut self, patch: &T) -> Self {
        self.method = Method::Update;
        self.set_body(patch);
        self
    }

    /// POST with merge-duplicates resolution: a row that collides on a
    /// unique key is updated instead of rejected with a conflict.
    pub fn upsert<T: Serialize + ?Sized>(mut self, records: &T) -> Self {
        self.method = Method::Insert;
        self.merge_duplicates = true;
        self.set_body(records);
        self
    }

    /// DELETE rows matched by the accumulated filters.
    pub fn delete(mut self) -> Self {
        self.method = Method::Delete;
        self
    }

    /// Route this request through the configured proxy base URL. No-op
    /// when the client config has no proxy.
    pub fn via_proxy(mut self) -> Self {
        self.use_proxy = true;
        self
    }

    fn set_body<T: Serialize + ?Sized>(&mut self, value: &T) {
        // Serialization failure is deferred to build() so the chain stays
        // fluent; the builder is single-use, so the error cannot go stale.
        match serde_json::to_value(value) {
            Ok(v) => self.body = Some(v),
            Err(e) => self.body_error = Some(e),
        }
    }

    /// Render the accumulated state into an [`HttpRequest`].
    ///
    /// Read requests keep every fragment in call order and gain a
    /// `select=` fragment when none is present. Mutations keep only
    /// filter fragments.
    pub fn build(self) -> Result<HttpRequest, QueryError> {
        if let Some(e) = self.body_error {
            return Err(QueryError::Serialization(e));
        }

        let url = render_url(
            self.config,
            &self.table,
            &self.columns,
            &self.fragments,
            self.method,
            self.use_proxy,
        );
        let headers = render_headers(self.config, self.method, self.merge_duplicates);
        let body = self.body.map(|v| v.to_string());

        let request = HttpRequest {
            method: self.method.http(),
            url,
            headers,
            body,
        };
        debug!(method = request.method.as_str(), url = %request.url, "built request");
        Ok(request)
    }

    /// Build the request, run it through `transport`, and interpret the
    /// response into a uniform data-or-error outcome.
    ///
    /// `transport` is the host's network primitive. It is invoked exactly
    /// once per execution (enforced by `FnOnce`), and exactly one side of
    /// the returned outcome is populated — errors are reported, never
    /// panicked.
    pub fn execute<F>(self, transport: F) -> Outcome
    where
        F: FnOnce(HttpRequest) -> Result<HttpResponse, TransportError>,
    {
        let request = self.build()?;
        let url = request.url.clone();
        let outcome = match transport(request) {
            Ok(response) => interpret(response),
            Err(e) => Err(QueryError::from(e)),
        };
        match &outcome {
            Ok(_) => debug!(%url, "request completed"),
            Err(e) => warn!(%url, error = %e, "request failed"),
        }
        outcome
    }

    /// Run the request and report only the failure, if any. Convenience
    /// for fire-and-forget writes where the caller ignores the returned
    /// representation.
    pub fn execute_err<F>(self, transport: F) -> Option<QueryError>
    where
        F: FnOnce(HttpRequest) -> Result<HttpResponse, TransportError>,
    {
        self.execute(transport).err()
    }
}

fn render_url(
    config: &ClientConfig,
    table: &str,
    columns: &str,
    fragments: &[Fragment],
    method: Method,
    use_proxy: bool,
) -> String {
    let base = config.base_url.trim_end_matches('/');
    let mut url = format!("{base}/rest/v1/{table}");

    let projection = format!("select={columns}");
    let mut parts: Vec<&str> = fragments
        .iter()
        .filter(|f| method.is_read() || matches!(f, Fragment::Filter(_)))
        .map(Fragment::rendered)
        .collect();

    if method.is_read() && !parts.iter().any(|p| p.starts_with("select=")) {
        parts.push(&projection);
    }

    if !parts.is_empty() {
        url.push('?');
        url.push_str(&parts.join("&"));
    }

    if use_proxy {
        if let Some(proxy) = &config.proxy_url {
            url = format!("{proxy}{url}");
        }
    }
    url
}

fn render_headers(
    config: &ClientConfig,
    method: Method,
    merge_duplicates: bool,
) -> Vec<(String, String)> {
    let mut headers = vec![
        ("apikey".to_string(), config.api_key.clone()),
        (
            "Authorization".to_string(),
            format!("Bearer {}", config.bearer_token),
        ),
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
    ];
    match method {
        Method::Insert if merge_duplicates => headers.push((
            "Prefer".to_string(),
            "return=representation,resolution=merge-duplicates".to_string(),
        )),
        Method::Insert | Method::Update => {
            headers.push(("Prefer".to_string(), "return=representation".to_string()))
        }
        Method::Read | Method::Delete => {}
    }
    headers
}
