//! Option lists and race-safe asynchronous refresh.
//!
//! Every refresh is stamped with a generation number. A fetch that resolves
//! after a newer one was issued is discarded on arrival, so a slow request can
//! never overwrite fresher suggestions. There is no cancellation of in-flight
//! fetches.

use crate::context::Context;
use crate::value::ValueLike;
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Supplies options for a step given the user's hint, the ancestor context and
/// the step's archived values.
#[async_trait]
pub trait OptionProvider: Send + Sync {
    async fn fetch(
        &self,
        hint: &str,
        context: &Context,
        archive: &[ValueLike],
    ) -> anyhow::Result<Vec<ValueLike>>;
}

/// A fixed option list, filtered case-insensitively by hint.
#[derive(Debug, Clone, Default)]
pub struct StaticOptions(pub Vec<ValueLike>);

impl StaticOptions {
    pub fn filter(&self, hint: &str) -> Vec<ValueLike> {
        if hint.is_empty() {
            return self.0.clone();
        }
        let needle = hint.to_lowercase();
        self.0
            .iter()
            .filter(|option| option.display_key().to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl OptionProvider for StaticOptions {
    async fn fetch(
        &self,
        hint: &str,
        _context: &Context,
        _archive: &[ValueLike],
    ) -> anyhow::Result<Vec<ValueLike>> {
        Ok(self.filter(hint))
    }
}

/// Adapter turning an async closure into an [`OptionProvider`].
pub struct FnProvider<F>(F);

/// Build a provider from `|hint, context, archive| async move { ... }`.
pub fn provider_fn<F>(fetch: F) -> FnProvider<F>
where
    F: Fn(String, Context, Vec<ValueLike>) -> BoxFuture<'static, anyhow::Result<Vec<ValueLike>>>
        + Send
        + Sync,
{
    FnProvider(fetch)
}

#[async_trait]
impl<F> OptionProvider for FnProvider<F>
where
    F: Fn(String, Context, Vec<ValueLike>) -> BoxFuture<'static, anyhow::Result<Vec<ValueLike>>>
        + Send
        + Sync,
{
    async fn fetch(
        &self,
        hint: &str,
        context: &Context,
        archive: &[ValueLike],
    ) -> anyhow::Result<Vec<ValueLike>> {
        (self.0)(hint.to_string(), context.clone(), archive.to_vec()).await
    }
}

/// Where a step's options come from.
#[derive(Clone, Default)]
pub enum OptionSource {
    #[default]
    None,
    Static(StaticOptions),
    Provider(Arc<dyn OptionProvider>),
}

impl fmt::Debug for OptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionSource::None => f.write_str("None"),
            OptionSource::Static(options) => f.debug_tuple("Static").field(&options.0.len()).finish(),
            OptionSource::Provider(_) => f.write_str("Provider"),
        }
    }
}

/// Identity of one issued fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    hint: String,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The result was the latest request and replaced the option list.
    Applied,
    /// A newer request was issued meanwhile; the result was dropped.
    Stale,
    /// The step has no option source.
    Skipped,
}

#[derive(Debug, Default)]
struct OptionsInner {
    options: Vec<ValueLike>,
    issued: u64,
    applied_hint: Option<String>,
}

/// Live option list of one runtime node.
///
/// Cloning yields another handle to the same list, which lets several
/// refreshes be in flight at once.
#[derive(Clone)]
pub struct OptionStore {
    source: OptionSource,
    limit: Option<usize>,
    inner: Arc<Mutex<OptionsInner>>,
}

impl OptionStore {
    pub fn new(source: OptionSource, limit: Option<usize>) -> Self {
        let options = match &source {
            OptionSource::Static(options) => truncate(options.0.clone(), limit),
            _ => Vec::new(),
        };
        Self {
            source,
            limit,
            inner: Arc::new(Mutex::new(OptionsInner {
                options,
                ..Default::default()
            })),
        }
    }

    pub fn has_source(&self) -> bool {
        !matches!(self.source, OptionSource::None)
    }

    /// Snapshot of the current options.
    pub fn options(&self) -> Vec<ValueLike> {
        self.inner.lock().options.clone()
    }

    /// Run `f` against the current options without copying them.
    pub fn with_options<R>(&self, f: impl FnOnce(&[ValueLike]) -> R) -> R {
        f(&self.inner.lock().options)
    }

    pub fn find(&self, key: &serde_json::Value) -> Option<ValueLike> {
        self.with_options(|options| options.iter().find(|o| o.key() == key).cloned())
    }

    /// Hint of the most recently applied refresh.
    pub fn applied_hint(&self) -> Option<String> {
        self.inner.lock().applied_hint.clone()
    }

    /// Record a new request; any ticket issued earlier becomes stale.
    pub fn issue(&self, hint: &str) -> FetchTicket {
        let mut inner = self.inner.lock();
        inner.issued += 1;
        FetchTicket {
            generation: inner.issued,
            hint: hint.to_string(),
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.inner.lock().issued == ticket.generation
    }

    /// Apply a fetch result if `ticket` is still the latest request.
    pub fn complete(&self, ticket: FetchTicket, options: Vec<ValueLike>) -> RefreshOutcome {
        let mut inner = self.inner.lock();
        if inner.issued != ticket.generation {
            tracing::debug!(
                hint = %ticket.hint,
                generation = ticket.generation,
                latest = inner.issued,
                "Discarding stale option fetch"
            );
            return RefreshOutcome::Stale;
        }
        inner.options = truncate(options, self.limit);
        inner.applied_hint = Some(ticket.hint);
        RefreshOutcome::Applied
    }

    /// Restore the initial option list; fetches still in flight become stale.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.issued += 1;
        inner.applied_hint = None;
        inner.options = match &self.source {
            OptionSource::Static(options) => truncate(options.0.clone(), self.limit),
            _ => Vec::new(),
        };
    }

    /// Fetch options for `hint` and apply them unless superseded.
    ///
    /// Errors are returned only for the latest request; a failing stale fetch
    /// is discarded like a successful one.
    pub async fn refresh(
        &self,
        hint: &str,
        context: &Context,
        archive: &[ValueLike],
    ) -> anyhow::Result<RefreshOutcome> {
        if !self.has_source() {
            return Ok(RefreshOutcome::Skipped);
        }
        let ticket = self.issue(hint);
        let fetched = match &self.source {
            OptionSource::None => Ok(Vec::new()),
            OptionSource::Static(options) => Ok(options.filter(hint)),
            OptionSource::Provider(provider) => provider.fetch(hint, context, archive).await,
        };
        match fetched {
            Ok(options) => Ok(self.complete(ticket, options)),
            Err(_) if !self.is_current(&ticket) => {
                tracing::debug!(hint, "Ignoring failure of a superseded option fetch");
                Ok(RefreshOutcome::Stale)
            }
            Err(e) => Err(e),
        }
    }
}

impl fmt::Debug for OptionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("OptionStore")
            .field("source", &self.source)
            .field("options", &inner.options.len())
            .field("issued", &inner.issued)
            .finish()
    }
}

fn truncate(mut options: Vec<ValueLike>, limit: Option<usize>) -> Vec<ValueLike> {
    if let Some(limit) = limit {
        options.truncate(limit);
    }
    options
}
