//! Visitor: identity, chained context and the shared hit queue.

use crate::builders::{EventInput, ItemInput, PageviewInput, TransactionInput};
use crate::config::{Config, VisitorBuilder};
use crate::identifier::{resolve_client_id, IdGenerator, RandomUuid};
use crate::normalize;
use crate::queue::HitQueue;
use crate::transport::{HttpTransport, Transport};
use crate::types::{Hit, HitType, Params};
use crate::Error;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Identity and collaborators shared by every fork of a visitor.
struct Shared {
    config: Config,
    transport: Arc<dyn Transport>,
    tracking_id: Option<String>,
    client_id: String,
    user_id: Option<String>,
    debug: AtomicBool,
}

/// One analytics session.
///
/// Recording a hit returns a new `Visitor` that shares this one's queue and
/// identity but carries the hit's parameters as context, so the next call in
/// a chain can leave fields out:
///
/// ```rust,no_run
/// use ua_visitor::Visitor;
///
/// # async fn example() -> Result<(), ua_visitor::Error> {
/// let visitor = Visitor::new("UA-XXXXX-1")?;
///
/// // The event inherits "/pricing" as its page.
/// visitor
///     .pageview("/pricing")
///     .event(("cta", "click"))
///     .send()
///     .await?;
/// # Ok(())
/// # }
/// ```
///
/// Recording never fails loudly. Use the `try_*` variants to get the
/// validation error back, or the `*_with` variants to have a callback
/// receive it along with the result of delivering the queue.
#[derive(Clone)]
pub struct Visitor {
    shared: Arc<Shared>,
    persistent: Params,
    context: Option<Params>,
    queue: HitQueue,
}

impl fmt::Debug for Visitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Visitor")
            .field("tracking_id", &self.shared.tracking_id)
            .field("client_id", &self.shared.client_id)
            .field("user_id", &self.shared.user_id)
            .field("context", &self.context)
            .field("pending", &self.queue.len())
            .finish()
    }
}

impl VisitorBuilder {
    /// Build the visitor.
    pub fn build(mut self) -> Result<Visitor, Error> {
        let config = self.build_config()?;

        let transport: Arc<dyn Transport> = match self.transport.take() {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&config)?),
        };

        let generator: Arc<dyn IdGenerator> = match self.id_generator.take() {
            Some(generator) => generator,
            None => Arc::new(RandomUuid),
        };
        let client_id = resolve_client_id(
            &[self.client_id.as_deref()],
            self.strict_cid_format,
            generator.as_ref(),
        );

        Ok(Visitor {
            shared: Arc::new(Shared {
                config,
                transport,
                tracking_id: self.tracking_id,
                client_id,
                user_id: self.user_id,
                debug: AtomicBool::new(self.debug),
            }),
            persistent: Params::new(),
            context: None,
            queue: HitQueue::new(),
        })
    }
}

impl Visitor {
    /// Create a new builder.
    pub fn builder() -> VisitorBuilder {
        VisitorBuilder::new()
    }

    /// Visitor for a tracking id with a random client id.
    pub fn new(tracking_id: impl Into<String>) -> Result<Self, Error> {
        Self::builder().tracking_id(tracking_id).build()
    }

    /// Get the endpoint configuration.
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Get the tracking id.
    pub fn tracking_id(&self) -> Option<&str> {
        self.shared.tracking_id.as_deref()
    }

    /// Get the client id.
    pub fn client_id(&self) -> &str {
        &self.shared.client_id
    }

    /// Get the user id.
    pub fn user_id(&self) -> Option<&str> {
        self.shared.user_id.as_deref()
    }

    /// Parameters of the last hit recorded through this visitor, if any.
    pub fn context(&self) -> Option<&Params> {
        self.context.as_ref()
    }

    /// Get the number of hits waiting to be sent.
    pub fn pending_hit_count(&self) -> usize {
        self.queue.len()
    }

    /// Hits waiting to be sent, oldest first.
    pub fn pending_hits(&self) -> Vec<Hit> {
        self.queue.snapshot()
    }

    /// Whether `other` was forked from the same session.
    pub fn shares_queue_with(&self, other: &Visitor) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Whether debug logging is on.
    pub fn is_debug(&self) -> bool {
        self.shared.debug.load(Ordering::Relaxed)
    }

    // ============================================
    // SESSION STATE
    // ============================================

    /// Turn on debug logging for this visitor and all of its forks.
    pub fn debug(&self) -> &Self {
        self.set_debug(true)
    }

    /// Toggle debug logging for this visitor and all of its forks.
    pub fn set_debug(&self, enabled: bool) -> &Self {
        self.shared.debug.store(enabled, Ordering::Relaxed);
        if enabled {
            info!(client_id = %self.shared.client_id, "logging enabled");
        }
        self
    }

    /// Drop the context so the next call inherits nothing. Queued hits stay.
    pub fn reset(mut self) -> Self {
        self.context = None;
        self
    }

    /// Add a parameter to every later hit.
    ///
    /// Filled in when a hit is queued, so anything the call resolved itself,
    /// including values inherited from context, wins over it.
    pub fn set(mut self, code: impl Into<String>, value: impl Into<Value>) -> Self {
        let param = Params::from([(code.into(), value.into())]);
        self.persistent.extend(normalize::translate(param));
        self
    }

    // ============================================
    // PAGEVIEW
    // ============================================

    /// Record a pageview, swallowing validation errors.
    pub fn pageview(&self, input: impl Into<PageviewInput>) -> Visitor {
        self.settle(self.try_pageview(input))
    }

    /// Record a pageview.
    pub fn try_pageview(&self, input: impl Into<PageviewInput>) -> Result<Visitor, Error> {
        let resolved = normalize::pageview(input.into(), self.context());
        self.record(HitType::Pageview, resolved)
    }

    /// Record a pageview and deliver the queue, reporting to `done`.
    pub fn pageview_with<F>(&self, input: impl Into<PageviewInput>, done: F) -> Visitor
    where
        F: FnOnce(&Visitor, Result<(), Error>) + Send + 'static,
    {
        self.settle_with(self.try_pageview(input), done)
    }

    // ============================================
    // EVENT
    // ============================================

    /// Record an event, swallowing validation errors.
    pub fn event(&self, input: impl Into<EventInput>) -> Visitor {
        self.settle(self.try_event(input))
    }

    /// Record an event.
    pub fn try_event(&self, input: impl Into<EventInput>) -> Result<Visitor, Error> {
        let resolved = normalize::event(input.into(), self.context());
        self.record(HitType::Event, resolved)
    }

    /// Record an event and deliver the queue, reporting to `done`.
    pub fn event_with<F>(&self, input: impl Into<EventInput>, done: F) -> Visitor
    where
        F: FnOnce(&Visitor, Result<(), Error>) + Send + 'static,
    {
        self.settle_with(self.try_event(input), done)
    }

    // ============================================
    // TRANSACTION
    // ============================================

    /// Record a transaction, swallowing validation errors.
    pub fn transaction(&self, input: impl Into<TransactionInput>) -> Visitor {
        self.settle(self.try_transaction(input))
    }

    /// Record a transaction.
    pub fn try_transaction(&self, input: impl Into<TransactionInput>) -> Result<Visitor, Error> {
        let resolved = normalize::transaction(input.into(), self.context());
        self.record(HitType::Transaction, resolved)
    }

    /// Record a transaction and deliver the queue, reporting to `done`.
    pub fn transaction_with<F>(&self, input: impl Into<TransactionInput>, done: F) -> Visitor
    where
        F: FnOnce(&Visitor, Result<(), Error>) + Send + 'static,
    {
        self.settle_with(self.try_transaction(input), done)
    }

    // ============================================
    // ITEM
    // ============================================

    /// Record a transaction item, swallowing validation errors.
    pub fn item(&self, input: impl Into<ItemInput>) -> Visitor {
        self.settle(self.try_item(input))
    }

    /// Record a transaction item.
    pub fn try_item(&self, input: impl Into<ItemInput>) -> Result<Visitor, Error> {
        let resolved = normalize::item(input.into(), self.context());
        self.record(HitType::Item, resolved)
    }

    /// Record a transaction item and deliver the queue, reporting to `done`.
    pub fn item_with<F>(&self, input: impl Into<ItemInput>, done: F) -> Visitor
    where
        F: FnOnce(&Visitor, Result<(), Error>) + Send + 'static,
    {
        self.settle_with(self.try_item(input), done)
    }

    // ============================================
    // QUEUE
    // ============================================

    /// Queue a hit built by the caller. Context is left alone.
    pub fn enqueue(&self, kind: HitType, params: Params) -> &Self {
        self.push_hit(kind, normalize::tidy(normalize::translate(params)));
        self
    }

    /// Queue a hit built by the caller and deliver the queue.
    pub fn enqueue_with<F>(&self, kind: HitType, params: Params, done: F) -> &Self
    where
        F: FnOnce(&Visitor, Result<(), Error>) + Send + 'static,
    {
        self.enqueue(kind, params);
        self.spawn_send(done);
        self
    }

    /// Deliver every queued hit, oldest first, one request at a time.
    ///
    /// Stops at the first failed delivery. The failed hit is not requeued;
    /// hits behind it stay queued for the next call. Concurrent calls on
    /// any fork of this visitor wait for the running drain to finish.
    #[instrument(skip(self), fields(client_id = %self.shared.client_id))]
    pub async fn send(&self) -> Result<(), Error> {
        let _drain = self.queue.lock_drain().await;

        let endpoint = self.shared.config.endpoint();
        let headers = self.shared.config.headers();
        let mut delivered = 0usize;

        while let Some(hit) = self.queue.pop_front() {
            let url = format!("{}?{}", endpoint, hit.to_query());
            if self.is_debug() {
                info!(hit = %hit.kind(), url = %url, "sending hit");
            }

            let response = match self
                .shared
                .transport
                .post(&url, String::new(), &headers)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    error!(error = %e, hit = %hit.kind(), "delivery failed, dropping hit");
                    return Err(e);
                }
            };

            if !response.is_success() {
                error!(status = response.status, hit = %hit.kind(), "hit rejected, dropping hit");
                return Err(Error::Status {
                    status: response.status,
                    body: response.body,
                });
            }

            delivered += 1;
        }

        debug!(delivered, "queue drained");
        Ok(())
    }

    // ============================================
    // INTERNAL
    // ============================================

    fn with_context(&self, context: Params) -> Visitor {
        Visitor {
            shared: self.shared.clone(),
            persistent: self.persistent.clone(),
            context: Some(context),
            queue: self.queue.clone(),
        }
    }

    fn without_context(&self) -> Visitor {
        Visitor {
            context: None,
            ..self.clone()
        }
    }

    fn record(&self, kind: HitType, resolved: Result<Params, Error>) -> Result<Visitor, Error> {
        let params = resolved?;
        self.push_hit(kind, params.clone());
        Ok(self.with_context(params))
    }

    fn push_hit(&self, kind: HitType, mut params: Params) {
        let shared = &self.shared;

        for (code, value) in self.persistent.iter().filter(|(_, value)| !value.is_null()) {
            params
                .entry(code.clone())
                .or_insert_with(|| value.clone());
        }

        if self.is_debug() {
            for code in params.keys().filter(|code| !shared.config.accepts(code)) {
                warn!(parameter = %code, hit = %kind, "parameter is not supported by the endpoint");
            }
        }

        params.insert("v".into(), shared.config.protocol_version().into());
        if let Some(tid) = &shared.tracking_id {
            params.insert("tid".into(), tid.as_str().into());
        }
        params.insert("cid".into(), shared.client_id.as_str().into());
        if let Some(uid) = &shared.user_id {
            params.insert("uid".into(), uid.as_str().into());
        }
        params.insert("t".into(), kind.as_str().into());

        let hit = Hit::new(kind, params);
        if self.is_debug() {
            match serde_json::to_string(&hit) {
                Ok(json) => info!(hit = %json, "enqueued hit"),
                Err(e) => warn!(error = %e, "could not render hit"),
            }
        }

        self.queue.push(hit);
    }

    fn settle(&self, result: Result<Visitor, Error>) -> Visitor {
        result.unwrap_or_else(|e| {
            if self.is_debug() {
                warn!(error = %e, "hit not recorded");
            }
            self.without_context()
        })
    }

    fn settle_with<F>(&self, result: Result<Visitor, Error>, done: F) -> Visitor
    where
        F: FnOnce(&Visitor, Result<(), Error>) + Send + 'static,
    {
        match result {
            Ok(fork) => {
                self.spawn_send(done);
                fork
            }
            Err(e) => {
                done(self, Err(e));
                self.without_context()
            }
        }
    }

    fn spawn_send<F>(&self, done: F)
    where
        F: FnOnce(&Visitor, Result<(), Error>) + Send + 'static,
    {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                done(self, Err(Error::NoRuntime));
                return;
            }
        };

        let visitor = self.clone();
        handle.spawn(async move {
            let result = visitor.send().await;
            done(&visitor, result);
        });
    }
}
