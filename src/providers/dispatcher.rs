use std::collections::HashSet;
use std::sync::Arc;

use log::debug;
use serde_json::Value;

use crate::config::Config;
use crate::errors::{DispatchError, DispatchResult, TransportError};
use crate::providers::chat_completions::ChatCompletionsAdapter;
use crate::providers::messages::MessagesAdapter;
use crate::providers::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::providers::types::{Message, ProviderKind, Shape};

/// One adapter per request shape
#[derive(Debug, Clone)]
pub enum Adapter {
    ChatCompletions(ChatCompletionsAdapter),
    Messages(MessagesAdapter),
}

impl Adapter {
    /// Picks the adapter for the config's provider. Performs no I/O.
    pub fn for_config(config: &Config) -> DispatchResult<Self> {
        match config.provider().shape() {
            Shape::ChatCompletions => ChatCompletionsAdapter::new(config).map(Adapter::ChatCompletions),
            Shape::Messages => MessagesAdapter::new(config).map(Adapter::Messages),
        }
    }

    pub fn build_request(&self, messages: &[Message]) -> DispatchResult<HttpRequest> {
        match self {
            Adapter::ChatCompletions(adapter) => adapter.build_request(messages),
            Adapter::Messages(adapter) => adapter.build_request(messages),
        }
    }

    pub fn extract_text(&self, response: Value) -> DispatchResult<String> {
        match self {
            Adapter::ChatCompletions(adapter) => adapter.extract_text(response),
            Adapter::Messages(adapter) => adapter.extract_text(response),
        }
    }
}

/// Turns a message list plus a [`Config`] into a single text reply.
///
/// Each call is independent: build request, send, parse, return. There is no
/// retry, no streaming and no internal timeout. A dispatcher holds no mutable
/// state and can be shared across tasks or threads.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    enabled: HashSet<ProviderKind>,
}

impl Dispatcher {
    /// A dispatcher over HTTP with every provider enabled.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// A dispatcher for [`Dispatcher::complete_blocking`], with every provider enabled.
    pub fn blocking() -> Self {
        Self::builder()
            .transport(Arc::new(ReqwestTransport::unpooled()))
            .build()
    }

    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    pub fn supports(&self, provider: ProviderKind) -> bool {
        self.enabled.contains(&provider)
    }

    /// Sends `messages` to the backend described by `config` and returns its text.
    pub async fn complete(&self, messages: &[Message], config: &Config) -> DispatchResult<String> {
        let provider = config.provider();
        if !self.supports(provider) {
            return Err(DispatchError::UnsupportedProvider(provider));
        }

        let adapter = Adapter::for_config(config)?;
        let request = adapter.build_request(messages)?;
        debug!(
            "Dispatching {} message(s) to {} ({})",
            messages.len(),
            provider,
            config.model()
        );

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| DispatchError::transport(provider, e))?;

        adapter.extract_text(response)
    }

    /// Blocking form of [`Dispatcher::complete`].
    ///
    /// Runs the call on a private single-threaded runtime. Called from inside
    /// an async context it fails with [`TransportError::Runtime`] without
    /// sending anything.
    ///
    /// Each call gets a fresh runtime, so a dispatcher used this way should
    /// come from [`Dispatcher::blocking`], whose client keeps no idle
    /// connections between calls.
    pub fn complete_blocking(&self, messages: &[Message], config: &Config) -> DispatchResult<String> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(DispatchError::transport(
                config.provider(),
                TransportError::Runtime(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "blocking call made from inside an async runtime; use `complete` instead",
                )),
            ));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DispatchError::transport(config.provider(), TransportError::Runtime(e)))?;
        runtime.block_on(self.complete(messages, config))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut enabled: Vec<_> = self.enabled.iter().map(ProviderKind::as_str).collect();
        enabled.sort_unstable();
        f.debug_struct("Dispatcher")
            .field("enabled", &enabled)
            .finish_non_exhaustive()
    }
}

/// Dispatcher Builder
#[derive(Default)]
pub struct DispatcherBuilder {
    transport: Option<Arc<dyn Transport>>,
    enabled: Option<HashSet<ProviderKind>>,
}

impl DispatcherBuilder {
    /// Replaces the HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Restricts dispatch to the given providers; others fail with
    /// [`DispatchError::UnsupportedProvider`] before any request is sent.
    pub fn providers<I>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = ProviderKind>,
    {
        self.enabled = Some(providers.into_iter().collect());
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(ReqwestTransport::new())),
            enabled: self
                .enabled
                .unwrap_or_else(|| ProviderKind::ALL.into_iter().collect()),
        }
    }
}
