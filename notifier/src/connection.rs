use std::fmt;
use std::future::Future;
use std::panic::Location;
use std::sync::Arc;

use crate::call_site::CallSiteResolver;
use crate::config::Config;
use crate::context::NoticeContext;
use crate::error::{ReportError, SetupError};
use crate::notice::{CategoryPolicy, NoticePayload};
use crate::transport::{HttpTransport, Transport, DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT};

/// A "connection" to Honeybadger: where notices go, how they are authenticated
/// and the process context every notice carries.
pub struct Connection<T = HttpTransport> {
    /// API key sent in the `X-API-Key` header.
    credential: String,
    /// The notices endpoint.
    endpoint: String,
    /// How the reporting call site is recovered.
    call_site: CallSiteResolver,
    /// Whether an empty category is sent or omitted.
    category_policy: CategoryPolicy,
    /// Notifier identity and server context, shared with every other connection of this process.
    context: Arc<NoticeContext>,
    transport: T,
}

impl Connection<HttpTransport> {
    /// A connection to the default endpoint with a 30 second timeout and no server context.
    pub fn new(credential: &str) -> Result<Self, SetupError> {
        let transport = HttpTransport::new(DEFAULT_REQUEST_TIMEOUT)?;
        Ok(Self::with_transport(
            credential,
            Arc::new(NoticeContext::default()),
            transport,
        ))
    }

    /// Build a connection from configuration, discovering the server context once.
    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let context = if config.send_server_context {
            NoticeContext::discover(&config.environment_vars)?
        } else {
            NoticeContext::default()
        };

        Self::from_config_with_context(config, Arc::new(context))
    }

    /// Like `from_config` but reuses an already discovered context.
    pub fn from_config_with_context(
        config: &Config,
        context: Arc<NoticeContext>,
    ) -> Result<Self, SetupError> {
        let transport = HttpTransport::new(config.request_timeout.0)?;
        let connection = Self::with_transport(&config.api_key, context, transport)
            .with_endpoint(&config.endpoint)
            .with_category_policy(config.category_policy);

        Ok(match config.stack_offset {
            Some(offset) => connection.with_stack_offset(offset),
            None => connection,
        })
    }
}

impl<T: Transport> Connection<T> {
    pub fn with_transport(credential: &str, context: Arc<NoticeContext>, transport: T) -> Self {
        Self {
            credential: credential.to_owned(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            call_site: CallSiteResolver::default(),
            category_policy: CategoryPolicy::default(),
            context,
            transport,
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_owned();
        self
    }

    /// Resolve call sites by walking the stack instead of `#[track_caller]`.
    /// `offset` counts the wrapper functions the application puts around the
    /// reporting call; 0 reports the line that calls `report_error` directly.
    pub fn with_stack_offset(mut self, offset: usize) -> Self {
        self.call_site = CallSiteResolver::StackOffset(offset);
        self
    }

    pub fn with_category_policy(mut self, category_policy: CategoryPolicy) -> Self {
        self.category_policy = category_policy;
        self
    }

    /// Point an existing connection somewhere else, e.g. a local test server.
    pub fn set_endpoint(&mut self, endpoint: &str) {
        self.endpoint = endpoint.to_owned();
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn context(&self) -> &NoticeContext {
        &self.context
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Report an error to Honeybadger.
    ///
    /// The call site is resolved and the notice built right away; serializing and
    /// delivering happen when the returned future is awaited. Resolves to `Ok(())`
    /// only when the service answers 201.
    #[track_caller]
    pub fn report_error<M: fmt::Display>(
        &self,
        category: Option<&str>,
        message: M,
    ) -> impl Future<Output = Result<(), ReportError>> + Send + '_ {
        let prepared = self.prepare(Location::caller(), category, &message);
        self.deliver(prepared)
    }

    /// Same as `report_error`, with the message given as `format_args!`.
    #[track_caller]
    pub fn report_error_fmt(
        &self,
        category: Option<&str>,
        args: fmt::Arguments<'_>,
    ) -> impl Future<Output = Result<(), ReportError>> + Send + '_ {
        let prepared = self.prepare(Location::caller(), category, &args);
        self.deliver(prepared)
    }

    // Both public methods must call this directly: `StackOffset` depends on the frame count.
    #[inline(never)]
    fn prepare(
        &self,
        location: &'static Location<'static>,
        category: Option<&str>,
        message: &dyn fmt::Display,
    ) -> Result<NoticePayload, ReportError> {
        let frame = self.call_site.resolve(location)?;

        Ok(NoticePayload::build(
            category,
            message,
            frame,
            &self.context,
            self.category_policy,
        ))
    }

    async fn deliver(
        &self,
        prepared: Result<NoticePayload, ReportError>,
    ) -> Result<(), ReportError> {
        let result = match prepared {
            Ok(payload) => {
                self.transport
                    .send(&payload, &self.credential, &self.endpoint)
                    .await
            }
            Err(error) => Err(error),
        };

        let outcome = match &result {
            Ok(_) => "sent",
            Err(error) => error.kind(),
        };
        metrics::counter!("honeybadger_notices_total", "outcome" => outcome).increment(1);

        result
    }
}

impl<T> fmt::Debug for Connection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint)
            .field("call_site", &self.call_site)
            .field("category_policy", &self.category_policy)
            .finish_non_exhaustive()
    }
}
