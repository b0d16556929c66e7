//! Report application errors to Honeybadger.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use badger_notifier::Connection;
//!
//! let connection = Connection::new("API_KEY")?;
//! connection.report_error(Some("DatabaseError"), "connection pool exhausted").await?;
//! connection
//!     .report_error_fmt(Some("DatabaseError"), format_args!("{} retries left", 0))
//!     .await?;
//! # Ok(())
//! # }
//! ```
pub mod call_site;
pub mod config;
pub mod connection;
pub mod context;
pub mod error;
pub mod notice;
pub mod transport;

pub use call_site::CallSiteResolver;
pub use config::Config;
pub use connection::Connection;
pub use context::{EnvironmentProbe, NoticeContext, NotifierIdentity, ServerContext};
pub use error::{MalformedRequestError, ReportError, SetupError};
pub use notice::{BacktraceFrame, CategoryPolicy, ErrorNotice, NoticePayload};
pub use transport::{HttpTransport, Transport};
