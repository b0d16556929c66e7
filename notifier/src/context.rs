//! Process-wide notice metadata. Built once at startup and shared read-only by every notice.
use std::collections::HashMap;
use std::convert::Infallible;
use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SetupError;

/// Describes this client library to the service.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone)]
pub struct NotifierIdentity {
    pub name: String,
    pub url: String,
    pub version: String,
}

impl Default for NotifierIdentity {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_owned(),
            url: env!("CARGO_PKG_HOMEPAGE").to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone)]
pub struct ProjectRoot {
    pub path: String,
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone)]
pub struct ServerContext {
    pub project_root: ProjectRoot,
    pub environment_name: String,
    pub hostname: String,
}

impl ServerContext {
    /// Read the working directory, hostname and environment name of this process.
    pub fn discover(probe: &EnvironmentProbe) -> Result<Self, SetupError> {
        let vars = utf8_vars();
        let path = env::current_dir().map_err(SetupError::WorkingDirectory)?;
        let hostname = discover_hostname(&vars).ok_or(SetupError::Hostname)?;
        let environment_name = probe.resolve(&vars);

        debug!(
            "discovered server context: host={} environment={}",
            hostname, environment_name
        );

        Ok(Self {
            project_root: ProjectRoot {
                path: path.to_string_lossy().into_owned(),
            },
            environment_name,
            hostname,
        })
    }
}

/// The process environment, leaving out entries whose name or value isn't UTF-8.
fn utf8_vars() -> HashMap<String, String> {
    env::vars_os()
        .filter_map(|(name, value)| {
            Some((name.into_string().ok()?, value.into_string().ok()?))
        })
        .collect()
}

fn discover_hostname(vars: &HashMap<String, String>) -> Option<String> {
    if let Some(hostname) = vars.get("HOSTNAME").filter(|h| !h.trim().is_empty()) {
        return Some(hostname.trim().to_owned());
    }

    let hostname = gethostname::gethostname();
    let hostname = hostname.to_string_lossy();
    let hostname = hostname.trim();
    (!hostname.is_empty()).then(|| hostname.to_owned())
}

/// Ordered list of environment variables consulted for the environment name.
/// The first variable holding a non-empty value wins.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct EnvironmentProbe(pub Vec<String>);

impl EnvironmentProbe {
    pub fn resolve(&self, vars: &HashMap<String, String>) -> String {
        self.0
            .iter()
            .filter_map(|name| vars.get(name))
            .find(|value| !value.is_empty())
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for EnvironmentProbe {
    fn default() -> Self {
        Self(vec!["GOENV".to_owned(), "RAILS_ENV".to_owned(), "go".to_owned()])
    }
}

/// Parses a comma separated list of variable names, e.g. `APP_ENV,RAILS_ENV`.
impl FromStr for EnvironmentProbe {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(
            s.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect(),
        ))
    }
}

/// Everything a notice carries that isn't specific to the error being reported.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct NoticeContext {
    pub notifier: NotifierIdentity,
    pub server: Option<ServerContext>,
}

impl NoticeContext {
    pub fn new(notifier: NotifierIdentity, server: Option<ServerContext>) -> Self {
        Self { notifier, server }
    }

    /// Default notifier identity plus a freshly discovered server context.
    pub fn discover(probe: &EnvironmentProbe) -> Result<Self, SetupError> {
        Ok(Self::new(
            NotifierIdentity::default(),
            Some(ServerContext::discover(probe)?),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_probe_order() {
        let probe = EnvironmentProbe::default();

        assert_eq!(
            probe.resolve(&vars(&[("GOENV", "staging"), ("RAILS_ENV", "production")])),
            "staging"
        );
        assert_eq!(
            probe.resolve(&vars(&[("RAILS_ENV", "production"), ("go", "dev")])),
            "production"
        );
        assert_eq!(probe.resolve(&vars(&[("go", "dev")])), "dev");
        assert_eq!(probe.resolve(&vars(&[])), "");
    }

    #[test]
    fn test_probe_skips_empty_values() {
        let probe = EnvironmentProbe::default();

        assert_eq!(
            probe.resolve(&vars(&[("GOENV", ""), ("RAILS_ENV", "test")])),
            "test"
        );
    }

    #[test]
    fn test_parse_probe() {
        let probe: EnvironmentProbe = "APP_ENV, RAILS_ENV,,".parse().unwrap();

        assert_eq!(
            probe,
            EnvironmentProbe(vec!["APP_ENV".to_owned(), "RAILS_ENV".to_owned()])
        );
    }

    #[test]
    fn test_hostname_prefers_env_var() {
        assert_eq!(
            discover_hostname(&vars(&[("HOSTNAME", " web-1\n")])),
            Some("web-1".to_owned())
        );
    }

    #[test]
    fn test_hostname_falls_back_to_system_lookup() {
        let hostname = discover_hostname(&vars(&[("HOSTNAME", "  ")]));

        assert!(hostname.is_some_and(|h| !h.is_empty()));
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_ignores_non_utf8_variables() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        env::set_var(
            "BADGER_NOTIFIER_NON_UTF8",
            OsString::from_vec(vec![0x66, 0xff, 0x6f]),
        );
        env::set_var("BADGER_NOTIFIER_ENVIRONMENT", "staging");

        let probe = EnvironmentProbe(vec!["BADGER_NOTIFIER_ENVIRONMENT".to_owned()]);
        let server = ServerContext::discover(&probe);
        let vars = utf8_vars();
        env::remove_var("BADGER_NOTIFIER_NON_UTF8");
        env::remove_var("BADGER_NOTIFIER_ENVIRONMENT");

        let server = server.expect("discovery succeeds next to a non-UTF-8 variable");
        assert_eq!(server.environment_name, "staging");
        assert!(!vars.contains_key("BADGER_NOTIFIER_NON_UTF8"));
        assert_eq!(vars["BADGER_NOTIFIER_ENVIRONMENT"], "staging");
    }

    #[test]
    fn test_discover_server_context() {
        let context = NoticeContext::discover(&EnvironmentProbe(vec![])).unwrap();
        let server = context.server.expect("server context is discovered");

        assert_eq!(
            server.project_root.path,
            env::current_dir().unwrap().to_string_lossy()
        );
        assert!(!server.hostname.is_empty());
        assert_eq!(server.environment_name, "");
        assert_eq!(context.notifier, NotifierIdentity::default());
    }
}
