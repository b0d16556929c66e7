use std::str::FromStr;
use std::time;

use envconfig::Envconfig;

use crate::context::EnvironmentProbe;
use crate::notice::CategoryPolicy;

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(from = "HONEYBADGER_API_KEY")]
    pub api_key: String,

    #[envconfig(
        from = "HONEYBADGER_ENDPOINT",
        default = "https://api.honeybadger.io/v1/notices"
    )]
    pub endpoint: String,

    #[envconfig(from = "HONEYBADGER_REQUEST_TIMEOUT_MS", default = "30000")]
    pub request_timeout: EnvMsDuration,

    /// Unset means call sites are captured with `#[track_caller]` instead of a stack walk.
    #[envconfig(from = "HONEYBADGER_STACK_OFFSET")]
    pub stack_offset: Option<usize>,

    #[envconfig(from = "HONEYBADGER_CATEGORY_POLICY", default = "omit-empty")]
    pub category_policy: CategoryPolicy,

    #[envconfig(from = "HONEYBADGER_ENVIRONMENT_VARS", default = "GOENV,RAILS_ENV,go")]
    pub environment_vars: EnvironmentProbe,

    #[envconfig(from = "HONEYBADGER_SEND_SERVER_CONTEXT", default = "true")]
    pub send_server_context: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvMsDuration(pub time::Duration);

#[derive(Debug, PartialEq, Eq)]
pub struct ParseEnvMsDurationError;

impl FromStr for EnvMsDuration {
    type Err = ParseEnvMsDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ms = s.parse::<u64>().map_err(|_| ParseEnvMsDurationError)?;

        Ok(EnvMsDuration(time::Duration::from_millis(ms)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_defaults() {
        let env = HashMap::from([("HONEYBADGER_API_KEY".to_owned(), "key".to_owned())]);

        let config = Config::init_from_hashmap(&env).unwrap();

        assert_eq!(config.api_key, "key");
        assert_eq!(config.endpoint, "https://api.honeybadger.io/v1/notices");
        assert_eq!(config.request_timeout.0, time::Duration::from_secs(30));
        assert_eq!(config.stack_offset, None);
        assert_eq!(config.category_policy, CategoryPolicy::OmitEmpty);
        assert_eq!(config.environment_vars, EnvironmentProbe::default());
        assert!(config.send_server_context);
    }

    #[test]
    fn test_overrides() {
        let env = HashMap::from([
            ("HONEYBADGER_API_KEY".to_owned(), "key".to_owned()),
            (
                "HONEYBADGER_ENDPOINT".to_owned(),
                "http://localhost:3000".to_owned(),
            ),
            ("HONEYBADGER_REQUEST_TIMEOUT_MS".to_owned(), "250".to_owned()),
            ("HONEYBADGER_STACK_OFFSET".to_owned(), "1".to_owned()),
            ("HONEYBADGER_CATEGORY_POLICY".to_owned(), "preserve".to_owned()),
            ("HONEYBADGER_ENVIRONMENT_VARS".to_owned(), "APP_ENV".to_owned()),
            ("HONEYBADGER_SEND_SERVER_CONTEXT".to_owned(), "false".to_owned()),
        ]);

        let config = Config::init_from_hashmap(&env).unwrap();

        assert_eq!(config.endpoint, "http://localhost:3000");
        assert_eq!(config.request_timeout.0, time::Duration::from_millis(250));
        assert_eq!(config.stack_offset, Some(1));
        assert_eq!(config.category_policy, CategoryPolicy::Preserve);
        assert_eq!(
            config.environment_vars,
            EnvironmentProbe(vec!["APP_ENV".to_owned()])
        );
        assert!(!config.send_server_context);
    }

    #[test]
    fn test_api_key_is_required() {
        assert!(Config::init_from_hashmap(&HashMap::new()).is_err());
    }

    #[test]
    fn test_parse_ms_duration() {
        assert_eq!(
            "1500".parse::<EnvMsDuration>(),
            Ok(EnvMsDuration(time::Duration::from_millis(1500)))
        );
        assert_eq!(
            "soon".parse::<EnvMsDuration>(),
            Err(ParseEnvMsDurationError)
        );
    }
}
