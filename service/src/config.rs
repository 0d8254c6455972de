use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,

    /// The secret used to sign and verify bearer tokens (HS256).
    #[arg(long, env)]
    jwt_secret: Option<String>,

    /// How many hours an issued bearer token stays valid.
    #[arg(long, env, default_value_t = 24)]
    pub jwt_ttl_hours: u64,

    /// The maximum number of to-dos a single user may have pinned at once.
    #[arg(long, env = "MAXIMUM_PINNED_TODOS", default_value_t = 1)]
    pub max_pinned_todos: u64,

    /// Number of digits in a password reset token.
    #[arg(long, env, default_value_t = 6)]
    pub password_reset_token_length: usize,

    /// Minutes a password reset token stays valid.
    #[arg(long, env = "PASSWORD_RESET_TOKEN_TTL", default_value_t = 10)]
    pub password_reset_token_ttl_minutes: u64,

    /// Seconds between keep-alive comments written to idle SSE streams.
    #[arg(long, env, default_value_t = 10)]
    pub sse_heartbeat_interval_secs: u64,

    /// Notifications buffered per SSE connection before new ones are dropped.
    #[arg(long, env, default_value_t = 32)]
    pub sse_queue_capacity: usize,

    /// Published events waiting for dispatch before new ones are dropped.
    #[arg(long, env, default_value_t = 1024)]
    pub event_bus_queue_capacity: usize,

    /// Upper bound on event handler invocations running at the same time.
    #[arg(long, env, default_value_t = 64)]
    pub event_bus_max_concurrent_handlers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn set_jwt_secret(mut self, jwt_secret: String) -> Self {
        self.jwt_secret = Some(jwt_secret);
        self
    }

    pub fn jwt_secret(&self) -> Option<&str> {
        self.jwt_secret.as_deref()
    }

    pub fn jwt_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.jwt_ttl_hours as i64)
    }

    pub fn password_reset_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.password_reset_token_ttl_minutes as i64)
    }

    pub fn sse_heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.sse_heartbeat_interval_secs.max(1))
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}
