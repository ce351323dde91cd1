use std::env;

/// Fallback session secret used when `APP_ENV` is not production.
pub const LOCAL_SESSION_SECRET: &str = "local-development-session-secret";

/// AppConfig
///
/// Immutable configuration loaded once at startup and pulled into handlers and
/// extractors through `FromRef`. Everything the gate needs arrives through
/// here; nothing is read from process-wide state at request time.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and whether dev sessions are allowed.
    pub env: Env,
    // Opt-in: accept the `x-session-role` header as a session. Local only.
    pub dev_session_header: bool,
    // HMAC secret used to validate session tokens issued by the login service.
    pub session_secret: String,
    // Where denied admin-area requests are redirected.
    pub admin_login_path: String,
    // Where denied user-area requests are redirected.
    pub user_login_path: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// Runtime context: local development or production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Env {
    /// Case-insensitive parse of an `APP_ENV` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" | "development" | "dev" => Some(Env::Local),
            "production" | "prod" => Some(Env::Production),
            _ => None,
        }
    }
}

impl Default for AppConfig {
    /// Safe, non-panicking values for test setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            dev_session_header: false,
            session_secret: LOCAL_SESSION_SECRET.to_string(),
            admin_login_path: "/admin_login".to_string(),
            user_login_path: "/login".to_string(),
            bind_addr: "0.0.0.0:1337".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// An unset `APP_ENV` means local development. Any other value must name an
    /// environment (case-insensitive): a typo never silently downgrades a
    /// production deployment to local mode.
    ///
    /// # Panics
    /// - `APP_ENV` holds an unrecognised value.
    /// - `SESSION_SECRET` is missing in production, so the portal never starts
    ///   validating sessions against a guessable key.
    /// - `DEV_SESSION_HEADER` is switched on in production.
    pub fn load() -> Self {
        // 1. Environment resolution
        let env = match env::var("APP_ENV") {
            Ok(value) => Env::parse(&value).unwrap_or_else(|| {
                panic!("FATAL: unrecognised APP_ENV '{value}' (expected 'local' or 'production').")
            }),
            Err(_) => Env::Local,
        };

        // 2. Development session header (explicit opt-in, never in production)
        let dev_session_header = env::var("DEV_SESSION_HEADER")
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        if dev_session_header && env == Env::Production {
            panic!("FATAL: DEV_SESSION_HEADER must not be enabled in production.");
        }

        // 3. Session secret
        let session_secret = match env {
            Env::Production => env::var("SESSION_SECRET")
                .expect("FATAL: SESSION_SECRET must be set in production."),
            Env::Local => {
                env::var("SESSION_SECRET").unwrap_or_else(|_| LOCAL_SESSION_SECRET.to_string())
            }
        };

        // 4. Redirect targets and listener
        let defaults = Self::default();

        Self {
            env,
            dev_session_header,
            session_secret,
            admin_login_path: login_path("ADMIN_LOGIN_PATH", defaults.admin_login_path),
            user_login_path: login_path("USER_LOGIN_PATH", defaults.user_login_path),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }

    /// Whether the `x-session-role` development header may stand in for a session.
    pub fn dev_sessions_enabled(&self) -> bool {
        self.env == Env::Local && self.dev_session_header
    }
}

/// A login path must stay on this host: absolute, and not protocol-relative
/// (`//host`), not backslash-smuggled (`/\host`), no scheme, no control chars.
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.contains("://")
        && !path.chars().any(char::is_control)
}

// Redirect targets that fail `is_local_path` fall back to the default.
fn login_path(var: &str, default: String) -> String {
    match env::var(var) {
        Ok(path) if is_local_path(&path) => path,
        Ok(path) => {
            tracing::warn!(var, %path, "ignoring login path that is not a local absolute path");
            default
        }
        Err(_) => default,
    }
}
