/// Backend configuration loaded from environment variables.
#[derive(Debug)]
pub struct BackendConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing session tokens.
    pub jwt_secret: String,
    /// TCP port to listen on (default 3200). Env var: `BACKEND_PORT`.
    pub backend_port: u16,
    /// Bearer session lifetime in seconds (default 8 hours). Env var: `SESSION_TTL_SECS`.
    pub session_ttl_secs: u64,
    /// Role attached to self-registered users (default "employee"). Env var: `DEFAULT_ROLE`.
    pub default_role: String,
}

impl BackendConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            backend_port: std::env::var("BACKEND_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3200),
            session_ttl_secs: std::env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8 * 60 * 60),
            default_role: std::env::var("DEFAULT_ROLE").unwrap_or_else(|_| "employee".to_owned()),
        }
    }
}
