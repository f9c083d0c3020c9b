use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `development` disables token checks; `production` adds HSTS.
    pub environment: String,
    pub token_ttl: Duration,
    pub require_tokens: bool,
    /// `*` allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            environment: "development".to_string(),
            token_ttl: DEFAULT_TOKEN_TTL,
            require_tokens: false,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:3003".to_string(),
            ],
        }
    }
}

impl ServerConfig {
    /// Sets the environment and derives token enforcement from it.
    pub fn with_environment(mut self, environment: &str) -> Self {
        self.environment = environment.to_ascii_lowercase();
        self.require_tokens = !self.is_development();
        self
    }

    /// Parses a comma separated origin list, ignoring blanks.
    pub fn with_allowed_origins(mut self, origins: &str) -> Self {
        self.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
