use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    /// Secret the identity provider signs its access tokens with.
    pub auth_jwt_secret: String,

    /// Shared secret the external scheduler presents via X-Cron-Secret.
    /// Empty means the sweep endpoint accepts unauthenticated calls.
    pub cron_secret: String,

    pub resend_api_key: String,
    pub email_from: String,

    pub sweep_concurrency: usize,
    pub sweep_timeout_secs: u64,
    pub email_max_per_minute: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            cors_extra_origins: env::var("CORS_EXTRA_ORIGINS")
                .map(|v| v.split(',').map(|o| o.trim().to_string()).collect())
                .unwrap_or_default(),

            auth_jwt_secret: env::var("AUTH_JWT_SECRET").expect("AUTH_JWT_SECRET must be set"),

            cron_secret: env::var("CRON_SECRET").unwrap_or_else(|_| String::new()),

            resend_api_key: env::var("RESEND_API_KEY").unwrap_or_else(|_| String::new()),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "Equilibrius <notificacoes@equilibrius-br.com.br>".into()),

            sweep_concurrency: env::var("SWEEP_CONCURRENCY")
                .unwrap_or_else(|_| "8".into())
                .parse()
                .unwrap_or(8),
            sweep_timeout_secs: env::var("SWEEP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".into())
                .parse()
                .unwrap_or(120),
            email_max_per_minute: env::var("EMAIL_MAX_PER_MINUTE")
                .unwrap_or_else(|_| "60".into())
                .parse()
                .unwrap_or(60),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn email_configured(&self) -> bool {
        !self.resend_api_key.is_empty()
    }

    pub fn cors_origins(&self) -> Vec<String> {
        let mut origins = vec![self.frontend_url.clone()];
        origins.extend(self.cors_extra_origins.iter().cloned());
        origins
    }
}
