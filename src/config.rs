// Runtime configuration, sourced from the process environment at startup
// and injected into the shared application state. Nothing in the service
// reads the environment after this point.

const DEV_JWT_SECRET: &str = "dev-only-insecure-secret";

#[derive(Debug, Clone)]
pub struct Config {
    pub postgres_user: String,
    pub postgres_password: String,
    pub postgres_db: String,
    pub postgres_host: String,
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> Config {
        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, falling back to the dev-only secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let access_token_expire_minutes = std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        Config {
            postgres_user: env_or("POSTGRES_USER", "user"),
            postgres_password: env_or("POSTGRES_PASSWORD", "password"),
            postgres_db: env_or("POSTGRES_DB", "todos"),
            postgres_host: env_or("POSTGRES_HOST", "db"),
            jwt_secret,
            access_token_expire_minutes,
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:3000"),
        }
    }

    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}/{}",
            self.postgres_user, self.postgres_password, self.postgres_host, self.postgres_db
        )
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
