//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::auth::Principal;
use crate::db::Database;
use clap::Parser;
use tracing::{error, info};

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "cinegate",
    about = "Movie records API behind stateless JWT sessions"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, env = "DATABASE_PATH", default_value = "cinegate.db")]
    pub database: String,

    /// Name of the root principal allowed to log in
    #[arg(long, env = "ROOT_USER", hide_env_values = true)]
    pub root_user: Option<String>,

    /// Password of the root principal
    #[arg(long, env = "ROOT_USER_PASSWORD", hide_env_values = true)]
    pub root_password: Option<String>,

    /// Deployment environment. Production sets the Secure flag on session cookies
    #[arg(long, env = "APP_ENV", default_value = "development")]
    pub environment: Environment,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    validate_jwt_secret(secret)
}

fn validate_jwt_secret(secret: String) -> Option<String> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }
    Some(secret)
}

/// Build the root principal from the parsed arguments.
/// Returns None and logs an error if either value is missing or empty.
pub fn load_root_principal(args: &Args) -> Option<Principal> {
    match (args.root_user.as_deref(), args.root_password.as_deref()) {
        (Some(name), Some(secret)) if !name.is_empty() && !secret.is_empty() => {
            Some(Principal::new(name, secret))
        }
        _ => {
            error!(
                "Root credentials are required. Set ROOT_USER and ROOT_USER_PASSWORD (or --root-user and --root-password)"
            );
            None
        }
    }
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    db: Database,
    jwt_secret: String,
    root: Principal,
    environment: Environment,
) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        root,
        secure_cookies: environment == Environment::Production,
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["cinegate"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_root_principal_from_args() {
        let args = parse(&["--root-user", "root", "--root-password", "rootpw"]);
        let principal = load_root_principal(&args).unwrap();
        assert_eq!(principal.name, "root");
        assert_eq!(principal.secret, "rootpw");
    }

    #[test]
    fn test_root_principal_requires_both_values() {
        let args = parse(&["--root-user", "root", "--root-password", ""]);
        assert!(load_root_principal(&args).is_none());
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(validate_jwt_secret("short".to_string()).is_none());
        assert!(validate_jwt_secret("x".repeat(MIN_JWT_SECRET_LENGTH)).is_some());
    }

    #[test]
    fn test_environment_parsing() {
        let args = parse(&["--environment", "production"]);
        assert_eq!(args.environment, Environment::Production);
    }

    #[tokio::test]
    async fn test_production_enables_secure_cookies() {
        let root = Principal::new("root", "rootpw");
        let db = Database::open(":memory:").await.unwrap();

        let config = build_config(
            db.clone(),
            "x".repeat(32),
            root.clone(),
            Environment::Production,
        );
        assert!(config.secure_cookies);

        let config = build_config(db, "x".repeat(32), root, Environment::Development);
        assert!(!config.secure_cookies);
    }
}
