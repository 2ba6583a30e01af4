use std::sync::Arc;

use tracing::{error, info, warn};

use naranjo::{AppState, Config, Database, LogMailer, Role, SessionKeys, UserRepository, WebServer};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let promote_email = match args.iter().position(|a| a == "--promote-admin") {
        Some(i) => match args.get(i + 1) {
            Some(email) => Some(email.clone()),
            None => {
                eprintln!("usage: naranjo [--promote-admin <email>]");
                std::process::exit(2);
            }
        },
        None => None,
    };

    // Load configuration
    let config_path =
        std::env::var("NARANJO_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    // Initialize logging
    if let Err(e) = naranjo::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        naranjo::logging::init_console_only(&config.logging.level);
    }

    if config.auth.session_secret.is_empty() {
        warn!("No session secret configured; generated one for this run. Sessions will not survive a restart.");
        config.auth.session_secret = SessionKeys::generate_secret();
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(email) = promote_email {
        std::process::exit(promote_admin(&db, &email).await);
    }

    info!("Naranjo - multi-forum bulletin board");

    let state = Arc::new(AppState::new(db.clone(), &config, Arc::new(LogMailer)));
    let server = match WebServer::new(&config.server, state) {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutting down");
    };

    if let Err(e) = server.run(shutdown).await {
        error!("Web server error: {}", e);
        db.close().await;
        std::process::exit(1);
    }

    db.close().await;
}

/// Grant the admin role to the account registered with `email`.
async fn promote_admin(db: &Database, email: &str) -> i32 {
    let repo = UserRepository::new(db.pool());
    let email = email.trim().to_lowercase();

    let user = match repo.get_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            error!("No account registered with {}", email);
            return 1;
        }
        Err(e) => {
            error!("Failed to look up {}: {}", email, e);
            return 1;
        }
    };

    match repo.set_role(user.id, Role::Admin).await {
        Ok(_) => {
            info!(user_id = user.id, "Promoted {} to admin", user.username);
            db.close().await;
            0
        }
        Err(e) => {
            error!("Failed to promote {}: {}", email, e);
            1
        }
    }
}
