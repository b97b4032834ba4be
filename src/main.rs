use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use tracing::{error, info};

use warden::cli::create_user;
use warden::logging::init_tracing;
use warden::metrics::{init_metrics, metrics_app};
use warden::router::init_router;
use warden::state::init_app_state;
use warden::warden_config::ServerConfig;
use warden::warden_db::{init_db_pool, run_migrations};
use warden::warden_models::Role;

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Warden - account and session service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Apply database migrations and exit
    Migrate,
    /// Create a verified user account
    CreateUser {
        #[arg(short = 'u', long)]
        username: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Prompted securely if not provided
        #[arg(short = 'p', long)]
        password: Option<String>,

        #[arg(short = 'r', long, default_value = "user")]
        role: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Migrate => migrate().await,
        Commands::CreateUser {
            username,
            email,
            password,
            role,
        } => handle_create_user(username, email, password, role).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    let state = init_app_state().await?;
    let app = init_router(state);

    if let Some(handle) = init_metrics()? {
        let metrics_addr = std::env::var("METRICS_ADDR").unwrap_or_else(|_| "0.0.0.0:9090".into());
        let listener = tokio::net::TcpListener::bind(&metrics_addr).await?;
        info!("Metrics available at http://{}/metrics", metrics_addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                error!(error = %e, "Metrics server stopped");
            }
        });
    }

    let addr = ServerConfig::from_env().addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}

async fn migrate() -> anyhow::Result<()> {
    let pool = init_db_pool().await?;
    run_migrations(&pool).await?;
    info!("Migrations applied");
    Ok(())
}

async fn handle_create_user(
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: String,
) -> anyhow::Result<()> {
    let role = role.parse::<Role>()?;

    let username = match username {
        Some(username) => username,
        None => Input::<String>::new().with_prompt("Username").interact_text()?,
    };

    let email = match email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email address").interact_text()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let state = init_app_state().await?;
    let user_id = create_user(&state, &username, &email, &password, role).await?;

    println!("User created: {} ({})", username, user_id);
    Ok(())
}
