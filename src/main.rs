use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use medportal_lib::{Config, Credentials, Navigation, NewUser, Portal, Role, SessionState};
use tracing::{debug, info};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line client for the medical records portal
#[derive(Parser, Debug)]
#[command(name = "medportal", version, about)]
struct Cli {
    /// Path to a JSON config file (overrides MEDPORTAL_CONFIG_PATH)
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the restored session
    Status,
    /// Log in and remember the token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored token
    Logout,
    /// Create an account
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// PATIENT, DOCTOR, PHARMACIST or BIO_ANALYST
        #[arg(long)]
        role: Role,
    },
    /// Show which screen a path leads to
    Open { path: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let env_file_path = dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                "medportal_lib=debug,warn".into()
            } else {
                "medportal_lib=info,warn".into()
            }
        }))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    match env_file_path {
        Some(path) => info!("Loaded environment variables from {}", path.display()),
        None => debug!("No .env file found. Using existing environment variables."),
    };

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path).await,
        None => Config::from_env().await,
    }
    .context("failed to load configuration")?;

    let portal = Portal::new(config).context("failed to start portal")?;
    let snapshot = portal.initialize().await?;
    debug!(state = ?snapshot.state, "Session restored");

    match cli.command {
        Command::Status => print_status(&portal),
        Command::Login { email, password } => {
            let role = portal
                .login(&Credentials::new(email, password))
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Logged in as {}", role);
            print_route(&portal, "/dashboard").await?;
        }
        Command::Logout => {
            portal.logout().await?;
            println!("Logged out");
        }
        Command::Register {
            first_name,
            last_name,
            email,
            password,
            role,
        } => {
            let user = portal
                .register(&NewUser {
                    first_name,
                    last_name,
                    email,
                    password,
                    role,
                })
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Registered {} as {}; log in to continue", user.email, user.role);
        }
        Command::Open { path } => print_route(&portal, &path).await?,
    }

    Ok(())
}

fn print_status(portal: &Portal) {
    match portal.snapshot().state {
        SessionState::Authenticated { role } => println!("Authenticated as {}", role),
        SessionState::Anonymous => println!("Not logged in"),
        SessionState::Uninitialized | SessionState::Verifying => println!("Loading..."),
    }
}

async fn print_route(portal: &Portal, path: &str) -> Result<()> {
    let outcome = portal.open(path).await?;
    for hop in &outcome.redirects {
        println!("-> {}", hop);
    }
    match outcome.navigation {
        Navigation::Render(route) => println!("Screen: {:?} ({})", route, route),
        Navigation::Pending => println!("Loading..."),
        Navigation::Redirect(target) => println!("Redirect to {}", target),
    }
    Ok(())
}
