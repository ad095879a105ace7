//! plantpal - Plant identification client
//!
//! Picks an image, sends it through the relay and prints the result. Also
//! signs in to (or creates) a PlantPal account.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use plantpal_client::auth::{AuthSession, AuthTab, HeaderView, IdentityToolkitProvider, LoginModal};
use plantpal_client::config::{ClientConfig, ClientOptions};
use plantpal_client::transport::RelayClient;
use plantpal_client::view::{Format, MemorySurface, Region, Surface};
use plantpal_client::{ImageAsset, PlantPalApp, UploadSession};
use plantpal_common::config::TomlConfig;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "plantpal_client=warn";

#[derive(Parser, Debug)]
#[command(name = "plantpal")]
#[command(about = "Identify plants from a photo")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    options: ClientOptions,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Identify the plant in an image
    Identify {
        /// Image file to upload
        image: PathBuf,

        /// Print the HTML fragment instead of plain text
        #[arg(long)]
        html: bool,

        /// Classification hint sent with the image
        #[arg(long, default_value = plantpal_common::api::DEFAULT_ORGAN)]
        organ: String,
    },

    /// Sign in to an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let toml_config = TomlConfig::load(cli.options.config.as_deref())
        .context("Failed to load configuration file")?;

    let default_filter = toml_config
        .logging
        .level
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    // stdout carries the rendered result
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::resolve(&cli.options, &toml_config.client, &toml_config.identity)
        .context("Invalid client configuration")?;
    debug!(?config, "Resolved configuration");

    match cli.command {
        Command::Identify { image, html, organ } => identify(&config, &image, html, organ).await,
        Command::Login { email, password } => {
            let session = auth_session(&config)?;
            let mut modal = LoginModal::default();
            modal.open();
            let result = modal.submit_login(&session, &email, &password).await;
            Ok(show_auth(&modal, &session, result.is_ok()))
        }
        Command::Signup {
            name,
            email,
            password,
        } => {
            let session = auth_session(&config)?;
            let mut modal = LoginModal::default();
            modal.open();
            modal.select_tab(AuthTab::SignUp);
            let result = modal.submit_sign_up(&session, &name, &email, &password).await;
            Ok(show_auth(&modal, &session, result.is_ok()))
        }
    }
}

async fn identify(
    config: &ClientConfig,
    image: &Path,
    html: bool,
    organ: String,
) -> Result<ExitCode> {
    let asset = ImageAsset::from_path(image)
        .await
        .with_context(|| format!("Failed to read image {}", image.display()))?;

    let relay = RelayClient::new(config.relay_url.clone(), config.timeout)
        .context("Failed to create relay client")?;
    let format = if html { Format::Html } else { Format::Text };

    let mut app = PlantPalApp::new(
        UploadSession::new(organ),
        relay,
        MemorySurface::new(format),
        config.max_matches,
    );
    app.select_file(Some(asset));
    let failed = app.identify().await.is_failure();

    if let Some(results) = app.surface().content(Region::Results) {
        println!("{}", results);
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn auth_session(config: &ClientConfig) -> Result<AuthSession<IdentityToolkitProvider>> {
    let provider = IdentityToolkitProvider::new(
        config.identity_endpoint.clone(),
        config.identity_api_key()?,
        config.timeout,
    )
    .context("Failed to create identity provider client")?;
    Ok(AuthSession::new(provider))
}

/// Print the dialog (error, if still open) and the header
fn show_auth(
    modal: &LoginModal,
    session: &AuthSession<IdentityToolkitProvider>,
    succeeded: bool,
) -> ExitCode {
    let mut surface = MemorySurface::new(Format::Text);
    surface.replace(Region::LoginModal, modal);
    surface.replace(
        Region::Header,
        &HeaderView::from_user(session.current_user().as_ref()),
    );
    println!("{}", surface.render_all());

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
