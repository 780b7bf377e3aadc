use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use client::config::Config;
use client::presentation;
use client::router::{resolve, Resolution};
use client::session::federated::{
    ButtonTarget, ButtonText, FederatedBinding, FederatedConfig, FederatedOutcome, ManualProvider,
};
use client::session::SessionSnapshot;
use client::state::AppState;

const USAGE: &str = "usage: client <status | route PATH | login EMAIL PASSWORD | google CREDENTIAL | logout>";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting resume client v{} against {}",
        env!("CARGO_PKG_VERSION"),
        config.api_base_url
    );

    let state = AppState::build(config).context("failed to build client state")?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        [] | ["status"] => {
            let snapshot = state.session.restore().await;
            print_status(&snapshot);
        }
        ["route", path] => {
            let snapshot = state.session.restore().await;
            match resolve(path, &snapshot) {
                Resolution::Render(route) => println!("render {route}"),
                Resolution::Loading => println!("loading"),
                Resolution::Redirect(route) => println!("redirect {route}"),
            }
        }
        ["login", email, password] => {
            let user = state
                .session
                .login(email, password)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message("Login failed")))?;
            println!("{}", presentation::greeting(Some(&user)));
        }
        ["google", credential] => google_sign_in(&state, credential).await?,
        ["logout"] => {
            state.session.logout();
            println!("Signed out");
        }
        _ => bail!(USAGE),
    }

    Ok(())
}

fn print_status(snapshot: &SessionSnapshot) {
    match &snapshot.user {
        Some(user) => {
            let badge = presentation::role_badge(user)
                .map(|b| format!(" [{b}]"))
                .unwrap_or_default();
            println!(
                "{} <{}>{badge} ({:?})",
                user.full_name, user.email, snapshot.verification
            );
        }
        None => println!("Not signed in"),
    }
}

/// Feeds a Google ID token obtained elsewhere through the federated binder.
async fn google_sign_in(state: &AppState, credential: &str) -> Result<()> {
    let client_id = state
        .config
        .google_client_id
        .clone()
        .context("GOOGLE_CLIENT_ID must be set for Google sign-in")?;

    let provider = ManualProvider::new();
    let mut binding = FederatedBinding::attach(
        Arc::clone(&state.session),
        &provider,
        &FederatedConfig { client_id },
        &ButtonTarget {
            element_id: "google-signin".to_string(),
            text: ButtonText::SignInWith,
        },
    )
    .await?;

    if !provider.submit(credential) {
        bail!("federated binder stopped before the credential was delivered");
    }
    let outcome = binding
        .outcomes
        .recv()
        .await
        .context("federated binder closed without an outcome")?;
    binding.detach();

    match outcome {
        FederatedOutcome::SignedIn(user) => {
            println!("{}", presentation::greeting(Some(&user)));
            Ok(())
        }
        FederatedOutcome::Failed(message) => bail!(message),
    }
}
