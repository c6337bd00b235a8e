//! Operator CLI for the storefront backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Admin access in the storefront is a `role = 'admin'` column on the
//! caller's profile row. This binary inspects and bootstraps those rows and
//! smoke-tests the session cache end to end against a real project.
//!
//! Backend settings come from `SUPABASE_*` environment variables; sign-in
//! credentials come from flags with `STOREFRONT_*` fallbacks.


use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use session::{
    AuthBackend, BackendError, CacheSnapshot, ConfigError, Credentials, ProfileRow, Role, SessionCache, SessionUser,
    SupabaseClient, SupabaseConfig,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("no auth user with email {0}")]
    UserNotFound(String),
    #[error("timed out after {0}s waiting for the session cache to settle")]
    Timeout(u64),
    #[error("session cache stopped before settling")]
    CacheStopped,
    #[error("invalid JSON output: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "storefront", about = "Storefront session and admin tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and print the session user, profile row, and admin status.
    Whoami(LoginArgs),
    /// Grant the admin role to an existing user (needs the service-role key).
    MakeAdmin {
        #[arg(long)]
        email: String,
    },
    /// Sign in and upsert your own profile row with the admin role.
    ClaimProfile(LoginArgs),
    /// Run the session cache until it settles and print its snapshot.
    Cache(CacheArgs),
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long, env = "STOREFRONT_EMAIL")]
    email: String,

    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: String,
}

impl LoginArgs {
    fn credentials(&self) -> Credentials {
        Credentials { email: self.email.trim().to_owned(), password: self.password.clone() }
    }
}

#[derive(Args, Debug)]
struct CacheArgs {
    /// Sign in before waiting, so the snapshot carries an enriched identity.
    #[arg(long, env = "STOREFRONT_EMAIL", requires = "password")]
    email: Option<String>,

    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[arg(long, default_value_t = 15)]
    settle_timeout_secs: u64,
}

impl CacheArgs {
    fn credentials(&self) -> Option<Credentials> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => {
                Some(Credentials { email: email.trim().to_owned(), password: password.clone() })
            }
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = SupabaseConfig::from_env()?;
    tracing::debug!(?config, "loaded backend config");
    let client = SupabaseClient::new(config)?;

    match cli.command {
        Command::Whoami(login) => run_whoami(&client, &login.credentials()).await,
        Command::MakeAdmin { email } => run_make_admin(&client, email.trim()).await,
        Command::ClaimProfile(login) => run_claim_profile(&client, &login.credentials()).await,
        Command::Cache(args) => run_cache(client, &args).await,
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

async fn run_whoami(client: &SupabaseClient, credentials: &Credentials) -> Result<(), CliError> {
    let session = client.sign_in_with_password(credentials).await?;
    let profile = client.select_profile_by_id(&session.user.id).await;
    sign_out_quietly(client).await;

    print_json(&whoami_report(&session.user, profile?.as_ref())?)
}

async fn run_make_admin(client: &SupabaseClient, email: &str) -> Result<(), CliError> {
    let user = client
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| CliError::UserNotFound(email.to_owned()))?;
    tracing::info!(subject_id = %user.id, "granting admin role");

    let stored = client.upsert_profile(&admin_profile_row(&user)).await?;
    print_json(&serde_json::to_value(stored)?)
}

async fn run_claim_profile(client: &SupabaseClient, credentials: &Credentials) -> Result<(), CliError> {
    let session = client.sign_in_with_password(credentials).await?;
    tracing::info!(subject_id = %session.user.id, "claiming admin profile");

    let stored = client.upsert_profile(&admin_profile_row(&session.user)).await;
    sign_out_quietly(client).await;
    print_json(&serde_json::to_value(stored?)?)
}

async fn run_cache(client: SupabaseClient, args: &CacheArgs) -> Result<(), CliError> {
    let credentials = args.credentials();
    let cache = SessionCache::new(client);
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let driver = async {
        let settled = wait_until_settled(&cache, credentials.as_ref(), args.settle_timeout_secs).await;
        let _ = stop_tx.send(());
        settled
    };
    // `run` is polled first so its subscription exists before any sign-in.
    let ((), settled) = tokio::join!(
        cache.run(async {
            let _ = stop_rx.await;
        }),
        driver,
    );
    let snapshot = settled?;

    if credentials.is_some() {
        sign_out_quietly(cache.backend()).await;
    }
    print_json(&serde_json::to_value(snapshot)?)
}

async fn wait_until_settled(
    cache: &SessionCache<SupabaseClient>,
    credentials: Option<&Credentials>,
    timeout_secs: u64,
) -> Result<CacheSnapshot, CliError> {
    let expected = match credentials {
        Some(credentials) => Some(cache.sign_in(credentials).await?.user.id),
        None => None,
    };

    let mut rx = cache.watch();
    let waited = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        rx.wait_for(|s| is_settled(s, expected.as_deref())),
    )
    .await
    .map_err(|_| CliError::Timeout(timeout_secs))?;
    // Clone before the next await so the watch lock is released.
    waited.map(|s| s.clone()).map_err(|_| CliError::CacheStopped)
}

// =============================================================================
// HELPERS
// =============================================================================

/// Whether `snapshot` is final for the caller: loading has finished and, when
/// a sign-in was made, the identity belongs to that subject.
fn is_settled(snapshot: &CacheSnapshot, expected_subject: Option<&str>) -> bool {
    if snapshot.is_loading {
        return false;
    }
    match expected_subject {
        Some(subject) => snapshot.identity.as_ref().is_some_and(|i| i.subject_id == subject),
        None => true,
    }
}

fn admin_profile_row(user: &SessionUser) -> ProfileRow {
    ProfileRow {
        id: user.id.clone(),
        email: user.email.clone(),
        role: Some(Role::Admin.as_str().to_owned()),
        full_name: user.user_metadata.full_name.clone(),
    }
}

fn whoami_report(user: &SessionUser, profile: Option<&ProfileRow>) -> Result<Value, serde_json::Error> {
    let role = Role::from_profile(profile.and_then(|p| p.role.as_deref()));
    Ok(serde_json::json!({
        "user": serde_json::to_value(user)?,
        "profile": serde_json::to_value(profile)?,
        "role": role.as_str(),
        "is_admin": role == Role::Admin,
    }))
}

async fn sign_out_quietly(client: &SupabaseClient) {
    if let Err(e) = client.sign_out().await {
        tracing::warn!(error = %e, "sign-out failed");
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
