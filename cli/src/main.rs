use std::path::PathBuf;
use std::sync::Arc;

use accounts::{Role, RouteTableError};
use clap::{Args, Parser, Subcommand};
use client::{
    ApiError, AuthError, AuthSession, FileStore, GuardDecision, HistoryNavigator, HttpAuthApi, ProtectedRoute,
    RemoteInvalidation,
};
use serde::Serialize;
use tracing::Level;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing password; pass --password or set ECCLESIA_PASSWORD")]
    MissingPassword,
    #[error("not signed in; run `ecclesia-cli login <username>` first")]
    NotSignedIn,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("request failed: {0}")]
    Api(#[from] ApiError),
    #[error("route table: {0}")]
    Routes(#[from] RouteTableError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "ecclesia-cli", about = "Church administration auth and LGPD CLI")]
struct Cli {
    #[arg(long, env = "ECCLESIA_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// JSON file holding the stored session between runs.
    #[arg(long, env = "ECCLESIA_STATE_FILE", default_value = "ecclesia-session.json")]
    state_file: PathBuf,

    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session.
    Login {
        username: String,
        #[arg(long, env = "ECCLESIA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Print the signed-in user.
    Whoami,
    /// Sign out and clear the stored session.
    Logout,
    /// Show what a route guarded by the given roles would do.
    Guard {
        #[arg(value_delimiter = ',', required = true)]
        roles: Vec<Role>,
    },
    Lgpd(LgpdCommand),
}

#[derive(Args, Debug)]
struct LgpdCommand {
    #[command(subcommand)]
    command: LgpdSubcommand,
}

#[derive(Subcommand, Debug)]
enum LgpdSubcommand {
    /// Print everything stored about the signed-in user.
    Export,
}

struct CliContext {
    session: AuthSession,
    api: Arc<HttpAuthApi>,
    navigator: Arc<HistoryNavigator>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let navigator = Arc::new(HistoryNavigator::new());
    let store = FileStore::new(&cli.state_file);
    let (session, api) = client::connect(&cli.base_url, Box::new(store), navigator.clone())?;
    let mut ctx = CliContext { session, api, navigator };

    match cli.command {
        Command::Login { username, password } => run_login(&mut ctx, &username, password).await,
        Command::Whoami => run_whoami(&mut ctx).await,
        Command::Logout => run_logout(&mut ctx).await,
        Command::Guard { roles } => run_guard(&mut ctx, roles).await,
        Command::Lgpd(lgpd) => match lgpd.command {
            LgpdSubcommand::Export => run_lgpd_export(&mut ctx).await,
        },
    }
}

async fn run_login(ctx: &mut CliContext, username: &str, password: Option<String>) -> Result<(), CliError> {
    let password = password
        .filter(|p| !p.is_empty())
        .ok_or(CliError::MissingPassword)?;
    let user = ctx.session.login(username, &password).await?;
    print_json(&user)
}

async fn run_whoami(ctx: &mut CliContext) -> Result<(), CliError> {
    ctx.session.check_session().await;
    let user = ctx.session.user().ok_or(CliError::NotSignedIn)?;
    print_json(user)
}

async fn run_logout(ctx: &mut CliContext) -> Result<(), CliError> {
    // A failed check wipes the state file, so note the session beforehand.
    let had_session = ctx.session.session_id().is_some();
    // Restores the CSRF token the backend expects on logout.
    ctx.session.check_session().await;
    let outcome = ctx.session.logout().await;
    println!("{}", describe_logout(had_session, &outcome));
    Ok(())
}

async fn run_guard(ctx: &mut CliContext, roles: Vec<Role>) -> Result<(), CliError> {
    ctx.session.check_session().await;
    let mut route = ProtectedRoute::standard(roles)?;
    let decision = route.decide(ctx.session.state());
    ctx.session.guard(&mut route);
    println!("{}", describe_decision(decision, ctx.navigator.current().as_deref()));
    Ok(())
}

async fn run_lgpd_export(ctx: &mut CliContext) -> Result<(), CliError> {
    ctx.session.check_session().await;
    let session_id = ctx.session.session_id().ok_or(CliError::NotSignedIn)?;
    let export = ctx.api.personal_data(&session_id).await?;
    print_json(&export)
}

fn describe_decision(decision: GuardDecision, navigated_to: Option<&str>) -> String {
    match decision {
        GuardDecision::Grant => "granted".to_owned(),
        GuardDecision::Wait => "loading".to_owned(),
        GuardDecision::SignIn | GuardDecision::Reroute(_) => {
            let path = navigated_to.or(decision.redirect_path()).unwrap_or("/login");
            format!("redirect {path}")
        }
    }
}

fn describe_logout(had_session: bool, outcome: &RemoteInvalidation) -> String {
    match outcome {
        RemoteInvalidation::Acknowledged => "signed out".to_owned(),
        RemoteInvalidation::Skipped if had_session => {
            "signed out locally; stored session was rejected or the server was unreachable".to_owned()
        }
        RemoteInvalidation::Skipped => "no stored session".to_owned(),
        RemoteInvalidation::Failed(e) => format!("signed out locally; server logout failed: {e}"),
    }
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use accounts::RoleRedirect;

    #[test]
    fn guard_roles_are_comma_separated() {
        let cli = Cli::try_parse_from(["ecclesia-cli", "guard", "pastor,treasurer"]).unwrap();
        let Command::Guard { roles } = cli.command else {
            panic!("expected guard command");
        };
        assert_eq!(roles, vec![Role::Pastor, Role::Treasurer]);
    }

    #[test]
    fn guard_rejects_unknown_roles() {
        assert!(Cli::try_parse_from(["ecclesia-cli", "guard", "bishop"]).is_err());
    }

    #[test]
    fn login_takes_password_flag() {
        let cli = Cli::try_parse_from(["ecclesia-cli", "login", "pastor", "--password", "senha123"]).unwrap();
        let Command::Login { username, password } = cli.command else {
            panic!("expected login command");
        };
        assert_eq!(username, "pastor");
        assert_eq!(password.as_deref(), Some("senha123"));
    }

    #[test]
    fn state_file_flag_overrides_default() {
        let cli = Cli::try_parse_from(["ecclesia-cli", "--state-file", "/tmp/s.json", "whoami"]).unwrap();
        assert_eq!(cli.state_file, PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn describe_decision_reports_redirect_target() {
        let decision = GuardDecision::Reroute(RoleRedirect::Mapped("/deacon"));
        assert_eq!(describe_decision(decision, Some("/deacon")), "redirect /deacon");
        assert_eq!(describe_decision(GuardDecision::SignIn, None), "redirect /login");
        assert_eq!(describe_decision(GuardDecision::Grant, None), "granted");
    }

    #[test]
    fn logout_after_cleared_session_is_not_reported_as_absent() {
        let message = describe_logout(true, &RemoteInvalidation::Skipped);
        assert_ne!(message, "no stored session");
        assert!(message.starts_with("signed out locally"));
    }

    #[test]
    fn logout_without_any_session_says_so() {
        assert_eq!(describe_logout(false, &RemoteInvalidation::Skipped), "no stored session");
    }

    #[test]
    fn logout_reports_server_failure() {
        let outcome = RemoteInvalidation::Failed(ApiError::Transport("connection refused".into()));
        assert_eq!(
            describe_logout(true, &outcome),
            "signed out locally; server logout failed: request failed: connection refused"
        );
        assert_eq!(describe_logout(true, &RemoteInvalidation::Acknowledged), "signed out");
    }
}
