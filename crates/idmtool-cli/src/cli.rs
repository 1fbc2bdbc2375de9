//! Argument parsing, session setup, and command dispatch.

use std::path::PathBuf;

use anyhow::anyhow;
use clap::builder::NonEmptyStringValueParser;
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use idmtool_config::{JOLOKIA_CFG_FILENAME, Target, default_etc_dir, default_target};
use idmtool_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

use crate::client::{
    AppContext, CliError, CliResult, Credentials, EXIT_FAILURE, HEADER_REQUEST_ID,
};
use crate::commands::domains::handle_list_domains;
use crate::commands::grants::{handle_add_grant, handle_delete_grant, handle_get_grants};
use crate::commands::jolokia::handle_change_jolokia_password;
use crate::commands::roles::{handle_add_role, handle_delete_role, handle_list_roles};
use crate::commands::token::handle_get_oauth2_token;
use crate::commands::users::{
    handle_add_user, handle_change_password, handle_delete_user, handle_list_users,
};
use crate::prompt::{ACTING_PASSWORD_PROMPT, PasswordPrompt, TerminalPrompt};

const INSECURE_WARNING: &str =
    "Warning:  HTTPS certificate verification has been disabled.  Use at your own risk!";

struct CliDependencies {
    client: Client,
}

impl CliDependencies {
    fn from_cli(cli: &Cli, trace_id: &str) -> CliResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(trace_id).map_err(|_| {
            CliError::failure(anyhow!("trace identifier contains invalid characters"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .default_headers(default_headers)
            .danger_accept_invalid_certs(cli.insecure)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        if cli.insecure {
            eprintln!("{INSECURE_WARNING}");
        }
        Ok(Self { client })
    }
}

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return report_parse_error(&err),
    };

    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.into(),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("error: {err}");
        return EXIT_FAILURE;
    }

    let trace_id = Uuid::new_v4().to_string();
    let span = info_span!(
        "command",
        command = command_label(&cli.command),
        trace_id = %trace_id
    );

    let result = execute_command(cli, &trace_id).instrument(span).await;

    match result {
        Ok(()) => 0,
        Err(err) => {
            if let CliError::Request(failure) = &err {
                debug!(
                    category = ?failure.category(),
                    status = ?failure.status(),
                    "request failed"
                );
            }
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn execute_command(cli: Cli, trace_id: &str) -> CliResult<()> {
    let deps = CliDependencies::from_cli(&cli, trace_id)?;
    dispatch(cli, &deps, Box::new(TerminalPrompt)).await
}

fn report_parse_error(err: &clap::Error) -> i32 {
    let _ = err.print();
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => EXIT_FAILURE,
    }
}

async fn dispatch(
    cli: Cli,
    deps: &CliDependencies,
    prompt: Box<dyn PasswordPrompt>,
) -> CliResult<()> {
    let etc_dir = cli.etc_dir.unwrap_or_else(default_etc_dir);

    match cli.command {
        Command::ChangeJolokiaPassword => handle_change_jolokia_password(
            &etc_dir.join(JOLOKIA_CFG_FILENAME),
            prompt.as_ref(),
        ),
        Command::Rest(command) => {
            let target = match cli.target_host.as_deref() {
                Some(value) => Target::from_override(value)?,
                None => default_target(&etc_dir)?,
            };
            debug!(target = %target.base_url(), "resolved target");

            let password = prompt.read_password(ACTING_PASSWORD_PROMPT)?;
            let ctx = AppContext {
                client: deps.client.clone(),
                target,
                credentials: Credentials {
                    username: cli.user,
                    password,
                },
                prompt,
            };
            dispatch_rest(&ctx, command).await
        }
    }
}

async fn dispatch_rest(ctx: &AppContext, command: RestCommand) -> CliResult<()> {
    match command {
        RestCommand::ListUsers => handle_list_users(ctx).await,
        RestCommand::AddUser(args) => handle_add_user(ctx, args).await,
        RestCommand::ChangePassword(args) => handle_change_password(ctx, args).await,
        RestCommand::DeleteUser(args) => handle_delete_user(ctx, args).await,
        RestCommand::ListDomains => handle_list_domains(ctx).await,
        RestCommand::ListRoles => handle_list_roles(ctx).await,
        RestCommand::AddRole(args) => handle_add_role(ctx, args).await,
        RestCommand::DeleteRole(args) => handle_delete_role(ctx, args).await,
        RestCommand::AddGrant(args) => handle_add_grant(ctx, args).await,
        RestCommand::GetGrants(args) => handle_get_grants(ctx, args).await,
        RestCommand::DeleteGrant(args) => handle_delete_grant(ctx, args).await,
        RestCommand::GetOauth2Token(args) => handle_get_oauth2_token(ctx, args).await,
    }
}

#[derive(Parser)]
#[command(
    name = "idmtool",
    version,
    about = "Manage users, roles, domains, and grants of the AAA identity store"
)]
struct Cli {
    #[arg(
        value_parser = NonEmptyStringValueParser::new(),
        help = "Username of the acting administrator"
    )]
    user: String,
    #[arg(
        long,
        global = true,
        help = "Base URL of the controller, e.g. https://10.0.0.2:8443/ (default: derived from the local pax-web config)"
    )]
    target_host: Option<String>,
    #[arg(
        short = 'k',
        long,
        global = true,
        help = "Disable HTTPS certificate verification"
    )]
    insecure: bool,
    #[arg(
        long,
        global = true,
        env = "IDMTOOL_ETC_DIR",
        help = "Controller etc/ directory holding the pax-web and jolokia config files"
    )]
    etc_dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_LOG_LEVEL,
        help = "Log filter when RUST_LOG is unset"
    )]
    log_level: String,
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = LogFormatArg::Compact
    )]
    log_format: LogFormatArg,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(flatten)]
    Rest(RestCommand),
    /// Change the jolokia password in the local config file
    ChangeJolokiaPassword,
}

/// Commands that call the AAA REST API as the acting user.
#[derive(Subcommand)]
enum RestCommand {
    /// List all users
    ListUsers,
    /// Add a user; the new password is prompted for
    AddUser(AddUserArgs),
    /// Change a user's password
    ChangePassword(UserIdArgs),
    /// Delete a user
    DeleteUser(UserIdArgs),
    /// List all domains
    ListDomains,
    /// List all roles
    ListRoles,
    /// Add a role
    AddRole(AddRoleArgs),
    /// Delete a role
    DeleteRole(RoleIdArgs),
    /// Grant a role to a user
    AddGrant(GrantArgs),
    /// List the roles granted to a user
    GetGrants(UserIdArgs),
    /// Revoke a role from a user
    DeleteGrant(GrantArgs),
    /// Obtain an OAuth2 token for the acting user
    #[command(name = "get-oauth2-token")]
    GetOauth2Token(TokenArgs),
}

#[derive(Args)]
pub(crate) struct AddUserArgs {
    #[arg(
        value_parser = NonEmptyStringValueParser::new(),
        help = "Name of the new user"
    )]
    pub(crate) new_user: String,
    #[arg(long, default_value = "")]
    pub(crate) description: String,
    #[arg(long, default_value = "")]
    pub(crate) email: String,
}

#[derive(Args)]
pub(crate) struct UserIdArgs {
    #[arg(
        value_parser = NonEmptyStringValueParser::new(),
        help = "User identifier, e.g. bob@sdn"
    )]
    pub(crate) userid: String,
}

#[derive(Args)]
pub(crate) struct AddRoleArgs {
    #[arg(
        value_parser = NonEmptyStringValueParser::new(),
        help = "Name of the new role"
    )]
    pub(crate) role: String,
    #[arg(long, default_value = "")]
    pub(crate) description: String,
}

#[derive(Args)]
pub(crate) struct RoleIdArgs {
    #[arg(
        value_parser = NonEmptyStringValueParser::new(),
        help = "Role identifier, e.g. admin@sdn"
    )]
    pub(crate) roleid: String,
}

#[derive(Args)]
pub(crate) struct GrantArgs {
    #[arg(
        value_parser = NonEmptyStringValueParser::new(),
        help = "User identifier, e.g. bob@sdn"
    )]
    pub(crate) userid: String,
    #[arg(
        value_parser = NonEmptyStringValueParser::new(),
        help = "Role identifier, e.g. admin@sdn"
    )]
    pub(crate) roleid: String,
}

#[derive(Args)]
pub(crate) struct TokenArgs {
    #[arg(
        value_parser = NonEmptyStringValueParser::new(),
        help = "Domain for the token scope"
    )]
    pub(crate) scope: String,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Rest(RestCommand::ListUsers) => "list_users",
        Command::Rest(RestCommand::AddUser(_)) => "add_user",
        Command::Rest(RestCommand::ChangePassword(_)) => "change_password",
        Command::Rest(RestCommand::DeleteUser(_)) => "delete_user",
        Command::Rest(RestCommand::ListDomains) => "list_domains",
        Command::Rest(RestCommand::ListRoles) => "list_roles",
        Command::Rest(RestCommand::AddRole(_)) => "add_role",
        Command::Rest(RestCommand::DeleteRole(_)) => "delete_role",
        Command::Rest(RestCommand::AddGrant(_)) => "add_grant",
        Command::Rest(RestCommand::GetGrants(_)) => "get_grants",
        Command::Rest(RestCommand::DeleteGrant(_)) => "delete_grant",
        Command::Rest(RestCommand::GetOauth2Token(_)) => "get_oauth2_token",
        Command::ChangeJolokiaPassword => "change_jolokia_password",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::testing::ScriptedPrompt;
    use anyhow::{Result, anyhow};
    use httpmock::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Result<Cli> {
        Cli::try_parse_from(args).map_err(|err| anyhow!("parse failed: {err}"))
    }

    fn deps() -> Result<CliDependencies> {
        let cli = parse(&["idmtool", "admin", "list-users"])?;
        CliDependencies::from_cli(&cli, "trace").map_err(|err| anyhow!("{err}"))
    }

    #[test]
    fn parses_global_flags_after_subcommand() -> Result<()> {
        let cli = parse(&[
            "idmtool",
            "admin",
            "add-grant",
            "bob@sdn",
            "admin@sdn",
            "--target-host",
            "https://10.0.0.2:8443",
            "-k",
        ])?;
        assert_eq!(cli.user, "admin");
        assert_eq!(cli.target_host.as_deref(), Some("https://10.0.0.2:8443"));
        assert!(cli.insecure);
        assert_eq!(cli.log_level, DEFAULT_LOG_LEVEL);
        match cli.command {
            Command::Rest(RestCommand::AddGrant(args)) => {
                assert_eq!(args.userid, "bob@sdn");
                assert_eq!(args.roleid, "admin@sdn");
            }
            _ => return Err(anyhow!("expected add-grant")),
        }
        Ok(())
    }

    #[test]
    fn token_subcommand_keeps_oauth2_spelling() -> Result<()> {
        let cli = parse(&["idmtool", "admin", "get-oauth2-token", "sdn"])?;
        assert_eq!(command_label(&cli.command), "get_oauth2_token");
        Ok(())
    }

    #[test]
    fn jolokia_command_is_separate_from_rest_commands() -> Result<()> {
        let local = parse(&["idmtool", "admin", "change-jolokia-password"])?;
        assert!(matches!(local.command, Command::ChangeJolokiaPassword));

        let rest = parse(&["idmtool", "admin", "list-roles"])?;
        assert!(matches!(
            rest.command,
            Command::Rest(RestCommand::ListRoles)
        ));
        Ok(())
    }

    #[test]
    fn optional_descriptions_default_to_empty() -> Result<()> {
        let cli = parse(&["idmtool", "admin", "add-user", "alice", "--email", "a@x.org"])?;
        match cli.command {
            Command::Rest(RestCommand::AddUser(args)) => {
                assert_eq!(args.new_user, "alice");
                assert_eq!(args.description, "");
                assert_eq!(args.email, "a@x.org");
            }
            _ => return Err(anyhow!("expected add-user")),
        }
        Ok(())
    }

    #[test]
    fn identifier_arity_is_enforced() {
        assert!(Cli::try_parse_from(["idmtool", "admin", "delete-user"]).is_err());
        assert!(Cli::try_parse_from(["idmtool", "admin", "add-grant", "bob@sdn"]).is_err());
        assert!(Cli::try_parse_from(["idmtool", "admin", "list-users", "extra"]).is_err());
        assert!(Cli::try_parse_from(["idmtool", "admin", "delete-role", ""]).is_err());
    }

    #[test]
    fn missing_subcommand_exits_with_failure() {
        match Cli::try_parse_from(["idmtool", "admin"]) {
            Ok(_) => panic!("missing subcommand must not parse"),
            Err(err) => assert_ne!(err.kind(), ErrorKind::DisplayHelp),
        }
    }

    #[test]
    fn help_and_version_are_not_failures() {
        for flag in ["--help", "--version"] {
            match Cli::try_parse_from(["idmtool", flag]) {
                Ok(_) => panic!("{flag} must short-circuit parsing"),
                Err(err) => assert!(matches!(
                    err.kind(),
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
                )),
            }
        }
    }

    #[tokio::test]
    async fn dispatch_prompts_once_and_uses_override() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/auth/v1/domains")
                .header("authorization", "Basic YWRtaW46c2VjcmV0")
                .header_exists("x-request-id");
            then.status(200).json_body(serde_json::json!({"domains": []}));
        });

        let base = server.base_url();
        let cli = parse(&["idmtool", "admin", "list-domains", "--target-host", &base])?;
        let prompt = ScriptedPrompt::new(["secret"]);
        dispatch(cli, &deps()?, Box::new(prompt.clone()))
            .await
            .map_err(|err| anyhow!("{err}"))?;

        mock.assert();
        assert_eq!(prompt.asked(), vec![ACTING_PASSWORD_PROMPT.to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn jolokia_rotation_skips_acting_password() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join(JOLOKIA_CFG_FILENAME);
        fs::write(&path, "authMode=basic\npassword=old\n")?;
        let etc = dir.path().to_string_lossy().into_owned();

        let cli = parse(&["idmtool", "admin", "change-jolokia-password", "--etc-dir", &etc])?;
        let prompt = ScriptedPrompt::new(["newpw", "newpw"]);
        dispatch(cli, &deps()?, Box::new(prompt.clone()))
            .await
            .map_err(|err| anyhow!("{err}"))?;

        assert!(!prompt.asked().contains(&ACTING_PASSWORD_PROMPT.to_string()));
        assert_eq!(fs::read_to_string(&path)?, "authMode=basic\npassword=newpw\n");
        Ok(())
    }

    #[tokio::test]
    async fn invalid_override_fails_before_prompting() -> Result<()> {
        let cli = parse(&["idmtool", "admin", "list-users", "--target-host", "not a url"])?;
        let prompt = ScriptedPrompt::new([]);
        let result = dispatch(cli, &deps()?, Box::new(prompt.clone())).await;
        assert!(matches!(result, Err(CliError::Config(_))));
        assert!(prompt.asked().is_empty());
        Ok(())
    }
}
