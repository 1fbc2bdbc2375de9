use serde_json::{Map, Value, json};
use tracing::debug;

use crate::cli::{AddUserArgs, UserIdArgs};
use crate::client::{AppContext, CliError, CliResult, DOMAIN, Password};
use crate::commands::{announce, auth_endpoint, submit};
use crate::prompt::poll_new_password;
use crate::transport::{ApiRequest, execute};

const USERS: &str = "users";

pub(crate) async fn handle_list_users(ctx: &AppContext) -> CliResult<()> {
    let url = auth_endpoint(ctx, &[USERS])?;
    announce("list_users", Some(&url));
    submit(ctx, ApiRequest::get(url).basic_auth(&ctx.credentials)).await
}

pub(crate) async fn handle_add_user(ctx: &AppContext, args: AddUserArgs) -> CliResult<()> {
    let new_password = poll_new_password(ctx.prompt.as_ref())?;
    let url = auth_endpoint(ctx, &[USERS])?;
    let payload = new_user_payload(&args, &new_password);
    announce(&format!("add_user({})", args.new_user), None);
    submit(
        ctx,
        ApiRequest::post(url).basic_auth(&ctx.credentials).json(payload),
    )
    .await
}

pub(crate) async fn handle_delete_user(ctx: &AppContext, args: UserIdArgs) -> CliResult<()> {
    let url = auth_endpoint(ctx, &[USERS, args.userid.as_str()])?;
    announce(&format!("delete_user({})", args.userid), Some(&url));
    submit(ctx, ApiRequest::delete(url).basic_auth(&ctx.credentials)).await
}

/// Read-modify-write of the user record with a freshly entered password.
///
/// The record is fetched silently; a failed fetch, a missing body, or a body
/// that is not a JSON object ends the command before any prompt. The PUT goes
/// to the same URL the record was read from.
pub(crate) async fn handle_change_password(ctx: &AppContext, args: UserIdArgs) -> CliResult<()> {
    let url = auth_endpoint(ctx, &[USERS, args.userid.as_str()])?;
    let fetched = execute(
        &ctx.client,
        ApiRequest::get(url.clone()).basic_auth(&ctx.credentials),
    )
    .await
    .into_result()?;
    let record = user_record(&args.userid, fetched)?;
    debug!(userid = %args.userid, "fetched user record");

    let new_password = poll_new_password(ctx.prompt.as_ref())?;
    let payload = with_new_password(record, &new_password);
    announce(&format!("change_password({})", args.userid), None);
    submit(
        ctx,
        ApiRequest::put(url).basic_auth(&ctx.credentials).json(payload),
    )
    .await
}

fn new_user_payload(args: &AddUserArgs, password: &Password) -> Value {
    json!({
        "name": args.new_user,
        "password": password.expose(),
        "description": args.description,
        "domainid": DOMAIN,
        "email": args.email,
    })
}

fn user_record(userid: &str, body: Option<Value>) -> CliResult<Map<String, Value>> {
    match body {
        Some(Value::Object(record)) => Ok(record),
        _ => Err(CliError::MalformedRecord(format!(
            "unable to read user record for {userid}; the server is unreachable or returned a malformed response"
        ))),
    }
}

/// Drop the stored hash and salt, then set the new password. Other fields pass through.
fn with_new_password(mut record: Map<String, Value>, password: &Password) -> Value {
    record.remove("salt");
    record.remove("password");
    record.insert(
        "password".to_string(),
        Value::String(password.expose().to_string()),
    );
    Value::Object(record)
}
