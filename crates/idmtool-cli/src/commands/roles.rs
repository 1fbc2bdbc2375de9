use serde_json::{Value, json};

use crate::cli::{AddRoleArgs, RoleIdArgs};
use crate::client::{AppContext, CliResult, DOMAIN};
use crate::commands::{announce, auth_endpoint, submit};
use crate::transport::ApiRequest;

const ROLES: &str = "roles";

pub(crate) async fn handle_list_roles(ctx: &AppContext) -> CliResult<()> {
    let url = auth_endpoint(ctx, &[ROLES])?;
    announce("list_roles", Some(&url));
    submit(ctx, ApiRequest::get(url).basic_auth(&ctx.credentials)).await
}

pub(crate) async fn handle_add_role(ctx: &AppContext, args: AddRoleArgs) -> CliResult<()> {
    let url = auth_endpoint(ctx, &[ROLES])?;
    announce(&format!("add_role({})", args.role), None);
    submit(
        ctx,
        ApiRequest::post(url)
            .basic_auth(&ctx.credentials)
            .json(role_payload(&args)),
    )
    .await
}

pub(crate) async fn handle_delete_role(ctx: &AppContext, args: RoleIdArgs) -> CliResult<()> {
    let url = auth_endpoint(ctx, &[ROLES, args.roleid.as_str()])?;
    announce(&format!("delete_role({})", args.roleid), Some(&url));
    submit(ctx, ApiRequest::delete(url).basic_auth(&ctx.credentials)).await
}

fn role_payload(args: &AddRoleArgs) -> Value {
    json!({
        "name": args.role,
        "description": args.description,
        "domainid": DOMAIN,
    })
}
