use serde_json::{Value, json};

use crate::cli::{GrantArgs, UserIdArgs};
use crate::client::{AppContext, CliResult, DOMAIN};
use crate::commands::{announce, auth_endpoint, submit};
use crate::transport::ApiRequest;

const DOMAINS: &str = "domains";
const USERS: &str = "users";
const ROLES: &str = "roles";

pub(crate) async fn handle_add_grant(ctx: &AppContext, args: GrantArgs) -> CliResult<()> {
    let url = auth_endpoint(ctx, &[DOMAINS, DOMAIN, USERS, args.userid.as_str(), ROLES])?;
    let payload = grant_payload(&args);
    announce(&grant_description("add_grant", &args), Some(&url));
    println!("{payload}");
    submit(
        ctx,
        ApiRequest::post(url)
            .basic_auth(&ctx.credentials)
            .json(payload),
    )
    .await
}

pub(crate) async fn handle_get_grants(ctx: &AppContext, args: UserIdArgs) -> CliResult<()> {
    let url = auth_endpoint(ctx, &[DOMAINS, DOMAIN, USERS, args.userid.as_str(), ROLES])?;
    announce(&format!("get_grants({})", args.userid), Some(&url));
    submit(ctx, ApiRequest::get(url).basic_auth(&ctx.credentials)).await
}

pub(crate) async fn handle_delete_grant(ctx: &AppContext, args: GrantArgs) -> CliResult<()> {
    let url = auth_endpoint(
        ctx,
        &[
            DOMAINS,
            DOMAIN,
            USERS,
            args.userid.as_str(),
            ROLES,
            args.roleid.as_str(),
        ],
    )?;
    announce(&grant_description("delete_grant", &args), Some(&url));
    submit(ctx, ApiRequest::delete(url).basic_auth(&ctx.credentials)).await
}

fn grant_description(action: &str, args: &GrantArgs) -> String {
    format!("{action}(userid={},roleid={})", args.userid, args.roleid)
}

fn grant_payload(args: &GrantArgs) -> Value {
    json!({
        "roleid": args.roleid,
        "userid": args.userid,
        "domainid": DOMAIN,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{ADMIN_BASIC, context};
    use anyhow::Result;
    use httpmock::prelude::*;

    fn bob_admin() -> GrantArgs {
        GrantArgs {
            userid: "bob@sdn".to_string(),
            roleid: "admin@sdn".to_string(),
        }
    }

    #[test]
    fn grant_payload_has_exactly_three_keys() {
        let payload = grant_payload(&bob_admin());
        assert_eq!(
            payload,
            json!({"roleid": "admin@sdn", "userid": "bob@sdn", "domainid": "sdn"})
        );
        assert_eq!(payload.as_object().map(serde_json::Map::len), Some(3));
    }

    #[test]
    fn description_names_both_identifiers() {
        assert_eq!(
            grant_description("add_grant", &bob_admin()),
            "add_grant(userid=bob@sdn,roleid=admin@sdn)"
        );
    }

    #[tokio::test]
    async fn add_grant_posts_to_user_roles() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/auth/v1/domains/sdn/users/bob@sdn/roles")
                .header("authorization", ADMIN_BASIC)
                .json_body(json!({"roleid": "admin@sdn", "userid": "bob@sdn", "domainid": "sdn"}));
            then.status(201)
                .json_body(json!({"grantid": "sdn@bob@sdn@admin@sdn"}));
        });

        let ctx = context(&server, [])?;
        handle_add_grant(&ctx, bob_admin()).await?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn get_grants_lists_user_roles() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/auth/v1/domains/sdn/users/bob@sdn/roles");
            then.status(200)
                .json_body(json!({"roles": [{"roleid": "admin@sdn"}]}));
        });

        let ctx = context(&server, [])?;
        handle_get_grants(
            &ctx,
            UserIdArgs {
                userid: "bob@sdn".to_string(),
            },
        )
        .await?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn delete_grant_targets_role_under_user() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(DELETE)
                .path("/auth/v1/domains/sdn/users/bob@sdn/roles/admin@sdn")
                .header("content-type", "application/json");
            then.status(204);
        });

        let ctx = context(&server, [])?;
        handle_delete_grant(&ctx, bob_admin()).await?;
        mock.assert();
        Ok(())
    }
}
