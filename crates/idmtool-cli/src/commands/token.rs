use crate::cli::TokenArgs;
use crate::client::{AppContext, CliResult, Credentials};
use crate::commands::{announce, submit};
use crate::transport::ApiRequest;

/// Password grant against `oauth2/token`. The credentials travel in the form
/// body, so no basic-auth header is sent.
pub(crate) async fn handle_get_oauth2_token(ctx: &AppContext, args: TokenArgs) -> CliResult<()> {
    let url = ctx.target.endpoint(&["oauth2", "token"])?;
    announce(&format!("get_oauth2_token(scope={})", args.scope), Some(&url));
    submit(
        ctx,
        ApiRequest::post(url).form(token_form(&ctx.credentials, &args.scope)),
    )
    .await
}

fn token_form(credentials: &Credentials, scope: &str) -> Vec<(&'static str, String)> {
    vec![
        ("grant_type", "password".to_string()),
        ("username", credentials.username.clone()),
        ("password", credentials.password.expose().to_string()),
        ("scope", scope.to_string()),
    ]
}
