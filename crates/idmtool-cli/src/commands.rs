//! Command handlers, one module per AAA resource.
//!
//! Every REST command follows the same shape: build an [`ApiRequest`], print
//! the description line, execute once, render the outcome.

pub(crate) mod domains;
pub(crate) mod grants;
pub(crate) mod jolokia;
pub(crate) mod roles;
pub(crate) mod token;
pub(crate) mod users;

use url::Url;

use crate::client::{AppContext, CliResult};
use crate::output::render_success;
use crate::transport::{ApiRequest, execute};

const AUTH_V1: [&str; 2] = ["auth", "v1"];

/// URL under `auth/v1/` for the given resource path.
pub(crate) fn auth_endpoint(ctx: &AppContext, segments: &[&str]) -> CliResult<Url> {
    let path: Vec<&str> = AUTH_V1.iter().chain(segments).copied().collect();
    Ok(ctx.target.endpoint(&path)?)
}

/// Print the description and, when the command exposes it, the request URL.
pub(crate) fn announce(description: &str, url: Option<&Url>) {
    println!("{description}");
    if let Some(url) = url {
        println!("{url}");
    }
}

/// Execute a request and render its body on success.
pub(crate) async fn submit(ctx: &AppContext, request: ApiRequest) -> CliResult<()> {
    let body = execute(&ctx.client, request).await.into_result()?;
    render_success(body.as_ref())
}

#[cfg(test)]
pub(crate) mod testing {
    use anyhow::{Result, anyhow};
    use httpmock::MockServer;
    use idmtool_config::Target;
    use reqwest::Client;

    use crate::client::{AppContext, Credentials, Password};
    use crate::prompt::testing::ScriptedPrompt;

    /// `Authorization` value for `admin:admin`.
    pub(crate) const ADMIN_BASIC: &str = "Basic YWRtaW46YWRtaW4=";

    pub(crate) fn context<const N: usize>(
        server: &MockServer,
        answers: [&str; N],
    ) -> Result<AppContext> {
        let target = Target::from_override(&server.base_url())
            .map_err(|err| anyhow!("mock server URL rejected: {err}"))?;
        Ok(AppContext {
            client: Client::new(),
            target,
            credentials: Credentials {
                username: "admin".to_string(),
                password: Password::new("admin"),
            },
            prompt: Box::new(ScriptedPrompt::new(answers)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::testing::context;
    use super::*;
    use anyhow::Result;
    use httpmock::MockServer;

    #[tokio::test]
    async fn auth_endpoint_keeps_identifiers_intact() -> Result<()> {
        let server = MockServer::start_async().await;
        let ctx = context(&server, [])?;
        let url = auth_endpoint(&ctx, &["domains", "sdn", "users", "bob@sdn", "roles"])?;
        assert_eq!(
            url.as_str(),
            server.url("/auth/v1/domains/sdn/users/bob@sdn/roles")
        );
        Ok(())
    }
}
