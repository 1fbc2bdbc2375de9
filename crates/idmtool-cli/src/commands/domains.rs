use crate::client::{AppContext, CliResult};
use crate::commands::{announce, auth_endpoint, submit};
use crate::transport::ApiRequest;

pub(crate) async fn handle_list_domains(ctx: &AppContext) -> CliResult<()> {
    let url = auth_endpoint(ctx, &["domains"])?;
    announce("list_domains", Some(&url));
    submit(ctx, ApiRequest::get(url).basic_auth(&ctx.credentials)).await
}
