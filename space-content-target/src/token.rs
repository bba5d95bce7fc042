use oauth2::basic::BasicClient;
use oauth2::{AccessToken, AuthType, AuthUrl, ClientId, ClientSecret, Scope, TokenResponse as _, TokenUrl};
use space_content_config::TargetConfig;
use tracing::debug;

use crate::error::TargetError;
use crate::http::oauth2_http_client;

/// Client credentials grant, credentials are sent in the form body.
pub async fn request_access_token(config: &TargetConfig) -> Result<AccessToken, TargetError> {
    // the grant never visits the authorization endpoint
    let client = BasicClient::new(
        ClientId::new(config.client_id.clone()),
        Some(ClientSecret::new(config.client_secret.clone())),
        AuthUrl::new(config.token_url.clone())?,
        Some(TokenUrl::new(config.token_url.clone())?),
    )
    .set_auth_type(AuthType::RequestBody);

    let token_response = client
        .exchange_client_credentials()
        .add_scope(Scope::new(config.scope.clone()))
        .request_async(oauth2_http_client)
        .await?;

    debug!(
        "acquired access token, expires in {:?}",
        token_response.expires_in()
    );

    Ok(token_response.access_token().clone())
}
