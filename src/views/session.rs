use anyhow::{Context, Result};
use reqwest::Url;
use std::sync::Arc;
use tracing::info;

use crate::api::TrackerApi;

const TOKEN_PARAM: &str = "token";

pub struct Session {
    api: Arc<dyn TrackerApi>,
    authenticated: bool,
}

impl Session {
    /// Signed in iff the client already holds a token.
    pub fn restore(api: Arc<dyn TrackerApi>) -> Self {
        let authenticated = api.token().is_some();
        Self { api, authenticated }
    }

    /// Starts a session from the URL the OAuth flow redirected to. A `token`
    /// query parameter is stored and the returned URL no longer carries it;
    /// without one the session falls back to [`Session::restore`].
    pub fn from_url(api: Arc<dyn TrackerApi>, current_url: &str) -> Result<(Self, String)> {
        let (token, cleaned) = take_token(current_url)?;
        match token {
            Some(token) => {
                api.set_token(Some(token))?;
                info!("Signed in from OAuth callback");
                Ok((
                    Self {
                        api,
                        authenticated: true,
                    },
                    cleaned,
                ))
            }
            None => Ok((Self::restore(api), current_url.to_string())),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Where the user has to go to sign in.
    pub async fn login(&self) -> Result<String> {
        let login = self.api.login_url().await.context("Login failed")?;
        Ok(login.url)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.api.set_token(None)?;
        self.authenticated = false;
        info!("Signed out");
        Ok(())
    }
}

/// Splits the `token` query parameter off `url`. When present, the cleaned
/// URL keeps only scheme, host and path.
pub fn take_token(url: &str) -> Result<(Option<String>, String)> {
    let mut parsed = Url::parse(url).with_context(|| format!("invalid callback URL '{url}'"))?;
    let token = parsed
        .query_pairs()
        .find(|(k, v)| k == TOKEN_PARAM && !v.is_empty())
        .map(|(_, v)| v.into_owned());
    if token.is_none() {
        return Ok((None, url.to_string()));
    }
    parsed.set_query(None);
    parsed.set_fragment(None);
    Ok((token, parsed.to_string()))
}
