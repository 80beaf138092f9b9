//! Keycloak authorization-code flow with PKCE as the [`Authenticator`] port.
//!
//! The operator's browser is sent to the realm's authorization endpoint; the
//! redirect lands on a one-shot listener on `127.0.0.1`. Id tokens are cached
//! next to the config file and reused until shortly before they expire.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use axum::Router;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use rand::RngCore;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::application::ports::Authenticator;
use crate::domain::{IdentityToken, PkceConfig};
use crate::infra::config::write_private;

/// Cached tokens are treated as expired this long before they actually are.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// How long to wait for the browser redirect.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

const CALLBACK_PATH: &str = "/callback";

const CALLBACK_PAGE: &str = "<html><body><p>Login complete. You can close this window.</p></body></html>";

/// Browser login against Keycloak with an on-disk token cache.
#[derive(Debug, Clone)]
pub struct KeycloakPkceAuthenticator {
    cache_path: PathBuf,
    http: reqwest::Client,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedToken {
    issuer: String,
    client_id: String,
    id_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: Option<String>,
    expires_in: Option<i64>,
}

/// PKCE verifier and its S256 challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    /// Fresh verifier from 32 random bytes.
    pub fn generate(rng: &mut impl RngCore) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self::from_verifier(URL_SAFE_NO_PAD.encode(bytes))
    }

    #[must_use]
    pub fn from_verifier(verifier: String) -> Self {
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Self {
            verifier,
            challenge,
        }
    }
}

impl KeycloakPkceAuthenticator {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(cache_path: PathBuf) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("cannot build HTTP client")?;
        Ok(Self { cache_path, http })
    }

    fn cached(&self, pkce: &PkceConfig) -> Option<IdentityToken> {
        let content = std::fs::read_to_string(&self.cache_path).ok()?;
        let cached: CachedToken = serde_json::from_str(&content).ok()?;
        let usable = cached.issuer == pkce.issuer()
            && cached.client_id == pkce.client_id
            && cached.expires_at - chrono::Duration::seconds(EXPIRY_MARGIN_SECS) > Utc::now();
        usable.then(|| IdentityToken::new(cached.id_token))
    }

    fn store(&self, pkce: &PkceConfig, id_token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let cached = CachedToken {
            issuer: pkce.issuer(),
            client_id: pkce.client_id.clone(),
            id_token: id_token.to_string(),
            expires_at,
        };
        let content = serde_json::to_string(&cached).context("cannot serialize token cache")?;
        write_private(&self.cache_path, &content)
    }

    async fn login(&self, pkce: &PkceConfig) -> Result<(String, DateTime<Utc>)> {
        let pair = PkcePair::generate(&mut rand::rng());
        let mut state_bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut state_bytes);
        let state = URL_SAFE_NO_PAD.encode(state_bytes);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("cannot bind login callback listener")?;
        let port = listener.local_addr().context("cannot read listener address")?.port();
        let redirect_uri = format!("http://127.0.0.1:{port}{CALLBACK_PATH}");

        let auth_url = authorization_url(pkce, &redirect_uri, &pair.challenge, &state)?;
        eprintln!("Open this URL in your browser to log in:\n\n  {auth_url}\n");

        let code = tokio::time::timeout(LOGIN_TIMEOUT, await_callback(listener, state))
            .await
            .context("timed out waiting for browser login")??;
        debug!("received authorization code");

        let resp = self
            .http
            .post(format!("{}/protocol/openid-connect/token", pkce.issuer()))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("client_id", pkce.client_id.as_str()),
                ("code_verifier", pair.verifier.as_str()),
            ])
            .send()
            .await
            .context("token request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("token endpoint returned {status}: {body}");
        }
        let token: TokenResponse = resp.json().await.context("cannot decode token response")?;
        let id_token = token
            .id_token
            .filter(|t| !t.is_empty())
            .context("token response has no id_token")?;
        let expires_at = Utc::now() + chrono::Duration::seconds(token.expires_in.unwrap_or(300));
        Ok((id_token, expires_at))
    }
}

impl Authenticator for KeycloakPkceAuthenticator {
    async fn identity_token(&self, pkce: &PkceConfig, force_fresh: bool) -> Result<IdentityToken> {
        if !force_fresh {
            if let Some(token) = self.cached(pkce) {
                debug!(cache = %self.cache_path.display(), "reusing cached id token");
                return Ok(token);
            }
        }
        let (id_token, expires_at) = self.login(pkce).await?;
        if let Err(e) = self.store(pkce, &id_token, expires_at) {
            warn!(cache = %self.cache_path.display(), error = %e, "cannot write token cache");
        }
        Ok(IdentityToken::new(id_token))
    }
}

/// Authorization endpoint URL for one login attempt.
///
/// # Errors
///
/// Returns an error if the configured Keycloak URL is not a valid URL.
pub fn authorization_url(
    pkce: &PkceConfig,
    redirect_uri: &str,
    challenge: &str,
    state: &str,
) -> Result<Url> {
    Url::parse_with_params(
        &format!("{}/protocol/openid-connect/auth", pkce.issuer()),
        &[
            ("response_type", "code"),
            ("client_id", pkce.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", "openid"),
            ("code_challenge", challenge),
            ("code_challenge_method", "S256"),
            ("state", state),
        ],
    )
    .context("invalid keycloak_url")
}

/// Query parameters of the authorization redirect.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

struct CallbackState {
    expected_state: String,
    result: Mutex<Option<oneshot::Sender<Result<String>>>>,
}

async fn callback(
    State(shared): State<Arc<CallbackState>>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    let result = check_callback(params, &shared.expected_state);
    let sender = shared.result.lock().ok().and_then(|mut slot| slot.take());
    if let Some(sender) = sender {
        let _ = sender.send(result);
    }
    Html(CALLBACK_PAGE)
}

/// Serve `/callback` on `listener` until the first redirect arrives and
/// return its authorization code. Other paths get a 404.
async fn await_callback(listener: TcpListener, expected_state: String) -> Result<String> {
    let (tx, rx) = oneshot::channel();
    let shared = Arc::new(CallbackState {
        expected_state,
        result: Mutex::new(Some(tx)),
    });
    let router = Router::new()
        .route(CALLBACK_PATH, get(callback))
        .with_state(shared);

    let shutdown = CancellationToken::new();
    let _stop_on_drop = shutdown.clone().drop_guard();
    let server = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await
        }
    });

    let result = rx.await.context("login callback listener stopped");
    shutdown.cancel();
    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(error = %e, "login callback server failed"),
        Err(e) => debug!(error = %e, "login callback server panicked"),
    }
    result?
}

/// Extract the authorization code from the redirect parameters.
///
/// # Errors
///
/// Returns an error when the provider reported an error, the state does not
/// match, or no code is present.
pub fn check_callback(params: CallbackParams, expected_state: &str) -> Result<String> {
    if let Some(error) = params.error_description.or(params.error) {
        bail!("login failed: {error}");
    }
    if params.state.as_deref() != Some(expected_state) {
        bail!("login callback state mismatch");
    }
    params
        .code
        .filter(|c| !c.is_empty())
        .context("login callback carried no code")
}
