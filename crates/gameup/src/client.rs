//! `GameUpClient`: one object that wires the layers together.
//!
//! ```text
//! GameUpClient
//!   ├── ApiClient<B>          (typed REST calls)
//!   ├── SessionStore<S>       (token, signed-in state)
//!   ├── LibrarySynchronizer   (local copy of the backlog)
//!   └── RecommendationCache   (last AI suggestions)
//! ```
//!
//! The API client and the session store are shared through `Arc` with the
//! synchronizer and with every search session, so there is exactly one of
//! each per client.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future;
use gameup_library::LibrarySynchronizer;
use gameup_protocol::{
    ApiClient, ApiError, CatalogItemId, CatalogItemSummary, CurrentUser, GameDetails,
    LibraryStatus, LoginRequest, Profile, Recommendation,
};
use gameup_search::SearchSession;
use gameup_session::{
    FileStore, KeyValueStore, RecommendationCache, SessionState, SessionStore,
};
use gameup_transport::{Backend, HttpBackend, HttpBackendConfig};

use crate::navigation::{self, Resolution};
use crate::{ClientConfig, ClientError, RegistrationForm, ValidationErrors};

/// Used when the platform has no data directory.
const FALLBACK_STORAGE_FILE: &str = "gameup-storage.json";

/// The answer to a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// The backend's confirmation text.
    pub message: String,
    /// `true` if the backend also issued a token and the session is now
    /// open.
    pub signed_in: bool,
}

/// Everything a game detail page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameView {
    pub details: GameDetails,
    /// Whether the game is in the library. `None` when signed out, or when
    /// the status could not be loaded.
    pub library: Option<LibraryStatus>,
}

/// The Game Up client.
///
/// Generic over the [`Backend`] (HTTP in production, a test double in
/// tests) and the durable [`KeyValueStore`] that holds the token.
#[derive(Debug)]
pub struct GameUpClient<B, S> {
    api: Arc<ApiClient<B>>,
    session: Arc<SessionStore<S>>,
    library: LibrarySynchronizer<B, S>,
    recommendations: RecommendationCache,
    /// `SessionStore::sign_outs` as of the last cache sweep.
    swept_sign_outs: AtomicU64,
    config: ClientConfig,
}

impl GameUpClient<HttpBackend, FileStore> {
    /// Builds a client that talks HTTP to `config.api_url` and keeps its
    /// token in a file.
    ///
    /// Nothing is read or sent yet; call [`restore`](Self::restore) (or
    /// just [`navigate`](Self::navigate)) to pick up an existing session.
    ///
    /// # Errors
    /// [`ClientError::Network`] if the API URL is invalid.
    pub fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let backend = HttpBackend::with_config(
            &config.api_url,
            HttpBackendConfig {
                timeout: config.request_timeout,
                ..HttpBackendConfig::default()
            },
        )
        .map_err(ClientError::Network)?;

        let path = config
            .storage_path
            .clone()
            .or_else(FileStore::default_path)
            .unwrap_or_else(|| {
                tracing::warn!("no data directory, storing session in the working directory");
                PathBuf::from(FALLBACK_STORAGE_FILE)
            });
        tracing::info!(api_url = %config.api_url, storage = %path.display(), "client configured");

        Ok(Self::new(ApiClient::new(backend), FileStore::new(path), config))
    }
}

impl<B: Backend, S: KeyValueStore> GameUpClient<B, S> {
    /// Wires a client from parts.
    pub fn new(api: ApiClient<B>, storage: S, config: ClientConfig) -> Self {
        let api = Arc::new(api);
        let session = Arc::new(SessionStore::new(storage));
        let library = LibrarySynchronizer::new(Arc::clone(&api), Arc::clone(&session));
        Self {
            api,
            session,
            library,
            recommendations: RecommendationCache::new(),
            swept_sign_outs: AtomicU64::new(0),
            config,
        }
    }

    // -- Session ----------------------------------------------------------

    /// Reads the stored token and publishes the resulting state.
    pub async fn restore(&self) -> SessionState {
        self.session.restore().await
    }

    /// Resolves `path` against the navigation guard, restoring the session
    /// first if that has not happened yet.
    pub async fn navigate(&self, path: &str) -> Resolution {
        let state = self.session.ensure_restored().await;
        navigation::resolve(path, state.is_authenticated())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// The shared session store, for subscribing to state changes.
    pub fn session(&self) -> &Arc<SessionStore<S>> {
        &self.session
    }

    /// Creates an account.
    ///
    /// The form is checked locally first; if that fails nothing is sent.
    /// When the backend's reply carries a token the session is opened
    /// right away.
    ///
    /// # Errors
    /// - [`ClientError::Validation`]: the form failed local checks
    /// - [`ClientError::Conflict`]: username or email already taken
    /// - [`ClientError::Server`], [`ClientError::Network`]
    pub async fn register(&self, form: &RegistrationForm) -> Result<Registration, ClientError> {
        form.validate().map_err(ClientError::Validation)?;

        let reply = self.api.register(&form.to_request()).await?;
        let signed_in = match reply.token.as_deref() {
            Some(token) => {
                self.session.login(token).await?;
                true
            }
            None => false,
        };
        tracing::info!(username = %form.username.trim(), signed_in, "account registered");
        Ok(Registration {
            message: reply.message,
            signed_in,
        })
    }

    /// Logs in with a username or email address.
    ///
    /// # Errors
    /// - [`ClientError::Validation`]: a field is blank; nothing was sent
    /// - [`ClientError::InvalidCredentials`]: the backend refused; the
    ///   session is unchanged
    /// - [`ClientError::Server`], [`ClientError::Network`]
    pub async fn login(&self, identifier: &str, password: &str) -> Result<(), ClientError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(ClientError::Validation(ValidationErrors {
                username: identifier
                    .is_empty()
                    .then(|| "Username or email is required".to_string()),
                email: None,
                password: password
                    .is_empty()
                    .then(|| "Password is required".to_string()),
            }));
        }

        let body = LoginRequest {
            identifier: identifier.to_string(),
            password: password.to_string(),
        };
        let reply = match self.api.login(&body).await {
            Ok(reply) => reply,
            Err(ApiError::Unauthorized(message)) => {
                tracing::info!(identifier, "login refused");
                return Err(ClientError::InvalidCredentials(message));
            }
            Err(e) => return Err(e.into()),
        };

        self.session.login(&reply.token).await?;
        Ok(())
    }

    /// Ends the session: deletes the token and forgets everything that
    /// belonged to the user.
    ///
    /// Local state is cleared even if deleting the token fails.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.session.logout().await;
        self.forget_user_data().await;
        result.map_err(ClientError::from)
    }

    // -- Account ----------------------------------------------------------

    /// The signed-in user's name.
    pub async fn me(&self) -> Result<CurrentUser, ClientError> {
        let token = self.token().await?;
        let result = self.api.me(&token).await;
        self.settle(result).await
    }

    /// The signed-in user's profile.
    pub async fn profile(&self) -> Result<Profile, ClientError> {
        let token = self.token().await?;
        let result = self.api.profile(&token).await;
        self.settle(result).await
    }

    // -- Catalog ----------------------------------------------------------

    /// One-shot catalog search. A blank query returns nothing without a
    /// request. For search-as-you-type use
    /// [`search_session`](Self::search_session).
    pub async fn search(&self, text: &str) -> Result<Vec<CatalogItemSummary>, ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.api.search(text).await?)
    }

    /// A search-as-you-type session sharing this client's backend.
    pub fn search_session(&self) -> SearchSession {
        SearchSession::spawn(Arc::clone(&self.api), self.config.search_config())
    }

    /// Loads a game detail page.
    ///
    /// When signed in, the catalog details and the library status are
    /// fetched concurrently. A failure to load the status does not fail
    /// the page; it just shows without it.
    ///
    /// # Errors
    /// [`ClientError::NotFound`] if the catalog has no such game, or the
    /// usual network and server errors.
    pub async fn game(&self, id: CatalogItemId) -> Result<GameView, ClientError> {
        let Some(token) = self.session.token().await else {
            let details = self.api.game(id).await?;
            return Ok(GameView {
                details,
                library: None,
            });
        };

        let (details, status) =
            future::join(self.api.game(id), self.api.library_status(&token, id)).await;
        let library = match status {
            Ok(status) => Some(status),
            Err(e) if e.is_unauthorized() => {
                let error = self.reject(e).await;
                tracing::debug!(%id, %error, "signed out while loading game page");
                None
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "could not load library status");
                None
            }
        };
        Ok(GameView {
            details: details?,
            library,
        })
    }

    // -- Library ----------------------------------------------------------

    /// The library synchronizer for this session.
    pub fn library(&self) -> &LibrarySynchronizer<B, S> {
        &self.library
    }

    // -- Recommendations --------------------------------------------------

    /// Asks the backend for AI recommendations and caches them.
    ///
    /// Recommendations are based on completed games, so a profile with
    /// none is refused before any request is made.
    ///
    /// # Errors
    /// - [`ClientError::NoCompletedGames`]: the profile has none (nothing
    ///   was sent), or the backend answered 400 because it counted none
    /// - [`ClientError::Auth`], [`ClientError::Server`], [`ClientError::Network`]
    pub async fn recommendations(
        &self,
        profile: &Profile,
    ) -> Result<Vec<Recommendation>, ClientError> {
        if profile.completed_games_count == 0 {
            return Err(ClientError::NoCompletedGames);
        }
        self.sweep_recommendations().await;
        let token = self.token().await?;
        let items = match self.api.recommendations(&token).await {
            Ok(items) => items,
            // The backend counted no completed games; the profile passed in
            // was out of date.
            Err(ApiError::BadRequest(message)) => {
                tracing::info!(message = message.as_deref().unwrap_or(""), "no completed games");
                return Err(ClientError::NoCompletedGames);
            }
            Err(e) => return Err(self.reject(e).await),
        };

        if let Err(e) = self.recommendations.store(&items).await {
            tracing::warn!(error = %e, "could not cache recommendations");
        }
        tracing::info!(count = items.len(), "recommendations received");
        Ok(items)
    }

    /// The recommendations from the last successful request, if any.
    pub async fn cached_recommendations(&self) -> Vec<Recommendation> {
        self.sweep_recommendations().await;
        self.recommendations.load().await
    }

    // -- Plumbing ---------------------------------------------------------

    async fn token(&self) -> Result<String, ClientError> {
        self.session.token().await.ok_or(ClientError::Auth)
    }

    async fn settle<T>(&self, result: Result<T, ApiError>) -> Result<T, ClientError> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => Err(self.reject(e).await),
        }
    }

    /// Converts a failed authenticated call, signing out on a 401.
    async fn reject(&self, error: ApiError) -> ClientError {
        if !error.is_unauthorized() {
            return error.into();
        }
        let reason = error.server_message().unwrap_or("token rejected");
        let invalidated = self.session.invalidate(reason).await;
        self.forget_user_data().await;
        match invalidated {
            Ok(()) => ClientError::Auth,
            Err(e) => e.into(),
        }
    }

    /// Drops cached recommendations if the session has ended since the
    /// last sweep. Catches sign-outs that did not go through this client,
    /// such as a 401 seen by the library synchronizer.
    async fn sweep_recommendations(&self) {
        let sign_outs = self.session.sign_outs();
        if self.swept_sign_outs.swap(sign_outs, Ordering::AcqRel) == sign_outs {
            return;
        }
        tracing::debug!(sign_outs, "session ended since last sweep, dropping recommendations");
        if let Err(e) = self.recommendations.clear().await {
            tracing::warn!(error = %e, "could not clear recommendation cache");
        }
    }

    async fn forget_user_data(&self) {
        self.library.clear();
        if let Err(e) = self.recommendations.clear().await {
            tracing::warn!(error = %e, "could not clear recommendation cache");
        }
    }
}
