//! Typed client for the Game Up REST contract.
//!
//! [`ApiClient`] turns each backend operation into one async method:
//! it builds the [`ApiRequest`], encodes the body with a [`Codec`], runs
//! the exchange on a [`Backend`], and either decodes the success body or
//! sorts the failure into an [`ApiError`].
//!
//! The client holds no session state. Authenticated methods take the
//! bearer token as an argument, so the caller decides where the token
//! comes from (and can read it fresh before every call).

use gameup_transport::{ApiRequest, Backend};
use serde::de::DeserializeOwned;

use crate::{
    AddEntryRequest, AddEntryResponse, ApiError, CatalogItemId, CatalogItemSummary, Codec,
    CurrentUser, EntryId, ErrorBody, GameDetails, GameStatus, JsonCodec, LibraryEntry,
    LibraryStatus, LoginRequest, LoginResponse, Profile, Recommendation, RegisterRequest,
    RegisterResponse, SearchRequest, StatusUpdateRequest,
};

/// Typed access to every backend endpoint.
///
/// Generic over the [`Backend`] (real HTTP, or a test double) and the
/// [`Codec`] (JSON unless you say otherwise).
#[derive(Debug)]
pub struct ApiClient<B, C = JsonCodec> {
    backend: B,
    codec: C,
}

impl<B: Backend> ApiClient<B> {
    /// Creates a client that speaks JSON over `backend`.
    pub fn new(backend: B) -> Self {
        Self::with_codec(backend, JsonCodec)
    }
}

impl<B: Backend, C: Codec> ApiClient<B, C> {
    /// Creates a client with an explicit codec.
    pub fn with_codec(backend: B, codec: C) -> Self {
        Self { backend, codec }
    }

    /// The backend this client sends through.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    // -- Accounts ---------------------------------------------------------

    /// `POST /register`.
    pub async fn register(
        &self,
        body: &RegisterRequest,
    ) -> Result<RegisterResponse, ApiError> {
        let request = ApiRequest::post("/register", self.codec.encode(body)?);
        self.call(request).await
    }

    /// `POST /login`. A 401 here means the credentials were wrong.
    pub async fn login(&self, body: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let request = ApiRequest::post("/login", self.codec.encode(body)?);
        self.call(request).await
    }

    /// `GET /api/me`.
    pub async fn me(&self, token: &str) -> Result<CurrentUser, ApiError> {
        self.call(ApiRequest::get("/api/me").with_bearer(token)).await
    }

    /// `GET /api/profile`.
    pub async fn profile(&self, token: &str) -> Result<Profile, ApiError> {
        self.call(ApiRequest::get("/api/profile").with_bearer(token))
            .await
    }

    // -- Catalog ----------------------------------------------------------

    /// `POST /api/search`. Public; no token needed.
    pub async fn search(&self, text: &str) -> Result<Vec<CatalogItemSummary>, ApiError> {
        let body = SearchRequest {
            search_text: text.to_string(),
        };
        let request = ApiRequest::post("/api/search", self.codec.encode(&body)?);
        self.call(request).await
    }

    /// `GET /api/game/:id`. Public; a 404 means the catalog has no such game.
    pub async fn game(&self, id: CatalogItemId) -> Result<GameDetails, ApiError> {
        self.call(ApiRequest::get(format!("/api/game/{}", id.0)))
            .await
    }

    // -- Library ----------------------------------------------------------

    /// `GET /api/library`, in the server's order.
    pub async fn library(&self, token: &str) -> Result<Vec<LibraryEntry>, ApiError> {
        self.call(ApiRequest::get("/api/library").with_bearer(token))
            .await
    }

    /// `GET /api/library/status/:catalogItemId`.
    pub async fn library_status(
        &self,
        token: &str,
        item: CatalogItemId,
    ) -> Result<LibraryStatus, ApiError> {
        let path = format!("/api/library/status/{}", item.0);
        self.call(ApiRequest::get(path).with_bearer(token)).await
    }

    /// `POST /api/library`. A 409 means the item is already in the library.
    pub async fn add_to_library(
        &self,
        token: &str,
        body: &AddEntryRequest,
    ) -> Result<AddEntryResponse, ApiError> {
        let request =
            ApiRequest::post("/api/library", self.codec.encode(body)?).with_bearer(token);
        self.call(request).await
    }

    /// `PUT /api/library/:entryId`.
    ///
    /// The reply body is not needed: callers re-fetch the library to see
    /// the change, so only success or failure is reported.
    pub async fn update_status(
        &self,
        token: &str,
        entry: EntryId,
        status: GameStatus,
    ) -> Result<(), ApiError> {
        let body = self.codec.encode(&StatusUpdateRequest { status })?;
        let request =
            ApiRequest::put(format!("/api/library/{}", entry.0), body).with_bearer(token);
        self.send(request).await.map(|_| ())
    }

    /// `DELETE /api/library/:entryId`. Any 2xx (200 with a message, or 204)
    /// counts as success.
    pub async fn remove_from_library(&self, token: &str, entry: EntryId) -> Result<(), ApiError> {
        let request = ApiRequest::delete(format!("/api/library/{}", entry.0)).with_bearer(token);
        self.send(request).await.map(|_| ())
    }

    // -- Recommendations --------------------------------------------------

    /// `GET /api/recommendations`. A 400 means the user has no completed
    /// games to base recommendations on.
    pub async fn recommendations(&self, token: &str) -> Result<Vec<Recommendation>, ApiError> {
        self.call(ApiRequest::get("/api/recommendations").with_bearer(token))
            .await
    }

    // -- Plumbing ---------------------------------------------------------

    async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        Ok(self.codec.decode(&body)?)
    }

    /// Runs the exchange and returns the success body, or the failure
    /// sorted by status with the server's error text attached.
    async fn send(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.backend.execute(request).await?;
        if response.is_success() {
            return Ok(response.body);
        }

        let message = self
            .codec
            .decode::<ErrorBody>(&response.body)
            .ok()
            .and_then(ErrorBody::into_message);
        tracing::debug!(
            %method,
            %path,
            status = response.status,
            message = message.as_deref().unwrap_or(""),
            "backend rejected request"
        );
        Err(ApiError::from_status(response.status, message))
    }
}
