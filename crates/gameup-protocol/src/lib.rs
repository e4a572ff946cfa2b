//! Wire protocol for Game Up.
//!
//! This crate defines the "language" the client and the REST backend speak:
//!
//! - **Types** ([`LibraryEntry`], [`CatalogItemSummary`], [`GameStatus`],
//!   request/response bodies): the JSON structures on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those structures are
//!   converted to/from bytes.
//! - **Client** ([`ApiClient`]): one typed async method per endpoint.
//! - **Errors** ([`ProtocolError`], [`ApiError`]): bad bytes vs. a
//!   meaningful rejection from the backend.
//!
//! # Architecture
//!
//! ```text
//! Transport (ApiRequest/ApiResponse) → Protocol (typed calls) → Session / Library
//! ```

mod codec;
mod error;
mod types;

#[cfg(feature = "json")]
mod api;

#[cfg(feature = "json")]
pub use api::ApiClient;
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{ApiError, ProtocolError};
pub use types::{
    AddEntryRequest, AddEntryResponse, AddedEntry, CatalogItemId, CatalogItemSummary, Cover,
    CurrentUser, EntryId, ErrorBody, GameDetails, GameStatus, LibraryEntry, LibraryStatus,
    LoginRequest, LoginResponse, NamedRef, Profile, Recommendation, RegisterRequest,
    RegisterResponse, SearchRequest, StatusUpdateRequest,
};
