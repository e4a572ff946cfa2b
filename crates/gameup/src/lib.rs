//! # Game Up
//!
//! Client core for the Game Up backlog tracker.
//!
//! Game Up keeps a personal video-game backlog on a REST backend. This crate
//! is the client side of it: it remembers who is signed in, keeps a local
//! copy of the library in step with the server, decides which screens a
//! user may see, and searches the catalog as the user types.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gameup::prelude::*;
//!
//! # async fn run() -> Result<(), ClientError> {
//! let client = GameUpClient::connect(ClientConfig::from_env())?;
//!
//! if client.navigate("/my-games").await == Resolution::Redirect("/login") {
//!     client.login("ana", "Secret123").await?;
//! }
//!
//! let library = client.library().fetch().await?;
//! for entry in library {
//!     println!("{} [{}]", entry.details.name, entry.status);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
pub mod navigation;
mod validation;

pub use client::{GameUpClient, GameView, Registration};
pub use config::{API_URL_VAR, ClientConfig, STORAGE_PATH_VAR};
pub use error::ClientError;
pub use validation::{RegistrationForm, ValidationErrors};

pub use gameup_library as library;
pub use gameup_protocol as protocol;
pub use gameup_search as search;
pub use gameup_session as session;
pub use gameup_transport as transport;

/// The names most applications need.
pub mod prelude {
    pub use crate::navigation::{AFTER_AUTH, AFTER_LOGOUT, Resolution, View, resolve};
    pub use crate::{ClientConfig, ClientError, GameUpClient, GameView, RegistrationForm};
    pub use gameup_library::{AddOutcome, LibraryError, RemoveOutcome};
    pub use gameup_protocol::{
        CatalogItemId, CatalogItemSummary, EntryId, GameStatus, LibraryEntry, Profile,
    };
    pub use gameup_search::{SearchSession, SearchState};
    pub use gameup_session::SessionState;
}
