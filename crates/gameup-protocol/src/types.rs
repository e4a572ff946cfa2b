//! Core protocol types for the Game Up REST contract.
//!
//! Every type here is something that travels "on the wire": request bodies
//! the client sends and response bodies the backend returns. Field names
//! follow the backend's JSON exactly, so a few of them are renamed with
//! `#[serde(rename = ...)]` to keep Rust-side names readable.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Server-assigned identifier of a library entry.
///
/// Newtype over `u64` so an entry id can never be passed where a catalog
/// item id is expected; both are plain integers in JSON.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E-{}", self.0)
    }
}

/// Identifier of a game in the external catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CatalogItemId(pub u64);

impl fmt::Display for CatalogItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

/// Where a game sits in the user's backlog.
///
/// Serialized with exactly these names (`"Wishlist"`, `"Playing"`, ...);
/// the backend rejects anything else with a 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Wishlist,
    Playing,
    Completed,
    Dropped,
}

impl GameStatus {
    /// All statuses in the order the add/edit forms offer them.
    pub const ALL: [Self; 4] =
        [Self::Wishlist, Self::Playing, Self::Completed, Self::Dropped];

    /// All statuses in the order the library tabs show them.
    pub const TAB_ORDER: [Self; 4] =
        [Self::Playing, Self::Completed, Self::Wishlist, Self::Dropped];

    /// The wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wishlist => "Wishlist",
            Self::Playing => "Playing",
            Self::Completed => "Completed",
            Self::Dropped => "Dropped",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameStatus {
    type Err = ProtocolError;

    /// Parses a status name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ProtocolError::InvalidMessage(format!(
                    "unknown status {s:?}, expected one of Wishlist, Playing, Completed, Dropped"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Catalog types (read-only, sourced from the external game database)
// ---------------------------------------------------------------------------

/// Cover art reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cover {
    pub url: String,
}

/// A game as it appears in search results, library rows and
/// recommendations.
///
/// Every field except `id` and `name` may be missing from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItemSummary {
    pub id: CatalogItemId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<Cover>,
    /// First release date as unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_release_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl CatalogItemSummary {
    /// The cover URL, if the catalog has one.
    pub fn cover_url(&self) -> Option<&str> {
        self.cover.as_ref().map(|c| c.url.as_str())
    }

    /// The UTC year of the first release, if known.
    pub fn release_year(&self) -> Option<i32> {
        self.first_release_date
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .map(|date| date.year())
    }
}

/// A named catalog facet (genre, platform).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: u64,
    pub name: String,
}

/// Full detail for one game, as served by `GET /api/game/:id`.
///
/// `#[serde(flatten)]` pulls the summary fields (`id`, `name`, `cover`, ...)
/// up to the same JSON level as the detail-only fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDetails {
    #[serde(flatten)]
    pub item: CatalogItemSummary,
    #[serde(default)]
    pub genres: Vec<NamedRef>,
    #[serde(default)]
    pub platforms: Vec<NamedRef>,
    #[serde(default)]
    pub developers: Vec<String>,
    #[serde(default)]
    pub publishers: Vec<String>,
}

// ---------------------------------------------------------------------------
// Library types
// ---------------------------------------------------------------------------

/// One row of the user's library: a catalog item plus its backlog status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub id: EntryId,
    #[serde(rename = "igdb_game_id")]
    pub catalog_item_id: CatalogItemId,
    pub status: GameStatus,
    pub details: CatalogItemSummary,
}

/// The entry echoed back by `POST /api/library`.
///
/// It carries no catalog details; those arrive with the next library fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedEntry {
    pub id: EntryId,
    #[serde(rename = "igdb_game_id")]
    pub catalog_item_id: CatalogItemId,
    pub status: GameStatus,
}

/// Whether one catalog item is in the library (`GET /api/library/status/:id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStatus {
    #[serde(rename = "inLibrary")]
    pub in_library: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<GameStatus>,
}

impl LibraryStatus {
    /// The status reported for an item that is not in the library.
    pub fn absent() -> Self {
        Self {
            in_library: false,
            id: None,
            status: None,
        }
    }
}

impl From<AddedEntry> for LibraryStatus {
    fn from(entry: AddedEntry) -> Self {
        Self {
            in_library: true,
            id: Some(entry.id),
            status: Some(entry.status),
        }
    }
}

// ---------------------------------------------------------------------------
// Account types
// ---------------------------------------------------------------------------

/// `GET /api/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: String,
}

/// `GET /api/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub completed_games_count: u32,
}

/// One AI recommendation: a catalog item and why it was picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub reason: String,
    pub details: CatalogItemSummary,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// `POST /register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// `POST /login`. `identifier` is a username or an email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// `POST /api/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(rename = "searchText")]
    pub search_text: String,
}

/// `POST /api/library`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddEntryRequest {
    #[serde(rename = "igdb_game_id")]
    pub catalog_item_id: CatalogItemId,
    pub status: GameStatus,
}

/// `PUT /api/library/:id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: GameStatus,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// Reply to `POST /register`. Some deployments log the user straight in
/// and include a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Reply to `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Reply to `POST /api/library`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddEntryResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub game: AddedEntry,
}

/// The error body the backend sends with non-2xx replies.
///
/// Most endpoints use `error`; the token check uses `message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    /// The human-readable message, preferring `error` over `message`.
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .filter(|m| !m.trim().is_empty())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn summary_json() -> serde_json::Value {
        serde_json::json!({
            "id": 1942,
            "name": "The Witcher 3: Wild Hunt",
            "cover": { "url": "//images.igdb.com/t_cover_big/co1wyy.jpg" },
            "first_release_date": 1431993600,
            "summary": "RPG"
        })
    }

    #[test]
    fn test_entry_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&EntryId(7)).unwrap();
        assert_eq!(json, "7");
        assert_eq!(EntryId(7).to_string(), "E-7");
        assert_eq!(CatalogItemId(1942).to_string(), "G-1942");
    }

    #[test]
    fn test_game_status_uses_exact_wire_names() {
        let json = serde_json::to_string(&GameStatus::Completed).unwrap();
        assert_eq!(json, "\"Completed\"");
        let parsed: GameStatus = serde_json::from_str("\"Dropped\"").unwrap();
        assert_eq!(parsed, GameStatus::Dropped);
        assert!(serde_json::from_str::<GameStatus>("\"completed\"").is_err());
    }

    #[test]
    fn test_game_status_from_str_ignores_case() {
        assert_eq!("playing".parse::<GameStatus>().unwrap(), GameStatus::Playing);
        assert_eq!(" Wishlist ".parse::<GameStatus>().unwrap(), GameStatus::Wishlist);
        assert!(matches!(
            "Backlog".parse::<GameStatus>(),
            Err(ProtocolError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_status_orders_cover_every_variant() {
        for status in GameStatus::ALL {
            assert!(GameStatus::TAB_ORDER.contains(&status));
        }
        assert_eq!(GameStatus::ALL[0], GameStatus::Wishlist);
        assert_eq!(GameStatus::TAB_ORDER[0], GameStatus::Playing);
    }

    #[test]
    fn test_catalog_item_helpers() {
        let item: CatalogItemSummary =
            serde_json::from_value(summary_json()).unwrap();
        assert_eq!(item.cover_url(), Some("//images.igdb.com/t_cover_big/co1wyy.jpg"));
        assert_eq!(item.release_year(), Some(2015));
    }

    #[test]
    fn test_catalog_item_optional_fields_may_be_missing() {
        let item: CatalogItemSummary =
            serde_json::from_str(r#"{"id":5,"name":"Obscure"}"#).unwrap();
        assert_eq!(item.cover_url(), None);
        assert_eq!(item.release_year(), None);
        assert_eq!(item.summary, None);
    }

    #[test]
    fn test_library_entry_reads_igdb_game_id() {
        let json = serde_json::json!({
            "id": 3,
            "igdb_game_id": 1942,
            "status": "Playing",
            "details": summary_json(),
        });
        let entry: LibraryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.id, EntryId(3));
        assert_eq!(entry.catalog_item_id, CatalogItemId(1942));
        assert_eq!(entry.status, GameStatus::Playing);
        assert_eq!(entry.details.name, "The Witcher 3: Wild Hunt");
    }

    #[test]
    fn test_game_details_flattens_summary_fields() {
        let mut json = summary_json();
        json["genres"] = serde_json::json!([{ "id": 12, "name": "RPG" }]);
        json["developers"] = serde_json::json!(["CD Projekt RED"]);
        let details: GameDetails = serde_json::from_value(json).unwrap();
        assert_eq!(details.item.id, CatalogItemId(1942));
        assert_eq!(details.genres[0].name, "RPG");
        assert_eq!(details.developers, vec!["CD Projekt RED"]);
        assert!(details.platforms.is_empty());
        assert!(details.publishers.is_empty());
    }

    #[test]
    fn test_library_status_absent_form() {
        let status: LibraryStatus =
            serde_json::from_str(r#"{"inLibrary":false}"#).unwrap();
        assert_eq!(status, LibraryStatus::absent());

        let status: LibraryStatus = serde_json::from_str(
            r#"{"inLibrary":true,"id":9,"status":"Wishlist"}"#,
        )
        .unwrap();
        assert!(status.in_library);
        assert_eq!(status.id, Some(EntryId(9)));
    }

    #[test]
    fn test_request_bodies_use_backend_field_names() {
        let add = AddEntryRequest {
            catalog_item_id: CatalogItemId(42),
            status: GameStatus::Wishlist,
        };
        let json = serde_json::to_value(add).unwrap();
        assert_eq!(json, serde_json::json!({ "igdb_game_id": 42, "status": "Wishlist" }));

        let search = SearchRequest { search_text: "zelda".into() };
        let json = serde_json::to_value(search).unwrap();
        assert_eq!(json, serde_json::json!({ "searchText": "zelda" }));
    }

    #[test]
    fn test_error_body_prefers_error_then_message() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error":"Invalid credentials"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid credentials"));

        let body: ErrorBody =
            serde_json::from_str(r#"{"message":"Token is missing!"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Token is missing!"));

        let body: ErrorBody = serde_json::from_str(r#"{"error":"  "}"#).unwrap();
        assert_eq!(body.into_message(), None);
    }
}
