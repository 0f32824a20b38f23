//! Rick and Morty character API client
//!
//! Walks the paginated character listing (pre-filtered upstream to alive
//! humans), keeps the characters whose origin is on the Earth allow-list, and
//! reports partial results when the walk is cut short by an upstream failure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{is_earth_origin, CharacterRecord};

/// Base URL for the character listing endpoint
pub const RICK_AND_MORTY_BASE_URL: &str = "https://rickandmortyapi.com/api/character/";

/// Errors that can occur when fetching a page of characters
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connection, timeout, bad URL)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream returned HTTP {status} for page {page}")]
    Status { page: u32, status: u16 },

    /// Body was not JSON or lacked an expected field
    #[error("Failed to parse character page: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One page of the upstream character listing
#[derive(Debug, Clone, Deserialize)]
pub struct CharacterPage {
    pub results: Vec<ApiCharacter>,
    /// Pagination block; an absent block is treated as the last page
    #[serde(default)]
    pub info: PageInfo,
}

/// Pagination metadata from the upstream API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub next: Option<String>,
}

impl PageInfo {
    /// Whether the upstream advertises another page
    pub fn has_next(&self) -> bool {
        self.next.as_deref().is_some_and(|next| !next.is_empty())
    }
}

/// A character as returned by the upstream API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCharacter {
    pub name: String,
    pub origin: NamedRef,
    pub location: NamedRef,
    pub image: String,
}

/// `{ "name": ... }` reference used for origins and locations
#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

impl From<ApiCharacter> for CharacterRecord {
    fn from(character: ApiCharacter) -> Self {
        CharacterRecord {
            name: character.name,
            location: character.location.name,
            image: character.image,
        }
    }
}

/// Source of character pages
///
/// The production implementation is [`CharactersClient`]; tests substitute
/// scripted sources so no network is touched.
#[async_trait]
pub trait CharacterSource: Send + Sync {
    /// Fetches a single page (1-based) of alive, human characters
    async fn fetch_page(&self, page: u32) -> Result<CharacterPage, FetchError>;
}

/// Client for the public Rick and Morty character API
#[derive(Debug, Clone)]
pub struct CharactersClient {
    http_client: Client,
    base_url: String,
}

impl Default for CharactersClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CharactersClient {
    /// Creates a new client pointed at the public API
    pub fn new() -> Self {
        Self::with_base_url(RICK_AND_MORTY_BASE_URL)
    }

    /// Creates a new client pointed at a custom listing endpoint
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Builds the URL for a page of alive humans
    fn page_url(&self, page: u32) -> String {
        format!("{}?page={page}&status=alive&species=human", self.base_url)
    }
}

#[async_trait]
impl CharacterSource for CharactersClient {
    async fn fetch_page(&self, page: u32) -> Result<CharacterPage, FetchError> {
        let url = self.page_url(page);
        debug!(%url, "Requesting character page");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                page,
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Outcome of a full pagination walk
///
/// `failure` is `None` only when every page up to the last one was fetched;
/// otherwise `characters` holds whatever was collected before the error.
#[derive(Debug)]
pub struct FetchReport {
    /// Matching characters in upstream order
    pub characters: Vec<CharacterRecord>,
    /// Why pagination stopped early, if it did
    pub failure: Option<FetchError>,
    /// Number of pages successfully fetched
    pub pages_fetched: u32,
    /// When the walk finished
    pub fetched_at: DateTime<Utc>,
}

impl FetchReport {
    /// Returns true if pagination ran to the last page
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Consumes the report, keeping only the characters
    pub fn into_characters(self) -> Vec<CharacterRecord> {
        self.characters
    }
}

/// Fetches every alive, human, Earth-born character
///
/// Pages are requested one at a time starting at page 1 until the upstream
/// reports no next page. Any error stops the walk; the characters collected
/// so far are still returned, with the error recorded on the report.
pub async fn fetch_matching_characters<S>(source: &S) -> FetchReport
where
    S: CharacterSource + ?Sized,
{
    let mut characters = Vec::new();
    let mut pages_fetched = 0;
    let mut page = 1;

    let failure = loop {
        match source.fetch_page(page).await {
            Ok(body) => {
                pages_fetched += 1;
                let before = characters.len();
                for character in body.results {
                    if is_earth_origin(&character.origin.name) {
                        characters.push(CharacterRecord::from(character));
                    }
                }
                let matched = characters.len() - before;
                debug!(page, matched, "Fetched character page");

                if !body.info.has_next() {
                    break None;
                }
                page += 1;
            }
            Err(error) => {
                warn!(
                    page,
                    error = %error,
                    "Stopping character fetch early, keeping partial results"
                );
                break Some(error);
            }
        }
    };

    info!(
        count = characters.len(),
        pages = pages_fetched,
        complete = failure.is_none(),
        "Character fetch finished"
    );

    FetchReport {
        characters,
        failure,
        pages_fetched,
        fetched_at: Utc::now(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;

    /// Serves a fixed sequence of page results and records what was asked for
    pub(crate) struct ScriptedSource {
        pages: Mutex<VecDeque<Result<CharacterPage, FetchError>>>,
        requested: Mutex<Vec<u32>>,
    }

    impl ScriptedSource {
        pub(crate) fn new(pages: Vec<Result<CharacterPage, FetchError>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                requested: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn requested(&self) -> Vec<u32> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CharacterSource for ScriptedSource {
        async fn fetch_page(&self, page: u32) -> Result<CharacterPage, FetchError> {
            self.requested.lock().unwrap().push(page);
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(page_of(&[], None)))
        }
    }

    pub(crate) fn character(name: &str, origin: &str) -> ApiCharacter {
        ApiCharacter {
            name: name.to_string(),
            origin: NamedRef {
                name: origin.to_string(),
            },
            location: NamedRef {
                name: format!("{name}'s place"),
            },
            image: format!("https://rickandmortyapi.com/api/character/avatar/{name}.jpeg"),
        }
    }

    pub(crate) fn page_of(results: &[ApiCharacter], next: Option<&str>) -> CharacterPage {
        CharacterPage {
            results: results.to_vec(),
            info: PageInfo {
                next: next.map(str::to_string),
            },
        }
    }

    /// A transport error built without touching the network
    pub(crate) fn transport_error() -> FetchError {
        let err = Client::new()
            .get("not a url")
            .build()
            .expect_err("invalid URL should fail to build");
        FetchError::Request(err)
    }

    const SAMPLE_PAGE: &str = r#"{
        "info": {
            "count": 2,
            "pages": 1,
            "next": "https://rickandmortyapi.com/api/character/?page=2&status=alive&species=human",
            "prev": null
        },
        "results": [
            {
                "id": 1,
                "name": "Rick Sanchez",
                "status": "Alive",
                "species": "Human",
                "origin": { "name": "Earth (C-137)", "url": "https://rickandmortyapi.com/api/location/1" },
                "location": { "name": "Citadel of Ricks", "url": "https://rickandmortyapi.com/api/location/3" },
                "image": "https://rickandmortyapi.com/api/character/avatar/1.jpeg"
            },
            {
                "id": 7,
                "name": "Abradolf Lincler",
                "status": "unknown",
                "species": "Human",
                "origin": { "name": "Earth (Replacement Dimension)", "url": "" },
                "location": { "name": "Testicle Monster Dimension", "url": "" },
                "image": "https://rickandmortyapi.com/api/character/avatar/7.jpeg"
            }
        ]
    }"#;

    #[test]
    fn test_parse_upstream_page() {
        let page: CharacterPage = serde_json::from_str(SAMPLE_PAGE).unwrap();

        assert_eq!(page.results.len(), 2);
        assert!(page.info.has_next());

        let record = CharacterRecord::from(page.results[0].clone());
        assert_eq!(record.name, "Rick Sanchez");
        assert_eq!(record.location, "Citadel of Ricks");
        assert_eq!(
            record.image,
            "https://rickandmortyapi.com/api/character/avatar/1.jpeg"
        );
    }

    #[test]
    fn test_parse_page_missing_results_fails() {
        let body = r#"{"info": {"next": null}}"#;
        let result: Result<CharacterPage, _> = serde_json::from_str(body);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_character_missing_origin_fails() {
        let body = r#"{"results": [{"name": "Morty", "location": {"name": "Earth"}}]}"#;
        let result: Result<CharacterPage, _> = serde_json::from_str(body);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_info_means_last_page() {
        let page: CharacterPage = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(!page.info.has_next());
    }

    #[test]
    fn test_empty_next_means_last_page() {
        let info = PageInfo {
            next: Some(String::new()),
        };
        assert!(!info.has_next());
    }

    #[test]
    fn test_page_url_carries_upstream_filters() {
        let client = CharactersClient::with_base_url("http://localhost:9999/api/character/");
        assert_eq!(
            client.page_url(3),
            "http://localhost:9999/api/character/?page=3&status=alive&species=human"
        );
    }

    #[test]
    fn test_default_points_at_public_api() {
        let client = CharactersClient::default();
        assert!(client.page_url(1).starts_with(RICK_AND_MORTY_BASE_URL));
    }

    #[tokio::test]
    async fn test_fetch_follows_next_and_merges_in_page_order() {
        let source = ScriptedSource::new(vec![
            Ok(page_of(
                &[
                    character("Rick", "Earth (C-137)"),
                    character("Beth", "Earth"),
                ],
                Some("page2url"),
            )),
            Ok(page_of(
                &[character("Summer", "earth (replacement dimension)")],
                None,
            )),
        ]);

        let report = fetch_matching_characters(&source).await;

        assert_eq!(source.requested(), vec![1, 2]);
        assert!(report.is_complete());
        assert_eq!(report.pages_fetched, 2);
        let names: Vec<_> = report.characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Rick", "Beth", "Summer"]);
    }

    #[tokio::test]
    async fn test_fetch_drops_non_earth_origins() {
        let source = ScriptedSource::new(vec![Ok(page_of(
            &[
                character("Rick", "Earth (C-137)"),
                character("Squanchy", "unknown"),
                character("Evil Morty", "Earth (Evil Rick's Target Dimension)"),
                character("Jerry", "EARTH"),
            ],
            None,
        ))]);

        let report = fetch_matching_characters(&source).await;

        let names: Vec<_> = report.characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Rick", "Jerry"]);
    }

    #[tokio::test]
    async fn test_transport_error_on_second_page_keeps_first_page_matches() {
        let source = ScriptedSource::new(vec![
            Ok(page_of(
                &[
                    character("Rick", "Earth (C-137)"),
                    character("Morty", "Earth"),
                    character("Beth", "Earth (Replacement Dimension)"),
                ],
                Some("page2url"),
            )),
            Err(transport_error()),
        ]);

        let report = fetch_matching_characters(&source).await;

        assert_eq!(source.requested(), vec![1, 2]);
        assert_eq!(report.characters.len(), 3);
        assert_eq!(report.pages_fetched, 1);
        assert!(!report.is_complete());
        assert!(matches!(report.failure, Some(FetchError::Request(_))));
    }

    #[tokio::test]
    async fn test_status_error_on_first_page_returns_empty_report() {
        let source = ScriptedSource::new(vec![Err(FetchError::Status {
            page: 1,
            status: 503,
        })]);

        let report = fetch_matching_characters(&source).await;

        assert!(report.characters.is_empty());
        assert_eq!(report.pages_fetched, 0);
        let failure = report.failure.expect("failure should be recorded");
        assert!(failure.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_malformed_page_stops_pagination() {
        let parse_error = serde_json::from_str::<CharacterPage>("{}").unwrap_err();
        let source = ScriptedSource::new(vec![
            Ok(page_of(&[character("Morty", "Earth")], Some("page2url"))),
            Err(FetchError::Parse(parse_error)),
            Ok(page_of(&[character("Never", "Earth")], None)),
        ]);

        let report = fetch_matching_characters(&source).await;

        assert_eq!(source.requested(), vec![1, 2]);
        assert_eq!(report.into_characters().len(), 1);
    }

    #[tokio::test]
    async fn test_no_matches_is_complete_and_empty() {
        let birdperson = character("Birdperson", "Bird World");
        let source = ScriptedSource::new(vec![Ok(page_of(&[birdperson], None))]);

        let report = fetch_matching_characters(&source).await;

        assert!(report.is_complete());
        assert!(report.characters.is_empty());
    }

    const LOCAL_PAGE_ONE: &str = r#"{
        "info": { "next": "http://127.0.0.1/character/?page=2" },
        "results": [
            {
                "name": "Rick Sanchez",
                "origin": { "name": "Earth (C-137)" },
                "location": { "name": "Citadel of Ricks" },
                "image": "https://rickandmortyapi.com/api/character/avatar/1.jpeg"
            },
            {
                "name": "Zeep Xanflorp",
                "origin": { "name": "Microverse" },
                "location": { "name": "Microverse" },
                "image": "https://rickandmortyapi.com/api/character/avatar/2.jpeg"
            }
        ]
    }"#;

    const LOCAL_PAGE_TWO: &str = r#"{
        "info": { "next": null },
        "results": [
            {
                "name": "Beth Smith",
                "origin": { "name": "Earth (Replacement Dimension)" },
                "location": { "name": "Earth (Replacement Dimension)" },
                "image": "https://rickandmortyapi.com/api/character/avatar/38.jpeg"
            }
        ]
    }"#;

    /// Listing handler that only answers when the upstream filters are present
    async fn local_listing(
        Query(params): Query<HashMap<String, String>>,
    ) -> (StatusCode, &'static str) {
        let filtered = params.get("status").map(String::as_str) == Some("alive")
            && params.get("species").map(String::as_str) == Some("human");
        if !filtered {
            return (StatusCode::BAD_REQUEST, "missing filters");
        }

        match params.get("page").map(String::as_str) {
            Some("1") => (StatusCode::OK, LOCAL_PAGE_ONE),
            Some("2") => (StatusCode::OK, LOCAL_PAGE_TWO),
            _ => (StatusCode::NOT_FOUND, "no such page"),
        }
    }

    /// Serves a fake upstream on an ephemeral port and returns its base URL
    async fn spawn_upstream() -> String {
        let app = Router::new()
            .route("/character/", get(local_listing))
            .route(
                "/unavailable/",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
            )
            .route("/garbage/", get(|| async { "<html>not json</html>" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_client_walks_two_pages_from_local_upstream() {
        let base = spawn_upstream().await;
        let client = CharactersClient::with_base_url(format!("{base}/character/"));

        let report = fetch_matching_characters(&client).await;

        assert!(report.is_complete(), "{:?}", report.failure);
        assert_eq!(report.pages_fetched, 2);
        let names: Vec<_> = report.characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Rick Sanchez", "Beth Smith"]);
        assert_eq!(report.characters[0].location, "Citadel of Ricks");
    }

    #[tokio::test]
    async fn test_client_maps_503_to_status_error() {
        let base = spawn_upstream().await;
        let client = CharactersClient::with_base_url(format!("{base}/unavailable/"));

        let report = fetch_matching_characters(&client).await;

        assert!(report.characters.is_empty());
        assert!(matches!(
            report.failure,
            Some(FetchError::Status {
                page: 1,
                status: 503
            })
        ));
    }

    #[tokio::test]
    async fn test_client_maps_non_json_body_to_parse_error() {
        let base = spawn_upstream().await;
        let client = CharactersClient::with_base_url(format!("{base}/garbage/"));

        let result = client.fetch_page(1).await;

        assert!(matches!(result, Err(FetchError::Parse(_))));
    }
}
