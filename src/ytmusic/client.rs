use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, ORIGIN},
};
use serde_json::{Value, json};

use crate::{
    config,
    error::MigrationError,
    migration::DestinationCatalog,
    types::SearchHit,
    ytmusic::auth::{BrowserHeaders, YTMUSIC_ORIGIN, sapisid_hash},
};

/// Search params restricting results to songs.
pub const SONGS_FILTER_PARAMS: &str = "EgWKAQIIAWoMEA4QChADEAQQCRAF";

const EDIT_SUCCEEDED: &str = "STATUS_SUCCEEDED";

/// YouTube Music client authenticated with browser headers.
pub struct YtMusicClient {
    client: Client,
    api_url: String,
    headers: BrowserHeaders,
}

impl YtMusicClient {
    pub fn new(headers: BrowserHeaders) -> Result<Self, MigrationError> {
        let mut default_headers = HeaderMap::new();
        for (name, value) in headers.iter() {
            // regenerated for every request
            if name == "authorization" {
                continue;
            }
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                default_headers.insert(name, value);
            }
        }
        default_headers.insert(ORIGIN, HeaderValue::from_static(YTMUSIC_ORIGIN));
        default_headers.insert("x-origin", HeaderValue::from_static(YTMUSIC_ORIGIN));

        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(YtMusicClient {
            client,
            api_url: config::ytmusic_apiurl(),
            headers,
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn headers(&self) -> &BrowserHeaders {
        &self.headers
    }

    /// Runs a throwaway search to prove the headers are accepted.
    pub async fn validate(&self) -> Result<(), MigrationError> {
        self.post("search", json!({ "query": "test" })).await?;
        Ok(())
    }

    async fn post(&self, endpoint: &str, mut body: Value) -> Result<Value, MigrationError> {
        body["context"] = innertube_context();

        let sapisid = self.headers.sapisid().ok_or(MigrationError::AuthExpired)?;
        let authorization = sapisid_hash(&sapisid, YTMUSIC_ORIGIN, Utc::now().timestamp());

        let response = self
            .client
            .post(format!(
                "{uri}/{endpoint}?alt=json&prettyPrint=false",
                uri = self.api_url,
                endpoint = endpoint
            ))
            .header(AUTHORIZATION, authorization)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        match response.error_for_status() {
            Ok(valid_response) => Ok(valid_response.json::<Value>().await?),
            Err(err) => Err(MigrationError::from_status(status, MigrationError::Http(err))),
        }
    }
}

#[async_trait]
impl DestinationCatalog for YtMusicClient {
    fn name(&self) -> &str {
        "YouTube Music"
    }

    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
    ) -> Result<String, MigrationError> {
        let description: String = description.chars().filter(|c| !"<>".contains(*c)).collect();
        let res = self
            .post(
                "playlist/create",
                json!({
                    "title": title,
                    "description": description,
                    "privacyStatus": "PRIVATE",
                }),
            )
            .await?;

        parse_created_playlist_id(&res).ok_or_else(|| {
            MigrationError::PlaylistCreate("response did not contain a playlist id".to_string())
        })
    }

    async fn search_songs(&self, query: &str) -> Result<Vec<SearchHit>, MigrationError> {
        let res = self
            .post(
                "search",
                json!({ "query": query, "params": SONGS_FILTER_PARAMS }),
            )
            .await
            .map_err(|e| match e {
                MigrationError::AuthExpired => MigrationError::AuthExpired,
                other => MigrationError::Search(other.to_string()),
            })?;

        Ok(parse_search_results(&res))
    }

    async fn add_items(
        &self,
        playlist_id: &str,
        destination_ids: &[String],
    ) -> Result<(), MigrationError> {
        let actions: Vec<Value> = destination_ids
            .iter()
            .map(|id| json!({ "action": "ACTION_ADD_VIDEO", "addedVideoId": id }))
            .collect();

        let res = self
            .post(
                "browse/edit_playlist",
                json!({
                    "playlistId": playlist_id.strip_prefix("VL").unwrap_or(playlist_id),
                    "actions": actions,
                }),
            )
            .await?;

        parse_edit_status(&res)
    }
}

fn innertube_context() -> Value {
    json!({
        "client": {
            "clientName": "WEB_REMIX",
            "clientVersion": Utc::now().format("1.%Y%m%d.01.00").to_string(),
            "hl": "en",
        },
        "user": {},
    })
}

/// Extracts song hits from a search response, in the order they were ranked.
/// Entries without a video id are not playable and are left out.
pub fn parse_search_results(response: &Value) -> Vec<SearchHit> {
    let sections = response
        .pointer("/contents/tabbedSearchResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/contents")
        .or_else(|| response.pointer("/contents/sectionListRenderer/contents"))
        .and_then(Value::as_array);

    let Some(sections) = sections else {
        return Vec::new();
    };

    sections
        .iter()
        .filter_map(|s| s.pointer("/musicShelfRenderer/contents").and_then(Value::as_array))
        .flatten()
        .filter_map(|item| item.get("musicResponsiveListItemRenderer"))
        .filter_map(parse_list_item)
        .collect()
}

fn parse_list_item(renderer: &Value) -> Option<SearchHit> {
    let destination_id = renderer
        .pointer("/playlistItemData/videoId")
        .or_else(|| {
            renderer.pointer(
                "/overlay/musicItemThumbnailOverlayRenderer/content/musicPlayButtonRenderer/playNavigationEndpoint/watchEndpoint/videoId",
            )
        })
        .and_then(Value::as_str)?
        .to_string();

    let display_title = column_runs(renderer, 0)
        .first()
        .and_then(run_text)
        .unwrap_or_default()
        .to_string();

    let details = column_runs(renderer, 1);
    let artists = details
        .iter()
        .filter(|run| {
            run.pointer("/navigationEndpoint/browseEndpoint/browseId")
                .and_then(Value::as_str)
                .is_some_and(|id| id.starts_with("UC"))
        })
        .filter_map(run_text)
        .map(str::to_string)
        .collect();
    let duration = details
        .last()
        .and_then(run_text)
        .filter(|text| is_duration(text))
        .map(str::to_string);

    Some(SearchHit {
        destination_id,
        display_title,
        artists,
        duration,
    })
}

fn column_runs(renderer: &Value, column: usize) -> &[Value] {
    renderer
        .pointer(&format!(
            "/flexColumns/{}/musicResponsiveListItemFlexColumnRenderer/text/runs",
            column
        ))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn run_text(run: &Value) -> Option<&str> {
    run.get("text").and_then(Value::as_str)
}

fn is_duration(text: &str) -> bool {
    let parts: Vec<&str> = text.split(':').collect();
    (2..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

pub fn parse_created_playlist_id(response: &Value) -> Option<String> {
    response
        .get("playlistId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

pub fn parse_edit_status(response: &Value) -> Result<(), MigrationError> {
    match response.get("status").and_then(Value::as_str) {
        Some(EDIT_SUCCEEDED) => Ok(()),
        Some(other) => Err(MigrationError::AddItems(other.to_string())),
        None => Err(MigrationError::AddItems(
            "response did not contain a status".to_string(),
        )),
    }
}
