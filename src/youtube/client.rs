use crate::config::Config;
use crate::fetch::FetchOutcome;
use crate::youtube::api_types::{ApiChannel, ApiListResponse, ApiSearchItem, ApiVideo};
use crate::youtube::types::{ChannelRecord, SearchHit, VideoRecord, VideoSearch};
use crate::youtube::VideoPlatform;
use chrono::SecondsFormat;
use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// The search endpoint refuses anything above this
const MAX_PAGE_SIZE: u32 = 50;

/// YouTube Data API client wrapper
#[derive(Clone)]
pub struct YouTubeClient {
  http: reqwest::Client,
  base_url: Url,
  api_key: Option<String>,
  region_code: Option<String>,
  calls: Arc<AtomicU64>,
}

impl YouTubeClient {
  /// Build a client using the key from the environment, if any.
  pub fn new(config: &Config) -> Result<Self> {
    Self::with_api_key(config, Config::get_api_key())
  }

  pub fn with_api_key(config: &Config, api_key: Option<String>) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.api.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    // Url::join drops the last segment unless the base ends with '/'
    let mut base = config.api.base_url.trim_end_matches('/').to_string();
    base.push('/');
    let base_url =
      Url::parse(&base).map_err(|e| eyre!("Invalid API base URL {}: {}", config.api.base_url, e))?;

    Ok(Self {
      http,
      base_url,
      api_key,
      region_code: config.api.region_code.clone(),
      calls: Arc::new(AtomicU64::new(0)),
    })
  }

  /// GET `endpoint` with `params` plus the key, and decode the JSON body.
  async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T> {
    let key = self
      .api_key
      .as_deref()
      .ok_or_else(|| eyre!("YouTube API key is not configured"))?;

    let url = self
      .base_url
      .join(endpoint)
      .map_err(|e| eyre!("Invalid endpoint {}: {}", endpoint, e))?;

    debug!(endpoint, ?params, "youtube request");

    let response = self
      .http
      .get(url)
      .query(params)
      .query(&[("key", key)])
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", endpoint, e))?;

    // The request reached the platform and spent quota
    self.calls.fetch_add(1, Ordering::SeqCst);

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(eyre!("{} returned {}: {}", endpoint, status, body));
    }

    response
      .json::<T>()
      .await
      .map_err(|e| eyre!("Failed to parse {} response: {}", endpoint, e))
  }

  /// Most popular videos right now
  pub async fn trending(&self, max_results: u32) -> Result<Vec<VideoRecord>> {
    let mut params = vec![
      ("part", "snippet,statistics".to_string()),
      ("chart", "mostPopular".to_string()),
      ("maxResults", page_size(max_results)),
    ];
    if let Some(region) = &self.region_code {
      params.push(("regionCode", region.clone()));
    }

    let response: ApiListResponse<ApiVideo> = self
      .get_json("videos", &params)
      .await
      .map_err(|e| eyre!("Failed to get trending videos: {}", e))?;

    Ok(response.items.into_iter().map(ApiVideo::into_record).collect())
  }

  /// Search short videos published after a point in time
  pub async fn search_videos(&self, search: &VideoSearch) -> Result<Vec<SearchHit>> {
    let params = [
      ("part", "snippet".to_string()),
      ("type", "video".to_string()),
      ("videoDuration", "short".to_string()),
      ("q", search.query.clone()),
      ("order", search.order.as_str().to_string()),
      (
        "publishedAfter",
        search
          .published_after
          .to_rfc3339_opts(SecondsFormat::Secs, true),
      ),
      ("maxResults", page_size(search.max_results)),
    ];

    let response: ApiListResponse<ApiSearchItem> = self
      .get_json("search", &params)
      .await
      .map_err(|e| eyre!("Failed to search videos for {:?}: {}", search.query, e))?;

    Ok(
      response
        .items
        .into_iter()
        .filter_map(ApiSearchItem::into_video_hit)
        .collect(),
    )
  }

  /// Search channels publishing Shorts about `query`
  pub async fn search_channels(&self, query: &str, max_results: u32) -> Result<Vec<String>> {
    let params = [
      ("part", "snippet".to_string()),
      ("type", "channel".to_string()),
      ("q", format!("{} #shorts", query.trim())),
      ("maxResults", page_size(max_results)),
    ];

    let response: ApiListResponse<ApiSearchItem> = self
      .get_json("search", &params)
      .await
      .map_err(|e| eyre!("Failed to search channels for {:?}: {}", query, e))?;

    Ok(
      response
        .items
        .into_iter()
        .filter_map(ApiSearchItem::into_channel_id)
        .collect(),
    )
  }

  /// Statistics for a batch of videos, in the order the platform returns them
  pub async fn get_videos(&self, video_ids: &[String]) -> Result<Vec<VideoRecord>> {
    if video_ids.is_empty() {
      return Ok(Vec::new());
    }

    let params = [
      ("part", "snippet,statistics".to_string()),
      ("id", video_ids.join(",")),
      ("maxResults", page_size(video_ids.len() as u32)),
    ];

    let response: ApiListResponse<ApiVideo> = self
      .get_json("videos", &params)
      .await
      .map_err(|e| eyre!("Failed to get videos {}: {}", video_ids.join(","), e))?;

    Ok(response.items.into_iter().map(ApiVideo::into_record).collect())
  }

  pub async fn get_video(&self, video_id: &str) -> Result<Option<VideoRecord>> {
    let mut videos = self.get_videos(&[video_id.to_string()]).await?;
    Ok(videos.pop())
  }

  /// Get channel statistics by id
  pub async fn get_channel(&self, channel_id: &str) -> Result<Option<ChannelRecord>> {
    let params = [
      ("part", "snippet,statistics".to_string()),
      ("id", channel_id.to_string()),
    ];

    let response: ApiListResponse<ApiChannel> = self
      .get_json("channels", &params)
      .await
      .map_err(|e| eyre!("Failed to get channel {}: {}", channel_id, e))?;

    Ok(response.items.into_iter().next().map(ApiChannel::into_record))
  }

  /// Latest uploads of a channel: one search for ids, one batch for statistics
  pub async fn get_recent_uploads(
    &self,
    channel_id: &str,
    max_results: u32,
  ) -> Result<Option<Vec<VideoRecord>>> {
    let params = [
      ("part", "snippet".to_string()),
      ("type", "video".to_string()),
      ("channelId", channel_id.to_string()),
      ("order", "date".to_string()),
      ("maxResults", page_size(max_results)),
    ];

    let response: ApiListResponse<ApiSearchItem> = self
      .get_json("search", &params)
      .await
      .map_err(|e| eyre!("Failed to list uploads of {}: {}", channel_id, e))?;

    let ids: Vec<String> = response
      .items
      .into_iter()
      .filter_map(|item| item.id.video_id)
      .collect();

    if ids.is_empty() {
      return Ok(None);
    }

    let mut videos = self.get_videos(&ids).await?;
    videos.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    Ok(Some(videos))
  }
}

fn page_size(requested: u32) -> String {
  requested.clamp(1, MAX_PAGE_SIZE).to_string()
}

impl VideoPlatform for YouTubeClient {
  fn is_configured(&self) -> bool {
    self.api_key.is_some()
  }

  fn api_calls(&self) -> u64 {
    self.calls.load(Ordering::SeqCst)
  }

  async fn trending_videos(&self, max_results: u32) -> FetchOutcome<Vec<VideoRecord>> {
    if !self.is_configured() {
      return FetchOutcome::Unconfigured;
    }
    FetchOutcome::from_result("trending_videos", self.trending(max_results).await.map(Some))
  }

  async fn search_recent_videos(&self, search: &VideoSearch) -> FetchOutcome<Vec<SearchHit>> {
    if !self.is_configured() {
      return FetchOutcome::Unconfigured;
    }
    FetchOutcome::from_result("search_recent_videos", self.search_videos(search).await.map(Some))
  }

  async fn search_channels(&self, query: &str, max_results: u32) -> FetchOutcome<Vec<String>> {
    if !self.is_configured() {
      return FetchOutcome::Unconfigured;
    }
    FetchOutcome::from_result(
      "search_channels",
      YouTubeClient::search_channels(self, query, max_results)
        .await
        .map(Some),
    )
  }

  async fn get_video_statistics(&self, video_id: &str) -> FetchOutcome<VideoRecord> {
    if !self.is_configured() {
      return FetchOutcome::Unconfigured;
    }
    FetchOutcome::from_result("get_video_statistics", self.get_video(video_id).await)
  }

  async fn get_channel_statistics(&self, channel_id: &str) -> FetchOutcome<ChannelRecord> {
    if !self.is_configured() {
      return FetchOutcome::Unconfigured;
    }
    FetchOutcome::from_result("get_channel_statistics", self.get_channel(channel_id).await)
  }

  async fn get_channel_recent_videos(
    &self,
    channel_id: &str,
    max_results: u32,
  ) -> FetchOutcome<Vec<VideoRecord>> {
    if !self.is_configured() {
      return FetchOutcome::Unconfigured;
    }
    FetchOutcome::from_result(
      "get_channel_recent_videos",
      self.get_recent_uploads(channel_id, max_results).await,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::youtube::types::SearchOrder;
  use chrono::Utc;
  use serde_json::json;
  use wiremock::matchers::{method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn client_for(server: &MockServer, key: Option<&str>) -> YouTubeClient {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.timeout_secs = 5;
    YouTubeClient::with_api_key(&config, key.map(String::from)).unwrap()
  }

  #[tokio::test]
  async fn test_channel_statistics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/channels"))
      .and(query_param("id", "UC123"))
      .and(query_param("key", "secret"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "items": [{
          "id": "UC123",
          "snippet": { "title": "Quick Cuts", "description": "shorts" },
          "statistics": { "subscriberCount": "50000", "viewCount": "2000000", "videoCount": "30" }
        }]
      })))
      .expect(1)
      .mount(&server)
      .await;

    let client = client_for(&server, Some("secret"));
    let outcome = client.get_channel_statistics("UC123").await;

    let channel = outcome.found().unwrap();
    assert_eq!(channel.name, "Quick Cuts");
    assert_eq!(channel.subscriber_count, 50_000);
    assert_eq!(client.api_calls(), 1);
  }

  #[tokio::test]
  async fn test_unknown_channel_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(path("/channels"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
      .mount(&server)
      .await;

    let client = client_for(&server, Some("secret"));
    assert_eq!(
      client.get_channel_statistics("UCnope").await,
      FetchOutcome::NotFound
    );
  }

  #[tokio::test]
  async fn test_unconfigured_never_touches_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
      .expect(0)
      .mount(&server)
      .await;

    let client = client_for(&server, None);
    assert!(!client.is_configured());
    assert_eq!(
      client.get_channel_statistics("UC1").await,
      FetchOutcome::Unconfigured
    );
    assert_eq!(client.trending_videos(10).await, FetchOutcome::Unconfigured);
    assert_eq!(client.api_calls(), 0);
  }

  #[tokio::test]
  async fn test_error_status_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(path("/videos"))
      .respond_with(ResponseTemplate::new(403).set_body_string("quotaExceeded"))
      .mount(&server)
      .await;

    let client = client_for(&server, Some("secret"));
    let outcome = client.get_video_statistics("v1").await;

    match outcome {
      FetchOutcome::Unavailable(reason) => assert!(reason.contains("403")),
      other => panic!("expected unavailable, got {:?}", other),
    }
    // Quota was still spent
    assert_eq!(client.api_calls(), 1);
  }

  #[tokio::test]
  async fn test_malformed_payload_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(path("/videos"))
      .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
      .mount(&server)
      .await;

    let client = client_for(&server, Some("secret"));
    assert!(matches!(
      client.trending_videos(5).await,
      FetchOutcome::Unavailable(_)
    ));
  }

  #[tokio::test]
  async fn test_recent_uploads_are_two_round_trips_newest_first() {
    let server = MockServer::start().await;
    Mock::given(path("/search"))
      .and(query_param("channelId", "UC1"))
      .and(query_param("order", "date"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "items": [
          { "id": { "videoId": "old" }, "snippet": { "channelId": "UC1" } },
          { "id": { "videoId": "new" }, "snippet": { "channelId": "UC1" } }
        ]
      })))
      .mount(&server)
      .await;
    Mock::given(path("/videos"))
      .and(query_param("id", "old,new"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "items": [
          {
            "id": "old",
            "snippet": { "channelId": "UC1", "publishedAt": "2025-05-01T00:00:00Z" },
            "statistics": { "viewCount": "10", "likeCount": "1" }
          },
          {
            "id": "new",
            "snippet": { "channelId": "UC1", "publishedAt": "2025-05-20T00:00:00Z" },
            "statistics": { "viewCount": "2000000", "likeCount": "9000" }
          }
        ]
      })))
      .mount(&server)
      .await;

    let client = client_for(&server, Some("secret"));
    let videos = client.get_channel_recent_videos("UC1", 10).await.found().unwrap();

    let ids: Vec<_> = videos.iter().map(|v| v.video_id.as_str()).collect();
    assert_eq!(ids, ["new", "old"]);
    assert_eq!(videos[0].view_count, 2_000_000);
    assert_eq!(client.api_calls(), 2);
  }

  #[tokio::test]
  async fn test_search_recent_videos_params() {
    let server = MockServer::start().await;
    Mock::given(path("/search"))
      .and(query_param("type", "video"))
      .and(query_param("order", "viewCount"))
      .and(query_param("maxResults", "50"))
      .and(query_param("q", "#shorts"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "items": [
          { "id": { "videoId": "v1" }, "snippet": { "channelId": "UC1", "channelTitle": "One" } },
          { "id": { "playlistId": "p1" }, "snippet": { "channelId": "UC2" } }
        ]
      })))
      .expect(1)
      .mount(&server)
      .await;

    let client = client_for(&server, Some("secret"));
    let search = VideoSearch {
      query: "#shorts".to_string(),
      published_after: Utc::now(),
      max_results: 500,
      order: SearchOrder::ViewCount,
    };

    let hits = client.search_recent_videos(&search).await.found().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].channel_title, "One");
  }

  #[tokio::test]
  async fn test_search_channels_appends_hashtag() {
    let server = MockServer::start().await;
    Mock::given(path("/search"))
      .and(query_param("type", "channel"))
      .and(query_param("q", "cooking #shorts"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "items": [{ "id": { "channelId": "UCcook" }, "snippet": { "channelId": "UCcook" } }]
      })))
      .mount(&server)
      .await;

    let client = client_for(&server, Some("secret"));
    let ids = VideoPlatform::search_channels(&client, "cooking", 5)
      .await
      .found()
      .unwrap();
    assert_eq!(ids, ["UCcook"]);
  }

  #[test]
  fn test_page_size_clamped() {
    assert_eq!(page_size(0), "1");
    assert_eq!(page_size(25), "25");
    assert_eq!(page_size(80), "50");
  }
}
