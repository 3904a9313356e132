//! Danbooru API client: post search, tag autocomplete, artist lookup.
//!
//! Upstream failures (network, timeout, non-200) degrade to "no result" and
//! are logged rather than propagated; the callers report that to the user.

use crate::log_internal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Extensions Discord can embed inline as an image.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
/// Extensions we accept as a playable video attachment.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm"];

/// Content rating filter.  Changing it swaps the whole tag filter, matching
/// the rating buttons on an image/video session.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rating {
    Safe,
    Questionable,
    Explicit,
}

impl Rating {
    pub fn tag(self) -> &'static str {
        match self {
            Rating::Safe => "rating:safe",
            Rating::Questionable => "rating:questionable",
            Rating::Explicit => "rating:explicit",
        }
    }
}

/// One post as returned by the posts search endpoint.  Ephemeral: lives for
/// one interaction, except inside a navigation history.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub large_file_url: Option<String>,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub tag_string: String,
    #[serde(default)]
    pub tag_string_artist: String,
    #[serde(default)]
    pub tag_string_character: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub fav_count: u64,
    #[serde(default)]
    pub file_ext: String,
}

impl Post {
    /// Preferred media URL; the API sometimes only populates the resized one.
    pub fn media_url(&self) -> Option<&str> {
        self.file_url.as_deref().or(self.large_file_url.as_deref())
    }

    pub fn page_url(&self, api_url: &str) -> String {
        format!("{}/posts/{}", api_url, self.id)
    }

    /// First (main) artist tag, if any.
    pub fn main_artist(&self) -> Option<&str> {
        self.tag_string_artist.split_whitespace().next()
    }

    /// First character tag, `_`-separated, if any.
    pub fn main_character(&self) -> Option<&str> {
        self.tag_string_character.split_whitespace().next()
    }

    fn has_image_url(&self) -> bool {
        let Some(url) = self.media_url() else {
            return false;
        };
        let url = url.to_ascii_lowercase();
        IMAGE_EXTENSIONS
            .iter()
            .any(|ext| url.ends_with(&format!(".{}", ext)))
    }

    fn has_video_ext(&self) -> bool {
        self.media_url().is_some() && VIDEO_EXTENSIONS.contains(&self.file_ext.as_str())
    }
}

#[derive(Deserialize)]
struct TagSuggestion {
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Deserialize)]
struct TagRecord {
    #[serde(default)]
    post_count: u64,
}

/// Thin HTTP client over the image board.  Cheap to clone; the inner reqwest
/// client is reference counted.
#[derive(Clone)]
pub struct BooruClient {
    client: reqwest::Client,
    api_url: String,
}

impl BooruClient {
    pub fn new(api_url: &str, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Random image matching `tags`, or `None` if the upstream has nothing
    /// embeddable or is unreachable.
    pub async fn fetch_image(&self, tags: &str) -> Option<Post> {
        let posts = self.search(tags, 10).await?;
        first_embeddable_image(posts)
    }

    /// Random video matching `tags`.  The upstream is asked for `tags video`
    /// so plain images don't crowd out the candidate list.
    pub async fn fetch_video(&self, tags: &str) -> Option<Post> {
        let video_tags = format!("{} video", tags);
        let posts = self.search(&video_tags, 20).await?;
        first_playable_video(posts)
    }

    async fn search(&self, tags: &str, limit: u8) -> Option<Vec<Post>> {
        let url = format!("{}/posts.json", self.api_url);
        let limit = limit.to_string();
        let result = self
            .client
            .get(&url)
            .query(&[("tags", tags), ("random", "true"), ("limit", limit.as_str())])
            .send()
            .await
            .and_then(|resp| resp.error_for_status());

        let resp = match result {
            Ok(resp) => resp,
            Err(err) => {
                log_internal!("Post search failed for `{}`: {}", tags, err);
                return None;
            }
        };

        match resp.json::<Vec<Post>>().await {
            Ok(posts) => Some(posts),
            Err(err) => {
                log_internal!("Post search returned bad JSON for `{}`: {}", tags, err);
                None
            }
        }
    }

    /// Up to 10 tag suggestions for a partial query.  Empty on failure.
    pub async fn tag_suggestions(&self, query: &str) -> Vec<String> {
        let url = format!("{}/autocomplete.json", self.api_url);
        let result = self
            .client
            .get(&url)
            .query(&[
                ("search[query]", query),
                ("search[type]", "tag_query"),
                ("limit", "10"),
            ])
            .send()
            .await
            .and_then(|resp| resp.error_for_status());

        let resp = match result {
            Ok(resp) => resp,
            Err(err) => {
                log_internal!("Autocomplete failed for `{}`: {}", query, err);
                return Vec::new();
            }
        };

        let suggestions: Vec<TagSuggestion> = match resp.json().await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                log_internal!("Autocomplete returned bad JSON for `{}`: {}", query, err);
                return Vec::new();
            }
        };

        suggestions
            .into_iter()
            .filter_map(|s| s.value.or(s.label))
            .take(10)
            .collect()
    }

    /// Total cataloged post count for an exact tag name.  `None` on any
    /// failure; the economy treats that as an unknown artist.
    pub async fn artist_post_count(&self, name: &str) -> Option<u64> {
        let url = format!("{}/tags.json", self.api_url);
        let result = self
            .client
            .get(&url)
            .query(&[("search[name]", name)])
            .send()
            .await
            .and_then(|resp| resp.error_for_status());

        let resp = match result {
            Ok(resp) => resp,
            Err(err) => {
                log_internal!("Artist lookup failed for `{}`: {}", name, err);
                return None;
            }
        };

        let records: Vec<TagRecord> = match resp.json().await {
            Ok(records) => records,
            Err(err) => {
                log_internal!("Artist lookup returned bad JSON for `{}`: {}", name, err);
                return None;
            }
        };

        records.first().map(|r| r.post_count)
    }

    /// Raw media download, used to re-upload videos as attachments.  The
    /// caller enforces the platform attachment size limit.
    pub async fn download(&self, url: &str) -> Option<Vec<u8>> {
        let result = self
            .client
            .get(url)
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .and_then(|resp| resp.error_for_status());

        match result {
            Ok(resp) => match resp.bytes().await {
                Ok(bytes) => Some(bytes.to_vec()),
                Err(err) => {
                    log_internal!("Media download failed for `{}`: {}", url, err);
                    None
                }
            },
            Err(err) => {
                log_internal!("Media download failed for `{}`: {}", url, err);
                None
            }
        }
    }
}

/// First search result whose media URL Discord can embed as an image.
fn first_embeddable_image(posts: Vec<Post>) -> Option<Post> {
    posts.into_iter().find(Post::has_image_url)
}

/// First search result that is a playable video.
fn first_playable_video(posts: Vec<Post>) -> Option<Post> {
    posts.into_iter().find(Post::has_video_ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: u64, url: &str, ext: &str) -> Post {
        Post {
            id,
            file_url: Some(url.to_owned()),
            file_ext: ext.to_owned(),
            ..Post::default()
        }
    }

    #[test]
    fn picks_first_embeddable_image() {
        let posts = vec![
            post(1, "https://cdn.example/a.swf", "swf"),
            post(2, "https://cdn.example/b.PNG", "png"),
            post(3, "https://cdn.example/c.jpg", "jpg"),
        ];
        let chosen = first_embeddable_image(posts).unwrap();
        assert_eq!(chosen.id, 2);
    }

    #[test]
    fn skips_posts_without_a_media_url() {
        let mut hidden = post(1, "", "jpg");
        hidden.file_url = None;
        let posts = vec![hidden, post(2, "https://cdn.example/b.webp", "webp")];
        assert_eq!(first_embeddable_image(posts).unwrap().id, 2);
    }

    #[test]
    fn video_selection_checks_file_ext_not_url() {
        let posts = vec![
            post(1, "https://cdn.example/a.png", "png"),
            post(2, "https://cdn.example/b.mp4", "mp4"),
        ];
        assert_eq!(first_playable_video(posts).unwrap().id, 2);
    }

    #[test]
    fn main_artist_is_first_tag() {
        let mut p = post(1, "https://cdn.example/a.jpg", "jpg");
        p.tag_string_artist = "some_artist another_artist".to_owned();
        assert_eq!(p.main_artist(), Some("some_artist"));
        p.tag_string_artist = String::new();
        assert_eq!(p.main_artist(), None);
    }
}
