use crate::config::ScanConfig;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{de, Deserialize, Deserializer};

/// Ids show up as strings on the web endpoint and as numbers on some mirrors.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("Unsupported id value: {}", other))),
    }
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "Unsupported id value: {}",
            other
        ))),
    }
}

/// For fields only shown in verbose mode: a value of the wrong type reads as
/// `None` instead of failing the whole profile.
fn lenient_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Reads `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct EdgeCount {
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CaptionNode {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CaptionEdge {
    #[serde(default)]
    pub node: CaptionNode,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CaptionConnection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub edges: Vec<CaptionEdge>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MediaNode {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub shortcode: Option<String>,
    #[serde(default)]
    pub taken_at_timestamp: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub edge_liked_by: EdgeCount,
    #[serde(default, deserialize_with = "null_as_default")]
    pub edge_media_preview_like: EdgeCount,
    #[serde(default, deserialize_with = "null_as_default")]
    pub edge_media_to_comment: EdgeCount,
    #[serde(default, deserialize_with = "null_as_default")]
    pub edge_media_to_caption: CaptionConnection,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_video: bool,
    #[serde(default)]
    pub video_duration: Option<f64>,
    #[serde(default)]
    pub video_view_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MediaEdge {
    #[serde(default)]
    pub node: MediaNode,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MediaConnection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub edges: Vec<MediaEdge>,
}

/// The `data.user` object of the `web_profile_info` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub username: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub business_category_name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_private: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_verified: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_business_account: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub is_professional_account: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub is_joined_recently: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub has_clips: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub highlight_reel_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_id")]
    pub fbid: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub profile_pic_url_hd: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub edge_followed_by: EdgeCount,
    #[serde(default, deserialize_with = "null_as_default")]
    pub edge_follow: EdgeCount,
    #[serde(default, deserialize_with = "null_as_default")]
    pub edge_owner_to_timeline_media: MediaConnection,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaKind {
    Image,
    Video {
        duration_secs: Option<f64>,
        views: Option<u64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    pub id: Option<String>,
    pub shortcode: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
    pub likes: u64,
    pub comments: u64,
    pub kind: MediaKind,
    pub caption: Option<String>,
    pub link: Option<String>,
}

impl PostSummary {
    fn from_node(node: MediaNode, config: &ScanConfig) -> Self {
        let likes = if node.edge_liked_by.count > 0 {
            node.edge_liked_by.count
        } else {
            node.edge_media_preview_like.count
        };
        let kind = if node.is_video {
            MediaKind::Video {
                duration_secs: node.video_duration,
                views: node.video_view_count,
            }
        } else {
            MediaKind::Image
        };
        let caption = node
            .edge_media_to_caption
            .edges
            .into_iter()
            .next()
            .and_then(|edge| edge.node.text)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        let shortcode = node.shortcode.filter(|code| !code.is_empty());
        let link = shortcode.as_deref().map(|code| config.post_link(code));

        Self {
            id: node.id,
            taken_at: node
                .taken_at_timestamp
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            likes,
            comments: node.edge_media_to_comment.count,
            kind,
            caption,
            link,
            shortcode,
        }
    }

    pub fn interactions(&self) -> u64 {
        self.likes + self.comments
    }
}

/// Flags only shown in verbose mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileExtras {
    pub is_professional: bool,
    pub joined_recently: bool,
    pub has_clips: bool,
    pub highlight_count: Option<u64>,
    pub facebook_id: Option<String>,
    pub profile_pic_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSnapshot {
    pub username: String,
    pub full_name: Option<String>,
    pub id: String,
    pub post_count: u64,
    pub follower_count: u64,
    pub following_count: u64,
    pub is_private: bool,
    pub is_verified: bool,
    pub is_business: bool,
    pub biography: Option<String>,
    pub external_url: Option<String>,
    pub category: Option<String>,
    pub profile_url: String,
    pub posts: Vec<PostSummary>,
    pub extras: ProfileExtras,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl ProfileSnapshot {
    pub fn from_raw(raw: RawUser, config: &ScanConfig) -> Self {
        let media = raw.edge_owner_to_timeline_media;
        let posts = media
            .edges
            .into_iter()
            .map(|edge| PostSummary::from_node(edge.node, config))
            .collect();

        Self {
            profile_url: config.profile_page(&raw.username),
            username: raw.username,
            full_name: non_empty(raw.full_name),
            id: raw.id,
            post_count: media.count,
            follower_count: raw.edge_followed_by.count,
            following_count: raw.edge_follow.count,
            is_private: raw.is_private,
            is_verified: raw.is_verified,
            is_business: raw.is_business_account,
            biography: non_empty(raw.biography),
            external_url: non_empty(raw.external_url),
            category: non_empty(raw.business_category_name).or(non_empty(raw.category_name)),
            posts,
            extras: ProfileExtras {
                is_professional: raw.is_professional_account,
                joined_recently: raw.is_joined_recently,
                has_clips: raw.has_clips,
                highlight_count: raw.highlight_reel_count,
                facebook_id: raw.fbid,
                profile_pic_url: non_empty(raw.profile_pic_url_hd),
            },
        }
    }
}
