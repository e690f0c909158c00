use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The backend is loose about scalar types: ids arrive as strings or numbers
/// depending on the endpoint version, so normalize to `String` up front.
fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// `hasMore` may be a boolean or the numeric literal 1
fn bool_or_number<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    })
}

/// Pagination cursor may be a number or a numeric string
fn opt_u64_lenient<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }))
}

fn failure_code() -> i64 {
    -1
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[serde(default = "failure_code")]
    pub code: i64,
    #[serde(default)]
    pub data: Option<VideoData>,
}

#[derive(Debug, Deserialize)]
pub struct VideoData {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub play: Option<String>,
    #[serde(default)]
    pub music: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub unique_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserPostsResponse {
    #[serde(default = "failure_code")]
    pub code: i64,
    #[serde(default)]
    pub data: Option<UserPostsData>,
}

/// The post list arrives under `videos` or `posts` depending on API version
#[derive(Debug, Deserialize)]
pub struct UserPostsData {
    #[serde(default)]
    pub videos: Option<Vec<PostItem>>,
    #[serde(default)]
    pub posts: Option<Vec<PostItem>>,
    #[serde(default, deserialize_with = "opt_u64_lenient")]
    pub cursor: Option<u64>,
    #[serde(default, rename = "hasMore", deserialize_with = "bool_or_number")]
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
pub struct PostItem {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub video_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub origin_cover: Option<String>,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub play: Option<String>,
    #[serde(default)]
    pub hdplay: Option<String>,
    #[serde(default)]
    pub music: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_has_more_and_string_cursor() {
        let raw = r#"{"code":0,"data":{"videos":[],"cursor":"1700000000000","hasMore":1}}"#;
        let resp: UserPostsResponse = serde_json::from_str(raw).unwrap();
        let data = resp.data.unwrap();
        assert!(data.has_more);
        assert_eq!(data.cursor, Some(1_700_000_000_000));
    }

    #[test]
    fn boolean_has_more() {
        let raw = r#"{"code":0,"data":{"posts":[],"cursor":5,"hasMore":false}}"#;
        let resp: UserPostsResponse = serde_json::from_str(raw).unwrap();
        let data = resp.data.unwrap();
        assert!(!data.has_more);
        assert_eq!(data.cursor, Some(5));
    }

    #[test]
    fn numeric_video_id() {
        let raw = r#"{"video_id":7300000000000000000}"#;
        let item: PostItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.video_id.as_deref(), Some("7300000000000000000"));
    }

    #[test]
    fn missing_code_means_failure() {
        let resp: ApiResponse = serde_json::from_str("{}").unwrap();
        assert_ne!(resp.code, 0);
    }
}
