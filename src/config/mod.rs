use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://i.instagram.com";
pub const PROFILE_PATH: &str = "/api/v1/users/web_profile_info/";
pub const WEB_BASE_URL: &str = "https://www.instagram.com";

/// Application id the public web client sends with every API call.
pub const WEB_APP_ID: &str = "936619743392459";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Everything the client needs to know about the endpoint it talks to.
///
/// There is no file or environment backing this: the defaults are the
/// production endpoint and tests swap in a mock server URL.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub base_url: String,
    pub web_url: String,
    pub app_id: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            web_url: WEB_BASE_URL.to_string(),
            app_id: WEB_APP_ID.to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl ScanConfig {
    /// Public page of the account, used as the request referer.
    pub fn profile_page(&self, username: &str) -> String {
        format!("{}/{}/", self.web_url.trim_end_matches('/'), username)
    }

    pub fn post_link(&self, shortcode: &str) -> String {
        format!("{}/p/{}/", self.web_url.trim_end_matches('/'), shortcode)
    }
}
