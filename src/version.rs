//! Version information and the new-release notice

use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Version injected at compile time via OVHCLOUD_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("OVHCLOUD_VERSION") {
    Some(v) => v,
    None => "dev",
};

const LATEST_RELEASE_URL: &str = "https://api.github.com/repos/ovh/ovhcloud-cli/releases/latest";

/// Notice filled in by the background check, read once at exit
pub type ReleaseNotice = Arc<OnceLock<String>>;

/// Message shown when `latest` differs from the running version
pub fn notice_for(current: &str, latest: &str) -> Option<String> {
    let latest = latest.trim();
    let bare = |v: &str| v.trim().trim_start_matches('v').to_string();
    if latest.is_empty() || bare(latest) == bare(current) {
        return None;
    }
    Some(format!(
        "A new version of ovhcloud is available: {} (current: {})",
        latest, current
    ))
}

async fn latest_tag(url: &str) -> Option<String> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("ovhcloud/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(5))
        .build()
        .ok()?;
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await
        .ok()?;
    let body: serde_json::Value = response.json().await.ok()?;
    body.get("tag_name")?.as_str().map(String::from)
}

/// Start the release check in the background; development builds skip it
///
/// The task is never awaited, only its result is read at exit.
pub fn spawn_release_check() -> ReleaseNotice {
    let notice = ReleaseNotice::default();
    if VERSION == "dev" {
        return notice;
    }

    let slot = notice.clone();
    tokio::spawn(async move {
        match latest_tag(LATEST_RELEASE_URL).await {
            Some(tag) => {
                if let Some(message) = notice_for(VERSION, &tag) {
                    let _ = slot.set(message);
                }
            }
            None => tracing::debug!("Release check failed"),
        }
    });
    notice
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_only_for_other_versions() {
        assert_eq!(notice_for("v0.3.0", "v0.3.0"), None);
        assert_eq!(notice_for("0.3.0", "v0.3.0"), None);
        assert_eq!(notice_for("v0.3.0", "0.3.0"), None);
        assert_eq!(notice_for("v0.3.0", " 0.3.0\n"), None);
        assert_eq!(notice_for("v0.3.0", ""), None);
        assert_eq!(
            notice_for("v0.3.0", "v0.4.0").as_deref(),
            Some("A new version of ovhcloud is available: v0.4.0 (current: v0.3.0)")
        );
    }
}
