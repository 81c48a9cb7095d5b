//! End-to-end tests against a running instance.
//!
//! Point `E2E_BASE_URL` at a server that has had `elusive create-admin`
//! applied (e.g. `E2E_BASE_URL=http://127.0.0.1:1010 cargo test`). Without
//! the variable every test is a no-op so the suite stays green in plain
//! `cargo test` runs. `E2E_IMAGE_URL` may point at any downloadable image
//! to additionally exercise ingest and the endpoint-delete restriction.

use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

static BASE_URL: Lazy<Option<String>> = Lazy::new(|| std::env::var("E2E_BASE_URL").ok());

/// Login replaces the admin session, so tests sharing the admin user must
/// not interleave.
static SERIAL: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

struct TestContext {
    client: reqwest::Client,
    base_url: String,
}

impl TestContext {
    fn new() -> Option<Self> {
        let base_url = BASE_URL.clone()?;
        Some(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    fn get_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/client/login", self.base_url))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// Logs in as the bootstrap admin and returns (access, refresh).
    async fn admin_tokens(&self) -> (String, String) {
        let response = self.login("admin", "admin").await;
        assert_eq!(response.status().as_u16(), 200, "admin login failed");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["ok"], true);
        (
            body["accessToken"].as_str().unwrap().to_string(),
            body["refreshToken"].as_str().unwrap().to_string(),
        )
    }
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_indistinguishable() {
    let Some(context) = TestContext::new() else {
        eprintln!("E2E_BASE_URL not set, skipping");
        return;
    };

    let wrong_password = context.login("admin", "definitely-not-the-password").await;
    let unknown_user = context
        .login(&format!("ghost_{}", TestContext::get_timestamp()), "pw")
        .await;

    assert_eq!(wrong_password.status().as_u16(), 401);
    assert_eq!(unknown_user.status().as_u16(), 401);

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_user.json().await.unwrap();
    assert_eq!(a["message"], b["message"]);
}

#[tokio::test]
async fn login_validate_and_refresh_rotation() {
    let Some(context) = TestContext::new() else {
        eprintln!("E2E_BASE_URL not set, skipping");
        return;
    };
    let _guard = SERIAL.lock().await;

    let (access, refresh) = context.admin_tokens().await;

    // The freshly issued access token resolves to the user that logged in.
    let me = context
        .client
        .get(format!("{}/client/me", context.base_url))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(me.status().as_u16(), 200);
    let me_body: Value = me.json().await.unwrap();
    assert_eq!(me_body["user"]["username"], "admin");

    // Refresh rotates the access token.
    let refreshed = context
        .client
        .post(format!("{}/client/token", context.base_url))
        .bearer_auth(&access)
        .json(&json!({ "refreshToken": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(refreshed.status().as_u16(), 200);
    let refreshed_body: Value = refreshed.json().await.unwrap();
    let new_access = refreshed_body["accessToken"].as_str().unwrap().to_string();
    assert_ne!(new_access, access);

    // The old access token is dead, the new one works.
    let old = context
        .client
        .get(format!("{}/client/me", context.base_url))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(old.status().as_u16(), 401);

    let new = context
        .client
        .get(format!("{}/client/me", context.base_url))
        .bearer_auth(&new_access)
        .send()
        .await
        .unwrap();
    assert_eq!(new.status().as_u16(), 200);
}

#[tokio::test]
async fn a_second_login_revokes_the_previous_session() {
    let Some(context) = TestContext::new() else {
        eprintln!("E2E_BASE_URL not set, skipping");
        return;
    };
    let _guard = SERIAL.lock().await;

    let (first_access, first_refresh) = context.admin_tokens().await;
    let (second_access, _) = context.admin_tokens().await;
    assert_ne!(first_access, second_access);

    // The first session's access token stops resolving the moment the
    // second login lands.
    let stale_me = context
        .client
        .get(format!("{}/client/me", context.base_url))
        .bearer_auth(&first_access)
        .send()
        .await
        .unwrap();
    assert_eq!(stale_me.status().as_u16(), 401);

    // Its refresh token is gone too; it cannot mint new access tokens.
    let stale_refresh = context
        .client
        .post(format!("{}/client/token", context.base_url))
        .bearer_auth(&second_access)
        .json(&json!({ "refreshToken": first_refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(stale_refresh.status().as_u16(), 401);

    // The replacement session is the live one.
    let live_me = context
        .client
        .get(format!("{}/client/me", context.base_url))
        .bearer_auth(&second_access)
        .send()
        .await
        .unwrap();
    assert_eq!(live_me.status().as_u16(), 200);
}

#[tokio::test]
async fn expired_access_tokens_are_rejected() {
    let Some(context) = TestContext::new() else {
        eprintln!("E2E_BASE_URL not set, skipping");
        return;
    };
    // Needs a server started with SESSION_TTL_SECS=1.
    if std::env::var("E2E_SHORT_TTL").is_err() {
        eprintln!("E2E_SHORT_TTL not set, skipping");
        return;
    }
    let _guard = SERIAL.lock().await;

    let (access, _) = context.admin_tokens().await;

    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    let me = context
        .client
        .get(format!("{}/client/me", context.base_url))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(me.status().as_u16(), 401);

    let body: Value = me.json().await.unwrap();
    assert_eq!(body["message"], "Invalid authorization header. Please refresh.");
}

#[tokio::test]
async fn requests_without_a_bearer_token_are_rejected() {
    let Some(context) = TestContext::new() else {
        eprintln!("E2E_BASE_URL not set, skipping");
        return;
    };

    let response = context
        .client
        .get(format!("{}/client/me", context.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert_eq!(body["message"], "Invalid authorization header. Please refresh.");
}

#[tokio::test]
async fn duplicate_usernames_are_rejected_without_a_second_row() {
    let Some(context) = TestContext::new() else {
        eprintln!("E2E_BASE_URL not set, skipping");
        return;
    };
    let _guard = SERIAL.lock().await;

    let (access, _) = context.admin_tokens().await;
    let username = format!("testuser_{}", TestContext::get_timestamp());

    let created = context
        .client
        .post(format!("{}/client/users", context.base_url))
        .bearer_auth(&access)
        .json(&json!({ "username": username, "password": "SecurePass123", "role": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 200, "user creation failed");
    let created_body: Value = created.json().await.unwrap();
    let user_id = created_body["user"]["id"].as_str().unwrap().to_string();

    let duplicate = context
        .client
        .post(format!("{}/client/users", context.base_url))
        .bearer_auth(&access)
        .json(&json!({ "username": username, "password": "OtherPass456", "role": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status().as_u16(), 400);

    let listed = context
        .client
        .get(format!("{}/client/users", context.base_url))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    let listed_body: Value = listed.json().await.unwrap();
    let matching: Vec<_> = listed_body["users"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|u| u["username"] == username.as_str())
        .collect();
    assert_eq!(matching.len(), 1);

    // Cleanup.
    let deleted = context
        .client
        .delete(format!("{}/client/users/{}", context.base_url, user_id))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 200);
}

#[tokio::test]
async fn random_image_is_404_for_unknown_or_empty_endpoints() {
    let Some(context) = TestContext::new() else {
        eprintln!("E2E_BASE_URL not set, skipping");
        return;
    };

    let unknown = context
        .client
        .get(format!(
            "{}/no_such_endpoint_{}",
            context.base_url,
            TestContext::get_timestamp()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status().as_u16(), 404);

    let _guard = SERIAL.lock().await;
    let (access, _) = context.admin_tokens().await;
    let name = format!("empty_{}", TestContext::get_timestamp());

    let created = context
        .client
        .post(format!("{}/client/endpoints", context.base_url))
        .bearer_auth(&access)
        .json(&json!({ "name": name }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 200);
    let created_body: Value = created.json().await.unwrap();
    let endpoint_id = created_body["endpoint"]["id"].as_str().unwrap().to_string();

    let empty = context
        .client
        .get(format!("{}/{}", context.base_url, name))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status().as_u16(), 404);

    let deleted = context
        .client
        .delete(format!("{}/client/endpoints/{}", context.base_url, endpoint_id))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 200);
}

#[tokio::test]
async fn ingest_rejects_payloads_that_are_not_images() {
    let Some(context) = TestContext::new() else {
        eprintln!("E2E_BASE_URL not set, skipping");
        return;
    };
    let _guard = SERIAL.lock().await;

    let (access, _) = context.admin_tokens().await;
    let name = format!("sniff_{}", TestContext::get_timestamp());

    let created = context
        .client
        .post(format!("{}/client/endpoints", context.base_url))
        .bearer_auth(&access)
        .json(&json!({ "name": name }))
        .send()
        .await
        .unwrap();
    let created_body: Value = created.json().await.unwrap();
    let endpoint_id = created_body["endpoint"]["id"].as_str().unwrap().to_string();

    // The service's own root route returns JSON, not an image.
    let ingested = context
        .client
        .post(format!("{}/client/images", context.base_url))
        .bearer_auth(&access)
        .json(&json!({
            "imageUrl": format!("{}/", context.base_url),
            "endpointId": endpoint_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(ingested.status().as_u16(), 400);

    let deleted = context
        .client
        .delete(format!("{}/client/endpoints/{}", context.base_url, endpoint_id))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 200);
}

#[tokio::test]
async fn endpoint_with_images_cannot_be_deleted() {
    let Some(context) = TestContext::new() else {
        eprintln!("E2E_BASE_URL not set, skipping");
        return;
    };
    let Ok(image_url) = std::env::var("E2E_IMAGE_URL") else {
        eprintln!("E2E_IMAGE_URL not set, skipping");
        return;
    };
    let _guard = SERIAL.lock().await;

    let (access, _) = context.admin_tokens().await;
    let name = format!("restrict_{}", TestContext::get_timestamp());

    let created = context
        .client
        .post(format!("{}/client/endpoints", context.base_url))
        .bearer_auth(&access)
        .json(&json!({ "name": name }))
        .send()
        .await
        .unwrap();
    let created_body: Value = created.json().await.unwrap();
    let endpoint_id = created_body["endpoint"]["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let ingested = context
            .client
            .post(format!("{}/client/images", context.base_url))
            .bearer_auth(&access)
            .json(&json!({ "imageUrl": image_url, "endpointId": endpoint_id }))
            .send()
            .await
            .unwrap();
        assert_eq!(ingested.status().as_u16(), 200, "ingest failed");
    }

    let listed = context
        .client
        .get(format!("{}/client/images/{}", context.base_url, endpoint_id))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    let listed_body: Value = listed.json().await.unwrap();
    let image_ids: Vec<String> = listed_body["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(image_ids.len(), 2);

    // Restricted while images remain attached.
    let rejected = context
        .client
        .delete(format!("{}/client/endpoints/{}", context.base_url, endpoint_id))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status().as_u16(), 400);

    // Repeated random draws eventually surface every image.
    let mut seen = std::collections::HashSet::new();
    for _ in 0..100 {
        let random = context
            .client
            .get(format!("{}/{}", context.base_url, name))
            .send()
            .await
            .unwrap();
        assert_eq!(random.status().as_u16(), 200);
        let random_body: Value = random.json().await.unwrap();
        seen.insert(random_body["image"]["id"].as_str().unwrap().to_string());
        if seen.len() == image_ids.len() {
            break;
        }
    }
    assert_eq!(seen.len(), image_ids.len(), "random draws never surfaced every image");
    for id in &image_ids {
        assert!(seen.contains(id));
    }

    // Cleanup: images first, then the endpoint goes through.
    for id in &image_ids {
        let image_deleted = context
            .client
            .delete(format!("{}/client/images/{}", context.base_url, id))
            .bearer_auth(&access)
            .send()
            .await
            .unwrap();
        assert_eq!(image_deleted.status().as_u16(), 200);
    }

    let deleted = context
        .client
        .delete(format!("{}/client/endpoints/{}", context.base_url, endpoint_id))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 200);
}
