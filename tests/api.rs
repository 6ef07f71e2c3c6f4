//! HTTP surface tests: the app runs on an ephemeral port over the in-memory
//! store, with a stub image generator.

use async_trait::async_trait;
use engify::config::{BucketConfig, Config};
use engify::core::operations::Storage;
use engify::imagegen::{GeneratedImage, ImageGenerator, ImageRequest};
use engify::storage::MemoryStore;
use engify::{AppResult, AppState, build_app};
use reqwest::StatusCode;
use reqwest::header::{COOKIE, LOCATION, RETRY_AFTER};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

struct StubImages {
    calls: AtomicUsize,
}

#[async_trait]
impl ImageGenerator for StubImages {
    async fn generate(&self, request: ImageRequest) -> AppResult<GeneratedImage> {
        assert!(!request.prompt.is_empty());
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(GeneratedImage {
            url: format!("https://img.example/{}.png", n),
        })
    }
}

struct TestServer {
    base: String,
    state: AppState,
    client: reqwest::Client,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    async fn start(config: Config) -> Self {
        engify::observability::init_tracing_with_level("warn");

        let storage = Storage::new(Arc::new(MemoryStore::default()));
        let images = Arc::new(StubImages { calls: AtomicUsize::new(0) });
        let state = AppState::new(config, storage, images);
        let app = build_app(state.clone());

        let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind");
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = rx.await;
                })
                .await;
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            base: format!("http://{addr}"),
            state,
            client,
            _shutdown: tx,
        }
    }

    async fn default() -> Self {
        Self::start(Config::default()).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// `Cookie` header value for a fresh session with the given role
    async fn cookie(&self, role: &str) -> String {
        let session = self.state.sessions.create("ops@engify.ai", role).await.unwrap();
        format!("{}={}", self.state.config.auth.session_cookie, session.token)
    }

    async fn seed_pattern(&self, cookie: &str, slug: &str) -> Value {
        let resp = self
            .client
            .post(self.url("/api/admin/patterns"))
            .header(COOKIE, cookie)
            .json(&json!({ "name": "Persona", "slug": slug, "category": "foundational", "level": "beginner" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.unwrap()
    }

    async fn seed_prompt(&self, cookie: &str, body: Value) -> Value {
        let resp = self
            .client
            .post(self.url("/api/admin/prompts"))
            .header(COOKIE, cookie)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.unwrap()
    }
}

fn prompt_body(title: &str) -> Value {
    json!({
        "title": title,
        "content": "Review the following diff and list risky changes.",
        "category": "code-generation",
        "tags": ["Review", "git"]
    })
}

#[tokio::test]
async fn admin_api_requires_admin_session() {
    let server = TestServer::default().await;

    let resp = server.client.get(server.url("/api/admin/prompts")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    let resp = server
        .client
        .get(server.url("/api/admin/prompts"))
        .header(COOKIE, "engify_session=not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let editor = server.cookie("editor").await;
    let resp = server
        .client
        .get(server.url("/api/admin/prompts"))
        .header(COOKIE, &editor)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let admin = server.cookie("admin").await;
    let resp = server
        .client
        .get(server.url("/api/admin/prompts"))
        .header(COOKIE, &admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn opshub_redirects_to_login_without_cookie() {
    let server = TestServer::default().await;

    let resp = server.client.get(server.url("/opshub?tab=prompts")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        resp.headers()[LOCATION].to_str().unwrap(),
        "/login?callbackUrl=%2Fopshub%3Ftab%3Dprompts"
    );

    let admin = server.cookie("super_admin").await;
    let resp = server
        .client
        .get(server.url("/opshub"))
        .header(COOKIE, &admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"], "ops@engify.ai");
    assert_eq!(body["prompts"]["totalPrompts"], 0);
}

#[tokio::test]
async fn prompt_crud_tracks_revisions() {
    let server = TestServer::default().await;
    let admin = server.cookie("admin").await;

    server.seed_pattern(&admin, "persona").await;
    let mut body = prompt_body("Review a Pull Request");
    body["pattern"] = json!("persona");
    let created = server.seed_prompt(&admin, body).await;
    assert_eq!(created["slug"], "review-a-pull-request");
    assert_eq!(created["revision"], 1);
    assert_eq!(created["createdBy"], "ops@engify.ai");
    assert_eq!(created["tags"], json!(["Review", "git"]));
    let id = created["id"].as_str().unwrap().to_string();

    let resp = server
        .client
        .put(server.url("/api/admin/prompts"))
        .header(COOKIE, &admin)
        .json(&json!({ "id": id, "description": "Risk-focused review" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["revision"], 2);
    assert_eq!(updated["description"], "Risk-focused review");

    let resp = server
        .client
        .get(server.url("/api/prompts/review-a-pull-request"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Referenced pattern cannot be deleted
    let pattern_id = server.state.patterns.get("persona").await.unwrap().id;
    let resp = server
        .client
        .delete(server.url(&format!("/api/admin/patterns?id={}", pattern_id)))
        .header(COOKIE, &admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = server
        .client
        .delete(server.url(&format!("/api/admin/prompts?id={}", id)))
        .header(COOKIE, &admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: Value = resp.json().await.unwrap();
    assert_eq!(deleted["success"], true);

    let resp = server
        .client
        .get(server.url("/api/prompts/review-a-pull-request"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_input_is_rejected_with_400() {
    let server = TestServer::default().await;
    let admin = server.cookie("admin").await;

    let resp = server
        .client
        .post(server.url("/api/admin/prompts"))
        .header(COOKIE, &admin)
        .json(&json!({ "title": "", "content": "x", "category": "debugging" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Title is required");

    let resp = server
        .client
        .post(server.url("/api/admin/prompts"))
        .header(COOKIE, &admin)
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    let resp = server
        .client
        .delete(server.url("/api/admin/prompts"))
        .header(COOKIE, &admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server
        .client
        .put(server.url("/api/admin/workflows"))
        .header(COOKIE, &admin)
        .json(&json!({ "title": "No id" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn private_prompts_stay_hidden() {
    let server = TestServer::default().await;
    let admin = server.cookie("admin").await;

    let mut body = prompt_body("Internal Checklist");
    body["isPublic"] = json!(false);
    server.seed_prompt(&admin, body).await;
    server.seed_prompt(&admin, prompt_body("Public Checklist")).await;

    let resp = server.client.get(server.url("/api/prompts")).send().await.unwrap();
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["slug"], "public-checklist");

    let resp = server
        .client
        .get(server.url("/api/prompts/internal-checklist"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server
        .client
        .get(server.url("/api/admin/prompts"))
        .header(COOKIE, &admin)
        .send()
        .await
        .unwrap();
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["total"], 2);
}

#[tokio::test]
async fn prompt_listing_accepts_documented_sort_values() {
    let server = TestServer::default().await;
    let admin = server.cookie("admin").await;
    server.seed_prompt(&admin, prompt_body("Zebra Review")).await;
    server.seed_prompt(&admin, prompt_body("Alpha Review")).await;

    for sort in ["recent", "title", "updated"] {
        let resp = server
            .client
            .get(server.url(&format!("/api/prompts?sort={}", sort)))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "sort={}", sort);
        let page: Value = resp.json().await.unwrap();
        assert_eq!(page["total"], 2);
    }

    let resp = server.client.get(server.url("/api/prompts?sort=title")).send().await.unwrap();
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["items"][0]["slug"], "alpha-review");

    let resp = server.client.get(server.url("/api/prompts?sort=recency")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn prompt_pages_redirect_to_canonical_slug() {
    let server = TestServer::default().await;
    let admin = server.cookie("admin").await;
    let created = server.seed_prompt(&admin, prompt_body("Code Review")).await;
    let id = created["id"].as_str().unwrap();

    let resp = server
        .client
        .get(server.url(&format!("/prompts/{}?ref=home", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(resp.headers()[LOCATION].to_str().unwrap(), "/prompts/code-review?ref=home");

    let resp = server.client.get(server.url("/prompts/Code-Review")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(resp.headers()[LOCATION].to_str().unwrap(), "/prompts/code-review");

    let resp = server.client.get(server.url("/prompts/code-review")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["prompt"]["title"], "Code Review");

    let resp = server.client.get(server.url("/prompts/no-such-prompt")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_writes_are_rate_limited() {
    let mut config = Config::default();
    config.rate_limit.admin_write = BucketConfig { capacity: 2.0, refill_per_sec: 0.001 };
    let server = TestServer::start(config).await;
    let admin = server.cookie("admin").await;

    server.seed_prompt(&admin, prompt_body("First Prompt")).await;
    server.seed_prompt(&admin, prompt_body("Second Prompt")).await;

    let resp = server
        .client
        .post(server.url("/api/admin/prompts"))
        .header(COOKIE, &admin)
        .json(&prompt_body("Third Prompt"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key(RETRY_AFTER));
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Too many requests"));
}

#[tokio::test]
async fn image_generation_updates_prompt() {
    let mut config = Config::default();
    config.rate_limit.image = BucketConfig { capacity: 1.0, refill_per_sec: 0.001 };
    let server = TestServer::start(config).await;
    let admin = server.cookie("admin").await;
    let created = server.seed_prompt(&admin, prompt_body("Illustrated Prompt")).await;
    let id = created["id"].as_str().unwrap();

    let resp = server
        .client
        .post(server.url(&format!("/api/admin/prompts/{}/image", id)))
        .header(COOKIE, &admin)
        .json(&json!({ "style": "watercolor" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["imageUrl"], "https://img.example/1.png");

    let stored = server.state.prompts.get(id).await.unwrap();
    assert_eq!(stored.image_url.as_deref(), Some("https://img.example/1.png"));
    assert_eq!(stored.revision, 1);

    let resp = server
        .client
        .post(server.url(&format!("/api/admin/prompts/{}/image", id)))
        .header(COOKIE, &admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn image_generation_for_unknown_prompt_is_404() {
    let server = TestServer::default().await;
    let admin = server.cookie("admin").await;

    let resp = server
        .client
        .post(server.url("/api/admin/prompts/missing/image"))
        .header(COOKIE, &admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn workflows_only_published_are_public() {
    let server = TestServer::default().await;
    let admin = server.cookie("admin").await;

    for (title, status) in [("Release Checklist", "published"), ("Incident Draft", "draft")] {
        let resp = server
            .client
            .post(server.url("/api/admin/workflows"))
            .header(COOKIE, &admin)
            .json(&json!({
                "title": title,
                "category": "delivery",
                "status": status,
                "steps": [{ "title": "Collect context", "body": "" }]
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = server.client.get(server.url("/api/workflows")).send().await.unwrap();
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["total"], 1);

    let resp = server
        .client
        .get(server.url("/api/workflows/incident-draft"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server.client.get(server.url("/sitemap.xml")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()["content-type"].to_str().unwrap().starts_with("application/xml"));
    let xml = resp.text().await.unwrap();
    assert!(xml.contains("<loc>https://engify.ai/workflows/delivery/release-checklist</loc>"));
    assert!(!xml.contains("incident-draft"));
}

#[tokio::test]
async fn robots_points_at_sitemap() {
    let server = TestServer::default().await;
    let resp = server.client.get(server.url("/robots.txt")).send().await.unwrap();
    let body = resp.text().await.unwrap();
    assert!(body.contains("Disallow: /opshub"));
    assert!(body.contains("Sitemap: https://engify.ai/sitemap.xml"));
}

#[tokio::test]
async fn playground_renders_patterns() {
    let server = TestServer::default().await;

    let resp = server
        .client
        .get(server.url("/api/playground/patterns"))
        .send()
        .await
        .unwrap();
    let templates: Value = resp.json().await.unwrap();
    assert!(templates.as_array().unwrap().iter().any(|t| t["pattern"] == "chain-of-thought"));

    let resp = server
        .client
        .post(server.url("/api/playground"))
        .json(&json!({ "pattern": "chain-of-thought", "inputs": { "task": "Estimate the migration" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let rendered: Value = resp.json().await.unwrap();
    assert!(rendered["prompt"].as_str().unwrap().starts_with("Estimate the migration"));

    let resp = server
        .client
        .post(server.url("/api/playground"))
        .json(&json!({ "pattern": "telepathy", "inputs": { "task": "x" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_revokes_session() {
    let server = TestServer::default().await;
    let admin = server.cookie("admin").await;

    let resp = server
        .client
        .delete(server.url("/api/auth/session"))
        .header(COOKIE, &admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let cleared = resp.headers()["set-cookie"].to_str().unwrap();
    assert!(cleared.starts_with("engify_session="));

    let resp = server
        .client
        .get(server.url("/api/admin/prompts"))
        .header(COOKIE, &admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
