//! Integration tests for the HTTP transport.
//!
//! Each test starts a local axum server standing in for the listings API and
//! points an [`ApiClient`] at it.

use axum::extract::{Multipart, RawQuery, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use rentboard_cli::ApiClient;
use rentboard_core::{
    AdDraft, AdsApi, AppError, Browser, BrowserSettings, FetchError, FileSessionStorage,
    LoadOutcome, MemoryStorage, PageRequest, RestoreOutcome, SearchCriteria, Submitter, ViewId,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Queries = Arc<Mutex<Vec<String>>>;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Serve `/api/ads` with a fixed body, recording every raw query string
async fn serve_ads(body: Value) -> (String, Queries) {
    let queries = Queries::default();
    let recorded = queries.clone();

    let router = Router::new().route(
        "/api/ads",
        get(move |RawQuery(query): RawQuery| {
            let recorded = recorded.clone();
            let body = body.clone();
            async move {
                recorded.lock().unwrap().push(query.unwrap_or_default());
                Json(body)
            }
        }),
    );

    (serve(router).await, queries)
}

fn listings(count: usize) -> Value {
    let ads: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": i,
                "city": "minsk",
                "rooms": 2,
                "price": 300 + i,
                "address": format!("Nezavisimosti {}", i),
                "image": format!("https://img.example/{}.jpg", i),
                "timestamp": "2024-05-01 10:30:00"
            })
        })
        .collect();
    json!({ "ads": ads, "has_more": true, "total": 40 })
}

fn settings(base_url: &str) -> BrowserSettings {
    BrowserSettings {
        api_base_url: base_url.to_string(),
        user_id: Some("854773231".into()),
        request_timeout_secs: 1,
        ..Default::default()
    }
}

fn request(view: ViewId, criteria: SearchCriteria) -> PageRequest {
    PageRequest {
        view,
        criteria,
        owner: None,
        offset: 0,
        limit: 7,
    }
}

fn minsk_two_rooms() -> SearchCriteria {
    SearchCriteria {
        city: Some("minsk".into()),
        rooms: Some("2".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn fetch_sends_criteria_offset_and_limit() {
    let (base, queries) = serve_ads(listings(7)).await;
    let client = ApiClient::new(&settings(&base)).unwrap();

    let page = client
        .fetch_ads(&request(ViewId::Search, minsk_two_rooms()))
        .await
        .unwrap();

    assert_eq!(page.len(), 7);
    assert_eq!(page[3].images, vec!["https://img.example/3.jpg"]);
    assert!(page[0].created_at.is_some());
    assert_eq!(
        queries.lock().unwrap().as_slice(),
        ["city=minsk&rooms=2&offset=0&limit=7"]
    );
}

#[tokio::test]
async fn fetch_for_mine_carries_user_id() {
    let (base, queries) = serve_ads(listings(1)).await;
    let client = ApiClient::new(&settings(&base)).unwrap();

    let mut page_request = request(ViewId::Mine, SearchCriteria::default());
    page_request.owner = Some("854773231".into());
    page_request.offset = 14;
    client.fetch_ads(&page_request).await.unwrap();

    assert_eq!(
        queries.lock().unwrap().as_slice(),
        ["user_id=854773231&offset=14&limit=7"]
    );
}

#[tokio::test]
async fn empty_object_is_an_empty_page() {
    let (base, _) = serve_ads(json!({})).await;
    let client = ApiClient::new(&settings(&base)).unwrap();

    let page = client
        .fetch_ads(&request(ViewId::Newest, SearchCriteria::default()))
        .await
        .unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let base = serve(Router::new().route("/api/ads", get(|| async { "<html>oops</html>" }))).await;
    let client = ApiClient::new(&settings(&base)).unwrap();

    let err = client
        .fetch_ads(&request(ViewId::Newest, SearchCriteria::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse(_)));
}

#[tokio::test]
async fn server_error_is_a_network_error() {
    let base = serve(Router::new().route(
        "/api/ads",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
        }),
    ))
    .await;
    let client = ApiClient::new(&settings(&base)).unwrap();

    let err = client
        .fetch_ads(&request(ViewId::Search, SearchCriteria::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Network(ref msg) if msg.contains("500")));
}

#[tokio::test]
async fn slow_server_times_out() {
    let base = serve(Router::new().route(
        "/api/ads",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"ads": []}))
        }),
    ))
    .await;
    let client = ApiClient::new(&settings(&base)).unwrap();

    let err = client
        .fetch_ads(&request(ViewId::Search, SearchCriteria::default()))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Timeout);
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&settings(&format!("http://{}", addr))).unwrap();
    let err = client
        .fetch_ads(&request(ViewId::Search, SearchCriteria::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
}

#[tokio::test]
async fn search_survives_restart() {
    let (base, queries) = serve_ads(listings(7)).await;
    let dir = tempfile::tempdir().unwrap();

    {
        let client = Arc::new(ApiClient::new(&settings(&base)).unwrap());
        let storage = Arc::new(FileSessionStorage::in_dir(dir.path()).unwrap());
        let browser = Browser::new(settings(&base), client.clone(), storage, client);
        browser.search(minsk_two_rooms()).await.unwrap();
        browser.load_more(ViewId::Search).await.unwrap();
    }

    let client = Arc::new(ApiClient::new(&settings(&base)).unwrap());
    let storage = Arc::new(FileSessionStorage::in_dir(dir.path()).unwrap());
    let restarted = Browser::new(settings(&base), client.clone(), storage, client);

    let outcome = restarted.restore().await;
    assert!(matches!(outcome, RestoreOutcome::Restored { .. }));
    assert_eq!(restarted.view(ViewId::Search).records.len(), 7);

    let queries = queries.lock().unwrap();
    assert_eq!(
        queries.as_slice(),
        [
            "city=minsk&rooms=2&offset=0&limit=7",
            "city=minsk&rooms=2&offset=7&limit=7",
            "city=minsk&rooms=2&offset=0&limit=7",
        ]
    );
}

#[tokio::test]
async fn scraped_rows_keyed_by_link_are_merged() {
    let rows: Vec<Value> = (1..=2)
        .map(|i| {
            json!({
                "link": format!("https://re.kufar.by/vi/{}", i),
                "source": "Kufar",
                "city": "minsk",
                "price": 300,
                "rooms": null,
                "address": format!("Lenina {}", i),
                "image": null,
                "description": null
            })
        })
        .collect();
    let (base, _) = serve_ads(json!({ "ads": rows, "has_more": true, "total": 40 })).await;

    let mut settings = settings(&base);
    settings.page_size = 2;
    let client = Arc::new(ApiClient::new(&settings).unwrap());
    let browser = Browser::new(
        settings,
        client.clone(),
        Arc::new(MemoryStorage::new()),
        client,
    );

    let outcome = browser
        .search(SearchCriteria {
            city: Some("minsk".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(outcome, LoadOutcome::Merged { fetched: 2, added: 2 });

    let view = browser.view(ViewId::Search);
    assert_eq!(view.records.len(), 2);
    assert_eq!(view.records[0].id.as_str(), "https://re.kufar.by/vi/1");
    assert_eq!(view.offset, 2);
    assert!(!view.exhausted);
    assert_eq!(view.error, None);
}

type Fields = Arc<Mutex<Vec<(String, Option<String>, usize)>>>;

async fn record_submission(State(fields): State<Fields>, mut multipart: Multipart) -> Json<Value> {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let size = field.bytes().await.unwrap().len();
        fields.lock().unwrap().push((name, file_name, size));
    }
    Json(json!({"status": "pending", "message": "Sent for moderation"}))
}

#[tokio::test]
async fn submit_sends_form_fields_and_supported_images() {
    let fields = Fields::default();
    let base = serve(
        Router::new()
            .route("/api/submit_user_ad", post(record_submission))
            .with_state(fields.clone()),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let photo = dir.path().join("photo.jpg");
    let notes = dir.path().join("notes.txt");
    std::fs::write(&photo, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
    std::fs::write(&notes, "not an image").unwrap();

    let draft = AdDraft {
        images: vec![photo, notes],
        city: "brest".into(),
        rooms: "1".into(),
        price: "250".into(),
        address: "Sovetskaya 3".into(),
        description: "Quiet".into(),
        phone: "+375291234567".into(),
    };

    let client = ApiClient::new(&settings(&base)).unwrap();
    let receipt = client.submit(&draft).await.unwrap();
    assert_eq!(receipt.status, "pending");

    let fields = fields.lock().unwrap();
    let names: Vec<&str> = fields.iter().map(|(name, _, _)| name.as_str()).collect();
    assert_eq!(
        names,
        vec!["user_id", "city", "rooms", "price", "address", "description", "phone", "images"]
    );
    let image = fields.last().unwrap();
    assert_eq!(image.1.as_deref(), Some("photo.jpg"));
    assert_eq!(image.2, 4);
}

#[tokio::test]
async fn submit_reports_server_rejection() {
    let base = serve(Router::new().route(
        "/api/submit_user_ad",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing required fields"})),
            )
        }),
    ))
    .await;

    let client = ApiClient::new(&settings(&base)).unwrap();
    let err = client.submit(&AdDraft::default()).await.unwrap_err();
    assert!(matches!(err, AppError::Submission(ref msg) if msg.contains("Missing required fields")));
}

#[tokio::test]
async fn submit_requires_user_id() {
    let mut settings = settings("http://127.0.0.1:9");
    settings.user_id = None;
    let client = ApiClient::new(&settings).unwrap();

    let err = client.submit(&AdDraft::default()).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidConfig(_)));
}
