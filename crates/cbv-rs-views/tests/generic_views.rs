//! Integration tests for the generic views served through the axum router.
//!
//! Tests cover:
//! 1. TemplateView exposes URL keyword arguments under `params`
//! 2. RedirectView answers 301, 302 or 410
//! 3. ListView pagination and sorting over the in-memory backend
//! 4. ListView over a SQLite table
//! 5. Misconfiguration and unsupported methods
//! 6. Templates loaded from settings directories

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use http::{Method, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tokio::sync::Mutex;
use tower::ServiceExt;

use cbv_rs_core::{CbvResult, Settings};
use cbv_rs_http::urls::pattern::path;
use cbv_rs_http::urls::resolver::URLResolver;
use cbv_rs_http::{HttpRequest, HttpResponse};
use cbv_rs_query::{InMemoryModel, Model, SqliteModel};
use cbv_rs_template::Engine;
use cbv_rs_views::{
    App, BaseListView, ListView, MultipleObjectMixin, RedirectView, TemplateResponseMixin,
    TemplateView, View, ViewConfig,
};

fn engine() -> Arc<Engine> {
    let engine = Engine::new();
    engine
        .add_string_template(
            "books/detail.html",
            "genre={{ params.genre }} slug={{ params.slug }}",
        )
        .unwrap();
    engine
        .add_string_template(
            "books/list.html",
            "{% if paginator %}page {{ paginator.page }} of {{ paginator.pages }}|{% endif %}\
             {% for book in book_list %}{{ book.title }};{% endfor %}\
             |paginated={{ is_paginated }}",
        )
        .unwrap();
    engine
        .add_string_template(
            "people.html",
            "{% for person in object_list %}{{ person.name }} {% endfor %}",
        )
        .unwrap();
    Arc::new(engine)
}

fn books(count: usize) -> Arc<dyn Model> {
    let rows = (1..=count)
        .map(|i| json!({"title": format!("Book {i:02}"), "year": 1900 + i}))
        .collect();
    Arc::new(InMemoryModel::new("Book", &["title", "year"]).with_rows(rows))
}

fn people() -> Arc<dyn Model> {
    Arc::new(InMemoryModel::new("Person", &["name", "age"]).with_rows(vec![
        json!({"name": "alice", "age": 34}),
        json!({"name": "carol", "age": 19}),
        json!({"name": "bob", "age": 52}),
    ]))
}

fn router(patterns: Vec<cbv_rs_http::urls::pattern::URLPattern>) -> axum::Router {
    App::new(Settings::default())
        .urls(URLResolver::new(patterns))
        .into_axum_router()
}

async fn send(
    router: axum::Router,
    method: Method,
    uri: &str,
) -> (StatusCode, http::HeaderMap, String) {
    let request = http::Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, http::HeaderMap, String) {
    send(router, Method::GET, uri).await
}

fn book_list_view() -> ListView {
    ListView::new(
        ViewConfig::new()
            .template_name("books/list.html")
            .engine(engine()),
    )
}

// ============================================================================
// 1. TemplateView
// ============================================================================

#[tokio::test]
async fn test_template_view_exposes_kwargs_as_params() {
    let view = TemplateView::new("books/detail.html").with_engine(engine());
    let app = router(vec![path(
        "books/<str:genre>/<slug:slug>/",
        view.as_view(),
        Some("book-detail"),
    )
    .unwrap()]);

    let (status, headers, body) = get(app, "/books/poetry/leaves-of-grass/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(http::header::CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );
    assert_eq!(body, "genre=poetry slug=leaves-of-grass");
}

#[tokio::test]
async fn test_template_view_without_template_name_is_500() {
    let view = TemplateView::from_config(&ViewConfig::new().engine(engine()));
    let app = router(vec![path("about/", view.as_view(), None).unwrap()]);

    let (status, _, body) = get(app, "/about/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("template_name"));
}

// ============================================================================
// 2. RedirectView
// ============================================================================

#[tokio::test]
async fn test_redirect_view_statuses() {
    let app = router(vec![
        path("old/", RedirectView::new("/x").as_view(), None).unwrap(),
        path(
            "tmp/",
            RedirectView::from_config(&ViewConfig::new().url("/x").permanent(false)).as_view(),
            None,
        )
        .unwrap(),
        path("gone/", RedirectView::gone().as_view(), None).unwrap(),
    ]);

    let (status, headers, _) = get(app.clone(), "/old/").await;
    assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(headers.get(http::header::LOCATION).unwrap(), "/x");

    let (status, headers, _) = get(app.clone(), "/tmp/").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers.get(http::header::LOCATION).unwrap(), "/x");

    let (status, headers, _) = get(app, "/gone/").await;
    assert_eq!(status, StatusCode::GONE);
    assert!(headers.get(http::header::LOCATION).is_none());
}

// ============================================================================
// 3. ListView over the in-memory backend
// ============================================================================

#[tokio::test]
async fn test_list_view_second_page() {
    let view = book_list_view().model(books(25)).paginate_by(10);
    let app = router(vec![path("books/", view.as_view(), Some("book-list")).unwrap()]);

    let (status, _, body) = get(app, "/books/?page=2").await;
    assert_eq!(status, StatusCode::OK);
    let expected: String = (11..=20).map(|i| format!("Book {i:02};")).collect();
    assert_eq!(body, format!("page 2 of 3|{expected}|paginated=true"));
}

#[tokio::test]
async fn test_list_view_page_errors_are_404() {
    let view = book_list_view().model(books(25)).paginate_by(10);
    let app = router(vec![path("books/", view.as_view(), None).unwrap()]);

    for uri in ["/books/?page=abc", "/books/?page=4", "/books/?page=0"] {
        let (status, _, _) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn test_list_view_without_pagination() {
    let view = book_list_view().model(books(3));
    let app = router(vec![path("books/", view.as_view(), None).unwrap()]);

    let (_, _, body) = get(app, "/books/").await;
    assert_eq!(body, "Book 01;Book 02;Book 03;|paginated=false");
}

#[tokio::test]
async fn test_list_view_sorting() {
    let view = ListView::new(ViewConfig::new().template_name("people.html").engine(engine()))
        .model(people())
        .sort_by("-name");
    let app = router(vec![path("people/", view.as_view(), None).unwrap()]);

    let (_, _, body) = get(app.clone(), "/people/").await;
    assert_eq!(body, "carol bob alice ");

    let (_, _, body) = get(app.clone(), "/people/?sort_by=age").await;
    assert_eq!(body, "carol alice bob ");

    let (_, _, body) = get(app, "/people/?sort_by=shoe_size").await;
    assert_eq!(body, "alice carol bob ");
}

#[tokio::test]
async fn test_list_view_without_sort_key_ignores_request_sort() {
    let view = ListView::new(ViewConfig::new().template_name("people.html").engine(engine()))
        .model(people());
    let app = router(vec![path("people/", view.as_view(), None).unwrap()]);

    for uri in ["/people/", "/people/?sort_by=-age", "/people/?sort_by=name"] {
        let (_, _, body) = get(app.clone(), uri).await;
        assert_eq!(body, "alice carol bob ", "{uri}");
    }
}

#[tokio::test]
async fn test_list_view_query_object() {
    let model = InMemoryModel::new("Book", &["title", "genre"]).with_rows(vec![
        json!({"title": "Leaves of Grass", "genre": "poetry"}),
        json!({"title": "Dune", "genre": "novel"}),
        json!({"title": "Ariel", "genre": "poetry"}),
    ]);
    let poetry = model.objects().filter_eq("genre", json!("poetry")).unwrap();
    let view = book_list_view()
        .query_object(Arc::new(poetry))
        .sort_by("title");
    let app = router(vec![path("poetry/", view.as_view(), None).unwrap()]);

    let (_, _, body) = get(app, "/poetry/").await;
    assert_eq!(body, "Ariel;Leaves of Grass;|paginated=false");
}

/// A list view built from the mixins instead of `ListView`.
struct RecentBooks {
    engine: Arc<Engine>,
    model: Arc<dyn Model>,
}

#[async_trait]
impl MultipleObjectMixin for RecentBooks {
    fn model(&self) -> Option<Arc<dyn Model>> {
        Some(Arc::clone(&self.model))
    }

    fn get_sort_by(&self) -> Option<String> {
        Some("-year".to_string())
    }

    fn get_paginate_by(&self) -> Option<usize> {
        Some(2)
    }
}

impl TemplateResponseMixin for RecentBooks {
    fn template_name(&self) -> Option<&str> {
        Some("books/list.html")
    }

    fn engine(&self) -> Arc<Engine> {
        Arc::clone(&self.engine)
    }
}

#[async_trait]
impl BaseListView for RecentBooks {}

#[async_trait]
impl View for RecentBooks {
    async fn get(&self, request: HttpRequest) -> CbvResult<HttpResponse> {
        self.list(request).await
    }
}

#[tokio::test]
async fn test_custom_list_view_from_mixins() {
    let view = RecentBooks {
        engine: engine(),
        model: books(5),
    };
    let app = router(vec![path("recent/", view.as_view(), None).unwrap()]);

    let (_, _, body) = get(app, "/recent/").await;
    assert_eq!(body, "page 1 of 3|Book 05;Book 04;|paginated=true");
}

// ============================================================================
// 4. ListView over SQLite
// ============================================================================

async fn sqlite_books(count: usize) -> Arc<dyn Model> {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE books (id INTEGER PRIMARY KEY, title TEXT, year INTEGER)")
        .unwrap();
    for i in 1..=count {
        conn.execute(
            "INSERT INTO books (title, year) VALUES (?1, ?2)",
            rusqlite::params![format!("Book {i:02}"), 1900 + i],
        )
        .unwrap();
    }
    let model = SqliteModel::open(Arc::new(Mutex::new(conn)), "books")
        .await
        .unwrap()
        .with_entity_name("Book");
    Arc::new(model)
}

#[tokio::test]
async fn test_sqlite_list_view_pagination() {
    let view = book_list_view()
        .model(sqlite_books(25).await)
        .paginate_by(10);
    let app = router(vec![path("books/", view.as_view(), None).unwrap()]);

    let (status, _, body) = get(app.clone(), "/books/?page=2").await;
    assert_eq!(status, StatusCode::OK);
    let expected: String = (11..=20).map(|i| format!("Book {i:02};")).collect();
    assert_eq!(body, format!("page 2 of 3|{expected}|paginated=true"));

    let (status, _, _) = get(app, "/books/?page=abc").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sqlite_list_view_huge_page_is_404() {
    let view = book_list_view()
        .model(sqlite_books(25).await)
        .paginate_by(10);
    let app = router(vec![path("books/", view.as_view(), None).unwrap()]);

    for uri in [
        "/books/?page=4",
        "/books/?page=9223372036854775807",
        "/books/?page=2000000000000000000",
    ] {
        let (status, _, _) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn test_sqlite_list_view_sorting() {
    let view = book_list_view()
        .model(sqlite_books(3).await)
        .sort_by("-year")
        .sortable_fields(&["title"]);
    let app = router(vec![path("books/", view.as_view(), None).unwrap()]);

    let (_, _, body) = get(app.clone(), "/books/").await;
    assert_eq!(body, "Book 03;Book 02;Book 01;|paginated=false");

    let (_, _, body) = get(app.clone(), "/books/?sort_by=title").await;
    assert_eq!(body, "Book 01;Book 02;Book 03;|paginated=false");

    // `id` is a column but not in the allow-list
    let (_, _, body) = get(app, "/books/?sort_by=-id").await;
    assert_eq!(body, "Book 01;Book 02;Book 03;|paginated=false");
}

// ============================================================================
// 5. Misconfiguration and methods
// ============================================================================

#[tokio::test]
async fn test_list_view_without_source_is_500() {
    let view = book_list_view();
    assert!(view.config().validate_list().is_err());
    let app = router(vec![path("books/", view.as_view(), None).unwrap()]);

    let (status, _, _) = get(app, "/books/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unsupported_methods_are_405() {
    let app = router(vec![
        path("about/", TemplateView::new("books/detail.html").as_view(), None).unwrap(),
        path("books/", book_list_view().model(books(1)).as_view(), None).unwrap(),
    ]);

    for (method, uri) in [
        (Method::POST, "/about/"),
        (Method::PUT, "/books/"),
        (Method::DELETE, "/books/"),
        (Method::PATCH, "/books/"),
    ] {
        let (status, headers, _) = send(app.clone(), method.clone(), uri).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        let allow = headers.get(http::header::ALLOW).unwrap().to_str().unwrap();
        assert!(allow.contains("GET"));
    }
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let app = router(vec![path("books/", book_list_view().model(books(1)).as_view(), None).unwrap()]);
    let (status, _, _) = get(app, "/authors/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// 6. Templates from settings directories
// ============================================================================

#[tokio::test]
async fn test_engine_from_settings_template_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("count.html"), "{{ item_list | length }} items").unwrap();
    let settings = Settings {
        template_dirs: vec![dir.path().to_path_buf()],
        ..Settings::default()
    };
    let engine = Arc::new(Engine::from_settings(&settings).unwrap());

    let model = InMemoryModel::new("Item", &["id"]).with_rows(vec![json!({"id": 1}), json!({"id": 2})]);
    assert_eq!(model.query().column_descriptions().len(), 1);
    let view = ListView::new(ViewConfig::new().template_name("count.html").engine(engine))
        .model(Arc::new(model));
    let app = App::new(settings)
        .urls(URLResolver::new(vec![path("items/", view.as_view(), None).unwrap()]))
        .into_axum_router();

    let (status, _, body) = get(app, "/items/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "2 items");
}
