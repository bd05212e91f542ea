use axum::http::StatusCode;
use axum_test::TestServer;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

use cms_backend::article::{Article, ArticleStore};
use cms_backend::http::{router, AppState};
use cms_backend::recent::RecencyTracker;

async fn test_server() -> (TestServer, TempDir) {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("articles.db").display());
    let store = ArticleStore::connect(&url).await.unwrap();

    let state = AppState {
        store,
        recent: RecencyTracker::new(),
    };

    (TestServer::new(router(state)).unwrap(), dir)
}

async fn create_article(server: &TestServer, title: &str) -> Article {
    let response = server
        .post("/articles/")
        .json(&json!({
            "title": title,
            "content": format!("{title} content"),
            "author_id": 1,
        }))
        .await;
    response.assert_status_ok();
    response.json::<Article>()
}

#[tokio::test]
async fn root_returns_welcome_message() {
    let (server, _dir) = test_server().await;

    let response = server.get("/").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["message"], "Welcome to CMS Backend");
}

#[tokio::test]
async fn created_article_can_be_fetched() {
    let (server, _dir) = test_server().await;

    let created = create_article(&server, "Hello").await;
    assert_eq!(created.title, "Hello");
    assert_eq!(created.author_id, 1);

    let response = server.get(&format!("/articles/{}", created.id)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Article>(), created);
}

#[tokio::test]
async fn fetching_missing_article_is_404() {
    let (server, _dir) = test_server().await;

    let response = server.get("/articles/999").await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["message"], "Article not found");
}

#[tokio::test]
async fn listing_supports_skip_and_limit() {
    let (server, _dir) = test_server().await;
    for i in 0..4 {
        create_article(&server, &format!("post {i}")).await;
    }

    let response = server
        .get("/articles/")
        .add_query_param("skip", 1)
        .add_query_param("limit", 2)
        .await;
    response.assert_status_ok();

    let page = response.json::<Vec<Article>>();
    let titles: Vec<_> = page.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["post 1", "post 2"]);
}

#[tokio::test]
async fn update_only_touches_supplied_fields() {
    let (server, _dir) = test_server().await;
    let created = create_article(&server, "draft").await;

    let response = server
        .put(&format!("/articles/{}", created.id))
        .json(&json!({"title": "published"}))
        .await;
    response.assert_status_ok();

    let updated = response.json::<Article>();
    assert_eq!(updated.title, "published");
    assert_eq!(updated.content, created.content);
}

#[tokio::test]
async fn updating_missing_article_is_404() {
    let (server, _dir) = test_server().await;

    let response = server
        .put("/articles/5")
        .json(&json!({"title": "nope"}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleted_article_stops_resolving() {
    let (server, _dir) = test_server().await;
    let created = create_article(&server, "ephemeral").await;

    let response = server.delete(&format!("/articles/{}", created.id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["detail"], "Article deleted successfully");

    server
        .get(&format!("/articles/{}", created.id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete(&format!("/articles/{}", created.id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recently_viewed_is_empty_without_views() {
    let (server, _dir) = test_server().await;

    let response = server.get("/users/42/recently-viewed").await;
    response.assert_status_ok();
    assert!(response.json::<Vec<Article>>().is_empty());
}

#[tokio::test]
async fn views_without_user_id_are_not_tracked() {
    let (server, _dir) = test_server().await;
    let created = create_article(&server, "anonymous read").await;

    server
        .get(&format!("/articles/{}", created.id))
        .await
        .assert_status_ok();

    let response = server.get("/users/1/recently-viewed").await;
    assert!(response.json::<Vec<Article>>().is_empty());
}

#[tokio::test]
async fn recently_viewed_preserves_view_order() {
    let (server, _dir) = test_server().await;

    let mut articles = Vec::new();
    for i in 0..3 {
        articles.push(create_article(&server, &format!("article {i}")).await);
    }

    // View 0, 1, 2, then 0 again: expected order is [0, 2, 1].
    for article in &articles {
        server
            .get(&format!("/articles/{}", article.id))
            .add_query_param("user_id", 42)
            .await
            .assert_status_ok();
    }
    server
        .get(&format!("/articles/{}", articles[0].id))
        .add_query_param("user_id", 42)
        .await
        .assert_status_ok();

    let response = server.get("/users/42/recently-viewed").await;
    response.assert_status_ok();

    let recent = response.json::<Vec<Article>>();
    let ids: Vec<_> = recent.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![articles[0].id, articles[2].id, articles[1].id]);
}

#[tokio::test]
async fn history_keeps_only_the_five_newest_views() {
    let (server, _dir) = test_server().await;

    let mut ids = Vec::new();
    for i in 0..6 {
        let article = create_article(&server, &format!("article {i}")).await;
        server
            .get(&format!("/articles/{}", article.id))
            .add_query_param("user_id", 7)
            .await
            .assert_status_ok();
        ids.push(article.id);
    }

    let response = server.get("/users/7/recently-viewed").await;
    let recent: Vec<_> = response.json::<Vec<Article>>().iter().map(|a| a.id).collect();

    let expected: Vec<_> = ids.iter().rev().take(5).copied().collect();
    assert_eq!(recent, expected);
    assert!(!recent.contains(&ids[0]));
}

#[tokio::test]
async fn deleted_articles_drop_out_of_recently_viewed() {
    let (server, _dir) = test_server().await;

    let keep = create_article(&server, "keep").await;
    let doomed = create_article(&server, "doomed").await;

    for id in [keep.id, doomed.id] {
        server
            .get(&format!("/articles/{id}"))
            .add_query_param("user_id", 3)
            .await
            .assert_status_ok();
    }

    server
        .delete(&format!("/articles/{}", doomed.id))
        .await
        .assert_status_ok();

    let response = server.get("/users/3/recently-viewed").await;
    let ids: Vec<_> = response.json::<Vec<Article>>().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![keep.id]);
}

#[tokio::test]
async fn histories_are_per_user() {
    let (server, _dir) = test_server().await;

    let first = create_article(&server, "first").await;
    let second = create_article(&server, "second").await;

    server
        .get(&format!("/articles/{}", first.id))
        .add_query_param("user_id", 1)
        .await
        .assert_status_ok();
    server
        .get(&format!("/articles/{}", second.id))
        .add_query_param("user_id", 2)
        .await
        .assert_status_ok();

    let ids_for = |user: i64| {
        let server = &server;
        async move {
            let response = server.get(&format!("/users/{user}/recently-viewed")).await;
            response
                .json::<Vec<Article>>()
                .iter()
                .map(|a| a.id)
                .collect::<Vec<_>>()
        }
    };

    assert_eq!(ids_for(1).await, vec![first.id]);
    assert_eq!(ids_for(2).await, vec![second.id]);
}
