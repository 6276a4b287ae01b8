use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::metadata::{fetch_link_metadata, MetadataError};

fn html_response(body: &str) -> ResponseTemplate {
    // wiremock's set_body_string forces content-type to text/plain,
    // clobbering insert_header; set_body_raw is the API that keeps
    // the declared mime.
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

#[tokio::test]
async fn fetches_and_parses_a_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/post"))
        .respond_with(html_response(
            r#"<html><head>
                <meta property="og:title" content="A Post">
                <meta name="description" content="About things">
                <meta property="og:site_name" content="Example Blog">
                <meta property="og:image" content="/cover.png">
                <link rel="icon" href="/favicon.ico">
            </head></html>"#,
        ))
        .mount(&server)
        .await;

    let meta = fetch_link_metadata(&format!("{}/post", server.uri()))
        .await
        .unwrap();

    assert_eq!(meta.title.as_deref(), Some("A Post"));
    assert_eq!(meta.description.as_deref(), Some("About things"));
    assert_eq!(meta.site_name.as_deref(), Some("Example Blog"));
    assert_eq!(meta.image, Some(format!("{}/cover.png", server.uri())));
    assert_eq!(meta.icon_url, format!("{}/favicon.ico", server.uri()));
    assert_eq!(meta.canonical_url, format!("{}/post", server.uri()));
}

#[tokio::test]
async fn non_html_responses_are_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string("{}"),
        )
        .mount(&server)
        .await;

    let err = fetch_link_metadata(&server.uri()).await.unwrap_err();
    assert!(matches!(err, MetadataError::NotHtml));
}

#[tokio::test]
async fn relative_urls_resolve_against_the_redirect_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/new/home"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new/home"))
        .respond_with(html_response(
            r#"<html><head>
                <title>Moved</title>
                <link rel="icon" href="icon.png">
            </head></html>"#,
        ))
        .mount(&server)
        .await;

    let meta = fetch_link_metadata(&format!("{}/old", server.uri()))
        .await
        .unwrap();

    assert_eq!(meta.title.as_deref(), Some("Moved"));
    assert_eq!(meta.icon_url, format!("{}/new/icon.png", server.uri()));
    assert_eq!(meta.canonical_url, format!("{}/new/home", server.uri()));
}

#[tokio::test]
async fn serializes_with_camel_case_and_explicit_nulls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_response("<html><head></head></html>"))
        .mount(&server)
        .await;

    let meta = fetch_link_metadata(&server.uri()).await.unwrap();
    let value = serde_json::to_value(&meta).unwrap();

    assert!(value["title"].is_null());
    assert!(value["description"].is_null());
    assert!(value["siteName"].is_null());
    assert!(value["image"].is_null());
    assert!(value["iconUrl"].is_string());
    assert!(value["canonicalUrl"].is_string());
}
