//! Integration tests for the controller helpers
//!
//! Drives a real router through the session layer and the `ActionContext`
//! extractor.

use std::sync::Arc;

use action_utils::prelude::*;
use axum::{
    body::Body,
    extract::Path,
    middleware,
    response::Html,
    routing::{get, post},
    Router,
};
use http::{header, Request, StatusCode};
use tower::ServiceExt;

type Actions = ActionContext<AuthUser, &'static str>;
type AppState = ActionUtilsState<&'static str>;

async fn index(actions: Actions) -> Result<HtmlResponse, ActionUtilsError> {
    Ok(actions.render("index.html", &Parameters::new().with("title", "Home"))?)
}

async fn create_post(actions: Actions) -> Result<RedirectResponse, ActionUtilsError> {
    actions.add_flash("notice", "Post created");
    actions.add_flash("notice", "Remember to publish it");
    actions.redirect_to_route(
        "post_show",
        &Parameters::new().with("id", 7),
        StatusCode::SEE_OTHER,
    )
}

async fn show_post(
    actions: Actions,
    Path(id): Path<i64>,
    Flashes(flashes): Flashes,
) -> Result<HtmlResponse, ActionUtilsError> {
    let notices = flashes.get("notice").cloned().unwrap_or_default();
    Ok(actions.render(
        "post.html",
        &Parameters::new().with("id", id).with("notices", notices),
    )?)
}

async fn search(actions: Actions) -> Result<Html<String>, ActionUtilsError> {
    let form = actions
        .create_form_builder(None, FormOptions::action("/search").method("GET"))?
        .field("q", InputType::Search)
        .label("Query")
        .required()
        .done()
        .get_form();
    Ok(Html(form.render()))
}

async fn me(actions: Actions) -> Result<String, ActionUtilsError> {
    Ok(actions
        .user()?
        .map_or_else(|| "anonymous".to_string(), |user| user.email))
}

async fn registry_name(actions: Actions) -> String {
    (*actions.registry()).to_string()
}

async fn broken(actions: Actions) -> Result<RedirectResponse, ActionUtilsError> {
    actions.redirect_to_route("nope", &Parameters::new(), StatusCode::FOUND)
}

fn app(with_security: bool) -> Router {
    let (router, routes) = NamedRouter::<AppState>::new()
        .route("index", "/", get(index))
        .and_then(|r| r.route("post_create", "/posts", post(create_post)))
        .and_then(|r| r.route("post_show", "/posts/{id}", get(show_post)))
        .and_then(|r| r.route("search", "/search", get(search)))
        .and_then(|r| r.route("me", "/me", get(me)))
        .and_then(|r| r.route("registry", "/registry", get(registry_name)))
        .and_then(|r| r.route("broken", "/broken", get(broken)))
        .unwrap()
        .into_parts();
    let routes = Arc::new(routes);

    let templates = MiniJinjaTemplates::in_memory().with_routes(Arc::clone(&routes));
    templates
        .add_template("index.html", "<h1>{{ title }}</h1>")
        .unwrap();
    templates
        .add_template(
            "post.html",
            "<a href=\"{{ path('post_show', {'id': id}) }}\">{{ id }}</a>\
             {% for n in notices %}<p>{{ n }}</p>{% endfor %}",
        )
        .unwrap();

    let state = ActionUtilsState::new(
        ActionUtilsConfig::default(),
        Arc::new(templates),
        Arc::new(FormRegistry::new()),
        routes,
        "main registry",
    );

    let router = router.layer(state.session_layer()).with_state(state);
    if with_security {
        router.layer(middleware::from_fn(install_token_storage::<AuthUser>))
    } else {
        router
    }
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_render_returns_html() {
    let response = app(false).oneshot(get_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(body_text(response).await, "<h1>Home</h1>");
}

#[tokio::test]
async fn test_session_cookie_only_once_session_is_used() {
    let response = app(false).oneshot(get_request("/")).await.unwrap();
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let response = app(false)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/posts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("action_session="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_redirect_to_route_and_flash_survive_next_request() {
    let app = app(false);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/posts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/posts/7");
    let cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let follow = Request::builder()
        .uri("/posts/7")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(follow).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response).await,
        "<a href=\"/posts/7\">7</a><p>Post created</p><p>Remember to publish it</p>"
    );

    // Flashes were consumed by the previous request.
    let again = Request::builder()
        .uri("/posts/7")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(again).await.unwrap();
    assert_eq!(body_text(response).await, "<a href=\"/posts/7\">7</a>");
}

#[tokio::test]
async fn test_create_form_builder_renders_form() {
    let response = app(false).oneshot(get_request("/search")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("action=\"/search\""));
    assert!(html.contains("method=\"GET\""));
    assert!(html.contains("type=\"search\""));
    assert!(html.contains("name=\"q\""));
    assert!(html.contains("required"));
}

#[tokio::test]
async fn test_user_requires_token_storage() {
    let response = app(false).oneshot(get_request("/me")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_user_is_none_without_token() {
    let response = app(true).oneshot(get_request("/me")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "anonymous");
}

#[tokio::test]
async fn test_user_from_token_storage() {
    let mut request = get_request("/me");
    request
        .extensions_mut()
        .insert(TokenStorageHandle::for_user(AuthUser {
            id: 3,
            email: "grace@example.com".into(),
            roles: vec!["ROLE_USER".into()],
        }));

    let response = app(false).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "grace@example.com");
}

#[tokio::test]
async fn test_registry_is_injected_instance() {
    let response = app(false).oneshot(get_request("/registry")).await.unwrap();
    assert_eq!(body_text(response).await, "main registry");
}

#[tokio::test]
async fn test_unknown_route_is_server_error() {
    let response = app(false).oneshot(get_request("/broken")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_missing_session_layer_rejects() {
    let (router, routes) = NamedRouter::<AppState>::new()
        .route("index", "/", get(index))
        .unwrap()
        .into_parts();
    let state = ActionUtilsState::new(
        ActionUtilsConfig::default(),
        Arc::new(MiniJinjaTemplates::in_memory()),
        Arc::new(FormRegistry::new()),
        Arc::new(routes),
        "main registry",
    );

    let response = router
        .with_state(state)
        .oneshot(get_request("/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Session not initialized");
}
