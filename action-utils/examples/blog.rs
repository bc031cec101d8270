//! Small blog showing every controller helper
//!
//! Configuration comes from `./config.toml` or
//! `~/.config/action-utils/blog/config.toml`, overridable with
//! `ACTION_UTILS_*` variables. Database pools are lazy, so the server starts
//! without a reachable database and only `/posts/count` needs one.
//!
//! Run with:
//! ```bash
//! cargo run --example blog
//! ```

use action_utils::prelude::*;
use axum::{
    extract::Form as FormBody,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use sqlx::Postgres;
use std::collections::HashMap;
use tracing::info;

type Actions = PgActionContext<AuthUser>;
type AppState = ActionUtilsState<ConnectionRegistry<Postgres>>;

struct PostType;

impl FormType for PostType {
    fn name(&self) -> &str {
        "post"
    }

    fn configure_options(&self, options: &mut FormOptions) {
        if options.submit_label.is_none() {
            options.submit_label = Some("Publish".into());
        }
    }

    fn build_form(
        &self,
        builder: FormBuilder,
        _options: &FormOptions,
    ) -> Result<FormBuilder, FormError> {
        Ok(builder
            .field("title", InputType::Text)
            .label("Title")
            .required()
            .done()
            .textarea("body")
            .label("Body")
            .rows(6)
            .done())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    action_utils::observability::init()?;

    let config = ActionUtilsConfig::load_for_service("blog")?;
    let registry = ConnectionRegistry::<Postgres>::from_settings(&config.database)?;

    let (router, mut routes) = NamedRouter::<AppState>::new()
        .route("home", "/", get(home))?
        .route("post_new", "/posts/new", get(new_post))?
        .route("post_create", "/posts", post(create_post))?
        .route("post_count", "/posts/count", get(count_posts))?
        .route("search", "/search", get(search))?
        .into_parts();
    routes.add("login", "/login")?;

    let forms = FormRegistry::new().with_type(PostType);
    let state = ActionUtilsState::from_config(config, routes, forms, registry);

    info!(
        home_template = state.templates().exists("home.html"),
        "templates ready"
    );

    let app: Router = router
        .layer(state.session_layer())
        .with_state(state)
        .layer(axum::middleware::from_fn(install_token_storage::<AuthUser>));

    info!("Starting blog on http://127.0.0.1:3000");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn home(actions: Actions, Flashes(flashes): Flashes) -> Result<HtmlResponse, ActionUtilsError> {
    let user = actions.user()?;
    Ok(actions.render(
        "home.html",
        &Parameters::new()
            .with("user", user.map(|u| u.email))
            .with("flashes", serde_json::to_value(flashes).unwrap_or_default()),
    )?)
}

async fn new_post(actions: Actions) -> Result<HtmlResponse, ActionUtilsError> {
    let action = actions.generate_url("post_create", &Parameters::new(), ReferenceType::AbsolutePath)?;
    let form = actions.create_form("post", None, FormOptions::action(action))?;
    Ok(actions.render("post/new.html", &Parameters::new().with("form", form.render()))?)
}

async fn create_post(
    actions: Actions,
    FormBody(values): FormBody<HashMap<String, String>>,
) -> Result<Response, ActionUtilsError> {
    if actions.user()?.is_none() {
        actions.add_flash("error", "Please log in first");
        return Ok(actions
            .redirect_to_route("login", &Parameters::new(), StatusCode::FOUND)?
            .into_response());
    }

    let mut form = actions.create_form("post", None, FormOptions::default())?;
    form.submit(values);
    if !form.is_valid() {
        return Ok(actions
            .render("post/new.html", &Parameters::new().with("form", form.render()))?
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)
            .into_response());
    }

    actions.add_flash("success", "Post published");
    Ok(actions
        .redirect_to_route("home", &Parameters::new(), StatusCode::SEE_OTHER)?
        .into_response())
}

async fn count_posts(actions: Actions) -> Result<String, Response> {
    let pool = actions
        .registry()
        .default_connection()
        .map_err(|e| ActionUtilsError::from(e).into_response())?;
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "post count failed");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        })?;
    Ok(count.0.to_string())
}

async fn search(actions: Actions) -> Result<HtmlResponse, ActionUtilsError> {
    let form = actions
        .create_form_builder(None, FormOptions::action("/search").method("GET"))?
        .field("q", InputType::Search)
        .placeholder("Search posts")
        .done()
        .submit("Search")
        .get_form();
    Ok(HtmlResponse::new(form.render()))
}

