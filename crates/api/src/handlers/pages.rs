//! Server-rendered HTML pages.

use axum::extract::{Path, Query, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use estate_core::error::CoreError;
use estate_core::payment::VALID_PAYMENT_METHODS;
use estate_core::premium::plan_catalog;
use estate_core::property::{HOME_FEATURED_COUNT, HOME_LATEST_COUNT};
use estate_core::search::PropertyFilter;
use estate_db::repositories::{BlogPostRepo, ImageRepo, PageViewRepo, PropertyRepo};
use tera::Context;

use crate::activity::ClientMeta;
use crate::error::{AppError, AppResult};
use crate::handlers::analytics::record_page_view;
use crate::handlers::images::public_images;
use crate::handlers::legal::find_page;
use crate::middleware::auth::MaybeAuthUser;
use crate::query::PaginationParams;
use crate::state::AppState;

/// GET /
pub async fn home(State(state): State<AppState>) -> AppResult<Response> {
    let featured = PropertyRepo::list_featured(&state.pool, HOME_FEATURED_COUNT).await?;
    let latest = PropertyRepo::list_latest(&state.pool, HOME_LATEST_COUNT).await?;

    let mut ctx = Context::new();
    ctx.insert("featured", &featured);
    ctx.insert("latest", &latest);
    render(&state, "home.html", &ctx)
}

/// GET /properties
///
/// A filter that fails validation renders the page with the message and
/// no results.
pub async fn property_list(
    State(state): State<AppState>,
    Query(filter): Query<PropertyFilter>,
    Query(page): Query<PaginationParams>,
    RawQuery(raw): RawQuery,
) -> AppResult<Response> {
    let (limit, offset) = page.resolve();

    let mut ctx = Context::new();
    ctx.insert("filter", &filter);
    ctx.insert("query", &query_without_offset(raw.as_deref()));

    match filter.resolve() {
        Ok(resolved) => {
            let properties = PropertyRepo::search(&state.pool, &resolved, limit, offset).await?;
            let total = PropertyRepo::count(&state.pool, &resolved).await?;
            let prev = (offset > 0).then(|| (offset - limit).max(0));
            let next = (offset + limit < total).then_some(offset + limit);
            ctx.insert("properties", &properties);
            ctx.insert("total", &total);
            ctx.insert("prev_offset", &prev);
            ctx.insert("next_offset", &next);
            ctx.insert("error", &None::<String>);
        }
        Err(e) => {
            ctx.insert("properties", &Vec::<()>::new());
            ctx.insert("total", &0);
            ctx.insert("prev_offset", &None::<i64>);
            ctx.insert("next_offset", &None::<i64>);
            ctx.insert("error", &user_message(&e));
        }
    }
    render(&state, "property_list.html", &ctx)
}

/// GET /properties/{id}
///
/// Records a page view for the property.
pub async fn property_detail(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    meta: ClientMeta,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let Some(property) = PropertyRepo::find_by_id(&state.pool, id).await? else {
        return not_found(&state, "That property does not exist.");
    };

    let url = format!("/properties/{id}");
    if let Err(e) = record_page_view(&state, viewer.user_id(), Some(id), Some(url), &meta).await {
        tracing::warn!(property_id = id, error = %e, "Failed to record page view");
    }

    let images = public_images(ImageRepo::list_for_property(&state.pool, id, false).await?);
    let views = PageViewRepo::count_for_property(&state.pool, id).await?;

    let mut ctx = Context::new();
    ctx.insert("property", &property);
    ctx.insert("images", &images);
    ctx.insert("views", &views);
    render(&state, "property_detail.html", &ctx)
}

/// GET /blog
pub async fn blog_list(
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Response> {
    let (limit, offset) = page.resolve();
    let posts = BlogPostRepo::list_published(&state.pool, limit, offset).await?;

    let mut ctx = Context::new();
    ctx.insert("posts", &posts);
    render(&state, "blog_list.html", &ctx)
}

/// GET /blog/{key}
///
/// `key` is a post id or slug.
pub async fn blog_post(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Response> {
    let post = match key.parse::<i64>() {
        Ok(id) => BlogPostRepo::view_published(&state.pool, Some(id), None).await?,
        Err(_) => BlogPostRepo::view_published(&state.pool, None, Some(&key)).await?,
    };
    let Some(post) = post else {
        return not_found(&state, "That post does not exist.");
    };

    let mut ctx = Context::new();
    ctx.insert("post", &post);
    render(&state, "blog_post.html", &ctx)
}

/// GET /legal/{slug}
pub async fn legal(State(state): State<AppState>, Path(slug): Path<String>) -> AppResult<Response> {
    let page = match find_page(&state, &slug).await {
        Ok(page) => page,
        Err(AppError::Core(CoreError::NotFoundByKey { .. })) => {
            return not_found(&state, "That page does not exist.");
        }
        Err(e) => return Err(e),
    };

    let mut ctx = Context::new();
    ctx.insert("page", &page);
    render(&state, "legal.html", &ctx)
}

/// GET /premium/plans
pub async fn plans(State(state): State<AppState>) -> AppResult<Response> {
    let mut ctx = Context::new();
    ctx.insert("plans", &plan_catalog());
    ctx.insert("payment_methods", VALID_PAYMENT_METHODS);
    render(&state, "plans.html", &ctx)
}

/// Fallback for unknown paths outside `/api`.
pub async fn fallback(State(state): State<AppState>) -> AppResult<Response> {
    not_found(&state, "The page you requested could not be found.")
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn render(state: &AppState, template: &str, ctx: &Context) -> AppResult<Response> {
    let html = state
        .pages
        .render(template, ctx)
        .map_err(|e| AppError::InternalError(format!("Failed to render {template}: {e}")))?;
    Ok(Html(html).into_response())
}

fn not_found(state: &AppState, message: &str) -> AppResult<Response> {
    let mut ctx = Context::new();
    ctx.insert("message", message);
    let mut response = render(state, "not_found.html", &ctx)?;
    *response.status_mut() = StatusCode::NOT_FOUND;
    Ok(response)
}

fn user_message(err: &CoreError) -> String {
    match err {
        CoreError::Validation(msg) => msg.clone(),
        other => other.to_string(),
    }
}

/// The current query string minus any `offset`, for pager links.
fn query_without_offset(raw: Option<&str>) -> String {
    raw.unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty() && !pair.starts_with("offset="))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pager_query_drops_offset() {
        assert_eq!(
            query_without_offset(Some("city=Kathmandu&offset=20&limit=10")),
            "city=Kathmandu&limit=10"
        );
        assert_eq!(query_without_offset(None), "");
        assert_eq!(query_without_offset(Some("offset=40")), "");
    }
}
