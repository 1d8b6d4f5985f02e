//! Handlers for blog posts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use estate_core::contact::require_text;
use estate_core::error::CoreError;
use estate_core::naming::{is_valid_slug, slugify, with_suffix};
use estate_core::types::DbId;
use estate_db::models::blog::{BlogPost, CreateBlogPost, UpdateBlogPost};
use estate_db::repositories::BlogPostRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Gives up on suffixing after this many collisions.
const MAX_SLUG_ATTEMPTS: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct CreateBlogPostRequest {
    pub title: String,
    /// Derived from the title when absent.
    pub slug: Option<String>,
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    pub image_path: Option<String>,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

fn default_published() -> bool {
    true
}

/// GET /api/v1/blog
pub async fn list_published(
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<BlogPost>>>> {
    let (limit, offset) = page.resolve();
    let posts = BlogPostRepo::list_published(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: posts }))
}

/// GET /api/v1/blog/{id}
///
/// Counts a view.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BlogPost>>> {
    let post = BlogPostRepo::view_published(&state.pool, Some(id), None)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "BlogPost",
            id,
        }))?;
    Ok(Json(DataResponse { data: post }))
}

/// GET /api/v1/blog/slug/{slug}
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<BlogPost>>> {
    let post = BlogPostRepo::view_published(&state.pool, None, Some(&slug))
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "BlogPost",
                key: slug.clone(),
            })
        })?;
    Ok(Json(DataResponse { data: post }))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/blog
pub async fn admin_list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<BlogPost>>>> {
    let posts = BlogPostRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: posts }))
}

/// POST /api/v1/admin/blog
pub async fn admin_create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateBlogPostRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<BlogPost>>)> {
    require_text("Title", &input.title)?;
    require_text("Content", &input.content)?;

    let slug = match input.slug.as_deref().filter(|s| !s.is_empty()) {
        Some(slug) => {
            check_slug(slug)?;
            if BlogPostRepo::slug_exists(&state.pool, slug).await? {
                return Err(AppError::Core(CoreError::Conflict(format!(
                    "Slug '{slug}' is already in use"
                ))));
            }
            slug.to_string()
        }
        None => unique_slug(&state, &input.title).await?,
    };

    let post = BlogPostRepo::create(
        &state.pool,
        &CreateBlogPost {
            title: input.title.trim().to_string(),
            slug,
            author_id: admin.user_id,
            content: input.content,
            excerpt: input.excerpt,
            image_path: input.image_path,
            is_published: input.is_published,
        },
    )
    .await?;

    tracing::info!(post_id = post.id, slug = %post.slug, "Blog post created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: post })))
}

/// PUT /api/v1/admin/blog/{id}
pub async fn admin_update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBlogPost>,
) -> AppResult<Json<DataResponse<BlogPost>>> {
    if let Some(slug) = input.slug.as_deref() {
        check_slug(slug)?;
    }
    if let Some(title) = input.title.as_deref() {
        require_text("Title", title)?;
    }

    let post = BlogPostRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "BlogPost",
            id,
        }))?;
    Ok(Json(DataResponse { data: post }))
}

/// DELETE /api/v1/admin/blog/{id}
pub async fn admin_delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if BlogPostRepo::delete(&state.pool, id).await? {
        tracing::info!(post_id = id, "Blog post deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "BlogPost",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check_slug(slug: &str) -> Result<(), CoreError> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "Slug may only contain lowercase letters, digits and dashes".into(),
        ))
    }
}

/// Slug from the title, suffixed `-2`, `-3`, ... until unused.
async fn unique_slug(state: &AppState, title: &str) -> AppResult<String> {
    let base = slugify(title);
    if base.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Title must contain at least one letter or digit".into(),
        )));
    }
    if !BlogPostRepo::slug_exists(&state.pool, &base).await? {
        return Ok(base);
    }
    for n in 2..MAX_SLUG_ATTEMPTS {
        let candidate = with_suffix(&base, n);
        if !BlogPostRepo::slug_exists(&state.pool, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::Core(CoreError::Conflict(format!(
        "Could not find a free slug for '{base}'"
    ))))
}
