//! Post handlers.

use std::future::Future;
use std::time::Duration;

use actix_web::{HttpResponse, web};

use quill_core::DomainError;
use quill_core::domain::{NewPost, Post, PostChanges, PostId};
use quill_shared::dto::{CreatePostRequest, ListPostsQuery, PostResponse, UpdatePostRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::observability::RequestContext;
use crate::state::AppState;

/// Await a storage call under the request deadline, logging any failure.
async fn run<T, F>(timeout: Duration, ctx: &RequestContext, call: F) -> AppResult<T>
where
    F: Future<Output = Result<T, DomainError>>,
{
    run_mapped(timeout, ctx, call, AppError::from).await
}

/// [`run`] with a route-specific translation of domain errors.
async fn run_mapped<T, F, M>(
    timeout: Duration,
    ctx: &RequestContext,
    call: F,
    map: M,
) -> AppResult<T>
where
    F: Future<Output = Result<T, DomainError>>,
    M: FnOnce(DomainError) -> AppError,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ctx.fail(map(e))),
        Err(_) => Err(ctx.fail(AppError::Timeout)),
    }
}

/// Single-post reads report a missing post as a server-side failure.
fn lookup_error(err: DomainError) -> AppError {
    match err {
        DomainError::NotFound { entity_type, key } => {
            AppError::Internal(format!("no {} found for {}", entity_type, key))
        }
        other => other.into(),
    }
}

fn parse_id(ctx: &RequestContext, raw: &str) -> AppResult<PostId> {
    raw.parse()
        .map_err(|_| ctx.fail(AppError::BadRequest(format!("invalid post id: {}", raw))))
}

fn post_response(post: Post) -> PostResponse {
    let tags = post.tag_names();
    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        category: post.category.unwrap_or_default(),
        tags,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn post_responses(posts: Vec<Post>) -> Vec<PostResponse> {
    posts.into_iter().map(post_response).collect()
}

/// POST /posts
pub async fn create_post(
    state: web::Data<AppState>,
    ctx: RequestContext,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let new_post = NewPost {
        title: req.title,
        content: req.content,
        category: req.category,
        tags: req.tags.unwrap_or_default(),
    };

    let post = run(state.request_timeout, &ctx, state.posts.create(new_post)).await?;

    tracing::info!(remote_addr = %ctx.remote_addr, post_id = post.id, "Post created");
    Ok(HttpResponse::Created().json(post_response(post)))
}

/// GET /posts and GET /posts?term=...
pub async fn list_posts(
    state: web::Data<AppState>,
    ctx: RequestContext,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let posts = match query.into_inner().term {
        None => run(state.request_timeout, &ctx, state.posts.find_all()).await?,
        Some(term) if term.is_empty() => {
            return Err(ctx.fail(AppError::BadRequest(
                "search term must not be empty".to_string(),
            )));
        }
        Some(term) => {
            tracing::debug!(term = %term, "Searching posts");
            run(state.request_timeout, &ctx, state.search.search(&term)).await?
        }
    };

    tracing::info!(remote_addr = %ctx.remote_addr, count = posts.len(), "Posts listed");
    Ok(HttpResponse::Ok().json(post_responses(posts)))
}

/// GET /posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&ctx, &path)?;
    let post = run_mapped(
        state.request_timeout,
        &ctx,
        state.posts.find_by_id(id),
        lookup_error,
    )
    .await?;

    tracing::info!(remote_addr = %ctx.remote_addr, post_id = id, "Post fetched");
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// PUT /posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&ctx, &path)?;
    let req = body.into_inner();
    let changes = PostChanges {
        title: req.title,
        content: req.content,
        category: req.category,
        tags: req.tags,
    };
    if changes.is_empty() {
        tracing::debug!(post_id = id, "Update carries no field changes");
    }

    let post = run(state.request_timeout, &ctx, state.posts.update(id, changes)).await?;

    tracing::info!(remote_addr = %ctx.remote_addr, post_id = id, "Post updated");
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// DELETE /posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&ctx, &path)?;
    run(state.request_timeout, &ctx, state.posts.delete(id)).await?;

    tracing::info!(remote_addr = %ctx.remote_addr, post_id = id, "Post deleted");
    Ok(HttpResponse::NoContent().finish())
}
