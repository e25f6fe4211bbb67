//! Post persistence and tag association.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbBackend, DbConn, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use quill_core::domain::{
    NewPost, Post, PostChanges, PostId, Tag, TagId, next_timestamp, now_timestamp,
};
use quill_core::ports::PostRepository;
use quill_core::{DomainError, RepoError};

use super::categories::validate_category;
use super::entity::{post, post_tag, tag};
use super::storage_error;
use super::tags::resolve_tags;

/// SeaORM-backed [`PostRepository`].
///
/// Every write runs in a single transaction: category check, tag resolution,
/// the post row and its join rows commit or roll back together.
pub struct SeaOrmPostRepository {
    db: DbConn,
}

impl SeaOrmPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

/// Post ids per tag lookup, well below every engine's bind-parameter limit.
const HYDRATE_BATCH: usize = 1000;

/// Attach tags to posts and convert them into domain posts.
///
/// Post order is preserved; each post's tags are sorted by name.
pub(crate) async fn hydrate<C>(conn: &C, posts: Vec<post::Model>) -> Result<Vec<Post>, DomainError>
where
    C: ConnectionTrait,
{
    hydrate_in_batches(conn, posts, HYDRATE_BATCH).await
}

pub(crate) async fn hydrate_in_batches<C>(
    conn: &C,
    posts: Vec<post::Model>,
    batch: usize,
) -> Result<Vec<Post>, DomainError>
where
    C: ConnectionTrait,
{
    let ids: Vec<PostId> = posts.iter().map(|p| p.id).collect();
    let mut tags_by_post: HashMap<PostId, Vec<Tag>> = HashMap::new();

    for chunk in ids.chunks(batch.max(1)) {
        let links = post_tag::Entity::find()
            .filter(post_tag::Column::PostId.is_in(chunk.iter().copied()))
            .find_also_related(tag::Entity)
            .all(conn)
            .await
            .map_err(storage_error)?;

        for (link, tag) in links {
            if let Some(tag) = tag {
                tags_by_post.entry(link.post_id).or_default().push(tag.into());
            }
        }
    }

    Ok(posts
        .into_iter()
        .map(|model| {
            let tags = tags_by_post.remove(&model.id).unwrap_or_default();
            model.into_post(tags)
        })
        .collect())
}

async fn load<C>(conn: &C, id: PostId) -> Result<Post, DomainError>
where
    C: ConnectionTrait,
{
    let model = post::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| DomainError::not_found("post", format!("id {id}")))?;

    hydrate(conn, vec![model])
        .await?
        .pop()
        .ok_or_else(|| DomainError::not_found("post", format!("id {id}")))
}

/// Look up a category a post is about to reference.
///
/// A dangling reference is bad input rather than a missing resource.
async fn require_category<C>(conn: &C, name: &str) -> Result<String, DomainError>
where
    C: ConnectionTrait,
{
    match validate_category(conn, name).await {
        Ok(category) => Ok(category.name),
        Err(DomainError::NotFound { .. }) => Err(DomainError::validation(format!(
            "given category does not exist: {name}"
        ))),
        Err(e) => Err(e),
    }
}

async fn attach_tags<C>(conn: &C, post_id: PostId, tags: &[Tag]) -> Result<(), DomainError>
where
    C: ConnectionTrait,
{
    if tags.is_empty() {
        return Ok(());
    }

    let links = tags.iter().map(|tag| post_tag::ActiveModel {
        post_id: Set(post_id),
        tag_id: Set(tag.id),
    });

    let inserted = post_tag::Entity::insert_many(links)
        .exec_without_returning(conn)
        .await
        .map_err(storage_error)?;

    if inserted == 0 {
        return Err(DomainError::Storage(RepoError::NoRowsAffected("post_tags")));
    }
    Ok(())
}

#[async_trait]
impl PostRepository for SeaOrmPostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, DomainError> {
        let tag_names = new_post.validate()?;

        let txn = self.db.begin().await.map_err(storage_error)?;

        let category = match new_post.category() {
            Some(name) => Some(require_category(&txn, name).await?),
            None => None,
        };
        let tags = resolve_tags(&txn, &tag_names).await?;

        let now = now_timestamp();
        let inserted = post::Entity::insert(post::ActiveModel {
            title: Set(new_post.title),
            content: Set(new_post.content),
            category: Set(category),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        })
        .exec(&txn)
        .await
        .map_err(storage_error)?;
        let id = inserted.last_insert_id;

        attach_tags(&txn, id, &tags).await?;

        let post = load(&txn, id).await?;
        txn.commit().await.map_err(storage_error)?;

        tracing::debug!(post_id = id, tags = tags.len(), "Post created");
        Ok(post)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Post, DomainError> {
        load(&self.db, id).await
    }

    async fn find_all(&self) -> Result<Vec<Post>, DomainError> {
        let models = post::Entity::find()
            .order_by_asc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage_error)?;

        hydrate(&self.db, models).await
    }

    async fn update(&self, id: PostId, changes: PostChanges) -> Result<Post, DomainError> {
        let tag_names = changes.validate()?;

        let txn = self.db.begin().await.map_err(storage_error)?;

        // The row lock serializes concurrent read-modify-write cycles on the
        // same post until this transaction ends. SQLite has no row locks and
        // serializes writers on its own.
        let mut query = post::Entity::find_by_id(id);
        if txn.get_database_backend() != DbBackend::Sqlite {
            query = query.lock_exclusive();
        }
        let existing = query
            .one(&txn)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| DomainError::not_found("post", format!("id {id}")))?;

        let previous_update: DateTime<Utc> = existing.updated_at.into();
        let mut active: post::ActiveModel = existing.into();

        if let Some(title) = changes.title() {
            active.title = Set(title.to_owned());
        }
        if let Some(content) = changes.content() {
            active.content = Set(content.to_owned());
        }
        if let Some(category) = changes.category() {
            active.category = Set(Some(require_category(&txn, category).await?));
        }

        if !tag_names.is_empty() {
            let requested = resolve_tags(&txn, &tag_names).await?;
            let attached: HashSet<TagId> = post_tag::Entity::find()
                .filter(post_tag::Column::PostId.eq(id))
                .all(&txn)
                .await
                .map_err(storage_error)?
                .into_iter()
                .map(|link| link.tag_id)
                .collect();

            let added: Vec<Tag> = requested
                .into_iter()
                .filter(|tag| !attached.contains(&tag.id))
                .collect();
            attach_tags(&txn, id, &added).await?;
        }

        active.updated_at = Set(next_timestamp(previous_update).into());
        active.update(&txn).await.map_err(storage_error)?;

        let post = load(&txn, id).await?;
        txn.commit().await.map_err(storage_error)?;

        tracing::debug!(post_id = id, "Post updated");
        Ok(post)
    }

    async fn delete(&self, id: PostId) -> Result<(), DomainError> {
        let txn = self.db.begin().await.map_err(storage_error)?;

        let unlinked = post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(storage_error)?;

        let result = post::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(storage_error)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("post", format!("id {id}")));
        }

        txn.commit().await.map_err(storage_error)?;

        tracing::debug!(
            post_id = id,
            unlinked_tags = unlinked.rows_affected,
            "Post deleted"
        );
        Ok(())
    }
}
