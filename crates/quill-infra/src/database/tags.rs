//! Tag resolution: look up tags by name and create the missing ones.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DbConn, DbErr, EntityTrait, QueryFilter, Set};

use quill_core::domain::{Tag, normalize_tag_names};
use quill_core::ports::TagResolver;
use quill_core::{DomainError, RepoError};

use super::entity::tag;
use super::storage_error;

/// Resolve `names` into persisted tags on `conn`.
///
/// Duplicate names collapse to one tag and the result never holds the same
/// tag id twice. Runs on any connection, so callers can resolve inside the
/// transaction of the post write that uses the tags.
pub async fn resolve_tags<C>(conn: &C, names: &[String]) -> Result<Vec<Tag>, DomainError>
where
    C: ConnectionTrait,
{
    let names = normalize_tag_names(names)?;
    let mut resolved: Vec<Tag> = Vec::with_capacity(names.len());

    for name in &names {
        let tag = find_or_create(conn, name).await?;
        if !resolved.iter().any(|t| t.id == tag.id) {
            resolved.push(tag);
        }
    }

    Ok(resolved)
}

async fn find_by_name<C>(conn: &C, name: &str) -> Result<Option<Tag>, DomainError>
where
    C: ConnectionTrait,
{
    let found = tag::Entity::find()
        .filter(tag::Column::Name.eq(name))
        .one(conn)
        .await
        .map_err(storage_error)?;

    Ok(found.map(Into::into))
}

async fn find_or_create<C>(conn: &C, name: &str) -> Result<Tag, DomainError>
where
    C: ConnectionTrait,
{
    if let Some(existing) = find_by_name(conn, name).await? {
        return Ok(existing);
    }

    // A concurrent writer may create the same name first; the conflict is
    // ignored and the winner's row is read back.
    let insert = tag::Entity::insert(tag::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    })
    .on_conflict(OnConflict::column(tag::Column::Name).do_nothing().to_owned())
    .exec_without_returning(conn)
    .await;

    match insert {
        Ok(_) | Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(storage_error(e)),
    }

    let created = find_by_name(conn, name)
        .await?
        .ok_or(DomainError::Storage(RepoError::NoRowsAffected("tag")))?;
    tracing::debug!(tag_id = created.id, tag = %created.name, "Tag resolved after insert");

    Ok(created)
}

/// [`TagResolver`] running each resolution directly on the pool.
pub struct SeaOrmTagResolver {
    db: DbConn,
}

impl SeaOrmTagResolver {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TagResolver for SeaOrmTagResolver {
    async fn resolve(&self, names: &[String]) -> Result<Vec<Tag>, DomainError> {
        resolve_tags(&self.db, names).await
    }
}
