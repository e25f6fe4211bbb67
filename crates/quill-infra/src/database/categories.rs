//! Category validation and maintenance.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use quill_core::domain::Category;
use quill_core::ports::CategoryRepository;
use quill_core::{DomainError, RepoError};

use super::entity::{category, post};
use super::storage_error;

/// Confirm that a category named exactly `name` exists. Pure read.
pub async fn validate_category<C>(conn: &C, name: &str) -> Result<Category, DomainError>
where
    C: ConnectionTrait,
{
    category::Entity::find()
        .filter(category::Column::Name.eq(name))
        .one(conn)
        .await
        .map_err(storage_error)?
        .map(Into::into)
        .ok_or_else(|| DomainError::not_found("category", format!("name {name:?}")))
}

/// SeaORM-backed [`CategoryRepository`].
pub struct SeaOrmCategoryRepository {
    db: DbConn,
}

impl SeaOrmCategoryRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn validate(&self, name: &str) -> Result<Category, DomainError> {
        validate_category(&self.db, name).await
    }

    async fn create(&self, name: &str) -> Result<Category, DomainError> {
        Category::validate_name(name)?;

        let created = category::ActiveModel {
            name: Set(name.to_owned()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| match storage_error(e) {
            DomainError::Storage(RepoError::Constraint(_)) => {
                DomainError::validation(format!("category already exists: {name}"))
            }
            other => other,
        })?;

        tracing::info!(category_id = created.id, category = %created.name, "Category created");
        Ok(created.into())
    }

    async fn remove(&self, name: &str) -> Result<(), DomainError> {
        let txn = self.db.begin().await.map_err(storage_error)?;

        let cleared = post::Entity::update_many()
            .col_expr(post::Column::Category, Expr::value(Option::<String>::None))
            .filter(post::Column::Category.eq(name))
            .exec(&txn)
            .await
            .map_err(storage_error)?;

        let deleted = category::Entity::delete_many()
            .filter(category::Column::Name.eq(name))
            .exec(&txn)
            .await
            .map_err(storage_error)?;

        if deleted.rows_affected == 0 {
            return Err(DomainError::not_found("category", format!("name {name:?}")));
        }

        txn.commit().await.map_err(storage_error)?;
        tracing::info!(
            category = %name,
            cleared_posts = cleared.rows_affected,
            "Category removed"
        );
        Ok(())
    }
}
