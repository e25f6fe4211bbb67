//! Multi-criteria post search.

use async_trait::async_trait;
use sea_orm::sea_query::{BinOper, Expr, Func, IntoColumnRef, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbConn, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait,
};

use quill_core::DomainError;
use quill_core::domain::Post;
use quill_core::ports::PostSearch;

use super::entity::{category, post, post_tag, tag};
use super::posts::hydrate;
use super::storage_error;

const LIKE_ESCAPE: char = '\\';

/// Find posts whose title, content, category name or any tag name contains
/// `term`, ignoring case.
///
/// The four predicates are OR-ed, so a post matching several of them is
/// returned once. An empty `term` matches every post.
pub async fn search_posts<C>(conn: &C, term: &str) -> Result<Vec<Post>, DomainError>
where
    C: ConnectionTrait,
{
    let pattern = contains_pattern(term);

    let tagged = post_tag::Entity::find()
        .select_only()
        .column(post_tag::Column::PostId)
        .inner_join(tag::Entity)
        .filter(lower_like((tag::Entity, tag::Column::Name), &pattern))
        .into_query();

    let categorized = category::Entity::find()
        .select_only()
        .column(category::Column::Name)
        .filter(lower_like((category::Entity, category::Column::Name), &pattern))
        .into_query();

    let models = post::Entity::find()
        .filter(
            Condition::any()
                .add(lower_like((post::Entity, post::Column::Title), &pattern))
                .add(lower_like((post::Entity, post::Column::Content), &pattern))
                .add(post::Column::Id.in_subquery(tagged))
                .add(post::Column::Category.in_subquery(categorized)),
        )
        .order_by_asc(post::Column::Id)
        .all(conn)
        .await
        .map_err(storage_error)?;

    if models.is_empty() {
        return Err(DomainError::not_found("post", format!("term {term:?}")));
    }

    tracing::debug!(term = %term, matches = models.len(), "Search completed");
    hydrate(conn, models).await
}

/// `LOWER(column) LIKE LOWER(pattern) ESCAPE '\'`.
///
/// Both sides go through the database's `LOWER`, so the comparison holds for
/// characters the engine does not case-fold.
fn lower_like<C>(column: C, pattern: &str) -> SimpleExpr
where
    C: IntoColumnRef,
{
    let pattern = SimpleExpr::Binary(
        Box::new(Func::lower(Expr::val(pattern)).into()),
        BinOper::Escape,
        Box::new(SimpleExpr::Constant(LIKE_ESCAPE.into())),
    );
    Expr::expr(Func::lower(Expr::col(column))).binary(BinOper::Like, pattern)
}

/// `%term%` with LIKE wildcards in `term` escaped.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// SeaORM-backed [`PostSearch`].
pub struct SeaOrmPostSearch {
    db: DbConn,
}

impl SeaOrmPostSearch {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostSearch for SeaOrmPostSearch {
    async fn search(&self, term: &str) -> Result<Vec<Post>, DomainError> {
        search_posts(&self.db, term).await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    use super::{contains_pattern, lower_like};
    use crate::database::entity::post;

    #[test]
    fn term_is_lowered_by_the_database() {
        let sql = post::Entity::find()
            .filter(lower_like((post::Entity, post::Column::Title), "%CAFÉ%"))
            .build(DbBackend::Sqlite)
            .to_string();

        assert!(sql.contains(r#"LOWER("posts"."title") LIKE"#), "{sql}");
        assert!(sql.contains("LOWER('%CAFÉ%')"), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
    }

    #[test]
    fn pattern_is_wrapped_and_keeps_case() {
        assert_eq!(contains_pattern("Cat"), "%Cat%");
        assert_eq!(contains_pattern(""), "%%");
    }

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("snake_case"), "%snake\\_case%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
