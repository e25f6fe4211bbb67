//! Post entity for SeaORM.

use sea_orm::entity::prelude::*;

use quill_core::domain::{Post, Tag};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub content: String,
    /// Soft reference to `categories.name`.
    pub category: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::Category",
        to = "super::category::Column::Name",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(has_many = "super::post_tag::Entity")]
    PostTag,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::post_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostTag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Conversion from SeaORM Model to Domain Post, attaching its tags.
    pub fn into_post(self, mut tags: Vec<Tag>) -> Post {
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Post {
            id: self.id,
            title: self.title,
            content: self.content,
            category: self.category,
            tags,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        }
    }
}
