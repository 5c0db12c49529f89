//! Post entity for SeaORM.
//!
//! Categories and comments live in their own tables; tags are a JSON array.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quill_core::domain::{Comment, Post};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(nullable)]
    pub excerpt: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub is_published: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Assemble the domain post from this row and its child rows.
    pub fn into_domain(self, category_ids: Vec<Uuid>, comments: Vec<Comment>) -> Post {
        let tags = serde_json::from_value(self.tags).unwrap_or_else(|e| {
            tracing::warn!(post_id = %self.id, "Unreadable tags column: {e}");
            Vec::new()
        });

        Post {
            id: self.id,
            author_id: self.author_id,
            title: self.title,
            content: self.content,
            excerpt: self.excerpt,
            category_ids,
            tags,
            comments,
            is_published: self.is_published,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel (row columns only).
impl From<&Post> for ActiveModel {
    fn from(post: &Post) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            title: Set(post.title.clone()),
            content: Set(post.content.clone()),
            excerpt: Set(post.excerpt.clone()),
            tags: Set(Json::from(post.tags.clone())),
            is_published: Set(post.is_published),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
