//! Comment entity for SeaORM. Rows are only ever inserted.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quill_core::domain::Comment;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "post_comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Comment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            author: model.author,
            content: model.content,
            created_at: model.created_at.into(),
        }
    }
}

impl ActiveModel {
    pub fn for_post(post_id: Uuid, comment: &Comment) -> Self {
        Self {
            id: Set(comment.id),
            post_id: Set(post_id),
            author: Set(comment.author.clone()),
            content: Set(comment.content.clone()),
            created_at: Set(comment.created_at.into()),
        }
    }
}
