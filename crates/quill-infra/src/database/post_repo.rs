//! PostgreSQL post repository.
//!
//! A post spans three tables: the `posts` row, its ordered `post_categories`
//! links and its `post_comments`. Writes touching more than one table run in
//! a transaction; reads load the child rows for a whole page in two queries.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use quill_core::domain::{Comment, Post};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostPage, PostQuery, PostRepository};

use super::entity::{comment, post, post_category};
use super::postgres_base::map_db_err;

/// Full-text match on title and content. Any query word may match.
const SEARCH_SQL: &str = "to_tsvector('english', title || ' ' || content) \
     @@ replace(plainto_tsquery('english', ?)::text, '&', '|')::tsquery";

pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

/// Attach category links and comments to a batch of post rows.
async fn hydrate<C: ConnectionTrait>(db: &C, rows: Vec<post::Model>) -> Result<Vec<Post>, DbErr> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

    let links = post_category::Entity::find()
        .filter(post_category::Column::PostId.is_in(ids.clone()))
        .order_by_asc(post_category::Column::Position)
        .all(db)
        .await?;
    let comments = comment::Entity::find()
        .filter(comment::Column::PostId.is_in(ids))
        .order_by_asc(comment::Column::CreatedAt)
        .all(db)
        .await?;

    let mut categories_by_post: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for link in links {
        categories_by_post
            .entry(link.post_id)
            .or_default()
            .push(link.category_id);
    }
    let mut comments_by_post: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    for row in comments {
        comments_by_post
            .entry(row.post_id)
            .or_default()
            .push(row.into());
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let id = row.id;
            row.into_domain(
                categories_by_post.remove(&id).unwrap_or_default(),
                comments_by_post.remove(&id).unwrap_or_default(),
            )
        })
        .collect())
}

async fn insert_links<C: ConnectionTrait>(db: &C, post: &Post) -> Result<(), DbErr> {
    if post.category_ids.is_empty() {
        return Ok(());
    }
    let links = post
        .category_ids
        .iter()
        .enumerate()
        .map(|(position, category_id)| post_category::ActiveModel {
            post_id: Set(post.id),
            category_id: Set(*category_id),
            position: Set(position as i32),
        });
    post_category::Entity::insert_many(links).exec(db).await?;
    Ok(())
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let Some(row) = post::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let mut posts = hydrate(&self.db, vec![row]).await.map_err(map_db_err)?;
        Ok(posts.pop())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let row = post::ActiveModel::from(&post)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        insert_links(&txn, &post).await.map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;
        tracing::debug!(post_id = %row.id, "Post row inserted");

        Ok(row.into_domain(post.category_ids, Vec::new()))
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let mut model = post::ActiveModel::from(&post);
        model.author_id = NotSet;
        model.created_at = NotSet;
        let row = model.update(&txn).await.map_err(map_db_err)?;

        post_category::Entity::delete_many()
            .filter(post_category::Column::PostId.eq(post.id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        insert_links(&txn, &post).await.map_err(map_db_err)?;

        let mut posts = hydrate(&txn, vec![row]).await.map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        posts.pop().ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        // Links and comments go with the row (ON DELETE CASCADE).
        let result = post::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_page(&self, query: &PostQuery) -> Result<PostPage, RepoError> {
        let mut select = post::Entity::find();

        if query.published_only {
            select = select.filter(post::Column::IsPublished.eq(true));
        }
        if let Some(search) = &query.search {
            select = select.filter(Expr::cust_with_values(SEARCH_SQL, [search.clone()]));
        }
        if let Some(category_id) = query.category_id {
            select = select.filter(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column(post_category::Column::PostId)
                        .from(post_category::Entity)
                        .and_where(post_category::Column::CategoryId.eq(category_id))
                        .to_owned(),
                ),
            );
        }

        let total = select.clone().count(&self.db).await.map_err(map_db_err)?;

        let rows = select
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(query.offset)
            .limit(query.limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let posts = hydrate(&self.db, rows).await.map_err(map_db_err)?;
        Ok(PostPage { posts, total })
    }

    async fn append_comment(
        &self,
        post_id: Uuid,
        comment: Comment,
    ) -> Result<Option<Comment>, RepoError> {
        // A single INSERT; the foreign key tells us whether the post exists.
        match comment::ActiveModel::for_post(post_id, &comment)
            .insert(&self.db)
            .await
        {
            Ok(row) => Ok(Some(row.into())),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))) => {
                Ok(None)
            }
            Err(e) => Err(map_db_err(e)),
        }
    }
}
