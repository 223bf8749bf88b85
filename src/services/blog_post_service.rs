use crate::entities::{blog_post_entity as posts, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthenticatedUser, BlogPostQuery, BlogPostResponse, CreateBlogPostRequest, LookupKind,
    PaginatedResponse, PaginationParams, ReadOutcome, UpdateBlogPostRequest, derive_excerpt, names,
};
use crate::services::{LookupService, UserService};
use crate::utils::Validate;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct BlogPostService {
    pool: DatabaseConnection,
}

impl BlogPostService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 文章列表；默认只返回已发布文章
    pub async fn list(
        &self,
        query: &BlogPostQuery,
    ) -> AppResult<ReadOutcome<PaginatedResponse<BlogPostResponse>>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let result = self.fetch_page(query, &params).await;
        ReadOutcome::recover_with("blog_posts.list", result, || PaginatedResponse::empty(&params))
    }

    async fn fetch_page(
        &self,
        query: &BlogPostQuery,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<BlogPostResponse>> {
        let mut select = posts::Entity::find();
        if !query.include_drafts.unwrap_or(false) {
            let published =
                LookupService::resolve(&self.pool, LookupKind::BlogStatus, names::BLOG_PUBLISHED)
                    .await?;
            select = select.filter(posts::Column::StatusId.eq(published.id));
        }
        if let Some(category) = query.category.as_deref() {
            match LookupService::find_by_name(&self.pool, LookupKind::BlogCategory, category)
                .await?
            {
                Some(row) => select = select.filter(posts::Column::CategoryId.eq(row.id)),
                None => return Ok(PaginatedResponse::empty(params)),
            }
        }

        let total = select.clone().count(&self.pool).await?;
        let rows = select
            .find_also_related(users::Entity)
            .order_by_desc(posts::Column::PublishedAt)
            .order_by_desc(posts::Column::CreatedAt)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;
        let labels = LookupService::labels(
            &self.pool,
            rows.iter().flat_map(|(p, _)| [p.category_id, Some(p.status_id)]),
        )
        .await?;
        let items = rows
            .into_iter()
            .map(|(p, author)| BlogPostResponse::build(p, author.map(|a| a.display_name()), &labels))
            .collect();
        Ok(PaginatedResponse::new(items, params, total))
    }

    /// 单篇文章；草稿仅在 `include_drafts` 时可见
    pub async fn get(&self, id: i64, include_drafts: bool) -> AppResult<BlogPostResponse> {
        let (post, author) = posts::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Blog post", id))?;
        let labels = LookupService::labels(&self.pool, [post.category_id, Some(post.status_id)])
            .await?;
        if !include_drafts && labels.name_of(Some(post.status_id)) != Some(names::BLOG_PUBLISHED) {
            return Err(AppError::not_found("Blog post", id));
        }
        Ok(BlogPostResponse::build(
            post,
            author.map(|a| a.display_name()),
            &labels,
        ))
    }

    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        req: CreateBlogPostRequest,
    ) -> AppResult<BlogPostResponse> {
        req.validate()?;
        let author = UserService::ensure(&self.pool, caller).await?;

        let txn = self.pool.begin().await?;
        let status_name = if req.publish {
            names::BLOG_PUBLISHED
        } else {
            names::BLOG_DRAFT
        };
        let status = LookupService::resolve(&txn, LookupKind::BlogStatus, status_name).await?;
        let category = LookupService::require_optional(
            &txn,
            "category_id",
            LookupKind::BlogCategory,
            req.category_id,
        )
        .await?;

        let now = Utc::now();
        let excerpt = match req.excerpt.as_deref().map(str::trim) {
            Some(e) if !e.is_empty() => e.to_string(),
            _ => derive_excerpt(&req.content),
        };
        let post = posts::ActiveModel {
            title: Set(req.title.trim().to_string()),
            content: Set(req.content),
            excerpt: Set(excerpt),
            category_id: Set(category.map(|c| c.id)),
            status_id: Set(status.id),
            author_id: Set(author.id),
            published_at: Set(req.publish.then_some(now)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!("Blog post {} created by user {}", post.id, author.id);
        self.get(post.id, true).await
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: i64,
        req: UpdateBlogPostRequest,
    ) -> AppResult<BlogPostResponse> {
        req.validate()?;
        let caller_id = UserService::find_local(&self.pool, caller).await?.map(|u| u.id);

        let txn = self.pool.begin().await?;
        let post = Self::find(&txn, id).await?;
        UserService::authorize_owner(caller, caller_id, Some(post.author_id))?;

        let explicit_excerpt = req.excerpt.is_some();
        let has_published_at = post.published_at.is_some();
        let mut am = post.into_active_model();
        if let Some(title) = req.title {
            am.title = Set(title.trim().to_string());
        }
        if let Some(content) = req.content {
            if !explicit_excerpt {
                am.excerpt = Set(derive_excerpt(&content));
            }
            am.content = Set(content);
        }
        if let Some(excerpt) = req.excerpt {
            am.excerpt = Set(excerpt.trim().to_string());
        }
        if let Some(category_id) = req.category_id {
            LookupService::require(&txn, "category_id", LookupKind::BlogCategory, category_id)
                .await?;
            am.category_id = Set(Some(category_id));
        }
        if let Some(status_id) = req.status_id {
            let status =
                LookupService::require(&txn, "status_id", LookupKind::BlogStatus, status_id).await?;
            am.status_id = Set(status.id);
            if status.name == names::BLOG_PUBLISHED && !has_published_at {
                am.published_at = Set(Some(Utc::now()));
            }
        }
        am.updated_at = Set(Utc::now());
        am.update(&txn).await?;
        txn.commit().await?;
        self.get(id, true).await
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, id: i64) -> AppResult<()> {
        let caller_id = UserService::find_local(&self.pool, caller).await?.map(|u| u.id);
        let post = Self::find(&self.pool, id).await?;
        UserService::authorize_owner(caller, caller_id, Some(post.author_id))?;
        posts::Entity::delete_by_id(id).exec(&self.pool).await?;
        log::info!("Blog post {id} deleted");
        Ok(())
    }

    /// 发布文章（status = published, published_at = now）
    pub async fn publish(&self, caller: &AuthenticatedUser, id: i64) -> AppResult<BlogPostResponse> {
        let caller_id = UserService::find_local(&self.pool, caller).await?.map(|u| u.id);
        let txn = self.pool.begin().await?;
        let post = Self::find(&txn, id).await?;
        UserService::authorize_owner(caller, caller_id, Some(post.author_id))?;

        let published =
            LookupService::resolve(&txn, LookupKind::BlogStatus, names::BLOG_PUBLISHED).await?;
        let now = Utc::now();
        let mut am = post.into_active_model();
        am.status_id = Set(published.id);
        am.published_at = Set(Some(now));
        am.updated_at = Set(now);
        am.update(&txn).await?;
        txn.commit().await?;
        self.get(id, true).await
    }

    async fn find<C: ConnectionTrait>(db: &C, id: i64) -> AppResult<posts::Model> {
        posts::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Blog post", id))
    }
}
