use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{LookupLabels, LookupRef};
use crate::entities::blog_post_entity;
use crate::error::AppResult;
use crate::utils::{Validate, optional_text, require_text};

/// 未提供摘要时从正文截取的字符数
pub const EXCERPT_LENGTH: usize = 200;

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct BlogPostQuery {
    pub category: Option<String>,
    /// 为 true 时包含草稿（默认只返回已发布）
    pub include_drafts: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateBlogPostRequest {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category_id: Option<i64>,
    /// 创建后立即发布
    #[serde(default)]
    pub publish: bool,
}

impl Validate for CreateBlogPostRequest {
    fn validate(&self) -> AppResult<()> {
        require_text("title", &self.title, 3, 200)?;
        require_text("content", &self.content, 1, 100_000)?;
        optional_text("excerpt", self.excerpt.as_deref(), 500)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateBlogPostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category_id: Option<i64>,
    pub status_id: Option<i64>,
}

impl Validate for UpdateBlogPostRequest {
    fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title {
            require_text("title", title, 3, 200)?;
        }
        if let Some(content) = &self.content {
            require_text("content", content, 1, 100_000)?;
        }
        optional_text("excerpt", self.excerpt.as_deref(), 500)
    }
}

/// 取正文前 `EXCERPT_LENGTH` 个字符，被截断时追加省略号
pub fn derive_excerpt(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() <= EXCERPT_LENGTH {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(EXCERPT_LENGTH).collect();
    format!("{}...", cut.trim_end())
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BlogPostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub category: Option<LookupRef>,
    pub status: Option<LookupRef>,
    pub author_id: i64,
    pub author_name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPostResponse {
    pub fn build(
        m: blog_post_entity::Model,
        author_name: Option<String>,
        labels: &LookupLabels,
    ) -> Self {
        BlogPostResponse {
            category: labels.get(m.category_id),
            status: labels.get(Some(m.status_id)),
            id: m.id,
            title: m.title,
            content: m.content,
            excerpt: m.excerpt,
            author_id: m.author_id,
            author_name,
            published_at: m.published_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_content_is_kept() {
        assert_eq!(derive_excerpt("  Hello donors  "), "Hello donors");
    }

    #[test]
    fn test_long_content_is_cut() {
        let content = "é".repeat(250);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt.chars().count(), EXCERPT_LENGTH + 3);
        assert!(excerpt.ends_with("..."));
    }
}
