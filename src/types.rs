use std::collections::HashMap;
use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a content item is an image or a video. The backend derives this
/// from the uploaded file's extension and stores it alongside the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Image,
    Video,
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Image => write!(f, "image"),
            ContentKind::Video => write!(f, "video"),
        }
    }
}

impl std::str::FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(ContentKind::Image),
            "video" => Ok(ContentKind::Video),
            other => Err(format!("unknown content kind '{other}'")),
        }
    }
}

/// A gallery content record as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub thumbnail_url: Option<String>,
    pub content_type: ContentKind,
    pub upload_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub views_count: u64,
    #[serde(default)]
    pub likes_count: u64,
    pub category_id: String,
    pub category_name: Option<String>,
    pub type_id: Option<String>,
    pub type_name: Option<String>,
    pub brand_id: Option<String>,
    pub brand_name: Option<String>,
    pub uploaded_by: String,
    pub uploader_name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub metadata: Value,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    #[serde(default)]
    pub content_count: u64,
}

/// A classification entity the backend calls a "type": a sub-grouping that
/// always belongs to one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    pub id: String,
    pub name: String,
    pub category_id: String,
    pub category_name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub content_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    #[serde(default)]
    pub content_count: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Stats {
    pub total_content: u64,
    pub total_images: u64,
    pub total_videos: u64,
    pub total_views: u64,
    pub total_likes: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Server-side filter for the content listing. Every field maps to a query
/// parameter; filtering always happens on the backend.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub category_id: Option<String>,
    pub type_id: Option<String>,
    pub brand_id: Option<String>,
    pub content_type: Option<ContentKind>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ContentFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = &self.category_id {
            pairs.push(("category_id", id.clone()));
        }
        if let Some(id) = &self.type_id {
            pairs.push(("type_id", id.clone()));
        }
        if let Some(id) = &self.brand_id {
            pairs.push(("brand_id", id.clone()));
        }
        if let Some(kind) = self.content_type {
            pairs.push(("content_type", kind.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            pairs.push(("per_page", per_page.to_string()));
        }
        pairs
    }
}

// Request bodies. Optional fields are omitted entirely so the backend only
// updates what was provided.

#[derive(Debug, Clone, Default, Serialize)]
pub struct ContentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMediaType {
    pub name: String,
    pub category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MediaTypeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewBrand {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BrandUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_style: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeoSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
}

pub type SocialLinks = HashMap<String, String>;

// Response envelopes. The backend wraps every payload in
// `{"success": true, ...}` and reports failures as `{"success": false, "error": ...}`.

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentListResponse {
    pub success: bool,
    #[serde(default)]
    pub content: Vec<Content>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
pub struct ContentResponse {
    pub success: bool,
    pub message: Option<String>,
    pub content: Content,
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: Option<String>,
    #[serde(default)]
    pub content: Vec<Content>,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LikeResponse {
    pub success: bool,
    pub likes_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: Stats,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesResponse {
    pub success: bool,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryResponse {
    pub success: bool,
    pub category: Category,
}

#[derive(Debug, Deserialize)]
pub struct MediaTypesResponse {
    pub success: bool,
    #[serde(default, rename = "types")]
    pub types: Vec<MediaType>,
}

#[derive(Debug, Deserialize)]
pub struct MediaTypeResponse {
    pub success: bool,
    #[serde(rename = "type")]
    pub media_type: MediaType,
}

#[derive(Debug, Deserialize)]
pub struct BrandsResponse {
    pub success: bool,
    #[serde(default)]
    pub brands: Vec<Brand>,
}

#[derive(Debug, Deserialize)]
pub struct BrandResponse {
    pub success: bool,
    pub brand: Brand,
}

#[derive(Debug, Deserialize)]
pub struct ThemeResponse {
    pub success: bool,
    pub theme: ThemeSettings,
}

#[derive(Debug, Deserialize)]
pub struct SeoResponse {
    pub success: bool,
    pub seo: SeoSettings,
}

#[derive(Debug, Deserialize)]
pub struct SocialResponse {
    pub success: bool,
    #[serde(default)]
    pub social_media: SocialLinks,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_deserializes_from_backend_shape() {
        let json = r#"{
            "success": true,
            "content": [{
                "id": "7f6b2c1e-9a7d-4a39-b06a-1f2d4a8c9e10",
                "title": "غروب الشمس",
                "description": null,
                "file_url": "/uploads/7f6b2c1e.jpg",
                "thumbnail_url": "/uploads/7f6b2c1e.jpg",
                "content_type": "image",
                "upload_date": "2024-03-11T09:41:23.532011",
                "views_count": 12,
                "likes_count": 3,
                "category_id": "cat-1",
                "category_name": "طبيعة",
                "type_id": null,
                "type_name": null,
                "brand_id": null,
                "brand_name": null,
                "uploaded_by": "admin",
                "uploader_name": "Abdallah",
                "tags": ["غروب", "بحر"],
                "is_public": true,
                "metadata": {}
            }],
            "pagination": {
                "page": 1,
                "per_page": 20,
                "total": 1,
                "pages": 1,
                "has_next": false,
                "has_prev": false
            }
        }"#;

        let response: ContentListResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        assert_eq!(response.content.len(), 1);

        let item = &response.content[0];
        assert_eq!(item.content_type, ContentKind::Image);
        assert_eq!(item.tags, vec!["غروب", "بحر"]);
        assert!(item.type_id.is_none());
        assert_eq!(response.pagination.unwrap().total, 1);
    }

    #[test]
    fn content_filter_maps_to_query_parameters() {
        let filter = ContentFilter {
            category_id: Some("5".to_string()),
            content_type: Some(ContentKind::Video),
            page: Some(2),
            ..Default::default()
        };

        let pairs = filter.query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("category_id", "5".to_string()),
                ("content_type", "video".to_string()),
                ("page", "2".to_string()),
            ]
        );

        assert!(ContentFilter::default().query_pairs().is_empty());
    }

    #[test]
    fn content_update_omits_unset_fields() {
        let update = ContentUpdate {
            title: Some("عنوان جديد".to_string()),
            is_public: Some(false),
            ..Default::default()
        };

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"title": "عنوان جديد", "is_public": false})
        );
    }

    #[test]
    fn media_type_envelope_uses_type_key() {
        let json = r#"{
            "success": true,
            "type": {
                "id": "t1",
                "name": "لقطات جوية",
                "category_id": "cat-1",
                "category_name": "طبيعة",
                "description": null,
                "content_count": 4
            }
        }"#;

        let response: MediaTypeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.media_type.name, "لقطات جوية");
        assert_eq!(response.media_type.content_count, 4);
    }
}
