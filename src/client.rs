use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::GalleryError;
use crate::types::{
    Brand, BrandResponse, BrandUpdate, BrandsResponse, CategoriesResponse, Category,
    CategoryResponse, CategoryUpdate, Content, ContentFilter, ContentListResponse,
    ContentResponse, ContentUpdate, ErrorBody, LikeResponse, MediaType, MediaTypeResponse,
    MediaTypeUpdate, MediaTypesResponse, MessageResponse, NewBrand, NewCategory, NewMediaType,
    Pagination, SeoResponse, SeoSettings, SocialLinks, SocialResponse, Stats, StatsResponse,
    ThemeResponse, ThemeSettings, UploadResponse,
};
use crate::upload::{SelectedFile, UploadMetadata};

/// One page of the content listing.
#[derive(Debug)]
pub struct ContentPage {
    pub items: Vec<Content>,
    pub pagination: Option<Pagination>,
}

/// What the backend reported for an accepted upload request.
#[derive(Debug)]
pub struct UploadOutcome {
    pub message: String,
    pub content: Vec<Content>,
}

/// HTTP client for the gallery backend. All endpoints live under the fixed
/// `/api` prefix; no auth header is attached (the backend has none).
pub struct GalleryClient {
    client: Client,
    base_url: Url,
}

impl GalleryClient {
    pub fn new(mut base_url: Url, timeout: Option<Duration>) -> Result<Self, GalleryError> {
        // Url::join treats a non-slash-terminated path as a file and would
        // drop its last segment when the api prefix is appended.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(GalleryClient {
            client: builder.build()?,
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Url {
        self.base_url
            .join(&format!("api/{path}"))
            .expect("api route segments are statically valid")
    }

    /// Unwraps the `{success, ...}` envelope: non-2xx statuses and
    /// `success: false` payloads both surface as server errors, carrying the
    /// backend's `error` string when one is present.
    async fn parse<T>(&self, response: Response) -> Result<T, GalleryError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| status.to_string());
            return Err(GalleryError::Server { status, message });
        }

        if let Ok(error) = serde_json::from_slice::<ErrorBody>(&body)
            && !error.success
        {
            let message = error.error.unwrap_or_else(|| "unknown error".to_string());
            return Err(GalleryError::Server { status, message });
        }

        serde_json::from_slice(&body).map_err(|err| GalleryError::Server {
            status,
            message: format!("malformed response: {err}"),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GalleryError> {
        let response = self.client.get(self.endpoint(path)).send().await?;
        self.parse(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GalleryError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await?;
        self.parse(response).await
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GalleryError> {
        let response = self
            .client
            .put(self.endpoint(path))
            .json(body)
            .send()
            .await?;
        self.parse(response).await
    }

    async fn delete(&self, path: &str) -> Result<MessageResponse, GalleryError> {
        let response = self.client.delete(self.endpoint(path)).send().await?;
        self.parse(response).await
    }

    // Content

    pub async fn list_content(&self, filter: &ContentFilter) -> Result<ContentPage, GalleryError> {
        let response = self
            .client
            .get(self.endpoint("content"))
            .query(&filter.query_pairs())
            .send()
            .await?;
        let response: ContentListResponse = self.parse(response).await?;

        Ok(ContentPage {
            items: response.content,
            pagination: response.pagination,
        })
    }

    /// Fetches one content item. The backend counts this as a view.
    pub async fn get_content(&self, id: &str) -> Result<Content, GalleryError> {
        let response: ContentResponse = self.get(&format!("content/{id}")).await?;
        Ok(response.content)
    }

    /// Submits files plus shared metadata as one multipart request. The
    /// coordinator decides whether a request carries one file or the whole
    /// batch; the metadata fields are identical either way.
    pub async fn upload(
        &self,
        files: &[SelectedFile],
        metadata: &UploadMetadata,
        uploaded_by: &str,
    ) -> Result<UploadOutcome, GalleryError> {
        let mut form = Form::new()
            .text("title", metadata.title.clone())
            .text("description", metadata.description.clone())
            .text("category_id", metadata.category_id.clone())
            .text("uploaded_by", uploaded_by.to_string());

        if let Some(type_id) = &metadata.type_id {
            form = form.text("type_id", type_id.clone());
        }
        if let Some(brand_id) = &metadata.brand_id {
            form = form.text("brand_id", brand_id.clone());
        }
        if !metadata.tags.is_empty() {
            form = form.text("tags", metadata.tags.join(","));
        }

        for file in files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str(&file.mime_type)?;
            form = form.part("files", part);
        }

        let response = self
            .client
            .post(self.endpoint("content"))
            .multipart(form)
            .send()
            .await?;
        let response: UploadResponse = self.parse(response).await?;

        Ok(UploadOutcome {
            message: response.message.unwrap_or_default(),
            content: response.content,
        })
    }

    pub async fn update_content(
        &self,
        id: &str,
        update: &ContentUpdate,
    ) -> Result<Content, GalleryError> {
        let response: ContentResponse = self.put_json(&format!("content/{id}"), update).await?;
        Ok(response.content)
    }

    pub async fn delete_content(&self, id: &str) -> Result<String, GalleryError> {
        let response = self.delete(&format!("content/{id}")).await?;
        Ok(response.message.unwrap_or_default())
    }

    pub async fn like_content(&self, id: &str) -> Result<u64, GalleryError> {
        let response = self
            .client
            .post(self.endpoint(&format!("content/{id}/like")))
            .send()
            .await?;
        let response: LikeResponse = self.parse(response).await?;
        Ok(response.likes_count)
    }

    pub async fn stats(&self) -> Result<Stats, GalleryError> {
        let response: StatsResponse = self.get("content/stats").await?;
        Ok(response.stats)
    }

    // Categories

    pub async fn list_categories(&self) -> Result<Vec<Category>, GalleryError> {
        let response: CategoriesResponse = self.get("categories").await?;
        Ok(response.categories)
    }

    pub async fn get_category(&self, id: &str) -> Result<Category, GalleryError> {
        let response: CategoryResponse = self.get(&format!("categories/{id}")).await?;
        Ok(response.category)
    }

    pub async fn create_category(&self, category: &NewCategory) -> Result<Category, GalleryError> {
        let response: CategoryResponse = self.post_json("categories", category).await?;
        Ok(response.category)
    }

    pub async fn update_category(
        &self,
        id: &str,
        update: &CategoryUpdate,
    ) -> Result<Category, GalleryError> {
        let response: CategoryResponse = self.put_json(&format!("categories/{id}"), update).await?;
        Ok(response.category)
    }

    pub async fn delete_category(&self, id: &str) -> Result<String, GalleryError> {
        let response = self.delete(&format!("categories/{id}")).await?;
        Ok(response.message.unwrap_or_default())
    }

    // Types

    pub async fn list_types(
        &self,
        category_id: Option<&str>,
    ) -> Result<Vec<MediaType>, GalleryError> {
        let mut request = self.client.get(self.endpoint("types"));
        if let Some(category_id) = category_id {
            request = request.query(&[("category_id", category_id)]);
        }
        let response: MediaTypesResponse = self.parse(request.send().await?).await?;
        Ok(response.types)
    }

    pub async fn get_type(&self, id: &str) -> Result<MediaType, GalleryError> {
        let response: MediaTypeResponse = self.get(&format!("types/{id}")).await?;
        Ok(response.media_type)
    }

    pub async fn create_type(&self, media_type: &NewMediaType) -> Result<MediaType, GalleryError> {
        let response: MediaTypeResponse = self.post_json("types", media_type).await?;
        Ok(response.media_type)
    }

    pub async fn update_type(
        &self,
        id: &str,
        update: &MediaTypeUpdate,
    ) -> Result<MediaType, GalleryError> {
        let response: MediaTypeResponse = self.put_json(&format!("types/{id}"), update).await?;
        Ok(response.media_type)
    }

    pub async fn delete_type(&self, id: &str) -> Result<String, GalleryError> {
        let response = self.delete(&format!("types/{id}")).await?;
        Ok(response.message.unwrap_or_default())
    }

    // Brands

    pub async fn list_brands(&self) -> Result<Vec<Brand>, GalleryError> {
        let response: BrandsResponse = self.get("brands").await?;
        Ok(response.brands)
    }

    pub async fn get_brand(&self, id: &str) -> Result<Brand, GalleryError> {
        let response: BrandResponse = self.get(&format!("brands/{id}")).await?;
        Ok(response.brand)
    }

    pub async fn create_brand(&self, brand: &NewBrand) -> Result<Brand, GalleryError> {
        let response: BrandResponse = self.post_json("brands", brand).await?;
        Ok(response.brand)
    }

    pub async fn update_brand(
        &self,
        id: &str,
        update: &BrandUpdate,
    ) -> Result<Brand, GalleryError> {
        let response: BrandResponse = self.put_json(&format!("brands/{id}"), update).await?;
        Ok(response.brand)
    }

    pub async fn delete_brand(&self, id: &str) -> Result<String, GalleryError> {
        let response = self.delete(&format!("brands/{id}")).await?;
        Ok(response.message.unwrap_or_default())
    }

    // Settings

    pub async fn theme_settings(&self) -> Result<ThemeSettings, GalleryError> {
        let response: ThemeResponse = self.get("settings/theme").await?;
        Ok(response.theme)
    }

    pub async fn update_theme_settings(
        &self,
        settings: &ThemeSettings,
    ) -> Result<ThemeSettings, GalleryError> {
        let response: ThemeResponse = self.post_json("settings/theme", settings).await?;
        Ok(response.theme)
    }

    pub async fn seo_settings(&self) -> Result<SeoSettings, GalleryError> {
        let response: SeoResponse = self.get("settings/seo").await?;
        Ok(response.seo)
    }

    pub async fn update_seo_settings(
        &self,
        settings: &SeoSettings,
    ) -> Result<SeoSettings, GalleryError> {
        let response: SeoResponse = self.post_json("settings/seo", settings).await?;
        Ok(response.seo)
    }

    pub async fn social_links(&self) -> Result<SocialLinks, GalleryError> {
        let response: SocialResponse = self.get("settings/social-media").await?;
        Ok(response.social_media)
    }

    pub async fn update_social_links(
        &self,
        links: &SocialLinks,
    ) -> Result<SocialLinks, GalleryError> {
        let response: SocialResponse = self.post_json("settings/social-media", links).await?;
        Ok(response.social_media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentKind;

    fn client_for(server: &mockito::Server) -> GalleryClient {
        GalleryClient::new(Url::parse(&server.url()).unwrap(), None).unwrap()
    }

    #[test]
    fn base_url_with_a_path_keeps_its_last_segment() {
        let client = GalleryClient::new(Url::parse("http://host/gallery").unwrap(), None).unwrap();
        assert_eq!(
            client.endpoint("content").as_str(),
            "http://host/gallery/api/content"
        );

        let client = GalleryClient::new(Url::parse("http://host").unwrap(), None).unwrap();
        assert_eq!(
            client.endpoint("content/stats").as_str(),
            "http://host/api/content/stats"
        );
    }

    #[tokio::test]
    async fn list_content_sends_filter_query_parameters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/content")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("category_id".into(), "5".into()),
                mockito::Matcher::UrlEncoded("content_type".into(), "image".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "content": [], "pagination": null}"#)
            .create_async()
            .await;

        let filter = ContentFilter {
            category_id: Some("5".to_string()),
            content_type: Some(ContentKind::Image),
            ..Default::default()
        };
        let page = client_for(&server).list_content(&filter).await.unwrap();

        assert!(page.items.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn upload_posts_multipart_with_metadata_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/content")
            .match_header(
                "content-type",
                mockito::Matcher::Regex("^multipart/form-data".to_string()),
            )
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::Regex("name=\"category_id\"".to_string()),
                mockito::Matcher::Regex("name=\"uploaded_by\"".to_string()),
                mockito::Matcher::Regex("filename=\"a.jpg\"".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "message": "تم رفع 1 ملف بنجاح", "content": []}"#)
            .create_async()
            .await;

        let files = [SelectedFile {
            name: "a.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            size: 3,
            bytes: vec![1, 2, 3],
        }];
        let metadata = UploadMetadata {
            title: "عنوان".to_string(),
            category_id: "5".to_string(),
            ..Default::default()
        };

        let outcome = client_for(&server)
            .upload(&files, &metadata, "admin")
            .await
            .unwrap();

        assert_eq!(outcome.message, "تم رفع 1 ملف بنجاح");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn stats_unwraps_the_envelope() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/content/stats")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "success": true,
                    "stats": {
                        "total_content": 10,
                        "total_images": 7,
                        "total_videos": 3,
                        "total_views": 120,
                        "total_likes": 14
                    }
                }"#,
            )
            .create_async()
            .await;

        let stats = client_for(&server).stats().await.unwrap();
        assert_eq!(stats.total_images, 7);
        assert_eq!(stats.total_videos, 3);
    }

    #[tokio::test]
    async fn non_2xx_maps_to_a_server_error_with_backend_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/categories")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": false, "error": "قاعدة البيانات غير متاحة"}"#)
            .create_async()
            .await;

        let err = client_for(&server).list_categories().await.unwrap_err();
        match err {
            GalleryError::Server { status, message } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(message, "قاعدة البيانات غير متاحة");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_false_in_a_2xx_body_is_a_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/categories/c1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": false, "error": "التصنيف غير موجود"}"#)
            .create_async()
            .await;

        let err = client_for(&server).delete_category("c1").await.unwrap_err();
        match err {
            GalleryError::Server { message, .. } => {
                assert_eq!(message, "التصنيف غير موجود");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_types_filters_by_category() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/types")
            .match_query(mockito::Matcher::UrlEncoded(
                "category_id".into(),
                "cat-1".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "success": true,
                    "types": [{
                        "id": "t1",
                        "name": "لقطات جوية",
                        "category_id": "cat-1",
                        "category_name": "طبيعة",
                        "description": null,
                        "content_count": 2
                    }]
                }"#,
            )
            .create_async()
            .await;

        let types = client_for(&server)
            .list_types(Some("cat-1"))
            .await
            .unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].category_id, "cat-1");
        mock.assert_async().await;
    }
}
