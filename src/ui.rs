use iocraft::prelude::*;
use tokio::sync::watch;

use crate::types::{Brand, Category, Content, ContentKind, MediaType, Pagination, Stats};
use crate::upload::{UploadProgress, progress_text};

#[derive(Default, Props)]
pub struct ProgressBarProps {
    pub title: String,
    pub progress: Option<watch::Receiver<UploadProgress>>,
}

#[component]
pub fn ProgressBar(props: &ProgressBarProps, mut hooks: Hooks) -> impl Into<AnyElement<'static>> {
    let mut progress = hooks.use_state(UploadProgress::default);
    let receiver = props.progress.clone();

    hooks.use_future(async move {
        let Some(mut receiver) = receiver else {
            return;
        };
        loop {
            let current = *receiver.borrow_and_update();
            progress.set(current);
            if receiver.changed().await.is_err() {
                break;
            }
        }
    });

    let current = progress.get();
    let percent = if current.total == 0 {
        0.0
    } else {
        (current.uploaded as f32 / current.total as f32) * 100.0
    };

    element! {
        View(flex_direction: FlexDirection::Column) {
            Text(content: &props.title, weight: Weight::Bold)
            View(border_style: BorderStyle::Round, border_color: Color::Blue, width: 60) {
                View(width: Percent(percent), height: 1, background_color: Color::Blue)
            }
            Text(content: progress_text(current))
        }
    }
}

#[derive(Default, Props)]
pub struct ContentListProps {
    pub items: Vec<Content>,
    pub pagination: Option<Pagination>,
}

#[component]
pub fn ContentList(props: &ContentListProps) -> impl Into<AnyElement<'static>> {
    element! {
        View(flex_direction: FlexDirection::Column) {
            #(props.items.iter().map(|item| {
                let marker = match item.content_type {
                    ContentKind::Image => "◆",
                    ContentKind::Video => "▶",
                };
                let category = item.category_name.as_deref().unwrap_or(&item.category_id);
                element! {
                    View(flex_direction: FlexDirection::Row) {
                        Text(color: Color::Cyan, content: format!("{marker} "))
                        Text(weight: Weight::Bold, content: format!("{} ", item.title))
                        Text(color: Color::DarkGrey, content: format!(
                            "[{}] {} · {} views · {} likes",
                            item.id, category, item.views_count, item.likes_count
                        ))
                    }
                }
            }))
            #(props.pagination.as_ref().map(|p| element! {
                Text(color: Color::DarkGrey, content: format!(
                    "page {} of {} ({} total)", p.page, p.pages, p.total
                ))
            }))
        }
    }
}

#[derive(Default, Props)]
pub struct ContentDetailsProps {
    pub content: Option<Content>,
}

#[component]
pub fn ContentDetails(props: &ContentDetailsProps) -> impl Into<AnyElement<'static>> {
    let content = props.content.as_ref().unwrap();
    let upload_date = content
        .upload_date
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());

    element! {
        View(flex_direction: FlexDirection::Column) {
            View(flex_direction: FlexDirection::Row) {
                View(background_color: Color::Blue) {
                    Text(content: &content.title, color: Color::White)
                }
                Text(color: Color::DarkGrey, content: format!(" {} · {}", content.content_type, content.id))
            }
            #(content.description.as_ref().map(|d| element! {
                Text(content: d.clone())
            }))
            Text(content: format!("file:      {}", content.file_url))
            Text(content: format!("category:  {}", content.category_name.as_deref().unwrap_or(&content.category_id)))
            #(content.type_name.as_ref().map(|t| element! {
                Text(content: format!("type:      {t}"))
            }))
            #(content.brand_name.as_ref().map(|b| element! {
                Text(content: format!("brand:     {b}"))
            }))
            Text(content: format!("uploaded:  {} by {}", upload_date, content.uploaded_by))
            Text(content: format!("views:     {} · likes: {}", content.views_count, content.likes_count))
            #((!content.tags.is_empty()).then(|| element! {
                Text(content: format!("tags:      {}", content.tags.join(", ")))
            }))
        }
    }
}

#[derive(Default, Props)]
pub struct CategoryListProps {
    pub categories: Vec<Category>,
}

#[component]
pub fn CategoryList(props: &CategoryListProps) -> impl Into<AnyElement<'static>> {
    element! {
        View(flex_direction: FlexDirection::Column) {
            #(props.categories.iter().map(|category| {
                element! {
                    View(flex_direction: FlexDirection::Row) {
                        Text(weight: Weight::Bold, content: format!("{} ", category.name))
                        Text(color: Color::DarkGrey, content: format!(
                            "[{}] {} items", category.id, category.content_count
                        ))
                    }
                }
            }))
        }
    }
}

#[derive(Default, Props)]
pub struct MediaTypeListProps {
    pub types: Vec<MediaType>,
}

#[component]
pub fn MediaTypeList(props: &MediaTypeListProps) -> impl Into<AnyElement<'static>> {
    element! {
        View(flex_direction: FlexDirection::Column) {
            #(props.types.iter().map(|media_type| {
                let category = media_type
                    .category_name
                    .as_deref()
                    .unwrap_or(&media_type.category_id);
                element! {
                    View(flex_direction: FlexDirection::Row) {
                        Text(weight: Weight::Bold, content: format!("{} ", media_type.name))
                        Text(color: Color::DarkGrey, content: format!(
                            "[{}] in {} · {} items", media_type.id, category, media_type.content_count
                        ))
                    }
                }
            }))
        }
    }
}

#[derive(Default, Props)]
pub struct BrandListProps {
    pub brands: Vec<Brand>,
}

#[component]
pub fn BrandList(props: &BrandListProps) -> impl Into<AnyElement<'static>> {
    element! {
        View(flex_direction: FlexDirection::Column) {
            #(props.brands.iter().map(|brand| {
                element! {
                    View(flex_direction: FlexDirection::Row) {
                        Text(weight: Weight::Bold, content: format!("{} ", brand.name))
                        Text(color: Color::DarkGrey, content: format!(
                            "[{}] {} items", brand.id, brand.content_count
                        ))
                        #(brand.website_url.as_ref().map(|url| element! {
                            Text(color: Color::Blue, content: format!(" {url}"))
                        }))
                    }
                }
            }))
        }
    }
}

#[derive(Default, Props)]
pub struct StatsPanelProps {
    pub stats: Stats,
}

#[component]
pub fn StatsPanel(props: &StatsPanelProps) -> impl Into<AnyElement<'static>> {
    let stats = props.stats;
    element! {
        View(
            flex_direction: FlexDirection::Column,
            border_style: BorderStyle::Round,
            border_color: Color::Blue,
            padding: 1,
        ) {
            Text(weight: Weight::Bold, content: "Gallery statistics")
            Text(content: format!("content: {} ({} images, {} videos)",
                stats.total_content, stats.total_images, stats.total_videos))
            Text(content: format!("views:   {}", stats.total_views))
            Text(content: format!("likes:   {}", stats.total_likes))
        }
    }
}

#[derive(Default, Props)]
pub struct InputPromptProps {
    pub prompt: String,
    pub default: Option<String>,
    pub description: Option<String>,
}

#[component]
pub fn InputPrompt(props: &InputPromptProps) -> impl Into<AnyElement<'static>> {
    element! {
        View(flex_direction: FlexDirection::Column) {
            View(flex_direction: FlexDirection::Row) {
                Text(weight: Weight::Bold, content: &props.prompt)
                #(props.default.as_ref().map(|default| element! {
                    Text(color: Color::DarkGrey, content: format!(" [{default}]"))
                }))
            }
            #(props.description.as_ref().map(|description| element! {
                Text(color: Color::DarkGrey, content: description.clone())
            }))
        }
    }
}

#[component]
pub fn ConfigHeader() -> impl Into<AnyElement<'static>> {
    element! {
        View(border_style: BorderStyle::Round, border_color: Color::Blue, padding: 1) {
            Text(weight: Weight::Bold, content: "zam configuration")
        }
    }
}

#[derive(Default, Props)]
pub struct ErrorMessageProps {
    pub message: String,
}

#[component]
pub fn ErrorMessage(props: &ErrorMessageProps) -> impl Into<AnyElement<'static>> {
    element! {
        View(flex_direction: FlexDirection::Row) {
            Text(color: Color::Red, content: "✗ ")
            Text(color: Color::Red, content: &props.message)
        }
    }
}

#[derive(Default, Props)]
pub struct SuccessMessageProps {
    pub message: String,
}

#[component]
pub fn SuccessMessage(props: &SuccessMessageProps) -> impl Into<AnyElement<'static>> {
    element! {
        View(flex_direction: FlexDirection::Row) {
            Text(color: Color::Green, content: "✓ ")
            Text(color: Color::Green, content: &props.message)
        }
    }
}
