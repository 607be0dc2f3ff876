use anyhow::{Result, bail};
use autumnus::{FormatterOption, Options, highlight, themes};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{ArgValueCompleter, CompletionCandidate};
use iocraft::prelude::*;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::runtime::Handle;
use url::Url;

use crate::client::GalleryClient;
use crate::error::GalleryError;
use crate::types::{
    BrandUpdate, CategoryUpdate, ContentFilter, ContentKind, ContentUpdate, MediaTypeUpdate,
    NewBrand, NewCategory, NewMediaType, SeoSettings, Stats, ThemeSettings,
};
use crate::ui::{
    BrandList, CategoryList, ConfigHeader, ContentDetails, ContentList, ErrorMessage, InputPrompt,
    MediaTypeList, ProgressBar, StatsPanel, SuccessMessage,
};
use crate::upload::{
    RefreshSink, SelectedFile, UploadCoordinator, UploadMetadata, UploadStrategy,
};

mod client;
mod config;
mod error;
mod types;
mod ui;
mod upload;

const DEFAULT_GALLERY_BASE_URL: &str = "http://localhost:5000";

#[derive(Parser)]
#[command(name = "zam")]
#[command(version)]
#[command(about = "A tool for administering a ZamZam media gallery")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct UploadArgs {
    /// Files to upload as one batch
    #[arg(value_hint = ValueHint::FilePath, num_args = 1.., required = true)]
    files: Vec<PathBuf>,
    /// Title attached to every file in the batch
    #[arg(short, long, default_value = "")]
    title: String,
    #[arg(short, long, default_value = "")]
    description: String,
    /// Category the batch belongs to
    #[arg(short, long, add = ArgValueCompleter::new(category_completer))]
    category: String,
    /// Type within the category
    #[arg(long = "type", add = ArgValueCompleter::new(type_completer))]
    media_type: Option<String>,
    #[arg(short, long, add = ArgValueCompleter::new(brand_completer))]
    brand: Option<String>,
    /// Comma-separated tags shared by the batch
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,
    /// Identity recorded as the uploader; falls back to the configured default
    #[arg(short, long)]
    uploader: Option<String>,
    /// Send the whole batch as a single request instead of one per file
    #[arg(long)]
    batch: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure zam interactively
    Config,
    /// Upload files to the gallery
    Upload(UploadArgs),
    /// List gallery content
    List {
        #[arg(short, long, add = ArgValueCompleter::new(category_completer))]
        category: Option<String>,
        #[arg(long = "type", add = ArgValueCompleter::new(type_completer))]
        media_type: Option<String>,
        #[arg(short, long, add = ArgValueCompleter::new(brand_completer))]
        brand: Option<String>,
        /// Restrict to images or videos
        #[arg(short, long)]
        kind: Option<ContentKind>,
        /// Search in titles, descriptions and tags
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
        /// Print the raw records as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Inspect one content item (counts as a view)
    Show {
        id: String,
        #[arg(short, long)]
        json: bool,
    },
    /// Update a content item's metadata
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, add = ArgValueCompleter::new(category_completer))]
        category: Option<String>,
        #[arg(long = "type", add = ArgValueCompleter::new(type_completer))]
        media_type: Option<String>,
        #[arg(short, long, add = ArgValueCompleter::new(brand_completer))]
        brand: Option<String>,
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
        #[arg(long)]
        public: Option<bool>,
    },
    /// Delete a content item and its files
    Delete { id: String },
    /// Like a content item
    Like { id: String },
    /// Show gallery statistics
    Stats,
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Manage types
    Type {
        #[command(subcommand)]
        command: TypeCommands,
    },
    /// Manage brands
    Brand {
        #[command(subcommand)]
        command: BrandCommands,
    },
    /// Read or update site settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// List categories
    List,
    /// Inspect a category
    Show {
        #[arg(add = ArgValueCompleter::new(category_completer))]
        id: String,
    },
    /// Create a category
    Add {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        icon_url: Option<String>,
    },
    /// Update a category
    Edit {
        #[arg(add = ArgValueCompleter::new(category_completer))]
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        icon_url: Option<String>,
    },
    /// Delete a category
    Rm {
        #[arg(add = ArgValueCompleter::new(category_completer))]
        id: String,
    },
}

#[derive(Subcommand)]
enum TypeCommands {
    /// List types, optionally within one category
    List {
        #[arg(short, long, add = ArgValueCompleter::new(category_completer))]
        category: Option<String>,
    },
    /// Inspect a type
    Show {
        #[arg(add = ArgValueCompleter::new(type_completer))]
        id: String,
    },
    /// Create a type inside a category
    Add {
        name: String,
        #[arg(short, long, add = ArgValueCompleter::new(category_completer))]
        category: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Update a type
    Edit {
        #[arg(add = ArgValueCompleter::new(type_completer))]
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long, add = ArgValueCompleter::new(category_completer))]
        category: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a type
    Rm {
        #[arg(add = ArgValueCompleter::new(type_completer))]
        id: String,
    },
}

#[derive(Subcommand)]
enum BrandCommands {
    /// List brands
    List,
    /// Inspect a brand
    Show {
        #[arg(add = ArgValueCompleter::new(brand_completer))]
        id: String,
    },
    /// Create a brand
    Add {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        logo_url: Option<String>,
        #[arg(long)]
        website_url: Option<String>,
    },
    /// Update a brand
    Edit {
        #[arg(add = ArgValueCompleter::new(brand_completer))]
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        logo_url: Option<String>,
        #[arg(long)]
        website_url: Option<String>,
    },
    /// Delete a brand
    Rm {
        #[arg(add = ArgValueCompleter::new(brand_completer))]
        id: String,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show theme settings, or update the given fields
    Theme {
        #[arg(long)]
        mode: Option<String>,
        #[arg(long)]
        primary_color: Option<String>,
        #[arg(long)]
        font: Option<String>,
        #[arg(long)]
        background: Option<String>,
    },
    /// Show SEO settings, or update the given fields
    Seo {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        keywords: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        url: Option<String>,
    },
    /// Show social media links, or set the given platform=url pairs
    Social {
        #[arg(value_parser = parse_social_link)]
        links: Vec<(String, String)>,
    },
}

fn main() -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();
    let _rt_guard = rt.enter();
    clap_complete::CompleteEnv::with_factory(Cli::command).complete();
    let cli = Cli::parse();

    rt.block_on(async {
        match cli.command {
            Commands::Config => interactive_config(),
            needs_backend => {
                let config = config::read_config()?;
                let client =
                    GalleryClient::new(config.gallery_base_url.clone(), config.request_timeout)?;

                match needs_backend {
                    Commands::Upload(args) => {
                        let strategy = if args.batch {
                            UploadStrategy::Batch
                        } else {
                            config.upload_strategy
                        };
                        upload_content(&client, strategy, config.default_uploader, args).await
                    }
                    Commands::List {
                        category,
                        media_type,
                        brand,
                        kind,
                        search,
                        page,
                        per_page,
                        json,
                    } => {
                        let filter = ContentFilter {
                            category_id: category,
                            type_id: media_type,
                            brand_id: brand,
                            content_type: kind,
                            search,
                            page,
                            per_page,
                        };
                        list_content(&client, &filter, json).await
                    }
                    Commands::Show { id, json } => show_content(&client, &id, json).await,
                    Commands::Edit {
                        id,
                        title,
                        description,
                        category,
                        media_type,
                        brand,
                        tags,
                        public,
                    } => {
                        let update = ContentUpdate {
                            title,
                            description,
                            category_id: category,
                            type_id: media_type,
                            brand_id: brand,
                            tags,
                            is_public: public,
                        };
                        edit_content(&client, &id, &update).await
                    }
                    Commands::Delete { id } => {
                        let message = client.delete_content(&id).await?;
                        element!(SuccessMessage(message: message)).print();
                        Ok(())
                    }
                    Commands::Like { id } => {
                        let likes = client.like_content(&id).await?;
                        println!("{id} now has {likes} like(s)");
                        Ok(())
                    }
                    Commands::Stats => {
                        let stats = client.stats().await?;
                        element!(StatsPanel(stats: stats)).print();
                        Ok(())
                    }
                    Commands::Category { command } => category_cmd(&client, command).await,
                    Commands::Type { command } => type_cmd(&client, command).await,
                    Commands::Brand { command } => brand_cmd(&client, command).await,
                    Commands::Settings { command } => settings_cmd(&client, command).await,
                    Commands::Config => panic!("This state should be unreachable"),
                }
            }
        }
    })
}

/// Holds what the post-upload refresh fetched so it can be printed after the
/// progress bar has been torn down.
struct RefreshedViews<'a> {
    client: &'a GalleryClient,
    content_total: Option<u64>,
    stats: Option<Stats>,
}

impl RefreshSink for RefreshedViews<'_> {
    async fn refresh_content(&mut self) -> Result<(), GalleryError> {
        let page = self.client.list_content(&ContentFilter::default()).await?;
        self.content_total = Some(
            page.pagination
                .map(|p| p.total)
                .unwrap_or(page.items.len() as u64),
        );
        Ok(())
    }

    async fn refresh_stats(&mut self) -> Result<(), GalleryError> {
        self.stats = Some(self.client.stats().await?);
        Ok(())
    }
}

async fn upload_content(
    client: &GalleryClient,
    strategy: UploadStrategy,
    default_uploader: Option<String>,
    args: UploadArgs,
) -> Result<()> {
    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        files.push(SelectedFile::from_path(path)?);
    }
    let offered = files.len();

    let mut coordinator = UploadCoordinator::new(strategy);
    let accepted = coordinator.select_files(files)?;
    if accepted < offered {
        println!("{} file(s) skipped by validation", offered - accepted);
    }

    let metadata = UploadMetadata {
        title: args.title,
        description: args.description,
        category_id: args.category,
        type_id: args.media_type,
        brand_id: args.brand,
        tags: args.tags,
    };
    let uploaded_by = args.uploader.or(default_uploader).unwrap_or_default();

    let receiver = coordinator.subscribe_progress();
    let mut progress_bar =
        element!(ProgressBar(title: "Uploading files".to_string(), progress: Some(receiver)));

    let mut views = RefreshedViews {
        client,
        content_total: None,
        stats: None,
    };

    let outcome = tokio::select! {
        result = coordinator.submit_batch(client, &metadata, &uploaded_by, &mut views) => result?,
        _ = progress_bar.render_loop() => {
            unreachable!("render_loop should not terminate")
        }
    };

    for result in &outcome.results {
        element!(SuccessMessage(message: result.message.clone())).print();
    }
    if let Some(err) = outcome.refresh_error {
        element!(ErrorMessage(
            message: format!("Upload succeeded but refreshing views failed: {err}")
        ))
        .print();
    }
    if let Some(total) = views.content_total {
        println!("The gallery now holds {total} item(s)");
    }
    if let Some(stats) = views.stats {
        element!(StatsPanel(stats: stats)).print();
    }

    Ok(())
}

async fn list_content(client: &GalleryClient, filter: &ContentFilter, json: bool) -> Result<()> {
    let page = client.list_content(filter).await?;
    if json {
        print_json(&page.items)
    } else {
        element!(ContentList(items: page.items, pagination: page.pagination)).print();
        Ok(())
    }
}

async fn show_content(client: &GalleryClient, id: &str, json: bool) -> Result<()> {
    let content = client.get_content(id).await?;
    if json {
        print_json(&content)
    } else {
        element!(ContentDetails(content: Some(content))).print();
        Ok(())
    }
}

async fn edit_content(client: &GalleryClient, id: &str, update: &ContentUpdate) -> Result<()> {
    if serde_json::to_value(update)? == serde_json::json!({}) {
        bail!("Nothing to update; pass at least one field");
    }

    let content = client.update_content(id, update).await?;
    element!(SuccessMessage(message: format!("'{}' updated", content.title))).print();
    element!(ContentDetails(content: Some(content))).print();
    Ok(())
}

async fn category_cmd(client: &GalleryClient, command: CategoryCommands) -> Result<()> {
    match command {
        CategoryCommands::List => {
            let categories = client.list_categories().await?;
            element!(CategoryList(categories: categories)).print();
        }
        CategoryCommands::Show { id } => {
            let category = client.get_category(&id).await?;
            print_json(&category)?;
        }
        CategoryCommands::Add {
            name,
            description,
            icon_url,
        } => {
            let category = client
                .create_category(&NewCategory {
                    name,
                    description,
                    icon_url,
                })
                .await?;
            element!(SuccessMessage(
                message: format!("Category '{}' created with ID {}", category.name, category.id)
            ))
            .print();
        }
        CategoryCommands::Edit {
            id,
            name,
            description,
            icon_url,
        } => {
            let category = client
                .update_category(
                    &id,
                    &CategoryUpdate {
                        name,
                        description,
                        icon_url,
                    },
                )
                .await?;
            element!(SuccessMessage(message: format!("Category '{}' updated", category.name)))
                .print();
        }
        CategoryCommands::Rm { id } => {
            let message = client.delete_category(&id).await?;
            element!(SuccessMessage(message: message)).print();
        }
    }
    Ok(())
}

async fn type_cmd(client: &GalleryClient, command: TypeCommands) -> Result<()> {
    match command {
        TypeCommands::List { category } => {
            let types = client.list_types(category.as_deref()).await?;
            element!(MediaTypeList(types: types)).print();
        }
        TypeCommands::Show { id } => {
            let media_type = client.get_type(&id).await?;
            print_json(&media_type)?;
        }
        TypeCommands::Add {
            name,
            category,
            description,
        } => {
            let media_type = client
                .create_type(&NewMediaType {
                    name,
                    category_id: category,
                    description,
                })
                .await?;
            element!(SuccessMessage(
                message: format!("Type '{}' created with ID {}", media_type.name, media_type.id)
            ))
            .print();
        }
        TypeCommands::Edit {
            id,
            name,
            category,
            description,
        } => {
            let media_type = client
                .update_type(
                    &id,
                    &MediaTypeUpdate {
                        name,
                        category_id: category,
                        description,
                    },
                )
                .await?;
            element!(SuccessMessage(message: format!("Type '{}' updated", media_type.name)))
                .print();
        }
        TypeCommands::Rm { id } => {
            let message = client.delete_type(&id).await?;
            element!(SuccessMessage(message: message)).print();
        }
    }
    Ok(())
}

async fn brand_cmd(client: &GalleryClient, command: BrandCommands) -> Result<()> {
    match command {
        BrandCommands::List => {
            let brands = client.list_brands().await?;
            element!(BrandList(brands: brands)).print();
        }
        BrandCommands::Show { id } => {
            let brand = client.get_brand(&id).await?;
            print_json(&brand)?;
        }
        BrandCommands::Add {
            name,
            description,
            logo_url,
            website_url,
        } => {
            let brand = client
                .create_brand(&NewBrand {
                    name,
                    description,
                    logo_url,
                    website_url,
                })
                .await?;
            element!(SuccessMessage(
                message: format!("Brand '{}' created with ID {}", brand.name, brand.id)
            ))
            .print();
        }
        BrandCommands::Edit {
            id,
            name,
            description,
            logo_url,
            website_url,
        } => {
            let brand = client
                .update_brand(
                    &id,
                    &BrandUpdate {
                        name,
                        description,
                        logo_url,
                        website_url,
                    },
                )
                .await?;
            element!(SuccessMessage(message: format!("Brand '{}' updated", brand.name))).print();
        }
        BrandCommands::Rm { id } => {
            let message = client.delete_brand(&id).await?;
            element!(SuccessMessage(message: message)).print();
        }
    }
    Ok(())
}

async fn settings_cmd(client: &GalleryClient, command: SettingsCommands) -> Result<()> {
    match command {
        SettingsCommands::Theme {
            mode,
            primary_color,
            font,
            background,
        } => {
            let update = ThemeSettings {
                theme_mode: mode,
                primary_color,
                font_family: font,
                background_style: background,
            };
            let theme = if serde_json::to_value(&update)? == serde_json::json!({}) {
                client.theme_settings().await?
            } else {
                client.update_theme_settings(&update).await?
            };
            print_json(&theme)
        }
        SettingsCommands::Seo {
            title,
            description,
            keywords,
            author,
            url,
        } => {
            let update = SeoSettings {
                site_title: title,
                site_description: description,
                site_keywords: keywords,
                site_author: author,
                site_url: url,
            };
            let seo = if serde_json::to_value(&update)? == serde_json::json!({}) {
                client.seo_settings().await?
            } else {
                client.update_seo_settings(&update).await?
            };
            print_json(&seo)
        }
        SettingsCommands::Social { links } => {
            let social = if links.is_empty() {
                client.social_links().await?
            } else {
                let mut all = client.social_links().await?;
                all.extend(links);
                client.update_social_links(&all).await?
            };
            print_json(&social)
        }
    }
}

fn parse_social_link(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(platform, url)| (platform.to_string(), url.to_string()))
        .ok_or_else(|| format!("expected platform=url, got '{s}'"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = highlight(
        &serde_json::to_string_pretty(value)?,
        Options {
            formatter: FormatterOption::Terminal {
                theme: Some(themes::get("ayu_light").expect("Syntax highlighting theme not found")),
            },
            lang_or_file: Some("json"),
        },
    );
    println!("{}", output);
    Ok(())
}

fn category_completer(current: &std::ffi::OsStr) -> Vec<CompletionCandidate> {
    let mut completions = vec![];
    let Some(current) = current.to_str() else {
        return completions;
    };

    let config = config::read_config().expect("Failed to read config");
    let client = GalleryClient::new(config.gallery_base_url, config.request_timeout)
        .expect("Failed to build client");

    let handle = Handle::current();
    let categories = handle.block_on(client.list_categories()).unwrap();

    categories.into_iter().for_each(|category| {
        if category.id.starts_with(current) {
            completions.push(CompletionCandidate::new(category.id));
        }
    });

    completions
}

fn type_completer(current: &std::ffi::OsStr) -> Vec<CompletionCandidate> {
    let mut completions = vec![];
    let Some(current) = current.to_str() else {
        return completions;
    };

    let config = config::read_config().expect("Failed to read config");
    let client = GalleryClient::new(config.gallery_base_url, config.request_timeout)
        .expect("Failed to build client");

    let handle = Handle::current();
    let types = handle.block_on(client.list_types(None)).unwrap();

    types.into_iter().for_each(|media_type| {
        if media_type.id.starts_with(current) {
            completions.push(CompletionCandidate::new(media_type.id));
        }
    });

    completions
}

fn brand_completer(current: &std::ffi::OsStr) -> Vec<CompletionCandidate> {
    let mut completions = vec![];
    let Some(current) = current.to_str() else {
        return completions;
    };

    let config = config::read_config().expect("Failed to read config");
    let client = GalleryClient::new(config.gallery_base_url, config.request_timeout)
        .expect("Failed to build client");

    let handle = Handle::current();
    let brands = handle.block_on(client.list_brands()).unwrap();

    brands.into_iter().for_each(|brand| {
        if brand.id.starts_with(current) {
            completions.push(CompletionCandidate::new(brand.id));
        }
    });

    completions
}

fn read_input(prompt: &str, default: Option<&str>, description: Option<&str>) -> Result<String> {
    element! {
        InputPrompt(
            prompt: prompt.to_string(),
            default: default.map(|s| s.to_string()),
            description: description.map(|s| s.to_string())
        )
    }
    .print();

    print!("> ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_string();

    if input.is_empty() {
        if let Some(def) = default {
            Ok(def.to_string())
        } else {
            Ok(input)
        }
    } else {
        Ok(input)
    }
}

fn interactive_config() -> Result<()> {
    element!(ConfigHeader()).print();

    let gallery_base_url = loop {
        let base_url_str = read_input(
            "Gallery Base URL",
            Some(DEFAULT_GALLERY_BASE_URL),
            Some("The base URL of the gallery backend"),
        )?;

        match Url::parse(&base_url_str) {
            Ok(url) => break url,
            Err(e) => {
                element!(ErrorMessage(message: format!("Invalid URL: {}", e))).print();
                println!();
            }
        }
    };

    let default_uploader_str = read_input(
        "Default Uploader",
        None,
        Some("Optional: identity recorded as the uploader when --uploader is not passed"),
    )?;
    let default_uploader = if default_uploader_str.is_empty() {
        None
    } else {
        Some(default_uploader_str)
    };

    let upload_strategy = loop {
        let strategy_str = read_input(
            "Upload Strategy",
            Some("sequential"),
            Some("sequential uploads one request per file; batch sends one request"),
        )?;

        match strategy_str.parse::<UploadStrategy>() {
            Ok(_) => break strategy_str,
            Err(e) => {
                element!(ErrorMessage(message: e)).print();
                println!();
            }
        }
    };

    let request_timeout = loop {
        let timeout_str = read_input(
            "Request Timeout",
            None,
            Some("Optional: per-request timeout such as 30s; leave empty for none"),
        )?;

        if timeout_str.is_empty() {
            break None;
        }
        match humantime::parse_duration(&timeout_str) {
            Ok(_) => break Some(timeout_str),
            Err(e) => {
                element!(ErrorMessage(message: format!("Invalid duration: {}", e))).print();
                println!();
            }
        }
    };

    let config_file = config::ConfigFile {
        gallery_base_url: Some(gallery_base_url),
        default_uploader,
        upload_strategy: Some(upload_strategy),
        request_timeout,
    };

    config::write_config(config_file)?;

    element!(SuccessMessage(message: "Configuration complete!".to_string())).print();

    Ok(())
}
