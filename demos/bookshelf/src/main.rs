//! # Bookshelf
//!
//! A small catalogue site built from the generic views:
//!
//! - `/` redirects temporarily to the book list
//! - `/about/` is a `TemplateView`
//! - `/books/` is a paginated, sortable `ListView` over SQLite
//! - `/genres/<genre>/` lists one genre through a filtered query object
//! - `/library/` redirects permanently, `/catalogue/` is gone
//!
//! ## Running
//!
//! ```bash
//! cargo run --package bookshelf -- --config demos/bookshelf/bookshelf.toml
//! ```

mod catalog;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use serde_json::json;

use cbv_rs::core::logging::setup_logging;
use cbv_rs::core::settings_loader;
use cbv_rs::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "bookshelf", about = "Serve the bookshelf demo")]
struct Args {
    /// Settings file (TOML, or JSON with a `.json` extension).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on; overrides `bind_address`.
    #[arg(short, long)]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => settings_loader::from_file_with_env(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => settings_loader::from_env(),
    };
    if settings.template_dirs.is_empty() {
        settings
            .template_dirs
            .push(PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/templates")));
    }
    if let Some(addr) = args.addr {
        settings.bind_address = addr;
    }

    setup_logging(&settings);
    SETTINGS.configure(settings.clone());

    let engine = Arc::new(Engine::from_settings(&settings)?);
    let books = catalog::open().await?;
    let resolver = URLResolver::new(routes(&engine, &books)?);

    let addr = settings.bind_address.clone();
    App::new(settings).urls(resolver).run(&addr).await?;
    Ok(())
}

fn routes(
    engine: &Arc<Engine>,
    books: &SqliteModel,
) -> anyhow::Result<Vec<cbv_rs::http::urls::pattern::URLPattern>> {
    let list = ViewConfig::new()
        .template_name("books/list.html")
        .engine(Arc::clone(engine))
        .sortable_fields(&["title", "year", "rating"]);

    let mut patterns = vec![
        path("", RedirectView::temporary("/books/").as_view(), Some("home"))?,
        path(
            "about/",
            TemplateView::new("about.html")
                .with_engine(Arc::clone(engine))
                .with_context("blurb", json!("Every page here is a generic view."))
                .as_view(),
            Some("about"),
        )?,
        path(
            "books/",
            ListView::new(list.clone())
                .model(Arc::new(books.clone()))
                .paginate_by(5)
                .sort_by("title")
                .with_context("heading", json!("All books"))
                .as_view(),
            Some("book-list"),
        )?,
        path("library/", RedirectView::new("/books/").as_view(), None)?,
        path("catalogue/", RedirectView::gone().as_view(), None)?,
    ];

    for genre in catalog::GENRES {
        let query = books.objects().filter_eq("genre", json!(genre))?;
        let view = ListView::new(list.clone())
            .query_object(Arc::new(query))
            .sort_by("-year")
            .with_context("heading", json!("Books"))
            .with_context("params", json!({ "genre": genre }));
        patterns.push(path(&format!("genres/{genre}/"), view.as_view(), None)?);
    }

    Ok(patterns)
}
