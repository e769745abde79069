use std::collections::BTreeSet;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    find_category, load_categories, load_settings, resolve_api_config, HttpCollectionApi,
    HttpListController, ItemFilter, MutationOutcome, ResourceListController,
};
use serde::Serialize;
use shared::domain::{Order, Product, Resource, ResourceId};
use tracing::info;

mod prompt;
mod render;

use prompt::ConsolePrompt;
use render::{render_categories, render_page, Row};

#[derive(Parser, Debug)]
#[command(name = "admin", about = "Manage store orders and products")]
struct Cli {
    /// Primary backend; overrides admin.toml and ADMIN_SERVER_URL.
    #[arg(long)]
    server_url: Option<String>,
    /// Used when the primary backend does not answer.
    #[arg(long)]
    fallback_url: Option<String>,
    #[arg(long, value_enum, default_value_t = ResourceKind::Orders)]
    resource: ResourceKind,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResourceKind {
    Orders,
    Products,
}

#[derive(Subcommand, Debug)]
enum Command {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Category name or slug; checked against the server's category list.
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        json: bool,
    },
    SetStatus {
        id: String,
        status: String,
        /// Page the item is on.
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Delete {
        id: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        yes: bool,
    },
    DeleteMany {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        yes: bool,
    },
    /// Lists product categories; ignores `--resource`.
    Categories,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(url) = cli.server_url {
        settings.server_url = url;
    }
    if let Some(url) = cli.fallback_url {
        settings.fallback_url = Some(url);
    }
    let config = resolve_api_config(&settings).await?;
    let api = HttpCollectionApi::new(&config).context("failed to build HTTP client")?;
    info!(base_url = %api.base_url(), resource = ?cli.resource, "admin client ready");

    match cli.resource {
        ResourceKind::Orders => run::<Order>(ResourceListController::new(api), cli.command).await,
        ResourceKind::Products => {
            run::<Product>(ResourceListController::new(api), cli.command).await
        }
    }
}

async fn run<T>(mut controller: HttpListController<T>, command: Command) -> Result<()>
where
    T: Resource + Row + Serialize,
{
    match command {
        Command::List {
            page,
            search,
            status,
            category,
            json,
        } => {
            let category = match category {
                Some(_) if T::COLLECTION != Product::COLLECTION => {
                    bail!("--category only applies to products")
                }
                Some(name) => {
                    let categories = load_categories(controller.api()).await?;
                    Some(find_category(&categories, &name)?.name.clone())
                }
                None => None,
            };
            let filter = ItemFilter {
                search,
                status: status.map(|s| s.parse::<T::Status>()).transpose()?,
                category,
            };
            controller.fetch_page(page).await?;
            let items: Vec<&T> = controller.visible_items(&filter).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                print!("{}", render_page(&items, controller.pagination()));
            }
        }
        Command::SetStatus { id, status, page } => {
            let status = status.parse::<T::Status>()?;
            let id = ResourceId::new(id);
            controller.fetch_page(page).await?;
            let outcome = controller.update_status(&id, status).await?;
            report(outcome, &format!("{} {id} is now {status}", T::LABEL))?;
        }
        Command::Delete { id, page, yes } => {
            let id = ResourceId::new(id);
            controller.fetch_page(page).await?;
            let outcome = controller
                .delete_item(&id, &ConsolePrompt { assume_yes: yes })
                .await?;
            report(outcome, &format!("deleted {} {id}", T::LABEL))?;
            print_page(&controller);
        }
        Command::DeleteMany { ids, page, yes } => {
            controller.fetch_page(page).await?;
            let ids: BTreeSet<ResourceId> = ids.into_iter().map(ResourceId::new).collect();
            for id in &ids {
                controller.toggle_select(id)?;
            }
            let outcome = controller
                .delete_selected(&ConsolePrompt { assume_yes: yes })
                .await?;
            if outcome.cancelled {
                println!("deletion cancelled");
                return Ok(());
            }
            for id in &outcome.deleted {
                println!("deleted {} {id}", T::LABEL);
            }
            print_page(&controller);
            if !outcome.failed.is_empty() {
                for err in &outcome.failed {
                    eprintln!("{err}");
                }
                bail!("{} of the selected {}s could not be deleted", outcome.failed.len(), T::LABEL);
            }
        }
        Command::Categories => {
            let categories = load_categories(controller.api()).await?;
            print!("{}", render_categories(&categories));
        }
    }
    Ok(())
}

fn report(outcome: MutationOutcome, confirmed: &str) -> Result<()> {
    match outcome {
        MutationOutcome::Confirmed => {
            println!("{confirmed}");
            Ok(())
        }
        MutationOutcome::Cancelled => {
            println!("cancelled");
            Ok(())
        }
        MutationOutcome::RolledBack(err) => Err(err.into()),
    }
}

fn print_page<T: Row>(controller: &HttpListController<T>) {
    if let Some(banner) = controller.banner() {
        eprintln!("{}", banner.message);
    }
    let items: Vec<&T> = controller.items().iter().collect();
    print!("{}", render_page(&items, controller.pagination()));
}
