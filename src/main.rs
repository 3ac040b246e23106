use std::{process, sync::Arc};

use catalog_pager::{
    application::{
        browser::CatalogBrowser,
        controller::{FetchOutcome, PaginationConfig, VisibleState},
        error::AppError,
        repos::CatalogRepo,
    },
    cache::{CacheConfig, PageCache},
    config::{self, Command, QueryArgs},
    infra::{error::InfraError, memory::InMemoryCatalog, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    let emit = || {
        error!(
            source = report.source,
            chain = ?report.messages,
            "application error"
        );
    };

    if dispatcher::has_been_set() {
        emit();
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, emit);
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli().map_err(|err| {
        InfraError::configuration(format!("failed to load configuration: {err}"))
    })?;

    let command = cli_args
        .command
        .unwrap_or(Command::Query(Box::<QueryArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        Command::Query(args) => run_query(settings, *args).await,
    }
}

async fn run_query(settings: config::Settings, args: QueryArgs) -> Result<(), AppError> {
    let filter = args.filter.to_filter()?;
    let fixture = settings.catalog.fixture.as_ref().ok_or_else(|| {
        InfraError::configuration("no catalog fixture configured; pass --fixture or set catalog.fixture")
    })?;

    let catalog: Arc<dyn CatalogRepo> = Arc::new(
        InMemoryCatalog::from_json_file(settings.catalog.collection.clone(), fixture).await?,
    );
    let cache = Arc::new(PageCache::new(CacheConfig::from(&settings.cache)));
    let browser = CatalogBrowser::new(
        catalog,
        cache,
        PaginationConfig::from(&settings),
        settings.pagination.debounce,
    );

    info!(
        filter = %filter.to_query_string(),
        pages = args.pages,
        "running catalog query"
    );
    browser.set_filter(filter).await?;
    print_snapshot(&browser.visible_state())?;

    for _ in 1..args.pages {
        if browser.load_more().await == FetchOutcome::Skipped {
            info!("no further pages");
            break;
        }
        print_snapshot(&browser.visible_state())?;
    }

    match browser.visible_state().error {
        Some(report) => Err(AppError::Catalog(report.error)),
        None => Ok(()),
    }
}

fn print_snapshot(state: &VisibleState) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(state)
        .map_err(|err| AppError::unexpected(format!("failed to render snapshot: {err}")))?;
    println!("{rendered}");
    Ok(())
}
