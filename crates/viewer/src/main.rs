use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use stockdesk_core::aggregate::ViewMode;
use stockdesk_core::client::HttpStockService;
use stockdesk_core::loader::messages::Locale;
use stockdesk_core::loader::{self, FinancialLoader, TechnicalLoader};
use stockdesk_core::time::window::{FundamentalPeriod, TechnicalPeriod};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "stockdesk_viewer", about = "Render stock detail tabs as JSON")]
struct Args {
    /// Date to treat as today (YYYY-MM-DD). Defaults to the market-local date.
    #[arg(long, global = true)]
    today: Option<String>,

    /// Message language (en or vi). Defaults to STOCKDESK_LOCALE.
    #[arg(long, global = true)]
    locale: Option<Locale>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Stock identity.
    Overview { symbol: String },

    /// EPS, P/E, ROA/ROE and financial-ratio charts.
    Financial {
        symbol: String,
        #[arg(long, default_value = "3y")]
        period: FundamentalPeriod,
        #[arg(long, default_value = "quarter")]
        view: ViewMode,
        /// Records requested per family.
        #[arg(long)]
        page_size: Option<i64>,
    },

    /// Q-index rows for a trailing window.
    Technical {
        symbol: String,
        #[arg(long, default_value = "6m")]
        period: TechnicalPeriod,
    },

    /// Posts linked to the stock.
    News {
        symbol: String,
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long, default_value_t = 20)]
        page_size: i64,
    },

    /// A single settings entry.
    Setting { key: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stockdesk_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    match render(args, &settings).await {
        Ok(out) => {
            println!("{out}");
            Ok(())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            Err(err)
        }
    }
}

async fn render(args: Args, settings: &stockdesk_core::config::Settings) -> anyhow::Result<String> {
    let locale = args.locale.unwrap_or(settings.locale);
    let today = stockdesk_core::time::market::resolve_today(
        args.today.as_deref(),
        chrono::Utc::now(),
        settings.market_utc_offset_hours,
    )?;
    let service = Arc::new(HttpStockService::from_settings(settings)?);

    tracing::debug!(%today, ?locale, command = ?args.command, "rendering");

    Ok(match args.command {
        Command::Overview { symbol } => {
            to_json(&loader::load_overview(service.as_ref(), &symbol, locale).await)?
        }
        Command::Financial {
            symbol,
            period,
            view,
            page_size,
        } => {
            let mut financial = FinancialLoader::new(Arc::clone(&service), locale);
            if let Some(size) = page_size {
                financial = financial.with_page_size(size);
            }
            to_json(&financial.load(&symbol, period, view, today).await)?
        }
        Command::Technical { symbol, period } => {
            let technical = TechnicalLoader::new(Arc::clone(&service), locale);
            to_json(&technical.load(&symbol, period, today).await)?
        }
        Command::News {
            symbol,
            page,
            page_size,
        } => to_json(&loader::load_news(service.as_ref(), &symbol, page, page_size, locale).await)?,
        Command::Setting { key } => {
            to_json(&loader::load_setting(service.as_ref(), &key, locale).await)?
        }
    })
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn init_sentry(settings: &stockdesk_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
