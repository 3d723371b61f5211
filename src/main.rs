use anyhow::Result;
use recscraper::{browse::Session, export, harvest};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

/// Category label → registry start URL. One output sheet per entry.
static CATEGORIES: &[(&str, &str)] = &[("REC Generator", "https://sa.ercot.com/rec/account-type")];

const WEBDRIVER_URL: &str = "http://localhost:4444";
const OUTPUT_PATH: &str = "ercot_data_output.xlsx";

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) open the one browser session for the whole run ───────────
    let mut session = Session::connect(WEBDRIVER_URL).await?;

    // ─── 3) harvest each category sequentially ───────────────────────
    let mut harvested = Vec::with_capacity(CATEGORIES.len());
    for &(label, url) in CATEGORIES {
        info!(category = label, url, "harvesting");

        let url = match Url::parse(url) {
            Ok(u) => u,
            Err(err) => {
                error!(category = label, %err, "bad category URL, skipping");
                continue;
            }
        };

        match harvest::harvest_category(&mut session, &url).await {
            Ok(result) => {
                info!(category = label, rows = result.rows.len(), "category done");
                harvested.push((label.to_string(), result));
            }
            Err(err) => error!(category = label, %err, "category failed"),
        }
    }

    // ─── 4) release the browser before touching the filesystem ───────
    if let Err(err) = session.close().await {
        warn!(%err, "browser session did not close cleanly");
    }

    // ─── 5) write the workbook ───────────────────────────────────────
    let sheets = export::write_workbook(OUTPUT_PATH, &harvested)?;
    info!(sheets = sheets.len(), path = OUTPUT_PATH, "workbook written");

    Ok(())
}
