use clap::Parser;
use sitescout::config::ScoutConfig;
use sitescout::{FetchMode, Harvest, Scout, ScrapeError};

mod args;
use args::{Args, Command, convert_mode};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let mut config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };
    config.apply_env();
    if let Some(max_pages) = args.max_pages {
        config.max_pages = max_pages;
    }

    let mode = convert_mode(args.mode);
    if matches!(mode, FetchMode::Selenium | FetchMode::Smart) {
        println!("Note: rendered fetches require a WebDriver server (e.g., ChromeDriver).");
        println!(
            "Set WEBDRIVER_URL environment variable if not using the default {}",
            config.webdriver_url
        );
    }

    let scout = match Scout::new(config) {
        Ok(scout) => scout,
        Err(e) => {
            ::log::error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    // Ctrl-C stops an in-flight pagination loop between page fetches
    let cancel = scout.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ::log::info!("cancellation requested");
            cancel.cancel();
        }
    });

    let result = match &args.command {
        Command::Prompt { text } => run_prompt(&scout, text, mode).await,
        Command::Url { url } => scout.run_url(url, mode).await,
        Command::Site { key, author, tag } => {
            scout
                .run_site(key, author.clone(), tag.clone(), mode)
                .await
        }
    };

    match result {
        Ok(harvest) => present(&harvest, args.json),
        Err(e) => {
            report_failure(&scout, &e);
            std::process::exit(1);
        }
    }
}

async fn run_prompt(scout: &Scout, text: &str, mode: FetchMode) -> Result<Harvest, ScrapeError> {
    let (filter, harvest) = scout.run_prompt(text, mode).await?;
    if filter.is_empty() {
        println!("No filters detected in the request.");
    } else {
        println!(
            "Detected filters: site={} author={} tag={}",
            filter.site.as_deref().unwrap_or("-"),
            filter.author.as_deref().unwrap_or("-"),
            filter.tag.as_deref().unwrap_or("-"),
        );
    }
    Ok(harvest)
}

fn present(harvest: &Harvest, as_json: bool) {
    if harvest.records.is_empty() {
        println!("No results found.");
    } else if as_json {
        match serde_json::to_string_pretty(&harvest.records) {
            Ok(json) => println!("{}", json),
            Err(e) => ::log::error!("Failed to serialize records: {}", e),
        }
    } else {
        print_table(harvest);
    }

    if !harvest.complete {
        println!(
            "\nWarning: partial results - the scrape stopped after {} page(s).",
            harvest.pages
        );
    }
}

/// Print records as an aligned table; columns come from the first record's
/// keys, since the field set depends on which scraper ran.
fn print_table(harvest: &Harvest) {
    let columns: Vec<&str> = harvest.records[0].keys().collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for record in &harvest.records {
        for (i, column) in columns.iter().enumerate() {
            let len = record.get(column).map(|v| v.chars().count()).unwrap_or(0);
            widths[i] = widths[i].max(len.min(60));
        }
    }

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<width$}", c, width = *w))
        .collect();
    println!("{}", header.join(" | "));
    println!("{}", "-".repeat(header.join(" | ").chars().count()));

    for record in &harvest.records {
        let row: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| {
                format!("{:<width$}", truncate(record.get(c).unwrap_or(""), 60), width = *w)
            })
            .collect();
        println!("{}", row.join(" | "));
    }

    println!(
        "\n{} record(s) from {} page(s)",
        harvest.records.len(),
        harvest.pages
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn load_config(path: Option<&str>) -> Result<ScoutConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => ScoutConfig::from_file(path),
        None => Ok(ScoutConfig::default()),
    }
}

fn report_failure(scout: &Scout, error: &ScrapeError) {
    ::log::error!("{}", error);
    match error {
        ScrapeError::NoDomainFound => {
            println!("Include a full http(s) URL in the request, e.g. https://example.com/news");
        }
        ScrapeError::UnregisteredDomain(domain) => {
            println!(
                "No scraper is registered for \"{}\". Known sites: {}",
                domain,
                scout.known_sites().join(", ")
            );
        }
        ScrapeError::UnresolvedTarget => {
            println!(
                "The request named neither a known site nor a URL. Known sites: {}",
                scout.known_sites().join(", ")
            );
        }
        _ => {}
    }
}
