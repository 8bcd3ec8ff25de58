use clap::{Parser, Subcommand, ValueEnum};
use sitescout::FetchMode;

#[derive(Parser, Debug)]
#[command(name = "sitescout")]
#[command(about = "Prompt-driven scraper with site dispatch and pagination")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a JSON config file
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Hard ceiling on pages followed per scrape
    #[arg(long, global = true)]
    pub max_pages: Option<usize>,

    /// Emit records as JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,

    /// Fetch mode
    #[arg(short, long, value_enum, global = true, default_value_t = ModeArg::Smart)]
    pub mode: ModeArg,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interpret a free-text request and scrape the matching site
    Prompt {
        /// What to scrape, e.g. "Get quotes by Steve Jobs about life"
        text: String,
    },
    /// Scrape one URL, routing to a site handler when the domain is known
    Url {
        /// Page to scrape
        url: String,
    },
    /// Run a registered site scraper directly
    Site {
        /// Registry key (quotes, books, blogs, or a registered domain)
        key: String,

        /// Keep only records whose author contains this value
        #[arg(short, long)]
        author: Option<String>,

        /// Keep only records tagged with this value
        #[arg(short, long)]
        tag: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Static HTTP fetch only
    Html,
    /// Rendered fetch through a WebDriver browser
    Selenium,
    /// Static first, rendered retry on empty results
    Smart,
}

/// Convert from CLI argument mode to internal fetch mode
pub fn convert_mode(arg: ModeArg) -> FetchMode {
    match arg {
        ModeArg::Html => FetchMode::Html,
        ModeArg::Selenium => FetchMode::Selenium,
        ModeArg::Smart => FetchMode::Smart,
    }
}
