use std::env;
use std::process;
use std::time::Duration;

use log::{error, info};

use circle_scraper::{
    fetcher, logger, sync, CancelToken, CircleStore, Crawler, HtmlSession, ReqwestFetch, Result,
    Source,
};

const BASE_URL: &str = "https://techbookfest.org";
const CIRCLES_URL: &str = "https://techbookfest.org/event/tbf04/circle";
const CRAWL_CSV: &str = "circles.csv";
const DETAIL_FETCH_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_SOURCE: &str = "latest";

fn main() {
    logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("crawl") => cmd_crawl(),
        Some("list") => cmd_list(args.get(1).map(String::as_str).unwrap_or(DEFAULT_SOURCE)),
        Some("describe") if args.len() >= 3 => cmd_describe(&args[1], &args[2..]),
        _ => {
            eprintln!("usage: circle-scraper crawl");
            eprintln!("       circle-scraper list [source]");
            eprintln!("       circle-scraper describe <source> <space>...");
            eprintln!("source is an alias ({DEFAULT_SOURCE}, tbf4), a URL, or a local CSV file");
            process::exit(2);
        }
    };

    if let Err(e) = result {
        error!("{e}");
        process::exit(1);
    }
}

/// Scrapes the live catalog, appending circles that are not yet cached.
fn cmd_crawl() -> Result<()> {
    let mut store = CircleStore::open(CRAWL_CSV)?;
    let cached = store.load_all()?;
    info!("{} circles already cached in {}", cached.len(), CRAWL_CSV);

    let mut crawler = Crawler::new(HtmlSession::new(), BASE_URL)?;
    let circles = crawler.fetch_circles(CIRCLES_URL)?;
    info!("{} circles listed on {}", circles.len(), CIRCLES_URL);

    let appended = fetcher::crawl_new(
        &mut crawler,
        &mut store,
        circles,
        &cached,
        DETAIL_FETCH_INTERVAL,
        &CancelToken::new(),
    )?;
    info!("Crawl finished, {appended} new circles appended");
    Ok(())
}

/// Syncs the dataset for `source` and prints one line per circle.
fn cmd_list(source: &str) -> Result<()> {
    let source = Source::new(source);
    sync::ensure_source(&ReqwestFetch::new(), &source)?;

    let store = CircleStore::open(&source.file_name)?;
    for (space, detail) in store.load_all()? {
        println!(
            "{} {} by {} 【{}】 : {}",
            space,
            detail.circle.name,
            detail.circle.penname,
            detail.circle.genre,
            detail.genre_free_format,
        );
    }
    Ok(())
}

/// Syncs the dataset for `source` and prints the requested circles as JSON.
fn cmd_describe(source: &str, spaces: &[String]) -> Result<()> {
    let source = Source::new(source);
    sync::ensure_source(&ReqwestFetch::new(), &source)?;

    let store = CircleStore::open(&source.file_name)?;
    let map = store.load_all()?;
    for space in spaces {
        match map.get(space) {
            Some(detail) => match serde_json::to_string(detail) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("failed to encode circle on {space}: {e}"),
            },
            None => eprintln!("circle on {space} not found"),
        }
    }
    Ok(())
}
