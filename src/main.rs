use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use crate::{
    cite::{Citer, Outcome},
    cli::Cli,
    driver::ChromeDriver,
    store::ResultStore,
};

mod cite;
mod cli;
mod driver;
mod input;
mod store;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Input problems are fatal and must surface before any browser work.
    let grouping = input::load_psv(&args.input)?;

    let driver = ChromeDriver::launch(args.browser.clone())?;
    let api_key = args
        .api_key
        .clone()
        .or_else(|| std::env::var("YOUTUBE_API_KEY").ok());
    let citer = Citer::new(&driver, api_key);

    let total: u64 = grouping
        .values()
        .flat_map(|dates| dates.values())
        .map(|urls| urls.len() as u64)
        .sum();
    let bar = ProgressBar::new(total);
    bar.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len}")?);

    let mut store = ResultStore::default();
    for (resource_type, dates) in &grouping {
        for (access_date, urls) in dates {
            for url in urls {
                match citer.cite(&mut store, access_date, resource_type, url) {
                    Outcome::Cited => println!("{} {url}", "✓".green()),
                    Outcome::NotFound => println!("{} {url}: URL not found", "✗".red()),
                    Outcome::Failed => println!(
                        "{} {url}: {}",
                        "✗".red(),
                        store.failure_reason(url).unwrap_or("unknown failure")
                    ),
                    Outcome::Skipped | Outcome::Ignored => {}
                }
                bar.inc(1);
            }
        }
    }
    bar.finish_and_clear();

    store.write(&args.success, &args.failure)?;
    eprintln!(
        "{} {} {} {}",
        "✓".green(),
        store.success_count(),
        "✗".red(),
        store.failure_count()
    );
    Ok(())
}
