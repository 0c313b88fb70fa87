//! Bookshelf command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration from the environment and open the durable catalog.
//! - Print the catalog sorted by the optional key argument (title by default),
//!   one book per line.

use bookshelf_core::db::open_db;
use bookshelf_core::{
    core_version, init_logging_from_config, CatalogQuery, CatalogService, CoreConfig,
    RandomIdGenerator, SlotCatalogGateway, SortKey, SqliteSlotRepository,
};
use log::info;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("bookshelf: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = CoreConfig::from_env()?;
    init_logging_from_config(&config)?;
    info!(
        "event=cli_start module=cli status=ok version={}",
        core_version()
    );

    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let slots = SqliteSlotRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let store = CatalogService::load(SlotCatalogGateway::new(slots), RandomIdGenerator);

    let sort = match std::env::args().nth(1) {
        Some(name) => name.parse::<SortKey>().map_err(|err| err.to_string())?,
        None => SortKey::default(),
    };
    let books = store.query(&CatalogQuery::new("", sort));
    println!(
        "{} book(s) in {} sorted by {}",
        books.len(),
        config.db_path.display(),
        sort.as_str()
    );
    for book in &books {
        let author = book.known_author().unwrap_or("unknown author");
        match book.year() {
            Some(year) => println!("{}  {} by {} ({})", book.id(), book.title(), author, year),
            None => println!("{}  {} by {}", book.id(), book.title(), author),
        }
    }
    Ok(())
}
