//! Query OMDb and print what the client maps out of the response.
//! Usage:
//!   cargo run --bin omdb_props -- search <term> [page]
//!   cargo run --bin omdb_props -- detail <imdbID>
//! Requires OMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use cinefind::config::Config;
use cinefind::models::SearchOutcome;
use cinefind::omdb::{OmdbApi, OmdbClient};
use dotenvy::dotenv;
use serde_json::json;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Lookup {
    Search,
    Detail,
}

impl FromStr for Lookup {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "search" => Ok(Lookup::Search),
            "detail" => Ok(Lookup::Detail),
            _ => Err(anyhow::anyhow!("lookup must be 'search' or 'detail'")),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv().ok();

    let mut args = env::args().skip(1);
    let lookup: Lookup = args
        .next()
        .context("usage: omdb_props <search|detail> <term|imdbID> [page]")?
        .parse()?;
    let arg = args.next().context("missing search term or IMDb id")?;

    let config = Config::from_env()?;
    let client = OmdbClient::from_config(&config)?;

    match lookup {
        Lookup::Search => {
            let page = match args.next() {
                Some(p) => p.parse::<u32>().context("page must be a number")?,
                None => 1,
            };
            match client.search(&arg, page).await? {
                SearchOutcome::Found(movies) => {
                    println!("{} results on page {}", movies.len(), page);
                    for movie in movies {
                        println!("{}", serde_json::to_string_pretty(&movie)?);
                    }
                }
                SearchOutcome::NotFound(reason) => {
                    println!("not found: {}", reason.unwrap_or_default());
                }
            }
        }
        Lookup::Detail => {
            let detail = client.fetch_details(&arg).await?;
            let ratings: Vec<_> = detail
                .ratings
                .iter()
                .map(|r| json!({ "source": r.source, "value": r.value }))
                .collect();
            let mapped = json!({
                "found": detail.found,
                "id": detail.id,
                "title": detail.title,
                "year": detail.year,
                "rated": detail.rated,
                "runtime": detail.runtime,
                "poster": detail.poster_url(),
                "plot": detail.plot,
                "actors": detail.actors(),
                "rating": detail.rating,
                "ratings": ratings,
            });
            println!("{}", serde_json::to_string_pretty(&mapped)?);
        }
    }

    Ok(())
}
