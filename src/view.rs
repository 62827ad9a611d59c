//! Plain-text rendering for the terminal front end.

use std::collections::HashSet;
use std::fmt::Write;

use crate::detail::{DetailState, PREVIEW_CLIP_URL};
use crate::models::Movie;
use crate::search::SearchSession;
use crate::theme::Theme;

pub fn render_header(theme: Theme, connected: bool) -> String {
    let mut out = format!("== cinefind == theme: {theme}");
    if !connected {
        out.push_str("  [Offline Mode]");
    }
    out.push('\n');
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn render_movie_row(index: usize, movie: &Movie, favorite: bool) -> String {
    let mut row = format!("{:>3}. {}", index, movie.title);
    if !movie.year.is_empty() {
        let _ = write!(row, " ({})", movie.year);
    }
    if let Some(kind) = movie.kind.as_deref().filter(|k| !k.is_empty()) {
        let _ = write!(row, " - {}", capitalize(kind));
    }
    if favorite {
        row.push_str(" *");
    }
    row
}

pub fn render_results(session: &SearchSession, favorites: &HashSet<String>) -> String {
    let mut out = String::new();
    if session.query.is_empty() {
        out.push_str("Type 'search <title>' to look for movies.\n");
        return out;
    }
    if session.results.is_empty() {
        let _ = writeln!(out, "No results for '{}'.", session.query);
        return out;
    }
    let _ = writeln!(
        out,
        "Results for '{}' ({} shown):",
        session.query,
        session.results.len()
    );
    for (i, movie) in session.results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}",
            render_movie_row(i + 1, movie, favorites.contains(&movie.id))
        );
    }
    if session.has_more {
        out.push_str("-- 'more' loads the next page --\n");
    } else {
        out.push_str("-- end of results --\n");
    }
    out
}

pub fn render_favorites(favorites: &[Movie]) -> String {
    if favorites.is_empty() {
        return "No favorites yet.\n".to_string();
    }
    let mut out = String::from("My Favorites:\n");
    for (i, movie) in favorites.iter().enumerate() {
        let _ = writeln!(out, "{}", render_movie_row(i + 1, movie, true));
    }
    out
}

pub fn render_recent(terms: &[String]) -> String {
    if terms.is_empty() {
        return String::new();
    }
    let items = terms
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}) {}", i + 1, t))
        .collect::<Vec<_>>()
        .join("  ");
    format!("Recent Searches: {items}\n")
}

pub fn render_detail(state: &DetailState, favorite: bool) -> String {
    let detail = match state {
        DetailState::Idle => return String::new(),
        DetailState::Loading => return "Loading...\n".to_string(),
        DetailState::NotFound => return "Movie not found.\n".to_string(),
        DetailState::Failed => return "Could not load movie details.\n".to_string(),
        DetailState::Found(detail) => detail,
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", detail.title);
    let _ = writeln!(out, "{} | {} | {}", detail.year, detail.rated, detail.runtime);
    if let Some(poster) = detail.poster_url() {
        let _ = writeln!(out, "Poster: {poster}");
    }
    let _ = writeln!(
        out,
        "[{}]",
        if favorite { "Remove Favorite" } else { "Add Favorite" }
    );
    out.push_str("\nPlot Summary\n");
    let _ = writeln!(out, "{}", detail.plot);
    out.push_str("\nCast Overview\n");
    for actor in detail.actors() {
        let _ = writeln!(out, "  - {actor}");
    }
    out.push_str("\nUser Reviews (IMDB)\n");
    let _ = writeln!(out, "{} / 10", detail.rating);
    for rating in &detail.ratings {
        let _ = writeln!(out, "  {}: {}", rating.source, rating.value);
    }
    let _ = writeln!(out, "\nPreview: {PREVIEW_CLIP_URL}");
    out
}
