use colored::Colorize;
use tabled::Table;

use crate::{
    spotify::playlist::{DEFAULT_PLAYLIST_ID, resolve_playlist},
    types::ThemeTableRow,
    weather::theme::classify,
};

use super::context;

/// Prints every mapped weather code with its theme and playlist.
pub async fn themes() {
    let table = context::playlist_table().await;

    let rows: Vec<ThemeTableRow> = table
        .codes()
        .into_iter()
        .map(|code| {
            let theme = classify(code);
            ThemeTableRow {
                code,
                theme: theme.as_str().color(theme.color()).to_string(),
                playlist: resolve_playlist(code, &table, DEFAULT_PLAYLIST_ID),
            }
        })
        .collect();

    println!("{}", Table::new(rows));
    println!("Unmapped codes play {}", DEFAULT_PLAYLIST_ID);
}
