//! List command implementation.

use crate::utils::{format_size, ratio_percent};
use oxidat_archive::{DatReader, EntryInfo, EntryLocation, ReadOptions};
use oxidat_core::ArchiveSource;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// JSON serializable entry data for archive listings.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct EntryJson {
    index: usize,
    start: u64,
    end: u64,
    stored_size: u64,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ratio: Option<f64>,
}

impl EntryJson {
    fn from_info(info: &EntryInfo) -> Self {
        let (status, stored_size) = match info.location {
            Some(EntryLocation::Data {
                start,
                end,
                clamped,
            }) => {
                let status = if clamped { "clamped" } else { "ok" };
                (status, (end - start) as u64)
            }
            Some(EntryLocation::Invalid) => ("invalid", 0),
            None => ("out-of-bounds", 0),
        };
        let header = info.payload_header;

        Self {
            index: info.span.index,
            start: info.span.start,
            end: info.span.end,
            stored_size,
            status: status.to_string(),
            raw_length: header.map(|h| h.raw_length),
            token_length: header.map(|h| h.token_length),
            ratio: header.map(|h| ratio_percent(stored_size, u64::from(h.raw_length))),
        }
    }
}

/// JSON output for archive listing.
#[derive(Debug, Serialize, Deserialize)]
struct ArchiveListJson {
    archive: String,
    archive_size: u64,
    entry_count: usize,
    data_start: u64,
    entries: Vec<EntryJson>,
}

fn build_listing(archive: &Path, reader: &DatReader<'_>) -> ArchiveListJson {
    ArchiveListJson {
        archive: archive.display().to_string(),
        archive_size: reader.archive_len() as u64,
        entry_count: reader.entry_count(),
        data_start: reader.header().data_start(),
        entries: reader.entries().iter().map(EntryJson::from_info).collect(),
    }
}

fn print_listing(listing: &ArchiveListJson) {
    println!("Archive: {}", listing.archive);
    println!(
        "Entries: {}, data start: {:#x}, size: {}",
        listing.entry_count,
        listing.data_start,
        format_size(listing.archive_size)
    );
    println!();
    println!(
        "{:>5} {:>10} {:>10} {:>10} {:>10} {:>6}  Status",
        "Index", "Start", "Stored", "Raw", "Tokens", "Ratio"
    );
    println!("{}", "-".repeat(66));

    let mut total_stored = 0u64;
    let mut total_raw = 0u64;
    for entry in &listing.entries {
        let raw = entry
            .raw_length
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        let tokens = entry
            .token_length
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        let ratio = entry
            .ratio
            .map(|r| format!("{:.1}%", r))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>5} {:>#10x} {:>10} {:>10} {:>10} {:>6}  {}",
            entry.index, entry.start, entry.stored_size, raw, tokens, ratio, entry.status
        );
        total_stored += entry.stored_size;
        total_raw += entry.raw_length.map(u64::from).unwrap_or(0);
    }

    println!("{}", "-".repeat(66));
    println!(
        "{:>5} {:>10} {:>10} {:>10} {:>10} {:>5.1}%",
        listing.entries.len(),
        "",
        total_stored,
        total_raw,
        "",
        ratio_percent(total_stored, total_raw)
    );
}

pub fn cmd_list(
    archive: &Path,
    json: bool,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = ArchiveSource::open(archive)?;
    let options = if strict {
        ReadOptions::strict()
    } else {
        ReadOptions::default()
    };
    let reader = DatReader::with_options(&source, options)?;
    let listing = build_listing(archive, &reader);

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        print_listing(&listing);
    }
    Ok(())
}
