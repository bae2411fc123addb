//! Text and JSON rendering of the statistics header, the sighting table, the
//! detail view and the add/edit form.
//!
//! Rendering makes no decisions; it only formats state owned elsewhere.

use std::io::Write;

use crate::config::DisplayFormat;
use crate::controller::{Page, Stats};
use crate::error::Result;
use crate::session::FormSession;
use crate::sighting::Sighting;
use crate::validation::ValidationErrors;

const TABLE_HEADERS: [&str; 7] = [
    "ID",
    "Name",
    "Species",
    "Location",
    "Size",
    "Color",
    "Date Spotted",
];

/// Render the statistics header.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn stats(out: &mut impl Write, stats: &Stats, format: DisplayFormat) -> Result<()> {
    match format {
        DisplayFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(stats)?)?,
        DisplayFormat::Plain | DisplayFormat::Table => {
            writeln!(out, "Total Squirrels: {}", stats.total_count)?;
            writeln!(out, "Species Found:   {}", stats.unique_species_count)?;
            writeln!(out, "Favorites:       {}", stats.favorite_count)?;
        }
    }
    Ok(())
}

fn row(sighting: &Sighting) -> [String; 7] {
    let data = &sighting.data;
    let name = if data.is_favorite {
        format!("{} ♥", data.name)
    } else {
        data.name.clone()
    };
    [
        sighting.id.to_string(),
        name,
        data.species.to_string(),
        data.location.clone(),
        data.size.map(|s| s.to_string()).unwrap_or_default(),
        data.color.map(|c| c.to_string()).unwrap_or_default(),
        data.date_spotted.to_string(),
    ]
}

/// Render one page of the sighting list.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn page(out: &mut impl Write, page: &Page, format: DisplayFormat) -> Result<()> {
    match format {
        DisplayFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(page)?)?;
            return Ok(());
        }
        DisplayFormat::Plain => {
            for sighting in &page.records {
                let data = &sighting.data;
                writeln!(
                    out,
                    "{}\t{}{}\t{}\t{}\t{}",
                    sighting.id,
                    data.name,
                    if data.is_favorite { " ♥" } else { "" },
                    data.species,
                    data.location,
                    data.date_spotted
                )?;
            }
        }
        DisplayFormat::Table => {
            if page.records.is_empty() {
                writeln!(out, "No squirrels recorded yet.")?;
            } else {
                let rows: Vec<[String; 7]> = page.records.iter().map(row).collect();
                let mut widths = TABLE_HEADERS.map(|h| h.chars().count());
                for cells in &rows {
                    for (width, cell) in widths.iter_mut().zip(cells) {
                        *width = (*width).max(cell.chars().count());
                    }
                }

                write_cells(out, &TABLE_HEADERS.map(str::to_string), &widths)?;
                let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
                writeln!(out, "{}", rule.join("  "))?;
                for cells in &rows {
                    write_cells(out, cells, &widths)?;
                }
            }
        }
    }

    if page.total_pages > 1 {
        writeln!(
            out,
            "Page {} of {} ({} squirrels)",
            page.number, page.total_pages, page.total_records
        )?;
    }
    Ok(())
}

fn write_cells(out: &mut impl Write, cells: &[String; 7], widths: &[usize; 7]) -> Result<()> {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    writeln!(out, "{}", padded.join("  ").trim_end())?;
    Ok(())
}

/// Render the read-only detail view of one sighting.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn detail(out: &mut impl Write, sighting: &Sighting, format: DisplayFormat) -> Result<()> {
    if format == DisplayFormat::Json {
        writeln!(out, "{}", serde_json::to_string_pretty(sighting)?)?;
        return Ok(());
    }

    let data = &sighting.data;
    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    writeln!(out, "🐿️ {}", data.name)?;
    writeln!(out, "Species:      {}", data.species)?;
    writeln!(out, "Location:     {}", data.location)?;
    writeln!(out, "Size:         {}", or_dash(data.size.map(|s| s.to_string())))?;
    writeln!(out, "Color:        {}", or_dash(data.color.map(|c| c.to_string())))?;
    writeln!(
        out,
        "Behavior:     {}",
        or_dash(data.behavior.map(|b| b.to_string()))
    )?;
    writeln!(out, "Date Spotted: {}", data.date_spotted)?;
    writeln!(
        out,
        "Favorite:     {}",
        if data.is_favorite { "Yes" } else { "No" }
    )?;
    if let Some(notes) = &data.notes {
        writeln!(out, "Notes:        {notes}")?;
    }
    Ok(())
}

/// Render the open add/edit form and its working values.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn form(out: &mut impl Write, session: &FormSession) -> Result<()> {
    let Some(title) = session.title() else {
        writeln!(out, "No form is open.")?;
        return Ok(());
    };

    let values = session.values();
    let show = |value: Option<String>| value.unwrap_or_default();

    writeln!(out, "{title}")?;
    writeln!(out, "  name:        {}", values.name)?;
    writeln!(out, "  species:     {}", show(values.species.map(|s| s.to_string())))?;
    writeln!(out, "  location:    {}", values.location)?;
    writeln!(out, "  size:        {}", show(values.size.map(|s| s.to_string())))?;
    writeln!(out, "  color:       {}", show(values.color.map(|c| c.to_string())))?;
    writeln!(
        out,
        "  behavior:    {}",
        show(values.behavior.map(|b| b.to_string()))
    )?;
    writeln!(
        out,
        "  dateSpotted: {}",
        show(values.date_spotted.map(|d| d.to_string()))
    )?;
    writeln!(out, "  notes:       {}", show(values.notes.clone()))?;
    writeln!(
        out,
        "  isFavorite:  {}",
        show(values.is_favorite.map(|f| f.to_string()))
    )?;
    Ok(())
}

/// Render field-level validation messages.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn validation(out: &mut impl Write, errors: &ValidationErrors) -> Result<()> {
    for error in errors.errors() {
        writeln!(out, "  {}: {}", error.field, error.message)?;
    }
    Ok(())
}
