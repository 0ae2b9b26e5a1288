//! PDF outline injection for rendered reports, built on `lopdf`.
//!
//! Multi-campaign reports get long; a flat outline with one entry per
//! section lets viewers jump straight to a campaign.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;

use crate::model::CampaignSection;

/// Errors raised while embedding outline entries into a rendered PDF.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// The rendered bytes could not be parsed back as a PDF.
    #[error("failed to parse rendered PDF: {0}")]
    Parse(#[from] lopdf::Error),
    /// The document trailer has no usable catalog reference.
    #[error("PDF catalog entry is missing")]
    MissingCatalog,
    /// The catalog object is not a dictionary.
    #[error("PDF catalog entry is not a dictionary")]
    InvalidCatalog,
    /// A section start page does not exist in the rendered document.
    #[error("section {section_index} refers to missing page {page_number}")]
    MissingPage {
        section_index: usize,
        page_number: usize,
    },
}

/// Applies a flat outline tree mapping sections to their start pages.
///
/// Opens the rendered bytes with `lopdf`, builds an `/Outlines` dictionary
/// and points each entry at `/Dest [page /Fit]` for the section's recorded
/// start page.
pub fn apply_section_bookmarks(
    pdf_bytes: &[u8],
    sections: &[CampaignSection],
    section_pages: &[usize],
) -> Result<Vec<u8>, BookmarkError> {
    let mut document = Document::load_mem(pdf_bytes)?;

    let pages = document.get_pages();
    let mut entries = collect_outline_entries(&mut document, sections, section_pages, &pages)?;

    if entries.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let outlines_id = document.new_object_id();
    link_outline_entries(outlines_id, &mut document, &mut entries);
    insert_outlines_root(outlines_id, &mut document, &entries)?;

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

struct OutlineEntry {
    object_id: ObjectId,
    page_ref: ObjectId,
    title: String,
}

fn collect_outline_entries(
    document: &mut Document,
    sections: &[CampaignSection],
    section_pages: &[usize],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<OutlineEntry>, BookmarkError> {
    let mut entries = Vec::new();

    for (index, (section, page_number)) in
        sections.iter().zip(section_pages.iter().copied()).enumerate()
    {
        // A zero slot means the section never rendered; skip it.
        if page_number == 0 {
            continue;
        }

        let page_ref = pages.get(&(page_number as u32)).copied().ok_or(
            BookmarkError::MissingPage {
                section_index: index,
                page_number,
            },
        )?;

        entries.push(OutlineEntry {
            object_id: document.new_object_id(),
            page_ref,
            title: section.heading().to_owned(),
        });
    }

    Ok(entries)
}

fn link_outline_entries(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &mut [OutlineEntry],
) {
    for index in 0..entries.len() {
        let mut dictionary = Dictionary::new();
        dictionary.set(
            "Title",
            Object::string_literal(entries[index].title.as_str()),
        );
        dictionary.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(entries[index].page_ref),
                Object::Name("Fit".into()),
            ]),
        );
        dictionary.set("Parent", Object::Reference(outlines_id));

        if index > 0 {
            dictionary.set("Prev", Object::Reference(entries[index - 1].object_id));
        }
        if index + 1 < entries.len() {
            dictionary.set("Next", Object::Reference(entries[index + 1].object_id));
        }

        document
            .objects
            .insert(entries[index].object_id, Object::Dictionary(dictionary));
    }
}

fn insert_outlines_root(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &[OutlineEntry],
) -> Result<(), BookmarkError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;

    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)?;

    let mut dictionary = Dictionary::new();
    dictionary.set("Type", Object::Name("Outlines".into()));
    dictionary.set("Count", Object::Integer(entries.len() as i64));
    if let Some(first) = entries.first() {
        dictionary.set("First", Object::Reference(first.object_id));
    }
    if let Some(last) = entries.last() {
        dictionary.set("Last", Object::Reference(last.object_id));
    }

    catalog.set("Outlines", Object::Reference(outlines_id));

    document
        .objects
        .insert(outlines_id, Object::Dictionary(dictionary));

    Ok(())
}
