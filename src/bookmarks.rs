//! PDF outline entries for report sections, written with `lopdf`.

use std::collections::BTreeMap;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use thiserror::Error;

use crate::model::SectionPage;

/// Errors that can occur while embedding bookmarks into a rendered PDF document.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// The PDF bytes could not be parsed or written by `lopdf`.
    #[error("failed to process PDF bytes: {0}")]
    Parse(#[from] lopdf::Error),
    /// The document trailer has no catalog reference.
    #[error("PDF catalog entry is missing")]
    MissingCatalog,
    /// The catalog object was not a dictionary.
    #[error("PDF catalog entry is not a dictionary")]
    InvalidCatalog,
    /// A section heading was recorded on a page the document does not have.
    #[error("section `{section}` refers to missing page {page_number}")]
    MissingPage { section: String, page_number: usize },
}

impl From<std::io::Error> for BookmarkError {
    fn from(err: std::io::Error) -> Self {
        Self::Parse(err.into())
    }
}

/// Adds a flat outline with one entry per rendered section heading.
///
/// Each entry targets the page the heading was drawn on (`/Dest [page /Fit]`) and carries the
/// section identifier as its `/NM`. Without sections the bytes are returned as they are.
pub fn apply_section_bookmarks(
    pdf_bytes: &[u8],
    sections: &[SectionPage],
) -> Result<Vec<u8>, BookmarkError> {
    let mut document = Document::load_mem(pdf_bytes)?;
    let targets = section_targets(sections, &document.get_pages())?;
    if targets.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let outlines_id = document.new_object_id();
    let item_ids: Vec<ObjectId> = targets.iter().map(|_| document.new_object_id()).collect();

    for (index, target) in targets.iter().enumerate() {
        let mut item = dictionary! {
            "Title" => Object::string_literal(target.title.as_str()),
            "NM" => Object::string_literal(target.identifier.as_str()),
            "Parent" => outlines_id,
            "Dest" => vec![Object::Reference(target.page), Object::Name(b"Fit".to_vec())],
        };
        if let Some(previous) = index.checked_sub(1).map(|i| item_ids[i]) {
            item.set("Prev", previous);
        }
        if let Some(next) = item_ids.get(index + 1) {
            item.set("Next", *next);
        }
        document.objects.insert(item_ids[index], Object::Dictionary(item));
    }

    let mut root = dictionary! {
        "Type" => "Outlines",
        "Count" => item_ids.len() as i64,
    };
    if let (Some(first), Some(last)) = (item_ids.first(), item_ids.last()) {
        root.set("First", *first);
        root.set("Last", *last);
    }
    document.objects.insert(outlines_id, Object::Dictionary(root));
    catalog_mut(&mut document)?.set("Outlines", outlines_id);

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

struct SectionTarget {
    title: String,
    identifier: String,
    page: ObjectId,
}

fn section_targets(
    sections: &[SectionPage],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<SectionTarget>, BookmarkError> {
    sections
        .iter()
        .map(|placed| -> Result<SectionTarget, BookmarkError> {
            let page = u32::try_from(placed.page)
                .ok()
                .and_then(|number| pages.get(&number))
                .copied()
                .ok_or_else(|| BookmarkError::MissingPage {
                    section: placed.section.identifier().to_string(),
                    page_number: placed.page,
                })?;
            Ok(SectionTarget {
                title: placed.section.title().to_string(),
                identifier: placed.section.identifier().to_string(),
                page,
            })
        })
        .collect()
}

fn catalog_mut(document: &mut Document) -> Result<&mut Dictionary, BookmarkError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;
    document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)
}
