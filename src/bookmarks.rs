//! Page outline for generated reports, written with `lopdf`.

use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;

/// Errors that can occur while adding the outline to a rendered report.
#[derive(Debug, Error)]
pub enum BookmarkError {
    #[error("failed to parse PDF bytes")]
    Parse(#[from] lopdf::Error),

    #[error("failed to write outlined PDF")]
    Write(#[from] std::io::Error),

    #[error("PDF catalog entry is missing or not a dictionary")]
    InvalidCatalog,

    #[error("outline has {titles} entries but the document has {pages} pages")]
    PageCountMismatch { titles: usize, pages: usize },
}

/// Adds a flat `/Outlines` tree with one entry per page, titled from `page_titles` in order.
pub fn apply_page_bookmarks(pdf_bytes: &[u8], page_titles: &[&str]) -> Result<Vec<u8>, BookmarkError> {
    let mut document = Document::load_mem(pdf_bytes)?;

    let pages: Vec<ObjectId> = document.get_pages().into_values().collect();
    if pages.len() != page_titles.len() {
        return Err(BookmarkError::PageCountMismatch {
            titles: page_titles.len(),
            pages: pages.len(),
        });
    }
    if pages.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let outlines_id = document.new_object_id();
    let entry_ids: Vec<ObjectId> = pages.iter().map(|_| document.new_object_id()).collect();

    for (index, (title, page)) in page_titles.iter().zip(&pages).enumerate() {
        let mut entry = Dictionary::new();
        entry.set("Title", Object::string_literal(*title));
        entry.set(
            "Dest",
            Object::Array(vec![Object::Reference(*page), Object::Name("Fit".into())]),
        );
        entry.set("Parent", Object::Reference(outlines_id));
        if index > 0 {
            entry.set("Prev", Object::Reference(entry_ids[index - 1]));
        }
        if let Some(next) = entry_ids.get(index + 1) {
            entry.set("Next", Object::Reference(*next));
        }
        document
            .objects
            .insert(entry_ids[index], Object::Dictionary(entry));
    }

    let mut outlines = Dictionary::new();
    outlines.set("Type", Object::Name("Outlines".into()));
    outlines.set("Count", Object::Integer(entry_ids.len() as i64));
    outlines.set("First", Object::Reference(entry_ids[0]));
    outlines.set("Last", Object::Reference(entry_ids[entry_ids.len() - 1]));
    document
        .objects
        .insert(outlines_id, Object::Dictionary(outlines));

    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::InvalidCatalog)?;
    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .and_then(|object| object.as_dict_mut().ok())
        .ok_or(BookmarkError::InvalidCatalog)?;
    catalog.set("Outlines", Object::Reference(outlines_id));
    catalog.set("PageMode", Object::Name("UseOutlines".into()));

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use lopdf::content::Content;
    use lopdf::{dictionary, Stream};

    use super::*;

    fn blank_pdf(page_count: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for _ in 0..page_count {
            let content = Content { operations: Vec::new() };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(page_id.into());
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("save blank pdf");
        bytes
    }

    #[test]
    fn writes_one_entry_per_page() {
        let bytes = apply_page_bookmarks(&blank_pdf(3), &["Cover", "Materiality", "Back cover"])
            .expect("apply bookmarks");

        let doc = Document::load_mem(&bytes).expect("reload");
        let catalog = doc.catalog().expect("catalog");
        let outlines_id = catalog
            .get(b"Outlines")
            .and_then(Object::as_reference)
            .expect("outlines reference");
        let outlines = doc.get_dictionary(outlines_id).expect("outlines dictionary");
        assert_eq!(outlines.get(b"Count").and_then(Object::as_i64).ok(), Some(3));
    }

    #[test]
    fn rejects_mismatched_titles() {
        let err = apply_page_bookmarks(&blank_pdf(2), &["Cover"]).expect_err("mismatch");
        assert!(matches!(
            err,
            BookmarkError::PageCountMismatch { titles: 1, pages: 2 }
        ));
    }
}
