//! Page geometry read from source PDFs on disk

use async_trait::async_trait;
use lopdf::{Dictionary, Document, Object, ObjectId};
use shared_types::{DocumentGeometry, PageSize};
use std::path::{Component, Path, PathBuf};
use template_engine::{PageSource, PersistenceError};

/// Resolves document references relative to a documents directory
#[derive(Debug, Clone)]
pub struct PdfPageSource {
    root: PathBuf,
}

impl PdfPageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a document, refusing references that escape the root
    pub fn document_path(&self, document_ref: &str) -> Result<PathBuf, PersistenceError> {
        let relative = Path::new(document_ref);
        let escapes = document_ref.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            tracing::warn!("Rejected document reference '{}'", document_ref);
            return Err(PersistenceError::PermissionDenied);
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl PageSource for PdfPageSource {
    async fn load_document(&self, document_ref: &str) -> Result<DocumentGeometry, PersistenceError> {
        let path = self.document_path(document_ref)?;
        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PersistenceError::NotFound(document_ref.to_string()),
            std::io::ErrorKind::PermissionDenied => PersistenceError::PermissionDenied,
            _ => PersistenceError::Transient(format!("reading {}: {}", path.display(), e)),
        })?;

        let geometry = tokio::task::spawn_blocking(move || geometry_from_pdf(&bytes))
            .await
            .map_err(|e| PersistenceError::Transient(e.to_string()))?
            .map_err(|e| {
                tracing::warn!("Unreadable PDF {}: {}", document_ref, e);
                PersistenceError::Transient(e)
            })?;

        tracing::debug!(
            "Loaded {} with {} pages",
            document_ref,
            geometry.page_count()
        );
        Ok(geometry)
    }
}

/// Page sizes of a PDF, in page order
pub fn geometry_from_pdf(bytes: &[u8]) -> Result<DocumentGeometry, String> {
    let doc = Document::load_mem(bytes).map_err(|e| format!("Failed to parse PDF: {}", e))?;

    let mut pages = Vec::new();
    for (_, page_id) in doc.get_pages() {
        let rect = page_dimensions(&doc, page_id)?;
        pages.push(PageSize {
            width: rect[2].abs(),
            height: rect[3].abs(),
        });
    }
    Ok(DocumentGeometry::new(pages))
}

/// MediaBox as [x, y, width, height]
fn page_dimensions(doc: &Document, page_id: ObjectId) -> Result<[f64; 4], String> {
    let page = doc
        .get_object(page_id)
        .map_err(|e| format!("Failed to get page object: {}", e))?;
    let page_dict = page.as_dict().map_err(|_| "Page is not a dictionary")?;

    match find_media_box(doc, page_dict) {
        Some(media_box) => parse_rect(doc, media_box),
        // Default to US Letter size
        None => Ok([0.0, 0.0, 612.0, 792.0]),
    }
}

/// MediaBox of a page, inherited through its Pages ancestors
fn find_media_box<'a>(doc: &'a Document, page_dict: &'a Dictionary) -> Option<&'a Object> {
    let mut dict = page_dict;
    // Bounded walk in case of a cyclic Parent chain
    for _ in 0..32 {
        if let Ok(media_box) = dict.get(b"MediaBox") {
            return Some(media_box);
        }
        let parent_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_object(parent_id).ok()?.as_dict().ok()?;
    }
    None
}

fn parse_rect(doc: &Document, obj: &Object) -> Result<[f64; 4], String> {
    let arr = match obj {
        Object::Array(a) => a,
        Object::Reference(id) => doc
            .get_object(*id)
            .map_err(|e| format!("Failed to resolve reference: {}", e))?
            .as_array()
            .map_err(|_| "MediaBox reference is not an array")?,
        _ => return Err("MediaBox is not an array".to_string()),
    };

    if arr.len() != 4 {
        return Err(format!("MediaBox has {} elements, expected 4", arr.len()));
    }

    let mut values = [0.0f64; 4];
    for (i, obj) in arr.iter().enumerate() {
        values[i] = extract_number(doc, obj)?;
    }

    Ok([
        values[0],
        values[1],
        values[2] - values[0],
        values[3] - values[1],
    ])
}

fn extract_number(doc: &Document, obj: &Object) -> Result<f64, String> {
    match obj {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(r) => Ok(*r as f64),
        Object::Reference(id) => {
            let resolved = doc
                .get_object(*id)
                .map_err(|e| format!("Failed to resolve: {}", e))?;
            extract_number(doc, resolved)
        }
        _ => Err("Expected number in rectangle".to_string()),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::{Dictionary, Document, Object};

    fn media_box(width: i64, height: i64) -> Object {
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(width),
            Object::Integer(height),
        ])
    }

    /// A PDF whose pages carry the given MediaBox sizes; `None` inherits
    /// from the Pages node, which is A4
    pub fn pdf_with_pages(sizes: &[Option<(i64, i64)>]) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut page_ids = Vec::new();
        for size in sizes {
            let mut page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
            ]);
            if let Some((w, h)) = size {
                page.set("MediaBox", media_box(*w, *h));
            }
            page_ids.push(doc.add_object(page));
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(sizes.len() as i64)),
            (
                "Kids",
                Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
            ("MediaBox", media_box(595, 842)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }
}
