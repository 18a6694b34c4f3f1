// 1ページPDF群を入力順に連結して1つのPDFにする

use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use tracing::debug;

use crate::error::OcrPdfError;

/// ページから親 `Pages` へ継承されうる属性。
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// 継承属性をページ辞書へ直接コピーする。
///
/// 元の `Pages` ツリーは連結時に捨てるため、ページ単体で完結させておく。
fn inline_inherited_attributes(doc: &Document, page: &mut Dictionary) {
    for key in INHERITABLE_KEYS {
        if page.has(key) {
            continue;
        }
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        while let Some(parent_id) = parent {
            let Ok(parent_dict) = doc.get_dictionary(parent_id) else {
                break;
            };
            if let Ok(value) = parent_dict.get(key) {
                page.set(key, value.clone());
                break;
            }
            parent = parent_dict
                .get(b"Parent")
                .and_then(Object::as_reference)
                .ok();
        }
    }
}

/// 複数のドキュメントを順に連結する。
///
/// ページ順は「ドキュメント順 → 各ドキュメント内のページ順」。
/// 元の Catalog / Pages / Outlines は破棄し、新しいページツリーを作る。
pub fn merge_documents(documents: Vec<Document>) -> crate::error::Result<Document> {
    if documents.is_empty() {
        return Err(OcrPdfError::merge("no documents to merge"));
    }

    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects = std::collections::BTreeMap::new();

    for mut doc in documents {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for (_, page_id) in doc.get_pages() {
            let mut page = doc.get_dictionary(page_id)?.clone();
            inline_inherited_attributes(&doc, &mut page);
            pages.push((page_id, page));
        }
        objects.extend(doc.objects);
    }

    let mut merged = Document::with_version("1.5");
    for (object_id, object) in objects {
        let type_name = object
            .as_dict()
            .ok()
            .and_then(|d| d.get(b"Type").ok())
            .and_then(|t| t.as_name().ok());
        match type_name {
            Some(b"Catalog") | Some(b"Pages") | Some(b"Page") | Some(b"Outlines")
            | Some(b"Outline") => {}
            _ => {
                merged.objects.insert(object_id, object);
            }
        }
    }

    merged.max_id = max_id;
    let pages_id = merged.new_object_id();

    let mut kids = Vec::with_capacity(pages.len());
    for (page_id, mut page) in pages {
        page.set("Parent", pages_id);
        merged.objects.insert(page_id, Object::Dictionary(page));
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = merged.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    merged.trailer.set("Root", catalog_id);
    merged.renumber_objects();

    Ok(merged)
}

/// PDFファイル群を連結して `output` に書き出す。戻り値は総ページ数。
pub fn merge_pdf_files(inputs: &[PathBuf], output: &Path) -> crate::error::Result<u32> {
    let mut documents = Vec::with_capacity(inputs.len());
    for path in inputs {
        let doc = Document::load(path).map_err(|e| {
            OcrPdfError::merge(format!("failed to load {}: {}", path.display(), e))
        })?;
        documents.push(doc);
    }

    let mut merged = merge_documents(documents)?;
    let page_count = merged.get_pages().len() as u32;
    crate::pdf::optimizer::compress_streams(&mut merged);
    merged
        .save(output)
        .map_err(|e| OcrPdfError::merge(format!("failed to write {}: {}", output.display(), e)))?;

    debug!(
        inputs = inputs.len(),
        pages = page_count,
        output = %output.display(),
        "merged page PDFs"
    );
    Ok(page_count)
}
