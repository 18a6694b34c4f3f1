// 出力PDFのサイズ削減: 未圧縮ストリームのFlate圧縮と孤立オブジェクトの除去

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

fn deflate(data: &[u8]) -> Option<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).ok()?;
    encoder.finish().ok()
}

/// フィルター未設定のストリーム（コンテンツ、ToUnicode、埋め込みフォント）を
/// FlateDecode で圧縮する。圧縮した本数を返す。
///
/// `/Filter` を持つストリーム（DCTDecode の背景画像など）には触れない。
/// 圧縮しても小さくならないストリームはそのまま残す。
pub fn compress_streams(doc: &mut Document) -> usize {
    let stream_ids: Vec<ObjectId> = doc
        .objects
        .iter()
        .filter_map(|(id, obj)| match obj {
            Object::Stream(stream) if !stream.dict.has(b"Filter") => Some(*id),
            _ => None,
        })
        .collect();

    let mut compressed = 0;
    for id in stream_ids {
        let Some(Object::Stream(stream)) = doc.objects.get_mut(&id) else {
            continue;
        };
        match deflate(&stream.content) {
            Some(data) if data.len() < stream.content.len() => {
                stream.dict.set("Filter", "FlateDecode");
                stream.set_content(data);
                compressed += 1;
            }
            _ => {}
        }
    }
    compressed
}

/// 保存直前の最適化。圧縮の後、どこからも参照されないオブジェクトを除去する。
pub fn optimize(doc: &mut Document) {
    let compressed = compress_streams(doc);
    let pruned = doc.prune_objects();
    debug!(compressed, pruned = pruned.len(), "optimized document");
}
