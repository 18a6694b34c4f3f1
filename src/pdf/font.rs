use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use ttf_parser::GlyphId;

use crate::error::OcrPdfError;
use crate::ocr::layout::TextMeasure;

/// システムフォント検索で優先するファミリ名（先頭ほど優先）。
const PREFERRED_FAMILIES: &[&str] = &[
    "Times New Roman",
    "Liberation Serif",
    "Tinos",
    "DejaVu Serif",
    "Noto Serif",
    "FreeSerif",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
];

/// グリフIDと、そのグリフが表すUnicode文字の列。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedText {
    pub glyphs: Vec<u16>,
    pub chars: Vec<char>,
}

impl EncodedText {
    /// Identity-H の16進文字列 (`<0041...>`) として書き出す。
    pub fn to_hex_string(&self) -> String {
        let mut buf = String::with_capacity(self.glyphs.len() * 4 + 2);
        buf.push('<');
        for gid in &self.glyphs {
            // String への書き込みは失敗しない
            let _ = write!(buf, "{gid:04X}");
        }
        buf.push('>');
        buf
    }
}

/// ページで使用したグリフ → Unicode 対応（/W と /ToUnicode の生成に使う）。
#[derive(Debug, Clone, Default)]
pub struct GlyphUsage {
    glyphs: BTreeMap<u16, char>,
}

impl GlyphUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同じグリフが複数の文字に対応する場合は最初の文字を採用する。
    pub fn record(&mut self, encoded: &EncodedText) {
        for (&gid, &ch) in encoded.glyphs.iter().zip(encoded.chars.iter()) {
            self.glyphs.entry(gid).or_insert(ch);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, char)> + '_ {
        self.glyphs.iter().map(|(&gid, &ch)| (gid, ch))
    }
}

/// PDFに埋め込むTrueTypeフォント。
///
/// Type0 / Identity-H の複合フォントとして書き出すため、CID = GID となる。
pub struct EmbeddedFont {
    font_data: Vec<u8>,
    postscript_name: String,
    units_per_em: u16,
    ascent: i16,
    descent: i16,
    cap_height: i16,
    bbox: [i16; 4],
}

impl std::fmt::Debug for EmbeddedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedFont")
            .field("postscript_name", &self.postscript_name)
            .field("units_per_em", &self.units_per_em)
            .field("bytes", &self.font_data.len())
            .finish()
    }
}

impl EmbeddedFont {
    /// フォントファイルを読み込む。
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let data = std::fs::read(path).map_err(|e| {
            OcrPdfError::font(format!("failed to read font {}: {}", path.display(), e))
        })?;
        Self::from_bytes(data)
    }

    /// フォントデータを検証して構築する。
    ///
    /// フォントコレクション (.ttc) と CFF アウトラインのフォントは
    /// FontFile2 として埋め込めないため拒否する。
    pub fn from_bytes(font_data: Vec<u8>) -> crate::error::Result<Self> {
        if font_data.starts_with(b"ttcf") {
            return Err(OcrPdfError::font(
                "font collections (.ttc) cannot be embedded; use a single-face .ttf",
            ));
        }

        let face = ttf_parser::Face::parse(&font_data, 0)
            .map_err(|e| OcrPdfError::font(format!("failed to parse TrueType: {}", e)))?;

        if face.tables().glyf.is_none() {
            return Err(OcrPdfError::font(
                "font has no TrueType (glyf) outlines; CFF-based fonts are not supported",
            ));
        }

        let units_per_em = face.units_per_em();
        if units_per_em == 0 {
            return Err(OcrPdfError::font("font reports units_per_em = 0"));
        }

        let postscript_name = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .find_map(|name| name.to_string())
            .map(|name| sanitize_font_name(&name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "EmbeddedFont".to_string());

        let rect = face.global_bounding_box();
        let ascent = face.ascender();
        let descent = face.descender();
        let cap_height = face.capital_height().unwrap_or(ascent);

        Ok(Self {
            postscript_name,
            units_per_em,
            ascent,
            descent,
            cap_height,
            bbox: [rect.x_min, rect.y_min, rect.x_max, rect.y_max],
            font_data,
        })
    }

    /// システムフォントから埋め込み可能なフォントを探す。
    ///
    /// `PREFERRED_FAMILIES` の順に検索し、見つからなければ
    /// 最初に見つかった埋め込み可能なフォントを使う。
    pub fn from_system() -> crate::error::Result<Self> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        let mut candidates: Vec<fontdb::ID> = Vec::new();
        for family in PREFERRED_FAMILIES {
            let query = fontdb::Query {
                families: &[fontdb::Family::Name(*family)],
                ..fontdb::Query::default()
            };
            if let Some(id) = db.query(&query) {
                candidates.push(id);
            }
        }
        candidates.extend(db.faces().map(|face| face.id));

        for id in candidates {
            let loaded = db.with_face_data(id, |data, index| {
                if index != 0 {
                    return None;
                }
                Self::from_bytes(data.to_vec()).ok()
            });
            if let Some(Some(font)) = loaded {
                return Ok(font);
            }
        }

        Err(OcrPdfError::font(
            "no embeddable TrueType font found on this system; set font_path",
        ))
    }

    /// `font_path` が指定されていればそれを、無ければシステムフォントを使う。
    pub fn load(font_path: Option<&Path>) -> crate::error::Result<Self> {
        match font_path {
            Some(path) => Self::from_file(path),
            None => Self::from_system(),
        }
    }

    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    pub fn font_data(&self) -> &[u8] {
        &self.font_data
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.font_data, 0).ok()
    }

    /// グリフの送り幅（1/1000テキスト空間単位）
    pub fn glyph_width(&self, gid: u16) -> f64 {
        let advance = self
            .face()
            .and_then(|face| face.glyph_hor_advance(GlyphId(gid)))
            .unwrap_or(0);
        advance as f64 * 1000.0 / self.units_per_em as f64
    }

    /// 文字列をグリフID列に変換する。
    ///
    /// フォントにグリフが無い文字が含まれる場合はエラー。
    pub fn encode(&self, text: &str) -> crate::error::Result<EncodedText> {
        let face = self
            .face()
            .ok_or_else(|| OcrPdfError::font("failed to re-parse embedded font"))?;
        let mut encoded = EncodedText::default();
        for ch in text.chars() {
            let gid = face.glyph_index(ch).ok_or_else(|| {
                OcrPdfError::font(format!(
                    "no glyph for {:?} (U+{:04X}) in {}",
                    ch, ch as u32, self.postscript_name
                ))
            })?;
            encoded.glyphs.push(gid.0);
            encoded.chars.push(ch);
        }
        Ok(encoded)
    }

    /// 失敗しない変換: 印字可能ASCII以外を `?` に置換し、
    /// それでもグリフが無い文字は .notdef (GID 0) にする。
    pub fn encode_lossy(&self, text: &str) -> EncodedText {
        let sanitized = sanitize_ascii(text);
        let face = self.face();
        let mut encoded = EncodedText::default();
        for ch in sanitized.chars() {
            let gid = face
                .as_ref()
                .and_then(|face| face.glyph_index(ch))
                .map_or(0, |gid| gid.0);
            encoded.glyphs.push(gid);
            encoded.chars.push(ch);
        }
        encoded
    }

    /// Type0フォント一式（FontFile2, FontDescriptor, CIDFont, ToUnicode）を
    /// ドキュメントに追加し、Type0フォント辞書のIDを返す。
    pub fn add_to_document(&self, doc: &mut Document, usage: &GlyphUsage) -> ObjectId {
        let scale = 1000.0 / self.units_per_em as f64;
        let to_pdf = |v: i16| -> i64 { (v as f64 * scale).round() as i64 };

        let font_file = Stream::new(
            dictionary! { "Length1" => self.font_data.len() as i64 },
            self.font_data.clone(),
        );
        let font_file_id = doc.add_object(Object::Stream(font_file));

        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => Object::Name(self.postscript_name.clone().into_bytes()),
            // Nonsymbolic
            "Flags" => 32,
            "FontBBox" => self.bbox.iter().map(|&v| Object::Integer(to_pdf(v))).collect::<Vec<_>>(),
            "ItalicAngle" => 0,
            "Ascent" => to_pdf(self.ascent),
            "Descent" => to_pdf(self.descent),
            "CapHeight" => to_pdf(self.cap_height),
            "StemV" => 80,
            "FontFile2" => font_file_id,
        });

        let cid_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => Object::Name(self.postscript_name.clone().into_bytes()),
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => descriptor_id,
            "DW" => 1000,
            "W" => self.widths_array(usage),
            "CIDToGIDMap" => "Identity",
        });

        let to_unicode = Stream::new(dictionary! {}, build_to_unicode_cmap(usage).into_bytes());
        let to_unicode_id = doc.add_object(Object::Stream(to_unicode));

        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => Object::Name(self.postscript_name.clone().into_bytes()),
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font_id)],
            "ToUnicode" => to_unicode_id,
        })
    }

    /// CIDFont の /W 配列: `[ gid [w] gid [w] ... ]`
    fn widths_array(&self, usage: &GlyphUsage) -> Vec<Object> {
        let mut widths = Vec::with_capacity(usage.len() * 2);
        for (gid, _) in usage.iter() {
            widths.push(Object::Integer(gid as i64));
            widths.push(Object::Array(vec![Object::Real(
                self.glyph_width(gid) as f32,
            )]));
        }
        widths
    }
}

impl TextMeasure for EmbeddedFont {
    fn text_width(&self, text: &str, font_size: f64) -> Option<f64> {
        let face = self.face()?;
        let mut units = 0u64;
        for ch in text.chars() {
            let gid = face.glyph_index(ch)?;
            units += face.glyph_hor_advance(gid).unwrap_or(0) as u64;
        }
        Some(units as f64 * font_size / self.units_per_em as f64)
    }
}

/// 印字可能ASCII (0x20..=0x7E) 以外の文字を `?` に置換する。
pub fn sanitize_ascii(text: &str) -> String {
    text.chars()
        .map(|ch| if (' '..='~').contains(&ch) { ch } else { '?' })
        .collect()
}

/// PDF Name として安全な文字だけを残す。
fn sanitize_font_name(name: &str) -> String {
    name.chars()
        .filter(|ch| ch.is_ascii_graphic() && !"()<>[]{}/%#".contains(*ch))
        .collect()
}

/// /ToUnicode CMap を生成する（bfchar は100件ごとに区切る）。
pub fn build_to_unicode_cmap(usage: &GlyphUsage) -> String {
    let mut cmap = String::new();
    cmap.push_str("/CIDInit /ProcSet findresource begin\n");
    cmap.push_str("12 dict begin\n");
    cmap.push_str("begincmap\n");
    cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
    cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
    cmap.push_str("/CMapType 2 def\n");
    cmap.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

    let entries: Vec<(u16, char)> = usage.iter().collect();
    for chunk in entries.chunks(100) {
        let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
        for &(gid, ch) in chunk {
            let mut utf16 = [0u16; 2];
            let units = ch.encode_utf16(&mut utf16);
            let _ = write!(cmap, "<{gid:04X}> <");
            for unit in units.iter() {
                let _ = write!(cmap, "{unit:04X}");
            }
            cmap.push_str(">\n");
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str("endcmap\n");
    cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
    cmap.push_str("end\nend\n");
    cmap
}
