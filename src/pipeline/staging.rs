// ジョブ単位の一時ディレクトリと、出力先への確定（move）

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::OcrPdfError;

/// ページPDFと結合結果を置く一時ディレクトリ。
///
/// drop 時（成功・失敗・パニック巻き戻しのいずれでも）に中身ごと削除される。
pub struct Staging {
    dir: TempDir,
}

impl Staging {
    /// `parent` の下に一時ディレクトリを作る。`parent` が無ければ作成する。
    pub fn create_in(parent: &Path) -> crate::error::Result<Self> {
        std::fs::create_dir_all(parent)?;
        let dir = tempfile::Builder::new()
            .prefix(".ocr_staging_")
            .tempdir_in(parent)
            .map_err(|e| {
                OcrPdfError::IoError(std::io::Error::new(
                    e.kind(),
                    format!(
                        "failed to create staging directory in {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        debug!(staging = %dir.path().display(), "created staging directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// 1-indexedのページ番号に対応するページPDFのパス: `page_<n>_ocr.pdf`
    pub fn page_pdf_path(&self, page_number: u32) -> PathBuf {
        self.dir.path().join(format!("page_{page_number}_ocr.pdf"))
    }

    /// 複数ページを結合したPDFのパス
    pub fn merged_pdf_path(&self) -> PathBuf {
        self.dir.path().join("merged_ocr.pdf")
    }

    /// ディレクトリを削除する。失敗は警告のみ。
    pub fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!(staging = %path.display(), "failed to remove staging directory: {e}");
        }
    }
}

/// ステージング済みファイルを出力先へ移動する。
///
/// 同一ファイルシステムなら rename、別デバイスなどで rename できない場合は
/// 出力先と同じディレクトリの一時ファイルへコピーしてから rename する。
/// 失敗時に出力先が途中まで書かれた状態で残ることはない。
pub fn promote(staged: &Path, destination: &Path) -> crate::error::Result<()> {
    let dest_dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dest_dir)?;

    match std::fs::rename(staged, destination) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            debug!(
                from = %staged.display(),
                to = %destination.display(),
                "rename failed ({rename_err}), copying instead"
            );
            copy_then_rename(staged, dest_dir, destination).map_err(|e| {
                OcrPdfError::pdf_write(format!(
                    "failed to move {} to {}: {}",
                    staged.display(),
                    destination.display(),
                    e
                ))
            })?;
            if let Err(e) = std::fs::remove_file(staged) {
                warn!(file = %staged.display(), "failed to remove staged file: {e}");
            }
            Ok(())
        }
    }
}

/// 一時ファイルは persist されなければ drop 時に削除される。
fn copy_then_rename(staged: &Path, dest_dir: &Path, destination: &Path) -> std::io::Result<()> {
    let mut source = std::fs::File::open(staged)?;
    let mut partial = tempfile::Builder::new()
        .prefix(".ocr_promote_")
        .tempfile_in(dest_dir)?;
    std::io::copy(&mut source, partial.as_file_mut())?;
    partial.as_file().sync_all()?;
    partial.persist(destination)?;
    Ok(())
}
