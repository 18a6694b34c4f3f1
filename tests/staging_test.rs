// 一時ディレクトリと出力先確定のテスト

use searchable_pdf::pipeline::staging::{Staging, promote};

fn leftovers(dir: &std::path::Path, prefix: &str) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(prefix))
        .collect()
}

#[test]
fn test_staging_paths_and_cleanup() {
    let dir = tempfile::tempdir().unwrap();
    let parent = dir.path().join("work");

    let staging = Staging::create_in(&parent).expect("create");
    let root = staging.path().to_path_buf();
    assert!(root.starts_with(&parent));
    assert!(root.is_dir());
    assert_eq!(staging.page_pdf_path(3), root.join("page_3_ocr.pdf"));
    assert_eq!(staging.merged_pdf_path(), root.join("merged_ocr.pdf"));

    std::fs::write(staging.page_pdf_path(1), b"%PDF").unwrap();
    staging.cleanup();
    assert!(!root.exists());
    assert!(leftovers(&parent, ".ocr_staging_").is_empty());
}

#[test]
fn test_staging_removed_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let root = {
        let staging = Staging::create_in(dir.path()).expect("create");
        std::fs::write(staging.merged_pdf_path(), b"%PDF").unwrap();
        staging.path().to_path_buf()
    };
    assert!(!root.exists());
}

#[test]
fn test_promote_moves_file_into_new_directory() {
    let dir = tempfile::tempdir().unwrap();
    let staged = dir.path().join("page_1_ocr.pdf");
    std::fs::write(&staged, b"%PDF-1.5 body").unwrap();
    let destination = dir.path().join("out").join("scan_ocr.pdf");

    promote(&staged, &destination).expect("promote");

    assert!(!staged.exists());
    assert_eq!(std::fs::read(&destination).unwrap(), b"%PDF-1.5 body");
}

#[test]
fn test_promote_missing_source_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("scan_ocr.pdf");

    assert!(promote(&dir.path().join("missing.pdf"), &destination).is_err());
    assert!(!destination.exists());
    assert!(leftovers(dir.path(), ".ocr_promote_").is_empty());
}

/// rename も途中のコピーも失敗したとき、既存の出力先はそのまま残る
#[cfg(unix)]
#[test]
fn test_promote_failed_copy_keeps_destination_intact() {
    let dir = tempfile::tempdir().unwrap();
    // ディレクトリは開けるが読めないので、コピーが書き込み途中で失敗する
    let staged = dir.path().join("staged_dir");
    std::fs::create_dir(&staged).unwrap();
    let destination = dir.path().join("scan_ocr.pdf");
    std::fs::write(&destination, b"previous").unwrap();

    assert!(promote(&staged, &destination).is_err());

    assert_eq!(std::fs::read(&destination).unwrap(), b"previous");
    assert!(leftovers(dir.path(), ".ocr_promote_").is_empty());
}
