use coolclean_analyze::{
    DuplicateConfig, DuplicateEvent, DuplicateGroup, DuplicateScanner, DuplicateSummary,
    fingerprint,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

async fn run_scan(config: DuplicateConfig) -> (Vec<DuplicateGroup>, Vec<f64>, DuplicateSummary) {
    let mut scanner = DuplicateScanner::new();
    let mut handle = scanner.start(config);

    let mut groups = Vec::new();
    let mut progress = Vec::new();
    while let Some(event) = handle.recv().await {
        match event {
            DuplicateEvent::GroupFound(group) => groups.push(group),
            DuplicateEvent::Progress(p) => progress.push(p),
            DuplicateEvent::Completed(summary) => return (groups, progress, summary),
            DuplicateEvent::Failed(err) => panic!("scan failed: {err}"),
            _ => {}
        }
    }
    panic!("scan ended without completing");
}

#[test]
fn test_duplicate_config_builder() {
    let config = DuplicateConfig::builder()
        .root("/data")
        .min_size(2048u64)
        .include_hidden(true)
        .threads(2usize)
        .build()
        .unwrap();

    assert_eq!(config.min_size, 2048);
    assert!(config.include_hidden);
    assert_eq!(config.threads, 2);
    assert_eq!(config.small_file_limit, 256 * 1024);
    assert_eq!(config.sample_size, 64 * 1024);
}

#[tokio::test]
async fn test_identical_pair_forms_group() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let content = vec![0xabu8; 2000];
    fs::write(root.join("a.bin"), &content).unwrap();
    fs::write(root.join("b.bin"), &content).unwrap();

    let (groups, _, summary) = run_scan(DuplicateConfig::new(root, 1024)).await;

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].count(), 2);
    assert_eq!(groups[0].size, 2000);
    assert_eq!(groups[0].potential_savings(), 2000);
    assert_eq!(summary.total_savings, 2000);
}

#[tokio::test]
async fn test_same_size_different_content_not_grouped() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("x.bin"), vec![1u8; 100]).unwrap();
    fs::write(root.join("y.bin"), vec![2u8; 200]).unwrap();
    fs::write(root.join("z.bin"), vec![3u8; 100]).unwrap();

    let (groups, _, summary) = run_scan(DuplicateConfig::new(root, 50)).await;

    assert!(groups.is_empty());
    assert_eq!(summary.files_enumerated, 3);
    // Only the 100-byte bucket has company.
    assert_eq!(summary.candidates_hashed, 2);
}

#[tokio::test]
async fn test_unique_sizes_are_never_hashed() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    for (i, len) in [1100, 1200, 1300, 1400].iter().enumerate() {
        fs::write(root.join(format!("f{i}")), vec![9u8; *len]).unwrap();
    }

    let (groups, progress, summary) = run_scan(DuplicateConfig::new(root, 1024)).await;

    assert!(groups.is_empty());
    assert_eq!(summary.candidates_hashed, 0);
    assert_eq!(progress.last().copied(), Some(1.0));
}

#[tokio::test]
async fn test_groups_are_valid() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    for dir in ["photos", "backup", "backup/old"] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    let photo = vec![0x11u8; 3000];
    let video = vec![0x22u8; 5000];
    fs::write(root.join("photos/p.jpg"), &photo).unwrap();
    fs::write(root.join("backup/p.jpg"), &photo).unwrap();
    fs::write(root.join("backup/old/p.jpg"), &photo).unwrap();
    fs::write(root.join("photos/v.mp4"), &video).unwrap();
    fs::write(root.join("backup/v.mp4"), &video).unwrap();
    fs::write(root.join("photos/unique.raw"), vec![0x33u8; 3000]).unwrap();

    let (groups, progress, summary) = run_scan(DuplicateConfig::new(root, 1024)).await;

    assert_eq!(groups.len(), 2);
    for group in &groups {
        assert!(group.is_valid());
        assert!(group.files.iter().all(|f| f.size == group.size));
        let first = fingerprint(&group.files[0].path, group.size);
        assert_eq!(first, Some(group.fingerprint));
        for file in &group.files {
            assert_eq!(fingerprint(&file.path, file.size), first);
        }
    }

    let mut counts: Vec<_> = groups.iter().map(|g| g.count()).collect();
    counts.sort();
    assert_eq!(counts, vec![2, 3]);
    assert_eq!(summary.total_savings, 3000 * 2 + 5000);

    assert!(progress.iter().all(|p| (0.0..=1.0).contains(p)));
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_hidden_files_ignored_by_default() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let content = vec![5u8; 2048];
    fs::write(root.join("visible"), &content).unwrap();
    fs::write(root.join(".hidden"), &content).unwrap();

    let (groups, _, _) = run_scan(DuplicateConfig::new(root, 1024)).await;
    assert!(groups.is_empty());

    let config = DuplicateConfig::builder()
        .root(root)
        .min_size(1024u64)
        .include_hidden(true)
        .build()
        .unwrap();
    let (groups, _, _) = run_scan(config).await;
    assert_eq!(groups.len(), 1);
}

#[tokio::test]
async fn test_stop_ends_scan_cancelled() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    for i in 0..200 {
        fs::write(root.join(format!("f{i:03}")), vec![(i % 7) as u8; 1500]).unwrap();
    }

    let mut scanner = DuplicateScanner::new();
    let mut handle = scanner.start(DuplicateConfig::new(root, 1024));
    scanner.stop();
    assert!(!scanner.is_running());

    let mut summary = None;
    while let Some(event) = handle.recv().await {
        if let DuplicateEvent::Completed(s) = event {
            summary = Some(s);
        }
    }
    // A worker that raced past the stop must have finished the whole tree.
    if let Some(summary) = summary {
        assert!(summary.cancelled || summary.groups_found == 7);
    }
}

#[tokio::test]
async fn test_not_a_directory_fails() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("plain.txt");
    fs::write(&file, b"not a dir").unwrap();

    let mut scanner = DuplicateScanner::new();
    let mut handle = scanner.start(DuplicateConfig::new(Path::new(&file), 0));

    let mut failed = false;
    while let Some(event) = handle.recv().await {
        if let DuplicateEvent::Failed(_) = event {
            failed = true;
        }
    }
    assert!(failed);
}
