use coolclean_core::{
    ContentHash, DuplicateConfig, DuplicateGroup, FileId, InodeInfo, ScanConfig, ScannedFile,
    Timestamps,
};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

#[test]
fn test_scanned_file_fields() {
    let now = SystemTime::now();
    let created = now - Duration::from_secs(3600);
    let file = ScannedFile::new_file(
        "/home/user/Movies/trip.mov",
        10 * 1024 * 1024,
        Timestamps::new(Some(now), Some(created)),
    );

    assert_eq!(file.name, "trip.mov");
    assert_eq!(file.path, PathBuf::from("/home/user/Movies/trip.mov"));
    assert_eq!(file.size, 10 * 1024 * 1024);
    assert!(!file.is_dir);
    assert_eq!(file.timestamps.modified, Some(now));
    assert_eq!(file.timestamps.created, Some(created));
}

#[test]
fn test_file_ids_increase() {
    let a = FileId::next();
    let b = FileId::next();
    assert!(b > a);
}

#[test]
fn test_group_savings_and_removal() {
    let files: Vec<ScannedFile> = ["a.bin", "b.bin", "c.bin"]
        .iter()
        .map(|n| ScannedFile::new_file(format!("/d/{n}"), 2000, Timestamps::default()))
        .collect();
    let keeper = files[0].id;
    let mut group = DuplicateGroup::new(ContentHash::new([7; 32]), 2000, files);

    assert_eq!(group.potential_savings(), 4000);
    assert_eq!(group.keeper().map(|f| f.id), Some(keeper));

    let last = group.files[2].id;
    group.remove_file(last);
    assert_eq!(group.potential_savings(), 2000);
    assert!(group.is_valid());
    assert!(!group.contains(last));
}

#[test]
fn test_inode_info() {
    let inode1 = InodeInfo::new(12345, 67890);
    let inode2 = InodeInfo::new(12345, 67890);
    assert_eq!(inode1, inode2);
}

#[test]
fn test_config_serde_defaults() {
    let config: ScanConfig = serde_json::from_str(r#"{"root": "/data"}"#).unwrap();
    assert_eq!(config.min_size, 0);
    assert!(!config.include_hidden);

    let dup: DuplicateConfig = serde_json::from_str(r#"{"root": "/data"}"#).unwrap();
    assert_eq!(dup.min_size, 1024);
    assert_eq!(dup.sample_size, 64 * 1024);
}
