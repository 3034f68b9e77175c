//! Tests for variant naming.

use darkroom_core::{RecordId, SizeVariantKind};
use darkroom_storage::{
    GroupedRandomSuffixNamingStrategy, SizeVariantNamingStrategy, companion_key, extension_of,
};

#[test]
fn test_variants_of_one_record_share_group_token() {
    let naming = GroupedRandomSuffixNamingStrategy;
    let record = RecordId::new();
    let token = GroupedRandomSuffixNamingStrategy::group_token(record);

    let thumb = naming.name(record, SizeVariantKind::Thumb, "jpg");
    let medium = naming.name(record, SizeVariantKind::Medium, "JPG");

    let expected_dirs = format!("{}/{}/{}", &token[0..2], &token[2..4], &token[4..16]);
    assert!(thumb.starts_with("thumb/"));
    assert!(medium.starts_with("medium/"));
    assert!(thumb.contains(&expected_dirs));
    assert!(medium.contains(&expected_dirs));
    assert!(medium.ends_with(".jpg"));
}

#[test]
fn test_random_suffix_differs_between_calls() {
    let naming = GroupedRandomSuffixNamingStrategy;
    let record = RecordId::new();

    let first = naming.name(record, SizeVariantKind::Small, "jpg");
    let second = naming.name(record, SizeVariantKind::Small, "jpg");
    assert_ne!(first, second);
}

#[test]
fn test_companion_key_keeps_directory_and_stem() {
    assert_eq!(
        companion_key("original/3f/a1/9c0e4b7d.jpg", "MOV"),
        "original/3f/a1/9c0e4b7d.mov"
    );
    assert_eq!(companion_key("photo.heic", ".mp4"), "photo.mp4");
}

#[test]
fn test_extension_of() {
    assert_eq!(extension_of("IMG_0001.HEIC").as_deref(), Some("heic"));
    assert_eq!(extension_of("dir.d/clip.mov").as_deref(), Some("mov"));
    assert_eq!(extension_of("README"), None);
    assert_eq!(extension_of(".hidden"), None);
}

#[test]
fn test_companion_key_never_replaces_the_image() {
    assert_eq!(
        companion_key("original/3f/a1/9c0e4b7d.mov", "mov"),
        "original/3f/a1/9c0e4b7d-live.mov"
    );
    assert_eq!(companion_key("clip.MOV", "mov"), "clip-live.mov");
}
