//! Tests for the in-memory media repository.

mod test_utils;

use darkroom_core::{Dimensions, MediaType, SizeVariant, SizeVariantKind};
use darkroom_interface::MediaRepository;
use test_utils::{Harness, stored_record};

fn variant(record: &darkroom_core::MediaRecord, kind: SizeVariantKind) -> SizeVariant {
    SizeVariant {
        record_id: record.id,
        kind,
        storage_path: format!("{}/{}.jpg", kind, record.id),
        width: 200,
        height: 200,
        file_size: Some(1024),
    }
}

#[tokio::test]
async fn test_duplicate_variant_is_a_unique_violation() {
    let harness = Harness::new();
    let record = stored_record(&harness, MediaType::Image, None, 0).await;
    let repo = &harness.repository;

    repo.insert_variant(&variant(&record, SizeVariantKind::Thumb))
        .await
        .unwrap();
    let err = repo
        .insert_variant(&variant(&record, SizeVariantKind::Thumb))
        .await
        .unwrap_err();

    assert!(err.is_unique_violation());
    assert_eq!(repo.variant_count().await, 1);
}

#[tokio::test]
async fn test_variants_are_listed_smallest_first() {
    let harness = Harness::new();
    let record = stored_record(&harness, MediaType::Image, None, 0).await;
    let repo = &harness.repository;

    for kind in [
        SizeVariantKind::Original,
        SizeVariantKind::Small,
        SizeVariantKind::Thumb,
    ] {
        repo.insert_variant(&variant(&record, kind)).await.unwrap();
    }

    let kinds: Vec<SizeVariantKind> = repo
        .list_variants(record.id)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            SizeVariantKind::Thumb,
            SizeVariantKind::Small,
            SizeVariantKind::Original
        ]
    );
}

#[tokio::test]
async fn test_delete_cascades_to_variants() {
    let harness = Harness::new();
    let record = stored_record(&harness, MediaType::Image, None, 0).await;
    let repo = &harness.repository;
    repo.insert_variant(&variant(&record, SizeVariantKind::Thumb))
        .await
        .unwrap();

    repo.delete_record(record.id).await.unwrap();

    assert!(repo.is_empty().await);
    assert_eq!(repo.variant_count().await, 0);
    assert!(repo.delete_record(record.id).await.is_err());
}

#[tokio::test]
async fn test_variant_requires_record() {
    let harness = Harness::new();
    let record = stored_record(&harness, MediaType::Image, None, 0).await;
    harness.repository.delete_record(record.id).await.unwrap();

    assert!(
        harness
            .repository
            .insert_variant(&variant(&record, SizeVariantKind::Thumb))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_missing_variant_query_respects_type_order_and_limit() {
    let harness = Harness::new();
    let repo = &harness.repository;
    let oldest = stored_record(&harness, MediaType::Image, Some(Dimensions::new(10, 10)), 90).await;
    let done = stored_record(&harness, MediaType::Image, None, 60).await;
    let middle = stored_record(&harness, MediaType::Image, None, 30).await;
    stored_record(&harness, MediaType::Image, None, 10).await;
    stored_record(&harness, MediaType::Video, None, 120).await;
    repo.insert_variant(&variant(&done, SizeVariantKind::Thumb))
        .await
        .unwrap();

    let missing = repo
        .records_missing_variant(SizeVariantKind::Thumb, MediaType::Image, 2)
        .await
        .unwrap();

    let ids: Vec<_> = missing.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![oldest.id, middle.id]);
}

#[tokio::test]
async fn test_paired_records_are_not_partners() {
    let harness = Harness::new();
    let repo = &harness.repository;
    let mut image = stored_record(&harness, MediaType::Image, None, 0).await;
    image.live_companion_id = Some("live-1".to_string());
    repo.update_record(&image).await.unwrap();

    assert_eq!(
        repo.find_live_partners("live-1", MediaType::Image)
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(
        repo.find_live_partners("live-1", MediaType::Video)
            .await
            .unwrap()
            .is_empty()
    );

    image.live = darkroom_core::LiveState::PairedAsImage {
        companion: darkroom_core::CompanionRef {
            storage_path: "original/ab/cd/live.mov".to_string(),
            mime_type: "video/quicktime".to_string(),
            file_size: 10,
        },
    };
    repo.update_record(&image).await.unwrap();
    assert!(
        repo.find_live_partners("live-1", MediaType::Image)
            .await
            .unwrap()
            .is_empty()
    );
}
