mod common;

use std::sync::Arc;

use bytes::Bytes;
use docshelf_cache::MemoryKvStore;
use docshelf_core::config::library::LibraryConfig;
use docshelf_core::error::ErrorKind;
use docshelf_core::traits::kv::KeyValueStore;
use docshelf_core::types::{FileId, FolderId, UuidV7Generator};
use docshelf_entity::{ChildRef, ViewMode};
use docshelf_service::codec::{from_durable, to_durable};
use docshelf_service::{DeleteOptions, ImportMode, LibraryService, PersistenceGateway};
use docshelf_storage::FileKvStore;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use common::{memory_service, open_service, pdf_bytes};

#[tokio::test]
async fn invariants_hold_through_a_mixed_session() {
    let (_, mut svc) = memory_service().await;

    let work = svc.create_folder(FolderId::ROOT, "Work").await.unwrap();
    let taxes = svc.create_folder(FolderId::ROOT, "Taxes").await.unwrap();
    let y2024 = svc.create_folder(taxes, "2024").await.unwrap();
    svc.library().check_invariants().unwrap();

    let a = svc
        .add_file(FolderId::ROOT, "a", pdf_bytes(1), None)
        .await
        .unwrap();
    let b = svc.add_file(y2024, "b.pdf", pdf_bytes(2), None).await.unwrap();
    svc.library().check_invariants().unwrap();

    svc.move_file(a, work).await.unwrap();
    svc.move_folder(y2024, work).await.unwrap();
    svc.rename_folder(work, "Office").await.unwrap();
    svc.rename_file(b, "receipt").await.unwrap();
    svc.library().check_invariants().unwrap();

    assert!(svc.move_folder(work, y2024).await.is_err());
    assert!(svc.create_folder(FolderId::ROOT, "office").await.is_err());
    svc.library().check_invariants().unwrap();

    let counts = svc
        .delete_folder(work, DeleteOptions::cascade())
        .await
        .unwrap();
    assert_eq!((counts.folders, counts.files), (2, 2));
    svc.delete_folder(taxes, DeleteOptions::default())
        .await
        .unwrap();
    svc.library().check_invariants().unwrap();
    assert_eq!(svc.library().folders().len(), 1);
    assert!(svc.library().files().is_empty());
}

const FOLDER_NAMES: [&str; 6] = ["Work", "work", "Taxes", "2024", "  ", ""];
const FILE_NAMES: [&str; 5] = ["scan", "scan.pdf", "Invoice.PDF", " ", "notes.txt"];

#[tokio::test]
async fn invariants_hold_through_generated_sessions() {
    let (_, mut svc) = memory_service().await;
    let mut rng = StdRng::seed_from_u64(0x00d0_c5e1f);

    // Ids are never removed from these lists, so deleted ids keep being
    // tried as unknown ones.
    let mut folders = vec![
        FolderId::ROOT,
        FolderId::from_uuid(uuid::Uuid::from_u128(u128::MAX)),
    ];
    let mut files = vec![FileId::from_uuid(uuid::Uuid::from_u128(u128::MAX - 1))];
    let (mut succeeded, mut failed) = (0, 0);

    for step in 0..400 {
        let before = to_durable(svc.library()).unwrap();
        let folder = *folders.choose(&mut rng).unwrap();
        let other = *folders.choose(&mut rng).unwrap();
        let file = *files.choose(&mut rng).unwrap();
        let folder_name = *FOLDER_NAMES.choose(&mut rng).unwrap();
        let file_name = *FILE_NAMES.choose(&mut rng).unwrap();

        let result = match rng.gen_range(0..10) {
            0 | 1 => svc
                .create_folder(folder, folder_name)
                .await
                .map(|id| folders.push(id)),
            2 => svc.rename_folder(folder, folder_name).await,
            3 => svc.move_folder(folder, other).await,
            4 => {
                let options = DeleteOptions {
                    cascade: rng.gen_bool(0.3),
                };
                svc.delete_folder(folder, options).await.map(|_| ())
            }
            5 | 6 => svc
                .add_file(folder, file_name, pdf_bytes(rng.gen_range(1..4)), None)
                .await
                .map(|id| files.push(id)),
            7 => svc.rename_file(file, file_name).await,
            8 => match rng.gen_range(0..3) {
                0 => svc.delete_file(file).await,
                1 => svc.set_current_folder(folder).await,
                _ => svc.move_file(file, other).await,
            },
            _ => svc.move_file(file, folder).await,
        };

        if let Err(e) = svc.library().check_invariants() {
            panic!("step {step}: invariants broken after {result:?}: {e}");
        }
        match result {
            Ok(()) => succeeded += 1,
            Err(_) => {
                failed += 1;
                assert_eq!(
                    to_durable(svc.library()).unwrap(),
                    before,
                    "step {step}: failed operation changed the library"
                );
            }
        }
    }

    assert!(succeeded > 25, "only {succeeded} operations succeeded");
    assert!(failed > 25, "only {failed} operations failed");
}

#[tokio::test]
async fn durable_roundtrip_is_identity() {
    let (_, mut svc) = memory_service().await;
    let x = svc.create_folder(FolderId::ROOT, "X").await.unwrap();
    svc.add_file(x, "one.pdf", pdf_bytes(1), Some(Bytes::from_static(b"png")))
        .await
        .unwrap();
    svc.add_file(FolderId::ROOT, "two.pdf", Bytes::new(), None)
        .await
        .unwrap();
    svc.set_view_mode(ViewMode::List).await.unwrap();
    svc.set_current_folder(x).await.unwrap();

    let lib = svc.library();
    assert_eq!(&from_durable(&to_durable(lib).unwrap()).unwrap(), lib);
}

#[tokio::test]
async fn moving_a_file_updates_both_listings() {
    let (_, mut svc) = memory_service().await;
    let x = svc.create_folder(FolderId::ROOT, "X").await.unwrap();
    let a = svc
        .add_file(FolderId::ROOT, "a.pdf", pdf_bytes(1), None)
        .await
        .unwrap();

    svc.move_file(a, x).await.unwrap();

    let lib = svc.library();
    assert!(lib.list_files(FolderId::ROOT, None).is_empty());
    assert_eq!(lib.list_files(x, None)[0].id, a);
    assert_eq!(lib.file_count(FolderId::ROOT), 0);
    assert_eq!(lib.file_count(x), 1);
}

#[tokio::test]
async fn deleting_unknown_file_leaves_durable_state_unchanged() {
    let (store, mut svc) = memory_service().await;
    svc.add_file(FolderId::ROOT, "keep.pdf", pdf_bytes(1), None)
        .await
        .unwrap();
    let key = LibraryConfig::default().storage_key;
    let before = store.get(&key).await.unwrap();
    let snapshot = to_durable(svc.library()).unwrap();

    let err = svc
        .delete_file(FileId::from_uuid(uuid::Uuid::from_u128(4242)))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(to_durable(svc.library()).unwrap(), snapshot);
    assert_eq!(store.get(&key).await.unwrap(), before);
}

#[tokio::test]
async fn import_without_file_collection_is_rejected() {
    let (_, mut svc) = memory_service().await;
    svc.create_folder(FolderId::ROOT, "Keep").await.unwrap();
    let before = svc.library().clone();

    let err = svc
        .import_backup(br#"{"version":"1.0","folders":[]}"#, ImportMode::Replace)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidFormat);
    assert_eq!(svc.library(), &before);
}

#[tokio::test]
async fn capacity_failure_keeps_memory_and_durable_state() {
    let store = MemoryKvStore::with_quota(4_096);
    let mut svc = open_service(Arc::new(store.clone())).await;
    svc.add_file(FolderId::ROOT, "small.pdf", pdf_bytes(1), None)
        .await
        .unwrap();
    let key = LibraryConfig::default().storage_key;
    let stored = store.get(&key).await.unwrap();
    let before = svc.library().clone();

    let err = svc
        .add_file(
            FolderId::ROOT,
            "huge.pdf",
            Bytes::from(vec![7u8; 8_192]),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::CapacityExceeded);
    assert_eq!(svc.library(), &before);
    assert_eq!(store.get(&key).await.unwrap(), stored);
}

#[tokio::test]
async fn merge_import_adds_unknown_entities_under_root() {
    let (_, mut source) = memory_service().await;
    let shared = source.create_folder(FolderId::ROOT, "Shared").await.unwrap();
    source
        .add_file(shared, "s.pdf", pdf_bytes(1), None)
        .await
        .unwrap();
    source
        .add_file(FolderId::ROOT, "top.pdf", pdf_bytes(1), None)
        .await
        .unwrap();
    let backup = source.export_backup().unwrap();

    let config = LibraryConfig::default();
    let gateway = PersistenceGateway::new(Arc::new(MemoryKvStore::new()), &config);
    let mut target = LibraryService::open(gateway, Arc::new(UuidV7Generator), config).await;
    target.create_folder(FolderId::ROOT, "Mine").await.unwrap();

    let summary = target
        .import_backup(&backup, ImportMode::Merge)
        .await
        .unwrap();
    assert_eq!((summary.folders, summary.files), (1, 2));

    let lib = target.library();
    lib.check_invariants().unwrap();
    assert_eq!(lib.folders().len(), 3);
    assert_eq!(lib.files().len(), 2);
    assert!(lib.root().contains(&ChildRef::Folder(shared)));
    assert_eq!(lib.total_file_count(FolderId::ROOT), 2);

    let again = target
        .import_backup(&backup, ImportMode::Merge)
        .await
        .unwrap();
    assert_eq!((again.folders, again.files), (0, 0));
}

#[tokio::test]
async fn merge_with_clashing_folder_name_is_rejected() {
    let (_, mut source) = memory_service().await;
    source.create_folder(FolderId::ROOT, "Reports").await.unwrap();
    let backup = source.export_backup().unwrap();

    let config = LibraryConfig::default();
    let gateway = PersistenceGateway::new(Arc::new(MemoryKvStore::new()), &config);
    let mut target = LibraryService::open(gateway, Arc::new(UuidV7Generator), config).await;
    target.create_folder(FolderId::ROOT, "reports").await.unwrap();
    let before = target.library().clone();

    let err = target
        .import_backup(&backup, ImportMode::Merge)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidFormat);
    assert_eq!(target.library(), &before);
}

#[tokio::test]
async fn library_survives_reopening_a_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_str().unwrap().to_string();
    let config = LibraryConfig::default();

    let store: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::new(&path, None).await.unwrap());
    let gateway = PersistenceGateway::new(store, &config);
    let mut first = LibraryService::open(gateway, Arc::new(UuidV7Generator), config.clone()).await;
    let folder = first.create_folder(FolderId::ROOT, "Scans").await.unwrap();
    let file = first
        .add_file(folder, "scan.pdf", pdf_bytes(3), None)
        .await
        .unwrap();
    let expected = first.library().clone();
    drop(first);

    let store: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::new(&path, None).await.unwrap());
    let gateway = PersistenceGateway::new(store, &config);
    let second = LibraryService::open(gateway, Arc::new(UuidV7Generator), config).await;
    assert_eq!(second.library(), &expected);
    assert_eq!(second.download_file(file).unwrap().data, pdf_bytes(3));
}

#[tokio::test]
async fn clear_resets_to_root_only() {
    let (store, mut svc) = memory_service().await;
    svc.create_folder(FolderId::ROOT, "Gone").await.unwrap();

    svc.clear().await.unwrap();
    assert_eq!(svc.library().folders().len(), 1);
    assert_eq!(svc.library().root().name, "My Documents");
    assert!(!store
        .exists(&LibraryConfig::default().storage_key)
        .await
        .unwrap());
}
