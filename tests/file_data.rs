use chrono::{TimeZone, Utc};
use serde_json::json;
use filedata::*;

fn delete_by(user: &str) -> TrackingProps {
    TrackingProps::new(TrackingType::Delete, user, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
}

fn text_op(f: impl FnOnce(&mut TextOperation)) -> EditOperation {
    let mut op = TextOperation::new();
    f(&mut op);
    op.into()
}

fn content(data: &FileData) -> String {
    data.get_content(GetContentOptions::default()).unwrap().into_owned()
}

#[tokio::test]
async fn hash_to_eager_loads_content_and_ranges() {
    let store = MemoryBlobStore::new();
    let mut file = StringFileData::new("hello world");
    file.comments_mut().add("c1", Comment::new([Range::new(0, 5)], true));
    file.tracked_changes_mut().add(TrackedChange::new(Range::new(5, 6), delete_by("u1"))).unwrap();

    let stored = FileData::String(file.clone()).store(&store).await.unwrap();
    assert!(stored.ranges_hash().is_some());
    assert_eq!(store.write_count(), 2);

    let hash = FileData::Hash(stored);
    let eager = hash.to_eager(&store).await.unwrap();
    assert_eq!(eager, FileData::String(file));

    let filtered = eager.get_content(GetContentOptions { filter_tracked_deletes: true }).unwrap();
    assert_eq!(filtered, "hello");
}

#[tokio::test]
async fn store_without_ranges_writes_one_blob() {
    let store = MemoryBlobStore::new();
    let mut data = FileData::String(StringFileData::new("just text"));
    let stored = data.store(&store).await.unwrap();
    assert_eq!(stored.ranges_hash(), None);
    assert_eq!(store.write_count(), 1);
    assert_eq!(serde_json::to_value(stored.to_raw()).unwrap(), json!({"hash": stored.hash()}));
}

#[tokio::test]
async fn hash_to_lazy_picks_text_or_binary() {
    let store = MemoryBlobStore::new();
    let text = store.put_string("abc").await.unwrap();
    let binary = store.put_bytes(&[0, 1, 2, 3]).unwrap();

    let lazy = FileData::Hash(HashFileData::new(text.hash(), None)).to_lazy(&store).await.unwrap();
    assert_eq!(lazy, FileData::LazyString(LazyStringFileData::new(text.hash(), None, 3)));

    let bin = FileData::Hash(HashFileData::new(binary.hash(), None)).to_lazy(&store).await.unwrap();
    assert_eq!(bin, FileData::Binary(BinaryFileData::new(binary.hash(), 4)));
    // Binary data is as loaded as it gets.
    assert_eq!(bin.to_eager(&store).await.unwrap(), bin);
    assert_eq!(bin.to_lazy(&store).await.unwrap(), bin);
}

#[tokio::test]
async fn hash_to_hollow_only_needs_metadata() {
    let store = MemoryBlobStore::new();
    let text = store.put_string("日本").await.unwrap();
    let binary = store.put_bytes(&[9; 12]).unwrap();

    let hollow = FileData::Hash(HashFileData::new(text.hash(), None)).to_hollow(&store).await.unwrap();
    assert_eq!(hollow, FileData::HollowString(HollowStringFileData::new(2)));

    let hollow = FileData::Hash(HashFileData::new(binary.hash(), None)).to_hollow(&store).await.unwrap();
    assert_eq!(hollow, FileData::HollowBinary(HollowBinaryFileData::new(12)));
    assert_eq!(hollow.to_hollow(&store).await.unwrap(), hollow);
}

#[tokio::test]
async fn missing_blobs() {
    let store = MemoryBlobStore::new();
    let missing = "0".repeat(40);

    let err = FileData::Hash(HashFileData::new(missing.clone(), None)).to_lazy(&store).await.unwrap_err();
    assert!(matches!(err, FileDataError::BlobNotFound(h) if h == missing));

    // The content exists but the ranges blob doesn't.
    let text = store.put_string("abc").await.unwrap();
    let err = FileData::Hash(HashFileData::new(text.hash(), Some(missing.clone()))).to_eager(&store).await.unwrap_err();
    assert!(matches!(err, FileDataError::BlobNotFound(h) if h == missing));

    let lazy = FileData::LazyString(LazyStringFileData::new(missing.clone(), None, 3));
    assert!(matches!(lazy.to_eager(&store).await, Err(FileDataError::BlobNotFound(_))));
}

#[tokio::test]
async fn binary_blobs_ignore_ranges_hash() {
    let store = MemoryBlobStore::new();
    let binary = store.put_bytes(&[0, 1, 2]).unwrap();
    let hash = FileData::Hash(HashFileData::new(binary.hash(), Some("0".repeat(40))));

    let expected = FileData::Binary(BinaryFileData::new(binary.hash(), 3));
    assert_eq!(hash.to_lazy(&store).await.unwrap(), expected);
    assert_eq!(hash.to_eager(&store).await.unwrap(), expected);
}

#[tokio::test]
async fn lazy_edits_are_replayed() {
    let store = MemoryBlobStore::new();
    let blob = store.put_string("hello").await.unwrap();
    let mut lazy = FileData::from_raw(serde_json::from_value(json!({"hash": blob.hash(), "stringLength": 5})).unwrap()).unwrap();

    lazy.edit(text_op(|op| { op.retain(5).insert(" world").unwrap(); })).unwrap();
    lazy.edit(EditOperation::AddComment { comment_id: "c1".into(), ranges: vec![Range::new(6, 5)], resolved: false }).unwrap();
    lazy.edit(text_op(|op| { op.retain(11).insert("!").unwrap(); })).unwrap();
    assert_eq!(lazy.get_string_length(), Some(12));
    assert_eq!(store.write_count(), 1);

    // Queued operations survive a trip through the raw form.
    let raw = serde_json::to_value(&lazy).unwrap();
    assert_eq!(raw["operations"].as_array().unwrap().len(), 3);
    let lazy: FileData = serde_json::from_value(raw).unwrap();

    let eager = lazy.to_eager(&store).await.unwrap();
    assert_eq!(content(&eager), "hello world!");
    let comment = eager.get_comments().unwrap().get("c1").unwrap();
    assert_eq!(comment.ranges.as_slice(), &[Range::new(6, 5)]);
}

#[tokio::test]
async fn lazy_edit_checks_length() {
    let mut lazy = FileData::LazyString(LazyStringFileData::new("h", None, 5));
    let err = lazy.edit(text_op(|op| { op.retain(4); })).unwrap_err();
    assert!(matches!(err, FileDataError::Apply { .. }));
    assert_eq!(lazy.get_string_length(), Some(5));
}

#[tokio::test]
async fn lazy_store_without_operations_writes_nothing() {
    let store = MemoryBlobStore::new();
    let mut lazy = FileData::LazyString(LazyStringFileData::new("a".repeat(40), Some("b".repeat(40)), 5));
    let stored = lazy.store(&store).await.unwrap();
    assert_eq!(stored, HashFileData::new("a".repeat(40), Some("b".repeat(40))));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn lazy_store_with_operations_writes_new_blobs() {
    let store = MemoryBlobStore::new();
    let blob = store.put_string("abc").await.unwrap();
    let mut lazy = FileData::LazyString(LazyStringFileData::new(blob.hash(), None, 3));
    lazy.edit(text_op(|op| { op.retain(3).insert("def").unwrap(); })).unwrap();

    let stored = lazy.store(&store).await.unwrap();
    assert_ne!(stored.hash(), blob.hash());
    assert_eq!(stored.ranges_hash(), None);
    assert_eq!(store.write_count(), 2);
    assert_eq!(store.get_string(stored.hash()).await.unwrap(), "abcdef");

    // The lazy file now points at the new blob with an empty queue.
    assert_eq!(lazy, FileData::LazyString(LazyStringFileData::new(stored.hash(), None, 6)));
    lazy.store(&store).await.unwrap();
    assert_eq!(store.write_count(), 2);
}

#[tokio::test]
async fn string_to_lazy_and_back() {
    let store = MemoryBlobStore::new();
    let mut file = StringFileData::new("some text");
    file.comments_mut().add("c1", Comment::new([Range::new(5, 4)], false));
    let eager = FileData::String(file);

    let lazy = eager.to_lazy(&store).await.unwrap();
    assert_eq!(lazy.get_string_length(), Some(9));
    assert!(lazy.get_ranges_hash().is_some());
    assert_eq!(lazy.to_eager(&store).await.unwrap(), eager);

    assert_eq!(eager.to_hollow(&store).await.unwrap(), FileData::HollowString(HollowStringFileData::new(9)));
    assert_eq!(lazy.to_hollow(&store).await.unwrap(), FileData::HollowString(HollowStringFileData::new(9)));
}

#[tokio::test]
async fn hollow_files_cant_load() {
    let store = MemoryBlobStore::new();
    let mut hollow = FileData::create_hollow(10, Some(10));
    assert!(matches!(hollow.to_eager(&store).await, Err(FileDataError::NotImplemented { operation: "to_eager", .. })));
    assert!(matches!(hollow.to_lazy(&store).await, Err(FileDataError::NotImplemented { .. })));
    assert!(matches!(hollow.store(&store).await, Err(FileDataError::NotImplemented { kind: "hollow string", .. })));
    assert!(hollow.is_editable());

    let binary = FileData::create_hollow(10, None);
    assert!(!binary.is_editable());
    assert_eq!(binary.get_byte_length(), Some(10));
}

#[tokio::test]
async fn binary_store_is_just_the_hash() {
    let store = MemoryBlobStore::new();
    let mut binary = FileData::Binary(BinaryFileData::new("h", 3));
    assert_eq!(binary.store(&store).await.unwrap(), HashFileData::new("h", None));
    assert_eq!(binary.to_hollow(&store).await.unwrap(), FileData::HollowBinary(HollowBinaryFileData::new(3)));
    assert_eq!(store.write_count(), 0);
}
