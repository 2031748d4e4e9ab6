//! Persistence Integration Tests
//!
//! Tests for the text file formats, skip-and-continue loading and
//! save/load round-trips through a fresh engine.

use biblioteca::core::CatalogEngine;
use biblioteca::domain::{Resource, ResourceState, User};
use biblioteca::store::{DataFiles, RecordError};
use tempfile::TempDir;

#[tokio::test]
async fn test_resource_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("recursos.txt");

    let originals = vec![
        Resource::book("b1", "Dune", "Frank Herbert"),
        Resource::magazine("m1", "Wired", 42),
        Resource::dvd("d1", "Alien", 117),
        Resource::book("b2", "Good Omens", "Pratchett, Gaiman"),
    ];

    let mut engine = CatalogEngine::new();
    for r in &originals {
        assert!(engine.add_resource(r.clone()));
    }
    assert_eq!(engine.save_resources(&path).await.unwrap(), 4);

    let mut fresh = CatalogEngine::new();
    let report = fresh.load_resources(&path).await.unwrap();

    assert!(report.is_clean());
    assert_eq!(report.loaded, 4);
    assert_eq!(fresh.resources(), originals.as_slice());
}

#[tokio::test]
async fn test_user_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("usuarios.txt");

    let mut engine = CatalogEngine::new();
    engine.add_user(User::new("u1", "Ada"));
    engine.add_user(User::new("u2", "Hopper, Grace"));
    engine.save_users(&path).await.unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "u1,Ada\nu2,Hopper, Grace\n");

    let mut fresh = CatalogEngine::new();
    fresh.load_users(&path).await.unwrap();
    assert_eq!(fresh.users(), engine.users());
}

#[tokio::test]
async fn test_multiline_name_cannot_forge_records() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("usuarios.txt");

    let mut engine = CatalogEngine::new();
    engine.add_user(User::new("u1", "Ada"));
    assert!(!engine.add_user(User::new("u9", "Eve\nu2,Mallory")));
    engine.save_users(&path).await.unwrap();

    let mut fresh = CatalogEngine::new();
    let report = fresh.load_users(&path).await.unwrap();

    assert!(report.is_clean());
    assert_eq!(fresh.users(), &[User::new("u1", "Ada")]);
    assert!(fresh.get_user("u2").is_none());
}

#[tokio::test]
async fn test_latin1_line_skipped_rest_loads() {
    let temp = TempDir::new().unwrap();
    let files = DataFiles::in_dir(temp.path());
    std::fs::write(&files.users, b"u1,Jos\xe9\nu2,Ada\n").unwrap();
    std::fs::write(&files.resources, b"LIBRO,b1,Cien a\xf1os,GGM\nDVD,d1,Alien,117\n").unwrap();

    let mut engine = CatalogEngine::new();
    let reports = engine.load_all(&files).await.unwrap();

    assert_eq!(reports[0].skipped[0].reason, RecordError::InvalidEncoding);
    assert_eq!(reports[1].skipped[0].reason, RecordError::InvalidEncoding);
    assert_eq!(engine.users(), &[User::new("u2", "Ada")]);
    assert!(engine.get_resource("b1").is_none());
    assert!(engine.get_resource("d1").is_some());
}

#[tokio::test]
async fn test_bad_magazine_line_is_skipped() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("recursos.txt");
    std::fs::write(
        &path,
        "LIBRO,b1,Dune,Herbert\nREVISTA,m1,Wired,notanumber\nrevista,m2,Byte,9\nDVD,d1\n",
    )
    .unwrap();

    let mut engine = CatalogEngine::new();
    let report = engine.load_resources(&path).await.unwrap();

    assert!(!report.missing);
    assert_eq!(report.loaded, 2);
    assert!(engine.get_resource("m1").is_none());
    assert!(engine.get_resource("m2").is_some());

    assert_eq!(report.skipped.len(), 2);
    assert_eq!(
        report.skipped[0].reason,
        RecordError::InvalidNumber("notanumber".to_string())
    );
    assert!(matches!(
        report.skipped[1].reason,
        RecordError::FieldCount { .. }
    ));
    assert_eq!(report.invalid_numbers().count(), 1);
}

#[tokio::test]
async fn test_missing_files_load_as_empty() {
    let temp = TempDir::new().unwrap();
    let files = DataFiles::in_dir(temp.path());

    let mut engine = CatalogEngine::new();
    let reports = engine.load_all(&files).await.unwrap();

    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.missing && r.loaded == 0));
    assert!(engine.resources().is_empty());
    assert!(engine.users().is_empty());
}

#[tokio::test]
async fn test_full_snapshot_restores_loans() {
    let temp = TempDir::new().unwrap();
    let files = DataFiles::in_dir(temp.path().join("data"));

    let mut engine = CatalogEngine::new();
    engine.add_user(User::new("u1", "Ada"));
    engine.add_resource(Resource::book("b1", "Dune", "Herbert"));
    engine.add_resource(Resource::magazine("m1", "Wired", 42));
    engine.loan("b1", "u1").unwrap();
    engine.save_all(&files).await.unwrap();

    let mut fresh = CatalogEngine::new();
    fresh.load_all(&files).await.unwrap();

    assert_eq!(fresh.get_resource("b1").unwrap().state(), ResourceState::Loaned);
    assert_eq!(fresh.get_resource("m1").unwrap().state(), ResourceState::Available);
    assert_eq!(fresh.history(), engine.history());

    // The reloaded loan can be returned like any other
    fresh.return_resource("b1").unwrap();
    assert!(fresh.history()[0].is_returned());
}

#[tokio::test]
async fn test_save_overwrites_previous_content() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("usuarios.txt");
    std::fs::write(&path, "old,Stale\nold2,Stale\n").unwrap();

    let mut engine = CatalogEngine::new();
    engine.add_user(User::new("u1", "Ada"));
    engine.save_users(&path).await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "u1,Ada\n");
}
