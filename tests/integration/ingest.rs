use color_eyre::Result;
use drivetree_config::{InvalidRecordPolicy, Settings};
use drivetree_core::{BuildError, DuplicateDetector, Location, TreeBuilder, TreeKey, build_tree, parse_pages, statistics};
use drivetree_models::{MimeCategory, ValidationError};

/// Two pages as `files.list` would return them, sizes as strings.
const LISTING: &str = r#"[
  {
    "files": [
      {"id": "1photos_____________________", "name": "Photos",
       "mimeType": "application/vnd.google-apps.folder"},
      {"id": "1trip_______________________", "name": "Trip",
       "mimeType": "application/vnd.google-apps.folder",
       "parents": ["1photos_____________________"]},
      {"id": "1beach______________________", "name": "beach.jpg", "mimeType": "image/jpeg",
       "parents": ["1trip_______________________"], "size": "3000",
       "md5Checksum": "9e107d9d372bb6826bd81d3542a419d6"}
    ],
    "nextPageToken": "page-2"
  },
  {
    "files": [
      {"id": "1beachcopy__________________", "name": "beach (1).jpg", "mimeType": "image/jpeg",
       "parents": ["1photos_____________________"], "size": 3000,
       "md5Checksum": "9E107D9D372BB6826BD81D3542A419D6"},
      {"id": "1notes______________________", "name": "Notes",
       "mimeType": "application/vnd.google-apps.document",
       "parents": ["1photos_____________________"]},
      {"id": "1shared_____________________", "name": "clip.mp4", "mimeType": "video/mp4",
       "parents": ["1elsewhere__________________"], "size": "500",
       "md5Checksum": "e4d909c290d0fb1ca068ffaddf22cbd0"},
      {"id": "1binned_____________________", "name": "old.zip", "mimeType": "application/zip",
       "trashed": true, "size": "1", "md5Checksum": "d41d8cd98f00b204e9800998ecf8427e"}
    ]
  }
]"#;

#[test]
fn test_build_from_listing() -> Result<()> {
    let pages = parse_pages(LISTING)?;
    let (tree, report) = build_tree(&Settings::default(), pages)?;

    assert_eq!(report.pages, 2);
    assert_eq!(report.records, 7);
    assert_eq!(report.files, 3);
    assert_eq!(report.folders, 2);
    assert_eq!(report.trashed_skipped, 1);
    // The Docs editor file has neither size nor checksum.
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].id, "1notes______________________");
    assert_eq!(report.placeholders, 1);

    let photos = tree.lookup("1photos_____________________").expect("photos folder");
    assert_eq!(tree.size_of(photos), 6000);
    let trip = tree.lookup("1trip_______________________").expect("trip folder");
    assert_eq!(tree.size_of(trip), 3000);

    let drive = tree.get(Location::Top, &TreeKey::from("My Drive")).expect("root segment");
    let shared = tree.get(Location::Top, &TreeKey::from("Shared with me")).expect("orphan segment");
    assert_eq!(tree.size_of(drive), 6000);
    assert_eq!(tree.size_of(shared), 500);
    Ok(())
}

#[test]
fn test_duplicates_and_statistics_from_listing() -> Result<()> {
    let (tree, _) = build_tree(&Settings::default(), parse_pages(LISTING)?)?;

    let duplicates = DuplicateDetector::new().detect_in_tree(&tree);
    assert_eq!(duplicates.total_groups, 1);
    assert_eq!(duplicates.total_wasted_space, 3000);
    assert_eq!(duplicates.groups[0].files.len(), 2);

    let stats = statistics::collect(&tree, Some(&duplicates));
    assert_eq!(stats.total_files, 3);
    assert_eq!(stats.total_size, 6500);
    assert_eq!(stats.total_folders, 3);
    assert_eq!(stats.placeholder_folders, 1);
    assert_eq!(stats.category_sizes.get(&MimeCategory::Image), Some(&6000));
    assert_eq!(stats.category_counts.get(&MimeCategory::Video), Some(&1));
    assert_eq!(stats.duplicate_count, 1);
    Ok(())
}

#[test]
fn test_abort_policy_reports_offending_record() -> Result<()> {
    let settings = Settings {
        on_invalid: InvalidRecordPolicy::Abort,
        ..Settings::default()
    };
    let mut builder = TreeBuilder::new(&settings);
    let result = builder.ingest_all(parse_pages(LISTING)?);

    match result {
        Err(BuildError::Invalid { id, source }) => {
            assert_eq!(id, "1notes______________________");
            assert!(matches!(source, ValidationError::MissingField { field: "size", .. }));
        }
        other => panic!("expected an invalid record, got {other:?}"),
    }
    // Everything before the bad record made it in.
    assert_eq!(builder.report().files, 2);
    Ok(())
}

#[test]
fn test_include_trashed_setting() -> Result<()> {
    let settings = Settings {
        include_trashed: true,
        ..Settings::default()
    };
    let (tree, report) = build_tree(&settings, parse_pages(LISTING)?)?;
    assert_eq!(report.trashed_skipped, 0);
    assert!(tree.lookup("1binned_____________________").is_some());
    Ok(())
}
