use std::path::Path;
use std::process::Command;

use color_eyre::Result;
use tempfile::TempDir;

use drivetree_config::{PrunePolicy, Settings};
use drivetree_core::{JsonPageSource, TreeBuilder};

const FIRST_PAGE: &str = r#"{
  "files": [
    {"id": "1projects___________________", "name": "Projects",
     "mimeType": "application/vnd.google-apps.folder"},
    {"id": "1alpha______________________", "name": "Alpha",
     "mimeType": "application/vnd.google-apps.folder",
     "parents": ["1projects___________________"]},
    {"id": "1budget_____________________", "name": "budget.pdf", "mimeType": "application/pdf",
     "parents": ["1alpha______________________"], "size": "2048",
     "md5Checksum": "9e107d9d372bb6826bd81d3542a419d6"}
  ],
  "nextPageToken": "next"
}"#;

const SECOND_PAGE: &str = r#"{
  "files": [
    {"id": "1logo_______________________", "name": "logo.png", "mimeType": "image/png",
     "parents": ["1projects___________________", "1alpha______________________"], "size": "1024",
     "md5Checksum": "e4d909c290d0fb1ca068ffaddf22cbd0"}
  ]
}"#;

async fn write_fixture(dir: &Path) -> Result<()> {
    tokio::fs::write(dir.join("page1.json"), FIRST_PAGE).await?;
    tokio::fs::write(dir.join("page2.json"), SECOND_PAGE).await?;
    let settings = Settings {
        prune_policy: PrunePolicy::LastParent,
        root_segment: "Company Drive".to_string(),
        log_filter: "off".to_string(),
        ..Settings::default()
    };
    settings.save_to(&dir.join("config.toml"))?;
    Ok(())
}

#[tokio::test]
async fn test_pages_on_disk_to_tree() -> Result<()> {
    let dir = TempDir::new()?;
    write_fixture(dir.path()).await?;

    let settings = Settings::load_from(&dir.path().join("config.toml")).await?;
    assert_eq!(settings.prune_policy, PrunePolicy::LastParent);

    let source = JsonPageSource::new([dir.path().join("page1.json"), dir.path().join("page2.json")]);
    let mut builder = TreeBuilder::new(&settings);
    builder.ingest_all(source.load().await?)?;
    let (mut tree, report) = builder.finish()?;

    assert_eq!(report.files, 2);
    assert_eq!(report.folders, 2);
    assert!(report.rejected.is_empty());

    let projects = tree.lookup("1projects___________________").expect("projects");
    let alpha = tree.lookup("1alpha______________________").expect("alpha");
    // logo sits in both Alpha and Projects, but Projects counts it once.
    assert_eq!(tree.size_of(projects), 3072);
    assert_eq!(tree.size_of(alpha), 3072);

    let removal = tree.remove("1budget_____________________")?;
    assert!(removal.pruned.is_empty());
    assert_eq!(tree.size_of(projects), 1024);

    // Alpha is the last parent linked for logo, so it is the one pruned.
    let removal = tree.remove("1logo_______________________")?;
    assert_eq!(removal.pruned.len(), 1);
    assert!(tree.lookup("1alpha______________________").is_none());
    assert_eq!(tree.size_of(projects), 0);
    Ok(())
}

#[tokio::test]
async fn test_binary_prints_tree() -> Result<()> {
    let dir = TempDir::new()?;
    write_fixture(dir.path()).await?;

    let output = Command::new(env!("CARGO_BIN_EXE_drivetree"))
        .arg(dir.path().join("page1.json"))
        .arg(dir.path().join("page2.json"))
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .arg("--depth")
        .arg("3")
        .arg("--stats")
        .env_remove("RUST_LOG")
        .output()?;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("Company Drive (3.00 KB)\n"), "{stdout}");
    assert!(stdout.contains("└── Projects/  3.00 KB, 2 item(s)"), "{stdout}");
    assert!(stdout.contains("budget.pdf  2.00 KB"), "{stdout}");
    assert!(stdout.contains("Files: 2 (3.00 KB)"), "{stdout}");
    Ok(())
}

#[tokio::test]
async fn test_binary_without_item() -> Result<()> {
    let dir = TempDir::new()?;
    write_fixture(dir.path()).await?;

    let output = Command::new(env!("CARGO_BIN_EXE_drivetree"))
        .arg(dir.path().join("page1.json"))
        .arg(dir.path().join("page2.json"))
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .args(["--without", "1budget_____________________"])
        .env_remove("RUST_LOG")
        .output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("Company Drive (1.00 KB)\n"), "{stdout}");
    assert!(!stdout.contains("budget.pdf"), "{stdout}");
    Ok(())
}

#[tokio::test]
async fn test_binary_fails_on_missing_page() -> Result<()> {
    let dir = TempDir::new()?;
    write_fixture(dir.path()).await?;

    let output = Command::new(env!("CARGO_BIN_EXE_drivetree"))
        .arg(dir.path().join("absent.json"))
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .output()?;

    assert!(!output.status.success());
    Ok(())
}
