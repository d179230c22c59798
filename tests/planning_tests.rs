use std::fs;
use std::path::Path;
use tempfile::TempDir;

use syncbuddy::config::SyncConfig;
use syncbuddy::directory::DirectoryDescriptor;
use syncbuddy::error::{Result, SyncError};
use syncbuddy::matching::DestinationChooser;
use syncbuddy::pick::{apply_pick_mode, LocationArg};
use syncbuddy::sync::{plan_locations, RunOptions};
use syncbuddy::tools::SystemFileSystem;

/// Chooser for runs that must not prompt
struct NoPrompt;

impl DestinationChooser for NoPrompt {
    fn choose(
        &mut self,
        source: &DirectoryDescriptor,
        _candidates: &[&DirectoryDescriptor],
    ) -> Result<usize> {
        panic!("unexpected prompt for {}", source.root());
    }
}

/// Always picks the first candidate
struct First;

impl DestinationChooser for First {
    fn choose(
        &mut self,
        _source: &DirectoryDescriptor,
        _candidates: &[&DirectoryDescriptor],
    ) -> Result<usize> {
        Ok(0)
    }
}

/// Laptop home with photos (private/ inside) and a fully sensitive vault
fn create_laptop(root: &Path) {
    fs::create_dir_all(root.join("photos/private")).unwrap();
    fs::create_dir_all(root.join("photos/cache")).unwrap();
    fs::write(root.join("photos/beach.jpg"), b"jpg").unwrap();
    fs::write(root.join("photos/private/id.jpg"), b"jpg").unwrap();
    fs::create_dir_all(root.join("vault")).unwrap();
    fs::write(root.join("vault/keys.txt"), b"secret").unwrap();
}

fn config(laptop: &Path, usb: &Path, usb_trusted: bool) -> SyncConfig {
    let yaml = format!(
        r#"
gpg:
  recipient: alice@example.org
  tmp_dir: /tmp/syncbuddy-test
locations:
  laptop:
    root_dir: {laptop}
    trusted: true
    dirs:
      - path: photos
        exclude_folders: [cache, thumbnails, ~]
        sensitive_folders: [private]
      - path: vault/
        sensitive: true
        encryption_mode: directory
  usb:
    root_dir: {usb}
    trusted: {usb_trusted}
    dirs:
      - path: photos
      - path: vault
        sensitive: true
"#,
        laptop = laptop.display(),
        usb = usb.display(),
    );
    SyncConfig::from_yaml(&yaml).unwrap()
}

#[test]
fn test_untrusted_destination_gets_encrypted_split_jobs() {
    let laptop = TempDir::new().unwrap();
    let usb = TempDir::new().unwrap();
    create_laptop(laptop.path());

    let config = config(laptop.path(), usb.path(), false);
    let plan = plan_locations(
        &config,
        "laptop",
        "usb",
        &RunOptions::default(),
        &SystemFileSystem,
        &mut NoPrompt,
    )
    .unwrap();

    assert_eq!(plan.jobs.len(), 3);

    let photos = &plan.jobs[0];
    assert!(!photos.encrypt);
    assert_eq!(photos.excludes, vec!["cache", "thumbnails", "private"]);
    assert_eq!(photos.destination.absolute(), usb.path().join("photos"));

    let private = &plan.jobs[1];
    assert!(private.encrypt);
    assert!(!private.decrypt);
    assert_eq!(private.source.absolute(), laptop.path().join("photos/private"));
    assert_eq!(private.destination.absolute(), usb.path().join("photos/private"));

    let vault = &plan.jobs[2];
    assert!(vault.encrypt);
    assert_eq!(vault.encryption_mode.to_string(), "directory");

    // trailing slash, null exclude entry, missing thumbnails/
    assert!(plan.warnings.iter().any(|w| w.contains("thumbnails")));
    assert!(plan.warnings.len() >= 3);
}

#[test]
fn test_trusted_destination_keeps_private_in_primary_job() {
    let laptop = TempDir::new().unwrap();
    let usb = TempDir::new().unwrap();
    create_laptop(laptop.path());

    let config = config(laptop.path(), usb.path(), true);
    let plan = plan_locations(
        &config,
        "laptop",
        "usb",
        &RunOptions::default(),
        &SystemFileSystem,
        &mut NoPrompt,
    )
    .unwrap();

    assert_eq!(plan.jobs.len(), 2);
    assert_eq!(plan.jobs[0].excludes, vec!["cache", "thumbnails"]);
    assert!(plan.jobs.iter().all(|job| !job.encrypt));
    assert!(plan.jobs[1].decrypt);
}

#[test]
fn test_missing_source_directory_is_skipped_then_unmatched() {
    let laptop = TempDir::new().unwrap();
    let usb = TempDir::new().unwrap();
    fs::create_dir_all(laptop.path().join("vault")).unwrap();

    // photos/ is missing, so vault is paired with usb's photos by position
    let config = config(laptop.path(), usb.path(), false);
    let err = plan_locations(
        &config,
        "laptop",
        "usb",
        &RunOptions::default(),
        &SystemFileSystem,
        &mut NoPrompt,
    )
    .unwrap_err();

    assert!(matches!(err, SyncError::Match(_)));
}

#[test]
fn test_manual_matching_pairs_by_sensitivity() {
    let laptop = TempDir::new().unwrap();
    let usb = TempDir::new().unwrap();
    fs::create_dir_all(laptop.path().join("vault")).unwrap();

    let config = config(laptop.path(), usb.path(), false);
    let options = RunOptions {
        manual_matching: true,
        ..Default::default()
    };
    let plan = plan_locations(&config, "laptop", "usb", &options, &SystemFileSystem, &mut First)
        .unwrap();

    assert_eq!(plan.jobs.len(), 1);
    assert_eq!(plan.jobs[0].destination.absolute(), usb.path().join("vault"));
}

#[test]
fn test_missing_recipient_fails_before_anything_runs() {
    let laptop = TempDir::new().unwrap();
    let usb = TempDir::new().unwrap();
    create_laptop(laptop.path());

    let mut config = config(laptop.path(), usb.path(), false);
    config.gpg.recipient = None;

    let err = plan_locations(
        &config,
        "laptop",
        "usb",
        &RunOptions::default(),
        &SystemFileSystem,
        &mut NoPrompt,
    )
    .unwrap_err();
    assert!(matches!(err, SyncError::Configuration(_)));
}

#[test]
fn test_absolute_exclude_is_configuration_error() {
    let laptop = TempDir::new().unwrap();
    let usb = TempDir::new().unwrap();
    create_laptop(laptop.path());

    let mut config = config(laptop.path(), usb.path(), false);
    if let Some(laptop) = config.locations.get_mut("laptop") {
        laptop.dirs[0].exclude_folders = Some(vec![Some("/etc".to_string())]);
    }

    let err = plan_locations(
        &config,
        "laptop",
        "usb",
        &RunOptions::default(),
        &SystemFileSystem,
        &mut NoPrompt,
    )
    .unwrap_err();
    assert!(matches!(err, SyncError::Configuration(_)));
}

#[test]
fn test_picked_ciphertext_is_decrypted_into_directory() {
    let laptop = TempDir::new().unwrap();
    let usb = TempDir::new().unwrap();
    fs::write(usb.path().join("vault.synchive.crypt"), b"gpg").unwrap();

    let config = config(laptop.path(), usb.path(), true);
    let picked = apply_pick_mode(
        &config,
        &LocationArg::parse("usb:vault.synchive.crypt").unwrap(),
        &LocationArg::parse("laptop:restore").unwrap(),
        false,
    )
    .unwrap();

    let plan = plan_locations(
        &picked,
        "usb",
        "laptop",
        &RunOptions::default(),
        &SystemFileSystem,
        &mut NoPrompt,
    )
    .unwrap();

    assert_eq!(plan.jobs.len(), 1);
    let job = &plan.jobs[0];
    assert!(job.decrypt);
    assert!(!job.encrypt);
    assert!(job.destination_trusted);
    assert_eq!(job.source.absolute(), usb.path().join("vault.synchive.crypt"));
    assert_eq!(job.destination.absolute(), laptop.path().join("restore"));
}

#[test]
fn test_unknown_location_lists_available_names() {
    let laptop = TempDir::new().unwrap();
    let usb = TempDir::new().unwrap();
    let config = config(laptop.path(), usb.path(), true);

    let err = plan_locations(
        &config,
        "laptop",
        "phone",
        &RunOptions::default(),
        &SystemFileSystem,
        &mut NoPrompt,
    )
    .unwrap_err();
    assert!(err.to_string().contains("laptop, usb"));
}
