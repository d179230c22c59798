//! GPG + tar backed encryption and decryption.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

use crate::config::CryptoConfig;
use crate::directory::EncryptionMode;
use crate::error::{Result, SyncError};
use crate::job::SyncJob;
use crate::path::SyncPath;
use crate::security::{ARCHIVE_SUFFIX, CIPHERTEXT_SUFFIX};

use super::{run_status, ssh, Decryptor, EncryptedSource, Encryptor};

/// Encrypts for a single recipient, staging output below a temporary directory.
#[derive(Debug, Clone)]
pub struct GpgCipher {
    recipient: String,
    tmp_dir: PathBuf,
}

impl GpgCipher {
    /// Validate the crypto settings up front so a run never fails halfway
    /// through because of them.
    pub fn new(crypto: &CryptoConfig) -> Result<Self> {
        let recipient = crypto
            .recipient
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| SyncError::config("missing 'gpg.recipient'"))?;

        let tmp_dir = crypto
            .tmp_dir
            .as_ref()
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or_else(|| SyncError::config("missing 'gpg.tmp_dir'"))?;

        Ok(GpgCipher {
            recipient: recipient.to_string(),
            tmp_dir: tmp_dir.clone(),
        })
    }

    /// Where the encrypted form of `source` is staged: the source's absolute
    /// path mirrored below the temporary directory.
    pub fn staging_path(&self, source: &Path) -> PathBuf {
        let mut staged = self.tmp_dir.clone();
        for component in source.components() {
            if let Component::Normal(part) = component {
                staged.push(part);
            }
        }
        staged
    }

    pub fn encrypt_args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "--batch".into(),
            "--yes".into(),
            "--encrypt".into(),
            "--recipient".into(),
            self.recipient.clone(),
            "--output".into(),
            output.to_string_lossy().to_string(),
            input.to_string_lossy().to_string(),
        ]
    }

    fn encrypt_file(&self, input: &Path, output: &Path) -> Result<()> {
        // Ciphertexts are overwritten, never appended to
        if output.exists() {
            fs::remove_file(output)?;
            log::debug!("Old ciphertext removed: {}", output.display());
        }

        let mut command = Command::new("gpg");
        command.args(self.encrypt_args(input, output));
        run_status(&mut command, "gpg")?;

        if !output.exists() {
            return Err(SyncError::tool(
                "gpg",
                format!("encryption succeeded but ciphertext not found: {}", output.display()),
            ));
        }
        Ok(())
    }

    fn encrypt_as_archive(&self, input_dir: &Path, excludes: &[String]) -> Result<EncryptedSource> {
        log::debug!("Encryption in 'directory' mode");

        let staged = self.staging_path(input_dir);
        let archive_path = append_suffix(&staged, ARCHIVE_SUFFIX);
        let ciphertext_path = append_suffix(&archive_path, CIPHERTEXT_SUFFIX);
        if let Some(parent) = staged.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut tar = Command::new("tar");
        tar.args(tar_create_args(input_dir, &archive_path, excludes)?);
        run_status(&mut tar, "tar")?;

        self.encrypt_file(&archive_path, &ciphertext_path)?;
        fs::remove_file(&archive_path)?;

        Ok(EncryptedSource {
            path: SyncPath::local(ciphertext_path),
            is_archive: true,
        })
    }

    fn encrypt_files_individually(
        &self,
        input_dir: &Path,
        excludes: &[String],
    ) -> Result<EncryptedSource> {
        log::debug!("Encryption in 'file' mode");

        let output_dir = self.staging_path(input_dir);
        fs::create_dir_all(&output_dir)?;

        let walker = WalkDir::new(input_dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                let relative = entry.path().strip_prefix(input_dir).unwrap_or(entry.path());
                !is_excluded(relative, excludes)
            });

        for entry in walker {
            let entry = entry.map_err(|e| SyncError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(input_dir).unwrap_or(entry.path());
            let output = append_suffix(&output_dir.join(relative), CIPHERTEXT_SUFFIX);
            if let Some(parent) = output.parent() {
                fs::create_dir_all(parent)?;
            }
            self.encrypt_file(entry.path(), &output)?;
        }

        Ok(EncryptedSource {
            path: SyncPath::local(output_dir),
            is_archive: false,
        })
    }
}

impl Encryptor for GpgCipher {
    fn encrypt(&self, job: &SyncJob) -> Result<EncryptedSource> {
        log::debug!("Encrypting directory {}", job.source);

        if job.source.is_remote() {
            return Err(SyncError::tool(
                "gpg",
                format!("cannot encrypt remote source {}", job.source),
            ));
        }

        let input_dir = job.source.absolute();
        if !input_dir.is_dir() {
            return Err(SyncError::tool(
                "gpg",
                format!("directory to encrypt does not exist: {}", input_dir.display()),
            ));
        }

        match job.encryption_mode {
            EncryptionMode::DirectoryArchive => self.encrypt_as_archive(&input_dir, &job.excludes),
            EncryptionMode::PerFile => self.encrypt_files_individually(&input_dir, &job.excludes),
        }
    }
}

/// Decrypts ciphertexts in place with the operator's GPG keyring.
///
/// Needs no recipient or staging directory, so it is available even when
/// the configuration has no `gpg` section. Ciphertexts on a remote host are
/// decrypted there over ssh with the remote user's keyring.
#[derive(Debug, Default, Clone, Copy)]
pub struct GpgDecipher;

impl GpgDecipher {
    fn decrypt_local(&self, ciphertext: &Path, strip_top_level: bool) -> Result<()> {
        if !ciphertext.is_file() {
            return Err(SyncError::tool(
                "gpg",
                format!("ciphertext does not exist at {}", ciphertext.display()),
            ));
        }

        let plaintext = strip_suffix(ciphertext, CIPHERTEXT_SUFFIX);

        let mut gpg = Command::new("gpg");
        gpg.args(decrypt_args(ciphertext, &plaintext));
        run_status(&mut gpg, "gpg")?;
        fs::remove_file(ciphertext)?;

        // Archives come from directory-mode encryption and are unpacked in place
        if has_suffix(&plaintext, ARCHIVE_SUFFIX) {
            let target = plaintext.parent().unwrap_or_else(|| Path::new("."));
            let mut tar = Command::new("tar");
            tar.args(tar_extract_args(&plaintext, target, strip_top_level));
            run_status(&mut tar, "tar")?;
            fs::remove_file(&plaintext)?;
        }
        Ok(())
    }
}

impl Decryptor for GpgDecipher {
    fn decrypt(&self, ciphertext: &SyncPath, strip_top_level: bool) -> Result<()> {
        match ciphertext.endpoint() {
            None => self.decrypt_local(&ciphertext.absolute(), strip_top_level)?,
            Some(endpoint) => {
                let script = remote_decrypt_script(&ciphertext.absolute(), strip_top_level);
                ssh::remote_output(endpoint, &script)?;
            }
        }

        log::debug!("Successfully decrypted: {ciphertext}");
        Ok(())
    }
}

/// Shell script decrypting `ciphertext` on a remote host, the same steps
/// as a local decryption chained with `&&`.
pub fn remote_decrypt_script(ciphertext: &Path, strip_top_level: bool) -> String {
    let plaintext = strip_suffix(ciphertext, CIPHERTEXT_SUFFIX);
    let mut steps = vec![
        shell_command("test", &["-f".to_string(), ciphertext.to_string_lossy().to_string()]),
        shell_command("gpg", &decrypt_args(ciphertext, &plaintext)),
        shell_command("rm", &[ciphertext.to_string_lossy().to_string()]),
    ];

    if has_suffix(&plaintext, ARCHIVE_SUFFIX) {
        let target = plaintext.parent().unwrap_or_else(|| Path::new("."));
        steps.push(shell_command(
            "tar",
            &tar_extract_args(&plaintext, target, strip_top_level),
        ));
        steps.push(shell_command("rm", &[plaintext.to_string_lossy().to_string()]));
    }

    steps.join(" && ")
}

fn shell_command(program: &str, args: &[String]) -> String {
    let mut command = program.to_string();
    for arg in args {
        command.push(' ');
        command.push_str(&ssh::quote(arg));
    }
    command
}

/// `tar` arguments archiving `input_dir` as a single top-level directory.
pub fn tar_create_args(input_dir: &Path, archive: &Path, excludes: &[String]) -> Result<Vec<String>> {
    let name = input_dir
        .file_name()
        .ok_or_else(|| SyncError::tool("tar", format!("cannot archive {}", input_dir.display())))?
        .to_string_lossy()
        .to_string();
    let parent = input_dir.parent().unwrap_or_else(|| Path::new("/"));

    let mut args = vec![
        "-czf".to_string(),
        archive.to_string_lossy().to_string(),
        "-C".to_string(),
        parent.to_string_lossy().to_string(),
    ];
    for exclude in excludes {
        args.push("--exclude".into());
        args.push(format!("{name}/{}", exclude.trim_end_matches('/')));
    }
    args.push(name);
    Ok(args)
}

pub fn tar_extract_args(archive: &Path, target: &Path, strip_top_level: bool) -> Vec<String> {
    let mut args = vec!["-xzf".to_string(), archive.to_string_lossy().to_string()];
    if strip_top_level {
        args.push("--strip-components=1".into());
    }
    args.push("-C".into());
    args.push(target.to_string_lossy().to_string());
    args
}

pub fn decrypt_args(ciphertext: &Path, output: &Path) -> Vec<String> {
    vec![
        "--yes".into(),
        "--decrypt".into(),
        "--output".into(),
        output.to_string_lossy().to_string(),
        ciphertext.to_string_lossy().to_string(),
    ]
}

fn is_excluded(relative: &Path, excludes: &[String]) -> bool {
    excludes
        .iter()
        .any(|exclude| relative.starts_with(exclude.trim_end_matches('/')))
        && !relative.as_os_str().is_empty()
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase().ends_with(suffix))
        .unwrap_or(false)
}

fn strip_suffix(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if name.to_lowercase().ends_with(suffix) {
        path.with_file_name(&name[..name.len() - suffix.len()])
    } else {
        path.with_extension("")
    }
}
