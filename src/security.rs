use serde::Serialize;

use crate::directory::DirectoryDescriptor;
use crate::error::{Result, SyncError};

/// Ending of every file produced by the encryption tool
pub const CIPHERTEXT_SUFFIX: &str = ".crypt";

/// Ending of the intermediate archive built in directory mode
pub const ARCHIVE_SUFFIX: &str = ".synchive";

/// What has to happen to data on its way to the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SecurityAction {
    pub encrypt: bool,
    pub decrypt: bool,
}

/// Decide whether data must be encrypted or decrypted.
///
/// Sensitive plaintext going to an untrusted destination is encrypted;
/// sensitive data going to a trusted destination is decrypted. Non-sensitive
/// data passes through untouched.
pub fn decide(
    is_sensitive: bool,
    already_ciphertext: bool,
    destination_trusted: bool,
) -> Result<SecurityAction> {
    let encrypt = is_sensitive && !destination_trusted && !already_ciphertext;
    let decrypt = is_sensitive && destination_trusted;

    if encrypt && decrypt {
        return Err(SyncError::InvariantViolation(
            "cannot encrypt and decrypt at the same time".to_string(),
        ));
    }

    Ok(SecurityAction { encrypt, decrypt })
}

/// Apply [`decide`] to a whole directory
pub fn check_security(
    directory: &DirectoryDescriptor,
    destination_trusted: bool,
) -> Result<SecurityAction> {
    let root = directory.root();
    let action = decide(
        directory.is_sensitive(),
        root.has_suffix(CIPHERTEXT_SUFFIX),
        destination_trusted,
    )?;

    log::debug!(
        "Encrypt: {}, Decrypt: {}, src: {}, dst_trusted: {}",
        action.encrypt,
        action.decrypt,
        root,
        destination_trusted
    );

    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::EncryptionMode;
    use rstest::rstest;
    use std::path::Path;

    #[rstest]
    #[case(false, false, false, false, false)]
    #[case(false, false, true, false, false)]
    #[case(false, true, false, false, false)]
    #[case(false, true, true, false, false)]
    #[case(true, false, false, true, false)]
    #[case(true, false, true, false, true)]
    #[case(true, true, false, false, false)]
    #[case(true, true, true, false, true)]
    fn test_decision_table(
        #[case] sensitive: bool,
        #[case] ciphertext: bool,
        #[case] trusted: bool,
        #[case] encrypt: bool,
        #[case] decrypt: bool,
    ) {
        let action = decide(sensitive, ciphertext, trusted).unwrap();
        assert_eq!(action, SecurityAction { encrypt, decrypt });
        assert!(!(action.encrypt && action.decrypt));
    }

    #[test]
    fn test_ciphertext_directory_is_not_encrypted_twice() {
        let mut warnings = Vec::new();
        let dir = DirectoryDescriptor::from_config(
            Path::new("/mnt/usb"),
            "docs.synchive.crypt",
            None,
            true,
            EncryptionMode::DirectoryArchive,
            &mut warnings,
        )
        .unwrap();

        let action = check_security(&dir, false).unwrap();
        assert!(!action.encrypt);
        assert!(!action.decrypt);
    }
}
