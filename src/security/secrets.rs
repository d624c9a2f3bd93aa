use anyhow::{Context, Result};
use chacha20poly1305::{
    ChaCha20Poly1305, KeyInit, Nonce,
    aead::{Aead, OsRng, rand_core::RngCore},
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

const KEY_FILE: &str = ".secret_key";
const KEY_LEN: usize = 32;
const ENC_PREFIX: &str = "ENC:";
const NONCE_LEN: usize = 12;

/// At-rest encryption for the secret phrase kept in `config.toml`.
///
/// Values are stored as `ENC:<hex(nonce || ciphertext)>`; the key lives next
/// to the config in an owner-only file created on first use.
pub struct SecretStore {
    root: PathBuf,
    encrypt: bool,
}

impl SecretStore {
    pub fn new(root: &Path, encrypt: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            encrypt,
        }
    }

    #[must_use]
    pub fn is_encrypted(value: &str) -> bool {
        value.starts_with(ENC_PREFIX)
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        if !self.encrypt || plaintext.is_empty() || Self::is_encrypted(plaintext) {
            return Ok(plaintext.to_string());
        }

        let cipher = self.cipher()?;
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| anyhow::anyhow!("encryption failed: {e}"))?;

        let mut sealed = nonce_bytes.to_vec();
        sealed.extend_from_slice(&ciphertext);
        Ok(format!("{ENC_PREFIX}{}", hex::encode(sealed)))
    }

    /// Decrypt an `ENC:` value; anything else is returned unchanged.
    pub fn decrypt(&self, value: &str) -> Result<String> {
        let Some(hex_str) = value.strip_prefix(ENC_PREFIX) else {
            return Ok(value.to_string());
        };

        let sealed = hex::decode(hex_str).context("invalid hex in encrypted value")?;
        if sealed.len() < NONCE_LEN {
            anyhow::bail!("encrypted value too short");
        }
        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);

        let plaintext = Zeroizing::new(
            self.cipher()?
                .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
                .map_err(|e| anyhow::anyhow!("decryption failed: {e}"))?,
        );

        String::from_utf8(plaintext.to_vec()).context("decrypted value is not valid UTF-8")
    }

    fn cipher(&self) -> Result<ChaCha20Poly1305> {
        let key = self.load_or_create_key()?;
        ChaCha20Poly1305::new_from_slice(&key).context("invalid key length")
    }

    fn key_path(&self) -> PathBuf {
        self.root.join(KEY_FILE)
    }

    fn read_key_file(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
        let hex_key = Zeroizing::new(fs::read_to_string(path).context("failed to read key file")?);
        let key = Zeroizing::new(hex::decode(hex_key.trim()).context("invalid hex in key file")?);
        if key.len() != KEY_LEN {
            anyhow::bail!("key file has invalid length (expected {KEY_LEN} bytes)");
        }
        Ok(key)
    }

    fn write_new_key_file(path: &Path, key: &[u8]) -> Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path).context("failed to create key file")?;
        file.write_all(hex::encode(key).as_bytes())
            .context("failed to write key file")?;
        file.sync_all().context("failed to sync key file")?;
        Self::enforce_key_permissions(path)
    }

    fn enforce_key_permissions(path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            fs::set_permissions(path, fs::Permissions::from_mode(0o600))
                .context("failed to set key file permissions")?;
        }
        #[cfg(not(unix))]
        let _ = path;
        Ok(())
    }

    fn load_or_create_key(&self) -> Result<Zeroizing<Vec<u8>>> {
        let path = self.key_path();
        if path.exists() {
            Self::enforce_key_permissions(&path)?;
            return Self::read_key_file(&path);
        }

        let mut key = Zeroizing::new(vec![0u8; KEY_LEN]);
        OsRng.fill_bytes(&mut key);
        match Self::write_new_key_file(&path, &key) {
            Ok(()) => Ok(key),
            // Another process created the key between the check and the write.
            Err(error)
                if error
                    .downcast_ref::<std::io::Error>()
                    .is_some_and(|io| io.kind() == std::io::ErrorKind::AlreadyExists) =>
            {
                Self::read_key_file(&path)
            }
            Err(error) => Err(error),
        }
    }
}
