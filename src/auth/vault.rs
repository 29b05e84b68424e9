//! AES-256-GCM sealing for the on-disk settings file
//!
//! The key is derived from machine-specific identifiers, so a copied
//! session file does not open on another machine.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use anyhow::{Result, anyhow};
use rand::Rng;
use sha2::{Digest, Sha256};

const NONCE_SIZE: usize = 12;

/// Seed mixed into the key when no machine identifier can be read
const FALLBACK_SEED: &str = "planet-admin-fallback-key";

#[cfg(target_os = "linux")]
fn platform_id() -> Option<String> {
    ["/etc/machine-id", "/var/lib/dbus/machine-id"]
        .iter()
        .find_map(|path| std::fs::read_to_string(path).ok())
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

#[cfg(target_os = "macos")]
fn platform_id() -> Option<String> {
    let output = std::process::Command::new("ioreg")
        .args(["-rd1", "-c", "IOPlatformExpertDevice"])
        .output()
        .ok()?;
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .find(|line| line.contains("IOPlatformUUID"))
        .and_then(|line| line.split('"').nth(3))
        .map(str::to_string)
}

#[cfg(target_os = "windows")]
fn platform_id() -> Option<String> {
    let output = std::process::Command::new("reg")
        .args([
            "query",
            r"HKLM\SOFTWARE\Microsoft\Cryptography",
            "/v",
            "MachineGuid",
        ])
        .output()
        .ok()?;
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .find(|line| line.contains("MachineGuid"))
        .and_then(|line| line.split_whitespace().last())
        .map(str::to_string)
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn platform_id() -> Option<String> {
    None
}

/// Stable per-machine identifier the session key is bound to
fn machine_id() -> String {
    platform_id().unwrap_or_else(|| FALLBACK_SEED.to_string())
}

fn derive_key() -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(machine_id().as_bytes());
    if let Some(home) = dirs::home_dir() {
        hasher.update(home.to_string_lossy().as_bytes());
    }
    hasher.update(b"planet-admin-session-v1");
    hasher.finalize().into()
}

fn cipher() -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(&derive_key()).map_err(|_| anyhow!("Invalid key length"))
}

/// Encrypt `plaintext`, prefixing the random nonce
pub fn seal(plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rng().fill(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher()?
        .encrypt(nonce, plaintext)
        .map_err(|_| anyhow!("Failed to encrypt session"))?;

    let mut output = nonce_bytes.to_vec();
    output.extend(ciphertext);
    Ok(output)
}

/// Decrypt bytes produced by [`seal`]
pub fn open(sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_SIZE {
        return Err(anyhow!("Session file is truncated"));
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
    cipher()?
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| anyhow!("Failed to decrypt session"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_then_open() {
        let sealed = seal(b"{\"access_token\":\"abc\"}").unwrap();
        assert_ne!(&sealed[NONCE_SIZE..], b"{\"access_token\":\"abc\"}");
        assert_eq!(open(&sealed).unwrap(), b"{\"access_token\":\"abc\"}");
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let mut sealed = seal(b"secret").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0xff;
        assert!(open(&sealed).is_err());
        assert!(open(&sealed[..4]).is_err());
    }

    #[test]
    fn test_machine_id_is_stable() {
        assert!(!machine_id().is_empty());
        assert_eq!(machine_id(), machine_id());
    }
}
