//! Hashing (§4.6): the chunk content hash lives on `Chunk` itself
//! (`chunkhound_core::types::Chunk::content_hash_of`); this module owns the
//! file-level *sample hash* used by the change detector (§4.3 step 6).

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// SHA-256 over the first `sample_kb` KiB, the last `sample_kb` KiB, and
/// the decimal file size — or the whole file when it's no larger than
/// `2 * sample_kb` KiB (§4.6).
pub fn sample_hash_file(path: &Path, sample_kb: u64) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();
    let sample_bytes = sample_kb.saturating_mul(1024);

    let mut hasher = Sha256::new();
    if size <= sample_bytes.saturating_mul(2) {
        io::copy(&mut file, &mut hasher)?;
    } else {
        let mut head = vec![0u8; sample_bytes as usize];
        file.read_exact(&mut head)?;
        hasher.update(&head);

        let mut tail = vec![0u8; sample_bytes as usize];
        file.seek(SeekFrom::End(-(sample_bytes as i64)))?;
        file.read_exact(&mut tail)?;
        hasher.update(&tail);
    }
    hasher.update(size.to_string().as_bytes());
    Ok(hasher.finalize().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn small_file_hashes_whole_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"hello world").unwrap();
        let hash = sample_hash_file(&path, 64).unwrap();
        assert_eq!(hash.len(), 32);
    }

    #[test]
    fn identical_content_produces_identical_hash() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, b"same bytes").unwrap();
        std::fs::write(&b, b"same bytes").unwrap();
        assert_eq!(sample_hash_file(&a, 64).unwrap(), sample_hash_file(&b, 64).unwrap());
    }

    #[test]
    fn large_file_only_samples_head_and_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let sample_kb = 1u64;
        let mut f = File::create(&path).unwrap();
        // Larger than 2 * sample_kb so only head/tail/size are hashed; a
        // change in the untouched middle must not affect the hash.
        let mut content = vec![0u8; (sample_kb * 1024 * 3) as usize];
        content[0] = 1;
        *content.last_mut().unwrap() = 2;
        f.write_all(&content).unwrap();
        drop(f);
        let before = sample_hash_file(&path, sample_kb).unwrap();

        let middle = content.len() / 2;
        content[middle] = 99;
        std::fs::write(&path, &content).unwrap();
        let after = sample_hash_file(&path, sample_kb).unwrap();
        assert_eq!(before, after);
    }
}
