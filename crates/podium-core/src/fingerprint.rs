use crate::model::ScoringPolicy;
use anyhow::Context;
use sha2::{Digest, Sha256};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Fingerprint {
    pub hex: String,
    pub components: Vec<String>,
}

impl Fingerprint {
    /// `sha256:<hex>`, the form written into reports.
    pub fn tagged(&self) -> String {
        format!("sha256:{}", self.hex)
    }
}

pub fn sha256_hex(s: &str) -> String {
    sha256_bytes_hex(s.as_bytes())
}

pub fn sha256_bytes_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

/// Identifies a scoring run by the content of its input files and the
/// policies applied to them. File order does not matter.
pub fn compute<P: AsRef<Path>>(inputs: &[P], policies: &[ScoringPolicy]) -> anyhow::Result<Fingerprint> {
    let mut files = Vec::with_capacity(inputs.len());
    for p in inputs {
        let p = p.as_ref();
        let bytes =
            std::fs::read(p).with_context(|| format!("failed to read {} for fingerprint", p.display()))?;
        files.push(format!("input={}", sha256_bytes_hex(&bytes)));
    }
    files.sort();

    let mut parts = files;
    let policies = serde_json::to_string(policies).context("failed to serialize scoring policies")?;
    parts.push(format!("policies={}", policies));
    // a scoring rule change invalidates old fingerprints
    parts.push(format!("podium_version={}", env!("CARGO_PKG_VERSION")));

    let hex = sha256_hex(&parts.join("\n"));
    Ok(Fingerprint {
        hex,
        components: parts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_fingerprint_ignores_file_order_and_tracks_content() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        std::fs::File::create(&a).unwrap().write_all(b"benchmark\nx\n").unwrap();
        std::fs::File::create(&b).unwrap().write_all(b"benchmark\ny\n").unwrap();

        let one = compute(&[&a, &b], &[]).unwrap();
        let two = compute(&[&b, &a], &[]).unwrap();
        assert_eq!(one.hex, two.hex);
        assert!(one.tagged().starts_with("sha256:"));
        assert_eq!(one.tagged().len(), "sha256:".len() + 64);

        std::fs::write(&b, "benchmark\nz\n").unwrap();
        let three = compute(&[&a, &b], &[]).unwrap();
        assert_ne!(one.hex, three.hex);
    }
}
