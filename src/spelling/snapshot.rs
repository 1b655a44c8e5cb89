//! Binary snapshots of a built index.
//!
//! Layout, little endian:
//!
//! ```text
//! magic "SYMC" | version u32 | header_len u64 | header | body_len u64 | body_crc32 u32 | body
//! ```
//!
//! Header and body are bincode encoded. The header carries the configuration,
//! the name of the distance oracle and a probe of the variant hasher; if the
//! probe differs on load, the variant table is recomputed from the stored terms.
//! An index built with a custom oracle can only be reopened through
//! [`SpellIndex::load_with_oracle`].

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpellError};
use crate::spelling::config::SpellConfig;
use crate::spelling::dictionary::{TermDictionary, TermId, variant_hash};
use crate::spelling::distance::DistanceOracle;
use crate::spelling::index::SpellIndex;

const MAGIC: &[u8; 4] = b"SYMC";
const FORMAT_VERSION: u32 = 1;
const HASH_PROBE: &str = "symcompound";

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotHeader {
    config: SpellConfig,
    term_count: u64,
    max_length: u64,
    hash_probe: u64,
    oracle: String,
}

#[derive(Serialize)]
struct SnapshotBodyRef<'a> {
    terms: &'a [String],
    counts: &'a [u64],
    variants: Vec<(u64, Vec<TermId>)>,
}

#[derive(Deserialize)]
struct SnapshotBody {
    terms: Vec<String>,
    counts: Vec<u64>,
    variants: Vec<(u64, Vec<TermId>)>,
}

impl SpellIndex {
    /// Save the index to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_snapshot(&mut writer)?;
        writer.flush()?;

        info!("saved {} terms to {}", self.len(), path.display());
        Ok(())
    }

    /// Write a snapshot to any writer.
    pub fn write_snapshot<W: Write>(&self, writer: &mut W) -> Result<()> {
        let dictionary = self.dictionary();

        let header = SnapshotHeader {
            config: self.config().clone(),
            term_count: dictionary.len() as u64,
            max_length: dictionary.max_length() as u64,
            hash_probe: variant_hash(HASH_PROBE),
            oracle: self.oracle().name().to_string(),
        };
        let body = SnapshotBodyRef {
            terms: dictionary.terms(),
            counts: dictionary.counts(),
            variants: dictionary.variant_table(),
        };

        let header_bytes = bincode::serialize(&header)?;
        let body_bytes = bincode::serialize(&body)?;

        writer.write_all(MAGIC)?;
        writer.write_u32::<LittleEndian>(FORMAT_VERSION)?;
        writer.write_u64::<LittleEndian>(header_bytes.len() as u64)?;
        writer.write_all(&header_bytes)?;
        writer.write_u64::<LittleEndian>(body_bytes.len() as u64)?;
        writer.write_u32::<LittleEndian>(crc32fast::hash(&body_bytes))?;
        writer.write_all(&body_bytes)?;
        Ok(())
    }

    /// Load an index saved with [`SpellIndex::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_snapshot(path.as_ref(), None)
    }

    /// Load an index and verify candidates with a custom oracle.
    pub fn load_with_oracle<P: AsRef<Path>>(
        path: P,
        oracle: Arc<dyn DistanceOracle>,
    ) -> Result<Self> {
        Self::load_snapshot(path.as_ref(), Some(oracle))
    }

    fn load_snapshot(path: &Path, oracle: Option<Arc<dyn DistanceOracle>>) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let index = Self::read_snapshot(&mut reader, oracle)?;

        info!("loaded {} terms from {}", index.len(), path.display());
        Ok(index)
    }

    /// Read a snapshot from any reader.
    pub fn read_snapshot<R: Read>(
        reader: &mut R,
        oracle: Option<Arc<dyn DistanceOracle>>,
    ) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(SpellError::snapshot("not a symcompound snapshot"));
        }

        let version = reader.read_u32::<LittleEndian>()?;
        if version != FORMAT_VERSION {
            return Err(SpellError::snapshot(format!(
                "unsupported snapshot version {version}, expected {FORMAT_VERSION}"
            )));
        }

        let header_len = reader.read_u64::<LittleEndian>()?;
        let header_bytes = read_section(reader, header_len, "header")?;
        let header: SnapshotHeader = bincode::deserialize(&header_bytes)?;
        header.config.validate()?;

        let body_len = reader.read_u64::<LittleEndian>()?;
        let checksum = reader.read_u32::<LittleEndian>()?;
        let body_bytes = read_section(reader, body_len, "body")?;
        if crc32fast::hash(&body_bytes) != checksum {
            return Err(SpellError::snapshot("body checksum mismatch"));
        }
        let body: SnapshotBody = bincode::deserialize(&body_bytes)?;

        if body.terms.len() as u64 != header.term_count {
            return Err(SpellError::snapshot(format!(
                "header announces {} terms, body holds {}",
                header.term_count,
                body.terms.len()
            )));
        }

        let mut dictionary = TermDictionary::from_parts(body.terms, body.counts, body.variants)?;
        if dictionary.max_length() as u64 != header.max_length {
            return Err(SpellError::snapshot("max term length does not match header"));
        }

        let config = header.config;
        if header.hash_probe != variant_hash(HASH_PROBE) {
            warn!("snapshot was written with a different variant hasher, rebuilding variants");
            dictionary.reindex(config.prefix_length, config.max_dictionary_edit_distance);
        }

        let oracle = match oracle {
            Some(oracle) => oracle,
            None if header.oracle == config.distance.name() => config.distance.oracle(),
            None => {
                return Err(SpellError::snapshot(format!(
                    "snapshot was built with the '{}' oracle, load it with load_with_oracle",
                    header.oracle
                )));
            }
        };
        Ok(SpellIndex::from_parts(config, dictionary, oracle))
    }
}

fn read_section<R: Read>(reader: &mut R, len: u64, name: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.by_ref().take(len).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != len {
        return Err(SpellError::snapshot(format!(
            "truncated {name}: expected {len} bytes, found {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spelling::distance::{DistanceAlgorithm, Levenshtein};
    use crate::spelling::suggest::Verbosity;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn sample_index() -> SpellIndex {
        SpellIndex::build(
            SpellConfig::new(2, 6).with_distance(DistanceAlgorithm::DamerauLevenshtein),
            [
                ("the", 100),
                ("cat", 80),
                ("sat", 50),
                ("spelling", 12),
                ("a", 7),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.symc");

        let index = sample_index();
        index.save(&path).unwrap();
        let loaded = SpellIndex::load(&path).unwrap();

        assert_eq!(loaded.config(), index.config());
        assert_eq!(loaded.len(), index.len());
        assert_eq!(loaded.max_length(), index.max_length());
        assert_eq!(loaded.oracle().name(), "damerau-levenshtein");
        assert_eq!(
            loaded.dictionary().variant_table(),
            index.dictionary().variant_table()
        );

        for query in ["teh", "ct", "speling", "b", "the", "xyz"] {
            for verbosity in [Verbosity::Top, Verbosity::Closest, Verbosity::All] {
                let expected = index.lookup(query, 2, verbosity);
                let actual = loaded.lookup(query, 2, verbosity);
                assert_eq!(
                    format!("{expected:?}"),
                    format!("{actual:?}"),
                    "query {query}"
                );
            }
        }
    }

    #[test]
    fn test_load_with_oracle() {
        let mut buffer = Vec::new();
        sample_index().write_snapshot(&mut buffer).unwrap();

        let loaded =
            SpellIndex::read_snapshot(&mut Cursor::new(buffer), Some(Arc::new(Levenshtein)))
                .unwrap();
        assert_eq!(loaded.oracle().name(), "levenshtein");
    }

    #[test]
    fn test_rejects_bad_magic() {
        let bytes = b"NOPE\x01\x00\x00\x00".to_vec();
        let result = SpellIndex::read_snapshot(&mut Cursor::new(bytes), None);
        assert!(matches!(result, Err(SpellError::Snapshot(_))));
    }

    #[test]
    fn test_rejects_corrupt_body() {
        let mut buffer = Vec::new();
        sample_index().write_snapshot(&mut buffer).unwrap();
        let last = buffer.len() - 1;
        buffer[last] ^= 0xff;

        let result = SpellIndex::read_snapshot(&mut Cursor::new(buffer), None);
        assert!(matches!(result, Err(SpellError::Snapshot(_))));
    }

    #[test]
    fn test_rejects_truncated_snapshot() {
        let mut buffer = Vec::new();
        sample_index().write_snapshot(&mut buffer).unwrap();
        buffer.truncate(buffer.len() / 2);

        assert!(SpellIndex::read_snapshot(&mut Cursor::new(buffer), None).is_err());
    }

    #[test]
    fn test_custom_oracle_requires_explicit_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.symc");

        let mut builder = SpellIndex::builder(SpellConfig::default())
            .unwrap()
            .with_oracle(Arc::new(Levenshtein));
        builder.add_term("the", 100);
        let index = builder.build();
        index.save(&path).unwrap();

        let result = SpellIndex::load(&path);
        assert!(matches!(result, Err(SpellError::Snapshot(_))));

        let loaded = SpellIndex::load_with_oracle(&path, Arc::new(Levenshtein)).unwrap();
        assert_eq!(loaded.oracle().name(), "levenshtein");
        assert!(index.lookup("teh", 1, Verbosity::All).is_empty());
        assert!(loaded.lookup("teh", 1, Verbosity::All).is_empty());
        assert_eq!(
            format!("{:?}", index.lookup("teh", 2, Verbosity::All)),
            format!("{:?}", loaded.lookup("teh", 2, Verbosity::All))
        );
    }

    /// Re-frame a snapshot with a foreign hasher probe and variant keys that
    /// no longer match the local hasher.
    fn with_foreign_hasher(buffer: &[u8]) -> Vec<u8> {
        let mut reader = Cursor::new(buffer);
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).unwrap();
        let version = reader.read_u32::<LittleEndian>().unwrap();
        let header_len = reader.read_u64::<LittleEndian>().unwrap();
        let header_bytes = read_section(&mut reader, header_len, "header").unwrap();
        let mut header: SnapshotHeader = bincode::deserialize(&header_bytes).unwrap();
        let body_len = reader.read_u64::<LittleEndian>().unwrap();
        let _checksum = reader.read_u32::<LittleEndian>().unwrap();
        let body_bytes = read_section(&mut reader, body_len, "body").unwrap();
        let body: SnapshotBody = bincode::deserialize(&body_bytes).unwrap();

        header.hash_probe ^= 0x9e37_79b9_7f4a_7c15;
        let foreign = SnapshotBodyRef {
            terms: &body.terms,
            counts: &body.counts,
            variants: body
                .variants
                .into_iter()
                .map(|(hash, ids)| (hash ^ 0x9e37_79b9_7f4a_7c15, ids))
                .collect(),
        };
        let header_bytes = bincode::serialize(&header).unwrap();
        let body_bytes = bincode::serialize(&foreign).unwrap();

        let mut out = Vec::new();
        out.write_all(&magic).unwrap();
        out.write_u32::<LittleEndian>(version).unwrap();
        out.write_u64::<LittleEndian>(header_bytes.len() as u64).unwrap();
        out.write_all(&header_bytes).unwrap();
        out.write_u64::<LittleEndian>(body_bytes.len() as u64).unwrap();
        out.write_u32::<LittleEndian>(crc32fast::hash(&body_bytes)).unwrap();
        out.write_all(&body_bytes).unwrap();
        out
    }

    #[test]
    fn test_foreign_hasher_rebuilds_variants() {
        let index = sample_index();
        let mut buffer = Vec::new();
        index.write_snapshot(&mut buffer).unwrap();
        let foreign = with_foreign_hasher(&buffer);

        let loaded = SpellIndex::read_snapshot(&mut Cursor::new(foreign), None).unwrap();
        assert_eq!(
            loaded.dictionary().variant_table(),
            index.dictionary().variant_table()
        );

        for query in ["teh", "ct", "speling", "b", "the", "xyz"] {
            for verbosity in [Verbosity::Top, Verbosity::Closest, Verbosity::All] {
                assert_eq!(
                    format!("{:?}", index.lookup(query, 2, verbosity)),
                    format!("{:?}", loaded.lookup(query, 2, verbosity)),
                    "query {query}"
                );
            }
        }
        assert_eq!(index.correct_text("thecat sat", 2), loaded.correct_text("thecat sat", 2));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(SpellIndex::load(dir.path().join("missing.symc")).is_err());
    }
}
