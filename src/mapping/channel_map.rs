// src/mapping/channel_map.rs
use crate::error::{Result, RidfError};
use crate::mapping::config_file::{ConfigTokenizer, Token};
use crate::mapping::{HardwareKey, LogicalKey};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Lookup table from hardware addresses to logical detector addresses.
///
/// Built once from a primary map configuration and read-only afterwards.
/// Later insertions of the same hardware key replace earlier ones.
///
/// # Configuration format
///
/// The primary file lists `(map file, record count)` pairs, terminated by a
/// blank path, a zero count or the end of the file:
///
/// ```text
/// # file              records
/// map/ppac.map        4
/// map/plastic.map     2
/// ```
///
/// Each map file holds groups of a `category, detector` line followed by
/// `records` lines of `id0, id1, id2, geometry, channel`:
///
/// ```text
/// 1, 2
/// 0, 0, 0, 10, 20
/// 1, 0, 0, 11, 21
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChannelMap {
    entries: HashMap<HardwareKey, LogicalKey>,
}

impl ChannelMap {
    /// Number of hardware identifiers in one map record
    pub const IDS_PER_RECORD: usize = 5;

    pub fn new() -> Self {
        Self::default()
    }

    /// Load the primary configuration at `path` and every map file it lists.
    ///
    /// Any missing map file or malformed line fails the whole load; a
    /// partially filled table is never returned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut primary = ConfigTokenizer::open(path, ConfigTokenizer::WHITESPACE)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut map = ChannelMap::new();

        while let Some(file_token) = primary.next_token() {
            let Some(count_token) = primary.next_token() else {
                break;
            };
            let count = parse_count(&primary, &count_token)?;
            if count == 0 {
                break;
            }

            let map_path = resolve_map_path(&base_dir, &file_token.text);
            if !map_path.is_file() {
                return Err(RidfError::MissingMapFile(map_path));
            }
            let mut map_file = ConfigTokenizer::open(&map_path, ConfigTokenizer::MAP_DELIMITERS)?;
            map.load_map_file(&mut map_file, count)?;
        }

        tracing::info!(
            path = %path.display(),
            entries = map.len(),
            "map table loaded"
        );
        Ok(map)
    }

    fn load_map_file(&mut self, file: &mut ConfigTokenizer, count: usize) -> Result<()> {
        while let Some(category_token) = file.next_token() {
            let category_id = parse_int(file, &category_token)?;
            let detector_token = next_on_line(file, category_token.line, "detector ID")?;
            let detector_id = parse_int(file, &detector_token)?;

            for slot in 0..count {
                let first = file.next_token().ok_or_else(|| {
                    RidfError::config(
                        file.path(),
                        category_token.line,
                        format!("expected {} records for category {}, found {}", count, category_id, slot),
                    )
                })?;

                let mut ids = [0i32; Self::IDS_PER_RECORD];
                ids[0] = parse_int(file, &first)?;
                for id in ids.iter_mut().skip(1) {
                    let token = next_on_line(file, first.line, "identifier")?;
                    *id = parse_int(file, &token)?;
                }

                self.insert(
                    HardwareKey::from_ids(ids),
                    LogicalKey::new(category_id, detector_id, slot as i32),
                );
            }
        }
        Ok(())
    }

    /// Insert a mapping, returning the entry it replaced
    pub fn insert(&mut self, hardware: HardwareKey, logical: LogicalKey) -> Option<LogicalKey> {
        self.entries.insert(hardware, logical)
    }

    pub fn resolve(&self, key: &HardwareKey) -> Option<LogicalKey> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HardwareKey, &LogicalKey)> {
        self.entries.iter()
    }
}

impl FromIterator<(HardwareKey, LogicalKey)> for ChannelMap {
    fn from_iter<I: IntoIterator<Item = (HardwareKey, LogicalKey)>>(iter: I) -> Self {
        let mut map = ChannelMap::new();
        for (hardware, logical) in iter {
            map.insert(hardware, logical);
        }
        map
    }
}

fn resolve_map_path(base_dir: &Path, name: &str) -> PathBuf {
    let path = PathBuf::from(name);
    if path.is_relative() && !path.exists() {
        let candidate = base_dir.join(&path);
        if candidate.exists() {
            return candidate;
        }
    }
    path
}

fn next_on_line(file: &mut ConfigTokenizer, line: usize, what: &str) -> Result<Token> {
    match file.next_token() {
        Some(token) if token.line == line => Ok(token),
        _ => Err(RidfError::config(file.path(), line, format!("missing {}", what))),
    }
}

fn parse_int(file: &ConfigTokenizer, token: &Token) -> Result<i32> {
    token.text.parse::<i32>().map_err(|_| {
        RidfError::config(file.path(), token.line, format!("expected an integer, found '{}'", token.text))
    })
}

fn parse_count(file: &ConfigTokenizer, token: &Token) -> Result<usize> {
    token.text.parse::<usize>().map_err(|_| {
        RidfError::config(file.path(), token.line, format!("invalid record count '{}'", token.text))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, primary: &str, maps: &[(&str, &str)]) -> PathBuf {
        for (name, content) in maps {
            fs::write(dir.path().join(name), content).unwrap();
        }
        let path = dir.path().join("mapper.conf");
        fs::write(&path, primary).unwrap();
        path
    }

    #[test]
    fn test_load_two_slots() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "ppac.map 2\n",
            &[("ppac.map", "1, 2\n0, 0, 0, 10, 20\n1, 0, 0, 11, 21\n")],
        );

        let map = ChannelMap::load(&path).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.resolve(&HardwareKey::new(0, 10, 20)),
            Some(LogicalKey::new(1, 2, 0))
        );
        assert_eq!(
            map.resolve(&HardwareKey::new(1 << 20, 11, 21)),
            Some(LogicalKey::new(1, 2, 1))
        );
        assert_eq!(map.resolve(&HardwareKey::new(0, 10, 21)), None);
    }

    #[test]
    fn test_zero_count_ends_list() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "a.map 1\nend 0\nmissing.map 1\n",
            &[("a.map", "3 4\n0 0 1 0 0\n")],
        );

        let map = ChannelMap::load(&path).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_multiple_groups_per_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "# comment line\nsi.map 1 # one channel per detector\n",
            &[("si.map", "5, 0\n0, 1, 0, 0, 0\n5, 1\n0, 1, 0, 0, 1\n")],
        );

        let map = ChannelMap::load(&path).unwrap();
        let key = HardwareKey::new(HardwareKey::pack_segment_id(0, 1, 0), 0, 1);
        assert_eq!(map.resolve(&key), Some(LogicalKey::new(5, 1, 0)));
    }

    #[test]
    fn test_missing_map_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "nowhere.map 2\n", &[]);

        match ChannelMap::load(&path) {
            Err(RidfError::MissingMapFile(p)) => assert!(p.ends_with("nowhere.map")),
            other => panic!("Expected MissingMapFile, got {:?}", other),
        }
    }

    #[test]
    fn test_short_record_line() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "bad.map 1\n", &[("bad.map", "1 2\n0 0 0 10\n")]);

        match ChannelMap::load(&path) {
            Err(RidfError::Config { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_too_few_records() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "bad.map 3\n", &[("bad.map", "1 2\n0 0 0 10 0\n")]);
        assert!(matches!(ChannelMap::load(&path), Err(RidfError::Config { .. })));
    }

    #[test]
    fn test_non_numeric_token() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "bad.map 1\n", &[("bad.map", "1 x\n0 0 0 0 0\n")]);
        assert!(matches!(ChannelMap::load(&path), Err(RidfError::Config { .. })));
    }

    proptest! {
        #[test]
        fn later_insertions_win(entries in proptest::collection::vec((0i32..4, 0i32..4, -5i32..5), 1..40)) {
            let mut map = ChannelMap::new();
            let mut expected = HashMap::new();
            for (i, (geo, ch, category)) in entries.iter().enumerate() {
                let hardware = HardwareKey::new(0, *geo, *ch);
                let logical = LogicalKey::new(*category, 0, i as i32);
                map.insert(hardware, logical);
                expected.insert(hardware, logical);
            }
            for (hardware, logical) in expected {
                prop_assert_eq!(map.resolve(&hardware), Some(logical));
            }
        }
    }
}
