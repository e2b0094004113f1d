use serde::Serialize;

use crate::clients::{entities::TrackRecord, errors::Result};

/// Result of a backup: one row per saved track, columns fixed to [`TrackRecord::COLUMNS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LibraryTable {
    rows: Vec<TrackRecord>,
}

impl LibraryTable {
    pub fn columns(&self) -> &'static [&'static str] {
        &TrackRecord::COLUMNS
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackRecord> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<TrackRecord> {
        self.rows
    }

    /// Whole table as a single pretty-printed JSON array
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rows)?)
    }

    /// One JSON object per line
    pub fn to_json_lines(&self) -> Result<String> {
        let mut out = String::new();
        for row in &self.rows {
            out.push_str(&serde_json::to_string(row)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl FromIterator<TrackRecord> for LibraryTable {
    fn from_iter<I: IntoIterator<Item = TrackRecord>>(iter: I) -> Self {
        LibraryTable {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a LibraryTable {
    type Item = &'a TrackRecord;
    type IntoIter = std::slice::Iter<'a, TrackRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::entities::tests::saved_item;

    fn table(n: usize) -> LibraryTable {
        (0..n)
            .map(|i| TrackRecord::extract(saved_item(i), i).unwrap())
            .collect()
    }

    #[test]
    fn test_json_keeps_column_set() {
        let json = table(2).to_json().unwrap();
        let rows: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_str(&json).unwrap();

        assert_eq!(rows.len(), 2);
        for row in rows {
            let mut keys: Vec<_> = row.keys().map(String::as_str).collect();
            let mut columns = TrackRecord::COLUMNS.to_vec();
            keys.sort_unstable();
            columns.sort_unstable();
            assert_eq!(keys, columns);
        }
    }

    #[test]
    fn test_json_lines() {
        let table = table(3);
        let out = table.to_json_lines().unwrap();

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        let second: TrackRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(&second, table.iter().nth(1).unwrap());
    }

    #[test]
    fn test_empty_table() {
        let table = LibraryTable::default();
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 8);
        assert_eq!(table.to_json().unwrap(), "[]");
        assert_eq!(table.to_json_lines().unwrap(), "");
    }
}
