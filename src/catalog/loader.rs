//! Reading catalog snapshots from disk

use super::types::CatalogSnapshot;
use crate::error::FindError;
use std::fs;
use std::path::Path;
use tracing::info;

/// Load a catalog snapshot from a JSON file
pub fn load_snapshot(path: &Path) -> Result<CatalogSnapshot, FindError> {
    if !path.exists() {
        return Err(FindError::NotFound(format!(
            "catalog snapshot {}",
            path.display()
        )));
    }

    let data = fs::read_to_string(path)?;
    let snapshot: CatalogSnapshot = serde_json::from_str(&data)?;

    info!(
        "Loaded catalog snapshot {}: {} monsters, {} evolutions, {} exchanges",
        path.display(),
        snapshot.monsters.len(),
        snapshot.evolutions.len(),
        snapshot.exchanges.len()
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_snapshot_roundtrip() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "monsters": [{{"id": 1, "monster_no_na": 1, "monster_no_jp": 1,
                               "name_en": "Tyrra", "attr1": "fire", "rarity": 2}}],
                "series": [{{"id": 3, "name": "Dragons", "series_type": "regular"}}]
            }}"#
        )
        .unwrap();

        let snapshot = load_snapshot(file.path()).unwrap();
        assert_eq!(snapshot.monsters.len(), 1);
        assert_eq!(snapshot.series[0].name, "Dragons");
        assert!(snapshot.evolutions.is_empty());
    }

    #[test]
    fn test_load_snapshot_missing_file() {
        let err = load_snapshot(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert_eq!(err.error_code(), "not_found");
    }

    #[test]
    fn test_load_snapshot_bad_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = load_snapshot(file.path()).unwrap_err();
        assert!(matches!(err, FindError::Json(_)));
    }
}
