//! Loads the configured IP catalog. The catalog's origin (a config service, a file, a
//! database) is out of scope; this just needs a place to read it from (§6, `ErrConfig`).

use ipguard_models::IpTarget;

use crate::error::DiscoveryError;

pub fn load_from_path(path: &str) -> Result<Vec<IpTarget>, DiscoveryError> {
    let raw = std::fs::read_to_string(path).map_err(|e| DiscoveryError::Config(format!("cannot read IP catalog at {path}: {e}")))?;
    let targets: Vec<IpTarget> =
        serde_json::from_str(&raw).map_err(|e| DiscoveryError::Config(format!("malformed IP catalog at {path}: {e}")))?;
    if targets.is_empty() {
        return Err(DiscoveryError::Config("IP catalog is empty".into()));
    }
    Ok(targets)
}

/// The union of every IP target's character names and AI-tool keywords, used by the
/// Trending Ingestor to keyword-filter trending results (§4.8).
pub fn union_keywords(catalog: &[IpTarget]) -> Vec<String> {
    let mut all = Vec::new();
    for target in catalog {
        all.extend(target.character_names_lower());
        all.extend(target.ai_tool_keywords_lower());
    }
    all.sort();
    all.dedup();
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn rejects_empty_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        let err = load_from_path(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, DiscoveryError::Config(_)));
    }

    #[test]
    fn loads_and_dedupes_keywords() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"ip1","name":"Hero","owner":"Studio","priority":"high","value_tier":"AAA","character_names":["Hero","hero"],"ai_tool_keywords":["Sora"]}}]"#
        )
        .unwrap();
        let catalog = load_from_path(file.path().to_str().unwrap()).unwrap();
        assert_eq!(catalog.len(), 1);
        let keywords = union_keywords(&catalog);
        assert_eq!(keywords, vec!["hero".to_string(), "sora".to_string()]);
    }
}
