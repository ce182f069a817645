use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

use crate::{
    registry::models::TokenRecord,
    store::models::{RawTokensDocument, TokenEntry, TokensDocument, XML_DECLARATION},
};

#[derive(Debug, Error)]
pub enum LoadTokensError {
    #[error("NotFound: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("ReadFile {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Corrupt {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: quick_xml::DeError,
    },
}

pub async fn load_tokens(path: &Path) -> Result<Vec<TokenRecord>, LoadTokensError> {
    let xml = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| match source.kind() {
            ErrorKind::NotFound => LoadTokensError::NotFound {
                path: path.to_path_buf(),
            },
            _ => LoadTokensError::ReadFile {
                path: path.to_path_buf(),
                source,
            },
        })?;

    let document: RawTokensDocument =
        quick_xml::de::from_str(&xml).map_err(|source| LoadTokensError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

    let total = document.tokens.len();
    let records: Vec<TokenRecord> = document
        .tokens
        .into_iter()
        .filter_map(|entry| entry.into_record())
        .collect();

    if records.len() < total {
        debug!(
            skipped = total - records.len(),
            path = %path.display(),
            "ignored stored tokens without id or stars"
        );
    }

    Ok(records)
}

#[derive(Debug, Error)]
pub enum SaveTokensError {
    #[error("Serialize: {source}")]
    Serialize {
        #[from]
        source: quick_xml::SeError,
    },

    #[error("WriteFile {}: {source}", .path.display())]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("ReplaceFile {}: {source}", .path.display())]
    ReplaceFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub fn render_tokens(records: &[TokenRecord]) -> Result<String, SaveTokensError> {
    let document = TokensDocument {
        tokens: records.iter().map(TokenEntry::from).collect(),
    };
    let body = quick_xml::se::to_string(&document)?;

    Ok(format!("{XML_DECLARATION}\n{body}\n"))
}

/// Overwrites the store. The document is written next to `path` first and
/// renamed into place, so readers see either the old or the new content.
pub async fn save_tokens(path: &Path, records: &[TokenRecord]) -> Result<(), SaveTokensError> {
    let xml = render_tokens(records)?;
    let tmp = temp_path(path);

    tokio::fs::write(&tmp, xml)
        .await
        .map_err(|source| SaveTokensError::WriteFile {
            path: tmp.clone(),
            source,
        })?;

    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|source| SaveTokensError::ReplaceFile {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(count = records.len(), path = %path.display(), "saved tokens");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    fn sample() -> Vec<TokenRecord> {
        vec![
            TokenRecord::new(1, "A1", "alpha", json!(12), 0),
            TokenRecord::new(2, "B2", "beta & <co>", json!("3.5k"), 7),
            TokenRecord::new(3, "C3", "", Value::Null, 1),
        ]
    }

    /// Values that element text or untyped attributes would not bring back.
    fn awkward() -> Vec<TokenRecord> {
        vec![
            TokenRecord::new(1, " A ", "  padded name ", json!(" 12 "), 0),
            TokenRecord::new(2, "B", 5, json!("10"), 2),
            TokenRecord::new(3, "C", "   ", json!({"k": 1}), 0),
            TokenRecord::new(4, "D\"quoted\"", Value::Null, json!([1, "two"]), 9),
        ]
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();

        let err = load_tokens(&dir.path().join("tokens.xml")).await.unwrap_err();

        assert!(matches!(err, LoadTokensError::NotFound { .. }));
    }

    #[tokio::test]
    async fn save_then_load_keeps_every_field() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.xml");
        let records = sample();

        save_tokens(&path, &records).await.unwrap();
        let loaded = load_tokens(&path).await.unwrap();

        assert_eq!(loaded, records);
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn save_then_load_keeps_whitespace_and_value_types() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.xml");
        let records = awkward();

        save_tokens(&path, &records).await.unwrap();
        let loaded = load_tokens(&path).await.unwrap();

        assert_eq!(loaded, records);
        assert_eq!(loaded[0].address, " A ");
        assert_eq!(loaded[1].quantity, json!("10"));
    }

    #[tokio::test]
    async fn save_replaces_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.xml");

        save_tokens(&path, &sample()).await.unwrap();
        save_tokens(&path, &sample()[..1]).await.unwrap();

        assert_eq!(load_tokens(&path).await.unwrap(), sample()[..1].to_vec());
    }

    #[tokio::test]
    async fn document_without_tokens_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.xml");
        tokio::fs::write(&path, "<?xml version=\"1.0\"?>\n<tokens></tokens>")
            .await
            .unwrap();

        assert!(load_tokens(&path).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn entries_without_stars_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.xml");
        let xml = "<tokens>\
            <token address=\"A\"><id>1</id></token>\
            <token address=\"B\" quantity=\"4\"><id>2</id><stars>4</stars></token>\
            </tokens>";
        tokio::fs::write(&path, xml).await.unwrap();

        let loaded = load_tokens(&path).await.unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 2);
        assert_eq!(loaded[0].address, "B");
        assert_eq!(loaded[0].quantity, json!(4));
        assert_eq!(loaded[0].stars, 4);
    }

    #[tokio::test]
    async fn unparsable_values_are_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.xml");
        let xml = "<tokens><token><id>1</id><stars>lots</stars></token></tokens>";
        tokio::fs::write(&path, xml).await.unwrap();

        let err = load_tokens(&path).await.unwrap_err();

        assert!(matches!(err, LoadTokensError::Corrupt { .. }));
    }

    #[test]
    fn rendered_document_starts_with_declaration() {
        let xml = render_tokens(&sample()[..1]).unwrap();

        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("<tokens><token address=\"A1\""));
        assert!(xml.contains("quantity=\"12\"><id>1</id><stars>0</stars></token></tokens>"));
    }

    #[test]
    fn temp_file_sits_next_to_the_store() {
        let tmp = temp_path(Path::new("/var/lib/tokens/tokens.xml"));

        assert_eq!(tmp, PathBuf::from("/var/lib/tokens/tokens.xml.tmp"));
    }
}
