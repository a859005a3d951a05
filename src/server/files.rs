//! Normalization of upload metadata into an upload tree.
use std::collections::BTreeMap;

use serde_json::Value;

use super::ServerError;
use crate::uploaded::{UploadErrorCode, UploadedFile};

/// A node in the normalized upload tree.
///
/// Flat form fields map to [`UploadNode::File`], nested field names
/// (`avatars[work]`) to [`UploadNode::Group`].
#[derive(Clone, Debug)]
pub enum UploadNode {
    File(UploadedFile),
    Group(BTreeMap<String, UploadNode>),
}

impl UploadNode {
    /// Returns the file at this node, if it is a leaf.
    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            Self::File(file) => Some(file),
            Self::Group(_) => None,
        }
    }

    /// Walk down a group by key.
    pub fn get(&self, key: &str) -> Option<&UploadNode> {
        match self {
            Self::Group(nodes) => nodes.get(key),
            Self::File(_) => None,
        }
    }
}

/// Normalize raw upload metadata into a tree of [`UploadNode`].
///
/// Each entry is a descriptor object with `tmp_name`, `size`, `error`,
/// `name` and `type` members. A string `tmp_name` yields a single file;
/// an object `tmp_name` is the parallel-array layout produced by nested
/// field names and is regrouped key by key.
///
/// # Errors
///
/// Returns [`ServerError::FileSpec`] when the metadata does not follow
/// either layout.
pub fn normalize_files(specs: &Value) -> Result<BTreeMap<String, UploadNode>, ServerError> {
    let Some(specs) = specs.as_object() else {
        return Err(ServerError::FileSpec("expected an object of file descriptors"));
    };
    let mut tree = BTreeMap::new();
    for (name, spec) in specs {
        tree.insert(name.clone(), normalize_node(spec)?);
    }
    Ok(tree)
}

fn normalize_node(spec: &Value) -> Result<UploadNode, ServerError> {
    let Some(spec) = spec.as_object() else {
        return Err(ServerError::FileSpec("file descriptor must be an object"));
    };
    let Some(tmp_name) = spec.get("tmp_name") else {
        return Err(ServerError::FileSpec("file descriptor without tmp_name"));
    };
    match tmp_name {
        Value::String(path) => Ok(UploadNode::File(leaf(spec, path)?)),
        Value::Object(paths) => {
            // parallel arrays: regroup tmp_name/size/error/name/type per key
            let mut nodes = BTreeMap::new();
            for key in paths.keys() {
                let mut sub = serde_json::Map::new();
                for member in ["tmp_name", "size", "error", "name", "type"] {
                    if let Some(Value::Object(values)) = spec.get(member)
                        && let Some(value) = values.get(key)
                    {
                        sub.insert(member.to_owned(), value.clone());
                    }
                }
                nodes.insert(key.clone(), normalize_node(&Value::Object(sub))?);
            }
            Ok(UploadNode::Group(nodes))
        }
        _ => Err(ServerError::FileSpec("tmp_name must be a string or an object")),
    }
}

fn leaf(spec: &serde_json::Map<String, Value>, path: &str) -> Result<UploadedFile, ServerError> {
    let error = match spec.get("error") {
        Some(value) => {
            let code = value
                .as_u64()
                .and_then(|code| u8::try_from(code).ok())
                .ok_or(ServerError::FileSpec("error must be a small integer"))?;
            UploadErrorCode::from_code(code)
                .map_err(|_| ServerError::FileSpec("unassigned upload error code"))?
        }
        None => UploadErrorCode::Ok,
    };
    let size = spec.get("size").and_then(Value::as_u64);
    let client_filename = spec.get("name").and_then(Value::as_str).map(str::to_owned);
    let client_media_type = spec.get("type").and_then(Value::as_str).map(str::to_owned);
    Ok(UploadedFile::from_temp_file(path, size, error, client_filename, client_media_type))
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_descriptor() {
        let specs = json!({
            "avatar": {
                "tmp_name": "/tmp/phpUxcOty",
                "size": 42,
                "error": 0,
                "name": "me.png",
                "type": "image/png",
            }
        });
        let tree = normalize_files(&specs).unwrap();
        let file = tree["avatar"].as_file().unwrap();
        assert_eq!(file.size(), Some(42));
        assert_eq!(file.client_filename(), Some("me.png"));
        assert_eq!(file.client_media_type(), Some("image/png"));
        assert!(file.error().is_ok());
    }

    #[test]
    fn test_parallel_arrays_regrouped() {
        let specs = json!({
            "avatars": {
                "tmp_name": { "work": "/tmp/a", "home": "/tmp/b" },
                "size": { "work": 10, "home": 20 },
                "error": { "work": 0, "home": 0 },
                "name": { "work": "w.png", "home": "h.png" },
                "type": { "work": "image/png", "home": "image/png" },
            }
        });
        let tree = normalize_files(&specs).unwrap();
        let work = tree["avatars"].get("work").unwrap().as_file().unwrap();
        assert_eq!(work.client_filename(), Some("w.png"));
        assert_eq!(work.size(), Some(10));
        let home = tree["avatars"].get("home").unwrap().as_file().unwrap();
        assert_eq!(home.size(), Some(20));
    }

    #[test]
    fn test_nested_groups() {
        let specs = json!({
            "docs": {
                "tmp_name": { "2024": { "q1": "/tmp/r1" } },
                "name": { "2024": { "q1": "report.pdf" } },
            }
        });
        let tree = normalize_files(&specs).unwrap();
        let q1 = tree["docs"].get("2024").unwrap().get("q1").unwrap();
        assert_eq!(q1.as_file().unwrap().client_filename(), Some("report.pdf"));
    }

    #[test]
    fn test_failed_upload_keeps_code() {
        let specs = json!({
            "too_big": { "tmp_name": "", "error": 1, "name": "huge.iso" }
        });
        let tree = normalize_files(&specs).unwrap();
        let file = tree["too_big"].as_file().unwrap();
        assert_eq!(file.error(), UploadErrorCode::IniSize);
    }

    #[test]
    fn test_malformed_specs() {
        assert!(normalize_files(&json!([])).is_err());
        assert!(normalize_files(&json!({ "x": { "size": 1 } })).is_err());
        assert!(normalize_files(&json!({ "x": { "tmp_name": 3 } })).is_err());
    }
}
