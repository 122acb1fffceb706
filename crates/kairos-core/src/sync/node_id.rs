// Node identity for sync diagnostics across paired devices.
// Format: "kairos-<uuid>"

use std::fs;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

const NODE_ID_FILE: &str = "node_id.txt";
const NODE_ID_PREFIX: &str = "kairos-";

/// Error type for node ID operations
#[derive(Debug, thiserror::Error)]
pub enum NodeIdError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid node ID format: {0}")]
    InvalidFormat(String),
}

/// Get or create the node ID at the specified path.
/// Creates a new node ID file if it doesn't exist.
///
/// # Arguments
/// * `path` - Directory path where node_id.txt is stored
///
/// # Returns
/// Node ID string in format "kairos-<uuid>"
pub fn get_or_create_node_id_at(path: &Path) -> Result<String, NodeIdError> {
    let node_id_path = path.join(NODE_ID_FILE);

    if node_id_path.exists() {
        let content = fs::read_to_string(&node_id_path)?;
        let node_id = content.trim().to_string();

        if node_id.starts_with(NODE_ID_PREFIX) {
            return Ok(node_id);
        } else {
            return Err(NodeIdError::InvalidFormat(node_id));
        }
    }

    let uuid = Uuid::new_v4().to_string();
    let node_id = format!("{}{}", NODE_ID_PREFIX, uuid);

    if !path.exists() {
        fs::create_dir_all(path)?;
    }

    let mut file = fs::File::create(&node_id_path)?;
    writeln!(file, "{}", node_id)?;

    Ok(node_id)
}

/// Get or create the node ID in the default data directory.
///
/// # Returns
/// Node ID string in format "kairos-<uuid>"
pub fn get_or_create_node_id() -> Result<String, NodeIdError> {
    let data_dir = crate::storage::data_dir().map_err(|e| {
        NodeIdError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            e.to_string(),
        ))
    })?;

    get_or_create_node_id_at(&data_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn node_id_format() {
        let temp_dir = TempDir::new().unwrap();
        let node_id = get_or_create_node_id_at(temp_dir.path()).unwrap();

        assert!(node_id.starts_with(NODE_ID_PREFIX));
        // Format: kairos-<uuid> (36 chars for UUID + prefix)
        assert_eq!(node_id.len(), NODE_ID_PREFIX.len() + 36);
    }

    #[test]
    fn node_id_persists_across_reads() {
        let temp_dir = TempDir::new().unwrap();

        let first = get_or_create_node_id_at(temp_dir.path()).unwrap();
        let second = get_or_create_node_id_at(temp_dir.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn invalid_format_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let node_id_path = temp_dir.path().join(NODE_ID_FILE);

        let mut file = fs::File::create(&node_id_path).unwrap();
        writeln!(file, "invalid-id-123").unwrap();

        let result = get_or_create_node_id_at(temp_dir.path());
        assert!(matches!(result, Err(NodeIdError::InvalidFormat(_))));
    }

    #[test]
    fn distinct_devices_get_distinct_ids() {
        let dir_a = TempDir::new().unwrap();
        let dir_b = TempDir::new().unwrap();

        let a = get_or_create_node_id_at(dir_a.path()).unwrap();
        let b = get_or_create_node_id_at(dir_b.path()).unwrap();

        assert_ne!(a, b);
    }
}
