use super::definition::NodeDefinition;
use crate::error::ArtifactError;
use crate::registry::{CalculationMode, Variable};
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};

/// A serialized snapshot of one tree plus its registry configuration, for
/// shipping an authored form between environments without the backing store.
#[derive(Serialize, Deserialize)]
pub struct TreeArtifact {
    pub nodes: Vec<NodeDefinition>,
    pub variables: Vec<Variable>,
    pub modes: Vec<CalculationMode>,
}

impl TreeArtifact {
    pub fn new(
        nodes: Vec<NodeDefinition>,
        variables: Vec<Variable>,
        modes: Vec<CalculationMode>,
    ) -> Self {
        Self {
            nodes,
            variables,
            modes,
        }
    }

    /// Saves the artifact to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), ArtifactError> {
        let bytes = encode_to_vec(self, standard())
            .map_err(|e| ArtifactError::Generic(format!("Serialization failed: {}", e)))?;
        let mut file = fs::File::create(path).map_err(|e| {
            ArtifactError::Generic(format!("Could not create file '{}': {}", path, e))
        })?;
        file.write_all(&bytes).map_err(|e| {
            ArtifactError::Generic(format!("Could not write to file '{}': {}", path, e))
        })?;
        Ok(())
    }

    /// Loads an artifact from a file.
    pub fn from_file(path: &str) -> Result<Self, ArtifactError> {
        let mut file = fs::File::open(path)
            .map_err(|e| ArtifactError::Generic(format!("Could not open file '{}': {}", path, e)))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| {
            ArtifactError::Generic(format!("Could not read from file '{}': {}", path, e))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Deserializes an artifact from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        decode_from_slice(bytes, standard())
            .map(|(artifact, _)| artifact) // bincode 2 returns a tuple (data, bytes_read)
            .map_err(|e| ArtifactError::Generic(format!("Deserialization failed: {}", e)))
    }
}
