// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types
//!
//! Most lookups in this crate return `Option` or `bool`: a stale id or an
//! unknown name is an ordinary outcome, not an error. `EcsError` covers the
//! checked accessors and the snapshot codec.

use std::fmt;

/// ECS error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Entity id is stale or was never issued
    InvalidEntity,

    /// Component type was never registered
    UnregisteredComponent(&'static str),

    /// No component registered under this name
    UnknownComponentName(String),

    /// Snapshot encoding failed
    SerializationError(String),

    /// Snapshot decoding failed
    DeserializationError(String),

    /// Configuration could not be parsed
    ConfigError(String),
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::InvalidEntity => write!(f, "Invalid entity ID"),
            EcsError::UnregisteredComponent(type_name) => {
                write!(f, "Component type not registered: {type_name}")
            }
            EcsError::UnknownComponentName(name) => write!(f, "Unknown component name: {name}"),
            EcsError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            EcsError::DeserializationError(msg) => write!(f, "Deserialization error: {msg}"),
            EcsError::ConfigError(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for EcsError {}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;
