// Copyright 2024 The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;

/// Errors surfaced by the simulator core.
///
/// Only `NotFound` and `InvalidArgument` are peer visible; everything else
/// is logged and converted into a drop at the failure site.
#[derive(Debug, Error)]
pub enum Error {
    /// The addressed device or chip is absent at call time.
    #[error("not found: {0}")]
    NotFound(String),
    /// A malformed or out-of-sequence message.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The transport is not yet connected or already shut down.
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// A capture sink write failed.
    #[error("capture i/o failure: {0}")]
    IoFailure(#[from] std::io::Error),
    /// A facade invariant was violated.
    #[error("internal: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind() {
        let err = Error::NotFound("device 7".to_string());
        assert_eq!(err.to_string(), "not found: device 7");
        let err = Error::InvalidArgument("missing initial_info".to_string());
        assert!(err.to_string().starts_with("invalid argument"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: Error = io.into();
        assert!(matches!(err, Error::IoFailure(_)));
    }
}
