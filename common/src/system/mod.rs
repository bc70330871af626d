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

//! Inspection and manipulation of the system environment.

use std::env;
use std::path::PathBuf;

/// Get or create the radiosimd temporary directory.
///
/// The directory is `$TMP/radiosim-$USER/radiosimd`, allowing multiple
/// users to co-exist on a system.
pub fn radiosimd_temp_dir() -> PathBuf {
    let path = radiosimd_temp_dir_pathbuf();
    if !path.is_dir() {
        std::fs::create_dir_all(&path).unwrap();
    }
    path
}

// Helper for radiosimd_temp_dir() that does not touch the filesystem,
// so unit tests stay read only.
fn radiosimd_temp_dir_pathbuf() -> PathBuf {
    let mut path = match env::var("RADIOSIM_TMP") {
        Ok(var) => PathBuf::from(var),
        _ => env::temp_dir(),
    };
    // On Windows GetTempPath() is already user-dependent.
    #[cfg(not(target_os = "windows"))]
    {
        let user = match env::var("USER") {
            Ok(var) => format!("radiosim-{}", var),
            _ => "radiosim".to_string(),
        };
        path.push(user);
    };
    path.push("radiosimd");
    path
}

#[cfg(not(target_os = "windows"))]
#[cfg(test)]
mod tests {
    use super::radiosimd_temp_dir_pathbuf;
    use crate::tests::ENV_MUTEX;
    use std::env;

    #[test]
    fn test_tmp_override() {
        let _locked = ENV_MUTEX.lock();
        env::set_var("RADIOSIM_TMP", "/tmp/buildbot");
        env::set_var("USER", "ryle");
        let tmp_dir = radiosimd_temp_dir_pathbuf();
        env::remove_var("RADIOSIM_TMP");
        assert_eq!(tmp_dir.to_str().unwrap(), "/tmp/buildbot/radiosim-ryle/radiosimd");
    }

    #[test]
    fn test_default_tmp() {
        let _locked = ENV_MUTEX.lock();
        let temp_dir = env::temp_dir();
        env::remove_var("RADIOSIM_TMP");
        env::set_var("USER", "ryle");
        let tmp_dir = radiosimd_temp_dir_pathbuf();
        assert_eq!(
            tmp_dir.to_str().unwrap(),
            temp_dir.join("radiosim-ryle/radiosimd").to_str().unwrap()
        );
    }
}
