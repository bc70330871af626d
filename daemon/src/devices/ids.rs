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

/// A factory for generating typed identifiers.
///
/// Ids start at 1, increase monotonically and are never re-issued by the
/// same factory. The scene controller owns the device and chip factories;
/// each facade owns the factory for its kind.
use std::sync::atomic::{AtomicU32, Ordering};

pub struct IdFactory {
    next_id: AtomicU32,
}

impl IdFactory {
    pub fn new() -> Self {
        Self { next_id: AtomicU32::new(1) }
    }

    pub fn next_id(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for IdFactory {
    fn default() -> Self {
        Self::new()
    }
}
