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

//! Scene-change notifications for long-poll clients and UIs.
//!
//! Subscribers register a callback and are invoked on every scene mutation.
//! Callbacks run while the bus lock is held but never while the scene lock
//! is held, so a callback may read the scene.

use log::warn;
use std::collections::HashMap;
use std::sync::Mutex;

type Callback = Box<dyn Fn() + Send>;

struct Registry {
    callbacks: HashMap<u32, Callback>,
    next_id: u32,
}

/// Callback registry for scene updates.
pub struct NotifyBus {
    registry: Mutex<Registry>,
}

impl NotifyBus {
    pub fn new() -> Self {
        NotifyBus { registry: Mutex::new(Registry { callbacks: HashMap::new(), next_id: 1 }) }
    }

    /// Register a callback, returning its id for `unregister`.
    ///
    /// Ids are 32-bit, increase monotonically and wrap past `u32::MAX`
    /// back to 1. An id still in use is never re-issued.
    pub fn register(&self, callback: Callback) -> u32 {
        let mut registry = self.registry.lock().unwrap();
        let mut id = registry.next_id;
        while registry.callbacks.contains_key(&id) {
            id = id.checked_add(1).unwrap_or(1);
        }
        registry.next_id = id.checked_add(1).unwrap_or(1);
        registry.callbacks.insert(id, callback);
        id
    }

    /// Unregister a callback. Unknown ids are a logged no-op.
    pub fn unregister(&self, callback_id: u32) {
        if self.registry.lock().unwrap().callbacks.remove(&callback_id).is_none() {
            warn!("unregister: unknown callback id {callback_id}");
        }
    }

    /// Invoke all registered callbacks.
    pub fn notify(&self) {
        let registry = self.registry.lock().unwrap();
        for callback in registry.callbacks.values() {
            callback();
        }
    }
}

impl Default for NotifyBus {
    fn default() -> Self {
        Self::new()
    }
}
