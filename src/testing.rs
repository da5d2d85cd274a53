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

//! Components shared by unit tests

use std::sync::Arc;

use crate::component::Component;
use crate::registry::ComponentRegistry;

#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Component for Position {
    fn save(&self) -> String {
        format!("{} {}", self.x, self.y)
    }

    fn load(&mut self, data: &str) {
        let mut fields = data.split_whitespace();
        self.x = fields.next().and_then(|f| f.parse().ok()).unwrap_or_default();
        self.y = fields.next().and_then(|f| f.parse().ok()).unwrap_or_default();
    }
}

#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

impl Velocity {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

impl Component for Velocity {
    fn save(&self) -> String {
        format!("{} {}", self.dx, self.dy)
    }

    fn load(&mut self, data: &str) {
        let mut fields = data.split_whitespace();
        self.dx = fields.next().and_then(|f| f.parse().ok()).unwrap_or_default();
        self.dy = fields.next().and_then(|f| f.parse().ok()).unwrap_or_default();
    }
}

#[derive(Clone, Default, Debug, PartialEq)]
pub struct Sprite {
    pub path: String,
}

impl Sprite {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_owned(),
        }
    }
}

impl Component for Sprite {
    fn save(&self) -> String {
        self.path.clone()
    }

    fn load(&mut self, data: &str) {
        self.path = data.to_owned();
    }
}

/// Registered without a name.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct Tag(pub u32);

crate::impl_component!(Tag);

/// Fresh registry with every test component.
pub fn registry() -> Arc<ComponentRegistry> {
    let registry = Arc::new(ComponentRegistry::new());
    registry.register::<Position>("Position");
    registry.register::<Velocity>("Velocity");
    registry.register::<Sprite>("Sprite");
    registry.register_unnamed::<Tag>();
    registry
}
