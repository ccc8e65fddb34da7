// Copyright 2025 John Brosnihan
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
//! Hook interface for observing and vetoing simulation effects
//!
//! Hooks are the engine's only extension mechanism. They are invoked
//! synchronously, in registration order, at deterministic points of the
//! stepping loop: before and after each tick, for every collision pair (once
//! per involved body, in pair-iteration order), and around pointer dragging.
//! A hook can veto an individual physical effect by returning
//! [`HookAction::Suppress`]; it can never abort the surrounding loop.
//!
//! Handlers are registered in a [`HookRegistry`] owned by the host adapter
//! and passed into the [`World`](crate::world::World) entry points. Handler
//! compatibility with the engine is validated against [`HOOK_API_VERSION`]
//! using semantic versioning rules.

use crate::body::BodyId;
use crate::math::Vec2;
use semver::Version;

/// Version of the hook API
///
/// Handlers report the version they were built against via
/// [`WorldHooks::api_version`]; incompatible handlers are rejected at
/// registration. Format: MAJOR.MINOR.PATCH following semantic versioning.
pub const HOOK_API_VERSION: &str = "0.1.0";

/// Outcome of a cancelable hook callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    /// Let the default handling happen
    Proceed,
    /// Veto the default handling (e.g. skip the physical response for a
    /// collision pair, or refuse a drag)
    Suppress,
}

/// Payload of a collision notification
///
/// Delivered once to each body of a colliding pair; `target` is the other
/// body. The geometric fields describe the same contact from either side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEventData {
    /// The other body of the pair
    pub target: BodyId,
    /// Penetration depth along the minimum-translation axis
    pub overlap: f64,
    /// Minimum-translation direction scaled by the depth, pointing from
    /// body A toward body B of the pair
    pub overlap_vector: Vec2,
    /// Unit tangent of the overlap vector, `None` when the overlap vector
    /// is zero
    pub edge_vector: Option<Vec2>,
    /// Velocity of body B minus velocity of body A
    pub relative_velocity: Vec2,
    /// Timestamp of the tick that produced the collision (ms)
    pub timestamp: f64,
}

/// Payload of a drag notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEventData {
    /// Pointer identity; `None` when the notification was synthesized
    /// (for example by deactivating the world mid-drag)
    pub pointer: Option<u64>,
    /// Pointer x in world coordinates
    pub x: f64,
    /// Pointer y in world coordinates
    pub y: f64,
}

/// Callbacks observing and vetoing simulation effects
///
/// Every callback has a default implementation, so handlers only override
/// what they care about:
///
/// ```
/// use impulse2d::hooks::{CollisionEventData, HookAction, WorldHooks};
/// use impulse2d::body::BodyId;
///
/// struct GhostPlatform {
///     platform: BodyId,
/// }
///
/// impl WorldHooks for GhostPlatform {
///     fn name(&self) -> &str {
///         "ghost_platform"
///     }
///
///     fn collision(&mut self, _body: BodyId, data: &CollisionEventData) -> HookAction {
///         // Bodies pass through the platform; the notification still fires
///         if data.target == self.platform {
///             HookAction::Suppress
///         } else {
///             HookAction::Proceed
///         }
///     }
/// }
/// ```
pub trait WorldHooks: Send + Sync {
    /// Name of this handler, unique within a registry
    fn name(&self) -> &str;

    /// Hook API version this handler was built against
    fn api_version(&self) -> &str {
        HOOK_API_VERSION
    }

    /// Invoked before the sub-step loop of every tick
    ///
    /// Returning [`HookAction::Suppress`] skips the tick's simulation work;
    /// scheduling still re-arms.
    fn before_update(&mut self) -> HookAction {
        HookAction::Proceed
    }

    /// Invoked after the sub-step loop of every tick
    fn after_update(&mut self) {}

    /// Invoked on `body` for every collision it participates in
    ///
    /// Returning [`HookAction::Suppress`] drops the pair's physical
    /// response for this sub-step (the pair behaves like a sensor).
    fn collision(&mut self, body: BodyId, data: &CollisionEventData) -> HookAction {
        let _ = (body, data);
        HookAction::Proceed
    }

    /// Invoked on the picked body when a drag would start
    ///
    /// Returning [`HookAction::Suppress`] refuses the drag.
    fn drag_start(&mut self, body: BodyId, data: &DragEventData) -> HookAction {
        let _ = (body, data);
        HookAction::Proceed
    }

    /// Invoked on the dragged body when the pointer moves
    ///
    /// Returning [`HookAction::Suppress`] keeps the drag anchor where it
    /// was for this movement.
    fn drag_move(&mut self, body: BodyId, data: &DragEventData) -> HookAction {
        let _ = (body, data);
        HookAction::Proceed
    }

    /// Invoked on the dragged body when the drag ends (not cancelable)
    fn drag_end(&mut self, body: BodyId, data: &DragEventData) {
        let _ = (body, data);
    }
}

/// Ordered collection of hook handlers
///
/// Dispatch invokes every handler in registration order; a cancelable
/// callback is suppressed when *any* handler returns
/// [`HookAction::Suppress`]. An empty registry proceeds with everything.
#[derive(Default)]
pub struct HookRegistry {
    handlers: Vec<Box<dyn WorldHooks>>,
}

impl HookRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        HookRegistry {
            handlers: Vec::new(),
        }
    }

    /// Register a handler
    ///
    /// Returns an error if a handler with the same name is already
    /// registered or if the handler's hook API version is incompatible
    /// with the engine's.
    pub fn register(&mut self, handler: Box<dyn WorldHooks>) -> Result<(), String> {
        let name = handler.name();
        if self.handlers.iter().any(|h| h.name() == name) {
            return Err(format!("Hook handler '{}' is already registered", name));
        }
        let handler_version = handler.api_version();
        if !is_version_compatible(handler_version, HOOK_API_VERSION) {
            return Err(format!(
                "Hook handler '{}' API version {} is incompatible with engine API version {}",
                name, handler_version, HOOK_API_VERSION
            ));
        }
        self.handlers.push(handler);
        Ok(())
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handlers are registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub(crate) fn before_update(&mut self) -> HookAction {
        let mut action = HookAction::Proceed;
        for handler in &mut self.handlers {
            if handler.before_update() == HookAction::Suppress {
                action = HookAction::Suppress;
            }
        }
        action
    }

    pub(crate) fn after_update(&mut self) {
        for handler in &mut self.handlers {
            handler.after_update();
        }
    }

    pub(crate) fn collision(&mut self, body: BodyId, data: &CollisionEventData) -> HookAction {
        let mut action = HookAction::Proceed;
        for handler in &mut self.handlers {
            if handler.collision(body, data) == HookAction::Suppress {
                action = HookAction::Suppress;
            }
        }
        action
    }

    pub(crate) fn drag_start(&mut self, body: BodyId, data: &DragEventData) -> HookAction {
        let mut action = HookAction::Proceed;
        for handler in &mut self.handlers {
            if handler.drag_start(body, data) == HookAction::Suppress {
                action = HookAction::Suppress;
            }
        }
        action
    }

    pub(crate) fn drag_move(&mut self, body: BodyId, data: &DragEventData) -> HookAction {
        let mut action = HookAction::Proceed;
        for handler in &mut self.handlers {
            if handler.drag_move(body, data) == HookAction::Suppress {
                action = HookAction::Suppress;
            }
        }
        action
    }

    pub(crate) fn drag_end(&mut self, body: BodyId, data: &DragEventData) {
        for handler in &mut self.handlers {
            handler.drag_end(body, data);
        }
    }
}

/// Check if a handler's hook API version is compatible with the engine
///
/// Uses semantic versioning rules: the major versions must match, and for
/// pre-1.0 versions the minor versions must match as well (0.x minors are
/// breaking changes). Patch versions are ignored.
fn is_version_compatible(handler_version: &str, engine_version: &str) -> bool {
    let handler_ver = match Version::parse(handler_version) {
        Ok(v) => v,
        Err(_) => return false,
    };
    let engine_ver = match Version::parse(engine_version) {
        Ok(v) => v,
        Err(_) => return false,
    };

    if handler_ver.major != engine_ver.major {
        return false;
    }

    if handler_ver.major != 0 {
        handler_ver.minor <= engine_ver.minor
    } else {
        handler_ver.minor == engine_ver.minor
    }
}
