//! FFI sessions and the capabilities they carry.
//!
//! The binding layer issues a [`SessionToken`] for each session object it
//! hands over. The [`SessionRegistry`] turns each distinct token into its own
//! monotonically numbered [`FfiSessionType`].

use std::collections::HashMap;
use std::fmt;

use cbridge_core::{FfiSessionType, NativePointerType, SessionId, Type};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FfiError, Result};

/// Opaque identity of a session object, issued by the binding layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub Uuid);

impl SessionToken {
    /// A fresh random token.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues one session type per distinct token.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    next: u64,
    sessions: HashMap<SessionToken, SessionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session type for `token`, issuing a new id on first sight.
    pub fn register(&mut self, token: SessionToken) -> FfiSessionType {
        if let Some(id) = self.sessions.get(&token) {
            return FfiSessionType::new(*id);
        }
        let id = SessionId(self.next);
        self.next += 1;
        self.sessions.insert(token, id);
        tracing::debug!(session = %id, %token, "registered FFI session");
        FfiSessionType::new(id)
    }

    /// Session type previously issued for `token`.
    pub fn get(&self, token: &SessionToken) -> Option<FfiSessionType> {
        self.sessions.get(token).copied().map(FfiSessionType::new)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Capabilities reachable as attributes of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionAttribute {
    /// `from_buffer(buf)`: view a buffer as a native pointer to its elements.
    FromBuffer,
}

impl SessionAttribute {
    pub fn name(&self) -> &'static str {
        match self {
            SessionAttribute::FromBuffer => "from_buffer",
        }
    }
}

/// Typing of session attributes.
pub trait SessionCapabilities {
    /// Resolve an attribute access on the session.
    fn attribute(&self, name: &str) -> Result<SessionAttribute>;

    /// Result type of `from_buffer(arg)`.
    fn from_buffer_type(&self, arg: &Type) -> Result<Type>;
}

impl SessionCapabilities for FfiSessionType {
    fn attribute(&self, name: &str) -> Result<SessionAttribute> {
        match name {
            "from_buffer" => Ok(SessionAttribute::FromBuffer),
            _ => Err(FfiError::UnsupportedSessionAttribute {
                attr: name.to_string(),
            }),
        }
    }

    fn from_buffer_type(&self, arg: &Type) -> Result<Type> {
        match arg {
            Type::Buffer {
                element,
                contiguous: true,
            } => Ok(Type::NativePointer(NativePointerType::borrowed(
                element.as_ref().clone(),
            ))),
            Type::Buffer { .. } => Err(FfiError::NonContiguousBuffer {
                ty: arg.to_string(),
            }),
            _ => Err(FfiError::UnsupportedBufferArgument {
                ty: arg.to_string(),
            }),
        }
    }
}
