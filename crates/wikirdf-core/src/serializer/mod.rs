//! # Serializer Base Contract
//!
//! [`SerializerCore`] holds the state every backend shares: the emission
//! buffer, the namespace bookkeeping, the declaration queue and the
//! document lifecycle. [`Serializer`] is implemented by a concrete backend
//! and provides the buffered lifecycle on top of a few format hooks.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle --start_serialization--> Started --finish_serialization--> Finished
//!                                  |
//!                                  +-- error in serialize_exp_data --> Failed
//! ```
//!
//! `clear()` returns to `Idle` from any state.
//!
//! ## Namespace scope
//!
//! Until the first flush, namespaces are declared on the root element and
//! stay valid for the rest of the document (`Shared`). Flushing streams the
//! root start tag out, so from then on every top-level element declares the
//! non-base namespaces it uses on itself (`Scoped`). The transition happens
//! once per document and never goes back.

pub mod buffer;
pub mod rdfxml;

use crate::declarations::DeclarationQueue;
use crate::{ExpData, ExportError, Namespace};
use buffer::EmissionBuffer;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// STATE
// =============================================================================

/// Where the serializer is in producing a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerializerStatus {
    /// Cleared; no header written yet.
    #[default]
    Idle,
    /// Header written; top-level data may be serialized.
    Started,
    /// Footer written; must be cleared before reuse.
    Finished,
    /// A serialization failed; buffered text is unusable until cleared.
    Failed,
}

impl fmt::Display for SerializerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Whether namespace declarations written now hold for the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamespaceScope {
    /// Declarations go on the root element, which has not been streamed yet.
    Shared,
    /// Declarations go on each top-level element.
    #[default]
    Scoped,
}

/// State shared by all serializer backends.
#[derive(Debug, Default)]
pub struct SerializerCore {
    buffer: EmissionBuffer,
    scope: NamespaceScope,
    /// Prefixes declared for the rest of the document.
    global_namespaces: BTreeSet<String>,
    /// Prefixes required by the current top-level element, in first-seen order.
    pending_namespaces: IndexMap<String, String>,
    declarations: DeclarationQueue,
    status: SerializerStatus,
}

impl SerializerCore {
    /// Create a cleared core.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset buffers, namespaces, declarations and lifecycle.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.scope = NamespaceScope::Scoped;
        self.global_namespaces.clear();
        self.pending_namespaces.clear();
        self.declarations.clear();
        self.status = SerializerStatus::Idle;
    }

    /// The emission buffer.
    #[must_use]
    pub fn buffer(&self) -> &EmissionBuffer {
        &self.buffer
    }

    /// The emission buffer, mutably.
    pub fn buffer_mut(&mut self) -> &mut EmissionBuffer {
        &mut self.buffer
    }

    /// The declaration queue, mutably.
    pub fn declarations_mut(&mut self) -> &mut DeclarationQueue {
        &mut self.declarations
    }

    /// Current namespace scope.
    #[must_use]
    pub fn scope(&self) -> NamespaceScope {
        self.scope
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> SerializerStatus {
        self.status
    }

    /// Enter the shared scope with the given base prefixes declared.
    ///
    /// Only a header of a fresh document may do this.
    pub fn open_shared_scope<'a>(
        &mut self,
        prefixes: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ExportError> {
        if self.status != SerializerStatus::Idle {
            return Err(ExportError::InvalidState(format!(
                "shared namespace scope can only start a document, serializer is {}",
                self.status
            )));
        }
        self.scope = NamespaceScope::Shared;
        self.global_namespaces
            .extend(prefixes.into_iter().map(str::to_string));
        Ok(())
    }

    /// Leave the shared scope for good.
    pub fn end_shared_scope(&mut self) {
        self.scope = NamespaceScope::Scoped;
    }

    /// Note that `prefix` must be declared for the current top-level element.
    pub fn require_namespace(&mut self, prefix: &str, uri: &str) {
        if !self.global_namespaces.contains(prefix) {
            self.pending_namespaces
                .entry(prefix.to_string())
                .or_insert_with(|| uri.to_string());
        }
    }

    /// Record a prefix as declared for the rest of the document.
    pub fn register_global_namespace(&mut self, prefix: &str) {
        self.global_namespaces.insert(prefix.to_string());
    }

    /// Take the namespaces required since the last call, in first-seen order.
    pub fn take_pending_namespaces(&mut self) -> Vec<Namespace> {
        self.pending_namespaces
            .drain(..)
            .map(|(prefix, uri)| Namespace::new(prefix, uri))
            .collect()
    }

    /// Fail unless top-level data may be serialized now.
    pub fn ensure_started(&self) -> Result<(), ExportError> {
        match self.status {
            SerializerStatus::Started => Ok(()),
            SerializerStatus::Idle => Err(ExportError::InvalidState(
                "serialization not started; call start_serialization() first".to_string(),
            )),
            other => Err(ExportError::InvalidState(format!(
                "serializer is {}; call clear() or start_serialization() before reuse",
                other
            ))),
        }
    }

    fn set_status(&mut self, status: SerializerStatus) {
        self.status = status;
    }
}

// =============================================================================
// SERIALIZER TRAIT
// =============================================================================

/// A document serializer built on [`SerializerCore`].
///
/// Backends implement the format hooks; the lifecycle methods are provided.
pub trait Serializer {
    /// Shared state.
    fn core(&self) -> &SerializerCore;

    /// Shared state, mutably.
    fn core_mut(&mut self) -> &mut SerializerCore;

    /// Write the document prolog. Called on a cleared core.
    fn serialize_header(&mut self) -> Result<(), ExportError>;

    /// Write the document epilog.
    fn serialize_footer(&mut self) -> Result<(), ExportError>;

    /// Write one declaration statement.
    fn serialize_declaration(&mut self, uri: &str, type_name: &str) -> Result<(), ExportError>;

    /// Write one namespace declaration into the open block.
    fn serialize_namespace(&mut self, prefix: &str, uri: &str) -> Result<(), ExportError>;

    /// Write one top-level node with everything below it.
    ///
    /// Implementations call [`Serializer::serialize_namespaces`] after the
    /// walk and close the block when the scope is no longer shared.
    fn serialize_exp_data(&mut self, data: &ExpData) -> Result<(), ExportError>;

    /// Reset all state for an independent document.
    fn clear(&mut self) {
        self.core_mut().clear();
    }

    /// Current lifecycle status.
    fn status(&self) -> SerializerStatus {
        self.core().status()
    }

    /// Clear and write the header.
    fn start_serialization(&mut self) -> Result<(), ExportError> {
        self.clear();
        self.serialize_header()?;
        self.core_mut().set_status(SerializerStatus::Started);
        tracing::debug!(event = "serialization_started");
        Ok(())
    }

    /// Write pending declarations and the footer.
    fn finish_serialization(&mut self) -> Result<(), ExportError> {
        self.core().ensure_started()?;
        self.serialize_declarations()?;
        self.serialize_footer()?;
        self.core_mut().set_status(SerializerStatus::Finished);
        tracing::debug!(event = "serialization_finished");
        Ok(())
    }

    /// Write all pending declarations.
    ///
    /// Must only be called between top-level elements.
    fn serialize_declarations(&mut self) -> Result<(), ExportError> {
        let pending = self.core_mut().declarations_mut().drain();
        if !pending.is_empty() {
            tracing::debug!(event = "declarations_drained", count = pending.len());
        }
        for request in pending {
            self.serialize_declaration(&request.uri, request.kind.type_name())?;
        }
        Ok(())
    }

    /// Declare all namespaces required since the last call.
    fn serialize_namespaces(&mut self) -> Result<(), ExportError> {
        for ns in self.core_mut().take_pending_namespaces() {
            self.serialize_namespace(&ns.prefix, &ns.uri)?;
        }
        Ok(())
    }

    /// Release all buffered text.
    ///
    /// Ends the shared namespace scope: the returned text contains the root
    /// start tag, which can no longer be amended once it has been sent.
    fn flush_content(&mut self) -> Result<String, ExportError> {
        if self.status() == SerializerStatus::Failed {
            return Err(ExportError::InvalidState(
                "serializer failed; buffered content was discarded".to_string(),
            ));
        }
        let result = if self.core().buffer().is_empty() {
            String::new()
        } else {
            self.serialize_namespaces()?;
            self.core_mut().buffer_mut().take()
        };
        self.core_mut().end_shared_scope();
        if !result.is_empty() {
            tracing::debug!(event = "content_flushed", bytes = result.len());
        }
        Ok(result)
    }

    /// Mark the document as failed and drop buffered text.
    fn abort(&mut self) {
        let core = self.core_mut();
        core.buffer_mut().clear();
        core.set_status(SerializerStatus::Failed);
    }
}
