//! Backend handle gateway
//!
//! The only code that talks to a [`NativeBackend`]. Every call result is
//! compared with the failure sentinel; on failure the provider's last error is
//! wrapped in a [`BackendError`] of the call's category.
//!
//! Handles returned here are plain owned values. Releasing them goes through
//! the gateway again ([`Gateway::destroy_engine`], [`Gateway::release_context`])
//! and takes the raw value out of the handle, so a second release is a no-op.

use crate::backend::{NativeBackend, NativeBool, RawHandle, NULL_HANDLE};
use crate::constants::{codes, AlgId, ProviderFamily, CRYPT_VERIFYCONTEXT, HP_ALGID, HP_HASHSIZE, HP_HASHVAL};
use crate::emulated::EmulatedCsp;
use crate::error::{BackendError, CallCategory, Result};
use std::fmt;
use std::sync::Arc;

/// Value every native call returns on failure
const FAILURE: NativeBool = 0;

/// Live provider context for one family
#[must_use = "a context must be released through the gateway"]
pub struct ContextHandle {
    raw: Option<RawHandle>,
    family: ProviderFamily,
}

impl ContextHandle {
    /// Family the context was acquired for
    pub fn family(&self) -> ProviderFamily {
        self.family
    }

    /// Check if the context has not been released yet
    pub fn is_live(&self) -> bool {
        self.raw.is_some()
    }

    /// Raw native handle, if still live
    pub fn raw(&self) -> Option<RawHandle> {
        self.raw
    }
}

impl fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextHandle")
            .field("raw", &self.raw)
            .field("family", &self.family)
            .finish()
    }
}

impl Drop for ContextHandle {
    fn drop(&mut self) {
        if let Some(raw) = self.raw {
            tracing::warn!(context = raw, family = %self.family, "context handle dropped without release");
        }
    }
}

/// Live hash object bound to a context
#[must_use = "a hash engine must be destroyed through the gateway"]
pub struct EngineHandle {
    raw: Option<RawHandle>,
    context: RawHandle,
    alg_id: AlgId,
}

impl EngineHandle {
    /// Native algorithm the engine computes
    pub fn alg_id(&self) -> AlgId {
        self.alg_id
    }

    /// Raw handle of the context the engine was created from
    pub fn context(&self) -> RawHandle {
        self.context
    }

    /// Check if the engine has not been destroyed yet
    pub fn is_live(&self) -> bool {
        self.raw.is_some()
    }

    /// Raw native handle, if still live
    pub fn raw(&self) -> Option<RawHandle> {
        self.raw
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("raw", &self.raw)
            .field("context", &self.context)
            .field("alg_id", &format_args!("{:#06x}", self.alg_id))
            .finish()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        if let Some(raw) = self.raw {
            tracing::warn!(engine = raw, context = self.context, "hash engine handle dropped without destroy");
        }
    }
}

/// Capability surface over a native provider
#[derive(Clone)]
pub struct Gateway {
    backend: Arc<dyn NativeBackend>,
}

impl Gateway {
    /// Create a gateway over `backend`
    pub fn new(backend: Arc<dyn NativeBackend>) -> Self {
        Self { backend }
    }

    /// Create a gateway over a fresh in-process [`EmulatedCsp`]
    pub fn emulated() -> Self {
        Self::new(Arc::new(EmulatedCsp::new()))
    }

    /// Backend the gateway calls into
    pub fn backend(&self) -> &Arc<dyn NativeBackend> {
        &self.backend
    }

    fn check(&self, result: NativeBool, category: CallCategory) -> Result<()> {
        if result == FAILURE {
            Err(BackendError::new(category, self.backend.last_error()))
        } else {
            Ok(())
        }
    }

    /// Acquire a verify-only context for `family`
    ///
    /// # Errors
    ///
    /// Returns a [`CallCategory::ContextAcquisition`] error if the provider is
    /// unavailable, does not support the family or denies access.
    pub fn acquire_context(&self, family: ProviderFamily) -> Result<ContextHandle> {
        let mut raw = NULL_HANDLE;
        let result = self
            .backend
            .acquire_context(family.provider_type(), CRYPT_VERIFYCONTEXT, &mut raw);

        if let Err(error) = self.check(result, CallCategory::ContextAcquisition) {
            tracing::warn!(%family, %error, "context acquisition failed");
            return Err(error);
        }
        if raw == NULL_HANDLE {
            return Err(BackendError::new(
                CallCategory::ContextAcquisition,
                codes::ERROR_INVALID_HANDLE,
            ));
        }

        tracing::debug!(context = raw, %family, "context acquired");
        Ok(ContextHandle {
            raw: Some(raw),
            family,
        })
    }

    /// Release a context
    ///
    /// Does nothing if the context was already released.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`CallCategory::ContextRelease`] error if the provider
    /// refuses the release. The handle is consumed either way.
    pub fn release_context(&self, context: &mut ContextHandle) -> Result<()> {
        let Some(raw) = context.raw.take() else {
            return Ok(());
        };

        let result = self.backend.release_context(raw, 0);
        if let Err(error) = self.check(result, CallCategory::ContextRelease) {
            tracing::error!(context = raw, %error, "context release failed");
            return Err(error);
        }

        tracing::debug!(context = raw, family = %context.family, "context released");
        Ok(())
    }

    /// Create a hash engine for `alg_id` bound to `context`
    ///
    /// # Errors
    ///
    /// Returns a [`CallCategory::EngineCreation`] error for unsupported
    /// algorithms, exhausted provider memory or a released context.
    pub fn create_engine(&self, context: &ContextHandle, alg_id: AlgId) -> Result<EngineHandle> {
        let Some(context_raw) = context.raw else {
            return Err(BackendError::new(CallCategory::EngineCreation, codes::NTE_BAD_UID));
        };

        let mut raw = NULL_HANDLE;
        let result = self.backend.create_hash(context_raw, alg_id, &mut raw);
        if let Err(error) = self.check(result, CallCategory::EngineCreation) {
            tracing::warn!(context = context_raw, alg_id, %error, "hash engine creation failed");
            return Err(error);
        }
        if raw == NULL_HANDLE {
            return Err(BackendError::new(
                CallCategory::EngineCreation,
                codes::ERROR_INVALID_HANDLE,
            ));
        }

        tracing::debug!(engine = raw, context = context_raw, alg_id, "hash engine created");
        Ok(EngineHandle {
            raw: Some(raw),
            context: context_raw,
            alg_id,
        })
    }

    /// Destroy a hash engine
    ///
    /// Does nothing if the engine was already destroyed.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`CallCategory::EngineRelease`] error if the provider
    /// refuses to destroy the object. The handle is consumed either way.
    pub fn destroy_engine(&self, engine: &mut EngineHandle) -> Result<()> {
        let Some(raw) = engine.raw.take() else {
            return Ok(());
        };

        let result = self.backend.destroy_hash(raw);
        if let Err(error) = self.check(result, CallCategory::EngineRelease) {
            tracing::error!(engine = raw, %error, "hash engine release failed");
            return Err(error);
        }

        tracing::debug!(engine = raw, context = engine.context, "hash engine destroyed");
        Ok(())
    }

    /// Feed `data` into the engine
    ///
    /// Empty slices are accepted and never reach the provider.
    ///
    /// # Errors
    ///
    /// Returns a [`CallCategory::DataAccumulation`] error if the engine was
    /// destroyed or finalized, or the provider rejects the data.
    pub fn accumulate(&self, engine: &EngineHandle, data: &[u8]) -> Result<()> {
        let Some(raw) = engine.raw else {
            return Err(BackendError::new(CallCategory::DataAccumulation, codes::NTE_BAD_HASH));
        };
        if data.is_empty() {
            return Ok(());
        }

        let result = self.backend.hash_data(raw, data, 0);
        self.check(result, CallCategory::DataAccumulation)?;
        tracing::trace!(engine = raw, len = data.len(), "chunk accumulated");
        Ok(())
    }

    /// Finalize the engine and read exactly `expected_size` digest bytes
    ///
    /// # Errors
    ///
    /// Returns a [`CallCategory::ParameterRetrieval`] error if the provider
    /// fails or reports a digest of a different size.
    pub fn read_digest(&self, engine: &EngineHandle, expected_size: usize) -> Result<Vec<u8>> {
        let mut digest = vec![0u8; expected_size];
        let written = self.get_param(engine, HP_HASHVAL, &mut digest)?;

        if written != expected_size {
            tracing::warn!(
                expected = expected_size,
                actual = written,
                "provider reported an unexpected digest size"
            );
            return Err(BackendError::new(
                CallCategory::ParameterRetrieval,
                codes::ERROR_INVALID_PARAMETER,
            ));
        }
        Ok(digest)
    }

    /// Read the digest size the provider reports for the engine
    ///
    /// # Errors
    ///
    /// Returns a [`CallCategory::ParameterRetrieval`] error on provider failure.
    pub fn read_hash_size(&self, engine: &EngineHandle) -> Result<usize> {
        let value = self.read_dword(engine, HP_HASHSIZE)?;
        usize::try_from(value).map_err(|_| {
            BackendError::new(CallCategory::ParameterRetrieval, codes::ERROR_INVALID_PARAMETER)
        })
    }

    /// Read the algorithm identifier the provider reports for the engine
    ///
    /// # Errors
    ///
    /// Returns a [`CallCategory::ParameterRetrieval`] error on provider failure.
    pub fn read_algorithm(&self, engine: &EngineHandle) -> Result<AlgId> {
        self.read_dword(engine, HP_ALGID)
    }

    fn read_dword(&self, engine: &EngineHandle, param: u32) -> Result<u32> {
        let mut buffer = [0u8; 4];
        let written = self.get_param(engine, param, &mut buffer)?;
        if written != buffer.len() {
            return Err(BackendError::new(
                CallCategory::ParameterRetrieval,
                codes::ERROR_INVALID_PARAMETER,
            ));
        }
        Ok(u32::from_le_bytes(buffer))
    }

    fn get_param(&self, engine: &EngineHandle, param: u32, buffer: &mut [u8]) -> Result<usize> {
        let Some(raw) = engine.raw else {
            return Err(BackendError::new(CallCategory::ParameterRetrieval, codes::NTE_BAD_HASH));
        };
        let mut len = u32::try_from(buffer.len()).map_err(|_| {
            BackendError::new(CallCategory::ParameterRetrieval, codes::ERROR_INVALID_PARAMETER)
        })?;

        let result = self.backend.get_hash_param(raw, param, buffer, &mut len, 0);
        if let Err(error) = self.check(result, CallCategory::ParameterRetrieval) {
            tracing::warn!(engine = raw, param, %error, "reading hash parameter failed");
            return Err(error);
        }
        // a provider must not report more than it could write
        Ok((len as usize).min(buffer.len()))
    }
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}
