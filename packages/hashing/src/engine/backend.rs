//! Provider-backed hash engine

use super::HashEngine;
use crate::registry::{Algorithm, BackendBinding, Descriptor};
use crate::{HashError, Result};
use hashgate_common::Logging;
use hashgate_csp::{ContextHandle, EngineHandle, Gateway, ProviderFamily};
use std::sync::Arc;

/// Provider context shared by several engines
///
/// The context is released when the last holder goes away, which is always
/// after every engine created in it was destroyed.
pub struct SharedContext {
    gateway: Gateway,
    handle: ContextHandle,
}

impl SharedContext {
    /// Acquire a context for `family`
    ///
    /// # Errors
    ///
    /// Returns the provider's acquisition error.
    pub fn acquire(gateway: &Gateway, family: ProviderFamily) -> Result<Arc<Self>> {
        let handle = gateway.acquire_context(family)?;
        Ok(Arc::new(Self {
            gateway: gateway.clone(),
            handle,
        }))
    }

    /// Family the context serves
    #[must_use]
    pub fn family(&self) -> ProviderFamily {
        self.handle.family()
    }

    /// Release the context now
    ///
    /// # Errors
    ///
    /// Returns a fatal error if the provider refuses the release.
    pub fn release(&mut self) -> Result<()> {
        self.gateway.release_context(&mut self.handle)?;
        Ok(())
    }

    /// Give up one hold on the context, releasing it if no other holder is left
    ///
    /// # Errors
    ///
    /// Returns a fatal error if the provider refuses the release.
    pub fn relinquish(context: Arc<Self>) -> Result<()> {
        match Arc::into_inner(context) {
            Some(mut context) => context.release(),
            None => {
                tracing::debug!("context stays open for its other holders");
                Ok(())
            }
        }
    }
}

impl Drop for SharedContext {
    fn drop(&mut self) {
        if let Err(error) = self.release() {
            Logging::log_release_failure("provider context", &error);
            if !std::thread::panicking() {
                panic!("provider context release failed: {error}");
            }
        }
    }
}

enum EngineContext {
    Owned(ContextHandle),
    Shared(Arc<SharedContext>),
    Detached,
}

/// Hash engine running inside a provider context
///
/// Owns its context when opened with [`BackendEngine::open`]; release then
/// destroys the engine before the context. Engines opened in a
/// [`SharedContext`] hold it until they are released, and the last holder
/// releases it.
pub struct BackendEngine {
    gateway: Gateway,
    algorithm: Algorithm,
    digest_size: usize,
    engine: EngineHandle,
    context: EngineContext,
    finalized: bool,
}

impl BackendEngine {
    /// Acquire a context for the algorithm's family and create an engine in it
    ///
    /// If engine creation fails the context is released before returning.
    ///
    /// # Errors
    ///
    /// Returns the acquisition or creation error of the provider.
    pub fn open(gateway: &Gateway, descriptor: &Descriptor) -> Result<Self> {
        let binding = binding(descriptor)?;
        let mut context = gateway.acquire_context(binding.family)?;

        match create_engine(gateway, &context, descriptor, binding) {
            Ok(engine) => Ok(Self::assemble(gateway, descriptor, engine, EngineContext::Owned(context))),
            Err(error) => {
                gateway.release_context(&mut context)?;
                Err(error)
            }
        }
    }

    /// Create an engine in a shared context
    ///
    /// Any family may be asked for any provider algorithm; the provider
    /// rejects the ones its family does not serve.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidParameters`] for software algorithms, or the
    /// provider's creation error (`NTE_BAD_ALGID` outside the family).
    pub fn open_in(context: &Arc<SharedContext>, descriptor: &Descriptor) -> Result<Self> {
        let binding = binding(descriptor)?;
        let gateway = &context.gateway;
        let engine = create_engine(gateway, &context.handle, descriptor, binding)?;
        Ok(Self::assemble(
            gateway,
            descriptor,
            engine,
            EngineContext::Shared(Arc::clone(context)),
        ))
    }

    fn assemble(
        gateway: &Gateway,
        descriptor: &Descriptor,
        engine: EngineHandle,
        context: EngineContext,
    ) -> Self {
        Self {
            gateway: gateway.clone(),
            algorithm: descriptor.algorithm,
            digest_size: descriptor.digest_size,
            engine,
            context,
            finalized: false,
        }
    }

    /// Check if the engine handle is still live
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.engine.is_live()
    }
}

fn binding(descriptor: &Descriptor) -> Result<BackendBinding> {
    descriptor.backend.ok_or_else(|| {
        HashError::invalid_parameters(format!(
            "{} does not run in a provider context",
            descriptor.algorithm
        ))
    })
}

/// Create the engine and check that the provider agrees on the digest size
fn create_engine(
    gateway: &Gateway,
    context: &ContextHandle,
    descriptor: &Descriptor,
    binding: BackendBinding,
) -> Result<EngineHandle> {
    let mut engine = gateway.create_engine(context, binding.alg_id)?;

    let reported = match gateway.read_hash_size(&engine) {
        Ok(size) => size,
        Err(error) => {
            gateway.destroy_engine(&mut engine)?;
            return Err(error.into());
        }
    };
    if reported != descriptor.digest_size {
        tracing::warn!(
            algorithm = %descriptor.algorithm,
            expected = descriptor.digest_size,
            actual = reported,
            "provider reports an unexpected digest size"
        );
        gateway.destroy_engine(&mut engine)?;
        return Err(HashError::DigestSize {
            expected: descriptor.digest_size,
            actual: reported,
        });
    }
    Ok(engine)
}

impl HashEngine for BackendEngine {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn accumulate(&mut self, chunk: &[u8]) -> Result<()> {
        if self.finalized {
            return Err(HashError::AlreadyFinalized);
        }
        self.gateway.accumulate(&self.engine, chunk)?;
        Ok(())
    }

    fn finalize(&mut self) -> Result<Vec<u8>> {
        if self.finalized {
            return Err(HashError::AlreadyFinalized);
        }
        let digest = self.gateway.read_digest(&self.engine, self.digest_size)?;
        self.finalized = true;
        Ok(digest)
    }

    fn release(&mut self) -> Result<()> {
        self.gateway.destroy_engine(&mut self.engine)?;
        if let EngineContext::Owned(context) = &mut self.context {
            self.gateway.release_context(context)?;
            return Ok(());
        }
        if let EngineContext::Shared(context) =
            std::mem::replace(&mut self.context, EngineContext::Detached)
        {
            SharedContext::relinquish(context)?;
        }
        Ok(())
    }
}
