//! Call Fingerprint Module
//!
//! Derives the opaque cache key an interception layer stores responses
//! under: a deterministic digest of the call's full identity, so the same
//! call always lands on the same entry and different callers never collide.

use std::collections::BTreeMap;

use serde_json::Value;
use sha2::{Digest, Sha256};

// == Call Fingerprint ==
/// Identity of a cacheable call: who makes it, against which service and
/// operation, where, and with which parameters.
///
/// Parameters live in a sorted map and are serialized in key order, so two
/// parameter sets with the same contents always produce the same digest
/// regardless of how they were assembled.
#[derive(Debug, Clone, Default)]
pub struct CallFingerprint {
    caller: String,
    service: String,
    operation: String,
    region: String,
    params: BTreeMap<String, Value>,
}

impl CallFingerprint {
    // == Constructor ==
    /// Starts a fingerprint for an operation on a service.
    pub fn new(service: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            operation: operation.into(),
            ..Self::default()
        }
    }

    /// Sets the identity of the principal making the call.
    pub fn caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = caller.into();
        self
    }

    /// Sets the region the call targets.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Adds one call parameter.
    pub fn param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Replaces the whole parameter map.
    pub fn params(mut self, params: BTreeMap<String, Value>) -> Self {
        self.params = params;
        self
    }

    // == Digest ==
    /// SHA-256 hex digest of the canonical call identity.
    ///
    /// This is the string to use as the cache key.
    pub fn digest(&self) -> String {
        let params = serde_json::to_string(&self.params).unwrap_or_default();
        let canonical = format!(
            "{}_{}_{}_{}_{}",
            self.caller, self.service, self.operation, self.region, params
        );

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hex::encode(hasher.finalize())
    }
}
