// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! This module defines the signing capabilities that containers depend upon. The top-level module defines
//! the protocols as traits, and the sub-modules implement these traits in some useful ways.
//!
//! Signing and verifying are external capabilities from the perspective of the container core. The core
//! decides _what_ is signed (the exact serialized bytes of a signed manifest) and _where_ the signature is
//! stored (a `META-INF/signature*.p7s` entry), but it never looks inside a signature. A
//! [SignatureProvider] turns manifest bytes into signature bytes, and a [SignatureVerifier] checks those
//! bytes and reports who signed them.
//!
//! Trust decisions about certificates (chains, revocation, validity periods) are left to the
//! implementations of these traits.

pub mod error;
#[cfg(feature = "rsa-signature")]
pub mod local;

/// Convenient result alias for this module, where errors are of type [error::SignatureError].
pub type Result<T> = std::result::Result<T, error::SignatureError>;

/// This trait is implemented by objects that are able to sign the manifest of a container.
pub trait SignatureProvider {
    /// Signs the given bytes and returns the detached signature that is stored in the container.
    ///
    /// The bytes are exactly the serialized signed manifest, as it is written to the container.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Returns the DER-encoded certificate chain of the signer, leaf certificate first.
    fn certificate_chain(&self) -> Vec<Vec<u8>>;
}

/// This trait is implemented by objects that are able to check the detached signature over a manifest.
pub trait SignatureVerifier {
    /// Verifies `signature` over `data` and returns the subject of the signing certificate.
    ///
    /// An invalid signature is reported as [error::SignatureError::InvalidSignature].
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<String>;
}
