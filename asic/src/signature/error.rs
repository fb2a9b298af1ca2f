// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! This module provides the error definitions for errors that can occur within signature providers and
//! signature verifiers.

use thiserror::Error;

/// Specific error types for errors that can occur while signing manifests or verifying their signatures.
#[derive(Error, Debug)]
pub enum SignatureError {
    /// Error emanating from standard I/O, such as when reading key or certificate files.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Error coming from the RSA crate, which can happen when signing with a local RSA key.
    #[cfg(feature = "rsa-signature")]
    #[error(transparent)]
    RsaError(#[from] rsa::errors::Error),

    /// Error coming from the PKCS1 crate, which can happen when the public key of a certificate is
    /// decoded.
    #[cfg(feature = "rsa-signature")]
    #[error(transparent)]
    Pkcs1Error(#[from] pkcs1::Error),

    /// The private key could not be decoded from its PKCS#8 form.
    #[error("The private key could not be decoded: {0}")]
    PrivateKeyFormat(String),

    /// The certificate could not be parsed as PEM or X.509 DER.
    #[error("The certificate could not be parsed: {0}")]
    CertificateFormat(String),

    /// The provider has no certificate to offer.
    #[error("No signing certificate is available.")]
    MissingCertificate,

    /// The signature does not match the signed data and the certificate's public key.
    #[error("The signature is not valid for the signed data.")]
    InvalidSignature,
}
