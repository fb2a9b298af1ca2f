// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! This module implements the signature protocols in terms of RSA keys and X.509 certificates that are
//! held in local process memory. The signature scheme is RSA PKCS#1 v1.5 over a SHA-256 digest.

use super::error::SignatureError;
use super::{Result, SignatureProvider, SignatureVerifier};
use crate::digest::MessageDigestAlgorithm;

use pkcs1::FromRsaPublicKey;
use pkcs8::FromPrivateKey;
use rsa::hash::Hash;
use rsa::{PaddingScheme, PublicKey, RsaPrivateKey as RsaPriv, RsaPublicKey as RsaPub};
use x509_parser::parse_x509_certificate;
use x509_parser::pem::parse_x509_pem;

use log::debug;
use std::path::Path;

/// An RSA private key together with the certificate that identifies its owner.
pub struct RsaSigningKey {
    private_key: RsaPriv,
    certificate: Vec<u8>,
}

impl RsaSigningKey {
    /// Creates a signing key from a PKCS#8 PEM private key and the matching PEM certificate.
    pub fn from_pem(key_pem: &str, cert_pem: &[u8]) -> Result<RsaSigningKey> {
        let private_key = RsaPriv::from_pkcs8_pem(key_pem)
            .map_err(|e| SignatureError::PrivateKeyFormat(e.to_string()))?;
        let certificate = decode_pem(cert_pem)?;

        let (public_key, subject) = read_certificate(&certificate)?;
        if RsaPub::from(&private_key) != public_key {
            return Err(SignatureError::CertificateFormat(String::from(
                "the certificate does not belong to the private key",
            )));
        }
        debug!("Loaded signing key for {}", subject);

        Ok(RsaSigningKey {
            private_key,
            certificate,
        })
    }

    /// Reads the private key and certificate PEM files from disk.
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(key_path: P, cert_path: Q) -> Result<RsaSigningKey> {
        let key_pem = std::fs::read_to_string(key_path)?;
        let cert_pem = std::fs::read(cert_path)?;
        RsaSigningKey::from_pem(&key_pem, &cert_pem)
    }
}

impl SignatureProvider for RsaSigningKey {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let digest = MessageDigestAlgorithm::Sha256.digest(data);
        let padding = PaddingScheme::new_pkcs1v15_sign(Some(Hash::SHA2_256));
        Ok(self.private_key.sign(padding, &digest)?)
    }

    fn certificate_chain(&self) -> Vec<Vec<u8>> {
        vec![self.certificate.clone()]
    }
}

/// Verifies signatures against the public key of a single trusted certificate.
pub struct RsaCertificateVerifier {
    public_key: RsaPub,
    subject: String,
}

impl RsaCertificateVerifier {
    pub fn from_pem(cert_pem: &[u8]) -> Result<RsaCertificateVerifier> {
        RsaCertificateVerifier::from_der(&decode_pem(cert_pem)?)
    }

    pub fn from_der(cert_der: &[u8]) -> Result<RsaCertificateVerifier> {
        let (public_key, subject) = read_certificate(cert_der)?;
        Ok(RsaCertificateVerifier {
            public_key,
            subject,
        })
    }

    /// Trusts the leaf certificate of the given provider.
    pub fn from_provider(provider: &dyn SignatureProvider) -> Result<RsaCertificateVerifier> {
        let chain = provider.certificate_chain();
        let leaf = chain.first().ok_or(SignatureError::MissingCertificate)?;
        RsaCertificateVerifier::from_der(leaf)
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl SignatureVerifier for RsaCertificateVerifier {
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<String> {
        let digest = MessageDigestAlgorithm::Sha256.digest(data);
        let padding = PaddingScheme::new_pkcs1v15_sign(Some(Hash::SHA2_256));
        self.public_key
            .verify(padding, &digest, signature)
            .map_err(|_| SignatureError::InvalidSignature)?;
        Ok(self.subject.clone())
    }
}

fn decode_pem(cert_pem: &[u8]) -> Result<Vec<u8>> {
    let (_rem, pem) =
        parse_x509_pem(cert_pem).map_err(|e| SignatureError::CertificateFormat(e.to_string()))?;
    Ok(pem.contents)
}

// Returns the RSA public key and the subject of a DER certificate.
fn read_certificate(cert_der: &[u8]) -> Result<(RsaPub, String)> {
    let (_, cert) = parse_x509_certificate(cert_der)
        .map_err(|e| SignatureError::CertificateFormat(e.to_string()))?;
    let public_key = RsaPub::from_pkcs1_der(cert.public_key().subject_public_key.data)?;
    Ok((public_key, cert.subject().to_string()))
}

#[cfg(test)]
mod tests {
    use super::{RsaCertificateVerifier, RsaSigningKey};
    use crate::signature::error::SignatureError;
    use crate::signature::{SignatureProvider, SignatureVerifier};

    const DEMO_KEY: &str = include_str!("../../tests/fixtures/demo-key.pem");
    const DEMO_CERT: &[u8] = include_bytes!("../../tests/fixtures/demo-cert.pem");

    #[test]
    fn test_sign_and_verify() {
        let key = RsaSigningKey::from_pem(DEMO_KEY, DEMO_CERT).unwrap();
        let signature = key.sign(b"<asic:ASiCManifest/>").unwrap();
        assert_eq!(signature.len(), 256);

        let verifier = RsaCertificateVerifier::from_pem(DEMO_CERT).unwrap();
        let subject = verifier.verify(b"<asic:ASiCManifest/>", &signature).unwrap();
        assert!(subject.contains("CN=demo.uk"));
    }

    #[test]
    fn test_tampered_data_rejected() {
        let key = RsaSigningKey::from_pem(DEMO_KEY, DEMO_CERT).unwrap();
        let signature = key.sign(b"original").unwrap();

        let verifier = RsaCertificateVerifier::from_provider(&key).unwrap();
        match verifier.verify(b"tampered", &signature) {
            Err(SignatureError::InvalidSignature) => {}
            _ => panic!("Expected an invalid signature."),
        }
    }

    #[test]
    fn test_bad_inputs() {
        assert!(RsaSigningKey::from_pem("not a key", DEMO_CERT).is_err());
        assert!(RsaCertificateVerifier::from_pem(b"not a certificate").is_err());
        assert!(RsaCertificateVerifier::from_der(&[0x30, 0x03, 0x02, 0x01, 0x00]).is_err());
    }
}
