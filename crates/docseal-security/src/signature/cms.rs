// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detached CMS (PKCS#7) SignedData for `adbe.pkcs7.detached` signatures.
//
// The content itself is not embedded; the SHA-256 digest of the covered byte
// ranges goes into the `messageDigest` signed attribute and the RSA PKCS#1 v1.5
// signature is computed over the signed attributes.

use cms::builder::{SignedDataBuilder, SignerInfoBuilder};
use cms::cert::{CertificateChoices, IssuerAndSerialNumber};
use cms::content_info::ContentInfo;
use cms::signed_data::{EncapsulatedContentInfo, SignedData, SignerIdentifier};
use const_oid::db::{rfc5911, rfc5912};
use der::asn1::OctetString;
use der::{Decode, Encode, SliceReader};
use docseal_core::error::{DocsealError, Result};
use rsa::pkcs1v15;
use sha2::Sha256;
use x509_cert::Certificate;
use x509_cert::spki::AlgorithmIdentifierOwned;

use crate::keystore::SigningIdentity;

/// Signing context for one operation: the identity's key and certificate
/// paired with the fixed SHA-256 digest algorithm.
pub struct SignatureContext<'a> {
    signer: pkcs1v15::SigningKey<Sha256>,
    certificate: &'a Certificate,
}

impl<'a> SignatureContext<'a> {
    pub fn new(identity: &'a SigningIdentity) -> Self {
        Self {
            signer: pkcs1v15::SigningKey::<Sha256>::new(identity.key.clone()),
            certificate: &identity.certificate,
        }
    }

    /// DER-encoded detached SignedData over a precomputed SHA-256 `digest`.
    pub fn sign_digest(&self, digest: &[u8]) -> Result<Vec<u8>> {
        let failed = |stage: &str, e: &dyn std::fmt::Debug| {
            DocsealError::SigningFailed(format!("{stage}: {e:?}"))
        };

        let encapsulated = EncapsulatedContentInfo {
            econtent_type: rfc5911::ID_DATA,
            econtent: None,
        };
        let digest_algorithm = sha256_algorithm();
        let signer_id = SignerIdentifier::IssuerAndSerialNumber(IssuerAndSerialNumber {
            issuer: self.certificate.tbs_certificate.issuer.clone(),
            serial_number: self.certificate.tbs_certificate.serial_number.clone(),
        });

        let signer_info = SignerInfoBuilder::new(
            &self.signer,
            signer_id,
            digest_algorithm.clone(),
            &encapsulated,
            Some(digest),
        )
        .map_err(|e| failed("signer info", &e))?;

        let mut builder = SignedDataBuilder::new(&encapsulated);
        builder
            .add_digest_algorithm(digest_algorithm)
            .map_err(|e| failed("digest algorithm", &e))?
            .add_certificate(CertificateChoices::Certificate(self.certificate.clone()))
            .map_err(|e| failed("certificate", &e))?
            .add_signer_info::<pkcs1v15::SigningKey<Sha256>, pkcs1v15::Signature>(signer_info)
            .map_err(|e| failed("signature", &e))?;
        let content_info = builder.build().map_err(|e| failed("signed data", &e))?;

        content_info
            .to_der()
            .map_err(|e| DocsealError::SigningFailed(format!("DER encoding: {e}")))
    }
}

fn sha256_algorithm() -> AlgorithmIdentifierOwned {
    AlgorithmIdentifierOwned {
        oid: rfc5912::ID_SHA_256,
        parameters: None,
    }
}

/// What a parsed detached signature says about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerSummary {
    /// Value of the `messageDigest` signed attribute.
    pub message_digest: Vec<u8>,
    pub digest_algorithm: String,
    /// Subject of the embedded certificate matching the signer, if present.
    pub subject: Option<String>,
    /// Hex serial number the signer is identified by.
    pub serial: String,
}

/// Parse a DER SignedData, tolerating the zero padding that follows it inside
/// a `/Contents` slot.
pub fn parse_signed_data(der: &[u8]) -> Result<SignerSummary> {
    let malformed = |what: &str, e: der::Error| DocsealError::MalformedPdf(format!("{what}: {e}"));

    let mut reader = SliceReader::new(der).map_err(|e| malformed("CMS blob", e))?;
    let content_info = ContentInfo::decode(&mut reader).map_err(|e| malformed("ContentInfo", e))?;
    if content_info.content_type != rfc5911::ID_SIGNED_DATA {
        return Err(DocsealError::MalformedPdf(format!(
            "unexpected CMS content type {}",
            content_info.content_type
        )));
    }
    let signed_data: SignedData = content_info
        .content
        .decode_as()
        .map_err(|e| malformed("SignedData", e))?;

    let signer = signed_data
        .signer_infos
        .0
        .iter()
        .next()
        .ok_or_else(|| DocsealError::MalformedPdf("SignedData has no signer".into()))?;

    let message_digest = signer
        .signed_attrs
        .iter()
        .flat_map(|attrs| attrs.iter())
        .find(|attr| attr.oid == rfc5911::ID_MESSAGE_DIGEST)
        .and_then(|attr| attr.values.iter().next())
        .ok_or_else(|| DocsealError::MalformedPdf("no messageDigest attribute".into()))?
        .decode_as::<OctetString>()
        .map_err(|e| malformed("messageDigest", e))?
        .as_bytes()
        .to_vec();

    let serial = match &signer.sid {
        SignerIdentifier::IssuerAndSerialNumber(id) => id.serial_number.clone(),
        SignerIdentifier::SubjectKeyIdentifier(_) => {
            return Err(DocsealError::MalformedPdf(
                "signer identified by key id, expected issuer and serial".into(),
            ));
        }
    };

    let subject = signed_data.certificates.as_ref().and_then(|set| {
        set.0.iter().find_map(|choice| match choice {
            CertificateChoices::Certificate(cert)
                if cert.tbs_certificate.serial_number == serial =>
            {
                Some(cert.tbs_certificate.subject.to_string())
            }
            _ => None,
        })
    });

    Ok(SignerSummary {
        message_digest,
        digest_algorithm: signer.digest_alg.oid.to_string(),
        subject,
        serial: hex::encode(serial.as_bytes()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::integrity::sha256;
    use crate::keystore::decode_keystore;

    fn identity() -> SigningIdentity {
        decode_keystore(&fixtures::rsa_keystore("pw"), "pw").unwrap()
    }

    #[test]
    fn signed_data_carries_the_digest_and_signer() {
        let identity = identity();
        let digest = sha256(b"covered bytes");
        let der = SignatureContext::new(&identity).sign_digest(&digest).unwrap();

        let summary = parse_signed_data(&der).unwrap();
        assert_eq!(summary.message_digest, digest.to_vec());
        assert_eq!(summary.digest_algorithm, "2.16.840.1.101.3.4.2.1");
        assert!(summary.subject.unwrap().contains(fixtures::SUBJECT_CN));
        assert_eq!(summary.serial, format!("{:02x}", fixtures::SERIAL));
    }

    #[test]
    fn trailing_padding_is_ignored() {
        let identity = identity();
        let mut der = SignatureContext::new(&identity)
            .sign_digest(&sha256(b"x"))
            .unwrap();
        der.extend_from_slice(&[0u8; 64]);
        assert!(parse_signed_data(&der).is_ok());
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            parse_signed_data(&[0x30, 0x03, 0x02, 0x01]),
            Err(DocsealError::MalformedPdf(_))
        ));
    }
}
