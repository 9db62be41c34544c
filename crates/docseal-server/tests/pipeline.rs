// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end render+sign runs against real keystores in a scratch directory.

use std::path::Path;
use std::sync::Arc;

use docseal_core::artifacts::WorkDir;
use docseal_core::error::{DocsealError, PipelineError};
use docseal_core::types::{Document, DocumentId, FontSource};
use docseal_document::{PageRenderer, PdfReader};
use docseal_security::{SignatureInfo, SigningCredentials, SigningEngine, fixtures};
use docseal_server::services::DocumentPipeline;

const PASS: &str = "123456";

fn pipeline_with(
    dir: &Path,
    renderer: PageRenderer,
    credentials: SigningCredentials,
) -> DocumentPipeline {
    DocumentPipeline::new(
        renderer,
        SigningEngine::default(),
        credentials,
        WorkDir::create(dir.join("work")).unwrap(),
    )
}

fn pipeline(dir: &Path) -> DocumentPipeline {
    let keystore = fixtures::write_rsa_keystore(dir, PASS);
    pipeline_with(
        dir,
        PageRenderer::default(),
        SigningCredentials::from_path(keystore, PASS),
    )
}

fn content_of(pdf: &[u8]) -> Vec<u8> {
    PdfReader::from_bytes(pdf).unwrap().page_content(1).unwrap()
}

#[test]
fn invoice_is_rendered_signed_and_the_transient_removed() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path());
    let document = Document::new(DocumentId(1), "Invoice", "Total: $42");

    let artifact = pipeline.run(&document).unwrap();
    let unsigned = PageRenderer::default().render("Invoice", "Total: $42").unwrap();

    assert!(!artifact.bytes.is_empty());
    assert_ne!(artifact.bytes, unsigned.bytes);
    assert_eq!(content_of(&artifact.bytes), content_of(&unsigned.bytes));
    assert!(SignatureInfo::extract(&artifact.bytes).unwrap().digest_matches());

    let paths = pipeline.workdir().paths_for(document.id);
    assert!(!paths.unsigned.exists());
    assert_eq!(std::fs::read(&paths.signed).unwrap(), artifact.bytes);
}

#[test]
fn empty_document_renders_and_signs() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path());

    let artifact = pipeline.run(&Document::new(DocumentId(2), "", "")).unwrap();
    assert!(SignatureInfo::extract(&artifact.bytes).unwrap().digest_matches());
    assert_eq!(PdfReader::from_bytes(&artifact.bytes).unwrap().page_count(), 1);
}

#[test]
fn concurrent_identities_do_not_see_each_other() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Arc::new(pipeline(dir.path()));

    let handles: Vec<_> = [(3, "Doc three", "alpha"), (4, "Doc four", "beta")]
        .into_iter()
        .map(|(id, title, body)| {
            let pipeline = Arc::clone(&pipeline);
            let document = Document::new(DocumentId(id), title, body);
            std::thread::spawn(move || pipeline.run(&document).unwrap())
        })
        .collect();
    let artifacts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let three = PageRenderer::default().render("Doc three", "alpha").unwrap();
    let four = PageRenderer::default().render("Doc four", "beta").unwrap();
    assert_eq!(content_of(&artifacts[0].bytes), content_of(&three.bytes));
    assert_eq!(content_of(&artifacts[1].bytes), content_of(&four.bytes));

    for id in [3, 4] {
        let paths = pipeline.workdir().paths_for(DocumentId(id));
        assert!(paths.signed.exists());
        assert!(!paths.unsigned.exists());
    }
}

#[test]
fn same_identity_runs_are_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Arc::new(pipeline(dir.path()));

    let handles: Vec<_> = (0..3)
        .map(|n| {
            let pipeline = Arc::clone(&pipeline);
            std::thread::spawn(move || {
                pipeline
                    .run(&Document::new(DocumentId(5), format!("Revision {n}"), "body"))
                    .unwrap()
            })
        })
        .collect();
    let artifacts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // The file on disk is exactly one of the complete runs.
    let on_disk = std::fs::read(pipeline.workdir().paths_for(DocumentId(5)).signed).unwrap();
    assert!(artifacts.iter().any(|a| a.bytes == on_disk));
    assert!(SignatureInfo::extract(&on_disk).unwrap().digest_matches());
    assert!(!pipeline.workdir().paths_for(DocumentId(5)).unsigned.exists());
}

#[test]
fn wrong_passphrase_retains_the_unsigned_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let keystore = fixtures::write_rsa_keystore(dir.path(), PASS);
    let pipeline = pipeline_with(
        dir.path(),
        PageRenderer::default(),
        SigningCredentials::from_path(keystore, "not the passphrase"),
    );

    let err = pipeline.run(&Document::new(DocumentId(6), "t", "b")).unwrap_err();
    let paths = pipeline.workdir().paths_for(DocumentId(6));

    assert!(matches!(err.cause(), DocsealError::KeystoreDecodeFailed(_)));
    assert_eq!(err.retained_artifact(), Some(paths.unsigned.as_path()));
    assert!(paths.unsigned.exists());
    assert!(!paths.signed.exists());
}

#[test]
fn non_rsa_keystore_writes_no_signed_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let keystore = fixtures::write_ecdsa_keystore(dir.path(), PASS);
    let pipeline = pipeline_with(
        dir.path(),
        PageRenderer::default(),
        SigningCredentials::from_path(keystore, PASS),
    );

    let err = pipeline.run(&Document::new(DocumentId(7), "t", "b")).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Sign {
            source: DocsealError::UnsupportedKeyType(_),
            ..
        }
    ));
    assert!(!pipeline.workdir().paths_for(DocumentId(7)).signed.exists());
}

#[test]
fn missing_font_fails_before_anything_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let keystore = fixtures::write_rsa_keystore(dir.path(), PASS);
    let pipeline = pipeline_with(
        dir.path(),
        PageRenderer::new(FontSource::File(dir.path().join("missing.ttf"))),
        SigningCredentials::from_path(keystore, PASS),
    );

    let err = pipeline.run(&Document::new(DocumentId(8), "t", "b")).unwrap_err();
    let paths = pipeline.workdir().paths_for(DocumentId(8));

    assert!(matches!(err, PipelineError::Render(DocsealError::FontUnavailable(_))));
    assert_eq!(err.retained_artifact(), None);
    assert!(!paths.unsigned.exists());
    assert!(!paths.signed.exists());
}

#[test]
fn missing_keystore_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_with(
        dir.path(),
        PageRenderer::default(),
        SigningCredentials::from_path(dir.path().join("absent.p12"), PASS),
    );

    let err = pipeline.run(&Document::new(DocumentId(9), "t", "b")).unwrap_err();
    assert!(matches!(err.cause(), DocsealError::KeystoreUnreadable(_)));
}
