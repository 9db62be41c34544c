// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Building blocks of an embedded PDF signature: the reserved byte ranges, the
// incremental update carrying the signature field, and the CMS blob.

pub mod byterange;
pub mod cms;
pub mod incremental;
pub mod syntax;

pub use byterange::{ByteRange, ContentsPlaceholder};
pub use cms::SignatureContext;
