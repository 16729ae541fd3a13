// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wv-core: wavelet data model and operational transform
//!
//! This crate provides:
//! - Identifiers for participants, waves and wavelets
//! - Hashed versions and the hash chain that produces them
//! - Wavelet operations, deltas, and committed delta records
//! - The transform that rebases a delta over concurrent history
//! - Snapshots materialized by applying deltas
//! - Client-side concurrency control for one wavelet

pub mod client;
pub mod clock;
pub mod delta;
pub mod doc;
pub mod id;
pub mod operation;
pub mod transform;
pub mod version;
pub mod version_factory;
pub mod wavelet;

pub use client::{ClientConcurrencyControl, ClientError};
pub use clock::{Clock, FakeClock, SystemClock};
pub use delta::{DeltaError, DeltaRecord, TransformedWaveletDelta, WaveletDelta};
pub use doc::{DocComponent, DocOp, DocOpError};
pub use id::{IdError, ParticipantId, WaveId, WaveletId, WaveletName};
pub use operation::WaveletOperation;
pub use transform::{
    transform_delta, transform_operation, transform_ops, DeltaTransformError, OperationConflict,
    TransformError,
};
pub use version::HashedVersion;
pub use version_factory::{
    HashedVersionFactory, Sha256VersionFactory, VersionError, VersionZeroFactory,
    DEFAULT_HASH_BITS,
};
pub use wavelet::{ApplyError, WaveletData};
