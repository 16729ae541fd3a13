//! Shared fixtures for the specs

#![allow(dead_code)]

pub use std::sync::Arc;
pub use wv_core::{
    DeltaRecord, DocOp, FakeClock, HashedVersion, HashedVersionFactory, ParticipantId,
    Sha256VersionFactory, WaveletDelta, WaveletName, WaveletOperation,
};
pub use wv_engine::{EngineConfig, SubmitError, WaveletRegistry};
pub use wv_storage::{DeltaStore, FileDeltaStore, MemoryDeltaStore};

pub const ALICE: &str = "alice@example.com";
pub const BOB: &str = "bob@example.com";
pub const CAROL: &str = "carol@example.com";

/// The blip every document edit in the specs targets
pub const BLIP: &str = "b+main";

pub fn name() -> WaveletName {
    WaveletName::of("example.com", "w+spec", "conv+root").unwrap()
}

pub fn p(address: &str) -> ParticipantId {
    ParticipantId::new(address).unwrap()
}

pub fn add(address: &str) -> WaveletOperation {
    WaveletOperation::add_participant(p(address))
}

pub fn remove(address: &str) -> WaveletOperation {
    WaveletOperation::remove_participant(p(address))
}

pub fn edit(op: DocOp) -> WaveletOperation {
    WaveletOperation::blip(BLIP, op)
}

pub fn delta(author: &str, target: &HashedVersion, ops: Vec<WaveletOperation>) -> WaveletDelta {
    WaveletDelta::new(p(author), target.clone(), ops)
}

pub fn factory() -> Sha256VersionFactory {
    Sha256VersionFactory::default()
}

pub fn v0() -> HashedVersion {
    factory().create_version_zero(&name())
}

pub fn registry(store: Arc<dyn DeltaStore>) -> WaveletRegistry<FakeClock> {
    WaveletRegistry::new(store, FakeClock::new(), EngineConfig::default()).unwrap()
}

pub fn memory_registry() -> WaveletRegistry<FakeClock> {
    registry(Arc::new(MemoryDeltaStore::new()))
}

/// Submit and unwrap the committed record
pub async fn commit(
    registry: &WaveletRegistry<FakeClock>,
    delta: WaveletDelta,
) -> Arc<DeltaRecord> {
    registry.submit(&name(), delta).await.unwrap().record
}

/// The version a delta would end at if committed exactly as given
pub fn expected_version(delta: &WaveletDelta) -> HashedVersion {
    let bytes = delta.to_canonical_bytes().unwrap();
    factory()
        .create(&bytes, delta.target_version(), delta.len() as u32)
        .unwrap()
}
