// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Participant and wavelet identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const URI_SCHEME: &str = "wave://";

/// Errors from parsing or validating identifiers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("invalid participant address: {0}")]
    InvalidParticipant(String),
    #[error("invalid {kind} component: {value:?}")]
    InvalidComponent { kind: &'static str, value: String },
    #[error("invalid wavelet uri: {0}")]
    InvalidUri(String),
}

/// Address of a participant, `name@domain`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(address: impl Into<String>) -> Result<Self, IdError> {
        let address = address.into();
        let mut parts = address.split('@');
        let valid = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(name), Some(domain), None) if !name.is_empty() && !domain.is_empty()
        );
        if !valid {
            return Err(IdError::InvalidParticipant(address));
        }
        Ok(Self(address))
    }

    pub fn address(&self) -> &str {
        &self.0
    }

    /// The part after `@`
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map(|(_, d)| d).unwrap_or_default()
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn check_component(kind: &'static str, value: &str) -> Result<(), IdError> {
    if value.is_empty() || value.contains('/') || value.chars().any(char::is_whitespace) {
        return Err(IdError::InvalidComponent {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Identifies a wave within its home domain
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaveId {
    domain: String,
    id: String,
}

impl WaveId {
    pub fn new(domain: impl Into<String>, id: impl Into<String>) -> Result<Self, IdError> {
        let (domain, id) = (domain.into(), id.into());
        check_component("domain", &domain)?;
        check_component("wave id", &id)?;
        Ok(Self { domain, id })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Identifies a wavelet within a wave
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaveletId {
    domain: String,
    id: String,
}

impl WaveletId {
    pub fn new(domain: impl Into<String>, id: impl Into<String>) -> Result<Self, IdError> {
        let (domain, id) = (domain.into(), id.into());
        check_component("domain", &domain)?;
        check_component("wavelet id", &id)?;
        Ok(Self { domain, id })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Fully-qualified wavelet name: the unit of history and concurrency control
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WaveletName {
    wave_id: WaveId,
    wavelet_id: WaveletId,
}

impl WaveletName {
    pub fn new(wave_id: WaveId, wavelet_id: WaveletId) -> Self {
        Self {
            wave_id,
            wavelet_id,
        }
    }

    /// Shorthand for a wavelet living in the same domain as its wave
    pub fn of(domain: &str, wave_id: &str, wavelet_id: &str) -> Result<Self, IdError> {
        Ok(Self::new(
            WaveId::new(domain, wave_id)?,
            WaveletId::new(domain, wavelet_id)?,
        ))
    }

    pub fn wave_id(&self) -> &WaveId {
        &self.wave_id
    }

    pub fn wavelet_id(&self) -> &WaveletId {
        &self.wavelet_id
    }

    /// Canonical URI encoding
    ///
    /// The wavelet domain is elided when it equals the wave domain.
    pub fn to_uri(&self) -> String {
        if self.wave_id.domain == self.wavelet_id.domain {
            format!(
                "{}{}/{}/{}",
                URI_SCHEME, self.wave_id.domain, self.wave_id.id, self.wavelet_id.id
            )
        } else {
            format!(
                "{}{}/{}/{}/{}",
                URI_SCHEME,
                self.wave_id.domain,
                self.wave_id.id,
                self.wavelet_id.domain,
                self.wavelet_id.id
            )
        }
    }
}

impl FromStr for WaveletName {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IdError::InvalidUri(s.to_string());
        let rest = s.strip_prefix(URI_SCHEME).ok_or_else(invalid)?;
        let parts: Vec<&str> = rest.split('/').collect();
        match parts.as_slice() {
            [domain, wave, wavelet] => {
                WaveletName::of(domain, wave, wavelet).map_err(|_| invalid())
            }
            [domain, wave, wavelet_domain, wavelet] => Ok(WaveletName::new(
                WaveId::new(*domain, *wave).map_err(|_| invalid())?,
                WaveletId::new(*wavelet_domain, *wavelet).map_err(|_| invalid())?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for WaveletName {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WaveletName> for String {
    fn from(name: WaveletName) -> Self {
        name.to_uri()
    }
}

impl fmt::Display for WaveletName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
