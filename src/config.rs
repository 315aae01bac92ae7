//! Pagination settings shared by every request a service builds.
use std::env;
use std::sync::Arc;

use serde::Deserialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::cursor::{Base64Codec, Base64UrlCodec, CursorCodec, IdentityCodec};
use crate::error::{PagingError, PagingResult};

pub const ENV_MAX_PAGE_SIZE: &str = "RELAY_PAGING_MAX_PAGE_SIZE";
pub const ENV_MISSING_CURSOR: &str = "RELAY_PAGING_MISSING_CURSOR";
pub const ENV_CURSOR_CODEC: &str = "RELAY_PAGING_CURSOR_CODEC";

/// What to do with a cursor that fails to decode, or whose row no longer exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, EnumString, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum MissingCursorPolicy {
    /// Fail the request.
    #[default]
    #[strum(serialize = "reject")]
    Reject,
    /// Paginate as if no cursor had been given.
    #[serde(alias = "omit")]
    #[strum(serialize = "ignore", serialize = "omit")]
    Ignore,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, EnumString, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum CodecKind {
    #[default]
    #[strum(serialize = "base64")]
    Base64,
    #[serde(rename = "base64url")]
    #[strum(serialize = "base64url")]
    Base64Url,
    #[strum(serialize = "identity")]
    Identity,
}

impl CodecKind {
    pub fn codec(&self) -> Arc<dyn CursorCodec> {
        match self {
            CodecKind::Base64 => Arc::new(Base64Codec),
            CodecKind::Base64Url => Arc::new(Base64UrlCodec),
            CodecKind::Identity => Arc::new(IdentityCodec),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PagingConfig {
    /// Largest accepted `first`/`last`. Unbounded when `None`.
    pub max_page_size: Option<usize>,
    pub missing_cursor: MissingCursorPolicy,
    pub codec: CodecKind,
}

impl PagingConfig {
    /// Build a config from `RELAY_PAGING_*` environment variables, defaulting anything unset.
    pub fn from_env() -> PagingResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> PagingResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = PagingConfig::default();

        if let Some(raw) = lookup(ENV_MAX_PAGE_SIZE) {
            let size = raw.trim().parse::<usize>().map_err(|e| {
                PagingError::InvalidRequest(format!("{ENV_MAX_PAGE_SIZE}=`{raw}`: {e}"))
            })?;
            if size == 0 {
                return Err(PagingError::InvalidRequest(format!(
                    "{ENV_MAX_PAGE_SIZE} must be positive"
                )));
            }
            config.max_page_size = Some(size);
        }

        if let Some(raw) = lookup(ENV_MISSING_CURSOR) {
            config.missing_cursor = raw.trim().parse().map_err(|_| {
                PagingError::InvalidRequest(format!(
                    "{ENV_MISSING_CURSOR}=`{raw}` is not one of reject, ignore"
                ))
            })?;
        }

        if let Some(raw) = lookup(ENV_CURSOR_CODEC) {
            config.codec = raw.trim().parse().map_err(|_| {
                PagingError::InvalidRequest(format!(
                    "{ENV_CURSOR_CODEC}=`{raw}` is not one of base64, base64url, identity"
                ))
            })?;
        }

        Ok(config)
    }
}
