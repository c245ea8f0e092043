//! Two-tier lookups: a remote primary backed by a static table.
use std::future::Future;

use guardian_core::LookupSource;
use serde::Serialize;
use tracing::warn;

use crate::error::Result;

/// A looked-up value tagged with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lookup<T> {
    pub value: T,
    pub source: LookupSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl<T> Lookup<T> {
    pub fn primary(value: T, name: &str) -> Self {
        Self {
            value,
            source: LookupSource::primary(name),
            note: None,
        }
    }

    pub fn fallback(value: T, name: &str) -> Self {
        Self {
            value,
            source: LookupSource::fallback(name),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Tries `primary` and substitutes `fallback` on any error. A missing
/// primary (no API key configured) goes straight to the fallback.
///
/// The tool traits are implemented for this type in their own modules.
pub struct WithFallback<P, F> {
    pub(crate) primary: Option<P>,
    pub(crate) fallback: F,
}

impl<P, F> WithFallback<P, F> {
    pub fn new(primary: Option<P>, fallback: F) -> Self {
        Self { primary, fallback }
    }

    /// Name of the tier consulted first.
    pub(crate) fn active_name(
        &self,
        primary_name: impl FnOnce(&P) -> &'static str,
        fallback_name: impl FnOnce(&F) -> &'static str,
    ) -> &'static str {
        match &self.primary {
            Some(primary) => primary_name(primary),
            None => fallback_name(&self.fallback),
        }
    }

    /// Run `primary` when configured; on error log it and run `fallback`.
    pub(crate) async fn resolve<'a, T, PFut, FFut>(
        &'a self,
        lookup: &'static str,
        primary_name: impl FnOnce(&P) -> &'static str,
        primary: impl FnOnce(&'a P) -> PFut,
        fallback: impl FnOnce(&'a F) -> FFut,
    ) -> Result<T>
    where
        PFut: Future<Output = Result<T>>,
        FFut: Future<Output = Result<T>>,
    {
        if let Some(tier) = &self.primary {
            match primary(tier).await {
                Ok(found) => return Ok(found),
                Err(err) => warn!(
                    primary = primary_name(tier),
                    lookup,
                    error = %err,
                    "lookup failed, using fallback data"
                ),
            }
        }
        fallback(&self.fallback).await
    }
}
