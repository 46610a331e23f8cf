//! Job sites the engine knows how to crawl.
//!
//! A source is a [`SourceProfile`]: URL templates, render mode, pagination
//! policy and selectors. Two profiles are built in; configuration may replace
//! either of them.

mod hellowork;
mod profile;
mod wttj;

pub use profile::{
    render_template, CompiledSource, DetailSelectors, ListingSelectors, SectionSpec,
    SourceProfile, TitleRule,
};

use std::collections::BTreeMap;

use crate::core::SourceId;
use crate::errors::ConfigurationError;

/// The built-in profile for `id`.
#[must_use]
pub fn builtin_profile(id: SourceId) -> SourceProfile {
    match id {
        SourceId::HelloWork => hellowork::profile(),
        SourceId::WelcomeToTheJungle => wttj::profile(),
    }
}

/// Compiled profiles by source.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: BTreeMap<SourceId, CompiledSource>,
}

impl SourceRegistry {
    /// Compiles the built-in profiles.
    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::with_overrides(&[])
    }

    /// Compiles the built-in profiles, replacing any with a matching override.
    pub fn with_overrides(overrides: &[SourceProfile]) -> Result<Self, ConfigurationError> {
        let mut profiles: BTreeMap<SourceId, SourceProfile> = SourceId::ALL
            .into_iter()
            .map(|id| (id, builtin_profile(id)))
            .collect();
        for profile in overrides {
            tracing::debug!(source = %profile.id, "Using configured source profile");
            profiles.insert(profile.id, profile.clone());
        }

        let sources = profiles
            .into_iter()
            .map(|(id, profile)| profile.compile().map(|compiled| (id, compiled)))
            .collect::<Result<_, _>>()?;
        Ok(Self { sources })
    }

    /// Compiled source for `id`.
    pub fn get(&self, id: SourceId) -> Result<&CompiledSource, ConfigurationError> {
        self.sources.get(&id).ok_or_else(|| {
            ConfigurationError::new(format!("No profile registered for source '{id}'"))
                .with_field("sources")
        })
    }

    /// Registered source ids.
    pub fn ids(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.sources.keys().copied()
    }
}
