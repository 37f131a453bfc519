//! The catalog's domains and how to install them.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use specular_spec::Registry;
use tracing::{debug, info};

use crate::error::{CatalogError, CatalogResult};
use crate::{cards, events, fish, options, person, ranged_rand, recipe};

/// A group of related specs from the tutorials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    Cards,
    Person,
    Events,
    Recipe,
    Options,
    Fish,
    RangedRand,
}

impl Domain {
    pub const ALL: [Domain; 7] = [
        Domain::Cards,
        Domain::Person,
        Domain::Events,
        Domain::Recipe,
        Domain::Options,
        Domain::Fish,
        Domain::RangedRand,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Domain::Cards => "cards",
            Domain::Person => "person",
            Domain::Events => "events",
            Domain::Recipe => "recipe",
            Domain::Options => "options",
            Domain::Fish => "fish",
            Domain::RangedRand => "ranged-rand",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Domain::Cards => "Card game: cards, hands, players and game state",
            Domain::Person => "Person records with a validated email address",
            Domain::Events => "Events dispatched on their :event/type",
            Domain::Recipe => "Sequence specs: ingredients, odds and evens, nesting",
            Domain::Options => "Command-line style option lists",
            Domain::Fish => "The fish rhyme and its instrumented line function",
            Domain::RangedRand => "Function spec relating arguments and return value",
        }
    }

    /// Names of the data specs this domain registers.
    pub fn specs(&self) -> &'static [&'static str] {
        match self {
            Domain::Cards => cards::SPECS,
            Domain::Person => person::SPECS,
            Domain::Events => events::SPECS,
            Domain::Recipe => recipe::SPECS,
            Domain::Options => options::SPECS,
            Domain::Fish => fish::SPECS,
            Domain::RangedRand => ranged_rand::SPECS,
        }
    }

    /// Names of the function specs this domain registers.
    pub fn fn_specs(&self) -> &'static [&'static str] {
        match self {
            Domain::Fish => fish::FN_SPECS,
            Domain::RangedRand => ranged_rand::FN_SPECS,
            _ => &[],
        }
    }

    pub fn install(&self, registry: &Registry) -> CatalogResult<()> {
        debug!("Installing catalog domain {}", self.id());
        match self {
            Domain::Cards => cards::install(registry)?,
            Domain::Person => person::install(registry)?,
            Domain::Events => events::install(registry)?,
            Domain::Recipe => recipe::install(registry)?,
            Domain::Options => options::install(registry)?,
            Domain::Fish => fish::install(registry)?,
            Domain::RangedRand => ranged_rand::install(registry)?,
        }
        Ok(())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Domain {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CatalogError::UnknownDomain(s.to_string()))
    }
}

/// Install `domains` in order into `registry`.
pub fn install_domains(registry: &Registry, domains: &[Domain]) -> CatalogResult<()> {
    for domain in domains {
        domain.install(registry)?;
    }
    info!("Installed {} catalog domains", domains.len());
    Ok(())
}

/// Install every domain.
pub fn install_all(registry: &Registry) -> CatalogResult<()> {
    install_domains(registry, &Domain::ALL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_ids_round_trip() {
        for domain in Domain::ALL {
            assert_eq!(domain.id().parse::<Domain>().unwrap(), domain);
        }
        assert!(matches!(
            "poker".parse::<Domain>(),
            Err(CatalogError::UnknownDomain(_))
        ));
    }

    #[test]
    fn test_install_registers_listed_specs() {
        for domain in Domain::ALL {
            let registry = Registry::new();
            domain.install(&registry).unwrap();
            let mut expected: Vec<String> = domain.specs().iter().map(|s| s.to_string()).collect();
            expected.sort();
            assert_eq!(registry.names(), expected, "domain {}", domain);
            let mut fns: Vec<String> = domain.fn_specs().iter().map(|s| s.to_string()).collect();
            fns.sort();
            assert_eq!(registry.fn_names(), fns, "domain {}", domain);
        }
    }
}
