//! # specular_catalog
//!
//! Ready-made spec domains for specular.
//!
//! Each domain module registers a family of named specs (and, for some,
//! function specs) into a [`Registry`](specular_spec::Registry):
//!
//! - `cards`: suits, ranks, hands, players and a game
//! - `person`: person records with an email pattern
//! - `events`: a multi-spec keyed on `:event/type`
//! - `recipe`: regex sequence specs
//! - `options`: option lists with string or boolean values
//! - `fish`: the fish rhyme and its line function
//! - `ranged_rand`: argument/return relation of a ranged random function
//!
//! ## Example
//!
//! ```rust
//! use specular_catalog::{cards, Domain};
//! use specular_spec::Registry;
//!
//! let registry = Registry::new();
//! Domain::Cards.install(&registry).unwrap();
//! assert!(registry.valid(cards::DECK, &cards::deck()).unwrap());
//! ```

pub mod cards;
pub mod domain;
pub mod error;
pub mod events;
pub mod fish;
pub mod options;
pub mod person;
pub mod ranged_rand;
pub mod recipe;

pub use domain::{install_all, install_domains, Domain};
pub use error::{CatalogError, CatalogResult};
