//! Selector - constraint-driven assignment of world actors to quest roles.
//!
//! Every actor handed out is reserved, so one generation attempt never binds
//! the same place or person to two roles. Running out of candidates is a
//! rollback condition: the caller restarts the whole attempt.

mod catalog;

pub use catalog::*;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use quest_model::{Fact, FactId, FactKind, Kind, SocialConnectionKind};

use crate::error::join_ids;
use crate::knowledge_base::KnowledgeBase;
use crate::GenerationError;

/// Retryable selection failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectorError {
    #[error("No {role} candidate for {filters} (reserved: {})", join_ids(.reserved))]
    NoCandidate {
        role: &'static str,
        filters: String,
        reserved: Vec<FactId>,
    },

    #[error("No location known for: {}", join_ids(.objects))]
    NoLocation { objects: Vec<FactId> },

    #[error("No quest template {entry} matches {filters}")]
    NoQuestTemplate { entry: EntryPoint, filters: String },

    #[error("Template {quest_type} cannot be built {entry}")]
    UnsupportedConstruction { quest_type: String, entry: EntryPoint },
}

/// Selector tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Chance, per preferred connection, that a person filter honors its
    /// social connections. Capped at 1.
    pub social_connection_probability: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            social_connection_probability: 0.5,
        }
    }
}

/// Constraints for [`Selector::new_place`]. Empty constraints match anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceFilter {
    pub candidates: Option<BTreeSet<FactId>>,
    /// The place must have at least one of these terrains.
    pub terrains: BTreeSet<String>,
    pub place_types: BTreeSet<String>,
}

impl PlaceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidates<T: Into<FactId>>(mut self, candidates: impl IntoIterator<Item = T>) -> Self {
        self.candidates = Some(candidates.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_terrain(mut self, terrain: impl Into<String>) -> Self {
        self.terrains.insert(terrain.into());
        self
    }

    pub fn with_type(mut self, place_type: impl Into<String>) -> Self {
        self.place_types.insert(place_type.into());
        self
    }

    fn matches(&self, fact: &Fact) -> bool {
        let FactKind::Place(place) = &fact.kind else {
            return false;
        };

        self.candidates
            .as_ref()
            .map_or(true, |candidates| candidates.contains(&fact.uid))
            && (self.terrains.is_empty() || !self.terrains.is_disjoint(&place.terrains))
            && (self.place_types.is_empty()
                || place
                    .place_type
                    .as_ref()
                    .is_some_and(|place_type| self.place_types.contains(place_type)))
    }
}

/// Constraints for [`Selector::new_person`]. Empty constraints match anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonFilter {
    pub candidates: Option<BTreeSet<FactId>>,
    /// The person must be located in one of these places.
    pub places: BTreeSet<FactId>,
    pub professions: BTreeSet<String>,
    /// Preferred ties, in either direction. Applied probabilistically.
    pub social_connections: Vec<(FactId, SocialConnectionKind)>,
    /// Skip persons marked `NotFirstInitiator`.
    pub first_initiator: bool,
}

impl PersonFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidates<T: Into<FactId>>(mut self, candidates: impl IntoIterator<Item = T>) -> Self {
        self.candidates = Some(candidates.into_iter().map(Into::into).collect());
        self
    }

    pub fn in_place(mut self, place: impl Into<FactId>) -> Self {
        self.places.insert(place.into());
        self
    }

    pub fn with_profession(mut self, profession: impl Into<String>) -> Self {
        self.professions.insert(profession.into());
        self
    }

    pub fn with_social_connection(mut self, person: impl Into<FactId>, connection: SocialConnectionKind) -> Self {
        self.social_connections.push((person.into(), connection));
        self
    }

    pub fn first_initiator(mut self) -> Self {
        self.first_initiator = true;
        self
    }

    fn without_social_connections(&self) -> Self {
        Self {
            social_connections: Vec::new(),
            ..self.clone()
        }
    }

    fn matches(&self, fact: &Fact, knowledge_base: &KnowledgeBase) -> bool {
        let FactKind::Person(person) = &fact.kind else {
            return false;
        };

        if let Some(candidates) = &self.candidates {
            if !candidates.contains(&fact.uid) {
                return false;
            }
        }

        if !self.professions.is_empty()
            && !person
                .profession
                .as_ref()
                .is_some_and(|profession| self.professions.contains(profession))
        {
            return false;
        }

        if !self.places.is_empty() {
            let located = knowledge_base.filter(Kind::LocatedIn).any(|relation| {
                matches!(&relation.kind, FactKind::LocatedIn(located)
                    if located.object == fact.uid && self.places.contains(&located.place))
            });
            if !located {
                return false;
            }
        }

        if self.first_initiator {
            let marked = knowledge_base.filter(Kind::NotFirstInitiator).any(|relation| {
                matches!(&relation.kind, FactKind::NotFirstInitiator(marker) if marker.person == fact.uid)
            });
            if marked {
                return false;
            }
        }

        self.social_connections.iter().all(|(other, connection)| {
            knowledge_base.filter(Kind::SocialConnection).any(|relation| {
                matches!(&relation.kind, FactKind::SocialConnection(social)
                    if social.connection == *connection
                        && ((social.person_from == fact.uid && social.person_to == *other)
                            || (social.person_to == fact.uid && social.person_from == *other)))
            })
        })
    }
}

/// Hands out world actors for one generation attempt.
///
/// Reads the world from the knowledge base it was created with; holds the
/// reservation set and the quest types excluded from further nesting.
pub struct Selector<'a> {
    knowledge_base: &'a KnowledgeBase,
    catalog: &'a QuestCatalog,
    rng: &'a mut dyn RngCore,
    config: SelectorConfig,
    reserved: BTreeSet<FactId>,
    excluded_quests: BTreeSet<String>,
    namespaces: u32,
}

impl<'a> Selector<'a> {
    pub fn new(
        knowledge_base: &'a KnowledgeBase,
        catalog: &'a QuestCatalog,
        rng: &'a mut dyn RngCore,
        config: SelectorConfig,
    ) -> Self {
        Self {
            knowledge_base,
            catalog,
            rng,
            config,
            reserved: BTreeSet::new(),
            excluded_quests: BTreeSet::new(),
            namespaces: 0,
        }
    }

    pub fn knowledge_base(&self) -> &'a KnowledgeBase {
        self.knowledge_base
    }

    /// A fresh identifier prefix, unique within this attempt.
    pub fn namespace(&mut self) -> String {
        self.namespaces += 1;
        format!("q{}_", self.namespaces)
    }

    pub fn reserve(&mut self, id: impl Into<FactId>) {
        self.reserved.insert(id.into());
    }

    pub fn is_reserved(&self, id: &FactId) -> bool {
        self.reserved.contains(id)
    }

    pub fn reserved(&self) -> &BTreeSet<FactId> {
        &self.reserved
    }

    /// Quest types that may no longer be picked in this attempt.
    pub fn excluded_quests(&self) -> &BTreeSet<String> {
        &self.excluded_quests
    }

    /// The protagonist of the world.
    pub fn hero(&self) -> Result<FactId, SelectorError> {
        self.knowledge_base
            .filter(Kind::Hero)
            .next()
            .map(|hero| hero.uid.clone())
            .ok_or_else(|| SelectorError::NoCandidate {
                role: "hero",
                filters: String::new(),
                reserved: Vec::new(),
            })
    }

    /// Pick and reserve an unreserved place matching `filter`.
    pub fn new_place(&mut self, filter: PlaceFilter) -> Result<FactId, SelectorError> {
        let candidates: Vec<&FactId> = self
            .knowledge_base
            .filter(Kind::Place)
            .filter(|fact| !self.reserved.contains(&fact.uid) && filter.matches(fact))
            .map(|fact| &fact.uid)
            .collect();

        self.claim("place", candidates, || format!("{filter:?}"))
    }

    /// Pick and reserve an unreserved person matching `filter`.
    ///
    /// Social connections are honored with probability
    /// `min(1, social_connection_probability * connections)`; when honoring
    /// them leaves no candidate, the draw is retried once without them.
    pub fn new_person(&mut self, filter: PersonFilter) -> Result<FactId, SelectorError> {
        let connections = filter.social_connections.len();
        let probability = (self.config.social_connection_probability * connections as f64).min(1.0);

        let social = connections > 0 && self.rng.gen_bool(probability.max(0.0));
        let relaxed = filter.without_social_connections();

        let mut candidates = if social {
            self.person_candidates(&filter)
        } else {
            Vec::new()
        };

        if candidates.is_empty() {
            if social {
                tracing::debug!(connections, "Relaxed social connection filter");
            }
            candidates = self.person_candidates(&relaxed);
        }

        self.claim("person", candidates, || format!("{filter:?}"))
    }

    /// The location of any of `objects`, reserved for the caller.
    pub fn place_for(&mut self, objects: &[FactId]) -> Result<FactId, SelectorError> {
        let places: Vec<&FactId> = self
            .knowledge_base
            .filter(Kind::LocatedIn)
            .filter_map(|fact| match &fact.kind {
                FactKind::LocatedIn(located) if objects.contains(&located.object) => Some(&located.place),
                _ => None,
            })
            .collect();

        let Some(place) = places.choose(&mut *self.rng) else {
            return Err(SelectorError::NoLocation {
                objects: objects.to_vec(),
            });
        };

        let place = (*place).clone();
        self.reserve(place.clone());
        Ok(place)
    }

    /// Pick a template entered from a place and build it.
    pub fn create_quest_from_place(
        &mut self,
        nesting: u32,
        place: &FactId,
        filter: &QuestFilter,
    ) -> Result<Vec<Fact>, GenerationError> {
        let template = self.pick_template(EntryPoint::FromPlace, filter)?;
        template.construct_from_place(self, nesting, place)
    }

    /// Pick a template entered by an initiator and build it.
    pub fn create_quest_from_person(
        &mut self,
        nesting: u32,
        initiator: &FactId,
        filter: &QuestFilter,
    ) -> Result<Vec<Fact>, GenerationError> {
        let template = self.pick_template(EntryPoint::FromPerson, filter)?;
        template.construct_from_person(self, nesting, initiator)
    }

    /// Pick a template running between two persons and build it.
    pub fn create_quest_between_2(
        &mut self,
        nesting: u32,
        initiator: &FactId,
        receiver: &FactId,
        filter: &QuestFilter,
    ) -> Result<Vec<Fact>, GenerationError> {
        let template = self.pick_template(EntryPoint::Between2, filter)?;
        template.construct_between_2(self, nesting, initiator, receiver)
    }

    fn person_candidates(&self, filter: &PersonFilter) -> Vec<&'a FactId> {
        self.knowledge_base
            .filter(Kind::Person)
            .filter(|fact| !self.reserved.contains(&fact.uid) && filter.matches(fact, self.knowledge_base))
            .map(|fact| &fact.uid)
            .collect()
    }

    fn claim(
        &mut self,
        role: &'static str,
        candidates: Vec<&FactId>,
        filters: impl FnOnce() -> String,
    ) -> Result<FactId, SelectorError> {
        let Some(chosen) = candidates.choose(&mut *self.rng) else {
            return Err(SelectorError::NoCandidate {
                role,
                filters: filters(),
                reserved: self.reserved.iter().cloned().collect(),
            });
        };

        let chosen = (*chosen).clone();
        self.reserve(chosen.clone());
        Ok(chosen)
    }

    /// Uniformly pick a template supporting `entry` and passing `filter`.
    /// Templates owning subquests are excluded from then on.
    fn pick_template(&mut self, entry: EntryPoint, filter: &QuestFilter) -> Result<&'a dyn QuestTemplate, SelectorError> {
        let catalog = self.catalog;
        let templates: Vec<&dyn QuestTemplate> = catalog
            .templates()
            .filter(|template| {
                template.supports(entry)
                    && filter.matches(*template)
                    && !self.excluded_quests.contains(template.quest_type())
            })
            .collect();

        let Some(template) = templates.choose(&mut *self.rng).copied() else {
            return Err(SelectorError::NoQuestTemplate {
                entry,
                filters: format!("{filter:?}"),
            });
        };

        if template.has_tag(QuestTag::HasSubquests) {
            self.excluded_quests.insert(template.quest_type().to_string());
        }
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, DeliveryTemplate, HelpTemplate};
    use quest_model::SocialConnection;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_place_reserves() {
        let kb = testing::world();
        let catalog = QuestCatalog::new();
        let mut rng = StdRng::seed_from_u64(1);
        let mut selector = Selector::new(&kb, &catalog, &mut rng, SelectorConfig::default());

        let mut picked = BTreeSet::new();
        for _ in 0..3 {
            let place = selector.new_place(PlaceFilter::new()).unwrap();
            assert!(selector.is_reserved(&place));
            picked.insert(place);
        }
        assert_eq!(picked.len(), 3);

        let err = selector.new_place(PlaceFilter::new()).unwrap_err();
        match err {
            SelectorError::NoCandidate { role, reserved, .. } => {
                assert_eq!(role, "place");
                assert_eq!(reserved.len(), 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_place_filters() {
        let kb = testing::world();
        let catalog = QuestCatalog::new();
        let mut rng = StdRng::seed_from_u64(2);
        let mut selector = Selector::new(&kb, &catalog, &mut rng, SelectorConfig::default());

        let place = selector.new_place(PlaceFilter::new().with_terrain("forest")).unwrap();
        assert_eq!(place.as_str(), "town_b");

        let place = selector.new_place(PlaceFilter::new().with_type("city")).unwrap();
        assert_eq!(place.as_str(), "town_a");

        assert!(selector
            .new_place(PlaceFilter::new().with_candidates(["town_a", "town_b"]))
            .is_err());
    }

    #[test]
    fn test_person_filters() {
        let kb = testing::world();
        let catalog = QuestCatalog::new();
        let mut rng = StdRng::seed_from_u64(3);
        let mut selector = Selector::new(&kb, &catalog, &mut rng, SelectorConfig::default());

        let person = selector
            .new_person(PersonFilter::new().with_profession("merchant").first_initiator())
            .unwrap();
        assert_eq!(person.as_str(), "p1");

        let person = selector.new_person(PersonFilter::new().in_place("town_b")).unwrap();
        assert_eq!(person.as_str(), "p2");

        assert!(selector.new_person(PersonFilter::new().first_initiator()).is_err());
    }

    #[test]
    fn test_no_candidate_reserves_nothing() {
        let kb = testing::world();
        let catalog = QuestCatalog::new();
        let mut rng = StdRng::seed_from_u64(3);
        let mut selector = Selector::new(&kb, &catalog, &mut rng, SelectorConfig::default());

        let err = selector
            .new_person(PersonFilter::new().with_profession("wizard"))
            .unwrap_err();
        assert!(matches!(err, SelectorError::NoCandidate { role: "person", .. }));
        assert!(selector.reserved().is_empty());
    }

    #[test]
    fn test_social_connection_always_honored_at_full_probability() {
        let mut kb = testing::world();
        kb.add_facts([
            Fact::new("p4", quest_model::Person::new()),
            Fact::new("p5", quest_model::Person::new()),
        ])
        .unwrap();

        let catalog = QuestCatalog::new();
        let config = SelectorConfig {
            social_connection_probability: 1.0,
        };

        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut selector = Selector::new(&kb, &catalog, &mut rng, config.clone());
            let person = selector
                .new_person(PersonFilter::new().with_social_connection("p2", SocialConnectionKind::Partner))
                .unwrap();
            assert_eq!(person.as_str(), "p1");
        }
    }

    #[test]
    fn test_social_connection_relaxed_when_unsatisfiable() {
        let mut kb = testing::world();
        kb.add_fact(Fact::derived(SocialConnection::new(
            "p3",
            "p2",
            SocialConnectionKind::Concurrent,
        )))
        .unwrap();

        let catalog = QuestCatalog::new();
        let config = SelectorConfig {
            social_connection_probability: 1.0,
        };
        let mut rng = StdRng::seed_from_u64(4);
        let mut selector = Selector::new(&kb, &catalog, &mut rng, config);

        selector.reserve("p1");
        selector.reserve("p3");
        let person = selector
            .new_person(PersonFilter::new().with_social_connection("p2", SocialConnectionKind::Partner))
            .unwrap();
        assert_eq!(person.as_str(), "p2");
    }

    #[test]
    fn test_place_for() {
        let kb = testing::world();
        let catalog = QuestCatalog::new();
        let mut rng = StdRng::seed_from_u64(5);
        let mut selector = Selector::new(&kb, &catalog, &mut rng, SelectorConfig::default());

        let place = selector.place_for(&[FactId::new("p2")]).unwrap();
        assert_eq!(place.as_str(), "town_b");
        assert!(selector.is_reserved(&place));

        assert_eq!(
            selector.place_for(&[FactId::new("nobody")]),
            Err(SelectorError::NoLocation {
                objects: vec![FactId::new("nobody")],
            })
        );
    }

    #[test]
    fn test_namespaces_are_unique() {
        let kb = testing::world();
        let catalog = QuestCatalog::new();
        let mut rng = StdRng::seed_from_u64(6);
        let mut selector = Selector::new(&kb, &catalog, &mut rng, SelectorConfig::default());

        assert_ne!(selector.namespace(), selector.namespace());
    }

    #[test]
    fn test_subquest_templates_excluded_after_use() {
        let kb = testing::world();
        let catalog = QuestCatalog::new()
            .with_template(DeliveryTemplate)
            .with_template(HelpTemplate);
        let mut rng = StdRng::seed_from_u64(7);
        let mut selector = Selector::new(&kb, &catalog, &mut rng, SelectorConfig::default());

        let filter = QuestFilter::new().allow("help");
        let facts = selector
            .create_quest_from_person(0, &FactId::new("p1"), &filter)
            .unwrap();
        assert!(!facts.is_empty());
        assert!(selector.excluded_quests().contains("help"));

        let err = selector
            .create_quest_from_person(0, &FactId::new("p1"), &filter)
            .unwrap_err();
        assert!(err.is_rollback());
    }

    #[test]
    fn test_no_template_for_entry_point() {
        let kb = testing::world();
        let catalog = QuestCatalog::new().with_template(DeliveryTemplate);
        let mut rng = StdRng::seed_from_u64(8);
        let mut selector = Selector::new(&kb, &catalog, &mut rng, SelectorConfig::default());

        let err = selector
            .create_quest_from_place(0, &FactId::new("town_a"), &QuestFilter::new())
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Rollback(crate::RollbackError::Selector(
                SelectorError::NoQuestTemplate { .. }
            ))
        ));
    }
}
