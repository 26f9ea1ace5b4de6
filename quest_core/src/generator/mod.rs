//! Generator - the bounded retry loop that turns a world snapshot and a
//! quest catalog into a validated, replayable knowledge base.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use quest_model::Fact;

use crate::knowledge_base::KnowledgeBase;
use crate::restrictions;
use crate::selector::{QuestCatalog, Selector, SelectorConfig};
use crate::transformators::{
    activate_events, determine_default_choices, remove_broken_states, remove_restricted_states,
    remove_unused_actors,
};
use crate::{GenerationError, RollbackError};

/// Unique identifier for generated quests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestId(pub Uuid);

impl QuestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QuestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for QuestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid generator config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("social_connection_probability must be non-negative, got {0}")]
    NegativeProbability(f64),
}

/// Configuration for quest generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Attempts before giving up with `RetriesExhausted`.
    pub max_attempts: u32,

    /// Drop world actors the generated quest never mentions.
    pub remove_unused_actors: bool,

    pub selector: SelectorConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 100,
            remove_unused_actors: true,
            selector: SelectorConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;

        if config.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if config.selector.social_connection_probability < 0.0 {
            return Err(ConfigError::NegativeProbability(
                config.selector.social_connection_probability,
            ));
        }
        Ok(config)
    }
}

/// A validated quest graph, ready for replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuest {
    pub id: QuestId,
    pub knowledge_base: KnowledgeBase,
    /// Attempts it took, this one included.
    pub attempts: u32,
}

/// Drives generation attempts until one yields a valid graph.
#[derive(Debug)]
pub struct Generator<'a> {
    catalog: &'a QuestCatalog,
    config: GeneratorConfig,
}

impl<'a> Generator<'a> {
    pub fn new(catalog: &'a QuestCatalog, config: GeneratorConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a quest over `world`.
    ///
    /// `build` receives a fresh [`Selector`] per attempt and returns the raw
    /// quest facts, typically through one of the selector's
    /// `create_quest_*` calls. Rollback errors restart from a fresh copy of
    /// the world; any other error is returned at once.
    pub fn generate<R, F>(
        &self,
        world: &[Fact],
        rng: &mut R,
        mut build: F,
    ) -> Result<GeneratedQuest, GenerationError>
    where
        R: Rng,
        F: FnMut(&mut Selector<'_>) -> Result<Vec<Fact>, GenerationError>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.attempt(world, rng, &mut build) {
                Ok(knowledge_base) => {
                    let id = QuestId::new();
                    tracing::info!(
                        quest_id = %id,
                        attempts = attempt,
                        facts = knowledge_base.fact_count(),
                        "Generated quest"
                    );
                    return Ok(GeneratedQuest {
                        id,
                        knowledge_base,
                        attempts: attempt,
                    });
                }
                Err(GenerationError::Rollback(last)) if attempt >= max_attempts => {
                    tracing::error!(attempts = attempt, error = %last, "Quest generation failed");
                    return Err(GenerationError::RetriesExhausted {
                        attempts: attempt,
                        last,
                    });
                }
                Err(GenerationError::Rollback(error)) => {
                    tracing::warn!(attempt, error = %error, "Generation attempt rolled back");
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn attempt<R, F>(&self, world: &[Fact], rng: &mut R, build: &mut F) -> Result<KnowledgeBase, GenerationError>
    where
        R: Rng,
        F: FnMut(&mut Selector<'_>) -> Result<Vec<Fact>, GenerationError>,
    {
        let mut knowledge_base = KnowledgeBase::new();
        knowledge_base.add_facts(world.iter().cloned())?;

        let quest = {
            let mut selector =
                Selector::new(&knowledge_base, self.catalog, &mut *rng, self.config.selector.clone());
            build(&mut selector)?
        };
        knowledge_base.add_facts(quest)?;

        activate_events(&mut knowledge_base, rng)?;
        remove_restricted_states(&mut knowledge_base)?;
        remove_broken_states(&mut knowledge_base)?;
        if self.config.remove_unused_actors {
            remove_unused_actors(&mut knowledge_base)?;
        }
        determine_default_choices(&mut knowledge_base, rng)?;

        knowledge_base.validate(&restrictions::replay_set())?;
        Ok(knowledge_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::Machine;
    use crate::selector::{PersonFilter, QuestFilter, QuestTag, SelectorError};
    use crate::testing::{self, DeliveryTemplate, HelpTemplate, RecordingInterpreter};
    use quest_model::{FactId, Kind, OnlyGoodBranches};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog() -> QuestCatalog {
        QuestCatalog::new()
            .with_template(DeliveryTemplate)
            .with_template(HelpTemplate)
    }

    fn build_root(selector: &mut Selector<'_>) -> Result<Vec<Fact>, GenerationError> {
        let initiator = selector.new_person(PersonFilter::new().first_initiator())?;
        selector.create_quest_from_person(0, &initiator, &QuestFilter::new().with_tag(QuestTag::CanStart))
    }

    #[test]
    fn test_generated_quest_replays() {
        let catalog = catalog();
        let generator = Generator::new(&catalog, GeneratorConfig::default());

        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let quest = generator
                .generate(&testing::world_facts(), &mut rng, build_root)
                .unwrap();

            assert_eq!(quest.attempts, 1);
            assert_eq!(quest.knowledge_base.validate(&restrictions::replay_set()), Ok(()));
            assert!(quest.knowledge_base.filter(Kind::Event).count() >= 1);

            let mut machine = Machine::new(
                quest.knowledge_base,
                RecordingInterpreter::default(),
                StdRng::seed_from_u64(seed),
            );
            machine.step_until_can().unwrap();
            assert!(machine.is_processed());
        }
    }

    #[test]
    fn test_same_seed_same_graph() {
        let catalog = catalog();
        let generator = Generator::new(&catalog, GeneratorConfig::default());

        let first = generator
            .generate(&testing::world_facts(), &mut StdRng::seed_from_u64(11), build_root)
            .unwrap();
        let second = generator
            .generate(&testing::world_facts(), &mut StdRng::seed_from_u64(11), build_root)
            .unwrap();

        assert_eq!(first.knowledge_base, second.knowledge_base);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_alignment_restrictions_prune_branches() {
        let catalog = catalog();
        let generator = Generator::new(&catalog, GeneratorConfig::default());

        let mut world = testing::world_facts();
        world.extend(["p1", "p2", "p3"].map(|person| Fact::derived(OnlyGoodBranches::new(person))));

        for seed in 0..8 {
            let quest = generator
                .generate(&world, &mut StdRng::seed_from_u64(seed), build_root)
                .unwrap();

            let kb = &quest.knowledge_base;
            assert!(kb.filter(Kind::State).all(|state| !state.uid.as_str().ends_with("steal")));
            assert_eq!(kb.filter(Kind::Option).count(), 1);
        }
    }

    #[test]
    fn test_unused_actors_kept_when_disabled() {
        let catalog = catalog();
        let config = GeneratorConfig {
            remove_unused_actors: false,
            ..GeneratorConfig::default()
        };
        let generator = Generator::new(&catalog, config);

        let quest = generator
            .generate(&testing::world_facts(), &mut StdRng::seed_from_u64(5), build_root)
            .unwrap();
        assert_eq!(quest.knowledge_base.filter(Kind::Person).count(), 3);
    }

    #[test]
    fn test_rollback_retries() {
        let catalog = catalog();
        let generator = Generator::new(&catalog, GeneratorConfig::default());

        let mut calls = 0;
        let quest = generator
            .generate(&testing::world_facts(), &mut StdRng::seed_from_u64(2), |selector| {
                calls += 1;
                if calls == 1 {
                    return Err(SelectorError::NoLocation {
                        objects: vec![FactId::new("ghost")],
                    }
                    .into());
                }
                build_root(selector)
            })
            .unwrap();

        assert_eq!(quest.attempts, 2);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_retries_exhausted() {
        let catalog = catalog();
        let config = GeneratorConfig {
            max_attempts: 3,
            ..GeneratorConfig::default()
        };
        let generator = Generator::new(&catalog, config);

        let mut calls = 0;
        let err = generator
            .generate(&testing::world_facts(), &mut StdRng::seed_from_u64(0), |_| {
                calls += 1;
                Err(SelectorError::NoLocation { objects: vec![] }.into())
            })
            .unwrap_err();

        assert_eq!(calls, 3);
        assert!(matches!(
            err,
            GenerationError::RetriesExhausted {
                attempts: 3,
                last: RollbackError::Selector(SelectorError::NoLocation { .. }),
            }
        ));
    }

    #[test]
    fn test_store_errors_are_not_retried() {
        let catalog = catalog();
        let generator = Generator::new(&catalog, GeneratorConfig::default());

        let mut calls = 0;
        let err = generator
            .generate(&testing::world_facts(), &mut StdRng::seed_from_u64(0), |_| {
                calls += 1;
                Ok(vec![Fact::new("hero", quest_model::Hero::new())])
            })
            .unwrap_err();

        assert_eq!(calls, 1);
        assert!(matches!(err, GenerationError::Store(_)));
    }

    #[test]
    fn test_config_from_toml() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            max_attempts = 5

            [selector]
            social_connection_probability = 1.0
            "#,
        )
        .unwrap();

        assert_eq!(config.max_attempts, 5);
        assert!(config.remove_unused_actors);
        assert_eq!(config.selector.social_connection_probability, 1.0);

        assert_eq!(GeneratorConfig::from_toml_str("").unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn test_config_rejects_invalid_values() {
        assert!(matches!(
            GeneratorConfig::from_toml_str("max_attempts = 0"),
            Err(ConfigError::ZeroAttempts)
        ));
        assert!(matches!(
            GeneratorConfig::from_toml_str("[selector]\nsocial_connection_probability = -0.5"),
            Err(ConfigError::NegativeProbability(_))
        ));
        assert!(matches!(
            GeneratorConfig::from_toml_str("max_attempts = \"many\""),
            Err(ConfigError::Toml(_))
        ));
    }
}
