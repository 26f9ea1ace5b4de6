//! Shared fixtures for unit tests: small quest graphs, a world snapshot, an
//! interpreter that records its calls and two quest templates.

use std::collections::BTreeSet;

use quest_model::actions::{self, Action};
use quest_model::requirements::{self, Requirement};
use quest_model::{
    Answer, Choice, ChoiceOption, Event, Fact, FactId, FactKind, Finish, Hero, Jump, LocatedIn,
    NotFirstInitiator, OptionMarker, Person, Place, Question, QuestParticipant, QuestResult,
    SocialConnection, SocialConnectionKind, Start, State,
};

use crate::knowledge_base::{KnowledgeBase, KnowledgeBaseError};
use crate::machine::Interpreter;
use crate::selector::{EntryPoint, PersonFilter, QuestFilter, QuestTag, QuestTemplate, Selector};
use crate::GenerationError;

fn build(facts: impl IntoIterator<Item = Fact>) -> KnowledgeBase {
    let mut kb = KnowledgeBase::new();
    kb.add_facts(facts).unwrap();
    kb
}

/// start -> a -> finish
pub(crate) fn linear_quest() -> KnowledgeBase {
    build([
        Fact::new("start", Start::new("linear", 0)),
        Fact::new("a", State::new()),
        Fact::new("finish", Finish::new("start")),
        Fact::derived(Jump::new("start", "a")),
        Fact::derived(Jump::new("a", "finish")),
    ])
}

/// start -> choice -> (honest | cheat) -> finish
pub(crate) fn choice_quest() -> KnowledgeBase {
    build([
        Fact::new("start", Start::new("choice", 0)),
        Fact::new("choice", Choice::new()),
        Fact::new("honest", State::new()),
        Fact::new("cheat", State::new()),
        Fact::new("finish", Finish::new("start")),
        Fact::derived(Jump::new("start", "choice")),
        Fact::derived(ChoiceOption::new("choice", "honest").with_marker(OptionMarker::Honorable)),
        Fact::derived(ChoiceOption::new("choice", "cheat").with_marker(OptionMarker::Dishonorable)),
        Fact::derived(Jump::new("honest", "finish")),
        Fact::derived(Jump::new("cheat", "finish")),
    ])
}

/// start -> question -> good_end when the hero has 10 coins, bad_end otherwise
pub(crate) fn question_quest() -> KnowledgeBase {
    build([
        Fact::new("hero", Hero::new()),
        Fact::new("start", Start::new("question", 0)),
        Fact::new(
            "question",
            Question::new([Requirement::HasMoney(requirements::HasMoney::new("hero", 10))]),
        ),
        Fact::new("good_end", Finish::new("start")),
        Fact::new("bad_end", Finish::new("start")),
        Fact::derived(Jump::new("start", "question")),
        Fact::derived(Answer::new("question", "good_end", true)),
        Fact::derived(Answer::new("question", "bad_end", false)),
    ])
}

/// Three towns, the hero and three persons; p1 and p2 are partners.
pub(crate) fn world_facts() -> Vec<Fact> {
    vec![
        Fact::new("town_a", Place::new().with_type("city").with_terrain("plains")),
        Fact::new("town_b", Place::new().with_type("village").with_terrain("forest")),
        Fact::new("town_c", Place::new().with_type("village").with_terrain("swamp")),
        Fact::new("hero", Hero::new()),
        Fact::new("p1", Person::new().with_profession("merchant")),
        Fact::new("p2", Person::new().with_profession("guard")),
        Fact::new("p3", Person::new().with_profession("merchant")),
        Fact::derived(LocatedIn::new("hero", "town_a")),
        Fact::derived(LocatedIn::new("p1", "town_a")),
        Fact::derived(LocatedIn::new("p2", "town_b")),
        Fact::derived(LocatedIn::new("p3", "town_c")),
        Fact::derived(NotFirstInitiator::new("p3")),
        Fact::derived(SocialConnection::new("p1", "p2", SocialConnectionKind::Partner)),
    ]
}

pub(crate) fn world() -> KnowledgeBase {
    build(world_facts())
}

pub(crate) fn message(message_type: &str) -> Action {
    Action::Message(actions::Message::new(message_type))
}

/// Records every callback it receives. Requirements on blocked objects fail
/// their checks until satisfied.
#[derive(Debug, Default)]
pub(crate) struct RecordingInterpreter {
    pub calls: Vec<String>,
    pub blocked: BTreeSet<FactId>,
}

impl RecordingInterpreter {
    pub fn with_blocked(mut self, object: impl Into<FactId>) -> Self {
        self.blocked.insert(object.into());
        self
    }

    fn allows(&self, object: &FactId) -> bool {
        !self.blocked.contains(object)
    }

    fn satisfy(&mut self, callback: &str, object: &FactId) {
        self.calls.push(callback.to_string());
        self.blocked.remove(object);
    }

    fn record(&mut self, callback: &str) {
        self.calls.push(callback.to_string());
    }

    fn hook(&mut self, hook: &str, fact: &Fact) {
        self.calls.push(format!("{hook}({})", fact.uid));
    }
}

impl Interpreter for RecordingInterpreter {
    fn check_located_in(&self, requirement: &requirements::LocatedIn) -> bool {
        self.allows(&requirement.object)
    }

    fn check_located_near(&self, requirement: &requirements::LocatedNear) -> bool {
        self.allows(&requirement.object)
    }

    fn check_located_on_road(&self, requirement: &requirements::LocatedOnRoad) -> bool {
        self.allows(&requirement.object)
    }

    fn check_has_money(&self, requirement: &requirements::HasMoney) -> bool {
        self.allows(&requirement.object)
    }

    fn check_is_alive(&self, requirement: &requirements::IsAlive) -> bool {
        self.allows(&requirement.object)
    }

    fn satisfy_located_in(&mut self, requirement: &requirements::LocatedIn) {
        self.satisfy("satisfy_located_in", &requirement.object);
    }

    fn satisfy_located_near(&mut self, requirement: &requirements::LocatedNear) {
        self.satisfy("satisfy_located_near", &requirement.object);
    }

    fn satisfy_located_on_road(&mut self, requirement: &requirements::LocatedOnRoad) {
        self.satisfy("satisfy_located_on_road", &requirement.object);
    }

    fn satisfy_has_money(&mut self, requirement: &requirements::HasMoney) {
        self.satisfy("satisfy_has_money", &requirement.object);
    }

    fn satisfy_is_alive(&mut self, requirement: &requirements::IsAlive) {
        self.satisfy("satisfy_is_alive", &requirement.object);
    }

    fn do_message(&mut self, _action: &actions::Message) {
        self.record("do_message");
    }

    fn do_give_power(&mut self, _action: &actions::GivePower) {
        self.record("do_give_power");
    }

    fn do_give_reward(&mut self, _action: &actions::GiveReward) {
        self.record("do_give_reward");
    }

    fn do_fight(&mut self, _action: &actions::Fight) {
        self.record("do_fight");
    }

    fn do_do_nothing(&mut self, _action: &actions::DoNothing) {
        self.record("do_do_nothing");
    }

    fn do_upgrade_equipment(&mut self, _action: &actions::UpgradeEquipment) {
        self.record("do_upgrade_equipment");
    }

    fn do_move_near(&mut self, _action: &actions::MoveNear) {
        self.record("do_move_near");
    }

    fn on_state_before_actions(&mut self, state: &Fact) {
        self.hook("on_state_before_actions", state);
    }

    fn on_state_after_actions(&mut self, state: &Fact) {
        self.hook("on_state_after_actions", state);
    }

    fn on_jump_start_before_actions(&mut self, jump: &Fact) {
        self.hook("on_jump_start_before_actions", jump);
    }

    fn on_jump_start_after_actions(&mut self, jump: &Fact) {
        self.hook("on_jump_start_after_actions", jump);
    }

    fn on_jump_end_before_actions(&mut self, jump: &Fact) {
        self.hook("on_jump_end_before_actions", jump);
    }

    fn on_jump_end_after_actions(&mut self, jump: &Fact) {
        self.hook("on_jump_end_after_actions", jump);
    }
}

/// Carry an item from the initiator to the receiver, or steal it.
pub(crate) struct DeliveryTemplate;

impl QuestTemplate for DeliveryTemplate {
    fn quest_type(&self) -> &str {
        "delivery"
    }

    fn tags(&self) -> &[QuestTag] {
        &[QuestTag::CanStart, QuestTag::CanContinue]
    }

    fn entry_points(&self) -> &[EntryPoint] {
        &[EntryPoint::FromPerson, EntryPoint::Between2]
    }

    fn construct_from_person(
        &self,
        selector: &mut Selector<'_>,
        nesting: u32,
        initiator: &FactId,
    ) -> Result<Vec<Fact>, GenerationError> {
        let receiver = selector.new_person(
            PersonFilter::new().with_social_connection(initiator, SocialConnectionKind::Partner),
        )?;
        self.construct_between_2(selector, nesting, initiator, &receiver)
    }

    fn construct_between_2(
        &self,
        selector: &mut Selector<'_>,
        nesting: u32,
        initiator: &FactId,
        receiver: &FactId,
    ) -> Result<Vec<Fact>, GenerationError> {
        let ns = selector.namespace();
        let id = |name: &str| FactId::new(format!("{ns}{name}"));

        let hero = selector.hero()?;
        let initiator_position = selector.place_for(std::slice::from_ref(initiator))?;
        let receiver_position = selector.place_for(std::slice::from_ref(receiver))?;

        let start = id("start");
        let choice = id("choice");
        let deliver = id("deliver");
        let steal = id("steal");
        let ambush = id("ambush");
        let delivered = id("finish_delivered");
        let stolen = id("finish_stolen");
        let ambush_event = id("ev_ambush");

        Ok(vec![
            Fact::new(
                &start,
                Start::new("delivery", nesting)
                    .with_require([Requirement::LocatedIn(requirements::LocatedIn::new(
                        &hero,
                        &initiator_position,
                    ))])
                    .with_actions([message("delivery_intro")]),
            ),
            Fact::derived(QuestParticipant::new(&start, initiator, "initiator")),
            Fact::derived(QuestParticipant::new(&start, receiver, "receiver")),
            Fact::new(&choice, Choice::new()),
            Fact::new(
                &deliver,
                State::new()
                    .with_require([Requirement::LocatedIn(requirements::LocatedIn::new(
                        &hero,
                        &receiver_position,
                    ))])
                    .with_actions([Action::GivePower(actions::GivePower::new(receiver, 1.0))]),
            ),
            Fact::new(
                &steal,
                State::new().with_actions([Action::GivePower(actions::GivePower::new(initiator, -1.0))]),
            ),
            Fact::new(&ambush, State::new().with_actions([Action::Fight(actions::Fight::new())])),
            Fact::new(
                &delivered,
                Finish::new(&start)
                    .with_result(initiator, QuestResult::Successful)
                    .with_result(receiver, QuestResult::Successful)
                    .with_actions([Action::GiveReward(actions::GiveReward::new(&hero, "money", 1.0))]),
            ),
            Fact::new(
                &stolen,
                Finish::new(&start)
                    .with_result(initiator, QuestResult::Failed)
                    .with_result(receiver, QuestResult::Failed),
            ),
            Fact::new(&ambush_event, Event::new()),
            Fact::derived(Jump::new(&start, &choice)),
            Fact::derived(ChoiceOption::new(&choice, &deliver).with_marker(OptionMarker::Honorable)),
            Fact::derived(ChoiceOption::new(&choice, &steal).with_marker(OptionMarker::Dishonorable)),
            Fact::derived(Jump::new(&deliver, &delivered)).with_tag(ambush_event.as_str()),
            Fact::derived(Jump::new(&deliver, &ambush)).with_tag(ambush_event.as_str()),
            Fact::derived(Jump::new(&ambush, &delivered)),
            Fact::derived(Jump::new(&steal, &stolen)),
        ])
    }
}

/// Help the initiator by running a nested quest on their behalf.
pub(crate) struct HelpTemplate;

impl QuestTemplate for HelpTemplate {
    fn quest_type(&self) -> &str {
        "help"
    }

    fn tags(&self) -> &[QuestTag] {
        &[QuestTag::CanStart, QuestTag::HasSubquests]
    }

    fn entry_points(&self) -> &[EntryPoint] {
        &[EntryPoint::FromPerson]
    }

    fn construct_from_person(
        &self,
        selector: &mut Selector<'_>,
        nesting: u32,
        initiator: &FactId,
    ) -> Result<Vec<Fact>, GenerationError> {
        selector.reserve(initiator);
        let ns = selector.namespace();
        let start = FactId::new(format!("{ns}start"));
        let finish = FactId::new(format!("{ns}finish"));

        selector.place_for(std::slice::from_ref(initiator))?;
        let receiver = selector.new_person(PersonFilter::new())?;

        let subquest = selector.create_quest_between_2(
            nesting + 1,
            initiator,
            &receiver,
            &QuestFilter::new().with_tag(QuestTag::CanContinue),
        )?;

        let sub_start = subquest
            .iter()
            .find(|fact| matches!(&fact.kind, FactKind::Start(start) if start.nesting == nesting + 1))
            .map(|fact| fact.uid.clone())
            .ok_or_else(|| KnowledgeBaseError::FactNotFound(FactId::new(format!("{ns}substart"))))?;

        let sub_finishes: Vec<FactId> = subquest
            .iter()
            .filter(|fact| matches!(&fact.kind, FactKind::Finish(end) if end.start == sub_start))
            .map(|fact| fact.uid.clone())
            .collect();

        let mut facts = vec![
            Fact::new(&start, Start::new("help", nesting)),
            Fact::derived(QuestParticipant::new(&start, initiator, "initiator")),
            Fact::new(
                &finish,
                Finish::new(&start).with_result(initiator, QuestResult::Successful),
            ),
            Fact::derived(Jump::new(&start, &sub_start)),
        ];
        facts.extend(
            sub_finishes
                .iter()
                .map(|sub_finish| Fact::derived(Jump::new(sub_finish, &finish))),
        );
        facts.extend(subquest);
        Ok(facts)
    }
}
