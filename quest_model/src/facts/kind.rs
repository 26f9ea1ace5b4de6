//! The kind registry: concrete payloads and the kind hierarchy.

use serde::{Deserialize, Serialize};

use super::{
    Answer, Choice, ChoiceOption, ChoicePath, Event, Finish, Hero, Jump, JumpView, LocatedIn,
    LocatedNear, Mob, NotFirstInitiator, OnlyBadBranches, OnlyGoodBranches, OptionsLink, Person,
    Place, Pointer, QuestParticipant, Question, Reference, SocialConnection, Start, State,
    StateView,
};

/// Names of all fact kinds, including the abstract parents used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    // Actors
    Actor,
    Hero,
    Place,
    Person,
    Mob,

    // Plot states
    State,
    Start,
    Finish,
    Choice,
    Question,

    // Plot jumps
    Jump,
    Option,
    Answer,

    // Meta
    Event,
    OptionsLink,
    ChoicePath,
    QuestParticipant,
    Pointer,

    // World relations
    Relation,
    LocatedIn,
    LocatedNear,
    SocialConnection,
    NotFirstInitiator,
    OnlyGoodBranches,
    OnlyBadBranches,
}

impl Kind {
    pub const ALL: [Kind; 25] = [
        Kind::Actor,
        Kind::Hero,
        Kind::Place,
        Kind::Person,
        Kind::Mob,
        Kind::State,
        Kind::Start,
        Kind::Finish,
        Kind::Choice,
        Kind::Question,
        Kind::Jump,
        Kind::Option,
        Kind::Answer,
        Kind::Event,
        Kind::OptionsLink,
        Kind::ChoicePath,
        Kind::QuestParticipant,
        Kind::Pointer,
        Kind::Relation,
        Kind::LocatedIn,
        Kind::LocatedNear,
        Kind::SocialConnection,
        Kind::NotFirstInitiator,
        Kind::OnlyGoodBranches,
        Kind::OnlyBadBranches,
    ];

    /// The direct parent of this kind in the hierarchy.
    pub fn parent(self) -> Option<Kind> {
        match self {
            Kind::Hero | Kind::Place | Kind::Person | Kind::Mob => Some(Kind::Actor),
            Kind::Start | Kind::Finish | Kind::Choice | Kind::Question => Some(Kind::State),
            Kind::Option | Kind::Answer => Some(Kind::Jump),
            Kind::LocatedIn
            | Kind::LocatedNear
            | Kind::SocialConnection
            | Kind::NotFirstInitiator
            | Kind::OnlyGoodBranches
            | Kind::OnlyBadBranches => Some(Kind::Relation),
            _ => None,
        }
    }

    /// Check whether `other` is this kind or one of its subkinds.
    pub fn includes(self, other: Kind) -> bool {
        let mut current = Some(other);
        while let Some(kind) = current {
            if kind == self {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Abstract kinds only exist for filtering; no fact is created with them.
    pub fn is_abstract(self) -> bool {
        matches!(self, Kind::Actor | Kind::Relation)
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Actor => "Actor",
            Kind::Hero => "Hero",
            Kind::Place => "Place",
            Kind::Person => "Person",
            Kind::Mob => "Mob",
            Kind::State => "State",
            Kind::Start => "Start",
            Kind::Finish => "Finish",
            Kind::Choice => "Choice",
            Kind::Question => "Question",
            Kind::Jump => "Jump",
            Kind::Option => "Option",
            Kind::Answer => "Answer",
            Kind::Event => "Event",
            Kind::OptionsLink => "OptionsLink",
            Kind::ChoicePath => "ChoicePath",
            Kind::QuestParticipant => "QuestParticipant",
            Kind::Pointer => "Pointer",
            Kind::Relation => "Relation",
            Kind::LocatedIn => "LocatedIn",
            Kind::LocatedNear => "LocatedNear",
            Kind::SocialConnection => "SocialConnection",
            Kind::NotFirstInitiator => "NotFirstInitiator",
            Kind::OnlyGoodBranches => "OnlyGoodBranches",
            Kind::OnlyBadBranches => "OnlyBadBranches",
        }
    }

    pub fn from_name(name: &str) -> Option<Kind> {
        Kind::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind-specific payload of a fact.
///
/// Serialized adjacently tagged, so the encoded form of a payload is
/// `{"kind": <name>, "attributes": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "attributes")]
pub enum FactKind {
    Hero(Hero),
    Place(Place),
    Person(Person),
    Mob(Mob),

    State(State),
    Start(Start),
    Finish(Finish),
    Choice(Choice),
    Question(Question),

    Jump(Jump),
    #[serde(rename = "Option")]
    ChoiceOption(ChoiceOption),
    Answer(Answer),

    Event(Event),
    OptionsLink(OptionsLink),
    ChoicePath(ChoicePath),
    QuestParticipant(QuestParticipant),
    Pointer(Pointer),

    LocatedIn(LocatedIn),
    LocatedNear(LocatedNear),
    SocialConnection(SocialConnection),
    NotFirstInitiator(NotFirstInitiator),
    OnlyGoodBranches(OnlyGoodBranches),
    OnlyBadBranches(OnlyBadBranches),
}

impl FactKind {
    pub fn kind(&self) -> Kind {
        match self {
            FactKind::Hero(_) => Kind::Hero,
            FactKind::Place(_) => Kind::Place,
            FactKind::Person(_) => Kind::Person,
            FactKind::Mob(_) => Kind::Mob,
            FactKind::State(_) => Kind::State,
            FactKind::Start(_) => Kind::Start,
            FactKind::Finish(_) => Kind::Finish,
            FactKind::Choice(_) => Kind::Choice,
            FactKind::Question(_) => Kind::Question,
            FactKind::Jump(_) => Kind::Jump,
            FactKind::ChoiceOption(_) => Kind::Option,
            FactKind::Answer(_) => Kind::Answer,
            FactKind::Event(_) => Kind::Event,
            FactKind::OptionsLink(_) => Kind::OptionsLink,
            FactKind::ChoicePath(_) => Kind::ChoicePath,
            FactKind::QuestParticipant(_) => Kind::QuestParticipant,
            FactKind::Pointer(_) => Kind::Pointer,
            FactKind::LocatedIn(_) => Kind::LocatedIn,
            FactKind::LocatedNear(_) => Kind::LocatedNear,
            FactKind::SocialConnection(_) => Kind::SocialConnection,
            FactKind::NotFirstInitiator(_) => Kind::NotFirstInitiator,
            FactKind::OnlyGoodBranches(_) => Kind::OnlyGoodBranches,
            FactKind::OnlyBadBranches(_) => Kind::OnlyBadBranches,
        }
    }

    pub fn as_state(&self) -> Option<StateView<'_>> {
        match self {
            FactKind::State(state) => Some(StateView::new(&state.require, &state.actions)),
            FactKind::Start(start) => Some(StateView::new(&start.require, &start.actions)),
            FactKind::Finish(finish) => Some(StateView::new(&finish.require, &finish.actions)),
            FactKind::Choice(choice) => Some(StateView::new(&choice.require, &choice.actions)),
            FactKind::Question(question) => {
                Some(StateView::new(&question.require, &question.actions))
            }
            _ => None,
        }
    }

    pub fn as_jump(&self) -> Option<JumpView<'_>> {
        match self {
            FactKind::Jump(jump) => Some(JumpView {
                state_from: &jump.state_from,
                state_to: &jump.state_to,
                start_actions: &jump.start_actions,
                end_actions: &jump.end_actions,
            }),
            FactKind::ChoiceOption(option) => Some(JumpView {
                state_from: &option.state_from,
                state_to: &option.state_to,
                start_actions: &option.start_actions,
                end_actions: &option.end_actions,
            }),
            FactKind::Answer(answer) => Some(JumpView {
                state_from: &answer.state_from,
                state_to: &answer.state_to,
                start_actions: &answer.start_actions,
                end_actions: &answer.end_actions,
            }),
            _ => None,
        }
    }

    pub fn references(&self) -> Vec<Reference<'_>> {
        let mut refs = Vec::new();

        if let Some(state) = self.as_state() {
            state.collect_references(&mut refs);
        }
        if let Some(jump) = self.as_jump() {
            jump.collect_references(&mut refs);
        }

        match self {
            FactKind::Finish(finish) => {
                refs.push(Reference::new("start", &finish.start));
                refs.extend(finish.results.keys().map(|id| Reference::new("results", id)));
            }
            FactKind::Question(question) => {
                for requirement in &question.condition {
                    refs.extend(requirement.references());
                }
            }
            FactKind::OptionsLink(link) => {
                refs.extend(link.options.iter().map(|id| Reference::new("options", id)));
            }
            FactKind::ChoicePath(path) => {
                refs.push(Reference::new("choice", &path.choice));
                refs.push(Reference::new("option", &path.option));
            }
            FactKind::QuestParticipant(participant) => {
                refs.push(Reference::new("start", &participant.start));
                refs.push(Reference::new("participant", &participant.participant));
            }
            FactKind::Pointer(pointer) => {
                if let Some(state) = &pointer.state {
                    refs.push(Reference::new("state", state));
                }
                if let Some(jump) = &pointer.jump {
                    refs.push(Reference::new("jump", jump));
                }
            }
            FactKind::LocatedIn(located) => {
                refs.push(Reference::new("object", &located.object));
                refs.push(Reference::new("place", &located.place));
            }
            FactKind::LocatedNear(located) => {
                refs.push(Reference::new("object", &located.object));
                refs.push(Reference::new("place", &located.place));
            }
            FactKind::SocialConnection(connection) => {
                refs.push(Reference::new("person_from", &connection.person_from));
                refs.push(Reference::new("person_to", &connection.person_to));
            }
            FactKind::NotFirstInitiator(marker) => {
                refs.push(Reference::new("person", &marker.person));
            }
            FactKind::OnlyGoodBranches(restriction) => {
                refs.push(Reference::new("object", &restriction.object));
            }
            FactKind::OnlyBadBranches(restriction) => {
                refs.push(Reference::new("object", &restriction.object));
            }
            _ => {}
        }

        refs
    }
}

macro_rules! impl_into_fact_kind {
    ($($payload:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$payload> for FactKind {
                fn from(payload: $payload) -> Self {
                    FactKind::$variant(payload)
                }
            }
        )*
    };
}

impl_into_fact_kind! {
    Hero => Hero,
    Place => Place,
    Person => Person,
    Mob => Mob,
    State => State,
    Start => Start,
    Finish => Finish,
    Choice => Choice,
    Question => Question,
    Jump => Jump,
    ChoiceOption => ChoiceOption,
    Answer => Answer,
    Event => Event,
    OptionsLink => OptionsLink,
    ChoicePath => ChoicePath,
    QuestParticipant => QuestParticipant,
    Pointer => Pointer,
    LocatedIn => LocatedIn,
    LocatedNear => LocatedNear,
    SocialConnection => SocialConnection,
    NotFirstInitiator => NotFirstInitiator,
    OnlyGoodBranches => OnlyGoodBranches,
    OnlyBadBranches => OnlyBadBranches,
}
