//! The interpreter contract: how the machine reaches the outside world.

use quest_model::actions::{self, Action, ActionKind};
use quest_model::requirements::{self, Requirement, RequirementKind};
use quest_model::Fact;

/// Names of the lifecycle hooks, in the order they fire around a node.
pub const LIFECYCLE_HOOKS: [&str; 6] = [
    "on_state_before_actions",
    "on_state_after_actions",
    "on_jump_start_before_actions",
    "on_jump_start_after_actions",
    "on_jump_end_before_actions",
    "on_jump_end_after_actions",
];

/// Host-side semantics of requirements and actions.
///
/// There is one method per registered requirement kind (`check_*` and
/// `satisfy_*`) and per action kind (`do_*`); the method names match the
/// callback names in the kind registry, see [`required_callbacks`]. The
/// lifecycle hooks default to doing nothing.
pub trait Interpreter {
    fn check_located_in(&self, requirement: &requirements::LocatedIn) -> bool;
    fn check_located_near(&self, requirement: &requirements::LocatedNear) -> bool;
    fn check_located_on_road(&self, requirement: &requirements::LocatedOnRoad) -> bool;
    fn check_has_money(&self, requirement: &requirements::HasMoney) -> bool;
    fn check_is_alive(&self, requirement: &requirements::IsAlive) -> bool;

    fn satisfy_located_in(&mut self, requirement: &requirements::LocatedIn);
    fn satisfy_located_near(&mut self, requirement: &requirements::LocatedNear);
    fn satisfy_located_on_road(&mut self, requirement: &requirements::LocatedOnRoad);
    fn satisfy_has_money(&mut self, requirement: &requirements::HasMoney);
    fn satisfy_is_alive(&mut self, requirement: &requirements::IsAlive);

    fn do_message(&mut self, action: &actions::Message);
    fn do_give_power(&mut self, action: &actions::GivePower);
    fn do_give_reward(&mut self, action: &actions::GiveReward);
    fn do_fight(&mut self, action: &actions::Fight);
    fn do_do_nothing(&mut self, action: &actions::DoNothing);
    fn do_upgrade_equipment(&mut self, action: &actions::UpgradeEquipment);
    fn do_move_near(&mut self, action: &actions::MoveNear);

    fn on_state_before_actions(&mut self, _state: &Fact) {}
    fn on_state_after_actions(&mut self, _state: &Fact) {}
    fn on_jump_start_before_actions(&mut self, _jump: &Fact) {}
    fn on_jump_start_after_actions(&mut self, _jump: &Fact) {}
    fn on_jump_end_before_actions(&mut self, _jump: &Fact) {}
    fn on_jump_end_after_actions(&mut self, _jump: &Fact) {}
}

/// Dispatch a requirement to its `check_*` callback.
pub fn check_requirement<I: Interpreter + ?Sized>(interpreter: &I, requirement: &Requirement) -> bool {
    match requirement {
        Requirement::LocatedIn(req) => interpreter.check_located_in(req),
        Requirement::LocatedNear(req) => interpreter.check_located_near(req),
        Requirement::LocatedOnRoad(req) => interpreter.check_located_on_road(req),
        Requirement::HasMoney(req) => interpreter.check_has_money(req),
        Requirement::IsAlive(req) => interpreter.check_is_alive(req),
    }
}

/// Dispatch a requirement to its `satisfy_*` callback.
pub fn satisfy_requirement<I: Interpreter + ?Sized>(interpreter: &mut I, requirement: &Requirement) {
    match requirement {
        Requirement::LocatedIn(req) => interpreter.satisfy_located_in(req),
        Requirement::LocatedNear(req) => interpreter.satisfy_located_near(req),
        Requirement::LocatedOnRoad(req) => interpreter.satisfy_located_on_road(req),
        Requirement::HasMoney(req) => interpreter.satisfy_has_money(req),
        Requirement::IsAlive(req) => interpreter.satisfy_is_alive(req),
    }
}

/// Dispatch an action to its `do_*` callback.
pub fn do_action<I: Interpreter + ?Sized>(interpreter: &mut I, action: &Action) {
    match action {
        Action::Message(action) => interpreter.do_message(action),
        Action::GivePower(action) => interpreter.do_give_power(action),
        Action::GiveReward(action) => interpreter.do_give_reward(action),
        Action::Fight(action) => interpreter.do_fight(action),
        Action::DoNothing(action) => interpreter.do_do_nothing(action),
        Action::UpgradeEquipment(action) => interpreter.do_upgrade_equipment(action),
        Action::MoveNear(action) => interpreter.do_move_near(action),
    }
}

/// Every callback name an interpreter provides: requirement checks and
/// satisfactions, actions, then the lifecycle hooks.
pub fn required_callbacks() -> Vec<&'static str> {
    let mut callbacks: Vec<&'static str> = Vec::new();
    callbacks.extend(RequirementKind::ALL.iter().map(|kind| kind.check_callback()));
    callbacks.extend(RequirementKind::ALL.iter().map(|kind| kind.satisfy_callback()));
    callbacks.extend(ActionKind::ALL.iter().map(|kind| kind.callback()));
    callbacks.extend(LIFECYCLE_HOOKS);
    callbacks
}
