//! Consistency of choices, questions and their recorded default paths.

use quest_model::{FactKind, Kind};

use super::{Restriction, RestrictionError};
use crate::knowledge_base::{KnowledgeBase, StateGraph};

/// Options leave only choices, and choices are left only through options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChoicesConsistency;

impl Restriction for ChoicesConsistency {
    fn name(&self) -> &'static str {
        "ChoicesConsistency"
    }

    fn check(&self, knowledge_base: &KnowledgeBase) -> Result<(), RestrictionError> {
        for option in knowledge_base.filter(Kind::Option) {
            let Some(view) = option.as_jump() else { continue };
            if let Some(state) = knowledge_base.get(view.state_from) {
                if !state.is(Kind::Choice) {
                    return Err(RestrictionError::OptionFromNonChoice {
                        option: option.uid.clone(),
                        state: state.uid.clone(),
                    });
                }
            }
        }

        let graph = StateGraph::new(knowledge_base);
        for choice in knowledge_base.filter(Kind::Choice) {
            if let Some(jump) = graph
                .jumps_from(&choice.uid)
                .iter()
                .find(|jump| !jump.is(Kind::Option))
            {
                return Err(RestrictionError::NonOptionJumpFromChoice {
                    jump: jump.uid.clone(),
                    choice: choice.uid.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Answers leave only questions, and every question has exactly one true
/// and one false answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionsConsistency;

impl Restriction for QuestionsConsistency {
    fn name(&self) -> &'static str {
        "QuestionsConsistency"
    }

    fn check(&self, knowledge_base: &KnowledgeBase) -> Result<(), RestrictionError> {
        for answer in knowledge_base.filter(Kind::Answer) {
            let Some(view) = answer.as_jump() else { continue };
            if let Some(state) = knowledge_base.get(view.state_from) {
                if !state.is(Kind::Question) {
                    return Err(RestrictionError::AnswerFromNonQuestion {
                        answer: answer.uid.clone(),
                        state: state.uid.clone(),
                    });
                }
            }
        }

        let graph = StateGraph::new(knowledge_base);
        for question in knowledge_base.filter(Kind::Question) {
            let jumps = graph.jumps_from(&question.uid);

            let mut conditions = Vec::with_capacity(jumps.len());
            for jump in jumps {
                match &jump.kind {
                    FactKind::Answer(answer) => conditions.push(answer.condition),
                    _ => {
                        return Err(RestrictionError::NonAnswerJumpFromQuestion {
                            jump: jump.uid.clone(),
                            question: question.uid.clone(),
                        })
                    }
                }
            }

            if conditions.len() != 2 {
                return Err(RestrictionError::WrongAnswersCount {
                    question: question.uid.clone(),
                    count: conditions.len(),
                });
            }
            if conditions[0] == conditions[1] {
                return Err(RestrictionError::AnswersNotComplementary {
                    question: question.uid.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Every choice has exactly one recorded path, and that path's option
/// leaves the choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultChoicesAssigned;

impl Restriction for DefaultChoicesAssigned {
    fn name(&self) -> &'static str {
        "DefaultChoicesAssigned"
    }

    fn check(&self, knowledge_base: &KnowledgeBase) -> Result<(), RestrictionError> {
        for choice in knowledge_base.filter(Kind::Choice) {
            let paths: Vec<_> = knowledge_base
                .filter(Kind::ChoicePath)
                .filter_map(|fact| match &fact.kind {
                    FactKind::ChoicePath(path) if path.choice == choice.uid => Some(path),
                    _ => None,
                })
                .collect();

            let path = match paths.as_slice() {
                [] => {
                    return Err(RestrictionError::MissingChoicePath {
                        choice: choice.uid.clone(),
                    })
                }
                [path] => *path,
                _ => {
                    return Err(RestrictionError::MultipleChoicePaths {
                        choice: choice.uid.clone(),
                        count: paths.len(),
                    })
                }
            };

            let leaves_choice = knowledge_base
                .get(&path.option)
                .filter(|option| option.is(Kind::Option))
                .and_then(|option| option.as_jump())
                .is_some_and(|view| *view.state_from == choice.uid);

            if !leaves_choice {
                return Err(RestrictionError::ChoicePathOptionMismatch {
                    choice: choice.uid.clone(),
                    option: path.option.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use quest_model::{Answer, ChoicePath, Fact, FactId, Jump};

    #[test]
    fn test_choice_quest_is_consistent() {
        let kb = testing::choice_quest();
        assert_eq!(ChoicesConsistency.check(&kb), Ok(()));
        assert_eq!(QuestionsConsistency.check(&kb), Ok(()));
    }

    #[test]
    fn test_plain_jump_from_choice_rejected() {
        let mut kb = testing::choice_quest();
        kb.add_fact(Fact::derived(Jump::new("choice", "finish"))).unwrap();

        assert_eq!(
            ChoicesConsistency.check(&kb),
            Err(RestrictionError::NonOptionJumpFromChoice {
                jump: FactId::new("#jump(choice, finish)"),
                choice: FactId::new("choice"),
            })
        );
    }

    #[test]
    fn test_option_from_plain_state_rejected() {
        let mut kb = testing::linear_quest();
        kb.add_fact(Fact::derived(quest_model::ChoiceOption::new("a", "finish")))
            .unwrap();

        assert_eq!(
            ChoicesConsistency.check(&kb),
            Err(RestrictionError::OptionFromNonChoice {
                option: FactId::new("#option(a, finish)"),
                state: FactId::new("a"),
            })
        );
    }

    #[test]
    fn test_question_needs_two_answers() {
        let mut kb = testing::question_quest();
        assert_eq!(QuestionsConsistency.check(&kb), Ok(()));

        kb.remove_fact(&FactId::new("#answer(question, bad_end)")).unwrap();
        assert_eq!(
            QuestionsConsistency.check(&kb),
            Err(RestrictionError::WrongAnswersCount {
                question: FactId::new("question"),
                count: 1,
            })
        );
    }

    #[test]
    fn test_question_answers_must_be_complementary() {
        let mut kb = testing::question_quest();
        kb.replace_fact(
            &FactId::new("#answer(question, bad_end)"),
            Fact::derived(Answer::new("question", "bad_end", true)),
        )
        .unwrap();

        assert_eq!(
            QuestionsConsistency.check(&kb),
            Err(RestrictionError::AnswersNotComplementary {
                question: FactId::new("question"),
            })
        );
    }

    #[test]
    fn test_plain_jump_from_question_rejected() {
        let mut kb = testing::question_quest();
        kb.add_fact(Fact::derived(Jump::new("question", "good_end"))).unwrap();

        assert!(matches!(
            QuestionsConsistency.check(&kb),
            Err(RestrictionError::NonAnswerJumpFromQuestion { .. })
        ));
    }

    #[test]
    fn test_default_choices_assigned() {
        let mut kb = testing::choice_quest();
        assert_eq!(
            DefaultChoicesAssigned.check(&kb),
            Err(RestrictionError::MissingChoicePath {
                choice: FactId::new("choice"),
            })
        );

        kb.add_fact(Fact::derived(ChoicePath::new(
            "choice",
            "#option(choice, finish)",
            true,
        )))
        .unwrap();
        assert_eq!(
            DefaultChoicesAssigned.check(&kb),
            Err(RestrictionError::ChoicePathOptionMismatch {
                choice: FactId::new("choice"),
                option: FactId::new("#option(choice, finish)"),
            })
        );

        kb.replace_fact(
            &ChoicePath::uid_for(&FactId::new("choice")),
            Fact::derived(ChoicePath::new("choice", "#option(choice, honest)", true)),
        )
        .unwrap();
        assert_eq!(DefaultChoicesAssigned.check(&kb), Ok(()));
    }
}
