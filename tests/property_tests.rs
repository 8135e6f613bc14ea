//! Property-based tests for transition selection and execution.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated machines and inputs.

use proptest::prelude::*;
use statework::builder::{ConfigurationError, StateMachineBuilder};
use statework::core::{Action, Context, LifecycleEvent, StateId};
use statework::{event_enum, state_enum, EngineError, StateMachine};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

state_enum! {
    enum Node { Start, N1, N2, N3, N4, N5, N6, End }
}

event_enum! {
    enum Input { Go, Stop, Skip }
}

const INNER: [Node; 6] = [Node::N1, Node::N2, Node::N3, Node::N4, Node::N5, Node::N6];
const INPUTS: [Input; 3] = [Input::Go, Input::Stop, Input::Skip];

#[derive(Debug)]
struct Token {
    at: Node,
}

fn builder() -> StateMachineBuilder<Node, Input, Token> {
    StateMachineBuilder::new(Node::Start, Node::End, |t: &Token| t.at)
        .states(|s| {
            for id in INNER {
                s.with_id(id).add()?;
            }
            Ok(())
        })
        .unwrap()
        .lifecycle_actions(|l| {
            l.on(LifecycleEvent::SuccessfulStateChange)
                .execute_fn(|ctx| {
                    if let Some(to) = ctx.state_change().map(|c| c.to) {
                        ctx.subject_mut().at = to;
                    }
                    Ok(())
                })
                .add()
        })
        .unwrap()
}

/// Sparse machine: N1 -Go-> N2 -Stop-> N3, N4 -Skip-> N6 and Start -Go-> N1.
fn sparse_machine() -> StateMachine<Node, Input, Token> {
    builder()
        .transitions(|t| {
            t.from_initial().to(Node::N1).on_event(Input::Go).add()?;
            t.from([Node::N1]).to(Node::N2).on_event(Input::Go).add()?;
            t.from([Node::N2]).to(Node::N3).on_event(Input::Stop).add()?;
            t.from([Node::N4]).to(Node::N6).on_event(Input::Skip).add()
        })
        .unwrap()
        .build()
        .unwrap()
}

prop_compose! {
    fn arbitrary_node()(index in 0..INNER.len()) -> Node {
        INNER[index]
    }
}

prop_compose! {
    fn arbitrary_input()(index in 0..INPUTS.len()) -> Input {
        INPUTS[index]
    }
}

proptest! {
    #[test]
    fn events_without_transition_leave_state_unchanged(
        node in arbitrary_node(),
        input in arbitrary_input()
    ) {
        let machine = sparse_machine();
        prop_assume!(!machine.possible_events_for_state(&node).contains(&input));

        let mut token = Token { at: node };
        machine.send_event(&input, &mut token, None).unwrap();

        prop_assert_eq!(token.at, node);
    }

    #[test]
    fn lifecycle_data_never_outlives_a_call(
        node in arbitrary_node(),
        inputs in prop::collection::vec(arbitrary_input(), 1..8)
    ) {
        let machine = sparse_machine();
        let mut token = Token { at: node };
        let mut context = Context::new(&mut token);

        for input in inputs {
            machine
                .send_event_in(&mut context, &input, Some(Box::new(7u32)))
                .unwrap();
            prop_assert!(context.lifecycle_data().is_empty());
        }
    }

    #[test]
    fn guard_outcomes_follow_passing_count(
        guards in prop::collection::vec(any::<bool>(), 1..=INNER.len())
    ) {
        let machine = builder()
            .transitions(|t| {
                for (target, passes) in INNER.iter().zip(&guards) {
                    let passes = *passes;
                    t.from_initial()
                        .to(*target)
                        .on_event(Input::Go)
                        .when(move |_| passes)
                        .add()?;
                }
                Ok(())
            })
            .unwrap()
            .build()
            .unwrap();
        let mut token = Token { at: Node::Start };

        let result = machine.send_event(&Input::Go, &mut token, None);
        let passing: Vec<Node> = INNER
            .iter()
            .zip(&guards)
            .filter(|(_, passes)| **passes)
            .map(|(target, _)| *target)
            .collect();

        match passing.as_slice() {
            [] => {
                prop_assert!(result.is_ok());
                prop_assert_eq!(token.at, Node::Start);
            }
            [only] => {
                prop_assert!(result.is_ok());
                prop_assert_eq!(token.at, *only);
            }
            many => {
                let is_ambiguous = matches!(
                    result,
                    Err(EngineError::Configuration(ConfigurationError::AmbiguousTransition { passing: count, .. }))
                        if count == many.len()
                );
                prop_assert!(is_ambiguous);
                prop_assert_eq!(token.at, Node::Start);
            }
        }
    }

    #[test]
    fn automatic_chain_runs_to_its_last_link(length in 1..=INNER.len()) {
        let entries = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&entries);
        let machine = builder()
            .transitions(|t| {
                let count = Action::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                });
                t.from_initial().to(Node::N1).action(count.clone()).add()?;
                for pair in INNER[..length].windows(2) {
                    t.from([pair[0]]).to(pair[1]).action(count.clone()).add()?;
                }
                Ok(())
            })
            .unwrap()
            .build()
            .unwrap();
        let mut token = Token { at: Node::Start };

        machine.proceed(&mut token).unwrap();

        prop_assert_eq!(token.at, INNER[length - 1]);
        prop_assert_eq!(entries.load(Ordering::SeqCst), length);
        prop_assert!(!machine.has_automatic_transitions(&token.at).unwrap());
    }

    #[test]
    fn chained_actions_run_every_step(steps in 0usize..12) {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut chain = Action::<Node, Input, Token>::chain();
        for _ in 0..steps {
            let counter = Arc::clone(&counter);
            chain = chain.then_do(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }
        prop_assert_eq!(chain.len(), steps);

        let action = chain.build();
        let mut token = Token { at: Node::N1 };
        let mut context = Context::new(&mut token);
        action.execute(&mut context).unwrap();

        prop_assert_eq!(counter.load(Ordering::SeqCst), steps);
    }

    #[test]
    fn state_names_resolve_back(node in arbitrary_node()) {
        let machine = sparse_machine();
        prop_assert_eq!(machine.state_from_name(node.name()), Some(&node));
    }
}
