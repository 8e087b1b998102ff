use futures_util::FutureExt;
use serde_json::{Value, json};
use std::time::Duration;
use tessera::core::options::RefreshOutcome;
use tessera::prelude::*;

#[test]
fn earliest_declared_child_wins_when_guards_overlap() {
    let template = StateTemplate::from_step("field", option_entry("Field", ["Age"])).branch([
        StateTemplate::from_step("a", value_entry("Any value")).build(),
        StateTemplate::from_step("b", value_entry("Age only").configure(|c| c.guard(option_key_is("Age")))).build(),
    ]);

    for _ in 0..3 {
        let mut machine = TokenStateMachine::new(&template);
        machine.current_state_mut().set_unboxed_value(json!("Age"));
        machine.transition().unwrap();
        assert_eq!(machine.current_state().name(), "Any value");
    }
}

#[test]
fn rewind_at_root_changes_nothing() {
    let template = StateTemplate::from_step("field", option_entry("Field", ["Age"]))
        .then("value", numeric_entry("Value"))
        .build();
    let mut machine = TokenStateMachine::new(&template);
    machine.current_state_mut().set_unboxed_value(json!("Age"));

    assert_eq!(machine.handle_request(Request::Rewind).unwrap(), RequestOutcome::Ui(UiSignal::Cancel));
    assert_eq!(machine.current_id(), machine.tree().root());
    assert_eq!(Value::Object(machine.unboxed_value()), json!({"field": "Age"}));
}

#[test]
fn archive_is_lifo_and_bounded() {
    let template = StateTemplate::from_step(
        "tags",
        text_entry("Tags").configure(|c| c.multivalue(Some(3))),
    )
    .then(None, terminal())
    .build();
    let mut machine = TokenStateMachine::new(&template);

    for tag in ["a", "b", "c"] {
        machine.current_state_mut().set_unboxed_value(json!(tag));
        machine.archive().unwrap();
    }
    machine.current_state_mut().set_unboxed_value(json!("d"));
    let before = machine.current_state().archive().to_vec();

    assert!(matches!(
        machine.archive(),
        Err(MachineError::Archive(ArchiveError::LimitReached { limit: 3, .. }))
    ));
    assert_eq!(machine.current_state().archive(), before.as_slice());

    machine.current_state_mut().set_value(None);
    let mut restored = Vec::new();
    for _ in 0..3 {
        machine.unarchive().unwrap();
        restored.push(machine.current_state().unboxed_value());
    }
    assert_eq!(restored, vec![json!("c"), json!("b"), json!("a")]);
}

#[test]
fn multivalue_token_lists_archive_then_pending_value() {
    let template = StateTemplate::from_step("tags", text_entry("Tags").configure(|c| c.multivalue(None)))
        .then(None, terminal())
        .build();
    let mut machine = TokenStateMachine::new(&template);
    machine.current_state_mut().set_unboxed_value(json!("a"));
    machine.archive().unwrap();
    machine.current_state_mut().set_unboxed_value(json!("b"));

    assert_eq!(Value::Object(machine.unboxed_value()), json!({"tags": ["a", "b"]}));
    machine.transition().unwrap();
    assert_eq!(Value::Object(machine.unboxed_value()), json!({"tags": ["a", "b"]}));
}

#[tokio::test]
async fn slow_superseded_fetch_never_overwrites_newer_suggestions() {
    let provider = provider_fn(|hint, _context, _archive| {
        async move {
            let delay = if hint == "a" { 100 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok::<_, anyhow::Error>(vec![ValueLike::new(format!("{hint}-result"))])
        }
        .boxed()
    });
    let template = StateTemplate::from_step("city", dynamic_option_entry("City", provider)).build();
    let machine = TokenStateMachine::new(&template);
    let context = machine.tree().context_for(machine.current_id());
    let slow = machine.current_state().options().clone();
    let fast = slow.clone();

    let (first, second) = tokio::join!(
        slow.refresh("a", &context, &[]),
        async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            fast.refresh("ab", &context, &[]).await
        }
    );

    assert_eq!(first.unwrap(), RefreshOutcome::Stale);
    assert_eq!(second.unwrap(), RefreshOutcome::Applied);
    assert_eq!(
        machine.current_state().options().options(),
        vec![ValueLike::new("ab-result")]
    );
}

#[test]
fn blueprint_instances_do_not_share_state() {
    let template = StateTemplate::from_step("field", option_entry("Field", ["Age", "Height"])).build();
    let mut first = TokenStateMachine::new(&template);
    let second = TokenStateMachine::new(&template);

    first.current_state_mut().set_unboxed_value(json!("Age"));

    assert_eq!(second.current_state().value(), None);
    assert_ne!(first.id(), second.id());
}
