use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use tessera::prelude::*;

fn filter_grammar() -> StateTemplate {
    StateTemplate::from_step("field", option_entry("Field", ["Age", "Height"]))
        .then("relation", option_entry("Relation", ["between", "equals"]))
        .branch([
            StateTemplate::from_step(
                "value",
                numeric_entry("Value").configure(|c| c.guard(option_key_is("between"))),
            )
            .then("secondaryValue", numeric_entry("Secondary value"))
            .then(None, terminal())
            .build(),
            StateTemplate::from_step("value", numeric_entry("Value"))
                .then(None, terminal())
                .build(),
        ])
}

async fn enter(machine: &mut TokenStateMachine, raw: Value) {
    machine.initialize_current(None).await.unwrap();
    machine.current_state_mut().set_unboxed_value(raw);
}

#[tokio::test]
async fn between_branch_collects_secondary_value() {
    let mut machine = TokenStateMachine::new(&filter_grammar());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    machine.on(move |event| sink.lock().push(event.name()));

    enter(&mut machine, json!("Height")).await;
    machine.transition().unwrap();
    assert_eq!(machine.current_state().name(), "Relation");

    enter(&mut machine, json!("between")).await;
    machine.transition().unwrap();
    enter(&mut machine, json!(60)).await;
    machine.transition().unwrap();
    assert_eq!(machine.current_state().vkey(), Some("secondaryValue"));

    enter(&mut machine, json!(65)).await;
    machine.transition().unwrap();

    assert!(machine.is_terminal());
    assert_eq!(
        Value::Object(machine.value()),
        json!({
            "field": {"key": "Height"},
            "relation": {"key": "between"},
            "value": {"key": 60},
            "secondaryValue": {"key": 65}
        })
    );
    let events = events.lock();
    assert_eq!(events.iter().filter(|name| **name == "end token").count(), 1);
    assert_eq!(events.iter().filter(|name| **name == "state changed").count(), 4);
}

#[tokio::test]
async fn equals_branch_ends_after_one_value() {
    let mut machine = TokenStateMachine::new(&filter_grammar());

    enter(&mut machine, json!("Age")).await;
    machine.transition().unwrap();
    enter(&mut machine, json!("equals")).await;
    machine.transition().unwrap();
    enter(&mut machine, json!("30")).await;
    machine.transition().unwrap();

    assert!(machine.is_terminal());
    assert_eq!(
        Value::Object(machine.unboxed_value()),
        json!({"field": "Age", "relation": "equals", "value": 30})
    );
}

#[tokio::test]
async fn value_tracks_committed_values_along_the_path() {
    let mut machine = TokenStateMachine::new(&filter_grammar());
    assert_eq!(Value::Object(machine.unboxed_value()), json!({"field": null}));

    enter(&mut machine, json!("Age")).await;
    machine.transition().unwrap();
    assert_eq!(
        Value::Object(machine.unboxed_value()),
        json!({"field": "Age", "relation": null})
    );

    assert!(machine.transition().is_err());
    enter(&mut machine, json!("between")).await;
    machine.transition().unwrap();
    machine.rewind();
    assert_eq!(
        Value::Object(machine.unboxed_value()),
        json!({"field": "Age", "relation": "between"})
    );
}
