use futures_util::FutureExt;
use serde_json::{Value, json};
use tessera::prelude::*;
use tessera::runtime::init_tracing;

/// Relations offered depend on the field chosen one step earlier.
fn relations() -> Step {
    dynamic_option_entry(
        "Relation",
        provider_fn(|hint, context, _archive| {
            let numeric = context
                .get("field")
                .is_some_and(|field| field.key() != &json!("Name"));
            async move {
                let all: &[&str] = if numeric { &["between", "equals"] } else { &["equals", "contains"] };
                let matching = all
                    .iter()
                    .filter(|relation| relation.contains(hint.as_str()))
                    .map(|relation| ValueLike::new(*relation))
                    .collect();
                Ok::<_, anyhow::Error>(matching)
            }
            .boxed()
        }),
    )
}

fn grammar() -> StateTemplate {
    StateTemplate::from_step("field", option_entry("Field", ["Age", "Height", "Name"]))
        .then(None, label("is"))
        .then("relation", relations())
        .branch([
            StateTemplate::from_step(
                "value",
                numeric_entry("Value").configure(|c| c.guard(option_key_is("between"))),
            )
            .then(None, label("and"))
            .then("secondaryValue", numeric_entry("Secondary value"))
            .then(None, terminal())
            .build(),
            StateTemplate::from_step("value", text_entry("Value"))
                .then(None, terminal())
                .build(),
        ])
}

/// Hydrate the active step, enter `raw` if given, then advance.
async fn step(machine: &mut TokenStateMachine, raw: Option<Value>) -> anyhow::Result<()> {
    machine.initialize_current(None).await?;
    if let Some(raw) = raw {
        machine.current_state_mut().set_unboxed_value(raw);
    }
    let state = machine.current_state();
    println!("  {:<16} -> {}", state.name(), state.unboxed_value());
    machine.transition()?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    }
    .with_env_overrides();
    init_tracing(&config.telemetry)?;

    let template = grammar();
    println!("=== Grammar (schematic JSON) ===");
    println!("{}", serde_json::to_string_pretty(&template.schematic("filter").to_json())?);

    println!("\n=== Interactive build ===");
    let mut machine = TokenStateMachine::with_config(&template, config.machine.clone());
    machine.on(|event| {
        if let MachineEvent::EndToken { value } = event {
            tracing::info!(token = %serde_json::Value::Object(value.clone()), "Token finished");
        }
    });
    step(&mut machine, Some(json!("Height"))).await?;
    step(&mut machine, None).await?;
    step(&mut machine, Some(json!("between"))).await?;
    step(&mut machine, Some(json!("60"))).await?;
    step(&mut machine, None).await?;
    step(&mut machine, Some(json!(65))).await?;
    println!("value:   {}", Value::Object(machine.value()));

    let saved = machine.unboxed_value();
    println!("unboxed: {}", Value::Object(saved.clone()));

    println!("\n=== Restore from saved token ===");
    let mut restored = TokenStateMachine::with_config(&template, config.machine);
    restored.bind_values(&saved).await?;
    println!(
        "terminal: {}, equal: {}",
        restored.is_terminal(),
        restored.unboxed_value() == saved
    );

    Ok(())
}
