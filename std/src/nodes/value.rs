use tessera_core::{NodeType, StateConfig, Step, Validator, ValueLike};

/// Free entry of any JSON value, stored as its own key.
pub fn value_entry(name: impl Into<String>) -> Step {
    Step::new(NodeType::Value, StateConfig::new(name).validator(Validator::required()))
}

/// Free entry with suggestions drawn from `suggestions`.
///
/// Any value is accepted; the suggestions only feed the option list.
pub fn suggested_value_entry<I, V>(name: impl Into<String>, suggestions: I) -> Step
where
    I: IntoIterator<Item = V>,
    V: Into<ValueLike>,
{
    value_entry(name).configure(|config| config.static_options(suggestions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessera_core::StateTemplate;

    #[test]
    fn any_value_boxes_to_itself() {
        let mut tree = StateTemplate::from_step("value", suggested_value_entry("Value", ["red", "green"]))
            .build()
            .instantiate();
        let root = tree.root();

        assert_eq!(tree[root].options().options().len(), 2);
        tree[root].set_unboxed_value(json!("blue"));
        assert_eq!(tree[root].unboxed_value(), json!("blue"));
        tree[root].set_unboxed_value(json!({"r": 0, "g": 0, "b": 255}));
        assert_eq!(tree[root].value().unwrap().to_json(), json!({"key": {"r": 0, "g": 0, "b": 255}}));
    }
}
