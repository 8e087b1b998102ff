//! Choice steps backed by a fixed or fetched option list.

use tessera_core::{NodeType, OptionBoxer, OptionProvider, StateConfig, Step, Validator, ValueLike};

/// Pick one of a fixed list of options. Unknown keys do not box.
pub fn option_entry<I, V>(name: impl Into<String>, options: I) -> Step
where
    I: IntoIterator<Item = V>,
    V: Into<ValueLike>,
{
    Step::new(
        NodeType::Option,
        StateConfig::new(name)
            .static_options(options)
            .boxer(OptionBoxer::default())
            .validator(Validator::required()),
    )
}

/// Pick one of the options returned by `provider` for the typed hint.
///
/// The list is fetched when the step initializes and whenever the owner
/// refreshes it; results of superseded fetches are dropped.
pub fn dynamic_option_entry(name: impl Into<String>, provider: impl OptionProvider + 'static) -> Step {
    Step::new(
        NodeType::Option,
        StateConfig::new(name)
            .options_provider(provider)
            .boxer(OptionBoxer::default())
            .validator(Validator::required()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use serde_json::json;
    use tessera_core::options::provider_fn;
    use tessera_core::{Context, StateTemplate};

    #[test]
    fn static_options_box_by_key() {
        let template = StateTemplate::from_step(
            "relation",
            option_entry(
                "Relation",
                [
                    ValueLike::new("between").with_display_key("is between"),
                    ValueLike::new("equals"),
                ],
            ),
        )
        .build();
        let mut tree = template.instantiate();
        let root = tree.root();

        assert!(!tree[root].is_valid().unwrap());
        let boxed = tree[root].set_unboxed_value(json!("between")).cloned().unwrap();
        assert_eq!(boxed.display_key(), "is between");
        assert!(tree[root].is_valid().unwrap());
        assert_eq!(tree[root].set_unboxed_value(json!("like")), None);
    }

    #[tokio::test]
    async fn dynamic_options_are_fetched_on_initialize() {
        let step = dynamic_option_entry(
            "City",
            provider_fn(|hint, _context, _archive| {
                async move {
                    let cities = ["Berlin", "Bern", "Boston"];
                    Ok::<_, anyhow::Error>(
                        cities
                            .iter()
                            .filter(|city| city.to_lowercase().starts_with(&hint.to_lowercase()))
                            .map(|city| ValueLike::new(*city))
                            .collect(),
                    )
                }
                .boxed()
            }),
        );
        let mut tree = StateTemplate::from_step("city", step).build().instantiate();
        let root = tree.root();

        tree[root].initialize(&Context::new(), Some(&json!("Ber"))).await.unwrap();

        assert_eq!(
            tree[root].options().options(),
            vec![ValueLike::new("Berlin"), ValueLike::new("Bern")]
        );
        assert_eq!(tree[root].value(), None);

        tree[root].options().refresh("Bos", &Context::new(), &[]).await.unwrap();
        assert_eq!(tree[root].set_unboxed_value(json!("Boston")), Some(&ValueLike::new("Boston")));
    }
}
