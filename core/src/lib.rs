//! Grammar blueprints and the runtime nodes instantiated from them.

pub mod boxing;
pub mod context;
pub mod error;
pub mod event;
pub mod guard;
pub mod node_type;
pub mod options;
pub mod schematic;
pub mod state;
pub mod step;
pub mod template;
pub mod tree;
pub mod validate;
pub mod value;

pub use boxing::{Boxer, IdentityBoxer, OptionBoxer};
pub use context::{Context, ContextEntry};
pub use error::{ArchiveError, StateError};
pub use event::{Emitter, ListenerId, StateEvent};
pub use guard::Guard;
pub use node_type::{CustomNodeType, NodeType};
pub use options::{OptionProvider, OptionSource, OptionStore, RefreshOutcome, StaticOptions};
pub use schematic::Schematic;
pub use state::{State, StateId};
pub use step::{StateConfig, Step};
pub use template::{StateTemplate, TemplateChain};
pub use tree::StateTree;
pub use validate::Validator;
pub use value::{Raw, TokenValue, ValueLike};

pub mod prelude {
    pub use crate::boxing::{Boxer, IdentityBoxer, OptionBoxer};
    pub use crate::context::Context;
    pub use crate::error::{ArchiveError, StateError};
    pub use crate::event::StateEvent;
    pub use crate::guard::{
        Guard, has_value, option_key_in, option_key_is, option_key_is_not, option_meta_matches,
    };
    pub use crate::node_type::{CustomNodeType, NodeType};
    pub use crate::options::{OptionProvider, provider_fn};
    pub use crate::schematic::Schematic;
    pub use crate::state::{State, StateId};
    pub use crate::step::{StateConfig, Step};
    pub use crate::template::StateTemplate;
    pub use crate::validate::Validator;
    pub use crate::value::{Raw, TokenValue, ValueLike};
}
