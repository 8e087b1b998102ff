pub use crate::nodes::currency::{Currency, CurrencyBoxer, currency_entry};
pub use crate::nodes::datetime::{DateTimeBoxer, datetime_entry, datetime_entry_with_format};
pub use crate::nodes::label::label;
pub use crate::nodes::numeric::{NumericBoxer, bounded_numeric_entry, numeric_entry, numeric_range};
pub use crate::nodes::option::{dynamic_option_entry, option_entry};
pub use crate::nodes::terminal::{terminal, terminal_when};
pub use crate::nodes::text::{TextBoxer, text_entry};
pub use crate::nodes::value::{suggested_value_entry, value_entry};
