pub mod currency;
pub mod datetime;
pub mod label;
pub mod numeric;
pub mod option;
pub mod terminal;
pub mod text;
pub mod value;
