pub mod principal;
pub mod token_kind;
