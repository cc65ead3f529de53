pub(crate) mod analysis;
pub(crate) mod form;
pub(crate) mod health;
