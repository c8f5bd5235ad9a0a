pub(crate) mod def;
pub(crate) mod project;
pub(crate) mod sanitize;
