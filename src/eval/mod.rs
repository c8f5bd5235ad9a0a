pub(crate) mod autoconn;
pub(crate) mod evaluator;
pub(crate) mod segments;
pub(crate) mod timeline;
