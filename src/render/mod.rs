pub(crate) mod cpu;
pub(crate) mod primitives;
