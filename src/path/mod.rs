pub(crate) mod astar;
