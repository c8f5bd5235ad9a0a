pub(crate) mod render_session;
