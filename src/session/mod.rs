pub(crate) mod plate_session;
