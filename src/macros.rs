macro_rules! log_and_err {
    ($err:expr) => {{
        let err: $crate::error::CollectionError = $err;
        log::debug!("{}", err);
        Err(err)
    }};
}
