use thiserror::Error;

#[derive(Debug, Error)]
pub enum MxError {
    #[error("reading system resolver configuration failed: {0}")]
    SystemConf(String),
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
}

impl MxError {
    pub(crate) fn system_conf<E: std::fmt::Display>(err: E) -> Self {
        Self::SystemConf(err.to_string())
    }

    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }
}
