use thiserror::Error;
use vc_core::DataError;

/// Errors returned by the cleaning pipeline.
#[derive(Debug, Error)]
pub enum CleanerError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("step {step} failed")]
    Step {
        step: &'static str,
        #[source]
        source: DataError,
    },
}

impl CleanerError {
    pub(crate) fn at(step: &'static str) -> impl FnOnce(DataError) -> Self {
        move |source| CleanerError::Step { step, source }
    }
}

pub type Result<T> = std::result::Result<T, CleanerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_step_error_chain_names_cause_once() {
        let err = CleanerError::at("permalink filter")(DataError::MissingColumn("permalink".into()));
        assert_eq!(err.to_string(), "step permalink filter failed");

        let cause = err.source().map(ToString::to_string).unwrap_or_default();
        assert!(cause.contains("permalink"));

        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain.matches(&cause).count(), 1);
    }
}
