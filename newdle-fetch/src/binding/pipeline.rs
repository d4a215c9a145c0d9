//! Sequential composition of async steps.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::ClientError;

/// Boxed future returned by a pipeline step.
pub type StepFuture<O> = BoxFuture<'static, Result<O, ClientError>>;

type Step<I, O> = Arc<dyn Fn(I) -> StepFuture<O> + Send + Sync>;

/// Ordered sequence of async steps where each result feeds the next.
///
/// The first failure short-circuits the rest.
pub struct Pipeline<I, O> {
    run: Step<I, O>,
}

impl<I, O> Clone for Pipeline<I, O> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<I, O> Pipeline<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Creates a pipeline with a single step.
    pub fn new<F, Fut>(step: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ClientError>> + Send + 'static,
    {
        Self {
            run: Arc::new(move |input| step(input).boxed()),
        }
    }

    /// Appends a step fed with the output of the previous one.
    pub fn then<P, F, Fut>(self, step: F) -> Pipeline<I, P>
    where
        P: Send + 'static,
        F: Fn(O) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<P, ClientError>> + Send + 'static,
    {
        let first = self.run;
        let step = Arc::new(step);
        Pipeline {
            run: Arc::new(move |input| {
                let first = Arc::clone(&first);
                let step = Arc::clone(&step);
                async move {
                    let intermediate = (first)(input).await?;
                    (step)(intermediate).await
                }
                .boxed()
            }),
        }
    }

    /// Runs all steps in order.
    pub async fn run(&self, input: I) -> Result<O, ClientError> {
        (self.run)(input).await
    }
}

impl<I, O> std::fmt::Debug for Pipeline<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").finish_non_exhaustive()
    }
}
