use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{FunctionError, Result};
use crate::logging::Logger;
use crate::proto::{Resource, RunFunctionRequest, RunFunctionResponse};
use crate::resource::{Bucket, ObservedComposite};
use crate::response;

/// How long the orchestrator may reuse a response without calling again.
pub const RESPONSE_TTL: Duration = Duration::from_secs(60);

/// Derives one provider `Bucket` per name listed on an `XBuckets` composite.
///
/// Stateless: a single value can serve any number of concurrent calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Function;

impl Function {
    pub fn new() -> Self {
        Self
    }

    /// Run the function against one request.
    ///
    /// Never fails: bad input is reported inside the response as a False
    /// `FunctionSuccess` condition and a fatal result.
    pub fn run_function(&self, req: &RunFunctionRequest, log: &dyn Logger) -> RunFunctionResponse {
        log.info("Running function", &[("tag", req.meta.tag.as_str())]);

        let mut rsp = response::to(req, RESPONSE_TTL);

        match compose(req) {
            Ok(buckets) => {
                log.debug(
                    "Composed buckets",
                    &[("count", buckets.len().to_string().as_str())],
                );
                rsp.desired.resources.extend(buckets);
                response::success(&mut rsp);
            }
            Err(err) => {
                log.info(
                    "Cannot compose buckets",
                    &[
                        ("error", err.to_string().as_str()),
                        ("category", err.category().to_string().as_str()),
                    ],
                );
                response::fatal(&mut rsp, &err);
            }
        }

        rsp
    }
}

/// Build the desired bucket for every name on the observed composite.
///
/// Names are visited in order, so a duplicated name ends up with the entry
/// built last.
pub fn compose(req: &RunFunctionRequest) -> Result<BTreeMap<String, Resource>> {
    let composite = req
        .observed
        .composite
        .as_ref()
        .ok_or_else(|| FunctionError::malformed_input("missing observed composite resource"))?;
    let xr = ObservedComposite::from_object(&composite.resource)?;

    let mut buckets = BTreeMap::new();
    for name in &xr.spec.names {
        let bucket = Bucket::new(name, &xr.spec.region);
        buckets.insert(
            Bucket::composed_key(name),
            Resource::from_object(bucket.to_object()?),
        );
    }
    Ok(buckets)
}
