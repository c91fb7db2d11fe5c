use std::time::Duration;

use crate::error::FunctionError;
use crate::proto::{
    Condition, ConditionStatus, FunctionResult, ResponseMeta, RunFunctionRequest,
    RunFunctionResponse, Severity, Target,
};

/// Condition type every invocation reports on the composite.
pub const FUNCTION_SUCCESS: &str = "FunctionSuccess";

/// Start a response from its request.
///
/// Echoes the request tag, carries over the desired state and context built
/// by earlier pipeline steps, and sets the cache TTL.
pub fn to(req: &RunFunctionRequest, ttl: Duration) -> RunFunctionResponse {
    RunFunctionResponse {
        meta: ResponseMeta {
            tag: req.meta.tag.clone(),
            ttl: Some(ttl),
        },
        desired: req.desired.clone(),
        results: Vec::new(),
        context: req.context.clone(),
        conditions: Vec::new(),
    }
}

/// Report that the function ran to completion.
pub fn success(rsp: &mut RunFunctionResponse) {
    set_condition(
        rsp,
        Condition {
            condition_type: FUNCTION_SUCCESS.to_string(),
            status: ConditionStatus::True,
            reason: "Success".to_string(),
            message: None,
            target: Some(Target::Composite),
        },
    );
}

/// Report a failed invocation: a False condition plus a fatal result.
pub fn fatal(rsp: &mut RunFunctionResponse, err: &FunctionError) {
    let message = err.to_string();
    rsp.results.push(FunctionResult {
        severity: Severity::Fatal,
        message: message.clone(),
        reason: Some(err.reason().to_string()),
        target: Some(Target::Composite),
    });
    set_condition(
        rsp,
        Condition {
            condition_type: FUNCTION_SUCCESS.to_string(),
            status: ConditionStatus::False,
            reason: err.reason().to_string(),
            message: Some(message),
            target: Some(Target::Composite),
        },
    );
}

/// Add a condition, replacing any earlier one of the same type.
pub fn set_condition(rsp: &mut RunFunctionResponse, condition: Condition) {
    match rsp
        .conditions
        .iter_mut()
        .find(|c| c.condition_type == condition.condition_type)
    {
        Some(existing) => *existing = condition,
        None => rsp.conditions.push(condition),
    }
}
