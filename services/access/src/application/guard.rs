//! 授权守卫
//!
//! 所有受控命令在写入前经过此处: 评估策略、记录指标与日志、
//! 将拒绝转换为 `AppError`。

use std::time::Instant;

use eventrax_errors::{AppError, AppResult};
use metrics::{counter, histogram};
use tracing::{debug, warn};

use crate::domain::policy::{Actor, AuthorizationPolicy, Decision, Operation, SideEffect};
use crate::error::AccessError;

/// 已授权的操作
#[derive(Debug, Clone)]
pub struct Grant {
    pub actor: Actor,
    pub side_effects: Vec<SideEffect>,
}

/// 评估并记录决策（仅检查，不转换为错误）
pub fn evaluate(actor: Option<&Actor>, operation: &Operation) -> Decision {
    let start = Instant::now();
    let decision = AuthorizationPolicy::evaluate(actor, operation);

    counter!("authorization_decisions_total",
        "operation" => operation.name(),
        "allowed" => decision.allowed.to_string(),
        "reason" => decision.reason.map_or("none", |r| r.as_str())
    )
    .increment(1);
    histogram!("authorization_decision_duration_us")
        .record(start.elapsed().as_micros() as f64);

    if decision.allowed {
        debug!(
            operation = operation.name(),
            actor_id = ?actor.map(|a| a.id),
            side_effects = decision.side_effects.len(),
            "Authorization granted"
        );
    } else {
        warn!(
            operation = operation.name(),
            actor_id = ?actor.map(|a| a.id),
            reason = ?decision.reason,
            message = decision.message.as_deref().unwrap_or(""),
            "Authorization denied"
        );
    }

    decision
}

/// 评估并要求允许
pub fn authorize(actor: Option<&Actor>, operation: &Operation) -> AppResult<Grant> {
    let decision = evaluate(actor, operation);
    if let Some(error) = AccessError::from_decision(&decision) {
        return Err(error.into());
    }
    let actor = actor
        .copied()
        .ok_or_else(|| AppError::unauthenticated("Authentication required"))?;
    Ok(Grant {
        actor,
        side_effects: decision.side_effects,
    })
}
