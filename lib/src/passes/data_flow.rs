use super::{Environment, Error};
use crate::jvm::model::Unit;
use crate::jvm::verifier::{engine, ControlFlowGraph, MethodContext, VerifierError};
use crate::util::Offset;

/// Infer frames for a method body and check every instruction against them
pub fn verify_data_flow(
    env: &Environment,
    unit: &Unit,
    method_index: usize,
) -> Result<Vec<String>, Error> {
    let method = unit
        .methods
        .get(method_index)
        .ok_or(Error::NoSuchMethod(method_index))?;
    let code = match &method.code {
        Some(code) => code,
        None => return Ok(vec![]),
    };

    let ctx = MethodContext::new(unit, method, env.oracle);
    let cfg = ControlFlowGraph::build(code)?;
    let entry = engine::entry_frame(&ctx, method, code).map_err(|kind| VerifierError {
        offset: Offset(0),
        instruction: String::from("method entry"),
        kind,
    })?;

    let summary = engine::run(&cfg, entry, &ctx, env.settings, env.cancellation)?;
    log::debug!(
        "{}.{}{}: frames stable after {} visits of {} instructions",
        unit.name,
        method.name,
        method.descriptor,
        summary.visits,
        cfg.len()
    );

    let mut warnings = vec![];
    if env.settings.warn_unreachable_code && !summary.unreachable.is_empty() {
        let offsets = summary
            .unreachable
            .iter()
            .map(|offset| offset.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        log::warn!(
            "{}.{}{} has unreachable code at {}",
            unit.name,
            method.name,
            method.descriptor,
            offsets
        );
        warnings.push(format!("unreachable code at offsets {}", offsets));
    }
    Ok(warnings)
}
