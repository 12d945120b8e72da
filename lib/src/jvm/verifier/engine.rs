//! Fixed-point iteration of instruction effects over the control flow graph

use super::{ControlFlowGraph, EdgeKind, Frame, MethodContext, VerificationType};
use super::{VerifierError, VerifierErrorKind};
use crate::jvm::code::Code;
use crate::jvm::model::Method;
use crate::jvm::BinaryName;
use crate::settings::{Settings, WorklistOrder};
use crate::util::{Offset, Width};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

/// Outcome of a successful fixed-point computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixpointSummary {
    /// Number of instruction visits before the frames stabilized
    pub visits: usize,

    /// Instructions which cannot be reached from the method entry
    pub unreachable: Vec<Offset>,
}

/// Frame on entry to a method: `this` (if any) followed by the parameters, all other locals
/// unusable and the stack empty
pub fn entry_frame(
    ctx: &MethodContext,
    method: &Method,
    code: &Code,
) -> Result<Frame, VerifierErrorKind> {
    let mut frame = Frame::new(code.max_locals as usize, code.max_stack as usize);
    let mut slot: usize = 0;

    let mut bind = |frame: &mut Frame, vtype: VerificationType| -> Result<(), VerifierErrorKind> {
        let width = vtype.width();
        let idx = u16::try_from(slot).unwrap_or(u16::MAX);
        frame.store(idx, vtype)?;
        slot += width;
        Ok(())
    };

    if !method.is_static() {
        let this_type = if ctx.is_constructor && ctx.this_class != BinaryName::OBJECT {
            frame.this_uninitialized = true;
            VerificationType::UninitializedThis
        } else {
            VerificationType::class(ctx.this_class.clone())
        };
        bind(&mut frame, this_type)?;
    }
    for parameter in &method.descriptor.parameters {
        bind(&mut frame, VerificationType::from(parameter))?;
    }

    Ok(frame)
}

/// Pending instructions, by node index
enum Worklist {
    /// Keyed by (reverse postorder rank, node index)
    Ranked(BTreeSet<(usize, usize)>),

    /// Last in, first out, with a membership bitmap to avoid duplicates
    Stack(Vec<usize>, Vec<bool>),
}

impl Worklist {
    fn new(order: WorklistOrder, node_count: usize) -> Worklist {
        match order {
            WorklistOrder::ReversePostorder => Worklist::Ranked(BTreeSet::new()),
            WorklistOrder::DepthFirst => Worklist::Stack(vec![], vec![false; node_count]),
        }
    }

    fn insert(&mut self, cfg: &ControlFlowGraph, node: usize) {
        match self {
            Worklist::Ranked(set) => {
                set.insert((cfg.rpo_rank(node), node));
            }
            Worklist::Stack(stack, pending) => {
                if !pending[node] {
                    pending[node] = true;
                    stack.push(node);
                }
            }
        }
    }

    fn pop(&mut self) -> Option<usize> {
        match self {
            Worklist::Ranked(set) => {
                let first = *set.iter().next()?;
                set.remove(&first);
                Some(first.1)
            }
            Worklist::Stack(stack, pending) => {
                let node = stack.pop()?;
                pending[node] = false;
                Some(node)
            }
        }
    }
}

/// Propagate frames through the graph until they stop changing
///
/// The first failure ends verification of the method. Failures to merge frames are reported at
/// the instruction where the control flow paths join.
pub fn run(
    cfg: &ControlFlowGraph,
    entry: Frame,
    ctx: &MethodContext,
    settings: &Settings,
    cancel: Option<&AtomicBool>,
) -> Result<FixpointSummary, VerifierError> {
    let at_node = |node: usize, kind: VerifierErrorKind| {
        let node = &cfg.nodes[node];
        VerifierError {
            offset: node.offset,
            instruction: format!("{:?}", node.insn),
            kind,
        }
    };

    let mut summary = FixpointSummary {
        visits: 0,
        unreachable: cfg.unreachable_offsets(),
    };
    if cfg.is_empty() {
        return Ok(summary);
    }

    let mut frames: Vec<Option<Frame>> = vec![None; cfg.len()];
    let mut worklist = Worklist::new(settings.worklist_order, cfg.len());
    frames[0] = Some(entry);
    worklist.insert(cfg, 0);

    while let Some(idx) = worklist.pop() {
        if cancel.map_or(false, |flag| flag.load(Ordering::Relaxed)) {
            return Err(at_node(idx, VerifierErrorKind::Cancelled));
        }

        let frame_in = match &frames[idx] {
            Some(frame) => frame.clone(),
            None => continue,
        };
        let node = &cfg.nodes[idx];
        summary.visits += 1;
        log::trace!("visit {} {:?} with {:?}", node.offset, node.insn, frame_in);

        let frame_out = frame_in
            .apply(node.insn, node.offset, ctx)
            .map_err(|kind| at_node(idx, kind))?;

        for (edge_kind, succ) in &node.successors {
            let succ_frame = match edge_kind {
                EdgeKind::Exception { handler_index } => {
                    let catch_type = cfg.code.exception_table[*handler_index].catch_type.as_ref();
                    frame_in
                        .exception_handler_frame(catch_type)
                        .map_err(|kind| at_node(idx, kind))?
                }
                EdgeKind::FallThrough | EdgeKind::Branch => frame_out.clone(),
            };

            let updated = match &frames[*succ] {
                None => Some(succ_frame),
                Some(current) => {
                    let merged = current
                        .merge(&succ_frame, ctx.oracle)
                        .map_err(|kind| at_node(*succ, kind))?;
                    if &merged != current {
                        log::trace!("merged into {}: {:?}", cfg.nodes[*succ].offset, merged);
                        Some(merged)
                    } else {
                        None
                    }
                }
            };

            if let Some(updated) = updated {
                frames[*succ] = Some(updated);
                worklist.insert(cfg, *succ);
            }
        }
    }

    Ok(summary)
}
