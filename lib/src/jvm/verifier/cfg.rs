use super::{VerifierError, VerifierErrorKind};
use crate::jvm::code::{Code, Insn};
use crate::util::Offset;

/// Why control can flow from one instruction to another
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EdgeKind {
    /// Execution continues with the next instruction
    FallThrough,

    /// Jump (conditional, unconditional, or switch)
    Branch,

    /// An exception thrown by the instruction is caught by a handler
    Exception { handler_index: usize },
}

/// Instruction in the control flow graph
#[derive(Debug)]
pub struct Node<'c> {
    pub offset: Offset,
    pub insn: &'c Insn,

    /// Outgoing edges, as (kind, node index) pairs
    ///
    /// Exception edges come last and follow the declaration order of the exception table.
    pub successors: Vec<(EdgeKind, usize)>,
}

/// Control flow graph of a method body, with one node per instruction
#[derive(Debug)]
pub struct ControlFlowGraph<'c> {
    pub code: &'c Code,
    pub nodes: Vec<Node<'c>>,

    /// Reverse postorder rank of each node (unreachable nodes are ranked after all reachable ones)
    rpo_ranks: Vec<usize>,

    reachable: Vec<bool>,
}

impl<'c> ControlFlowGraph<'c> {
    /// Build the graph, checking that every jump target and handler offset lands on an instruction
    pub fn build(code: &'c Code) -> Result<ControlFlowGraph<'c>, VerifierError> {
        let invalid_target = |index: usize, target: Offset| {
            let (offset, insn) = &code.instructions[index];
            VerifierError {
                offset: *offset,
                instruction: format!("{:?}", insn),
                kind: VerifierErrorKind::InvalidTarget(target),
            }
        };

        // Exception table ranges must line up with instructions
        for (handler_index, handler) in code.exception_table.iter().enumerate() {
            let end_ok = handler.end.0 == code.length || code.is_boundary(handler.end);
            let bad_offset = [handler.start, handler.handler]
                .into_iter()
                .find(|offset| !code.is_boundary(*offset))
                .or(if end_ok { None } else { Some(handler.end) });
            if let Some(target) = bad_offset {
                return Err(VerifierError {
                    offset: handler.start,
                    instruction: format!("exception handler {}", handler_index),
                    kind: VerifierErrorKind::InvalidTarget(target),
                });
            }
        }

        let mut nodes = Vec::with_capacity(code.instructions.len());
        for (index, (offset, insn)) in code.instructions.iter().enumerate() {
            let mut successors = vec![];

            if insn.falls_through() {
                if index + 1 < code.instructions.len() {
                    successors.push((EdgeKind::FallThrough, index + 1));
                } else {
                    return Err(invalid_target(index, Offset(code.length)));
                }
            }

            for target in insn.jump_targets() {
                match code.instruction_index(target) {
                    Some(target_index) => successors.push((EdgeKind::Branch, target_index)),
                    None => return Err(invalid_target(index, target)),
                }
            }

            for (handler_index, handler) in code.exception_table.iter().enumerate() {
                if handler.protects(*offset) {
                    if let Some(handler_node) = code.instruction_index(handler.handler) {
                        successors.push((EdgeKind::Exception { handler_index }, handler_node));
                    }
                }
            }

            nodes.push(Node {
                offset: *offset,
                insn,
                successors,
            });
        }

        let (rpo_ranks, reachable) = Self::reverse_postorder(&nodes);
        Ok(ControlFlowGraph {
            code,
            nodes,
            rpo_ranks,
            reachable,
        })
    }

    /// Number the nodes in reverse postorder of a depth-first walk from the first instruction
    fn reverse_postorder(nodes: &[Node<'c>]) -> (Vec<usize>, Vec<bool>) {
        let mut reachable = vec![false; nodes.len()];
        let mut postorder = Vec::with_capacity(nodes.len());

        // Explicit stack of (node, next successor to visit)
        let mut stack: Vec<(usize, usize)> = vec![];
        if !nodes.is_empty() {
            reachable[0] = true;
            stack.push((0, 0));
        }
        while let Some((node, next_edge)) = stack.pop() {
            match nodes[node].successors.get(next_edge) {
                Some((_, succ)) => {
                    stack.push((node, next_edge + 1));
                    if !reachable[*succ] {
                        reachable[*succ] = true;
                        stack.push((*succ, 0));
                    }
                }
                None => postorder.push(node),
            }
        }

        let mut ranks = vec![usize::MAX; nodes.len()];
        for (rank, node) in postorder.iter().rev().enumerate() {
            ranks[*node] = rank;
        }
        let mut next_rank = postorder.len();
        for rank in ranks.iter_mut().filter(|rank| **rank == usize::MAX) {
            *rank = next_rank;
            next_rank += 1;
        }

        (ranks, reachable)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn rpo_rank(&self, node: usize) -> usize {
        self.rpo_ranks[node]
    }

    pub fn is_reachable(&self, node: usize) -> bool {
        self.reachable[node]
    }

    /// Offsets of instructions that cannot be reached from the method entry
    pub fn unreachable_offsets(&self) -> Vec<Offset> {
        self.nodes
            .iter()
            .zip(&self.reachable)
            .filter(|(_, reachable)| !**reachable)
            .map(|(node, _)| node.offset)
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::code::{
        BranchInstruction, ExceptionHandler, Instruction, OrdComparison,
    };
    use crate::jvm::BinaryName;

    fn code(instructions: Vec<(usize, Insn)>, length: usize) -> Code {
        Code {
            max_stack: 4,
            max_locals: 2,
            length,
            instructions: instructions
                .into_iter()
                .map(|(offset, insn)| (Offset(offset), insn))
                .collect(),
            exception_table: vec![],
        }
    }

    #[test]
    fn straight_line_and_branches() {
        let code = code(
            vec![
                (0, Instruction::ILoad(0).into()),
                (1, BranchInstruction::If(OrdComparison::EQ, Offset(7)).into()),
                (4, Instruction::IConst1.into()),
                (5, BranchInstruction::IReturn.into()),
                (6, Instruction::Nop.into()),
                (7, Instruction::IConst0.into()),
                (8, BranchInstruction::IReturn.into()),
            ],
            9,
        );
        let cfg = ControlFlowGraph::build(&code).unwrap();

        assert_eq!(cfg.len(), 7);
        assert_eq!(
            cfg.nodes[1].successors,
            vec![(EdgeKind::FallThrough, 2), (EdgeKind::Branch, 5)]
        );
        assert!(cfg.nodes[3].successors.is_empty());
        assert_eq!(cfg.unreachable_offsets(), vec![Offset(6)]);
        assert!(!cfg.is_reachable(4));

        // Entry comes first, unreachable code last
        assert_eq!(cfg.rpo_rank(0), 0);
        assert!(cfg.rpo_rank(1) < cfg.rpo_rank(2));
        assert!(cfg.rpo_rank(1) < cfg.rpo_rank(5));
        assert_eq!(cfg.rpo_rank(4), 6);
    }

    #[test]
    fn loops_are_ranked_by_first_visit() {
        let code = code(
            vec![
                (0, Instruction::IConst0.into()),
                (1, Instruction::IStore(1).into()),
                (2, Instruction::IInc(1, 1).into()),
                (5, BranchInstruction::Goto(Offset(2)).into()),
            ],
            8,
        );
        let cfg = ControlFlowGraph::build(&code).unwrap();
        assert_eq!(cfg.nodes[3].successors, vec![(EdgeKind::Branch, 2)]);
        let ranks: Vec<usize> = (0..4).map(|node| cfg.rpo_rank(node)).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
        assert!(cfg.unreachable_offsets().is_empty());
    }

    #[test]
    fn invalid_targets() {
        // Jump into the middle of `sipush`
        let code1 = code(
            vec![
                (0, BranchInstruction::Goto(Offset(4)).into()),
                (3, Instruction::SiPush(300).into()),
                (6, BranchInstruction::Return.into()),
            ],
            7,
        );
        let err = ControlFlowGraph::build(&code1).unwrap_err();
        assert_eq!(err.offset, Offset(0));
        assert_eq!(err.kind, VerifierErrorKind::InvalidTarget(Offset(4)));

        // Falling off the end
        let code2 = code(vec![(0, Instruction::Nop.into())], 1);
        assert_eq!(
            ControlFlowGraph::build(&code2).unwrap_err().kind,
            VerifierErrorKind::InvalidTarget(Offset(1))
        );

        // Handler in the middle of an instruction
        let mut code3 = code(
            vec![
                (0, Instruction::SiPush(300).into()),
                (3, BranchInstruction::IReturn.into()),
            ],
            4,
        );
        code3.exception_table.push(ExceptionHandler {
            start: Offset(0),
            end: Offset(3),
            handler: Offset(2),
            catch_type: None,
        });
        assert_eq!(
            ControlFlowGraph::build(&code3).unwrap_err().kind,
            VerifierErrorKind::InvalidTarget(Offset(2))
        );
    }

    #[test]
    fn exception_edges_keep_table_order() {
        let mut code = code(
            vec![
                (0, Instruction::Nop.into()),
                (1, BranchInstruction::Return.into()),
                (2, BranchInstruction::AThrow.into()),
                (3, BranchInstruction::AThrow.into()),
            ],
            4,
        );
        code.exception_table.push(ExceptionHandler {
            start: Offset(0),
            end: Offset(2),
            handler: Offset(3),
            catch_type: Some(BinaryName::RUNTIMEEXCEPTION),
        });
        code.exception_table.push(ExceptionHandler {
            start: Offset(0),
            end: Offset(1),
            handler: Offset(2),
            catch_type: None,
        });
        let cfg = ControlFlowGraph::build(&code).unwrap();
        assert_eq!(
            cfg.nodes[0].successors,
            vec![
                (EdgeKind::FallThrough, 1),
                (EdgeKind::Exception { handler_index: 0 }, 3),
                (EdgeKind::Exception { handler_index: 1 }, 2),
            ]
        );
        assert_eq!(
            cfg.nodes[1].successors,
            vec![(EdgeKind::Exception { handler_index: 0 }, 3)]
        );
        assert!(cfg.unreachable_offsets().is_empty());
    }
}
