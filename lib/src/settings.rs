/// Knobs controlling how units get verified
#[derive(Debug, Clone)]
pub struct Settings {
    /// Report instructions which cannot be reached from the method entry
    ///
    /// Unreachable code is never an error, but it is usually a sign of a broken code generator.
    pub warn_unreachable_code: bool,

    /// Number of worker threads used to verify the methods of a single unit
    ///
    /// With `1`, methods are verified on the calling thread.
    pub method_threads: usize,

    /// Order in which the data-flow engine revisits instructions
    pub worklist_order: WorklistOrder,
}

impl Settings {
    pub fn new() -> Settings {
        Settings {
            warn_unreachable_code: true,
            method_threads: 1,
            worklist_order: WorklistOrder::ReversePostorder,
        }
    }
}

impl Default for Settings {
    fn default() -> Settings {
        Settings::new()
    }
}

/// Order of the data-flow work-set
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WorklistOrder {
    /// Always visit the pending instruction that comes first in reverse postorder
    ///
    /// This visits most instructions only after all of their forward predecessors, so it usually
    /// converges in the fewest visits.
    ReversePostorder,

    /// Visit the most recently changed instruction first
    DepthFirst,
}
