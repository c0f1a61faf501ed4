use serde::Serialize;

/// The fast matrix operations the benchmark drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Multiply,
    Transpose,
    Inverse,
    Elementwise,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Multiply,
        Operation::Transpose,
        Operation::Inverse,
        Operation::Elementwise,
    ];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationCounts {
    pub calls: usize,
    pub registers: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    multiply: OperationCounts,
    transpose: OperationCounts,
    inverse: OperationCounts,
    elementwise: OperationCounts,
}

impl Stats {
    pub fn new() -> Self {
        Stats::default()
    }

    fn counts_mut(&mut self, operation: Operation) -> &mut OperationCounts {
        match operation {
            Operation::Multiply => &mut self.multiply,
            Operation::Transpose => &mut self.transpose,
            Operation::Inverse => &mut self.inverse,
            Operation::Elementwise => &mut self.elementwise,
        }
    }

    pub fn get(&self, operation: Operation) -> OperationCounts {
        match operation {
            Operation::Multiply => self.multiply,
            Operation::Transpose => self.transpose,
            Operation::Inverse => self.inverse,
            Operation::Elementwise => self.elementwise,
        }
    }

    /// Record one call of `operation` that went over `registers` registers.
    pub fn bump(&mut self, operation: Operation, registers: usize) {
        let counts = self.counts_mut(operation);
        counts.calls += 1;
        counts.registers += registers;
    }

    pub fn total_calls(&self) -> usize {
        Operation::ALL.iter().map(|&op| self.get(op).calls).sum()
    }

    pub fn total_registers(&self) -> usize {
        Operation::ALL.iter().map(|&op| self.get(op).registers).sum()
    }

    pub fn merge(mut self, other: &Stats) -> Stats {
        for operation in Operation::ALL {
            let theirs = other.get(operation);
            let ours = self.counts_mut(operation);
            ours.calls += theirs.calls;
            ours.registers += theirs.registers;
        }
        self
    }
}
