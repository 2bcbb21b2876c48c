/// This visitor pattern allows multiple different algorithms to be written over the same data.
///
/// It separates the set algorithms from the operations performed on their results: a
/// materializing visitor and a counting visitor can share the exact same merge loop, so
/// computing a cardinality-only fast path never needs to allocate a throwaway `Vec`.
pub trait BinaryOperationVisitor {
    fn visit_scalar(&mut self, value: u16);
    fn visit_slice(&mut self, values: &[u16]);
}

/// A simple visitor that stores the computation result to a `Vec`, accessible by calling
/// `into_inner()`.
pub struct VecWriter {
    vec: Vec<u16>,
}

impl VecWriter {
    pub fn new(capacity: usize) -> VecWriter {
        VecWriter { vec: Vec::with_capacity(capacity) }
    }

    pub fn into_inner(self) -> Vec<u16> {
        self.vec
    }
}

impl BinaryOperationVisitor for VecWriter {
    fn visit_scalar(&mut self, value: u16) {
        self.vec.push(value)
    }

    fn visit_slice(&mut self, values: &[u16]) {
        self.vec.extend_from_slice(values);
    }
}

pub struct CardinalityCounter {
    count: usize,
}

impl CardinalityCounter {
    pub fn new() -> CardinalityCounter {
        CardinalityCounter { count: 0 }
    }

    pub fn into_inner(self) -> u64 {
        self.count as u64
    }
}

impl BinaryOperationVisitor for CardinalityCounter {
    fn visit_scalar(&mut self, _value: u16) {
        self.count += 1;
    }

    fn visit_slice(&mut self, values: &[u16]) {
        self.count += values.len();
    }
}
