//! Runtime values held on the operand stack, in the heap and in the genome.

mod value;

pub use value::Value;
