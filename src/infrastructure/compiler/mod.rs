//! Compilation verifiers.

pub mod javac;

pub use javac::{find_javac, JavacTestCompiler};
