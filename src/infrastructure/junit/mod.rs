//! JUnit response parsing and Java source rendering.

pub mod assembler;
pub mod parser;
pub mod presenter;

pub use assembler::JUnitTestsAssembler;
pub use parser::JUnitTestSuiteParser;
pub use presenter::JavaTestsPresenter;
