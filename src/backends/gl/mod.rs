pub mod capabilities;
pub mod types;
pub mod visitor;

pub use self::visitor::GLVisitor;
