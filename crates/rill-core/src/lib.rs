pub mod ast;
pub mod decode;
pub mod pipeline;
pub mod typecheck;
