pub mod compiler;
pub mod console;
pub mod debug;
pub mod dictionary;
pub mod general;
pub mod inner;
pub mod tui;
