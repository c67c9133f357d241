pub mod animate;
pub mod controls;
pub mod errors;
pub mod heap;
pub mod mode;
pub mod options;
pub mod plan;
pub mod practice;
pub mod presentation;
pub mod session;
pub mod terminal;
