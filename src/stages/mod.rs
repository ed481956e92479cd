pub mod stage0_normalize;
pub mod stage1_derive;
pub mod stage2_publish;

pub use stage0_normalize::*;
pub use stage1_derive::*;
pub use stage2_publish::*;
