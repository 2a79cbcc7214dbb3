mod tidy;
mod types;

pub use tidy::*;
pub use types::*;

use crate::hierarchy::Hierarchy;
