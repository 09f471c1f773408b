//! 도메인 모델.

mod feed;
mod observation;

pub use feed::*;
pub use observation::*;
