//! 수집 파이프라인 전반에서 사용되는 공통 타입.

mod exchange;
mod price;
mod symbol;

pub use exchange::*;
pub use price::*;
pub use symbol::*;
