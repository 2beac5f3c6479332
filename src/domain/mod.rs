pub mod diff;
pub mod passage;
pub mod plan;
pub mod test_result;

pub use diff::{DiffKind, DiffUnit, Token};
pub use passage::{Container, Passage, PassageKey, PassageRange, Version};
pub use plan::{plan_progress, DailyAllocation, PlanDetail, RecitationPlan};
pub use test_result::{TestResult, TestStatistics, TestType};
