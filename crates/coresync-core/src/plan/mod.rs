//! Weekly plans: normalization, routine records, persistence, prompts.

pub mod model;
pub mod normalize;
pub mod prompt;
pub mod records;
pub mod service;

pub use model::{DayEntry, ExerciseEntry, PlanInput, WeeklyPlan};
pub use normalize::{NormalizationError, NormalizedPlan, clean_text, normalize};
pub use prompt::{PlanRequest, PlanRequestError, build_plan_prompt};
pub use records::{ROUTINE_CATEGORY, RoutineRecord, routine_records};
pub use service::{get_plan_with_routines, save_plan_as_routines};
