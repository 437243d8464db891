//! Data models
//!
//! Rust structs representing database entities.

mod body_composition;
mod exercise;
mod goal;
mod personal_record;
mod progress_photo;
mod task;
mod template;
mod user;
mod weight_entry;
mod workout;

pub use body_composition::{BodyComposition, BodyCompositionCreate};
pub use exercise::{
    Exercise, ExerciseCategory, ExerciseCreate, ExercisePerformance, ExerciseUpdate, MuscleGroup,
};
pub use goal::{Goal, GoalCategory, GoalCreate, GoalStatus, GoalStatusCounts, GoalUpdate};
pub use personal_record::{PersonalRecord, PersonalRecordCreate, RecordType};
pub use progress_photo::{PhotoType, ProgressPhoto, ProgressPhotoCreate};
pub use task::{Task, TaskCreate, TaskStatus, TaskUpdate};
pub use template::{
    TemplateExercise, TemplateExerciseInput, TemplateWithExercises, WorkoutTemplate,
    WorkoutTemplateCreate,
};
pub use user::{User, UserCreate};
pub use weight_entry::{WeightEntry, WeightEntryCreate, WeightEntryUpdate};
pub use workout::{Workout, WorkoutCreate, WorkoutExercise, WorkoutExerciseCreate, WorkoutUpdate};
