//! FitTrack MCP Server Implementation
//!
//! Implements the MCP server with all FitTrack tools.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::analytics::RangeQuery;
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::TemplateExerciseInput;
use crate::tools::body::{self, Measurements};
use crate::tools::records::{self, RecordEntry};
use crate::tools::status::StatusTracker;
use crate::tools::workouts::{self, ExerciseEntry};
use crate::tools::{
    analytics, exercises, goals, reports, tasks, templates, today, users, weights,
};

/// FitTrack MCP Service
#[derive(Clone)]
pub struct FitTrackService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<FitTrackService>,
}

impl FitTrackService {
    pub fn new(database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new())),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Map a tool error onto an MCP error; internal details stay in the log
pub fn to_mcp_error(err: AppError) -> McpError {
    match err {
        AppError::Validation(issues) => {
            let message = AppError::Validation(issues.clone()).to_string();
            McpError::invalid_params(message, Some(serde_json::json!({ "issues": issues })))
        }
        AppError::NotFound { resource, id } => McpError::resource_not_found(
            format!("{resource} not found with id: {id}"),
            Some(serde_json::json!({ "resource": resource, "id": id })),
        ),
        AppError::Conflict(message) => {
            McpError::invalid_request(message, Some(serde_json::json!({ "kind": "conflict" })))
        }
        internal @ (AppError::Database(_) | AppError::Io(_) | AppError::Report(_)) => {
            tracing::error!(error = %internal, "tool call failed");
            McpError::internal_error("internal error", None)
        }
    }
}

/// Serialize a tool result as pretty JSON text content
fn respond<T: Serialize>(result: AppResult<T>) -> Result<CallToolResult, McpError> {
    let value = result.map_err(to_mcp_error)?;
    let json = serde_json::to_string_pretty(&value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Shared Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserParams {
    /// User ID
    pub user_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserRecordParams {
    /// User ID
    pub user_id: i64,
    /// Record ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RangeParams {
    /// User ID
    pub user_id: i64,
    /// Range token: 7, 30, 90, 365 or all (default 30)
    pub range: Option<String>,
    /// Explicit start date (YYYY-MM-DD); used together with end_date
    pub start_date: Option<String>,
    /// Explicit end date (YYYY-MM-DD); used together with start_date
    pub end_date: Option<String>,
}

impl RangeParams {
    fn query(&self) -> RangeQuery<'_> {
        RangeQuery {
            range: self.range.as_deref(),
            start_date: self.start_date.as_deref(),
            end_date: self.end_date.as_deref(),
        }
    }
}

// ============================================================================
// User Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RegisterUserParams {
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetUserParams {
    pub user_id: i64,
}

// ============================================================================
// Weight Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddWeightEntryParams {
    pub user_id: i64,
    /// Date of the reading (YYYY-MM-DD)
    pub date: String,
    /// Body weight, must be positive
    pub weight: f64,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateWeightEntryParams {
    pub user_id: i64,
    pub id: i64,
    pub date: Option<String>,
    pub weight: Option<f64>,
    pub note: Option<String>,
}

// ============================================================================
// Workout Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddWorkoutParams {
    pub user_id: i64,
    /// Date of the workout (YYYY-MM-DD)
    pub date: String,
    /// Free-text type such as "Running" or "Strength"
    pub workout_type: String,
    /// Duration in minutes
    pub duration: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateWorkoutParams {
    pub user_id: i64,
    pub id: i64,
    pub date: Option<String>,
    pub workout_type: Option<String>,
    pub duration: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddWorkoutExerciseParams {
    pub user_id: i64,
    pub workout_id: i64,
    pub exercise_id: i64,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    /// Weight lifted; a new best creates a MAX_WEIGHT personal record
    pub weight: Option<f64>,
    pub duration_seconds: Option<i64>,
    pub distance: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveWorkoutExerciseParams {
    pub user_id: i64,
    /// ID of the workout exercise line
    pub workout_exercise_id: i64,
}

// ============================================================================
// Exercise Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateExerciseParams {
    pub user_id: i64,
    /// Unique per user, case-insensitive
    pub name: String,
    /// STRENGTH, CARDIO, FLEXIBILITY, BALANCE, SPORTS or OTHER
    pub category: String,
    /// Muscle groups such as CHEST, BACK, LEGS
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    pub equipment: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListExercisesParams {
    pub user_id: i64,
    /// Optional category filter
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateExerciseParams {
    pub user_id: i64,
    pub id: i64,
    pub name: Option<String>,
    pub category: Option<String>,
    pub muscle_groups: Option<Vec<String>>,
    pub equipment: Option<String>,
    pub description: Option<String>,
}

// ============================================================================
// Template Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TemplateExerciseParams {
    pub exercise_id: i64,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    pub weight: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateTemplateParams {
    pub user_id: i64,
    pub name: String,
    pub workout_type: String,
    pub description: Option<String>,
    /// Estimated duration in minutes
    pub estimated_duration: Option<i64>,
    #[serde(default)]
    pub exercises: Vec<TemplateExerciseParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StartWorkoutFromTemplateParams {
    pub user_id: i64,
    pub template_id: i64,
    /// Workout date (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
    /// Duration in minutes, defaults to the template's estimate
    pub duration: Option<i64>,
}

// ============================================================================
// Personal Record Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddPersonalRecordParams {
    pub user_id: i64,
    pub exercise_id: i64,
    /// MAX_WEIGHT, MAX_REPS, MAX_VOLUME, BEST_TIME or LONGEST_DISTANCE
    pub record_type: String,
    pub value: f64,
    pub unit: String,
    /// Date achieved (YYYY-MM-DD)
    pub date: String,
    pub workout_id: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListPersonalRecordsParams {
    pub user_id: i64,
    pub exercise_id: Option<i64>,
}

// ============================================================================
// Body Tracking Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddBodyCompositionParams {
    pub user_id: i64,
    pub date: String,
    pub body_fat_percentage: Option<f64>,
    pub muscle_mass: Option<f64>,
    pub waist: Option<f64>,
    pub chest: Option<f64>,
    pub hips: Option<f64>,
    pub arms: Option<f64>,
    pub thighs: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddProgressPhotoParams {
    pub user_id: i64,
    pub date: String,
    /// Path or URL of the stored image
    pub image_path: String,
    /// FRONT, SIDE, BACK or OTHER (default FRONT)
    pub photo_type: Option<String>,
    pub caption: Option<String>,
}

// ============================================================================
// Task Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateTaskParams {
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListByStatusParams {
    pub user_id: i64,
    /// Optional status filter
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateTaskParams {
    pub user_id: i64,
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    /// PENDING, COMPLETED or ARCHIVED
    pub status: Option<String>,
    pub due_date: Option<String>,
}

// ============================================================================
// Goal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateGoalParams {
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    /// WEIGHT, WORKOUTS or TASKS
    pub category: String,
    /// Target value, must be positive
    pub target: f64,
    /// Starting value (default 0)
    pub current: Option<f64>,
    pub unit: String,
    pub deadline: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateGoalParams {
    pub user_id: i64,
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub target: Option<f64>,
    pub unit: Option<String>,
    /// ACTIVE, COMPLETED, PAUSED or CANCELLED
    pub status: Option<String>,
    pub deadline: Option<String>,
}

// ============================================================================
// Report Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateWeightReportParams {
    pub user_id: i64,
    pub range: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Where to write the PDF
    pub output_path: String,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl FitTrackService {
    // --- Status ---

    #[tool(description = "Get the current status of the FitTrack service including build info, database status, and process information")]
    async fn fittrack_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get instructions for logging fitness data and reading analytics. Call this when starting a session or when unsure how to use the tools.")]
    fn fittrack_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::TRACKING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(TRACKING_INSTRUCTIONS)]))
    }

    // --- Users ---

    #[tool(description = "Register a new user. Username and email must be unused.")]
    fn register_user(&self, Parameters(p): Parameters<RegisterUserParams>) -> Result<CallToolResult, McpError> {
        respond(users::register_user(&self.database, &p.username, &p.email, p.display_name.as_deref()))
    }

    #[tool(description = "Get a user by ID")]
    fn get_user(&self, Parameters(p): Parameters<GetUserParams>) -> Result<CallToolResult, McpError> {
        respond(users::get_user(&self.database, p.user_id))
    }

    #[tool(description = "List all registered users")]
    fn list_users(&self) -> Result<CallToolResult, McpError> {
        respond(users::list_users(&self.database))
    }

    // --- Weight ---

    #[tool(description = "Log a body weight reading for a date")]
    fn add_weight_entry(&self, Parameters(p): Parameters<AddWeightEntryParams>) -> Result<CallToolResult, McpError> {
        respond(weights::add_weight_entry(&self.database, p.user_id, &p.date, p.weight, p.note.as_deref()))
    }

    #[tool(description = "Get a weight entry by ID")]
    fn get_weight_entry(&self, Parameters(p): Parameters<UserRecordParams>) -> Result<CallToolResult, McpError> {
        respond(weights::get_weight_entry(&self.database, p.user_id, p.id))
    }

    #[tool(description = "List weight entries in a date range, oldest first")]
    fn list_weight_entries(&self, Parameters(p): Parameters<RangeParams>) -> Result<CallToolResult, McpError> {
        respond(weights::list_weight_entries(&self.database, p.user_id, &p.query(), today()))
    }

    #[tool(description = "Update a weight entry's date, weight or note")]
    fn update_weight_entry(&self, Parameters(p): Parameters<UpdateWeightEntryParams>) -> Result<CallToolResult, McpError> {
        respond(weights::update_weight_entry(
            &self.database,
            p.user_id,
            p.id,
            p.date.as_deref(),
            p.weight,
            p.note.as_deref(),
        ))
    }

    #[tool(description = "Delete a weight entry")]
    fn delete_weight_entry(&self, Parameters(p): Parameters<UserRecordParams>) -> Result<CallToolResult, McpError> {
        respond(weights::delete_weight_entry(&self.database, p.user_id, p.id))
    }

    // --- Workouts ---

    #[tool(description = "Log a workout with a type and duration in minutes")]
    fn add_workout(&self, Parameters(p): Parameters<AddWorkoutParams>) -> Result<CallToolResult, McpError> {
        respond(workouts::add_workout(
            &self.database,
            p.user_id,
            &p.date,
            &p.workout_type,
            p.duration,
            p.notes.as_deref(),
        ))
    }

    #[tool(description = "Get a workout with its exercises")]
    fn get_workout(&self, Parameters(p): Parameters<UserRecordParams>) -> Result<CallToolResult, McpError> {
        respond(workouts::get_workout(&self.database, p.user_id, p.id))
    }

    #[tool(description = "List workouts in a date range, oldest first")]
    fn list_workouts(&self, Parameters(p): Parameters<RangeParams>) -> Result<CallToolResult, McpError> {
        respond(workouts::list_workouts(&self.database, p.user_id, &p.query(), today()))
    }

    #[tool(description = "Update a workout's date, type, duration or notes")]
    fn update_workout(&self, Parameters(p): Parameters<UpdateWorkoutParams>) -> Result<CallToolResult, McpError> {
        respond(workouts::update_workout(
            &self.database,
            p.user_id,
            p.id,
            p.date.as_deref(),
            p.workout_type.as_deref(),
            p.duration,
            p.notes.as_deref(),
        ))
    }

    #[tool(description = "Delete a workout and its exercise lines")]
    fn delete_workout(&self, Parameters(p): Parameters<UserRecordParams>) -> Result<CallToolResult, McpError> {
        respond(workouts::delete_workout(&self.database, p.user_id, p.id))
    }

    #[tool(description = "Add an exercise to a workout. A weight above the current best creates a MAX_WEIGHT personal record.")]
    fn add_workout_exercise(&self, Parameters(p): Parameters<AddWorkoutExerciseParams>) -> Result<CallToolResult, McpError> {
        let entry = ExerciseEntry {
            exercise_id: p.exercise_id,
            sets: p.sets,
            reps: p.reps,
            weight: p.weight,
            duration_seconds: p.duration_seconds,
            distance: p.distance,
            notes: p.notes,
        };
        respond(workouts::add_workout_exercise(&self.database, p.user_id, p.workout_id, entry))
    }

    #[tool(description = "Remove an exercise line from a workout")]
    fn remove_workout_exercise(&self, Parameters(p): Parameters<RemoveWorkoutExerciseParams>) -> Result<CallToolResult, McpError> {
        respond(workouts::remove_workout_exercise(&self.database, p.user_id, p.workout_exercise_id))
    }

    // --- Exercises ---

    #[tool(description = "Create an exercise in the user's catalogue")]
    fn create_exercise(&self, Parameters(p): Parameters<CreateExerciseParams>) -> Result<CallToolResult, McpError> {
        respond(exercises::create_exercise(
            &self.database,
            p.user_id,
            &p.name,
            &p.category,
            &p.muscle_groups,
            p.equipment.as_deref(),
            p.description.as_deref(),
        ))
    }

    #[tool(description = "Get an exercise by ID")]
    fn get_exercise(&self, Parameters(p): Parameters<UserRecordParams>) -> Result<CallToolResult, McpError> {
        respond(exercises::get_exercise(&self.database, p.user_id, p.id))
    }

    #[tool(description = "List the user's exercises, optionally by category")]
    fn list_exercises(&self, Parameters(p): Parameters<ListExercisesParams>) -> Result<CallToolResult, McpError> {
        respond(exercises::list_exercises(&self.database, p.user_id, p.category.as_deref()))
    }

    #[tool(description = "Update an exercise")]
    fn update_exercise(&self, Parameters(p): Parameters<UpdateExerciseParams>) -> Result<CallToolResult, McpError> {
        respond(exercises::update_exercise(
            &self.database,
            p.user_id,
            p.id,
            p.name.as_deref(),
            p.category.as_deref(),
            p.muscle_groups.as_deref(),
            p.equipment.as_deref(),
            p.description.as_deref(),
        ))
    }

    #[tool(description = "Delete an exercise (only allowed if no workout or template uses it)")]
    fn delete_exercise(&self, Parameters(p): Parameters<UserRecordParams>) -> Result<CallToolResult, McpError> {
        respond(exercises::delete_exercise(&self.database, p.user_id, p.id))
    }

    // --- Templates ---

    #[tool(description = "Create a reusable workout template with an exercise list")]
    fn create_template(&self, Parameters(p): Parameters<CreateTemplateParams>) -> Result<CallToolResult, McpError> {
        let lines = p
            .exercises
            .into_iter()
            .map(|e| TemplateExerciseInput {
                exercise_id: e.exercise_id,
                sets: e.sets,
                reps: e.reps,
                weight: e.weight,
            })
            .collect();
        respond(templates::create_template(
            &self.database,
            p.user_id,
            &p.name,
            &p.workout_type,
            p.description.as_deref(),
            p.estimated_duration,
            lines,
        ))
    }

    #[tool(description = "Get a workout template with its exercises")]
    fn get_template(&self, Parameters(p): Parameters<UserRecordParams>) -> Result<CallToolResult, McpError> {
        respond(templates::get_template(&self.database, p.user_id, p.id))
    }

    #[tool(description = "List the user's workout templates")]
    fn list_templates(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        respond(templates::list_templates(&self.database, p.user_id))
    }

    #[tool(description = "Delete a workout template")]
    fn delete_template(&self, Parameters(p): Parameters<UserRecordParams>) -> Result<CallToolResult, McpError> {
        respond(templates::delete_template(&self.database, p.user_id, p.id))
    }

    #[tool(description = "Create a workout from a template, copying its exercises")]
    fn start_workout_from_template(&self, Parameters(p): Parameters<StartWorkoutFromTemplateParams>) -> Result<CallToolResult, McpError> {
        respond(templates::start_workout_from_template(
            &self.database,
            p.user_id,
            p.template_id,
            p.date.as_deref(),
            p.duration,
            today(),
        ))
    }

    // --- Personal Records ---

    #[tool(description = "Record a personal record for an exercise")]
    fn add_personal_record(&self, Parameters(p): Parameters<AddPersonalRecordParams>) -> Result<CallToolResult, McpError> {
        let entry = RecordEntry {
            exercise_id: p.exercise_id,
            record_type: &p.record_type,
            value: p.value,
            unit: &p.unit,
            date: &p.date,
            workout_id: p.workout_id,
            notes: p.notes.as_deref(),
        };
        respond(records::add_personal_record(&self.database, p.user_id, entry))
    }

    #[tool(description = "List personal records, newest first, optionally for one exercise")]
    fn list_personal_records(&self, Parameters(p): Parameters<ListPersonalRecordsParams>) -> Result<CallToolResult, McpError> {
        respond(records::list_personal_records(&self.database, p.user_id, p.exercise_id))
    }

    #[tool(description = "Delete a personal record")]
    fn delete_personal_record(&self, Parameters(p): Parameters<UserRecordParams>) -> Result<CallToolResult, McpError> {
        respond(records::delete_personal_record(&self.database, p.user_id, p.id))
    }

    // --- Body Tracking ---

    #[tool(description = "Log body composition measurements (at least one measurement required)")]
    fn add_body_composition(&self, Parameters(p): Parameters<AddBodyCompositionParams>) -> Result<CallToolResult, McpError> {
        let m = Measurements {
            body_fat_percentage: p.body_fat_percentage,
            muscle_mass: p.muscle_mass,
            waist: p.waist,
            chest: p.chest,
            hips: p.hips,
            arms: p.arms,
            thighs: p.thighs,
        };
        respond(body::add_body_composition(&self.database, p.user_id, &p.date, m, p.notes.as_deref()))
    }

    #[tool(description = "List body composition measurements in a date range")]
    fn list_body_compositions(&self, Parameters(p): Parameters<RangeParams>) -> Result<CallToolResult, McpError> {
        respond(body::list_body_compositions(&self.database, p.user_id, &p.query(), today()))
    }

    #[tool(description = "Delete a body composition measurement")]
    fn delete_body_composition(&self, Parameters(p): Parameters<UserRecordParams>) -> Result<CallToolResult, McpError> {
        respond(body::delete_body_composition(&self.database, p.user_id, p.id))
    }

    #[tool(description = "Record a progress photo reference")]
    fn add_progress_photo(&self, Parameters(p): Parameters<AddProgressPhotoParams>) -> Result<CallToolResult, McpError> {
        respond(body::add_progress_photo(
            &self.database,
            p.user_id,
            &p.date,
            &p.image_path,
            p.photo_type.as_deref(),
            p.caption.as_deref(),
        ))
    }

    #[tool(description = "List progress photos in a date range")]
    fn list_progress_photos(&self, Parameters(p): Parameters<RangeParams>) -> Result<CallToolResult, McpError> {
        respond(body::list_progress_photos(&self.database, p.user_id, &p.query(), today()))
    }

    #[tool(description = "Delete a progress photo reference")]
    fn delete_progress_photo(&self, Parameters(p): Parameters<UserRecordParams>) -> Result<CallToolResult, McpError> {
        respond(body::delete_progress_photo(&self.database, p.user_id, p.id))
    }

    // --- Tasks ---

    #[tool(description = "Create a pending task")]
    fn create_task(&self, Parameters(p): Parameters<CreateTaskParams>) -> Result<CallToolResult, McpError> {
        respond(tasks::create_task(
            &self.database,
            p.user_id,
            &p.title,
            p.description.as_deref(),
            p.due_date.as_deref(),
        ))
    }

    #[tool(description = "Get a task by ID")]
    fn get_task(&self, Parameters(p): Parameters<UserRecordParams>) -> Result<CallToolResult, McpError> {
        respond(tasks::get_task(&self.database, p.user_id, p.id))
    }

    #[tool(description = "List tasks, optionally by status (PENDING, COMPLETED, ARCHIVED)")]
    fn list_tasks(&self, Parameters(p): Parameters<ListByStatusParams>) -> Result<CallToolResult, McpError> {
        respond(tasks::list_tasks(&self.database, p.user_id, p.status.as_deref()))
    }

    #[tool(description = "Update a task's title, description, status or due date")]
    fn update_task(&self, Parameters(p): Parameters<UpdateTaskParams>) -> Result<CallToolResult, McpError> {
        respond(tasks::update_task(
            &self.database,
            p.user_id,
            p.id,
            p.title.as_deref(),
            p.description.as_deref(),
            p.status.as_deref(),
            p.due_date.as_deref(),
        ))
    }

    #[tool(description = "Mark a task completed now")]
    fn complete_task(&self, Parameters(p): Parameters<UserRecordParams>) -> Result<CallToolResult, McpError> {
        respond(tasks::complete_task(&self.database, p.user_id, p.id, chrono::Utc::now()))
    }

    #[tool(description = "Delete a task")]
    fn delete_task(&self, Parameters(p): Parameters<UserRecordParams>) -> Result<CallToolResult, McpError> {
        respond(tasks::delete_task(&self.database, p.user_id, p.id))
    }

    // --- Goals ---

    #[tool(description = "Create a goal with a category (WEIGHT, WORKOUTS, TASKS), target and unit")]
    fn create_goal(&self, Parameters(p): Parameters<CreateGoalParams>) -> Result<CallToolResult, McpError> {
        respond(goals::create_goal(
            &self.database,
            p.user_id,
            &p.title,
            p.description.as_deref(),
            &p.category,
            p.target,
            p.current,
            &p.unit,
            p.deadline.as_deref(),
        ))
    }

    #[tool(description = "Get a goal by ID")]
    fn get_goal(&self, Parameters(p): Parameters<UserRecordParams>) -> Result<CallToolResult, McpError> {
        respond(goals::get_goal(&self.database, p.user_id, p.id))
    }

    #[tool(description = "List goals, optionally by status (ACTIVE, COMPLETED, PAUSED, CANCELLED)")]
    fn list_goals(&self, Parameters(p): Parameters<ListByStatusParams>) -> Result<CallToolResult, McpError> {
        respond(goals::list_goals(&self.database, p.user_id, p.status.as_deref()))
    }

    #[tool(description = "Update a goal's title, description, target, unit, status or deadline")]
    fn update_goal(&self, Parameters(p): Parameters<UpdateGoalParams>) -> Result<CallToolResult, McpError> {
        respond(goals::update_goal(
            &self.database,
            p.user_id,
            p.id,
            p.title.as_deref(),
            p.description.as_deref(),
            p.target,
            p.unit.as_deref(),
            p.status.as_deref(),
            p.deadline.as_deref(),
        ))
    }

    #[tool(description = "Delete a goal")]
    fn delete_goal(&self, Parameters(p): Parameters<UserRecordParams>) -> Result<CallToolResult, McpError> {
        respond(goals::delete_goal(&self.database, p.user_id, p.id))
    }

    #[tool(description = "Report progress for every goal from stored values (read-only)")]
    fn goal_progress(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        respond(goals::goal_progress(&self.database, p.user_id))
    }

    #[tool(description = "Recompute every goal's current value from logged data, save it, and report progress")]
    fn refresh_goal_progress(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        respond(goals::refresh_goal_progress(&self.database, p.user_id, today()))
    }

    // --- Analytics ---

    #[tool(description = "Weight summary, series, moving averages, trend line and records for a range")]
    fn weight_analytics(&self, Parameters(p): Parameters<RangeParams>) -> Result<CallToolResult, McpError> {
        respond(analytics::weight_analytics(&self.database, p.user_id, &p.query(), today()))
    }

    #[tool(description = "Workout summary by type, series, streaks and longest workout for a range")]
    fn workout_analytics(&self, Parameters(p): Parameters<RangeParams>) -> Result<CallToolResult, McpError> {
        respond(analytics::workout_analytics(&self.database, p.user_id, &p.query(), today()))
    }

    #[tool(description = "Workout frequency by day, week, type and weekday for a range")]
    fn enhanced_workout_analytics(&self, Parameters(p): Parameters<RangeParams>) -> Result<CallToolResult, McpError> {
        respond(analytics::enhanced_workout_analytics(&self.database, p.user_id, &p.query(), today()))
    }

    #[tool(description = "Task completion rate, time to complete and streaks for a range")]
    fn task_analytics(&self, Parameters(p): Parameters<RangeParams>) -> Result<CallToolResult, McpError> {
        respond(analytics::task_analytics(&self.database, p.user_id, &p.query(), today()))
    }

    #[tool(description = "Exercise volume, category and muscle-group distributions, top exercises and personal record counts for a range")]
    fn exercise_analytics(&self, Parameters(p): Parameters<RangeParams>) -> Result<CallToolResult, McpError> {
        respond(analytics::exercise_analytics(&self.database, p.user_id, &p.query(), today()))
    }

    #[tool(description = "Daily workout calendar, consistency rate, weekly activity and streaks for a range")]
    fn consistency_analytics(&self, Parameters(p): Parameters<RangeParams>) -> Result<CallToolResult, McpError> {
        respond(analytics::consistency_analytics(&self.database, p.user_id, &p.query(), today()))
    }

    #[tool(description = "Overview of the last 30 days: latest weight, workouts, tasks, goals and trends")]
    fn dashboard(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        respond(analytics::dashboard(&self.database, p.user_id, today()))
    }

    // --- Reports ---

    #[tool(description = "Generate a weight progress PDF report with a summary, entry table and trend chart")]
    fn generate_weight_report(&self, Parameters(p): Parameters<GenerateWeightReportParams>) -> Result<CallToolResult, McpError> {
        let query = RangeQuery {
            range: p.range.as_deref(),
            start_date: p.start_date.as_deref(),
            end_date: p.end_date.as_deref(),
        };
        respond(reports::generate_weight_report(&self.database, p.user_id, &query, today(), &p.output_path))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for FitTrackService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "fittrack".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("FitTrack".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "FitTrack - Fitness and habit tracking with analytics. \
                 IMPORTANT: Call fittrack_instructions first. Every tool takes a user_id; use register_user/list_users to get one. \
                 Weight: add/get/list/update/delete_weight_entry. \
                 Workouts: add/get/list/update/delete_workout, add_workout_exercise, remove_workout_exercise. \
                 Exercises: create/get/list/update/delete_exercise. \
                 Templates: create/get/list/delete_template, start_workout_from_template. \
                 Records: add/list/delete_personal_record. \
                 Body: add/list/delete_body_composition, add/list/delete_progress_photo. \
                 Tasks: create/get/list/update/complete/delete_task. \
                 Goals: create/get/list/update/delete_goal, goal_progress, refresh_goal_progress. \
                 Analytics (range 7/30/90/365/all or start_date+end_date): weight_analytics, workout_analytics, \
                 enhanced_workout_analytics, task_analytics, exercise_analytics, consistency_analytics, dashboard. \
                 Reports: generate_weight_report."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldIssue;

    #[test]
    fn test_validation_maps_to_invalid_params() {
        let err = to_mcp_error(AppError::Validation(vec![FieldIssue::new("weight", "must be greater than 0")]));
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("weight"));
    }

    #[test]
    fn test_not_found_maps_to_resource_not_found() {
        let err = to_mcp_error(AppError::not_found("goal", 4));
        assert_eq!(err.code, rmcp::model::ErrorCode::RESOURCE_NOT_FOUND);
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = to_mcp_error(AppError::Report("disk on fire".to_string()));
        assert_eq!(err.code, rmcp::model::ErrorCode::INTERNAL_ERROR);
        assert_eq!(err.message, "internal error");
    }

    #[test]
    fn test_database_and_io_errors_hide_details() {
        let db_err = to_mcp_error(rusqlite::Error::QueryReturnedNoRows.into());
        assert_eq!(db_err.code, rmcp::model::ErrorCode::INTERNAL_ERROR);
        assert_eq!(db_err.message, "internal error");
        assert!(db_err.data.is_none());

        let io_err = to_mcp_error(AppError::from(std::io::Error::other("/secret/path")));
        assert_eq!(io_err.code, rmcp::model::ErrorCode::INTERNAL_ERROR);
        assert!(!io_err.message.contains("secret"));
    }

    #[test]
    fn test_range_params_build_query() {
        let p = RangeParams {
            user_id: 1,
            range: Some("7".to_string()),
            start_date: None,
            end_date: None,
        };
        let q = p.query();
        assert_eq!(q.range, Some("7"));
        assert!(q.start_date.is_none());
    }
}
