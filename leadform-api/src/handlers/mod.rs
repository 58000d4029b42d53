// Main handlers (application state and health)
pub mod main_handlers;
pub use main_handlers::AppState;

// Public questionnaire endpoints
pub mod form_handlers;

// Admin session endpoints
pub mod admin_handlers;

// Question management
pub mod question_handlers;

// Response listing and exports
pub mod response_handlers;

// Branding and messaging settings
pub mod settings_handlers;
