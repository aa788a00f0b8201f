// Application state for HTTP handlers
use crate::application::coverage_service::CoverageService;

#[derive(Clone)]
pub struct AppState {
    pub coverage_service: CoverageService,
}
