/// Course data lookup through the language-model oracle.
pub mod course_search;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Client for the language-model API answering course queries.
pub mod oracle;
/// Score cards, handicaps and standings.
pub mod score_service;
/// Live tournament streams over Server-Sent Events.
pub mod sse_service;
/// Storage connection supervisor with backoff and degraded mode.
pub mod storage_supervisor;
/// Tournament creation, access and editing.
pub mod tournament_service;
